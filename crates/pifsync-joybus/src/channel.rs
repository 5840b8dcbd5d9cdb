//! Tagged view over one PIF channel.

use bitflags::bitflags;

use crate::{command::JoybusCommand, constants::CHANNEL_COUNT};

bitflags! {
    /// Error bits carried in the high bits of a channel's receive status byte.
    ///
    /// The low six bits hold the receive length and are never touched here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RxStatus: u8 {
        /// No device answered on this channel.
        const DEVICE_ABSENT = 0x80;
        /// The device sent more bytes than requested.
        const OVERRUN = 0x40;
        const ERROR_MASK = Self::DEVICE_ABSENT.bits() | Self::OVERRUN.bits();
    }
}

/// One channel of PIF traffic as seen during a single poll.
///
/// `tx` is the transmit frame (command byte first). `rx` is the buffer the
/// device answers into; `None` means nothing is attached to the slot and
/// writes must be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoybusChannel {
    tx: Option<Vec<u8>>,
    status: u8,
    rx: Option<Vec<u8>>,
}

/// The full set of channels handed to a poll callback.
pub type JoybusChannels = [JoybusChannel; CHANNEL_COUNT];

/// Channels with no traffic at all.
pub fn idle_channels() -> JoybusChannels {
    std::array::from_fn(|_| JoybusChannel::idle())
}

impl JoybusChannel {
    /// A channel the console did not address during this poll.
    pub const fn idle() -> Self {
        Self {
            tx: None,
            status: 0,
            rx: None,
        }
    }

    pub fn new(tx: Vec<u8>, rx: Option<Vec<u8>>) -> Self {
        let status = rx.as_ref().map_or(0, |rx| (rx.len() as u8) & 0x3F);
        Self {
            tx: Some(tx),
            status,
            rx,
        }
    }

    /// A single-byte request with a zeroed receive buffer of `rx_len` bytes.
    pub fn request(command: JoybusCommand, rx_len: usize) -> Self {
        Self::new(vec![command.as_byte()], Some(vec![0; rx_len]))
    }

    /// A request on a slot with nothing attached.
    pub fn unanswered(command: JoybusCommand) -> Self {
        Self::new(vec![command.as_byte()], None).with_status(RxStatus::DEVICE_ABSENT.bits())
    }

    pub fn with_status(mut self, status: u8) -> Self {
        self.status = status;
        self
    }

    pub fn with_rx(mut self, rx: &[u8]) -> Self {
        self.rx = Some(rx.to_vec());
        self
    }

    /// Command byte of the transmit frame, if the channel carries one.
    pub fn command(&self) -> Option<JoybusCommand> {
        self.tx
            .as_deref()
            .and_then(|tx| tx.first())
            .map(|&byte| JoybusCommand::from_byte(byte))
    }

    pub fn tx(&self) -> Option<&[u8]> {
        self.tx.as_deref()
    }

    pub fn rx(&self) -> Option<&[u8]> {
        self.rx.as_deref()
    }

    pub fn rx_mut(&mut self) -> Option<&mut [u8]> {
        self.rx.as_deref_mut()
    }

    /// True when the slot has both a request and somewhere to answer it.
    pub fn is_addressable(&self) -> bool {
        self.tx.is_some() && self.rx.is_some()
    }

    pub fn status_byte(&self) -> u8 {
        self.status
    }

    pub fn status(&self) -> RxStatus {
        RxStatus::from_bits_truncate(self.status & RxStatus::ERROR_MASK.bits())
    }

    /// Makes the device look connected and healthy.
    pub fn clear_error_flags(&mut self) {
        self.status &= !RxStatus::ERROR_MASK.bits();
    }
}
