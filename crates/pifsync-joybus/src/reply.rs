//! Encoders for synthetic device replies.
//!
//! Every writer checks the receive buffer length first and reports
//! [`JoybusError::ReplyTooShort`] instead of writing out of bounds.

use crate::{
    command::JoybusCommand,
    constants::{
        CONTROLLER_REPLY_LEN, CONTROLLER_TYPE, NO_PAK_STATUS, PAK_ABSENT, PAK_READ_SENTINEL_OFFSET,
        PAK_WRITE_SENTINEL_OFFSET, STATUS_REPLY_LEN,
    },
    error::JoybusError,
};

fn ensure_len(rx: &[u8], command: JoybusCommand, needed: usize) -> Result<(), JoybusError> {
    if rx.len() < needed {
        return Err(JoybusError::ReplyTooShort {
            command,
            needed,
            actual: rx.len(),
        });
    }
    Ok(())
}

/// Standard controller, no accessory: `[type_lo, type_hi, pak_status]`.
pub fn write_identify(rx: &mut [u8], command: JoybusCommand) -> Result<(), JoybusError> {
    ensure_len(rx, command, STATUS_REPLY_LEN)?;
    let [lo, hi] = CONTROLLER_TYPE.to_le_bytes();
    rx[0] = lo;
    rx[1] = hi;
    rx[2] = NO_PAK_STATUS;
    Ok(())
}

/// Decodes a CONTROLLER_READ reply into one big-endian word.
pub fn read_controller(rx: &[u8]) -> Result<u32, JoybusError> {
    ensure_len(rx, JoybusCommand::ControllerRead, CONTROLLER_REPLY_LEN)?;
    Ok(u32::from_be_bytes([rx[0], rx[1], rx[2], rx[3]]))
}

/// Writes `word` back in the same byte order [`read_controller`] decodes.
pub fn write_controller(rx: &mut [u8], word: u32) -> Result<(), JoybusError> {
    ensure_len(rx, JoybusCommand::ControllerRead, CONTROLLER_REPLY_LEN)?;
    rx[..CONTROLLER_REPLY_LEN].copy_from_slice(&word.to_be_bytes());
    Ok(())
}

/// Marks a PAK_READ reply as coming from an empty accessory slot.
pub fn write_pak_read_absent(rx: &mut [u8]) -> Result<(), JoybusError> {
    ensure_len(rx, JoybusCommand::PakRead, PAK_READ_SENTINEL_OFFSET + 1)?;
    rx[PAK_READ_SENTINEL_OFFSET] = PAK_ABSENT;
    Ok(())
}

/// Marks a PAK_WRITE acknowledgement as coming from an empty accessory slot.
pub fn write_pak_write_absent(rx: &mut [u8]) -> Result<(), JoybusError> {
    ensure_len(rx, JoybusCommand::PakWrite, PAK_WRITE_SENTINEL_OFFSET + 1)?;
    rx[PAK_WRITE_SENTINEL_OFFSET] = PAK_ABSENT;
    Ok(())
}
