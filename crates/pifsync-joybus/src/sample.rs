//! Standard controller response: `[buttons_hi][buttons_lo][x][y]`.

use bitflags::bitflags;

bitflags! {
    /// Button bits of the 16-bit half of a controller response.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct N64Buttons: u16 {
        const A = 0x8000;
        const B = 0x4000;
        const Z = 0x2000;
        const START = 0x1000;
        const D_UP = 0x0800;
        const D_DOWN = 0x0400;
        const D_LEFT = 0x0200;
        const D_RIGHT = 0x0100;
        const L = 0x0020;
        const R = 0x0010;
        const C_UP = 0x0008;
        const C_DOWN = 0x0004;
        const C_LEFT = 0x0002;
        const C_RIGHT = 0x0001;
    }
}

/// One controller state sample as it travels on the wire and between peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ControllerSample {
    pub buttons: N64Buttons,
    pub x: i8,
    pub y: i8,
}

impl ControllerSample {
    pub const NEUTRAL: Self = Self {
        buttons: N64Buttons::empty(),
        x: 0,
        y: 0,
    };

    pub fn to_bytes(self) -> [u8; 4] {
        let [hi, lo] = self.buttons.bits().to_be_bytes();
        [hi, lo, self.x as u8, self.y as u8]
    }

    /// Unknown button bits (e.g. the reset flag) are dropped.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            buttons: N64Buttons::from_bits_truncate(u16::from_be_bytes([bytes[0], bytes[1]])),
            x: bytes[2] as i8,
            y: bytes[3] as i8,
        }
    }

    /// The word exchanged with peers.
    pub fn to_word(self) -> u32 {
        u32::from_be_bytes(self.to_bytes())
    }

    pub fn from_word(word: u32) -> Self {
        Self::from_bytes(word.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_occupy_the_high_half() {
        let sample = ControllerSample {
            buttons: N64Buttons::A | N64Buttons::C_RIGHT,
            x: 0,
            y: 0,
        };
        assert_eq!(sample.to_word(), 0x8001_0000);
    }

    #[test]
    fn stick_axes_are_signed_bytes() {
        let sample = ControllerSample {
            buttons: N64Buttons::empty(),
            x: -1,
            y: 85,
        };
        assert_eq!(sample.to_bytes(), [0x00, 0x00, 0xFF, 0x55]);
        assert_eq!(ControllerSample::from_word(sample.to_word()), sample);
    }

    #[test]
    fn neutral_is_zero() {
        assert_eq!(ControllerSample::NEUTRAL.to_word(), 0);
        assert_eq!(ControllerSample::from_word(0), ControllerSample::NEUTRAL);
    }

    #[test]
    fn reserved_bits_are_dropped() {
        let sample = ControllerSample::from_bytes([0x00, 0x80, 0x00, 0x00]);
        assert!(sample.buttons.is_empty());
    }
}
