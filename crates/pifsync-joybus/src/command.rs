//! Joybus command set.

use std::fmt;

/// Command byte found at `tx[0]` of a channel's transmit frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoybusCommand {
    /// Device identification query.
    Status,
    /// Read the 4-byte button/stick state.
    ControllerRead,
    /// Read a 32-byte block from the controller accessory.
    PakRead,
    /// Write a 32-byte block to the controller accessory.
    PakWrite,
    EepromRead,
    EepromWrite,
    /// Device reset; replies like [`JoybusCommand::Status`].
    Reset,
    Unknown(u8),
}

impl JoybusCommand {
    pub const STATUS: u8 = 0x00;
    pub const CONTROLLER_READ: u8 = 0x01;
    pub const PAK_READ: u8 = 0x02;
    pub const PAK_WRITE: u8 = 0x03;
    pub const EEPROM_READ: u8 = 0x04;
    pub const EEPROM_WRITE: u8 = 0x05;
    pub const RESET: u8 = 0xFF;

    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            Self::STATUS => Self::Status,
            Self::CONTROLLER_READ => Self::ControllerRead,
            Self::PAK_READ => Self::PakRead,
            Self::PAK_WRITE => Self::PakWrite,
            Self::EEPROM_READ => Self::EepromRead,
            Self::EEPROM_WRITE => Self::EepromWrite,
            Self::RESET => Self::Reset,
            other => Self::Unknown(other),
        }
    }

    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Status => Self::STATUS,
            Self::ControllerRead => Self::CONTROLLER_READ,
            Self::PakRead => Self::PAK_READ,
            Self::PakWrite => Self::PAK_WRITE,
            Self::EepromRead => Self::EEPROM_READ,
            Self::EepromWrite => Self::EEPROM_WRITE,
            Self::Reset => Self::RESET,
            Self::Unknown(byte) => byte,
        }
    }

    /// Commands answered with the device identification reply.
    #[inline]
    pub const fn is_identify(self) -> bool {
        matches!(self, Self::Status | Self::Reset)
    }
}

impl From<u8> for JoybusCommand {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<JoybusCommand> for u8 {
    fn from(command: JoybusCommand) -> Self {
        command.as_byte()
    }
}

impl fmt::Display for JoybusCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => f.write_str("STATUS"),
            Self::ControllerRead => f.write_str("CONTROLLER_READ"),
            Self::PakRead => f.write_str("PAK_READ"),
            Self::PakWrite => f.write_str("PAK_WRITE"),
            Self::EepromRead => f.write_str("EEPROM_READ"),
            Self::EepromWrite => f.write_str("EEPROM_WRITE"),
            Self::Reset => f.write_str("RESET"),
            Self::Unknown(byte) => write!(f, "UNKNOWN(0x{byte:02X})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_bytes_match_hardware() {
        assert_eq!(JoybusCommand::Status.as_byte(), 0x00);
        assert_eq!(JoybusCommand::ControllerRead.as_byte(), 0x01);
        assert_eq!(JoybusCommand::PakRead.as_byte(), 0x02);
        assert_eq!(JoybusCommand::PakWrite.as_byte(), 0x03);
        assert_eq!(JoybusCommand::EepromRead.as_byte(), 0x04);
        assert_eq!(JoybusCommand::EepromWrite.as_byte(), 0x05);
        assert_eq!(JoybusCommand::Reset.as_byte(), 0xFF);
    }

    #[test]
    fn every_byte_survives_from_and_back() {
        for byte in 0..=u8::MAX {
            assert_eq!(JoybusCommand::from_byte(byte).as_byte(), byte);
        }
    }

    #[test]
    fn unknown_commands_keep_their_byte() {
        assert_eq!(JoybusCommand::from_byte(0x42), JoybusCommand::Unknown(0x42));
        assert_eq!(JoybusCommand::Unknown(0x42).to_string(), "UNKNOWN(0x42)");
    }

    #[test]
    fn reset_and_status_identify() {
        assert!(JoybusCommand::Status.is_identify());
        assert!(JoybusCommand::Reset.is_identify());
        assert!(!JoybusCommand::ControllerRead.is_identify());
    }
}
