/// Number of PIF channels polled by the console.
/// Fixed by the hardware; not a configurable limit.
pub const CHANNEL_COUNT: usize = 6;

/// Maximum number of synchronized participants in one session.
pub const MAX_PLAYERS: usize = 8;

/// Device type reported for a standard controller
/// (absolute counters + controller port), sent low byte first.
pub const CONTROLLER_TYPE: u16 = 0x0500;

/// Accessory status byte meaning "nothing plugged into the controller".
pub const NO_PAK_STATUS: u8 = 0x00;

/// Value written into accessory replies when no pak is present.
pub const PAK_ABSENT: u8 = 0xFF;

/// Offset of the last byte of a 32-byte pak data block in a PAK_READ reply.
/// The reply is 32 data bytes followed by a CRC byte at this offset.
pub const PAK_READ_SENTINEL_OFFSET: usize = 32;

/// Offset of the write acknowledgement (data CRC) in a PAK_WRITE reply.
pub const PAK_WRITE_SENTINEL_OFFSET: usize = 0;

/// Length of the STATUS/RESET reply: two type bytes and one status byte.
pub const STATUS_REPLY_LEN: usize = 3;

/// Length of a CONTROLLER_READ reply.
pub const CONTROLLER_REPLY_LEN: usize = 4;
