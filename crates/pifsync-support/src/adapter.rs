//! GameCube adapter input report.
//!
//! One report covers all four ports: a leading type byte followed by nine
//! bytes per port (status, two button bytes, main stick x/y, C-stick x/y,
//! left/right trigger).

use bitflags::bitflags;

pub const REPORT_LEN: usize = 37;
pub const PORT_COUNT: usize = 4;
const PORT_STRIDE: usize = 9;

bitflags! {
    /// First button byte in the low half, second in the high half.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct GcButtons: u16 {
        const A = 0x0001;
        const B = 0x0002;
        const X = 0x0004;
        const Y = 0x0008;
        const DPAD_LEFT = 0x0010;
        const DPAD_RIGHT = 0x0020;
        const DPAD_DOWN = 0x0040;
        const DPAD_UP = 0x0080;
        const START = 0x0100;
        const Z = 0x0200;
        const R = 0x0400;
        const L = 0x0800;
    }
}

/// Raw state of one adapter port. All zero means nothing is plugged in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortState {
    pub status: u8,
    pub buttons: GcButtons,
    pub stick_x: u8,
    pub stick_y: u8,
    pub c_stick_x: u8,
    pub c_stick_y: u8,
    pub l_trigger: u8,
    pub r_trigger: u8,
}

impl PortState {
    pub fn is_connected(&self) -> bool {
        self.status != 0
    }
}

pub fn parse_report(report: &[u8; REPORT_LEN]) -> [PortState; PORT_COUNT] {
    std::array::from_fn(|port| {
        let b = &report[1 + port * PORT_STRIDE..1 + (port + 1) * PORT_STRIDE];
        PortState {
            status: b[0],
            buttons: GcButtons::from_bits_truncate(u16::from_le_bytes([b[1], b[2]])),
            stick_x: b[3],
            stick_y: b[4],
            c_stick_x: b[5],
            c_stick_y: b[6],
            l_trigger: b[7],
            r_trigger: b[8],
        }
    })
}
