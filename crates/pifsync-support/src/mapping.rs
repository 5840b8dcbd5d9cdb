//! Mapping of adapter state onto an N64 controller sample.

use pifsync_joybus::{ControllerSample, N64Buttons};

use crate::adapter::{GcButtons, PORT_COUNT, PortState};

/// Full deflection of the N64 analog stick at sensitivity 1.0.
pub const N64_AXIS_PEAK: f64 = 85.0;

/// Adapter source for one N64 button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcInput {
    None,
    A,
    B,
    X,
    Y,
    Start,
    Z,
    /// Digital click or analog travel past the trigger threshold.
    L,
    R,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    CStickUp,
    CStickDown,
    CStickLeft,
    CStickRight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonMapping {
    pub a: GcInput,
    pub b: GcInput,
    pub start: GcInput,
    pub z: GcInput,
    pub l: GcInput,
    pub r: GcInput,
    pub dpad_up: GcInput,
    pub dpad_down: GcInput,
    pub dpad_left: GcInput,
    pub dpad_right: GcInput,
    pub c_up: GcInput,
    pub c_down: GcInput,
    pub c_left: GcInput,
    pub c_right: GcInput,
}

impl Default for ButtonMapping {
    fn default() -> Self {
        Self {
            a: GcInput::A,
            b: GcInput::B,
            start: GcInput::Start,
            z: GcInput::Z,
            l: GcInput::L,
            r: GcInput::R,
            dpad_up: GcInput::DpadUp,
            dpad_down: GcInput::DpadDown,
            dpad_left: GcInput::DpadLeft,
            dpad_right: GcInput::DpadRight,
            c_up: GcInput::CStickUp,
            c_down: GcInput::CStickDown,
            c_left: GcInput::CStickLeft,
            c_right: GcInput::CStickRight,
        }
    }
}

impl ButtonMapping {
    fn pairs(&self) -> [(N64Buttons, GcInput); 14] {
        [
            (N64Buttons::A, self.a),
            (N64Buttons::B, self.b),
            (N64Buttons::START, self.start),
            (N64Buttons::Z, self.z),
            (N64Buttons::L, self.l),
            (N64Buttons::R, self.r),
            (N64Buttons::D_UP, self.dpad_up),
            (N64Buttons::D_DOWN, self.dpad_down),
            (N64Buttons::D_LEFT, self.dpad_left),
            (N64Buttons::D_RIGHT, self.dpad_right),
            (N64Buttons::C_UP, self.c_up),
            (N64Buttons::C_DOWN, self.c_down),
            (N64Buttons::C_LEFT, self.c_left),
            (N64Buttons::C_RIGHT, self.c_right),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingProfile {
    /// Fraction of stick travel ignored around the center.
    pub deadzone: f64,
    pub sensitivity: f64,
    pub trigger_threshold: f64,
    pub c_stick_threshold: f64,
    pub ports_enabled: [bool; PORT_COUNT],
    pub buttons: ButtonMapping,
}

impl Default for MappingProfile {
    fn default() -> Self {
        Self {
            deadzone: 0.09,
            sensitivity: 1.0,
            trigger_threshold: 0.5,
            c_stick_threshold: 0.4,
            ports_enabled: [true; PORT_COUNT],
            buttons: ButtonMapping::default(),
        }
    }
}

impl MappingProfile {
    pub fn sample(&self, port: &PortState) -> ControllerSample {
        if !port.is_connected() {
            return ControllerSample::NEUTRAL;
        }

        let buttons = self
            .buttons
            .pairs()
            .into_iter()
            .filter(|(_, source)| self.is_active(port, *source))
            .fold(N64Buttons::empty(), |acc, (button, _)| acc | button);

        let peak = N64_AXIS_PEAK * self.sensitivity;
        let axis = |raw: u8| {
            let scaled = scale_axis(centered(raw), self.deadzone, peak);
            scaled.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8
        };

        ControllerSample {
            buttons,
            x: axis(port.stick_x),
            y: axis(port.stick_y),
        }
    }

    fn is_active(&self, port: &PortState, source: GcInput) -> bool {
        let pressed = |flag: GcButtons| port.buttons.contains(flag);
        let trigger = |raw: u8| f64::from(raw) / 255.0 >= self.trigger_threshold;
        let c_x = centered(port.c_stick_x);
        let c_y = centered(port.c_stick_y);
        let c = self.c_stick_threshold;

        match source {
            GcInput::None => false,
            GcInput::A => pressed(GcButtons::A),
            GcInput::B => pressed(GcButtons::B),
            GcInput::X => pressed(GcButtons::X),
            GcInput::Y => pressed(GcButtons::Y),
            GcInput::Start => pressed(GcButtons::START),
            GcInput::Z => pressed(GcButtons::Z),
            GcInput::L => pressed(GcButtons::L) || trigger(port.l_trigger),
            GcInput::R => pressed(GcButtons::R) || trigger(port.r_trigger),
            GcInput::DpadUp => pressed(GcButtons::DPAD_UP),
            GcInput::DpadDown => pressed(GcButtons::DPAD_DOWN),
            GcInput::DpadLeft => pressed(GcButtons::DPAD_LEFT),
            GcInput::DpadRight => pressed(GcButtons::DPAD_RIGHT),
            GcInput::CStickUp => c_y >= c,
            GcInput::CStickDown => c_y <= -c,
            GcInput::CStickLeft => c_x <= -c,
            GcInput::CStickRight => c_x >= c,
        }
    }
}

/// Adapter axes rest at 0x80; maps them to roughly [-1.0, 1.0].
fn centered(raw: u8) -> f64 {
    f64::from(raw.wrapping_add(128) as i8) / f64::from(i8::MAX)
}

/// Rescales `input` past the dead zone onto `[-max, max]`, keeping its sign.
pub fn scale_axis(input: f64, deadzone: f64, max: f64) -> i32 {
    let magnitude = input.abs();
    if magnitude <= deadzone {
        return 0;
    }
    let scaled = (magnitude - deadzone) / (1.0 - deadzone) * max;
    let result = scaled.min(max) as i32;
    if input >= 0.0 { result } else { -result }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn pad() -> PortState {
        PortState {
            status: 0x10,
            stick_x: 0x80,
            stick_y: 0x80,
            c_stick_x: 0x80,
            c_stick_y: 0x80,
            ..PortState::default()
        }
    }

    #[test]
    fn centered_pad_is_neutral() {
        assert_eq!(MappingProfile::default().sample(&pad()), ControllerSample::NEUTRAL);
    }

    #[test]
    fn disconnected_port_is_neutral_whatever_it_reports() {
        let port = PortState {
            status: 0,
            buttons: GcButtons::A,
            stick_x: 0xFF,
            ..pad()
        };
        assert_eq!(MappingProfile::default().sample(&port), ControllerSample::NEUTRAL);
    }

    #[test]
    fn scale_axis_edges() {
        assert_eq!(scale_axis(0.05, 0.09, 85.0), 0);
        assert_eq!(scale_axis(0.09, 0.09, 85.0), 0);
        assert_eq!(scale_axis(1.0, 0.09, 85.0), 85);
        assert_eq!(scale_axis(-1.0, 0.09, 85.0), -85);
        assert_eq!(scale_axis(-1.2, 0.09, 85.0), -85);
    }

    #[test]
    fn full_deflection_reaches_the_peak() {
        let port = PortState {
            stick_x: 0xFF,
            stick_y: 0x00,
            ..pad()
        };
        let sample = MappingProfile::default().sample(&port);
        assert_eq!((sample.x, sample.y), (85, -85));
    }

    #[test]
    fn sensitivity_scales_the_peak() {
        let profile = MappingProfile {
            sensitivity: 0.5,
            ..MappingProfile::default()
        };
        let port = PortState {
            stick_x: 0xFF,
            ..pad()
        };
        assert_eq!(profile.sample(&port).x, 42);
    }

    #[test]
    fn digital_buttons_follow_the_mapping() {
        let port = PortState {
            buttons: GcButtons::A | GcButtons::Z | GcButtons::DPAD_LEFT,
            ..pad()
        };
        let sample = MappingProfile::default().sample(&port);
        assert_eq!(
            sample.buttons,
            N64Buttons::A | N64Buttons::Z | N64Buttons::D_LEFT
        );

        let swapped = MappingProfile {
            buttons: ButtonMapping {
                a: GcInput::X,
                z: GcInput::None,
                ..ButtonMapping::default()
            },
            ..MappingProfile::default()
        };
        assert_eq!(swapped.sample(&port).buttons, N64Buttons::D_LEFT);
    }

    #[test]
    fn analog_triggers_use_the_threshold() {
        let half = PortState {
            l_trigger: 0x7F,
            r_trigger: 0x80,
            ..pad()
        };
        let sample = MappingProfile::default().sample(&half);
        assert_eq!(sample.buttons, N64Buttons::R);
    }

    #[test]
    fn c_stick_directions_use_the_threshold() {
        let up_left = PortState {
            c_stick_x: 0x20,
            c_stick_y: 0xE0,
            ..pad()
        };
        let sample = MappingProfile::default().sample(&up_left);
        assert_eq!(sample.buttons, N64Buttons::C_UP | N64Buttons::C_LEFT);

        let nudge = PortState {
            c_stick_x: 0xA0,
            ..pad()
        };
        assert!(MappingProfile::default().sample(&nudge).buttons.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn scale_axis_is_bounded_and_keeps_sign(
            input in -1.5f64..1.5,
            deadzone in 0.0f64..0.5,
            max in 1.0f64..127.0,
        ) {
            let out = scale_axis(input, deadzone, max);
            prop_assert!(f64::from(out.abs()) <= max);
            if out != 0 {
                prop_assert_eq!(out > 0, input > 0.0);
            }
            if input.abs() <= deadzone {
                prop_assert_eq!(out, 0);
            }
        }

        #[test]
        fn scale_axis_is_monotonic(
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(scale_axis(lo, 0.09, 85.0) <= scale_axis(hi, 0.09, 85.0));
        }
    }
}
