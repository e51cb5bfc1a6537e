//! Nintendo GameCube Joybus report composition.
//!
//! The wire loop polls at roughly 1 kHz; on each poll it needs an 8-byte
//! report ready to shift out before the console's next clock edge. This
//! module only builds that report from the router's current player
//! state — the PIO program that actually answers `WaitForPoll` lives in
//! `usbretro-firmware`.

use usbretro_core::event::{axis, InputEvent};
use usbretro_core::Buttons;

/// Default left-stick scale: reduces sensitivity toward center, matching
/// the original firmware's stock profile.
pub const DEFAULT_STICK_SCALE: f32 = 0.60;

/// Threshold an XInput-style analog trigger must cross to register as a
/// digital L/R click (Switch Pro's ZL/ZR are already digital and bypass
/// this entirely).
pub const DEFAULT_TRIGGER_THRESHOLD: u8 = 200;

/// The 8-byte Joybus controller report, analog-mode layout (byte 0 is
/// the mode/origin byte the console never actually reads back from us;
/// bytes 1-7 are what Joybus shifts out).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GcReport {
    pub start: bool,
    pub y: bool,
    pub x: bool,
    pub b: bool,
    pub a: bool,
    pub l: bool,
    pub r: bool,
    pub z: bool,
    pub up: bool,
    pub down: bool,
    pub right: bool,
    pub left: bool,
    pub stick_x: u8,
    pub stick_y: u8,
    pub cstick_x: u8,
    pub cstick_y: u8,
    pub l_analog: u8,
    pub r_analog: u8,
}

impl GcReport {
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            start: false,
            y: false,
            x: false,
            b: false,
            a: false,
            l: false,
            r: false,
            z: false,
            up: false,
            down: false,
            right: false,
            left: false,
            stick_x: 128,
            stick_y: 128,
            cstick_x: 128,
            cstick_y: 128,
            l_analog: 0,
            r_analog: 0,
        }
    }

    /// Pack into the 8 bytes Joybus shifts out, byte 0 first.
    #[must_use]
    pub fn to_bytes(self) -> [u8; 8] {
        let mut b0 = 0u8;
        b0 |= u8::from(self.start) << 4;
        b0 |= u8::from(self.y) << 3;
        b0 |= u8::from(self.x) << 2;
        b0 |= u8::from(self.b) << 1;
        b0 |= u8::from(self.a);

        let mut b1 = 1 << 4; // bit 4 always set (origin bit)
        b1 |= u8::from(self.l) << 6;
        b1 |= u8::from(self.r) << 5;
        b1 |= u8::from(self.z) << 4;
        b1 |= u8::from(self.up) << 3;
        b1 |= u8::from(self.down) << 2;
        b1 |= u8::from(self.right) << 1;
        b1 |= u8::from(self.left);

        [
            b0,
            b1,
            self.stick_x,
            self.stick_y,
            self.cstick_x,
            self.cstick_y,
            self.l_analog,
            self.r_analog,
        ]
    }
}

/// Scale a stick axis toward its center by `scale`, clamping to `[0,
/// 255]`.
#[must_use]
pub fn scale_toward_center(val: u8, scale: f32, center: u8) -> u8 {
    let rel = i32::from(val) - i32::from(center);
    let scaled = (rel as f32 * scale) as i32;
    (scaled + i32::from(center)).clamp(0, 255) as u8
}

/// Resolve L/R trigger dualism: a digital shoulder press OR an analog
/// trigger crossing `threshold` both register as the click.
#[must_use]
pub fn trigger_clicked(digital: bool, analog: u8, threshold: u8) -> bool {
    digital || analog >= threshold
}

/// Compose a GameCube report from one player's canonical input event.
#[must_use]
pub fn compose(event: &InputEvent, stick_scale: f32, trigger_threshold: u8) -> GcReport {
    let b = event.buttons.socd_normalized();
    let l2 = event.analog[axis::LEFT_TRIGGER];
    let r2 = event.analog[axis::RIGHT_TRIGGER];

    GcReport {
        start: b.contains(Buttons::START),
        y: b.contains(Buttons::B4),
        x: b.contains(Buttons::B3),
        b: b.contains(Buttons::B1),
        a: b.contains(Buttons::B2),
        l: trigger_clicked(b.contains(Buttons::L1), l2, trigger_threshold),
        r: trigger_clicked(b.contains(Buttons::R1), r2, trigger_threshold),
        z: b.contains(Buttons::L2) || b.contains(Buttons::R2),
        up: b.contains(Buttons::UP),
        down: b.contains(Buttons::DOWN),
        right: b.contains(Buttons::RIGHT),
        left: b.contains(Buttons::LEFT),
        stick_x: scale_toward_center(event.analog[axis::LEFT_X], stick_scale, 128),
        stick_y: scale_toward_center(event.analog[axis::LEFT_Y], stick_scale, 128),
        cstick_x: event.analog[axis::RIGHT_X],
        cstick_y: event.analog[axis::RIGHT_Y],
        l_analog: l2,
        r_analog: r2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usbretro_core::event::EventType;

    fn pressed(buttons: Buttons) -> InputEvent {
        let mut e = InputEvent::neutral(1, 0, EventType::Gamepad);
        e.buttons = buttons;
        e
    }

    #[test]
    fn neutral_report_centers_sticks() {
        let r = GcReport::neutral();
        assert_eq!(r.stick_x, 128);
        assert_eq!(r.l_analog, 0);
    }

    #[test]
    fn scale_toward_center_halves_deflection() {
        assert_eq!(scale_toward_center(255, 0.5, 128), 191);
        assert_eq!(scale_toward_center(128, 0.5, 128), 128);
    }

    #[test]
    fn trigger_dualism_either_source_clicks() {
        assert!(trigger_clicked(true, 0, DEFAULT_TRIGGER_THRESHOLD));
        assert!(trigger_clicked(false, 255, DEFAULT_TRIGGER_THRESHOLD));
        assert!(!trigger_clicked(false, 0, DEFAULT_TRIGGER_THRESHOLD));
    }

    #[test]
    fn compose_maps_face_buttons() {
        let e = pressed(Buttons::B1 | Buttons::B2 | Buttons::START);
        let r = compose(&e, 1.0, DEFAULT_TRIGGER_THRESHOLD);
        assert!(r.b);
        assert!(r.a);
        assert!(r.start);
        assert!(!r.x);
    }

    #[test]
    fn compose_applies_socd_to_dpad() {
        let e = pressed(Buttons::LEFT | Buttons::RIGHT);
        let r = compose(&e, 1.0, DEFAULT_TRIGGER_THRESHOLD);
        assert!(!r.left);
        assert!(!r.right);
    }

    #[test]
    fn to_bytes_sets_origin_bit() {
        let bytes = GcReport::neutral().to_bytes();
        assert_eq!(bytes[1] & (1 << 4), 1 << 4);
    }
}
