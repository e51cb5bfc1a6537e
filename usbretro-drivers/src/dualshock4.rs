//! Sony DualShock 4 driver.
//!
//! Report layout (input report, report-ID byte already stripped by the
//! host stack): `LX,LY,RX,RY, hat|face, shoulders|share|options|sticks,
//! ps|touchpad|counter, L2analog, R2analog`.

use core::cell::RefCell;

use usbretro_core::driver::{DriverOutputRequest, OutputReport};
use usbretro_core::event::{axis, clamp_axis, EventType, InputEvent, MAX_DEV_ADDR, Transport};
use usbretro_core::hid::decode_hat;
use usbretro_core::Buttons;

use crate::common::ReportCache;

const REPORT_LEN: usize = 9;

/// Lightbar RGB per player slot (`player_index+1`), mirroring
/// `output_sony_ds4`'s `switch(player_index+1)` over `LED_P1_*..LED_P5_*`
/// plus a `LED_DEFAULT_*` entry. The real RGB triples live in a
/// `led_config.h` that isn't present in this pack; these are a
/// plausible standard palette (red/blue/green/purple/lime), not
/// recovered from the original source.
const LIGHTBAR_COLORS: [(u8, u8, u8); 6] = [
    (0x00, 0x00, 0xff), // default: blue
    (0xff, 0x00, 0x00), // P1: red
    (0x00, 0x00, 0xff), // P2: blue
    (0x00, 0xff, 0x00), // P3: green
    (0xff, 0x00, 0xff), // P4: purple
    (0x80, 0xff, 0x00), // P5: lime
];

fn lightbar_for(player_index: u8) -> (u8, u8, u8) {
    let idx = usize::from(player_index) + 1;
    if idx < 1 || idx > 5 {
        LIGHTBAR_COLORS[0]
    } else {
        LIGHTBAR_COLORS[idx]
    }
}

fn slot(dev_addr: u8) -> usize {
    let addr = dev_addr as usize;
    if addr == 0 || addr > MAX_DEV_ADDR as usize {
        0
    } else {
        addr - 1
    }
}

pub struct DualShock4Driver {
    cache: ReportCache<REPORT_LEN>,
    // (rumble_on, player_index) last sent, for debounce (mirrors the
    // original's check against cached `rumble`/`player` fields).
    last_output: RefCell<[Option<(bool, u8)>; MAX_DEV_ADDR as usize]>,
}

impl DualShock4Driver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
            last_output: RefCell::new([None; MAX_DEV_ADDR as usize]),
        }
    }
}

impl Default for DualShock4Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for DualShock4Driver {
    fn name(&self) -> &'static str {
        "sony-ds4"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x054c && matches!(pid, 0x05c4 | 0x09cc)
    }

    fn task(&self, dev_addr: u8, _instance: i8, request: DriverOutputRequest) -> Option<OutputReport> {
        let rumble_on = request.rumble != 0;
        let key = (rumble_on, request.player_index);
        let idx = slot(dev_addr);
        if self.last_output.borrow()[idx] == Some(key) {
            return None;
        }
        self.last_output.borrow_mut()[idx] = Some(key);

        let (red, green, blue) = lightbar_for(request.player_index);
        let (motor_left, motor_right) = if rumble_on { (192, 192) } else { (0, 0) };

        let mut buf = [0u8; 32];
        buf[0] = 0x03; // set_rumble (bit0) | set_led (bit1)
        buf[3] = motor_right;
        buf[4] = motor_left;
        buf[5] = red;
        buf[6] = green;
        buf[7] = blue;

        Some(OutputReport::new(0x05, &buf))
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < REPORT_LEN || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.button_count = 17;

        event.analog[axis::LEFT_X] = clamp_axis(report[0]);
        event.analog[axis::LEFT_Y] = clamp_axis(report[1]);
        event.analog[axis::RIGHT_X] = clamp_axis(report[2]);
        event.analog[axis::RIGHT_Y] = clamp_axis(report[3]);
        event.analog[axis::LEFT_TRIGGER] = report[7];
        event.analog[axis::RIGHT_TRIGGER] = report[8];

        let mut b = Buttons::NONE;
        let (up, right, down, left) = decode_hat(report[4] & 0x0f);
        b.set(Buttons::UP, up);
        b.set(Buttons::DOWN, down);
        b.set(Buttons::LEFT, left);
        b.set(Buttons::RIGHT, right);
        b.set(Buttons::B1, report[4] & 0x40 != 0); // circle
        b.set(Buttons::B2, report[4] & 0x20 != 0); // cross
        b.set(Buttons::B3, report[4] & 0x10 != 0); // square
        b.set(Buttons::B4, report[4] & 0x80 != 0); // triangle
        b.set(Buttons::L1, report[5] & 0x01 != 0);
        b.set(Buttons::R1, report[5] & 0x02 != 0);
        b.set(Buttons::L2, report[5] & 0x04 != 0);
        b.set(Buttons::R2, report[5] & 0x08 != 0);
        b.set(Buttons::SELECT, report[5] & 0x10 != 0); // share
        b.set(Buttons::START, report[5] & 0x20 != 0); // options
        b.set(Buttons::L3, report[5] & 0x40 != 0);
        b.set(Buttons::R3, report[5] & 0x80 != 0);
        b.set(Buttons::A1_HOME, report[6] & 0x01 != 0); // PS button
        event.buttons = b.socd_normalized();

        Some(event)
    }

    fn unmount(&self, dev_addr: u8, _instance: i8) {
        self.cache.reset(dev_addr);
        self.last_output.borrow_mut()[slot(dev_addr)] = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usbretro_core::driver::DeviceDriver;

    #[test]
    fn matches_both_known_pids() {
        let d = DualShock4Driver::new();
        assert!(d.is_device(0x054c, 0x05c4));
        assert!(d.is_device(0x054c, 0x09cc));
        assert!(!d.is_device(0x054c, 0x0268));
    }

    #[test]
    fn decodes_sticks_and_face_buttons() {
        let driver = DualShock4Driver::new();
        let mut report = [0x80u8; REPORT_LEN];
        report[4] = 0x08 | 0x40; // hat=neutral(8), circle pressed
        let event = driver.process(1, 0, &report).unwrap();
        assert!(event.buttons.contains(Buttons::B1));
        assert_eq!(event.analog[axis::LEFT_X], 0x80);
    }

    #[test]
    fn hat_up_sets_up_button() {
        let driver = DualShock4Driver::new();
        let mut report = [0x80u8; REPORT_LEN];
        report[4] = 0x00; // hat up
        let event = driver.process(1, 0, &report).unwrap();
        assert!(event.buttons.contains(Buttons::UP));
    }

    #[test]
    fn task_emits_rumble_and_lightbar() {
        let driver = DualShock4Driver::new();
        let request = DriverOutputRequest {
            player_index: 0,
            rumble: 1,
            ..Default::default()
        };
        let report = driver.task(1, 0, request).unwrap();
        assert_eq!(report.report_id, 0x05);
        let bytes = report.as_slice();
        assert_eq!(bytes[3], 192);
        assert_eq!(bytes[4], 192);
        assert_eq!((bytes[5], bytes[6], bytes[7]), (0xff, 0x00, 0x00));
    }

    #[test]
    fn task_is_debounced_on_unchanged_request() {
        let driver = DualShock4Driver::new();
        let request = DriverOutputRequest {
            player_index: 0,
            rumble: 1,
            ..Default::default()
        };
        assert!(driver.task(1, 0, request).is_some());
        assert!(driver.task(1, 0, request).is_none());
    }
}
