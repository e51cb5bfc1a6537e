//! Sony DualShock 3 driver. Needs an enable report written before the
//! controller emits anything but an idle/neutral report — tracked as a
//! one-shot flag rather than the full [`HandshakeState`] machine, since
//! there's only one step.
//!
//! [`HandshakeState`]: usbretro_core::driver::HandshakeState

use core::cell::RefCell;

use usbretro_core::driver::{DriverOutputRequest, OutputReport};
use usbretro_core::event::{axis, clamp_axis, EventType, InputEvent, MAX_DEV_ADDR, Transport};
use usbretro_core::Buttons;

use crate::common::{player_led_bitmap, ReportCache};

const REPORT_LEN: usize = 7;

/// Fixed scaffold for `output_sony_ds3`'s 48-byte (after report ID)
/// output report: rumble fields at [1..5], LED bitmap at [9], four
/// identical 5-byte LED blink-pattern blocks at [10..30]. Byte offsets
/// beyond the rumble fields are reconstructed from the literal
/// initializer in `sony_ds3.c` (`output_sony_ds3`) since the packed
/// struct's header wasn't available to consult directly.
const DS3_REPORT_TEMPLATE: [u8; 48] = {
    let mut buf = [0u8; 48];
    buf[1] = 0x00;
    buf[2] = 0xff; // right_duration (idle default)
    buf[3] = 0x00; // right_motor_on
    buf[4] = 0xff; // left_duration (idle default)
    buf[5] = 0x00; // left_motor_force
    let mut block = 0;
    while block < 4 {
        let base = 10 + block * 5;
        buf[base] = 0xff;
        buf[base + 1] = 0x27;
        buf[base + 2] = 0x10;
        buf[base + 3] = 0x00;
        buf[base + 4] = 0x32;
        block += 1;
    }
    buf
};

pub struct DualShock3Driver {
    cache: ReportCache<REPORT_LEN>,
    // Per-dev_addr, not a single shared flag: the original firmware kept
    // this enable bit in a module static shared across every DS3 plugged
    // in, so a second pad inherited the first one's enabled state.
    enabled: RefCell<[bool; MAX_DEV_ADDR as usize]>,
    // (rumble_on, leds_bitmap) last actually sent, so task() only
    // issues a control transfer when something changed.
    last_output: RefCell<[Option<(bool, u8)>; MAX_DEV_ADDR as usize]>,
}

fn slot(dev_addr: u8) -> usize {
    let addr = dev_addr as usize;
    if addr == 0 || addr > MAX_DEV_ADDR as usize {
        0
    } else {
        addr - 1
    }
}

impl DualShock3Driver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
            enabled: RefCell::new([false; MAX_DEV_ADDR as usize]),
            last_output: RefCell::new([None; MAX_DEV_ADDR as usize]),
        }
    }
}

impl Default for DualShock3Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for DualShock3Driver {
    fn name(&self) -> &'static str {
        "sony-ds3"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x054c && pid == 0x0268
    }

    fn init(&self, dev_addr: u8, _instance: i8) -> bool {
        // The real enable sequence is an HID SET_REPORT(0xF4) control
        // transfer, which lives in the USB-host glue above this crate.
        // This flag just tracks that init() ran so task() doesn't retry.
        self.enabled.borrow_mut()[slot(dev_addr)] = true;
        true
    }

    fn task(&self, dev_addr: u8, _instance: i8, request: DriverOutputRequest) -> Option<OutputReport> {
        if !self.enabled.borrow()[slot(dev_addr)] {
            return None;
        }

        let rumble_on = request.rumble != 0;
        let leds_bitmap = player_led_bitmap(request.player_index) << 1;

        let key = (rumble_on, leds_bitmap);
        let idx = slot(dev_addr);
        if self.last_output.borrow()[idx] == Some(key) {
            return None;
        }
        self.last_output.borrow_mut()[idx] = Some(key);

        let mut buf = DS3_REPORT_TEMPLATE;
        if rumble_on {
            buf[2] = 128; // right_duration
            buf[3] = 1; // right_motor_on
            buf[4] = 128; // left_duration
            buf[5] = 128; // left_motor_force
        }
        buf[9] = leds_bitmap;

        Some(OutputReport::new(0x01, &buf[1..]))
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < REPORT_LEN || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.button_count = 17;

        let mut b = Buttons::NONE;
        b.set(Buttons::UP, report[0] & 0x10 != 0);
        b.set(Buttons::RIGHT, report[0] & 0x20 != 0);
        b.set(Buttons::DOWN, report[0] & 0x40 != 0);
        b.set(Buttons::LEFT, report[0] & 0x80 != 0);
        b.set(Buttons::SELECT, report[0] & 0x01 != 0);
        b.set(Buttons::START, report[0] & 0x08 != 0);
        b.set(Buttons::L3, report[0] & 0x02 != 0);
        b.set(Buttons::R3, report[0] & 0x04 != 0);
        b.set(Buttons::L2, report[1] & 0x01 != 0);
        b.set(Buttons::R2, report[1] & 0x02 != 0);
        b.set(Buttons::L1, report[1] & 0x04 != 0);
        b.set(Buttons::R1, report[1] & 0x08 != 0);
        b.set(Buttons::B4, report[1] & 0x10 != 0); // triangle
        b.set(Buttons::B1, report[1] & 0x20 != 0); // circle
        b.set(Buttons::B2, report[1] & 0x40 != 0); // cross
        b.set(Buttons::B3, report[1] & 0x80 != 0); // square
        b.set(Buttons::A1_HOME, report[2] & 0x01 != 0);
        event.buttons = b.socd_normalized();

        event.analog[axis::LEFT_X] = clamp_axis(report[3]);
        event.analog[axis::LEFT_Y] = clamp_axis(report[4]);
        event.analog[axis::RIGHT_X] = clamp_axis(report[5]);
        event.analog[axis::RIGHT_Y] = clamp_axis(report[6]);

        Some(event)
    }

    fn unmount(&self, dev_addr: u8, _instance: i8) {
        self.cache.reset(dev_addr);
        self.enabled.borrow_mut()[slot(dev_addr)] = false;
        self.last_output.borrow_mut()[slot(dev_addr)] = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usbretro_core::driver::DeviceDriver;

    #[test]
    fn matches_ds3_pid() {
        let d = DualShock3Driver::new();
        assert!(d.is_device(0x054c, 0x0268));
    }

    #[test]
    fn decodes_dpad_and_face() {
        let driver = DualShock3Driver::new();
        let report = [0x10 | 0x08, 0x20, 0, 0x80, 0x80, 0x80, 0x80];
        let event = driver.process(1, 0, &report).unwrap();
        assert!(event.buttons.contains(Buttons::UP));
        assert!(event.buttons.contains(Buttons::START));
        assert!(event.buttons.contains(Buttons::B1));
    }

    #[test]
    fn init_marks_enabled_for_its_own_dev_addr_only() {
        let driver = DualShock3Driver::new();
        assert!(driver.init(1, 0));
        assert!(driver.enabled.borrow()[slot(1)]);
        assert!(!driver.enabled.borrow()[slot(2)]);
    }

    #[test]
    fn task_is_silent_until_init_has_run() {
        let driver = DualShock3Driver::new();
        let request = DriverOutputRequest {
            player_index: 0,
            rumble: 1,
            ..Default::default()
        };
        assert!(driver.task(1, 0, request).is_none());
    }

    #[test]
    fn task_emits_rumble_and_led_bytes_once_enabled() {
        let driver = DualShock3Driver::new();
        driver.init(1, 0);
        let request = DriverOutputRequest {
            player_index: 0,
            rumble: 1,
            ..Default::default()
        };
        let report = driver.task(1, 0, request).unwrap();
        assert_eq!(report.report_id, 0x01);
        let bytes = report.as_slice();
        assert_eq!(bytes[2], 1); // right_motor_on
        assert_eq!(bytes[8], 0x01 << 1); // leds_bitmap for player 0
    }

    #[test]
    fn task_is_debounced_on_unchanged_request() {
        let driver = DualShock3Driver::new();
        driver.init(1, 0);
        let request = DriverOutputRequest {
            player_index: 0,
            rumble: 1,
            ..Default::default()
        };
        assert!(driver.task(1, 0, request).is_some());
        assert!(driver.task(1, 0, request).is_none());
    }
}
