//! HORI Pokken Tournament controller driver. No right stick or triggers;
//! face buttons and a d-pad only.

use usbretro_core::event::{axis, clamp_axis, EventType, InputEvent, Transport};
use usbretro_core::hid::decode_hat;
use usbretro_core::Buttons;

use crate::common::ReportCache;

const REPORT_LEN: usize = 3;

pub struct PokkenDriver {
    cache: ReportCache<REPORT_LEN>,
}

impl PokkenDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
        }
    }
}

impl Default for PokkenDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for PokkenDriver {
    fn name(&self) -> &'static str {
        "hori-pokken"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x0f0d && pid == 0x0092
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < REPORT_LEN || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.button_count = 10;

        event.analog[axis::LEFT_X] = clamp_axis(report[0]);
        event.analog[axis::LEFT_Y] = clamp_axis(report[1]);

        let mut b = Buttons::NONE;
        let (up, right, down, left) = decode_hat(report[2] & 0x0f);
        b.set(Buttons::UP, up);
        b.set(Buttons::DOWN, down);
        b.set(Buttons::LEFT, left);
        b.set(Buttons::RIGHT, right);
        b.set(Buttons::B1, report[2] & 0x10 != 0);
        b.set(Buttons::B2, report[2] & 0x20 != 0);
        b.set(Buttons::B3, report[2] & 0x40 != 0);
        b.set(Buttons::B4, report[2] & 0x80 != 0);
        event.buttons = b.socd_normalized();

        Some(event)
    }

    fn unmount(&self, dev_addr: u8, _instance: i8) {
        self.cache.reset(dev_addr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usbretro_core::driver::DeviceDriver;

    #[test]
    fn matches_pokken_pid() {
        let d = PokkenDriver::new();
        assert!(d.is_device(0x0f0d, 0x0092));
    }

    #[test]
    fn no_right_stick_or_triggers_in_report() {
        let driver = PokkenDriver::new();
        let mut report = [0x80u8; REPORT_LEN];
        report[2] = 0x08 | 0x10;
        let event = driver.process(1, 0, &report).unwrap();
        assert!(event.buttons.contains(Buttons::B1));
        assert_eq!(event.analog[axis::RIGHT_X], 0x80);
    }
}
