//! HORI HORIPAD driver: a standard DirectInput-class pad, same frame shape
//! as the DualShock 4 it's designed to sit alongside.

use usbretro_core::event::{axis, clamp_axis, EventType, InputEvent, Transport};
use usbretro_core::hid::decode_hat;
use usbretro_core::Buttons;

use crate::common::ReportCache;

const REPORT_LEN: usize = 6;

pub struct HoriPadDriver {
    cache: ReportCache<REPORT_LEN>,
}

impl HoriPadDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
        }
    }
}

impl Default for HoriPadDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for HoriPadDriver {
    fn name(&self) -> &'static str {
        "hori-horipad"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x0f0d && matches!(pid, 0x0066 | 0x00ee)
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < REPORT_LEN || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.button_count = 14;

        event.analog[axis::LEFT_X] = clamp_axis(report[0]);
        event.analog[axis::LEFT_Y] = clamp_axis(report[1]);
        event.analog[axis::RIGHT_X] = clamp_axis(report[2]);
        event.analog[axis::RIGHT_Y] = clamp_axis(report[3]);

        let mut b = Buttons::NONE;
        let (up, right, down, left) = decode_hat(report[4] & 0x0f);
        b.set(Buttons::UP, up);
        b.set(Buttons::DOWN, down);
        b.set(Buttons::LEFT, left);
        b.set(Buttons::RIGHT, right);
        b.set(Buttons::B1, report[4] & 0x40 != 0);
        b.set(Buttons::B2, report[4] & 0x20 != 0);
        b.set(Buttons::B3, report[4] & 0x10 != 0);
        b.set(Buttons::B4, report[4] & 0x80 != 0);
        b.set(Buttons::L1, report[5] & 0x01 != 0);
        b.set(Buttons::R1, report[5] & 0x02 != 0);
        b.set(Buttons::L2, report[5] & 0x04 != 0);
        b.set(Buttons::R2, report[5] & 0x08 != 0);
        b.set(Buttons::SELECT, report[5] & 0x10 != 0);
        b.set(Buttons::START, report[5] & 0x20 != 0);
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
    fn matches_known_horipad_pids() {
        let d = HoriPadDriver::new();
        assert!(d.is_device(0x0f0d, 0x0066));
        assert!(d.is_device(0x0f0d, 0x00ee));
    }

    #[test]
    fn decodes_shoulder_buttons() {
        let driver = HoriPadDriver::new();
        let mut report = [0x80u8; REPORT_LEN];
        report[4] = 0x08;
        report[5] = 0x01;
        let event = driver.process(1, 0, &report).unwrap();
        assert!(event.buttons.contains(Buttons::L1));
    }
}
