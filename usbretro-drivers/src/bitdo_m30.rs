//! 8BitDo M30 driver: a 6-button Sega Genesis-style pad, so its face
//! buttons keep the physical Sega layout ([`Layout::Sega6Button`]) rather
//! than the default label mapping.

use usbretro_core::event::{axis, clamp_axis, EventType, InputEvent, Transport};
use usbretro_core::hid::decode_hat;
use usbretro_core::{Buttons, Layout};

use crate::common::ReportCache;

const REPORT_LEN: usize = 5;

pub struct BitdoM30Driver {
    cache: ReportCache<REPORT_LEN>,
}

impl BitdoM30Driver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
        }
    }
}

impl Default for BitdoM30Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for BitdoM30Driver {
    fn name(&self) -> &'static str {
        "8bitdo-m30"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x2dc8 && pid == 0x6101
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < REPORT_LEN || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.layout = Layout::Sega6Button;
        event.button_count = 8;

        event.analog[axis::LEFT_X] = clamp_axis(report[0]);
        event.analog[axis::LEFT_Y] = clamp_axis(report[1]);

        let mut b = Buttons::NONE;
        let (up, right, down, left) = decode_hat(report[2] & 0x0f);
        b.set(Buttons::UP, up);
        b.set(Buttons::DOWN, down);
        b.set(Buttons::LEFT, left);
        b.set(Buttons::RIGHT, right);
        // A/B/C/X/Y/Z in physical row order, Start as the system button.
        b.set(Buttons::B1, report[3] & 0x01 != 0); // A
        b.set(Buttons::B2, report[3] & 0x02 != 0); // B
        b.set(Buttons::B3, report[3] & 0x04 != 0); // C
        b.set(Buttons::L1, report[3] & 0x08 != 0); // X
        b.set(Buttons::B4, report[3] & 0x10 != 0); // Y
        b.set(Buttons::R1, report[3] & 0x20 != 0); // Z
        b.set(Buttons::START, report[4] & 0x01 != 0);
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
    fn matches_m30_pid() {
        let d = BitdoM30Driver::new();
        assert!(d.is_device(0x2dc8, 0x6101));
    }

    #[test]
    fn layout_is_sega_six_button() {
        let driver = BitdoM30Driver::new();
        let mut report = [0x80u8; REPORT_LEN];
        report[2] = 0x08;
        let event = driver.process(1, 0, &report).unwrap();
        assert_eq!(event.layout, Layout::Sega6Button);
    }
}
