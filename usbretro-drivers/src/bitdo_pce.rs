//! 8BitDo PCE (PC Engine-style) pad driver. Two face buttons plus shoulder
//! turbo switches, mapped straight onto the canonical layout.

use usbretro_core::event::{EventType, InputEvent, Transport};
use usbretro_core::hid::decode_hat;
use usbretro_core::Buttons;

use crate::common::ReportCache;

const REPORT_LEN: usize = 3;

pub struct BitdoPceDriver {
    cache: ReportCache<REPORT_LEN>,
}

impl BitdoPceDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
        }
    }
}

impl Default for BitdoPceDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for BitdoPceDriver {
    fn name(&self) -> &'static str {
        "8bitdo-pce"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x2dc8 && pid == 0x5006
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < REPORT_LEN || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.button_count = 6;

        let mut b = Buttons::NONE;
        let (up, right, down, left) = decode_hat(report[0] & 0x0f);
        b.set(Buttons::UP, up);
        b.set(Buttons::DOWN, down);
        b.set(Buttons::LEFT, left);
        b.set(Buttons::RIGHT, right);
        b.set(Buttons::B1, report[1] & 0x01 != 0); // II
        b.set(Buttons::B2, report[1] & 0x02 != 0); // I
        b.set(Buttons::SELECT, report[1] & 0x04 != 0);
        b.set(Buttons::START, report[1] & 0x08 != 0); // Run
        b.set(Buttons::L1, report[2] & 0x01 != 0); // turbo toggle left
        b.set(Buttons::R1, report[2] & 0x02 != 0); // turbo toggle right
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
    fn matches_pce_pid() {
        let d = BitdoPceDriver::new();
        assert!(d.is_device(0x2dc8, 0x5006));
    }

    #[test]
    fn decodes_run_and_select() {
        let driver = BitdoPceDriver::new();
        let report = [0x08u8, 0x0c, 0x00];
        let event = driver.process(1, 0, &report).unwrap();
        assert!(event.buttons.contains(Buttons::SELECT));
        assert!(event.buttons.contains(Buttons::START));
    }
}
