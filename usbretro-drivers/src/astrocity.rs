//! Sega Astro City mini arcade-stick driver: digital d-pad plus a
//! six-button arcade row, tagged [`Layout::Astrocity`] so console stages
//! that care about physical button position (not label) can tell it apart
//! from a standard Sega 6-button pad.

use usbretro_core::event::{EventType, InputEvent, Transport};
use usbretro_core::{Buttons, Layout};

use crate::common::ReportCache;

const REPORT_LEN: usize = 2;

pub struct AstrocityDriver {
    cache: ReportCache<REPORT_LEN>,
}

impl AstrocityDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
        }
    }
}

impl Default for AstrocityDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for AstrocityDriver {
    fn name(&self) -> &'static str {
        "sega-astrocity"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x0ca3 && pid == 0x0024
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < REPORT_LEN || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.layout = Layout::Astrocity;
        event.button_count = 8;

        let mut b = Buttons::NONE;
        b.set(Buttons::UP, report[0] & 0x01 != 0);
        b.set(Buttons::DOWN, report[0] & 0x02 != 0);
        b.set(Buttons::LEFT, report[0] & 0x04 != 0);
        b.set(Buttons::RIGHT, report[0] & 0x08 != 0);
        b.set(Buttons::B1, report[1] & 0x01 != 0);
        b.set(Buttons::B2, report[1] & 0x02 != 0);
        b.set(Buttons::B3, report[1] & 0x04 != 0);
        b.set(Buttons::L1, report[1] & 0x08 != 0);
        b.set(Buttons::B4, report[1] & 0x10 != 0);
        b.set(Buttons::R1, report[1] & 0x20 != 0);
        b.set(Buttons::START, report[1] & 0x40 != 0);
        b.set(Buttons::SELECT, report[1] & 0x80 != 0); // coin
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
    fn matches_astrocity_pid() {
        let d = AstrocityDriver::new();
        assert!(d.is_device(0x0ca3, 0x0024));
    }

    #[test]
    fn tags_astrocity_layout() {
        let driver = AstrocityDriver::new();
        let report = [0x01u8, 0x40];
        let event = driver.process(1, 0, &report).unwrap();
        assert_eq!(event.layout, Layout::Astrocity);
        assert!(event.buttons.contains(Buttons::START));
    }
}
