//! Sony PlayStation Classic controller driver.
//!
//! Unlike the other Sony pads, its report encodes buttons active-low (a
//! clear bit means pressed). This driver inverts at decode time so nothing
//! downstream ever has to know that.

use usbretro_core::event::{EventType, InputEvent, Transport};
use usbretro_core::Buttons;

use crate::common::ReportCache;

const REPORT_LEN: usize = 2;

pub struct PsClassicDriver {
    cache: ReportCache<REPORT_LEN>,
}

impl PsClassicDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
        }
    }
}

impl Default for PsClassicDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for PsClassicDriver {
    fn name(&self) -> &'static str {
        "sony-ps-classic"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x054c && pid == 0x0cda
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < REPORT_LEN || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.button_count = 12;

        let lo = !report[0];
        let hi = !report[1];
        let mut b = Buttons::NONE;
        b.set(Buttons::UP, lo & 0x10 != 0);
        b.set(Buttons::RIGHT, lo & 0x20 != 0);
        b.set(Buttons::DOWN, lo & 0x40 != 0);
        b.set(Buttons::LEFT, lo & 0x80 != 0);
        b.set(Buttons::SELECT, lo & 0x01 != 0);
        b.set(Buttons::START, lo & 0x08 != 0);
        b.set(Buttons::L1, hi & 0x04 != 0);
        b.set(Buttons::R1, hi & 0x08 != 0);
        b.set(Buttons::B4, hi & 0x10 != 0); // triangle
        b.set(Buttons::B1, hi & 0x20 != 0); // circle
        b.set(Buttons::B2, hi & 0x40 != 0); // cross
        b.set(Buttons::B3, hi & 0x80 != 0); // square
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
    fn matches_ps_classic_pid() {
        let d = PsClassicDriver::new();
        assert!(d.is_device(0x054c, 0x0cda));
    }

    #[test]
    fn active_low_bits_decode_to_active_high_buttons() {
        let driver = PsClassicDriver::new();
        // Idle report: every bit set (nothing pressed).
        let idle = [0xFFu8, 0xFF];
        let event = driver.process(1, 0, &idle).unwrap();
        assert!(event.buttons.is_empty());

        // Clear the up-dpad bit: pressed.
        let pressed = [0xFFu8 & !0x10, 0xFF];
        let event = driver.process(1, 0, &pressed).unwrap();
        assert!(event.buttons.contains(Buttons::UP));
    }
}
