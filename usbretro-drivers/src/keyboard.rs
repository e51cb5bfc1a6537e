//! HID boot-protocol keyboard driver.

use usbretro_core::event::{EventType, InputEvent, Transport};
use usbretro_core::registry::HidProtocol;

use crate::common::ReportCache;

/// Boot-protocol keyboard report: `[modifiers, reserved, key0..key5]`.
const REPORT_LEN: usize = 8;

pub struct KeyboardDriver {
    cache: ReportCache<REPORT_LEN>,
}

impl KeyboardDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
        }
    }

    /// The [`HidProtocol`] this driver claims through the registry's
    /// interface-protocol fallback path.
    #[must_use]
    pub const fn protocol() -> HidProtocol {
        HidProtocol::Keyboard
    }
}

impl Default for KeyboardDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for KeyboardDriver {
    fn name(&self) -> &'static str {
        "hid-keyboard"
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < 2 || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Keyboard);
        event.transport = Transport::Usb;

        let modifiers = report[0];
        let mut keys: u32 = (modifiers as u32) << 24;
        for (i, &code) in report.iter().skip(2).take(4).enumerate() {
            keys |= (code as u32) << (8 * i);
        }
        event.keys = keys;

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
    fn modifiers_land_in_high_byte() {
        let driver = KeyboardDriver::new();
        let report = [0x02, 0x00, 0x04, 0, 0, 0, 0, 0]; // left-shift + 'a'
        let event = driver.process(1, 0, &report).unwrap();
        assert_eq!(event.keys >> 24, 0x02);
        assert_eq!(event.keys & 0xFF, 0x04);
    }

    #[test]
    fn identical_report_is_debounced() {
        let driver = KeyboardDriver::new();
        let pressed = [0, 0, 0x05, 0, 0, 0, 0, 0];
        assert!(driver.process(1, 0, &pressed).is_some());
        assert!(driver.process(1, 0, &pressed).is_none());
    }
}
