//! HID boot-protocol mouse driver.

use usbretro_core::event::{EventType, InputEvent, Transport};
use usbretro_core::registry::HidProtocol;
use usbretro_core::Buttons;

const REPORT_LEN: usize = 4;

pub struct MouseDriver;

impl MouseDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[must_use]
    pub const fn protocol() -> HidProtocol {
        HidProtocol::Mouse
    }
}

impl Default for MouseDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for MouseDriver {
    fn name(&self) -> &'static str {
        "hid-mouse"
    }

    /// Mouse reports carry relative motion, not absolute state, so unlike
    /// every other driver this one never debounces — a zero-delta,
    /// zero-button report is still meaningful (the pointer stopped).
    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < 3 {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Mouse);
        event.transport = Transport::Usb;

        let buttons = report[0];
        let mut b = Buttons::NONE;
        if buttons & 0x01 != 0 {
            b |= Buttons::B1;
        }
        if buttons & 0x02 != 0 {
            b |= Buttons::B2;
        }
        if buttons & 0x04 != 0 {
            b |= Buttons::B3;
        }
        event.buttons = b;

        event.delta_x = report[1] as i8;
        event.delta_y = report[2] as i8;
        event.delta_wheel = report.get(REPORT_LEN - 1).copied().unwrap_or(0) as i8;

        Some(event)
    }
}
