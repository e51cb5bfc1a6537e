//! Logitech WingMan gamepad driver. Old-style DirectInput pad: analog
//! sticks plus a throttle wheel on the Z axis, no HID hat switch — the
//! d-pad is four discrete buttons instead.

use usbretro_core::event::{axis, clamp_axis, EventType, InputEvent, Transport};
use usbretro_core::Buttons;

use crate::common::ReportCache;

const REPORT_LEN: usize = 5;

pub struct WingmanDriver {
    cache: ReportCache<REPORT_LEN>,
}

impl WingmanDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
        }
    }
}

impl Default for WingmanDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for WingmanDriver {
    fn name(&self) -> &'static str {
        "logitech-wingman"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x046d && pid == 0xc20a
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
        event.analog[axis::RIGHT_X] = clamp_axis(report[2]); // throttle wheel

        let mut b = Buttons::NONE;
        b.set(Buttons::UP, report[3] & 0x01 != 0);
        b.set(Buttons::DOWN, report[3] & 0x02 != 0);
        b.set(Buttons::LEFT, report[3] & 0x04 != 0);
        b.set(Buttons::RIGHT, report[3] & 0x08 != 0);
        b.set(Buttons::B1, report[4] & 0x01 != 0);
        b.set(Buttons::B2, report[4] & 0x02 != 0);
        b.set(Buttons::B3, report[4] & 0x04 != 0);
        b.set(Buttons::B4, report[4] & 0x08 != 0);
        b.set(Buttons::L1, report[4] & 0x10 != 0);
        b.set(Buttons::R1, report[4] & 0x20 != 0);
        event.buttons = b.socd_normalized();

        Some(event)
    }

    fn unmount(&self, dev_addr: u8, _instance: i8) {
        self.cache.reset(dev_addr);
    }
}
