//! 8BitDo Bluetooth Adapter driver. Reports however the paired pad an
//! 8BitDo BTA is bridging reports, in a DirectInput-shaped 8-byte frame.

use usbretro_core::event::{axis, clamp_axis, EventType, InputEvent, Transport};
use usbretro_core::hid::decode_hat;
use usbretro_core::Buttons;

use crate::common::ReportCache;

const REPORT_LEN: usize = 6;

pub struct BitdoBtaDriver {
    cache: ReportCache<REPORT_LEN>,
}

impl BitdoBtaDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
        }
    }
}

impl Default for BitdoBtaDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for BitdoBtaDriver {
    fn name(&self) -> &'static str {
        "8bitdo-bta"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x2dc8 && pid == 0x3106
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < REPORT_LEN || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.button_count = 12;

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
        b.set(Buttons::B1, report[5] & 0x01 != 0);
        b.set(Buttons::B2, report[5] & 0x02 != 0);
        b.set(Buttons::B3, report[5] & 0x04 != 0);
        b.set(Buttons::B4, report[5] & 0x08 != 0);
        b.set(Buttons::L1, report[5] & 0x10 != 0);
        b.set(Buttons::R1, report[5] & 0x20 != 0);
        b.set(Buttons::SELECT, report[5] & 0x40 != 0);
        b.set(Buttons::START, report[5] & 0x80 != 0);
        event.buttons = b.socd_normalized();

        Some(event)
    }

    fn unmount(&self, dev_addr: u8, _instance: i8) {
        self.cache.reset(dev_addr);
    }
}
