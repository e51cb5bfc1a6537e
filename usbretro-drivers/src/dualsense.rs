//! Sony DualSense driver. Report layout mirrors [`crate::dualshock4`] for
//! sticks/buttons; bytes 9..12 carry IMU data this driver surfaces as
//! motion.

use usbretro_core::event::{axis, clamp_axis, EventType, InputEvent, Transport};
use usbretro_core::hid::decode_hat;
use usbretro_core::Buttons;

use crate::common::ReportCache;

const REPORT_LEN: usize = 15;

pub struct DualSenseDriver {
    cache: ReportCache<REPORT_LEN>,
}

impl DualSenseDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: ReportCache::new(),
        }
    }
}

impl Default for DualSenseDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl usbretro_core::driver::DeviceDriver for DualSenseDriver {
    fn name(&self) -> &'static str {
        "sony-dualsense"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x054c && pid == 0x0ce6
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < REPORT_LEN || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.button_count = 17;

        event.analog[axis::LEFT_X] = clamp_axis(report[0]);
        event.analog[axis::LEFT_Y] = clamp_axis(report[1]);
        event.analog[axis::RIGHT_X] = clamp_axis(report[2]);
        event.analog[axis::RIGHT_Y] = clamp_axis(report[3]);
        event.analog[axis::LEFT_TRIGGER] = report[7];
        event.analog[axis::RIGHT_TRIGGER] = report[8];

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
        b.set(Buttons::L3, report[5] & 0x40 != 0);
        b.set(Buttons::R3, report[5] & 0x80 != 0);
        b.set(Buttons::A1_HOME, report[6] & 0x01 != 0);
        b.set(Buttons::A3_MUTE, report[6] & 0x04 != 0);
        event.buttons = b.socd_normalized();

        event.has_motion = true;
        event.gyro = [
            i16::from_le_bytes([report[9], report[10]]),
            i16::from_le_bytes([report[11], report[12]]),
            i16::from_le_bytes([report[13], report[14]]),
        ];

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
    fn matches_dualsense_pid() {
        let d = DualSenseDriver::new();
        assert!(d.is_device(0x054c, 0x0ce6));
        assert!(!d.is_device(0x054c, 0x05c4));
    }

    #[test]
    fn decodes_gyro_and_mute_button() {
        let driver = DualSenseDriver::new();
        let mut report = [0x80u8; REPORT_LEN];
        report[4] = 0x08;
        report[6] = 0x04;
        report[9..11].copy_from_slice(&100i16.to_le_bytes());
        let event = driver.process(1, 0, &report).unwrap();
        assert!(event.has_motion);
        assert_eq!(event.gyro[0], 100);
        assert!(event.buttons.contains(Buttons::A3_MUTE));
    }
}
