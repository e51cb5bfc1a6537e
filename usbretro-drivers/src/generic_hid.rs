//! Generic HID ("DINPUT") driver: decodes whatever [`ExtractionPlan`] the
//! registry built from a device's report descriptor at mount time. Never
//! matches by VID/PID — it only exists to handle [`MountOutcome::GenericHid`].
//!
//! [`MountOutcome::GenericHid`]: usbretro_core::registry::MountOutcome::GenericHid

use core::cell::RefCell;

use usbretro_core::driver::DeviceDriver;
use usbretro_core::event::{axis, EventType, InputEvent, Transport, MAX_DEV_ADDR};
use usbretro_core::hid::{AxisId, ExtractionPlan};

use crate::common::ReportCache;

pub struct GenericHidDriver {
    plans: RefCell<[Option<ExtractionPlan>; MAX_DEV_ADDR as usize]>,
    cache: ReportCache<32>,
}

impl GenericHidDriver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            plans: RefCell::new(core::array::from_fn(|_| None)),
            cache: ReportCache::new(),
        }
    }

    fn slot(dev_addr: u8) -> usize {
        let addr = dev_addr as usize;
        if addr == 0 || addr > MAX_DEV_ADDR as usize {
            0
        } else {
            addr - 1
        }
    }

    /// Installs the extraction plan the registry produced for this
    /// `dev_addr` at mount time. Must be called before the first
    /// `process()` for that address.
    pub fn set_plan(&self, dev_addr: u8, plan: ExtractionPlan) {
        self.plans.borrow_mut()[Self::slot(dev_addr)] = Some(plan);
    }
}

impl Default for GenericHidDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDriver for GenericHidDriver {
    fn name(&self) -> &'static str {
        "generic-hid"
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if !self.cache.changed(dev_addr, report) {
            return None;
        }
        let plans = self.plans.borrow();
        let plan = plans[Self::slot(dev_addr)].as_ref()?;

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.button_count = plan.button_count() as u8;

        if let Some(x) = plan.read_axis(AxisId::X, report) {
            event.analog[axis::LEFT_X] = x;
        }
        if let Some(y) = plan.read_axis(AxisId::Y, report) {
            event.analog[axis::LEFT_Y] = y;
        }
        if let Some(rx) = plan.read_axis(AxisId::Rx, report) {
            event.analog[axis::RIGHT_X] = rx;
        }
        if let Some(ry) = plan.read_axis(AxisId::Ry, report) {
            event.analog[axis::RIGHT_Y] = ry;
        }
        if let Some(z) = plan.read_axis(AxisId::Z, report) {
            event.analog[axis::LEFT_TRIGGER] = z;
        }
        if let Some(rz) = plan.read_axis(AxisId::Rz, report) {
            event.analog[axis::RIGHT_TRIGGER] = rz;
        }
        event.clamp_sticks();

        let (up, right, down, left) = plan.read_hat(report);
        let mut buttons = usbretro_core::Buttons(plan.read_buttons(report));
        if up {
            buttons |= usbretro_core::Buttons::UP;
        }
        if down {
            buttons |= usbretro_core::Buttons::DOWN;
        }
        if left {
            buttons |= usbretro_core::Buttons::LEFT;
        }
        if right {
            buttons |= usbretro_core::Buttons::RIGHT;
        }
        event.buttons = buttons.socd_normalized();

        Some(event)
    }

    fn unmount(&self, dev_addr: u8, _instance: i8) {
        self.plans.borrow_mut()[Self::slot(dev_addr)] = None;
        self.cache.reset(dev_addr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usbretro_core::hid::parse_report_descriptor;

    fn gamepad_descriptor() -> std::vec::Vec<u8> {
        std::vec![
            0x05, 0x01, 0x09, 0x05, 0xA1, 0x01, 0x09, 0x30, 0x09, 0x31, 0x15, 0x00, 0x25, 0xFF,
            0x75, 0x08, 0x95, 0x02, 0x81, 0x02, 0x05, 0x09, 0x19, 0x01, 0x29, 0x04, 0x15, 0x00,
            0x25, 0x01, 0x75, 0x01, 0x95, 0x04, 0x81, 0x02, 0xC0,
        ]
    }

    #[test]
    fn decodes_axes_and_buttons_from_installed_plan() {
        let driver = GenericHidDriver::new();
        let plan = parse_report_descriptor(&gamepad_descriptor());
        driver.set_plan(1, plan);

        let report = [0xFFu8, 0x00, 0b0000_0001];
        let event = driver.process(1, 0, &report).expect("changed report");
        assert_eq!(event.analog[axis::LEFT_X], 255);
        assert!(event.buttons.contains(usbretro_core::Buttons::B1));
    }

    #[test]
    fn no_plan_means_no_event() {
        let driver = GenericHidDriver::new();
        assert!(driver.process(2, 0, &[0, 0, 0]).is_none());
    }

    #[test]
    fn identical_report_is_debounced() {
        let driver = GenericHidDriver::new();
        let plan = parse_report_descriptor(&gamepad_descriptor());
        driver.set_plan(1, plan);
        let report = [0x80u8, 0x80, 0];
        assert!(driver.process(1, 0, &report).is_some());
        assert!(driver.process(1, 0, &report).is_none());
    }
}
