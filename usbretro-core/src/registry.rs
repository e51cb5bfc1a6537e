//! Device registry: dispatch-by-(VID,PID) with a generic-HID fallback.

use crate::driver::DeviceDriver;
use crate::hid::{parse_report_descriptor, ExtractionPlan};

/// Controller type, mirroring `dev_type_t` in the original C
/// `device_registry.h`. `CONTROLLER_TYPE_COUNT` becomes
/// [`DeviceType::COUNT`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceType {
    DualShock3,
    DualShock4,
    DualSense,
    PsClassic,
    EightBitDoBta,
    EightBitDoM30,
    EightBitDoPce,
    HoriPad,
    HoriPokken,
    Wingman,
    Astrocity,
    GameCubeAdapter,
    SwitchPro,
    Dinput,
    Keyboard,
    Mouse,
}

impl DeviceType {
    pub const COUNT: usize = 16;
}

/// HID interface protocol, read from the interface descriptor when no
/// VID/PID driver claims the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HidProtocol {
    None,
    Keyboard,
    Mouse,
}

/// Outcome of [`Registry::dispatch_mount`].
pub enum MountOutcome<'r> {
    /// A VID/PID or protocol match was found.
    Matched {
        device_type: DeviceType,
        driver: &'r dyn DeviceDriver,
    },
    /// No specific driver matched, but the descriptor parsed into a
    /// plan with at least one button — commit as generic DINPUT.
    GenericHid { plan: ExtractionPlan },
    /// No driver matched and the descriptor yielded no buttons.
    Unknown,
}

/// A dense table of registered drivers, indexed by [`DeviceType`].
pub struct Registry<'r> {
    pub entries: [(DeviceType, &'r dyn DeviceDriver); DeviceType::COUNT.min(usize::MAX)],
}

impl<'r> Registry<'r> {
    #[must_use]
    pub const fn new(entries: [(DeviceType, &'r dyn DeviceDriver); DeviceType::COUNT]) -> Self {
        Self { entries }
    }

    /// Implements the five-step mount dispatch from spec §4.B:
    /// 1. iterate registry for a VID/PID match,
    /// 2. fall back to the HID interface protocol (keyboard/mouse),
    /// 3. otherwise walk the descriptor for a generic-HID match,
    /// 4. commit DINPUT only if the resulting plan has >=1 buttons,
    /// 5. else reject as unknown.
    #[must_use]
    pub fn dispatch_mount(
        &self,
        vid: u16,
        pid: u16,
        protocol: HidProtocol,
        descriptor: Option<&[u8]>,
    ) -> MountOutcome<'r> {
        for (device_type, driver) in &self.entries {
            if driver.is_device(vid, pid) {
                return MountOutcome::Matched {
                    device_type: *device_type,
                    driver: *driver,
                };
            }
        }

        match protocol {
            HidProtocol::Keyboard => {
                if let Some((device_type, driver)) = self.find(DeviceType::Keyboard) {
                    return MountOutcome::Matched {
                        device_type,
                        driver,
                    };
                }
            }
            HidProtocol::Mouse => {
                if let Some((device_type, driver)) = self.find(DeviceType::Mouse) {
                    return MountOutcome::Matched {
                        device_type,
                        driver,
                    };
                }
            }
            HidProtocol::None => {}
        }

        if let Some(descriptor) = descriptor {
            let plan = parse_report_descriptor(descriptor);
            if plan.button_count() >= 1 {
                return MountOutcome::GenericHid { plan };
            }
        }

        MountOutcome::Unknown
    }

    fn find(&self, device_type: DeviceType) -> Option<(DeviceType, &'r dyn DeviceDriver)> {
        self.entries
            .iter()
            .find(|(t, _)| *t == device_type)
            .map(|(t, d)| (*t, *d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InputEvent;

    struct AlwaysMatch(u16, u16, &'static str);
    impl DeviceDriver for AlwaysMatch {
        fn name(&self) -> &'static str {
            self.2
        }
        fn is_device(&self, vid: u16, pid: u16) -> bool {
            vid == self.0 && pid == self.1
        }
        fn process(&self, _dev_addr: u8, _instance: i8, _report: &[u8]) -> Option<InputEvent> {
            None
        }
    }

    struct NeverMatch;
    impl DeviceDriver for NeverMatch {
        fn name(&self) -> &'static str {
            "never"
        }
        fn process(&self, _dev_addr: u8, _instance: i8, _report: &[u8]) -> Option<InputEvent> {
            None
        }
    }

    #[test]
    fn vid_pid_match_wins_first() {
        let ds4 = AlwaysMatch(0x054c, 0x09cc, "DS4");
        let never = NeverMatch;
        let entries: [(DeviceType, &dyn DeviceDriver); DeviceType::COUNT] = [
            (DeviceType::DualShock3, &never),
            (DeviceType::DualShock4, &ds4),
            (DeviceType::DualSense, &never),
            (DeviceType::PsClassic, &never),
            (DeviceType::EightBitDoBta, &never),
            (DeviceType::EightBitDoM30, &never),
            (DeviceType::EightBitDoPce, &never),
            (DeviceType::HoriPad, &never),
            (DeviceType::HoriPokken, &never),
            (DeviceType::Wingman, &never),
            (DeviceType::Astrocity, &never),
            (DeviceType::GameCubeAdapter, &never),
            (DeviceType::SwitchPro, &never),
            (DeviceType::Dinput, &never),
            (DeviceType::Keyboard, &never),
            (DeviceType::Mouse, &never),
        ];
        let registry = Registry::new(entries);
        match registry.dispatch_mount(0x054c, 0x09cc, HidProtocol::None, None) {
            MountOutcome::Matched { device_type, .. } => {
                assert_eq!(device_type, DeviceType::DualShock4);
            }
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn unknown_vid_pid_falls_back_to_generic_hid_when_buttons_present() {
        let never = NeverMatch;
        let entries: [(DeviceType, &dyn DeviceDriver); DeviceType::COUNT] = [
            (DeviceType::DualShock3, &never),
            (DeviceType::DualShock4, &never),
            (DeviceType::DualSense, &never),
            (DeviceType::PsClassic, &never),
            (DeviceType::EightBitDoBta, &never),
            (DeviceType::EightBitDoM30, &never),
            (DeviceType::EightBitDoPce, &never),
            (DeviceType::HoriPad, &never),
            (DeviceType::HoriPokken, &never),
            (DeviceType::Wingman, &never),
            (DeviceType::Astrocity, &never),
            (DeviceType::GameCubeAdapter, &never),
            (DeviceType::SwitchPro, &never),
            (DeviceType::Dinput, &never),
            (DeviceType::Keyboard, &never),
            (DeviceType::Mouse, &never),
        ];
        let registry = Registry::new(entries);
        let descriptor: [u8; 16] = [
            0x05, 0x09, // Usage Page (Button)
            0x19, 0x01, // Usage Minimum (1)
            0x29, 0x01, // Usage Maximum (1)
            0x15, 0x00, 0x25, 0x01, 0x75, 0x01, 0x95, 0x01, 0x81, 0x02,
        ];
        match registry.dispatch_mount(0xdead, 0xbeef, HidProtocol::None, Some(&descriptor)) {
            MountOutcome::GenericHid { plan } => assert_eq!(plan.button_count(), 1),
            _ => panic!("expected generic HID fallback"),
        }
    }

    #[test]
    fn no_descriptor_and_no_match_is_unknown() {
        let never = NeverMatch;
        let entries: [(DeviceType, &dyn DeviceDriver); DeviceType::COUNT] = [
            (DeviceType::DualShock3, &never),
            (DeviceType::DualShock4, &never),
            (DeviceType::DualSense, &never),
            (DeviceType::PsClassic, &never),
            (DeviceType::EightBitDoBta, &never),
            (DeviceType::EightBitDoM30, &never),
            (DeviceType::EightBitDoPce, &never),
            (DeviceType::HoriPad, &never),
            (DeviceType::HoriPokken, &never),
            (DeviceType::Wingman, &never),
            (DeviceType::Astrocity, &never),
            (DeviceType::GameCubeAdapter, &never),
            (DeviceType::SwitchPro, &never),
            (DeviceType::Dinput, &never),
            (DeviceType::Keyboard, &never),
            (DeviceType::Mouse, &never),
        ];
        let registry = Registry::new(entries);
        assert!(matches!(
            registry.dispatch_mount(0x1111, 0x2222, HidProtocol::None, None),
            MountOutcome::Unknown
        ));
    }
}
