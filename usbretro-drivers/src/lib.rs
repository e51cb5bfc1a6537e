//! Concrete per-device HID drivers and the registry wiring that ties them
//! to [`usbretro_core::registry::Registry`].
//!
//! # Features
//!
//! - `std`: enable standard library support (for testing)
//! - `defmt`: enable defmt formatting for embedded logging

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod astrocity;
pub mod bitdo_bta;
pub mod bitdo_m30;
pub mod bitdo_pce;
mod common;
pub mod dualsense;
pub mod dualshock3;
pub mod dualshock4;
pub mod gamecube_adapter;
pub mod generic_hid;
pub mod horipad;
pub mod keyboard;
pub mod mouse;
pub mod pokken;
pub mod ps_classic;
pub mod switch_pro;
pub mod wingman;

pub use common::ReportCache;

use usbretro_core::driver::DeviceDriver;
use usbretro_core::registry::{DeviceType, Registry};

/// Owns one instance of every concrete driver. Lives for the program's
/// whole run (never dropped on embedded targets), so [`AllDrivers::registry`]
/// can hand out a [`Registry`] borrowing straight from its fields instead
/// of needing `'static` trait objects.
pub struct AllDrivers {
    pub dualshock3: dualshock3::DualShock3Driver,
    pub dualshock4: dualshock4::DualShock4Driver,
    pub dualsense: dualsense::DualSenseDriver,
    pub ps_classic: ps_classic::PsClassicDriver,
    pub bitdo_bta: bitdo_bta::BitdoBtaDriver,
    pub bitdo_m30: bitdo_m30::BitdoM30Driver,
    pub bitdo_pce: bitdo_pce::BitdoPceDriver,
    pub horipad: horipad::HoriPadDriver,
    pub pokken: pokken::PokkenDriver,
    pub wingman: wingman::WingmanDriver,
    pub astrocity: astrocity::AstrocityDriver,
    pub gamecube_adapter: gamecube_adapter::GameCubeAdapterDriver,
    pub switch_pro: switch_pro::SwitchProDriver,
    pub generic_hid: generic_hid::GenericHidDriver,
    pub keyboard: keyboard::KeyboardDriver,
    pub mouse: mouse::MouseDriver,
}

impl AllDrivers {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dualshock3: dualshock3::DualShock3Driver::new(),
            dualshock4: dualshock4::DualShock4Driver::new(),
            dualsense: dualsense::DualSenseDriver::new(),
            ps_classic: ps_classic::PsClassicDriver::new(),
            bitdo_bta: bitdo_bta::BitdoBtaDriver::new(),
            bitdo_m30: bitdo_m30::BitdoM30Driver::new(),
            bitdo_pce: bitdo_pce::BitdoPceDriver::new(),
            horipad: horipad::HoriPadDriver::new(),
            pokken: pokken::PokkenDriver::new(),
            wingman: wingman::WingmanDriver::new(),
            astrocity: astrocity::AstrocityDriver::new(),
            gamecube_adapter: gamecube_adapter::GameCubeAdapterDriver::new(),
            switch_pro: switch_pro::SwitchProDriver::new(),
            generic_hid: generic_hid::GenericHidDriver::new(),
            keyboard: keyboard::KeyboardDriver::new(),
            mouse: mouse::MouseDriver::new(),
        }
    }

    /// Builds a [`Registry`] over every driver. `Dinput` pairs with
    /// [`generic_hid`](Self::generic_hid), which never matches by VID/PID
    /// and is only reachable through the registry's descriptor-walk
    /// fallback.
    #[must_use]
    pub fn registry(&self) -> Registry<'_> {
        let entries: [(DeviceType, &dyn DeviceDriver); DeviceType::COUNT] = [
            (DeviceType::DualShock3, &self.dualshock3),
            (DeviceType::DualShock4, &self.dualshock4),
            (DeviceType::DualSense, &self.dualsense),
            (DeviceType::PsClassic, &self.ps_classic),
            (DeviceType::EightBitDoBta, &self.bitdo_bta),
            (DeviceType::EightBitDoM30, &self.bitdo_m30),
            (DeviceType::EightBitDoPce, &self.bitdo_pce),
            (DeviceType::HoriPad, &self.horipad),
            (DeviceType::HoriPokken, &self.pokken),
            (DeviceType::Wingman, &self.wingman),
            (DeviceType::Astrocity, &self.astrocity),
            (DeviceType::GameCubeAdapter, &self.gamecube_adapter),
            (DeviceType::SwitchPro, &self.switch_pro),
            (DeviceType::Dinput, &self.generic_hid),
            (DeviceType::Keyboard, &self.keyboard),
            (DeviceType::Mouse, &self.mouse),
        ];
        Registry::new(entries)
    }
}

impl Default for AllDrivers {
    fn default() -> Self {
        Self::new()
    }
}
