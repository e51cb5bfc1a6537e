//! Pure, allocation-free console wire-composition stages.
//!
//! Each module here turns the router's canonical [`usbretro_core::event::InputEvent`]
//! state into the exact bytes a vintage console's native port expects.
//! None of these functions touch a peripheral — the PIO/DMA/USB-device
//! glue that feeds them and ships their output lives in
//! `usbretro-firmware`.
//!
//! # Features
//!
//! - `std`: enable standard library support (for testing)
//! - `defmt`: enable defmt formatting for embedded logging

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod gamecube;
pub mod loopy;
pub mod nuon;
pub mod pce;
pub mod threedo;
pub mod xboxone;

/// Runtime-tunable defaults, one instance per firmware binary,
/// replacing the original firmware's `CONFIG_*` compile-time defines
/// for everything that isn't a console-target selection (that part is
/// a Cargo feature, not a runtime value — see `usbretro-firmware`).
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Profile {
    /// GameCube left-stick scale toward center, `0.0..=1.0`.
    pub gc_stick_scale: f32,
    /// GameCube analog-trigger threshold that registers as a digital
    /// L/R click.
    pub gc_trigger_threshold: u8,
    /// Nuon capability bits advertised in the PROBE/config reply.
    pub nuon_capabilities: nuon::Capabilities,
}

impl Profile {
    pub const DEFAULT: Self = Self {
        gc_stick_scale: gamecube::DEFAULT_STICK_SCALE,
        gc_trigger_threshold: gamecube::DEFAULT_TRIGGER_THRESHOLD,
        nuon_capabilities: nuon::Capabilities::DEFAULT,
    };
}

impl Default for Profile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_matches_gamecube_defaults() {
        let p = Profile::default();
        assert_eq!(p.gc_stick_scale, gamecube::DEFAULT_STICK_SCALE);
        assert_eq!(p.gc_trigger_threshold, gamecube::DEFAULT_TRIGGER_THRESHOLD);
    }
}
