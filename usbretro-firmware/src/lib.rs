//! USB-host-to-console-port bridge firmware for RP2040.
//!
//! This crate is the thin `embassy`-based glue layer: it enumerates a USB
//! controller (core0, [`host`]), composes the selected console's wire
//! format from the router's current state using the pure functions in
//! `usbretro-console`, and shifts it out through a PIO state machine
//! running on core1. Exactly one console target is selected per binary by
//! a Cargo feature; all per-console byte-level composition logic lives in
//! `usbretro-console`, not here.
//!
//! # Features
//!
//! - One of `console-pce`, `console-ngc`, `console-loopy`, `console-nuon`,
//!   `console-3do`, `console-xboxone` (exactly one, enforced below).
//! - `uart-mirror`: also serialize player 0's state out a spare UART.
//! - `persist-profile`: flash-backed profile persistence (GameCube only).
//! - `dev-panic` / `prod-panic`: panic handler selection.

#![no_std]

#[cfg(not(any(
    feature = "console-pce",
    feature = "console-ngc",
    feature = "console-loopy",
    feature = "console-nuon",
    feature = "console-3do",
    feature = "console-xboxone",
)))]
compile_error!(
    "usbretro-firmware needs exactly one console-* feature enabled (e.g. console-ngc)"
);

#[cfg(any(
    all(feature = "console-pce", feature = "console-ngc"),
    all(feature = "console-pce", feature = "console-loopy"),
    all(feature = "console-pce", feature = "console-nuon"),
    all(feature = "console-pce", feature = "console-3do"),
    all(feature = "console-pce", feature = "console-xboxone"),
    all(feature = "console-ngc", feature = "console-loopy"),
    all(feature = "console-ngc", feature = "console-nuon"),
    all(feature = "console-ngc", feature = "console-3do"),
    all(feature = "console-ngc", feature = "console-xboxone"),
    all(feature = "console-loopy", feature = "console-nuon"),
    all(feature = "console-loopy", feature = "console-3do"),
    all(feature = "console-loopy", feature = "console-xboxone"),
    all(feature = "console-nuon", feature = "console-3do"),
    all(feature = "console-nuon", feature = "console-xboxone"),
    all(feature = "console-3do", feature = "console-xboxone"),
))]
compile_error!("usbretro-firmware's console-* features are mutually exclusive");

// Xbox One builds dedicate the single USB PHY to device-mode GIP output
// and never spawn the host task, so this module (and the raw USBCTRL_IRQ
// vector it owns) would collide with embassy-usb's own handler there.
#[cfg(not(feature = "console-xboxone"))]
pub mod host;

#[cfg(any(
    feature = "console-pce",
    feature = "console-ngc",
    feature = "console-loopy",
    feature = "console-nuon",
    feature = "console-3do"
))]
pub mod wire_pio;

#[cfg(feature = "console-ngc")]
pub mod joybus;

#[cfg(feature = "console-xboxone")]
pub mod gip_output;

#[cfg(feature = "uart-mirror")]
pub mod uart_mirror;

#[cfg(feature = "persist-profile")]
pub mod profile_store;

pub use usbretro_console::Profile;

/// One router cell per console output stage (`Router<1, PLAYERS>`):
/// every current target drives exactly one native port's worth of
/// players, never the firmware-global table `CFG_TUH_HID` size would
/// suggest.
pub const fn max_players_for_target() -> usize {
    #[cfg(feature = "console-pce")]
    {
        5
    }
    #[cfg(feature = "console-ngc")]
    {
        4
    }
    #[cfg(feature = "console-loopy")]
    {
        4
    }
    #[cfg(feature = "console-nuon")]
    {
        4
    }
    #[cfg(feature = "console-3do")]
    {
        8
    }
    #[cfg(feature = "console-xboxone")]
    {
        1
    }
}
