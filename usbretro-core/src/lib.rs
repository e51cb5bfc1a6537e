//! Platform-agnostic canonical input model, HID descriptor parser, device
//! driver trait, and event router for USBRetro.
//!
//! This crate holds everything that does not depend on a specific MCU,
//! USB host stack, or console wire protocol. It can run `no_std` on the
//! target firmware or with `std` on a host for testing.
//!
//! # Features
//!
//! - `std`: Enable standard library support (for testing)
//! - `defmt`: Enable defmt formatting for embedded logging

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod button;
pub mod codes;
pub mod driver;
pub mod event;
pub mod hid;
pub mod player;
pub mod registry;
pub mod router;

pub use button::{Buttons, Layout};
pub use codes::CheatCodeService;
pub use driver::{DeviceDriver, DriverOutputRequest, HandshakeState};
pub use event::{EventType, InputEvent, Transport, MAX_DEV_ADDR, NUM_INSTANCES};
pub use hid::{AxisId, AxisLocation, ExtractionPlan, HatLocation};
pub use player::{PlayerManager, MERGE_INSTANCE};
pub use registry::DeviceType;
pub use router::{OutputTarget, Router};
