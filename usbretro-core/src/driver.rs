//! Device driver trait: the Rust expression of the C `DeviceInterface`
//! vtable (§3, §9 Design Notes — trait objects replace function-pointer
//! structs).

use crate::event::InputEvent;

/// Handshake state machine for devices that need one before they'll
/// accept full-report output (PS3 enable, Switch Pro baud/handshake/
/// USB-enable/full-report/home-LED). Drivers that need no handshake
/// start and stay at `Ready`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeState {
    #[default]
    Idle,
    HandshakeSent,
    HandshakeAcked,
    UsbEnabled,
    HomeLedSet,
    FullReportEnabled,
    Ready,
}

impl HandshakeState {
    /// Advance to the next state in the canonical sequence. Devices that
    /// skip steps (e.g. no home LED) may jump directly to `Ready` from
    /// their driver's `task()`.
    #[must_use]
    pub fn advance(self) -> Self {
        match self {
            Self::Idle => Self::HandshakeSent,
            Self::HandshakeSent => Self::HandshakeAcked,
            Self::HandshakeAcked => Self::UsbEnabled,
            Self::UsbEnabled => Self::HomeLedSet,
            Self::HomeLedSet => Self::FullReportEnabled,
            Self::FullReportEnabled | Self::Ready => Self::Ready,
        }
    }
}

/// Aggregated per-device requested output state, composed by the main
/// loop from the router's current per-player outputs and handed to a
/// driver's `task()` at most once per outbound tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverOutputRequest {
    pub player_index: u8,
    pub rumble: u8,
    pub leds: u8,
    /// Adaptive-trigger threshold (DualSense); 0 for devices without one.
    pub adaptive_trigger: u8,
    /// Test/fun-mode animation counter, driven by the cheat-code service.
    pub fun_animation: u8,
}

/// Largest driver output report payload in this registry: the DS3's
/// rumble/LED/blink-pattern report (`sony_ds3.c`'s `output_sony_ds3`),
/// 48 bytes after the report-ID byte is split off.
const MAX_OUTPUT_REPORT_LEN: usize = 48;

/// A fixed-capacity HID output report a driver's `task()` wants written
/// back to its device: a `SET_REPORT`/interrupt-OUT payload (rumble
/// motor, player LED, adaptive trigger), the way `tuh_hid_send_report`
/// is called from the original `output_*` functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputReport {
    pub report_id: u8,
    len: u8,
    data: [u8; MAX_OUTPUT_REPORT_LEN],
}

impl OutputReport {
    /// Builds a report, truncating `bytes` to the payload capacity
    /// (every known driver report fits within that).
    #[must_use]
    pub fn new(report_id: u8, bytes: &[u8]) -> Self {
        let mut data = [0u8; MAX_OUTPUT_REPORT_LEN];
        let len = bytes.len().min(data.len());
        data[..len].copy_from_slice(&bytes[..len]);
        Self {
            report_id,
            len: len as u8,
            data,
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

/// Per-`(dev_addr, instance)` device driver. A `NULL` vtable entry in the
/// original C becomes simply not registering a [`DeviceDriver`] for that
/// device type; every method here has a default no-op so a driver only
/// implements what it needs.
pub trait DeviceDriver {
    /// Human-readable name, used only for diagnostics.
    fn name(&self) -> &'static str;

    /// VID/PID match. Drivers that only match by descriptor (generic
    /// HID) return `false` unconditionally.
    fn is_device(&self, _vid: u16, _pid: u16) -> bool {
        false
    }

    /// Decode one vendor report into a canonical event. Called from the
    /// USB host receive callback (IRQ-ish context); must not block or
    /// allocate. Returns `None` when the report didn't change observable
    /// state versus the driver's cached previous report (debounce), or
    /// when the report is malformed (dropped silently per §7).
    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent>;

    /// Step this device's outbound state (rumble/LED/handshake). Called
    /// at most once per outbound tick; throttling/debounce is the
    /// driver's responsibility. Returns the output report to write to
    /// the device over USB, if this tick produced one (debounced-away
    /// or handshake-only ticks return `None`).
    fn task(&self, _dev_addr: u8, _instance: i8, _request: DriverOutputRequest) -> Option<OutputReport> {
        None
    }

    /// Called once after the registry commits this driver for a newly
    /// mounted device. Returning `false` does not disable the driver —
    /// subsequent `task()` calls may retry a failed handshake.
    fn init(&self, _dev_addr: u8, _instance: i8) -> bool {
        true
    }

    /// Called on USB unmount; resets per-instance state.
    fn unmount(&self, _dev_addr: u8, _instance: i8) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_report_truncates_to_capacity() {
        let bytes = [0xAAu8; MAX_OUTPUT_REPORT_LEN + 5];
        let report = OutputReport::new(0x05, &bytes);
        assert_eq!(report.as_slice().len(), MAX_OUTPUT_REPORT_LEN);
    }

    #[test]
    fn output_report_keeps_short_payload_exact() {
        let report = OutputReport::new(0x11, &[1, 2, 3, 4, 5]);
        assert_eq!(report.as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(report.report_id, 0x11);
    }
}
