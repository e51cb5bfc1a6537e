//! Official/Mayflash GameCube USB adapter driver.
//!
//! One physical device multiplexes four logical controller ports into a
//! single 37-byte report (`[report_id, port0[9], port1[9], port2[9],
//! port3[9]]`). The USB-host glue above this crate is expected to split
//! that report into four calls to [`process`](DeviceDriver::process), one
//! per port, passing the port index as `instance` (0..=3) so each port
//! lands on its own player slot — these are four controllers, not one
//! device to merge.

use usbretro_core::driver::{DeviceDriver, DriverOutputRequest, OutputReport};
use usbretro_core::event::{axis, clamp_axis, EventType, InputEvent, Transport};
use usbretro_core::Buttons;

use core::cell::RefCell;

/// Bytes per logical port within the adapter's combined report.
pub const PORT_REPORT_LEN: usize = 9;
const PORTS: usize = 4;

/// `GC_CMD_RUMBLE`, the adapter's single command byte for setting all
/// four ports' rumble motors in one report (`gamecube_adapter.c`'s
/// `output_gamecube_adapter`).
const GC_CMD_RUMBLE: u8 = 0x11;

pub struct GameCubeAdapterDriver {
    prev: RefCell<[[u8; PORT_REPORT_LEN]; PORTS]>,
    // Rumble bit per port, and the last 4-port bitmap actually sent, so
    // task() only re-sends when some port's rumble state changed
    // (mirrors the original's single `last_rumble` debounce, widened to
    // per-port since this one device carries four independent players).
    rumble: RefCell<[bool; PORTS]>,
    last_sent: RefCell<Option<[bool; PORTS]>>,
}

impl GameCubeAdapterDriver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prev: RefCell::new([[0u8; PORT_REPORT_LEN]; PORTS]),
            rumble: RefCell::new([false; PORTS]),
            last_sent: RefCell::new(None),
        }
    }
}

impl Default for GameCubeAdapterDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDriver for GameCubeAdapterDriver {
    fn name(&self) -> &'static str {
        "gamecube-adapter"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        vid == 0x057e && pid == 0x0337
    }

    /// `instance` here is the 0..=3 port index, not a true HID instance —
    /// see the module doc comment. Updates this port's rumble bit and
    /// returns the combined 4-port report whenever the overall bitmap
    /// changed; the USB-host glue sends it once per mounted adapter, not
    /// once per port.
    fn task(&self, _dev_addr: u8, instance: i8, request: DriverOutputRequest) -> Option<OutputReport> {
        if !(0..PORTS as i8).contains(&instance) {
            return None;
        }
        self.rumble.borrow_mut()[instance as usize] = request.rumble != 0;

        let current = *self.rumble.borrow();
        if *self.last_sent.borrow() == Some(current) {
            return None;
        }
        *self.last_sent.borrow_mut() = Some(current);

        let mut buf = [0u8; 5];
        buf[0] = GC_CMD_RUMBLE;
        for (i, on) in current.iter().enumerate() {
            buf[i + 1] = u8::from(*on);
        }
        Some(OutputReport::new(GC_CMD_RUMBLE, &buf[1..]))
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if report.len() < PORT_REPORT_LEN || !(0..PORTS as i8).contains(&instance) {
            return None;
        }
        let port = instance as usize;

        let connection_type = report[0] >> 4;
        if connection_type == 0 {
            // Port unplugged: clear its cache so a later plug-in is never
            // debounced against a stale frame.
            self.prev.borrow_mut()[port] = [0u8; PORT_REPORT_LEN];
            return None;
        }

        {
            let mut prev = self.prev.borrow_mut();
            if prev[port][..] == report[..PORT_REPORT_LEN] {
                return None;
            }
            prev[port].copy_from_slice(&report[..PORT_REPORT_LEN]);
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.button_count = 12;

        let mut b = Buttons::NONE;
        b.set(Buttons::START, report[1] & 0x01 != 0);
        b.set(Buttons::UP, report[1] & 0x08 != 0);
        b.set(Buttons::DOWN, report[1] & 0x04 != 0);
        b.set(Buttons::RIGHT, report[1] & 0x02 != 0);
        b.set(Buttons::LEFT, report[1] & 0x10 != 0);
        b.set(Buttons::B1, report[2] & 0x01 != 0); // A
        b.set(Buttons::B2, report[2] & 0x02 != 0); // B
        b.set(Buttons::B3, report[2] & 0x04 != 0); // X
        b.set(Buttons::B4, report[2] & 0x08 != 0); // Y
        b.set(Buttons::L1, report[2] & 0x10 != 0); // Z
        b.set(Buttons::L2, report[2] & 0x20 != 0); // L digital
        b.set(Buttons::R2, report[2] & 0x40 != 0); // R digital
        event.buttons = b.socd_normalized();

        event.analog[axis::LEFT_X] = clamp_axis(report[3]);
        event.analog[axis::LEFT_Y] = clamp_axis(report[4]);
        event.analog[axis::RIGHT_X] = clamp_axis(report[5]);
        event.analog[axis::RIGHT_Y] = clamp_axis(report[6]);
        event.analog[axis::LEFT_TRIGGER] = report[7];
        event.analog[axis::RIGHT_TRIGGER] = report[8];

        Some(event)
    }

    fn unmount(&self, _dev_addr: u8, instance: i8) {
        if (0..PORTS as i8).contains(&instance) {
            self.prev.borrow_mut()[instance as usize] = [0u8; PORT_REPORT_LEN];
            self.rumble.borrow_mut()[instance as usize] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_adapter_pid() {
        let d = GameCubeAdapterDriver::new();
        assert!(d.is_device(0x057e, 0x0337));
    }

    #[test]
    fn unplugged_port_yields_no_event() {
        let driver = GameCubeAdapterDriver::new();
        let report = [0x00u8; PORT_REPORT_LEN];
        assert!(driver.process(1, 0, &report).is_none());
    }

    #[test]
    fn each_port_tracks_its_own_debounce_state() {
        let driver = GameCubeAdapterDriver::new();
        let mut port0 = [0x10u8, 0, 0, 0x80, 0x80, 0x80, 0x80, 0, 0];
        let mut port1 = port0;
        assert!(driver.process(1, 0, &port0).is_some());
        assert!(driver.process(1, 1, &port1).is_some());

        port0[2] = 0x01; // A pressed on port 0 only
        assert!(driver.process(1, 0, &port0).is_some());
        assert!(driver.process(1, 1, &port1).is_none());
        port1[2] = 0x01;
        assert!(driver.process(1, 1, &port1).is_some());
    }

    #[test]
    fn out_of_range_instance_is_rejected() {
        let driver = GameCubeAdapterDriver::new();
        let report = [0x10u8; PORT_REPORT_LEN];
        assert!(driver.process(1, 4, &report).is_none());
    }

    #[test]
    fn task_sets_only_the_requesting_ports_rumble_bit() {
        let driver = GameCubeAdapterDriver::new();
        let request = DriverOutputRequest {
            rumble: 1,
            ..Default::default()
        };
        let report = driver.task(1, 2, request).unwrap();
        let bytes = report.as_slice();
        assert_eq!(bytes, &[0, 0, 1, 0]);
    }

    #[test]
    fn task_is_debounced_on_unchanged_bitmap() {
        let driver = GameCubeAdapterDriver::new();
        let request = DriverOutputRequest {
            rumble: 1,
            ..Default::default()
        };
        assert!(driver.task(1, 0, request).is_some());
        assert!(driver.task(1, 0, request).is_none());
    }

    #[test]
    fn unmount_clears_that_ports_rumble_bit() {
        let driver = GameCubeAdapterDriver::new();
        let request = DriverOutputRequest {
            rumble: 1,
            ..Default::default()
        };
        driver.task(1, 1, request).unwrap();
        driver.unmount(1, 1);
        let report = driver.task(1, 1, DriverOutputRequest::default()).unwrap();
        assert_eq!(report.as_slice(), &[0, 0, 0, 0]);
    }
}
