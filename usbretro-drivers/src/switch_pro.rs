//! Nintendo Switch Pro Controller driver.
//!
//! The Pro Controller ignores full input reports until it's walked through
//! a baud-rate/handshake/USB-enable/home-LED/full-report sequence. This
//! driver tracks that via [`HandshakeState`] and exposes the next command
//! to send through [`SwitchProDriver::pending_command`]; the USB-host glue
//! sends it and calls [`SwitchProDriver::ack`] once the device responds.

use core::cell::RefCell;

use usbretro_core::driver::{DeviceDriver, DriverOutputRequest, HandshakeState, OutputReport};
use usbretro_core::event::{axis, clamp_axis, EventType, InputEvent, MAX_DEV_ADDR, Transport};
use usbretro_core::hid::decode_hat;
use usbretro_core::Buttons;

use crate::common::ReportCache;

const REPORT_LEN: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchProCommand {
    SetBaudRate,
    Handshake,
    UsbEnable,
    SetHomeLed(u8),
    EnableFullReport,
}

pub struct SwitchProDriver {
    state: RefCell<[HandshakeState; MAX_DEV_ADDR as usize]>,
    pending: RefCell<[Option<SwitchProCommand>; MAX_DEV_ADDR as usize]>,
    cache: ReportCache<REPORT_LEN>,
}

impl SwitchProDriver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefCell::new([HandshakeState::Idle; MAX_DEV_ADDR as usize]),
            pending: RefCell::new(core::array::from_fn(|_| None)),
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

    fn command_for(state: HandshakeState) -> Option<SwitchProCommand> {
        match state {
            HandshakeState::Idle => Some(SwitchProCommand::SetBaudRate),
            HandshakeState::HandshakeSent => Some(SwitchProCommand::Handshake),
            HandshakeState::HandshakeAcked => Some(SwitchProCommand::UsbEnable),
            HandshakeState::UsbEnabled => Some(SwitchProCommand::SetHomeLed(0)),
            HandshakeState::HomeLedSet => Some(SwitchProCommand::EnableFullReport),
            HandshakeState::FullReportEnabled | HandshakeState::Ready => None,
        }
    }

    /// Command the host-side transfer task should send next for this
    /// device, if the handshake isn't complete.
    #[must_use]
    pub fn pending_command(&self, dev_addr: u8) -> Option<SwitchProCommand> {
        self.pending.borrow()[Self::slot(dev_addr)]
    }

    /// Called once the queued command's ack arrives; advances the
    /// handshake and queues the next command, if any.
    pub fn ack(&self, dev_addr: u8) {
        let slot = Self::slot(dev_addr);
        let next_state = self.state.borrow()[slot].advance();
        self.state.borrow_mut()[slot] = next_state;
        self.pending.borrow_mut()[slot] = Self::command_for(next_state);
    }

    #[must_use]
    pub fn is_ready(&self, dev_addr: u8) -> bool {
        self.state.borrow()[Self::slot(dev_addr)] == HandshakeState::Ready
    }
}

impl Default for SwitchProDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDriver for SwitchProDriver {
    fn name(&self) -> &'static str {
        "switch-pro"
    }

    fn is_device(&self, vid: u16, pid: u16) -> bool {
        if vid != 0x057e {
            return false;
        }
        if pid == 0x2009 {
            return true;
        }
        #[cfg(feature = "switch2-experimental")]
        if pid == 0x2066 || pid == 0x2069 {
            // Joy-Con 2 / Switch 2 Pro Controller. Same handshake shape
            // observed over USB; report layout beyond that is unconfirmed.
            return true;
        }
        false
    }

    fn init(&self, dev_addr: u8, _instance: i8) -> bool {
        let slot = Self::slot(dev_addr);
        self.state.borrow_mut()[slot] = HandshakeState::Idle;
        self.pending.borrow_mut()[slot] = Self::command_for(HandshakeState::Idle);
        true
    }

    fn task(&self, dev_addr: u8, _instance: i8, _request: DriverOutputRequest) -> Option<OutputReport> {
        let slot = Self::slot(dev_addr);
        let state = self.state.borrow()[slot];
        if state != HandshakeState::FullReportEnabled && state != HandshakeState::Ready {
            return None;
        }
        // Handshake body is done; the last ack promotes us straight to
        // Ready so process() starts trusting full reports.
        self.state.borrow_mut()[slot] = HandshakeState::Ready;
        None
    }

    fn process(&self, dev_addr: u8, instance: i8, report: &[u8]) -> Option<InputEvent> {
        if !self.is_ready(dev_addr) {
            return None;
        }
        if report.len() < REPORT_LEN || !self.cache.changed(dev_addr, report) {
            return None;
        }

        let mut event = InputEvent::neutral(dev_addr, instance, EventType::Gamepad);
        event.transport = Transport::Usb;
        event.button_count = 18;

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
        b.set(Buttons::B1, report[4] & 0x40 != 0); // A
        b.set(Buttons::B2, report[4] & 0x20 != 0); // B
        b.set(Buttons::B3, report[4] & 0x10 != 0); // Y
        b.set(Buttons::B4, report[4] & 0x80 != 0); // X
        b.set(Buttons::L1, report[5] & 0x01 != 0);
        b.set(Buttons::R1, report[5] & 0x02 != 0);
        b.set(Buttons::L2, report[5] & 0x04 != 0);
        b.set(Buttons::R2, report[5] & 0x08 != 0);
        b.set(Buttons::SELECT, report[5] & 0x10 != 0); // minus
        b.set(Buttons::START, report[5] & 0x20 != 0); // plus
        b.set(Buttons::L3, report[5] & 0x40 != 0);
        b.set(Buttons::R3, report[5] & 0x80 != 0);
        b.set(Buttons::A1_HOME, report[6] & 0x01 != 0);
        b.set(Buttons::A2_CAPTURE, report[6] & 0x02 != 0);
        event.buttons = b.socd_normalized();

        Some(event)
    }

    fn unmount(&self, dev_addr: u8, _instance: i8) {
        let slot = Self::slot(dev_addr);
        self.state.borrow_mut()[slot] = HandshakeState::Idle;
        self.pending.borrow_mut()[slot] = None;
        self.cache.reset(dev_addr);
    }
}
