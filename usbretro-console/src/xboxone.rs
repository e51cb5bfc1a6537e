//! Xbox One GIP (Game Input Protocol) packet composition.
//!
//! Xbox One is the one target that runs as a USB *device* rather than a
//! wire-level native controller port: `usbretro-firmware`'s device-mode
//! stack (built on `embassy-usb`) enumerates as the vendor class below
//! and exchanges GIP packets over two interrupt endpoints. This module
//! builds those packets; the chunked bulk-transfer framing and the
//! auth-dongle relay (an external collaborator, see [`AuthRelay`]) are
//! this module's pure boundary.

use usbretro_core::event::{axis, InputEvent};
use usbretro_core::Buttons;

pub const VENDOR_ID: u16 = 0x0E6F;
pub const PRODUCT_ID: u16 = 0x02A4;
pub const USB_VERSION: u16 = 0x0101;
pub const VENDOR_CLASS: u8 = 0xFF;
pub const VENDOR_SUBCLASS: u8 = 0x47;
pub const VENDOR_PROTOCOL: u8 = 0xD0;

/// Windows extended-compat-ID string reported for interface 0.
pub const WINDOWS_COMPATIBLE_ID: &str = "XGIP10";

/// Max packet size on both interrupt endpoints.
pub const ENDPOINT_MAX_PACKET: u16 = 64;
pub const POLL_INTERVAL_MS: u8 = 1;

/// Bytes per bulk-transfer chunk when a GIP packet exceeds one packet.
pub const CHUNK_SIZE: usize = 58;

/// GIP command IDs this module produces or forwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GipCommand {
    Announce,
    DeviceDescriptor,
    InputReport,
    Authenticate,
    AuthenticateFinal,
}

impl GipCommand {
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Announce => 0x02,
            Self::DeviceDescriptor => 0x04,
            Self::InputReport => 0x20,
            Self::Authenticate => 0x06,
            Self::AuthenticateFinal => 0x1E,
        }
    }

    /// Decode an incoming command byte from the console's interrupt-OUT
    /// endpoint. `None` for opcodes this device never needs to handle as
    /// a request (e.g. `InputReport`, which this side only ever sends).
    #[must_use]
    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            0x04 => Some(Self::DeviceDescriptor),
            0x06 => Some(Self::Authenticate),
            0x1E => Some(Self::AuthenticateFinal),
            _ => None,
        }
    }
}

/// GIP device descriptor payload, sent in response to a
/// `GipCommand::DeviceDescriptor` request. Identifies this device's
/// capabilities (input, rumble) and firmware/hardware version fields to
/// the console; the byte layout is opaque beyond that to this crate.
pub const DEVICE_DESCRIPTOR: [u8; 202] = [
    0x10, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0xCA, 0x00, 0x8B, 0x00, 0x16, 0x00, 0x1F, 0x00, 0x20, 0x00,
    0x27, 0x00, 0x2D, 0x00, 0x4A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x02, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00,
    0x06, 0x01, 0x02, 0x03, 0x04, 0x06, 0x07, 0x05, 0x01, 0x04, 0x05, 0x06,
    0x0A, 0x01, 0x1A, 0x00, 0x57, 0x69, 0x6E, 0x64, 0x6F, 0x77, 0x73, 0x2E,
    0x58, 0x62, 0x6F, 0x78, 0x2E, 0x49, 0x6E, 0x70, 0x75, 0x74, 0x2E, 0x47,
    0x61, 0x6D, 0x65, 0x70, 0x61, 0x64, 0x04, 0x56, 0xFF, 0x76, 0x97, 0xFD,
    0x9B, 0x81, 0x45, 0xAD, 0x45, 0xB6, 0x45, 0xBB, 0xA5, 0x26, 0xD6, 0x2C,
    0x40, 0x2E, 0x08, 0xDF, 0x07, 0xE1, 0x45, 0xA5, 0xAB, 0xA3, 0x12, 0x7A,
    0xF1, 0x97, 0xB5, 0xE7, 0x1F, 0xF3, 0xB8, 0x86, 0x73, 0xE9, 0x40, 0xA9,
    0xF8, 0x2F, 0x21, 0x26, 0x3A, 0xCF, 0xB7, 0xFE, 0xD2, 0xDD, 0xEC, 0x87,
    0xD3, 0x94, 0x42, 0xBD, 0x96, 0x1A, 0x71, 0x2E, 0x3D, 0xC7, 0x7D, 0x02,
    0x17, 0x00, 0x20, 0x20, 0x00, 0x01, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x17,
    0x00, 0x09, 0x3C, 0x00, 0x01, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// The announce packet sent once immediately after USB enumeration.
#[must_use]
pub fn announce_packet(sequence: u8) -> [u8; 4] {
    [GipCommand::Announce.opcode(), 0x20, sequence, 0x00]
}

/// Canonical gamepad input report: buttons + 4 sticks + 2 triggers,
/// little-endian 16-bit where the real protocol is wider than 8 bits
/// (sticks/triggers are widened from the 8-bit canonical range).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputReport {
    pub buttons: u16,
    pub left_trigger: u16,
    pub right_trigger: u16,
    pub left_x: i16,
    pub left_y: i16,
    pub right_x: i16,
    pub right_y: i16,
}

fn widen_axis(v: u8) -> i16 {
    (i16::from(v) - 128) * 256
}

fn widen_trigger(v: u8) -> u16 {
    u16::from(v) * 256
}

/// Compose a GIP input report from a canonical input event.
#[must_use]
pub fn compose_input_report(event: &InputEvent) -> InputReport {
    let b = event.buttons.socd_normalized();
    let mut buttons = 0u16;
    buttons |= u16::from(b.contains(Buttons::B1)) << 4; // A
    buttons |= u16::from(b.contains(Buttons::B2)) << 5; // B
    buttons |= u16::from(b.contains(Buttons::B3)) << 6; // X
    buttons |= u16::from(b.contains(Buttons::B4)) << 7; // Y
    buttons |= u16::from(b.contains(Buttons::L1)) << 8;
    buttons |= u16::from(b.contains(Buttons::R1)) << 9;
    buttons |= u16::from(b.contains(Buttons::SELECT)) << 2;
    buttons |= u16::from(b.contains(Buttons::START)) << 3;
    buttons |= u16::from(b.contains(Buttons::L3)) << 10;
    buttons |= u16::from(b.contains(Buttons::R3)) << 11;
    buttons |= u16::from(b.contains(Buttons::UP)) << 12;
    buttons |= u16::from(b.contains(Buttons::DOWN)) << 13;
    buttons |= u16::from(b.contains(Buttons::LEFT)) << 14;
    buttons |= u16::from(b.contains(Buttons::RIGHT)) << 15;
    buttons |= u16::from(b.contains(Buttons::A1_HOME));

    InputReport {
        buttons,
        left_trigger: widen_trigger(event.analog[axis::LEFT_TRIGGER]),
        right_trigger: widen_trigger(event.analog[axis::RIGHT_TRIGGER]),
        left_x: widen_axis(event.analog[axis::LEFT_X]),
        left_y: widen_axis(event.analog[axis::LEFT_Y]),
        right_x: widen_axis(event.analog[axis::RIGHT_X]),
        right_y: widen_axis(event.analog[axis::RIGHT_Y]),
    }
}

/// Split a GIP payload into `CHUNK_SIZE`-byte chunks for bulk transfer.
/// The caller ACKs the first chunk and every 5th chunk thereafter (see
/// [`needs_ack`]).
#[must_use]
pub fn chunk_count(payload_len: usize) -> usize {
    payload_len.div_ceil(CHUNK_SIZE)
}

/// Whether chunk index `i` (0-based) requires an ACK before the next
/// chunk is sent.
#[must_use]
pub const fn needs_ack(chunk_index: usize) -> bool {
    chunk_index == 0 || (chunk_index + 1) % 5 == 0
}

/// External collaborator: relays raw authentication bytes to/from an
/// attached Xbox auth dongle over USB host. The GIP layer only needs to
/// know *that* 0x06/0x1E packets get forwarded verbatim and a response
/// comes back — the dongle's own protocol is out of scope here.
pub trait AuthRelay {
    fn forward(&mut self, command: GipCommand, payload: &[u8]) -> Option<heapless::Vec<u8, 64>>;
}

/// Default relay used when no auth dongle is attached: every
/// authentication request is silently dropped.
#[derive(Default)]
pub struct NoAuthRelay;

impl AuthRelay for NoAuthRelay {
    fn forward(&mut self, _command: GipCommand, _payload: &[u8]) -> Option<heapless::Vec<u8, 64>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usbretro_core::event::EventType;

    #[test]
    fn announce_opcode_matches_gip_spec() {
        let pkt = announce_packet(1);
        assert_eq!(pkt[0], 0x02);
    }

    #[test]
    fn compose_sets_a_button_bit() {
        let mut e = InputEvent::neutral(1, 0, EventType::Gamepad);
        e.buttons = Buttons::B1;
        let r = compose_input_report(&e);
        assert_eq!(r.buttons & (1 << 4), 1 << 4);
    }

    #[test]
    fn widen_axis_centers_at_zero() {
        let mut e = InputEvent::neutral(1, 0, EventType::Gamepad);
        e.analog[axis::LEFT_X] = 128;
        let r = compose_input_report(&e);
        assert_eq!(r.left_x, 0);
    }

    #[test]
    fn chunking_rounds_up_and_acks_first_and_every_fifth() {
        assert_eq!(chunk_count(CHUNK_SIZE + 1), 2);
        assert!(needs_ack(0));
        assert!(!needs_ack(1));
        assert!(needs_ack(4));
        assert!(needs_ack(9));
    }

    #[test]
    fn no_auth_relay_drops_everything() {
        let mut relay = NoAuthRelay;
        assert!(relay.forward(GipCommand::Authenticate, &[1, 2, 3]).is_none());
    }

    #[test]
    fn from_opcode_recognizes_incoming_commands() {
        assert_eq!(GipCommand::from_opcode(0x04), Some(GipCommand::DeviceDescriptor));
        assert_eq!(GipCommand::from_opcode(0x06), Some(GipCommand::Authenticate));
        assert_eq!(GipCommand::from_opcode(0x20), None);
    }

    #[test]
    fn device_descriptor_leads_with_its_length_prefix() {
        assert_eq!(DEVICE_DESCRIPTOR[0], 0x10);
        assert_eq!(DEVICE_DESCRIPTOR.len(), 202);
    }
}
