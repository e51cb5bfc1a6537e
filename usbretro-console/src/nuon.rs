//! Nuon Polyface bus composition.
//!
//! Polyface is an asynchronous, addressable bus: the console issues a
//! 25-bit command (address + sub-address + optional channel byte) and
//! the controller replies with a parity-checked, CRC16-protected data
//! packet. This module builds the reply payloads; the PIO program that
//! shifts bits against the console's clock lives in `usbretro-firmware`.

use crc::{Crc, CRC_16_BUYPASS};
use usbretro_core::event::{axis, InputEvent};
use usbretro_core::Buttons;

/// CRC16 polynomial used for Polyface packet protection: non-reflected,
/// poly 0x8005, zero init — the catalog's BUYPASS variant, matching the
/// bit-banged table the original firmware generates at boot from the
/// same polynomial.
pub const CRC16_POLY: u16 = 0x8005;

const NUON_CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_BUYPASS);

/// Milliseconds Nuon+Start+L+R must be held to trigger a soft reset.
pub const SOFT_RESET_HOLD_MS: u32 = 2000;

/// Controller capability bits advertised in the PROBE/config reply.
/// Named after the console's `CTRLR_*` constants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities(pub u32);

impl Capabilities {
    pub const ANALOG1: Self = Self(1 << 0);
    pub const ANALOG2: Self = Self(1 << 1);
    pub const STDBUTTONS: Self = Self(1 << 2);
    pub const DPAD: Self = Self(1 << 3);
    pub const SHOULDER: Self = Self(1 << 4);
    pub const EXTBUTTONS: Self = Self(1 << 5);

    /// Default profile for a standard analog gamepad: sticks, d-pad,
    /// shoulders, and the extended face-button set.
    ///
    /// TODO: the bit assignment above matches the commented-out profile
    /// table in the original firmware, but no capability reply has been
    /// confirmed against real Nuon hardware — a port should re-derive
    /// this once real hardware is available instead of trusting it.
    pub const DEFAULT: Self = Self(
        Self::ANALOG1.0
            | Self::STDBUTTONS.0
            | Self::DPAD.0
            | Self::SHOULDER.0
            | Self::EXTBUTTONS.0,
    );
}

/// Nuon's native button bit positions within the 16-bit switch word.
pub mod bit {
    pub const UP: u16 = 0x0200;
    pub const DOWN: u16 = 0x0800;
    pub const LEFT: u16 = 0x0400;
    pub const RIGHT: u16 = 0x0100;
    pub const A: u16 = 0x4000;
    pub const B: u16 = 0x0008;
    pub const L: u16 = 0x0020;
    pub const R: u16 = 0x0010;
    pub const C_UP: u16 = 0x0002;
    pub const C_DOWN: u16 = 0x8000;
    pub const C_LEFT: u16 = 0x0004;
    pub const C_RIGHT: u16 = 0x0001;
    pub const START: u16 = 0x2000;
    pub const NUON: u16 = 0x1000;
}

/// Compose the 16-bit `SWITCH` word from canonical buttons.
#[must_use]
pub fn compose_switch_word(buttons: Buttons) -> u16 {
    let b = buttons.socd_normalized();
    let mut w = 0u16;
    w |= u16::from(b.contains(Buttons::UP)) * bit::UP;
    w |= u16::from(b.contains(Buttons::DOWN)) * bit::DOWN;
    w |= u16::from(b.contains(Buttons::LEFT)) * bit::LEFT;
    w |= u16::from(b.contains(Buttons::RIGHT)) * bit::RIGHT;
    w |= u16::from(b.contains(Buttons::B1)) * bit::A;
    w |= u16::from(b.contains(Buttons::B2)) * bit::B;
    w |= u16::from(b.contains(Buttons::L1)) * bit::L;
    w |= u16::from(b.contains(Buttons::R1)) * bit::R;
    w |= u16::from(b.contains(Buttons::B4)) * bit::C_UP;
    w |= u16::from(b.contains(Buttons::B3)) * bit::C_DOWN;
    w |= u16::from(b.contains(Buttons::L2)) * bit::C_LEFT;
    w |= u16::from(b.contains(Buttons::R2)) * bit::C_RIGHT;
    w |= u16::from(b.contains(Buttons::START)) * bit::START;
    w |= u16::from(b.contains(Buttons::A1_HOME)) * bit::NUON;
    w
}

/// Even-parity bit over a 32-bit word, matching the console's
/// bus-framing parity check.
#[must_use]
pub const fn even_parity(data: u32) -> u8 {
    let mut p = (data >> 16) ^ data;
    p ^= p >> 8;
    p ^= p >> 4;
    p ^= p >> 2;
    p ^= p >> 1;
    (p & 1) as u8
}

/// Append the parity bit to a word's LSB position (matches the
/// `word | eparity(word)` pattern used before the bit-reversal shift
/// onto the bus).
#[must_use]
pub const fn with_parity(word: u32) -> u32 {
    word | u32::from(even_parity(word))
}

/// CRC16 over a full packet payload.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    NUON_CRC16.checksum(data)
}

/// Holds the most recently observed analog channel select (`ATOD_CHANNEL_*`)
/// and resolves it against a player's event to the single byte the
/// console's next `ANALOG` read expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogChannel {
    None,
    X1,
    Y1,
    X2,
    Y2,
}

#[must_use]
pub fn analog_channel_value(channel: AnalogChannel, event: &InputEvent) -> u8 {
    match channel {
        AnalogChannel::None => 0,
        AnalogChannel::X1 => event.analog[axis::LEFT_X],
        AnalogChannel::Y1 => event.analog[axis::LEFT_Y],
        AnalogChannel::X2 => event.analog[axis::RIGHT_X],
        AnalogChannel::Y2 => event.analog[axis::RIGHT_Y],
    }
}

/// True once Nuon+Start+L+R has been continuously held for
/// [`SOFT_RESET_HOLD_MS`].
#[must_use]
pub fn soft_reset_due(buttons: Buttons, held_ms: u32) -> bool {
    let combo = Buttons(bit::NUON as u32) | Buttons::START | Buttons::L1 | Buttons::R1;
    buttons.contains(combo) && held_ms >= SOFT_RESET_HOLD_MS
}

/// Assemble a full Polyface data-read reply: the parity-framed switch
/// word, the currently-selected analog channel's byte, and a trailing
/// big-endian CRC16 over both — the reply the console's `ANALOG`/`DATA`
/// command expects after a `compose_switch_word`/`analog_channel_value`
/// pair has been computed for the addressed controller.
#[must_use]
pub fn compose_reply_packet(buttons: Buttons, analog_byte: u8) -> heapless::Vec<u8, 8> {
    let framed = with_parity(u32::from(compose_switch_word(buttons)));
    let mut packet: heapless::Vec<u8, 8> = heapless::Vec::new();
    let _ = packet.push((framed >> 8) as u8);
    let _ = packet.push(framed as u8);
    let _ = packet.push(analog_byte);
    let crc = crc16(&packet);
    let _ = packet.push((crc >> 8) as u8);
    let _ = packet.push(crc as u8);
    packet
}

#[cfg(test)]
mod tests {
    use super::*;
    use usbretro_core::event::EventType;

    #[test]
    fn switch_word_sets_expected_bits() {
        let w = compose_switch_word(Buttons::UP | Buttons::B1);
        assert_eq!(w & bit::UP, bit::UP);
        assert_eq!(w & bit::A, bit::A);
        assert_eq!(w & bit::B, 0);
    }

    #[test]
    fn even_parity_of_zero_is_zero() {
        assert_eq!(even_parity(0), 0);
    }

    #[test]
    fn even_parity_of_one_bit_is_one() {
        assert_eq!(even_parity(1), 1);
    }

    #[test]
    fn crc16_is_deterministic_and_order_sensitive() {
        let a = crc16(&[0x01, 0x02, 0x03]);
        let b = crc16(&[0x03, 0x02, 0x01]);
        assert_ne!(a, b);
        assert_eq!(a, crc16(&[0x01, 0x02, 0x03]));
    }

    #[test]
    fn analog_channel_reads_correct_axis() {
        let mut e = InputEvent::neutral(1, 0, EventType::Gamepad);
        e.analog[axis::LEFT_X] = 200;
        assert_eq!(analog_channel_value(AnalogChannel::X1, &e), 200);
        assert_eq!(analog_channel_value(AnalogChannel::None, &e), 0);
    }

    #[test]
    fn soft_reset_requires_full_hold_duration() {
        let combo =
            Buttons(bit::NUON as u32) | Buttons::START | Buttons::L1 | Buttons::R1;
        assert!(!soft_reset_due(combo, SOFT_RESET_HOLD_MS - 1));
        assert!(soft_reset_due(combo, SOFT_RESET_HOLD_MS));
    }

    #[test]
    fn reply_packet_is_five_bytes_ending_in_its_own_crc() {
        let packet = compose_reply_packet(Buttons::UP, 0x80);
        assert_eq!(packet.len(), 5);
        let crc = crc16(&packet[..3]);
        assert_eq!(packet[3], (crc >> 8) as u8);
        assert_eq!(packet[4], crc as u8);
    }

    #[test]
    fn default_capability_profile_advertises_sticks_and_dpad() {
        let caps = Capabilities::DEFAULT;
        assert!(caps.0 & Capabilities::ANALOG1.0 != 0);
        assert!(caps.0 & Capabilities::DPAD.0 != 0);
    }
}
