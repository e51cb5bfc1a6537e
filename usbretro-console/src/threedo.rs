//! 3DO daisy-chain controller report composition.
//!
//! The 3DO shifts a 2-byte digital-pad report per controller, with up
//! to nine controllers chained: each link's PIO state machine clocks
//! its own report out on TX while simultaneously shifting the next
//! link's report in on RX, so the console sees one long concatenated
//! frame. `usbretro-firmware`'s IRQ handler fires every 32 CLK cycles
//! (end of poll), DMAs this module's composed bytes out, and DMAs the
//! downstream passthrough bytes in for the *same* poll — zero-latency,
//! not the one-poll-delayed buffering the original implementation used.

use usbretro_core::event::InputEvent;
use usbretro_core::Buttons;

/// Device-ID field for a standard digital joypad (`id` field, 3 bits).
pub const JOYPAD_ID: u8 = 0b100;

/// Compose one controller's 2-byte digital joypad report.
///
/// Byte 0 (LSB first on the wire): A, left, right, up, down, id[3].
/// Byte 1: tail(2, always 0), L, R, X, P, C, B.
#[must_use]
pub fn compose_joypad(buttons: Buttons) -> [u8; 2] {
    let b = buttons.socd_normalized();
    let mut lsb = 0u8;
    lsb |= u8::from(b.contains(Buttons::B1)); // A
    lsb |= u8::from(b.contains(Buttons::LEFT)) << 1;
    lsb |= u8::from(b.contains(Buttons::RIGHT)) << 2;
    lsb |= u8::from(b.contains(Buttons::UP)) << 3;
    lsb |= u8::from(b.contains(Buttons::DOWN)) << 4;
    lsb |= JOYPAD_ID << 5;

    let mut msb = 0u8; // tail bits stay 0
    msb |= u8::from(b.contains(Buttons::L1)) << 2;
    msb |= u8::from(b.contains(Buttons::R1)) << 3;
    msb |= u8::from(b.contains(Buttons::B3)) << 4; // X
    msb |= u8::from(b.contains(Buttons::START)) << 5; // P (play/pause)
    msb |= u8::from(b.contains(Buttons::B4)) << 6; // C
    msb |= u8::from(b.contains(Buttons::B2)) << 7; // B

    [lsb, msb]
}

/// Compose one player's report from its canonical input event.
#[must_use]
pub fn compose(event: &InputEvent) -> [u8; 2] {
    compose_joypad(event.buttons)
}

/// Concatenate each link's 2-byte report into the single daisy-chain
/// frame the console reads, in chain order (nearest link first).
#[must_use]
pub fn compose_chain<const N: usize>(reports: [[u8; 2]; N]) -> heapless::Vec<u8, 18> {
    let mut frame = heapless::Vec::new();
    for r in reports {
        let _ = frame.push(r[0]);
        let _ = frame.push(r[1]);
    }
    frame
}

/// A same-poll passthrough join: bytes captured from the downstream
/// link's RX during poll N are spliced directly after our own bytes for
/// poll N's TX, rather than buffered for poll N+1.
#[must_use]
pub fn splice_passthrough(own: &[u8], downstream_same_poll: &[u8]) -> heapless::Vec<u8, 18> {
    let mut frame = heapless::Vec::new();
    for &b in own.iter().chain(downstream_same_poll.iter()) {
        if frame.push(b).is_err() {
            break;
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use usbretro_core::event::EventType;

    #[test]
    fn joypad_id_field_is_standard_pad() {
        let [lsb, _] = compose_joypad(Buttons::NONE);
        assert_eq!(lsb >> 5, JOYPAD_ID);
    }

    #[test]
    fn a_button_sets_lsb_bit0() {
        let [lsb, _] = compose_joypad(Buttons::B1);
        assert_eq!(lsb & 1, 1);
    }

    #[test]
    fn b_button_sets_msb_bit7() {
        let [_, msb] = compose_joypad(Buttons::B2);
        assert_eq!(msb & 0x80, 0x80);
    }

    #[test]
    fn tail_bits_always_zero() {
        let [_, msb] = compose_joypad(Buttons::B1 | Buttons::B2 | Buttons::B3 | Buttons::B4);
        assert_eq!(msb & 0b11, 0);
    }

    #[test]
    fn compose_from_event_matches_direct_call() {
        let mut e = InputEvent::neutral(1, 0, EventType::Gamepad);
        e.buttons = Buttons::START;
        assert_eq!(compose(&e), compose_joypad(Buttons::START));
    }

    #[test]
    fn chain_concatenates_in_order() {
        let frame = compose_chain([[0x01, 0x02], [0x03, 0x04]]);
        assert_eq!(&frame[..], &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn passthrough_splice_joins_same_poll_bytes() {
        let frame = splice_passthrough(&[0xAA, 0xBB], &[0xCC]);
        assert_eq!(&frame[..], &[0xAA, 0xBB, 0xCC]);
    }
}
