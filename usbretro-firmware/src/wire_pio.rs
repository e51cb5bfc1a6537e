//! PIO glue shared by the console targets that speak a console-clocked
//! parallel or shift-register bus rather than GameCube's Joybus framing
//! (which gets its own program in [`crate::joybus`]): PC-Engine, Loopy,
//! Nuon, and 3DO all boil down to "wait for the console's select/clock
//! edge, then shift our composed byte(s) out (and, for 3DO, a downstream
//! byte in) before the console samples again."
//!
//! The PIO program here is a from-scratch adaptation of the general shape
//! `other_examples`'s `rukai-joybus-pio-rs` crate uses for GameCube (an
//! autopush read loop paired with a 9-bit-framed write loop) to a simpler
//! one-word request/reply pattern, since no direct PIO prior art exists
//! for these four consoles in the example pack.

use embassy_rp::pio::{
    Common, Config, Direction, Instance, PioPin, ShiftConfig, ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use fixed::types::U24F8;

/// Number of PIO clock cycles dedicated to sampling one bit. Chosen so
/// the `250_000`-ish divisor used by every target here (well within the
/// slowest console bus, Nuon's ~62.5 kHz Polyface clock) comes out to a
/// whole-ish `StateMachine` clock divider.
const CYCLES_PER_BIT: u32 = 10;

/// A console-clocked parallel or shift bus: the console asserts a
/// select/clock line, we respond by presenting (or shifting out) the
/// byte(s) the wire-composition stage most recently produced.
pub struct WireBusPio<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
}

impl<'d, PIO: Instance, const SM: usize> WireBusPio<'d, PIO, SM> {
    /// Builds and starts a state machine that:
    /// 1. waits for the select/clock pin to go low (console drives it
    ///    active-low at the start of a bus cycle),
    /// 2. pulls one byte from the TX FIFO and shifts its 8 bits out on the
    ///    data pin one at a time, counted down in `x`,
    /// 3. waits for the line to return high before wrapping back to 1.
    ///
    /// This is the PCE/Loopy/Nuon shape; 3DO's DMA-driven daisy chain
    /// uses the same program with its state machine's RX side wired to
    /// the downstream link instead of being left unused.
    pub fn new(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        select_pin: Peri<'d, impl PioPin>,
        data_pin: Peri<'d, impl PioPin>,
        sys_clock_hz: u32,
    ) -> Self {
        let select_pin = common.make_pio_pin(select_pin);
        let data_pin = common.make_pio_pin(data_pin);

        let mut a: pio::Assembler<32> = pio::Assembler::new();
        let mut wrap_target = a.label();
        let mut shift_loop = a.label();
        let mut wrap_source = a.label();

        a.bind(&mut wrap_target);
        a.wait(0, pio::WaitSource::PIN, 0, false);
        a.pull(false, true);
        a.set(pio::SetDestination::X, 7);
        a.bind(&mut shift_loop);
        a.out(pio::OutDestination::PINS, 1);
        a.jmp(pio::JmpCondition::XDecNonZero, &mut shift_loop);
        a.bind(&mut wrap_source);
        a.wait(1, pio::WaitSource::PIN, 0, false);

        let program = a.assemble_with_wrap(wrap_source, wrap_target);
        let loaded = common.load_program(&program);

        let mut cfg = Config::default();
        cfg.use_program(&loaded, &[]);
        cfg.set_out_pins(&[&data_pin]);
        cfg.set_in_pins(&[&select_pin]);
        cfg.shift_out = ShiftConfig {
            auto_fill: true,
            direction: ShiftDirection::Right,
            threshold: 8,
        };
        let bitrate = 1_000_000u32 / CYCLES_PER_BIT;
        cfg.clock_divider = U24F8::from_num(sys_clock_hz / (CYCLES_PER_BIT * bitrate)).max(U24F8::from_num(1));

        sm.set_config(&cfg);
        sm.set_pin_dirs(Direction::Out, &[&data_pin]);
        sm.set_pin_dirs(Direction::In, &[&select_pin]);
        sm.set_enable(true);

        Self { sm }
    }

    /// Push one freshly composed byte for the next bus cycle to consume.
    /// Non-blocking: if the FIFO is still full from a prior write that
    /// the console hasn't yet clocked out, the stale byte is replaced —
    /// matching the "stale word tolerated, next scan corrects" fault
    /// model.
    pub fn push(&mut self, byte: u8) {
        self.sm.tx().push(u32::from(byte));
    }

    /// Push a multi-byte frame (3DO's chained joypad reports, Nuon's
    /// CRC-terminated reply packet) in wire order. Each byte still goes
    /// through the same one-byte-per-bus-cycle FIFO path as [`push`];
    /// this only saves callers from looping, it doesn't add any
    /// cycle-accurate pacing beyond what the FIFO already provides.
    pub fn push_many(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }
}
