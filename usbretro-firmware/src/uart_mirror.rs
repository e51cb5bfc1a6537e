//! Optional secondary output target: mirrors player 0's composed state
//! out a spare UART using `usbretro-uart-proto`'s text protocol. Gated
//! behind the `uart-mirror` feature — when off, the router still only
//! ever has one output target (`OutputTarget::Primary`); when on, the
//! main task also spawns [`mirror_task`] against `OutputTarget::UartDebug`.

use embassy_rp::uart::{Error as UartError, UartTx};
use usbretro_core::event::{axis, InputEvent};
use usbretro_uart_proto::{AnalogStick, Buttons as MirrorButtons, GamepadState, MessageBuilder};

/// Downscale the canonical 8-bit clamped axis range to the mirror
/// protocol's signed i16 range, centering 0x80 at zero.
fn widen(axis_byte: u8) -> i16 {
    (i16::from(axis_byte) - 0x80) * 256
}

/// Project a canonical event onto the mirror protocol's smaller button
/// set and wider analog range. Buttons outside the mirror's 14-bit set
/// (e.g. L3/R3, the extra face buttons) are dropped — this target is a
/// debug convenience, not a faithful wire reproduction.
#[must_use]
pub fn to_mirror_state(event: &InputEvent) -> GamepadState {
    let b = event.buttons.socd_normalized();
    let mut buttons = MirrorButtons::NONE;
    if b.contains(usbretro_core::Buttons::B1) {
        buttons |= MirrorButtons::A;
    }
    if b.contains(usbretro_core::Buttons::B2) {
        buttons |= MirrorButtons::B;
    }
    if b.contains(usbretro_core::Buttons::B3) {
        buttons |= MirrorButtons::X;
    }
    if b.contains(usbretro_core::Buttons::B4) {
        buttons |= MirrorButtons::Y;
    }
    if b.contains(usbretro_core::Buttons::L1) {
        buttons |= MirrorButtons::L;
    }
    if b.contains(usbretro_core::Buttons::R1) {
        buttons |= MirrorButtons::R;
    }
    if b.contains(usbretro_core::Buttons::L2) {
        buttons |= MirrorButtons::L2;
    }
    if b.contains(usbretro_core::Buttons::R2) {
        buttons |= MirrorButtons::R2;
    }
    if b.contains(usbretro_core::Buttons::SELECT) {
        buttons |= MirrorButtons::SELECT;
    }
    if b.contains(usbretro_core::Buttons::START) {
        buttons |= MirrorButtons::START;
    }
    if b.contains(usbretro_core::Buttons::UP) {
        buttons |= MirrorButtons::UP;
    }
    if b.contains(usbretro_core::Buttons::DOWN) {
        buttons |= MirrorButtons::DOWN;
    }
    if b.contains(usbretro_core::Buttons::LEFT) {
        buttons |= MirrorButtons::LEFT;
    }
    if b.contains(usbretro_core::Buttons::RIGHT) {
        buttons |= MirrorButtons::RIGHT;
    }

    GamepadState {
        buttons,
        left_stick: AnalogStick::new(widen(event.analog[axis::LEFT_X]), widen(event.analog[axis::LEFT_Y])),
        right_stick: AnalogStick::new(widen(event.analog[axis::RIGHT_X]), widen(event.analog[axis::RIGHT_Y])),
        left_trigger: event.analog[axis::LEFT_TRIGGER],
        right_trigger: event.analog[axis::RIGHT_TRIGGER],
    }
}

/// Core0 task: serializes the most recent player-0 event onto `tx`
/// whenever the router's primary output stage advances. Mirrors the
/// teacher project's UART bridge, inverted from input to output.
#[embassy_executor::task]
pub async fn mirror_task(
    mut tx: UartTx<'static, embassy_rp::peripherals::UART1>,
    latest: &'static embassy_sync::signal::Signal<
        embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex,
        InputEvent,
    >,
) {
    let mut buf = [0u8; 64];
    loop {
        let event = latest.wait().await;
        let state = to_mirror_state(&event);
        match MessageBuilder::full_state()
            .buttons(state.buttons)
            .left_stick(state.left_stick.x, state.left_stick.y)
            .right_stick(state.right_stick.x, state.right_stick.y)
            .left_trigger(state.left_trigger)
            .right_trigger(state.right_trigger)
            .serialize(&mut buf)
        {
            Ok(len) => {
                let _: Result<(), UartError> = tx.write(&buf[..len]).await;
            }
            Err(e) => {
                defmt::warn!("uart mirror serialize failed: {:?}", defmt::Debug2Format(&e));
            }
        }
    }
}
