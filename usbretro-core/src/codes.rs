//! Cheat-code detection: a sliding window over button-press edges that
//! recognizes the Konami code and toggles a "fun mode" flag.

use crate::button::Buttons;

const CODE_LENGTH: usize = 10;

/// Konami code as individual directional/face-button presses: up, up,
/// down, down, left, right, left, right, B1, B2.
const KONAMI_CODE: [Buttons; CODE_LENGTH] = [
    Buttons::UP,
    Buttons::UP,
    Buttons::DOWN,
    Buttons::DOWN,
    Buttons::LEFT,
    Buttons::RIGHT,
    Buttons::LEFT,
    Buttons::RIGHT,
    Buttons::B1,
    Buttons::B2,
];

/// Only d-pad and B1/B2 are significant to the detector; other buttons
/// held at the same time don't break a code in progress.
const RELEVANT_MASK: u32 = Buttons::UP.0
    | Buttons::DOWN.0
    | Buttons::LEFT.0
    | Buttons::RIGHT.0
    | Buttons::B1.0
    | Buttons::B2.0;

/// Edge-detecting sliding-window cheat-code recognizer. Fed the router's
/// player-0 output once per console output tick; call [`Self::poll`]
/// after the console stage has consumed that tick's event.
pub struct CheatCodeService {
    buffer: [Buttons; CODE_LENGTH],
    prev_buttons: Buttons,
    is_fun: bool,
    fun_inc: u8,
    fun_player: u8,
}

impl Default for CheatCodeService {
    fn default() -> Self {
        Self::new()
    }
}

impl CheatCodeService {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [Buttons::NONE; CODE_LENGTH],
            prev_buttons: Buttons::NONE,
            is_fun: false,
            fun_inc: 0,
            fun_player: 1,
        }
    }

    #[must_use]
    pub const fn is_fun(&self) -> bool {
        self.is_fun
    }

    #[must_use]
    pub const fn fun_animation(&self) -> u8 {
        self.fun_inc
    }

    #[must_use]
    pub const fn fun_player(&self) -> u8 {
        self.fun_player
    }

    /// Advance the fun-mode animation counter; a no-op when fun mode is
    /// off. Called once per output tick from the main loop.
    pub fn tick_animation(&mut self) {
        if self.is_fun {
            self.fun_inc = self.fun_inc.wrapping_add(1);
        }
    }

    /// Feed one polled button state. Detects the rising edge of a new
    /// single-button press among the relevant mask and shifts it into
    /// the sliding window; toggles `is_fun` on a Konami-code match.
    pub fn poll(&mut self, buttons: Buttons) {
        let current = Buttons(buttons.0 & RELEVANT_MASK);
        let prev = Buttons(self.prev_buttons.0 & RELEVANT_MASK);

        if !current.is_empty() && current != prev {
            let new_presses = Buttons(current.0 & !prev.0);
            if !new_presses.is_empty() {
                self.shift_and_insert(new_presses);
                self.check_konami();
            }
            self.prev_buttons = buttons;
        } else if current.is_empty() && !prev.is_empty() {
            self.prev_buttons = buttons;
        }
    }

    fn shift_and_insert(&mut self, new_value: Buttons) {
        for i in 0..CODE_LENGTH - 1 {
            self.buffer[i] = self.buffer[i + 1];
        }
        self.buffer[CODE_LENGTH - 1] = new_value;
    }

    fn check_konami(&mut self) {
        if self.buffer == KONAMI_CODE {
            self.is_fun = !self.is_fun;
            self.fun_inc = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_full_sequence_toggles_fun_mode() {
        let mut svc = CheatCodeService::new();
        assert!(!svc.is_fun());
        for b in KONAMI_CODE {
            svc.poll(b);
            svc.poll(Buttons::NONE);
        }
        assert!(svc.is_fun());
    }

    #[test]
    fn second_full_entry_toggles_back_off() {
        let mut svc = CheatCodeService::new();
        for _ in 0..2 {
            for b in KONAMI_CODE {
                svc.poll(b);
                svc.poll(Buttons::NONE);
            }
        }
        assert!(!svc.is_fun());
    }

    #[test]
    fn wrong_sequence_never_triggers() {
        let mut svc = CheatCodeService::new();
        let wrong = [
            Buttons::DOWN,
            Buttons::DOWN,
            Buttons::UP,
            Buttons::UP,
            Buttons::LEFT,
            Buttons::RIGHT,
            Buttons::LEFT,
            Buttons::RIGHT,
            Buttons::B1,
            Buttons::B2,
        ];
        for b in wrong {
            svc.poll(b);
            svc.poll(Buttons::NONE);
        }
        assert!(!svc.is_fun());
    }

    #[test]
    fn holding_irrelevant_button_does_not_break_sequence() {
        let mut svc = CheatCodeService::new();
        for b in KONAMI_CODE {
            svc.poll(b | Buttons::START);
            svc.poll(Buttons::NONE);
        }
        assert!(svc.is_fun());
    }

    #[test]
    fn animation_only_advances_while_fun() {
        let mut svc = CheatCodeService::new();
        svc.tick_animation();
        assert_eq!(svc.fun_animation(), 0);
        for b in KONAMI_CODE {
            svc.poll(b);
            svc.poll(Buttons::NONE);
        }
        svc.tick_animation();
        assert_eq!(svc.fun_animation(), 1);
    }
}
