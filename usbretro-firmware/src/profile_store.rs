//! Flash-backed profile persistence (`console-ngc` + `persist-profile`
//! only). Present because `examples/original_source`'s GameCube target
//! carries it; explicitly secondary per spec.md §6 ("not part of the
//! core"), so it is entirely feature-gated and touches nothing else.

use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use usbretro_console::Profile;

/// One 256-byte flash sector reserved for the persisted profile record,
/// placed near the end of the 2 MiB W25Q16 most RP2040 boards carry.
const FLASH_SIZE: usize = 2 * 1024 * 1024;
const PROFILE_OFFSET: u32 = (FLASH_SIZE - 4096) as u32;

/// Debounce window: a profile change is written back only after this
/// long with no further change, avoiding flash wear from rapid toggling.
pub const FLUSH_IDLE_MS: u64 = 2_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PersistedProfile {
    pub default_profile_index: u8,
    pub adaptive_trigger_threshold: u8,
    pub left_stick_scale_pct: u8,
}

impl PersistedProfile {
    const MAGIC: u8 = 0xB5;

    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            default_profile_index: 0,
            adaptive_trigger_threshold: profile.gc_trigger_threshold,
            left_stick_scale_pct: (profile.gc_stick_scale * 100.0) as u8,
        }
    }

    fn to_bytes(self) -> [u8; 4] {
        [
            Self::MAGIC,
            self.default_profile_index,
            self.adaptive_trigger_threshold,
            self.left_stick_scale_pct,
        ]
    }

    fn from_bytes(bytes: [u8; 4]) -> Option<Self> {
        if bytes[0] != Self::MAGIC {
            return None;
        }
        Some(Self {
            default_profile_index: bytes[1],
            adaptive_trigger_threshold: bytes[2],
            left_stick_scale_pct: bytes[3],
        })
    }
}

/// Debounced writer: call [`ProfileStore::note_change`] whenever a
/// profile field changes, and [`ProfileStore::tick`] once per main-loop
/// pass. The actual flash write only happens once `tick` observes
/// [`FLUSH_IDLE_MS`] of quiet since the last `note_change`.
pub struct ProfileStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    pending: Option<PersistedProfile>,
    idle_since: Option<embassy_time::Instant>,
}

impl<'d> ProfileStore<'d> {
    pub fn new(flash: Flash<'d, FLASH, Async, FLASH_SIZE>) -> Self {
        Self {
            flash,
            pending: None,
            idle_since: None,
        }
    }

    #[must_use]
    pub fn load(&mut self) -> Option<PersistedProfile> {
        let mut buf = [0u8; 4];
        self.flash.blocking_read(PROFILE_OFFSET, &mut buf).ok()?;
        PersistedProfile::from_bytes(buf)
    }

    pub fn note_change(&mut self, profile: PersistedProfile) {
        self.pending = Some(profile);
        self.idle_since = Some(embassy_time::Instant::now());
    }

    pub async fn tick(&mut self) {
        let Some(since) = self.idle_since else {
            return;
        };
        if since.elapsed().as_millis() < FLUSH_IDLE_MS {
            return;
        }
        if let Some(pending) = self.pending.take() {
            let bytes = pending.to_bytes();
            let _ = self.flash.erase(PROFILE_OFFSET, PROFILE_OFFSET + 4096).await;
            let _ = self.flash.write(PROFILE_OFFSET, &bytes).await;
        }
        self.idle_since = None;
    }
}
