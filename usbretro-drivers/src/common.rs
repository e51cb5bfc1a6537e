//! Shared plumbing used by several drivers: per-`dev_addr` previous-report
//! caching for debounce, and the canonical neutral-event builder.

use core::cell::RefCell;

use usbretro_core::event::MAX_DEV_ADDR;

/// Player-LED bitmap table, indexed by `player_index + 1` (index 0 is
/// "no player assigned"; index 10 is "more than 5 players", all LEDs
/// lit dim). Matches `hid_app.c`'s `PLAYER_LEDS` table, shared by every
/// driver that has a 4-bit LED ring (DS3, DS4, Switch Pro home LED).
pub const PLAYER_LEDS: [u8; 11] = [
    0x00, 0x01, 0x02, 0x04, 0x08, 0x09, 0x0A, 0x0C, 0x0D, 0x0E, 0x0F,
];

/// Resolves a 0-based player index (as carried in
/// [`usbretro_core::driver::DriverOutputRequest::player_index`]) to its
/// LED bitmap, matching the original `PLAYER_LEDS[player_index+1]`
/// lookup (clamped to the "too many players" entry instead of panicking
/// on out-of-range input).
#[must_use]
pub fn player_led_bitmap(player_index: u8) -> u8 {
    let idx = usize::from(player_index) + 1;
    PLAYER_LEDS[idx.min(PLAYER_LEDS.len() - 1)]
}

/// Caches the last `N` bytes of the most recent report per `dev_addr`, so a
/// driver's `process()` can drop reports that didn't change anything
/// observable (mirrors the original drivers' `memcmp`-against-previous-report
/// debounce).
pub struct ReportCache<const N: usize> {
    prev: RefCell<[[u8; N]; MAX_DEV_ADDR as usize]>,
}

impl<const N: usize> ReportCache<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prev: RefCell::new([[0u8; N]; MAX_DEV_ADDR as usize]),
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

    /// Compares `report`'s first `N` bytes against the cached copy for
    /// `dev_addr`, updates the cache, and returns whether anything changed.
    /// Short reports are zero-padded for the comparison.
    pub fn changed(&self, dev_addr: u8, report: &[u8]) -> bool {
        let mut buf = [0u8; N];
        let n = report.len().min(N);
        buf[..n].copy_from_slice(&report[..n]);

        let mut prev = self.prev.borrow_mut();
        let slot = &mut prev[Self::slot(dev_addr)];
        if *slot == buf {
            false
        } else {
            *slot = buf;
            true
        }
    }

    pub fn reset(&self, dev_addr: u8) {
        self.prev.borrow_mut()[Self::slot(dev_addr)] = [0u8; N];
    }
}

impl<const N: usize> Default for ReportCache<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_report_always_changed() {
        let cache: ReportCache<4> = ReportCache::new();
        assert!(cache.changed(1, &[1, 2, 3, 4]));
    }

    #[test]
    fn identical_report_is_not_changed() {
        let cache: ReportCache<4> = ReportCache::new();
        assert!(cache.changed(1, &[1, 2, 3, 4]));
        assert!(!cache.changed(1, &[1, 2, 3, 4]));
    }

    #[test]
    fn distinct_addresses_cache_independently() {
        let cache: ReportCache<4> = ReportCache::new();
        assert!(cache.changed(1, &[1, 2, 3, 4]));
        assert!(cache.changed(2, &[1, 2, 3, 4]));
    }

    #[test]
    fn reset_forces_next_report_to_be_seen_as_changed() {
        let cache: ReportCache<4> = ReportCache::new();
        assert!(cache.changed(1, &[9, 9, 9, 9]));
        cache.reset(1);
        assert!(cache.changed(1, &[9, 9, 9, 9]));
    }
}
