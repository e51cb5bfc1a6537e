//! Player-slot assignment: maps `(dev_addr, instance)` pairs to a stable
//! player index, independent of mount/unmount order.

use heapless::Vec;

use crate::event::{MAX_DEV_ADDR, NUM_INSTANCES};

/// Upper bound on simultaneously mounted (dev_addr, instance) pairs.
pub const MAX_PLAYERS: usize = (MAX_DEV_ADDR as usize) * (NUM_INSTANCES as usize);

/// Sentinel `instance` meaning "merge this device's events into the root
/// instance's player slot" rather than opening a new one (multi-report
/// devices like the GameCube USB adapter, whose four pads all arrive
/// under instance 0 but are told apart by an in-report index).
pub const MERGE_INSTANCE: i8 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    dev_addr: u8,
    instance: i8,
}

/// Ordered table of mounted (dev_addr, instance) slots; a slot's position
/// in the table is its player index. Slots are appended on first sight
/// and never reordered, so player index stays stable across unrelated
/// mounts/unmounts.
#[derive(Default)]
pub struct PlayerManager {
    slots: Vec<Slot, MAX_PLAYERS>,
}

impl PlayerManager {
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Look up the player index for a `(dev_addr, instance)` pair.
    /// `MERGE_INSTANCE` resolves to instance 0's slot if present.
    #[must_use]
    pub fn find_player_index(&self, dev_addr: u8, instance: i8) -> Option<u8> {
        let lookup_instance = if instance == MERGE_INSTANCE { 0 } else { instance };
        self.slots
            .iter()
            .position(|s| s.dev_addr == dev_addr && s.instance == lookup_instance)
            .map(|i| i as u8)
    }

    /// Assign a player index for a newly mounted `(dev_addr, instance)`
    /// pair, returning the existing index if already assigned. Reuses the
    /// smallest freed slot (left behind by
    /// [`remove_players_by_address`]) before growing the table, so
    /// repeated unplug/replug of the same device never exhausts
    /// `MAX_PLAYERS`. Returns `None` if the table is full and no slot is
    /// free.
    pub fn add_player(&mut self, dev_addr: u8, instance: i8) -> Option<u8> {
        if let Some(idx) = self.find_player_index(dev_addr, instance) {
            return Some(idx);
        }
        let stored_instance = if instance == MERGE_INSTANCE { 0 } else { instance };
        if let Some(free_idx) = self
            .slots
            .iter()
            .position(|s| s.dev_addr == 0 && s.instance == MERGE_INSTANCE)
        {
            self.slots[free_idx] = Slot {
                dev_addr,
                instance: stored_instance,
            };
            return Some(free_idx as u8);
        }
        self.slots
            .push(Slot {
                dev_addr,
                instance: stored_instance,
            })
            .ok()?;
        Some((self.slots.len() - 1) as u8)
    }

    /// Remove every slot belonging to `dev_addr` (called on USB unmount).
    /// Leaves a gap rather than compacting, so surviving slots keep their
    /// player index.
    pub fn remove_players_by_address(&mut self, dev_addr: u8) {
        let mut kept: Vec<Slot, MAX_PLAYERS> = Vec::new();
        for slot in &self.slots {
            if slot.dev_addr != dev_addr {
                let _ = kept.push(*slot);
            }
        }
        // Deliberately not compacted: removing mid-table would reassign
        // every later player's index out from under still-mounted devices.
        for slot in self.slots.iter_mut() {
            if slot.dev_addr == dev_addr {
                slot.dev_addr = 0;
                slot.instance = MERGE_INSTANCE;
            }
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| !(s.dev_addr == 0 && s.instance == MERGE_INSTANCE))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_find_same_slot() {
        let mut pm = PlayerManager::new();
        let idx = pm.add_player(1, 0).unwrap();
        assert_eq!(pm.find_player_index(1, 0), Some(idx));
    }

    #[test]
    fn merge_instance_resolves_to_instance_zero() {
        let mut pm = PlayerManager::new();
        let idx = pm.add_player(3, 0).unwrap();
        assert_eq!(pm.find_player_index(3, MERGE_INSTANCE), Some(idx));
    }

    #[test]
    fn distinct_addresses_get_distinct_indices() {
        let mut pm = PlayerManager::new();
        let a = pm.add_player(1, 0).unwrap();
        let b = pm.add_player(2, 0).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unmount_frees_slot_without_reindexing_others() {
        let mut pm = PlayerManager::new();
        let a = pm.add_player(1, 0).unwrap();
        let b = pm.add_player(2, 0).unwrap();
        pm.remove_players_by_address(1);
        assert_eq!(pm.find_player_index(1, 0), None);
        assert_eq!(pm.find_player_index(2, 0), Some(b));
        assert_ne!(a, b);
    }

    #[test]
    fn readding_same_address_reuses_first_free_semantics() {
        let mut pm = PlayerManager::new();
        pm.add_player(1, 0).unwrap();
        pm.remove_players_by_address(1);
        // Re-mounting reuses the freed slot rather than growing the table.
        let idx = pm.add_player(1, 0).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(pm.find_player_index(1, 0), Some(0));
    }

    #[test]
    fn repeated_replug_does_not_grow_table() {
        let mut pm = PlayerManager::new();
        let a = pm.add_player(5, 0).unwrap();
        for _ in 0..(MAX_PLAYERS * 2) {
            pm.remove_players_by_address(5);
            let idx = pm.add_player(5, 0).unwrap();
            assert_eq!(idx, a);
        }
    }

    #[test]
    fn free_slot_reused_ahead_of_a_later_still_mounted_slot() {
        let mut pm = PlayerManager::new();
        let a = pm.add_player(1, 0).unwrap();
        let b = pm.add_player(2, 0).unwrap();
        pm.remove_players_by_address(1);
        let c = pm.add_player(3, 0).unwrap();
        assert_eq!(c, a);
        assert_eq!(pm.find_player_index(2, 0), Some(b));
    }
}
