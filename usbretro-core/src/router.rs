//! Router: ingress/egress of canonical events across output targets and
//! player slots, supporting 1:1, N:1 merge, 1:N broadcast, and
//! configurable N:M routing over the same slot-cell primitive.

use crate::event::InputEvent;
use crate::player::{PlayerManager, MERGE_INSTANCE};

/// Which output consumer a routed event cell belongs to. Most firmware
/// builds only ever populate `Primary`; `UartDebug` exists for the
/// optional debug-mirror secondary target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputTarget {
    Primary,
    UartDebug,
}

/// A per-(output_target, player) most-recent-event cell.
#[derive(Clone, Copy)]
struct Cell {
    event: Option<InputEvent>,
}

impl Default for Cell {
    fn default() -> Self {
        Self { event: None }
    }
}

/// Routing table entry for the configurable N:M mode: an input slot
/// feeding a specific output target maps to a specific output slot
/// rather than its own player index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub input_slot: u8,
    pub target: OutputTargetIndex,
    pub output_slot: u8,
}

/// Index into the router's fixed `TARGETS` output-target array.
pub type OutputTargetIndex = usize;

/// Generic router over `TARGETS` output targets and `PLAYERS` player
/// slots. Each console binary instantiates only the cells it needs
/// (PC-Engine: `Router<1, 5>`; GameCube: `Router<1, 4>`) instead of a
/// single global `MAX_PLAYERS`-sized table.
pub struct Router<const TARGETS: usize, const PLAYERS: usize> {
    cells: [[Cell; PLAYERS]; TARGETS],
    players: PlayerManager,
    /// Broadcast flag: when set, every target's cell for a player index
    /// receives the same event (1:N). When clear, only `Primary`'s cell
    /// (index 0) is written by default ingress.
    broadcast: bool,
    /// Optional N:M routing overrides; empty unless configured.
    routes: heapless::Vec<RouteEntry, 16>,
}

impl<const TARGETS: usize, const PLAYERS: usize> Router<TARGETS, PLAYERS> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: [[Cell::default(); PLAYERS]; TARGETS],
            players: PlayerManager::new(),
            broadcast: false,
            routes: heapless::Vec::new(),
        }
    }

    /// Enable 1:N broadcast mode: a single player's most recent event
    /// becomes visible at every output target.
    pub fn set_broadcast(&mut self, broadcast: bool) {
        self.broadcast = broadcast;
    }

    /// Install a static N:M route. Overrides the default 1:1 output-slot
    /// assignment for that `(input_slot, target)` pair.
    pub fn add_route(&mut self, route: RouteEntry) {
        let _ = self.routes.push(route);
    }

    fn resolve_output_slot(&self, input_slot: u8, target: OutputTargetIndex) -> usize {
        for route in &self.routes {
            if route.input_slot == input_slot && route.target == target {
                return route.output_slot as usize;
            }
        }
        input_slot as usize
    }

    fn has_route_for(&self, input_slot: u8, target: OutputTargetIndex) -> bool {
        self.routes
            .iter()
            .any(|r| r.input_slot == input_slot && r.target == target)
    }

    /// Ingress: `O(1)` lookup of `(dev_addr, instance)` into a player
    /// slot (allocating the smallest free slot on first sight), then
    /// writes the event into the appropriate cell(s), most-recent-
    /// writer-wins. `instance == MERGE_INSTANCE` ORs the new buttons
    /// into the existing event at that slot rather than replacing it
    /// wholesale (Joy-Con charging-grip merge).
    pub fn submit_input(&mut self, event: InputEvent) -> Option<u8> {
        let player_index = self.players.add_player(event.dev_addr, event.instance)?;
        if (player_index as usize) >= PLAYERS {
            return None;
        }

        let merged = if event.instance == MERGE_INSTANCE {
            self.merge_into(player_index, event)
        } else {
            event
        };

        for target in 0..TARGETS {
            // Primary always gets the write; auxiliary targets only
            // participate under broadcast mode or an explicit N:M route.
            let writes = target == 0 || self.broadcast || self.has_route_for(player_index, target);
            if !writes {
                continue;
            }
            let slot = self.resolve_output_slot(player_index, target);
            if slot < PLAYERS {
                self.cells[target][slot].event = Some(merged);
            }
        }

        Some(player_index)
    }

    /// Merge an auxiliary event's buttons/analog into the root
    /// instance's existing cell-0 event, preferring the auxiliary's
    /// non-neutral analog values where the root's are neutral.
    fn merge_into(&self, player_index: u8, incoming: InputEvent) -> InputEvent {
        let Some(existing) = self.cells[0][player_index as usize].event else {
            return incoming;
        };
        let mut merged = existing;
        merged.buttons |= incoming.buttons;
        for i in 0..merged.analog.len() {
            if incoming.analog[i] != 0x80 && incoming.analog[i] != 0x00 {
                merged.analog[i] = incoming.analog[i];
            }
        }
        merged
    }

    /// Egress: the latest event stored for `(target, player)`, or
    /// `None` if nothing has been submitted for that cell yet.
    #[must_use]
    pub fn get_output(&self, target: OutputTargetIndex, player: u8) -> Option<&InputEvent> {
        self.cells.get(target)?.get(player as usize)?.event.as_ref()
    }

    pub fn remove_players_by_address(&mut self, dev_addr: u8) {
        self.players.remove_players_by_address(dev_addr);
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }
}

impl<const TARGETS: usize, const PLAYERS: usize> Default for Router<TARGETS, PLAYERS> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;

    fn sample(dev_addr: u8, instance: i8) -> InputEvent {
        InputEvent::neutral(dev_addr, instance, EventType::Gamepad)
    }

    #[test]
    fn simple_1to1_round_trips() {
        let mut router: Router<1, 2> = Router::new();
        let mut e = sample(1, 0);
        e.buttons = crate::button::Buttons::B1;
        router.submit_input(e);
        let out = router.get_output(0, 0).unwrap();
        assert!(out.buttons.contains(crate::button::Buttons::B1));
    }

    #[test]
    fn merge_n_to_1_ors_buttons() {
        let mut router: Router<1, 2> = Router::new();
        let mut root = sample(1, 0);
        root.buttons = crate::button::Buttons::B1;
        router.submit_input(root);

        let mut aux = sample(1, -1);
        aux.buttons = crate::button::Buttons::B2;
        router.submit_input(aux);

        let out = router.get_output(0, 0).unwrap();
        assert!(out.buttons.contains(crate::button::Buttons::B1));
        assert!(out.buttons.contains(crate::button::Buttons::B2));
    }

    #[test]
    fn broadcast_1_to_n_visible_at_every_target() {
        let mut router: Router<2, 2> = Router::new();
        router.set_broadcast(true);
        let mut e = sample(1, 0);
        e.buttons = crate::button::Buttons::START;
        router.submit_input(e);
        assert!(router.get_output(0, 0).unwrap().buttons.contains(crate::button::Buttons::START));
        assert!(router.get_output(1, 0).unwrap().buttons.contains(crate::button::Buttons::START));
    }

    #[test]
    fn configurable_n_to_m_override_routes_to_chosen_slot() {
        let mut router: Router<2, 2> = Router::new();
        router.add_route(RouteEntry {
            input_slot: 0,
            target: 1,
            output_slot: 1,
        });
        let e = sample(1, 0);
        router.submit_input(e);
        // Target 0 default slot still gets player 0's event.
        assert!(router.get_output(0, 0).is_some());
        // Target 1 was routed to output slot 1 instead.
        assert!(router.get_output(1, 1).is_some());
        assert!(router.get_output(1, 0).is_none());
    }

    #[test]
    fn no_submission_is_none() {
        let router: Router<1, 2> = Router::new();
        assert!(router.get_output(0, 0).is_none());
    }
}
