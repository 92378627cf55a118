//! Entity-to-zone tracking.
//!
//! Counts are never incremented or decremented directly; they are always the
//! cardinality of the zone's entity set, so duplicate or out-of-order zone
//! events cannot drift them.

use hashbrown::HashSet;
use shopwatch_types::SetAsidePolicy;

use crate::log::{EntityId, LogZone, Side, ZoneChange};

/// Tracked destination of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Hand,
    Board,
    Shop,
    /// Anything not tracked; the entity simply leaves tracking.
    Other,
}

impl Zone {
    /// Map a logged zone onto a tracked one. `mode_card` is whether the same
    /// line carries a special-mode card identifier, which is what separates
    /// shop offerings from other set-aside bookkeeping.
    pub fn resolve(change: &ZoneChange, mode_card: bool, policy: SetAsidePolicy) -> Zone {
        if change.side == Side::Opposing {
            return Zone::Other;
        }
        match change.zone {
            LogZone::Hand => Zone::Hand,
            LogZone::Play => Zone::Board,
            LogZone::SetAside => match policy {
                SetAsidePolicy::Always => Zone::Shop,
                SetAsidePolicy::WithModeCard if mode_card => Zone::Shop,
                SetAsidePolicy::WithModeCard | SetAsidePolicy::Never => Zone::Other,
            },
            LogZone::Other => Zone::Other,
        }
    }
}

/// Raw (unclamped) zone cardinalities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneCounts {
    pub hand: usize,
    pub board: usize,
    pub shop: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneTracker {
    hand: HashSet<EntityId>,
    board: HashSet<EntityId>,
    shop: HashSet<EntityId>,
}

impl ZoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move an entity: out of whatever zone held it, into `zone` if tracked.
    pub fn apply_zone_change(&mut self, entity_id: EntityId, zone: Zone) {
        self.hand.remove(&entity_id);
        self.board.remove(&entity_id);
        self.shop.remove(&entity_id);

        match zone {
            Zone::Hand => {
                self.hand.insert(entity_id);
            }
            Zone::Board => {
                self.board.insert(entity_id);
            }
            Zone::Shop => {
                self.shop.insert(entity_id);
            }
            Zone::Other => {}
        }
    }

    pub fn zone_of(&self, entity_id: EntityId) -> Option<Zone> {
        if self.hand.contains(&entity_id) {
            Some(Zone::Hand)
        } else if self.board.contains(&entity_id) {
            Some(Zone::Board)
        } else if self.shop.contains(&entity_id) {
            Some(Zone::Shop)
        } else {
            None
        }
    }

    pub fn counts(&self) -> ZoneCounts {
        ZoneCounts {
            hand: self.hand.len(),
            board: self.board.len(),
            shop: self.shop.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hand.is_empty() && self.board.is_empty() && self.shop.is_empty()
    }

    pub fn clear(&mut self) {
        self.hand.clear();
        self.board.clear();
        self.shop.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(zone: LogZone, side: Side) -> ZoneChange {
        ZoneChange {
            entity_id: 1,
            zone,
            side,
        }
    }

    #[test]
    fn test_entity_in_one_zone_at_a_time() {
        let mut tracker = ZoneTracker::new();
        tracker.apply_zone_change(7, Zone::Hand);
        tracker.apply_zone_change(7, Zone::Board);
        tracker.apply_zone_change(7, Zone::Board);

        assert_eq!(tracker.zone_of(7), Some(Zone::Board));
        assert_eq!(tracker.counts(), ZoneCounts { hand: 0, board: 1, shop: 0 });
    }

    #[test]
    fn test_untracked_zone_drops_entity() {
        let mut tracker = ZoneTracker::new();
        tracker.apply_zone_change(3, Zone::Shop);
        tracker.apply_zone_change(3, Zone::Other);
        assert_eq!(tracker.zone_of(3), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut tracker = ZoneTracker::new();
        for id in 0..5 {
            tracker.apply_zone_change(id, Zone::Hand);
        }
        tracker.clear();
        assert_eq!(tracker.counts(), ZoneCounts::default());
    }

    #[test]
    fn test_resolve_set_aside_policy() {
        let set_aside = change(LogZone::SetAside, Side::Unspecified);

        assert_eq!(Zone::resolve(&set_aside, true, SetAsidePolicy::WithModeCard), Zone::Shop);
        assert_eq!(Zone::resolve(&set_aside, false, SetAsidePolicy::WithModeCard), Zone::Other);
        assert_eq!(Zone::resolve(&set_aside, false, SetAsidePolicy::Always), Zone::Shop);
        assert_eq!(Zone::resolve(&set_aside, true, SetAsidePolicy::Never), Zone::Other);
    }

    #[test]
    fn test_resolve_opposing_side_is_untracked() {
        let policy = SetAsidePolicy::default();
        assert_eq!(Zone::resolve(&change(LogZone::Play, Side::Opposing), true, policy), Zone::Other);
        assert_eq!(Zone::resolve(&change(LogZone::Play, Side::Friendly), true, policy), Zone::Board);
        assert_eq!(Zone::resolve(&change(LogZone::Hand, Side::Unspecified), false, policy), Zone::Hand);
    }
}
