use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shopwatch_types::{BOARD_BOUNDS, Bounds, HAND_BOUNDS, SHOP_BOUNDS, TIER_BOUNDS};

/// The two sub-periods of a round. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Shopping,
    Combat,
}

/// Bounded fields of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountField {
    Hand,
    Board,
    Shop,
    TavernTier,
}

impl CountField {
    pub fn bounds(self) -> Bounds {
        match self {
            CountField::Hand => HAND_BOUNDS,
            CountField::Board => BOARD_BOUNDS,
            CountField::Shop => SHOP_BOUNDS,
            CountField::TavernTier => TIER_BOUNDS,
        }
    }
}

/// Result of writing a raw count into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountUpdate {
    pub changed: bool,
    /// Raw value exceeded the upper bound and was capped.
    pub capped_from: Option<usize>,
}

/// Infer the tavern tier from the number of shop slots.
///
/// Seven slots covers tiers five and six, so a known tier six is kept.
pub fn tier_for_shop(shop: u8, current_tier: u8) -> u8 {
    match shop {
        3 => 1,
        4 => 2,
        5 => 3,
        6 => 4,
        7 => current_tier.max(5),
        _ => current_tier,
    }
}

/// Live snapshot of where the player is in the match.
///
/// Only mutated by the classification engine. Every setter is a no-op when
/// the value does not change, so `last_changed_at` only moves on real changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    in_special_mode: bool,
    phase: Phase,
    hand_count: u8,
    board_count: u8,
    shop_count: u8,
    tavern_tier: u8,
    turn_number: u32,
    last_changed_at: NaiveDateTime,
    last_mode_activity_at: NaiveDateTime,
}

impl MatchState {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            in_special_mode: false,
            phase: Phase::Shopping,
            hand_count: HAND_BOUNDS.min,
            board_count: BOARD_BOUNDS.min,
            shop_count: SHOP_BOUNDS.min,
            tavern_tier: TIER_BOUNDS.min,
            turn_number: 0,
            last_changed_at: now,
            last_mode_activity_at: now,
        }
    }

    /// Back to initial defaults.
    pub fn reset(&mut self, now: NaiveDateTime) {
        *self = Self::new(now);
    }

    // --- Accessors ---

    pub fn in_special_mode(&self) -> bool {
        self.in_special_mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn hand_count(&self) -> u8 {
        self.hand_count
    }

    pub fn board_count(&self) -> u8 {
        self.board_count
    }

    pub fn shop_count(&self) -> u8 {
        self.shop_count
    }

    pub fn tavern_tier(&self) -> u8 {
        self.tavern_tier
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn last_changed_at(&self) -> NaiveDateTime {
        self.last_changed_at
    }

    pub fn last_mode_activity_at(&self) -> NaiveDateTime {
        self.last_mode_activity_at
    }

    pub fn get(&self, field: CountField) -> u8 {
        match field {
            CountField::Hand => self.hand_count,
            CountField::Board => self.board_count,
            CountField::Shop => self.shop_count,
            CountField::TavernTier => self.tavern_tier,
        }
    }

    // --- Mutation ---

    /// Enter the mode with round-one defaults: shopping, three shop slots, tier one.
    pub fn enter_mode(&mut self, now: NaiveDateTime) {
        self.reset(now);
        self.in_special_mode = true;
        self.last_mode_activity_at = now;
    }

    pub fn touch_activity(&mut self, now: NaiveDateTime) {
        if self.in_special_mode {
            self.last_mode_activity_at = now;
        }
    }

    /// Returns true if the phase actually changed.
    pub fn set_phase(&mut self, phase: Phase, now: NaiveDateTime) -> bool {
        if self.phase == phase {
            return false;
        }
        self.phase = phase;
        self.last_changed_at = now;
        true
    }

    /// Turns only move forward; a smaller value is ignored.
    pub fn set_turn(&mut self, turn: u32, now: NaiveDateTime) -> bool {
        if turn <= self.turn_number {
            return false;
        }
        self.turn_number = turn;
        self.last_changed_at = now;
        true
    }

    /// Write a raw count, clamped into the field's bounds. A shop count change
    /// also re-infers the tavern tier.
    pub fn set_count(&mut self, field: CountField, raw: usize, now: NaiveDateTime) -> CountUpdate {
        let bounds = field.bounds();
        let value = bounds.clamp(raw);
        let capped_from = (raw > bounds.max as usize).then_some(raw);

        let slot = match field {
            CountField::Hand => &mut self.hand_count,
            CountField::Board => &mut self.board_count,
            CountField::Shop => &mut self.shop_count,
            CountField::TavernTier => &mut self.tavern_tier,
        };
        if *slot == value {
            return CountUpdate {
                changed: false,
                capped_from,
            };
        }
        *slot = value;
        self.last_changed_at = now;

        if field == CountField::Shop {
            let tier = tier_for_shop(value, self.tavern_tier);
            if tier != self.tavern_tier {
                tracing::info!("[STATE] Tavern tier {} -> {} from {} shop slots", self.tavern_tier, tier, value);
                self.tavern_tier = tier;
            }
        }

        CountUpdate {
            changed: true,
            capped_from,
        }
    }

    /// Fields currently outside their declared bounds.
    pub fn violations(&self) -> Vec<(CountField, u8)> {
        [
            CountField::Hand,
            CountField::Board,
            CountField::Shop,
            CountField::TavernTier,
        ]
        .into_iter()
        .map(|field| (field, self.get(field)))
        .filter(|(field, value)| !field.bounds().contains(*value))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_initial_defaults() {
        let state = MatchState::new(t0());
        assert!(!state.in_special_mode());
        assert_eq!(state.phase(), Phase::Shopping);
        assert_eq!(state.shop_count(), 3);
        assert_eq!(state.tavern_tier(), 1);
        assert_eq!(state.turn_number(), 0);
        assert!(state.violations().is_empty());
    }

    #[test]
    fn test_unchanged_value_keeps_timestamp() {
        let mut state = MatchState::new(t0());
        let later = t0() + Duration::seconds(5);

        let update = state.set_count(CountField::Hand, 0, later);
        assert!(!update.changed);
        assert!(!state.set_phase(Phase::Shopping, later));
        assert_eq!(state.last_changed_at(), t0());

        assert!(state.set_count(CountField::Hand, 2, later).changed);
        assert_eq!(state.last_changed_at(), later);
    }

    #[test]
    fn test_board_is_capped() {
        let mut state = MatchState::new(t0());
        let update = state.set_count(CountField::Board, 9, t0());
        assert_eq!(state.board_count(), 7);
        assert_eq!(update.capped_from, Some(9));
    }

    #[test]
    fn test_shop_floor_is_silent() {
        let mut state = MatchState::new(t0());
        let update = state.set_count(CountField::Shop, 0, t0());
        assert_eq!(state.shop_count(), 3);
        assert_eq!(update.capped_from, None);
    }

    #[test]
    fn test_tier_follows_shop() {
        let mut state = MatchState::new(t0());
        for (shop, tier) in [(4, 2), (5, 3), (6, 4), (7, 5), (3, 1)] {
            state.set_count(CountField::Shop, shop, t0());
            assert_eq!(state.tavern_tier(), tier, "shop {shop}");
        }
    }

    #[test]
    fn test_tier_for_shop_keeps_six() {
        assert_eq!(tier_for_shop(7, 6), 6);
        assert_eq!(tier_for_shop(7, 2), 5);
        assert_eq!(tier_for_shop(2, 4), 4);
    }

    #[test]
    fn test_turn_is_monotonic() {
        let mut state = MatchState::new(t0());
        assert!(state.set_turn(3, t0()));
        assert!(!state.set_turn(2, t0()));
        assert!(!state.set_turn(3, t0()));
        assert_eq!(state.turn_number(), 3);
    }

    #[test]
    fn test_activity_only_touched_in_mode() {
        let mut state = MatchState::new(t0());
        let later = t0() + Duration::seconds(3);
        state.touch_activity(later);
        assert_eq!(state.last_mode_activity_at(), t0());

        state.enter_mode(t0());
        state.touch_activity(later);
        assert_eq!(state.last_mode_activity_at(), later);
    }
}
