//! Immutable snapshot published to renderers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shopwatch_types::ManualCounts;

use super::match_state::{MatchState, Phase, tier_for_shop};

/// What a renderer sees. Counts are the effective ones: the manual override
/// when one is active, the parsed counts otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub in_special_mode: bool,
    pub phase: Phase,
    pub hand: u8,
    pub board: u8,
    pub shop: u8,
    pub tavern_tier: u8,
    pub turn_number: u32,
    /// Counts come from a manual override.
    pub manual: bool,
    pub last_changed_at: NaiveDateTime,
}

impl MatchSnapshot {
    pub fn from_state(state: &MatchState, manual: Option<ManualCounts>) -> Self {
        let (hand, board, shop, tavern_tier) = match manual {
            Some(counts) => (
                counts.hand,
                counts.board,
                counts.shop,
                tier_for_shop(counts.shop, state.tavern_tier()),
            ),
            None => (
                state.hand_count(),
                state.board_count(),
                state.shop_count(),
                state.tavern_tier(),
            ),
        };

        Self {
            in_special_mode: state.in_special_mode(),
            phase: state.phase(),
            hand,
            board,
            shop,
            tavern_tier,
            turn_number: state.turn_number(),
            manual: manual.is_some(),
            last_changed_at: state.last_changed_at(),
        }
    }

    pub fn in_combat(&self) -> bool {
        self.phase == Phase::Combat
    }
}
