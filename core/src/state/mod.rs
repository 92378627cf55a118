pub mod match_state;
pub mod snapshot;

pub use match_state::{CountField, CountUpdate, MatchState, Phase, tier_for_shop};
pub use snapshot::MatchSnapshot;
