//! Shared configuration types for shopwatch.
//!
//! These are plain serde types so the engine, the replay tool and any
//! future front end agree on one settings format.

pub mod bounds;
pub mod settings;

pub use bounds::{BOARD_BOUNDS, Bounds, HAND_BOUNDS, SHOP_BOUNDS, TIER_BOUNDS};
pub use settings::{EngineSettings, MAX_TIMEOUT_SECS, ManualCounts, SetAsidePolicy, SettingsError};
