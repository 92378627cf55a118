//! Classification engine
//!
//! This module provides:
//! - **ModeDetector**: enters and leaves the special match mode
//! - **PhaseStateMachine**: shopping/combat transitions from a prioritized rule table
//! - **ZoneTracker**: entity membership per zone, the source of every count
//! - **StalenessWatchdog**: drops a mode that stopped producing activity
//! - **ClassificationEngine**: runs one line through all of the above
//!
//! ```text
//!   line ──► LineFacts::classify ──► ModeDetector ──► PhaseStateMachine ──► ZoneTracker
//!                                                                              │
//!                                             MatchState ◄── clamp + tier ◄────┘
//! ```

mod mode_state;
mod phase_state;
mod processor;
mod staleness;
mod zone_tracker;


pub use mode_state::{CatchUpScan, ModeDetector, ModeStatus, ModeTransition};
pub use phase_state::{PHASE_RULES, PhaseRule, PhaseStateMachine, PhaseVerdict, WatchdogVerdict};
pub use processor::ClassificationEngine;
pub use staleness::StalenessWatchdog;
pub use zone_tracker::{Zone, ZoneCounts, ZoneTracker};
