use chrono::NaiveDateTime;

use crate::error::LineError;
use crate::state::{CountField, Phase};

/// Why a confirmed mode was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Standard (non-mode) match setup was seen.
    StandardMatch,
    /// The game entity reached its final state.
    MatchComplete,
}

/// Why the whole state was wiped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCause {
    NewMatch,
    ModeExit(ExitReason),
    Stale,
}

/// Signals emitted by the ClassificationEngine.
/// State events describe what changed; diagnostics describe what went wrong
/// and how it was corrected.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSignal {
    // Mode lifecycle
    ModeEntered {
        timestamp: NaiveDateTime,
        /// Confirmed from the startup backlog rather than a live line.
        from_catch_up: bool,
    },
    ModeExited {
        reason: ExitReason,
        timestamp: NaiveDateTime,
    },
    MatchReset {
        cause: ResetCause,
        timestamp: NaiveDateTime,
    },

    // Gameplay
    PhaseChanged {
        from: Phase,
        to: Phase,
        rule: &'static str,
        timestamp: NaiveDateTime,
    },
    CountChanged {
        field: CountField,
        value: u8,
        timestamp: NaiveDateTime,
    },
    TurnChanged {
        turn: u32,
        timestamp: NaiveDateTime,
    },

    // Diagnostics
    BoundsViolation {
        field: CountField,
        raw: usize,
        clamped: u8,
        timestamp: NaiveDateTime,
    },
    PhaseStuck {
        phase: Phase,
        since: NaiveDateTime,
        timestamp: NaiveDateTime,
    },
    PhaseRecovered {
        from: Phase,
        timestamp: NaiveDateTime,
    },
    StaleReset {
        last_activity: NaiveDateTime,
        timestamp: NaiveDateTime,
    },
    LineRejected {
        error: LineError,
        timestamp: NaiveDateTime,
    },
}

impl EngineSignal {
    /// Part of the diagnostic stream rather than a plain state event.
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            EngineSignal::BoundsViolation { .. }
                | EngineSignal::PhaseStuck { .. }
                | EngineSignal::PhaseRecovered { .. }
                | EngineSignal::StaleReset { .. }
                | EngineSignal::LineRejected { .. }
        )
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            EngineSignal::ModeEntered { timestamp, .. }
            | EngineSignal::ModeExited { timestamp, .. }
            | EngineSignal::MatchReset { timestamp, .. }
            | EngineSignal::PhaseChanged { timestamp, .. }
            | EngineSignal::CountChanged { timestamp, .. }
            | EngineSignal::TurnChanged { timestamp, .. }
            | EngineSignal::BoundsViolation { timestamp, .. }
            | EngineSignal::PhaseStuck { timestamp, .. }
            | EngineSignal::PhaseRecovered { timestamp, .. }
            | EngineSignal::StaleReset { timestamp, .. }
            | EngineSignal::LineRejected { timestamp, .. } => *timestamp,
        }
    }
}
