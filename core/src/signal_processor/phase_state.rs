//! Shopping/combat phase state machine.
//!
//! Rules are evaluated top to bottom and the first rule that applies to the
//! current phase wins, so a line matching two contradictory rules still
//! produces at most one transition.

use chrono::{Duration, NaiveDateTime};
use shopwatch_types::EngineSettings;

use crate::context::saturating_seconds;
use crate::log::{LineFacts, Marker};
use crate::state::Phase;

/// One prioritized transition rule.
#[derive(Debug)]
pub struct PhaseRule {
    pub name: &'static str,
    pub from: Phase,
    pub to: Phase,
    pub matches: fn(&LineFacts) -> bool,
}

fn end_turn(facts: &LineFacts) -> bool {
    facts.has(Marker::EndTurn)
}

fn opponent_turn_start(facts: &LineFacts) -> bool {
    facts.has(Marker::TurnStart) && facts.has(Marker::Opponent)
}

fn shop_action(facts: &LineFacts) -> bool {
    facts.has(Marker::ShopAction)
}

fn own_turn_start(facts: &LineFacts) -> bool {
    facts.has(Marker::TurnStart) && !facts.has(Marker::Opponent)
}

pub static PHASE_RULES: [PhaseRule; 4] = [
    PhaseRule {
        name: "end_turn",
        from: Phase::Shopping,
        to: Phase::Combat,
        matches: end_turn,
    },
    PhaseRule {
        name: "opponent_turn_start",
        from: Phase::Shopping,
        to: Phase::Combat,
        matches: opponent_turn_start,
    },
    PhaseRule {
        name: "shop_action",
        from: Phase::Combat,
        to: Phase::Shopping,
        matches: shop_action,
    },
    PhaseRule {
        name: "own_turn_start",
        from: Phase::Combat,
        to: Phase::Shopping,
        matches: own_turn_start,
    },
];

/// Outcome of running one line through the rule table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseVerdict {
    /// Some rule matched the line, whether or not it applied.
    pub recognized: bool,
    pub transition: Option<&'static PhaseRule>,
}

/// Stuck-phase watchdog outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogVerdict {
    Quiet,
    /// Warning threshold crossed; reported once per stuck period.
    Stuck { since: NaiveDateTime },
    /// Recovery threshold crossed; the caller forces the shopping phase.
    Recover { since: NaiveDateTime },
}

#[derive(Debug, Clone)]
pub struct PhaseStateMachine {
    last_transition_at: NaiveDateTime,
    warned: bool,
    warn_after: Duration,
    recover_after: Duration,
}

impl PhaseStateMachine {
    pub fn new(settings: &EngineSettings, now: NaiveDateTime) -> Self {
        Self {
            last_transition_at: now,
            warned: false,
            warn_after: saturating_seconds(settings.phase_warn_secs),
            recover_after: saturating_seconds(settings.phase_recover_secs),
        }
    }

    /// Restart the watchdog, e.g. on mode entry.
    pub fn reset(&mut self, now: NaiveDateTime) {
        self.last_transition_at = now;
        self.warned = false;
    }

    pub fn last_transition_at(&self) -> NaiveDateTime {
        self.last_transition_at
    }

    pub fn observe(&mut self, facts: &LineFacts, current: Phase, now: NaiveDateTime) -> PhaseVerdict {
        let mut verdict = PhaseVerdict::default();

        for rule in &PHASE_RULES {
            if !(rule.matches)(facts) {
                continue;
            }
            verdict.recognized = true;
            if rule.from == current {
                verdict.transition = Some(rule);
                self.reset(now);
                break;
            }
        }

        verdict
    }

    pub fn check_watchdog(&mut self, now: NaiveDateTime) -> WatchdogVerdict {
        let since = self.last_transition_at;
        let elapsed = now.signed_duration_since(since);

        if elapsed > self.recover_after {
            self.reset(now);
            return WatchdogVerdict::Recover { since };
        }
        if elapsed > self.warn_after && !self.warned {
            self.warned = true;
            return WatchdogVerdict::Stuck { since };
        }
        WatchdogVerdict::Quiet
    }
}
