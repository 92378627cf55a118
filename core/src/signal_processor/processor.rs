//! Per-line orchestration.
//!
//! `ClassificationEngine::process` is the only mutating entry point. Every
//! line is classified once into `LineFacts`, then handed to the mode
//! detector, the phase machine and the zone tracker in that order. A line
//! that changes the mode is not read as gameplay in the same pass.

use chrono::NaiveDateTime;
use shopwatch_types::{EngineSettings, ManualCounts};

use super::mode_state::{CatchUpScan, ModeDetector, ModeStatus, ModeTransition};
use super::phase_state::{PhaseStateMachine, WatchdogVerdict};
use super::staleness::StalenessWatchdog;
use super::zone_tracker::{Zone, ZoneTracker};
use crate::context::{Clock, SystemClock};
use crate::error::LineError;
use crate::events::{EngineSignal, ResetCause};
use crate::log::{LineFacts, Marker};
use crate::state::{CountField, MatchSnapshot, MatchState, Phase};

pub struct ClassificationEngine<C: Clock = SystemClock> {
    clock: C,
    settings: EngineSettings,
    state: MatchState,
    mode: ModeDetector,
    phase: PhaseStateMachine,
    zones: ZoneTracker,
    staleness: StalenessWatchdog,
    manual: Option<ManualCounts>,
    signals: Vec<EngineSignal>,
}

impl ClassificationEngine<SystemClock> {
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> ClassificationEngine<C> {
    pub fn with_clock(settings: EngineSettings, clock: C) -> Self {
        let now = clock.now();
        Self {
            state: MatchState::new(now),
            mode: ModeDetector::new(&settings),
            phase: PhaseStateMachine::new(&settings, now),
            zones: ZoneTracker::new(),
            staleness: StalenessWatchdog::new(settings.stale_timeout_secs),
            manual: settings.manual_counts.map(ManualCounts::clamped),
            signals: Vec::new(),
            clock,
            settings,
        }
    }

    // --- Line processing ---

    /// Process one live line and return the signals it produced.
    pub fn process(&mut self, line: &str) -> Vec<EngineSignal> {
        if line.trim().is_empty() {
            return Vec::new();
        }
        self.process_facts(LineFacts::classify(line));
        self.take_signals()
    }

    /// Replay the bounded startup backlog, then confirm the mode directly if
    /// the backlog shows a match already in progress.
    pub fn catch_up<I, S>(&mut self, lines: I) -> Vec<EngineSignal>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scan = CatchUpScan::default();
        let mut line_count = 0usize;

        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            let facts = LineFacts::classify(line);
            scan.observe(&facts);
            self.process_facts(facts);
            line_count += 1;
        }

        if !self.state.in_special_mode() && self.mode.catch_up_confirms(&scan) {
            tracing::info!(
                "[MODE] Match already in progress: {} mode cards in backlog (marker seen: {})",
                scan.mode_cards,
                scan.marker_seen
            );
            self.mode.confirm();
            self.enter_mode(self.clock.now(), true);
        }

        tracing::info!(
            "[ENGINE] Catch-up processed {} lines, in mode: {}",
            line_count,
            self.state.in_special_mode()
        );
        self.take_signals()
    }

    fn process_facts(&mut self, facts: LineFacts) {
        let now = self.clock.now();

        if self.staleness.should_auto_reset(&self.state, now) {
            let last_activity = self.state.last_mode_activity_at();
            tracing::warn!(
                "[WATCHDOG] stale-state auto-reset: no mode activity since {}",
                last_activity
            );
            self.signals.push(EngineSignal::StaleReset {
                last_activity,
                timestamp: now,
            });
            self.reset(ResetCause::Stale, now);
            return;
        }

        if let Err(error) = self.apply_line(facts, now) {
            tracing::warn!("[ENGINE] Line rejected: {}", error);
            self.signals.push(EngineSignal::LineRejected {
                error,
                timestamp: now,
            });
        }

        self.debug_assert_counts();
    }

    fn apply_line(&mut self, mut facts: LineFacts, now: NaiveDateTime) -> Result<(), LineError> {
        if facts.has(Marker::NewMatch) {
            tracing::info!("[MODE] New match marker");
            self.reset(ResetCause::NewMatch, now);
            return Ok(());
        }

        match self.mode.observe(&facts) {
            ModeTransition::EnteredMode => {
                self.enter_mode(now, false);
                return Ok(());
            }
            ModeTransition::ExitedMode(reason) => {
                self.signals.push(EngineSignal::ModeExited {
                    reason,
                    timestamp: now,
                });
                self.reset(ResetCause::ModeExit(reason), now);
                return Ok(());
            }
            ModeTransition::NoChange => {}
        }

        if !self.state.in_special_mode() {
            return Ok(());
        }

        // Phase
        self.check_phase_watchdog(now);
        let current = self.state.phase();
        let verdict = self.phase.observe(&facts, current, now);
        if let Some(rule) = verdict.transition {
            if self.state.set_phase(rule.to, now) {
                tracing::info!("[PHASE] {:?} -> {:?} ({})", current, rule.to, rule.name);
                self.signals.push(EngineSignal::PhaseChanged {
                    from: current,
                    to: rule.to,
                    rule: rule.name,
                    timestamp: now,
                });
            }
        }
        if verdict.recognized {
            self.state.touch_activity(now);
        }

        // Turn
        if let Some(turn) = facts.turn.take() {
            let turn = turn?;
            self.state.touch_activity(now);
            if self.state.set_turn(turn, now) {
                tracing::debug!("[STATE] Turn {}", turn);
                self.signals.push(EngineSignal::TurnChanged {
                    turn,
                    timestamp: now,
                });
            }
        }

        // Zones
        if let Some(change) = facts.zone_change.take() {
            let change = change?;
            let zone = Zone::resolve(&change, facts.mode_card, self.settings.set_aside_policy);
            tracing::debug!("[ZONE] Entity {} -> {:?}", change.entity_id, zone);
            self.zones.apply_zone_change(change.entity_id, zone);
            self.state.touch_activity(now);
            self.sync_counts(now);
        }

        Ok(())
    }

    fn check_phase_watchdog(&mut self, now: NaiveDateTime) {
        let current = self.state.phase();
        match self.phase.check_watchdog(now) {
            WatchdogVerdict::Quiet => {}
            WatchdogVerdict::Stuck { since } => {
                tracing::warn!("[WATCHDOG] Phase {:?} unchanged since {}", current, since);
                self.signals.push(EngineSignal::PhaseStuck {
                    phase: current,
                    since,
                    timestamp: now,
                });
            }
            WatchdogVerdict::Recover { since } => {
                if self.state.set_phase(Phase::Shopping, now) {
                    tracing::warn!(
                        "[WATCHDOG] Phase {:?} unchanged since {}, forcing Shopping",
                        current,
                        since
                    );
                    self.signals.push(EngineSignal::PhaseRecovered {
                        from: current,
                        timestamp: now,
                    });
                }
            }
        }
    }

    /// Recompute hand/board/shop from zone membership.
    fn sync_counts(&mut self, now: NaiveDateTime) {
        let counts = self.zones.counts();
        let tier_before = self.state.tavern_tier();

        for (field, raw) in [
            (CountField::Hand, counts.hand),
            (CountField::Board, counts.board),
            (CountField::Shop, counts.shop),
        ] {
            let update = self.state.set_count(field, raw, now);
            let value = self.state.get(field);
            if let Some(raw) = update.capped_from {
                tracing::warn!("[ZONE] {:?} count {} out of bounds, clamped to {}", field, raw, value);
                self.signals.push(EngineSignal::BoundsViolation {
                    field,
                    raw,
                    clamped: value,
                    timestamp: now,
                });
            }
            if update.changed {
                self.signals.push(EngineSignal::CountChanged {
                    field,
                    value,
                    timestamp: now,
                });
            }
        }

        let tier = self.state.tavern_tier();
        if tier != tier_before {
            self.signals.push(EngineSignal::CountChanged {
                field: CountField::TavernTier,
                value: tier,
                timestamp: now,
            });
        }
    }

    /// Counts are clamped and reported as they are written in `sync_counts`.
    /// Afterwards every count must equal its zone cardinality clamped into
    /// bounds.
    fn debug_assert_counts(&self) {
        let counts = self.zones.counts();
        for (field, raw) in [
            (CountField::Hand, counts.hand),
            (CountField::Board, counts.board),
            (CountField::Shop, counts.shop),
        ] {
            debug_assert_eq!(self.state.get(field), field.bounds().clamp(raw), "{field:?} drifted from its zone");
        }
        debug_assert!(self.state.violations().is_empty());
    }

    fn enter_mode(&mut self, now: NaiveDateTime, from_catch_up: bool) {
        self.state.enter_mode(now);
        self.zones.clear();
        self.phase.reset(now);
        tracing::info!("[MODE] Entered special mode (catch-up: {})", from_catch_up);
        self.signals.push(EngineSignal::ModeEntered {
            timestamp: now,
            from_catch_up,
        });
    }

    fn reset(&mut self, cause: ResetCause, now: NaiveDateTime) {
        self.state.reset(now);
        self.zones.clear();
        self.mode.reset();
        self.phase.reset(now);
        tracing::info!("[ENGINE] Full reset ({:?})", cause);
        self.signals.push(EngineSignal::MatchReset {
            cause,
            timestamp: now,
        });
    }

    fn take_signals(&mut self) -> Vec<EngineSignal> {
        std::mem::take(&mut self.signals)
    }

    // --- Manual override ---

    /// Force published counts. Parsed counts keep updating underneath.
    pub fn set_manual_counts(&mut self, counts: Option<ManualCounts>) {
        self.manual = counts.map(ManualCounts::clamped);
        tracing::info!("[ENGINE] Manual counts: {:?}", self.manual);
    }

    pub fn manual_counts(&self) -> Option<ManualCounts> {
        self.manual
    }

    // --- Queries ---

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot::from_state(&self.state, self.manual)
    }

    /// Parsed state, ignoring any manual override.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn zones(&self) -> &ZoneTracker {
        &self.zones
    }

    pub fn mode_status(&self) -> ModeStatus {
        self.mode.status()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn in_special_mode(&self) -> bool {
        self.state.in_special_mode()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn hand_count(&self) -> u8 {
        self.manual.map_or(self.state.hand_count(), |m| m.hand)
    }

    pub fn board_count(&self) -> u8 {
        self.manual.map_or(self.state.board_count(), |m| m.board)
    }

    pub fn shop_count(&self) -> u8 {
        self.manual.map_or(self.state.shop_count(), |m| m.shop)
    }

    pub fn tavern_tier(&self) -> u8 {
        self.snapshot().tavern_tier
    }

    pub fn turn_number(&self) -> u32 {
        self.state.turn_number()
    }
}
