//! Special-mode detection.
//!
//! `NotDetected -> Provisional -> Confirmed`, with a direct
//! `NotDetected -> Confirmed` edge when the startup backlog shows a match
//! already in progress. A bare game-type marker only ever reaches
//! `Provisional`: those strings show up before the match economy is live.

use shopwatch_types::EngineSettings;

use crate::events::ExitReason;
use crate::log::{LineFacts, Marker};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModeStatus {
    #[default]
    NotDetected,
    Provisional,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    NoChange,
    EnteredMode,
    ExitedMode(ExitReason),
}

#[derive(Debug, Clone)]
pub struct ModeDetector {
    status: ModeStatus,
    card_threshold: u32,
    card_only_threshold: u32,
}

impl ModeDetector {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            status: ModeStatus::NotDetected,
            card_threshold: settings.catch_up_card_threshold,
            card_only_threshold: settings.catch_up_card_only_threshold,
        }
    }

    pub fn status(&self) -> ModeStatus {
        self.status
    }

    pub fn observe(&mut self, facts: &LineFacts) -> ModeTransition {
        match self.status {
            ModeStatus::Confirmed => {
                if facts.has(Marker::StandardMatch) {
                    tracing::info!("[MODE] Standard match setup seen, leaving special mode");
                    self.status = ModeStatus::NotDetected;
                    return ModeTransition::ExitedMode(ExitReason::StandardMatch);
                }
                if facts.has(Marker::MatchComplete) {
                    tracing::info!("[MODE] Match complete, leaving special mode");
                    self.status = ModeStatus::NotDetected;
                    return ModeTransition::ExitedMode(ExitReason::MatchComplete);
                }
                ModeTransition::NoChange
            }
            ModeStatus::NotDetected | ModeStatus::Provisional => {
                if facts.mode_card && facts.enters_play() {
                    tracing::info!("[MODE] Mode card entering play, special mode confirmed");
                    self.status = ModeStatus::Confirmed;
                    return ModeTransition::EnteredMode;
                }

                if self.status == ModeStatus::Provisional && facts.has(Marker::StandardMatch) {
                    tracing::debug!("[MODE] Standard match setup, dropping provisional detection");
                    self.status = ModeStatus::NotDetected;
                } else if self.status == ModeStatus::NotDetected && facts.has(Marker::ModeType) {
                    tracing::info!("[MODE] Game type marker seen, waiting for a mode card in play");
                    self.status = ModeStatus::Provisional;
                }
                ModeTransition::NoChange
            }
        }
    }

    /// Whether a finished backlog scan is enough to confirm the mode.
    /// A provisional status counts as having seen the marker.
    pub fn catch_up_confirms(&self, scan: &CatchUpScan) -> bool {
        let marker_seen = scan.marker_seen || self.status == ModeStatus::Provisional;
        (marker_seen && scan.mode_cards >= self.card_threshold)
            || scan.mode_cards >= self.card_only_threshold
    }

    pub fn confirm(&mut self) {
        self.status = ModeStatus::Confirmed;
    }

    pub fn reset(&mut self) {
        self.status = ModeStatus::NotDetected;
    }
}

/// Tally kept over the startup backlog. Only the most recent match counts:
/// new-match, standard-match and match-complete markers start the tally over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchUpScan {
    pub mode_cards: u32,
    pub marker_seen: bool,
}

impl CatchUpScan {
    pub fn observe(&mut self, facts: &LineFacts) {
        if facts.has(Marker::NewMatch)
            || facts.has(Marker::StandardMatch)
            || facts.has(Marker::MatchComplete)
        {
            *self = Self::default();
            return;
        }
        self.mode_cards += facts.mode_card_ids;
        if facts.has(Marker::ModeType) {
            self.marker_seen = true;
        }
    }
}
