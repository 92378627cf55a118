//! Engine settings.
//!
//! Every field has a default matching observed game behavior, so an empty
//! TOML document is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::bounds::{BOARD_BOUNDS, HAND_BOUNDS, SHOP_BOUNDS};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("catch_up_card_threshold ({low}) must not exceed catch_up_card_only_threshold ({high})")]
    ThresholdOrder { low: u32, high: u32 },

    #[error("phase_warn_secs ({warn}) must be below phase_recover_secs ({recover})")]
    PhaseTimeoutOrder { warn: u64, recover: u64 },

    #[error("{field} ({value}) must not exceed {max} seconds")]
    TimeoutTooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },
}

/// Longest accepted timeout: one week.
pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// How entities routed through the `SETASIDE` zone are classified.
///
/// Some log dialects park shop offerings there, others use it for
/// unrelated bookkeeping, so this stays a setting rather than a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetAsidePolicy {
    /// Never a shop slot.
    Never,
    /// Shop slot only when the same line carries a mode card identifier.
    #[default]
    WithModeCard,
    /// Always a shop slot.
    Always,
}

/// Caller-forced counts that replace the parsed ones in published snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualCounts {
    pub hand: u8,
    pub board: u8,
    pub shop: u8,
}

impl ManualCounts {
    /// Same override with every count pulled into game bounds.
    pub fn clamped(self) -> Self {
        Self {
            hand: HAND_BOUNDS.clamp(self.hand as usize),
            board: BOARD_BOUNDS.clamp(self.board as usize),
            shop: SHOP_BOUNDS.clamp(self.shop as usize),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Mode-card lines needed during catch-up when a mode-type marker was also seen.
    pub catch_up_card_threshold: u32,
    /// Mode-card lines needed during catch-up with no marker at all.
    pub catch_up_card_only_threshold: u32,
    /// Seconds without mode activity before the engine drops back out of the mode.
    pub stale_timeout_secs: u64,
    /// Seconds without a phase transition before a stuck-phase warning.
    pub phase_warn_secs: u64,
    /// Seconds without a phase transition before forcing the shopping phase.
    pub phase_recover_secs: u64,
    /// Maximum number of historical lines replayed at startup.
    pub backlog_max_lines: usize,
    /// Maximum number of trailing bytes scanned for the startup backlog.
    pub backlog_max_bytes: usize,
    pub set_aside_policy: SetAsidePolicy,
    pub manual_counts: Option<ManualCounts>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            catch_up_card_threshold: 2,
            catch_up_card_only_threshold: 5,
            stale_timeout_secs: 10,
            phase_warn_secs: 300,
            phase_recover_secs: 600,
            backlog_max_lines: 500,
            backlog_max_bytes: 50_000,
            set_aside_policy: SetAsidePolicy::default(),
            manual_counts: None,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let non_zero = [
            ("catch_up_card_threshold", self.catch_up_card_threshold as u64),
            ("stale_timeout_secs", self.stale_timeout_secs),
            ("phase_warn_secs", self.phase_warn_secs),
            ("backlog_max_lines", self.backlog_max_lines as u64),
            ("backlog_max_bytes", self.backlog_max_bytes as u64),
        ];
        if let Some(&(field, _)) = non_zero.iter().find(|(_, v)| *v == 0) {
            return Err(SettingsError::ZeroValue { field });
        }

        let timeouts = [
            ("stale_timeout_secs", self.stale_timeout_secs),
            ("phase_warn_secs", self.phase_warn_secs),
            ("phase_recover_secs", self.phase_recover_secs),
        ];
        if let Some(&(field, value)) = timeouts.iter().find(|(_, v)| *v > MAX_TIMEOUT_SECS) {
            return Err(SettingsError::TimeoutTooLarge {
                field,
                value,
                max: MAX_TIMEOUT_SECS,
            });
        }

        if self.catch_up_card_threshold > self.catch_up_card_only_threshold {
            return Err(SettingsError::ThresholdOrder {
                low: self.catch_up_card_threshold,
                high: self.catch_up_card_only_threshold,
            });
        }

        if self.phase_warn_secs >= self.phase_recover_secs {
            return Err(SettingsError::PhaseTimeoutOrder {
                warn: self.phase_warn_secs,
                recover: self.phase_recover_secs,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(EngineSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let parsed: EngineSettings = toml::from_str("").unwrap();
        assert_eq!(parsed, EngineSettings::default());
    }

    #[test]
    fn test_partial_toml() {
        let parsed: EngineSettings = toml::from_str(
            r#"
            stale_timeout_secs = 30
            set_aside_policy = "never"

            [manual_counts]
            hand = 2
            board = 4
            shop = 5
            "#,
        )
        .unwrap();

        assert_eq!(parsed.stale_timeout_secs, 30);
        assert_eq!(parsed.set_aside_policy, SetAsidePolicy::Never);
        assert_eq!(
            parsed.manual_counts,
            Some(ManualCounts { hand: 2, board: 4, shop: 5 })
        );
        assert_eq!(parsed.catch_up_card_threshold, 2);
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let settings = EngineSettings {
            catch_up_card_threshold: 6,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::ThresholdOrder { low: 6, high: 5 })
        );
    }

    #[test]
    fn test_validate_rejects_phase_timeout_order() {
        let settings = EngineSettings {
            phase_warn_secs: 600,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::PhaseTimeoutOrder { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero() {
        let settings = EngineSettings {
            stale_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::ZeroValue { field: "stale_timeout_secs" })
        );
    }

    #[test]
    fn test_validate_rejects_huge_timeout() {
        let settings = EngineSettings {
            stale_timeout_secs: 10_000_000_000_000_000,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::TimeoutTooLarge {
                field: "stale_timeout_secs",
                value: 10_000_000_000_000_000,
                max: MAX_TIMEOUT_SECS,
            })
        );

        let at_limit = EngineSettings {
            phase_recover_secs: MAX_TIMEOUT_SECS,
            ..Default::default()
        };
        assert_eq!(at_limit.validate(), Ok(()));
    }

    #[test]
    fn test_manual_counts_clamped() {
        let counts = ManualCounts { hand: 12, board: 9, shop: 1 }.clamped();
        assert_eq!(counts, ManualCounts { hand: 10, board: 7, shop: 3 });
    }
}
