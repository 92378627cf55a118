use chrono::{Duration, NaiveDateTime};

use crate::context::saturating_seconds;
use crate::state::MatchState;

/// Forces a full reset when the engine believes it is in the mode but has
/// seen no mode activity for too long. A false mode entry costs more than
/// an early reset, so the timeout is short.
#[derive(Debug, Clone, Copy)]
pub struct StalenessWatchdog {
    timeout: Duration,
}

impl StalenessWatchdog {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: saturating_seconds(timeout_secs),
        }
    }

    pub fn should_auto_reset(&self, state: &MatchState, now: NaiveDateTime) -> bool {
        state.in_special_mode()
            && now.signed_duration_since(state.last_mode_activity_at()) > self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_only_fires_in_mode() {
        let watchdog = StalenessWatchdog::new(10);
        let state = MatchState::new(t0());
        assert!(!watchdog.should_auto_reset(&state, t0() + Duration::hours(1)));
    }

    #[test]
    fn test_fires_strictly_after_timeout() {
        let watchdog = StalenessWatchdog::new(10);
        let mut state = MatchState::new(t0());
        state.enter_mode(t0());

        assert!(!watchdog.should_auto_reset(&state, t0() + Duration::seconds(10)));
        assert!(watchdog.should_auto_reset(&state, t0() + Duration::seconds(11)));

        state.touch_activity(t0() + Duration::seconds(9));
        assert!(!watchdog.should_auto_reset(&state, t0() + Duration::seconds(11)));
    }
}
