//! Session timeout configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Interval between monitor polls and countdown ticks
pub const POLL_INTERVAL: Duration = Duration::from_millis(1_000);

/// Default idle time before the warning modal appears (25 minutes)
const DEFAULT_WARNING_MS: u64 = 25 * 60 * 1000;

/// Default idle time before forced logout (30 minutes)
const DEFAULT_HARD_MS: u64 = 30 * 60 * 1000;

/// Idle thresholds for a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle duration after which the countdown modal is shown
    #[serde(default = "default_warning_ms")]
    pub warning_threshold_ms: u64,

    /// Idle duration after which the session is forcibly terminated
    #[serde(default = "default_hard_ms")]
    pub hard_threshold_ms: u64,
}

fn default_warning_ms() -> u64 {
    DEFAULT_WARNING_MS
}

fn default_hard_ms() -> u64 {
    DEFAULT_HARD_MS
}

fn to_millis(duration: Duration) -> Result<u64> {
    u64::try_from(duration.as_millis()).map_err(|_| SessionError::ThresholdTooLarge)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            warning_threshold_ms: DEFAULT_WARNING_MS,
            hard_threshold_ms: DEFAULT_HARD_MS,
        }
    }
}

impl SessionConfig {
    /// Create a validated configuration
    pub fn new(warning: Duration, hard: Duration) -> Result<Self> {
        let config = Self {
            warning_threshold_ms: to_millis(warning)?,
            hard_threshold_ms: to_millis(hard)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a config for testing (2 s warning, 4 s logout)
    pub fn testing() -> Self {
        Self {
            warning_threshold_ms: 2_000,
            hard_threshold_ms: 4_000,
        }
    }

    /// Create a config for shared workstations (10 min warning, 15 min logout)
    pub fn strict() -> Self {
        Self {
            warning_threshold_ms: 10 * 60 * 1000,
            hard_threshold_ms: 15 * 60 * 1000,
        }
    }

    /// Check that both thresholds are positive and correctly ordered
    pub fn validate(&self) -> Result<()> {
        if self.warning_threshold_ms == 0 || self.hard_threshold_ms == 0 {
            return Err(SessionError::ZeroThreshold);
        }
        if self.warning_threshold_ms >= self.hard_threshold_ms {
            return Err(SessionError::InvalidThresholds {
                warning_ms: self.warning_threshold_ms,
                hard_ms: self.hard_threshold_ms,
            });
        }
        Ok(())
    }

    pub fn warning_threshold(&self) -> Duration {
        Duration::from_millis(self.warning_threshold_ms)
    }

    pub fn hard_threshold(&self) -> Duration {
        Duration::from_millis(self.hard_threshold_ms)
    }

    /// Length of the visible countdown
    pub fn warning_period(&self) -> Duration {
        self.hard_threshold().saturating_sub(self.warning_threshold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.warning_threshold_ms, 1_500_000);
        assert_eq!(config.hard_threshold_ms, 1_800_000);
        assert_eq!(config.warning_period(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(SessionConfig::testing().validate().is_ok());
        assert!(SessionConfig::strict().validate().is_ok());
    }

    #[test]
    fn test_misordered_thresholds_rejected() {
        let err = SessionConfig::new(Duration::from_secs(30), Duration::from_secs(30)).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidThresholds {
                warning_ms: 30_000,
                hard_ms: 30_000
            }
        ));

        assert!(SessionConfig::new(Duration::from_secs(31), Duration::from_secs(30)).is_err());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = SessionConfig::new(Duration::ZERO, Duration::from_secs(30)).unwrap_err();
        assert!(matches!(err, SessionError::ZeroThreshold));
    }

    #[test]
    fn test_unrepresentable_threshold_rejected() {
        let err = SessionConfig::new(Duration::from_secs(1), Duration::MAX).unwrap_err();
        assert!(matches!(err, SessionError::ThresholdTooLarge));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"hard_threshold_ms": 1900000}"#).unwrap();
        assert_eq!(config.warning_threshold_ms, 1_500_000);
        assert_eq!(config.hard_threshold_ms, 1_900_000);
    }
}
