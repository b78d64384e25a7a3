//! Score bands and lane thresholds

use crate::error::ScoringError;
use crate::lane::LaneStatus;
use serde::{Deserialize, Serialize};
use vanguard_domain::Severity;

/// Overall score -> risk level step function
///
/// `score < critical_below` is critical, `< high_below` high,
/// `< medium_below` medium, anything else low.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskBands {
    /// Upper bound (exclusive) of the critical band
    pub critical_below: f64,
    /// Upper bound (exclusive) of the high band
    pub high_below: f64,
    /// Upper bound (exclusive) of the medium band
    pub medium_below: f64,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            critical_below: 40.0,
            high_below: 60.0,
            medium_below: 80.0,
        }
    }
}

impl RiskBands {
    /// Risk level for a score
    #[must_use]
    pub fn level(&self, score: f64) -> Severity {
        if score < self.critical_below {
            Severity::Critical
        } else if score < self.high_below {
            Severity::High
        } else if score < self.medium_below {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Bands must be strictly increasing inside `0..=100`
    ///
    /// # Errors
    /// `ScoringError::InvalidConfig` describing the violated bound.
    pub fn validate(&self) -> Result<(), ScoringError> {
        let ordered = 0.0 < self.critical_below
            && self.critical_below < self.high_below
            && self.high_below < self.medium_below
            && self.medium_below <= 100.0;
        if ordered {
            Ok(())
        } else {
            Err(ScoringError::InvalidConfig(format!(
                "risk bands must satisfy 0 < critical ({}) < high ({}) < medium ({}) <= 100",
                self.critical_below, self.high_below, self.medium_below
            )))
        }
    }
}

/// Lane score -> lane status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneThresholds {
    /// Minimum score for `passed`
    pub pass_at: f64,
    /// Minimum score for `warning`
    pub warn_at: f64,
}

impl Default for LaneThresholds {
    fn default() -> Self {
        Self {
            pass_at: 80.0,
            warn_at: 60.0,
        }
    }
}

impl LaneThresholds {
    /// Status for a lane score
    #[must_use]
    pub fn status(&self, score: f64) -> LaneStatus {
        if score >= self.pass_at {
            LaneStatus::Passed
        } else if score >= self.warn_at {
            LaneStatus::Warning
        } else {
            LaneStatus::Failed
        }
    }

    /// `0 <= warn_at <= pass_at <= 100`
    ///
    /// # Errors
    /// `ScoringError::InvalidConfig` describing the violated bound.
    pub fn validate(&self) -> Result<(), ScoringError> {
        if (0.0..=self.pass_at).contains(&self.warn_at) && self.pass_at <= 100.0 {
            Ok(())
        } else {
            Err(ScoringError::InvalidConfig(format!(
                "lane thresholds must satisfy 0 <= warn_at ({}) <= pass_at ({}) <= 100",
                self.warn_at, self.pass_at
            )))
        }
    }
}

/// Scoring section of the configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Risk bands
    pub bands: RiskBands,
    /// Lane thresholds
    pub lanes: LaneThresholds,
}

impl ScoringConfig {
    /// Validate both parts
    ///
    /// # Errors
    /// The first `ScoringError::InvalidConfig` found.
    pub fn validate(&self) -> Result<(), ScoringError> {
        self.bands.validate()?;
        self.lanes.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_band_boundaries() {
        let bands = RiskBands::default();
        assert_eq!(bands.level(0.0), Severity::Critical);
        assert_eq!(bands.level(39.9), Severity::Critical);
        assert_eq!(bands.level(40.0), Severity::High);
        assert_eq!(bands.level(59.9), Severity::High);
        assert_eq!(bands.level(60.0), Severity::Medium);
        assert_eq!(bands.level(79.9), Severity::Medium);
        assert_eq!(bands.level(80.0), Severity::Low);
        assert_eq!(bands.level(100.0), Severity::Low);
    }

    #[test]
    fn lane_status_boundaries() {
        let lanes = LaneThresholds::default();
        assert_eq!(lanes.status(80.0), LaneStatus::Passed);
        assert_eq!(lanes.status(79.0), LaneStatus::Warning);
        assert_eq!(lanes.status(60.0), LaneStatus::Warning);
        assert_eq!(lanes.status(59.0), LaneStatus::Failed);
    }

    #[test]
    fn unordered_bands_are_rejected() {
        let bands = RiskBands {
            critical_below: 60.0,
            high_below: 40.0,
            medium_below: 80.0,
        };
        assert!(bands.validate().is_err());
        assert!(RiskBands::default().validate().is_ok());
    }

    #[test]
    fn warn_above_pass_is_rejected() {
        let lanes = LaneThresholds {
            pass_at: 50.0,
            warn_at: 70.0,
        };
        assert!(lanes.validate().is_err());
        assert!(ScoringConfig::default().validate().is_ok());
    }
}
