//! Roll-up of the three lane scores

use crate::config::RiskBands;
use crate::scorer::VanguardTriple;
use serde::{Deserialize, Serialize};
use vanguard_domain::Severity;

/// Overall risk label; same four levels as risk severity
pub type RiskLevel = Severity;

/// Aggregated assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateAssessment {
    /// Unweighted mean of the three lane scores
    pub overall_score: f64,
    /// Banded level, floored at `high` when any lane failed
    pub risk_level: RiskLevel,
    /// Lanes with `failed` status
    pub failed_lanes: Vec<String>,
}

/// Combines lane results into an overall score and risk level
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    bands: RiskBands,
}

impl Aggregator {
    /// Create with the given bands
    #[must_use]
    pub fn new(bands: RiskBands) -> Self {
        Self { bands }
    }

    /// Mean score, banded; fails closed when any lane failed
    #[must_use]
    pub fn aggregate(&self, triple: &VanguardTriple) -> AggregateAssessment {
        let overall_score = (triple.security.score + triple.integrity.score + triple.accuracy.score) / 3.0;
        let failed_lanes = triple.failed_lanes();
        let mut risk_level = self.bands.level(overall_score);
        if !failed_lanes.is_empty() && risk_level < Severity::High {
            risk_level = Severity::High;
        }
        AggregateAssessment {
            overall_score,
            risk_level,
            failed_lanes,
        }
    }
}
