//! Lane contract and result type

use crate::config::LaneThresholds;
use crate::error::ScoringError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use vanguard_domain::DomainOutput;

/// Lane verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneStatus {
    /// Score at or above the pass threshold
    Passed,
    /// Between the warn and pass thresholds
    Warning,
    /// Below the warn threshold
    Failed,
}

impl LaneStatus {
    /// Lowercase wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Warning => "warning",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LaneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lane's output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VanguardResult {
    /// Lane name (`Security`, `Integrity`, `Accuracy`)
    pub agent_name: String,
    /// Verdict derived from `score`
    pub status: LaneStatus,
    /// Score in `0..=100`
    pub score: f64,
    /// What the lane found
    pub findings: Vec<String>,
    /// What to do about it
    pub recommendations: Vec<String>,
}

impl VanguardResult {
    /// Clamp `score` to `0..=100` and derive the status
    #[must_use]
    pub fn scored(
        agent_name: &str,
        score: f64,
        thresholds: &LaneThresholds,
        findings: Vec<String>,
        recommendations: Vec<String>,
    ) -> Self {
        let score = if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 };
        Self {
            agent_name: agent_name.to_string(),
            status: thresholds.status(score),
            score,
            findings,
            recommendations,
        }
    }

    /// Lane failed
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == LaneStatus::Failed
    }
}

/// One independent verification pass over a domain output
#[async_trait]
pub trait VanguardLane: Send + Sync + fmt::Debug {
    /// Lane name, used as `agentName`
    fn name(&self) -> &'static str;

    /// Score the output
    ///
    /// # Errors
    /// `ScoringError::Lane` when the lane cannot produce a result.
    async fn evaluate(&self, output: &DomainOutput) -> Result<VanguardResult, ScoringError>;
}
