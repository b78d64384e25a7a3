//! Concurrent lane evaluation

use crate::accuracy::AccuracyLane;
use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::integrity::IntegrityLane;
use crate::lane::{VanguardLane, VanguardResult};
use crate::security::SecurityLane;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vanguard_domain::DomainOutput;

/// Exactly one result per lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VanguardTriple {
    /// Security lane
    pub security: VanguardResult,
    /// Integrity lane
    pub integrity: VanguardResult,
    /// Accuracy lane
    pub accuracy: VanguardResult,
}

impl VanguardTriple {
    /// Results in lane order
    pub fn iter(&self) -> impl Iterator<Item = &VanguardResult> {
        [&self.security, &self.integrity, &self.accuracy].into_iter()
    }

    /// Names of failed lanes
    #[must_use]
    pub fn failed_lanes(&self) -> Vec<String> {
        self.iter()
            .filter(|result| result.is_failed())
            .map(|result| result.agent_name.clone())
            .collect()
    }
}

/// Runs the three lanes against one output and joins on all of them
#[derive(Debug, Clone)]
pub struct VanguardScorer {
    security: Arc<dyn VanguardLane>,
    integrity: Arc<dyn VanguardLane>,
    accuracy: Arc<dyn VanguardLane>,
}

impl VanguardScorer {
    /// Scorer with the built-in lanes
    ///
    /// # Errors
    /// `ScoringError::Pattern` if a security detector fails to compile.
    pub fn new(config: &ScoringConfig) -> Result<Self, ScoringError> {
        Ok(Self::with_lanes(
            Arc::new(SecurityLane::new(config.lanes.clone())?),
            Arc::new(IntegrityLane::new(config.lanes.clone())),
            Arc::new(AccuracyLane::new(config.lanes.clone())),
        ))
    }

    /// Scorer with custom lanes
    #[must_use]
    pub fn with_lanes(
        security: Arc<dyn VanguardLane>,
        integrity: Arc<dyn VanguardLane>,
        accuracy: Arc<dyn VanguardLane>,
    ) -> Self {
        Self {
            security,
            integrity,
            accuracy,
        }
    }

    /// Evaluate all lanes concurrently
    ///
    /// The lanes share the output immutably; the first lane error is returned.
    ///
    /// # Errors
    /// `ScoringError::Lane` from whichever lane failed.
    pub async fn score(&self, output: &DomainOutput) -> Result<VanguardTriple, ScoringError> {
        let (security, integrity, accuracy) = tokio::try_join!(
            self.security.evaluate(output),
            self.integrity.evaluate(output),
            self.accuracy.evaluate(output),
        )?;
        Ok(VanguardTriple {
            security,
            integrity,
            accuracy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::output_with;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct BrokenLane;

    #[async_trait]
    impl VanguardLane for BrokenLane {
        fn name(&self) -> &'static str {
            "Broken"
        }

        async fn evaluate(&self, _output: &DomainOutput) -> Result<VanguardResult, ScoringError> {
            Err(ScoringError::lane("Broken", "unavailable"))
        }
    }

    #[tokio::test]
    async fn produces_one_result_per_lane() {
        let scorer = VanguardScorer::new(&ScoringConfig::default()).unwrap();
        let triple = scorer.score(&output_with(vec![], vec![])).await.unwrap();
        let names: Vec<&str> = triple.iter().map(|r| r.agent_name.as_str()).collect();
        assert_eq!(names, vec!["Security", "Integrity", "Accuracy"]);
    }

    #[tokio::test]
    async fn lane_error_propagates() {
        let config = ScoringConfig::default();
        let scorer = VanguardScorer::with_lanes(
            Arc::new(SecurityLane::new(config.lanes.clone()).unwrap()),
            Arc::new(BrokenLane),
            Arc::new(AccuracyLane::new(config.lanes)),
        );
        let err = scorer.score(&output_with(vec![], vec![])).await.unwrap_err();
        assert!(matches!(err, ScoringError::Lane { lane: "Broken", .. }));
    }
}
