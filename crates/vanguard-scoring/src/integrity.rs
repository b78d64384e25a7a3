//! Integrity lane: structural soundness of the domain analysis

use crate::config::LaneThresholds;
use crate::error::ScoringError;
use crate::lane::{VanguardLane, VanguardResult};
use async_trait::async_trait;
use vanguard_domain::{DomainOutput, JurisdictionLevel};

const INVALID_DOCUMENT_PENALTY: f64 = 40.0;
const ISSUE_PENALTY: f64 = 10.0;
const MAX_ISSUE_PENALTY: f64 = 50.0;
const EMPTY_EXTRACTION_PENALTY: f64 = 30.0;
const NO_RECOMMENDATIONS_PENALTY: f64 = 5.0;

/// Integrity lane
#[derive(Debug, Clone, Default)]
pub struct IntegrityLane {
    thresholds: LaneThresholds,
}

impl IntegrityLane {
    /// Lane name
    pub const NAME: &'static str = "Integrity";

    /// Create the lane
    #[must_use]
    pub fn new(thresholds: LaneThresholds) -> Self {
        Self { thresholds }
    }
}

fn level_name(level: JurisdictionLevel) -> &'static str {
    match level {
        JurisdictionLevel::Federal => "Federal",
        JurisdictionLevel::State => "State",
        JurisdictionLevel::Local => "Local",
    }
}

#[async_trait]
impl VanguardLane for IntegrityLane {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn evaluate(&self, output: &DomainOutput) -> Result<VanguardResult, ScoringError> {
        let analysis = &output.analysis;
        let mut score = 100.0;
        let mut findings = Vec::new();
        let mut recommendations = Vec::new();

        if !analysis.document_validity {
            score -= INVALID_DOCUMENT_PENALTY;
            findings.push("Document failed minimum length or required keyword validation".to_string());
            recommendations.push("Provide the complete document text for analysis".to_string());
        }

        let compliance = &analysis.compliance;
        for level in compliance.failed_levels() {
            findings.push(format!("{} compliance check failed", level_name(level)));
        }
        if !compliance.issues.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let penalty = (compliance.issues.len() as f64 * ISSUE_PENALTY).min(MAX_ISSUE_PENALTY);
            score -= penalty;
            findings.push(format!("{} compliance issue(s) recorded", compliance.issues.len()));
            recommendations.push("Cure the recorded compliance issues and re-run the analysis".to_string());
        }

        if analysis.key_terms_extracted.is_empty() {
            score -= EMPTY_EXTRACTION_PENALTY;
            findings.push("No key terms could be extracted".to_string());
        }

        if output.recommendations.is_empty() {
            score -= NO_RECOMMENDATIONS_PENALTY;
            findings.push("Domain agent produced no recommendations".to_string());
        }

        if findings.is_empty() {
            findings.push("Document structure and compliance checks are consistent".to_string());
        }

        tracing::debug!(lane = Self::NAME, score, "lane evaluated");
        Ok(VanguardResult::scored(Self::NAME, score, &self.thresholds, findings, recommendations))
    }
}
