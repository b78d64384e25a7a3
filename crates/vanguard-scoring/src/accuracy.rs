//! Accuracy lane: extraction coverage and numeric plausibility

use crate::config::LaneThresholds;
use crate::error::ScoringError;
use crate::lane::{VanguardLane, VanguardResult};
use async_trait::async_trait;
use serde_json::Value;
use vanguard_domain::DomainOutput;

const BASE_SCORE: f64 = 40.0;
const COVERAGE_WEIGHT: f64 = 60.0;
const FIELD_PENALTY: f64 = 10.0;
const LOW_COVERAGE: f64 = 0.5;

/// Accuracy lane
#[derive(Debug, Clone, Default)]
pub struct AccuracyLane {
    thresholds: LaneThresholds,
}

impl AccuracyLane {
    /// Lane name
    pub const NAME: &'static str = "Accuracy";

    /// Create the lane
    #[must_use]
    pub fn new(thresholds: LaneThresholds) -> Self {
        Self { thresholds }
    }
}

/// Why a numeric field looks wrong, if it does
fn numeric_problem(field: &str, value: &Value) -> Option<String> {
    let Some(number) = value.as_f64() else {
        return Some(format!("Field '{field}' should be numeric but was not parsed as a number"));
    };
    if number < 0.0 {
        return Some(format!("Field '{field}' has an implausible negative value"));
    }
    if field.ends_with("Rate") && number > 100.0 {
        return Some(format!("Field '{field}' exceeds 100%"));
    }
    None
}

#[async_trait]
impl VanguardLane for AccuracyLane {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn evaluate(&self, output: &DomainOutput) -> Result<VanguardResult, ScoringError> {
        let provenance = &output.provenance;
        let coverage = provenance.field_coverage();
        let mut score = BASE_SCORE + COVERAGE_WEIGHT * coverage;
        let mut findings = vec![format!(
            "Extracted {} of {} expected fields ({:.0}% coverage)",
            provenance.fields_extracted,
            provenance.fields_expected,
            coverage * 100.0
        )];
        let mut recommendations = Vec::new();

        let fields = &output.analysis.key_terms_extracted;
        for field in &provenance.numeric_fields {
            if let Some(problem) = fields.get(field).and_then(|value| numeric_problem(field, value)) {
                score -= FIELD_PENALTY;
                findings.push(problem);
            }
        }
        if findings.len() > 1 {
            recommendations.push("Verify flagged numeric values against the source document".to_string());
        }
        if coverage < LOW_COVERAGE {
            recommendations.push("Supply key terms as metadata where the text does not state them".to_string());
        }

        tracing::debug!(lane = Self::NAME, score, coverage, "lane evaluated");
        Ok(VanguardResult::scored(Self::NAME, score, &self.thresholds, findings, recommendations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::output_with;
    use serde_json::json;

    #[tokio::test]
    async fn full_coverage_scores_full_marks() {
        let mut output = output_with(vec![("royaltyRate", json!(20))], vec![]);
        output.provenance.fields_expected = 4;
        output.provenance.fields_extracted = 4;
        let result = AccuracyLane::default().evaluate(&output).await.unwrap();
        assert!((result.score - 100.0).abs() < f64::EPSILON);
        assert!(result.recommendations.is_empty());
    }

    #[tokio::test]
    async fn half_coverage() {
        let mut output = output_with(vec![], vec![]);
        output.provenance.fields_expected = 10;
        output.provenance.fields_extracted = 5;
        let result = AccuracyLane::default().evaluate(&output).await.unwrap();
        assert!((result.score - 70.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn implausible_numbers_are_penalized() {
        let mut output = output_with(
            vec![("royaltyRate", json!(250)), ("bonusPayment", json!("lots"))],
            vec![],
        );
        output.provenance.fields_expected = 2;
        output.provenance.fields_extracted = 2;
        output.provenance.numeric_fields = vec!["royaltyRate".into(), "bonusPayment".into()];
        let result = AccuracyLane::default().evaluate(&output).await.unwrap();
        assert!((result.score - 80.0).abs() < f64::EPSILON);
        assert_eq!(result.findings.len(), 3);
    }

    #[test]
    fn negative_money_is_flagged() {
        assert!(numeric_problem("deductible", &json!(-5)).is_some());
        assert!(numeric_problem("deductible", &json!(5)).is_none());
    }
}
