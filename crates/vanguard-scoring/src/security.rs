//! Security lane: personal data exposure and security-relevant risks

use crate::config::LaneThresholds;
use crate::error::ScoringError;
use crate::lane::{VanguardLane, VanguardResult};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use vanguard_domain::{DomainOutput, Severity};

const PII_PENALTY: f64 = 15.0;
const SECURITY_RISK_TYPES: &[&str] = &["security", "legal", "regulatory", "compliance"];

const DETECTORS: &[(&str, &str)] = &[
    ("social security number", r"\b\d{3}-\d{2}-\d{4}\b"),
    ("payment card number", r"\b\d{4}[ \-]?\d{4}[ \-]?\d{4}[ \-]?\d{1,4}\b"),
    ("email address", r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}"),
];

/// Penalty for one risk of the given severity
#[must_use]
pub fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 25.0,
        Severity::High => 15.0,
        Severity::Medium => 8.0,
        Severity::Low => 3.0,
    }
}

/// Security lane
#[derive(Debug)]
pub struct SecurityLane {
    thresholds: LaneThresholds,
    detectors: Vec<(&'static str, Regex)>,
}

impl SecurityLane {
    /// Lane name
    pub const NAME: &'static str = "Security";

    /// Compile the PII detectors
    ///
    /// # Errors
    /// `ScoringError::Pattern` if a detector fails to compile.
    pub fn new(thresholds: LaneThresholds) -> Result<Self, ScoringError> {
        let detectors = DETECTORS
            .iter()
            .map(|(name, pattern)| {
                Regex::new(pattern)
                    .map(|regex| (*name, regex))
                    .map_err(|source| ScoringError::Pattern { name: *name, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { thresholds, detectors })
    }

    /// `(field, detector)` pairs for every PII hit in the extracted terms
    #[must_use]
    pub fn scan(&self, output: &DomainOutput) -> Vec<(String, &'static str)> {
        let mut hits = Vec::new();
        for (field, value) in &output.analysis.key_terms_extracted {
            let mut texts = Vec::new();
            collect_strings(value, &mut texts);
            for (name, regex) in &self.detectors {
                if texts.iter().any(|text| regex.is_match(text)) {
                    hits.push((field.clone(), *name));
                }
            }
        }
        hits
    }
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_strings(item, out)),
        _ => {}
    }
}

#[async_trait]
impl VanguardLane for SecurityLane {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn evaluate(&self, output: &DomainOutput) -> Result<VanguardResult, ScoringError> {
        let mut score = 100.0;
        let mut findings = Vec::new();
        let mut recommendations = Vec::new();

        let hits = self.scan(output);
        for (field, detector) in &hits {
            score -= PII_PENALTY;
            findings.push(format!("Possible {detector} in extracted field '{field}'"));
        }
        if !hits.is_empty() {
            recommendations.push("Redact personal data from extracted fields before storage".to_string());
        }

        let mut critical = false;
        for risk in output
            .analysis
            .risks
            .iter()
            .filter(|risk| SECURITY_RISK_TYPES.contains(&risk.risk_type.as_str()))
        {
            score -= severity_weight(risk.severity);
            critical |= risk.severity == Severity::Critical;
            findings.push(format!("{} {} risk: {}", risk.severity, risk.risk_type, risk.description));
        }
        if critical {
            recommendations.push("Resolve critical security findings before approval".to_string());
        }

        if findings.is_empty() {
            findings.push("No personal data exposure or security risks detected".to_string());
        }

        tracing::debug!(lane = Self::NAME, score, pii_hits = hits.len(), "lane evaluated");
        Ok(VanguardResult::scored(Self::NAME, score, &self.thresholds, findings, recommendations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::output_with;
    use serde_json::json;
    use vanguard_domain::Risk;

    fn lane() -> SecurityLane {
        SecurityLane::new(LaneThresholds::default()).unwrap()
    }

    #[tokio::test]
    async fn clean_output_passes() {
        let result = lane().evaluate(&output_with(vec![], vec![])).await.unwrap();
        assert!((result.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(result.findings.len(), 1);
    }

    #[tokio::test]
    async fn pii_in_fields_is_penalized() {
        let fields = vec![
            ("insured", json!("Maria Lopez, SSN 123-45-6789")),
            ("contact", json!(["billing", "maria@example.com"])),
        ];
        let result = lane().evaluate(&output_with(fields, vec![])).await.unwrap();
        assert!((result.score - 70.0).abs() < f64::EPSILON);
        assert_eq!(result.findings.len(), 2);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[tokio::test]
    async fn only_security_relevant_risks_count() {
        let risks = vec![
            Risk::new("security", Severity::Critical, "no CMMC"),
            Risk::new("legal", Severity::High, "no indemnity"),
            Risk::new("financial", Severity::Critical, "ignored"),
        ];
        let result = lane().evaluate(&output_with(vec![], risks)).await.unwrap();
        assert!((result.score - 60.0).abs() < f64::EPSILON);
        assert!(result.recommendations.iter().any(|r| r.contains("critical")));
    }

    #[test]
    fn weights_are_ordered() {
        assert!(severity_weight(Severity::Critical) > severity_weight(Severity::High));
        assert!(severity_weight(Severity::High) > severity_weight(Severity::Medium));
        assert!(severity_weight(Severity::Medium) > severity_weight(Severity::Low));
    }
}
