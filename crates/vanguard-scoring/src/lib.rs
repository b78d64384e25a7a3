//! Vanguard verification
//!
//! Three independent lanes score a [`vanguard_domain::DomainOutput`]:
//!
//! - [`SecurityLane`]: personal data in extracted terms, security-relevant risks
//! - [`IntegrityLane`]: validity, compliance failures, empty extraction
//! - [`AccuracyLane`]: field coverage and numeric plausibility
//!
//! [`VanguardScorer`] runs them concurrently and joins on all three;
//! [`Aggregator`] turns the triple into an overall score and [`RiskLevel`].

pub mod accuracy;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod integrity;
pub mod lane;
pub mod scorer;
pub mod security;

pub use accuracy::AccuracyLane;
pub use aggregate::{AggregateAssessment, Aggregator, RiskLevel};
pub use config::{LaneThresholds, RiskBands, ScoringConfig};
pub use error::ScoringError;
pub use integrity::IntegrityLane;
pub use lane::{LaneStatus, VanguardLane, VanguardResult};
pub use scorer::{VanguardScorer, VanguardTriple};
pub use security::SecurityLane;

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::Value;
    use vanguard_domain::{
        ComplianceResult, DocumentType, DomainAnalysis, DomainOutput, FieldMap, OutputProvenance, Risk,
    };

    /// Valid, compliant output with the given fields and risks
    pub(crate) fn output_with(fields: Vec<(&str, Value)>, risks: Vec<Risk>) -> DomainOutput {
        let key_terms: FieldMap = fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        DomainOutput {
            provenance: OutputProvenance {
                agent_id: "test-agent".into(),
                document_type: DocumentType::Lease,
                fields_expected: 0,
                fields_extracted: 0,
                numeric_fields: Vec::new(),
            },
            analysis: DomainAnalysis {
                document_validity: true,
                key_terms_extracted: key_terms,
                compliance: ComplianceResult::passing(),
                sections: indexmap::IndexMap::new(),
                risks,
            },
            recommendations: Vec::new(),
            benchmarks: None,
        }
    }
}
