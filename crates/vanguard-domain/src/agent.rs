//! Domain agent contract
//!
//! One trait, one implementing type per vertical. The stages run strictly in
//! order inside [`DomainAgent::process`]: extraction, compliance, risks,
//! sections, recommendations, benchmarks.

use crate::error::DomainError;
use crate::extract::PatternExtractor;
use crate::rules::RuleContext;
use crate::types::{
    ComplianceResult, DocumentType, DomainAnalysis, DomainInput, DomainOutput, FieldMap, OutputProvenance,
    Risk,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Static description of an agent, used for discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDescriptor {
    /// Canonical id, e.g. `energy-agent`
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Primary vertical
    pub vertical: &'static str,
    /// Advertised capabilities
    pub capabilities: &'static [&'static str],
    /// Accepted document categories
    pub document_types: &'static [DocumentType],
}

impl AgentDescriptor {
    /// Whether the agent advertises `capability`
    #[inline]
    #[must_use]
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| *c == capability)
    }

    /// Whether the agent accepts `document_type`
    #[inline]
    #[must_use]
    pub fn supports(&self, document_type: DocumentType) -> bool {
        self.document_types.contains(&document_type)
    }
}

/// Domain agent
///
/// Implementors provide the rule tables; the default [`process`](Self::process)
/// sequences them. Agents hold no per-call state and can be shared behind `Arc`.
#[async_trait]
pub trait DomainAgent: Send + Sync + fmt::Debug {
    /// Discovery descriptor
    fn descriptor(&self) -> &AgentDescriptor;

    /// Compiled pattern table
    fn extractor(&self) -> &PatternExtractor;

    /// Extract key terms (patterns, then metadata overrides)
    fn extract(&self, input: &DomainInput) -> FieldMap {
        self.extractor().extract(&input.content, &input.metadata)
    }

    /// Minimum length and required keyword check
    fn document_validity(&self, ctx: &RuleContext<'_>) -> bool;

    /// Jurisdiction-scoped compliance rules
    fn check_compliance(&self, ctx: &RuleContext<'_>) -> ComplianceResult;

    /// Independent risk rules
    fn assess_risks(&self, ctx: &RuleContext<'_>, compliance: &ComplianceResult) -> Vec<Risk>;

    /// Domain sections such as `financialTerms`
    ///
    /// # Errors
    /// `DomainError::Processing` when a section cannot be built.
    fn sections(&self, ctx: &RuleContext<'_>) -> Result<IndexMap<String, Value>, DomainError>;

    /// Ordered recommendations
    fn recommend(&self, ctx: &RuleContext<'_>, compliance: &ComplianceResult, risks: &[Risk]) -> Vec<String>;

    /// Point-in-time reference data, if the domain has any
    fn benchmarks(&self, _ctx: &RuleContext<'_>) -> Option<FieldMap> {
        None
    }

    /// Run the full pipeline for one document
    ///
    /// # Errors
    /// `DomainError::Validation` when content is empty; stage failures propagate unchanged.
    async fn process(&self, input: &DomainInput) -> Result<DomainOutput, DomainError> {
        input.validate()?;
        let descriptor = self.descriptor();
        if !descriptor.supports(input.document_type) {
            tracing::warn!(
                agent = descriptor.id,
                document_type = %input.document_type,
                "document type not advertised by agent, processing anyway"
            );
        }

        let fields = self.extract(input);
        let ctx = RuleContext::new(input, &fields);
        let document_validity = self.document_validity(&ctx);
        let compliance = self.check_compliance(&ctx);
        let risks = self.assess_risks(&ctx, &compliance);
        let sections = self.sections(&ctx)?;
        let recommendations = self.recommend(&ctx, &compliance, &risks);
        let benchmarks = self.benchmarks(&ctx);

        let extractor = self.extractor();
        let expected = extractor.field_names();
        let provenance = OutputProvenance {
            agent_id: descriptor.id.to_string(),
            document_type: input.document_type,
            fields_expected: expected.len(),
            fields_extracted: expected.iter().filter(|name| fields.contains_key(**name)).count(),
            numeric_fields: extractor
                .numeric_field_names()
                .into_iter()
                .map(ToString::to_string)
                .collect(),
        };

        tracing::debug!(
            agent = descriptor.id,
            fields = fields.len(),
            issues = compliance.issues.len(),
            risks = risks.len(),
            recommendations = recommendations.len(),
            "domain analysis complete"
        );

        Ok(DomainOutput {
            analysis: DomainAnalysis {
                document_validity,
                key_terms_extracted: fields,
                compliance,
                sections,
                risks,
            },
            recommendations,
            benchmarks,
            provenance,
        })
    }
}

/// Serialize a section value, mapping failures to a processing error
///
/// # Errors
/// `DomainError::Processing` naming the section.
pub fn section_value<T: Serialize>(section: &'static str, value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::processing(section, e))
}

/// Benchmark record as a field map
///
/// Benchmarks are optional output, so a record that does not serialize to an
/// object is logged and dropped rather than failing the call.
#[must_use]
pub fn benchmark_fields<T: Serialize>(agent_id: &str, value: &T) -> Option<FieldMap> {
    match section_value("benchmarks", value) {
        Ok(Value::Object(map)) => Some(map.into_iter().collect()),
        Ok(other) => {
            tracing::warn!(agent = agent_id, value = %other, "benchmarks are not an object, dropped");
            None
        }
        Err(e) => {
            tracing::warn!(agent = agent_id, error = %e, "benchmarks failed to serialize, dropped");
            None
        }
    }
}

/// A field subset as a JSON object
#[must_use]
pub fn object(fields: FieldMap) -> Value {
    Value::Object(fields.into_iter().collect())
}
