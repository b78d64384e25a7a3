//! Core data model shared by every domain agent
//!
//! - [`DomainInput`]: raw document text plus caller metadata/context
//! - [`DomainOutput`]: extracted terms, compliance, risks and recommendations
//! - [`ComplianceResult`], [`Risk`], [`Severity`]

use crate::error::DomainError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Ordered field map (`map<string, any>`), insertion order is extraction order
pub type FieldMap = IndexMap<String, Value>;

/// Document categories across all verticals
///
/// Each agent accepts a closed subset, see [`crate::AgentDescriptor::document_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Mineral / oil and gas lease
    Lease,
    /// Commercial or government contract
    Contract,
    /// Drilling or operating permit
    Permit,
    /// Environmental assessment or report
    Environmental,
    /// Regulatory filing
    Regulatory,
    /// Technical specification
    Technical,
    /// Government solicitation (RFP / RFQ)
    Solicitation,
    /// Offeror proposal
    Proposal,
    /// Contract modification
    Amendment,
    /// Audit report or request
    Audit,
    /// Insurance policy
    Policy,
    /// Insurance claim
    Claim,
    /// Policy endorsement
    Endorsement,
    /// Insurance application
    Application,
    /// Certificate of insurance
    Certificate,
}

impl DocumentType {
    /// Lowercase wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lease => "lease",
            Self::Contract => "contract",
            Self::Permit => "permit",
            Self::Environmental => "environmental",
            Self::Regulatory => "regulatory",
            Self::Technical => "technical",
            Self::Solicitation => "solicitation",
            Self::Proposal => "proposal",
            Self::Amendment => "amendment",
            Self::Audit => "audit",
            Self::Policy => "policy",
            Self::Claim => "claim",
            Self::Endorsement => "endorsement",
            Self::Application => "application",
            Self::Certificate => "certificate",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to [`crate::DomainAgent::process`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainInput {
    /// Document category
    pub document_type: DocumentType,
    /// Raw document text, must be non-empty
    pub content: String,
    /// Explicit field values; these win over text extraction
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: FieldMap,
    /// Caller context (e.g. `state`, `jurisdiction`)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub context: FieldMap,
}

impl DomainInput {
    /// Create input with empty metadata and context
    #[must_use]
    pub fn new(document_type: DocumentType, content: impl Into<String>) -> Self {
        Self {
            document_type,
            content: content.into(),
            metadata: FieldMap::new(),
            context: FieldMap::new(),
        }
    }

    /// Add a metadata value
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Add a context value
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Parse a possibly-absent record at the invocation boundary
    ///
    /// # Errors
    /// `DomainError::Validation` when the value is null, malformed, or has empty content.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        if value.is_null() {
            return Err(DomainError::validation("input is required"));
        }
        let input: Self = serde_json::from_value(value)
            .map_err(|e| DomainError::validation(format!("malformed input: {e}")))?;
        input.validate()?;
        Ok(input)
    }

    /// Check the input contract
    ///
    /// # Errors
    /// `DomainError::Validation` when `content` is empty or whitespace.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.content.trim().is_empty() {
            return Err(DomainError::validation("content is required and must not be empty"));
        }
        Ok(())
    }

    /// Context value as a string, if present
    #[must_use]
    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }
}

/// Risk severity, assigned by the producing rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Low,
    /// Needs attention
    Medium,
    /// Significant exposure
    High,
    /// Must be resolved before signing
    Critical,
}

impl Severity {
    /// Lowercase wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed risk finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    /// Risk category (`financial`, `regulatory`, `legal`, ...)
    #[serde(rename = "type")]
    pub risk_type: String,
    /// Severity
    pub severity: Severity,
    /// Human-readable description
    pub description: String,
    /// Suggested mitigation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
}

impl Risk {
    /// Create a risk without mitigation
    #[must_use]
    pub fn new(risk_type: impl Into<String>, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            risk_type: risk_type.into(),
            severity,
            description: description.into(),
            mitigation: None,
        }
    }

    /// Attach a mitigation
    #[must_use]
    pub fn with_mitigation(mut self, mitigation: impl Into<String>) -> Self {
        self.mitigation = Some(mitigation.into());
        self
    }
}

/// Jurisdiction level a compliance rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JurisdictionLevel {
    /// Federal
    Federal,
    /// State
    State,
    /// Local (county / municipal)
    Local,
}

/// Compliance flags per jurisdiction plus the union of failure reasons
///
/// Flags start `true` and only ever move to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    /// Federal requirements satisfied
    pub federal: bool,
    /// State requirements satisfied
    pub state: bool,
    /// Local requirements satisfied
    pub local: bool,
    /// Failure messages in rule order
    pub issues: Vec<String>,
}

impl ComplianceResult {
    /// All levels passing, no issues
    #[must_use]
    pub fn passing() -> Self {
        Self {
            federal: true,
            state: true,
            local: true,
            issues: Vec::new(),
        }
    }

    /// Flag for a level
    #[must_use]
    pub fn level(&self, level: JurisdictionLevel) -> bool {
        match level {
            JurisdictionLevel::Federal => self.federal,
            JurisdictionLevel::State => self.state,
            JurisdictionLevel::Local => self.local,
        }
    }

    /// Record a failed rule: flag goes false, message is appended
    pub fn record_failure(&mut self, level: JurisdictionLevel, message: impl Into<String>) {
        match level {
            JurisdictionLevel::Federal => self.federal = false,
            JurisdictionLevel::State => self.state = false,
            JurisdictionLevel::Local => self.local = false,
        }
        self.issues.push(message.into());
    }

    /// Every level passes
    #[must_use]
    pub fn is_compliant(&self) -> bool {
        self.federal && self.state && self.local
    }

    /// Levels currently failing
    #[must_use]
    pub fn failed_levels(&self) -> Vec<JurisdictionLevel> {
        [
            JurisdictionLevel::Federal,
            JurisdictionLevel::State,
            JurisdictionLevel::Local,
        ]
        .into_iter()
        .filter(|level| !self.level(*level))
        .collect()
    }
}

impl Default for ComplianceResult {
    fn default() -> Self {
        Self::passing()
    }
}

/// Structured analysis of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainAnalysis {
    /// Minimum-length and required-keyword check
    pub document_validity: bool,
    /// All extracted fields (patterns, then metadata overrides)
    pub key_terms_extracted: FieldMap,
    /// Compliance flags and issues
    pub compliance: ComplianceResult,
    /// Domain sections such as `financialTerms` or `claimsAnalysis`
    #[serde(flatten)]
    pub sections: IndexMap<String, Value>,
    /// Risk findings in rule order
    pub risks: Vec<Risk>,
}

/// Where an output came from, used by the accuracy lane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputProvenance {
    /// Producing agent id
    pub agent_id: String,
    /// Document category processed
    pub document_type: DocumentType,
    /// Distinct fields in the agent's pattern table
    pub fields_expected: usize,
    /// How many of those fields were populated
    pub fields_extracted: usize,
    /// Fields the pattern table declares numeric
    #[serde(default)]
    pub numeric_fields: Vec<String>,
}

impl OutputProvenance {
    /// Fraction of pattern-table fields populated, in `0.0..=1.0`
    #[must_use]
    pub fn field_coverage(&self) -> f64 {
        if self.fields_expected == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.fields_extracted as f64 / self.fields_expected as f64;
        ratio.clamp(0.0, 1.0)
    }
}

/// Output of one `process` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainOutput {
    /// Structured analysis
    pub analysis: DomainAnalysis,
    /// Free-text recommendations, presentation order
    pub recommendations: Vec<String>,
    /// Point-in-time industry reference data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmarks: Option<FieldMap>,
    /// Producing agent details
    pub provenance: OutputProvenance,
}

impl DomainOutput {
    /// Domain section by name
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.analysis.sections.get(name)
    }

    /// Risks at exactly the given severity
    pub fn risks_with_severity(&self, severity: Severity) -> impl Iterator<Item = &Risk> {
        self.analysis
            .risks
            .iter()
            .filter(move |risk| risk.severity == severity)
    }

    /// Highest severity among the risks
    #[must_use]
    pub fn max_severity(&self) -> Option<Severity> {
        self.analysis.risks.iter().map(|risk| risk.severity).max()
    }
}
