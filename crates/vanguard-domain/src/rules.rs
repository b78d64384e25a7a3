//! Rule engines shared by the domain agents
//!
//! Compliance and risk rules are data: an id, a level or category, and boxed
//! predicates over a [`RuleContext`]. Domains build their tables once at agent
//! construction so policy thresholds can be captured by the predicates.

use crate::extract::{number_field, text_field};
use crate::types::{ComplianceResult, DocumentType, DomainInput, FieldMap, JurisdictionLevel, Risk, Severity};
use std::any::Any;
use std::fmt;
use std::sync::OnceLock;

/// Read-only view over one document for rule predicates
///
/// Lives for one `process` call, so it also holds the agent's derived
/// analysis (see [`RuleContext::derived`]) computed at most once per call.
pub struct RuleContext<'a> {
    /// Original input
    pub input: &'a DomainInput,
    /// Extracted fields
    pub fields: &'a FieldMap,
    content_lower: String,
    derived: OnceLock<Box<dyn Any + Send + Sync>>,
}

impl fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("input", &self.input)
            .field("fields", &self.fields)
            .field("derived", &self.derived.get().is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> RuleContext<'a> {
    /// Build a context, lowercasing the content once
    #[must_use]
    pub fn new(input: &'a DomainInput, fields: &'a FieldMap) -> Self {
        Self {
            input,
            fields,
            content_lower: input.content.to_lowercase(),
            derived: OnceLock::new(),
        }
    }

    /// Per-call derived value, computed by `init` on first use
    ///
    /// One slot per context: `None` when the slot already holds another type.
    pub fn derived<T: Any + Send + Sync>(&self, init: impl FnOnce() -> T) -> Option<&T> {
        let slot = self
            .derived
            .get_or_init(|| Box::new(init()) as Box<dyn Any + Send + Sync>);
        (**slot).downcast_ref::<T>()
    }

    /// Document category
    #[must_use]
    pub fn document_type(&self) -> DocumentType {
        self.input.document_type
    }

    /// Whether the document is one of `types`
    #[must_use]
    pub fn is_document(&self, types: &[DocumentType]) -> bool {
        types.contains(&self.input.document_type)
    }

    /// Case-insensitive substring check; `needle` must be lowercase
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.content_lower.contains(needle)
    }

    /// Any of the lowercase needles appear
    #[must_use]
    pub fn mentions_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.mentions(needle))
    }

    /// Numeric field
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        number_field(self.fields, key)
    }

    /// Text field
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        text_field(self.fields, key)
    }

    /// Lowercased context string
    #[must_use]
    pub fn context(&self, key: &str) -> Option<String> {
        self.input.context_str(key).map(|s| s.trim().to_lowercase())
    }

    /// Governing state: `context.state` first, then the extracted `state` field
    #[must_use]
    pub fn state(&self) -> Option<String> {
        self.context("state")
            .or_else(|| self.text("state").map(|s| s.trim().to_lowercase()))
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// Governing state equals `name` (lowercase)
    #[must_use]
    pub fn state_is(&self, name: &str) -> bool {
        self.state().as_deref() == Some(name)
    }
}

/// Boxed predicate over a rule context
pub type Predicate = Box<dyn Fn(&RuleContext<'_>) -> bool + Send + Sync>;

/// One jurisdiction-scoped compliance rule
pub struct ComplianceRule {
    /// Stable rule id
    pub id: &'static str,
    /// Level whose flag a failure clears
    pub level: JurisdictionLevel,
    /// Message appended to `issues` on failure
    pub failure_message: String,
    applies: Predicate,
    passes: Predicate,
}

impl ComplianceRule {
    /// Rule that always applies
    pub fn new(
        id: &'static str,
        level: JurisdictionLevel,
        failure_message: impl Into<String>,
        passes: impl Fn(&RuleContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            level,
            failure_message: failure_message.into(),
            applies: Box::new(|_| true),
            passes: Box::new(passes),
        }
    }

    /// Restrict the rule to documents where `applies` holds
    #[must_use]
    pub fn when(mut self, applies: impl Fn(&RuleContext<'_>) -> bool + Send + Sync + 'static) -> Self {
        self.applies = Box::new(applies);
        self
    }

    /// Applicability condition
    #[must_use]
    pub fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        (self.applies)(ctx)
    }

    /// Rule predicate
    #[must_use]
    pub fn passes(&self, ctx: &RuleContext<'_>) -> bool {
        (self.passes)(ctx)
    }
}

impl fmt::Debug for ComplianceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplianceRule")
            .field("id", &self.id)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Evaluate every applicable rule in order
///
/// Flags only move from `true` to `false`; all rules for a level run even
/// after one has failed, so several issues per level are possible.
#[must_use]
pub fn check_compliance(rules: &[ComplianceRule], ctx: &RuleContext<'_>) -> ComplianceResult {
    let mut result = ComplianceResult::passing();
    for rule in rules {
        if !rule.applies(ctx) {
            continue;
        }
        if !rule.passes(ctx) {
            tracing::trace!(rule = rule.id, level = ?rule.level, "compliance rule failed");
            result.record_failure(rule.level, rule.failure_message.clone());
        }
    }
    result
}

/// Boxed risk evaluator
pub type RiskEvaluator = Box<dyn Fn(&RuleContext<'_>, &ComplianceResult) -> Option<Risk> + Send + Sync>;

/// One independent risk rule; emits zero or one finding
pub struct RiskRule {
    /// Stable rule id
    pub id: &'static str,
    evaluate: RiskEvaluator,
}

impl RiskRule {
    /// Create a rule
    pub fn new(
        id: &'static str,
        evaluate: impl Fn(&RuleContext<'_>, &ComplianceResult) -> Option<Risk> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            evaluate: Box::new(evaluate),
        }
    }

    /// Run the rule
    #[must_use]
    pub fn evaluate(&self, ctx: &RuleContext<'_>, compliance: &ComplianceResult) -> Option<Risk> {
        (self.evaluate)(ctx, compliance)
    }
}

impl fmt::Debug for RiskRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskRule").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Evaluate every risk rule; no rule suppresses another
#[must_use]
pub fn assess_risks(rules: &[RiskRule], ctx: &RuleContext<'_>, compliance: &ComplianceResult) -> Vec<Risk> {
    rules
        .iter()
        .filter_map(|rule| rule.evaluate(ctx, compliance))
        .collect()
}

/// Ordered recommendation sections
///
/// Assembled as: compliance summary, financial terms, critical-risk summary,
/// document-type boilerplate, closing.
#[derive(Debug, Default)]
pub struct Recommendations {
    items: Vec<String>,
}

impl Recommendations {
    /// Start with the compliance summary, if there are issues
    #[must_use]
    pub fn new(compliance: &ComplianceResult) -> Self {
        let mut items = Vec::new();
        if !compliance.issues.is_empty() {
            items.push(format!(
                "Address {} compliance issue(s): {}",
                compliance.issues.len(),
                compliance.issues.join("; ")
            ));
        }
        Self { items }
    }

    /// Append financial-term recommendations
    #[must_use]
    pub fn financial(mut self, items: impl IntoIterator<Item = String>) -> Self {
        self.items.extend(items);
        self
    }

    /// Append the critical-risk summary when any risk is critical
    #[must_use]
    pub fn critical_risks(mut self, risks: &[Risk]) -> Self {
        let critical: Vec<&str> = risks
            .iter()
            .filter(|risk| risk.severity == Severity::Critical)
            .map(|risk| risk.description.as_str())
            .collect();
        if !critical.is_empty() {
            self.items.push(format!(
                "Resolve {} critical risk(s) before execution: {}",
                critical.len(),
                critical.join("; ")
            ));
        }
        self
    }

    /// Append document-type boilerplate
    #[must_use]
    pub fn document_specific(mut self, items: &[&str]) -> Self {
        self.items.extend(items.iter().map(ToString::to_string));
        self
    }

    /// Append closing recommendations and finish
    #[must_use]
    pub fn closing(mut self, items: &[&str]) -> Vec<String> {
        self.items.extend(items.iter().map(ToString::to_string));
        self.items
    }
}

/// Format a float without a trailing `.0`
#[must_use]
pub fn fmt_number(value: f64) -> String {
    format!("{value}")
}

/// Format a dollar amount with thousands separators
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fmt_money(value: f64) -> String {
    let whole = value.abs().round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
