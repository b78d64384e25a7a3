//! Government contracting agent

mod patterns;
mod rules;

pub use patterns::PATTERNS;
pub use rules::is_defense;

use crate::agent::{object, AgentDescriptor, DomainAgent};
use crate::error::DomainError;
use crate::extract::{select_fields, PatternExtractor};
use crate::policy::GovernmentPolicy;
use crate::rules::{self as engine, fmt_money, ComplianceRule, Recommendations, RiskRule, RuleContext};
use crate::types::{ComplianceResult, DocumentType, DomainInput, FieldMap, Risk};
use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;

/// Government agent descriptor
pub const DESCRIPTOR: AgentDescriptor = AgentDescriptor {
    id: "government-agent",
    name: "Government Contracting Agent",
    vertical: "government",
    capabilities: &[
        "contract-analysis",
        "far-compliance",
        "dfars-compliance",
        "solicitation-review",
        "proposal-review",
        "audit-support",
    ],
    document_types: &[
        DocumentType::Contract,
        DocumentType::Solicitation,
        DocumentType::Proposal,
        DocumentType::Amendment,
        DocumentType::Audit,
        DocumentType::Regulatory,
    ],
};

const MIN_DOCUMENT_LENGTH: usize = 200;
const REQUIRED_KEYWORDS: &[&str] = &["contract", "solicitation", "agency", "government", "federal", "award"];

const CONTRACT_FIELDS: &[&str] = &[
    "contractNumber",
    "contractValue",
    "contractType",
    "periodOfPerformance",
    "securityClearance",
];
const PROCUREMENT_FIELDS: &[&str] = &[
    "solicitationNumber",
    "agency",
    "naicsCode",
    "setAside",
    "cageCode",
    "auditScope",
];

/// Government contracting agent
#[derive(Debug)]
pub struct GovernmentAgent {
    policy: GovernmentPolicy,
    extractor: PatternExtractor,
    compliance: Vec<ComplianceRule>,
    risks: Vec<RiskRule>,
}

impl GovernmentAgent {
    /// Build the agent with the given thresholds
    ///
    /// # Errors
    /// `DomainError::Pattern` if the pattern table fails to compile.
    pub fn new(policy: GovernmentPolicy) -> Result<Self, DomainError> {
        Ok(Self {
            extractor: PatternExtractor::compile(PATTERNS)?,
            compliance: rules::compliance_rules(&policy),
            risks: rules::risk_rules(&policy),
            policy,
        })
    }

    fn financial_recommendations(&self, ctx: &RuleContext<'_>) -> Vec<String> {
        let mut items = Vec::new();
        match ctx.number("contractValue") {
            None => items.push("State the total contract value or ceiling price".to_string()),
            Some(value) if value > self.policy.subcontracting_plan_threshold && !ctx.mentions("subcontracting plan") => {
                items.push(format!(
                    "Prepare a small business subcontracting plan for a contract valued at {}",
                    fmt_money(value)
                ));
            }
            Some(_) => {}
        }
        if ctx.text("contractType").is_none() {
            items.push("Identify the contract type (e.g. firm-fixed-price, cost-plus-fixed-fee)".to_string());
        }
        items
    }
}

fn document_recommendations(document_type: DocumentType) -> &'static [&'static str] {
    match document_type {
        DocumentType::Contract => &[
            "Verify SAM.gov registration and CAGE code are current",
            "Flow down required FAR clauses to subcontractors",
        ],
        DocumentType::Solicitation => &[
            "Map every evaluation criterion to a proposal section",
            "Submit questions before the solicitation Q&A deadline",
        ],
        DocumentType::Proposal => &["Confirm compliance with all Section L instructions"],
        DocumentType::Amendment => &["Acknowledge the amendment in the proposal or contract file"],
        DocumentType::Audit => &["Prepare supporting documentation for every item in the audit scope"],
        _ => &["Track the regulatory effective date and comment period"],
    }
}

const CLOSING: &[&str] = &[
    "Have government contracts counsel review before signature",
    "Maintain contract records for the FAR 4.703 retention period",
];

impl DomainAgent for GovernmentAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &DESCRIPTOR
    }

    fn extractor(&self) -> &PatternExtractor {
        &self.extractor
    }

    /// Audit documents without an explicit scope get a generated `audit-<unix millis>` id
    fn extract(&self, input: &DomainInput) -> FieldMap {
        let mut fields = self.extractor.extract(&input.content, &input.metadata);
        if input.document_type == DocumentType::Audit && !fields.contains_key("auditScope") {
            fields.insert(
                "auditScope".to_string(),
                Value::String(format!("audit-{}", Utc::now().timestamp_millis())),
            );
        }
        fields
    }

    fn document_validity(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.input.content.trim().len() >= MIN_DOCUMENT_LENGTH && ctx.mentions_any(REQUIRED_KEYWORDS)
    }

    fn check_compliance(&self, ctx: &RuleContext<'_>) -> ComplianceResult {
        engine::check_compliance(&self.compliance, ctx)
    }

    fn assess_risks(&self, ctx: &RuleContext<'_>, compliance: &ComplianceResult) -> Vec<Risk> {
        engine::assess_risks(&self.risks, ctx, compliance)
    }

    fn sections(&self, ctx: &RuleContext<'_>) -> Result<IndexMap<String, Value>, DomainError> {
        let mut sections = IndexMap::new();
        sections.insert(
            "contractTerms".to_string(),
            object(select_fields(ctx.fields, CONTRACT_FIELDS)),
        );
        sections.insert(
            "procurementDetails".to_string(),
            object(select_fields(ctx.fields, PROCUREMENT_FIELDS)),
        );
        Ok(sections)
    }

    fn recommend(&self, ctx: &RuleContext<'_>, compliance: &ComplianceResult, risks: &[Risk]) -> Vec<String> {
        Recommendations::new(compliance)
            .financial(self.financial_recommendations(ctx))
            .critical_risks(risks)
            .document_specific(document_recommendations(ctx.document_type()))
            .closing(CLOSING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use serde_json::json;

    fn agent() -> GovernmentAgent {
        GovernmentAgent::new(GovernmentPolicy::default()).unwrap()
    }

    #[tokio::test]
    async fn audit_scope_defaults_to_generated_id() {
        let output = agent()
            .process(&DomainInput::new(DocumentType::Audit, "Incurred cost audit request"))
            .await
            .unwrap();
        let scope = output.analysis.key_terms_extracted["auditScope"].as_str().unwrap();
        assert!(scope.starts_with("audit-"));
        assert!(scope["audit-".len()..].parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn explicit_audit_scope_is_kept() {
        let output = agent()
            .process(&DomainInput::new(DocumentType::Audit, "Audit scope: FY2024 incurred costs"))
            .await
            .unwrap();
        assert_eq!(
            output.analysis.key_terms_extracted["auditScope"],
            json!("FY2024 incurred costs")
        );
    }

    #[tokio::test]
    async fn defense_contract_without_cyber_terms_is_critical() {
        let text = "Contract No. W912DY-24-C-0042\nAgency: Department of the Army\n\
                    Total value of $2,000,000. Firm-fixed-price. Subject to the Federal Acquisition Regulation.";
        let output = agent()
            .process(&DomainInput::new(DocumentType::Contract, text))
            .await
            .unwrap();
        assert!(!output.analysis.compliance.federal);
        assert!(output.analysis.compliance.issues.iter().any(|i| i.contains("DFARS")));
        assert!(output.risks_with_severity(Severity::Critical).any(|r| r.risk_type == "security"));
        assert!(output.recommendations[0].starts_with("Address"));
        assert!(output.benchmarks.is_none());
        assert_eq!(
            output.section("contractTerms").unwrap()["contractNumber"],
            json!("W912DY-24-C-0042")
        );
    }

    #[tokio::test]
    async fn state_context_requires_prompt_payment() {
        let input = DomainInput::new(DocumentType::Proposal, "Proposal for agency services")
            .with_context("state", "virginia");
        let output = agent().process(&input).await.unwrap();
        assert!(!output.analysis.compliance.state);
    }
}
