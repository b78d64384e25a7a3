//! Government compliance and risk tables

use crate::policy::GovernmentPolicy;
use crate::rules::{fmt_money, ComplianceRule, RiskRule, RuleContext};
use crate::types::{DocumentType, JurisdictionLevel, Risk, Severity};

const DEFENSE_MARKERS: &[&str] = &[
    "department of defense",
    "dod",
    "army",
    "navy",
    "air force",
    "marine corps",
    "defense logistics",
];

/// Whether the contracting agency is part of the defense establishment
#[must_use]
pub fn is_defense(ctx: &RuleContext<'_>) -> bool {
    let agency = ctx.text("agency").map(str::to_lowercase).unwrap_or_default();
    DEFENSE_MARKERS.iter().any(|marker| agency.contains(marker)) || ctx.mentions("department of defense")
}

fn is_local_buyer(ctx: &RuleContext<'_>) -> bool {
    if ctx.context("jurisdiction").as_deref() == Some("local") {
        return true;
    }
    ctx.text("agency")
        .map(str::to_lowercase)
        .is_some_and(|agency| agency.contains("city of") || agency.contains("county"))
}

fn is_cost_type(contract_type: &str) -> bool {
    let lower = contract_type.to_lowercase();
    lower.starts_with("cost") || lower.starts_with("time") || lower.starts_with("labor")
}

/// Federal, state and local rules for government documents
#[must_use]
pub fn compliance_rules(policy: &GovernmentPolicy) -> Vec<ComplianceRule> {
    let plan_threshold = policy.subcontracting_plan_threshold;

    vec![
        ComplianceRule::new(
            "far-reference",
            JurisdictionLevel::Federal,
            "Missing Federal Acquisition Regulation (FAR) clause references",
            |ctx| ctx.mentions_any(&["federal acquisition regulation", "far 52.", "far part", "48 cfr"]),
        )
        .when(|ctx| {
            ctx.is_document(&[
                DocumentType::Contract,
                DocumentType::Solicitation,
                DocumentType::Amendment,
            ])
        }),
        ComplianceRule::new(
            "subcontracting-plan",
            JurisdictionLevel::Federal,
            format!(
                "Contract value exceeds {} without a small business subcontracting plan (FAR 19.702)",
                fmt_money(plan_threshold)
            ),
            |ctx| ctx.mentions("subcontracting plan"),
        )
        .when(move |ctx| ctx.number("contractValue").is_some_and(|value| value > plan_threshold)),
        ComplianceRule::new(
            "dfars-cyber",
            JurisdictionLevel::Federal,
            "Defense contract missing DFARS 252.204-7012 safeguarding clause",
            |ctx| ctx.mentions_any(&["252.204-7012", "safeguarding covered defense information"]),
        )
        .when(|ctx| ctx.is_document(&[DocumentType::Contract, DocumentType::Solicitation]) && is_defense(ctx)),
        ComplianceRule::new(
            "equal-opportunity",
            JurisdictionLevel::Federal,
            "Missing equal opportunity clause (FAR 52.222-26)",
            |ctx| ctx.mentions("equal opportunity"),
        )
        .when(|ctx| ctx.is_document(&[DocumentType::Contract])),
        ComplianceRule::new(
            "state-prompt-payment",
            JurisdictionLevel::State,
            "State contract missing prompt payment terms",
            |ctx| ctx.mentions("prompt payment"),
        )
        .when(|ctx| ctx.context("state").is_some()),
        ComplianceRule::new(
            "local-procurement",
            JurisdictionLevel::Local,
            "Local procurement ordinance or preference policy not referenced",
            |ctx| ctx.mentions_any(&["local procurement", "local preference", "procurement ordinance"]),
        )
        .when(is_local_buyer),
    ]
}

/// Government risk rules, thresholds taken from `policy`
#[must_use]
pub fn risk_rules(policy: &GovernmentPolicy) -> Vec<RiskRule> {
    let high_value = policy.high_value_threshold;

    vec![
        RiskRule::new("noncompliance", |_, compliance| {
            (!compliance.is_compliant()).then(|| {
                Risk::new(
                    "compliance",
                    Severity::High,
                    format!(
                        "Government compliance requirements not met ({} issue(s))",
                        compliance.issues.len()
                    ),
                )
                .with_mitigation("Incorporate the missing clauses by reference before award")
            })
        }),
        RiskRule::new("cost-type-contract", |ctx, _| {
            let contract_type = ctx.text("contractType")?;
            is_cost_type(contract_type).then(|| {
                Risk::new(
                    "financial",
                    Severity::Medium,
                    format!("{contract_type} contract places cost overrun exposure on the government"),
                )
                .with_mitigation("Confirm an adequate accounting system and DCAA audit readiness")
            })
        }),
        RiskRule::new("high-value-without-convenience-termination", move |ctx, _| {
            let value = ctx.number("contractValue")?;
            (value > high_value && !ctx.mentions("termination for convenience")).then(|| {
                Risk::new(
                    "contractual",
                    Severity::High,
                    format!(
                        "Contract valued at {} has no termination for convenience clause",
                        fmt_money(value)
                    ),
                )
                .with_mitigation("Add FAR 52.249-2 termination for convenience terms")
            })
        }),
        RiskRule::new("defense-cybersecurity", |ctx, _| {
            let applies = is_defense(ctx) && ctx.is_document(&[DocumentType::Contract, DocumentType::Solicitation]);
            (applies && !ctx.mentions_any(&["nist sp 800-171", "nist 800-171", "cmmc"])).then(|| {
                Risk::new(
                    "security",
                    Severity::Critical,
                    "Defense contract lacks NIST SP 800-171 / CMMC cybersecurity requirements",
                )
                .with_mitigation("Document NIST SP 800-171 controls and the required CMMC level")
            })
        }),
        RiskRule::new("cleared-personnel", |ctx, _| {
            let clearance = ctx.text("securityClearance")?;
            Some(
                Risk::new(
                    "personnel",
                    Severity::Medium,
                    format!("Work requires {clearance} clearance for assigned personnel"),
                )
                .with_mitigation("Confirm facility clearance and cleared staffing before award"),
            )
        }),
        RiskRule::new("missing-termination", |ctx, _| {
            (ctx.is_document(&[DocumentType::Contract]) && !ctx.mentions("termination")).then(|| {
                Risk::new("contractual", Severity::Medium, "No termination clause found")
                    .with_mitigation("Add termination for default and convenience provisions")
            })
        }),
        RiskRule::new("set-aside-subcontracting-limits", |ctx, _| {
            let set_aside = ctx.text("setAside")?;
            (!ctx.mentions("limitations on subcontracting")).then(|| {
                Risk::new(
                    "compliance",
                    Severity::Medium,
                    format!("{set_aside} set-aside without limitations on subcontracting terms"),
                )
                .with_mitigation("Add FAR 52.219-14 limitations on subcontracting")
            })
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{assess_risks, check_compliance};
    use crate::types::{ComplianceResult, DomainInput, FieldMap};
    use serde_json::json;

    #[test]
    fn defense_detection_uses_agency() {
        let input = DomainInput::new(DocumentType::Contract, "x");
        let mut fields = FieldMap::new();
        fields.insert("agency".into(), json!("Department of the Navy"));
        assert!(is_defense(&RuleContext::new(&input, &fields)));
        fields.insert("agency".into(), json!("General Services Administration"));
        assert!(!is_defense(&RuleContext::new(&input, &fields)));
    }

    #[test]
    fn subcontracting_plan_only_above_threshold() {
        let rules = compliance_rules(&GovernmentPolicy::default());
        let input = DomainInput::new(DocumentType::Proposal, "proposal text");
        let mut fields = FieldMap::new();
        fields.insert("contractValue".into(), json!(500_000));
        let result = check_compliance(&rules, &RuleContext::new(&input, &fields));
        assert!(result.federal);

        fields.insert("contractValue".into(), json!(900_000));
        let result = check_compliance(&rules, &RuleContext::new(&input, &fields));
        assert!(!result.federal);
        assert!(result.issues[0].contains("$750,000"));
    }

    #[test]
    fn local_rule_applies_to_city_agency() {
        let rules = compliance_rules(&GovernmentPolicy::default());
        let input = DomainInput::new(DocumentType::Proposal, "proposal text");
        let mut fields = FieldMap::new();
        fields.insert("agency".into(), json!("City of Austin"));
        let result = check_compliance(&rules, &RuleContext::new(&input, &fields));
        assert!(!result.local);
        assert!(result.federal && result.state);
    }

    #[test]
    fn cost_plus_is_financial_risk() {
        let rules = risk_rules(&GovernmentPolicy::default());
        let input = DomainInput::new(DocumentType::Proposal, "x");
        let mut fields = FieldMap::new();
        fields.insert("contractType".into(), json!("cost-plus-fixed-fee"));
        let risks = assess_risks(&rules, &RuleContext::new(&input, &fields), &ComplianceResult::passing());
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].risk_type, "financial");
        assert_eq!(risks[0].severity, Severity::Medium);
    }
}
