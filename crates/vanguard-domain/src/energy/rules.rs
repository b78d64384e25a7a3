//! Energy compliance and risk tables

use crate::policy::EnergyPolicy;
use crate::rules::{fmt_number, ComplianceRule, RiskRule};
use crate::types::{DocumentType, JurisdictionLevel, Risk, Severity};

/// Federal, state and local rules for energy documents
#[must_use]
pub fn compliance_rules() -> Vec<ComplianceRule> {
    vec![
        ComplianceRule::new(
            "federal-environmental-protection",
            JurisdictionLevel::Federal,
            "Missing environmental protection clause required for federal compliance",
            |ctx| ctx.mentions("environmental protection"),
        ),
        ComplianceRule::new(
            "federal-lands-onshore-leasing",
            JurisdictionLevel::Federal,
            "Federal lands referenced without 43 CFR 3100 onshore leasing terms",
            |ctx| ctx.mentions_any(&["43 cfr", "onshore oil and gas leasing"]),
        )
        .when(|ctx| ctx.mentions_any(&["federal land", "bureau of land management", "blm "])),
        ComplianceRule::new(
            "federal-endangered-species",
            JurisdictionLevel::Federal,
            "Permit or environmental document does not address the Endangered Species Act",
            |ctx| ctx.mentions("endangered species"),
        )
        .when(|ctx| ctx.is_document(&[DocumentType::Permit, DocumentType::Environmental])),
        ComplianceRule::new(
            "texas-railroad-commission",
            JurisdictionLevel::State,
            "Texas document missing Railroad Commission of Texas regulatory reference",
            |ctx| ctx.mentions("railroad commission"),
        )
        .when(|ctx| ctx.state_is("texas")),
        ComplianceRule::new(
            "oklahoma-corporation-commission",
            JurisdictionLevel::State,
            "Oklahoma document missing Oklahoma Corporation Commission reference",
            |ctx| ctx.mentions("corporation commission"),
        )
        .when(|ctx| ctx.state_is("oklahoma")),
        ComplianceRule::new(
            "north-dakota-industrial-commission",
            JurisdictionLevel::State,
            "North Dakota document missing Industrial Commission reference",
            |ctx| ctx.mentions("industrial commission"),
        )
        .when(|ctx| ctx.state_is("north dakota")),
        ComplianceRule::new(
            "state-plugging-bond",
            JurisdictionLevel::State,
            "No plugging bond or financial assurance stated for well operations",
            |ctx| ctx.mentions_any(&["plugging bond", "financial assurance"]),
        )
        .when(|ctx| ctx.is_document(&[DocumentType::Permit, DocumentType::Regulatory])),
        ComplianceRule::new(
            "local-recording",
            JurisdictionLevel::Local,
            "Lease does not provide for recording with the county clerk",
            |ctx| ctx.mentions_any(&["recorded", "recording"]),
        )
        .when(|ctx| ctx.is_document(&[DocumentType::Lease])),
        ComplianceRule::new(
            "local-setback",
            JurisdictionLevel::Local,
            "No well setback distance specified for local zoning",
            |ctx| ctx.mentions("setback"),
        )
        .when(|ctx| ctx.is_document(&[DocumentType::Permit, DocumentType::Technical])),
    ]
}

/// Energy risk rules, thresholds taken from `policy`
#[must_use]
pub fn risk_rules(policy: &EnergyPolicy) -> Vec<RiskRule> {
    let market_rate = policy.market_royalty_rate;
    let max_term = policy.max_typical_primary_term_years;

    vec![
        RiskRule::new("below-market-royalty", move |ctx, _| {
            let rate = ctx.number("royaltyRate")?;
            (rate < market_rate).then(|| {
                Risk::new(
                    "financial",
                    Severity::Medium,
                    format!(
                        "Royalty rate of {}% is below the market standard of {}%",
                        fmt_number(rate),
                        fmt_number(market_rate)
                    ),
                )
                .with_mitigation(format!("Negotiate a royalty rate of at least {}%", fmt_number(market_rate)))
            })
        }),
        RiskRule::new("federal-noncompliance", |_, compliance| {
            (!compliance.federal).then(|| {
                Risk::new("regulatory", Severity::High, "Federal compliance requirements are not met")
                    .with_mitigation("Add the missing federal clauses before execution")
            })
        }),
        RiskRule::new("state-noncompliance", |_, compliance| {
            (!compliance.state).then(|| {
                Risk::new("regulatory", Severity::Medium, "State regulatory requirements are not met")
                    .with_mitigation("Reference the state oil and gas regulator and its filing requirements")
            })
        }),
        RiskRule::new("missing-indemnification", |ctx, _| {
            (!ctx.mentions("indemnif")).then(|| {
                Risk::new("legal", Severity::High, "No indemnification clause found")
                    .with_mitigation("Add mutual indemnification covering operations and environmental damage")
            })
        }),
        RiskRule::new("missing-environmental-liability", |ctx, _| {
            let applies = ctx.is_document(&[
                DocumentType::Lease,
                DocumentType::Environmental,
                DocumentType::Permit,
            ]);
            (applies && !ctx.mentions("environmental")).then(|| {
                Risk::new(
                    "environmental",
                    Severity::Critical,
                    "No environmental liability or remediation provisions found",
                )
                .with_mitigation("Add environmental remediation and liability allocation clauses")
            })
        }),
        RiskRule::new("long-primary-term", move |ctx, _| {
            let term = ctx.number("primaryTerm")?;
            (term > max_term).then(|| {
                Risk::new(
                    "operational",
                    Severity::Low,
                    format!(
                        "Primary term of {} years exceeds the typical {} years",
                        fmt_number(term),
                        fmt_number(max_term)
                    ),
                )
                .with_mitigation("Consider a shorter primary term or a continuous drilling obligation")
            })
        }),
        RiskRule::new("missing-surface-use", |ctx, _| {
            let lease = ctx.is_document(&[DocumentType::Lease]);
            (lease && !ctx.mentions_any(&["surface use", "surface damage"])).then(|| {
                Risk::new("operational", Severity::Medium, "No surface use or surface damage provisions")
                    .with_mitigation("Add a surface use agreement with damage compensation")
            })
        }),
        RiskRule::new("missing-force-majeure", |ctx, _| {
            (!ctx.mentions("force majeure")).then(|| {
                Risk::new("legal", Severity::Low, "No force majeure clause found")
                    .with_mitigation("Add a force majeure clause that excludes price fluctuations")
            })
        }),
        RiskRule::new("missing-shut-in", |ctx, _| {
            let lease = ctx.is_document(&[DocumentType::Lease]);
            (lease && !ctx.mentions_any(&["shut-in", "shut in"])).then(|| {
                Risk::new("financial", Severity::Low, "No shut-in royalty provision found")
                    .with_mitigation("Define shut-in royalty payments and a maximum shut-in period")
            })
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{assess_risks, check_compliance, RuleContext};
    use crate::types::{DomainInput, FieldMap};
    use serde_json::json;

    #[test]
    fn texas_rule_only_runs_for_texas() {
        let rules = compliance_rules();
        let fields = FieldMap::new();

        let oklahoma = DomainInput::new(DocumentType::Contract, "Environmental protection applies.")
            .with_context("state", "oklahoma");
        let result = check_compliance(&rules, &RuleContext::new(&oklahoma, &fields));
        assert!(!result.state);
        assert!(result.issues.iter().all(|issue| !issue.contains("Texas")));

        let texas = DomainInput::new(DocumentType::Contract, "Environmental protection applies.")
            .with_context("state", "texas");
        let result = check_compliance(&rules, &RuleContext::new(&texas, &fields));
        assert!(result.issues.iter().any(|issue| issue.contains("Railroad Commission")));
    }

    #[test]
    fn blm_lands_require_onshore_terms() {
        let rules = compliance_rules();
        let fields = FieldMap::new();
        let input = DomainInput::new(
            DocumentType::Contract,
            "Environmental protection clause. Lands administered by the Bureau of Land Management.",
        );
        let result = check_compliance(&rules, &RuleContext::new(&input, &fields));
        assert!(!result.federal);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn royalty_at_market_is_not_a_risk() {
        let rules = risk_rules(&EnergyPolicy::default());
        let mut fields = FieldMap::new();
        fields.insert("royaltyRate".into(), json!(12.5));
        let input = DomainInput::new(DocumentType::Contract, "x");
        let compliance = crate::types::ComplianceResult::passing();
        let risks = assess_risks(&rules, &RuleContext::new(&input, &fields), &compliance);
        assert!(risks.iter().all(|risk| risk.risk_type != "financial"));
    }

    #[test]
    fn policy_threshold_is_respected() {
        let policy = EnergyPolicy {
            market_royalty_rate: 20.0,
            ..EnergyPolicy::default()
        };
        let rules = risk_rules(&policy);
        let mut fields = FieldMap::new();
        fields.insert("royaltyRate".into(), json!(18.75));
        let input = DomainInput::new(DocumentType::Contract, "x");
        let compliance = crate::types::ComplianceResult::passing();
        let risks = assess_risks(&rules, &RuleContext::new(&input, &fields), &compliance);
        let royalty = risks.iter().find(|risk| risk.risk_type == "financial").unwrap();
        assert_eq!(royalty.severity, Severity::Medium);
        assert!(royalty.description.contains("18.75%"));
        assert!(royalty.description.contains("20%"));
    }
}
