//! Insurance compliance and risk tables

use crate::policy::InsurancePolicy;
use crate::rules::{fmt_money, ComplianceRule, RiskRule, RuleContext};
use crate::types::{DocumentType, JurisdictionLevel, Risk, Severity};

fn line_of_business(ctx: &RuleContext<'_>) -> String {
    ctx.text("lineOfBusiness").map(str::to_lowercase).unwrap_or_default()
}

fn is_commercial(ctx: &RuleContext<'_>) -> bool {
    line_of_business(ctx).starts_with("commercial") || ctx.mentions("commercial")
}

/// Federal, state and local rules for insurance documents
#[must_use]
pub fn compliance_rules() -> Vec<ComplianceRule> {
    vec![
        ComplianceRule::new(
            "state-cancellation-notice",
            JurisdictionLevel::State,
            "Policy missing state-mandated cancellation and nonrenewal notice provisions",
            |ctx| ctx.mentions("cancellation"),
        )
        .when(|ctx| ctx.is_document(&[DocumentType::Policy, DocumentType::Endorsement])),
        ComplianceRule::new(
            "california-disclosure",
            JurisdictionLevel::State,
            "California policy missing California Department of Insurance disclosure",
            |ctx| ctx.mentions("california department of insurance"),
        )
        .when(|ctx| ctx.state_is("california") && ctx.is_document(&[DocumentType::Policy])),
        ComplianceRule::new(
            "florida-disclosure",
            JurisdictionLevel::State,
            "Florida policy missing Office of Insurance Regulation disclosure",
            |ctx| ctx.mentions("office of insurance regulation"),
        )
        .when(|ctx| ctx.state_is("florida") && ctx.is_document(&[DocumentType::Policy])),
        ComplianceRule::new(
            "new-york-disclosure",
            JurisdictionLevel::State,
            "New York policy missing Department of Financial Services disclosure",
            |ctx| ctx.mentions("department of financial services"),
        )
        .when(|ctx| ctx.state_is("new york") && ctx.is_document(&[DocumentType::Policy])),
        ComplianceRule::new(
            "federal-tria",
            JurisdictionLevel::Federal,
            "Commercial policy missing Terrorism Risk Insurance Act (TRIA) disclosure",
            |ctx| ctx.mentions("terrorism"),
        )
        .when(|ctx| ctx.is_document(&[DocumentType::Policy]) && is_commercial(ctx)),
        ComplianceRule::new(
            "federal-ofac",
            JurisdictionLevel::Federal,
            "Policy missing OFAC economic sanctions clause",
            |ctx| ctx.mentions_any(&["ofac", "economic sanctions", "sanctions limitation"]),
        )
        .when(|ctx| ctx.is_document(&[DocumentType::Policy])),
        ComplianceRule::new(
            "local-ordinance-or-law",
            JurisdictionLevel::Local,
            "Property policy lacks ordinance or law coverage for local building codes",
            |ctx| ctx.mentions("ordinance or law"),
        )
        .when(|ctx| ctx.is_document(&[DocumentType::Policy]) && line_of_business(ctx).contains("property")),
    ]
}

/// Insurance risk rules, thresholds taken from `policy`
#[must_use]
pub fn risk_rules(policy: &InsurancePolicy) -> Vec<RiskRule> {
    let standard_limit = policy.standard_occurrence_limit;
    let max_ratio = policy.max_deductible_ratio;

    vec![
        RiskRule::new("low-coverage-limit", move |ctx, _| {
            let limit = ctx.number("coverageLimit")?;
            (limit < standard_limit).then(|| {
                Risk::new(
                    "coverage",
                    Severity::Medium,
                    format!(
                        "Coverage limit of {} is below the standard {} per occurrence",
                        fmt_money(limit),
                        fmt_money(standard_limit)
                    ),
                )
                .with_mitigation("Increase limits or add umbrella coverage")
            })
        }),
        RiskRule::new("high-deductible", move |ctx, _| {
            let limit = ctx.number("coverageLimit")?;
            let deductible = ctx.number("deductible")?;
            (deductible > limit * max_ratio).then(|| {
                Risk::new(
                    "financial",
                    Severity::Medium,
                    format!(
                        "Deductible of {} exceeds {:.0}% of the coverage limit",
                        fmt_money(deductible),
                        max_ratio * 100.0
                    ),
                )
                .with_mitigation("Lower the deductible or confirm the insured can self-fund it")
            })
        }),
        RiskRule::new("missing-subrogation", |ctx, _| {
            (ctx.is_document(&[DocumentType::Policy]) && !ctx.mentions("subrogation")).then(|| {
                Risk::new("legal", Severity::Low, "No subrogation clause found")
                    .with_mitigation("Add transfer of rights of recovery terms")
            })
        }),
        RiskRule::new("state-noncompliance", |_, compliance| {
            (!compliance.state).then(|| {
                Risk::new("regulatory", Severity::High, "State insurance regulatory requirements are not met")
                    .with_mitigation("Add the required state notices and disclosures")
            })
        }),
        RiskRule::new("missing-policy-limit", |ctx, _| {
            (ctx.is_document(&[DocumentType::Policy]) && ctx.number("coverageLimit").is_none()).then(|| {
                Risk::new("coverage", Severity::Critical, "No coverage limit stated in the policy")
                    .with_mitigation("State per-occurrence and aggregate limits on the declarations page")
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
    fn florida_rule_needs_florida_context() {
        let rules = compliance_rules();
        let fields = FieldMap::new();
        let input = DomainInput::new(DocumentType::Policy, "Cancellation notice 30 days. OFAC applies.");
        assert!(check_compliance(&rules, &RuleContext::new(&input, &fields)).is_compliant());

        let input = input.with_context("state", "Florida");
        let result = check_compliance(&rules, &RuleContext::new(&input, &fields));
        assert!(!result.state);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn deductible_ratio_uses_policy() {
        let rules = risk_rules(&InsurancePolicy::default());
        let input = DomainInput::new(DocumentType::Claim, "x");
        let mut fields = FieldMap::new();
        fields.insert("coverageLimit".into(), json!(2_000_000));
        fields.insert("deductible".into(), json!(250_000));
        let risks = assess_risks(&rules, &RuleContext::new(&input, &fields), &ComplianceResult::passing());
        assert_eq!(risks.len(), 1);
        assert!(risks[0].description.contains("10%"));
    }

    #[test]
    fn policy_without_limit_is_critical() {
        let rules = risk_rules(&InsurancePolicy::default());
        let input = DomainInput::new(DocumentType::Policy, "subrogation applies");
        let fields = FieldMap::new();
        let risks = assess_risks(&rules, &RuleContext::new(&input, &fields), &ComplianceResult::passing());
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].severity, Severity::Critical);
    }
}
