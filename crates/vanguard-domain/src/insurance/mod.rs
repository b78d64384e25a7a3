//! Insurance (property and casualty) agent

mod claims;
mod patterns;
mod rules;

pub use claims::{applicable_exclusions, contains_phrase, ClaimsAnalysis, ExclusionParser};
pub use patterns::PATTERNS;

use crate::agent::{benchmark_fields, object, section_value, AgentDescriptor, DomainAgent};
use crate::error::DomainError;
use crate::extract::{select_fields, PatternExtractor};
use crate::policy::InsurancePolicy;
use crate::rules::{self as engine, fmt_money, ComplianceRule, Recommendations, RiskRule, RuleContext};
use crate::types::{ComplianceResult, DocumentType, DomainInput, FieldMap, Risk, Severity};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;

/// Insurance agent descriptor
pub const DESCRIPTOR: AgentDescriptor = AgentDescriptor {
    id: "insurance-agent",
    name: "Insurance Domain Agent",
    vertical: "insurance",
    capabilities: &[
        "policy-analysis",
        "claims-analysis",
        "coverage-review",
        "exclusion-review",
        "regulatory-compliance",
        "benchmarking",
    ],
    document_types: &[
        DocumentType::Policy,
        DocumentType::Claim,
        DocumentType::Endorsement,
        DocumentType::Application,
        DocumentType::Certificate,
    ],
};

const MIN_DOCUMENT_LENGTH: usize = 100;
const REQUIRED_KEYWORDS: &[&str] = &["policy", "insured", "coverage", "claim", "premium", "insurer"];

const COVERAGE_FIELDS: &[&str] = &[
    "policyNumber",
    "lineOfBusiness",
    "coverageLimit",
    "aggregateLimit",
    "deductible",
    "premium",
    "policyPeriod",
    "effectiveDate",
    "exclusions",
];

/// Point-in-time pricing reference for one line of business
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineBenchmark {
    /// Normalized line of business
    pub line_of_business: &'static str,
    /// Average annual premium, dollars
    pub average_annual_premium: f64,
    /// Typical deductible, dollars
    pub typical_deductible: f64,
    /// Typical per-occurrence limit, dollars
    pub typical_occurrence_limit: f64,
    /// Period the figures describe
    pub as_of: &'static str,
}

const BENCHMARKS_AS_OF: &str = "2024-Q4";

const fn line(name: &'static str, premium: f64, deductible: f64, limit: f64) -> LineBenchmark {
    LineBenchmark {
        line_of_business: name,
        average_annual_premium: premium,
        typical_deductible: deductible,
        typical_occurrence_limit: limit,
        as_of: BENCHMARKS_AS_OF,
    }
}

const LINE_BENCHMARKS: &[LineBenchmark] = &[
    line("general liability", 1_300.0, 1_000.0, 1_000_000.0),
    line("commercial property", 2_800.0, 5_000.0, 1_000_000.0),
    line("homeowners", 1_750.0, 1_000.0, 350_000.0),
    line("commercial auto", 2_100.0, 1_000.0, 1_000_000.0),
    line("workers compensation", 3_200.0, 0.0, 1_000_000.0),
    line("professional liability", 2_400.0, 5_000.0, 1_000_000.0),
    line("umbrella", 1_000.0, 10_000.0, 5_000_000.0),
    line("cyber", 1_800.0, 10_000.0, 1_000_000.0),
];

const ALL_LINES_BENCHMARK: LineBenchmark = line("all lines", 2_000.0, 2_500.0, 1_000_000.0);

/// Benchmark for a line of business as written in a policy
#[must_use]
pub fn line_benchmark(line_of_business: Option<&str>) -> &'static LineBenchmark {
    let normalized = line_of_business.map(|raw| {
        let lower = raw.to_lowercase().replace('\'', "");
        let collapsed = lower.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed
            .strip_prefix("commercial general liability")
            .map_or(collapsed.clone(), |rest| format!("general liability{rest}"))
    });
    normalized
        .and_then(|name| LINE_BENCHMARKS.iter().find(|b| b.line_of_business == name))
        .unwrap_or(&ALL_LINES_BENCHMARK)
}

/// Insurance domain agent
#[derive(Debug)]
pub struct InsuranceAgent {
    policy: InsurancePolicy,
    extractor: PatternExtractor,
    exclusions: ExclusionParser,
    compliance: Vec<ComplianceRule>,
    risks: Vec<RiskRule>,
}

impl InsuranceAgent {
    /// Build the agent with the given thresholds
    ///
    /// # Errors
    /// `DomainError::Pattern` if a pattern fails to compile.
    pub fn new(policy: InsurancePolicy) -> Result<Self, DomainError> {
        Ok(Self {
            extractor: PatternExtractor::compile(PATTERNS)?,
            exclusions: ExclusionParser::new()?,
            compliance: rules::compliance_rules(),
            risks: rules::risk_rules(&policy),
            policy,
        })
    }

    /// Coverage determination for a claim document
    #[must_use]
    pub fn claims_analysis(&self, ctx: &RuleContext<'_>) -> ClaimsAnalysis {
        let exclusions = ctx
            .fields
            .get("exclusions")
            .and_then(|value| self.exclusions.list_from_value(value))
            .unwrap_or_default();
        let narrative = self.exclusions.strip(&ctx.input.content);
        let applicable = applicable_exclusions(&exclusions, ctx.text("causeOfLoss"), &narrative);
        ClaimsAnalysis::assess(
            ctx.number("claimAmount"),
            ctx.number("coverageLimit"),
            ctx.number("deductible"),
            applicable,
        )
    }

    /// Claims analysis for this call, computed once and shared by every stage
    fn claims<'c>(&self, ctx: &'c RuleContext<'_>) -> Cow<'c, ClaimsAnalysis> {
        ctx.derived(|| self.claims_analysis(ctx))
            .map_or_else(|| Cow::Owned(self.claims_analysis(ctx)), Cow::Borrowed)
    }

    fn claim_risks(claims: &ClaimsAnalysis) -> Vec<Risk> {
        let mut risks = Vec::new();
        if !claims.exclusions_applicable.is_empty() {
            risks.push(
                Risk::new(
                    "claims",
                    Severity::High,
                    format!(
                        "Loss falls under policy exclusion(s): {}",
                        claims.exclusions_applicable.join(", ")
                    ),
                )
                .with_mitigation("Review the exclusion wording and any endorsements that restore coverage"),
            );
        }
        if claims.exceeds_limit() {
            risks.push(
                Risk::new("claims", Severity::High, "Claim amount exceeds the coverage limit")
                    .with_mitigation("Check excess or umbrella policies for the uncovered amount"),
            );
        }
        risks
    }

    fn financial_recommendations(&self, ctx: &RuleContext<'_>) -> Vec<String> {
        let mut items = Vec::new();
        let standard = self.policy.standard_occurrence_limit;
        match ctx.number("coverageLimit") {
            None => items.push("Confirm the per-occurrence coverage limit".to_string()),
            Some(limit) if limit < standard => items.push(format!(
                "Increase the per-occurrence limit from {} to at least {}",
                fmt_money(limit),
                fmt_money(standard)
            )),
            Some(limit) => {
                if ctx
                    .number("deductible")
                    .is_some_and(|deductible| deductible > limit * self.policy.max_deductible_ratio)
                {
                    items.push(format!(
                        "Reduce the deductible to no more than {:.0}% of the coverage limit",
                        self.policy.max_deductible_ratio * 100.0
                    ));
                }
            }
        }
        if ctx.document_type() == DocumentType::Claim {
            let claims = self.claims(ctx);
            if claims.covered {
                items.push(format!(
                    "Expected payout is approximately {} after the deductible",
                    fmt_money(claims.estimated_payout)
                ));
            } else if !claims.exclusions_applicable.is_empty() {
                items.push(format!(
                    "Claim falls under exclusion(s): {}; document the denial basis for the insured",
                    claims.exclusions_applicable.join("; ")
                ));
            }
        }
        items
    }
}

fn document_recommendations(document_type: DocumentType) -> &'static [&'static str] {
    match document_type {
        DocumentType::Policy => &[
            "Review exclusions and endorsements with the insured",
            "Verify limits against current replacement cost",
        ],
        DocumentType::Claim => &[
            "Document the loss with photographs and repair estimates",
            "Notify the insurer within the policy reporting period",
        ],
        DocumentType::Endorsement => &["Confirm the endorsement is attached to the correct policy"],
        DocumentType::Application => &["Verify all application answers for material misrepresentation"],
        DocumentType::Certificate => &["Confirm the certificate holder and additional insured status"],
        _ => &["Review the document against the governing policy"],
    }
}

const CLOSING: &[&str] = &[
    "Have a licensed insurance professional review coverage",
    "Keep the policy and all claim correspondence on file",
];

impl DomainAgent for InsuranceAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &DESCRIPTOR
    }

    fn extractor(&self) -> &PatternExtractor {
        &self.extractor
    }

    /// Adds the policy's exclusion list unless metadata supplied a usable one
    ///
    /// Metadata exclusions may be an array or a delimited string; any other
    /// shape falls back to the list parsed from the text.
    fn extract(&self, input: &DomainInput) -> FieldMap {
        let mut fields = self.extractor.extract(&input.content, &input.metadata);
        let supplied = fields
            .get("exclusions")
            .and_then(|value| self.exclusions.list_from_value(value));
        let exclusions = supplied.unwrap_or_else(|| {
            if fields.contains_key("exclusions") {
                tracing::warn!(agent = DESCRIPTOR.id, "unusable metadata exclusions, reading them from the text");
            }
            self.exclusions.parse(&input.content)
        });
        if exclusions.is_empty() && !fields.contains_key("exclusions") {
            return fields;
        }
        fields.insert(
            "exclusions".to_string(),
            Value::Array(exclusions.into_iter().map(Value::String).collect()),
        );
        fields
    }

    fn document_validity(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.input.content.trim().len() >= MIN_DOCUMENT_LENGTH && ctx.mentions_any(REQUIRED_KEYWORDS)
    }

    fn check_compliance(&self, ctx: &RuleContext<'_>) -> ComplianceResult {
        engine::check_compliance(&self.compliance, ctx)
    }

    fn assess_risks(&self, ctx: &RuleContext<'_>, compliance: &ComplianceResult) -> Vec<Risk> {
        let mut risks = engine::assess_risks(&self.risks, ctx, compliance);
        if ctx.document_type() == DocumentType::Claim {
            risks.extend(Self::claim_risks(&self.claims(ctx)));
        }
        risks
    }

    fn sections(&self, ctx: &RuleContext<'_>) -> Result<IndexMap<String, Value>, DomainError> {
        let mut sections = IndexMap::new();
        sections.insert(
            "coverageAnalysis".to_string(),
            object(select_fields(ctx.fields, COVERAGE_FIELDS)),
        );
        if ctx.document_type() == DocumentType::Claim {
            let claims = self.claims(ctx);
            sections.insert("claimsAnalysis".to_string(), section_value("claimsAnalysis", &*claims)?);
        }
        Ok(sections)
    }

    fn recommend(&self, ctx: &RuleContext<'_>, compliance: &ComplianceResult, risks: &[Risk]) -> Vec<String> {
        Recommendations::new(compliance)
            .financial(self.financial_recommendations(ctx))
            .critical_risks(risks)
            .document_specific(document_recommendations(ctx.document_type()))
            .closing(CLOSING)
    }

    fn benchmarks(&self, ctx: &RuleContext<'_>) -> Option<FieldMap> {
        benchmark_fields(DESCRIPTOR.id, line_benchmark(ctx.text("lineOfBusiness")))
    }
}
