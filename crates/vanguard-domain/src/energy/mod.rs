//! Energy (oil, gas and mineral rights) agent

mod patterns;
mod rules;

pub use patterns::PATTERNS;

use crate::agent::{benchmark_fields, object, AgentDescriptor, DomainAgent};
use crate::error::DomainError;
use crate::extract::{select_fields, PatternExtractor};
use crate::policy::EnergyPolicy;
use crate::rules::{self as engine, fmt_number, ComplianceRule, Recommendations, RiskRule, RuleContext};
use crate::types::{ComplianceResult, DocumentType, FieldMap, Risk};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Energy agent descriptor
pub const DESCRIPTOR: AgentDescriptor = AgentDescriptor {
    id: "energy-agent",
    name: "Energy Domain Agent",
    vertical: "energy",
    capabilities: &[
        "lease-analysis",
        "royalty-calculation",
        "regulatory-compliance",
        "environmental-review",
        "permit-review",
        "benchmarking",
    ],
    document_types: &[
        DocumentType::Lease,
        DocumentType::Contract,
        DocumentType::Permit,
        DocumentType::Environmental,
        DocumentType::Regulatory,
        DocumentType::Technical,
    ],
};

const MIN_DOCUMENT_LENGTH: usize = 100;
const REQUIRED_KEYWORDS: &[&str] = &["lease", "oil", "gas", "mineral", "royalty", "well", "drilling"];

const FINANCIAL_FIELDS: &[&str] = &["royaltyRate", "bonusPayment", "delayRental", "shutInRoyalty"];
const OPERATIONAL_FIELDS: &[&str] = &[
    "primaryTerm",
    "acreage",
    "county",
    "state",
    "operator",
    "wellName",
    "permitNumber",
    "effectiveDate",
];

/// Point-in-time lease economics for one state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateBenchmark {
    /// State name, lowercase
    pub state: &'static str,
    /// Average royalty rate, percent
    pub average_royalty_rate: f64,
    /// Average signing bonus per acre, dollars
    pub average_bonus_per_acre: f64,
    /// Typical primary term, years
    pub typical_primary_term_years: u32,
    /// Period the figures describe
    pub as_of: &'static str,
}

const BENCHMARKS_AS_OF: &str = "2024-Q4";

const fn benchmark(state: &'static str, royalty: f64, bonus: f64, term: u32) -> StateBenchmark {
    StateBenchmark {
        state,
        average_royalty_rate: royalty,
        average_bonus_per_acre: bonus,
        typical_primary_term_years: term,
        as_of: BENCHMARKS_AS_OF,
    }
}

const STATE_BENCHMARKS: &[StateBenchmark] = &[
    benchmark("texas", 20.0, 500.0, 3),
    benchmark("oklahoma", 18.75, 300.0, 3),
    benchmark("north dakota", 18.0, 1_000.0, 5),
    benchmark("new mexico", 18.75, 1_500.0, 5),
    benchmark("pennsylvania", 15.0, 2_500.0, 5),
    benchmark("colorado", 16.5, 400.0, 5),
    benchmark("wyoming", 16.0, 250.0, 5),
    benchmark("louisiana", 20.0, 600.0, 3),
];

const NATIONAL_BENCHMARK: StateBenchmark = benchmark("national", 17.5, 500.0, 5);

/// Benchmark for a lowercase state name, national averages otherwise
#[must_use]
pub fn state_benchmark(state: Option<&str>) -> &'static StateBenchmark {
    state
        .and_then(|name| STATE_BENCHMARKS.iter().find(|b| b.state == name))
        .unwrap_or(&NATIONAL_BENCHMARK)
}

/// Energy domain agent
#[derive(Debug)]
pub struct EnergyAgent {
    policy: EnergyPolicy,
    extractor: PatternExtractor,
    compliance: Vec<ComplianceRule>,
    risks: Vec<RiskRule>,
}

impl EnergyAgent {
    /// Build the agent with the given thresholds
    ///
    /// # Errors
    /// `DomainError::Pattern` if the pattern table fails to compile.
    pub fn new(policy: EnergyPolicy) -> Result<Self, DomainError> {
        Ok(Self {
            extractor: PatternExtractor::compile(PATTERNS)?,
            compliance: rules::compliance_rules(),
            risks: rules::risk_rules(&policy),
            policy,
        })
    }

    fn financial_recommendations(&self, ctx: &RuleContext<'_>) -> Vec<String> {
        let mut items = Vec::new();
        let minimum = self.policy.market_royalty_rate;
        match ctx.number("royaltyRate") {
            None => items.push("Specify the royalty rate explicitly in the lease terms".to_string()),
            Some(rate) if rate < minimum => items.push(format!(
                "Negotiate the royalty rate from {}% to at least {}% to meet the market standard",
                fmt_number(rate),
                fmt_number(minimum)
            )),
            Some(rate) => {
                let bench = state_benchmark(ctx.state().as_deref());
                if rate < bench.average_royalty_rate {
                    items.push(format!(
                        "Royalty rate of {}% is below the {} average of {}%; consider renegotiating",
                        fmt_number(rate),
                        bench.state,
                        fmt_number(bench.average_royalty_rate)
                    ));
                }
            }
        }
        if ctx.is_document(&[DocumentType::Lease]) {
            if ctx.number("bonusPayment").is_none() {
                items.push("Document the signing bonus amount and per-acre rate".to_string());
            }
            if ctx.number("primaryTerm").is_none() {
                items.push("Define the primary term of the lease".to_string());
            }
        }
        items
    }
}

fn document_recommendations(document_type: DocumentType) -> &'static [&'static str] {
    match document_type {
        DocumentType::Lease => &[
            "Verify title and mineral ownership before execution",
            "Confirm pooling and unitization provisions",
        ],
        DocumentType::Permit => &["Confirm permit conditions with the state regulator before spudding"],
        DocumentType::Environmental => &["Establish a baseline environmental assessment of the site"],
        DocumentType::Regulatory => &["Calendar all regulatory filing and reporting deadlines"],
        DocumentType::Technical => &["Have a petroleum engineer validate the technical specifications"],
        _ => &["Review operator obligations and payment terms"],
    }
}

const CLOSING: &[&str] = &[
    "Have the document reviewed by qualified oil and gas counsel",
    "Retain executed copies with the county records",
];

impl DomainAgent for EnergyAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &DESCRIPTOR
    }

    fn extractor(&self) -> &PatternExtractor {
        &self.extractor
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
            "financialTerms".to_string(),
            object(select_fields(ctx.fields, FINANCIAL_FIELDS)),
        );
        sections.insert(
            "operationalTerms".to_string(),
            object(select_fields(ctx.fields, OPERATIONAL_FIELDS)),
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

    fn benchmarks(&self, ctx: &RuleContext<'_>) -> Option<FieldMap> {
        benchmark_fields(DESCRIPTOR.id, state_benchmark(ctx.state().as_deref()))
    }
}
