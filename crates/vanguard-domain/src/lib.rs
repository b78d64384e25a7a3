//! Vanguard domain agents
//!
//! Turns free-text business documents into structured findings for one
//! vertical at a time:
//!
//! - [`extract`]: literal pattern tables compiled into a [`PatternExtractor`]
//! - [`rules`]: jurisdiction-scoped compliance rules, independent risk rules,
//!   ordered recommendation assembly
//! - [`energy`], [`government`], [`insurance`]: one [`DomainAgent`] each
//! - [`registry`]: lookup by id, vertical alias or capability
//!
//! ```no_run
//! use vanguard_domain::{DocumentType, DomainAgentRegistry, DomainInput, DomainPolicies};
//!
//! # async fn run() -> Result<(), vanguard_domain::DomainError> {
//! let registry = DomainAgentRegistry::with_default_agents(&DomainPolicies::default())?;
//! let input = DomainInput::new(DocumentType::Lease, "Oil and gas lease. Royalty: 10%");
//! let output = registry.process_with_domain_agent("oil-gas", &input).await?;
//! println!("{} risks", output.analysis.risks.len());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod energy;
pub mod error;
pub mod extract;
pub mod government;
pub mod insurance;
pub mod policy;
pub mod registry;
pub mod rules;
pub mod types;

pub use agent::{AgentDescriptor, DomainAgent};
pub use energy::EnergyAgent;
pub use error::DomainError;
pub use extract::{FieldKind, FieldPattern, PatternExtractor};
pub use government::GovernmentAgent;
pub use insurance::{ClaimsAnalysis, InsuranceAgent};
pub use policy::{DomainPolicies, EnergyPolicy, GovernmentPolicy, InsurancePolicy};
pub use registry::{resolve_vertical, DomainAgentRegistry};
pub use rules::{ComplianceRule, RiskRule, RuleContext};
pub use types::{
    ComplianceResult, DocumentType, DomainAnalysis, DomainInput, DomainOutput, FieldMap, JurisdictionLevel,
    OutputProvenance, Risk, Severity,
};
