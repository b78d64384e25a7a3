//! Vanguard Core - document risk assessment
//!
//! Wires the domain agents, the three Vanguard lanes and the aggregator into
//! one pipeline over stored prompts and analyses:
//! - [`AnalysisPipeline`]: submit a [`Prompt`], run it to a completed or failed [`Analysis`]
//! - [`VanguardConfig`]: TOML configuration for every component
//! - [`telemetry`]: tracing subscriber setup
//! - [`VanguardError`]: one error type with stable codes
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vanguard_core::prelude::*;
//!
//! # async fn example() -> Result<(), VanguardError> {
//! let store = Arc::new(InMemoryAnalysisStore::new());
//! let pipeline = AnalysisPipeline::new(&VanguardConfig::default(), store)?;
//!
//! let prompt = Prompt::new("North tract", "energy", DocumentType::Lease, "Oil and gas lease. Royalty: 10%");
//! let analysis = pipeline.submit_and_run(prompt).await?;
//! println!("{:?} {:?}", analysis.status, analysis.risk_level);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod telemetry;
pub mod types;

pub use config::VanguardConfig;
pub use error::VanguardError;
pub use pipeline::{AnalysisPipeline, AnalysisReport};
pub use store::{AnalysisStore, InMemoryAnalysisStore};
pub use telemetry::{init_tracing, LogFormat};
pub use types::{Analysis, AnalysisFailure, AnalysisId, AnalysisStatus, Prompt, PromptId};

pub use vanguard_domain as domain;
pub use vanguard_scoring as scoring;
pub use vanguard_workflow as workflow;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Vanguard Core
    pub use crate::{
        Analysis, AnalysisPipeline, AnalysisStatus, InMemoryAnalysisStore, Prompt, VanguardConfig, VanguardError,
    };
    pub use vanguard_domain::{DocumentType, DomainInput, Severity};
    pub use vanguard_workflow::{Workflow, WorkflowEngine, WorkflowStep, WorkflowType};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
