//! Top-level error taxonomy
//!
//! Every failure surfaced by the pipeline carries a stable code:
//! - `VALIDATION_ERROR`: missing or malformed input
//! - `NOT_FOUND`: unknown vertical, agent, record, or step
//! - `DEPENDENCY_CYCLE`: workflow graph without a topological order
//! - `PROCESSING_ERROR`: unexpected failure inside a stage
//! - `CONFIG_ERROR`: configuration that cannot be loaded or is inconsistent
//! - `INVALID_TRANSITION`: a status change the state machine forbids

use crate::types::{AnalysisId, AnalysisStatus, PromptId};
use std::path::PathBuf;
use vanguard_domain::DomainError;
use vanguard_scoring::ScoringError;
use vanguard_workflow::WorkflowError;

/// Main Vanguard error type
#[derive(Debug, thiserror::Error)]
pub enum VanguardError {
    /// Domain agent failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Verification lane failure
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// Workflow engine failure
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Configuration file could not be read
    #[error("cannot read configuration {}: {source}", .path.display())]
    ConfigIo {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for the schema
    #[error("cannot parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration values are inconsistent
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Analysis status change not permitted
    #[error("analysis cannot move from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: AnalysisStatus,
        /// Requested status
        to: AnalysisStatus,
    },

    /// No analysis with this id
    #[error("analysis {0} not found")]
    AnalysisNotFound(AnalysisId),

    /// No prompt with this id
    #[error("prompt {0} not found")]
    PromptNotFound(PromptId),
}

impl VanguardError {
    /// Stable error code recorded alongside failed analyses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Domain(err) => match err {
                DomainError::Validation(_) => "VALIDATION_ERROR",
                DomainError::NotFound(_) => "NOT_FOUND",
                DomainError::Pattern { .. } => "CONFIG_ERROR",
                DomainError::Processing { .. } => "PROCESSING_ERROR",
            },
            Self::Scoring(err) => {
                if err.is_config_error() {
                    "CONFIG_ERROR"
                } else {
                    "PROCESSING_ERROR"
                }
            }
            Self::Workflow(err) => workflow_code(err),
            Self::ConfigIo { .. } | Self::ConfigParse(_) | Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::AnalysisNotFound(_) | Self::PromptNotFound(_) => "NOT_FOUND",
        }
    }

    /// Caller supplied bad input or referenced something missing
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self.code(), "VALIDATION_ERROR" | "NOT_FOUND" | "DEPENDENCY_CYCLE")
    }

    /// Re-running the same request may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.code() == "PROCESSING_ERROR"
    }

    /// Build a configuration error
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

fn workflow_code(err: &WorkflowError) -> &'static str {
    match err {
        WorkflowError::DependencyCycle { .. } => "DEPENDENCY_CYCLE",
        WorkflowError::UnknownDependency { .. }
        | WorkflowError::DuplicateStep(_)
        | WorkflowError::SelfDependency(_)
        | WorkflowError::Definition(_)
        | WorkflowError::UnknownTemplate(_) => "VALIDATION_ERROR",
        WorkflowError::StepNotFound(_) | WorkflowError::WorkflowNotFound(_) => "NOT_FOUND",
        WorkflowError::InvalidStepTransition { .. }
        | WorkflowError::InvalidWorkflowState { .. }
        | WorkflowError::NotReady { .. } => "INVALID_TRANSITION",
        WorkflowError::Execution { .. } => "PROCESSING_ERROR",
        WorkflowError::InvalidConfig(_) => "CONFIG_ERROR",
    }
}
