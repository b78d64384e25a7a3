//! Error types for the workflow engine

use crate::types::{StepStatus, WorkflowId, WorkflowStatus};

/// Workflow error type
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Step graph has no topological order
    #[error("dependency cycle detected involving steps: {}", .steps.join(", "))]
    DependencyCycle {
        /// Steps on or feeding the cycle
        steps: Vec<String>,
    },

    /// A dependency names a step that does not exist
    #[error("step '{step}' depends on unknown step '{dependency}'")]
    UnknownDependency {
        /// Dependant step
        step: String,
        /// Missing dependency id
        dependency: String,
    },

    /// Two steps share an id
    #[error("duplicate step id '{0}'")]
    DuplicateStep(String),

    /// A step lists itself as a dependency
    #[error("step '{0}' depends on itself")]
    SelfDependency(String),

    /// No step with this id
    #[error("step '{0}' not found")]
    StepNotFound(String),

    /// No workflow with this id
    #[error("workflow {0} not found")]
    WorkflowNotFound(WorkflowId),

    /// Step status change not permitted by the step state machine
    #[error("step '{step}' cannot move from {from} to {to}")]
    InvalidStepTransition {
        /// Step id
        step: String,
        /// Current status
        from: StepStatus,
        /// Requested status
        to: StepStatus,
    },

    /// Workflow status does not allow the requested action
    #[error("cannot {action} a workflow that is {status}")]
    InvalidWorkflowState {
        /// Current status
        status: WorkflowStatus,
        /// Attempted action
        action: &'static str,
    },

    /// Step is not schedulable yet
    #[error("step '{step}' is not ready: {reason}")]
    NotReady {
        /// Step id
        step: String,
        /// Why it cannot start
        reason: String,
    },

    /// Workflow definition could not be parsed
    #[error("invalid workflow definition: {0}")]
    Definition(String),

    /// No built-in template with this name
    #[error("unknown step template '{0}'")]
    UnknownTemplate(String),

    /// A step executor reported failure
    #[error("step '{step}' failed: {message}")]
    Execution {
        /// Step id
        step: String,
        /// Failure description
        message: String,
    },

    /// Engine configuration is inconsistent
    #[error("invalid workflow configuration: {0}")]
    InvalidConfig(String),
}

impl WorkflowError {
    /// Build an execution error
    #[inline]
    pub fn execution(step: impl Into<String>, message: impl ToString) -> Self {
        Self::Execution {
            step: step.into(),
            message: message.to_string(),
        }
    }

    /// The step graph itself is malformed
    #[inline]
    #[must_use]
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::DependencyCycle { .. }
                | Self::UnknownDependency { .. }
                | Self::DuplicateStep(_)
                | Self::SelfDependency(_)
        )
    }

    /// A requested status change was rejected
    #[inline]
    #[must_use]
    pub fn is_transition_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidStepTransition { .. } | Self::InvalidWorkflowState { .. } | Self::NotReady { .. }
        )
    }
}
