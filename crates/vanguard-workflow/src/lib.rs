//! Vanguard workflow engine
//!
//! Named steps with explicit dependencies, executed in topological order.
//!
//! - [`types`]: workflow and step records
//! - [`state_machine`]: permitted step and workflow status transitions
//! - [`graph`]: dependency graph validation and ordering
//! - [`lifecycle`]: copy-on-write transitions and status derivation
//! - [`engine`]: repository-backed runner
//! - [`templates`] and [`definition`]: built-in step sets and YAML manifests

pub mod definition;
pub mod engine;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod repository;
pub mod state_machine;
pub mod templates;
pub mod types;

pub use definition::{StepDefinition, WorkflowDefinition};
pub use engine::{RunSummary, StepExecutor, WorkflowConfig, WorkflowEngine};
pub use error::WorkflowError;
pub use graph::StepGraph;
pub use repository::{InMemoryWorkflowRepository, WorkflowRepository, WorkflowUpdate};
pub use templates::StepTemplate;
pub use types::{
    ConditionOperator, FailurePolicy, StepCondition, StepStatus, Variables, Workflow, WorkflowId, WorkflowStatus,
    WorkflowStep, WorkflowType,
};
