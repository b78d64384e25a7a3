//! YAML workflow manifests
//!
//! ```yaml
//! name: Lease review
//! type: sequential
//! failurePolicy: halt
//! template: document-analysis
//! variables:
//!   amount: 25000
//! steps:
//!   - id: archive
//!     type: archival
//!     dependencies: [recommend]
//! ```
//!
//! Template steps come first, manifest steps are appended after them.

use crate::error::WorkflowError;
use crate::templates::StepTemplate;
use crate::types::{FailurePolicy, StepCondition, Variables, Workflow, WorkflowStep, WorkflowType};
use serde::{Deserialize, Serialize};

/// Step entry in a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StepDefinition {
    /// Unique id
    pub id: String,
    /// Display name, defaults to the id
    #[serde(default)]
    pub name: Option<String>,
    /// Step kind
    #[serde(rename = "type")]
    pub step_type: String,
    /// Ids that must complete first
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Gate for conditional workflows
    #[serde(default)]
    pub condition: Option<StepCondition>,
    /// Executor configuration
    #[serde(default)]
    pub config: Variables,
}

impl From<StepDefinition> for WorkflowStep {
    fn from(def: StepDefinition) -> Self {
        let name = def.name.unwrap_or_else(|| def.id.clone());
        let mut step = WorkflowStep::new(def.id, name, def.step_type).depends_on(def.dependencies);
        step.condition = def.condition;
        step.config = def.config;
        step
    }
}

/// Workflow manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkflowDefinition {
    /// Workflow name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Scheduling discipline; defaults to the template's, else sequential
    #[serde(default, rename = "type")]
    pub workflow_type: Option<WorkflowType>,
    /// Failure policy; defaults to the engine configuration
    #[serde(default)]
    pub failure_policy: Option<FailurePolicy>,
    /// Built-in template to start from
    #[serde(default)]
    pub template: Option<String>,
    /// Condition inputs
    #[serde(default)]
    pub variables: Variables,
    /// Additional steps
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

impl WorkflowDefinition {
    /// Parse a YAML manifest
    ///
    /// # Errors
    /// `WorkflowError::Definition` with the parser message.
    pub fn from_yaml(source: &str) -> Result<Self, WorkflowError> {
        serde_yaml::from_str(source).map_err(|e| WorkflowError::Definition(e.to_string()))
    }

    /// Render as YAML
    ///
    /// # Errors
    /// `WorkflowError::Definition` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, WorkflowError> {
        serde_yaml::to_string(self).map_err(|e| WorkflowError::Definition(e.to_string()))
    }

    /// Expand into a validated draft workflow
    ///
    /// # Errors
    /// `UnknownTemplate`, `Definition` for an empty workflow, and graph errors.
    pub fn into_workflow(self, default_policy: FailurePolicy) -> Result<Workflow, WorkflowError> {
        let template = self.template.as_deref().map(StepTemplate::from_name).transpose()?;
        let workflow_type = self
            .workflow_type
            .or_else(|| template.map(StepTemplate::workflow_type))
            .unwrap_or_default();

        let mut workflow = Workflow::new(self.name, workflow_type)
            .with_failure_policy(self.failure_policy.unwrap_or(default_policy));
        workflow.description = self.description;
        workflow.variables = self.variables;
        if let Some(template) = template {
            workflow.steps.extend(template.steps());
        }
        workflow.steps.extend(self.steps.into_iter().map(WorkflowStep::from));

        if workflow.steps.is_empty() {
            return Err(WorkflowError::Definition(format!(
                "workflow '{}' declares no steps and no template",
                workflow.name
            )));
        }
        workflow.graph()?;
        Ok(workflow)
    }
}
