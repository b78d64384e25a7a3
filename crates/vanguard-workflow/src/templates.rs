//! Built-in step templates

use crate::error::WorkflowError;
use crate::types::{ConditionOperator, StepCondition, Workflow, WorkflowStep, WorkflowType};
use serde_json::json;
use std::str::FromStr;

/// Named step sets that expand into workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepTemplate {
    /// extract, compliance, risk, recommend
    DocumentAnalysis,
    /// three verification lanes, then aggregation
    VanguardReview,
    /// submit, manager review, executive approval above a threshold
    ApprovalChain,
}

impl StepTemplate {
    /// Every built-in template
    pub const ALL: [Self; 3] = [Self::DocumentAnalysis, Self::VanguardReview, Self::ApprovalChain];

    /// Amount above which the approval chain requires an executive
    pub const EXECUTIVE_APPROVAL_THRESHOLD: u64 = 10_000;

    /// Template by kebab-case name
    ///
    /// # Errors
    /// `WorkflowError::UnknownTemplate`.
    pub fn from_name(name: &str) -> Result<Self, WorkflowError> {
        Self::ALL
            .into_iter()
            .find(|template| template.name() == name.trim())
            .ok_or_else(|| WorkflowError::UnknownTemplate(name.to_string()))
    }

    /// Kebab-case name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DocumentAnalysis => "document-analysis",
            Self::VanguardReview => "vanguard-review",
            Self::ApprovalChain => "approval-chain",
        }
    }

    /// Scheduling discipline the template is designed for
    #[must_use]
    pub fn workflow_type(self) -> WorkflowType {
        match self {
            Self::DocumentAnalysis => WorkflowType::Sequential,
            Self::VanguardReview => WorkflowType::Parallel,
            Self::ApprovalChain => WorkflowType::Conditional,
        }
    }

    /// Fresh pending steps
    #[must_use]
    pub fn steps(self) -> Vec<WorkflowStep> {
        match self {
            Self::DocumentAnalysis => vec![
                WorkflowStep::new("extract", "Extract key terms", "extraction"),
                WorkflowStep::new("compliance", "Check compliance", "compliance").depends_on(["extract"]),
                WorkflowStep::new("risk", "Assess risks", "risk-assessment").depends_on(["compliance"]),
                WorkflowStep::new("recommend", "Generate recommendations", "recommendation")
                    .depends_on(["compliance", "risk"]),
            ],
            Self::VanguardReview => vec![
                WorkflowStep::new("security", "Security lane", "vanguard-lane").with_config("lane", "security"),
                WorkflowStep::new("integrity", "Integrity lane", "vanguard-lane").with_config("lane", "integrity"),
                WorkflowStep::new("accuracy", "Accuracy lane", "vanguard-lane").with_config("lane", "accuracy"),
                WorkflowStep::new("aggregate", "Aggregate scores", "aggregation")
                    .depends_on(["security", "integrity", "accuracy"]),
            ],
            Self::ApprovalChain => vec![
                WorkflowStep::new("submit", "Submit request", "submission"),
                WorkflowStep::new("manager-review", "Manager review", "approval").depends_on(["submit"]),
                WorkflowStep::new("executive-approval", "Executive approval", "approval")
                    .depends_on(["manager-review"])
                    .when(StepCondition::new(
                        "amount",
                        ConditionOperator::GreaterThan,
                        Some(json!(Self::EXECUTIVE_APPROVAL_THRESHOLD)),
                    )),
            ],
        }
    }

    /// Draft workflow built from the template
    #[must_use]
    pub fn instantiate(self, name: impl Into<String>) -> Workflow {
        Workflow::new(name, self.workflow_type()).with_steps(self.steps())
    }
}

impl FromStr for StepTemplate {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}
