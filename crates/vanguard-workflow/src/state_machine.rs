//! Step and workflow status transitions

use crate::error::WorkflowError;
use crate::types::{StepStatus, WorkflowStatus};

/// Statuses a step may move to from `from`
#[must_use]
pub fn allowed_step_transitions(from: StepStatus) -> &'static [StepStatus] {
    use StepStatus::{Completed, Failed, Pending, Running, Skipped};
    match from {
        Pending => &[Running, Skipped],
        Running => &[Completed, Failed],
        Completed | Failed | Skipped => &[],
    }
}

/// Statuses a workflow may move to from `from`
#[must_use]
pub fn allowed_workflow_transitions(from: WorkflowStatus) -> &'static [WorkflowStatus] {
    use WorkflowStatus::{Active, Cancelled, Completed, Draft, Failed, Paused};
    match from {
        Draft => &[Active, Cancelled],
        Active => &[Paused, Completed, Failed, Cancelled],
        Paused => &[Active, Completed, Failed, Cancelled],
        Completed | Failed | Cancelled => &[],
    }
}

/// Validate a step transition
///
/// # Errors
/// `WorkflowError::InvalidStepTransition` when the move is not permitted.
pub fn validate_step_transition(step: &str, from: StepStatus, to: StepStatus) -> Result<(), WorkflowError> {
    if allowed_step_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidStepTransition {
            step: step.to_string(),
            from,
            to,
        })
    }
}

/// Validate a workflow transition
///
/// # Errors
/// `WorkflowError::InvalidWorkflowState` naming the attempted action.
pub fn validate_workflow_transition(
    from: WorkflowStatus,
    to: WorkflowStatus,
    action: &'static str,
) -> Result<(), WorkflowError> {
    if allowed_workflow_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidWorkflowState { status: from, action })
    }
}
