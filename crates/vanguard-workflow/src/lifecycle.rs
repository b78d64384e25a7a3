//! Workflow transitions
//!
//! Every operation takes `&self` and returns a new [`Workflow`]; callers
//! persist the returned value as a whole-record replacement. After each step
//! transition the workflow is settled: skips propagate through the graph and
//! the workflow status is re-derived from the step statuses.

use crate::error::WorkflowError;
use crate::graph::StepGraph;
use crate::state_machine::{validate_step_transition, validate_workflow_transition};
use crate::types::{FailurePolicy, StepStatus, Workflow, WorkflowStatus, WorkflowStep, WorkflowType};
use chrono::Utc;
use serde_json::Value;

impl Workflow {
    /// Validated dependency graph
    ///
    /// # Errors
    /// Any graph error from [`StepGraph::build`].
    pub fn graph(&self) -> Result<StepGraph, WorkflowError> {
        StepGraph::build(&self.steps)
    }

    /// Draft to active
    ///
    /// The graph is validated first, so a cycle is reported before any step runs.
    ///
    /// # Errors
    /// `InvalidWorkflowState` unless draft; graph errors.
    pub fn start(&self) -> Result<Self, WorkflowError> {
        validate_workflow_transition(self.status, WorkflowStatus::Active, "start")?;
        let graph = self.graph()?;
        let mut next = self.clone();
        next.status = WorkflowStatus::Active;
        next.execution_count += 1;
        next.touch();
        next.settle(&graph);
        tracing::info!(
            workflow = %next.id,
            name = %next.name,
            steps = next.steps.len(),
            run = next.execution_count,
            "workflow started"
        );
        Ok(next)
    }

    /// Active to paused; running steps may still report back
    ///
    /// # Errors
    /// `InvalidWorkflowState` unless active.
    pub fn pause(&self) -> Result<Self, WorkflowError> {
        self.with_status(WorkflowStatus::Paused, "pause")
    }

    /// Paused to active
    ///
    /// # Errors
    /// `InvalidWorkflowState` unless paused.
    pub fn resume(&self) -> Result<Self, WorkflowError> {
        if self.status != WorkflowStatus::Paused {
            return Err(WorkflowError::InvalidWorkflowState {
                status: self.status,
                action: "resume",
            });
        }
        let graph = self.graph()?;
        let mut next = self.with_status(WorkflowStatus::Active, "resume")?;
        next.settle(&graph);
        Ok(next)
    }

    /// Operator cancellation; cancelling a cancelled workflow is a no-op
    ///
    /// # Errors
    /// `InvalidWorkflowState` when already completed or failed.
    pub fn cancel(&self) -> Result<Self, WorkflowError> {
        if self.status == WorkflowStatus::Cancelled {
            return Ok(self.clone());
        }
        self.with_status(WorkflowStatus::Cancelled, "cancel")
    }

    /// Fresh draft copy with every step pending
    ///
    /// Keeps the id and the run counter; the only way out of a terminal status.
    #[must_use]
    pub fn reset(&self) -> Self {
        let mut next = self.clone();
        next.status = WorkflowStatus::Draft;
        next.current_step = None;
        for step in &mut next.steps {
            step.reset();
        }
        next.touch();
        tracing::debug!(workflow = %next.id, "workflow reset to draft");
        next
    }

    /// Pending steps whose dependencies have all completed, in array order
    #[must_use]
    pub fn eligible_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|step| step.status == StepStatus::Pending)
            .filter(|step| {
                step.dependencies
                    .iter()
                    .all(|dep| self.step_status(dep) == Some(StepStatus::Completed))
            })
            .map(|step| step.id.as_str())
            .collect()
    }

    /// Steps the scheduler should start now
    ///
    /// Empty unless active. Sequential workflows start the lowest-index
    /// eligible step once nothing is running; parallel workflows start every
    /// eligible step; conditional workflows start eligible steps whose
    /// condition holds.
    #[must_use]
    pub fn next_steps(&self) -> Vec<&str> {
        if self.status != WorkflowStatus::Active {
            return Vec::new();
        }
        let eligible = self.eligible_steps();
        match self.workflow_type {
            WorkflowType::Sequential => {
                if self.steps.iter().any(|step| step.status == StepStatus::Running) {
                    Vec::new()
                } else {
                    eligible.into_iter().take(1).collect()
                }
            }
            WorkflowType::Parallel => eligible,
            WorkflowType::Conditional => eligible
                .into_iter()
                .filter(|id| self.condition_holds(id))
                .collect(),
        }
    }

    /// Pending to running
    ///
    /// A no-op on a terminal workflow.
    ///
    /// # Errors
    /// `InvalidWorkflowState` unless active, `StepNotFound`,
    /// `InvalidStepTransition`, or `NotReady` when dependencies or ordering
    /// forbid the start.
    pub fn mark_running(&self, step_id: &str) -> Result<Self, WorkflowError> {
        if let Some(unchanged) = self.ignore_when_terminal(step_id, StepStatus::Running) {
            return Ok(unchanged);
        }
        if self.status != WorkflowStatus::Active {
            return Err(WorkflowError::InvalidWorkflowState {
                status: self.status,
                action: "start a step in",
            });
        }
        let index = self.require_step(step_id)?;
        validate_step_transition(step_id, self.steps[index].status, StepStatus::Running)?;
        if !self.next_steps().contains(&step_id) {
            return Err(WorkflowError::NotReady {
                step: step_id.to_string(),
                reason: self.not_ready_reason(index),
            });
        }

        let mut next = self.clone();
        let step = &mut next.steps[index];
        step.status = StepStatus::Running;
        step.started_at = Some(Utc::now());
        next.current_step = Some(step_id.to_string());
        next.touch();
        tracing::debug!(workflow = %next.id, step = step_id, "step running");
        Ok(next)
    }

    /// Running to completed, storing the executor output
    ///
    /// A no-op on a terminal workflow.
    ///
    /// # Errors
    /// `InvalidWorkflowState` on a draft, `StepNotFound`, `InvalidStepTransition`.
    pub fn mark_completed(&self, step_id: &str, result: Option<Value>) -> Result<Self, WorkflowError> {
        self.finish_step(step_id, StepStatus::Completed, |step| {
            step.result = result;
        })
    }

    /// Running to failed, storing the error message
    ///
    /// A no-op on a terminal workflow.
    ///
    /// # Errors
    /// `InvalidWorkflowState` on a draft, `StepNotFound`, `InvalidStepTransition`.
    pub fn mark_failed(&self, step_id: &str, error: impl Into<String>) -> Result<Self, WorkflowError> {
        let error = error.into();
        self.finish_step(step_id, StepStatus::Failed, |step| {
            step.error = Some(error);
        })
    }

    fn finish_step(
        &self,
        step_id: &str,
        to: StepStatus,
        apply: impl FnOnce(&mut WorkflowStep),
    ) -> Result<Self, WorkflowError> {
        if let Some(unchanged) = self.ignore_when_terminal(step_id, to) {
            return Ok(unchanged);
        }
        if self.status == WorkflowStatus::Draft {
            return Err(WorkflowError::InvalidWorkflowState {
                status: self.status,
                action: "finish a step in",
            });
        }
        let index = self.require_step(step_id)?;
        validate_step_transition(step_id, self.steps[index].status, to)?;
        let graph = self.graph()?;

        let mut next = self.clone();
        let step = &mut next.steps[index];
        step.status = to;
        step.completed_at = Some(Utc::now());
        apply(step);
        record_step(to);
        tracing::debug!(workflow = %next.id, step = step_id, status = %to, "step finished");
        next.touch();
        next.settle(&graph);
        Ok(next)
    }

    /// Propagate skips and derive the workflow status
    fn settle(&mut self, graph: &StepGraph) {
        if !matches!(self.status, WorkflowStatus::Active | WorkflowStatus::Paused) {
            return;
        }

        let now = Utc::now();
        for index in graph.topological_order() {
            if self.steps[index].status != StepStatus::Pending {
                continue;
            }
            let dependencies = graph.dependencies(index);
            let upstream_skipped = dependencies
                .iter()
                .any(|&dep| self.steps[dep].status == StepStatus::Skipped);
            let upstream_failed = dependencies
                .iter()
                .any(|&dep| self.steps[dep].status == StepStatus::Failed);
            let ready = dependencies
                .iter()
                .all(|&dep| self.steps[dep].status == StepStatus::Completed);
            let predicate_false = self.workflow_type == WorkflowType::Conditional
                && ready
                && !self.condition_holds(&self.steps[index].id);

            let reason = if upstream_skipped {
                Some("dependency skipped")
            } else if upstream_failed && self.failure_policy == FailurePolicy::SkipOnFailure {
                Some("dependency failed")
            } else if predicate_false {
                Some("condition not met")
            } else {
                None
            };

            if let Some(reason) = reason {
                let step = &mut self.steps[index];
                step.status = StepStatus::Skipped;
                step.completed_at = Some(now);
                record_step(StepStatus::Skipped);
                tracing::debug!(workflow = %self.id, step = %step.id, reason, "step skipped");
            }
        }

        if let Some(derived) = self.derived_status(graph) {
            self.status = derived;
            match derived {
                WorkflowStatus::Failed => {
                    tracing::warn!(workflow = %self.id, failed = ?self.steps_with_status(StepStatus::Failed), "workflow failed");
                }
                _ => tracing::info!(workflow = %self.id, status = %derived, "workflow finished"),
            }
        }
    }

    /// Terminal status implied by the steps, if any
    fn derived_status(&self, graph: &StepGraph) -> Option<WorkflowStatus> {
        let all_done = self
            .steps
            .iter()
            .all(|step| matches!(step.status, StepStatus::Completed | StepStatus::Skipped));
        if all_done {
            return Some(WorkflowStatus::Completed);
        }

        let any_failed = self.steps.iter().any(|step| step.status == StepStatus::Failed);
        let can_still_complete = |index: usize| match self.steps[index].status {
            StepStatus::Running => true,
            StepStatus::Pending => graph
                .upstream(index)
                .iter()
                .all(|&up| self.steps[up].status != StepStatus::Failed),
            _ => false,
        };
        if any_failed && !(0..self.steps.len()).any(can_still_complete) {
            return Some(WorkflowStatus::Failed);
        }
        None
    }

    fn condition_holds(&self, step_id: &str) -> bool {
        self.step(step_id)
            .and_then(|step| step.condition.as_ref())
            .map_or(true, |condition| condition.evaluate(&self.variables))
    }

    fn not_ready_reason(&self, index: usize) -> String {
        let step = &self.steps[index];
        if let Some(dep) = step
            .dependencies
            .iter()
            .find(|dep| self.step_status(dep) != Some(StepStatus::Completed))
        {
            return format!("waiting on dependency '{dep}'");
        }
        if let Some(running) = self.steps.iter().find(|s| s.status == StepStatus::Running) {
            return format!("step '{}' is still running", running.id);
        }
        if let Some(first) = self.next_steps().first() {
            return format!("step '{first}' runs first");
        }
        "condition not met".to_string()
    }

    fn require_step(&self, step_id: &str) -> Result<usize, WorkflowError> {
        self.step_index(step_id)
            .ok_or_else(|| WorkflowError::StepNotFound(step_id.to_string()))
    }

    fn ignore_when_terminal(&self, step_id: &str, to: StepStatus) -> Option<Self> {
        if !self.status.is_terminal() {
            return None;
        }
        tracing::warn!(
            workflow = %self.id,
            status = %self.status,
            step = step_id,
            requested = %to,
            "workflow already terminal, step update ignored"
        );
        Some(self.clone())
    }

    fn with_status(&self, to: WorkflowStatus, action: &'static str) -> Result<Self, WorkflowError> {
        validate_workflow_transition(self.status, to, action)?;
        let mut next = self.clone();
        next.status = to;
        next.touch();
        tracing::info!(workflow = %next.id, status = %to, "workflow {action}");
        Ok(next)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn record_step(status: StepStatus) {
    metrics::counter!("vanguard_workflow_steps_total", "status" => status.as_str()).increment(1);
}
