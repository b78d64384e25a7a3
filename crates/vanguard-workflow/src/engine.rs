//! Workflow runner
//!
//! The engine owns no workflow state of its own: every transition goes
//! through [`WorkflowRepository::update`]. Steps are handed to a
//! [`StepExecutor`]; independent steps in a parallel workflow are executed
//! concurrently, bounded by `max_parallel_steps`.

use crate::definition::WorkflowDefinition;
use crate::error::WorkflowError;
use crate::repository::{WorkflowRepository, WorkflowUpdate};
use crate::types::{FailurePolicy, StepStatus, Workflow, WorkflowId, WorkflowStatus, WorkflowStep};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Executes one step
///
/// Implementations see an immutable snapshot of the workflow taken when the
/// step was started.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    /// Run the step, returning its result value
    async fn execute(&self, workflow: &Workflow, step: &WorkflowStep) -> Result<Value, WorkflowError>;
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct WorkflowConfig {
    /// Policy for workflows that do not set one
    pub default_failure_policy: FailurePolicy,
    /// Upper bound on concurrently executing steps per workflow
    pub max_parallel_steps: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_failure_policy: FailurePolicy::SkipOnFailure,
            max_parallel_steps: 8,
        }
    }
}

impl WorkflowConfig {
    /// Check the configuration
    ///
    /// # Errors
    /// `WorkflowError::InvalidConfig` when `max_parallel_steps` is zero.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.max_parallel_steps == 0 {
            return Err(WorkflowError::InvalidConfig(
                "max_parallel_steps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of one [`WorkflowEngine::run`] call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Workflow id
    pub workflow_id: WorkflowId,
    /// Status when the run stopped
    pub status: WorkflowStatus,
    /// Steps executed during this call
    pub steps_executed: usize,
    /// Steps that failed during this call
    pub steps_failed: usize,
}

/// Drives workflows stored in a repository
pub struct WorkflowEngine {
    repository: Arc<dyn WorkflowRepository>,
    executor: Arc<dyn StepExecutor>,
    config: WorkflowConfig,
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine").field("config", &self.config).finish_non_exhaustive()
    }
}

impl WorkflowEngine {
    /// Create an engine
    ///
    /// # Errors
    /// `WorkflowError::InvalidConfig` for an invalid configuration.
    pub fn new(
        repository: Arc<dyn WorkflowRepository>,
        executor: Arc<dyn StepExecutor>,
        config: WorkflowConfig,
    ) -> Result<Self, WorkflowError> {
        config.validate()?;
        Ok(Self {
            repository,
            executor,
            config,
        })
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Backing repository
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn WorkflowRepository> {
        &self.repository
    }

    /// Validate and store a draft workflow
    ///
    /// # Errors
    /// Graph errors (cycles are rejected here, before any step runs);
    /// `InvalidWorkflowState` unless the workflow is a draft.
    pub async fn create(&self, workflow: Workflow) -> Result<WorkflowId, WorkflowError> {
        if workflow.status != WorkflowStatus::Draft {
            return Err(WorkflowError::InvalidWorkflowState {
                status: workflow.status,
                action: "create",
            });
        }
        workflow.graph()?;
        let id = workflow.id;
        tracing::debug!(workflow = %id, name = %workflow.name, "workflow created");
        self.repository.insert(workflow).await?;
        Ok(id)
    }

    /// Expand a manifest with the configured default policy and store it
    ///
    /// # Errors
    /// Definition and graph errors.
    pub async fn create_from_definition(&self, definition: WorkflowDefinition) -> Result<WorkflowId, WorkflowError> {
        let workflow = definition.into_workflow(self.config.default_failure_policy)?;
        self.create(workflow).await
    }

    /// Run a workflow until it is terminal, paused, or has nothing to start
    ///
    /// A draft is started first. Executor errors mark the step failed; they
    /// do not abort the run.
    ///
    /// # Errors
    /// Repository and transition errors.
    #[tracing::instrument(skip(self), fields(workflow = %id))]
    pub async fn run(&self, id: WorkflowId) -> Result<RunSummary, WorkflowError> {
        let mut workflow = self.repository.get(id).await?;
        if workflow.status == WorkflowStatus::Draft {
            workflow = self.repository.update(id, Box::new(Workflow::start)).await?;
        }

        let mut steps_executed = 0;
        let mut steps_failed = 0;
        loop {
            let batch: Vec<String> = workflow
                .next_steps()
                .into_iter()
                .take(self.config.max_parallel_steps)
                .map(str::to_string)
                .collect();
            if batch.is_empty() {
                break;
            }

            let (started, interrupted) = self.start_batch(id, &mut workflow, batch).await?;
            if started.is_empty() {
                break;
            }

            let snapshot = workflow.clone();
            let outcomes = join_all(started.iter().map(|step| self.executor.execute(&snapshot, step))).await;

            let mut finish_error = None;
            for (step, outcome) in started.iter().zip(outcomes) {
                steps_executed += 1;
                let step_id = step.id.clone();
                let update: WorkflowUpdate = match outcome {
                    Ok(value) => Box::new(move |wf: &Workflow| wf.mark_completed(&step_id, Some(value))),
                    Err(err) => {
                        steps_failed += 1;
                        tracing::warn!(step = %step.id, error = %err, "step execution failed");
                        let message = err.to_string();
                        Box::new(move |wf: &Workflow| wf.mark_failed(&step_id, message))
                    }
                };
                match self.repository.update(id, update).await {
                    Ok(updated) => workflow = updated,
                    Err(err) => {
                        tracing::error!(step = %step.id, error = %err, "could not record step outcome");
                        finish_error.get_or_insert(err);
                    }
                }
            }
            if let Some(err) = finish_error {
                return Err(err);
            }
            if interrupted {
                break;
            }
        }

        tracing::info!(
            status = %workflow.status,
            steps_executed,
            steps_failed,
            "workflow run stopped"
        );
        Ok(RunSummary {
            workflow_id: id,
            status: workflow.status,
            steps_executed,
            steps_failed,
        })
    }

    /// Mark a batch running, one step at a time
    ///
    /// Returns the steps whose stored status is now running, and whether
    /// starting stopped early because the workflow left the active state
    /// (paused, cancelled, or finished) between two updates. Steps already
    /// started are still handed back so they get executed and finished.
    async fn start_batch(
        &self,
        id: WorkflowId,
        workflow: &mut Workflow,
        batch: Vec<String>,
    ) -> Result<(Vec<WorkflowStep>, bool), WorkflowError> {
        let mut started = Vec::with_capacity(batch.len());
        for step_id in batch {
            let target = step_id.clone();
            match self
                .repository
                .update(id, Box::new(move |wf: &Workflow| wf.mark_running(&target)))
                .await
            {
                Ok(updated) => *workflow = updated,
                Err(err @ WorkflowError::InvalidWorkflowState { .. }) => {
                    tracing::info!(step = %step_id, reason = %err, "workflow left the active state, not starting more steps");
                    *workflow = self.repository.get(id).await?;
                    return Ok((started, true));
                }
                Err(err) if !started.is_empty() => {
                    tracing::warn!(step = %step_id, error = %err, "could not start step, finishing the started ones");
                    *workflow = self.repository.get(id).await?;
                    return Ok((started, true));
                }
                Err(err) => return Err(err),
            }
            match workflow.step(&step_id) {
                Some(step) if step.status == StepStatus::Running => started.push(step.clone()),
                _ => {
                    tracing::debug!(step = %step_id, status = %workflow.status, "step not started");
                    return Ok((started, true));
                }
            }
        }
        Ok((started, false))
    }

    /// Pause a stored workflow
    ///
    /// # Errors
    /// `WorkflowNotFound`, `InvalidWorkflowState`.
    pub async fn pause(&self, id: WorkflowId) -> Result<Workflow, WorkflowError> {
        self.repository.update(id, Box::new(Workflow::pause)).await
    }

    /// Resume a paused workflow; call [`run`](Self::run) to continue executing
    ///
    /// # Errors
    /// `WorkflowNotFound`, `InvalidWorkflowState`.
    pub async fn resume(&self, id: WorkflowId) -> Result<Workflow, WorkflowError> {
        self.repository.update(id, Box::new(Workflow::resume)).await
    }

    /// Cancel a stored workflow
    ///
    /// # Errors
    /// `WorkflowNotFound`, `InvalidWorkflowState`.
    pub async fn cancel(&self, id: WorkflowId) -> Result<Workflow, WorkflowError> {
        self.repository.update(id, Box::new(Workflow::cancel)).await
    }

    /// Reset a stored workflow to a fresh draft
    ///
    /// # Errors
    /// `WorkflowNotFound`.
    pub async fn reset(&self, id: WorkflowId) -> Result<Workflow, WorkflowError> {
        self.repository.update(id, Box::new(|wf: &Workflow| Ok(wf.reset()))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryWorkflowRepository;
    use crate::types::WorkflowType;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;

    #[derive(Debug)]
    struct Echo {
        fail: &'static [&'static str],
    }

    #[async_trait]
    impl StepExecutor for Echo {
        async fn execute(&self, _workflow: &Workflow, step: &WorkflowStep) -> Result<Value, WorkflowError> {
            if self.fail.contains(&step.id.as_str()) {
                return Err(WorkflowError::execution(&step.id, "scripted failure"));
            }
            Ok(json!({ "step": step.id }))
        }
    }

    /// Records executed steps and how many were in flight at once
    #[derive(Debug, Default)]
    struct Tracking {
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        barrier: Option<Barrier>,
    }

    impl Tracking {
        fn with_barrier(parties: usize) -> Self {
            Self {
                barrier: Some(Barrier::new(parties)),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl StepExecutor for Tracking {
        async fn execute(&self, _workflow: &Workflow, step: &WorkflowStep) -> Result<Value, WorkflowError> {
            self.calls.lock().push(step.id.clone());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(json!(step.id))
        }
    }

    /// Applies `interrupt` right after the first update that leaves a step running
    struct Interrupting {
        inner: InMemoryWorkflowRepository,
        interrupt: fn(&Workflow) -> Result<Workflow, WorkflowError>,
        fired: AtomicBool,
    }

    impl Interrupting {
        fn new(interrupt: fn(&Workflow) -> Result<Workflow, WorkflowError>) -> Self {
            Self {
                inner: InMemoryWorkflowRepository::new(),
                interrupt,
                fired: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl WorkflowRepository for Interrupting {
        async fn insert(&self, workflow: Workflow) -> Result<(), WorkflowError> {
            self.inner.insert(workflow).await
        }

        async fn get(&self, id: WorkflowId) -> Result<Workflow, WorkflowError> {
            self.inner.get(id).await
        }

        async fn update(&self, id: WorkflowId, apply: WorkflowUpdate) -> Result<Workflow, WorkflowError> {
            let updated = self.inner.update(id, apply).await?;
            let running = !updated.steps_with_status(StepStatus::Running).is_empty();
            if running && updated.status == WorkflowStatus::Active && !self.fired.swap(true, Ordering::SeqCst) {
                return self.inner.update(id, Box::new(self.interrupt)).await;
            }
            Ok(updated)
        }

        async fn list(&self) -> Result<Vec<Workflow>, WorkflowError> {
            self.inner.list().await
        }
    }

    fn pair() -> Workflow {
        Workflow::new("pair", WorkflowType::Parallel).with_steps([
            WorkflowStep::new("a", "A", "task"),
            WorkflowStep::new("b", "B", "task"),
        ])
    }

    fn engine(fail: &'static [&'static str]) -> WorkflowEngine {
        WorkflowEngine::new(
            Arc::new(InMemoryWorkflowRepository::new()),
            Arc::new(Echo { fail }),
            WorkflowConfig::default(),
        )
        .unwrap()
    }

    fn diamond(workflow_type: WorkflowType) -> Workflow {
        Workflow::new("diamond", workflow_type).with_steps([
            WorkflowStep::new("a", "A", "task"),
            WorkflowStep::new("b", "B", "task").depends_on(["a"]),
            WorkflowStep::new("c", "C", "task").depends_on(["a"]),
            WorkflowStep::new("d", "D", "task").depends_on(["b", "c"]),
        ])
    }

    #[tokio::test]
    async fn runs_to_completion() {
        let engine = engine(&[]);
        let id = engine.create(diamond(WorkflowType::Parallel)).await.unwrap();
        let summary = engine.run(id).await.unwrap();
        assert_eq!(summary.status, WorkflowStatus::Completed);
        assert_eq!(summary.steps_executed, 4);

        let stored = engine.repository().get(id).await.unwrap();
        assert_eq!(stored.step("d").unwrap().result, Some(json!({ "step": "d" })));
        assert_eq!(stored.execution_count, 1);
    }

    #[tokio::test]
    async fn executor_failure_skips_dependants() {
        let engine = engine(&["b"]);
        let id = engine.create(diamond(WorkflowType::Sequential)).await.unwrap();
        let summary = engine.run(id).await.unwrap();
        assert_eq!(summary.status, WorkflowStatus::Failed);
        assert_eq!(summary.steps_failed, 1);

        let stored = engine.repository().get(id).await.unwrap();
        assert_eq!(stored.step_status("c"), Some(StepStatus::Completed));
        assert_eq!(stored.step_status("d"), Some(StepStatus::Skipped));
        assert_eq!(
            stored.step("b").unwrap().error.as_deref(),
            Some("step 'b' failed: scripted failure")
        );
    }

    #[tokio::test]
    async fn cyclic_workflow_is_rejected_on_create() {
        let engine = engine(&[]);
        let cyclic = Workflow::new("loop", WorkflowType::Parallel).with_steps([
            WorkflowStep::new("a", "A", "task").depends_on(["b"]),
            WorkflowStep::new("b", "B", "task").depends_on(["a"]),
        ]);
        let err = engine.create(cyclic).await.unwrap_err();
        assert!(matches!(err, WorkflowError::DependencyCycle { .. }));
    }

    #[tokio::test]
    async fn paused_workflow_does_not_run() {
        let engine = engine(&[]);
        let id = engine.create(diamond(WorkflowType::Parallel)).await.unwrap();
        engine
            .repository()
            .update(id, Box::new(Workflow::start))
            .await
            .unwrap();
        engine.pause(id).await.unwrap();
        let summary = engine.run(id).await.unwrap();
        assert_eq!(summary.status, WorkflowStatus::Paused);
        assert_eq!(summary.steps_executed, 0);

        engine.resume(id).await.unwrap();
        assert_eq!(engine.run(id).await.unwrap().status, WorkflowStatus::Completed);
    }

    #[tokio::test]
    async fn independent_parallel_steps_are_in_flight_together() {
        let executor = Arc::new(Tracking::with_barrier(2));
        let engine = WorkflowEngine::new(
            Arc::new(InMemoryWorkflowRepository::new()),
            executor.clone(),
            WorkflowConfig::default(),
        )
        .unwrap();
        let id = engine.create(pair()).await.unwrap();
        // Both steps wait on a two-party barrier, so a serial runner never gets past the first.
        let summary = tokio::time::timeout(Duration::from_secs(5), engine.run(id))
            .await
            .expect("parallel steps did not overlap")
            .unwrap();
        assert_eq!(summary.status, WorkflowStatus::Completed);
        assert_eq!(executor.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn sequential_steps_never_overlap() {
        let executor = Arc::new(Tracking::default());
        let engine = WorkflowEngine::new(
            Arc::new(InMemoryWorkflowRepository::new()),
            executor.clone(),
            WorkflowConfig::default(),
        )
        .unwrap();
        let workflow = Workflow::new("seq", WorkflowType::Sequential).with_steps([
            WorkflowStep::new("a", "A", "task"),
            WorkflowStep::new("b", "B", "task"),
        ]);
        let id = engine.create(workflow).await.unwrap();
        assert_eq!(engine.run(id).await.unwrap().status, WorkflowStatus::Completed);
        assert_eq!(executor.peak.load(Ordering::SeqCst), 1);
        assert_eq!(*executor.calls.lock(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn pause_mid_batch_finishes_started_steps() {
        let executor = Arc::new(Tracking::default());
        let engine = WorkflowEngine::new(
            Arc::new(Interrupting::new(Workflow::pause)),
            executor.clone(),
            WorkflowConfig::default(),
        )
        .unwrap();
        let id = engine.create(pair()).await.unwrap();

        let summary = engine.run(id).await.unwrap();
        assert_eq!(summary.status, WorkflowStatus::Paused);
        assert_eq!(summary.steps_executed, 1);
        let stored = engine.repository().get(id).await.unwrap();
        assert_eq!(stored.step_status("a"), Some(StepStatus::Completed));
        assert_eq!(stored.step_status("b"), Some(StepStatus::Pending));

        engine.resume(id).await.unwrap();
        assert_eq!(engine.run(id).await.unwrap().status, WorkflowStatus::Completed);
        assert_eq!(*executor.calls.lock(), vec!["a", "b"]);
        let stored = engine.repository().get(id).await.unwrap();
        assert!(stored.steps_with_status(StepStatus::Running).is_empty());
    }

    #[tokio::test]
    async fn cancel_mid_batch_never_executes_pending_steps() {
        let executor = Arc::new(Tracking::default());
        let engine = WorkflowEngine::new(
            Arc::new(Interrupting::new(Workflow::cancel)),
            executor.clone(),
            WorkflowConfig::default(),
        )
        .unwrap();
        let id = engine.create(pair()).await.unwrap();

        let summary = engine.run(id).await.unwrap();
        assert_eq!(summary.status, WorkflowStatus::Cancelled);
        assert_eq!(*executor.calls.lock(), vec!["a"]);
        let stored = engine.repository().get(id).await.unwrap();
        assert_eq!(stored.step_status("b"), Some(StepStatus::Pending));
    }

    #[tokio::test]
    async fn definition_uses_configured_default_policy() {
        let engine = WorkflowEngine::new(
            Arc::new(InMemoryWorkflowRepository::new()),
            Arc::new(Echo { fail: &["a"] }),
            WorkflowConfig {
                default_failure_policy: FailurePolicy::Halt,
                ..WorkflowConfig::default()
            },
        )
        .unwrap();
        let yaml = "name: halted\ntype: parallel\nsteps:\n  - id: a\n    type: t\n  - id: b\n    type: t\n    dependencies: [a]\n";
        let id = engine
            .create_from_definition(WorkflowDefinition::from_yaml(yaml).unwrap())
            .await
            .unwrap();
        assert_eq!(engine.run(id).await.unwrap().status, WorkflowStatus::Failed);
        let stored = engine.repository().get(id).await.unwrap();
        assert_eq!(stored.step_status("b"), Some(StepStatus::Pending));
    }

    #[test]
    fn zero_parallelism_is_invalid() {
        let config = WorkflowConfig {
            max_parallel_steps: 0,
            ..WorkflowConfig::default()
        };
        assert!(matches!(config.validate(), Err(WorkflowError::InvalidConfig(_))));
    }
}
