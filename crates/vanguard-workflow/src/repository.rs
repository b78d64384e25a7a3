//! Workflow record store seam

use crate::error::WorkflowError;
use crate::types::{Workflow, WorkflowId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Transition applied inside [`WorkflowRepository::update`]
pub type WorkflowUpdate = Box<dyn FnOnce(&Workflow) -> Result<Workflow, WorkflowError> + Send>;

/// Backing store for workflow records
///
/// `update` reads the current record, applies the transition, and replaces
/// the whole record in one step, so concurrent step completions never lose
/// each other's writes.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Store a new workflow
    async fn insert(&self, workflow: Workflow) -> Result<(), WorkflowError>;

    /// Current record
    async fn get(&self, id: WorkflowId) -> Result<Workflow, WorkflowError>;

    /// Atomic read-transform-replace; returns the stored result
    async fn update(&self, id: WorkflowId, apply: WorkflowUpdate) -> Result<Workflow, WorkflowError>;

    /// All records, oldest first
    async fn list(&self) -> Result<Vec<Workflow>, WorkflowError>;
}

/// In-process repository
#[derive(Debug, Default)]
pub struct InMemoryWorkflowRepository {
    records: RwLock<HashMap<WorkflowId, Workflow>>,
}

impl InMemoryWorkflowRepository {
    /// Empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored workflows
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Nothing stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn insert(&self, workflow: Workflow) -> Result<(), WorkflowError> {
        let mut records = self.records.write();
        if records.contains_key(&workflow.id) {
            tracing::warn!(workflow = %workflow.id, "workflow already stored, replacing");
        }
        records.insert(workflow.id, workflow);
        Ok(())
    }

    async fn get(&self, id: WorkflowId) -> Result<Workflow, WorkflowError> {
        self.records
            .read()
            .get(&id)
            .cloned()
            .ok_or(WorkflowError::WorkflowNotFound(id))
    }

    async fn update(&self, id: WorkflowId, apply: WorkflowUpdate) -> Result<Workflow, WorkflowError> {
        let mut records = self.records.write();
        let current = records.get(&id).ok_or(WorkflowError::WorkflowNotFound(id))?;
        let next = apply(current)?;
        records.insert(id, next.clone());
        Ok(next)
    }

    async fn list(&self) -> Result<Vec<Workflow>, WorkflowError> {
        let mut all: Vec<Workflow> = self.records.read().values().cloned().collect();
        all.sort_by_key(|workflow| workflow.id);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{WorkflowStatus, WorkflowType};

    #[tokio::test]
    async fn update_replaces_whole_record() {
        let repo = InMemoryWorkflowRepository::new();
        let workflow = Workflow::new("wf", WorkflowType::Parallel);
        let id = workflow.id;
        repo.insert(workflow).await.unwrap();

        let started = repo.update(id, Box::new(Workflow::start)).await.unwrap();
        assert_eq!(started.status, WorkflowStatus::Completed);
        assert_eq!(repo.get(id).await.unwrap(), started);
    }

    #[tokio::test]
    async fn failed_update_leaves_record_untouched() {
        let repo = InMemoryWorkflowRepository::new();
        let workflow = Workflow::new("wf", WorkflowType::Parallel);
        let id = workflow.id;
        repo.insert(workflow.clone()).await.unwrap();

        let err = repo.update(id, Box::new(Workflow::pause)).await.unwrap_err();
        assert!(err.is_transition_error());
        assert_eq!(repo.get(id).await.unwrap(), workflow);
    }

    #[tokio::test]
    async fn missing_workflow_is_not_found() {
        let repo = InMemoryWorkflowRepository::new();
        let id = WorkflowId::new();
        assert!(matches!(repo.get(id).await, Err(WorkflowError::WorkflowNotFound(missing)) if missing == id));
        assert!(repo.is_empty());
    }
}
