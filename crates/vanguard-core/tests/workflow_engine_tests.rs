//! Workflow engine driven through the repository with scripted executors

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use vanguard_core::VanguardConfig;
use vanguard_test_utils::{chain_workflow, four_step_workflow, ScriptedExecutor};
use vanguard_workflow::{
    InMemoryWorkflowRepository, StepStatus, StepTemplate, WorkflowEngine, WorkflowStatus, WorkflowType,
};

fn engine(executor: Arc<ScriptedExecutor>) -> WorkflowEngine {
    WorkflowEngine::new(
        Arc::new(InMemoryWorkflowRepository::new()),
        executor,
        VanguardConfig::default().workflow,
    )
    .unwrap()
}

#[tokio::test]
async fn test_document_analysis_template_runs_in_order() {
    let executor = Arc::new(ScriptedExecutor::new().returning("risk", json!({ "risks": 2 })));
    let engine = engine(Arc::clone(&executor));
    let id = engine
        .create(StepTemplate::DocumentAnalysis.instantiate("lease review"))
        .await
        .unwrap();

    let summary = engine.run(id).await.unwrap();
    assert_eq!(summary.status, WorkflowStatus::Completed);
    assert_eq!(executor.calls(), vec!["extract", "compliance", "risk", "recommend"]);

    let stored = engine.repository().get(id).await.unwrap();
    assert_eq!(stored.step("risk").unwrap().result, Some(json!({ "risks": 2 })));
    assert_eq!(stored.current_step.as_deref(), Some("recommend"));
}

#[tokio::test]
async fn test_four_step_failure_propagates() {
    let executor = Arc::new(ScriptedExecutor::new().failing("B"));
    let engine = engine(Arc::clone(&executor));
    let id = engine.create(four_step_workflow(WorkflowType::Sequential)).await.unwrap();

    let summary = engine.run(id).await.unwrap();
    assert_eq!(summary.status, WorkflowStatus::Failed);
    assert_eq!(executor.calls(), vec!["A", "B", "C"]);

    let stored = engine.repository().get(id).await.unwrap();
    assert_eq!(stored.step_status("D"), Some(StepStatus::Skipped));
}

#[tokio::test]
async fn test_parallel_review_runs_lanes_before_aggregate() {
    let executor = Arc::new(ScriptedExecutor::new());
    let engine = engine(Arc::clone(&executor));
    let id = engine
        .create(StepTemplate::VanguardReview.instantiate("review"))
        .await
        .unwrap();
    assert_eq!(engine.run(id).await.unwrap().status, WorkflowStatus::Completed);

    let calls = executor.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls.last().map(String::as_str), Some("aggregate"));
}

#[tokio::test]
async fn test_cancelled_workflow_stays_cancelled() {
    let executor = Arc::new(ScriptedExecutor::new());
    let engine = engine(Arc::clone(&executor));
    let id = engine.create(chain_workflow(WorkflowType::Sequential, &["a", "b"])).await.unwrap();
    engine.cancel(id).await.unwrap();

    let summary = engine.run(id).await.unwrap();
    assert_eq!(summary.status, WorkflowStatus::Cancelled);
    assert!(executor.calls().is_empty());

    let fresh = engine.reset(id).await.unwrap();
    assert_eq!(fresh.status, WorkflowStatus::Draft);
    assert_eq!(engine.run(id).await.unwrap().status, WorkflowStatus::Completed);
    assert_eq!(executor.calls(), vec!["a", "b"]);
}
