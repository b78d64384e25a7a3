//! Workflow lifecycle scenarios

use pretty_assertions::assert_eq;
use vanguard_workflow::{
    FailurePolicy, StepStatus, Workflow, WorkflowError, WorkflowStatus, WorkflowStep, WorkflowType,
};

fn scenario_b() -> Workflow {
    Workflow::new("scenario-b", WorkflowType::Sequential)
        .with_failure_policy(FailurePolicy::SkipOnFailure)
        .with_steps([
            WorkflowStep::new("A", "A", "task"),
            WorkflowStep::new("B", "B", "task").depends_on(["A"]),
            WorkflowStep::new("C", "C", "task").depends_on(["A"]),
            WorkflowStep::new("D", "D", "task").depends_on(["B"]),
        ])
}

#[test]
fn test_scenario_b_failure_skips_dependant_and_fails_workflow() {
    let wf = scenario_b().start().unwrap();
    assert_eq!(wf.eligible_steps(), vec!["A"]);

    let wf = wf.mark_running("A").unwrap().mark_completed("A", None).unwrap();
    assert_eq!(wf.eligible_steps(), vec!["B", "C"]);

    let wf = wf.mark_running("B").unwrap().mark_failed("B", "rejected").unwrap();
    assert_eq!(wf.step_status("D"), Some(StepStatus::Skipped));
    assert_eq!(wf.status, WorkflowStatus::Active);

    let wf = wf.mark_running("C").unwrap().mark_completed("C", None).unwrap();
    assert_eq!(wf.status, WorkflowStatus::Failed);
    assert_eq!(wf.steps_with_status(StepStatus::Completed), vec!["A", "C"]);
    assert_eq!(wf.execution_count, 1);
}

#[test]
fn test_cycle_detected_before_first_step() {
    let wf = Workflow::new("cyclic", WorkflowType::Parallel).with_steps([
        WorkflowStep::new("a", "a", "task").depends_on(["c"]),
        WorkflowStep::new("b", "b", "task").depends_on(["a"]),
        WorkflowStep::new("c", "c", "task").depends_on(["b"]),
    ]);
    let err = wf.start().unwrap_err();
    match err {
        WorkflowError::DependencyCycle { steps } => assert_eq!(steps, vec!["a", "b", "c"]),
        other => panic!("expected cycle, got {other}"),
    }
    assert!(wf.steps.iter().all(|s| s.status == StepStatus::Pending));
}

#[test]
fn test_completed_workflow_ignores_further_updates() {
    let wf = Workflow::new("done", WorkflowType::Sequential)
        .with_step(WorkflowStep::new("only", "Only", "task"))
        .start()
        .unwrap()
        .mark_running("only")
        .unwrap()
        .mark_completed("only", None)
        .unwrap();
    assert_eq!(wf.status, WorkflowStatus::Completed);

    let again = wf.mark_completed("only", None).unwrap();
    let failed = wf.mark_failed("only", "late failure").unwrap();
    assert_eq!(again, wf);
    assert_eq!(failed.step_status("only"), Some(StepStatus::Completed));
    assert_eq!(failed.status, WorkflowStatus::Completed);
}

#[test]
fn test_sequential_follows_array_order_over_readiness() {
    let wf = Workflow::new("order", WorkflowType::Sequential)
        .with_steps([
            WorkflowStep::new("first", "first", "task"),
            WorkflowStep::new("second", "second", "task"),
            WorkflowStep::new("third", "third", "task"),
        ])
        .start()
        .unwrap();
    let mut order = Vec::new();
    let mut wf = wf;
    while let Some(next) = wf.next_steps().first().map(|s| (*s).to_string()) {
        wf = wf.mark_running(&next).unwrap().mark_completed(&next, None).unwrap();
        order.push(next);
    }
    assert_eq!(order, vec!["first", "second", "third"]);
    assert_eq!(wf.status, WorkflowStatus::Completed);
}

#[test]
fn test_workflow_serializes_with_wire_names() {
    let wf = scenario_b().start().unwrap();
    let value = serde_json::to_value(&wf).unwrap();
    assert_eq!(value["type"], "sequential");
    assert_eq!(value["status"], "active");
    assert_eq!(value["failurePolicy"], "skip-on-failure");
    assert_eq!(value["executionCount"], 1);
    assert_eq!(value["steps"][1]["dependencies"][0], "A");
    let back: Workflow = serde_json::from_value(value).unwrap();
    assert_eq!(back, wf);
}
