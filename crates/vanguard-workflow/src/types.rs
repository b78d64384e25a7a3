//! Workflow data model

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use ulid::Ulid;

/// Workflow variables consulted by step conditions
pub type Variables = IndexMap<String, Value>;

/// Workflow identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(pub Ulid);

impl WorkflowId {
    /// Fresh id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scheduling discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowType {
    /// One step at a time, array order
    #[default]
    Sequential,
    /// Every eligible step at once
    Parallel,
    /// Eligible steps whose condition holds
    Conditional,
}

/// Step status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Waiting for dependencies or the scheduler
    Pending,
    /// Started
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
    /// Will never run
    Skipped,
}

impl StepStatus {
    /// No further transitions
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    /// Lowercase wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow status, derived from step statuses while active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    /// Not started
    Draft,
    /// Running
    Active,
    /// No new steps start; in-flight completions are still accepted
    Paused,
    /// Every step completed or skipped
    Completed,
    /// A step failed and nothing else can complete
    Failed,
    /// Stopped by an operator
    Cancelled,
}

impl WorkflowStatus {
    /// No further transitions
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Lowercase wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to dependants of a failed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Dependants are skipped
    #[default]
    SkipOnFailure,
    /// Dependants stay pending
    Halt,
}

/// Comparison used by a step condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOperator {
    /// Variable equals value
    Equals,
    /// Variable differs from value (or is absent)
    NotEquals,
    /// Variable is present and not null
    Exists,
    /// Numeric variable greater than value
    GreaterThan,
    /// Numeric variable less than value
    LessThan,
    /// Variable is truthy: true, non-zero, non-empty
    Truthy,
}

/// Predicate over workflow variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCondition {
    /// Variable name
    pub variable: String,
    /// Comparison
    pub operator: ConditionOperator,
    /// Right-hand side, unused by `exists` and `truthy`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl StepCondition {
    /// Build a condition
    #[must_use]
    pub fn new(variable: impl Into<String>, operator: ConditionOperator, value: Option<Value>) -> Self {
        Self {
            variable: variable.into(),
            operator,
            value,
        }
    }

    /// Evaluate against workflow variables
    #[must_use]
    pub fn evaluate(&self, variables: &Variables) -> bool {
        let actual = variables.get(&self.variable).filter(|v| !v.is_null());
        match self.operator {
            ConditionOperator::Exists => actual.is_some(),
            ConditionOperator::Truthy => actual.is_some_and(is_truthy),
            ConditionOperator::Equals => actual.is_some() && actual == self.value.as_ref(),
            ConditionOperator::NotEquals => actual != self.value.as_ref(),
            ConditionOperator::GreaterThan => compare(actual, self.value.as_ref()).is_some_and(|(a, b)| a > b),
            ConditionOperator::LessThan => compare(actual, self.value.as_ref()).is_some_and(|(a, b)| a < b),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn compare(actual: Option<&Value>, expected: Option<&Value>) -> Option<(f64, f64)> {
    Some((actual?.as_f64()?, expected?.as_f64()?))
}

/// One step in a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    /// Unique id within the workflow
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form step kind, interpreted by the executor
    #[serde(rename = "type")]
    pub step_type: String,
    /// Ids that must complete first
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Current status
    #[serde(default = "pending")]
    pub status: StepStatus,
    /// Gate for conditional workflows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<StepCondition>,
    /// Executor configuration
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub config: Variables,
    /// Executor output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the step started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the step reached a terminal status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

fn pending() -> StepStatus {
    StepStatus::Pending
}

impl WorkflowStep {
    /// Pending step without dependencies
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, step_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            step_type: step_type.into(),
            dependencies: Vec::new(),
            status: StepStatus::Pending,
            condition: None,
            config: Variables::new(),
            result: None,
            error: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Add dependencies
    #[must_use]
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Gate the step on a condition
    #[must_use]
    pub fn when(mut self, condition: StepCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Add executor configuration
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Back to pending with execution data cleared
    pub(crate) fn reset(&mut self) {
        self.status = StepStatus::Pending;
        self.result = None;
        self.error = None;
        self.started_at = None;
        self.completed_at = None;
    }
}

/// A named, dependency-ordered set of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Identifier
    pub id: WorkflowId,
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Scheduling discipline
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,
    /// Derived status
    pub status: WorkflowStatus,
    /// Steps in array order
    pub steps: Vec<WorkflowStep>,
    /// Condition inputs
    #[serde(default)]
    pub variables: Variables,
    /// Dependant handling on failure
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Completed starts (one per full run)
    #[serde(default)]
    pub execution_count: u32,
    /// Most recently started step, for observability only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Empty draft workflow
    #[must_use]
    pub fn new(name: impl Into<String>, workflow_type: WorkflowType) -> Self {
        let now = Utc::now();
        Self {
            id: WorkflowId::new(),
            name: name.into(),
            description: None,
            workflow_type,
            status: WorkflowStatus::Draft,
            steps: Vec::new(),
            variables: Variables::new(),
            failure_policy: FailurePolicy::default(),
            execution_count: 0,
            current_step: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a step
    #[must_use]
    pub fn with_step(mut self, step: WorkflowStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several steps
    #[must_use]
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = WorkflowStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Set a variable
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Set the failure policy
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Step by id
    #[must_use]
    pub fn step(&self, id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|step| step.id == id)
    }

    /// Index of a step by id
    #[must_use]
    pub fn step_index(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    /// Status of a step by id
    #[must_use]
    pub fn step_status(&self, id: &str) -> Option<StepStatus> {
        self.step(id).map(|step| step.status)
    }

    /// Ids of steps currently in `status`
    #[must_use]
    pub fn steps_with_status(&self, status: StepStatus) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|step| step.status == status)
            .map(|step| step.id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, Value)]) -> Variables {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn condition_operators() {
        let variables = vars(&[("amount", json!(25_000)), ("region", json!("west")), ("flag", json!(false))]);
        let check = |op, var: &str, value: Option<Value>| StepCondition::new(var, op, value).evaluate(&variables);

        assert!(check(ConditionOperator::GreaterThan, "amount", Some(json!(10_000))));
        assert!(!check(ConditionOperator::LessThan, "amount", Some(json!(10_000))));
        assert!(check(ConditionOperator::Equals, "region", Some(json!("west"))));
        assert!(check(ConditionOperator::NotEquals, "region", Some(json!("east"))));
        assert!(check(ConditionOperator::Exists, "flag", None));
        assert!(!check(ConditionOperator::Truthy, "flag", None));
        assert!(!check(ConditionOperator::Exists, "missing", None));
        assert!(check(ConditionOperator::NotEquals, "missing", Some(json!(1))));
        assert!(!check(ConditionOperator::GreaterThan, "region", Some(json!(1))));
    }

    #[test]
    fn step_round_trips_with_wire_names() {
        let step = WorkflowStep::new("extract", "Extract", "extraction").depends_on(["load"]);
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["type"], json!("extraction"));
        assert_eq!(value["status"], json!("pending"));
        let back: WorkflowStep = serde_json::from_value(value).unwrap();
        assert_eq!(back, step);
    }

    #[test]
    fn status_terminality() {
        assert!(StepStatus::Skipped.is_terminal());
        assert!(!StepStatus::Running.is_terminal());
        assert!(WorkflowStatus::Cancelled.is_terminal());
        assert!(!WorkflowStatus::Paused.is_terminal());
    }

    #[test]
    fn failure_policy_is_kebab_case() {
        assert_eq!(serde_json::to_value(FailurePolicy::SkipOnFailure).unwrap(), json!("skip-on-failure"));
        let halt: FailurePolicy = serde_json::from_value(json!("halt")).unwrap();
        assert_eq!(halt, FailurePolicy::Halt);
    }
}
