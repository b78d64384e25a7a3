//! Testing utilities for the Vanguard workspace
//!
//! Shared document fixtures, workflow builders, and a scripted step executor.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use vanguard_domain::{DocumentType, DomainInput};
use vanguard_workflow::{
    FailurePolicy, StepExecutor, Workflow, WorkflowError, WorkflowStep, WorkflowType,
};

pub mod documents {
    //! Document texts

    /// Texas lease at 10% royalty with no environmental-protection clause
    pub const BELOW_MARKET_LEASE: &str = "OIL AND GAS LEASE\n\
        Lessor: John Doe\n\
        Lessee: Acme Energy Partners LP\n\
        Royalty: 10%\n\
        Primary term: 5 years\n\
        Bonus: $96,000 for 320 net acres in Midland County, Texas.\n\
        Lessee shall indemnify and hold Lessor harmless. Operations are subject to the Railroad Commission of Texas.";

    /// Lease at 20% royalty with environmental-protection language
    pub const MARKET_LEASE: &str = "OIL AND GAS LEASE\n\
        Lessor: Ruth Alvarez\n\
        Lessee: Permian Basin Operating LLC\n\
        Royalty: 20%\n\
        Primary term: 3 years\n\
        Bonus: $1,200 per net mineral acre on 160 net acres in Reeves County, Texas.\n\
        Lessee shall comply with all environmental protection laws and regulations.\n\
        Operations are subject to the Railroad Commission of Texas. \
        This lease shall be recorded with the county clerk.";

    /// Homeowner claim whose cause of loss is one of the policy's own exclusions
    pub const FLOOD_CLAIM: &str = "PROPERTY LOSS CLAIM\n\
        Policy Number: HO-2024-7781\n\
        Named Insured: Maria Lopez\n\
        Exclusions: flood, earthquake and war\n\
        Coverage limit: $500,000\n\
        Deductible: $2,500\n\
        Claim amount: $48,000\n\
        Date of loss: March 3, 2025\n\
        Cause of loss: Flood damage to the ground floor after the river overtopped its banks";

    /// Defense services contract above the subcontracting-plan threshold
    pub const DEFENSE_CONTRACT: &str = "Contract No. W912DY-24-C-0042\n\
        Agency: Department of the Army\n\
        Total value of $12,500,000\n\
        This is a firm-fixed-price contract.\n\
        NAICS Code: 541512\n\
        Period of performance: 36 months from award\n\
        Contractor personnel require a secret security clearance.\n\
        This contract incorporates the Federal Acquisition Regulation (FAR) by reference.";
}

/// Energy lease input, scenario text with no metadata
#[must_use]
pub fn below_market_lease() -> DomainInput {
    DomainInput::new(DocumentType::Lease, documents::BELOW_MARKET_LEASE)
}

/// Compliant-looking lease input with a Texas context
#[must_use]
pub fn market_lease() -> DomainInput {
    DomainInput::new(DocumentType::Lease, documents::MARKET_LEASE).with_context("state", "Texas")
}

/// Insurance claim input matching a policy exclusion
#[must_use]
pub fn flood_claim() -> DomainInput {
    DomainInput::new(DocumentType::Claim, documents::FLOOD_CLAIM)
}

/// Government contract input
#[must_use]
pub fn defense_contract() -> DomainInput {
    DomainInput::new(DocumentType::Contract, documents::DEFENSE_CONTRACT)
}

/// Step with the given dependencies and a generic type
#[must_use]
pub fn step(id: &str, dependencies: &[&str]) -> WorkflowStep {
    WorkflowStep::new(id, id.to_uppercase(), "task").depends_on(dependencies.iter().copied())
}

/// Chain `ids[0] -> ids[1] -> ...`
#[must_use]
pub fn chain_workflow(workflow_type: WorkflowType, ids: &[&str]) -> Workflow {
    let steps = ids
        .iter()
        .enumerate()
        .map(|(i, id)| if i == 0 { step(id, &[]) } else { step(id, &[ids[i - 1]]) });
    Workflow::new("chain", workflow_type).with_steps(steps)
}

/// `[A, B, C, D]` with B and C after A and D after B, skip-on-failure
#[must_use]
pub fn four_step_workflow(workflow_type: WorkflowType) -> Workflow {
    Workflow::new("four-step", workflow_type)
        .with_failure_policy(FailurePolicy::SkipOnFailure)
        .with_steps([step("A", &[]), step("B", &["A"]), step("C", &["A"]), step("D", &["B"])])
}

/// Step executor with scripted failures and results
///
/// Records every executed step id in call order.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    failures: HashSet<String>,
    results: HashMap<String, Value>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail whenever `step_id` runs
    #[must_use]
    pub fn failing(mut self, step_id: &str) -> Self {
        self.failures.insert(step_id.to_string());
        self
    }

    /// Return `value` when `step_id` runs
    #[must_use]
    pub fn returning(mut self, step_id: &str, value: Value) -> Self {
        self.results.insert(step_id.to_string(), value);
        self
    }

    /// Step ids executed so far
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl StepExecutor for ScriptedExecutor {
    async fn execute(&self, _workflow: &Workflow, step: &WorkflowStep) -> Result<Value, WorkflowError> {
        self.calls.lock().push(step.id.clone());
        if self.failures.contains(&step.id) {
            return Err(WorkflowError::execution(&step.id, "scripted failure"));
        }
        Ok(self
            .results
            .get(&step.id)
            .cloned()
            .unwrap_or_else(|| json!({ "step": step.id, "type": step.step_type })))
    }
}
