//! Step dependency graph
//!
//! Nodes are step indices into the workflow's step array; an edge `a -> b`
//! means step `a` must complete before step `b` may start.

use crate::error::WorkflowError;
use crate::types::WorkflowStep;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Validated, acyclic step graph
#[derive(Debug, Clone)]
pub struct StepGraph {
    inner: DiGraphMap<usize, ()>,
    ids: Vec<String>,
}

impl StepGraph {
    /// Build and validate the graph for `steps`
    ///
    /// # Errors
    /// `DuplicateStep`, `SelfDependency`, `UnknownDependency`, or
    /// `DependencyCycle` listing every step that sits on a cycle.
    pub fn build(steps: &[WorkflowStep]) -> Result<Self, WorkflowError> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            if index.insert(step.id.as_str(), i).is_some() {
                return Err(WorkflowError::DuplicateStep(step.id.clone()));
            }
        }

        let mut inner = DiGraphMap::with_capacity(steps.len(), steps.len());
        for i in 0..steps.len() {
            inner.add_node(i);
        }
        for (i, step) in steps.iter().enumerate() {
            for dependency in &step.dependencies {
                if dependency == &step.id {
                    return Err(WorkflowError::SelfDependency(step.id.clone()));
                }
                let &from = index
                    .get(dependency.as_str())
                    .ok_or_else(|| WorkflowError::UnknownDependency {
                        step: step.id.clone(),
                        dependency: dependency.clone(),
                    })?;
                inner.add_edge(from, i, ());
            }
        }

        if is_cyclic_directed(&inner) {
            let mut on_cycle: Vec<usize> = tarjan_scc(&inner)
                .into_iter()
                .filter(|component| component.len() > 1)
                .flatten()
                .collect();
            on_cycle.sort_unstable();
            return Err(WorkflowError::DependencyCycle {
                steps: on_cycle.into_iter().map(|i| steps[i].id.clone()).collect(),
            });
        }

        Ok(Self {
            inner,
            ids: steps.iter().map(|step| step.id.clone()).collect(),
        })
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Graph has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Step id for an index
    #[must_use]
    pub fn id(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    /// Topological order, ties broken by lowest step index
    #[must_use]
    pub fn topological_order(&self) -> Vec<usize> {
        let mut in_degree: Vec<usize> = (0..self.len())
            .map(|i| self.inner.neighbors_directed(i, Direction::Incoming).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for next in self.inner.neighbors_directed(node, Direction::Outgoing) {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        order
    }

    /// Topological order as step ids
    #[must_use]
    pub fn topological_ids(&self) -> Vec<&str> {
        self.topological_order()
            .into_iter()
            .map(|i| self.ids[i].as_str())
            .collect()
    }

    /// Direct dependencies of a step, ascending
    #[must_use]
    pub fn dependencies(&self, index: usize) -> Vec<usize> {
        self.neighbors(index, Direction::Incoming)
    }

    /// Direct dependants of a step, ascending
    #[must_use]
    pub fn dependants(&self, index: usize) -> Vec<usize> {
        self.neighbors(index, Direction::Outgoing)
    }

    /// Every step reachable upstream of `index`, ascending
    #[must_use]
    pub fn upstream(&self, index: usize) -> Vec<usize> {
        self.reachable(index, Direction::Incoming)
    }

    /// Every step reachable downstream of `index`, ascending
    #[must_use]
    pub fn downstream(&self, index: usize) -> Vec<usize> {
        self.reachable(index, Direction::Outgoing)
    }

    /// Steps without dependencies
    #[must_use]
    pub fn entry_steps(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|i| self.inner.neighbors_directed(*i, Direction::Incoming).next().is_none())
            .collect()
    }

    fn neighbors(&self, index: usize, direction: Direction) -> Vec<usize> {
        if !self.inner.contains_node(index) {
            return Vec::new();
        }
        let mut found: Vec<usize> = self.inner.neighbors_directed(index, direction).collect();
        found.sort_unstable();
        found
    }

    fn reachable(&self, index: usize, direction: Direction) -> Vec<usize> {
        let mut seen = vec![false; self.len()];
        let mut stack = self.neighbors(index, direction);
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut seen[node], true) {
                continue;
            }
            stack.extend(self.inner.neighbors_directed(node, direction));
        }
        seen.iter()
            .enumerate()
            .filter_map(|(i, &hit)| hit.then_some(i))
            .collect()
    }
}
