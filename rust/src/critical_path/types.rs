//! Result types for critical path scheduling.

use pyo3::prelude::*;

use crate::graph::NodeId;
use crate::topological::CycleReport;

/// Day offset as a signed value, saturating at `i64::MAX`.
pub(crate) fn to_signed(days: u64) -> i64 {
    i64::try_from(days).unwrap_or(i64::MAX)
}

/// Per-node timing from the forward and backward passes.
#[pyclass]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeTiming {
    /// Latest earliest-finish over all prerequisites (0 if none).
    #[pyo3(get)]
    pub earliest_start: u64,
    /// `earliest_start + duration`.
    #[pyo3(get)]
    pub earliest_finish: u64,
    /// Latest start that does not delay the finish task.
    #[pyo3(get)]
    pub latest_start: i64,
    /// Latest finish that does not delay the finish task.
    #[pyo3(get)]
    pub latest_finish: i64,
}

impl NodeTiming {
    /// Slack = latest_start - earliest_start. Negative for tasks that finish
    /// after an explicitly chosen finish task.
    pub fn slack(&self) -> i64 {
        self.latest_start
            .saturating_sub(to_signed(self.earliest_start))
    }
}

#[pymethods]
impl NodeTiming {
    #[getter(slack)]
    fn py_slack(&self) -> i64 {
        self.slack()
    }

    fn __repr__(&self) -> String {
        format!(
            "NodeTiming(es={}, ef={}, ls={}, lf={})",
            self.earliest_start, self.earliest_finish, self.latest_start, self.latest_finish
        )
    }
}

/// Output of `schedule`: ordering, PERT waves, timings and criticality.
///
/// All tables are indexed by node index.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    /// Nodes in topological (dequeue) order.
    #[pyo3(get)]
    pub order: Vec<NodeId>,
    /// Sequence index per node; `None` for nodes stuck behind a cycle.
    #[pyo3(get)]
    pub sequence: Vec<Option<u32>>,
    /// Batches of nodes that became ready together (PERT chart columns).
    #[pyo3(get)]
    pub waves: Vec<Vec<NodeId>>,
    #[pyo3(get)]
    pub timings: Vec<Option<NodeTiming>>,
    #[pyo3(get)]
    pub critical: Vec<bool>,
    /// Node the critical path was traced back from.
    #[pyo3(get)]
    pub finish: Option<NodeId>,
    #[pyo3(get)]
    pub cycle: Option<CycleReport>,
}

impl Schedule {
    pub fn timing(&self, node: NodeId) -> Option<NodeTiming> {
        self.timings.get(node as usize).copied().flatten()
    }

    pub fn is_critical(&self, node: NodeId) -> bool {
        self.critical.get(node as usize).copied().unwrap_or(false)
    }

    /// Critical nodes in topological order.
    pub fn critical_nodes(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .copied()
            .filter(|&node| self.is_critical(node))
            .collect()
    }

    /// Earliest finish of the finish task: the minimum project length.
    pub fn makespan(&self) -> u64 {
        self.finish
            .and_then(|node| self.timing(node))
            .map(|t| t.earliest_finish)
            .unwrap_or(0)
    }
}

#[pymethods]
impl Schedule {
    #[getter(makespan)]
    fn py_makespan(&self) -> u64 {
        self.makespan()
    }

    #[getter(critical_nodes)]
    fn py_critical_nodes(&self) -> Vec<NodeId> {
        self.critical_nodes()
    }

    fn __repr__(&self) -> String {
        format!(
            "Schedule(sorted={}, waves={}, makespan={}, critical={})",
            self.order.len(),
            self.waves.len(),
            self.makespan(),
            self.critical.iter().filter(|&&c| c).count()
        )
    }
}
