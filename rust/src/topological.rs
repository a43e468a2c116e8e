//! Topological ordering with Kahn's algorithm.
//!
//! Ties are broken strictly by arrival order into the FIFO ready queue, so the
//! output is deterministic for a given edge insertion order. A cyclic graph is
//! not an error here: the sort returns the nodes it could order together with
//! a `CycleReport` naming the rest.

use pyo3::prelude::*;
use std::collections::VecDeque;
use thiserror::Error;

use crate::config::ScheduleConfig;
use crate::graph::{Graph, NodeId};
use crate::{log_changes, log_checks, log_debug};

/// Nodes that could not be ordered because they sit on or behind a cycle.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    #[pyo3(get)]
    pub unsorted: Vec<NodeId>,
    #[pyo3(get)]
    pub node_count: usize,
}

#[pymethods]
impl CycleReport {
    fn __repr__(&self) -> String {
        format!(
            "CycleReport(unsorted={}, node_count={})",
            self.unsorted.len(),
            self.node_count
        )
    }
}

/// Errors from topological ordering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    #[error("Sort could not be verified: edge {from} -> {to} is out of order")]
    Verification { from: NodeId, to: NodeId },
    #[error(
        "Cycle detected: {} of {} nodes could not be sorted",
        .0.unsorted.len(),
        .0.node_count
    )]
    CycleDetected(CycleReport),
}

/// Per-run prerequisite counts and follower lists, derived from the edges.
///
/// Rebuilt for every run so a reused graph never sees counts left over from a
/// previous sort.
#[derive(Clone, Debug)]
pub struct Prerequisites {
    counts: Vec<usize>,
    followers: Vec<Vec<NodeId>>,
}

impl Prerequisites {
    pub fn build(graph: &Graph) -> Self {
        let n = graph.node_count();
        let mut counts = vec![0; n];
        let mut followers = vec![Vec::new(); n];

        for edge in graph.edges() {
            counts[edge.to as usize] += 1;
            followers[edge.from as usize].push(edge.to);
        }

        Self { counts, followers }
    }

    /// Nodes with no prerequisites, in index order.
    pub fn roots(&self) -> VecDeque<NodeId> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count == 0)
            .map(|(id, _)| id as NodeId)
            .collect()
    }

    /// Mark `node` as done, pushing every follower whose last prerequisite
    /// this was onto `ready`.
    pub fn release(&mut self, node: NodeId, ready: &mut VecDeque<NodeId>) {
        for &follower in &self.followers[node as usize] {
            let count = &mut self.counts[follower as usize];
            *count -= 1;
            if *count == 0 {
                ready.push_back(follower);
            }
        }
    }
}

/// Result of a topological sort.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct TopologicalSort {
    /// Sorted nodes, in dequeue order.
    #[pyo3(get)]
    pub order: Vec<NodeId>,
    /// Sequence index per node (`None` for nodes left unsorted).
    #[pyo3(get)]
    pub sequence: Vec<Option<u32>>,
    #[pyo3(get)]
    pub cycle: Option<CycleReport>,
}

impl TopologicalSort {
    pub fn is_complete(&self) -> bool {
        self.cycle.is_none()
    }

    pub fn sequence_index(&self, node: NodeId) -> Option<u32> {
        self.sequence.get(node as usize).copied().flatten()
    }

    /// The full order, or `CycleDetected` if some nodes were left unsorted.
    pub fn into_complete(self) -> Result<Vec<NodeId>, SortError> {
        match self.cycle {
            None => Ok(self.order),
            Some(report) => Err(SortError::CycleDetected(report)),
        }
    }
}

#[pymethods]
impl TopologicalSort {
    #[getter]
    fn complete(&self) -> bool {
        self.is_complete()
    }

    fn __repr__(&self) -> String {
        format!(
            "TopologicalSort(sorted={}, complete={})",
            self.order.len(),
            self.is_complete()
        )
    }
}

/// Order the graph's nodes so every edge points forward.
///
/// Returns `SortError::Verification` if the produced order breaks an edge,
/// which can only happen on a corrupted graph or an implementation defect.
pub fn topological_sort(
    graph: &Graph,
    config: &ScheduleConfig,
) -> Result<TopologicalSort, SortError> {
    let verbosity = config.verbosity;
    let n = graph.node_count();
    let mut prereqs = Prerequisites::build(graph);
    let mut ready = prereqs.roots();

    let mut order: Vec<NodeId> = Vec::with_capacity(n);
    let mut sequence: Vec<Option<u32>> = vec![None; n];

    log_debug!(verbosity, "Initial ready queue: {:?}", ready);

    while let Some(node) = ready.pop_front() {
        sequence[node as usize] = Some(order.len() as u32);
        order.push(node);
        log_checks!(
            verbosity,
            "Sorted {} ({}) at position {}",
            graph.label(node),
            node,
            order.len() - 1
        );
        prereqs.release(node, &mut ready);
    }

    verify_sort(graph, &sequence)?;

    let cycle = unsorted_report(&sequence);
    match &cycle {
        None => log_changes!(verbosity, "Sorted all {} nodes", n),
        Some(report) => log_changes!(
            verbosity,
            "Cycle detected: sorted {} of {} nodes",
            order.len(),
            report.node_count
        ),
    }

    Ok(TopologicalSort {
        order,
        sequence,
        cycle,
    })
}

/// Check every edge `u -> v` against the sequence indices.
///
/// An edge into an unsorted node is allowed (that node is part of the cycle
/// remainder). An edge into a sorted node requires its source to be sorted
/// earlier.
pub fn verify_sort(graph: &Graph, sequence: &[Option<u32>]) -> Result<(), SortError> {
    for edge in graph.edges() {
        let from = sequence.get(edge.from as usize).copied().flatten();
        let to = sequence.get(edge.to as usize).copied().flatten();
        let sound = match (from, to) {
            (_, None) => true,
            (Some(f), Some(t)) => f < t,
            (None, Some(_)) => false,
        };
        if !sound {
            return Err(SortError::Verification {
                from: edge.from,
                to: edge.to,
            });
        }
    }
    Ok(())
}

pub(crate) fn unsorted_report(sequence: &[Option<u32>]) -> Option<CycleReport> {
    let unsorted: Vec<NodeId> = sequence
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_none())
        .map(|(id, _)| id as NodeId)
        .collect();

    if unsorted.is_empty() {
        None
    } else {
        Some(CycleReport {
            unsorted,
            node_count: sequence.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn make_graph(labels: &[&str], edges: &[(NodeId, NodeId)]) -> Graph {
        let mut graph = Graph::new();
        for label in labels {
            graph.add_node(Node::task(*label, 1));
        }
        for &(from, to) in edges {
            graph.add_edge(Edge::new(from, to)).unwrap();
        }
        graph
    }

    #[test]
    fn test_chain_order() {
        let graph = make_graph(&["A", "B", "C", "D"], &[(0, 1), (1, 2), (2, 3)]);
        let sort = topological_sort(&graph, &ScheduleConfig::default()).unwrap();

        assert_eq!(sort.order, vec![0, 1, 2, 3]);
        assert!(sort.is_complete());
        assert_eq!(sort.sequence_index(3), Some(3));
    }

    #[test]
    fn test_fifo_tie_break_uses_arrival_order() {
        // C and B become ready from A in edge order (C first), not index order.
        let graph = make_graph(&["A", "B", "C", "D"], &[(0, 2), (0, 1), (1, 3), (2, 3)]);
        let sort = topological_sort(&graph, &ScheduleConfig::default()).unwrap();
        assert_eq!(sort.order, vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_insertion_order_inverse_of_dependencies() {
        // Nodes inserted after their followers still sort first.
        let graph = make_graph(&["D", "C", "B", "A"], &[(3, 2), (2, 1), (1, 0)]);
        let sort = topological_sort(&graph, &ScheduleConfig::default()).unwrap();
        assert_eq!(sort.order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_two_cycle_reports_zero_sorted() {
        let graph = make_graph(&["A", "B"], &[(0, 1), (1, 0)]);
        let sort = topological_sort(&graph, &ScheduleConfig::default()).unwrap();

        assert!(sort.order.is_empty());
        let report = sort.cycle.clone().unwrap();
        assert_eq!(report.unsorted, vec![0, 1]);
        assert_eq!(report.node_count, 2);
        assert!(matches!(
            sort.into_complete(),
            Err(SortError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_partial_sort_before_cycle() {
        // A -> B -> C -> B: A sorts, B and C are stuck.
        let graph = make_graph(&["A", "B", "C"], &[(0, 1), (1, 2), (2, 1)]);
        let sort = topological_sort(&graph, &ScheduleConfig::default()).unwrap();

        assert_eq!(sort.order, vec![0]);
        assert_eq!(sort.cycle.map(|c| c.unsorted), Some(vec![1, 2]));
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = make_graph(&["A", "B"], &[(0, 0)]);
        let sort = topological_sort(&graph, &ScheduleConfig::default()).unwrap();
        assert_eq!(sort.order, vec![1]);
        assert_eq!(sort.cycle.map(|c| c.unsorted), Some(vec![0]));
    }

    #[test]
    fn test_parallel_edges_counted_twice() {
        let graph = make_graph(&["A", "B"], &[(0, 1), (0, 1)]);
        let sort = topological_sort(&graph, &ScheduleConfig::default()).unwrap();
        assert_eq!(sort.order, vec![0, 1]);
    }

    #[test]
    fn test_verify_rejects_backward_edge() {
        let graph = make_graph(&["A", "B"], &[(0, 1)]);
        let result = verify_sort(&graph, &[Some(1), Some(0)]);
        assert_eq!(result, Err(SortError::Verification { from: 0, to: 1 }));
    }

    #[test]
    fn test_verify_rejects_unsorted_source_of_sorted_target() {
        let graph = make_graph(&["A", "B"], &[(0, 1)]);
        let result = verify_sort(&graph, &[None, Some(0)]);
        assert_eq!(result, Err(SortError::Verification { from: 0, to: 1 }));
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::new();
        let sort = topological_sort(&graph, &ScheduleConfig::default()).unwrap();
        assert!(sort.order.is_empty());
        assert!(sort.is_complete());
    }

    #[test]
    fn test_rerun_is_identical() {
        let graph = make_graph(&["A", "B", "C"], &[(0, 2), (1, 2)]);
        let first = topological_sort(&graph, &ScheduleConfig::default()).unwrap();
        let second = topological_sort(&graph, &ScheduleConfig::default()).unwrap();
        assert_eq!(first, second);
    }
}
