//! Shortest path tree state and path reconstruction.

use pyo3::prelude::*;

use crate::graph::{EdgeId, Graph, NodeId};

use super::PathError;

/// Work counters for one tree construction.
#[pyclass]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelaxationStats {
    /// Candidate cost comparisons made while selecting the next node
    /// (label-setting only).
    #[pyo3(get)]
    pub checks: u64,
    /// Nodes removed from the candidate list or queue.
    #[pyo3(get)]
    pub pops: u64,
    /// Strict cost improvements applied.
    #[pyo3(get)]
    pub relaxations: u64,
}

#[pymethods]
impl RelaxationStats {
    fn __repr__(&self) -> String {
        format!(
            "RelaxationStats(checks={}, pops={}, relaxations={})",
            self.checks, self.pops, self.relaxations
        )
    }
}

/// Per-run labels of a shortest path tree, indexed by node.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct ShortestPathTree {
    #[pyo3(get)]
    pub source: NodeId,
    /// Tentative cost per node; `f64::INFINITY` when unreachable.
    #[pyo3(get)]
    pub costs: Vec<f64>,
    /// Edge that achieved each node's best cost. `None` for the source and for
    /// unreachable nodes.
    #[pyo3(get)]
    pub back_edges: Vec<Option<EdgeId>>,
    #[pyo3(get)]
    pub stats: RelaxationStats,
}

impl ShortestPathTree {
    /// Fresh labels: every cost infinite except the source at zero.
    pub(super) fn rooted_at(source: NodeId, node_count: usize) -> Self {
        let mut costs = vec![f64::INFINITY; node_count];
        costs[source as usize] = 0.0;
        Self {
            source,
            costs,
            back_edges: vec![None; node_count],
            stats: RelaxationStats::default(),
        }
    }

    /// Lower `node`'s cost if `cost` is strictly better. Returns whether it was.
    #[inline]
    pub(super) fn relax(&mut self, node: NodeId, cost: f64, via: EdgeId) -> bool {
        let idx = node as usize;
        if cost < self.costs[idx] {
            self.costs[idx] = cost;
            self.back_edges[idx] = Some(via);
            self.stats.relaxations += 1;
            true
        } else {
            false
        }
    }

    #[inline]
    pub(super) fn cost_of(&self, node: NodeId) -> f64 {
        self.costs[node as usize]
    }

    /// Finite cost of `node`, or `None` if unreachable.
    pub fn cost(&self, node: NodeId) -> Option<f64> {
        self.costs
            .get(node as usize)
            .copied()
            .filter(|c| c.is_finite())
    }

    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.cost(node).is_some()
    }

    /// Every back-pointer edge: the edges that make up the tree.
    pub fn tree_edges(&self) -> Vec<EdgeId> {
        self.back_edges.iter().filter_map(|e| *e).collect()
    }

    /// Follow back-pointers from `target` to the source.
    pub fn path_to(&self, graph: &Graph, target: NodeId) -> Result<Path, PathError> {
        graph.check_node(target)?;
        let unreachable = PathError::Unreachable {
            start: self.source,
            target,
        };
        let cost = self.cost(target).ok_or_else(|| unreachable.clone())?;

        let mut nodes = vec![target];
        let mut edges = Vec::new();
        let mut node = target;
        while node != self.source {
            // A chain longer than the node count cannot end at the source.
            if edges.len() >= graph.node_count() {
                return Err(unreachable);
            }
            let edge_id = self
                .back_edges
                .get(node as usize)
                .copied()
                .flatten()
                .ok_or_else(|| unreachable.clone())?;
            let edge = graph.edge(edge_id).ok_or_else(|| unreachable.clone())?;
            edges.push(edge_id);
            node = edge.from;
            nodes.push(node);
        }

        nodes.reverse();
        edges.reverse();
        Ok(Path { nodes, edges, cost })
    }
}

#[pymethods]
impl ShortestPathTree {
    #[getter(tree_edges)]
    fn py_tree_edges(&self) -> Vec<EdgeId> {
        self.tree_edges()
    }

    fn __repr__(&self) -> String {
        format!(
            "ShortestPathTree(source={}, reachable={})",
            self.source,
            self.costs.iter().filter(|c| c.is_finite()).count()
        )
    }
}

/// A reconstructed source-to-target path.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// Nodes from source to target inclusive.
    #[pyo3(get)]
    pub nodes: Vec<NodeId>,
    /// Edges along the path, in travel order.
    #[pyo3(get)]
    pub edges: Vec<EdgeId>,
    #[pyo3(get)]
    pub cost: f64,
}

#[pymethods]
impl Path {
    fn __repr__(&self) -> String {
        format!("Path(nodes={:?}, cost={})", self.nodes, self.cost)
    }
}
