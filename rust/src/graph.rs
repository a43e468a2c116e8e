//! Directed graph model shared by every solver.
//!
//! The graph is static structure only: nodes in insertion order, edges that
//! reference nodes by index, and per-node outgoing edge lists. Solvers never
//! mutate it; each run keeps its scratch state in tables keyed by node or edge
//! index and hands those back as its result.

use pyo3::prelude::*;
use thiserror::Error;

use crate::labels::LabelIndex;

/// Dense, zero-based node index assigned at insertion.
pub type NodeId = u32;

/// Dense, zero-based edge index assigned at insertion.
pub type EdgeId = u32;

/// Structural errors raised while building a graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node {node} is not registered in this graph ({node_count} nodes)")]
    InvalidReference { node: NodeId, node_count: usize },
}

/// A node (task, network vertex).
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Index within the owning graph; overwritten by `Graph::add_node`.
    #[pyo3(get)]
    pub index: NodeId,
    #[pyo3(get, set)]
    pub label: String,
    /// Task duration used by the scheduler. Zero for plain network vertices.
    #[pyo3(get, set)]
    pub duration: u64,
    outgoing: Vec<EdgeId>,
}

impl Node {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            index: 0,
            label: label.into(),
            duration: 0,
            outgoing: Vec::new(),
        }
    }

    pub fn task(label: impl Into<String>, duration: u64) -> Self {
        Self {
            duration,
            ..Self::new(label)
        }
    }

    /// Outgoing edges in insertion order.
    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }
}

#[pymethods]
impl Node {
    #[new]
    #[pyo3(signature = (label, duration=0))]
    fn py_new(label: String, duration: u64) -> Self {
        Self::task(label, duration)
    }

    fn __repr__(&self) -> String {
        format!(
            "Node(index={}, label={:?}, duration={}, out={})",
            self.index,
            self.label,
            self.duration,
            self.outgoing.len()
        )
    }
}

/// A directed edge `from -> to`.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    #[pyo3(get)]
    pub from: NodeId,
    #[pyo3(get)]
    pub to: NodeId,
    /// Nonnegative relaxation cost for shortest paths.
    #[pyo3(get, set)]
    pub cost: f64,
    /// Nonnegative capacity for max flow.
    #[pyo3(get, set)]
    pub capacity: f64,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            cost: 0.0,
            capacity: 0.0,
        }
    }

    /// Edge whose cost and capacity are both `weight`.
    pub fn weighted(from: NodeId, to: NodeId, weight: f64) -> Self {
        Self {
            from,
            to,
            cost: weight,
            capacity: weight,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }
}

#[pymethods]
impl Edge {
    #[new]
    #[pyo3(signature = (from_node, to_node, cost=0.0, capacity=None))]
    fn py_new(from_node: NodeId, to_node: NodeId, cost: f64, capacity: Option<f64>) -> Self {
        Self::new(from_node, to_node)
            .with_cost(cost)
            .with_capacity(capacity.unwrap_or(cost))
    }

    fn __repr__(&self) -> String {
        format!(
            "Edge({} -> {}, cost={}, capacity={})",
            self.from, self.to, self.cost, self.capacity
        )
    }
}

/// Nodes in insertion order plus the edges between them.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    labels: LabelIndex,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its index. Any index or outgoing edges the
    /// node carried are discarded.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        node.index = id;
        node.outgoing.clear();
        self.labels.register(&node.label, id);
        self.nodes.push(node);
        id
    }

    /// Append an edge. Both endpoints must already be registered; a rejected
    /// edge leaves the graph untouched.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeId, GraphError> {
        self.check_node(edge.from)?;
        self.check_node(edge.to)?;

        let id = self.edges.len() as EdgeId;
        self.nodes[edge.from as usize].outgoing.push(id);
        self.edges.push(edge);
        Ok(id)
    }

    /// Fail with `InvalidReference` unless `node` belongs to this graph.
    pub fn check_node(&self, node: NodeId) -> Result<(), GraphError> {
        if (node as usize) < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::InvalidReference {
                node,
                node_count: self.nodes.len(),
            })
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id as usize)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Outgoing edges of `node` in insertion order. Empty for unknown nodes.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.nodes
            .get(node as usize)
            .map(|n| n.outgoing.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&id| (id, &self.edges[id as usize]))
    }

    /// Incoming edge lists for every node, in edge insertion order.
    ///
    /// Derived on demand so it never goes stale between solver runs.
    pub fn incoming_index(&self) -> Vec<Vec<EdgeId>> {
        let mut incoming = vec![Vec::new(); self.nodes.len()];
        for (id, edge) in self.edges.iter().enumerate() {
            incoming[edge.to as usize].push(id as EdgeId);
        }
        incoming
    }

    /// First node registered under `label`.
    pub fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.labels.get(label)
    }

    /// Display label of a node, or `"?"` for an unknown index.
    pub fn label(&self, node: NodeId) -> &str {
        self.node(node).map(|n| n.label.as_str()).unwrap_or("?")
    }
}
