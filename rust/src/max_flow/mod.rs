//! Maximum flow by repeated augmenting paths over residual capacity.
//!
//! Each round runs a breadth-first search from the source that may follow an
//! edge forward (while `flow < capacity`) or backward from its head (while
//! `flow > 0`, cancelling committed flow). When the sink is reached the path's
//! bottleneck is pushed along it. Rounds repeat until the sink is unreachable.
//!
//! Every edge keeps `0 <= flow <= capacity` after every round. Capacities must
//! be finite and nonnegative.

mod augment;

use pyo3::prelude::*;

use crate::config::MaxFlowConfig;
use crate::graph::{EdgeId, Graph, GraphError, NodeId};
use crate::{log_changes, log_checks};

/// Flow assignment produced by `max_flow`, indexed by edge.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct FlowResult {
    #[pyo3(get)]
    pub source: Option<NodeId>,
    #[pyo3(get)]
    pub sink: Option<NodeId>,
    #[pyo3(get)]
    pub flows: Vec<f64>,
    /// Net flow leaving the source.
    #[pyo3(get)]
    pub total: f64,
    #[pyo3(get)]
    pub augmentations: u64,
    /// Nodes still reachable from the source over residual capacity once no
    /// augmenting path remains.
    #[pyo3(get)]
    pub source_side: Vec<bool>,
}

impl FlowResult {
    fn empty(graph: &Graph, source: Option<NodeId>, sink: Option<NodeId>) -> Self {
        Self {
            source,
            sink,
            flows: vec![0.0; graph.edge_count()],
            total: 0.0,
            augmentations: 0,
            source_side: vec![false; graph.node_count()],
        }
    }

    pub fn flow(&self, edge: EdgeId) -> f64 {
        self.flows.get(edge as usize).copied().unwrap_or(0.0)
    }

    /// Inbound minus outbound flow at `node`.
    pub fn net_inflow(&self, graph: &Graph, node: NodeId) -> f64 {
        graph
            .edges()
            .iter()
            .zip(&self.flows)
            .map(|(edge, &flow)| {
                let mut net = 0.0;
                if edge.to == node {
                    net += flow;
                }
                if edge.from == node {
                    net -= flow;
                }
                net
            })
            .sum()
    }

    /// Edges leaving the source side of the final residual search.
    ///
    /// These are saturated, and their capacities add up to `total`.
    pub fn min_cut(&self, graph: &Graph) -> Vec<EdgeId> {
        graph
            .edges()
            .iter()
            .enumerate()
            .filter(|(_, edge)| {
                self.source_side[edge.from as usize] && !self.source_side[edge.to as usize]
            })
            .map(|(id, _)| id as EdgeId)
            .collect()
    }
}

#[pymethods]
impl FlowResult {
    fn __repr__(&self) -> String {
        format!(
            "FlowResult(source={:?}, sink={:?}, total={}, augmentations={})",
            self.source, self.sink, self.total, self.augmentations
        )
    }
}

/// Nodes reachable from `source` over residual capacity under `flows`.
pub fn residual_reachable(
    graph: &Graph,
    flows: &[f64],
    source: NodeId,
) -> Result<Vec<bool>, GraphError> {
    graph.check_node(source)?;
    let incoming = graph.incoming_index();
    Ok(augment::explore(graph, &incoming, flows, source, None).visited)
}

/// Compute a maximum flow from `source` to `sink`.
///
/// A missing source or sink, or `source == sink`, yields a zero flow without
/// error. Out-of-range indices fail with `GraphError::InvalidReference`.
pub fn max_flow(
    graph: &Graph,
    source: Option<NodeId>,
    sink: Option<NodeId>,
    config: &MaxFlowConfig,
) -> Result<FlowResult, GraphError> {
    let verbosity = config.verbosity;
    if let Some(node) = source {
        graph.check_node(node)?;
    }
    if let Some(node) = sink {
        graph.check_node(node)?;
    }

    let (source, sink) = match (source, sink) {
        (Some(source), Some(sink)) if source != sink => (source, sink),
        _ => {
            log_changes!(verbosity, "No flow: source={:?} sink={:?}", source, sink);
            return Ok(FlowResult::empty(graph, source, sink));
        }
    };

    let incoming = graph.incoming_index();
    let mut flows = vec![0.0; graph.edge_count()];
    let mut augmentations = 0u64;

    let source_side = loop {
        let exploration = augment::explore(graph, &incoming, &flows, source, Some(sink));
        if !exploration.visited[sink as usize] {
            break exploration.visited;
        }

        let steps = augment::trace_back(&exploration, source, sink);
        let amount = augment::bottleneck(graph, &flows, &steps);
        if !(amount > 0.0 && amount.is_finite()) {
            // Only reachable with non-finite capacities.
            break exploration.visited;
        }

        augment::apply(graph, &mut flows, &steps, amount);
        augmentations += 1;
        log_checks!(
            verbosity,
            "Augmenting path #{} ({} edges): +{}",
            augmentations,
            steps.len(),
            amount
        );
    };

    let result = FlowResult {
        source: Some(source),
        sink: Some(sink),
        flows,
        total: 0.0,
        augmentations,
        source_side,
    };
    let total = -result.net_inflow(graph, source);
    log_changes!(
        verbosity,
        "Total flow: {} after {} augmentations",
        total,
        augmentations
    );

    Ok(FlowResult { total, ..result })
}
