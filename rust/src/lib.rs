//! Directed graph algorithms: topological scheduling with critical paths,
//! shortest path trees, and maximum flow.
//!
//! A caller builds a `Graph` (directly or through `loader`), runs one solver,
//! and reads the per-node / per-edge tables in the returned result. Solvers
//! never mutate the graph, so a graph can be solved any number of times.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

mod config;
pub mod critical_path;
pub mod graph;
mod labels;
pub mod loader;
pub mod logging;
pub mod max_flow;
pub mod shortest_path;
pub mod topological;

pub use config::{MaxFlowConfig, ScheduleConfig, ShortestPathConfig};
pub use critical_path::{gantt_rows, schedule, GanttRow, NodeTiming, Schedule, ScheduleError};
pub use graph::{Edge, EdgeId, Graph, GraphError, Node, NodeId};
pub use loader::{load_network, load_task_list, parse_network, parse_task_list, LoadError};
pub use max_flow::{max_flow, residual_reachable, FlowResult};
pub use shortest_path::{
    find_path, shortest_paths, Path, PathError, RelaxationStats, ShortestPathTree, Strategy,
};
pub use topological::{topological_sort, verify_sort, CycleReport, SortError, TopologicalSort};

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Graph handle exposed to Python.
#[pyclass(name = "Graph")]
#[derive(Clone, Debug, Default)]
pub struct PyGraph {
    inner: Graph,
}

impl From<Graph> for PyGraph {
    fn from(inner: Graph) -> Self {
        Self { inner }
    }
}

#[pymethods]
impl PyGraph {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its index.
    fn add_node(&mut self, node: Node) -> NodeId {
        self.inner.add_node(node)
    }

    /// Add an edge and return its index.
    ///
    /// Raises ValueError if either endpoint is not in the graph.
    fn add_edge(&mut self, edge: Edge) -> PyResult<EdgeId> {
        self.inner.add_edge(edge).map_err(value_error)
    }

    #[getter]
    fn nodes(&self) -> Vec<Node> {
        self.inner.nodes().to_vec()
    }

    #[getter]
    fn edges(&self) -> Vec<Edge> {
        self.inner.edges().to_vec()
    }

    fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.inner.node_by_label(label)
    }

    fn __len__(&self) -> usize {
        self.inner.node_count()
    }

    fn __repr__(&self) -> String {
        format!(
            "Graph(nodes={}, edges={})",
            self.inner.node_count(),
            self.inner.edge_count()
        )
    }
}

/// Order nodes with Kahn's algorithm.
///
/// A cyclic graph returns a partial order with `cycle` set.
///
/// # Raises
/// * ValueError if the produced order fails verification
#[pyfunction]
#[pyo3(name = "topological_sort", signature = (graph, config=None))]
fn py_topological_sort(
    graph: PyRef<'_, PyGraph>,
    config: Option<ScheduleConfig>,
) -> PyResult<TopologicalSort> {
    topological_sort(&graph.inner, &config.unwrap_or_default()).map_err(value_error)
}

/// Compute PERT waves, earliest start/finish times and the critical path.
///
/// # Raises
/// * ValueError if the finish node is unknown or the order fails verification
#[pyfunction]
#[pyo3(name = "schedule", signature = (graph, config=None))]
fn py_schedule(graph: PyRef<'_, PyGraph>, config: Option<ScheduleConfig>) -> PyResult<Schedule> {
    schedule(&graph.inner, &config.unwrap_or_default()).map_err(value_error)
}

/// Project a schedule onto calendar dates starting at `project_start`.
#[pyfunction]
#[pyo3(name = "gantt_rows")]
fn py_gantt_rows(
    graph: PyRef<'_, PyGraph>,
    schedule: PyRef<'_, Schedule>,
    project_start: NaiveDate,
) -> Vec<GanttRow> {
    gantt_rows(&graph.inner, &schedule, project_start)
}

/// Build the shortest path tree rooted at `source`.
///
/// # Raises
/// * ValueError for an unknown strategy or source
#[pyfunction]
#[pyo3(name = "shortest_paths", signature = (graph, source, config=None))]
fn py_shortest_paths(
    graph: PyRef<'_, PyGraph>,
    source: NodeId,
    config: Option<ShortestPathConfig>,
) -> PyResult<ShortestPathTree> {
    shortest_paths(&graph.inner, source, &config.unwrap_or_default()).map_err(value_error)
}

/// Shortest path from `source` to `target`.
///
/// # Raises
/// * ValueError if the target is unreachable
#[pyfunction]
#[pyo3(name = "find_path", signature = (graph, source, target, config=None))]
fn py_find_path(
    graph: PyRef<'_, PyGraph>,
    source: NodeId,
    target: NodeId,
    config: Option<ShortestPathConfig>,
) -> PyResult<Path> {
    find_path(&graph.inner, source, target, &config.unwrap_or_default()).map_err(value_error)
}

/// Maximum flow from `source` to `sink`. Either may be None (zero flow).
#[pyfunction]
#[pyo3(name = "max_flow", signature = (graph, source=None, sink=None, config=None))]
fn py_max_flow(
    graph: PyRef<'_, PyGraph>,
    source: Option<NodeId>,
    sink: Option<NodeId>,
    config: Option<MaxFlowConfig>,
) -> PyResult<FlowResult> {
    max_flow(&graph.inner, source, sink, &config.unwrap_or_default()).map_err(value_error)
}

#[pyfunction]
#[pyo3(name = "load_task_list")]
fn py_load_task_list(path: std::path::PathBuf) -> PyResult<PyGraph> {
    load_task_list(path).map(PyGraph::from).map_err(value_error)
}

#[pyfunction]
#[pyo3(name = "load_network")]
fn py_load_network(path: std::path::PathBuf) -> PyResult<PyGraph> {
    load_network(path).map(PyGraph::from).map_err(value_error)
}

/// The netsolve.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Graph model
    m.add_class::<PyGraph>()?;
    m.add_class::<Node>()?;
    m.add_class::<Edge>()?;

    // Config types
    m.add_class::<ScheduleConfig>()?;
    m.add_class::<ShortestPathConfig>()?;
    m.add_class::<MaxFlowConfig>()?;

    // Result types
    m.add_class::<TopologicalSort>()?;
    m.add_class::<CycleReport>()?;
    m.add_class::<Schedule>()?;
    m.add_class::<NodeTiming>()?;
    m.add_class::<GanttRow>()?;
    m.add_class::<ShortestPathTree>()?;
    m.add_class::<RelaxationStats>()?;
    m.add_class::<Path>()?;
    m.add_class::<FlowResult>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_topological_sort, m)?)?;
    m.add_function(wrap_pyfunction!(py_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(py_gantt_rows, m)?)?;
    m.add_function(wrap_pyfunction!(py_shortest_paths, m)?)?;
    m.add_function(wrap_pyfunction!(py_find_path, m)?)?;
    m.add_function(wrap_pyfunction!(py_max_flow, m)?)?;
    m.add_function(wrap_pyfunction!(py_load_task_list, m)?)?;
    m.add_function(wrap_pyfunction!(py_load_network, m)?)?;

    Ok(())
}
