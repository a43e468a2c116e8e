//! Configuration types for the graph solvers.

use pyo3::prelude::*;

use crate::graph::NodeId;

/// Configuration for topological scheduling and critical path analysis.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct ScheduleConfig {
    /// Node to trace the critical path back from. Defaults to the last node
    /// in topological order.
    #[pyo3(get, set)]
    pub finish_node: Option<NodeId>,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

#[pymethods]
impl ScheduleConfig {
    #[new]
    #[pyo3(signature = (finish_node=None, verbosity=0))]
    fn new(finish_node: Option<NodeId>, verbosity: u8) -> Self {
        Self {
            finish_node,
            verbosity,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleConfig(finish_node={:?}, verbosity={})",
            self.finish_node, self.verbosity
        )
    }
}

/// Configuration for shortest path tree construction.
#[pyclass]
#[derive(Clone, Debug)]
pub struct ShortestPathConfig {
    /// Relaxation strategy: "label_setting" or "label_correcting"
    #[pyo3(get, set)]
    pub strategy: String,
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for ShortestPathConfig {
    fn default() -> Self {
        Self {
            strategy: "label_setting".to_string(),
            verbosity: 0,
        }
    }
}

impl ShortestPathConfig {
    pub fn with_strategy(strategy: &str) -> Self {
        Self {
            strategy: strategy.to_string(),
            ..Self::default()
        }
    }
}

#[pymethods]
impl ShortestPathConfig {
    #[new]
    #[pyo3(signature = (strategy=None, verbosity=None))]
    fn py_new(strategy: Option<String>, verbosity: Option<u8>) -> Self {
        let defaults = Self::default();
        Self {
            strategy: strategy.unwrap_or(defaults.strategy),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ShortestPathConfig(strategy={:?}, verbosity={})",
            self.strategy, self.verbosity
        )
    }
}

/// Configuration for maximum flow computation.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct MaxFlowConfig {
    #[pyo3(get, set)]
    pub verbosity: u8,
}

#[pymethods]
impl MaxFlowConfig {
    #[new]
    #[pyo3(signature = (verbosity=0))]
    fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    fn __repr__(&self) -> String {
        format!("MaxFlowConfig(verbosity={})", self.verbosity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let schedule = ScheduleConfig::default();
        assert_eq!(schedule.finish_node, None);
        assert_eq!(schedule.verbosity, 0);

        let path = ShortestPathConfig::default();
        assert_eq!(path.strategy, "label_setting");

        assert_eq!(MaxFlowConfig::default().verbosity, 0);
    }

    #[test]
    fn test_with_strategy() {
        let config = ShortestPathConfig::with_strategy("label_correcting");
        assert_eq!(config.strategy, "label_correcting");
        assert_eq!(config.verbosity, 0);
    }
}
