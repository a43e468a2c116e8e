//! Shortest path trees from a single source.
//!
//! Two interchangeable relaxation strategies build the same tree shape:
//! - `label_setting`: repeatedly finalize the cheapest candidate, found by a
//!   linear scan of the candidate list (O(V²) selection, fine for the graph
//!   sizes this crate targets). Never revisits a finalized node.
//! - `label_correcting`: FIFO relaxation. Any node whose cost improves is
//!   queued again, even if it was already processed.
//!
//! Both require nonnegative edge costs. With a negative cycle reachable from
//! the source, label-correcting never terminates; such input is unsupported.
//! Improvements use strict `<`, so among equal-cost routes the first one found
//! keeps the back-pointer. The two strategies agree on every cost, but may pick
//! different back-pointers when several shortest routes exist.

mod label_correcting;
mod label_setting;
mod tree;

use std::str::FromStr;
use thiserror::Error;

use crate::config::ShortestPathConfig;
use crate::graph::{Graph, GraphError, NodeId};
use crate::log_changes;

pub use tree::{Path, RelaxationStats, ShortestPathTree};

/// Errors from shortest path computation and path reconstruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Node {target} is unreachable from node {start}")]
    Unreachable { start: NodeId, target: NodeId },
    #[error("Unknown shortest path strategy: {0}")]
    UnknownStrategy(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Relaxation discipline used to build the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    LabelSetting,
    LabelCorrecting,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LabelSetting => "label_setting",
            Self::LabelCorrecting => "label_correcting",
        }
    }
}

impl FromStr for Strategy {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label_setting" => Ok(Self::LabelSetting),
            "label_correcting" => Ok(Self::LabelCorrecting),
            _ => Err(PathError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Build the shortest path tree rooted at `source`.
pub fn shortest_paths(
    graph: &Graph,
    source: NodeId,
    config: &ShortestPathConfig,
) -> Result<ShortestPathTree, PathError> {
    let strategy: Strategy = config.strategy.parse()?;
    graph.check_node(source)?;

    let tree = match strategy {
        Strategy::LabelSetting => label_setting::build_tree(graph, source, config.verbosity),
        Strategy::LabelCorrecting => label_correcting::build_tree(graph, source, config.verbosity),
    };

    log_changes!(
        config.verbosity,
        "{}: checks={} pops={} relaxations={}",
        strategy.as_str(),
        tree.stats.checks,
        tree.stats.pops,
        tree.stats.relaxations
    );
    Ok(tree)
}

/// Build the tree from `source` and reconstruct the path to `target`.
pub fn find_path(
    graph: &Graph,
    source: NodeId,
    target: NodeId,
    config: &ShortestPathConfig,
) -> Result<Path, PathError> {
    let tree = shortest_paths(graph, source, config)?;
    let path = tree.path_to(graph, target)?;
    log_changes!(config.verbosity, "Total cost: {}", path.cost);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn make_network(labels: &[&str], edges: &[(NodeId, NodeId, f64)]) -> Graph {
        let mut graph = Graph::new();
        for label in labels {
            graph.add_node(Node::new(*label));
        }
        for &(from, to, weight) in edges {
            graph.add_edge(Edge::weighted(from, to, weight)).unwrap();
        }
        graph
    }

    fn make_diamond() -> Graph {
        make_network(
            &["A", "B", "C", "D"],
            &[(0, 1, 10.0), (1, 3, 15.0), (0, 2, 20.0), (2, 3, 25.0)],
        )
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("label_setting".parse::<Strategy>(), Ok(Strategy::LabelSetting));
        assert_eq!(
            "label_correcting".parse::<Strategy>(),
            Ok(Strategy::LabelCorrecting)
        );
        assert_eq!(
            "dijkstra".parse::<Strategy>(),
            Err(PathError::UnknownStrategy("dijkstra".to_string()))
        );
    }

    #[test]
    fn test_diamond_both_strategies() {
        let graph = make_diamond();
        for strategy in ["label_setting", "label_correcting"] {
            let config = ShortestPathConfig::with_strategy(strategy);
            let path = find_path(&graph, 0, 3, &config).unwrap();

            assert_eq!(path.cost, 25.0, "{strategy}");
            assert_eq!(path.nodes, vec![0, 1, 3], "{strategy}");
            assert_eq!(path.edges, vec![0, 1], "{strategy}");
        }
    }

    #[test]
    fn test_unknown_strategy_error() {
        let graph = make_diamond();
        let config = ShortestPathConfig::with_strategy("bogus");
        let result = shortest_paths(&graph, 0, &config);
        assert!(matches!(result, Err(PathError::UnknownStrategy(_))));
    }

    #[test]
    fn test_invalid_source() {
        let graph = make_diamond();
        let result = shortest_paths(&graph, 9, &ShortestPathConfig::default());
        assert!(matches!(
            result,
            Err(PathError::Graph(GraphError::InvalidReference { node: 9, .. }))
        ));
    }

    #[test]
    fn test_unreachable_target() {
        let graph = make_network(&["A", "B", "C"], &[(0, 1, 1.0)]);
        for strategy in ["label_setting", "label_correcting"] {
            let config = ShortestPathConfig::with_strategy(strategy);
            let result = find_path(&graph, 0, 2, &config);
            assert_eq!(result, Err(PathError::Unreachable { start: 0, target: 2 }));
        }
    }

    #[test]
    fn test_label_correcting_does_more_work_on_late_improvements() {
        // A->C is expensive but seen first; A->B->C is cheaper and corrects it.
        let graph = make_network(
            &["A", "B", "C", "D"],
            &[(0, 2, 10.0), (0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)],
        );
        let setting = shortest_paths(
            &graph,
            0,
            &ShortestPathConfig::with_strategy("label_setting"),
        )
        .unwrap();
        let correcting = shortest_paths(
            &graph,
            0,
            &ShortestPathConfig::with_strategy("label_correcting"),
        )
        .unwrap();

        assert_eq!(setting.costs, correcting.costs);
        assert_eq!(setting.costs, vec![0.0, 1.0, 2.0, 3.0]);
        assert!(correcting.stats.pops > setting.stats.pops);
    }
}
