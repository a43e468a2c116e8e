//! Breadth-first search over residual capacity.

use std::collections::VecDeque;

use crate::graph::{EdgeId, Graph, NodeId};

/// How the search first reached a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Step {
    pub edge: EdgeId,
    /// True if `edge` was followed from its tail (adds flow), false if it was
    /// followed backward from its head (cancels flow).
    pub forward: bool,
    pub prev: NodeId,
}

/// Result of one residual search: who was reached, and how.
pub(super) struct Exploration {
    pub visited: Vec<bool>,
    pub reached_by: Vec<Option<Step>>,
}

/// Explore from `source` over edges with residual capacity.
///
/// Forward edges qualify while `flow < capacity`; an edge ending at the
/// current node qualifies backward while `flow > 0`. Expansion stops after
/// the candidate that makes `stop_at` visited, or when no candidates remain.
pub(super) fn explore(
    graph: &Graph,
    incoming: &[Vec<EdgeId>],
    flows: &[f64],
    source: NodeId,
    stop_at: Option<NodeId>,
) -> Exploration {
    let n = graph.node_count();
    let mut visited = vec![false; n];
    let mut reached_by: Vec<Option<Step>> = vec![None; n];
    let mut candidates: VecDeque<NodeId> = VecDeque::from([source]);
    visited[source as usize] = true;

    while let Some(candidate) = candidates.pop_front() {
        for (edge_id, edge) in graph.outgoing(candidate) {
            let neighbor = edge.to;
            if !visited[neighbor as usize] && flows[edge_id as usize] < edge.capacity {
                visited[neighbor as usize] = true;
                reached_by[neighbor as usize] = Some(Step {
                    edge: edge_id,
                    forward: true,
                    prev: candidate,
                });
                candidates.push_back(neighbor);
            }
        }

        for &edge_id in &incoming[candidate as usize] {
            let Some(edge) = graph.edge(edge_id) else {
                continue;
            };
            let neighbor = edge.from;
            if !visited[neighbor as usize] && flows[edge_id as usize] > 0.0 {
                visited[neighbor as usize] = true;
                reached_by[neighbor as usize] = Some(Step {
                    edge: edge_id,
                    forward: false,
                    prev: candidate,
                });
                candidates.push_back(neighbor);
            }
        }

        if stop_at.is_some_and(|sink| visited[sink as usize]) {
            break;
        }
    }

    Exploration {
        visited,
        reached_by,
    }
}

/// Steps of the path from `sink` back to `source`, sink first.
pub(super) fn trace_back(exploration: &Exploration, source: NodeId, sink: NodeId) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut node = sink;
    while node != source {
        let Some(step) = exploration.reached_by[node as usize] else {
            break;
        };
        steps.push(step);
        node = step.prev;
    }
    steps
}

/// Smallest residual capacity along `steps`.
pub(super) fn bottleneck(graph: &Graph, flows: &[f64], steps: &[Step]) -> f64 {
    steps
        .iter()
        .filter_map(|step| {
            let edge = graph.edge(step.edge)?;
            let flow = flows[step.edge as usize];
            Some(if step.forward {
                edge.capacity - flow
            } else {
                flow
            })
        })
        .fold(f64::INFINITY, f64::min)
}

/// Push `amount` along `steps`: add on forward edges, cancel on backward ones.
///
/// Results are clamped to `0..=capacity`. An edge whose residual equals
/// `amount` lands exactly on its bound, so no rounding residue is left
/// behind for another augmentation.
pub(super) fn apply(graph: &Graph, flows: &mut [f64], steps: &[Step], amount: f64) {
    for step in steps {
        let Some(edge) = graph.edge(step.edge) else {
            continue;
        };
        let flow = &mut flows[step.edge as usize];
        *flow = if step.forward {
            if amount >= edge.capacity - *flow {
                edge.capacity
            } else {
                (*flow + amount).min(edge.capacity)
            }
        } else if amount >= *flow {
            0.0
        } else {
            (*flow - amount).max(0.0)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn make_network(n: usize, edges: &[(NodeId, NodeId, f64)]) -> Graph {
        let mut graph = Graph::new();
        for i in 0..n {
            graph.add_node(Node::new(format!("N{i}")));
        }
        for &(from, to, capacity) in edges {
            graph.add_edge(Edge::weighted(from, to, capacity)).unwrap();
        }
        graph
    }

    #[test]
    fn test_forward_search_and_bottleneck() {
        let graph = make_network(3, &[(0, 1, 5.0), (1, 2, 3.0)]);
        let incoming = graph.incoming_index();
        let flows = vec![0.0; 2];

        let exploration = explore(&graph, &incoming, &flows, 0, Some(2));
        assert!(exploration.visited[2]);

        let steps = trace_back(&exploration, 0, 2);
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.forward));
        assert_eq!(bottleneck(&graph, &flows, &steps), 3.0);
    }

    #[test]
    fn test_backward_edge_cancels_flow() {
        // 0 -> 1 -> 2 carries flow; a search from 1 can step back to 0.
        let graph = make_network(3, &[(0, 1, 4.0), (1, 2, 4.0)]);
        let incoming = graph.incoming_index();
        let mut flows = vec![4.0, 4.0];

        let exploration = explore(&graph, &incoming, &flows, 1, Some(0));
        let steps = trace_back(&exploration, 1, 0);
        assert_eq!(
            steps,
            vec![Step {
                edge: 0,
                forward: false,
                prev: 1
            }]
        );
        assert_eq!(bottleneck(&graph, &flows, &steps), 4.0);

        apply(&graph, &mut flows, &steps, 1.5);
        assert_eq!(flows, vec![2.5, 4.0]);
    }

    #[test]
    fn test_apply_lands_on_capacity_with_fractional_flow() {
        // 7 * 0.1 is 0.7000000000000001; adding back 1.8 - that gives
        // 1.8000000000000003 in plain addition.
        let graph = make_network(2, &[(0, 1, 1.8)]);
        let incoming = graph.incoming_index();
        let mut flows = vec![7.0 * 0.1];

        let exploration = explore(&graph, &incoming, &flows, 0, Some(1));
        let steps = trace_back(&exploration, 0, 1);
        let amount = bottleneck(&graph, &flows, &steps);
        apply(&graph, &mut flows, &steps, amount);

        assert_eq!(flows, vec![1.8]);
        let exploration = explore(&graph, &incoming, &flows, 0, Some(1));
        assert!(!exploration.visited[1]);
    }

    #[test]
    fn test_apply_cancels_to_exact_zero() {
        let graph = make_network(2, &[(0, 1, 1.0)]);
        let mut flows = vec![0.3];
        let steps = vec![Step {
            edge: 0,
            forward: false,
            prev: 1,
        }];
        apply(&graph, &mut flows, &steps, 0.3);
        assert_eq!(flows, vec![0.0]);
    }

    #[test]
    fn test_saturated_edge_blocks_search() {
        let graph = make_network(2, &[(0, 1, 2.0)]);
        let incoming = graph.incoming_index();
        let exploration = explore(&graph, &incoming, &[2.0], 0, Some(1));
        assert!(!exploration.visited[1]);
    }
}
