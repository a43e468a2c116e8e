//! Label-setting (Dijkstra-style) tree construction with a linear-scan
//! candidate list.

use crate::graph::{Graph, NodeId};
use crate::{log_checks, log_debug};

use super::tree::ShortestPathTree;

/// Select the cheapest candidate. The first of several equal minima wins.
fn select_best(candidates: &[NodeId], tree: &mut ShortestPathTree) -> usize {
    let mut best_cost = f64::INFINITY;
    let mut best_index = 0;
    for (i, &candidate) in candidates.iter().enumerate() {
        tree.stats.checks += 1;
        let cost = tree.cost_of(candidate);
        if cost < best_cost {
            best_cost = cost;
            best_index = i;
        }
    }
    best_index
}

pub(super) fn build_tree(graph: &Graph, source: NodeId, verbosity: u8) -> ShortestPathTree {
    let n = graph.node_count();
    let mut tree = ShortestPathTree::rooted_at(source, n);
    let mut visited = vec![false; n];
    let mut listed = vec![false; n];

    let mut candidates: Vec<NodeId> = vec![source];
    listed[source as usize] = true;

    while !candidates.is_empty() {
        log_debug!(verbosity, "Candidates: {:?}", candidates);

        let best_index = select_best(&candidates, &mut tree);
        let best = candidates.remove(best_index);
        listed[best as usize] = false;
        visited[best as usize] = true;
        tree.stats.pops += 1;

        let best_cost = tree.cost_of(best);
        log_checks!(
            verbosity,
            "Finalized {} ({}) at cost {}",
            graph.label(best),
            best,
            best_cost
        );

        for (edge_id, edge) in graph.outgoing(best) {
            let other = edge.to;
            if visited[other as usize] {
                continue;
            }
            if tree.relax(other, best_cost + edge.cost, edge_id) {
                log_checks!(
                    verbosity,
                    "  {} -> {}: cost now {}",
                    best,
                    other,
                    tree.cost_of(other)
                );
                if !listed[other as usize] {
                    listed[other as usize] = true;
                    candidates.push(other);
                }
            }
        }
    }

    tree
}
