//! Label-correcting tree construction over a FIFO queue.

use std::collections::VecDeque;

use crate::graph::{Graph, NodeId};
use crate::{log_checks, log_debug};

use super::tree::ShortestPathTree;

/// FIFO relaxation: every popped node relaxes all of its outgoing edges,
/// and any improved node is queued again, processed or not.
///
/// Has no iteration cap; a reachable negative cycle makes it loop forever.
pub(super) fn build_tree(graph: &Graph, source: NodeId, verbosity: u8) -> ShortestPathTree {
    let mut tree = ShortestPathTree::rooted_at(source, graph.node_count());
    let mut queue: VecDeque<NodeId> = VecDeque::from([source]);

    while let Some(node) = queue.pop_front() {
        tree.stats.pops += 1;
        let cost = tree.cost_of(node);
        log_debug!(verbosity, "Pop {} at cost {}, queue {:?}", node, cost, queue);

        for (edge_id, edge) in graph.outgoing(node) {
            if tree.relax(edge.to, cost + edge.cost, edge_id) {
                log_checks!(
                    verbosity,
                    "  {} -> {} ({}): cost now {}",
                    node,
                    edge.to,
                    graph.label(edge.to),
                    tree.cost_of(edge.to)
                );
                queue.push_back(edge.to);
            }
        }
    }

    tree
}
