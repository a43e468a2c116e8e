//! Label lookup for graph nodes.
//!
//! Loaders and callers address nodes by their display label; solvers only ever
//! see dense integer indices. The first node registered under a label owns it.

use rustc_hash::FxHashMap;

use crate::graph::NodeId;

/// Maps node labels to the index of the first node carrying that label.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    to_id: FxHashMap<String, NodeId>,
}

impl LabelIndex {
    /// Register `label` for `id`. Returns false if the label was already taken,
    /// in which case the earlier node keeps it.
    pub fn register(&mut self, label: &str, id: NodeId) -> bool {
        if self.to_id.contains_key(label) {
            return false;
        }
        self.to_id.insert(label.to_string(), id);
        true
    }

    #[inline]
    pub fn get(&self, label: &str) -> Option<NodeId> {
        self.to_id.get(label).copied()
    }
}
