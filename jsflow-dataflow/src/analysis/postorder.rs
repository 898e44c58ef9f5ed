use petgraph::graph::NodeIndex;
use rustc_hash::FxHashSet;

use crate::{ControlFlowGraph, DataFlowDirection};

/// Post ordering of the nodes in the CFG.
///
/// Nodes unreachable from the entry aren't visited by the traversal; they are appended after all
/// reachable nodes, in index order, so that every node has a position.
pub struct PostOrder {
    pub node_to_po: Vec<usize>,
    pub po_to_node: Vec<NodeIndex>,
}

impl PostOrder {
    /// Node positions in the order a worklist should visit them: post-order for backward
    /// analyses, reverse post-order for forward ones.  Unreachable nodes always come last.
    pub fn worklist_order(
        &self,
        direction: DataFlowDirection,
        num_reachable: usize,
    ) -> Vec<NodeIndex> {
        match direction {
            DataFlowDirection::Backward => self.po_to_node.clone(),
            DataFlowDirection::Forward => {
                let (reachable, unreachable) = self.po_to_node.split_at(num_reachable);
                reachable
                    .iter()
                    .rev()
                    .chain(unreachable.iter())
                    .copied()
                    .collect()
            }
        }
    }
}

/// Compute the post-order traversal of the CFG, starting at its entry.  Returns the ordering and
/// the number of nodes reachable from the entry.
pub fn compute_post_order(cfg: &ControlFlowGraph) -> (PostOrder, usize) {
    let mut res = PostOrder {
        node_to_po: vec![0; cfg.node_count()],
        po_to_node: Vec::with_capacity(cfg.node_count()),
    };

    // Iterative DFS; each stack entry carries the successors still to be visited.
    let entry = cfg.entry();
    let mut visited = FxHashSet::<NodeIndex>::default();
    let mut stack = vec![(entry, cfg.successors(entry).collect::<Vec<_>>())];
    visited.insert(entry);
    while let Some((node, pending)) = stack.last_mut() {
        if let Some(succ) = pending.pop() {
            if visited.insert(succ) {
                let succ_succs = cfg.successors(succ).collect();
                stack.push((succ, succ_succs));
            }
        } else {
            let node = *node;
            res.node_to_po[node.index()] = res.po_to_node.len();
            res.po_to_node.push(node);
            stack.pop();
        }
    }
    let num_reachable = res.po_to_node.len();

    for node in cfg.node_indices() {
        if !visited.contains(&node) {
            res.node_to_po[node.index()] = res.po_to_node.len();
            res.po_to_node.push(node);
        }
    }

    debug_assert!(num_reachable == 0 || res.po_to_node[num_reachable - 1] == entry);
    (res, num_reachable)
}
