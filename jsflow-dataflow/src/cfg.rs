//! The control-flow graph of a single function.
//!
//! Each CFG node wraps an AST statement or expression.  Besides the AST nodes there is always
//! exactly one synthetic node, the implicit return, which every path leaving the function reaches.
//! Edges are labelled with the [`Branch`] taken; an [`Branch::OnEx`] edge means control may leave
//! the source node part way through because of an exception.

use std::fmt::{self, Write};

use jsflow_ast::{Context, Node};
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
    Direction,
};
use rustc_hash::FxHashMap;

use crate::AnalysisResultT;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Branch {
    Unconditional,
    OnTrue,
    OnFalse,
    /// Taken when the source node throws.
    OnEx,
    /// Synthetic edge, e.g. from a `finally` back to where it was entered from.
    Syn,
}

impl Branch {
    pub fn is_exceptional(&self) -> bool {
        matches!(self, Branch::OnEx)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Branch::Unconditional => "UNCOND",
            Branch::OnTrue => "ON_TRUE",
            Branch::OnFalse => "ON_FALSE",
            Branch::OnEx => "ON_EX",
            Branch::Syn => "SYN",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CfgNode {
    Ast(Node),
    ImplicitReturn,
}

pub type Graph = petgraph::Graph<CfgNode, Branch>;

pub struct ControlFlowGraph {
    graph: Graph,
    entry: Option<NodeIndex>,
    implicit_return: NodeIndex,
    ast_nodes: FxHashMap<Node, NodeIndex>,
}

impl AnalysisResultT for ControlFlowGraph {}

impl Default for ControlFlowGraph {
    fn default() -> Self {
        let mut graph = Graph::default();
        let implicit_return = graph.add_node(CfgNode::ImplicitReturn);
        ControlFlowGraph {
            graph,
            entry: None,
            implicit_return,
            ast_nodes: FxHashMap::default(),
        }
    }
}

impl ControlFlowGraph {
    /// Add `node` to the graph, returning its index.  Adding the same AST node twice returns the
    /// existing index.  The first node added becomes the entry unless [`Self::set_entry`] says
    /// otherwise.
    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        if let Some(idx) = self.ast_nodes.get(&node) {
            return *idx;
        }
        let idx = self.graph.add_node(CfgNode::Ast(node));
        self.ast_nodes.insert(node, idx);
        self.entry.get_or_insert(idx);
        idx
    }

    pub fn set_entry(&mut self, entry: NodeIndex) {
        self.entry = Some(entry);
    }

    /// The entry node.  A graph without any AST node is entered at its implicit return.
    pub fn entry(&self) -> NodeIndex {
        self.entry.unwrap_or(self.implicit_return)
    }

    pub fn implicit_return(&self) -> NodeIndex {
        self.implicit_return
    }

    pub fn connect(&mut self, from: NodeIndex, branch: Branch, to: NodeIndex) -> EdgeIndex {
        self.graph.add_edge(from, to, branch)
    }

    pub fn connect_to_implicit_return(&mut self, from: NodeIndex, branch: Branch) -> EdgeIndex {
        self.graph.add_edge(from, self.implicit_return, branch)
    }

    pub fn node(&self, idx: NodeIndex) -> CfgNode {
        self.graph[idx]
    }

    pub fn node_index(&self, node: Node) -> Option<NodeIndex> {
        self.ast_nodes.get(&node).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// All node indices, in insertion order.  The implicit return comes first.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    pub fn successors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| edge.target())
    }

    pub fn predecessors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|edge| edge.source())
    }

    pub fn out_edges(&self, idx: NodeIndex) -> impl Iterator<Item = (Branch, NodeIndex)> + '_ {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (*edge.weight(), edge.target()))
    }

    /// Can control leave `idx` through an exception?
    pub fn has_exceptional_out_edge(&self, idx: NodeIndex) -> bool {
        self.out_edges(idx)
            .any(|(branch, _)| branch.is_exceptional())
    }

    /// Render the graph in the GraphViz dot format.
    pub fn to_dot(&self, context: &Context, name: &str) -> String {
        let mut res = format!("digraph {name} {{\n");
        for idx in self.graph.node_indices() {
            let label = match self.graph[idx] {
                CfgNode::Ast(node) => node.kind(context).to_string(),
                CfgNode::ImplicitReturn => "IMPLICIT_RETURN".to_owned(),
            };
            let _ = writeln!(res, "\tn{} [label=\"{label}\"]", idx.index());
        }
        for edge in self.graph.edge_references() {
            let _ = writeln!(
                res,
                "\tn{} -> n{} [label=\"{}\"]",
                edge.source().index(),
                edge.target().index(),
                edge.weight()
            );
        }
        res += "}\n";
        res
    }
}
