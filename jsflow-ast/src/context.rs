//! The main handle to an AST instance.
//!
//! [`Context`] contains several [slotmap](https://github.com/orlp/slotmap) collections which hold
//! the nodes, scopes and variables of a program.  It is passed around by reference to nearly every
//! jsflow API.

use rustc_hash::FxHashMap;
use slotmap::{DefaultKey, SlotMap};

use crate::{
    node::{Node, NodeContent},
    scope::{Scope, ScopeContent, VarContent},
};

/// The main AST context handle.
///
/// Every node, scope and variable is stored here.
#[derive(Default)]
pub struct Context {
    pub(crate) nodes: SlotMap<DefaultKey, NodeContent>,
    pub(crate) scopes: SlotMap<DefaultKey, ScopeContent>,
    pub(crate) vars: SlotMap<DefaultKey, VarContent>,

    // Maps a scope-creating node (function, block, catch, ...) to the scope it creates.
    pub(crate) scope_roots: FxHashMap<Node, Scope>,

    normalized: bool,
}

impl Context {
    /// Record that the program held by this context is in normalized form: every declaration
    /// declares a single name and declared names are unique within a function.
    pub fn mark_normalized(&mut self) {
        self.normalized = true;
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Return the scope created by `root`, if scopes have been created for it.
    pub fn scope_for_root(&self, root: Node) -> Option<Scope> {
        self.scope_roots.get(&root).copied()
    }

    /// The number of nodes ever created in this context.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
}
