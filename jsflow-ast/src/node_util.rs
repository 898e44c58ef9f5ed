//! Structural queries over nodes which depend on the child layout of their kind.

use crate::{
    context::Context,
    node::{Node, NodeKind},
    scope::Scope,
};

/// Return the condition expression of an `if`, `while`, `do` or C-style `for`.
///
/// A `for` without a condition yields its `Empty` placeholder.
pub fn condition_expression(context: &Context, n: Node) -> Option<Node> {
    match n.kind(context) {
        NodeKind::If | NodeKind::While => n.first_child(context),
        NodeKind::Do => n.last_child(context),
        NodeKind::For => n.child(context, 1),
        _ => None,
    }
}

/// Return the closest function node at or above `n`.
pub fn enclosing_function(context: &Context, n: Node) -> Option<Node> {
    let mut node_opt = Some(n);
    while let Some(node) = node_opt {
        if node.is_function(context) {
            return Some(node);
        }
        node_opt = node.parent(context);
    }
    None
}

pub fn function_name(context: &Context, function: Node) -> Option<Node> {
    debug_assert!(function.is_function(context));
    function.child(context, 0)
}

pub fn function_parameters(context: &Context, function: Node) -> Option<Node> {
    debug_assert!(function.is_function(context));
    function.child(context, 1)
}

pub fn function_body(context: &Context, function: Node) -> Option<Node> {
    debug_assert!(function.is_function(context));
    function.child(context, 2)
}

/// Is `n` a named function in statement position?  Only those bind their name in the
/// enclosing scope.
pub fn is_function_declaration(context: &Context, n: Node) -> bool {
    n.is_function(context)
        && n.parent(context).is_some_and(|parent| {
            matches!(
                parent.kind(context),
                NodeKind::Script | NodeKind::Block | NodeKind::Root
            )
        })
        && function_name(context, n)
            .and_then(|name| name.name(context))
            .is_some_and(|name| !name.is_empty())
}

/// Is `n` a block which serves as a function's body?
pub fn is_function_block(context: &Context, n: Node) -> bool {
    matches!(n.kind(context), NodeKind::Block)
        && n.parent(context).is_some_and(|parent| {
            parent.is_function(context) && function_body(context, parent) == Some(n)
        })
}

/// Return the innermost scope containing `n`, i.e. the scope of the closest scope-creating node
/// at or above it.
pub fn closest_scope(context: &Context, n: Node) -> Option<Scope> {
    let mut node_opt = Some(n);
    while let Some(node) = node_opt {
        if let Some(scope) = context.scope_for_root(node) {
            return Some(scope);
        }
        node_opt = node.parent(context);
    }
    None
}

/// Collect every node of the subtree rooted at `root` in pre-order.
pub fn subtree_preorder(context: &Context, root: Node) -> Vec<Node> {
    let mut order = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        order.push(node);
        stack.extend(node.children(context).iter().rev().copied());
    }
    order
}
