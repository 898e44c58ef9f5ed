//! Builds the lexical scope tree for a script or function syntactically.
//!
//! Hoisting follows the usual rules: `var` declarations and function declarations bind in the
//! closest function body (or the global scope), `let`/`const` bind in the closest enclosing block.
//! Parameters get a scope of their own, separate from the function body.

use crate::{
    context::Context,
    error::AstError,
    node::{Node, NodeKind},
    node_util,
    scope::{Scope, ScopeKind, VarKind},
};

pub struct ScopeCreator;

impl ScopeCreator {
    /// Create scopes for every scope-creating node under `root`, which must be a `Script` or a
    /// `Function`.  Returns the outermost scope created.
    pub fn create_scopes(context: &mut Context, root: Node) -> Result<Scope, AstError> {
        match root.kind(context) {
            NodeKind::Script => {
                let global = Scope::new(context, ScopeKind::Global, root, None);
                declare_hoisted_vars(context, root, global)?;
                declare_lexical(context, root, global)?;
                scan_children(context, root, global)?;
                Ok(global)
            }
            NodeKind::Function => create_function_scopes(context, root, None),
            other => Err(AstError::InvalidScopeRoot {
                found: other.to_string(),
            }),
        }
    }
}

fn create_function_scopes(
    context: &mut Context,
    function: Node,
    parent: Option<Scope>,
) -> Result<Scope, AstError> {
    let (Some(params), Some(body)) = (
        node_util::function_parameters(context, function),
        node_util::function_body(context, function),
    ) else {
        return Err(AstError::MalformedNode {
            kind: NodeKind::Function.to_string(),
            expected: "a name, a parameter list and a body",
        });
    };

    let function_scope = Scope::new(context, ScopeKind::Function, function, parent);
    for param in params.children(context).to_vec() {
        let name = expect_name(context, param, "simple parameter names")?;
        function_scope.declare(context, &name, param, VarKind::Param)?;
    }

    let body_scope = Scope::new(context, ScopeKind::FunctionBlock, body, Some(function_scope));
    declare_hoisted_vars(context, body, body_scope)?;
    declare_lexical(context, body, body_scope)?;
    scan_children(context, body, body_scope)?;

    Ok(function_scope)
}

fn scan_children(context: &mut Context, node: Node, scope: Scope) -> Result<(), AstError> {
    for child in node.children(context).to_vec() {
        scan(context, child, scope)?;
    }
    Ok(())
}

fn scan(context: &mut Context, node: Node, scope: Scope) -> Result<(), AstError> {
    match node.kind(context) {
        NodeKind::Function => {
            create_function_scopes(context, node, Some(scope))?;
        }
        NodeKind::Block => {
            let block_scope = Scope::new(context, ScopeKind::Block, node, Some(scope));
            declare_lexical(context, node, block_scope)?;
            scan_children(context, node, block_scope)?;
        }
        NodeKind::For | NodeKind::ForIn | NodeKind::ForOf => {
            let loop_scope = Scope::new(context, ScopeKind::Block, node, Some(scope));
            if let Some(header) = node.first_child(context) {
                let kind = match header.kind(context) {
                    NodeKind::Let => Some(VarKind::Let),
                    NodeKind::Const => Some(VarKind::Const),
                    _ => None,
                };
                if let Some(kind) = kind {
                    declare_names(context, header, loop_scope, kind)?;
                }
            }
            scan_children(context, node, loop_scope)?;
        }
        NodeKind::Catch => {
            let catch_scope = Scope::new(context, ScopeKind::Catch, node, Some(scope));
            let binding = node.first_child(context).ok_or(AstError::MalformedNode {
                kind: NodeKind::Catch.to_string(),
                expected: "a bound name",
            })?;
            let name = expect_name(context, binding, "a bound name")?;
            catch_scope.declare(context, &name, binding, VarKind::Catch)?;
            scan_children(context, node, catch_scope)?;
        }
        _ => scan_children(context, node, scope)?,
    }
    Ok(())
}

// Declare every `var` under `root` without crossing into nested functions.
fn declare_hoisted_vars(context: &mut Context, root: Node, scope: Scope) -> Result<(), AstError> {
    let mut stack = vec![root];
    let mut declarations = Vec::new();
    while let Some(node) = stack.pop() {
        match node.kind(context) {
            NodeKind::Function if node != root => continue,
            NodeKind::Var => declarations.push(node),
            _ => (),
        }
        stack.extend(node.children(context).iter().rev().copied());
    }
    for declaration in declarations {
        declare_names(context, declaration, scope, VarKind::Var)?;
    }
    Ok(())
}

// Declare the block-scoped bindings which are direct children of `block`.
fn declare_lexical(context: &mut Context, block: Node, scope: Scope) -> Result<(), AstError> {
    for child in block.children(context).to_vec() {
        match child.kind(context) {
            NodeKind::Let => declare_names(context, child, scope, VarKind::Let)?,
            NodeKind::Const => declare_names(context, child, scope, VarKind::Const)?,
            NodeKind::Function if node_util::is_function_declaration(context, child) => {
                if let Some(name_node) = node_util::function_name(context, child) {
                    let name = expect_name(context, name_node, "a function name")?;
                    scope.declare(context, &name, name_node, VarKind::Function)?;
                }
            }
            _ => (),
        }
    }
    Ok(())
}

fn declare_names(
    context: &mut Context,
    declaration: Node,
    scope: Scope,
    kind: VarKind,
) -> Result<(), AstError> {
    for name_node in declaration.children(context).to_vec() {
        let name = expect_name(context, name_node, "one simple name per declared binding")?;
        scope.declare(context, &name, name_node, kind)?;
    }
    Ok(())
}

fn expect_name(context: &Context, node: Node, expected: &'static str) -> Result<String, AstError> {
    node.name(context)
        .map(str::to_owned)
        .ok_or_else(|| AstError::MalformedNode {
            kind: node.kind(context).to_string(),
            expected,
        })
}
