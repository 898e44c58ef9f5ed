//! Lexical scopes and the variables they declare.
//!
//! Scopes form a tree which mirrors the nesting of their root nodes.  A function is split over
//! two scopes: the [`ScopeKind::Function`] scope which holds its parameters, and the
//! [`ScopeKind::FunctionBlock`] scope of its body which holds everything declared (or hoisted)
//! there.

use std::fmt;

use crate::{context::Context, error::AstError, node::Node, FxIndexMap};

/// A wrapper around an [ECS](https://github.com/orlp/slotmap) handle into the [`Context`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Scope(pub slotmap::DefaultKey);

#[doc(hidden)]
pub struct ScopeContent {
    pub kind: ScopeKind,
    pub root: Node,
    pub parent: Option<Scope>,
    pub children: Vec<Scope>,
    // Insertion ordered, which keeps variable numbering deterministic.
    pub vars: FxIndexMap<String, Var>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ScopeKind {
    Global,
    Function,
    FunctionBlock,
    Block,
    Catch,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScopeKind::Global => "global",
            ScopeKind::Function => "function",
            ScopeKind::FunctionBlock => "function block",
            ScopeKind::Block => "block",
            ScopeKind::Catch => "catch",
        };
        f.write_str(s)
    }
}

/// A wrapper around an [ECS](https://github.com/orlp/slotmap) handle into the [`Context`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Var(pub slotmap::DefaultKey);

#[doc(hidden)]
pub struct VarContent {
    pub name: String,
    pub scope: Scope,
    pub name_node: Node,
    pub kind: VarKind,
}

/// How a variable came to be declared.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum VarKind {
    Param,
    Var,
    Let,
    Const,
    Function,
    Catch,
}

impl Scope {
    /// Return a new scope rooted at `root`, registered as a child of `parent`.
    pub fn new(context: &mut Context, kind: ScopeKind, root: Node, parent: Option<Scope>) -> Scope {
        let scope = Scope(context.scopes.insert(ScopeContent {
            kind,
            root,
            parent,
            children: Vec::new(),
            vars: FxIndexMap::default(),
        }));
        if let Some(parent) = parent {
            context.scopes[parent.0].children.push(scope);
        }
        context.scope_roots.insert(root, scope);
        scope
    }

    pub fn kind(&self, context: &Context) -> ScopeKind {
        context.scopes[self.0].kind
    }

    pub fn root_node(&self, context: &Context) -> Node {
        context.scopes[self.0].root
    }

    pub fn parent(&self, context: &Context) -> Option<Scope> {
        context.scopes[self.0].parent
    }

    pub fn children<'a>(&self, context: &'a Context) -> &'a [Scope] {
        &context.scopes[self.0].children
    }

    pub fn is_function_scope(&self, context: &Context) -> bool {
        self.kind(context) == ScopeKind::Function
    }

    pub fn is_function_block_scope(&self, context: &Context) -> bool {
        self.kind(context) == ScopeKind::FunctionBlock
    }

    /// Declare `name` in this scope.
    ///
    /// Redeclaring a `var` (or a function, or a parameter as a `var`) yields the existing
    /// variable; redeclaring a lexical binding is an error.
    pub fn declare(
        &self,
        context: &mut Context,
        name: &str,
        name_node: Node,
        kind: VarKind,
    ) -> Result<Var, AstError> {
        if let Some(existing) = self.get_own_var(context, name) {
            let lexical = |kind: VarKind| matches!(kind, VarKind::Let | VarKind::Const);
            if lexical(kind) || lexical(existing.kind(context)) {
                return Err(AstError::DuplicateDeclaration {
                    name: name.to_owned(),
                });
            }
            return Ok(existing);
        }
        let var = Var(context.vars.insert(VarContent {
            name: name.to_owned(),
            scope: *self,
            name_node,
            kind,
        }));
        context.scopes[self.0].vars.insert(name.to_owned(), var);
        tracing::trace!(name, ?kind, scope = %self.kind(context), "declared variable");
        Ok(var)
    }

    /// Look up `name` declared directly in this scope.
    pub fn get_own_var(&self, context: &Context, name: &str) -> Option<Var> {
        context.scopes[self.0].vars.get(name).copied()
    }

    /// Resolve `name` in this scope or the closest enclosing scope declaring it.
    pub fn get_var(&self, context: &Context, name: &str) -> Option<Var> {
        let mut scope_opt = Some(*self);
        while let Some(scope) = scope_opt {
            if let Some(var) = scope.get_own_var(context, name) {
                return Some(var);
            }
            scope_opt = scope.parent(context);
        }
        None
    }

    pub fn is_declared(&self, context: &Context, name: &str, recurse: bool) -> bool {
        if recurse {
            self.get_var(context, name).is_some()
        } else {
            self.get_own_var(context, name).is_some()
        }
    }

    /// Return an iterator over the variables declared directly in this scope, in declaration
    /// order.
    pub fn vars_iter<'a>(&self, context: &'a Context) -> impl Iterator<Item = Var> + 'a {
        context.scopes[self.0].vars.values().copied()
    }

    pub fn num_vars(&self, context: &Context) -> usize {
        context.scopes[self.0].vars.len()
    }

    /// The closest `Function` scope at or above this one, `None` at global level.
    pub fn closest_function_scope(&self, context: &Context) -> Option<Scope> {
        let mut scope_opt = Some(*self);
        while let Some(scope) = scope_opt {
            if scope.is_function_scope(context) {
                return Some(scope);
            }
            scope_opt = scope.parent(context);
        }
        None
    }
}

impl Var {
    pub fn name<'a>(&self, context: &'a Context) -> &'a str {
        &context.vars[self.0].name
    }

    pub fn scope(&self, context: &Context) -> Scope {
        context.vars[self.0].scope
    }

    pub fn name_node(&self, context: &Context) -> Node {
        context.vars[self.0].name_node
    }

    pub fn kind(&self, context: &Context) -> VarKind {
        context.vars[self.0].kind
    }

    /// The function node whose scopes contain this declaration, `None` for globals.
    pub fn enclosing_function(&self, context: &Context) -> Option<Node> {
        self.scope(context)
            .closest_function_scope(context)
            .map(|scope| scope.root_node(context))
    }
}
