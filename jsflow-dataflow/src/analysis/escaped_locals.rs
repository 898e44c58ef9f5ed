//! Which locals of a function can be read or written outside its own straight-line control flow.
//!
//! Liveness is never tracked for such variables.  A variable escapes if
//! - a nested function references it, since the closure may run at any time,
//! - it is bound by a `catch`, or
//! - the coding convention reports it as exported.

use jsflow_ast::{node_util, Context, FxIndexSet, Node, Scope, Var, VarKind};

use crate::{
    function_scopes, local_scopes, AnalysisConfig, AnalysisError, AnalysisResult, AnalysisResultT,
    AnalysisResults, Pass,
};

/// Naming rules of the code base under compilation.
pub trait CodingConvention {
    /// Is `name` visible to code outside the compilation unit?
    fn is_exported(&self, _name: &str, _local: bool) -> bool {
        false
    }
}

/// A convention under which nothing is exported.
pub struct DefaultCodingConvention;

impl CodingConvention for DefaultCodingConvention {}

/// The escaped variables of a function, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EscapedLocals(FxIndexSet<Var>);

impl AnalysisResultT for EscapedLocals {}

impl EscapedLocals {
    pub fn contains(&self, var: Var) -> bool {
        self.0.contains(&var)
    }

    /// Returns whether `var` was newly added.
    pub fn insert(&mut self, var: Var) -> bool {
        self.0.insert(var)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Var> + '_ {
        self.0.iter().copied()
    }

    pub fn names<'a>(&'a self, context: &'a Context) -> impl Iterator<Item = &'a str> + 'a {
        self.0.iter().map(|var| var.name(context))
    }
}

pub const ESCAPED_LOCALS_NAME: &str = "escaped-locals";

pub fn create_escaped_locals_pass() -> Pass {
    Pass {
        name: ESCAPED_LOCALS_NAME,
        descr: "Locals referenced from nested functions, catch bindings and exported names",
        deps: vec![],
        runner: compute_escaped_locals_pass,
    }
}

pub fn compute_escaped_locals_pass(
    context: &Context,
    _: &AnalysisConfig,
    _: &AnalysisResults,
    function: Node,
) -> Result<AnalysisResult, AnalysisError> {
    let (function_scope, body_scope) = function_scopes(context, function)?;
    Ok(Box::new(compute_escaped(
        context,
        function_scope,
        body_scope,
        &DefaultCodingConvention,
    )))
}

/// Compute the locals of the function owning `function_scope` which escape.
pub fn compute_escaped(
    context: &Context,
    function_scope: Scope,
    body_scope: Scope,
    convention: &dyn CodingConvention,
) -> EscapedLocals {
    let function = function_scope.root_node(context);
    let mut escaped = EscapedLocals::default();

    // References from inside nested functions.
    for n in node_util::subtree_preorder(context, function) {
        let Some(name) = n.name(context) else {
            continue;
        };
        if node_util::enclosing_function(context, n) == Some(function) {
            continue;
        }
        // The name of a function expression binds in its own scope, not ours.
        if n.parent(context).is_some_and(|parent| parent.is_function(context)) {
            continue;
        }
        let Some(var) =
            node_util::closest_scope(context, n).and_then(|scope| scope.get_var(context, name))
        else {
            continue;
        };
        if var.enclosing_function(context) == Some(function) && escaped.insert(var) {
            tracing::trace!(name, "local captured by a nested function");
        }
    }

    for scope in local_scopes(context, function_scope, body_scope) {
        for var in scope.vars_iter(context) {
            let name = var.name(context);
            if var.kind(context) == VarKind::Catch || convention.is_exported(name, true) {
                escaped.insert(var);
            }
        }
    }

    escaped
}
