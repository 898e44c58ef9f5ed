use jsflow_ast::{node_util, Context, FxIndexMap, Node, Scope, Var};

use crate::AnalysisError;

/// Look up the two scopes of `function`: the one holding its parameters and the one of its body.
pub fn function_scopes(context: &Context, function: Node) -> Result<(Scope, Scope), AnalysisError> {
    let missing = || AnalysisError::MissingScope {
        function: node_util::function_name(context, function)
            .and_then(|name| name.name(context))
            .unwrap_or_default()
            .to_owned(),
    };
    let function_scope = context.scope_for_root(function).ok_or_else(missing)?;
    let body_scope = node_util::function_body(context, function)
        .and_then(|body| context.scope_for_root(body))
        .ok_or_else(missing)?;
    Ok((function_scope, body_scope))
}

/// The scopes whose variables belong to a function: its parameter scope, its body scope and
/// every block or catch scope nested in the body without crossing into another function.
pub fn local_scopes(context: &Context, function_scope: Scope, body_scope: Scope) -> Vec<Scope> {
    let mut scopes = vec![function_scope];
    let mut stack = vec![body_scope];
    while let Some(scope) = stack.pop() {
        scopes.push(scope);
        stack.extend(
            scope
                .children(context)
                .iter()
                .rev()
                .filter(|child| !child.is_function_scope(context)),
        );
    }
    scopes
}

/// Dense numbering of the variables declared by a function.
///
/// Parameters come first, in declaration order, followed by the variables of the body and of
/// every nested block in a depth-first walk.  The position of a variable is its bit in the live
/// sets.  Names shadowed in a nested block keep the index of their outermost declaration; a
/// normalized program has no such shadowing.
#[derive(Clone, Debug, Default)]
pub struct VariableIndex {
    vars: FxIndexMap<String, Var>,
}

impl VariableIndex {
    pub fn for_function(context: &Context, function_scope: Scope, body_scope: Scope) -> Self {
        let mut vars = FxIndexMap::default();
        for scope in local_scopes(context, function_scope, body_scope) {
            for var in scope.vars_iter(context) {
                vars.entry(var.name(context).to_owned()).or_insert(var);
            }
        }
        VariableIndex { vars }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.vars.get_index_of(name)
    }

    pub fn get(&self, name: &str) -> Option<Var> {
        self.vars.get(name).copied()
    }

    pub fn var(&self, index: usize) -> Option<Var> {
        self.vars.get_index(index).map(|(_, var)| *var)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.vars.get_index(index).map(|(name, _)| name.as_str())
    }

    /// Iterate over `(index, name, var)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, Var)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(index, (name, var))| (index, name.as_str(), *var))
    }
}
