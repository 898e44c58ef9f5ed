//! Backward live variable analysis over the statements of a single function.
//!
//! A variable is live before a node if some path from that node reads the variable before
//! writing it.  Each CFG node contributes a gen set (variables it may read before writing) and a
//! kill set (variables it definitely writes); the flow function is `(live_out - kill) | gen` and
//! the join is set union.
//!
//! Escaped variables (see [`crate::compute_escaped`]) are never tracked: they are excluded from
//! both gen and kill sets and therefore never appear in any live set.

use std::fmt;

use jsflow_ast::{node_util, AssignOp, Context, Node, NodeKind, Scope, Var, VarKind};
use petgraph::graph::NodeIndex;

use crate::{
    function_scopes, print_live_variables, solve_dataflow_equations, AnalysisConfig,
    AnalysisError, AnalysisResult, AnalysisResultT, AnalysisResults, BitField, CfgNode,
    ControlFlowGraph, DataFlowAnalysis, DataFlowDirection, DataFlowResults, EscapedLocals,
    FlowState, LatticeElement, Pass, VariableIndex, ESCAPED_LOCALS_NAME,
};

/// Functions declaring more variables than this are too expensive to analyze.
pub const MAX_VARIABLES_TO_ANALYZE: usize = 100;

/// The implicit array-like binding of every call's arguments.
pub const ARGUMENT_ARRAY_ALIAS: &str = "arguments";

/// The set of live variables at one program point, one bit per [`VariableIndex`] entry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LiveVariableLattice {
    live_set: BitField,
}

impl LiveVariableLattice {
    fn empty(num_vars: usize) -> Self {
        LiveVariableLattice {
            live_set: BitField::empty(num_vars),
        }
    }

    pub fn from_live_set(live_set: BitField) -> Self {
        LiveVariableLattice { live_set }
    }

    pub fn is_live(&self, index: usize) -> bool {
        self.live_set.get(index)
    }

    pub fn live_set(&self) -> &BitField {
        &self.live_set
    }
}

impl LatticeElement for LiveVariableLattice {}

impl fmt::Display for LiveVariableLattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.live_set, f)
    }
}

impl fmt::Debug for LiveVariableLattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// Per-node accumulator filled by the gen/kill walk.
struct GenKill {
    gen: BitField,
    kill: BitField,
    reads_arguments: bool,
}

impl GenKill {
    fn new(num_vars: usize) -> Self {
        GenKill {
            gen: BitField::empty(num_vars),
            kill: BitField::empty(num_vars),
            reads_arguments: false,
        }
    }
}

pub struct LiveVariablesAnalysis<'a> {
    context: &'a Context,
    cfg: &'a ControlFlowGraph,
    function_scope: Scope,
    body_scope: Scope,
    variables: VariableIndex,
    escaped: EscapedLocals,
    // Variable indices of `escaped`.
    escaped_set: BitField,
}

impl<'a> LiveVariablesAnalysis<'a> {
    /// Set up the analysis of `cfg`, the graph of the function owning `function_scope`.
    ///
    /// `escaped` is widened to every parameter if any node of `cfg` reads the `arguments` alias,
    /// since any parameter may then be read through it.  Checking this once up front keeps the
    /// flow function monotone.
    pub fn new(
        context: &'a Context,
        cfg: &'a ControlFlowGraph,
        function_scope: Scope,
        body_scope: Scope,
        escaped: EscapedLocals,
        config: &AnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        if !context.is_normalized() {
            return Err(AnalysisError::NotNormalized);
        }
        if !function_scope.is_function_scope(context) {
            return Err(AnalysisError::NotAFunctionScope {
                found: function_scope.kind(context),
            });
        }
        if !body_scope.is_function_block_scope(context) {
            return Err(AnalysisError::NotAFunctionBlockScope {
                found: body_scope.kind(context),
            });
        }

        let variables = VariableIndex::for_function(context, function_scope, body_scope);
        if variables.len() > config.max_variables {
            return Err(AnalysisError::TooManyVariables {
                count: variables.len(),
                max: config.max_variables,
            });
        }

        let mut analysis = LiveVariablesAnalysis {
            context,
            cfg,
            function_scope,
            body_scope,
            escaped_set: BitField::empty(variables.len()),
            variables,
            escaped: EscapedLocals::default(),
        };
        for var in escaped.iter() {
            analysis.mark_escaped(var);
        }
        if analysis.reads_arguments()? {
            tracing::debug!("arguments alias read, all parameters escape");
            let params = function_scope
                .vars_iter(context)
                .filter(|var| var.kind(context) == VarKind::Param)
                .collect::<Vec<_>>();
            for param in params {
                analysis.mark_escaped(param);
            }
        }
        tracing::debug!(
            variables = analysis.variables.len(),
            escaped = analysis.escaped.len(),
            nodes = cfg.node_count(),
            "starting live variable analysis"
        );
        Ok(analysis)
    }

    pub fn variables(&self) -> &VariableIndex {
        &self.variables
    }

    pub fn escaped_locals(&self) -> &EscapedLocals {
        &self.escaped
    }

    /// Solve the dataflow equations over the graph given to [`Self::new`].
    pub fn analyze(self, max_steps: usize) -> Result<LiveVariablesResult, AnalysisError> {
        let results = solve_dataflow_equations(&self, self.cfg, max_steps)?;
        tracing::debug!(steps = results.steps(), "live variables computed");
        Ok(LiveVariablesResult {
            results,
            variables: self.variables,
            escaped: self.escaped,
        })
    }

    /// The gen and kill sets of the CFG node `node`, in that order.
    pub fn gen_kill_sets(&self, node: NodeIndex) -> Result<(BitField, BitField), AnalysisError> {
        let mut gen_kill = GenKill::new(self.variables.len());
        if let CfgNode::Ast(n) = self.cfg.node(node) {
            self.compute_gen_kill(n, &mut gen_kill, self.cfg.has_exceptional_out_edge(node))?;
        }
        Ok((gen_kill.gen, gen_kill.kill))
    }

    fn mark_escaped(&mut self, var: Var) {
        if self.escaped.insert(var) {
            if let Some(index) = self.variables.index_of(var.name(self.context)) {
                self.escaped_set.set(index);
            }
        }
    }

    // Does any node of the graph read the `arguments` alias?
    fn reads_arguments(&self) -> Result<bool, AnalysisError> {
        for idx in self.cfg.node_indices() {
            if let CfgNode::Ast(n) = self.cfg.node(idx) {
                let mut gen_kill = GenKill::new(self.variables.len());
                self.compute_gen_kill(n, &mut gen_kill, false)?;
                if gen_kill.reads_arguments {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn is_arguments_alias(&self, name: &str) -> bool {
        name == ARGUMENT_ARRAY_ALIAS
            && !self.function_scope.is_declared(self.context, name, false)
            && !self.body_scope.is_declared(self.context, name, false)
    }

    /// Accumulate the gen and kill sets of `n`.  `conditional` is set while visiting code which
    /// may not execute, or may not complete, whenever `n` does; writes there never kill.
    fn compute_gen_kill(
        &self,
        n: Node,
        gen_kill: &mut GenKill,
        conditional: bool,
    ) -> Result<(), AnalysisError> {
        let context = self.context;
        match n.kind(context) {
            // Nested statements are CFG nodes of their own; nested functions run elsewhere.
            NodeKind::Root | NodeKind::Script | NodeKind::Block | NodeKind::Function => Ok(()),

            NodeKind::While | NodeKind::Do | NodeKind::If | NodeKind::For => {
                match node_util::condition_expression(context, n) {
                    Some(cond) => self.compute_gen_kill(cond, gen_kill, conditional),
                    None => Ok(()),
                }
            }

            // The loop variable is written by the iteration and may still be read if the loop
            // exits before writing it, so it is both generated and killed.
            NodeKind::ForIn | NodeKind::ForOf => {
                let Some(mut lhs) = n.first_child(context) else {
                    return Ok(());
                };
                if lhs.kind(context).is_name_declaration() {
                    lhs = lhs.last_child(context).ok_or_else(|| AnalysisError::ExpectedName {
                        found: lhs.kind(context).to_string(),
                    })?;
                }
                if lhs.is_name(context) {
                    self.add_to_set_if_local(lhs, &mut gen_kill.kill)?;
                    self.add_to_set_if_local(lhs, &mut gen_kill.gen)?;
                    Ok(())
                } else {
                    self.compute_gen_kill(lhs, gen_kill, conditional)
                }
            }

            NodeKind::Var | NodeKind::Let | NodeKind::Const => {
                for &name in n.children(context) {
                    if !name.is_name(context) {
                        return Err(AnalysisError::ExpectedName {
                            found: name.kind(context).to_string(),
                        });
                    }
                    if let Some(init) = name.first_child(context) {
                        self.compute_gen_kill(init, gen_kill, conditional)?;
                        if !conditional {
                            self.add_to_set_if_local(name, &mut gen_kill.kill)?;
                        }
                    }
                }
                Ok(())
            }

            NodeKind::And | NodeKind::Or => {
                if let Some(lhs) = n.first_child(context) {
                    self.compute_gen_kill(lhs, gen_kill, conditional)?;
                }
                match n.child(context, 1) {
                    Some(rhs) => self.compute_gen_kill(rhs, gen_kill, true),
                    None => Ok(()),
                }
            }

            NodeKind::Hook => {
                if let Some(cond) = n.first_child(context) {
                    self.compute_gen_kill(cond, gen_kill, conditional)?;
                }
                for &branch in n.children(context).iter().skip(1) {
                    self.compute_gen_kill(branch, gen_kill, true)?;
                }
                Ok(())
            }

            NodeKind::Name(name) => {
                if self.is_arguments_alias(name) {
                    gen_kill.reads_arguments = true;
                    Ok(())
                } else {
                    self.add_to_set_if_local(n, &mut gen_kill.gen)
                }
            }

            NodeKind::Assign(op) => {
                let (Some(lhs), Some(rhs)) = (n.first_child(context), n.child(context, 1)) else {
                    return self.compute_children(n, gen_kill, conditional);
                };
                if !lhs.is_name(context) {
                    return self.compute_children(n, gen_kill, conditional);
                }
                if !conditional {
                    self.add_to_set_if_local(lhs, &mut gen_kill.kill)?;
                }
                if !matches!(op, AssignOp::Assign) {
                    self.add_to_set_if_local(lhs, &mut gen_kill.gen)?;
                }
                self.compute_gen_kill(rhs, gen_kill, conditional)
            }

            NodeKind::ParamList
            | NodeKind::Try
            | NodeKind::Catch
            | NodeKind::Return
            | NodeKind::Throw
            | NodeKind::ExprResult
            | NodeKind::Empty
            | NodeKind::Call
            | NodeKind::New
            | NodeKind::GetProp(_)
            | NodeKind::GetElem
            | NodeKind::Binary(_)
            | NodeKind::Unary(_)
            | NodeKind::Number(_)
            | NodeKind::Str(_)
            | NodeKind::True
            | NodeKind::False
            | NodeKind::Null
            | NodeKind::This
            | NodeKind::ArrayLit
            | NodeKind::ObjectLit
            | NodeKind::StringKey(_)
            | NodeKind::ArrayPattern
            | NodeKind::ObjectPattern => self.compute_children(n, gen_kill, conditional),
        }
    }

    fn compute_children(
        &self,
        n: Node,
        gen_kill: &mut GenKill,
        conditional: bool,
    ) -> Result<(), AnalysisError> {
        for &child in n.children(self.context) {
            self.compute_gen_kill(child, gen_kill, conditional)?;
        }
        Ok(())
    }

    // Set the bit of the variable `n` names, unless it is escaped or not a local of this function.
    fn add_to_set_if_local(&self, n: Node, set: &mut BitField) -> Result<(), AnalysisError> {
        let name = n.name(self.context).ok_or_else(|| AnalysisError::ExpectedName {
            found: n.kind(self.context).to_string(),
        })?;
        if let Some(index) = self.variables.index_of(name) {
            if !self.escaped_set.get(index) {
                set.set(index);
            }
        }
        Ok(())
    }
}

impl DataFlowAnalysis for LiveVariablesAnalysis<'_> {
    type Lattice = LiveVariableLattice;

    fn direction(&self) -> DataFlowDirection {
        DataFlowDirection::Backward
    }

    fn create_entry_lattice(&self) -> LiveVariableLattice {
        LiveVariableLattice::empty(self.variables.len())
    }

    fn create_initial_estimate_lattice(&self) -> LiveVariableLattice {
        LiveVariableLattice::empty(self.variables.len())
    }

    fn join(&self, inputs: &[&LiveVariableLattice]) -> LiveVariableLattice {
        let mut res = LiveVariableLattice::empty(self.variables.len());
        for input in inputs {
            res.live_set.union_with(&input.live_set);
        }
        res
    }

    fn flow_through(
        &self,
        _cfg: &ControlFlowGraph,
        node: NodeIndex,
        input: &LiveVariableLattice,
    ) -> Result<LiveVariableLattice, AnalysisError> {
        let (gen, kill) = self.gen_kill_sets(node)?;
        let mut res = input.clone();
        res.live_set.subtract_with(&kill);
        res.live_set.union_with(&gen);
        Ok(res)
    }
}

/// Live sets before and after every CFG node of a function.
pub struct LiveVariablesResult {
    results: DataFlowResults<LiveVariableLattice>,
    variables: VariableIndex,
    escaped: EscapedLocals,
}

impl AnalysisResultT for LiveVariablesResult {}

impl LiveVariablesResult {
    /// Variables live when control reaches `node`.
    pub fn live_in(&self, node: NodeIndex) -> &LiveVariableLattice {
        self.results.entry(node)
    }

    /// Variables live when control leaves `node`.
    pub fn live_out(&self, node: NodeIndex) -> &LiveVariableLattice {
        self.results.exit(node)
    }

    pub fn state(&self, node: NodeIndex) -> &FlowState<LiveVariableLattice> {
        self.results.state(node)
    }

    /// Is the variable `name` live when control reaches `node`?  Unknown and escaped names
    /// never are.
    pub fn is_live_before(&self, node: NodeIndex, name: &str) -> bool {
        self.variables
            .index_of(name)
            .is_some_and(|index| self.live_in(node).is_live(index))
    }

    /// Is the variable `name` live when control leaves `node`?
    pub fn is_live_after(&self, node: NodeIndex, name: &str) -> bool {
        self.variables
            .index_of(name)
            .is_some_and(|index| self.live_out(node).is_live(index))
    }

    pub fn variables(&self) -> &VariableIndex {
        &self.variables
    }

    pub fn escaped_locals(&self) -> &EscapedLocals {
        &self.escaped
    }

    pub fn steps(&self) -> usize {
        self.results.steps()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &FlowState<LiveVariableLattice>)> {
        self.results.iter()
    }
}

pub const LIVE_VARIABLES_NAME: &str = "live-variables";

pub fn create_live_variables_pass() -> Pass {
    Pass {
        name: LIVE_VARIABLES_NAME,
        descr: "Live variable analysis",
        deps: vec![ESCAPED_LOCALS_NAME],
        runner: compute_live_variables_pass,
    }
}

pub fn compute_live_variables_pass(
    context: &Context,
    config: &AnalysisConfig,
    analyses: &AnalysisResults,
    function: Node,
) -> Result<AnalysisResult, AnalysisError> {
    let cfg: &ControlFlowGraph = analyses.get_analysis_result(function)?;
    let escaped: &EscapedLocals = analyses.get_analysis_result(function)?;
    let (function_scope, body_scope) = function_scopes(context, function)?;
    let analysis = LiveVariablesAnalysis::new(
        context,
        cfg,
        function_scope,
        body_scope,
        escaped.clone(),
        config,
    )?;
    let result = analysis.analyze(config.max_steps)?;
    if tracing::enabled!(tracing::Level::TRACE) {
        let name = node_util::function_name(context, function)
            .and_then(|name| name.name(context))
            .unwrap_or_default();
        tracing::trace!("{}", print_live_variables(context, name, cfg, &result));
    }
    Ok(Box::new(result))
}
