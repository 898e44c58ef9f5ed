use jsflow_ast::{AssignOp, BinaryOp, Context, Node, NodeKind, ScopeCreator, ScopeKind};
use jsflow_dataflow::{
    compute_escaped, function_scopes, print_live_variables, register_known_passes,
    AnalysisConfig, AnalysisError, BitField, Branch, ControlFlowGraph, DataFlowAnalysis,
    DefaultCodingConvention, LiveVariableLattice, LiveVariablesAnalysis, LiveVariablesResult,
    PassManager, PassManagerConfig, LIVE_VARIABLES_NAME, MAX_STEPS,
};
use petgraph::graph::NodeIndex;
use pretty_assertions::assert_eq;

// A function with its scopes created and its control-flow graph assembled by hand.
struct Fixture {
    context: Context,
    function: Node,
    cfg: ControlFlowGraph,
}

impl Fixture {
    fn analysis_with(
        &self,
        config: &AnalysisConfig,
    ) -> Result<LiveVariablesAnalysis<'_>, AnalysisError> {
        let (function_scope, body_scope) = function_scopes(&self.context, self.function)?;
        let escaped = compute_escaped(
            &self.context,
            function_scope,
            body_scope,
            &DefaultCodingConvention,
        );
        LiveVariablesAnalysis::new(
            &self.context,
            &self.cfg,
            function_scope,
            body_scope,
            escaped,
            config,
        )
    }

    fn analysis(&self) -> LiveVariablesAnalysis<'_> {
        self.analysis_with(&AnalysisConfig::default()).unwrap()
    }

    fn analyze(&self) -> LiveVariablesResult {
        self.analysis().analyze(MAX_STEPS).unwrap()
    }
}

// Wrap `function` in a script, create its scopes and mark the program normalized.
fn prepare(context: &mut Context, function: Node) {
    let script = context.script(vec![function]);
    ScopeCreator::create_scopes(context, script).unwrap();
    context.mark_normalized();
}

// Add `nodes` to the graph as a straight line ending in the implicit return.
fn chain(cfg: &mut ControlFlowGraph, nodes: &[Node]) -> Vec<NodeIndex> {
    let indices = nodes
        .iter()
        .map(|node| cfg.add_node(*node))
        .collect::<Vec<_>>();
    for pair in indices.windows(2) {
        cfg.connect(pair[0], Branch::Unconditional, pair[1]);
    }
    if let Some(last) = indices.last() {
        cfg.connect_to_implicit_return(*last, Branch::Unconditional);
    }
    indices
}

fn live_names(result: &LiveVariablesResult, lattice: &LiveVariableLattice) -> Vec<String> {
    lattice
        .live_set()
        .iter_ones()
        .filter_map(|index| result.variables().name(index))
        .map(str::to_owned)
        .collect()
}

fn bit_field(width: usize, ones: &[usize]) -> BitField {
    let mut field = BitField::empty(width);
    for one in ones {
        field.set(*one);
    }
    field
}

// function f(a) { var b = a; if (cond) { b = 2; } return b; }
struct Diamond {
    fixture: Fixture,
    n_body: NodeIndex,
    n_decl: NodeIndex,
    n_if: NodeIndex,
    n_then: NodeIndex,
    n_assign: NodeIndex,
    n_ret: NodeIndex,
}

fn diamond() -> Diamond {
    let mut context = Context::default();
    let a = context.name("a");
    let decl_b = context.var_decl("b", Some(a));
    let cond = context.name("cond");
    let b = context.name("b");
    let two = context.number(2.0);
    let assign = context.assign(b, two);
    let assign_stmt = context.expr_result(assign);
    let then_block = context.block(vec![assign_stmt]);
    let if_stmt = context.if_stmt(cond, then_block, None);
    let b_ret = context.name("b");
    let ret = context.return_stmt(Some(b_ret));
    let body = context.block(vec![decl_b, if_stmt, ret]);
    let function = context.function("f", &["a"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let n_body = cfg.add_node(body);
    let n_decl = cfg.add_node(decl_b);
    let n_if = cfg.add_node(if_stmt);
    let n_then = cfg.add_node(then_block);
    let n_assign = cfg.add_node(assign_stmt);
    let n_ret = cfg.add_node(ret);
    cfg.connect(n_body, Branch::Unconditional, n_decl);
    cfg.connect(n_decl, Branch::Unconditional, n_if);
    cfg.connect(n_if, Branch::OnTrue, n_then);
    cfg.connect(n_if, Branch::OnFalse, n_ret);
    cfg.connect(n_then, Branch::Unconditional, n_assign);
    cfg.connect(n_assign, Branch::Unconditional, n_ret);
    cfg.connect_to_implicit_return(n_ret, Branch::Unconditional);

    Diamond {
        fixture: Fixture {
            context,
            function,
            cfg,
        },
        n_body,
        n_decl,
        n_if,
        n_then,
        n_assign,
        n_ret,
    }
}

#[test]
fn reassignment_on_one_branch() {
    let d = diamond();
    let result = d.fixture.analyze();

    assert_eq!(
        result
            .variables()
            .iter()
            .map(|(_, name, _)| name)
            .collect::<Vec<_>>(),
        vec!["a", "b"]
    );
    assert!(result.escaped_locals().is_empty());

    assert_eq!(live_names(&result, result.live_in(d.n_body)), vec!["a"]);
    assert_eq!(live_names(&result, result.live_in(d.n_decl)), vec!["a"]);
    assert_eq!(live_names(&result, result.live_out(d.n_decl)), vec!["b"]);
    assert_eq!(live_names(&result, result.live_in(d.n_if)), vec!["b"]);
    assert!(result.live_in(d.n_then).live_set().is_clear());
    assert!(!result.is_live_before(d.n_assign, "b"));
    assert!(result.is_live_after(d.n_assign, "b"));
    assert_eq!(live_names(&result, result.live_in(d.n_ret)), vec!["b"]);
    assert!(result.live_out(d.n_ret).live_set().is_clear());

    // Names the function doesn't declare are never live.
    assert!(!result.is_live_before(d.n_if, "cond"));
}

#[test]
fn convergence_is_bounded() {
    let d = diamond();
    let result = d.fixture.analyze();
    let bound = d.fixture.cfg.node_count() * (result.variables().len() + 1) * 2;
    assert!(result.steps() <= bound, "{} steps", result.steps());
}

#[test]
fn flow_function_is_monotone() {
    let d = diamond();
    let analysis = d.fixture.analysis();
    let width = analysis.variables().len();
    let subsets = (0..1usize << width)
        .map(|mask| {
            let ones = (0..width).filter(|bit| mask & (1 << *bit) != 0).collect::<Vec<_>>();
            LiveVariableLattice::from_live_set(bit_field(width, &ones))
        })
        .collect::<Vec<_>>();

    for node in d.fixture.cfg.node_indices() {
        for x in &subsets {
            for y in &subsets {
                if !x.live_set().is_subset(y.live_set()) {
                    continue;
                }
                let fx = analysis.flow_through(&d.fixture.cfg, node, x).unwrap();
                let fy = analysis.flow_through(&d.fixture.cfg, node, y).unwrap();
                assert!(fx.live_set().is_subset(fy.live_set()), "{node:?}: {x} <= {y}");
            }
        }
    }
}

#[test]
fn join_is_idempotent_and_commutative() {
    let d = diamond();
    let analysis = d.fixture.analysis();
    let x = LiveVariableLattice::from_live_set(bit_field(2, &[0]));
    let y = LiveVariableLattice::from_live_set(bit_field(2, &[1]));

    assert_eq!(analysis.join(&[&x]), x);
    assert_eq!(analysis.join(&[&x, &x]), x);
    assert_eq!(analysis.join(&[&x, &y]), analysis.join(&[&y, &x]));
    assert_eq!(
        analysis.join(&[&x, &y]),
        LiveVariableLattice::from_live_set(bit_field(2, &[0, 1]))
    );
}

#[test]
fn arguments_alias_escapes_parameters() {
    // function g(p) { return arguments[0]; }
    let mut context = Context::default();
    let args = context.name("arguments");
    let zero = context.number(0.0);
    let elem = context.get_elem(args, zero);
    let ret = context.return_stmt(Some(elem));
    let body = context.block(vec![ret]);
    let function = context.function("g", &["p"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let nodes = chain(&mut cfg, &[body, ret]);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };
    let result = fixture.analyze();

    assert_eq!(result.variables().index_of("p"), Some(0));
    assert_eq!(
        result
            .escaped_locals()
            .names(&fixture.context)
            .collect::<Vec<_>>(),
        vec!["p"]
    );
    for node in nodes {
        assert!(!result.is_live_before(node, "p"));
        assert!(!result.is_live_after(node, "p"));
    }
}

#[test]
fn nested_arguments_belongs_to_the_nested_function() {
    // function f(p) { var g = function() { return arguments; }; return p; }
    let mut context = Context::default();
    let args = context.name("arguments");
    let inner_ret = context.return_stmt(Some(args));
    let inner_body = context.block(vec![inner_ret]);
    let inner = context.function("", &[], inner_body);
    let decl_g = context.var_decl("g", Some(inner));
    let p = context.name("p");
    let ret = context.return_stmt(Some(p));
    let body = context.block(vec![decl_g, ret]);
    let function = context.function("f", &["p"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let nodes = chain(&mut cfg, &[body, decl_g, ret]);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };
    let result = fixture.analyze();

    assert!(result.escaped_locals().is_empty());
    assert!(result.is_live_before(nodes[0], "p"));
    assert!(result.is_live_before(nodes[2], "p"));
    assert!(!result.is_live_after(nodes[1], "g"));
}

#[test]
fn declared_arguments_is_an_ordinary_local() {
    // function h(p) { var arguments = p; return arguments; }
    let mut context = Context::default();
    let p = context.name("p");
    let decl = context.var_decl("arguments", Some(p));
    let args = context.name("arguments");
    let ret = context.return_stmt(Some(args));
    let body = context.block(vec![decl, ret]);
    let function = context.function("h", &["p"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let nodes = chain(&mut cfg, &[decl, ret]);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };
    let result = fixture.analyze();

    assert!(result.escaped_locals().is_empty());
    assert_eq!(live_names(&result, result.live_in(nodes[0])), vec!["p"]);
    assert_eq!(
        live_names(&result, result.live_in(nodes[1])),
        vec!["arguments"]
    );
}

#[test]
fn loop_variable_is_both_generated_and_killed() {
    // function f(xs) { for (const x of xs) { use(x); } }
    let mut context = Context::default();
    let target = context.decl(NodeKind::Const, "x", None);
    let xs = context.name("xs");
    let callee = context.name("use");
    let x = context.name("x");
    let call = context.call(callee, vec![x]);
    let stmt = context.expr_result(call);
    let loop_body = context.block(vec![stmt]);
    let for_of = context.for_of(target, xs, loop_body);
    let body = context.block(vec![for_of]);
    let function = context.function("f", &["xs"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let n_body = cfg.add_node(body);
    let n_for_of = cfg.add_node(for_of);
    let n_loop_body = cfg.add_node(loop_body);
    let n_stmt = cfg.add_node(stmt);
    cfg.connect(n_body, Branch::Unconditional, n_for_of);
    cfg.connect(n_for_of, Branch::OnTrue, n_loop_body);
    cfg.connect(n_loop_body, Branch::Unconditional, n_stmt);
    cfg.connect(n_stmt, Branch::Unconditional, n_for_of);
    cfg.connect_to_implicit_return(n_for_of, Branch::OnFalse);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };

    let analysis = fixture.analysis();
    let x_index = analysis.variables().index_of("x").unwrap();
    let (gen, kill) = analysis.gen_kill_sets(n_for_of).unwrap();
    assert_eq!(gen, bit_field(2, &[x_index]));
    assert_eq!(kill, bit_field(2, &[x_index]));

    let result = analysis.analyze(MAX_STEPS).unwrap();
    assert!(result.is_live_before(n_stmt, "x"));
    assert!(result.is_live_before(n_for_of, "x"));
    assert!(!result.is_live_after(n_stmt, "xs"));
}

#[test]
fn loop_name_target_is_both_generated_and_killed() {
    // function f(x, o) { for (x in o) { use(x); } return x; }
    let mut context = Context::default();
    let target = context.name("x");
    let o = context.name("o");
    let callee = context.name("use");
    let x = context.name("x");
    let call = context.call(callee, vec![x]);
    let stmt = context.expr_result(call);
    let loop_body = context.block(vec![stmt]);
    let for_in = context.for_in(target, o, loop_body);
    let x_ret = context.name("x");
    let ret = context.return_stmt(Some(x_ret));
    let body = context.block(vec![for_in, ret]);
    let function = context.function("f", &["x", "o"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let n_body = cfg.add_node(body);
    let n_for_in = cfg.add_node(for_in);
    let n_loop_body = cfg.add_node(loop_body);
    let n_stmt = cfg.add_node(stmt);
    let n_ret = cfg.add_node(ret);
    cfg.connect(n_body, Branch::Unconditional, n_for_in);
    cfg.connect(n_for_in, Branch::OnTrue, n_loop_body);
    cfg.connect(n_for_in, Branch::OnFalse, n_ret);
    cfg.connect(n_loop_body, Branch::Unconditional, n_stmt);
    cfg.connect(n_stmt, Branch::Unconditional, n_for_in);
    cfg.connect_to_implicit_return(n_ret, Branch::Unconditional);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };

    let analysis = fixture.analysis();
    let x_index = analysis.variables().index_of("x").unwrap();
    let (gen, kill) = analysis.gen_kill_sets(n_for_in).unwrap();
    assert_eq!(gen, bit_field(2, &[x_index]));
    assert_eq!(kill, bit_field(2, &[x_index]));

    let result = analysis.analyze(MAX_STEPS).unwrap();
    assert!(result.is_live_before(n_stmt, "x"));
    assert!(result.is_live_before(n_for_in, "x"));
    assert!(result.is_live_before(n_body, "x"));
}

#[test]
fn loop_pattern_target_is_walked() {
    // function f(a, xs) { for ([a] of xs) {} }
    let mut context = Context::default();
    let target = context.array_pattern(&["a"]);
    let xs = context.name("xs");
    let loop_body = context.block(vec![]);
    let for_of = context.for_of(target, xs, loop_body);
    let body = context.block(vec![for_of]);
    let function = context.function("f", &["a", "xs"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let n_body = cfg.add_node(body);
    let n_for_of = cfg.add_node(for_of);
    let n_loop_body = cfg.add_node(loop_body);
    cfg.connect(n_body, Branch::Unconditional, n_for_of);
    cfg.connect(n_for_of, Branch::OnTrue, n_loop_body);
    cfg.connect(n_loop_body, Branch::Unconditional, n_for_of);
    cfg.connect_to_implicit_return(n_for_of, Branch::OnFalse);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };

    // The pattern is not a plain name, so its names are only read.
    let analysis = fixture.analysis();
    let a_index = analysis.variables().index_of("a").unwrap();
    let (gen, kill) = analysis.gen_kill_sets(n_for_of).unwrap();
    assert_eq!(gen, bit_field(2, &[a_index]));
    assert!(kill.is_clear());

    let result = analysis.analyze(MAX_STEPS).unwrap();
    assert!(result.is_live_before(n_body, "a"));
}

#[test]
fn short_circuited_assignment_does_not_kill() {
    // function f(b) { a && (b = 1); return b; }
    let mut context = Context::default();
    let a = context.name("a");
    let b = context.name("b");
    let one = context.number(1.0);
    let assign = context.assign(b, one);
    let and = context.and(a, assign);
    let stmt = context.expr_result(and);
    let b_ret = context.name("b");
    let ret = context.return_stmt(Some(b_ret));
    let body = context.block(vec![stmt, ret]);
    let function = context.function("f", &["b"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let nodes = chain(&mut cfg, &[stmt, ret]);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };

    let analysis = fixture.analysis();
    let (_, kill) = analysis.gen_kill_sets(nodes[0]).unwrap();
    assert!(kill.is_clear());
    let result = analysis.analyze(MAX_STEPS).unwrap();
    assert!(result.is_live_before(nodes[0], "b"));
}

#[test]
fn unconditional_assignment_kills() {
    // function f(b) { b = 1; return b; }
    let mut context = Context::default();
    let b = context.name("b");
    let one = context.number(1.0);
    let assign = context.assign(b, one);
    let stmt = context.expr_result(assign);
    let b_ret = context.name("b");
    let ret = context.return_stmt(Some(b_ret));
    let body = context.block(vec![stmt, ret]);
    let function = context.function("f", &["b"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let nodes = chain(&mut cfg, &[stmt, ret]);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };
    let result = fixture.analyze();

    assert!(!result.is_live_before(nodes[0], "b"));
    assert!(result.is_live_after(nodes[0], "b"));
}

#[test]
fn hook_branches_are_conditional() {
    // function h(a, b) { var r = a ? (b = 1) : 2; return b; }
    let mut context = Context::default();
    let a = context.name("a");
    let b = context.name("b");
    let one = context.number(1.0);
    let assign = context.assign(b, one);
    let two = context.number(2.0);
    let hook = context.hook(a, assign, two);
    let decl = context.var_decl("r", Some(hook));
    let b_ret = context.name("b");
    let ret = context.return_stmt(Some(b_ret));
    let body = context.block(vec![decl, ret]);
    let function = context.function("h", &["a", "b"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let nodes = chain(&mut cfg, &[decl, ret]);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };
    let result = fixture.analyze();

    assert_eq!(live_names(&result, result.live_in(nodes[0])), vec!["a", "b"]);
    assert_eq!(live_names(&result, result.live_out(nodes[0])), vec!["b"]);
    assert!(!result.is_live_after(nodes[0], "r"));
}

#[test]
fn exceptional_exit_suppresses_kill() {
    // function t(y) { try { y = compute(); } catch (e) {} return y; }
    let mut context = Context::default();
    let y = context.name("y");
    let compute = context.name("compute");
    let call = context.call(compute, vec![]);
    let assign = context.assign(y, call);
    let stmt = context.expr_result(assign);
    let try_block = context.block(vec![stmt]);
    let catch_block = context.block(vec![]);
    let try_stmt = context.try_catch(try_block, "e", catch_block, None);
    let catch = try_stmt.child(&context, 1).unwrap();
    let y_ret = context.name("y");
    let ret = context.return_stmt(Some(y_ret));
    let body = context.block(vec![try_stmt, ret]);
    let function = context.function("t", &["y"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let n_body = cfg.add_node(body);
    let n_try = cfg.add_node(try_stmt);
    let n_try_block = cfg.add_node(try_block);
    let n_stmt = cfg.add_node(stmt);
    let n_catch = cfg.add_node(catch);
    let n_catch_block = cfg.add_node(catch_block);
    let n_ret = cfg.add_node(ret);
    cfg.connect(n_body, Branch::Unconditional, n_try);
    cfg.connect(n_try, Branch::Unconditional, n_try_block);
    cfg.connect(n_try_block, Branch::Unconditional, n_stmt);
    cfg.connect(n_stmt, Branch::Unconditional, n_ret);
    cfg.connect(n_stmt, Branch::OnEx, n_catch);
    cfg.connect(n_catch, Branch::Unconditional, n_catch_block);
    cfg.connect(n_catch_block, Branch::Unconditional, n_ret);
    cfg.connect_to_implicit_return(n_ret, Branch::Unconditional);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };

    let analysis = fixture.analysis();
    let (_, kill) = analysis.gen_kill_sets(n_stmt).unwrap();
    assert!(kill.is_clear());

    let result = analysis.analyze(MAX_STEPS).unwrap();
    assert!(result.is_live_before(n_stmt, "y"));
    assert!(result.is_live_before(n_body, "y"));
    // Catch bindings escape.
    assert!(!result.is_live_before(n_catch, "e"));
    assert_eq!(
        result
            .escaped_locals()
            .names(&fixture.context)
            .collect::<Vec<_>>(),
        vec!["e"]
    );
}

#[test]
fn compound_assignment_reads_its_target() {
    // function k(x) { x += 1; return x; }
    let mut context = Context::default();
    let x = context.name("x");
    let one = context.number(1.0);
    let assign = context.assign_op(AssignOp::Add, x, one);
    let stmt = context.expr_result(assign);
    let x_ret = context.name("x");
    let ret = context.return_stmt(Some(x_ret));
    let body = context.block(vec![stmt, ret]);
    let function = context.function("k", &["x"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let nodes = chain(&mut cfg, &[stmt, ret]);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };

    let analysis = fixture.analysis();
    let (gen, kill) = analysis.gen_kill_sets(nodes[0]).unwrap();
    assert_eq!(gen, bit_field(1, &[0]));
    assert_eq!(kill, bit_field(1, &[0]));
    let result = analysis.analyze(MAX_STEPS).unwrap();
    assert!(result.is_live_before(nodes[0], "x"));
}

#[test]
fn liveness_flows_around_loops() {
    // function w(i) { while (i) { i = i - 1; } return 0; }
    let mut context = Context::default();
    let cond = context.name("i");
    let target = context.name("i");
    let operand = context.name("i");
    let one = context.number(1.0);
    let sub = context.binary(BinaryOp::Sub, operand, one);
    let assign = context.assign(target, sub);
    let stmt = context.expr_result(assign);
    let loop_body = context.block(vec![stmt]);
    let while_loop = context.while_loop(cond, loop_body);
    let zero = context.number(0.0);
    let ret = context.return_stmt(Some(zero));
    let body = context.block(vec![while_loop, ret]);
    let function = context.function("w", &["i"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let n_body = cfg.add_node(body);
    let n_while = cfg.add_node(while_loop);
    let n_loop_body = cfg.add_node(loop_body);
    let n_stmt = cfg.add_node(stmt);
    let n_ret = cfg.add_node(ret);
    cfg.connect(n_body, Branch::Unconditional, n_while);
    cfg.connect(n_while, Branch::OnTrue, n_loop_body);
    cfg.connect(n_loop_body, Branch::Unconditional, n_stmt);
    cfg.connect(n_stmt, Branch::Unconditional, n_while);
    cfg.connect(n_while, Branch::OnFalse, n_ret);
    cfg.connect_to_implicit_return(n_ret, Branch::Unconditional);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };
    let result = fixture.analyze();

    assert!(result.is_live_after(n_stmt, "i"));
    assert!(result.is_live_before(n_stmt, "i"));
    assert!(result.is_live_before(n_while, "i"));
    assert!(result.is_live_before(n_body, "i"));
    assert!(!result.is_live_before(n_ret, "i"));
}

#[test]
fn captured_variables_are_never_live() {
    // function c(x) { var g = function() { return x; }; x = 1; return g(); }
    let mut context = Context::default();
    let x_ref = context.name("x");
    let inner_ret = context.return_stmt(Some(x_ref));
    let inner_body = context.block(vec![inner_ret]);
    let inner = context.function("", &[], inner_body);
    let decl_g = context.var_decl("g", Some(inner));
    let x = context.name("x");
    let one = context.number(1.0);
    let assign = context.assign(x, one);
    let stmt = context.expr_result(assign);
    let g_ref = context.name("g");
    let call = context.call(g_ref, vec![]);
    let ret = context.return_stmt(Some(call));
    let body = context.block(vec![decl_g, stmt, ret]);
    let function = context.function("c", &["x"], body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    let nodes = chain(&mut cfg, &[body, decl_g, stmt, ret]);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };
    let result = fixture.analyze();

    let x_index = result.variables().index_of("x").unwrap();
    for (_, state) in result.iter() {
        assert!(!state.entry.is_live(x_index));
        assert!(!state.exit.is_live(x_index));
    }
    assert!(result.is_live_after(nodes[1], "g"));
    assert!(result.is_live_before(nodes[3], "g"));
}

#[test]
fn too_many_variables() {
    let mut context = Context::default();
    let names = (0..=100).map(|i| format!("p{i}")).collect::<Vec<_>>();
    let params = names.iter().map(String::as_str).collect::<Vec<_>>();
    let body = context.block(vec![]);
    let function = context.function("big", &params, body);
    prepare(&mut context, function);

    let mut cfg = ControlFlowGraph::default();
    chain(&mut cfg, &[body]);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };

    assert_eq!(
        fixture.analysis_with(&AnalysisConfig::default()).err(),
        Some(AnalysisError::TooManyVariables {
            count: 101,
            max: 100
        })
    );
    let relaxed = AnalysisConfig {
        max_variables: 101,
        ..Default::default()
    };
    assert!(fixture.analysis_with(&relaxed).is_ok());
}

#[test]
fn preconditions_are_checked() {
    let mut context = Context::default();
    let a = context.name("a");
    let ret = context.return_stmt(Some(a));
    let body = context.block(vec![ret]);
    let function = context.function("f", &["a"], body);
    let script = context.script(vec![function]);
    ScopeCreator::create_scopes(&mut context, script).unwrap();

    let mut cfg = ControlFlowGraph::default();
    chain(&mut cfg, &[ret]);
    let (function_scope, body_scope) = function_scopes(&context, function).unwrap();
    let config = AnalysisConfig::default();
    let analysis = |context: &Context, function_scope, body_scope| {
        LiveVariablesAnalysis::new(
            context,
            &cfg,
            function_scope,
            body_scope,
            Default::default(),
            &config,
        )
        .err()
    };

    assert_eq!(
        analysis(&context, function_scope, body_scope),
        Some(AnalysisError::NotNormalized)
    );

    context.mark_normalized();
    assert_eq!(
        analysis(&context, body_scope, body_scope),
        Some(AnalysisError::NotAFunctionScope {
            found: ScopeKind::FunctionBlock
        })
    );
    assert_eq!(
        analysis(&context, function_scope, function_scope),
        Some(AnalysisError::NotAFunctionBlockScope {
            found: ScopeKind::Function
        })
    );
    assert_eq!(analysis(&context, function_scope, body_scope), None);
}

#[test]
fn destructuring_is_rejected() {
    let mut context = Context::default();
    let body = context.block(vec![]);
    let function = context.function("f", &[], body);
    prepare(&mut context, function);

    // Never seen by the scope creator, only by the analysis.
    let pattern = context.array_pattern(&["q"]);
    let decl = Node::new(&mut context, NodeKind::Var, vec![pattern]);

    let mut cfg = ControlFlowGraph::default();
    chain(&mut cfg, &[body, decl]);
    let fixture = Fixture {
        context,
        function,
        cfg,
    };
    assert_eq!(
        fixture.analysis_with(&AnalysisConfig::default()).err(),
        Some(AnalysisError::ExpectedName {
            found: "ARRAY_PATTERN".to_owned()
        })
    );
}

#[test]
fn pass_manager_pipeline() {
    let d = diamond();
    let Fixture {
        context,
        function,
        cfg,
    } = d.fixture;

    let mut pm = PassManager::new(AnalysisConfig::default());
    register_known_passes(&mut pm);
    pm.add_control_flow_graph(function, cfg);
    pm.run(
        &context,
        function,
        &PassManagerConfig {
            to_run: vec![LIVE_VARIABLES_NAME.to_owned()],
        },
    )
    .unwrap();

    let analyses = pm.analyses();
    let result: &LiveVariablesResult = analyses.get_analysis_result(function).unwrap();
    assert!(result.is_live_before(d.n_if, "b"));

    let cfg: &ControlFlowGraph = analyses.get_analysis_result(function).unwrap();
    let printed = print_live_variables(&context, "f", cfg, result);
    assert_eq!(
        printed,
        "Live variables for f [a, b]:\n\
         \tescaped: none\n\
         \tn0 IMPLICIT_RETURN: in {} out {}\n\
         \tn1 BLOCK: in {a} out {a}\n\
         \tn2 VAR: in {a} out {b}\n\
         \tn3 IF: in {b} out {b}\n\
         \tn4 BLOCK: in {} out {}\n\
         \tn5 EXPR_RESULT: in {} out {b}\n\
         \tn6 RETURN: in {b} out {}\n"
    );
}
