//! Print live variable results in a human readable form.

use std::fmt::Write;

use itertools::Itertools;
use jsflow_ast::Context;

use crate::{BitField, CfgNode, ControlFlowGraph, LiveVariablesResult, VariableIndex};

/// Print the live sets before and after every CFG node of `func_name`.
///
/// ```text
/// Live variables for f [a, b]:
///     escaped: none
///     n1 VAR: in {a} out {b}
/// ```
pub fn print_live_variables(
    context: &Context,
    func_name: &str,
    cfg: &ControlFlowGraph,
    live: &LiveVariablesResult,
) -> String {
    let variables = live.variables();
    let mut res = format!(
        "Live variables for {func_name} [{}]:\n",
        variables.iter().map(|(_, name, _)| name).join(", ")
    );

    let escaped = live.escaped_locals();
    let escaped = if escaped.is_empty() {
        "none".to_owned()
    } else {
        escaped.names(context).join(", ")
    };
    let _ = writeln!(res, "\tescaped: {escaped}");

    for idx in cfg.node_indices() {
        let label = match cfg.node(idx) {
            CfgNode::Ast(node) => node.kind(context).to_string(),
            CfgNode::ImplicitReturn => "IMPLICIT_RETURN".to_owned(),
        };
        let _ = writeln!(
            res,
            "\tn{} {label}: in {} out {}",
            idx.index(),
            name_set(variables, live.live_in(idx).live_set()),
            name_set(variables, live.live_out(idx).live_set()),
        );
    }
    res
}

fn name_set(variables: &VariableIndex, set: &BitField) -> String {
    format!(
        "{{{}}}",
        set.iter_ones()
            .filter_map(|index| variables.name(index))
            .join(", ")
    )
}
