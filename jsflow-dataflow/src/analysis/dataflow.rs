//! A generic worklist solver for dataflow equations over a [`ControlFlowGraph`].
//!
//! An analysis supplies a lattice, a join and a per-node flow function; the solver attaches a
//! [`FlowState`] to every node and iterates until no state changes.  Both directions are
//! supported.  For a backward analysis a node's exit state is the join of its successors' entry
//! states and its entry state is the flow function applied to its exit state; forward analyses
//! swap the roles.

pub mod bit_field;
pub use bit_field::*;
pub mod live_variables;
pub use live_variables::*;

use std::{collections::BTreeSet, fmt};

use petgraph::graph::NodeIndex;

use crate::{compute_post_order, AnalysisError, ControlFlowGraph};

/// Upper bound on the worklist steps of a single solve.  Hitting it means the lattice or the flow
/// function is broken, not that the function is too large.
pub const MAX_STEPS: usize = 200_000;

/// Flow of the data for a specific analysis.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DataFlowDirection {
    Forward,
    Backward,
}

/// A value of a finite lattice.  Equality is what the solver uses to detect a fixpoint.
pub trait LatticeElement: Clone + PartialEq + fmt::Debug {}

/// The lattice values attached to a CFG node, before and after it executes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowState<L> {
    pub entry: L,
    pub exit: L,
}

pub trait DataFlowAnalysis {
    type Lattice: LatticeElement;

    fn direction(&self) -> DataFlowDirection;

    /// The value at the boundary: the entry of the entry node for forward analyses, the exit of
    /// the implicit return for backward ones.
    fn create_entry_lattice(&self) -> Self::Lattice;

    /// The value every other state starts out with.  Must be the lattice bottom.
    fn create_initial_estimate_lattice(&self) -> Self::Lattice;

    /// Combine the states flowing in from several neighbours.  Must be idempotent, commutative
    /// and associative.
    fn join(&self, inputs: &[&Self::Lattice]) -> Self::Lattice;

    /// Compute the state on the far side of `node` from the state on the near side.  Must be
    /// monotone.
    fn flow_through(
        &self,
        cfg: &ControlFlowGraph,
        node: NodeIndex,
        input: &Self::Lattice,
    ) -> Result<Self::Lattice, AnalysisError>;
}

/// The fixpoint computed by [`solve_dataflow_equations`], one [`FlowState`] per CFG node.
#[derive(Clone, Debug)]
pub struct DataFlowResults<L> {
    states: Vec<FlowState<L>>,
    steps: usize,
}

impl<L> DataFlowResults<L> {
    pub fn state(&self, node: NodeIndex) -> &FlowState<L> {
        &self.states[node.index()]
    }

    pub fn entry(&self, node: NodeIndex) -> &L {
        &self.state(node).entry
    }

    pub fn exit(&self, node: NodeIndex) -> &L {
        &self.state(node).exit
    }

    /// Number of worklist steps it took to converge.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &FlowState<L>)> {
        self.states
            .iter()
            .enumerate()
            .map(|(idx, state)| (NodeIndex::new(idx), state))
    }
}

/// A basic worklist based dataflow equation solver.
///
/// Every node, reachable or not, is evaluated at least once.  The worklist is prioritized so that
/// backward analyses visit nodes in post-order and forward analyses in reverse post-order, which
/// keeps the number of re-visits low.  Fails with [`AnalysisError::MaxStepsExceeded`] if more than
/// `max_steps` nodes are visited.
pub fn solve_dataflow_equations<A: DataFlowAnalysis>(
    analysis: &A,
    cfg: &ControlFlowGraph,
    max_steps: usize,
) -> Result<DataFlowResults<A::Lattice>, AnalysisError> {
    let direction = analysis.direction();
    let num_nodes = cfg.node_count();

    let initial = analysis.create_initial_estimate_lattice();
    let mut states = (0..num_nodes)
        .map(|_| FlowState {
            entry: initial.clone(),
            exit: initial.clone(),
        })
        .collect::<Vec<_>>();

    let boundary = match direction {
        DataFlowDirection::Forward => {
            let entry = cfg.entry();
            states[entry.index()].entry = analysis.create_entry_lattice();
            entry
        }
        DataFlowDirection::Backward => {
            let implicit_return = cfg.implicit_return();
            states[implicit_return.index()].exit = analysis.create_entry_lattice();
            implicit_return
        }
    };

    let (post_order, num_reachable) = compute_post_order(cfg);
    let priority_to_node = post_order.worklist_order(direction, num_reachable);
    let mut node_to_priority = vec![0; num_nodes];
    for (priority, node) in priority_to_node.iter().enumerate() {
        node_to_priority[node.index()] = priority;
    }

    let mut worklist = (0..num_nodes).collect::<BTreeSet<usize>>();
    let mut steps = 0;
    while let Some(priority) = worklist.pop_first() {
        steps += 1;
        if steps > max_steps {
            tracing::warn!(max_steps, "dataflow analysis did not converge");
            return Err(AnalysisError::MaxStepsExceeded { max_steps });
        }

        let node = priority_to_node[priority];
        let idx = node.index();
        let changed = match direction {
            DataFlowDirection::Backward => {
                if node != boundary {
                    let succs = cfg.successors(node).collect::<Vec<_>>();
                    if let Some(joined) = join_states(analysis, &states, &succs, |s| &s.entry) {
                        states[idx].exit = joined;
                    }
                }
                let new_entry = analysis.flow_through(cfg, node, &states[idx].exit)?;
                let changed = new_entry != states[idx].entry;
                states[idx].entry = new_entry;
                changed
            }
            DataFlowDirection::Forward => {
                if node != boundary {
                    let preds = cfg.predecessors(node).collect::<Vec<_>>();
                    if let Some(joined) = join_states(analysis, &states, &preds, |s| &s.exit) {
                        states[idx].entry = joined;
                    }
                }
                let new_exit = analysis.flow_through(cfg, node, &states[idx].entry)?;
                let changed = new_exit != states[idx].exit;
                states[idx].exit = new_exit;
                changed
            }
        };

        if changed {
            tracing::trace!(node = idx, state = ?states[idx], "flow state changed");
            let dependents = match direction {
                DataFlowDirection::Backward => cfg.predecessors(node).collect::<Vec<_>>(),
                DataFlowDirection::Forward => cfg.successors(node).collect::<Vec<_>>(),
            };
            worklist.extend(dependents.iter().map(|dep| node_to_priority[dep.index()]));
        }
    }

    tracing::debug!(steps, nodes = num_nodes, "dataflow analysis converged");
    Ok(DataFlowResults { states, steps })
}

// Join the states of `neighbours`, or `None` if there are none and the state should be left as is.
fn join_states<A: DataFlowAnalysis>(
    analysis: &A,
    states: &[FlowState<A::Lattice>],
    neighbours: &[NodeIndex],
    side: impl Fn(&FlowState<A::Lattice>) -> &A::Lattice,
) -> Option<A::Lattice> {
    match neighbours {
        [] => None,
        [single] => Some(side(&states[single.index()]).clone()),
        _ => {
            let inputs = neighbours
                .iter()
                .map(|n| side(&states[n.index()]))
                .collect::<Vec<_>>();
            Some(analysis.join(&inputs))
        }
    }
}
