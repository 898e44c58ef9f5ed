//! Dataflow analyses over the control-flow graph of a single function.
//!
//! The crate provides a generic fixpoint solver ([`solve_dataflow_equations`]) and, built on top
//! of it, a backward live variable analysis ([`LiveVariablesAnalysis`]) whose results feed dead
//! assignment elimination and variable slot sharing.  Analyses are normally driven through the
//! [`PassManager`].

pub mod analysis;
pub use analysis::*;
pub mod cfg;
pub use cfg::*;
pub mod config;
pub use config::*;
pub mod error;
pub use error::*;
pub mod pass_manager;
pub use pass_manager::*;
pub mod printer;
pub use printer::*;
