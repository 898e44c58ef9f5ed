use std::any::{type_name, TypeId};

use downcast_rs::{impl_downcast, Downcast};
use indexmap::map::Entry;
use jsflow_ast::{Context, FxIndexMap, Node};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    create_escaped_locals_pass, create_live_variables_pass, AnalysisConfig, AnalysisError,
    ControlFlowGraph,
};

/// Result of an analysis. Specific result must be downcasted to.
pub trait AnalysisResultT: Downcast {}
impl_downcast!(AnalysisResultT);
pub type AnalysisResult = Box<dyn AnalysisResultT>;

/// An analysis of one function, given the results of the passes it depends on.
pub type AnalysisRunner =
    fn(&Context, &AnalysisConfig, &AnalysisResults, Node) -> Result<AnalysisResult, AnalysisError>;

pub struct Pass {
    /// Pass identifier.
    pub name: &'static str,
    /// A short description.
    pub descr: &'static str,
    /// Passes whose results this pass reads.  They are run first.
    pub deps: Vec<&'static str>,
    pub runner: AnalysisRunner,
}

#[derive(Default)]
pub struct AnalysisResults {
    // Hash from (AnalysisResultT, function) to an actual result.
    results: FxHashMap<(TypeId, Node), AnalysisResult>,
}

impl AnalysisResults {
    /// Get the results of an analysis.
    /// Example analyses.get_analysis_result::<LiveVariablesResult>(foo).
    pub fn get_analysis_result<T: AnalysisResultT>(
        &self,
        function: Node,
    ) -> Result<&T, AnalysisError> {
        self.results
            .get(&(TypeId::of::<T>(), function))
            .and_then(|result| result.downcast_ref())
            .ok_or(AnalysisError::MissingAnalysis {
                analysis: type_name::<T>(),
            })
    }

    /// Add a new result, replacing any earlier result of the same type.
    pub fn add_result(&mut self, function: Node, result: AnalysisResult) {
        self.results.insert(((*result).type_id(), function), result);
    }
}

#[derive(Default)]
pub struct PassManager {
    passes: FxIndexMap<&'static str, Pass>,
    analyses: AnalysisResults,
    config: AnalysisConfig,
    // Passes already run, per function.
    completed: FxHashSet<(&'static str, Node)>,
}

impl PassManager {
    pub fn new(config: AnalysisConfig) -> Self {
        PassManager {
            config,
            ..Default::default()
        }
    }

    /// Register a pass. Should be called only once for each pass.
    pub fn register(&mut self, pass: Pass) -> &'static str {
        let pass_name = pass.name;
        match self.passes.entry(pass.name) {
            Entry::Occupied(_) => {
                panic!("Trying to register an already registered pass");
            }
            Entry::Vacant(entry) => {
                entry.insert(pass);
            }
        }
        pass_name
    }

    /// Supply the control-flow graph of `function`.  CFG construction happens before any of the
    /// passes here run.
    pub fn add_control_flow_graph(&mut self, function: Node, cfg: ControlFlowGraph) {
        self.analyses.add_result(function, Box::new(cfg));
    }

    /// Run the passes specified in `config` on `function`, each after its dependencies.  A pass
    /// runs at most once per function.
    pub fn run(
        &mut self,
        context: &Context,
        function: Node,
        config: &PassManagerConfig,
    ) -> Result<(), AnalysisError> {
        for pass in &config.to_run {
            self.run_pass(context, function, pass)?;
        }
        Ok(())
    }

    fn run_pass(
        &mut self,
        context: &Context,
        function: Node,
        name: &str,
    ) -> Result<(), AnalysisError> {
        let pass = self
            .passes
            .get(name)
            .ok_or_else(|| AnalysisError::UnregisteredPass(name.to_owned()))?;
        let (pass_name, deps, runner) = (pass.name, pass.deps.clone(), pass.runner);
        if self.completed.contains(&(pass_name, function)) {
            return Ok(());
        }
        for dep in deps {
            self.run_pass(context, function, dep)?;
        }

        tracing::debug!(pass = pass_name, "running analysis");
        let result = runner(context, &self.config, &self.analyses, function)?;
        self.analyses.add_result(function, result);
        self.completed.insert((pass_name, function));
        Ok(())
    }

    pub fn analyses(&self) -> &AnalysisResults {
        &self.analyses
    }

    /// Is `name` a registered pass?
    pub fn is_registered(&self, name: &str) -> bool {
        self.passes.contains_key(name)
    }

    pub fn help_text(&self) -> String {
        let summary = self
            .passes
            .iter()
            .map(|(name, pass)| format!("  {name:16} - {}", pass.descr))
            .collect::<Vec<_>>()
            .join("\n");

        format!("Valid pass names are:\n\n{summary}",)
    }
}

/// Configuration for the pass manager to run passes.
pub struct PassManagerConfig {
    pub to_run: Vec<String>,
}

pub fn register_known_passes(pm: &mut PassManager) {
    pm.register(create_escaped_locals_pass());
    pm.register(create_live_variables_pass());
}
