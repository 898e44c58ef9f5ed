// These errors flag violated preconditions: input the analysis is not defined for, handed over by
// an earlier compiler stage.  None of them is recoverable; the analysis of the function is
// abandoned and the error surfaced to whoever invoked it.
use jsflow_ast::{AstError, ScopeKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Live variable analysis requires a normalized program.")]
    NotNormalized,
    #[error("Expected a function scope, found a {found} scope.")]
    NotAFunctionScope { found: ScopeKind },
    #[error("Expected a function block scope, found a {found} scope.")]
    NotAFunctionBlockScope { found: ScopeKind },
    #[error("Expected a NAME node, found {found}.")]
    ExpectedName { found: String },
    #[error("Function declares {count} variables, at most {max} can be analyzed.")]
    TooManyVariables { count: usize, max: usize },
    #[error("Dataflow analysis did not converge within {max_steps} steps.")]
    MaxStepsExceeded { max_steps: usize },
    #[error("No scopes have been created for function \"{function}\".")]
    MissingScope { function: String },
    #[error("Analysis result {analysis} unavailable for function.")]
    MissingAnalysis { analysis: &'static str },
    #[error("Unregistered pass \"{0}\".")]
    UnregisteredPass(String),
    #[error(transparent)]
    Ast(#[from] AstError),
}
