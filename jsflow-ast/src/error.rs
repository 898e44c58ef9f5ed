// Errors raised while building scopes over an AST.  These are not user diagnostics; they flag
// input that violates the shape or normalization the model expects.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    #[error("Name \"{name}\" is declared more than once in the same scope.")]
    DuplicateDeclaration { name: String },
    #[error("Malformed {kind} node: expected {expected}.")]
    MalformedNode {
        kind: String,
        expected: &'static str,
    },
    #[error("Scope creation must start at a SCRIPT or FUNCTION node, found {found}.")]
    InvalidScopeRoot { found: String },
}
