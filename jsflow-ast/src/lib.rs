//! The syntax and scope model that jsflow analyses consume.
//!
//! Everything hangs off a [`Context`]: AST nodes, lexical scopes and the variables they declare
//! are stored in arenas there and referred to by small `Copy` handles.

pub mod builder;
pub mod context;
pub use context::*;
pub mod error;
pub use error::*;
pub mod node;
pub use node::*;
pub mod node_util;
pub mod scope;
pub use scope::*;
pub mod scope_creator;
pub use scope_creator::*;

use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;
pub type FxIndexSet<K> = indexmap::IndexSet<K, BuildHasherDefault<FxHasher>>;
