pub mod dataflow;
pub use dataflow::*;
pub mod escaped_locals;
pub use escaped_locals::*;
pub mod postorder;
pub use postorder::*;
pub mod variables;
pub use variables::*;
