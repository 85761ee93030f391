//! High-level operations.

pub mod compile;
pub mod instances;

pub use compile::{CompileError, CompileResponse, Compiler};
pub use instances::Instances;
