//! sketchbuild - compile orchestration and artifact export for sketches
//!
//! A compile request names a sketch and a board. The board is resolved
//! against a package index, an immutable build configuration is assembled,
//! one build stage runs on an external engine, and after a full build the
//! firmware is copied out under a stable name.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and fakes for sketchbuild unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{CompileRequest, Fqbn, PropertyMap, ResolvedBoard, Sketch};
pub use builder::{BuildConfig, BuildEngine, BuildMode, CancelToken, ExportPlan, StageResult};
pub use ops::{CompileError, CompileResponse, Compiler, Instances};
pub use util::context::GlobalContext;
