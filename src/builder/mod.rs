//! Build configuration, stage dispatch, and artifact export.

pub mod config;
pub mod engine;
pub mod errors;
pub mod export;
pub mod ide;
pub mod stage;

pub use config::BuildConfig;
pub use engine::ExternalBuilder;
pub use errors::BuildError;
pub use export::{export_artifacts, ExportPlan};
pub use stage::{dispatch, BuildEngine, BuildMode, CancelToken, OutputSinks, StageResult};
