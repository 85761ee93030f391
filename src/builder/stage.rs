//! Build stages and their dispatch.
//!
//! The build engine is opaque: it exposes three stage operations and this
//! module only decides which one runs.

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;

use crate::builder::config::BuildConfig;
use crate::core::PropertyMap;

/// Which stage a compile runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Dump the resolved build properties
    ShowProperties,
    /// Run the preprocessor only
    Preprocess,
    /// Compile and link
    FullBuild,
}

impl BuildMode {
    /// Choose the mode from the request flags.
    ///
    /// `show_properties` wins over `preprocess` when both are set.
    pub fn select(show_properties: bool, preprocess: bool) -> Self {
        if show_properties {
            BuildMode::ShowProperties
        } else if preprocess {
            BuildMode::Preprocess
        } else {
            BuildMode::FullBuild
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::ShowProperties => write!(f, "show-properties"),
            BuildMode::Preprocess => write!(f, "preprocess"),
            BuildMode::FullBuild => write!(f, "build"),
        }
    }
}

/// Outcome of a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    /// The stage produces no artifacts
    Empty,
    /// Properties of a completed full build
    Built(PropertyMap),
}

/// Caller-owned progress sinks. Written to, never closed.
pub struct OutputSinks<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

impl<'a> OutputSinks<'a> {
    pub fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        OutputSinks { out, err }
    }
}

/// Shared cancellation flag, honored by the build engine.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// The build engine's stage operations.
pub trait BuildEngine {
    /// Print the build properties the configuration resolves to.
    fn show_properties(
        &self,
        config: &BuildConfig,
        sinks: &mut OutputSinks<'_>,
        cancel: &CancelToken,
    ) -> Result<()>;

    /// Run the sketch preprocessor.
    fn preprocess(
        &self,
        config: &BuildConfig,
        sinks: &mut OutputSinks<'_>,
        cancel: &CancelToken,
    ) -> Result<()>;

    /// Compile and link, returning the build's properties.
    fn full_build(
        &self,
        config: &BuildConfig,
        sinks: &mut OutputSinks<'_>,
        cancel: &CancelToken,
    ) -> Result<PropertyMap>;
}

/// Run exactly one stage. Stage errors are returned as-is.
pub fn dispatch(
    engine: &dyn BuildEngine,
    config: &BuildConfig,
    mode: BuildMode,
    sinks: &mut OutputSinks<'_>,
    cancel: &CancelToken,
) -> Result<StageResult> {
    tracing::debug!("running {} stage", mode);
    match mode {
        BuildMode::ShowProperties => {
            engine.show_properties(config, sinks, cancel)?;
            Ok(StageResult::Empty)
        }
        BuildMode::Preprocess => {
            engine.preprocess(config, sinks, cancel)?;
            Ok(StageResult::Empty)
        }
        BuildMode::FullBuild => engine.full_build(config, sinks, cancel).map(StageResult::Built),
    }
}
