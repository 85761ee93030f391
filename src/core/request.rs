//! Compile request - the caller's description of one compilation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies a package-manager instance.
pub type InstanceId = u32;

/// Compiler warnings level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningsLevel {
    #[default]
    None,
    Default,
    More,
    All,
}

impl WarningsLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningsLevel::None => "none",
            WarningsLevel::Default => "default",
            WarningsLevel::More => "more",
            WarningsLevel::All => "all",
        }
    }
}

impl fmt::Display for WarningsLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WarningsLevel {
    type Err = WarningsLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(WarningsLevel::None),
            "default" => Ok(WarningsLevel::Default),
            "more" => Ok(WarningsLevel::More),
            "all" => Ok(WarningsLevel::All),
            _ => Err(WarningsLevelParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid warnings level.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid warnings level '{0}', valid values: none, default, more, all")]
pub struct WarningsLevelParseError(pub String);

/// A request to compile one sketch for one board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileRequest {
    /// Package-manager instance to resolve boards against
    pub instance: InstanceId,

    /// Board identifier
    pub board: String,

    /// Deprecated alias of `board`, still honored for old clients
    pub fqbn: String,

    /// Sketch directory or main file
    pub sketch_path: PathBuf,

    /// Explicit build directory
    pub build_path: Option<PathBuf>,

    /// Explicit build cache directory
    pub build_cache_path: Option<PathBuf>,

    /// Explicit export file; its directory receives the artifacts
    pub export_file: Option<PathBuf>,

    /// Additional library search paths
    pub libraries: Vec<PathBuf>,

    /// Custom `key=value` build properties
    pub build_properties: Vec<String>,

    /// Dump build properties instead of building
    pub show_properties: bool,

    /// Only run the preprocessor
    pub preprocess: bool,

    /// Build but do not export artifacts
    pub dry_run: bool,

    pub verbose: bool,
    pub quiet: bool,
    pub optimize_for_debug: bool,
    pub warnings: WarningsLevel,

    /// Parallel jobs; 0 lets the engine decide
    pub jobs: u32,

    /// USB `VID_PID` filter
    pub vid_pid: String,
}

impl CompileRequest {
    /// Create a request for a sketch.
    pub fn new(sketch_path: impl Into<PathBuf>) -> Self {
        CompileRequest {
            sketch_path: sketch_path.into(),
            ..Default::default()
        }
    }

    /// Set the board identifier.
    pub fn with_board(mut self, board: impl Into<String>) -> Self {
        self.board = board.into();
        self
    }

    /// Set the deprecated FQBN field.
    pub fn with_fqbn(mut self, fqbn: impl Into<String>) -> Self {
        self.fqbn = fqbn.into();
        self
    }

    /// Set the package-manager instance.
    pub fn with_instance(mut self, instance: InstanceId) -> Self {
        self.instance = instance;
        self
    }
}
