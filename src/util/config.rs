//! Configuration file support for sketchbuild.
//!
//! Two configuration file locations are read:
//! - Global: `~/.sketchbuild/config.toml` - User-wide defaults
//! - Project: `.sketchbuild/config.toml` - Directory-local overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::WarningsLevel;

/// Default name of the external build engine executable.
pub const DEFAULT_BUILDER_PROGRAM: &str = "sketch-builder";

/// sketchbuild configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory layout
    pub directories: DirectoriesConfig,

    /// Build defaults
    pub build: BuildDefaults,

    /// External build engine
    pub builder: BuilderConfig,
}

/// Directory settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoriesConfig {
    /// Package data root (`<data>/packages`, `<data>/preferences.txt`)
    pub data: Option<PathBuf>,

    /// Sketchbook (`<user>/hardware`, `<user>/libraries`)
    pub user: Option<PathBuf>,

    /// Bundled tool directories
    #[serde(default)]
    pub builtin_tools: Vec<PathBuf>,
}

/// Build-related defaults, used when the command line leaves them unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildDefaults {
    /// Default number of parallel jobs
    pub jobs: Option<u32>,

    /// Default warnings level
    pub warnings: Option<WarningsLevel>,
}

/// External build engine settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Builder executable name or path
    pub program: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.directories.data.is_some() {
            self.directories.data = other.directories.data;
        }
        if other.directories.user.is_some() {
            self.directories.user = other.directories.user;
        }
        if !other.directories.builtin_tools.is_empty() {
            self.directories.builtin_tools = other.directories.builtin_tools;
        }

        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.warnings.is_some() {
            self.build.warnings = other.build.warnings;
        }

        if other.builder.program.is_some() {
            self.builder.program = other.builder.program;
        }
    }

    /// The configured builder program, or the default name.
    pub fn builder_program(&self) -> PathBuf {
        self.builder
            .program
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILDER_PROGRAM))
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.sketchbuild/config.toml)
/// 2. Global config (~/.sketchbuild/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global sketchbuild directory (~/.sketchbuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".sketchbuild"))
}
