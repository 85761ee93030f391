//! Global context for sketchbuild operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_dir, load_config, Config};

/// Name of the shared core-object cache under the system temp directory.
pub const CORE_CACHE_DIR_NAME: &str = "sketchbuild-core-cache";

/// Process-wide directory settings handed to the build configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentDirs {
    /// Hardware platform search directories
    pub hardware_dirs: Vec<PathBuf>,

    /// Bundled tool directories
    pub builtin_tools_dirs: Vec<PathBuf>,

    /// Default user library directory
    pub libraries_dir: PathBuf,

    /// Package data directory, where IDE preferences may live
    pub data_dir: PathBuf,

    /// Core-object cache shared by every build on this machine
    pub core_cache_dir: PathBuf,
}

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global sketchbuild data (~/.sketchbuild/)
    home: PathBuf,

    /// Merged configuration
    config: Config,

    /// Whether to use verbose output
    verbose: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext, loading global and project configuration.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = global_config_dir().unwrap_or_else(|| PathBuf::from(".sketchbuild"));
        let config = load_config(
            &home.join("config.toml"),
            &cwd.join(".sketchbuild").join("config.toml"),
        );

        GlobalContext {
            cwd,
            home,
            config,
            verbose: false,
        }
    }

    /// Create a GlobalContext from explicit parts, without reading any files.
    pub fn from_parts(cwd: PathBuf, home: PathBuf, config: Config) -> Self {
        GlobalContext {
            cwd,
            home,
            config,
            verbose: false,
        }
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Package data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.config
            .directories
            .data
            .clone()
            .unwrap_or_else(|| self.home.join("data"))
    }

    /// Sketchbook directory.
    pub fn user_dir(&self) -> PathBuf {
        self.config.directories.user.clone().unwrap_or_else(|| {
            directories::BaseDirs::new()
                .map(|b| b.home_dir().join("Sketchbook"))
                .unwrap_or_else(|| self.cwd.join("Sketchbook"))
        })
    }

    /// Hardware search directories that exist on disk.
    pub fn hardware_dirs(&self) -> Vec<PathBuf> {
        [self.data_dir().join("packages"), self.user_dir().join("hardware")]
            .into_iter()
            .filter(|dir| dir.is_dir())
            .collect()
    }

    /// Bundled tool directories.
    pub fn builtin_tools_dirs(&self) -> Vec<PathBuf> {
        self.config.directories.builtin_tools.clone()
    }

    /// Default user library directory.
    pub fn libraries_dir(&self) -> PathBuf {
        self.user_dir().join("libraries")
    }

    /// Core-object cache shared across builds.
    pub fn core_cache_dir(&self) -> PathBuf {
        std::env::temp_dir().join(CORE_CACHE_DIR_NAME)
    }

    /// Collect the directories the build configuration needs.
    pub fn environment_dirs(&self) -> EnvironmentDirs {
        EnvironmentDirs {
            hardware_dirs: self.hardware_dirs(),
            builtin_tools_dirs: self.builtin_tools_dirs(),
            libraries_dir: self.libraries_dir(),
            data_dir: self.data_dir(),
            core_cache_dir: self.core_cache_dir(),
        }
    }
}
