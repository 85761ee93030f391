//! Build engine backed by an external builder executable.
//!
//! The whole [`BuildConfig`] is passed as command-line flags, followed by a
//! mode flag and the sketch location. A full build runs the builder twice:
//! once to compile, once to dump the resulting build properties.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::config::BuildConfig;
use crate::builder::stage::{BuildEngine, CancelToken, OutputSinks};
use crate::core::PropertyMap;
use crate::util::hash::short_hash;
use crate::util::process::{resolve_program, ProcessBuilder};

const DUMP_PREFS: &str = "-dump-prefs";
const PREPROCESS: &str = "-preprocess";
const COMPILE: &str = "-compile";

/// Runs stages by invoking a builder program.
#[derive(Debug, Clone)]
pub struct ExternalBuilder {
    program: PathBuf,
}

impl ExternalBuilder {
    /// Create an engine for a program name or path.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ExternalBuilder {
            program: resolve_program(program.as_ref()),
        }
    }

    /// Build directory used when the request names none.
    ///
    /// Stable per sketch, so the compile and the property dump of one full
    /// build agree on it.
    pub fn default_build_path(config: &BuildConfig) -> PathBuf {
        let key = config.sketch_location().to_string_lossy();
        std::env::temp_dir().join(format!("sketchbuild-{}", short_hash(&key)))
    }

    /// Command line for one stage.
    pub fn command(&self, config: &BuildConfig, mode_flag: &str) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program);

        for dir in &config.hardware_dirs {
            cmd = cmd.flag("-hardware", dir);
        }
        for dir in &config.builtin_tools_dirs {
            cmd = cmd.flag("-tools", dir);
        }
        for dir in &config.builtin_libraries_dirs {
            cmd = cmd.flag("-built-in-libraries", dir);
        }
        for dir in &config.other_libraries_dirs {
            cmd = cmd.flag("-libraries", dir);
        }

        let build_path = config
            .build_path
            .clone()
            .unwrap_or_else(|| Self::default_build_path(config));

        cmd = cmd
            .flag("-fqbn", config.board.fqbn.to_string())
            .flag("-build-path", &build_path)
            .flag("-core-cache", &config.core_cache_path);

        if let Some(ref cache) = config.build_cache_path {
            cmd = cmd.flag("-build-cache", cache);
        }

        cmd = cmd.flag("-prefs", format!("runtime.ide.version={}", config.api_version));
        for property in &config.custom_build_properties {
            cmd = cmd.flag("-prefs", property);
        }

        cmd = cmd
            .flag("-jobs", config.jobs.to_string())
            .flag("-debug-level", config.debug_level.to_string())
            .flag("-warnings", config.warnings.as_str());

        if config.verbose {
            cmd = cmd.arg("-verbose");
        }
        if config.quiet {
            cmd = cmd.arg("-quiet");
        }
        if config.optimize_for_debug {
            cmd = cmd.arg("-optimize-for-debug");
        }
        if !config.vid_pid.is_empty() {
            cmd = cmd.flag("-vid-pid", &config.vid_pid);
        }

        cmd.arg(mode_flag).arg(config.sketch_location())
    }

    /// Run one stage, forwarding its output. Returns captured stdout.
    fn run(
        &self,
        config: &BuildConfig,
        mode_flag: &str,
        sinks: &mut OutputSinks<'_>,
        cancel: &CancelToken,
        forward_stdout: bool,
    ) -> Result<Vec<u8>> {
        if cancel.is_cancelled() {
            bail!("build cancelled");
        }

        if config.build_path.is_none() {
            let dir = Self::default_build_path(config);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create build directory: {}", dir.display()))?;
        }

        let cmd = self.command(config, mode_flag);
        tracing::debug!("running `{}`", cmd.display_command());

        let output = cmd.exec()?;
        if forward_stdout {
            sinks.out.write_all(&output.stdout)?;
        }
        sinks.err.write_all(&output.stderr)?;

        if !output.status.success() {
            bail!(
                "`{}` failed with exit code {:?}",
                cmd.display_command(),
                output.status.code()
            );
        }

        Ok(output.stdout)
    }
}

impl BuildEngine for ExternalBuilder {
    fn show_properties(
        &self,
        config: &BuildConfig,
        sinks: &mut OutputSinks<'_>,
        cancel: &CancelToken,
    ) -> Result<()> {
        self.run(config, DUMP_PREFS, sinks, cancel, true).map(|_| ())
    }

    fn preprocess(
        &self,
        config: &BuildConfig,
        sinks: &mut OutputSinks<'_>,
        cancel: &CancelToken,
    ) -> Result<()> {
        self.run(config, PREPROCESS, sinks, cancel, true).map(|_| ())
    }

    fn full_build(
        &self,
        config: &BuildConfig,
        sinks: &mut OutputSinks<'_>,
        cancel: &CancelToken,
    ) -> Result<PropertyMap> {
        self.run(config, COMPILE, sinks, cancel, true)?;
        let dump = self.run(config, DUMP_PREFS, sinks, cancel, false)?;
        Ok(PropertyMap::parse(&String::from_utf8_lossy(&dump)))
    }
}
