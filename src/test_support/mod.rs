//! Test utilities and fakes for sketchbuild unit tests.
//!
//! Provides an in-memory package index, a build engine that records which
//! stages ran, and helpers that lay out sketches and hardware platforms on
//! disk.

pub mod fixtures;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::builder::config::BuildConfig;
use crate::builder::stage::{BuildEngine, BuildMode, CancelToken, OutputSinks};
use crate::core::board::{BoardLookupError, PackageIndex, Platform, PlatformRef};
use crate::core::{Fqbn, PropertyMap};

pub use fixtures::*;

#[derive(Debug, Clone, Default)]
struct FakePlatform {
    boards: Vec<String>,
    known: bool,
    installed: bool,
}

/// In-memory package index.
#[derive(Debug, Clone, Default)]
pub struct FakePackageIndex {
    platforms: HashMap<PlatformRef, FakePlatform>,
}

impl FakePackageIndex {
    pub fn new() -> Self {
        FakePackageIndex::default()
    }

    fn with(mut self, package: &str, arch: &str, boards: &[&str], known: bool, installed: bool) -> Self {
        self.platforms.insert(
            PlatformRef::new(package, arch),
            FakePlatform {
                boards: boards.iter().map(|b| (*b).to_string()).collect(),
                known,
                installed,
            },
        );
        self
    }

    /// A platform that is known and installed.
    pub fn with_installed(self, package: &str, arch: &str, boards: &[&str]) -> Self {
        self.with(package, arch, boards, true, true)
    }

    /// A platform that is known but not installed.
    pub fn with_known(self, package: &str, arch: &str, boards: &[&str]) -> Self {
        self.with(package, arch, boards, true, false)
    }

    /// Boards that resolve although their platform is unknown.
    pub fn with_board_only(self, package: &str, arch: &str, boards: &[&str]) -> Self {
        self.with(package, arch, boards, false, false)
    }
}

impl PackageIndex for FakePackageIndex {
    fn find_board(&self, identifier: &str) -> Result<Fqbn, BoardLookupError> {
        let fqbn: Fqbn = identifier.parse()?;
        let reference = PlatformRef::of(&fqbn);
        match self.platforms.get(&reference) {
            Some(platform) if platform.boards.contains(&fqbn.board_id) => Ok(fqbn),
            _ => Err(BoardLookupError::UnknownBoard {
                platform: reference,
                board: fqbn.board_id,
            }),
        }
    }

    fn find_platform(&self, reference: &PlatformRef) -> Option<Platform> {
        self.platforms
            .get(reference)
            .filter(|p| p.known)
            .map(|_| Platform {
                reference: reference.clone(),
                dir: None,
            })
    }

    fn is_installed(&self, platform: &Platform) -> bool {
        self.platforms
            .get(&platform.reference)
            .is_some_and(|p| p.installed)
    }
}

/// Build engine that records the stages it is asked to run.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<BuildMode>>,
    properties: PropertyMap,
    error: Option<String>,
    outputs: Vec<(PathBuf, String)>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        RecordingEngine::default()
    }

    /// Property returned by a full build.
    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.set(key, value);
        self
    }

    /// Make every stage fail with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    /// File written by a full build.
    pub fn with_output(mut self, path: PathBuf, contents: &str) -> Self {
        self.outputs.push((path, contents.to_string()));
        self
    }

    /// Stages run so far, in order.
    pub fn calls(&self) -> Vec<BuildMode> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, mode: BuildMode, sinks: &mut OutputSinks<'_>) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(mode);
        }
        writeln!(sinks.out, "{}", mode)?;
        if let Some(ref message) = self.error {
            bail!("{}", message);
        }
        Ok(())
    }
}

impl BuildEngine for RecordingEngine {
    fn show_properties(
        &self,
        _config: &BuildConfig,
        sinks: &mut OutputSinks<'_>,
        _cancel: &CancelToken,
    ) -> Result<()> {
        self.record(BuildMode::ShowProperties, sinks)
    }

    fn preprocess(
        &self,
        _config: &BuildConfig,
        sinks: &mut OutputSinks<'_>,
        _cancel: &CancelToken,
    ) -> Result<()> {
        self.record(BuildMode::Preprocess, sinks)
    }

    fn full_build(
        &self,
        _config: &BuildConfig,
        sinks: &mut OutputSinks<'_>,
        _cancel: &CancelToken,
    ) -> Result<PropertyMap> {
        self.record(BuildMode::FullBuild, sinks)?;
        for (path, contents) in &self.outputs {
            crate::util::fs::write_string(path, contents)?;
        }
        Ok(self.properties.clone())
    }
}
