//! Build configuration - the immutable input of every build stage.

use std::path::{Path, PathBuf};

use crate::builder::errors::BuildError;
use crate::builder::ide::find_ide_libraries;
use crate::core::properties::merge_custom_properties;
use crate::core::{CompileRequest, ResolvedBoard, Sketch, WarningsLevel};
use crate::util::context::EnvironmentDirs;
use crate::util::fs::ensure_dir;

/// Debug level passed to the engine when the caller asks for debug output.
pub const DEBUG_LEVEL_VERBOSE: u32 = 100;

/// Debug level used otherwise.
pub const DEBUG_LEVEL_DEFAULT: u32 = 5;

/// Properties every build starts from; request properties override them.
pub const DEFAULT_BUILD_PROPERTIES: &[&str] = &["build.warn_data_percentage=75"];

/// IDE runtime version reported to platform recipes.
pub const API_VERSION: &str = "10607";

/// Everything a build stage needs to know, assembled once per compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Target board
    pub board: ResolvedBoard,

    /// Sketch being built
    pub sketch: Sketch,

    /// Hardware platform search directories
    pub hardware_dirs: Vec<PathBuf>,

    /// Bundled tool directories
    pub builtin_tools_dirs: Vec<PathBuf>,

    /// Libraries bundled with a legacy IDE, if one was found
    pub builtin_libraries_dirs: Vec<PathBuf>,

    /// User library directories: request paths first, then the default
    pub other_libraries_dirs: Vec<PathBuf>,

    /// Explicit build directory
    pub build_path: Option<PathBuf>,

    /// Explicit build cache directory
    pub build_cache_path: Option<PathBuf>,

    /// Core-object cache shared by concurrent builds
    pub core_cache_path: PathBuf,

    /// Explicit export file
    pub export_file: Option<PathBuf>,

    /// Custom `key=value` properties, defaults first
    pub custom_build_properties: Vec<String>,

    pub jobs: u32,
    pub debug_level: u32,
    pub verbose: bool,
    pub quiet: bool,
    pub optimize_for_debug: bool,
    pub warnings: WarningsLevel,
    pub vid_pid: String,
    pub api_version: String,
}

impl BuildConfig {
    /// Assemble the configuration for one compile.
    ///
    /// Creates the explicit build and build-cache directories when missing.
    /// `debug` selects the elevated engine debug level.
    pub fn assemble(
        request: &CompileRequest,
        board: ResolvedBoard,
        sketch: Sketch,
        env: &EnvironmentDirs,
        debug: bool,
    ) -> Result<Self, BuildError> {
        let mut other_libraries_dirs = request.libraries.clone();
        other_libraries_dirs.push(env.libraries_dir.clone());

        if let Some(ref build_path) = request.build_path {
            create_dir("build", build_path)?;
        }
        if let Some(ref build_cache_path) = request.build_cache_path {
            create_dir("build cache", build_cache_path)?;
        }

        let defaults: Vec<String> = DEFAULT_BUILD_PROPERTIES
            .iter()
            .map(|p| (*p).to_string())
            .collect();

        Ok(BuildConfig {
            board,
            sketch,
            hardware_dirs: env.hardware_dirs.clone(),
            builtin_tools_dirs: env.builtin_tools_dirs.clone(),
            builtin_libraries_dirs: find_ide_libraries(&env.data_dir).into_iter().collect(),
            other_libraries_dirs,
            build_path: request.build_path.clone(),
            build_cache_path: request.build_cache_path.clone(),
            core_cache_path: env.core_cache_dir.clone(),
            export_file: request.export_file.clone(),
            custom_build_properties: merge_custom_properties(&defaults, &request.build_properties),
            jobs: request.jobs,
            debug_level: if debug {
                DEBUG_LEVEL_VERBOSE
            } else {
                DEBUG_LEVEL_DEFAULT
            },
            verbose: request.verbose,
            quiet: request.quiet,
            optimize_for_debug: request.optimize_for_debug,
            warnings: request.warnings,
            vid_pid: request.vid_pid.clone(),
            api_version: API_VERSION.to_string(),
        })
    }

    /// Location handed to the engine as the sketch to build.
    pub fn sketch_location(&self) -> &Path {
        &self.sketch.full_path
    }
}

fn create_dir(what: &'static str, path: &Path) -> Result<(), BuildError> {
    ensure_dir(path).map_err(|source| BuildError::DirectoryCreation {
        what,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ide::PREFERENCES_TXT;
    use crate::core::properties::resolve_custom_properties;
    use crate::test_support::{resolved_board, sketch_at};
    use tempfile::TempDir;

    fn env_in(tmp: &TempDir) -> EnvironmentDirs {
        EnvironmentDirs {
            hardware_dirs: vec![tmp.path().join("hardware")],
            builtin_tools_dirs: vec![tmp.path().join("tools")],
            libraries_dir: tmp.path().join("user").join("libraries"),
            data_dir: tmp.path().join("data"),
            core_cache_dir: tmp.path().join("core-cache"),
        }
    }

    fn assemble(tmp: &TempDir, request: &CompileRequest, debug: bool) -> BuildConfig {
        BuildConfig::assemble(
            request,
            resolved_board("arduino:avr:uno"),
            sketch_at(tmp.path().join("Blink"), "Blink"),
            &env_in(tmp),
            debug,
        )
        .unwrap()
    }

    #[test]
    fn test_library_order() {
        let tmp = TempDir::new().unwrap();
        let mut request = CompileRequest::new(tmp.path().join("Blink"));
        request.libraries = vec![PathBuf::from("/libs/a"), PathBuf::from("/libs/b")];

        let config = assemble(&tmp, &request, false);
        assert_eq!(
            config.other_libraries_dirs,
            vec![
                PathBuf::from("/libs/a"),
                PathBuf::from("/libs/b"),
                tmp.path().join("user").join("libraries"),
            ]
        );
        assert!(config.builtin_libraries_dirs.is_empty());
    }

    #[test]
    fn test_ide_libraries_appended_when_present() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("data")).unwrap();
        std::fs::write(
            tmp.path().join("data").join(PREFERENCES_TXT),
            "last.ide.1.8.19.hardwarepath=/opt/ide/hardware\n",
        )
        .unwrap();

        let config = assemble(&tmp, &CompileRequest::new(tmp.path().join("Blink")), false);
        assert_eq!(
            config.builtin_libraries_dirs,
            vec![PathBuf::from("/opt/ide/libraries")]
        );
    }

    #[test]
    fn test_creates_build_directories() {
        let tmp = TempDir::new().unwrap();
        let mut request = CompileRequest::new(tmp.path().join("Blink"));
        request.build_path = Some(tmp.path().join("out").join("build"));
        request.build_cache_path = Some(tmp.path().join("out").join("cache"));

        let config = assemble(&tmp, &request, false);
        assert!(tmp.path().join("out").join("build").is_dir());
        assert!(tmp.path().join("out").join("cache").is_dir());
        assert_eq!(config.core_cache_path, tmp.path().join("core-cache"));

        // Assembling again against existing directories is fine.
        assemble(&tmp, &request, false);
    }

    #[test]
    fn test_build_directory_creation_failure() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();

        let mut request = CompileRequest::new(tmp.path().join("Blink"));
        request.build_cache_path = Some(blocker.join("cache"));

        let err = BuildConfig::assemble(
            &request,
            resolved_board("arduino:avr:uno"),
            sketch_at(tmp.path().join("Blink"), "Blink"),
            &env_in(&tmp),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::DirectoryCreation { what: "build cache", .. }));
    }

    #[test]
    fn test_build_path_creation_failure() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();

        let mut request = CompileRequest::new(tmp.path().join("Blink"));
        request.build_path = Some(blocker.join("build"));
        request.build_cache_path = Some(tmp.path().join("cache"));

        let err = BuildConfig::assemble(
            &request,
            resolved_board("arduino:avr:uno"),
            sketch_at(tmp.path().join("Blink"), "Blink"),
            &env_in(&tmp),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::DirectoryCreation { what: "build", ref path, .. } if *path == blocker.join("build")));
        assert!(!tmp.path().join("cache").exists());
    }

    #[test]
    fn test_debug_levels() {
        let tmp = TempDir::new().unwrap();
        let request = CompileRequest::new(tmp.path().join("Blink"));
        assert_eq!(assemble(&tmp, &request, true).debug_level, DEBUG_LEVEL_VERBOSE);
        assert_eq!(assemble(&tmp, &request, false).debug_level, DEBUG_LEVEL_DEFAULT);
    }

    #[test]
    fn test_request_property_overrides_default() {
        let tmp = TempDir::new().unwrap();
        let mut request = CompileRequest::new(tmp.path().join("Blink"));
        request.build_properties = vec!["build.warn_data_percentage=90".to_string()];

        let config = assemble(&tmp, &request, false);
        assert_eq!(
            config.custom_build_properties.first().map(String::as_str),
            Some("build.warn_data_percentage=75")
        );
        let resolved = resolve_custom_properties(&config.custom_build_properties);
        assert_eq!(resolved.get("build.warn_data_percentage"), Some("90"));
    }

    #[test]
    fn test_explicit_paths_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut request = CompileRequest::new(tmp.path().join("Blink"));
        request.build_path = Some(tmp.path().join("build"));
        request.export_file = Some(PathBuf::from("/out/custom.hex"));

        let config = assemble(&tmp, &request, false);
        assert_eq!(config.build_path, request.build_path);
        assert_eq!(config.export_file, request.export_file);
        assert_eq!(config.build_cache_path, None);
    }

    #[test]
    fn test_forwards_request_flags() {
        let tmp = TempDir::new().unwrap();
        let mut request = CompileRequest::new(tmp.path().join("Blink"));
        request.jobs = 4;
        request.verbose = true;
        request.optimize_for_debug = true;
        request.warnings = WarningsLevel::All;
        request.vid_pid = "0x2341_0x0043".to_string();

        let config = assemble(&tmp, &request, false);
        assert_eq!(config.jobs, 4);
        assert!(config.verbose);
        assert!(config.optimize_for_debug);
        assert_eq!(config.warnings, WarningsLevel::All);
        assert_eq!(config.vid_pid, "0x2341_0x0043");
        assert_eq!(config.api_version, API_VERSION);
        assert_eq!(config.hardware_dirs, vec![tmp.path().join("hardware")]);
    }
}
