//! Fixtures for common test scenarios.

use std::path::{Path, PathBuf};

use crate::builder::config::{BuildConfig, API_VERSION, DEBUG_LEVEL_DEFAULT};
use crate::core::board::{Platform, PlatformRef, ResolvedBoard, BOARDS_TXT};
use crate::core::{Fqbn, PropertyMap, Sketch, WarningsLevel};
use crate::util::fs::write_string;

/// Create `<root>/<name>/<name>.ino`, plus a `sketch.json` when a default
/// board is given. Returns the sketch directory.
pub fn write_sketch(root: &Path, name: &str, default_fqbn: Option<&str>) -> PathBuf {
    let dir = root.join(name);
    write_string(
        &dir.join(format!("{name}.ino")),
        "void setup() {}\nvoid loop() {}\n",
    )
    .unwrap();
    if let Some(fqbn) = default_fqbn {
        write_string(
            &dir.join("sketch.json"),
            &format!(r#"{{"cpu": {{"fqbn": "{fqbn}", "name": "board"}}}}"#),
        )
        .unwrap();
    }
    dir
}

/// Create `<hardware>/<package>/<arch>/boards.txt` listing `boards`.
pub fn write_platform(hardware: &Path, package: &str, arch: &str, boards: &[&str]) -> PathBuf {
    let dir = hardware.join(package).join(arch);
    let contents: String = boards
        .iter()
        .map(|b| format!("{b}.name={b}\n{b}.build.mcu=atmega328p\n"))
        .collect();
    write_string(&dir.join(BOARDS_TXT), &contents).unwrap();
    dir
}

/// A resolved board with no platform directory.
pub fn resolved_board(fqbn: &str) -> ResolvedBoard {
    let fqbn: Fqbn = fqbn.parse().unwrap();
    ResolvedBoard {
        platform: Platform {
            reference: PlatformRef::of(&fqbn),
            dir: None,
        },
        fqbn,
    }
}

/// A sketch value, without touching the filesystem.
pub fn sketch_at(full_path: PathBuf, name: &str) -> Sketch {
    Sketch {
        full_path,
        name: name.to_string(),
        default_fqbn: None,
    }
}

/// Build properties whose output template expands to `<build_path>/<file>`.
pub fn output_properties(build_path: &str, file: &str) -> PropertyMap {
    let mut props = PropertyMap::new();
    props.set("build.path", build_path);
    props.set("build.project_name", "sketch.ino");
    props.set("recipe.output.tmp_file", file);
    props
}

/// A minimal configuration for `arduino:avr:uno`.
pub fn build_config_for(sketch: Sketch) -> BuildConfig {
    BuildConfig {
        board: resolved_board("arduino:avr:uno"),
        sketch,
        hardware_dirs: Vec::new(),
        builtin_tools_dirs: Vec::new(),
        builtin_libraries_dirs: Vec::new(),
        other_libraries_dirs: Vec::new(),
        build_path: None,
        build_cache_path: None,
        core_cache_path: std::env::temp_dir().join("sketchbuild-test-core-cache"),
        export_file: None,
        custom_build_properties: Vec::new(),
        jobs: 0,
        debug_level: DEBUG_LEVEL_DEFAULT,
        verbose: false,
        quiet: false,
        optimize_for_debug: false,
        warnings: WarningsLevel::None,
        vid_pid: String::new(),
        api_version: API_VERSION.to_string(),
    }
}

/// [`build_config_for`] a sketch at `/sketches/Blink`.
pub fn build_config() -> BuildConfig {
    build_config_for(sketch_at(PathBuf::from("/sketches/Blink"), "Blink"))
}
