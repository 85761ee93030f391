//! Sketch loading.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Main source file extension of a sketch.
pub const SKETCH_EXTENSION: &str = "ino";

/// Optional per-sketch metadata file.
pub const SKETCH_METADATA: &str = "sketch.json";

/// A loaded sketch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sketch {
    /// Path the sketch was loaded from (its directory or main file)
    pub full_path: PathBuf,

    /// Sketch name, the name of its directory
    pub name: String,

    /// Default board recorded in the sketch metadata
    pub default_fqbn: Option<String>,
}

impl Sketch {
    /// Directory holding the sketch.
    pub fn dir(&self) -> &Path {
        if self.full_path.is_dir() {
            &self.full_path
        } else {
            self.full_path.parent().unwrap_or(&self.full_path)
        }
    }
}

/// Source of sketch metadata.
pub trait SketchLoader {
    fn load(&self, path: &Path) -> Result<Sketch>;
}

#[derive(Debug, Default, Deserialize)]
struct SketchMetadata {
    #[serde(default)]
    cpu: CpuMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct CpuMetadata {
    #[serde(default)]
    fqbn: String,
}

/// Loads sketches from disk.
///
/// The path may name the sketch directory or its main `.ino` file. The
/// directory must contain `<dirname>.ino`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSketchLoader;

impl FsSketchLoader {
    fn read_metadata(dir: &Path) -> Result<Option<String>> {
        let path = dir.join(SKETCH_METADATA);
        if !path.is_file() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let metadata: SketchMetadata = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        Ok(Some(metadata.cpu.fqbn).filter(|fqbn| !fqbn.is_empty()))
    }
}

impl SketchLoader for FsSketchLoader {
    fn load(&self, path: &Path) -> Result<Sketch> {
        if !path.exists() {
            bail!("no such file or directory: {}", path.display());
        }

        let dir = if path.is_dir() {
            path
        } else {
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
        };

        let dir = dir
            .canonicalize()
            .with_context(|| format!("failed to resolve sketch directory: {}", dir.display()))?;
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("sketch directory has no name: {}", dir.display()))?;

        let main_file = dir.join(format!("{}.{}", name, SKETCH_EXTENSION));
        if !main_file.is_file() {
            bail!(
                "main file missing from sketch: expected {}",
                main_file.display()
            );
        }

        let full_path = if path.is_dir() { dir.clone() } else { main_file };
        let default_fqbn = Self::read_metadata(&dir)?;

        Ok(Sketch {
            full_path,
            name,
            default_fqbn,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_sketch;
    use tempfile::TempDir;

    #[test]
    fn test_load_sketch_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = write_sketch(tmp.path(), "Blink", None);

        let sketch = FsSketchLoader.load(&dir).unwrap();
        assert_eq!(sketch.name, "Blink");
        assert!(sketch.full_path.is_dir());
        assert_eq!(sketch.default_fqbn, None);
    }

    #[test]
    fn test_load_sketch_from_main_file() {
        let tmp = TempDir::new().unwrap();
        let dir = write_sketch(tmp.path(), "Blink", None);

        let sketch = FsSketchLoader.load(&dir.join("Blink.ino")).unwrap();
        assert_eq!(sketch.name, "Blink");
        assert!(sketch.full_path.is_file());
        assert_eq!(sketch.dir(), dir.canonicalize().unwrap());
    }

    #[test]
    fn test_load_sketch_default_board() {
        let tmp = TempDir::new().unwrap();
        let dir = write_sketch(tmp.path(), "Blink", Some("arduino:avr:uno"));

        let sketch = FsSketchLoader.load(&dir).unwrap();
        assert_eq!(sketch.default_fqbn.as_deref(), Some("arduino:avr:uno"));
    }

    #[test]
    fn test_load_sketch_missing_main_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("Empty");
        std::fs::create_dir_all(&dir).unwrap();

        let err = FsSketchLoader.load(&dir).unwrap_err();
        assert!(err.to_string().contains("main file missing"));
    }

    #[test]
    fn test_load_sketch_missing_path() {
        let tmp = TempDir::new().unwrap();
        assert!(FsSketchLoader.load(&tmp.path().join("nope")).is_err());
    }
}
