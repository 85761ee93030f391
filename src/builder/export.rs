//! Artifact export.
//!
//! After a full build the primary output and its variants (for example
//! `sketch.ino.with_bootloader.bin` next to `sketch.ino.bin`) are copied
//! out of the build directory under a stable, human-meaningful name.

use std::path::{Path, PathBuf};

use crate::builder::config::BuildConfig;
use crate::builder::errors::BuildError;
use crate::core::{Fqbn, PropertyMap, Sketch};
use crate::util::fs::{copy_file, read_dir_filtered};

/// Template locating the primary build output.
pub const OUTPUT_PATH_TEMPLATE: &str = "{build.path}/{recipe.output.tmp_file}";

/// Extension of the debug symbol file.
pub const ELF_EXTENSION: &str = ".elf";

/// Where and under which name build outputs are exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    /// Primary output name without its extension, e.g. `sketch.ino`
    pub canonical_basename: String,

    /// Primary output extension including the dot, e.g. `.bin`
    pub extension: String,

    /// Directory holding the build outputs
    pub source_dir: PathBuf,

    /// Directory receiving the exported files
    pub destination_dir: PathBuf,

    /// Name the exported files start with, e.g. `Blink.arduino.avr.uno`
    pub destination_basename: String,
}

impl ExportPlan {
    /// Derive the plan from the build properties.
    pub fn derive(
        properties: &PropertyMap,
        fqbn: &Fqbn,
        sketch: &Sketch,
        export_file: Option<&Path>,
    ) -> Self {
        let output_path = PathBuf::from(properties.expand(OUTPUT_PATH_TEMPLATE));
        let file_name = file_name_of(&output_path);
        let extension = extension_of(&file_name).to_string();
        let canonical_basename = file_name[..file_name.len() - extension.len()].to_string();
        let source_dir = parent_of(&output_path);

        let (destination_dir, destination_basename) = match export_file {
            Some(export_file) => {
                let name = file_name_of(export_file);
                let name = name.strip_suffix(extension.as_str()).unwrap_or(&name);
                (parent_of(export_file), name.to_string())
            }
            None => (
                sketch.dir().to_path_buf(),
                format!("{}.{}", sketch.name, fqbn.filename_suffix()),
            ),
        };

        ExportPlan {
            canonical_basename,
            extension,
            source_dir,
            destination_dir,
            destination_basename,
        }
    }

    /// Destination of a build output whose name continues the canonical
    /// basename with `infix` (e.g. `.with_bootloader.bin`).
    pub fn destination_for(&self, infix: &str) -> PathBuf {
        self.destination_dir
            .join(format!("{}{}", self.destination_basename, infix))
    }

    /// Build outputs to export: the primary output and its variants.
    pub fn matching_outputs(&self) -> Result<Vec<PathBuf>, BuildError> {
        read_dir_filtered(
            &self.source_dir,
            &format!("{}.", self.canonical_basename),
            &self.extension,
        )
        .map_err(|source| BuildError::BuildOutputRead {
            path: self.source_dir.clone(),
            source,
        })
    }

    /// Debug symbol file next to the primary output.
    pub fn elf_path(&self) -> PathBuf {
        self.source_dir
            .join(format!("{}{}", self.canonical_basename, ELF_EXTENSION))
    }
}

/// Copy the build outputs to their export destination.
///
/// Returns the exported paths. A failed copy aborts the export; files
/// already copied are left in place.
pub fn export_artifacts(
    config: &BuildConfig,
    properties: &PropertyMap,
) -> Result<Vec<PathBuf>, BuildError> {
    let plan = ExportPlan::derive(
        properties,
        &config.board.fqbn,
        &config.sketch,
        config.export_file.as_deref(),
    );
    tracing::debug!(
        "exporting `{}*{}` as `{}` into {}",
        plan.canonical_basename,
        plan.extension,
        plan.destination_basename,
        plan.destination_dir.display()
    );

    let mut exported = Vec::new();

    for src in plan.matching_outputs()? {
        let name = file_name_of(&src);
        let dst = plan.destination_for(&name[plan.canonical_basename.len()..]);
        copy_artifact(&src, &dst)?;
        exported.push(dst);
    }

    let elf = plan.elf_path();
    if elf.exists() {
        let dst = plan.destination_for(ELF_EXTENSION);
        copy_artifact(&elf, &dst)?;
        exported.push(dst);
    }

    Ok(exported)
}

fn copy_artifact(src: &Path, dst: &Path) -> Result<(), BuildError> {
    tracing::debug!(from = %src.display(), to = %dst.display(), "copying sketch build output");
    copy_file(src, dst).map_err(|source| BuildError::ArtifactCopy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Extension from the last `.` of a file name, including the dot.
fn extension_of(file_name: &str) -> &str {
    file_name.rfind('.').map_or("", |i| &file_name[i..])
}
