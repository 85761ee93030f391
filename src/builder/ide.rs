//! Discovery of the libraries bundled with a legacy IDE installation.
//!
//! Old IDE versions record their hardware directory in `preferences.txt`
//! under keys like `last.ide.1.8.19.hardwarepath`. The bundled libraries
//! live next to that directory.

use std::path::{Path, PathBuf};

use crate::core::PropertyMap;

/// Preferences file written by the IDE into the data directory.
pub const PREFERENCES_TXT: &str = "preferences.txt";

const HARDWARE_PATH_SUFFIX: &str = ".hardwarepath";

/// Locate the IDE's bundled library directory from its preferences file.
///
/// Returns `None` when the file is missing or unreadable, or when it holds
/// no usable record; none of those stop a build.
pub fn find_ide_libraries(data_dir: &Path) -> Option<PathBuf> {
    let path = data_dir.join(PREFERENCES_TXT);
    match PropertyMap::load(&path) {
        Ok(preferences) => ide_libraries_from_preferences(&preferences),
        Err(e) => {
            tracing::debug!("skipping IDE libraries lookup: {:#}", e);
            None
        }
    }
}

/// Pick the most recent IDE record and derive its `libraries` directory.
///
/// The lexicographically greatest `*.hardwarepath` key under `last.ide`
/// is taken as the most recent version.
pub fn ide_libraries_from_preferences(preferences: &PropertyMap) -> Option<PathBuf> {
    let last_ide = preferences.sub_tree("last.ide");
    let latest_key = last_ide
        .keys()
        .filter(|key| key.ends_with(HARDWARE_PATH_SUFFIX))
        .max()?;

    let hardware_path = Path::new(last_ide.get(latest_key)?);
    let libraries = hardware_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("libraries");

    tracing::debug!("found IDE libraries at {}", libraries.display());
    Some(libraries)
}
