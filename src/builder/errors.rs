//! Errors raised while preparing a build or exporting its artifacts.

use std::path::PathBuf;

use thiserror::Error;

/// Build preparation and artifact export failure.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot create {what} directory {}: {source}", path.display())]
    DirectoryCreation {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading build directory {}: {source}", path.display())]
    BuildOutputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("copying output file {} to {}: {source}", from.display(), to.display())]
    ArtifactCopy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
