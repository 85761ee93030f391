//! Board and platform resolution.
//!
//! A board identifier is resolved against a [`PackageIndex`] to a concrete
//! [`ResolvedBoard`]. Resolution fails before any build work if the owning
//! platform is unknown or not installed.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::fqbn::{Fqbn, FqbnParseError};
use crate::core::properties::PropertyMap;

/// Name of the board definitions file inside a platform directory.
pub const BOARDS_TXT: &str = "boards.txt";

/// Reference to a platform by package and architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformRef {
    pub package: String,
    pub architecture: String,
}

impl PlatformRef {
    pub fn new(package: impl Into<String>, architecture: impl Into<String>) -> Self {
        PlatformRef {
            package: package.into(),
            architecture: architecture.into(),
        }
    }

    /// The platform owning a board.
    pub fn of(fqbn: &Fqbn) -> Self {
        PlatformRef::new(&fqbn.package, &fqbn.platform_arch)
    }
}

impl std::fmt::Display for PlatformRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.package, self.architecture)
    }
}

/// A platform known to the package index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub reference: PlatformRef,

    /// Directory holding the platform files, if one was found
    pub dir: Option<PathBuf>,
}

/// A board identifier resolved to an installed platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBoard {
    pub fqbn: Fqbn,
    pub platform: Platform,
}

/// Why a board identifier could not be matched.
#[derive(Debug, Error)]
pub enum BoardLookupError {
    #[error(transparent)]
    InvalidFqbn(#[from] FqbnParseError),

    #[error("unknown board `{board}` in platform `{platform}`")]
    UnknownBoard { platform: PlatformRef, board: String },

    #[error("failed to read board definitions from {}", path.display())]
    UnreadableBoards {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Board resolution failure.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("no board provided")]
    MissingBoard,

    #[error("board '{identifier}' not found: {source}")]
    BoardNotFound {
        identifier: String,
        #[source]
        source: BoardLookupError,
    },

    #[error("platform not installed")]
    PlatformNotInstalled { platform: PlatformRef },
}

/// Board and platform lookup capability of the package manager.
pub trait PackageIndex: Send + Sync {
    /// Match an identifier to a board.
    fn find_board(&self, identifier: &str) -> Result<Fqbn, BoardLookupError>;

    /// Find a platform known to the index.
    fn find_platform(&self, reference: &PlatformRef) -> Option<Platform>;

    /// Whether a known platform is installed locally.
    fn is_installed(&self, platform: &Platform) -> bool;
}

/// Pick the board identifier to use.
///
/// Priority: the explicit board field, then the deprecated FQBN field,
/// then the sketch's default board. Empty strings count as absent.
pub fn select_board_arg<'a>(
    board: &'a str,
    deprecated_fqbn: &'a str,
    sketch_default: Option<&'a str>,
) -> Option<&'a str> {
    [Some(board), Some(deprecated_fqbn), sketch_default]
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty())
}

/// Resolve an identifier to an installed board.
pub fn resolve_board(index: &dyn PackageIndex, identifier: &str) -> Result<ResolvedBoard, BoardError> {
    let fqbn = index
        .find_board(identifier)
        .map_err(|source| BoardError::BoardNotFound {
            identifier: identifier.to_string(),
            source,
        })?;

    let reference = PlatformRef::of(&fqbn);
    // Unknown and not-installed platforms are equally unbuildable.
    let platform = match index.find_platform(&reference) {
        Some(platform) if index.is_installed(&platform) => platform,
        _ => return Err(BoardError::PlatformNotInstalled { platform: reference }),
    };

    tracing::debug!("resolved board `{}` to platform {}", fqbn, platform.reference);

    Ok(ResolvedBoard { fqbn, platform })
}

/// Package index backed by hardware directories on disk.
///
/// Platforms live at `<hardware_dir>/<package>/<arch>/` and are installed
/// when that directory holds a `boards.txt`.
#[derive(Debug, Clone, Default)]
pub struct HardwareIndex {
    hardware_dirs: Vec<PathBuf>,
}

impl HardwareIndex {
    pub fn new(hardware_dirs: Vec<PathBuf>) -> Self {
        HardwareIndex { hardware_dirs }
    }

    /// Directory of a platform.
    ///
    /// The first candidate holding a `boards.txt` wins, so an empty
    /// directory earlier in the search list does not hide an install.
    fn platform_dir(&self, reference: &PlatformRef) -> Option<PathBuf> {
        let candidates: Vec<PathBuf> = self
            .hardware_dirs
            .iter()
            .map(|dir| dir.join(&reference.package).join(&reference.architecture))
            .filter(|dir| dir.is_dir())
            .collect();

        candidates
            .iter()
            .find(|dir| dir.join(BOARDS_TXT).is_file())
            .or_else(|| candidates.first())
            .cloned()
    }

    fn load_boards(path: &Path) -> Result<PropertyMap, BoardLookupError> {
        std::fs::read_to_string(path)
            .map(|text| PropertyMap::parse(&text))
            .map_err(|source| BoardLookupError::UnreadableBoards {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl PackageIndex for HardwareIndex {
    fn find_board(&self, identifier: &str) -> Result<Fqbn, BoardLookupError> {
        let fqbn: Fqbn = identifier.parse()?;
        let reference = PlatformRef::of(&fqbn);

        // Board ids can only be checked once the platform is installed; the
        // platform check after lookup reports the missing platform.
        let Some(boards_txt) = self
            .platform_dir(&reference)
            .map(|dir| dir.join(BOARDS_TXT))
            .filter(|path| path.is_file())
        else {
            return Ok(fqbn);
        };

        let boards = Self::load_boards(&boards_txt)?;
        if !boards.contains_key(&format!("{}.name", fqbn.board_id)) {
            return Err(BoardLookupError::UnknownBoard {
                platform: reference,
                board: fqbn.board_id,
            });
        }

        Ok(fqbn)
    }

    fn find_platform(&self, reference: &PlatformRef) -> Option<Platform> {
        self.platform_dir(reference).map(|dir| Platform {
            reference: reference.clone(),
            dir: Some(dir),
        })
    }

    fn is_installed(&self, platform: &Platform) -> bool {
        platform
            .dir
            .as_ref()
            .is_some_and(|dir| dir.join(BOARDS_TXT).is_file())
    }
}
