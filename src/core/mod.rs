//! Core data structures for sketchbuild.
//!
//! - Board identifiers (FQBN) and board/platform resolution
//! - Build property maps
//! - Sketches and compile requests

pub mod board;
pub mod fqbn;
pub mod properties;
pub mod request;
pub mod sketch;

pub use board::{
    resolve_board, select_board_arg, BoardError, HardwareIndex, PackageIndex, Platform,
    PlatformRef, ResolvedBoard,
};
pub use fqbn::Fqbn;
pub use properties::PropertyMap;
pub use request::{CompileRequest, InstanceId, WarningsLevel};
pub use sketch::{FsSketchLoader, Sketch, SketchLoader};
