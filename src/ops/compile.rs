//! Implementation of `sketchbuild compile`.
//!
//! Resolves the board, assembles the build configuration, runs one build
//! stage and, after a full build that is not a dry run, exports the
//! artifacts next to the sketch (or to the requested export file).

use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;

use crate::builder::{
    dispatch, export_artifacts, BuildConfig, BuildEngine, BuildError, BuildMode, CancelToken,
    OutputSinks, StageResult,
};
use crate::core::board::{resolve_board, select_board_arg, BoardError, BoardLookupError};
use crate::core::{CompileRequest, InstanceId, SketchLoader};
use crate::ops::instances::Instances;
use crate::util::context::EnvironmentDirs;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Compile failure.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid instance")]
    InvalidInstance { instance: InstanceId },

    #[error("missing sketch path")]
    SketchPathMissing,

    #[error("opening sketch: {source}")]
    SketchLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Build(#[from] BuildError),

    /// The build stage's own error, unchanged.
    #[error(transparent)]
    StageExecution(anyhow::Error),
}

impl CompileError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            CompileError::InvalidInstance { instance } => {
                diag.with_context(format!("no package index registered as instance {}", instance))
            }
            CompileError::SketchPathMissing => {
                diag.with_suggestion("Pass the sketch directory or its main .ino file")
            }
            CompileError::SketchLoad { path, .. } => diag.with_location(path),
            CompileError::Board(BoardError::MissingBoard) => {
                diag.with_suggestion(suggestions::NO_BOARD)
            }
            CompileError::Board(BoardError::BoardNotFound { identifier, source }) => {
                let diag = diag.with_context(format!("board: {}", identifier));
                match source {
                    BoardLookupError::InvalidFqbn(_) => diag.with_suggestion(suggestions::NO_BOARD),
                    _ => diag.with_suggestion(suggestions::UNKNOWN_BOARD),
                }
            }
            CompileError::Board(BoardError::PlatformNotInstalled { platform }) => diag
                .with_context(format!("\"{}\" platform is not installed", platform))
                .with_suggestion(format!(
                    "Install it by running `sketchbuild core install {}`",
                    platform
                )),
            CompileError::Build(BuildError::DirectoryCreation { path, .. }) => diag
                .with_location(path)
                .with_suggestion(suggestions::DIRECTORY),
            CompileError::Build(_) => diag,
            CompileError::StageExecution(_) => diag.with_suggestion(suggestions::BUILD_FAILED),
        }
    }
}

/// Successful compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileResponse {
    /// Files written to the export destination, empty when nothing was exported
    pub exported: Vec<PathBuf>,
}

/// Compile pipeline with its collaborators injected.
pub struct Compiler<'a> {
    instances: &'a Instances,
    sketches: &'a dyn SketchLoader,
    engine: &'a dyn BuildEngine,
    env: EnvironmentDirs,
}

impl<'a> Compiler<'a> {
    pub fn new(
        instances: &'a Instances,
        sketches: &'a dyn SketchLoader,
        engine: &'a dyn BuildEngine,
        env: EnvironmentDirs,
    ) -> Self {
        Compiler {
            instances,
            sketches,
            engine,
            env,
        }
    }

    /// Compile a sketch.
    ///
    /// Progress goes to `out` and `err`, which are never closed. `debug`
    /// raises the engine's debug level. `cancel` is handed to the build
    /// stage.
    pub fn compile(
        &self,
        request: &CompileRequest,
        out: &mut dyn Write,
        err: &mut dyn Write,
        debug: bool,
        cancel: &CancelToken,
    ) -> Result<CompileResponse, CompileError> {
        let index = self
            .instances
            .get(request.instance)
            .ok_or(CompileError::InvalidInstance {
                instance: request.instance,
            })?;

        tracing::trace!(
            "Compile {} for {} started",
            request.sketch_path.display(),
            request.fqbn
        );
        if request.sketch_path.as_os_str().is_empty() {
            return Err(CompileError::SketchPathMissing);
        }
        let sketch = self
            .sketches
            .load(&request.sketch_path)
            .map_err(|e| CompileError::SketchLoad {
                path: request.sketch_path.clone(),
                source: e.into(),
            })?;

        let board_arg = select_board_arg(
            &request.board,
            &request.fqbn,
            sketch.default_fqbn.as_deref(),
        )
        .ok_or(BoardError::MissingBoard)?
        .to_string();

        let board = resolve_board(index, &board_arg)?;
        let sketch_name = sketch.name.clone();

        let config = BuildConfig::assemble(request, board, sketch, &self.env, debug)?;

        let mode = BuildMode::select(request.show_properties, request.preprocess);
        let mut sinks = OutputSinks::new(out, err);
        let result = dispatch(self.engine, &config, mode, &mut sinks, cancel)
            .map_err(CompileError::StageExecution)?;

        let mut response = CompileResponse::default();
        match result {
            StageResult::Built(properties) if !request.dry_run => {
                response.exported = export_artifacts(&config, &properties)?;
            }
            StageResult::Built(_) => tracing::debug!("dry run, skipping artifact export"),
            StageResult::Empty => {}
        }

        tracing::trace!("Compile {} for {} successful", sketch_name, board_arg);
        Ok(response)
    }
}
