//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use sketchbuild::core::WarningsLevel;

/// sketchbuild - compile sketches and export their firmware
#[derive(Parser)]
#[command(name = "sketchbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a sketch
    Compile(CompileArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct CompileArgs {
    /// Sketch directory or main .ino file (defaults to the current directory)
    pub sketch: Option<PathBuf>,

    /// Fully qualified board name, e.g. arduino:avr:uno
    #[arg(short = 'b', long, env = "SKETCHBUILD_FQBN")]
    pub fqbn: Option<String>,

    /// Directory for intermediate build files
    #[arg(long)]
    pub build_path: Option<PathBuf>,

    /// Directory for cached build outputs reused across builds
    #[arg(long)]
    pub build_cache_path: Option<PathBuf>,

    /// Write the firmware to this file instead of the sketch directory
    #[arg(short = 'o', long)]
    pub export_file: Option<PathBuf>,

    /// Additional library directories
    #[arg(long = "libraries")]
    pub libraries: Vec<PathBuf>,

    /// Override a build property (key=value)
    #[arg(long = "build-property")]
    pub build_properties: Vec<String>,

    /// Print the build properties instead of compiling
    #[arg(long)]
    pub show_properties: bool,

    /// Print the preprocessed sketch instead of compiling
    #[arg(long)]
    pub preprocess: bool,

    /// Build without exporting the firmware
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress builder output
    #[arg(short, long)]
    pub quiet: bool,

    /// Optimize compile output for debugging
    #[arg(long)]
    pub optimize_for_debug: bool,

    /// Compiler warnings level (none, default, more, all)
    #[arg(long)]
    pub warnings: Option<WarningsLevel>,

    /// Number of parallel jobs (0 = engine default)
    #[arg(short, long)]
    pub jobs: Option<u32>,

    /// USB VID_PID the build should target
    #[arg(long, default_value = "")]
    pub vid_pid: String,

    /// Raise the build engine's debug level
    #[arg(long)]
    pub debug: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
