//! `sketchbuild compile` command

use std::io;

use anyhow::Result;

use crate::cli::CompileArgs;
use sketchbuild::builder::{CancelToken, ExternalBuilder};
use sketchbuild::core::{CompileRequest, FsSketchLoader, HardwareIndex};
use sketchbuild::ops::{Compiler, Instances};
use sketchbuild::util::GlobalContext;

pub fn execute(args: CompileArgs, verbose: bool) -> Result<()> {
    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(verbose);
    let config = ctx.config();

    let mut instances = Instances::new();
    let instance = instances.create(HardwareIndex::new(ctx.hardware_dirs()));

    // CLI > config > default
    let warnings = args
        .warnings
        .or(config.build.warnings)
        .unwrap_or_default();
    let jobs = args.jobs.or(config.build.jobs).unwrap_or(0);

    let request = CompileRequest {
        instance,
        board: args.fqbn.unwrap_or_default(),
        fqbn: String::new(),
        sketch_path: args.sketch.unwrap_or_else(|| ctx.cwd().to_path_buf()),
        build_path: args.build_path,
        build_cache_path: args.build_cache_path,
        export_file: args.export_file,
        libraries: args.libraries,
        build_properties: args.build_properties,
        show_properties: args.show_properties,
        preprocess: args.preprocess,
        dry_run: args.dry_run,
        verbose: ctx.is_verbose(),
        quiet: args.quiet,
        optimize_for_debug: args.optimize_for_debug,
        warnings,
        jobs,
        vid_pid: args.vid_pid,
    };

    let engine = ExternalBuilder::new(config.builder_program());
    let compiler = Compiler::new(&instances, &FsSketchLoader, &engine, ctx.environment_dirs());

    let stdout = io::stdout();
    let stderr = io::stderr();
    let response = compiler.compile(
        &request,
        &mut stdout.lock(),
        &mut stderr.lock(),
        args.debug,
        &CancelToken::new(),
    )?;

    for path in &response.exported {
        eprintln!("    Exported {}", path.display());
    }

    Ok(())
}
