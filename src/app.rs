//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments
//! - resolves configuration (defaults, environment, flags)
//! - runs the analysis pipeline
//! - prints reports/plots and writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{AnalyzeArgs, Command, ShowArgs, SynthCmdArgs};
use crate::config::resolve_cell_inputs;
use crate::domain::{AnalysisConfig, SourceSpec};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `flc` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    // We want `flc scope.csv` and `flc -i scope.csv` to behave like `flc analyze ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Synth(args) => handle_synth(args),
        Command::Show(args) => handle_show(args),
    }
}

/// `RUST_LOG` controls verbosity; default is warnings only, on stderr.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args)?;
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_run_summary(&run.summary, run.skipped_rows));

    if let Some(at) = config.inspect_at {
        let region = run.set.region_at(at).map(|r| r.summary());
        println!("{}", crate::report::format_region_detail(region.as_ref(), at));
    }

    if config.plot {
        let plot = crate::plot::render_waveform_plot(
            &run.waveform.time,
            &run.waveform.voltage,
            &run.set,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_regions {
        crate::io::export::write_regions_csv(path, &run.summary.regions)?;
        info!(path = %path.display(), "region CSV written");
    }
    if let Some(path) = &config.export_summary {
        crate::io::summary::write_summary_json(path, &run.summary)?;
        info!(path = %path.display(), "summary JSON written");
    }
    if let Some(path) = &run.debug_path {
        println!("Debug bundle: {}", path.display());
    }

    Ok(())
}

fn handle_synth(args: SynthCmdArgs) -> Result<(), AppError> {
    let spec = args.shape.to_spec();
    let waveform = crate::data::synth::generate(&spec)?;
    crate::io::export::write_waveform_csv(&args.output, &waveform)?;
    println!("Wrote {} samples to {}", waveform.len(), args.output.display());
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let summary = crate::io::summary::read_summary_json(&args.summary)?;
    println!("{}", crate::report::format_saved_summary(&summary));
    Ok(())
}

pub fn analysis_config_from_args(args: &AnalyzeArgs) -> Result<AnalysisConfig, AppError> {
    let source = match (args.synth, args.file.as_ref().or(args.input.as_ref())) {
        (true, _) => SourceSpec::Synthetic(args.synth_shape.to_spec()),
        (false, Some(path)) => SourceSpec::Csv {
            path: path.clone(),
            skip_rows: args.skip_rows,
        },
        (false, None) => {
            return Err(AppError::new(
                2,
                "No input: pass a CSV file (`flc analyze scope.csv`) or `--synth`.",
            ));
        }
    };

    if args.width == 0 || args.height == 0 {
        return Err(AppError::new(2, "Plot width and height must be > 0."));
    }

    Ok(AnalysisConfig {
        source,
        cell: resolve_cell_inputs(&args.cell.overrides())?,
        inspect_at: args.at,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_regions: args.export.clone(),
        export_summary: args.export_summary.clone(),
        debug_bundle: args.debug,
    })
}

/// Rewrite argv so a bare input means `flc analyze`.
///
/// Rules:
/// - `flc scope.csv ...`          -> `flc analyze scope.csv ...`
/// - `flc -i scope.csv ...`       -> `flc analyze -i scope.csv ...`
/// - `flc --help/--version/-h`    -> unchanged (show top-level help/version)
/// - `flc`                        -> unchanged (clap prints usage)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "analyze" | "synth" | "show");
    if is_subcommand {
        return argv;
    }

    // Anything else (a flag or a file path) is an `analyze` argument.
    argv.insert(1, "analyze".to_string());
    argv
}
