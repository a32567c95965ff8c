//! Command implementations for the geocsv CLI
//!
//! This module contains the command execution logic, progress reporting
//! and the final summaries printed to the terminal.

use crate::cli::args::{Args, Commands, ConvertArgs, InspectArgs};
use crate::collection::ConversionStats;
use crate::config::GeoCsvOptions;
use crate::constants::{CSV_EXTENSION, GEOJSON_EXTENSION, LOG_TARGET};
use crate::reader::GeoCsv;
use anyhow::{Context, Result, bail};
use colored::*;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Totals across all converted files
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub files_converted: usize,
    pub files_failed: usize,
    pub files_skipped: usize,
    pub conversion: ConversionStats,
    pub processing_time: Duration,
}

impl RunSummary {
    fn add(&mut self, stats: &ConversionStats) {
        self.files_converted += 1;
        self.conversion.total_rows += stats.total_rows;
        self.conversion.features_emitted += stats.features_emitted;
        self.conversion.rows_without_geometry += stats.rows_without_geometry;
        self.conversion.wkt_parse_failures += stats.wkt_parse_failures;
        self.conversion.coordinate_parse_failures += stats.coordinate_parse_failures;
    }
}

/// Main command runner
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    match &args.command {
        Some(Commands::Convert(convert)) => {
            let summary = run_convert(convert, args.show_progress())?;
            if !args.quiet {
                print_summary(&summary);
            }
            if summary.files_failed > 0 {
                let attempted = summary.files_failed + summary.files_converted;
                bail!(
                    "{} of {} files failed to convert",
                    summary.files_failed,
                    attempted
                );
            }
            Ok(())
        }
        Some(Commands::Inspect(inspect)) => run_inspect(inspect),
        None => Ok(()),
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", LOG_TARGET, log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// A CSV file to convert and its path relative to the argument it came from
///
/// Files found by walking a directory keep their subdirectories, so that
/// `in/a/points.csv` and `in/b/points.csv` land in separate output files.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InputFile {
    path: PathBuf,
    relative: PathBuf,
}

impl InputFile {
    fn given(path: &Path) -> Self {
        let relative = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("output.{}", CSV_EXTENSION)));
        Self {
            path: path.to_path_buf(),
            relative,
        }
    }

    fn walked(root: &Path, path: &Path) -> Self {
        let relative = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| Self::given(path).relative);
        Self {
            path: path.to_path_buf(),
            relative,
        }
    }
}

/// Convert every discovered input file to GeoJSON
pub fn run_convert(args: &ConvertArgs, show_progress: bool) -> Result<RunSummary> {
    let start_time = Instant::now();

    args.validate()?;
    let options = args.fields.to_options()?;
    debug!("Conversion options: {:?}", options);

    let inputs = discover_inputs(&args.inputs)?;
    if inputs.is_empty() {
        bail!("No CSV files found in the given inputs");
    }
    info!("Converting {} files", inputs.len());

    let planned = plan_outputs(&inputs, args.output_dir.as_deref())?;

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let progress_bar = if show_progress && inputs.len() > 1 {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut summary = RunSummary::default();

    for (input, output) in &planned {
        let input = input.path.as_path();
        if let Some(pb) = &progress_bar {
            pb.set_message(format!("{}", input.display()));
        }

        if output.exists() && !args.force_overwrite {
            warn!(
                "Skipping {}: {} exists (use --force to overwrite)",
                input.display(),
                output.display()
            );
            summary.files_skipped += 1;
        } else {
            match convert_file(input, output, options.clone(), args.pretty) {
                Ok(stats) => {
                    info!(
                        "Wrote {} features from {} rows to {}",
                        stats.features_emitted,
                        stats.total_rows,
                        output.display()
                    );
                    summary.add(&stats);
                }
                Err(e) => {
                    error!("Failed to convert {}: {:#}", input.display(), e);
                    summary.files_failed += 1;
                }
            }
        }

        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Conversion complete");
    }

    summary.processing_time = start_time.elapsed();
    Ok(summary)
}

/// Convert one file, returning its statistics
pub fn convert_file(
    input: &Path,
    output: &Path,
    options: GeoCsvOptions,
    pretty: bool,
) -> Result<ConversionStats> {
    let gc = GeoCsv::read(input, options)?;
    if !gc.is_valid() {
        warn!(
            "{} has no usable geometry columns or no rows; output will be empty",
            input.display()
        );
    }

    let result = gc.convert();
    let json = result.collection.to_geojson_string(pretty)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(result.stats)
}

/// Print headers, validity and statistics for one file
pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let options = args.fields.to_options()?;
    let gc = GeoCsv::read(&args.input, options)?;
    let result = gc.convert();

    println!("{}", format!("File: {}", args.input.display()).bold());
    println!("  Headers ({}): {}", gc.header_count(), gc.headers().join(", "));
    println!("  Rows: {}", gc.row_count());
    match gc.options().geometry_mode(gc.headers()) {
        Some(mode) => println!("  Geometry source: {:?}", mode),
        None => println!("  Geometry source: {}", "none".red()),
    }
    let validity = if gc.is_valid() {
        "yes".green()
    } else {
        "no".red()
    };
    println!("  Valid: {}", validity);
    print_conversion_stats(&result.stats);

    Ok(())
}

/// Expand directories into the CSV files they contain, keeping file arguments as given
fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<InputFile>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input) {
                let entry = entry
                    .with_context(|| format!("Failed to walk directory {}", input.display()))?;
                let path = entry.path();
                if path.is_file() && has_csv_extension(path) {
                    found.push(InputFile::walked(input, path));
                }
            }
            found.sort_by(|a, b| a.path.cmp(&b.path));
            debug!("Found {} CSV files in {}", found.len(), input.display());
            files.extend(found);
        } else {
            files.push(InputFile::given(input));
        }
    }

    Ok(files)
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(CSV_EXTENSION))
}

/// `<stem>.geojson` next to the input, or at its relative path under `output_dir`
fn output_path(input: &InputFile, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => dir.join(&input.relative).with_extension(GEOJSON_EXTENSION),
        None => input.path.with_extension(GEOJSON_EXTENSION),
    }
}

/// Pair every input with its output, refusing two inputs that share one
fn plan_outputs<'a>(
    inputs: &'a [InputFile],
    output_dir: Option<&Path>,
) -> Result<Vec<(&'a InputFile, PathBuf)>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut planned = Vec::with_capacity(inputs.len());

    for input in inputs {
        let output = output_path(input, output_dir);
        if let Some(previous) = claimed.insert(output.clone(), &input.path) {
            bail!(
                "{} and {} would both be written to {}",
                previous.display(),
                input.path.display(),
                output.display()
            );
        }
        planned.push((input, output));
    }

    Ok(planned)
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "Conversion summary".bold());
    println!(
        "  Files: {} converted, {} skipped, {}",
        summary.files_converted.to_string().green(),
        summary.files_skipped,
        if summary.files_failed > 0 {
            format!("{} failed", summary.files_failed).red()
        } else {
            "0 failed".normal()
        }
    );
    print_conversion_stats(&summary.conversion);
    println!("  Time: {}", HumanDuration(summary.processing_time));
}

fn print_conversion_stats(stats: &ConversionStats) {
    println!(
        "  Features: {} of {} rows ({:.1}%)",
        stats.features_emitted,
        stats.total_rows,
        stats.success_rate()
    );
    if stats.rows_without_geometry > 0 {
        println!(
            "  {}",
            format!("Rows without geometry: {}", stats.rows_without_geometry).yellow()
        );
    }
    if stats.wkt_parse_failures + stats.coordinate_parse_failures > 0 {
        println!(
            "  Unparseable cells: {} WKT, {} coordinate",
            stats.wkt_parse_failures, stats.coordinate_parse_failures
        );
    }
}
