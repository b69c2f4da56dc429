//! navcontrol: reduce a navigation track to control points.
//!
//! Reads an r2rnav (or similarly delimited) track of `label, longitude,
//! latitude` fixes, drops stationary repeats, simplifies the track with
//! Douglas-Peucker at the given tolerance and writes the retained fixes
//! back out in r2rnav form.
//!
//! # Usage
//!
//! ```text
//! navcontrol --tolerance <DEG> [OPTIONS] <INPUT> [OUTPUT]
//! ```
//!
//! Without `OUTPUT` the control points are written to stdout. Progress
//! and errors are logged to stderr.

#![allow(clippy::print_stdout)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use navcontrol_core::{NavError, SimplifyConfig, simplify_with_diagnostics};
use navcontrol_format::{FormatError, NavMetadata, ReaderConfig, parse_points, to_r2rnav};
use serde::Deserialize;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;

/// Reduce a navigation track to control points.
///
/// Fixes are read in file order, consecutive repeats are dropped and the
/// track is simplified so that no discarded fix lies farther than the
/// tolerance from the retained polyline.
#[derive(Parser)]
#[command(name = "navcontrol", version)]
struct Cli {
    /// Input navigation file.
    input: PathBuf,

    /// Output file for the control points. Defaults to stdout.
    output: Option<PathBuf>,

    /// Distance tolerance in degrees. There is no default: the right
    /// value depends on the track's scale.
    #[arg(short, long, required_unless_present = "config_json")]
    tolerance: Option<f64>,

    /// Refuse inputs with more than this many records.
    #[arg(long)]
    max_points: Option<usize>,

    /// Keep consecutive identical fixes instead of dropping them.
    #[arg(long)]
    allow_repeated: bool,

    /// Append the first fix to the end if the track is not closed.
    #[arg(long)]
    close_ring: bool,

    /// Column delimiter for input and output.
    #[arg(long, default_value = ReaderConfig::DEFAULT_DELIMITER)]
    delimiter: String,

    /// Skip the first non-comment line (a row of column names).
    #[arg(long)]
    skip_first_record: bool,

    /// Zero-based column holding the fix label.
    #[arg(long, default_value_t = 0)]
    label_column: usize,

    /// Zero-based column holding the longitude.
    #[arg(long, default_value_t = ReaderConfig::DEFAULT_LON_COLUMN)]
    lon_column: usize,

    /// Zero-based column holding the latitude.
    #[arg(long, default_value_t = ReaderConfig::DEFAULT_LAT_COLUMN)]
    lat_column: usize,

    /// Omit the `//` comment header from the output.
    #[arg(long)]
    no_header: bool,

    /// Print run diagnostics as JSON on stdout.
    #[arg(long, requires = "output")]
    json: bool,

    /// Full run config as a JSON string.
    ///
    /// When provided, all other simplification and reader flags are
    /// ignored. Shape: `{"simplify": {"distance_tolerance": ...},
    /// "reader": {...}}`; `reader` may be omitted.
    #[arg(long)]
    config_json: Option<String>,

    /// Log more detail (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Log warnings and errors only.
    #[arg(short, long)]
    quiet: bool,
}

/// Simplification and reader settings for one run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RunConfig {
    simplify: SimplifyConfig,
    #[serde(default)]
    reader: ReaderConfig,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("--tolerance is required")]
    MissingTolerance,

    #[error("invalid --config-json")]
    ConfigJson(#[source] serde_json::Error),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to stdout")]
    Stdout(#[source] std::io::Error),

    #[error("failed to parse {}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error(transparent)]
    Nav(#[from] NavError),

    #[error("input has {count} records, more than --max-points {max}")]
    TooManyPoints { count: usize, max: usize },

    #[error("failed to serialize diagnostics")]
    Diagnostics(#[source] serde_json::Error),
}

/// Build a [`RunConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<RunConfig, CliError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(CliError::ConfigJson);
    }

    let tolerance = cli.tolerance.ok_or(CliError::MissingTolerance)?;
    Ok(RunConfig {
        simplify: SimplifyConfig {
            allow_repeated: cli.allow_repeated,
            close_ring: cli.close_ring,
            ..SimplifyConfig::new(tolerance)
        },
        reader: ReaderConfig {
            delimiter: cli.delimiter.clone(),
            skip_first_record: cli.skip_first_record,
            label_column: cli.label_column,
            lon_column: cli.lon_column,
            lat_column: cli.lat_column,
            ..ReaderConfig::default()
        },
    })
}

const fn level_filter(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::WARN;
    }
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = config_from_cli(cli)?;
    config.simplify.validate()?;

    let text = std::fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;
    let points =
        parse_points(&text, &config.reader).map_err(|source| CliError::Format {
            path: cli.input.clone(),
            source,
        })?;
    info!(
        path = %cli.input.display(),
        samples = points.len(),
        "read input samples"
    );

    if let Some(max) = cli.max_points
        && points.len() > max
    {
        return Err(CliError::TooManyPoints {
            count: points.len(),
            max,
        });
    }

    let (control_points, diagnostics) = simplify_with_diagnostics(points, &config.simplify)?;
    info!(samples = control_points.len(), "wrote output samples");
    debug!("\n{}", diagnostics.report());

    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let description = format!(
        "Distance tolerance [deg]: {}",
        config.simplify.distance_tolerance
    );
    let metadata = NavMetadata {
        header: !cli.no_header,
        source: file_name(&cli.input),
        description: Some(&description),
        created: Some(&created),
    };
    let out = to_r2rnav(control_points.points(), &config.reader.delimiter, &metadata);

    match cli.output {
        Some(ref path) => std::fs::write(path, &out).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?,
        None => std::io::stdout()
            .lock()
            .write_all(out.as_bytes())
            .map_err(CliError::Stdout)?,
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&diagnostics).map_err(CliError::Diagnostics)?;
        println!("{json}");
    }

    Ok(())
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Render an error with its chain of causes on one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(level_filter(cli.verbose, cli.quiet))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", error_chain(&e));
            ExitCode::FAILURE
        }
    }
}
