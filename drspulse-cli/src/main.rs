//! drspulse CLI
//!
//! Aligns DRS4 waveforms on their trigger and measures pulse heights and
//! integrals.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

use clap::{Parser, Subcommand, ValueEnum};
use drspulse_algorithms::analyze;
use drspulse_core::config::{
    DEFAULT_CANONICAL_LENGTH, DEFAULT_INTEGRATION_HALF_WIDTH, DEFAULT_POLARITY_SAMPLE_EVENTS,
    DEFAULT_REFERENCE_CHANNEL, DEFAULT_SIGNAL_CHANNEL, DEFAULT_TRIGGER_SETPOINT,
};
use drspulse_core::{AnalysisConfig, EventSource};
use drspulse_io::{load_events, write_analysis_csv, DrsFileReader, OutputPaths, RunSummary};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    DrspulseIo(#[from] drspulse_io::Error),

    #[error("Analysis error: {0}")]
    Core(#[from] drspulse_core::Error),

    #[error("{0} output requires the `hdf5` feature")]
    Unsupported(&'static str),
}

/// Output format for analysis results.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// CSV tables plus a JSON summary
    Csv,
    /// One HDF5 file plus a JSON summary
    Hdf5,
}

/// DRS4 waveform alignment and pulse-metrics analysis.
#[derive(Parser)]
#[command(name = "drspulse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align events, build the mean pulse and measure every event
    Analyze {
        /// Input waveform file (.drs, or .h5 with the hdf5 feature)
        input: PathBuf,

        /// Signal channel
        #[arg(short, long, default_value_t = DEFAULT_SIGNAL_CHANNEL)]
        channel: usize,

        /// Sample index the trigger extremum is aligned to
        #[arg(short, long, default_value_t = DEFAULT_TRIGGER_SETPOINT)]
        trigger: usize,

        /// Length of the canonical sample axis
        #[arg(long, default_value_t = DEFAULT_CANONICAL_LENGTH)]
        length: usize,

        /// Half-width of the integration window (samples)
        #[arg(long, default_value_t = DEFAULT_INTEGRATION_HALF_WIDTH)]
        half_width: usize,

        /// Leading events overlaid to decide the polarity
        #[arg(long, default_value_t = DEFAULT_POLARITY_SAMPLE_EVENTS)]
        polarity_events: usize,

        /// Trigger-reference channel
        #[arg(long, default_value_t = DEFAULT_REFERENCE_CHANNEL)]
        reference_channel: usize,

        /// Directory for output files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a waveform file
    Info {
        /// Input waveform file
        input: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            channel,
            trigger,
            length,
            half_width,
            polarity_events,
            reference_channel,
            output_dir,
            format,
            verbose,
        } => {
            init_logging(verbose);

            let config = AnalysisConfig::new()
                .with_signal_channel(channel)
                .with_reference_channel(reference_channel)
                .with_trigger_setpoint(trigger)
                .with_canonical_length(length)
                .with_integration_half_width(half_width)
                .with_polarity_sample_events(polarity_events);
            config.validate()?;

            println!(
                "Processing file: {}, channel {}, trigger position {}",
                input.display(),
                channel,
                trigger
            );

            let start = Instant::now();
            let events = load_events(&input)?;
            info!(
                "Loaded {} events of {} channels x {} samples",
                events.len(),
                events.num_channels,
                events.samples_per_channel
            );

            let result = analyze(&events, &config)?;
            println!("Polarity: {}", result.calibration.polarity);
            println!("Signal peak is at sample: {}", result.calibration.peak_index);
            println!("mean pulse height: {}", result.mean_pulse());

            std::fs::create_dir_all(&output_dir)?;
            let paths = OutputPaths::new(&output_dir, &input);
            info!(
                "Writing {} outputs to {}",
                paths.stem(),
                output_dir.display()
            );
            let mut written = match format {
                OutputFormat::Csv => write_analysis_csv(&result, &paths)?,
                OutputFormat::Hdf5 => write_hdf5(&paths, &config, &result)?,
            };
            RunSummary::new(&input, &config, &result).write_json(paths.summary())?;
            written.push(paths.summary());

            for path in &written {
                info!("Wrote {}", path.display());
            }
            println!(
                "Analyzed {} events in {:.2}s",
                result.metrics.len(),
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Info { input } => {
            init_logging(false);
            println!("File: {}", input.display());

            let events = if is_hdf5(&input) {
                load_events(&input)?
            } else {
                let reader = DrsFileReader::open(&input)?;
                let file_size = reader.file_size();
                println!(
                    "Size: {} bytes ({:.2} MB)",
                    file_size,
                    file_size as f64 / 1_000_000.0
                );
                println!("Format version: {}", reader.header().version);
                reader.read_batch()
            };

            println!("Events: {}", events.len());
            println!("Channels: {}", events.num_channels);
            println!("Samples per channel: {}", events.samples_per_channel);
            if let Some((low, high)) = events.extremum_range() {
                println!("Extremum index range: {} - {}", low, high);
            }
        }
    }

    Ok(())
}

fn is_hdf5(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("h5") || e.eq_ignore_ascii_case("hdf5"))
}

#[cfg(feature = "hdf5")]
fn write_hdf5(
    paths: &OutputPaths,
    config: &AnalysisConfig,
    result: &drspulse_algorithms::AnalysisResult,
) -> Result<Vec<PathBuf>> {
    drspulse_io::write_analysis_hdf5(paths.hdf5(), config, result)?;
    Ok(vec![paths.hdf5()])
}

#[cfg(not(feature = "hdf5"))]
fn write_hdf5(
    _paths: &OutputPaths,
    _config: &AnalysisConfig,
    _result: &drspulse_algorithms::AnalysisResult,
) -> Result<Vec<PathBuf>> {
    Err(CliError::Unsupported("HDF5"))
}
