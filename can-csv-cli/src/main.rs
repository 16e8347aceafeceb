//! CAN CSV Converter CLI Application
//!
//! Command-line front end for the can-csv-decoder library. It adds:
//! - Argument parsing and an optional TOML configuration file
//! - Logging setup
//! - The end-of-run summary and process exit status

use anyhow::{Context, Result};
use can_csv_decoder::{
    DecoderConfig, FileNaming, Pipeline, RunSummary, TemperatureBias,
};
use clap::Parser;
use std::path::PathBuf;

mod config;

use config::Preset;

/// Default input log name used by the data logger
const DEFAULT_INPUT: &str = "logFile.can";

/// CAN CSV Converter - Decode a semicolon-delimited CAN log into per-ID CSV files
#[derive(Parser, Debug)]
#[command(name = "can-csv")]
#[command(about = "Decode a semicolon-delimited CAN log into per-ID CSV files", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the CAN log to decode [default: logFile.can]
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Directory for the CSV files
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start from a named layout
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Direction of the 40 C temperature offset
    #[arg(long, value_enum)]
    bias: Option<BiasArg>,

    /// Output file naming
    #[arg(long, value_enum)]
    naming: Option<NamingArg>,

    /// Write the identifier column in every file
    #[arg(long, conflicts_with = "no_id_column")]
    id_column: bool,

    /// Leave the identifier column out, even if the preset or file sets it
    #[arg(long)]
    no_id_column: bool,

    /// Identifier to copy through undecoded (can be repeated)
    #[arg(long = "raw-id", value_name = "ID", conflicts_with = "no_raw_ids")]
    raw_ids: Vec<String>,

    /// Copy no identifiers through undecoded
    #[arg(long)]
    no_raw_ids: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum BiasArg {
    Add,
    Subtract,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum NamingArg {
    Plain,
    Timestamped,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN CSV Converter v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", can_csv_decoder::VERSION);

    let (input, decoder_config) = resolve_config(&args)?;
    log::debug!("Decoder configuration: {:?}", decoder_config);

    let mut pipeline = Pipeline::new(decoder_config)?;
    let summary = pipeline
        .run(&input)
        .with_context(|| format!("Failed to decode {:?}", input))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !args.quiet {
        print_summary(&summary);
    }

    Ok(())
}

/// Merge the configuration file (if any) with command line overrides
fn resolve_config(args: &Args) -> Result<(PathBuf, DecoderConfig)> {
    let file_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            Some(config::load_config(path)?)
        }
        None => None,
    };

    let mut decoder_config = match (args.preset, &file_config) {
        (Some(preset), Some(file)) if file.decoder.is_some() => {
            log::warn!(
                "--preset {:?} replaces the [decoder] table of the configuration file",
                preset
            );
            preset.config()
        }
        (Some(preset), _) => preset.config(),
        (None, Some(file)) => file.decoder_config(),
        (None, None) => DecoderConfig::default(),
    };

    if let Some(bias) = args.bias {
        decoder_config = decoder_config.with_temperature_bias(match bias {
            BiasArg::Add => TemperatureBias::Add,
            BiasArg::Subtract => TemperatureBias::Subtract,
        });
    }
    if let Some(naming) = args.naming {
        decoder_config = decoder_config.with_file_naming(match naming {
            NamingArg::Plain => FileNaming::Plain,
            NamingArg::Timestamped => FileNaming::Timestamped,
        });
    }
    if args.id_column {
        decoder_config = decoder_config.with_id_column(true);
    } else if args.no_id_column {
        decoder_config = decoder_config.with_id_column(false);
    }
    if args.no_raw_ids {
        decoder_config = decoder_config.with_raw_ids(Vec::new());
    } else if !args.raw_ids.is_empty() {
        decoder_config = decoder_config.with_raw_ids(args.raw_ids.clone());
    }
    if let Some(dir) = &args.output_dir {
        decoder_config = decoder_config.with_output_dir(dir);
    }

    let input = args
        .input
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.input.file.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));

    Ok((input, decoder_config))
}

fn print_summary(summary: &RunSummary) {
    println!("\nDecoding finished.");
    println!("   Lines processed: {}", summary.lines_processed);
    println!("   Entries written: {}", summary.rows_written);
    if summary.parse_errors > 0 || summary.decode_errors > 0 {
        println!(
            "   Skipped: {} parse errors, {} decode errors",
            summary.parse_errors, summary.decode_errors
        );
    }
    for output in &summary.outputs {
        println!("   {} -> {} ({} rows)", output.identifier, output.path.display(), output.rows);
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
