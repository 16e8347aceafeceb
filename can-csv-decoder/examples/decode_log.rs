//! Standalone CAN log to CSV conversion
//!
//! Usage:
//!   decode_log <log_file.can> [output_dir] [--legacy]
//!
//! Example:
//!   decode_log CANbus.can csv --legacy

use can_csv_decoder::{CollectingDiagnostics, DecoderConfig, Pipeline};
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let legacy = args.iter().any(|a| a == "--legacy");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let Some(input) = positional.first().map(PathBuf::from) else {
        eprintln!("Usage: decode_log <log_file.can> [output_dir] [--legacy]");
        std::process::exit(2);
    };
    let output_dir = positional
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let base = if legacy {
        DecoderConfig::legacy()
    } else {
        DecoderConfig::extended()
    };
    let config = base.with_output_dir(output_dir);

    let mut pipeline = match Pipeline::with_diagnostics(config, CollectingDiagnostics::new()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match pipeline.run(&input) {
        Ok(summary) => {
            println!("\n=== CONVERSION SUMMARY ===");
            println!("Lines processed: {}", summary.lines_processed);
            println!("Rows written: {}", summary.rows_written);
            for output in &summary.outputs {
                println!("  {:<8} {:>8} rows  {}", output.identifier, output.rows, output.path.display());
            }

            let diagnostics = pipeline.diagnostics();
            if !diagnostics.diagnostics.is_empty() {
                println!("\nFirst problems:");
                for d in diagnostics.diagnostics.iter().take(10) {
                    println!("  {}", d);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
