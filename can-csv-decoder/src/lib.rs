//! CAN CSV Decoder Library
//!
//! Decodes semicolon-delimited CAN logs into one CSV file per tracked message
//! identifier, converting raw payload bytes into physical values.
//!
//! # Architecture
//!
//! - Parses the log one line at a time into `LogRecord`s
//! - Dispatches each record to the decoder for its identifier's group
//!   (motor, temperature, fault, raw passthrough)
//! - Appends a formatted row to that identifier's CSV sink
//! - Reports per-line problems through a `DiagnosticSink` without stopping
//!
//! # Output format
//!
//! Rows are comma separated and end in a bare `\n`, never `\r\n`, on every
//! platform. Payload tokens are hex bytes; a token above `FF` does not fit a
//! byte and is reported as a decode error for that line.
//!
//! The library does NOT:
//! - Capture live bus traffic
//! - Decode signals from DBC files
//! - Validate checksums
//!
//! # Example Usage
//!
//! ```no_run
//! use can_csv_decoder::{DecoderConfig, Pipeline, TemperatureBias};
//! use std::path::Path;
//!
//! let config = DecoderConfig::extended()
//!     .with_temperature_bias(TemperatureBias::Subtract)
//!     .with_output_dir("out");
//!
//! let mut pipeline = Pipeline::new(config).unwrap();
//! let summary = pipeline.run(Path::new("logFile.can")).unwrap();
//!
//! println!("Lines processed: {}", summary.lines_processed);
//! println!("Entries written: {}", summary.rows_written);
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod decoders;
pub mod diagnostics;
pub mod formats;
pub mod pipeline;
pub mod sink;
pub mod types;

// Re-export main types for convenience
pub use config::{DecoderConfig, FileNaming, TemperatureBias};
pub use decoder::DispatchTable;
pub use diagnostics::{
    CollectingDiagnostics, Diagnostic, DiagnosticKind, DiagnosticSink, LogDiagnostics,
};
pub use pipeline::{Pipeline, PipelineState, RunSummary};
pub use sink::{OutputSummary, SinkRegistry};
pub use types::{DecodedSample, DecoderError, LogRecord, MessageGroup, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
