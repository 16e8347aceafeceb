//! Log-to-CSV pipeline
//!
//! A `Pipeline` owns everything one run needs: the dispatch table, the sink
//! registry and the time base. Records flow one at a time:
//! line → `LogRecord` → `DecodedSample` → CSV row.
//!
//! State machine:
//! - `Uninitialized`: no tracked record seen yet
//! - `Running`: time base captured from the first tracked record
//! - `Finished`: input exhausted, sinks flushed and closed

use crate::config::DecoderConfig;
use crate::decoder::DispatchTable;
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogDiagnostics};
use crate::formats::{LogFileParser, LogLineIterator};
use crate::sink::{OutputSummary, SinkRegistry};
use crate::types::{DecoderError, LogRecord, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Pipeline lifecycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineState {
    Uninitialized,
    Running { time_base: f64 },
    Finished,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Every line read, including skipped ones
    pub lines_processed: usize,
    /// Rows appended to any output file
    pub rows_written: usize,
    pub parse_errors: usize,
    pub decode_errors: usize,
    /// Timestamp of the first tracked record, if any
    pub time_base: Option<f64>,
    pub outputs: Vec<OutputSummary>,
}

/// One decoding run
pub struct Pipeline<D: DiagnosticSink = LogDiagnostics> {
    config: DecoderConfig,
    table: DispatchTable,
    diagnostics: D,
    generated_at: DateTime<Local>,
    state: PipelineState,
    summary: RunSummary,
}

impl Pipeline<LogDiagnostics> {
    /// Create a pipeline that reports diagnostics through `log`
    pub fn new(config: DecoderConfig) -> Result<Self> {
        Self::with_diagnostics(config, LogDiagnostics)
    }
}

impl<D: DiagnosticSink> Pipeline<D> {
    /// Create a pipeline with a custom diagnostics destination
    pub fn with_diagnostics(config: DecoderConfig, diagnostics: D) -> Result<Self> {
        let table = DispatchTable::from_config(&config)?;
        Ok(Self {
            config,
            table,
            diagnostics,
            generated_at: Local::now(),
            state: PipelineState::Uninitialized,
            summary: RunSummary::default(),
        })
    }

    /// Builder method: fix the time used for timestamped file names
    pub fn with_generated_at(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> D {
        self.diagnostics
    }

    /// Decode a log file into CSV files
    ///
    /// Fails with `InputMissing` before any output file is created if `path`
    /// is not a readable file. Per-line problems are reported and skipped.
    pub fn run(&mut self, path: &Path) -> Result<RunSummary> {
        let records = LogLineIterator::<BufReader<File>>::parse(path, self.config.delimiter)?;
        self.run_records(records)
    }

    /// Decode any line-oriented reader into CSV files
    pub fn run_reader<R: BufRead>(&mut self, reader: R) -> Result<RunSummary> {
        let records = LogLineIterator::new(reader, self.config.delimiter);
        self.run_records(records)
    }

    fn run_records<R: BufRead>(&mut self, mut records: LogLineIterator<R>) -> Result<RunSummary> {
        self.state = PipelineState::Uninitialized;
        self.summary = RunSummary::default();

        let mut sinks = SinkRegistry::open(&self.config, &self.table, &self.generated_at)?;
        log::info!("Decoding {} tracked identifiers", sinks.len());

        for item in records.by_ref() {
            match item {
                Ok(record) => self.process_record(&record, &mut sinks)?,
                Err(e) if e.is_line_level() => self.report(&e),
                Err(e) => return Err(e),
            }
        }

        self.summary.lines_processed = records.lines_read();
        self.summary.outputs = sinks.finish()?;
        self.state = PipelineState::Finished;

        log::info!(
            "Finished: {} lines processed, {} rows written",
            self.summary.lines_processed,
            self.summary.rows_written
        );

        Ok(self.summary.clone())
    }

    fn process_record(&mut self, record: &LogRecord, sinks: &mut SinkRegistry) -> Result<()> {
        if !self.table.is_tracked(&record.identifier) {
            return Ok(());
        }

        let time_base = self.time_base_for(record);
        let relative_time = record.timestamp - time_base;

        match self.table.decode(record) {
            Ok(Some(sample)) => {
                if sinks.append(&record.identifier, relative_time, &sample)? {
                    self.summary.rows_written += 1;
                }
            }
            Ok(None) => {}
            Err(e) if e.is_line_level() => self.report(&e),
            Err(e) => return Err(e),
        }

        Ok(())
    }

    /// Time base of the run, captured from the first tracked record
    fn time_base_for(&mut self, record: &LogRecord) -> f64 {
        match self.state {
            PipelineState::Running { time_base } => time_base,
            _ => {
                log::debug!(
                    "Time base {} from line {} ({})",
                    record.timestamp,
                    record.line_number,
                    record.identifier
                );
                self.state = PipelineState::Running {
                    time_base: record.timestamp,
                };
                self.summary.time_base = Some(record.timestamp);
                record.timestamp
            }
        }
    }

    fn report(&mut self, error: &DecoderError) {
        match error {
            DecoderError::FieldParse { .. } => self.summary.parse_errors += 1,
            DecoderError::Decode { .. } => self.summary.decode_errors += 1,
            _ => {}
        }
        if let Some(diagnostic) = Diagnostic::from_error(error) {
            self.diagnostics.report(diagnostic);
        }
    }
}
