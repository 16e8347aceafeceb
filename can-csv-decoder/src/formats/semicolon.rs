//! Semicolon-delimited text log parser
//!
//! Record layout, one per line:
//!
//! ```text
//! timestamp;<unused>;identifier;byte_count;byte0;byte1;...
//! ```
//!
//! Lines with fewer than `MIN_FIELDS` fields (headers, blank lines, comments)
//! are skipped without an error. `byte_count` selects how many of the
//! following fields are payload; anything past that is ignored.

use super::LogFileParser;
use crate::types::{DecoderError, LogRecord, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Minimum number of fields for a line to be treated as a record
pub const MIN_FIELDS: usize = 5;

const TIMESTAMP_FIELD: usize = 0;
const IDENTIFIER_FIELD: usize = 2;
const LENGTH_FIELD: usize = 3;
const DATA_START: usize = 4;

/// Parse one line of the log
///
/// # Returns
/// * `Ok(None)` if the line is too short to be a record
/// * `Ok(Some(record))` for a well-formed record
/// * `Err(DecoderError::FieldParse)` if the timestamp or byte count is invalid
pub fn parse_line(line: &str, line_number: usize, delimiter: char) -> Result<Option<LogRecord>> {
    let parts: Vec<&str> = line.trim().split(delimiter).collect();
    if parts.len() < MIN_FIELDS {
        return Ok(None);
    }

    let timestamp = parts[TIMESTAMP_FIELD]
        .trim()
        .parse::<f64>()
        .map_err(|e| DecoderError::FieldParse {
            line: line_number,
            field: "timestamp",
            reason: format!("{:?}: {}", parts[TIMESTAMP_FIELD], e),
        })?;

    let declared_len = parts[LENGTH_FIELD]
        .trim()
        .parse::<usize>()
        .map_err(|e| DecoderError::FieldParse {
            line: line_number,
            field: "byte count",
            reason: format!("{:?}: {}", parts[LENGTH_FIELD], e),
        })?;

    let end = DATA_START.saturating_add(declared_len).min(parts.len());
    let data = parts[DATA_START..end].iter().map(|s| s.to_string()).collect();

    Ok(Some(LogRecord {
        line_number,
        timestamp,
        identifier: parts[IDENTIFIER_FIELD].to_string(),
        declared_len,
        data,
    }))
}

/// Semicolon log parser
pub struct SemicolonParser;

impl SemicolonParser {
    /// Open a log file and return an iterator over its records
    pub fn parse(path: &Path, delimiter: char) -> Result<LogLineIterator<BufReader<File>>> {
        log::info!("Parsing log file: {:?}", path);

        if !path.is_file() {
            return Err(DecoderError::InputMissing(path.to_path_buf()));
        }

        let file = File::open(path)?;
        Ok(LogLineIterator::new(BufReader::new(file), delimiter))
    }
}

/// Iterator over records of a line-oriented log
///
/// Reads one line at a time; nothing beyond the current line is buffered.
pub struct LogLineIterator<R: BufRead> {
    reader: R,
    delimiter: char,
    lines_read: usize,
    buf: Vec<u8>,
    failed: bool,
}

impl<R: BufRead> LogLineIterator<R> {
    pub fn new(reader: R, delimiter: char) -> Self {
        Self {
            reader,
            delimiter,
            lines_read: 0,
            buf: Vec::new(),
            failed: false,
        }
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }
}

impl LogFileParser for LogLineIterator<BufReader<File>> {
    fn parse(path: &Path, delimiter: char) -> Result<Self> {
        SemicolonParser::parse(path, delimiter)
    }
}

impl<R: BufRead> Iterator for LogLineIterator<R> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    // A broken stream ends the iteration after reporting once
                    self.failed = true;
                    return Some(Err(e.into()));
                }
            }

            self.lines_read += 1;
            let line = String::from_utf8_lossy(&self.buf);

            match parse_line(&line, self.lines_read, self.delimiter) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {
                    log::trace!("Skipping line {}: not a record", self.lines_read);
                    continue;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
