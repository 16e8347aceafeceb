//! Log file format parsers
//!
//! This module contains the parser for semicolon-delimited text logs.
//! Parsers implement an iterator pattern over `LogRecord` objects.

use crate::types::{LogRecord, Result};
use std::path::Path;

pub mod semicolon;

// Re-export parser types
pub use semicolon::{parse_line, LogLineIterator, SemicolonParser, MIN_FIELDS};

/// Common trait for log file parsers
///
/// Each parser returns an iterator over records. Lines that are not records
/// at all are skipped by the iterator; lines that look like records but
/// fail to parse are yielded as line-level errors.
pub trait LogFileParser: Iterator<Item = Result<LogRecord>> + Sized {
    /// Open a log file and return an iterator over its records
    ///
    /// Fails with `InputMissing` if `path` is not an existing regular file.
    fn parse(path: &Path, delimiter: char) -> Result<Self>;
}
