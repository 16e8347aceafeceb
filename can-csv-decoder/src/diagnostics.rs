//! Per-line diagnostics
//!
//! Parse and decode failures never stop a run. They are handed to a
//! `DiagnosticSink`, which decides where they go: the log facade by default,
//! or an in-memory list for callers that want to inspect them.

use crate::types::DecoderError;
use log::Level;
use std::fmt;

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Timestamp or byte count could not be parsed
    FieldParse,
    /// Payload could not be decoded
    Decode,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::FieldParse => write!(f, "Parse error"),
            DiagnosticKind::Decode => write!(f, "Decode error"),
        }
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    /// 1-based input line number
    pub line_number: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    /// Build a diagnostic from a line-level error
    ///
    /// Returns `None` for errors that are not tied to a line.
    pub fn from_error(error: &DecoderError) -> Option<Self> {
        let (kind, message) = match error {
            DecoderError::FieldParse { field, reason, .. } => {
                (DiagnosticKind::FieldParse, format!("invalid {}: {}", field, reason))
            }
            DecoderError::Decode { reason, .. } => (DiagnosticKind::Decode, reason.clone()),
            _ => return None,
        };

        Some(Self {
            level: Level::Warn,
            line_number: error.line()?,
            kind,
            message,
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Line {}] {}: {}", self.line_number, self.kind, self.message)
    }
}

/// Destination for diagnostics
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Default)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::log!(diagnostic.level, "{}", diagnostic);
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line numbers of all reported diagnostics, in order
    pub fn lines(&self) -> Vec<usize> {
        self.diagnostics.iter().map(|d| d.line_number).collect()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }
}

impl DiagnosticSink for CollectingDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
