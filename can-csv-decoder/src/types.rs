//! Core types for the CAN CSV decoder library
//!
//! This module defines the records read from a semicolon-delimited log, the
//! decoded samples produced for each tracked identifier, and the error type
//! shared by every stage of the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// One parsed line of the input log
///
/// This represents a single record as read from the log file, before the
/// payload is interpreted by any decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// 1-based line number in the source file
    pub line_number: usize,
    /// Timestamp in seconds, as written in the log
    pub timestamp: f64,
    /// Message identifier token (e.g. "0x400"), compared verbatim
    pub identifier: String,
    /// Byte count declared by the record
    pub declared_len: usize,
    /// Raw byte tokens, at most `declared_len` of them
    pub data: Vec<String>,
}

/// Decoder family an identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageGroup {
    /// Motor controller channel: current, speed, odometer
    Motor,
    /// Inverter and motor temperatures
    Temperature,
    /// State of charge and fault reporting
    Fault,
    /// Undecoded bytes copied through
    Raw,
}

impl MessageGroup {
    /// Column names following `time` (and `id`, when enabled)
    pub fn columns(&self) -> Vec<String> {
        match self {
            MessageGroup::Motor => vec![
                "motor_current".to_string(),
                "vehicle_speed_kph".to_string(),
                "odometer_km".to_string(),
            ],
            MessageGroup::Temperature => {
                vec!["inverter_temp_F".to_string(), "motor_temp_F".to_string()]
            }
            MessageGroup::Fault => vec![
                "state_of_charge".to_string(),
                "fault_code".to_string(),
                "fault_level".to_string(),
            ],
            MessageGroup::Raw => (0..crate::decoders::raw::RAW_COLUMNS)
                .map(|i| format!("byte{}", i))
                .collect(),
        }
    }
}

impl fmt::Display for MessageGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageGroup::Motor => write!(f, "motor"),
            MessageGroup::Temperature => write!(f, "temperature"),
            MessageGroup::Fault => write!(f, "fault"),
            MessageGroup::Raw => write!(f, "raw"),
        }
    }
}

/// Physical values decoded from one record
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedSample {
    /// Motor controller frame
    Motor {
        /// Motor current, tenths resolution
        motor_current: f64,
        /// Vehicle speed in km/h, tenths resolution
        vehicle_speed: f64,
        /// Odometer in km, hundredths resolution
        odometer: f64,
    },

    /// Temperature frame, both values in Fahrenheit
    Temperature {
        inverter_temp_f: f64,
        motor_temp_f: f64,
    },

    /// Battery/fault frame
    Fault {
        /// State of charge in percent (not range-checked)
        state_of_charge: u8,
        /// Fault code (byte 2 of the payload)
        fault_code: u8,
        /// Fault level (byte 1 of the payload)
        fault_level: u8,
    },

    /// Raw tokens copied through, always `RAW_COLUMNS` long
    Raw { bytes: Vec<String> },
}

impl DecodedSample {
    /// Format the value columns of this sample
    ///
    /// Motor current and speed use one decimal, odometer two, temperatures
    /// one. Fault values are plain integers. Raw tokens are written as-is.
    pub fn to_fields(&self) -> Vec<String> {
        match self {
            DecodedSample::Motor {
                motor_current,
                vehicle_speed,
                odometer,
            } => vec![
                format!("{:.1}", motor_current),
                format!("{:.1}", vehicle_speed),
                format!("{:.2}", odometer),
            ],
            DecodedSample::Temperature {
                inverter_temp_f,
                motor_temp_f,
            } => vec![
                format!("{:.1}", inverter_temp_f),
                format!("{:.1}", motor_temp_f),
            ],
            DecodedSample::Fault {
                state_of_charge,
                fault_code,
                fault_level,
            } => vec![
                state_of_charge.to_string(),
                fault_code.to_string(),
                fault_level.to_string(),
            ],
            DecodedSample::Raw { bytes } => bytes.clone(),
        }
    }

    /// Group this sample was produced by
    pub fn group(&self) -> MessageGroup {
        match self {
            DecodedSample::Motor { .. } => MessageGroup::Motor,
            DecodedSample::Temperature { .. } => MessageGroup::Temperature,
            DecodedSample::Fault { .. } => MessageGroup::Fault,
            DecodedSample::Raw { .. } => MessageGroup::Raw,
        }
    }
}

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Input file not found: {0:?}")]
    InputMissing(PathBuf),

    #[error("Line {line}: invalid {field}: {reason}")]
    FieldParse {
        line: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Line {line}: {reason}")]
    Decode { line: usize, reason: String },

    #[error("Failed to open output file {path:?}: {source}")]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl DecoderError {
    /// True for errors confined to a single input line
    pub fn is_line_level(&self) -> bool {
        matches!(
            self,
            DecoderError::FieldParse { .. } | DecoderError::Decode { .. }
        )
    }

    /// Line number for line-level errors
    pub fn line(&self) -> Option<usize> {
        match self {
            DecoderError::FieldParse { line, .. } | DecoderError::Decode { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}
