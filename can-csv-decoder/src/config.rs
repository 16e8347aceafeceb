//! Decoder configuration types
//!
//! One configuration covers both historical output layouts: the temperature
//! bias direction, the output file naming, the identifier column and the set
//! of identifiers copied through undecoded are all settings of the same
//! pipeline.

use crate::types::{DecoderError, MessageGroup, Result};
use chrono::{DateTime, Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Fixed Celsius offset stored in temperature bytes
pub const TEMPERATURE_OFFSET_C: f64 = 40.0;

/// Direction of the 40 °C offset applied to raw temperature bytes
///
/// Both directions exist in deployed tooling and no hardware reference has
/// settled which one the controller uses, so it stays a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureBias {
    /// Celsius = raw + 40
    Add,
    /// Celsius = raw - 40
    Subtract,
}

impl TemperatureBias {
    /// Convert a raw temperature byte to Celsius
    pub fn to_celsius(&self, raw: u8) -> f64 {
        match self {
            TemperatureBias::Add => raw as f64 + TEMPERATURE_OFFSET_C,
            TemperatureBias::Subtract => raw as f64 - TEMPERATURE_OFFSET_C,
        }
    }
}

/// Output file naming strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileNaming {
    /// `<id>.csv`
    Plain,
    /// `<id>-<year>-<month>-<day>-<hour>-<minute>.csv`
    Timestamped,
}

impl FileNaming {
    /// Build the output file name for an identifier
    ///
    /// A leading `0x`/`0X` prefix is dropped from the identifier. Timestamp
    /// fields are not zero-padded.
    pub fn file_name(&self, identifier: &str, generated_at: &DateTime<Local>) -> String {
        let stem = file_stem(identifier);

        match self {
            FileNaming::Plain => format!("{}.csv", stem),
            FileNaming::Timestamped => format!(
                "{}-{}-{}-{}-{}-{}.csv",
                stem,
                generated_at.year(),
                generated_at.month(),
                generated_at.day(),
                generated_at.hour(),
                generated_at.minute()
            ),
        }
    }
}

/// Identifier with a leading `0x`/`0X` removed, as used in file names
pub fn file_stem(identifier: &str) -> &str {
    identifier
        .strip_prefix("0x")
        .or_else(|| identifier.strip_prefix("0X"))
        .unwrap_or(identifier)
}

/// Configuration for the decoding pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Identifiers decoded as motor controller frames
    #[serde(default = "default_motor_ids")]
    pub motor_ids: Vec<String>,

    /// Identifiers decoded as temperature frames
    #[serde(default = "default_temperature_ids")]
    pub temperature_ids: Vec<String>,

    /// Identifiers decoded as state-of-charge/fault frames
    #[serde(default = "default_fault_ids")]
    pub fault_ids: Vec<String>,

    /// Identifiers whose bytes are copied through undecoded
    #[serde(default = "default_raw_ids")]
    pub raw_ids: Vec<String>,

    /// Offset direction for temperature bytes
    #[serde(default = "default_bias")]
    pub temperature_bias: TemperatureBias,

    /// Output file naming strategy
    #[serde(default = "default_naming")]
    pub file_naming: FileNaming,

    /// Write the identifier as the second column of every row
    #[serde(default)]
    pub include_id_column: bool,

    /// Field delimiter of the input log
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Directory the CSV files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_motor_ids() -> Vec<String> {
    vec!["0x400".to_string(), "0x401".to_string()]
}

fn default_temperature_ids() -> Vec<String> {
    vec!["0x402".to_string(), "0x403".to_string()]
}

fn default_fault_ids() -> Vec<String> {
    vec!["0x404".to_string(), "0x405".to_string()]
}

fn default_raw_ids() -> Vec<String> {
    vec!["0x500".to_string()]
}

fn default_bias() -> TemperatureBias {
    TemperatureBias::Subtract
}

fn default_naming() -> FileNaming {
    FileNaming::Timestamped
}

fn default_delimiter() -> char {
    ';'
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::extended()
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout of the original six-file converter
    ///
    /// Adds the temperature offset, writes `<id>.csv` and includes the
    /// identifier column.
    pub fn legacy() -> Self {
        Self {
            motor_ids: default_motor_ids(),
            temperature_ids: default_temperature_ids(),
            fault_ids: default_fault_ids(),
            raw_ids: Vec::new(),
            temperature_bias: TemperatureBias::Add,
            file_naming: FileNaming::Plain,
            include_id_column: true,
            delimiter: default_delimiter(),
            output_dir: default_output_dir(),
        }
    }

    /// Layout of the extended converter
    ///
    /// Subtracts the temperature offset, timestamps file names and copies
    /// `0x500` through as raw bytes.
    pub fn extended() -> Self {
        Self {
            raw_ids: default_raw_ids(),
            temperature_bias: TemperatureBias::Subtract,
            file_naming: FileNaming::Timestamped,
            include_id_column: false,
            ..Self::legacy()
        }
    }

    /// Builder method: set the temperature bias direction
    pub fn with_temperature_bias(mut self, bias: TemperatureBias) -> Self {
        self.temperature_bias = bias;
        self
    }

    /// Builder method: set the file naming strategy
    pub fn with_file_naming(mut self, naming: FileNaming) -> Self {
        self.file_naming = naming;
        self
    }

    /// Builder method: enable or disable the identifier column
    pub fn with_id_column(mut self, enabled: bool) -> Self {
        self.include_id_column = enabled;
        self
    }

    /// Builder method: add a raw passthrough identifier
    pub fn add_raw_id(mut self, identifier: impl Into<String>) -> Self {
        self.raw_ids.push(identifier.into());
        self
    }

    /// Builder method: replace the raw passthrough identifiers
    pub fn with_raw_ids(mut self, identifiers: Vec<String>) -> Self {
        self.raw_ids = identifiers;
        self
    }

    /// Builder method: set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Builder method: set the input field delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// All tracked identifiers with their group, in configuration order
    pub fn tracked(&self) -> Vec<(String, MessageGroup)> {
        let groups = [
            (&self.motor_ids, MessageGroup::Motor),
            (&self.temperature_ids, MessageGroup::Temperature),
            (&self.fault_ids, MessageGroup::Fault),
            (&self.raw_ids, MessageGroup::Raw),
        ];

        groups
            .iter()
            .flat_map(|(ids, group)| ids.iter().map(move |id| (id.clone(), *group)))
            .collect()
    }

    /// Check that every identifier maps to exactly one group and one file
    ///
    /// File stems are compared case-insensitively.
    pub fn validate(&self) -> Result<()> {
        let tracked = self.tracked();
        if tracked.is_empty() {
            return Err(DecoderError::InvalidConfig(
                "no identifiers are tracked".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut stems: HashMap<String, &str> = HashMap::new();
        for (id, group) in &tracked {
            if id.is_empty() {
                return Err(DecoderError::InvalidConfig(format!(
                    "empty identifier in {} group",
                    group
                )));
            }
            if !seen.insert(id.as_str()) {
                return Err(DecoderError::InvalidConfig(format!(
                    "identifier {} is listed in more than one group",
                    id
                )));
            }
            if let Some(other) = stems.insert(file_stem(id).to_lowercase(), id.as_str()) {
                return Err(DecoderError::InvalidConfig(format!(
                    "identifiers {} and {} would write the same output file",
                    other, id
                )));
            }
        }

        Ok(())
    }
}
