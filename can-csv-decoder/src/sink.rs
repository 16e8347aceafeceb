//! CSV output sinks
//!
//! One `CsvSink` per tracked identifier, all owned by a `SinkRegistry`.
//! Sinks are created (with their header row) before the log is read and
//! flushed when the registry is finished. Dropping the registry closes every
//! file, so an aborted run never leaves handles open.

use crate::config::DecoderConfig;
use crate::decoder::DispatchTable;
use crate::types::{DecodedSample, DecoderError, MessageGroup, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Header row for a group
pub fn header(group: MessageGroup, include_id_column: bool) -> Vec<String> {
    let mut columns = vec!["time".to_string()];
    if include_id_column {
        columns.push("id".to_string());
    }
    columns.extend(group.columns());
    columns
}

/// Relative time column, always three decimals
pub fn format_time(relative_time: f64) -> String {
    format!("{:.3}", relative_time)
}

/// A single output file
pub struct CsvSink {
    identifier: String,
    group: MessageGroup,
    path: PathBuf,
    writer: csv::Writer<File>,
    include_id_column: bool,
    rows: usize,
}

impl CsvSink {
    /// Create the file and write its header
    pub fn create(
        path: &Path,
        identifier: &str,
        group: MessageGroup,
        include_id_column: bool,
    ) -> Result<Self> {
        let file = File::create(path).map_err(|source| DecoderError::SinkOpen {
            path: path.to_path_buf(),
            source,
        })?;

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);
        writer.write_record(header(group, include_id_column))?;

        Ok(Self {
            identifier: identifier.to_string(),
            group,
            path: path.to_path_buf(),
            writer,
            include_id_column,
            rows: 0,
        })
    }

    /// Append one decoded row
    pub fn write_sample(&mut self, relative_time: f64, sample: &DecodedSample) -> Result<()> {
        let mut record = vec![format_time(relative_time)];
        if self.include_id_column {
            record.push(self.identifier.clone());
        }
        record.extend(sample.to_fields());

        self.writer.write_record(&record)?;
        self.rows += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn group(&self) -> MessageGroup {
        self.group
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far (header excluded)
    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// Per-file entry of the run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSummary {
    pub identifier: String,
    pub group: MessageGroup,
    pub path: PathBuf,
    pub rows: usize,
}

/// Owned identifier → sink map for one run
pub struct SinkRegistry {
    sinks: HashMap<String, CsvSink>,
    /// Creation order, for a stable summary
    order: Vec<String>,
}

impl SinkRegistry {
    /// Open one sink per tracked identifier
    ///
    /// Creates the output directory if needed. On the first failure the
    /// sinks opened so far are dropped (and closed) before the error is
    /// returned.
    pub fn open(
        config: &DecoderConfig,
        table: &DispatchTable,
        generated_at: &DateTime<Local>,
    ) -> Result<Self> {
        let dir = &config.output_dir;
        fs::create_dir_all(dir).map_err(|source| DecoderError::SinkOpen {
            path: dir.clone(),
            source,
        })?;

        let mut sinks = HashMap::with_capacity(table.len());
        let mut order = Vec::with_capacity(table.len());

        for (identifier, group) in table.entries() {
            let path = dir.join(config.file_naming.file_name(identifier, generated_at));
            let sink = CsvSink::create(&path, identifier, group, config.include_id_column)?;
            log::info!("Opened: {}", path.display());

            sinks.insert(identifier.to_string(), sink);
            order.push(identifier.to_string());
        }

        Ok(Self { sinks, order })
    }

    /// Append a row to the sink of `identifier`
    ///
    /// Returns `Ok(false)` if no sink exists for the identifier.
    pub fn append(
        &mut self,
        identifier: &str,
        relative_time: f64,
        sample: &DecodedSample,
    ) -> Result<bool> {
        match self.sinks.get_mut(identifier) {
            Some(sink) => {
                sink.write_sample(relative_time, sample)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&CsvSink> {
        self.sinks.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Flush and close every sink
    pub fn finish(mut self) -> Result<Vec<OutputSummary>> {
        let mut outputs = Vec::with_capacity(self.order.len());

        for identifier in &self.order {
            if let Some(mut sink) = self.sinks.remove(identifier) {
                sink.flush()?;
                outputs.push(OutputSummary {
                    identifier: sink.identifier().to_string(),
                    group: sink.group(),
                    path: sink.path().to_path_buf(),
                    rows: sink.rows(),
                });
            }
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn generated_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_headers() {
        assert_eq!(
            header(MessageGroup::Motor, false),
            vec!["time", "motor_current", "vehicle_speed_kph", "odometer_km"]
        );
        assert_eq!(
            header(MessageGroup::Temperature, true),
            vec!["time", "id", "inverter_temp_F", "motor_temp_F"]
        );
        assert_eq!(header(MessageGroup::Raw, false).len(), 9);
    }

    #[test]
    fn test_time_format() {
        assert_eq!(format_time(0.0), "0.000");
        assert_eq!(format_time(1.23456), "1.235");
        assert_eq!(format_time(12.5), "12.500");
    }

    #[test]
    fn test_registry_opens_all_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let config = DecoderConfig::legacy().with_output_dir(dir.path());
        let table = DispatchTable::from_config(&config).unwrap();

        let registry = SinkRegistry::open(&config, &table, &generated_at()).unwrap();
        assert_eq!(registry.len(), 6);
        assert!(registry.get("0x400").is_some());

        let outputs = registry.finish().unwrap();
        assert_eq!(outputs.len(), 6);
        assert_eq!(outputs[0].path, dir.path().join("400.csv"));

        let content = fs::read_to_string(dir.path().join("404.csv")).unwrap();
        assert_eq!(content, "time,id,state_of_charge,fault_code,fault_level\n");
    }

    #[test]
    fn test_append_writes_row() {
        let dir = tempfile::tempdir().unwrap();
        let config = DecoderConfig::extended().with_output_dir(dir.path());
        let table = DispatchTable::from_config(&config).unwrap();
        let mut registry = SinkRegistry::open(&config, &table, &generated_at()).unwrap();

        let sample = DecodedSample::Fault {
            state_of_charge: 50,
            fault_code: 9,
            fault_level: 1,
        };
        assert!(registry.append("0x404", 0.25, &sample).unwrap());
        assert!(!registry.append("0x999", 0.25, &sample).unwrap());

        let outputs = registry.finish().unwrap();
        let fault = outputs.iter().find(|o| o.identifier == "0x404").unwrap();
        assert_eq!(fault.rows, 1);
        assert_eq!(fault.path, dir.path().join("404-2025-1-2-3-4.csv"));

        let content = fs::read_to_string(&fault.path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["time,state_of_charge,fault_code,fault_level", "0.250,50,9,1"]);
    }

    #[test]
    fn test_later_sink_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the third file should go
        fs::create_dir(dir.path().join("402.csv")).unwrap();

        let config = DecoderConfig::legacy().with_output_dir(dir.path());
        let table = DispatchTable::from_config(&config).unwrap();

        match SinkRegistry::open(&config, &table, &generated_at()) {
            Err(DecoderError::SinkOpen { path, .. }) => {
                assert!(path.ends_with("402.csv"), "{:?}", path);
            }
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("open should fail"),
        }

        // Sinks opened before the failure were closed with only their header
        let content = fs::read_to_string(dir.path().join("400.csv")).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(!dir.path().join("403.csv").exists());
    }

    #[test]
    fn test_unwritable_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();

        let config = DecoderConfig::legacy().with_output_dir(&blocker);
        let table = DispatchTable::from_config(&config).unwrap();
        let result = SinkRegistry::open(&config, &table, &generated_at());
        assert!(matches!(result, Err(DecoderError::SinkOpen { .. })));
    }
}
