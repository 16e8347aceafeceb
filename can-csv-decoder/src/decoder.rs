//! Identifier dispatch
//!
//! The `DispatchTable` maps each tracked identifier to its message group and
//! routes record payloads to the matching decoder.

use crate::config::{DecoderConfig, TemperatureBias};
use crate::decoders;
use crate::types::{DecodedSample, DecoderError, LogRecord, MessageGroup, Result};
use std::collections::HashMap;

/// Identifier → group lookup built from a `DecoderConfig`
#[derive(Debug, Clone)]
pub struct DispatchTable {
    /// Tracked identifiers
    groups: HashMap<String, MessageGroup>,
    /// Identifiers in configuration order (drives sink creation order)
    order: Vec<String>,
    bias: TemperatureBias,
}

impl DispatchTable {
    /// Build the table, rejecting invalid configurations
    pub fn from_config(config: &DecoderConfig) -> Result<Self> {
        config.validate()?;

        let tracked = config.tracked();
        let order = tracked.iter().map(|(id, _)| id.clone()).collect();
        let groups = tracked.into_iter().collect();

        Ok(Self {
            groups,
            order,
            bias: config.temperature_bias,
        })
    }

    /// Group of a tracked identifier
    pub fn group(&self, identifier: &str) -> Option<MessageGroup> {
        self.groups.get(identifier).copied()
    }

    /// Check if an identifier is tracked
    pub fn is_tracked(&self, identifier: &str) -> bool {
        self.groups.contains_key(identifier)
    }

    /// Tracked identifiers with their groups, in configuration order
    pub fn entries(&self) -> impl Iterator<Item = (&str, MessageGroup)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.groups.get(id).map(|group| (id.as_str(), *group)))
    }

    /// Number of tracked identifiers
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Decode a record's payload
    ///
    /// # Returns
    /// * `Ok(None)` if the identifier is not tracked
    /// * `Ok(Some(sample))` on success
    /// * `Err(DecoderError::Decode)` if the payload could not be interpreted
    pub fn decode(&self, record: &LogRecord) -> Result<Option<DecodedSample>> {
        let Some(group) = self.group(&record.identifier) else {
            return Ok(None);
        };

        decoders::decode_payload(group, &record.data, self.bias)
            .map(Some)
            .map_err(|e| DecoderError::Decode {
                line: record.line_number,
                reason: format!("{} ({} frame {})", e, group, record.identifier),
            })
    }
}
