//! Raw passthrough: tokens are copied verbatim into fixed columns.

use crate::types::DecodedSample;

/// Number of byte columns written for raw identifiers
pub const RAW_COLUMNS: usize = 8;

/// Copy up to `RAW_COLUMNS` tokens, right-padding with empty fields
pub fn decode(tokens: &[String]) -> DecodedSample {
    let mut bytes: Vec<String> = tokens.iter().take(RAW_COLUMNS).cloned().collect();
    bytes.resize(RAW_COLUMNS, String::new());
    DecodedSample::Raw { bytes }
}
