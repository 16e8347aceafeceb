//! Payload decoders
//!
//! One submodule per message group. Every decoder takes the raw byte tokens
//! of a record and returns a `DecodedSample`; none of them touch I/O.

pub mod fault;
pub mod motor;
pub mod raw;
pub mod temperature;

use crate::config::TemperatureBias;
use crate::types::{DecodedSample, MessageGroup};

/// Failure to interpret a payload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("invalid hex byte {0:?}")]
    InvalidHex(String),

    #[error("payload needs {needed} bytes, got {got}")]
    TooShort { needed: usize, got: usize },
}

/// Parse hex byte tokens into exactly `width` bytes
///
/// Empty tokens are dropped before parsing, then the result is zero-padded
/// on the right. Tokens beyond `width` are parsed (and must be valid) but
/// not returned.
pub fn parse_hex_bytes(tokens: &[String], width: usize) -> Result<Vec<u8>, PayloadError> {
    let mut bytes = tokens
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| u8::from_str_radix(t, 16).map_err(|_| PayloadError::InvalidHex(t.to_string())))
        .collect::<Result<Vec<u8>, _>>()?;

    if bytes.len() < width {
        bytes.resize(width, 0);
    }
    bytes.truncate(width);

    Ok(bytes)
}

/// Guard used by the fixed-width decoders after padding
fn require(bytes: &[u8], needed: usize) -> Result<(), PayloadError> {
    if bytes.len() < needed {
        return Err(PayloadError::TooShort {
            needed,
            got: bytes.len(),
        });
    }
    Ok(())
}

/// Decode a payload with the decoder for `group`
pub fn decode_payload(
    group: MessageGroup,
    tokens: &[String],
    bias: TemperatureBias,
) -> Result<DecodedSample, PayloadError> {
    match group {
        MessageGroup::Motor => motor::decode(tokens),
        MessageGroup::Temperature => temperature::decode(tokens, bias),
        MessageGroup::Fault => fault::decode(tokens),
        MessageGroup::Raw => Ok(raw::decode(tokens)),
    }
}
