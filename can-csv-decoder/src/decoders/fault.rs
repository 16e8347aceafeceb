//! State-of-charge and fault frames
//!
//! Input order is SOC, level, code. Output order is SOC, code, level.

use super::{parse_hex_bytes, require, PayloadError};
use crate::types::DecodedSample;

pub const PAYLOAD_LEN: usize = 3;

pub fn decode(tokens: &[String]) -> Result<DecodedSample, PayloadError> {
    let bytes = parse_hex_bytes(tokens, PAYLOAD_LEN)?;
    require(&bytes, PAYLOAD_LEN)?;

    Ok(DecodedSample::Fault {
        state_of_charge: bytes[0],
        fault_level: bytes[1],
        fault_code: bytes[2],
    })
}
