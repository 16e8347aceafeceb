//! Motor controller frames
//!
//! Layout (little-endian words):
//! - bytes 0-1: motor current, 0.1 A per bit
//! - bytes 2-3: vehicle speed, 0.1 km/h per bit
//! - bytes 4-7: odometer, 0.01 km per bit (low word first)

use super::{parse_hex_bytes, require, PayloadError};
use crate::types::DecodedSample;
use byteorder::{ByteOrder, LittleEndian};

pub const PAYLOAD_LEN: usize = 8;

pub fn decode(tokens: &[String]) -> Result<DecodedSample, PayloadError> {
    let bytes = parse_hex_bytes(tokens, PAYLOAD_LEN)?;
    require(&bytes, PAYLOAD_LEN)?;

    let current_raw = LittleEndian::read_u16(&bytes[0..2]);
    let speed_raw = LittleEndian::read_u16(&bytes[2..4]);
    // (high_word << 16) | low_word
    let odometer_raw = LittleEndian::read_u32(&bytes[4..8]);

    Ok(DecodedSample::Motor {
        motor_current: current_raw as f64 / 10.0,
        vehicle_speed: speed_raw as f64 / 10.0,
        odometer: odometer_raw as f64 / 100.0,
    })
}
