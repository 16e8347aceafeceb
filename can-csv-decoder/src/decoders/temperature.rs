//! Temperature frames: byte 0 inverter, byte 1 motor, both offset-encoded Celsius.

use super::{parse_hex_bytes, require, PayloadError};
use crate::config::TemperatureBias;
use crate::types::DecodedSample;

pub const PAYLOAD_LEN: usize = 2;

/// Celsius to Fahrenheit
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn decode(tokens: &[String], bias: TemperatureBias) -> Result<DecodedSample, PayloadError> {
    let bytes = parse_hex_bytes(tokens, PAYLOAD_LEN)?;
    require(&bytes, PAYLOAD_LEN)?;

    Ok(DecodedSample::Temperature {
        inverter_temp_f: celsius_to_fahrenheit(bias.to_celsius(bytes[0])),
        motor_temp_f: celsius_to_fahrenheit(bias.to_celsius(bytes[1])),
    })
}
