//! Fixed-point conversions for the ADS1299 front end and the aux MPU.
//!
//! The board streams 24-bit big-endian two's-complement channel samples and
//! 16-bit aux samples. Buffer sizes are caller-enforced preconditions; these
//! helpers have no error path.

/// ADC reference voltage, set by the ADS1299 hardware.
pub const ADS1299_VREF: f64 = 4.5;
/// Full-scale code of the signed 24-bit converter (2^23 - 1).
pub const FULL_SCALE_COUNTS: f64 = 8_388_607.0;
/// Default programmable gain; also the fixed gain of the encode path.
pub const DEFAULT_GAIN: f64 = 24.0;
/// Accelerometer units per count for the configured full-scale range
/// (range_g / 2^resolution_bits = 0.002 / 2^4).
pub const ACCEL_SCALE_FACTOR: f64 = 0.002 / 16.0;

/// Sign-extends a 3-byte big-endian two's-complement value.
pub fn decode_i24(bytes: &[u8]) -> i32 {
    debug_assert_eq!(bytes.len(), 3);
    let mut value = (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2]);
    if bytes[0] > 127 {
        value |= 0xFF00_0000;
    }
    value as i32
}

/// Sign-extends a 2-byte big-endian two's-complement value.
pub fn decode_i16(bytes: &[u8]) -> i32 {
    debug_assert_eq!(bytes.len(), 2);
    i32::from(i16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Converts raw channel counts to volts for the given amplifier gain.
pub fn counts_to_volts(raw: i32, gain: f64) -> f64 {
    f64::from(raw) * ADS1299_VREF / gain / FULL_SCALE_COUNTS
}

/// Converts raw aux counts to accelerometer units.
pub fn counts_to_accel(raw: i32) -> f64 {
    f64::from(raw) * ACCEL_SCALE_FACTOR
}

/// Encodes a channel voltage as a 3-byte big-endian sample at the default
/// gain. Counts are truncated with `floor` (toward negative infinity), not
/// rounded, so encode/decode round-trips are bit-exact to one code step.
pub fn volts_to_i24(volts: f64) -> [u8; 3] {
    let counts = (volts / (ADS1299_VREF / DEFAULT_GAIN / FULL_SCALE_COUNTS)).floor() as i32;
    let bytes = counts.to_be_bytes();
    [bytes[1], bytes[2], bytes[3]]
}

/// Encodes an accelerometer value as a 2-byte big-endian sample, truncating
/// like [`volts_to_i24`].
pub fn accel_to_i16(value: f64) -> [u8; 2] {
    let counts = (value / ACCEL_SCALE_FACTOR).floor() as i32;
    let bytes = counts.to_be_bytes();
    [bytes[2], bytes[3]]
}
