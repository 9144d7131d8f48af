use thiserror::Error;

/// Errors surfaced by the decode and impedance paths.
///
/// Every failure is reported per call; a failing decode never yields a
/// partial [`SampleRecord`](crate::SampleRecord).
#[derive(Debug, Error, PartialEq)]
pub enum TelemetryError {
    #[error("packet length mismatch: expected {expected} bytes, got {actual}")]
    PacketLength { expected: usize, actual: usize },
    #[error("invalid start byte 0x{found:02X}, expected 0x{expected:02X}")]
    BadStartByte { found: u8, expected: u8 },
    #[error("channel settings length mismatch: expected {expected}, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },
    #[error("channel {channel} has invalid gain {gain} (must be finite and positive)")]
    InvalidGain { channel: usize, gain: f64 },
    #[error("channel number {channel} out of range 1..={channels}")]
    InvalidChannelIndex { channel: usize, channels: usize },
    #[error("unsupported packet type (stop byte 0x{stop_byte:02X})")]
    UnsupportedPacketType { stop_byte: u8 },
}
