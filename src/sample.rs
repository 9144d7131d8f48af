use serde::Serialize;

use crate::codec::DEFAULT_GAIN;
use crate::error::TelemetryError;
use crate::packet::{AUX_AXES, CHANNELS_PER_PACKET};

/// One decoded or synthesized multi-channel observation.
///
/// `channel_data` holds one voltage (volts) per configured channel;
/// `aux_data` holds the three accelerometer axes. The framing bytes are
/// retained for diagnostics only and are not re-validated after decode.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleRecord {
    pub start_byte: u8,
    /// Wraps 255 -> 0; not monotonic across the wrap.
    pub sample_number: u8,
    pub channel_data: Vec<f64>,
    pub aux_data: [f64; AUX_AXES],
    pub stop_byte: u8,
}

impl SampleRecord {
    pub fn num_channels(&self) -> usize {
        self.channel_data.len()
    }
}

/// Per-channel amplifier settings supplied by the configuration collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChannelSettings {
    /// ADS1299 programmable gain. Must be finite and positive.
    pub gain: f64,
}

impl ChannelSettings {
    pub fn new(gain: f64) -> Self {
        Self { gain }
    }

    /// Default settings for a full packet: 8 channels at gain 24.
    pub fn default_array() -> Vec<ChannelSettings> {
        vec![ChannelSettings { gain: DEFAULT_GAIN }; CHANNELS_PER_PACKET]
    }

    pub(crate) fn validate(settings: &[ChannelSettings]) -> Result<(), TelemetryError> {
        if settings.len() != CHANNELS_PER_PACKET {
            return Err(TelemetryError::ChannelCountMismatch {
                expected: CHANNELS_PER_PACKET,
                actual: settings.len(),
            });
        }
        for (channel, entry) in settings.iter().enumerate() {
            if !entry.gain.is_finite() || entry.gain <= 0.0 {
                return Err(TelemetryError::InvalidGain {
                    channel,
                    gain: entry.gain,
                });
            }
        }
        Ok(())
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self { gain: DEFAULT_GAIN }
    }
}
