//! Framing and decoding of the 33-byte binary telemetry packet.
//!
//! Layout: `[0]` start byte `0xA0` | `[1]` sample number | `[2..26]` eight
//! 3-byte channel samples | `[26..32]` three 2-byte aux samples | `[32]`
//! stop byte, whose low nibble selects the packet type.

use log::{trace, warn};

use crate::codec;
use crate::error::TelemetryError;
use crate::sample::{ChannelSettings, SampleRecord};

/// Total packet size in bytes.
pub const PACKET_SIZE: usize = 33;
/// Fixed start marker.
pub const START_BYTE: u8 = 0xA0;
/// Stop marker for a standard packet (type nibble 0).
pub const STOP_BYTE: u8 = 0xC0;
/// Channels carried by every packet.
pub const CHANNELS_PER_PACKET: usize = 8;
/// Accelerometer axes carried by every packet.
pub const AUX_AXES: usize = 3;

const SAMPLE_NUMBER_OFFSET: usize = 1;
const CHANNEL_DATA_RANGE: std::ops::Range<usize> = 2..26;
const AUX_DATA_RANGE: std::ops::Range<usize> = 26..32;
const STOP_BYTE_OFFSET: usize = PACKET_SIZE - 1;

/// Packet class selected by the low nibble of the stop byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketType {
    Standard,
    UserDefined,
    TimeSynced,
    Unknown(u8),
}

impl PacketType {
    pub fn from_stop_byte(stop_byte: u8) -> Self {
        match stop_byte & 0x0F {
            0x0 => PacketType::Standard,
            0x1 => PacketType::UserDefined,
            0x2 => PacketType::TimeSynced,
            nibble => PacketType::Unknown(nibble),
        }
    }
}

/// Outcome of a successful decode.
///
/// User-defined packets are handled without producing data; that is a
/// deliberate non-error result, distinct from decode failure.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedPacket {
    Sample(SampleRecord),
    UserDefined,
}

/// Decodes one framed packet into physical units.
///
/// The buffer must be exactly [`PACKET_SIZE`] bytes and start with
/// [`START_BYTE`]; `settings` must carry one positive finite gain per
/// channel. All validation runs before any voltage is computed, so a failing
/// call never yields a partial record.
pub fn decode(
    buffer: &[u8],
    settings: &[ChannelSettings],
) -> Result<DecodedPacket, TelemetryError> {
    if buffer.len() != PACKET_SIZE {
        return Err(TelemetryError::PacketLength {
            expected: PACKET_SIZE,
            actual: buffer.len(),
        });
    }
    if buffer[0] != START_BYTE {
        return Err(TelemetryError::BadStartByte {
            found: buffer[0],
            expected: START_BYTE,
        });
    }
    let stop_byte = buffer[STOP_BYTE_OFFSET];
    match PacketType::from_stop_byte(stop_byte) {
        PacketType::UserDefined => Ok(DecodedPacket::UserDefined),
        PacketType::TimeSynced => Err(TelemetryError::UnsupportedPacketType { stop_byte }),
        PacketType::Standard => {
            ChannelSettings::validate(settings)?;
            Ok(DecodedPacket::Sample(decode_standard(buffer, settings)))
        }
        PacketType::Unknown(nibble) => {
            warn!("unknown packet type nibble 0x{nibble:X}, decoding as standard");
            ChannelSettings::validate(settings)?;
            Ok(DecodedPacket::Sample(decode_standard(buffer, settings)))
        }
    }
}

fn decode_standard(buffer: &[u8], settings: &[ChannelSettings]) -> SampleRecord {
    let channel_data: Vec<f64> = buffer[CHANNEL_DATA_RANGE]
        .chunks_exact(3)
        .zip(settings)
        .map(|(bytes, entry)| codec::counts_to_volts(codec::decode_i24(bytes), entry.gain))
        .collect();

    let mut aux_data = [0.0; AUX_AXES];
    for (axis, bytes) in buffer[AUX_DATA_RANGE].chunks_exact(2).enumerate() {
        aux_data[axis] = codec::counts_to_accel(codec::decode_i16(bytes));
    }

    let record = SampleRecord {
        start_byte: buffer[0],
        sample_number: buffer[SAMPLE_NUMBER_OFFSET],
        channel_data,
        aux_data,
        stop_byte: buffer[STOP_BYTE_OFFSET],
    };
    trace!("decoded sample {}", record.sample_number);
    record
}

/// Synthesizes a standard packet from a record, the exact inverse of
/// [`decode`]. Channel voltages are truncated to counts at the default gain.
pub fn encode(record: &SampleRecord) -> Result<[u8; PACKET_SIZE], TelemetryError> {
    if record.channel_data.len() != CHANNELS_PER_PACKET {
        return Err(TelemetryError::ChannelCountMismatch {
            expected: CHANNELS_PER_PACKET,
            actual: record.channel_data.len(),
        });
    }

    let mut packet = [0u8; PACKET_SIZE];
    packet[0] = START_BYTE;
    packet[SAMPLE_NUMBER_OFFSET] = record.sample_number;
    for (i, volts) in record.channel_data.iter().enumerate() {
        let offset = CHANNEL_DATA_RANGE.start + i * 3;
        packet[offset..offset + 3].copy_from_slice(&codec::volts_to_i24(*volts));
    }
    for (axis, value) in record.aux_data.iter().enumerate() {
        let offset = AUX_DATA_RANGE.start + axis * 2;
        packet[offset..offset + 2].copy_from_slice(&codec::accel_to_i16(*value));
    }
    packet[STOP_BYTE_OFFSET] = STOP_BYTE;
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{ADS1299_VREF, DEFAULT_GAIN, FULL_SCALE_COUNTS};

    fn test_record() -> SampleRecord {
        SampleRecord {
            start_byte: START_BYTE,
            sample_number: 69,
            channel_data: vec![0.1, -0.1, 0.05, -0.05, 0.0, 0.12, -0.12, 0.001],
            aux_data: [0.5, -0.5, 1.0],
            stop_byte: STOP_BYTE,
        }
    }

    #[test]
    fn packet_type_nibbles() {
        assert_eq!(PacketType::from_stop_byte(0xC0), PacketType::Standard);
        assert_eq!(PacketType::from_stop_byte(0xC1), PacketType::UserDefined);
        assert_eq!(PacketType::from_stop_byte(0xC2), PacketType::TimeSynced);
        assert_eq!(PacketType::from_stop_byte(0xC7), PacketType::Unknown(0x7));
    }

    #[test]
    fn round_trip_within_one_code_step() {
        let record = test_record();
        let packet = encode(&record).unwrap();
        let decoded = match decode(&packet, &ChannelSettings::default_array()).unwrap() {
            DecodedPacket::Sample(sample) => sample,
            other => panic!("expected sample, got {other:?}"),
        };

        assert_eq!(decoded.sample_number, record.sample_number);
        assert_eq!(decoded.start_byte, START_BYTE);
        assert_eq!(decoded.stop_byte, STOP_BYTE);
        let step = ADS1299_VREF / DEFAULT_GAIN / FULL_SCALE_COUNTS;
        for (got, want) in decoded.channel_data.iter().zip(&record.channel_data) {
            assert!((got - want).abs() <= step);
        }
        for (got, want) in decoded.aux_data.iter().zip(&record.aux_data) {
            assert!((got - want).abs() <= crate::codec::ACCEL_SCALE_FACTOR);
        }
    }

    #[test]
    fn rejects_wrong_length() {
        let settings = ChannelSettings::default_array();
        for len in [0, 32, 34] {
            let buffer = vec![START_BYTE; len];
            assert_eq!(
                decode(&buffer, &settings),
                Err(TelemetryError::PacketLength {
                    expected: PACKET_SIZE,
                    actual: len
                })
            );
        }
    }

    #[test]
    fn rejects_bad_start_byte() {
        let mut packet = encode(&test_record()).unwrap();
        packet[0] = 0xB0;
        assert_eq!(
            decode(&packet, &ChannelSettings::default_array()),
            Err(TelemetryError::BadStartByte {
                found: 0xB0,
                expected: START_BYTE
            })
        );
    }

    #[test]
    fn rejects_invalid_gain_before_decoding() {
        let packet = encode(&test_record()).unwrap();
        let mut settings = ChannelSettings::default_array();
        settings[0].gain = -1.0;
        assert!(matches!(
            decode(&packet, &settings),
            Err(TelemetryError::InvalidGain { channel: 0, .. })
        ));
    }

    #[test]
    fn user_defined_packet_yields_empty_result() {
        let mut packet = encode(&test_record()).unwrap();
        packet[PACKET_SIZE - 1] = 0xC1;
        assert_eq!(
            decode(&packet, &ChannelSettings::default_array()),
            Ok(DecodedPacket::UserDefined)
        );
    }

    #[test]
    fn time_synced_packet_is_unsupported() {
        let mut packet = encode(&test_record()).unwrap();
        packet[PACKET_SIZE - 1] = 0xC2;
        assert_eq!(
            decode(&packet, &ChannelSettings::default_array()),
            Err(TelemetryError::UnsupportedPacketType { stop_byte: 0xC2 })
        );
    }

    #[test]
    fn unknown_nibble_decodes_as_standard() {
        let mut packet = encode(&test_record()).unwrap();
        packet[PACKET_SIZE - 1] = 0xC9;
        let decoded = decode(&packet, &ChannelSettings::default_array()).unwrap();
        assert!(matches!(decoded, DecodedPacket::Sample(_)));
    }

    #[test]
    fn gain_changes_voltage_scale() {
        let packet = encode(&test_record()).unwrap();
        let mut settings = ChannelSettings::default_array();
        for entry in &mut settings {
            entry.gain = 12.0;
        }
        let DecodedPacket::Sample(sample) = decode(&packet, &settings).unwrap() else {
            panic!("expected sample");
        };
        // Half the gain doubles the reported voltage.
        assert!((sample.channel_data[0] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn encode_rejects_wrong_channel_count() {
        let mut record = test_record();
        record.channel_data.truncate(4);
        assert_eq!(
            encode(&record),
            Err(TelemetryError::ChannelCountMismatch {
                expected: 8,
                actual: 4
            })
        );
    }
}
