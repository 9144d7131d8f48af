//! Telemetry core for Cyton-class (ADS1299) EEG acquisition boards.
//!
//! Decodes framed 33-byte sample packets into physical units, estimates
//! per-electrode contact impedance from the lead-off test signal, and
//! synthesizes brain-like multi-channel samples for tests and simulation.
//! Transport, device configuration and presentation are collaborator
//! concerns; everything here operates on in-memory buffers and is
//! single-owner, synchronous state.

pub mod codec;
pub mod error;
pub mod impedance;
pub mod packet;
pub mod sample;
pub mod simulator;

pub use error::TelemetryError;
pub use impedance::{ElectrodeQuality, GoertzelEstimator, ImpedanceReading};
pub use packet::{decode, encode, DecodedPacket, PacketType, PACKET_SIZE, START_BYTE, STOP_BYTE};
pub use sample::{ChannelSettings, SampleRecord};
pub use simulator::{LineNoise, SampleGenerator, SimulatorConfig};
