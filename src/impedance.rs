//! Electrode impedance estimation from the lead-off test signal.
//!
//! The board drives a known AC current through each electrode; the voltage it
//! produces at the lead-off frequency gives the contact impedance (r = v/i).
//! The streaming estimator extracts that single frequency bin with the
//! Goertzel recurrence over fixed blocks of samples, which is much cheaper
//! than a full spectral transform when only one bin is needed.

use std::f64::consts::{PI, SQRT_2};
use std::fmt;

use log::debug;
use serde::Serialize;

use crate::error::TelemetryError;
use crate::sample::SampleRecord;

/// Lead-off drive current configured on the board (amps).
pub const LEAD_OFF_DRIVE_AMPS: f64 = 6.0e-9;
/// Frequency of the lead-off test signal (Hz).
pub const LEAD_OFF_FREQUENCY_HZ: f64 = 31.2;
/// Default board sample rate (Hz).
pub const SAMPLE_RATE_HZ: f64 = 250.0;
/// Samples accumulated per impedance emission.
pub const GOERTZEL_BLOCK_SIZE: usize = 62;

/// Upper bound of a good electrode contact (ohms).
pub const IMPEDANCE_GOOD_MAX_OHMS: f64 = 10_000.0;
/// Above this the electrode is considered unattached (ohms).
pub const IMPEDANCE_BAD_MAX_OHMS: f64 = 1_000_000.0;

/// Contact classification derived from a raw impedance magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ElectrodeQuality {
    Good,
    Bad,
    NoLoad,
}

impl ElectrodeQuality {
    pub fn from_ohms(ohms: f64) -> Self {
        if ohms <= IMPEDANCE_GOOD_MAX_OHMS {
            ElectrodeQuality::Good
        } else if ohms <= IMPEDANCE_BAD_MAX_OHMS {
            ElectrodeQuality::Bad
        } else {
            ElectrodeQuality::NoLoad
        }
    }
}

impl fmt::Display for ElectrodeQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ElectrodeQuality::Good => "good",
            ElectrodeQuality::Bad => "bad",
            ElectrodeQuality::NoLoad => "no load",
        };
        f.write_str(text)
    }
}

/// One channel's impedance reading with its classification.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ImpedanceReading {
    pub ohms: f64,
    pub quality: ElectrodeQuality,
}

impl ImpedanceReading {
    pub fn from_ohms(ohms: f64) -> Self {
        Self {
            ohms,
            quality: ElectrodeQuality::from_ohms(ohms),
        }
    }
}

/// Streaming per-channel Goertzel filter with block-synchronous emission.
///
/// Feed every sample of one strictly-ordered stream to [`process`]; once per
/// block it returns the impedance array and resets its delay registers. One
/// instance per stream; the recurrence is only correct under a single
/// ordered sequence of calls.
///
/// [`process`]: GoertzelEstimator::process
pub struct GoertzelEstimator {
    coeff: f64,
    block_size: usize,
    drive_amps: f64,
    q1: Vec<f64>,
    q2: Vec<f64>,
    index: usize,
}

impl GoertzelEstimator {
    /// Creates an estimator for `channels` channels. The bin coefficient is
    /// computed once here: `k = round(N * target / rate)`, `w = 2*pi*k / N`,
    /// `coeff = 2 * cos(w)`.
    pub fn new(channels: usize, sample_rate_hz: f64, target_hz: f64) -> Self {
        let n = GOERTZEL_BLOCK_SIZE as f64;
        let k = (0.5 + n * target_hz / sample_rate_hz).floor();
        let w = 2.0 * PI * k / n;
        Self {
            coeff: 2.0 * w.cos(),
            block_size: GOERTZEL_BLOCK_SIZE,
            drive_amps: LEAD_OFF_DRIVE_AMPS,
            q1: vec![0.0; channels],
            q2: vec![0.0; channels],
            index: 0,
        }
    }

    /// Estimator with the stock Cyton lead-off parameters (250 Hz sample
    /// rate, 31.2 Hz test signal).
    pub fn for_cyton(channels: usize) -> Self {
        Self::new(channels, SAMPLE_RATE_HZ, LEAD_OFF_FREQUENCY_HZ)
    }

    pub fn num_channels(&self) -> usize {
        self.q1.len()
    }

    /// Accumulates one sample. Returns `Ok(Some(ohms))` with one impedance
    /// per channel when a block completes, `Ok(None)` otherwise. The block
    /// counter advances once per call, not per channel.
    pub fn process(
        &mut self,
        sample: &SampleRecord,
    ) -> Result<Option<Vec<f64>>, TelemetryError> {
        if sample.channel_data.len() != self.q1.len() {
            return Err(TelemetryError::ChannelCountMismatch {
                expected: self.q1.len(),
                actual: sample.channel_data.len(),
            });
        }

        for (i, volts) in sample.channel_data.iter().enumerate() {
            let q0 = self.coeff * self.q1[i] - self.q2[i] + volts;
            self.q2[i] = self.q1[i];
            self.q1[i] = q0;
        }
        self.index += 1;

        if self.index <= self.block_size {
            return Ok(None);
        }

        let impedances: Vec<f64> = self
            .q1
            .iter()
            .zip(&self.q2)
            .map(|(&q1, &q2)| {
                let magnitude = (q1 * q1 + q2 * q2 - q1 * q2 * self.coeff).sqrt();
                magnitude / self.drive_amps
            })
            .collect();

        self.q1.fill(0.0);
        self.q2.fill(0.0);
        self.index = 0;
        debug!("impedance block complete: {} channels", impedances.len());
        Ok(Some(impedances))
    }
}

/// Closed-form impedance estimate from a single sample, for use when block
/// accumulation is not wanted. `channel_number` is 1-based. Negative
/// voltages are reflected, so the result is always non-negative.
pub fn instantaneous_impedance(
    sample: &SampleRecord,
    channel_number: usize,
) -> Result<f64, TelemetryError> {
    let channels = sample.channel_data.len();
    if channel_number < 1 || channel_number > channels {
        return Err(TelemetryError::InvalidChannelIndex {
            channel: channel_number,
            channels,
        });
    }
    let volts = sample.channel_data[channel_number - 1].abs();
    Ok(SQRT_2 * volts / LEAD_OFF_DRIVE_AMPS)
}

/// Instantaneous impedance for every channel of a sample.
pub fn instantaneous_impedance_all(sample: &SampleRecord) -> Vec<f64> {
    sample
        .channel_data
        .iter()
        .map(|volts| SQRT_2 * volts.abs() / LEAD_OFF_DRIVE_AMPS)
        .collect()
}
