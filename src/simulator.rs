//! Synthetic sample generation for running the pipeline without hardware.
//!
//! White gaussian noise is shaped into pink (1/f) noise with three parallel
//! first-order recursive filters (coefficients after
//! <http://www.firstpr.com.au/dsp/pink-noise/>), with optional 10 Hz alpha
//! and 50/60 Hz mains components mixed in before shaping.

use std::f64::consts::{PI, SQRT_2};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::Serialize;

use crate::packet::{START_BYTE, STOP_BYTE};
use crate::sample::SampleRecord;

const MICROVOLTS_PER_VOLT: f64 = 1.0e6;
const ALPHA_FREQUENCY_HZ: f64 = 10.0;
/// Alpha tone amplitude on channels 1 and 2 (microvolts, before sqrt(2)).
const ALPHA_AMPLITUDE_UV: f64 = 5.0;
/// Mains tone amplitude on the remaining channels (microvolts, before sqrt(2)).
const LINE_NOISE_AMPLITUDE_UV: f64 = 8.0;

/// Mains interference mixed into channels 3..N.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum LineNoise {
    #[default]
    None,
    Hz50,
    Hz60,
}

impl LineNoise {
    fn frequency_hz(self) -> Option<f64> {
        match self {
            LineNoise::None => None,
            LineNoise::Hz50 => Some(50.0),
            LineNoise::Hz60 => Some(60.0),
        }
    }
}

/// Configuration for one generator instance.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SimulatorConfig {
    pub channels: usize,
    pub sample_rate_hz: f64,
    /// Mix a 10 Hz tone into the first two channels.
    pub inject_alpha: bool,
    pub line_noise: LineNoise,
    /// Aux triple copied into every sample. The board's accelerometer is not
    /// simulated, so this defaults to zeros.
    pub aux_data: [f64; 3],
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            channels: 8,
            sample_rate_hz: crate::impedance::SAMPLE_RATE_HZ,
            inject_alpha: false,
            line_noise: LineNoise::None,
            aux_data: [0.0; 3],
        }
    }
}

/// Stateful per-channel pink-noise source producing one [`SampleRecord`] per
/// call. Owns its delay registers and phase accumulators; use one instance
/// per simulated stream and call it in strict sequence.
pub struct SampleGenerator {
    config: SimulatorConfig,
    rng: StdRng,
    phase_rad: Vec<f64>,
    b0: Vec<f64>,
    b1: Vec<f64>,
    b2: Vec<f64>,
}

impl SampleGenerator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic generator for tests and reproducible simulations.
    pub fn with_seed(config: SimulatorConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimulatorConfig, rng: StdRng) -> Self {
        let n = config.channels;
        Self {
            config,
            rng,
            phase_rad: vec![0.0; n],
            b0: vec![0.0; n],
            b1: vec![0.0; n],
            b2: vec![0.0; n],
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Produces the next sample. The sample number continues from
    /// `previous_sample_number`, wrapping 255 -> 0.
    pub fn next_sample(&mut self, previous_sample_number: u8) -> SampleRecord {
        let mut channel_data = Vec::with_capacity(self.config.channels);
        for i in 0..self.config.channels {
            let mut input = self.white_noise_volts();
            if let Some((freq, amplitude_uv)) = self.injection_for_channel(i) {
                input += self.advance_tone(i, freq) * amplitude_uv * SQRT_2 / MICROVOLTS_PER_VOLT;
            }
            channel_data.push(self.shape_pink(i, input));
        }

        SampleRecord {
            start_byte: START_BYTE,
            sample_number: previous_sample_number.wrapping_add(1),
            channel_data,
            aux_data: self.config.aux_data,
            stop_byte: STOP_BYTE,
        }
    }

    fn white_noise_volts(&mut self) -> f64 {
        let draw: f64 = self.rng.sample(StandardNormal);
        draw * (self.config.sample_rate_hz / 2.0).sqrt() / MICROVOLTS_PER_VOLT
    }

    /// Channels 1 and 2 carry the alpha tone when enabled and never carry
    /// line noise; the remaining channels carry the configured mains tone.
    fn injection_for_channel(&self, channel: usize) -> Option<(f64, f64)> {
        if channel < 2 {
            self.config
                .inject_alpha
                .then_some((ALPHA_FREQUENCY_HZ, ALPHA_AMPLITUDE_UV))
        } else {
            self.config
                .line_noise
                .frequency_hz()
                .map(|freq| (freq, LINE_NOISE_AMPLITUDE_UV))
        }
    }

    fn advance_tone(&mut self, channel: usize, freq_hz: f64) -> f64 {
        let phase = &mut self.phase_rad[channel];
        *phase += 2.0 * PI * freq_hz / self.config.sample_rate_hz;
        if *phase > 2.0 * PI {
            *phase -= 2.0 * PI;
        }
        phase.sin()
    }

    fn shape_pink(&mut self, channel: usize, input: f64) -> f64 {
        self.b0[channel] = 0.99765 * self.b0[channel] + input * 0.099_046_0;
        self.b1[channel] = 0.96300 * self.b1[channel] + input * 0.296_516_4;
        self.b2[channel] = 0.57000 * self.b2[channel] + input * 1.052_691_3;
        self.b0[channel] + self.b1[channel] + self.b2[channel] + input * 0.1848
    }
}
