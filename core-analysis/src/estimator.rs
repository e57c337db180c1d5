//! # Key Estimation
//!
//! The [`KeyEstimator`] trait is the boundary between decoding and analysis:
//! it takes a finished [`SampleBuffer`] and returns one classification.
//!
//! [`ChromaKeyEstimator`] is the built-in engine:
//!
//! ```text
//! downmix → silence gate → decimate → Hann window + FFT → pitch classes → profile correlation
//! ```
//!
//! Chroma energy is correlated with the Krumhansl-Kessler major and minor key
//! profiles rotated to every tonic; the best-correlated key wins.

use crate::error::{AnalysisError, Result};
use crate::key::{Key, KeyClassification, Mode};
use core_decoder::SampleBuffer;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use tracing::{debug, trace};

/// Krumhansl-Kessler major profile, tonic first.
const MAJOR_PROFILE: [f32; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Kessler minor profile, tonic first.
const MINOR_PROFILE: [f32; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Estimates the musical key of decoded audio.
pub trait KeyEstimator {
    fn estimate(&self, buffer: &SampleBuffer) -> Result<KeyClassification>;
}

/// Chromagram parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// RMS level, in 16-bit sample units, below which audio counts as silence.
    ///
    /// Default: 2.0.
    #[serde(default = "default_silence_threshold")]
    pub silence_threshold: f32,

    /// Rate the downmixed signal is decimated towards before analysis.
    ///
    /// Default: 11025 Hz.
    #[serde(default = "default_analysis_rate")]
    pub analysis_rate: u32,

    /// FFT window length in samples.
    ///
    /// Default: 4096.
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,

    /// Distance between consecutive windows.
    ///
    /// Default: 2048.
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,

    /// Lowest frequency folded into the chromagram (Hz).
    ///
    /// Default: 55 Hz (A1).
    #[serde(default = "default_min_frequency")]
    pub min_frequency: f32,

    /// Highest frequency folded into the chromagram (Hz).
    ///
    /// Default: 1760 Hz (A6).
    #[serde(default = "default_max_frequency")]
    pub max_frequency: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            silence_threshold: default_silence_threshold(),
            analysis_rate: default_analysis_rate(),
            fft_size: default_fft_size(),
            hop_size: default_hop_size(),
            min_frequency: default_min_frequency(),
            max_frequency: default_max_frequency(),
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fft_size < 2 {
            return Err(AnalysisError::InvalidConfig(
                "fft_size must be at least 2".to_string(),
            ));
        }
        if self.hop_size == 0 || self.hop_size > self.fft_size {
            return Err(AnalysisError::InvalidConfig(format!(
                "hop_size must be between 1 and fft_size ({})",
                self.fft_size
            )));
        }
        if self.analysis_rate == 0 {
            return Err(AnalysisError::InvalidConfig(
                "analysis_rate must be positive".to_string(),
            ));
        }
        if !(self.min_frequency > 0.0 && self.min_frequency < self.max_frequency) {
            return Err(AnalysisError::InvalidConfig(format!(
                "frequency band {}..{} Hz is empty",
                self.min_frequency, self.max_frequency
            )));
        }
        if self.silence_threshold < 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "silence_threshold cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_silence_threshold() -> f32 {
    2.0
}

fn default_analysis_rate() -> u32 {
    11025
}

fn default_fft_size() -> usize {
    4096
}

fn default_hop_size() -> usize {
    2048
}

fn default_min_frequency() -> f32 {
    55.0
}

fn default_max_frequency() -> f32 {
    1760.0
}

/// Chromagram and key-profile based estimator.
#[derive(Debug, Clone)]
pub struct ChromaKeyEstimator {
    config: EstimatorConfig,
}

impl ChromaKeyEstimator {
    pub fn new(config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Pitch-class energy of the buffer, C first.
    ///
    /// Returns `None` when the audio is silent or has no energy inside the
    /// analysed frequency band.
    pub fn chromagram(&self, buffer: &SampleBuffer) -> Result<Option<[f32; 12]>> {
        if buffer.is_empty() {
            return Ok(None);
        }
        if buffer.channels() == 0 || buffer.frame_rate() == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "{} channels at {} Hz",
                buffer.channels(),
                buffer.frame_rate()
            )));
        }

        let mono = downmix(buffer.samples(), buffer.channels());
        let level = rms(&mono);
        debug!(rms = level, frames = mono.len(), "Measured signal level");
        if level < self.config.silence_threshold {
            return Ok(None);
        }

        let factor = (buffer.frame_rate() / self.config.analysis_rate).max(1) as usize;
        let signal = decimate(&mono, factor);
        let rate = buffer.frame_rate() as f32 / factor as f32;

        let chroma = self.fold_spectrum(&signal, rate);
        if chroma.iter().all(|&energy| energy <= 0.0) {
            return Ok(None);
        }
        Ok(Some(chroma))
    }

    fn fold_spectrum(&self, signal: &[f32], rate: f32) -> [f32; 12] {
        let size = self.config.fft_size;
        let fft = FftPlanner::<f32>::new().plan_fft_forward(size);
        let window: Vec<f32> = (0..size)
            .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / (size - 1) as f32).cos())
            .collect();

        // Map each usable bin to its pitch class once
        let bin_classes: Vec<(usize, usize)> = (1..size / 2)
            .filter_map(|bin| {
                let frequency = bin as f32 * rate / size as f32;
                if frequency < self.config.min_frequency || frequency > self.config.max_frequency {
                    return None;
                }
                Some((bin, pitch_class(frequency)))
            })
            .collect();

        let mut chroma = [0.0f32; 12];
        let mut buffer = vec![Complex { re: 0.0, im: 0.0 }; size];
        let mut start = 0;
        let mut windows = 0;

        loop {
            for (n, slot) in buffer.iter_mut().enumerate() {
                let sample = signal.get(start + n).copied().unwrap_or(0.0);
                *slot = Complex {
                    re: sample * window[n],
                    im: 0.0,
                };
            }
            fft.process(&mut buffer);

            for &(bin, class) in &bin_classes {
                chroma[class] += buffer[bin].norm();
            }
            windows += 1;

            start += self.config.hop_size;
            // Short signals still get one zero-padded window
            if start + size > signal.len() {
                break;
            }
        }

        trace!(windows, "Folded spectrum into pitch classes");
        chroma
    }

    /// The key whose rotated profile correlates best with `chroma` (C first).
    pub fn classify_chroma(chroma: &[f32; 12]) -> Key {
        let mut best = Key::AMajor;
        let mut best_score = f32::NEG_INFINITY;

        for key in Key::ALL {
            let profile = match key.mode() {
                Mode::Major => &MAJOR_PROFILE,
                Mode::Minor => &MINOR_PROFILE,
            };
            let tonic = usize::from(key.tonic());
            let rotated: [f32; 12] = std::array::from_fn(|pc| profile[(pc + 12 - tonic) % 12]);

            let score = correlation(chroma, &rotated);
            if score > best_score {
                best = key;
                best_score = score;
            }
        }

        best
    }
}

impl Default for ChromaKeyEstimator {
    fn default() -> Self {
        Self {
            config: EstimatorConfig::default(),
        }
    }
}

impl KeyEstimator for ChromaKeyEstimator {
    fn estimate(&self, buffer: &SampleBuffer) -> Result<KeyClassification> {
        let classification = match self.chromagram(buffer)? {
            Some(chroma) => KeyClassification::Tonal(Self::classify_chroma(&chroma)),
            None => KeyClassification::Silence,
        };
        debug!(?classification, "Key estimated");
        Ok(classification)
    }
}

fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (energy / samples.len() as f64).sqrt() as f32
}

/// Average consecutive blocks of `factor` samples.
fn decimate(samples: &[f32], factor: usize) -> Vec<f32> {
    if factor <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(factor)
        .map(|block| block.iter().sum::<f32>() / block.len() as f32)
        .collect()
}

/// Nearest equal-tempered pitch class of `frequency`, C = 0.
fn pitch_class(frequency: f32) -> usize {
    let semitones_from_a = (12.0 * (frequency / 440.0).log2()).round() as i32;
    (semitones_from_a + 9).rem_euclid(12) as usize
}

/// Pearson correlation; zero when either side is flat.
fn correlation(a: &[f32; 12], b: &[f32; 12]) -> f32 {
    let mean_a = a.iter().sum::<f32>() / 12.0;
    let mean_b = b.iter().sum::<f32>() / 12.0;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }

    let denominator = (variance_a * variance_b).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        covariance / denominator
    }
}
