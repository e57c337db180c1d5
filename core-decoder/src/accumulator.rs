//! # Sample Accumulator
//!
//! Append-only buffer of samples handed to the key estimator.

use crate::error::{DecodeError, Result};
use crate::types::{CanonicalFrame, SampleFormat};
use tracing::warn;

/// Interleaved samples widened to `f32`, in the 16-bit integer range.
///
/// Frame rate and channel count are fixed at construction. Samples are only
/// ever appended, so the length stays a multiple of the channel count.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    frame_rate: u32,
    channels: usize,
    samples: Vec<f32>,
}

impl SampleBuffer {
    pub fn new(frame_rate: u32, channels: usize) -> Self {
        Self {
            frame_rate,
            channels,
            samples: Vec::new(),
        }
    }

    /// Empty buffer with room for `frames` frames of every channel.
    ///
    /// The reservation is a hint: if the allocator refuses it, the buffer
    /// starts empty and grows as frames arrive.
    pub fn with_capacity(frame_rate: u32, channels: usize, frames: usize) -> Self {
        let mut samples = Vec::new();
        if let Err(e) = samples.try_reserve_exact(frames.saturating_mul(channels)) {
            warn!(frames, channels, "Could not reserve sample buffer: {}", e);
        }

        Self {
            frame_rate,
            channels,
            samples,
        }
    }

    /// Append one frame's samples at the current end of the buffer.
    ///
    /// Samples are widened without scaling. Storage grows at most once per
    /// call. Returns the number of samples appended.
    pub fn append(&mut self, frame: &CanonicalFrame) -> Result<usize> {
        if frame.sample_rate() != self.frame_rate {
            return Err(DecodeError::Resample(format!(
                "frame at {} Hz cannot join a {} Hz buffer",
                frame.sample_rate(),
                self.frame_rate
            )));
        }
        if frame.channel_count() != self.channels {
            return Err(DecodeError::ChannelMismatch {
                expected: self.channels,
                found: frame.channel_count(),
            });
        }

        let sample_width = SampleFormat::CANONICAL.sample_type.bytes_per_sample();
        let count = frame.plane_byte_len() / sample_width;
        self.samples.reserve(count);
        self.samples
            .extend(frame.samples()[..count].iter().map(|&sample| f32::from(sample)));

        Ok(count)
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Samples the buffer can hold before it has to grow.
    pub fn capacity(&self) -> usize {
        self.samples.capacity()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Total interleaved samples, which is also where the next append starts.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.samples.len().checked_div(self.channels).unwrap_or(0)
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.frame_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.frame_rate)
    }
}
