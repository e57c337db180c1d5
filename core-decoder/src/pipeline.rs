//! # Decode Pipeline
//!
//! Runs the whole decode for one file:
//!
//! ```text
//! StreamLocator → PacketCursor → DecodeStrategy → FormatNormalizer → SampleBuffer
//! ```
//!
//! The loop is synchronous. Every resource it acquires is owned by the run
//! and dropped on return, whether the run succeeded or not.

use crate::accumulator::SampleBuffer;
use crate::backend::SymphoniaBackend;
use crate::config::{DecodeConfig, DecodeStats};
use crate::error::Result;
use crate::frame_decoder::build_strategy;
use crate::locator::StreamLocator;
use crate::normalizer::FormatNormalizer;
use crate::packet_cursor::PacketCursor;
use crate::traits::MediaBackend;
use crate::types::{DecodedFrame, StreamInfo};
use core_runtime::logging::loggable_path;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Longest stretch of audio reserved up front. Headers of streamed files
/// declare absurd lengths, so anything past this grows on demand.
const MAX_RESERVED_SECONDS: u64 = 10 * 60;

/// Everything a successful run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub buffer: SampleBuffer,
    pub stream: StreamInfo,
    pub stats: DecodeStats,
}

pub struct DecodePipeline<'a> {
    backend: &'a dyn MediaBackend,
    config: DecodeConfig,
}

impl<'a> DecodePipeline<'a> {
    pub fn new(backend: &'a dyn MediaBackend, config: DecodeConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode the first audio stream of `path` into a sample buffer.
    #[instrument(skip_all, fields(file = %loggable_path(path, self.config.redact_paths)))]
    pub fn run(&self, path: &Path) -> Result<DecodedAudio> {
        self.backend.initialize();

        let source = StreamLocator::new(self.backend).open(path)?;
        let mut normalizer = FormatNormalizer::new(source.stream())?;
        let (container, stream, codec) = source.into_parts();

        info!(
            codec = %stream.codec,
            sample_rate = normalizer.sample_rate(),
            channels = normalizer.layout().count(),
            "Decoding audio stream"
        );

        let mut buffer = self.new_buffer(&stream, &normalizer);
        let mut stats = DecodeStats::default();
        let mut cursor = PacketCursor::new(container, stream.index);
        let mut strategy = build_strategy(self.config.protocol, codec, self.config.bad_packet_threshold);

        while let Some(packet) = cursor.read() {
            let frames = strategy.submit_and_drain(packet)?;
            accumulate(frames, &mut normalizer, &mut buffer, &mut stats)?;
        }

        let delayed = strategy.flush()?;
        accumulate(delayed, &mut normalizer, &mut buffer, &mut stats)?;

        stats.packets_read = cursor.packets_read();
        stats.packets_skipped = cursor.packets_skipped();
        stats.frames_converted = normalizer.frames_converted();
        stats.bad_packets = strategy.bad_packets() as u64;

        info!(
            packets = stats.packets_read,
            skipped = stats.packets_skipped,
            frames = stats.frames_decoded,
            converted = stats.frames_converted,
            bad_packets = stats.bad_packets,
            samples = stats.samples_appended,
            seconds = buffer.duration_secs(),
            "Decode complete"
        );

        Ok(DecodedAudio {
            buffer,
            stream,
            stats,
        })
    }

    fn new_buffer(&self, stream: &StreamInfo, normalizer: &FormatNormalizer) -> SampleBuffer {
        let frame_rate = normalizer.sample_rate();
        let channels = normalizer.layout().count();

        match stream.total_frames {
            Some(frames) if self.config.reserve_capacity => {
                let limit = u64::from(frame_rate) * MAX_RESERVED_SECONDS;
                let reserved = usize::try_from(frames.min(limit)).unwrap_or(usize::MAX);
                debug!("Reserving sample buffer for {} frames", reserved);
                SampleBuffer::with_capacity(frame_rate, channels, reserved)
            }
            _ => SampleBuffer::new(frame_rate, channels),
        }
    }
}

fn accumulate(
    frames: Vec<DecodedFrame>,
    normalizer: &mut FormatNormalizer,
    buffer: &mut SampleBuffer,
    stats: &mut DecodeStats,
) -> Result<()> {
    for frame in frames {
        stats.frames_decoded += 1;
        let canonical = normalizer.normalize(frame)?;
        stats.samples_appended += buffer.append(&canonical)? as u64;
    }
    Ok(())
}

/// Decode `path` with the symphonia backend.
pub fn decode_file(path: &Path, config: &DecodeConfig) -> Result<DecodedAudio> {
    let backend = SymphoniaBackend::new();
    DecodePipeline::new(&backend, config.clone()).run(path)
}
