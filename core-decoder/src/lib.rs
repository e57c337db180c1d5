//! # Decoder Module
//!
//! Turns a media file into the sample buffer the key estimator consumes.
//!
//! ## Overview
//!
//! This crate handles:
//! - Opening containers and selecting the first audio stream
//! - Reading packets of that stream and driving the decoder with either the
//!   push/pull or the single-call protocol
//! - Tolerating a bounded number of malformed packets
//! - Converting every decoded frame to signed 16-bit interleaved PCM
//! - Accumulating the samples, widened to `f32`, into a [`SampleBuffer`]
//!
//! The media library sits behind the traits in [`traits`]; [`backend`]
//! implements them with Symphonia.

pub mod accumulator;
pub mod backend;
pub mod config;
pub mod error;
pub mod frame_decoder;
pub mod locator;
pub mod normalizer;
pub mod packet_cursor;
pub mod pipeline;
pub mod traits;
pub mod types;

pub use accumulator::SampleBuffer;
pub use backend::{ensure_initialized, SymphoniaBackend};
pub use config::{DecodeConfig, DecodeProtocol, DecodeStats, BAD_PACKET_THRESHOLD};
pub use error::{BackendError, BackendResult, DecodeError, Result};
pub use frame_decoder::{BadPacketBudget, DecodeStrategy, PushPullDecoder, SingleCallDecoder};
pub use locator::{MediaSource, StreamLocator};
pub use normalizer::FormatNormalizer;
pub use packet_cursor::PacketCursor;
pub use pipeline::{decode_file, DecodePipeline, DecodedAudio};
pub use traits::{
    Codec, Container, DecodeOutcome, MediaBackend, PushPullCodec, SingleCallCodec,
};
pub use types::{
    AudioCodec, CanonicalFrame, ChannelLayout, DecodedFrame, EncodedPacket, FrameData,
    SampleFormat, SampleType, StreamInfo, StreamKind,
};
