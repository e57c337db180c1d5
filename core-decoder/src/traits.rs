//! # Media Library Boundary
//!
//! The decode pipeline never talks to a demuxer or codec directly. It drives
//! these traits, which the symphonia adapter in [`crate::backend`] implements
//! and which tests implement with scripted in-memory containers.
//!
//! ## Decoder protocols
//!
//! Codec libraries expose one of two calling conventions:
//!
//! - **Push/pull** ([`PushPullCodec`]): submit a whole packet, then drain
//!   frames until the codec asks for more input.
//! - **Single call** ([`SingleCallCodec`]): one call takes the packet, reports
//!   how many bytes it consumed and optionally yields a frame. Unconsumed
//!   bytes have to be offered again.
//!
//! A [`Codec`] speaks both, so the protocol can be picked by configuration.

use crate::error::BackendResult;
use crate::types::{DecodedFrame, EncodedPacket, StreamInfo};
use std::path::Path;

/// Entry point into a media library.
pub trait MediaBackend {
    /// One-time library setup (registering container and codec support).
    ///
    /// Must be idempotent; the pipeline calls it on every run.
    fn initialize(&self) {}

    /// Open a container. Fails if the path is missing or the format unknown.
    fn open(&self, path: &Path) -> BackendResult<Box<dyn Container>>;
}

/// An open, demultiplexable media container.
pub trait Container {
    /// Describe every stream in container order.
    fn probe(&mut self) -> BackendResult<Vec<StreamInfo>>;

    /// Next packet from any stream.
    ///
    /// `Ok(None)` marks the end of the container. Errors are read failures;
    /// callers decide whether they end the stream.
    fn read_packet(&mut self) -> BackendResult<Option<EncodedPacket>>;

    /// Name of the registered decoder able to handle `stream`, if any.
    fn find_decoder(&self, stream: &StreamInfo) -> Option<String>;

    /// Instantiate and open a decoder for `stream`.
    fn open_decoder(&mut self, stream: &StreamInfo) -> BackendResult<Box<dyn Codec>>;
}

/// Push/pull decoding: one submission, zero or more drained frames.
pub trait PushPullCodec {
    /// Submit a complete packet. An error means the packet is malformed.
    fn send_packet(&mut self, packet: &EncodedPacket) -> BackendResult<()>;

    /// Drain one frame. `Ok(None)` means the codec needs more input.
    fn receive_frame(&mut self) -> BackendResult<Option<DecodedFrame>>;

    /// Signal that no more packets will arrive so delayed frames can be drained.
    fn send_eof(&mut self) -> BackendResult<()> {
        Ok(())
    }
}

/// Result of one single-call decode attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOutcome {
    /// Bytes taken from the front of the packet
    pub consumed: usize,
    /// Frame completed by this call, if any
    pub frame: Option<DecodedFrame>,
}

impl DecodeOutcome {
    pub fn new(consumed: usize, frame: Option<DecodedFrame>) -> Self {
        Self { consumed, frame }
    }
}

/// Single-call decoding with partial packet consumption.
pub trait SingleCallCodec {
    /// Decode from the unconsumed bytes of `packet`. An error means the
    /// packet is malformed.
    fn decode(&mut self, packet: &EncodedPacket) -> BackendResult<DecodeOutcome>;
}

/// A decoder usable with either protocol.
pub trait Codec: PushPullCodec + SingleCallCodec {}

impl<T: PushPullCodec + SingleCallCodec + ?Sized> Codec for T {}
