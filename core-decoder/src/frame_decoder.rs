//! # Frame Decoder
//!
//! Drives a codec over the packet sequence with one of the two decoder
//! protocols and absorbs a bounded number of malformed packets.
//!
//! A packet can yield any number of frames, including none while the codec
//! buffers input. A malformed packet is dropped whole (including bytes the
//! codec has not consumed yet) and charged to a [`BadPacketBudget`]. The
//! budget is cumulative over the run: it is never reset by good packets.

use crate::config::DecodeProtocol;
use crate::error::{BackendError, DecodeError, Result};
use crate::traits::Codec;
use crate::types::{DecodedFrame, EncodedPacket};
use tracing::{debug, error, trace, warn};

/// Counts malformed packets and fails once the threshold is exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadPacketBudget {
    count: usize,
    threshold: usize,
}

impl BadPacketBudget {
    pub fn new(threshold: usize) -> Self {
        Self {
            count: 0,
            threshold,
        }
    }

    /// Charge one malformed packet.
    ///
    /// Exactly `threshold` bad packets are tolerated; the next one fails with
    /// [`DecodeError::DecodeCorruption`].
    pub fn record(&mut self, cause: &BackendError) -> Result<()> {
        self.count += 1;
        warn!(
            bad_packets = self.count,
            threshold = self.threshold,
            "Skipping malformed packet: {}",
            cause
        );

        if self.count > self.threshold {
            error!("Too many bad packets, giving up on the stream");
            return Err(DecodeError::DecodeCorruption {
                count: self.count,
                threshold: self.threshold,
            });
        }

        Ok(())
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

/// One way of turning packets into frames.
pub trait DecodeStrategy {
    /// Feed `packet` to the codec and return every frame it releases.
    ///
    /// On return the packet is fully consumed or discarded.
    fn submit_and_drain(&mut self, packet: &mut EncodedPacket) -> Result<Vec<DecodedFrame>>;

    /// Collect frames the codec still holds once the container is exhausted.
    fn flush(&mut self) -> Result<Vec<DecodedFrame>>;

    /// Malformed packets absorbed so far.
    fn bad_packets(&self) -> usize;
}

/// Build the strategy for `protocol` around an opened codec.
pub fn build_strategy(
    protocol: DecodeProtocol,
    codec: Box<dyn Codec>,
    bad_packet_threshold: usize,
) -> Box<dyn DecodeStrategy> {
    debug!(?protocol, bad_packet_threshold, "Building decode strategy");
    let budget = BadPacketBudget::new(bad_packet_threshold);
    match protocol {
        DecodeProtocol::PushPull => Box::new(PushPullDecoder::new(codec, budget)),
        DecodeProtocol::SingleCall => Box::new(SingleCallDecoder::new(codec, budget)),
    }
}

// ============================================================================
// Push/Pull Protocol
// ============================================================================

/// Submits each packet once and drains frames until the codec wants input.
pub struct PushPullDecoder {
    codec: Box<dyn Codec>,
    budget: BadPacketBudget,
}

impl PushPullDecoder {
    pub fn new(codec: Box<dyn Codec>, budget: BadPacketBudget) -> Self {
        Self { codec, budget }
    }

    fn drain(&mut self, frames: &mut Vec<DecodedFrame>) -> Result<()> {
        loop {
            match self.codec.receive_frame() {
                Ok(Some(frame)) => {
                    trace!(frames = frame.frames(), format = %frame.format(), "Drained frame");
                    frames.push(frame);
                }
                Ok(None) => return Ok(()),
                Err(e) => {
                    self.budget.record(&e)?;
                    return Ok(());
                }
            }
        }
    }
}

impl DecodeStrategy for PushPullDecoder {
    fn submit_and_drain(&mut self, packet: &mut EncodedPacket) -> Result<Vec<DecodedFrame>> {
        let mut frames = Vec::new();

        let submitted = self.codec.send_packet(packet);
        // The codec takes a packet whole, accepted or not
        packet.discard();

        match submitted {
            Ok(()) => self.drain(&mut frames)?,
            Err(e) => self.budget.record(&e)?,
        }

        Ok(frames)
    }

    fn flush(&mut self) -> Result<Vec<DecodedFrame>> {
        let mut frames = Vec::new();

        if let Err(e) = self.codec.send_eof() {
            debug!("Decoder rejected end of input: {}", e);
            return Ok(frames);
        }

        self.drain(&mut frames)?;
        if !frames.is_empty() {
            debug!("Flushed {} delayed frame(s)", frames.len());
        }
        Ok(frames)
    }

    fn bad_packets(&self) -> usize {
        self.budget.count()
    }
}

// ============================================================================
// Single-Call Protocol
// ============================================================================

/// Calls the codec repeatedly on one packet until every byte is consumed.
pub struct SingleCallDecoder {
    codec: Box<dyn Codec>,
    budget: BadPacketBudget,
}

impl SingleCallDecoder {
    pub fn new(codec: Box<dyn Codec>, budget: BadPacketBudget) -> Self {
        Self { codec, budget }
    }
}

impl DecodeStrategy for SingleCallDecoder {
    fn submit_and_drain(&mut self, packet: &mut EncodedPacket) -> Result<Vec<DecodedFrame>> {
        let mut frames = Vec::new();

        while !packet.is_empty() {
            match self.codec.decode(packet) {
                Ok(outcome) => {
                    let consumed = outcome.consumed.min(packet.len());
                    let produced = outcome.frame.is_some();
                    if let Some(frame) = outcome.frame {
                        trace!(frames = frame.frames(), consumed, "Decoded frame");
                        frames.push(frame);
                    }

                    if consumed == 0 && !produced {
                        debug!(
                            remaining = packet.len(),
                            "Decoder made no progress, dropping rest of packet"
                        );
                        packet.discard();
                        break;
                    }
                    packet.consume(consumed);
                }
                Err(e) => {
                    packet.discard();
                    self.budget.record(&e)?;
                    break;
                }
            }
        }

        Ok(frames)
    }

    fn flush(&mut self) -> Result<Vec<DecodedFrame>> {
        Ok(Vec::new())
    }

    fn bad_packets(&self) -> usize {
        self.budget.count()
    }
}
