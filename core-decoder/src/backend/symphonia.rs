//! # Symphonia Adapter
//!
//! Implements the media library traits on top of Symphonia's three layers:
//!
//! 1. **MediaSourceStream**: file I/O
//! 2. **FormatReader**: demultiplexes the container into packets
//! 3. **Decoder**: decodes packets into planar sample buffers
//!
//! Symphonia decoders always take a whole packet per call, so the single-call
//! protocol reports the full packet as consumed and push/pull holds at most one
//! pending frame.

use super::format_detector::FormatDetector;
use super::{ensure_initialized, Registry};
use crate::error::{BackendError, BackendResult};
use crate::traits::{
    Codec, Container, DecodeOutcome, MediaBackend, PushPullCodec, SingleCallCodec,
};
use crate::types::{
    ChannelLayout, DecodedFrame, EncodedPacket, FrameData, StreamInfo, StreamKind,
};
use bytes::Bytes;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Channels, Signal};
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::sample::Sample;
use tracing::{debug, trace};

/// Opens files through Symphonia's default format and codec registries.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaBackend;

impl SymphoniaBackend {
    pub fn new() -> Self {
        Self
    }
}

impl MediaBackend for SymphoniaBackend {
    fn initialize(&self) {
        ensure_initialized();
    }

    fn open(&self, path: &Path) -> BackendResult<Box<dyn Container>> {
        let registry = ensure_initialized();

        let file = File::open(path)?;
        let hint = FormatDetector::hint_from_path(path);
        let media_source = Box::new(file) as Box<dyn MediaSource>;
        let mss = MediaSourceStream::new(media_source, Default::default());

        let probed = registry.probe.format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;

        Ok(Box::new(SymphoniaContainer {
            reader: probed.format,
            registry,
        }))
    }
}

/// A demultiplexer over one probed file.
pub struct SymphoniaContainer {
    reader: Box<dyn FormatReader>,
    registry: &'static Registry,
}

impl SymphoniaContainer {
    fn track(&self, stream: &StreamInfo) -> BackendResult<&Track> {
        self.reader
            .tracks()
            .get(stream.index)
            .ok_or_else(|| BackendError::new(format!("no track at index {}", stream.index)))
    }

    /// Describe one track. A track counts as audio when it carries a sample
    /// rate or channels, even if its codec is one symphonia does not know.
    fn stream_info(index: usize, params: &CodecParameters) -> StreamInfo {
        let has_audio_params = params.sample_rate.is_some()
            || params.channels.is_some()
            || params.channel_layout.is_some();
        if params.codec == CODEC_TYPE_NULL && !has_audio_params {
            return StreamInfo::other(index, StreamKind::Unknown);
        }

        let mut info = StreamInfo::audio(index, FormatDetector::detect_codec(params.codec));
        info.sample_rate = params.sample_rate;
        info.sample_format = params.sample_format.map(FormatDetector::sample_format);
        info.total_frames = params.n_frames;

        let channels = params
            .channels
            .or_else(|| params.channel_layout.map(|layout| layout.into_channels()));
        if let Some(channels) = channels {
            info.channel_count = Some(channels.count());
            info.layout = Some(ChannelLayout::from_mask(channels.bits()));
        }

        info
    }
}

impl Container for SymphoniaContainer {
    fn probe(&mut self) -> BackendResult<Vec<StreamInfo>> {
        Ok(self
            .reader
            .tracks()
            .iter()
            .enumerate()
            .map(|(index, track)| Self::stream_info(index, &track.codec_params))
            .collect())
    }

    fn read_packet(&mut self) -> BackendResult<Option<EncodedPacket>> {
        let packet = match self.reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        // Packets of tracks missing from the track list can never be selected
        let index = self
            .reader
            .tracks()
            .iter()
            .position(|track| track.id == packet.track_id())
            .unwrap_or(usize::MAX);

        let (ts, dur) = (packet.ts(), packet.dur());
        Ok(Some(
            EncodedPacket::new(index, Bytes::from(packet.data)).with_timing(ts, dur),
        ))
    }

    fn find_decoder(&self, stream: &StreamInfo) -> Option<String> {
        let track = self.track(stream).ok()?;
        self.registry
            .codecs
            .get_codec(track.codec_params.codec)
            .map(|descriptor| descriptor.short_name.to_string())
    }

    fn open_decoder(&mut self, stream: &StreamInfo) -> BackendResult<Box<dyn Codec>> {
        let track = self.track(stream)?;
        let decoder = self
            .registry
            .codecs
            .make(&track.codec_params, &DecoderOptions::default())?;

        debug!(track_id = track.id, "Opened symphonia decoder");
        Ok(Box::new(SymphoniaCodec {
            decoder,
            track_id: track.id,
            pending: None,
        }))
    }
}

/// A Symphonia decoder speaking both decode protocols.
pub struct SymphoniaCodec {
    decoder: Box<dyn Decoder>,
    track_id: u32,
    pending: Option<DecodedFrame>,
}

impl SymphoniaCodec {
    fn decode_packet(&mut self, packet: &EncodedPacket) -> BackendResult<Option<DecodedFrame>> {
        let packet = Packet::new_from_slice(
            self.track_id,
            packet.pts().unwrap_or(0),
            packet.duration().unwrap_or(0),
            packet.data(),
        );

        // The decoded buffer borrows the decoder, so copy it out right away
        let decoded = self.decoder.decode(&packet)?;
        if decoded.frames() == 0 {
            trace!("Decoder produced an empty buffer");
            return Ok(None);
        }
        Ok(Some(frame_from_buffer(&decoded)))
    }
}

impl PushPullCodec for SymphoniaCodec {
    fn send_packet(&mut self, packet: &EncodedPacket) -> BackendResult<()> {
        self.pending = self.decode_packet(packet)?;
        Ok(())
    }

    fn receive_frame(&mut self) -> BackendResult<Option<DecodedFrame>> {
        Ok(self.pending.take())
    }
}

impl SingleCallCodec for SymphoniaCodec {
    fn decode(&mut self, packet: &EncodedPacket) -> BackendResult<DecodeOutcome> {
        let frame = self.decode_packet(packet)?;
        Ok(DecodeOutcome::new(packet.len(), frame))
    }
}

fn frame_from_buffer(buffer: &AudioBufferRef<'_>) -> DecodedFrame {
    let spec = *buffer.spec();
    let layout = layout_from_channels(spec.channels);

    let data = match buffer {
        // A single S16 plane already is canonical interleaved data
        AudioBufferRef::S16(buf) if spec.channels.count() == 1 => {
            FrameData::Interleaved16(buf.chan(0).to_vec())
        }
        AudioBufferRef::S16(buf) => FrameData::S16(planes(&**buf)),
        AudioBufferRef::U8(buf) => FrameData::U8(planes(&**buf)),
        AudioBufferRef::U16(buf) => FrameData::U16(planes(&**buf)),
        AudioBufferRef::U24(buf) => FrameData::U24(planes(&**buf)),
        AudioBufferRef::U32(buf) => FrameData::U32(planes(&**buf)),
        AudioBufferRef::S8(buf) => FrameData::S8(planes(&**buf)),
        AudioBufferRef::S24(buf) => FrameData::S24(planes(&**buf)),
        AudioBufferRef::S32(buf) => FrameData::S32(planes(&**buf)),
        AudioBufferRef::F32(buf) => FrameData::F32(planes(&**buf)),
        AudioBufferRef::F64(buf) => FrameData::F64(planes(&**buf)),
    };

    DecodedFrame::new(spec.rate, layout, data)
}

fn layout_from_channels(channels: Channels) -> ChannelLayout {
    ChannelLayout::from_mask(channels.bits())
}

fn planes<T: Sample>(buf: &AudioBuffer<T>) -> Vec<Vec<T>> {
    (0..buf.spec().channels.count())
        .map(|chan_idx| buf.chan(chan_idx).to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AudioCodec;
    use symphonia::core::codecs::CODEC_TYPE_FLAC;

    #[test]
    fn test_track_without_codec_or_audio_params_is_not_audio() {
        let info = SymphoniaContainer::stream_info(0, &CodecParameters::new());
        assert!(!info.is_audio());
    }

    #[test]
    fn test_unknown_codec_with_audio_params_is_audio() {
        let mut params = CodecParameters::new();
        params
            .with_sample_rate(48000)
            .with_channels(Channels::FRONT_LEFT | Channels::FRONT_RIGHT);

        let info = SymphoniaContainer::stream_info(3, &params);
        assert!(info.is_audio());
        assert_eq!(info.index, 3);
        assert_eq!(info.codec, AudioCodec::Unknown);
        assert_eq!(info.sample_rate, Some(48000));
        assert_eq!(info.layout, Some(ChannelLayout::STEREO));
    }

    #[test]
    fn test_known_codec_is_audio() {
        let mut params = CodecParameters::new();
        params.for_codec(CODEC_TYPE_FLAC).with_sample_rate(44100);

        let info = SymphoniaContainer::stream_info(0, &params);
        assert!(info.is_audio());
        assert_eq!(info.codec, AudioCodec::Flac);
        assert_eq!(info.channel_count, None);
    }
}
