//! # Decoder Data Model
//!
//! Stream metadata, encoded packets and decoded frames exchanged between the
//! media library adapter and the pipeline stages.

use crate::error::{DecodeError, Result};
use bytes::{Buf, Bytes};
use serde::{Deserialize, Serialize};
use std::fmt;
use symphonia::core::sample::{i24, u24};

// ============================================================================
// Codec & Stream Metadata
// ============================================================================

/// Audio codecs the key finder knows by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    /// MPEG-1 Audio Layer 3
    Mp3,
    /// Advanced Audio Coding (AAC/M4A)
    Aac,
    /// Free Lossless Audio Codec
    Flac,
    /// Ogg Vorbis
    Vorbis,
    /// Opus
    Opus,
    /// Uncompressed PCM of any width or endianness
    Pcm,
    /// ADPCM variants (IMA, Microsoft)
    Adpcm,
    /// Apple Lossless Audio Codec
    Alac,
    /// Codec not recognized
    Unknown,
    /// Codec recognized by the backend but not listed above
    Other(String),
}

impl AudioCodec {
    pub fn name(&self) -> &str {
        match self {
            AudioCodec::Mp3 => "mp3",
            AudioCodec::Aac => "aac",
            AudioCodec::Flac => "flac",
            AudioCodec::Vorbis => "vorbis",
            AudioCodec::Opus => "opus",
            AudioCodec::Pcm => "pcm",
            AudioCodec::Adpcm => "adpcm",
            AudioCodec::Alac => "alac",
            AudioCodec::Unknown => "unknown",
            AudioCodec::Other(name) => name,
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Media type of a stream inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Audio,
    Video,
    Subtitle,
    Data,
    Unknown,
}

/// Per-stream metadata collected while probing a container.
///
/// Fields the container does not declare stay `None`; the stream locator
/// decides which of them are mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Position of the stream in container order; packets carry the same index
    pub index: usize,
    pub kind: StreamKind,
    pub codec: AudioCodec,
    pub sample_rate: Option<u32>,
    pub channel_count: Option<usize>,
    pub layout: Option<ChannelLayout>,
    pub sample_format: Option<SampleFormat>,
    /// Total length in frames, when the container declares it
    pub total_frames: Option<u64>,
}

impl StreamInfo {
    /// An audio stream with nothing but its codec known yet.
    pub fn audio(index: usize, codec: AudioCodec) -> Self {
        Self {
            index,
            kind: StreamKind::Audio,
            codec,
            sample_rate: None,
            channel_count: None,
            layout: None,
            sample_format: None,
            total_frames: None,
        }
    }

    /// A stream the pipeline will never select.
    pub fn other(index: usize, kind: StreamKind) -> Self {
        Self {
            kind,
            ..Self::audio(index, AudioCodec::Unknown)
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn with_channel_count(mut self, channels: usize) -> Self {
        self.channel_count = Some(channels);
        self
    }

    pub fn with_layout(mut self, layout: ChannelLayout) -> Self {
        self.channel_count = Some(layout.count());
        self.layout = Some(layout);
        self
    }

    pub fn with_sample_format(mut self, format: SampleFormat) -> Self {
        self.sample_format = Some(format);
        self
    }

    pub fn with_total_frames(mut self, frames: u64) -> Self {
        self.total_frames = Some(frames);
        self
    }

    pub fn is_audio(&self) -> bool {
        self.kind == StreamKind::Audio
    }
}

// ============================================================================
// Sample Formats & Channel Layouts
// ============================================================================

/// Numeric representation of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    U8,
    U16,
    U24,
    U32,
    S8,
    S16,
    S24,
    S32,
    F32,
    F64,
}

impl SampleType {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleType::U8 | SampleType::S8 => 1,
            SampleType::U16 | SampleType::S16 => 2,
            SampleType::U24 | SampleType::S24 => 3,
            SampleType::U32 | SampleType::S32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            SampleType::U8 => "u8",
            SampleType::U16 => "u16",
            SampleType::U24 => "u24",
            SampleType::U32 => "u32",
            SampleType::S8 => "s8",
            SampleType::S16 => "s16",
            SampleType::S24 => "s24",
            SampleType::S32 => "s32",
            SampleType::F32 => "f32",
            SampleType::F64 => "f64",
        }
    }
}

/// Sample type plus memory arrangement (one plane per channel, or interleaved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleFormat {
    pub sample_type: SampleType,
    pub planar: bool,
}

impl SampleFormat {
    /// Signed 16-bit interleaved: the only format the key estimator accepts.
    pub const CANONICAL: SampleFormat = SampleFormat {
        sample_type: SampleType::S16,
        planar: false,
    };

    pub const fn planar(sample_type: SampleType) -> Self {
        Self {
            sample_type,
            planar: true,
        }
    }

    pub const fn interleaved(sample_type: SampleType) -> Self {
        Self {
            sample_type,
            planar: false,
        }
    }

    pub fn is_canonical(&self) -> bool {
        *self == Self::CANONICAL
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sample_type.short_name())?;
        if self.planar {
            f.write_str("p")?;
        }
        Ok(())
    }
}

/// Speaker positions present in a stream, as a bit mask.
///
/// Bit positions match symphonia's `Channels` flags so masks coming from the
/// decoder can be carried over unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelLayout {
    mask: u32,
}

impl ChannelLayout {
    pub const FRONT_LEFT: u32 = 1 << 0;
    pub const FRONT_RIGHT: u32 = 1 << 1;
    pub const FRONT_CENTRE: u32 = 1 << 2;
    pub const LFE1: u32 = 1 << 3;
    pub const REAR_LEFT: u32 = 1 << 4;
    pub const REAR_RIGHT: u32 = 1 << 5;
    pub const REAR_CENTRE: u32 = 1 << 8;
    pub const SIDE_LEFT: u32 = 1 << 9;
    pub const SIDE_RIGHT: u32 = 1 << 10;

    pub const MONO: ChannelLayout = ChannelLayout::from_mask(Self::FRONT_CENTRE);
    pub const STEREO: ChannelLayout =
        ChannelLayout::from_mask(Self::FRONT_LEFT | Self::FRONT_RIGHT);

    pub const fn from_mask(mask: u32) -> Self {
        Self { mask }
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Number of channels in the layout.
    pub fn count(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Conventional layout for a bare channel count.
    ///
    /// Raw PCM containers often declare how many channels they carry but not
    /// which speakers those are. Counts up to eight get the usual surround
    /// arrangements; larger counts fill the lowest bit positions in order.
    pub fn default_for(channels: usize) -> Option<Self> {
        let mask = match channels {
            0 => return None,
            1 => Self::FRONT_CENTRE,
            2 => Self::FRONT_LEFT | Self::FRONT_RIGHT,
            3 => Self::FRONT_LEFT | Self::FRONT_RIGHT | Self::FRONT_CENTRE,
            4 => Self::FRONT_LEFT | Self::FRONT_RIGHT | Self::FRONT_CENTRE | Self::REAR_CENTRE,
            5 => {
                Self::FRONT_LEFT
                    | Self::FRONT_RIGHT
                    | Self::FRONT_CENTRE
                    | Self::REAR_LEFT
                    | Self::REAR_RIGHT
            }
            6 => {
                Self::FRONT_LEFT
                    | Self::FRONT_RIGHT
                    | Self::FRONT_CENTRE
                    | Self::LFE1
                    | Self::REAR_LEFT
                    | Self::REAR_RIGHT
            }
            7 => {
                Self::FRONT_LEFT
                    | Self::FRONT_RIGHT
                    | Self::FRONT_CENTRE
                    | Self::LFE1
                    | Self::REAR_CENTRE
                    | Self::SIDE_LEFT
                    | Self::SIDE_RIGHT
            }
            8 => {
                Self::FRONT_LEFT
                    | Self::FRONT_RIGHT
                    | Self::FRONT_CENTRE
                    | Self::LFE1
                    | Self::REAR_LEFT
                    | Self::REAR_RIGHT
                    | Self::SIDE_LEFT
                    | Self::SIDE_RIGHT
            }
            n if n <= 32 => ((1u64 << n) - 1) as u32,
            _ => return None,
        };
        Some(Self::from_mask(mask))
    }
}

// ============================================================================
// Packets
// ============================================================================

/// One demultiplexed chunk of compressed data.
///
/// Decoders consume a packet from the front; once [`len`](Self::len) reaches
/// zero the packet is spent and the cursor must read another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPacket {
    stream_index: usize,
    data: Bytes,
    pts: Option<u64>,
    duration: Option<u64>,
}

impl EncodedPacket {
    pub fn new(stream_index: usize, data: impl Into<Bytes>) -> Self {
        Self {
            stream_index,
            data: data.into(),
            pts: None,
            duration: None,
        }
    }

    pub fn with_timing(mut self, pts: u64, duration: u64) -> Self {
        self.pts = Some(pts);
        self.duration = Some(duration);
        self
    }

    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    /// Bytes not yet consumed by the decoder.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pts(&self) -> Option<u64> {
        self.pts
    }

    pub fn duration(&self) -> Option<u64> {
        self.duration
    }

    /// Mark `count` bytes from the front as decoded.
    pub fn consume(&mut self, count: usize) {
        let count = count.min(self.data.len());
        self.data.advance(count);
    }

    /// Drop whatever the decoder has not consumed yet.
    pub fn discard(&mut self) {
        self.data.clear();
    }
}

// ============================================================================
// Frames
// ============================================================================

/// Sample storage of a decoded frame in the decoder's native representation.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameData {
    /// Signed 16-bit, channels interleaved. Already canonical.
    Interleaved16(Vec<i16>),
    U8(Vec<Vec<u8>>),
    U16(Vec<Vec<u16>>),
    U24(Vec<Vec<u24>>),
    U32(Vec<Vec<u32>>),
    S8(Vec<Vec<i8>>),
    S16(Vec<Vec<i16>>),
    S24(Vec<Vec<i24>>),
    S32(Vec<Vec<i32>>),
    F32(Vec<Vec<f32>>),
    F64(Vec<Vec<f64>>),
}

impl FrameData {
    pub fn format(&self) -> SampleFormat {
        match self {
            FrameData::Interleaved16(_) => SampleFormat::CANONICAL,
            FrameData::U8(_) => SampleFormat::planar(SampleType::U8),
            FrameData::U16(_) => SampleFormat::planar(SampleType::U16),
            FrameData::U24(_) => SampleFormat::planar(SampleType::U24),
            FrameData::U32(_) => SampleFormat::planar(SampleType::U32),
            FrameData::S8(_) => SampleFormat::planar(SampleType::S8),
            FrameData::S16(_) => SampleFormat::planar(SampleType::S16),
            FrameData::S24(_) => SampleFormat::planar(SampleType::S24),
            FrameData::S32(_) => SampleFormat::planar(SampleType::S32),
            FrameData::F32(_) => SampleFormat::planar(SampleType::F32),
            FrameData::F64(_) => SampleFormat::planar(SampleType::F64),
        }
    }

    /// Number of planes; interleaved data always has exactly one.
    pub fn plane_count(&self) -> usize {
        match self {
            FrameData::Interleaved16(_) => 1,
            FrameData::U8(p) => p.len(),
            FrameData::U16(p) => p.len(),
            FrameData::U24(p) => p.len(),
            FrameData::U32(p) => p.len(),
            FrameData::S8(p) => p.len(),
            FrameData::S16(p) => p.len(),
            FrameData::S24(p) => p.len(),
            FrameData::S32(p) => p.len(),
            FrameData::F32(p) => p.len(),
            FrameData::F64(p) => p.len(),
        }
    }

    fn first_plane_len(&self) -> usize {
        fn first<T>(planes: &[Vec<T>]) -> usize {
            planes.first().map_or(0, Vec::len)
        }

        match self {
            FrameData::Interleaved16(samples) => samples.len(),
            FrameData::U8(p) => first(p),
            FrameData::U16(p) => first(p),
            FrameData::U24(p) => first(p),
            FrameData::U32(p) => first(p),
            FrameData::S8(p) => first(p),
            FrameData::S16(p) => first(p),
            FrameData::S24(p) => first(p),
            FrameData::S32(p) => first(p),
            FrameData::F32(p) => first(p),
            FrameData::F64(p) => first(p),
        }
    }
}

/// A block of PCM samples exactly as the decoder produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub sample_rate: u32,
    pub layout: ChannelLayout,
    pub data: FrameData,
}

impl DecodedFrame {
    pub fn new(sample_rate: u32, layout: ChannelLayout, data: FrameData) -> Self {
        Self {
            sample_rate,
            layout,
            data,
        }
    }

    pub fn format(&self) -> SampleFormat {
        self.data.format()
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        match &self.data {
            FrameData::Interleaved16(samples) => match self.layout.count() {
                0 => 0,
                channels => samples.len() / channels,
            },
            planar => planar.first_plane_len(),
        }
    }
}

/// A frame guaranteed to hold signed 16-bit interleaved samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalFrame {
    sample_rate: u32,
    layout: ChannelLayout,
    samples: Vec<i16>,
}

impl CanonicalFrame {
    /// Wrap interleaved samples, checking they split evenly across the layout.
    pub fn new(sample_rate: u32, layout: ChannelLayout, samples: Vec<i16>) -> Result<Self> {
        let channels = layout.count();
        if channels == 0 {
            return Err(DecodeError::Resample(
                "frame has an empty channel layout".to_string(),
            ));
        }
        if samples.len() % channels != 0 {
            return Err(DecodeError::Resample(format!(
                "{} interleaved samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }

        Ok(Self {
            sample_rate,
            layout,
            samples,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn channel_count(&self) -> usize {
        self.layout.count()
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.layout.count()
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Size in bytes of the single interleaved plane.
    pub fn plane_byte_len(&self) -> usize {
        self.samples.len() * std::mem::size_of::<i16>()
    }

    pub fn format(&self) -> SampleFormat {
        SampleFormat::CANONICAL
    }
}
