//! # Format Normalizer
//!
//! Converts decoded frames of any sample format into signed 16-bit
//! interleaved PCM. Frames that are already canonical pass through untouched;
//! everything else is converted exactly once, keeping the frame's channel
//! layout and sample rate.

use crate::error::{DecodeError, Result};
use crate::types::{
    CanonicalFrame, ChannelLayout, DecodedFrame, FrameData, SampleFormat, StreamInfo,
};
use symphonia::core::conv::IntoSample;
use tracing::{debug, error, trace};

pub struct FormatNormalizer {
    sample_rate: u32,
    layout: ChannelLayout,
    frames_converted: u64,
}

impl FormatNormalizer {
    /// Set up conversion for the selected stream.
    ///
    /// Fails with [`DecodeError::ResampleOpen`] when the stream parameters
    /// cannot describe a conversion target.
    pub fn new(stream: &StreamInfo) -> Result<Self> {
        let sample_rate = stream.sample_rate.unwrap_or(0);
        if sample_rate == 0 {
            error!("Cannot convert a stream without a sample rate");
            return Err(DecodeError::ResampleOpen(
                "sample rate must be positive".to_string(),
            ));
        }

        let layout = stream.layout.unwrap_or(ChannelLayout::from_mask(0));
        if layout.is_empty() {
            error!("Cannot convert a stream without a channel layout");
            return Err(DecodeError::ResampleOpen(
                "channel layout is empty".to_string(),
            ));
        }
        if let Some(channels) = stream.channel_count {
            if channels != layout.count() {
                error!("Channel layout disagrees with channel count");
                return Err(DecodeError::ResampleOpen(format!(
                    "layout has {} channels but the stream declares {}",
                    layout.count(),
                    channels
                )));
            }
        }

        let source = stream
            .sample_format
            .map_or_else(|| "unknown".to_string(), |format| format.to_string());
        debug!(
            sample_rate,
            channels = layout.count(),
            source = %source,
            "Converting to {}",
            SampleFormat::CANONICAL
        );

        Ok(Self {
            sample_rate,
            layout,
            frames_converted: 0,
        })
    }

    /// Layout of the stream this normalizer was opened for.
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames that required conversion so far.
    pub fn frames_converted(&self) -> u64 {
        self.frames_converted
    }

    /// Produce the canonical form of `frame`.
    ///
    /// A frame without a channel layout inherits the stream's. Conversion never
    /// changes the sample rate, so a frame at any other rate is rejected.
    pub fn normalize(&mut self, frame: DecodedFrame) -> Result<CanonicalFrame> {
        if frame.sample_rate != self.sample_rate {
            return Err(DecodeError::Resample(format!(
                "frame is at {} Hz but the stream is at {} Hz",
                frame.sample_rate, self.sample_rate
            )));
        }

        let layout = if frame.layout.is_empty() {
            self.layout
        } else {
            frame.layout
        };
        let sample_rate = frame.sample_rate;

        let samples = match frame.data {
            FrameData::Interleaved16(samples) => {
                return CanonicalFrame::new(sample_rate, layout, samples);
            }
            FrameData::U8(planes) => interleave(&planes, layout)?,
            FrameData::U16(planes) => interleave(&planes, layout)?,
            FrameData::U24(planes) => interleave(&planes, layout)?,
            FrameData::U32(planes) => interleave(&planes, layout)?,
            FrameData::S8(planes) => interleave(&planes, layout)?,
            FrameData::S16(planes) => interleave(&planes, layout)?,
            FrameData::S24(planes) => interleave(&planes, layout)?,
            FrameData::S32(planes) => interleave(&planes, layout)?,
            FrameData::F32(planes) => interleave(&planes, layout)?,
            FrameData::F64(planes) => interleave(&planes, layout)?,
        };

        self.frames_converted += 1;
        trace!(samples = samples.len(), "Converted frame");
        CanonicalFrame::new(sample_rate, layout, samples)
    }
}

/// Convert planar samples of any type and interleave them (LRLRLR... for stereo).
fn interleave<T>(planes: &[Vec<T>], layout: ChannelLayout) -> Result<Vec<i16>>
where
    T: IntoSample<i16> + Copy,
{
    if planes.len() != layout.count() {
        return Err(DecodeError::Resample(format!(
            "frame has {} planes but its layout has {} channels",
            planes.len(),
            layout.count()
        )));
    }

    let num_frames = planes.first().map_or(0, Vec::len);
    if planes.iter().any(|plane| plane.len() != num_frames) {
        return Err(DecodeError::Resample(
            "planes have different lengths".to_string(),
        ));
    }

    let mut interleaved = Vec::with_capacity(num_frames * planes.len());
    for frame_idx in 0..num_frames {
        for plane in planes {
            interleaved.push(plane[frame_idx].into_sample());
        }
    }

    Ok(interleaved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AudioCodec, SampleType};

    fn stereo_stream() -> StreamInfo {
        StreamInfo::audio(0, AudioCodec::Flac)
            .with_sample_rate(44100)
            .with_layout(ChannelLayout::STEREO)
            .with_sample_format(SampleFormat::planar(SampleType::S16))
    }

    #[test]
    fn test_open_rejects_unusable_streams() {
        let no_rate = StreamInfo::audio(0, AudioCodec::Pcm).with_layout(ChannelLayout::MONO);
        assert!(matches!(
            FormatNormalizer::new(&no_rate),
            Err(DecodeError::ResampleOpen(_))
        ));

        let no_layout = StreamInfo::audio(0, AudioCodec::Pcm).with_sample_rate(8000);
        assert!(matches!(
            FormatNormalizer::new(&no_layout),
            Err(DecodeError::ResampleOpen(_))
        ));

        let mut disagreeing = stereo_stream();
        disagreeing.channel_count = Some(6);
        assert!(matches!(
            FormatNormalizer::new(&disagreeing),
            Err(DecodeError::ResampleOpen(_))
        ));
    }

    #[test]
    fn test_canonical_frame_passes_through() {
        let mut normalizer = FormatNormalizer::new(&stereo_stream()).unwrap();
        let frame = DecodedFrame::new(
            44100,
            ChannelLayout::STEREO,
            FrameData::Interleaved16(vec![1, -1, 2, -2]),
        );

        let canonical = normalizer.normalize(frame).unwrap();
        assert_eq!(canonical.samples(), &[1, -1, 2, -2]);
        assert_eq!(normalizer.frames_converted(), 0);
    }

    #[test]
    fn test_planar_s16_is_interleaved() {
        let mut normalizer = FormatNormalizer::new(&stereo_stream()).unwrap();
        let frame = DecodedFrame::new(
            44100,
            ChannelLayout::STEREO,
            FrameData::S16(vec![vec![1, 2, 3], vec![-1, -2, -3]]),
        );

        let canonical = normalizer.normalize(frame).unwrap();
        assert_eq!(canonical.samples(), &[1, -1, 2, -2, 3, -3]);
        assert_eq!(canonical.layout(), ChannelLayout::STEREO);
        assert_eq!(canonical.sample_rate(), 44100);
        assert_eq!(normalizer.frames_converted(), 1);
    }

    #[test]
    fn test_float_conversion_scales_to_i16() {
        let mut normalizer = FormatNormalizer::new(&stereo_stream()).unwrap();
        let frame = DecodedFrame::new(
            44100,
            ChannelLayout::STEREO,
            FrameData::F32(vec![vec![0.0, 0.5], vec![-0.5, -1.0]]),
        );

        let canonical = normalizer.normalize(frame).unwrap();
        let samples = canonical.samples();
        assert_eq!(samples[0], 0);
        // Output is interleaved: L0 R0 L1 R1
        assert!((i32::from(samples[1]) + 16384).abs() <= 1);
        assert!((i32::from(samples[2]) - 16384).abs() <= 1);
        assert!(samples[3] <= -32767);
    }

    #[test]
    fn test_empty_frame_layout_inherits_stream_layout() {
        let mut normalizer = FormatNormalizer::new(&stereo_stream()).unwrap();
        let frame = DecodedFrame::new(
            44100,
            ChannelLayout::from_mask(0),
            FrameData::S32(vec![vec![0; 4], vec![0; 4]]),
        );

        let canonical = normalizer.normalize(frame).unwrap();
        assert_eq!(canonical.layout(), ChannelLayout::STEREO);
        assert_eq!(canonical.frames(), 4);
    }

    #[test]
    fn test_sample_rate_change_is_resample_error() {
        let mut normalizer = FormatNormalizer::new(&stereo_stream()).unwrap();
        let frame = DecodedFrame::new(
            48000,
            ChannelLayout::STEREO,
            FrameData::Interleaved16(vec![0; 4]),
        );

        assert!(matches!(
            normalizer.normalize(frame),
            Err(DecodeError::Resample(_))
        ));
    }

    #[test]
    fn test_plane_count_mismatch_is_resample_error() {
        let mut normalizer = FormatNormalizer::new(&stereo_stream()).unwrap();
        let frame = DecodedFrame::new(
            44100,
            ChannelLayout::STEREO,
            FrameData::F64(vec![vec![0.0; 4]]),
        );

        assert!(matches!(
            normalizer.normalize(frame),
            Err(DecodeError::Resample(_))
        ));
    }
}
