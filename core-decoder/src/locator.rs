//! # Stream Locator
//!
//! Opens a container, picks the first audio stream and opens its decoder.

use crate::error::{DecodeError, Result};
use crate::traits::{Codec, Container, MediaBackend};
use crate::types::{ChannelLayout, StreamInfo};
use std::fmt;
use std::path::Path;
use tracing::{debug, error};

/// An open container together with its selected audio stream and decoder.
///
/// Dropping it releases the container and the codec, whichever stage the
/// pipeline stopped at.
pub struct MediaSource {
    container: Box<dyn Container>,
    stream: StreamInfo,
    codec: Box<dyn Codec>,
}

impl MediaSource {
    /// The selected stream, with its channel layout always resolved.
    pub fn stream(&self) -> &StreamInfo {
        &self.stream
    }

    /// Hand the parts over to the packet cursor and frame decoder.
    pub fn into_parts(self) -> (Box<dyn Container>, StreamInfo, Box<dyn Codec>) {
        (self.container, self.stream, self.codec)
    }
}

impl fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaSource")
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

/// Resolves the audio stream of a media file.
pub struct StreamLocator<'a> {
    backend: &'a dyn MediaBackend,
}

impl<'a> StreamLocator<'a> {
    pub fn new(backend: &'a dyn MediaBackend) -> Self {
        Self { backend }
    }

    /// Open `path` and prepare its first audio stream for decoding.
    ///
    /// Only the first stream classified as audio is ever considered, even
    /// when the container holds several.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Open`] if the file is missing or its format unknown
    /// - [`DecodeError::Probe`] if stream metadata cannot be determined
    /// - [`DecodeError::NoAudioStream`] if no stream is audio
    /// - [`DecodeError::UnsupportedCodec`] if no decoder handles the codec
    /// - [`DecodeError::CodecOpen`] if the decoder fails to open
    pub fn open(&self, path: &Path) -> Result<MediaSource> {
        let mut container = self.backend.open(path).map_err(|e| {
            error!("Failed to open container: {}", e);
            DecodeError::Open {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        let streams = container.probe().map_err(|e| {
            error!("Failed to probe streams: {}", e);
            DecodeError::Probe(e.to_string())
        })?;
        debug!("Container holds {} stream(s)", streams.len());

        let selected = streams
            .into_iter()
            .find(StreamInfo::is_audio)
            .ok_or_else(|| {
                error!("No audio stream found");
                DecodeError::NoAudioStream
            })?;
        let stream = resolve_stream_parameters(selected)?;

        debug!(
            index = stream.index,
            codec = %stream.codec,
            sample_rate = ?stream.sample_rate,
            channels = ?stream.channel_count,
            "Selected audio stream"
        );

        let decoder_name = container.find_decoder(&stream).ok_or_else(|| {
            error!("No decoder registered for codec {}", stream.codec);
            DecodeError::UnsupportedCodec(stream.codec.to_string())
        })?;
        debug!("Resolved decoder: {}", decoder_name);

        let codec = container.open_decoder(&stream).map_err(|e| {
            error!("Failed to open decoder {}: {}", decoder_name, e);
            DecodeError::CodecOpen(format!("{}: {}", decoder_name, e))
        })?;

        Ok(MediaSource {
            container,
            stream,
            codec,
        })
    }
}

/// Check the mandatory stream parameters and fill in a missing channel layout.
fn resolve_stream_parameters(mut stream: StreamInfo) -> Result<StreamInfo> {
    if stream.sample_rate.is_none() {
        return Err(DecodeError::Probe(format!(
            "stream {} does not declare a sample rate",
            stream.index
        )));
    }

    match (stream.layout, stream.channel_count) {
        (Some(layout), _) if !layout.is_empty() => {
            stream.channel_count = Some(layout.count());
        }
        (_, Some(channels)) => {
            let layout = ChannelLayout::default_for(channels).ok_or_else(|| {
                DecodeError::Probe(format!("no default layout for {} channels", channels))
            })?;
            debug!(
                "Container declares no channel layout, using default for {} channels",
                channels
            );
            stream.layout = Some(layout);
        }
        _ => {
            return Err(DecodeError::Probe(format!(
                "stream {} does not declare its channels",
                stream.index
            )));
        }
    }

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AudioCodec, StreamKind};

    #[test]
    fn test_layout_fallback_from_channel_count() {
        let stream = StreamInfo::audio(0, AudioCodec::Pcm)
            .with_sample_rate(44100)
            .with_channel_count(2);

        let resolved = resolve_stream_parameters(stream).unwrap();
        assert_eq!(resolved.layout, Some(ChannelLayout::STEREO));
        assert_eq!(resolved.channel_count, Some(2));
    }

    #[test]
    fn test_declared_layout_wins() {
        let stream = StreamInfo::audio(0, AudioCodec::Flac)
            .with_sample_rate(48000)
            .with_layout(ChannelLayout::MONO);

        let resolved = resolve_stream_parameters(stream).unwrap();
        assert_eq!(resolved.layout, Some(ChannelLayout::MONO));
        assert_eq!(resolved.channel_count, Some(1));
    }

    #[test]
    fn test_missing_parameters_are_probe_errors() {
        let no_rate = StreamInfo::audio(0, AudioCodec::Mp3).with_channel_count(2);
        assert!(matches!(
            resolve_stream_parameters(no_rate),
            Err(DecodeError::Probe(_))
        ));

        let no_channels = StreamInfo::audio(0, AudioCodec::Mp3).with_sample_rate(44100);
        assert!(matches!(
            resolve_stream_parameters(no_channels),
            Err(DecodeError::Probe(_))
        ));

        let zero_channels = StreamInfo::audio(0, AudioCodec::Mp3)
            .with_sample_rate(44100)
            .with_channel_count(0);
        assert!(matches!(
            resolve_stream_parameters(zero_channels),
            Err(DecodeError::Probe(_))
        ));
    }

    #[test]
    fn test_non_audio_stream_is_not_audio() {
        assert!(!StreamInfo::other(0, StreamKind::Video).is_audio());
    }
}
