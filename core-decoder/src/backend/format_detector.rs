//! # Format Detection
//!
//! Probe hints and codec identification for the symphonia backend.

use crate::types::{AudioCodec, SampleFormat, SampleType};
use std::path::Path;
use symphonia::core::codecs::CodecType;
use symphonia::core::probe::Hint;
use symphonia::core::sample::SampleFormat as SymphoniaSampleFormat;
use tracing::debug;

pub struct FormatDetector;

impl FormatDetector {
    /// Create a probe hint from the file extension.
    ///
    /// The hint only speeds detection up; a wrong or missing extension still
    /// probes by content.
    pub fn hint_from_path(path: &Path) -> Hint {
        let mut hint = Hint::new();

        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            debug!("Setting probe hint extension: {}", extension);
            hint.with_extension(extension);
        } else {
            debug!("No file extension found, probe will auto-detect");
        }

        hint
    }

    /// Map symphonia's codec identifier onto [`AudioCodec`].
    pub fn detect_codec(codec_type: CodecType) -> AudioCodec {
        use symphonia::core::codecs::*;

        if codec_type == CODEC_TYPE_NULL {
            AudioCodec::Unknown
        } else if codec_type == CODEC_TYPE_MP3 {
            AudioCodec::Mp3
        } else if codec_type == CODEC_TYPE_AAC {
            AudioCodec::Aac
        } else if codec_type == CODEC_TYPE_FLAC {
            AudioCodec::Flac
        } else if codec_type == CODEC_TYPE_VORBIS {
            AudioCodec::Vorbis
        } else if codec_type == CODEC_TYPE_OPUS {
            AudioCodec::Opus
        } else if codec_type == CODEC_TYPE_ALAC {
            AudioCodec::Alac
        } else if codec_type == CODEC_TYPE_ADPCM_IMA_WAV || codec_type == CODEC_TYPE_ADPCM_MS {
            AudioCodec::Adpcm
        } else if [
            CODEC_TYPE_PCM_S8,
            CODEC_TYPE_PCM_U8,
            CODEC_TYPE_PCM_S16LE,
            CODEC_TYPE_PCM_S16BE,
            CODEC_TYPE_PCM_U16LE,
            CODEC_TYPE_PCM_U16BE,
            CODEC_TYPE_PCM_S24LE,
            CODEC_TYPE_PCM_S24BE,
            CODEC_TYPE_PCM_U24LE,
            CODEC_TYPE_PCM_U24BE,
            CODEC_TYPE_PCM_S32LE,
            CODEC_TYPE_PCM_S32BE,
            CODEC_TYPE_PCM_U32LE,
            CODEC_TYPE_PCM_U32BE,
            CODEC_TYPE_PCM_F32LE,
            CODEC_TYPE_PCM_F32BE,
            CODEC_TYPE_PCM_F64LE,
            CODEC_TYPE_PCM_F64BE,
            CODEC_TYPE_PCM_ALAW,
            CODEC_TYPE_PCM_MULAW,
        ]
        .contains(&codec_type)
        {
            AudioCodec::Pcm
        } else {
            debug!("Codec {:?} has no dedicated name", codec_type);
            AudioCodec::Other(format!("{:?}", codec_type))
        }
    }

    /// Decoded sample format; symphonia always produces planar buffers.
    pub fn sample_format(format: SymphoniaSampleFormat) -> SampleFormat {
        let sample_type = match format {
            SymphoniaSampleFormat::U8 => SampleType::U8,
            SymphoniaSampleFormat::U16 => SampleType::U16,
            SymphoniaSampleFormat::U24 => SampleType::U24,
            SymphoniaSampleFormat::U32 => SampleType::U32,
            SymphoniaSampleFormat::S8 => SampleType::S8,
            SymphoniaSampleFormat::S16 => SampleType::S16,
            SymphoniaSampleFormat::S24 => SampleType::S24,
            SymphoniaSampleFormat::S32 => SampleType::S32,
            SymphoniaSampleFormat::F32 => SampleType::F32,
            SymphoniaSampleFormat::F64 => SampleType::F64,
        };
        SampleFormat::planar(sample_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::codecs::{
        CODEC_TYPE_FLAC, CODEC_TYPE_MP3, CODEC_TYPE_NULL, CODEC_TYPE_PCM_F32LE,
        CODEC_TYPE_PCM_S16LE,
    };

    #[test]
    fn test_hint_from_path() {
        // Hint is opaque; building one must not panic with or without an extension
        let _ = FormatDetector::hint_from_path(Path::new("/music/song.mp3"));
        let _ = FormatDetector::hint_from_path(Path::new("/music/no_extension"));
    }

    #[test]
    fn test_detect_codec() {
        assert_eq!(FormatDetector::detect_codec(CODEC_TYPE_MP3), AudioCodec::Mp3);
        assert_eq!(FormatDetector::detect_codec(CODEC_TYPE_FLAC), AudioCodec::Flac);
        assert_eq!(FormatDetector::detect_codec(CODEC_TYPE_PCM_S16LE), AudioCodec::Pcm);
        assert_eq!(FormatDetector::detect_codec(CODEC_TYPE_PCM_F32LE), AudioCodec::Pcm);
        assert_eq!(FormatDetector::detect_codec(CODEC_TYPE_NULL), AudioCodec::Unknown);
    }

    #[test]
    fn test_sample_format_is_planar() {
        let format = FormatDetector::sample_format(SymphoniaSampleFormat::S16);
        assert_eq!(format, SampleFormat::planar(SampleType::S16));
        assert!(!format.is_canonical());
    }
}
