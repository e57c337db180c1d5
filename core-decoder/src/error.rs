//! # Decoder Error Types
//!
//! Every failure the decode pipeline can report. All of them abort the run
//! except malformed packets, which are absorbed until the bad-packet budget
//! is exhausted and then surface as [`DecodeError::DecodeCorruption`].

use thiserror::Error;

/// Errors that can occur while turning a media file into a sample buffer.
#[derive(Error, Debug)]
pub enum DecodeError {
    // ========================================================================
    // Stream Location Errors
    // ========================================================================
    /// The path does not exist or the container could not be parsed as any known format.
    #[error("Unable to open audio file {path} (file doesn't exist or unhandled format): {reason}")]
    Open { path: String, reason: String },

    /// Stream metadata could not be determined.
    #[error("Unable to get stream info: {0}")]
    Probe(String),

    /// The container holds no stream classified as audio.
    #[error("File does not have any audio streams")]
    NoAudioStream,

    /// No decoder is registered for the selected stream's codec.
    #[error("Unsupported audio stream: no decoder for codec {0}")]
    UnsupportedCodec(String),

    /// A decoder was found but could not be opened.
    #[error("Unable to open the codec: {0}")]
    CodecOpen(String),

    // ========================================================================
    // Conversion Errors
    // ========================================================================
    /// The sample format converter rejected the stream parameters.
    #[error("Unable to open the resample context: {0}")]
    ResampleOpen(String),

    /// A decoded frame could not be converted into 16-bit interleaved PCM.
    #[error("Unable to resample audio into 16bit PCM data: {0}")]
    Resample(String),

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// More malformed packets than the configured threshold.
    #[error("Too many bad packets: {count} exceeds the limit of {threshold}")]
    DecodeCorruption { count: usize, threshold: usize },

    /// A frame arrived with a channel count the sample buffer was not opened with.
    #[error("Decoded frame has {found} channels but the stream was opened with {expected}")]
    ChannelMismatch { expected: usize, found: usize },
}

impl DecodeError {
    /// Returns `true` if the input file itself is unreadable or unsupported.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DecodeError::Open { .. }
                | DecodeError::Probe(_)
                | DecodeError::NoAudioStream
                | DecodeError::UnsupportedCodec(_)
        )
    }

    /// Returns `true` if the failure happened while decoding packets.
    pub fn is_stream_error(&self) -> bool {
        matches!(
            self,
            DecodeError::DecodeCorruption { .. }
                | DecodeError::Resample(_)
                | DecodeError::ChannelMismatch { .. }
        )
    }
}

/// Result type for decoder operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Failure reported across the media library boundary.
///
/// Backends only describe what went wrong; the pipeline stage that called
/// them decides which [`DecodeError`] it becomes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<symphonia::core::errors::Error> for BackendError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Result type for media library calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(DecodeError::NoAudioStream.is_input_error());
        assert!(DecodeError::UnsupportedCodec("dts".into()).is_input_error());
        assert!(!DecodeError::NoAudioStream.is_stream_error());

        let corrupt = DecodeError::DecodeCorruption {
            count: 101,
            threshold: 100,
        };
        assert!(corrupt.is_stream_error());
        assert!(!corrupt.is_input_error());
    }

    #[test]
    fn test_messages_are_single_line() {
        let errors = [
            DecodeError::Open {
                path: "missing.mp3".into(),
                reason: "No such file or directory".into(),
            },
            DecodeError::Probe("sample rate unknown".into()),
            DecodeError::NoAudioStream,
            DecodeError::CodecOpen("bad extradata".into()),
            DecodeError::ResampleOpen("zero channels".into()),
            DecodeError::Resample("plane length mismatch".into()),
        ];

        for err in errors {
            let message = err.to_string();
            assert!(!message.is_empty());
            assert!(!message.contains('\n'), "{message}");
        }
    }

    #[test]
    fn test_backend_error_from_symphonia() {
        let err = BackendError::from(symphonia::core::errors::Error::DecodeError("invalid frame"));
        assert!(err.message().contains("invalid frame"));
    }
}
