//! # Application Configuration
//!
//! [`AppConfig`] is everything one invocation needs, assembled from the
//! parsed command line by [`AppConfigBuilder`]. Building fails fast, so an
//! unknown notation is reported before any file is opened.

use crate::error::{CliError, Result};
use core_analysis::Notation;
use core_decoder::DecodeConfig;
use core_runtime::logging::{LogLevel, LoggingConfig};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppConfig {
    input: PathBuf,
    notation: Notation,
    verbosity: u8,
    decode: DecodeConfig,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn decode(&self) -> &DecodeConfig {
        &self.decode
    }

    /// Logging setup for this run, or `None` when logging stays off.
    pub fn logging(&self) -> Option<LoggingConfig> {
        LogLevel::from_verbosity(self.verbosity).map(|level| {
            LoggingConfig::default()
                .with_level(level)
                .with_path_redaction(self.decode.redact_paths)
                .with_spans(level <= LogLevel::Debug)
        })
    }
}

#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    input: Option<PathBuf>,
    notation: Option<String>,
    verbosity: u8,
    decode: Option<DecodeConfig>,
}

impl AppConfigBuilder {
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Notation by its command line name; checked in [`build`](Self::build).
    pub fn notation(mut self, name: impl Into<String>) -> Self {
        self.notation = Some(name.into());
        self
    }

    pub fn verbosity(mut self, count: u8) -> Self {
        self.verbosity = count;
        self
    }

    pub fn decode(mut self, config: DecodeConfig) -> Self {
        self.decode = Some(config);
        self
    }

    pub fn build(self) -> Result<AppConfig> {
        let input = self.input.ok_or_else(|| {
            CliError::Usage("Input file is required. Use .input() to set it.".to_string())
        })?;

        let notation = match self.notation {
            Some(name) => name.parse::<Notation>()?,
            None => Notation::default(),
        };

        let decode = self.decode.unwrap_or_default();
        if decode.bad_packet_threshold == 0 {
            return Err(core_runtime::Error::Config(
                "Bad packet threshold must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(AppConfig {
            input,
            notation,
            verbosity: self.verbosity,
            decode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_analysis::AnalysisError;

    #[test]
    fn test_defaults() {
        let config = AppConfig::builder().input("song.mp3").build().unwrap();

        assert_eq!(config.input(), Path::new("song.mp3"));
        assert_eq!(config.notation(), Notation::Standard);
        assert_eq!(config.verbosity(), 0);
        assert_eq!(config.decode(), &DecodeConfig::default());
        assert!(config.logging().is_none());
    }

    #[test]
    fn test_missing_input_is_usage_error() {
        let err = AppConfig::builder().notation("camelot").build().unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn test_unknown_notation_is_rejected() {
        let err = AppConfig::builder()
            .input("song.mp3")
            .notation("solfege")
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            CliError::Analysis(AnalysisError::InvalidNotation(ref name)) if name == "solfege"
        ));
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let decode = DecodeConfig::default().with_bad_packet_threshold(0);

        let err = AppConfig::builder()
            .input("song.mp3")
            .decode(decode)
            .build()
            .unwrap_err();
        assert!(matches!(err, CliError::Runtime(_)));
    }

    #[test]
    fn test_verbosity_enables_logging() {
        let config = AppConfig::builder()
            .input("song.mp3")
            .verbosity(2)
            .build()
            .unwrap();

        let logging = config.logging().unwrap();
        assert_eq!(logging.level, LogLevel::Debug);
        assert!(logging.redact_paths);
        assert!(logging.enable_spans);
    }
}
