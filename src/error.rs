use core_analysis::AnalysisError;
use core_decoder::DecodeError;
use thiserror::Error;

/// Every way a key finder invocation can fail.
///
/// The message of each variant is the single line printed to standard error.
#[derive(Error, Debug)]
pub enum CliError {
    /// Bad command line; carries clap's rendered usage text
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_pass_through() {
        let err = CliError::from(AnalysisError::InvalidNotation("lydian".to_string()));
        assert_eq!(err.to_string(), "Invalid key notation: lydian");

        let err = CliError::from(DecodeError::NoAudioStream);
        assert_eq!(err.to_string(), DecodeError::NoAudioStream.to_string());
    }
}
