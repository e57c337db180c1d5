use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The requested notation scheme does not exist.
    #[error("Invalid key notation: {0}")]
    InvalidNotation(String),

    /// The sample buffer cannot be analysed.
    #[error("Invalid audio for key estimation: {0}")]
    InvalidInput(String),

    /// Estimator parameters are unusable.
    #[error("Invalid estimator configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
