//! # Analysis Module
//!
//! Key classification and its rendering.
//!
//! ## Overview
//!
//! This crate handles:
//! - The 24 major and minor keys plus the silence classification
//! - Rendering a classification in the standard, Camelot or Open Key notation
//! - The [`KeyEstimator`] interface and a chromagram-based implementation

pub mod error;
pub mod estimator;
pub mod key;
pub mod notation;

pub use error::{AnalysisError, Result};
pub use estimator::{ChromaKeyEstimator, EstimatorConfig, KeyEstimator};
pub use key::{Key, KeyClassification, Mode};
pub use notation::{display, Notation};
