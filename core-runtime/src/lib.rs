//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the key finder:
//! - Logging and tracing infrastructure
//! - Runtime error types
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the decoder, the analysis
//! engine and the command-line front end depend on. It establishes the logging
//! conventions used throughout the system: structured `tracing` events that go
//! to standard error, leaving standard output free for the rendered key.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
