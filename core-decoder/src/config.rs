//! # Decode Configuration
//!
//! Options controlling how the pipeline drives the decoder, plus the counters
//! it reports when a run completes.

use serde::{Deserialize, Serialize};

/// Malformed packets tolerated before a stream is declared unrecoverable.
pub const BAD_PACKET_THRESHOLD: usize = 100;

/// Which decoder calling convention the frame decoder uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodeProtocol {
    /// Submit one packet, then drain frames until the codec wants more input
    PushPull,
    /// One call per attempt, retrying unconsumed packet bytes
    SingleCall,
}

impl Default for DecodeProtocol {
    /// Chosen at build time by the `single-call-decode` feature.
    fn default() -> Self {
        if cfg!(feature = "single-call-decode") {
            Self::SingleCall
        } else {
            Self::PushPull
        }
    }
}

/// Decode pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Decoder protocol.
    ///
    /// Default: push/pull, or single-call with the `single-call-decode` feature.
    #[serde(default)]
    pub protocol: DecodeProtocol,

    /// Bad packets tolerated; one more aborts the run.
    ///
    /// Default: 100.
    #[serde(default = "default_bad_packet_threshold")]
    pub bad_packet_threshold: usize,

    /// Reserve the sample buffer up front when the container declares the
    /// stream length.
    ///
    /// Default: true.
    #[serde(default = "default_reserve_capacity")]
    pub reserve_capacity: bool,

    /// Log file names instead of full paths.
    ///
    /// Default: true.
    #[serde(default = "default_redact_paths")]
    pub redact_paths: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            protocol: DecodeProtocol::default(),
            bad_packet_threshold: default_bad_packet_threshold(),
            reserve_capacity: default_reserve_capacity(),
            redact_paths: default_redact_paths(),
        }
    }
}

impl DecodeConfig {
    pub fn with_protocol(mut self, protocol: DecodeProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_bad_packet_threshold(mut self, threshold: usize) -> Self {
        self.bad_packet_threshold = threshold;
        self
    }

    pub fn with_reserve_capacity(mut self, reserve: bool) -> Self {
        self.reserve_capacity = reserve;
        self
    }

    pub fn with_path_redaction(mut self, redact: bool) -> Self {
        self.redact_paths = redact;
        self
    }
}

fn default_bad_packet_threshold() -> usize {
    BAD_PACKET_THRESHOLD
}

fn default_reserve_capacity() -> bool {
    true
}

fn default_redact_paths() -> bool {
    true
}

/// Counters collected over one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Packets read for the selected stream
    pub packets_read: u64,
    /// Packets belonging to other streams
    pub packets_skipped: u64,
    /// Frames produced by the decoder
    pub frames_decoded: u64,
    /// Frames that needed sample format conversion
    pub frames_converted: u64,
    /// Malformed packets absorbed by the bad-packet budget
    pub bad_packets: u64,
    /// Interleaved samples appended to the sample buffer
    pub samples_appended: u64,
}
