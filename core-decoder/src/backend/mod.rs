//! # Symphonia Backend
//!
//! Media library adapter built on the pure-Rust Symphonia library.
//!
//! ## Supported Formats
//!
//! | Format | Container | Feature Flag |
//! |--------|-----------|--------------|
//! | MP3 | MPEG audio | `decoder-mp3` |
//! | FLAC | native FLAC | `decoder-flac` |
//! | Vorbis | Ogg | `decoder-vorbis` |
//! | AAC | MP4/M4A | `decoder-aac` |
//! | ALAC | MP4/M4A | `decoder-alac` |
//! | PCM, ADPCM | WAV | `decoder-wav` |
//! | any of the above | Matroska/WebM | `decoder-mkv` |
//!
//! Registration of the enabled formats and codecs happens once per process
//! in [`ensure_initialized`].

mod format_detector;
mod symphonia;

pub use self::symphonia::SymphoniaBackend;
pub use format_detector::FormatDetector;

use ::symphonia::core::codecs::CodecRegistry;
use ::symphonia::core::probe::Probe;
use std::sync::OnceLock;
use tracing::debug;

/// Format probe and codec registry shared by every pipeline run.
pub struct Registry {
    pub(crate) codecs: CodecRegistry,
    pub(crate) probe: Probe,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Register the enabled formats and codecs, exactly once per process.
///
/// Safe to call from any thread and any number of times.
pub fn ensure_initialized() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let mut codecs = CodecRegistry::new();
        ::symphonia::default::register_enabled_codecs(&mut codecs);

        let mut probe = Probe::default();
        ::symphonia::default::register_enabled_formats(&mut probe);

        debug!("Registered media formats and codecs");
        Registry { codecs, probe }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialization_is_idempotent() {
        let first = ensure_initialized() as *const Registry;
        let second = ensure_initialized() as *const Registry;
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_initialization() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| ensure_initialized() as *const Registry as usize))
            .collect();
        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
