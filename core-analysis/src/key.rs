//! # Key Classification
//!
//! Keys are enumerated from A major upwards in semitones, major before minor,
//! so a key's position doubles as its row in every notation table.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

/// One of the 12 major and 12 minor keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    AMajor,
    AMinor,
    BFlatMajor,
    BFlatMinor,
    BMajor,
    BMinor,
    CMajor,
    CMinor,
    DFlatMajor,
    DFlatMinor,
    DMajor,
    DMinor,
    EFlatMajor,
    EFlatMinor,
    EMajor,
    EMinor,
    FMajor,
    FMinor,
    GFlatMajor,
    GFlatMinor,
    GMajor,
    GMinor,
    AFlatMajor,
    AFlatMinor,
}

/// Pitch class of A, counting C as 0.
const A_PITCH_CLASS: u8 = 9;

impl Key {
    pub const ALL: [Key; 24] = [
        Key::AMajor,
        Key::AMinor,
        Key::BFlatMajor,
        Key::BFlatMinor,
        Key::BMajor,
        Key::BMinor,
        Key::CMajor,
        Key::CMinor,
        Key::DFlatMajor,
        Key::DFlatMinor,
        Key::DMajor,
        Key::DMinor,
        Key::EFlatMajor,
        Key::EFlatMinor,
        Key::EMajor,
        Key::EMinor,
        Key::FMajor,
        Key::FMinor,
        Key::GFlatMajor,
        Key::GFlatMinor,
        Key::GMajor,
        Key::GMinor,
        Key::AFlatMajor,
        Key::AFlatMinor,
    ];

    /// Position in [`Key::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Key> {
        Self::ALL.get(index).copied()
    }

    pub fn mode(self) -> Mode {
        if self.index() % 2 == 0 {
            Mode::Major
        } else {
            Mode::Minor
        }
    }

    /// Pitch class of the tonic, with C = 0.
    pub fn tonic(self) -> u8 {
        ((self.index() / 2) as u8 + A_PITCH_CLASS) % 12
    }

    /// The key with the given tonic pitch class (C = 0) and mode.
    pub fn from_tonic(tonic: u8, mode: Mode) -> Key {
        let step = usize::from((tonic % 12 + 12 - A_PITCH_CLASS) % 12);
        let offset = match mode {
            Mode::Major => 0,
            Mode::Minor => 1,
        };
        Self::ALL[step * 2 + offset]
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::notation::Notation::Standard.label(*self))
    }
}

/// Outcome of key estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyClassification {
    Tonal(Key),
    /// No key should be reported
    Silence,
}

impl KeyClassification {
    pub fn is_silence(&self) -> bool {
        matches!(self, KeyClassification::Silence)
    }

    pub fn key(&self) -> Option<Key> {
        match self {
            KeyClassification::Tonal(key) => Some(*key),
            KeyClassification::Silence => None,
        }
    }
}

impl From<Key> for KeyClassification {
    fn from(key: Key) -> Self {
        KeyClassification::Tonal(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, key) in Key::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
            assert_eq!(Key::from_index(i), Some(*key));
        }
        assert_eq!(Key::from_index(24), None);
    }

    #[test]
    fn test_tonics() {
        assert_eq!(Key::AMajor.tonic(), 9);
        assert_eq!(Key::BMinor.tonic(), 11);
        assert_eq!(Key::CMajor.tonic(), 0);
        assert_eq!(Key::AFlatMinor.tonic(), 8);
    }

    #[test]
    fn test_from_tonic() {
        assert_eq!(Key::from_tonic(0, Mode::Major), Key::CMajor);
        assert_eq!(Key::from_tonic(9, Mode::Minor), Key::AMinor);
        assert_eq!(Key::from_tonic(3, Mode::Major), Key::EFlatMajor);
        for key in Key::ALL {
            assert_eq!(Key::from_tonic(key.tonic(), key.mode()), key);
        }
    }

    #[test]
    fn test_modes_alternate() {
        assert_eq!(Key::AMajor.mode(), Mode::Major);
        assert_eq!(Key::AMinor.mode(), Mode::Minor);
        assert_eq!(Key::AFlatMinor.mode(), Mode::Minor);
    }

    #[test]
    fn test_classification() {
        assert!(KeyClassification::Silence.is_silence());
        assert_eq!(KeyClassification::Silence.key(), None);
        assert_eq!(KeyClassification::from(Key::DMajor).key(), Some(Key::DMajor));
    }
}
