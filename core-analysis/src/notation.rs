//! # Key Notations
//!
//! Static tables rendering a [`Key`] in one of three notation schemes. Each
//! table lists the keys in [`Key::ALL`] order.

use crate::error::AnalysisError;
use crate::key::{Key, KeyClassification};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    /// Letter names, e.g. "Bbm Minor"
    #[default]
    Standard,
    /// Mixed In Key's Camelot wheel, e.g. "3A"
    Camelot,
    /// Open Key notation, e.g. "8m"
    OpenKey,
}

const STANDARD: [&str; 24] = [
    "A Major", "Am Minor", "Bb Major", "Bbm Minor", "B Major", "Bm Minor", "C Major", "Cm Minor",
    "Db Major", "Dbm Minor", "D Major", "Dm Minor", "Eb Major", "Ebm Minor", "E Major",
    "Em Minor", "F Major", "Fm Minor", "Gb Major", "Gbm Minor", "G Major", "Gm Minor",
    "Ab Major", "Abm Minor",
];

const CAMELOT: [&str; 24] = [
    "11B", "8A", "6B", "3A", "1B", "10A", "8B", "5A", "3B", "12A", "10B", "7A", "5B", "2A", "12B",
    "9A", "7B", "4A", "2B", "11A", "9B", "6A", "4B", "1A",
];

const OPEN_KEY: [&str; 24] = [
    "4d", "1m", "11d", "8m", "6d", "3m", "1d", "10m", "8d", "5m", "3d", "12m", "10d", "7m", "5d",
    "2m", "12d", "9m", "7d", "4m", "2d", "11m", "9d", "6m",
];

impl Notation {
    pub const ALL: [Notation; 3] = [Notation::Standard, Notation::Camelot, Notation::OpenKey];

    /// Name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Notation::Standard => "standard",
            Notation::Camelot => "camelot",
            Notation::OpenKey => "openkey",
        }
    }

    pub fn label(self, key: Key) -> &'static str {
        self.table()[key.index()]
    }

    fn table(self) -> &'static [&'static str; 24] {
        match self {
            Notation::Standard => &STANDARD,
            Notation::Camelot => &CAMELOT,
            Notation::OpenKey => &OPEN_KEY,
        }
    }
}

impl FromStr for Notation {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Notation::ALL
            .into_iter()
            .find(|notation| notation.name() == s)
            .ok_or_else(|| AnalysisError::InvalidNotation(s.to_string()))
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render a classification; silence renders as nothing at all.
pub fn display(classification: KeyClassification, notation: Notation) -> Option<&'static str> {
    classification.key().map(|key| notation.label(key))
}
