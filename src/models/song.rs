use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt::Display;

/// A normalized chord name (e.g. "Am", "F#m7")
///
/// Normalization happens upstream in the chord vocabulary; here a chord is an
/// opaque key compared by exact string equality and ordered lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chord(String);

impl Chord {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Chord {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Chord {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Display for Chord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog identifier of a song
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(String);

impl SongId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SongId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SongId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for SongId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of chords a learner reports knowing
pub type KnownChords = HashSet<Chord>;

/// A catalog song and the chords required to play it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: SongId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Required chords; a set, so repeated chords in a progression count once
    pub chords: BTreeSet<Chord>,
    /// Lower is easier
    #[serde(default)]
    pub difficulty: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Song {
    pub fn new<I, C>(id: impl Into<SongId>, chords: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Chord>,
    {
        Self {
            id: id.into(),
            title: None,
            artist: None,
            chords: chords.into_iter().map(Into::into).collect(),
            difficulty: None,
            genres: Vec::new(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// True when every required chord is already known
    pub fn is_playable_with(&self, known: &KnownChords) -> bool {
        self.chords.iter().all(|c| known.contains(c))
    }

    /// Required chords not in `known`, in chord order
    pub fn missing_chords<'a>(&'a self, known: &'a KnownChords) -> impl Iterator<Item = &'a Chord> {
        self.chords.iter().filter(move |c| !known.contains(*c))
    }
}
