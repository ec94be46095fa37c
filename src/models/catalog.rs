use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;

use super::{Chord, Song, SongId};

/// Immutable copy of the song catalog plus its derived chord universe
///
/// Built once per refresh and shared behind an `Arc`; nothing mutates a
/// snapshot after construction, so the universe always matches the songs.
#[derive(Debug)]
pub struct CatalogSnapshot {
    songs: Vec<Song>,
    chord_universe: BTreeSet<Chord>,
    index: HashMap<SongId, usize>,
    captured_at: DateTime<Utc>,
    fetched_at: Instant,
}

impl CatalogSnapshot {
    /// Builds a snapshot from raw catalog rows
    ///
    /// Songs with no required chords are dropped, and when an id repeats the
    /// first occurrence wins.
    pub fn build(songs: Vec<Song>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(songs.len());
        let mut duplicates = 0usize;
        let mut chordless = 0usize;

        for song in songs {
            if song.chords.is_empty() {
                chordless += 1;
                continue;
            }
            if !seen.insert(song.id.clone()) {
                duplicates += 1;
                continue;
            }
            kept.push(song);
        }

        if duplicates > 0 || chordless > 0 {
            tracing::warn!(
                duplicates,
                chordless,
                "Dropped invalid songs while building catalog snapshot"
            );
        }

        let chord_universe = kept
            .iter()
            .flat_map(|s| s.chords.iter().cloned())
            .collect();

        let index = kept
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();

        Self {
            songs: kept,
            chord_universe,
            index,
            captured_at: Utc::now(),
            fetched_at: Instant::now(),
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Every chord required by at least one song
    pub fn chord_universe(&self) -> &BTreeSet<Chord> {
        &self.chord_universe
    }

    pub fn song(&self, id: &SongId) -> Option<&Song> {
        self.index.get(id).map(|&i| &self.songs[i])
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
