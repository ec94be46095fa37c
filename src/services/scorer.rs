use std::cmp::Ordering;
use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{
    CatalogSnapshot, Chord, KnownChords, NextChord, Recommendation, Song, SongId, SongProgress,
};

/// Default page size for song listings
pub const DEFAULT_SONG_LIMIT: usize = 100;
/// Upper bound on any song listing
pub const MAX_SONG_LIMIT: usize = 500;

/// Error types for the scorer
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("candidate already known: {0}")]
    InvalidCandidate(Chord),
}

/// Running totals for one candidate chord
#[derive(Default)]
struct CandidateTally<'a> {
    unlocked: Vec<&'a SongId>,
    difficulty_sum: f64,
    rated: usize,
}

impl<'a> CandidateTally<'a> {
    fn add(&mut self, song: &'a Song) {
        self.unlocked.push(&song.id);
        if let Some(difficulty) = song.difficulty {
            self.difficulty_sum += difficulty;
            self.rated += 1;
        }
    }

    fn score(&self) -> usize {
        self.unlocked.len()
    }

    fn avg_difficulty(&self) -> f64 {
        if self.rated == 0 {
            0.0
        } else {
            self.difficulty_sum / self.rated as f64
        }
    }

    /// Higher score first, then easier songs
    fn beats(&self, other: &CandidateTally<'_>) -> bool {
        match self.score().cmp(&other.score()) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.avg_difficulty().total_cmp(&other.avg_difficulty()) == Ordering::Less,
        }
    }
}

/// The one chord a song still needs, if it needs exactly one
///
/// Songs already playable with `known` return `None`, so they never count
/// toward any candidate.
fn sole_missing_chord<'a>(song: &'a Song, known: &'a KnownChords) -> Option<&'a Chord> {
    let mut missing = song.missing_chords(known);
    let first = missing.next()?;
    match missing.next() {
        None => Some(first),
        Some(_) => None,
    }
}

/// Picks the chord whose addition unlocks the most new songs
///
/// Ties go to the lower mean difficulty of the unlocked songs, then to the
/// lexicographically smaller chord name.
pub fn next_chord(known: &KnownChords, snapshot: &CatalogSnapshot) -> NextChord {
    // BTreeMap iteration is in chord order, which settles the final tie-break
    let mut tallies: BTreeMap<&Chord, CandidateTally> = snapshot
        .chord_universe()
        .iter()
        .filter(|c| !known.contains(*c))
        .map(|c| (c, CandidateTally::default()))
        .collect();

    if tallies.is_empty() {
        return NextChord::NoneAvailable;
    }

    for song in snapshot.songs() {
        if let Some(chord) = sole_missing_chord(song, known) {
            if let Some(tally) = tallies.get_mut(chord) {
                tally.add(song);
            }
        }
    }

    let mut best: Option<(&Chord, &CandidateTally)> = None;
    for (chord, tally) in &tallies {
        match best {
            Some((_, current)) if !tally.beats(current) => {}
            _ => best = Some((*chord, tally)),
        }
    }

    match best {
        Some((chord, tally)) => {
            tracing::debug!(
                chord = %chord,
                score = tally.score(),
                candidates = tallies.len(),
                "Scored next chord"
            );
            NextChord::Recommended(Recommendation {
                recommended_chord: chord.clone(),
                unlocked_songs: tally.unlocked.iter().map(|id| (*id).clone()).collect(),
                score: tally.score(),
                avg_difficulty_of_unlocked: tally.avg_difficulty(),
            })
        }
        None => NextChord::NoneAvailable,
    }
}

/// Songs that adding `candidate` to `known` would make playable
pub fn songs_unlocked_by(
    known: &KnownChords,
    candidate: &Chord,
    snapshot: &CatalogSnapshot,
) -> Result<Vec<SongId>, ScoreError> {
    if known.contains(candidate) {
        return Err(ScoreError::InvalidCandidate(candidate.clone()));
    }

    Ok(snapshot
        .songs()
        .iter()
        .filter(|song| sole_missing_chord(song, known) == Some(candidate))
        .map(|song| song.id.clone())
        .collect())
}

/// Clamps a requested page size to the allowed range
pub fn song_limit(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_SONG_LIMIT).min(MAX_SONG_LIMIT)
}

/// Songs fully playable with `known`, in catalog order
pub fn playable_songs<'a>(
    known: &KnownChords,
    snapshot: &'a CatalogSnapshot,
    limit: usize,
) -> Vec<&'a Song> {
    snapshot
        .songs()
        .iter()
        .filter(|song| song.is_playable_with(known))
        .take(limit)
        .collect()
}

/// Songs the learner is closest to being able to play
///
/// Ranked by how many chords are missing, then by difficulty (unrated songs
/// last), then by id. Songs already playable are excluded.
pub fn closest_songs(
    known: &KnownChords,
    snapshot: &CatalogSnapshot,
    limit: usize,
) -> Vec<SongProgress> {
    let mut progress: Vec<SongProgress> = snapshot
        .songs()
        .iter()
        .filter_map(|song| {
            let missing = missing_chords(known, song);
            if missing.is_empty() {
                return None;
            }
            Some(SongProgress {
                song_id: song.id.clone(),
                missing_chords: missing,
                difficulty: song.difficulty,
            })
        })
        .collect();

    progress.sort_by(|a, b| {
        a.missing_chords
            .len()
            .cmp(&b.missing_chords.len())
            .then_with(|| compare_difficulty(a.difficulty, b.difficulty))
            .then_with(|| a.song_id.cmp(&b.song_id))
    });
    progress.truncate(limit);
    progress
}

fn compare_difficulty(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Chords still needed to play `song`, sorted
pub fn missing_chords(known: &KnownChords, song: &Song) -> Vec<Chord> {
    song.missing_chords(known).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(chords: &[&str]) -> KnownChords {
        chords.iter().map(|c| Chord::from(*c)).collect()
    }

    fn ids(songs: &[SongId]) -> Vec<&str> {
        songs.iter().map(SongId::as_str).collect()
    }

    /// S1{C,G}@1, S2{C,G,Am}@1, S3{C,G,Am,F}@2, S4{D,E,A}@2
    fn four_song_catalog() -> CatalogSnapshot {
        CatalogSnapshot::build(vec![
            Song::new("S1", ["C", "G"]).with_difficulty(1.0),
            Song::new("S2", ["C", "G", "Am"]).with_difficulty(1.0),
            Song::new("S3", ["C", "G", "Am", "F"]).with_difficulty(2.0),
            Song::new("S4", ["D", "E", "A"]).with_difficulty(2.0),
        ])
    }

    fn expect_recommendation(outcome: NextChord) -> Recommendation {
        match outcome {
            NextChord::Recommended(rec) => rec,
            NextChord::NoneAvailable => panic!("expected a recommendation"),
        }
    }

    #[test]
    fn test_learner_knowing_c_and_g_gets_am() {
        let snapshot = four_song_catalog();
        let rec = expect_recommendation(next_chord(&known(&["C", "G"]), &snapshot));

        assert_eq!(rec.recommended_chord, Chord::from("Am"));
        assert_eq!(rec.score, 1);
        assert_eq!(ids(&rec.unlocked_songs), vec!["S2"]);
        assert_eq!(rec.avg_difficulty_of_unlocked, 1.0);
    }

    #[test]
    fn test_learner_knowing_c_g_am_gets_f() {
        let snapshot = four_song_catalog();
        let rec = expect_recommendation(next_chord(&known(&["C", "G", "Am"]), &snapshot));

        assert_eq!(rec.recommended_chord, Chord::from("F"));
        assert_eq!(rec.score, 1);
        assert_eq!(ids(&rec.unlocked_songs), vec!["S3"]);
        assert_eq!(rec.avg_difficulty_of_unlocked, 2.0);
    }

    #[test]
    fn test_empty_known_set_scores_zero_and_picks_smallest_chord() {
        let snapshot = CatalogSnapshot::build(vec![Song::new("S1", ["C", "G"])]);
        let rec = expect_recommendation(next_chord(&known(&[]), &snapshot));

        assert_eq!(rec.recommended_chord, Chord::from("C"));
        assert_eq!(rec.score, 0);
        assert!(rec.unlocked_songs.is_empty());
        assert_eq!(rec.avg_difficulty_of_unlocked, 0.0);
    }

    #[test]
    fn test_empty_known_set_unlocks_single_chord_songs() {
        let snapshot = CatalogSnapshot::build(vec![
            Song::new("S1", ["C", "G"]),
            Song::new("S2", ["G"]),
        ]);
        let rec = expect_recommendation(next_chord(&known(&[]), &snapshot));

        assert_eq!(rec.recommended_chord, Chord::from("G"));
        assert_eq!(ids(&rec.unlocked_songs), vec!["S2"]);
    }

    #[test]
    fn test_none_available_when_universe_known() {
        let snapshot = four_song_catalog();
        let outcome = next_chord(&known(&["C", "G", "Am", "F", "D", "E", "A"]), &snapshot);
        assert_eq!(outcome, NextChord::NoneAvailable);
    }

    #[test]
    fn test_none_available_for_empty_catalog() {
        let snapshot = CatalogSnapshot::build(vec![]);
        assert_eq!(next_chord(&known(&["C"]), &snapshot), NextChord::NoneAvailable);
    }

    #[test]
    fn test_tie_break_prefers_lexicographically_smaller_chord() {
        let snapshot = CatalogSnapshot::build(vec![
            Song::new("S1", ["C", "Bm"]).with_difficulty(3.0),
            Song::new("S2", ["C", "Am"]).with_difficulty(3.0),
        ]);
        let rec = expect_recommendation(next_chord(&known(&["C"]), &snapshot));

        assert_eq!(rec.recommended_chord, Chord::from("Am"));
        assert_eq!(ids(&rec.unlocked_songs), vec!["S2"]);
    }

    #[test]
    fn test_tie_break_prefers_lower_average_difficulty() {
        let snapshot = CatalogSnapshot::build(vec![
            Song::new("S1", ["C", "Am"]).with_difficulty(4.0),
            Song::new("S2", ["C", "Bm"]).with_difficulty(2.0),
        ]);
        let rec = expect_recommendation(next_chord(&known(&["C"]), &snapshot));

        assert_eq!(rec.recommended_chord, Chord::from("Bm"));
        assert_eq!(rec.avg_difficulty_of_unlocked, 2.0);
    }

    #[test]
    fn test_score_beats_difficulty() {
        let snapshot = CatalogSnapshot::build(vec![
            Song::new("S1", ["C", "Am"]).with_difficulty(1.0),
            Song::new("S2", ["C", "D"]).with_difficulty(5.0),
            Song::new("S3", ["G", "D"]).with_difficulty(5.0),
        ]);
        let rec = expect_recommendation(next_chord(&known(&["C", "G"]), &snapshot));

        assert_eq!(rec.recommended_chord, Chord::from("D"));
        assert_eq!(rec.score, 2);
        assert_eq!(ids(&rec.unlocked_songs), vec!["S2", "S3"]);
    }

    #[test]
    fn test_average_ignores_unrated_songs() {
        let snapshot = CatalogSnapshot::build(vec![
            Song::new("S1", ["C", "D"]).with_difficulty(3.0),
            Song::new("S2", ["C", "D"]),
        ]);
        let rec = expect_recommendation(next_chord(&known(&["C"]), &snapshot));

        assert_eq!(rec.score, 2);
        assert_eq!(rec.avg_difficulty_of_unlocked, 3.0);
    }

    #[test]
    fn test_already_playable_songs_never_count() {
        let snapshot = four_song_catalog();
        let known = known(&["C", "G"]);

        let rec = expect_recommendation(next_chord(&known, &snapshot));
        assert!(!rec.unlocked_songs.contains(&SongId::from("S1")));

        for candidate in snapshot.chord_universe() {
            if known.contains(candidate) {
                continue;
            }
            let unlocked = songs_unlocked_by(&known, candidate, &snapshot).unwrap();
            assert!(!unlocked.contains(&SongId::from("S1")));
        }
    }

    #[test]
    fn test_next_chord_is_deterministic() {
        let snapshot = four_song_catalog();
        let known = known(&["C", "G"]);

        let first = next_chord(&known, &snapshot);
        for _ in 0..10 {
            assert_eq!(next_chord(&known, &snapshot), first);
        }
    }

    #[test]
    fn test_unlocked_songs_stay_playable_as_known_grows() {
        let snapshot = four_song_catalog();
        let smaller = known(&["C", "G"]);
        let candidate = Chord::from("Am");

        let unlocked = songs_unlocked_by(&smaller, &candidate, &snapshot).unwrap();
        assert!(!unlocked.is_empty());

        let mut larger = known(&["C", "G", "D", "E"]);
        larger.insert(candidate.clone());
        for id in unlocked {
            let song = snapshot.song(&id).unwrap();
            assert!(song.is_playable_with(&larger));
        }
    }

    #[test]
    fn test_songs_unlocked_by_matches_next_chord() {
        let snapshot = four_song_catalog();
        let known = known(&["C", "G"]);

        let rec = expect_recommendation(next_chord(&known, &snapshot));
        let unlocked = songs_unlocked_by(&known, &rec.recommended_chord, &snapshot).unwrap();
        assert_eq!(unlocked, rec.unlocked_songs);
    }

    #[test]
    fn test_songs_unlocked_by_rejects_known_candidate() {
        let snapshot = four_song_catalog();
        let result = songs_unlocked_by(&known(&["C", "G"]), &Chord::from("G"), &snapshot);
        assert_eq!(result, Err(ScoreError::InvalidCandidate(Chord::from("G"))));
    }

    #[test]
    fn test_songs_unlocked_by_unknown_chord_unlocks_nothing() {
        let snapshot = four_song_catalog();
        let unlocked =
            songs_unlocked_by(&known(&["C", "G"]), &Chord::from("Bb"), &snapshot).unwrap();
        assert!(unlocked.is_empty());
    }

    #[test]
    fn test_playable_songs_respects_limit() {
        let snapshot = CatalogSnapshot::build(vec![
            Song::new("S1", ["C"]),
            Song::new("S2", ["C", "G"]),
            Song::new("S3", ["C", "D"]),
            Song::new("S4", ["G"]),
        ]);
        let known = known(&["C", "G"]);

        let all: Vec<&str> = playable_songs(&known, &snapshot, 10)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(all, vec!["S1", "S2", "S4"]);
        assert_eq!(playable_songs(&known, &snapshot, 2).len(), 2);
    }

    #[test]
    fn test_song_limit_clamps() {
        assert_eq!(song_limit(None), DEFAULT_SONG_LIMIT);
        assert_eq!(song_limit(Some(20)), 20);
        assert_eq!(song_limit(Some(10_000)), MAX_SONG_LIMIT);
    }

    #[test]
    fn test_closest_songs_ordering() {
        let snapshot = CatalogSnapshot::build(vec![
            Song::new("far", ["C", "D", "E"]).with_difficulty(1.0),
            Song::new("near-hard", ["C", "F"]).with_difficulty(5.0),
            Song::new("near-unrated", ["C", "Bb"]),
            Song::new("near-easy", ["C", "Am"]).with_difficulty(1.0),
            Song::new("playable", ["C"]),
        ]);

        let progress = closest_songs(&known(&["C"]), &snapshot, 10);
        let order: Vec<&str> = progress.iter().map(|p| p.song_id.as_str()).collect();
        assert_eq!(order, vec!["near-easy", "near-hard", "near-unrated", "far"]);
        assert_eq!(progress[3].missing_chords, vec![Chord::from("D"), Chord::from("E")]);

        assert_eq!(closest_songs(&known(&["C"]), &snapshot, 1).len(), 1);
    }

    #[test]
    fn test_missing_chords_for_target_song() {
        let song = Song::new("S3", ["C", "G", "Am", "F"]);
        assert_eq!(
            missing_chords(&known(&["C", "G"]), &song),
            vec![Chord::from("Am"), Chord::from("F")]
        );
        assert!(missing_chords(&known(&["C", "G", "Am", "F"]), &song).is_empty());
    }
}
