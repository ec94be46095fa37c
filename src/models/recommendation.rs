use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Chord, SongId};

/// The chord whose addition unlocks the most new songs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommended_chord: Chord,
    /// Songs that become playable only once the chord is learned, in catalog order
    pub unlocked_songs: Vec<SongId>,
    pub score: usize,
    /// Mean difficulty of the unlocked songs that declare one, 0 when none do
    pub avg_difficulty_of_unlocked: f64,
}

/// Outcome of asking for the next chord to learn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum NextChord {
    Recommended(Recommendation),
    /// The learner already knows every chord used in the catalog
    NoneAvailable,
}

impl NextChord {
    pub fn recommendation(&self) -> Option<&Recommendation> {
        match self {
            NextChord::Recommended(rec) => Some(rec),
            NextChord::NoneAvailable => None,
        }
    }
}

/// A recommendation persisted for later retrieval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecommendation {
    pub recommendation_id: Uuid,
    pub user_id: String,
    pub known_chords: Vec<Chord>,
    pub outcome: NextChord,
    pub created_at: DateTime<Utc>,
}

/// A not-yet-playable song and what it still needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongProgress {
    pub song_id: SongId,
    pub missing_chords: Vec<Chord>,
    pub difficulty: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_next_chord_recommended_wire_format() {
        let outcome = NextChord::Recommended(Recommendation {
            recommended_chord: Chord::from("Am"),
            unlocked_songs: vec![SongId::from("s2")],
            score: 1,
            avg_difficulty_of_unlocked: 1.0,
        });

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "recommended",
                "recommendedChord": "Am",
                "unlockedSongs": ["s2"],
                "score": 1,
                "avgDifficultyOfUnlocked": 1.0
            })
        );
    }

    #[test]
    fn test_next_chord_none_available_wire_format() {
        let value = serde_json::to_value(NextChord::NoneAvailable).unwrap();
        assert_eq!(value, json!({ "status": "none-available" }));
    }

    #[test]
    fn test_stored_recommendation_serde() {
        let stored = StoredRecommendation {
            recommendation_id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            known_chords: vec![Chord::from("C")],
            outcome: NextChord::NoneAvailable,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&stored).unwrap();
        let decoded: StoredRecommendation = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, stored);
    }
}
