//! High score leaderboard system
//!
//! Persisted through a `ScoreStore`, tracks the top 10 scores.

use serde::{Deserialize, Serialize};

use crate::persistence::{ScoreStore, read_json, write_json};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest name kept in the table
pub const MAX_NAME_LEN: usize = 12;

/// Name used when the player submits a blank one
pub const DEFAULT_NAME: &str = "PLAYER";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's name
    pub name: String,
    /// Player's score
    pub score: u64,
    /// Level reached
    #[serde(default)]
    pub level: u32,
}

/// High score leaderboard (sorted descending by score)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "neon_invaders_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Seed table shown before anyone has played
    pub fn default_table() -> Self {
        let seed = [
            ("NEO", 10_000, 8),
            ("ZAP", 7_500, 6),
            ("ION", 5_000, 4),
            ("VEC", 2_500, 2),
            ("PIX", 1_000, 1),
        ];
        Self {
            entries: seed
                .iter()
                .map(|&(name, score, level)| HighScoreEntry {
                    name: name.to_string(),
                    score,
                    level,
                })
                .collect(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, name: &str, score: u64, level: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            name: sanitize_name(name),
            score,
            level,
        };

        // Equal scores keep their earlier position
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Get the lowest listed score (if any)
    pub fn lowest_score(&self) -> Option<u64> {
        self.entries.last().map(|e| e.score)
    }

    /// Load from the store, falling back to the seed table
    pub fn load<S: ScoreStore + ?Sized>(store: &S) -> Self {
        match read_json::<HighScores, S>(store, Self::STORAGE_KEY) {
            Ok(Some(mut scores)) => {
                scores.normalize();
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, using default table");
                Self::default_table()
            }
            Err(e) => {
                log::warn!("High scores unavailable ({e}), using default table");
                Self::default_table()
            }
        }
    }

    /// Save to the store; failures are logged and otherwise ignored
    pub fn save<S: ScoreStore + ?Sized>(&self, store: &mut S) {
        match write_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Could not save high scores: {e}"),
        }
    }

    /// Re-establish ordering and size after loading untrusted data
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }
}

/// Trim, clamp length, and substitute a default for blank names
pub fn sanitize_name(name: &str) -> String {
    let trimmed: String = name.trim().chars().take(MAX_NAME_LEN).collect();
    if trimmed.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{DisabledStore, MemoryStore};
    use proptest::prelude::*;

    fn is_sorted_desc(scores: &HighScores) -> bool {
        scores.entries.windows(2).all(|w| w[0].score >= w[1].score)
    }

    #[test]
    fn test_insert_when_table_not_full() {
        let mut scores = HighScores::default_table();
        assert!(scores.len() < MAX_HIGH_SCORES);
        let rank = scores.add_score("ACE", 12345, 7);
        assert_eq!(rank, Some(1));
        assert_eq!(scores.top_score(), Some(12345));
        assert!(is_sorted_desc(&scores));
        assert!(scores.len() <= MAX_HIGH_SCORES);
    }

    #[test]
    fn test_full_table_rejects_low_score() {
        let mut scores = HighScores::new();
        for i in 1..=10 {
            scores.add_score("AAA", i * 100, 1);
        }
        assert_eq!(scores.len(), 10);
        assert_eq!(scores.lowest_score(), Some(100));
        assert!(!scores.qualifies(100));
        assert_eq!(scores.add_score("BBB", 50, 1), None);
        assert_eq!(scores.add_score("CCC", 150, 1), Some(10));
        assert_eq!(scores.len(), 10);
        assert_eq!(scores.lowest_score(), Some(150));
    }

    #[test]
    fn test_zero_qualifies_only_for_short_table() {
        assert!(HighScores::new().qualifies(0));
        assert_eq!(HighScores::default_table().potential_rank(0), Some(6));

        let mut full = HighScores::new();
        for i in 1..=10 {
            full.add_score("AAA", i * 100, 1);
        }
        assert!(!full.qualifies(0));
    }

    #[test]
    fn test_potential_rank() {
        let scores = HighScores::default_table();
        assert_eq!(scores.potential_rank(20_000), Some(1));
        assert_eq!(scores.potential_rank(6_000), Some(3));
        assert_eq!(scores.potential_rank(10), Some(6));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("  bob  "), "bob");
        assert_eq!(sanitize_name(""), DEFAULT_NAME);
        assert_eq!(sanitize_name("ABCDEFGHIJKLMNOP").chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_load_falls_back_when_storage_disabled() {
        let scores = HighScores::load(&DisabledStore);
        assert_eq!(scores, HighScores::default_table());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        scores.add_score("ZED", 900, 3);
        scores.save(&mut store);
        let loaded = HighScores::load(&store);
        assert_eq!(loaded, scores);
    }

    #[test]
    fn test_load_sorts_unsorted_data() {
        let mut store = MemoryStore::new();
        store
            .write(
                HighScores::STORAGE_KEY,
                r#"{"entries":[{"name":"A","score":1},{"name":"B","score":50}]}"#,
            )
            .unwrap();
        let loaded = HighScores::load(&store);
        assert_eq!(loaded.top_score(), Some(50));
    }

    #[test]
    fn test_save_to_disabled_store_is_silent() {
        HighScores::default_table().save(&mut DisabledStore);
    }

    proptest! {
        #[test]
        fn prop_table_stays_sorted_and_bounded(scores in proptest::collection::vec(0u64..100_000, 0..40)) {
            let mut table = HighScores::new();
            for s in scores {
                table.add_score("P", s, 1);
                prop_assert!(table.len() <= MAX_HIGH_SCORES);
                prop_assert!(is_sorted_desc(&table));
            }
        }
    }
}
