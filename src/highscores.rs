//! High score table
//!
//! Tracks the top 3 scores, sorted descending. Persisted through a
//! [`Storage`] backend as a JSON array of integers.

use serde::{Deserialize, Serialize};

use crate::consts::HIGH_SCORES_KEY;
use crate::persistence::{Storage, StorageError};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 3;

/// Top-3 high score table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    scores: Vec<u32>,
}

impl Default for HighScores {
    fn default() -> Self {
        Self {
            scores: vec![0; MAX_HIGH_SCORES],
        }
    }
}

impl HighScores {
    /// Create a zeroed table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from arbitrary values (sorted and trimmed)
    pub fn from_scores(scores: impl IntoIterator<Item = u32>) -> Self {
        let mut table = Self {
            scores: scores.into_iter().collect(),
        };
        table.normalize();
        table
    }

    /// Scores, highest first
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Get the top score
    pub fn top_score(&self) -> u32 {
        self.scores.first().copied().unwrap_or(0)
    }

    /// Get the rank a score would achieve (1-indexed, None if it would be trimmed)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        let pos = self
            .scores
            .iter()
            .position(|&s| score > s)
            .unwrap_or(self.scores.len());
        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    /// Insert a score, keep the table sorted and trimmed.
    /// Returns the rank achieved (1-indexed) or None if it fell off the table.
    pub fn add_score(&mut self, score: u32) -> Option<usize> {
        let rank = self.potential_rank(score);
        self.scores.push(score);
        self.normalize();
        rank
    }

    fn normalize(&mut self) {
        self.scores.sort_unstable_by(|a, b| b.cmp(a));
        self.scores.truncate(MAX_HIGH_SCORES);
        self.scores.resize(MAX_HIGH_SCORES, 0);
    }

    /// Load high scores from storage.
    /// Absent or corrupt data yields a zeroed table.
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get(HIGH_SCORES_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<u32>>(&json) {
                Ok(scores) => {
                    let table = Self::from_scores(scores);
                    log::info!("Loaded high scores {:?}", table.scores);
                    table
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt high scores ({e}), starting fresh");
                    Self::new()
                }
            },
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Could not read high scores ({e}), starting fresh");
                Self::new()
            }
        }
    }

    /// Save high scores to storage
    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        // Vec<u32> serialization cannot fail
        let json = serde_json::to_string(&self.scores).unwrap_or_else(|_| "[]".to_string());
        storage.set(HIGH_SCORES_KEY, &json)?;
        log::info!("High scores saved {:?}", self.scores);
        Ok(())
    }
}
