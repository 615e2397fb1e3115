//! Leaderboard record.

use serde::{Deserialize, Serialize};

/// One submitted score.
///
/// Serialised with the store's column names; unknown columns (ids, timestamps)
/// are ignored when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(rename = "player_name")]
    pub name: String,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: u32, level: u32, lines: u32) -> Self {
        Self {
            name: name.into(),
            score,
            level,
            lines,
        }
    }
}

/// Sort by score, highest first. Equal scores keep their incoming order.
pub fn sort_by_score(entries: &mut [ScoreEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Sorted copy of the best `limit` entries
pub fn top_n(mut entries: Vec<ScoreEntry>, limit: usize) -> Vec<ScoreEntry> {
    sort_by_score(&mut entries);
    entries.truncate(limit);
    entries
}
