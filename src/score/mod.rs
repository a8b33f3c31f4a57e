//! Local best-score persistence
//!
//! One record per player, updated only when a new winning score beats the
//! stored one. The whole collection is read, modified and written back
//! through this single interface so the storage format lives in one place.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Best score achieved by one player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player_id: String,
    /// Complexity at which the best score was achieved
    pub complexity: u32,
    pub score: u64,
    pub recorded_at: DateTime<Utc>,
}

/// File-backed scoreboard, listed in insertion order
pub struct Scoreboard {
    path: PathBuf,
}

impl Scoreboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read all records; a missing file is an empty scoreboard
    pub fn load(&self) -> Result<Vec<ScoreRecord>, ScoreboardError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ScoreboardError::Io(e)),
        };
        serde_json::from_str(&raw).map_err(ScoreboardError::Parse)
    }

    /// Record a winning score. Inserts a new record for an unknown player,
    /// updates an existing one only if `score` is strictly greater. Returns
    /// whether the stored set changed.
    pub fn record_win(
        &self,
        player_id: &str,
        complexity: u32,
        score: u64,
    ) -> Result<bool, ScoreboardError> {
        let mut records = self.load()?;

        match records.iter_mut().find(|r| r.player_id == player_id) {
            Some(existing) => {
                if score <= existing.score {
                    return Ok(false);
                }
                existing.score = score;
                existing.complexity = complexity;
                existing.recorded_at = Utc::now();
            }
            None => records.push(ScoreRecord {
                player_id: player_id.to_string(),
                complexity,
                score,
                recorded_at: Utc::now(),
            }),
        }

        self.write(&records)?;
        info!(player_id, complexity, score, "Recorded new best score");
        Ok(true)
    }

    /// Write through a temporary sibling then rename, so readers never see a
    /// half-written scoreboard.
    fn write(&self, records: &[ScoreRecord]) -> Result<(), ScoreboardError> {
        let json = serde_json::to_string_pretty(records).map_err(ScoreboardError::Parse)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(ScoreboardError::Io)?;
        fs::rename(&tmp, &self.path).map_err(ScoreboardError::Io)?;
        Ok(())
    }
}

/// Scoreboard errors
#[derive(Debug, thiserror::Error)]
pub enum ScoreboardError {
    #[error("Scoreboard file access failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scoreboard file is not valid JSON: {0}")]
    Parse(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_board() -> Scoreboard {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "cave_scoreboard_test_{}_{}.json",
            std::process::id(),
            n
        ));
        let _ = fs::remove_file(&path);
        Scoreboard::new(path)
    }

    #[test]
    fn missing_file_is_an_empty_scoreboard() {
        let board = temp_board();
        assert!(board.load().unwrap().is_empty());
    }

    #[test]
    fn keeps_the_best_score_per_player() {
        let board = temp_board();

        assert!(board.record_win("ada", 3, 120).unwrap());
        let records = board.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 120);

        // A lower score leaves the stored value untouched.
        assert!(!board.record_win("ada", 5, 80).unwrap());
        let records = board.load().unwrap();
        assert_eq!(records[0].score, 120);
        assert_eq!(records[0].complexity, 3);

        // A higher score replaces it.
        assert!(board.record_win("ada", 7, 200).unwrap());
        let records = board.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 200);
        assert_eq!(records[0].complexity, 7);
    }

    #[test]
    fn equal_score_does_not_rewrite() {
        let board = temp_board();
        board.record_win("ada", 1, 100).unwrap();
        assert!(!board.record_win("ada", 1, 100).unwrap());
    }

    #[test]
    fn listing_order_is_insertion_stable() {
        let board = temp_board();
        board.record_win("ada", 1, 10).unwrap();
        board.record_win("brian", 2, 300).unwrap();
        board.record_win("grace", 3, 200).unwrap();
        board.record_win("ada", 4, 40).unwrap();

        let names: Vec<_> = board
            .load()
            .unwrap()
            .into_iter()
            .map(|r| r.player_id)
            .collect();
        assert_eq!(names, ["ada", "brian", "grace"]);
    }
}
