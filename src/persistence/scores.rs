//! Per-game high score slot
//!
//! Each game keeps its best score as a plain decimal integer under a key
//! of its own choosing.

use super::{KeyValueStore, StorageError, read_int, write_int};

/// Result of submitting a finished game's score
#[derive(Debug)]
#[must_use]
pub struct Submission {
    /// The score beat the previous best
    pub new_record: bool,
    /// Outcome of writing the new record (Ok when nothing needed writing)
    pub saved: Result<(), StorageError>,
}

/// Best score for one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScore {
    key: String,
    best: i64,
}

impl HighScore {
    /// Empty slot; call [`HighScore::load`] to read the stored value
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            best: 0,
        }
    }

    /// Slot whose best is already known, e.g. from the running game state
    pub fn with_best(key: impl Into<String>, best: i64) -> Self {
        Self {
            key: key.into(),
            best,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn best(&self) -> i64 {
        self.best
    }

    /// Read the stored best. On failure the slot resets to 0.
    pub fn load<S: KeyValueStore + ?Sized>(&mut self, store: &S) -> Result<i64, StorageError> {
        match read_int(store, &self.key, 0) {
            Ok(best) => {
                self.best = best;
                Ok(best)
            }
            Err(e) => {
                self.best = 0;
                Err(e)
            }
        }
    }

    /// Record `score` if it beats the current best
    ///
    /// The in-memory best is updated even when the write fails.
    pub fn submit<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, score: i64) -> Submission {
        if score <= self.best {
            return Submission {
                new_record: false,
                saved: Ok(()),
            };
        }

        self.best = score;
        Submission {
            new_record: true,
            saved: write_int(store, &self.key, score),
        }
    }

    /// Delete the stored record and reset the slot
    pub fn clear<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<(), StorageError> {
        self.best = 0;
        store.remove_item(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_submit_only_records_improvements() {
        let mut store = MemoryStore::new();
        let mut slot = HighScore::new("snake-high");
        assert_eq!(slot.load(&store).unwrap(), 0);

        let first = slot.submit(&mut store, 50);
        assert!(first.new_record);
        assert!(first.saved.is_ok());

        let tie = slot.submit(&mut store, 50);
        assert!(!tie.new_record);

        let lower = slot.submit(&mut store, 10);
        assert!(!lower.new_record);
        assert_eq!(store.get_item("snake-high").unwrap().as_deref(), Some("50"));
    }

    #[test]
    fn test_load_reads_previous_session() {
        let mut store = MemoryStore::new();
        store.set_item("tetris-high", "1200").unwrap();

        let mut slot = HighScore::new("tetris-high");
        slot.load(&store).unwrap();
        assert_eq!(slot.best(), 1200);
        assert!(!slot.submit(&mut store, 900).new_record);
    }

    #[test]
    fn test_failed_write_keeps_record_in_memory() {
        let mut store = MemoryStore::with_quota(4);
        let mut slot = HighScore::new("a-very-long-key");
        let submission = slot.submit(&mut store, 77);

        assert!(submission.new_record);
        assert!(matches!(
            submission.saved,
            Err(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(slot.best(), 77);
    }

    #[test]
    fn test_clear_resets() {
        let mut store = MemoryStore::new();
        let mut slot = HighScore::new("pong-high");
        let _ = slot.submit(&mut store, 30);
        slot.clear(&mut store).unwrap();

        assert_eq!(slot.best(), 0);
        assert!(store.get_item("pong-high").unwrap().is_none());
    }
}
