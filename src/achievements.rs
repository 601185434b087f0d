//! Achievement tracker
//!
//! Three one-way achievements backed by progress counters. The whole state
//! is saved as one JSON blob after every change, and re-read defensively:
//! any missing or mistyped field falls back to its default instead of
//! discarding the rest.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persistence::{KeyValueStore, StorageError};

/// Storage key for the JSON blob
pub const STORAGE_KEY: &str = "achievements-state-v1";

/// Games needed for `play5`
pub const PLAY_STREAK_GOAL: u64 = 5;
/// Cumulative score needed for `score100`
pub const SCORE_GOAL: i64 = 100;

/// Achievement identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementId {
    FirstGame,
    Score100,
    Play5,
}

impl AchievementId {
    pub const ALL: [AchievementId; 3] = [
        AchievementId::FirstGame,
        AchievementId::Score100,
        AchievementId::Play5,
    ];

    /// Key used in the stored JSON
    pub fn key(&self) -> &'static str {
        match self {
            AchievementId::FirstGame => "firstGame",
            AchievementId::Score100 => "score100",
            AchievementId::Play5 => "play5",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            AchievementId::FirstGame => "First Game",
            AchievementId::Score100 => "Score 100",
            AchievementId::Play5 => "Play 5 Games",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementId::FirstGame => "Finish your first game",
            AchievementId::Score100 => "Reach a total score of 100",
            AchievementId::Play5 => "Play 5 games",
        }
    }
}

/// Unlock flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unlocked {
    pub first_game: bool,
    pub score100: bool,
    pub play5: bool,
}

impl Unlocked {
    pub fn get(&self, id: AchievementId) -> bool {
        match id {
            AchievementId::FirstGame => self.first_game,
            AchievementId::Score100 => self.score100,
            AchievementId::Play5 => self.play5,
        }
    }

    fn set(&mut self, id: AchievementId) {
        match id {
            AchievementId::FirstGame => self.first_game = true,
            AchievementId::Score100 => self.score100 = true,
            AchievementId::Play5 => self.play5 = true,
        }
    }

    pub fn count(&self) -> usize {
        AchievementId::ALL.iter().filter(|id| self.get(**id)).count()
    }
}

/// Progress counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub games_played: u64,
    pub total_score: i64,
}

/// Everything that gets persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AchievementState {
    pub unlocked: Unlocked,
    pub progress: Progress,
}

impl AchievementState {
    /// Decode a stored blob, resetting only the fields that are unusable
    pub fn from_json(raw: &str) -> Self {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Resetting unreadable achievement state: {}", e);
                return Self::default();
            }
        };

        let flag = |key: &str| {
            value
                .get("unlocked")
                .and_then(|u| u.get(key))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };
        let counter = |key: &str| value.get("progress").and_then(|p| p.get(key));

        Self {
            unlocked: Unlocked {
                first_game: flag(AchievementId::FirstGame.key()),
                score100: flag(AchievementId::Score100.key()),
                play5: flag(AchievementId::Play5.key()),
            },
            progress: Progress {
                games_played: counter("gamesPlayed")
                    .and_then(as_count)
                    .unwrap_or_default(),
                total_score: counter("totalScore")
                    .and_then(as_score)
                    .unwrap_or_default(),
            },
        }
    }
}

fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
    })
}

fn as_score(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// One row of the achievement list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementItem {
    pub id: AchievementId,
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

impl AchievementItem {
    /// `"{title} - {Unlocked|Locked} ({description})"`
    pub fn line(&self) -> String {
        let status = if self.unlocked { "Unlocked" } else { "Locked" };
        format!("{} - {} ({})", self.title, status, self.description)
    }
}

/// Something that displays the achievement list
pub trait AchievementView {
    fn render(&mut self, items: &[AchievementItem]);
}

/// Result of a mutating call
///
/// The in-memory state is always updated; `saved` tells whether it also
/// reached storage.
#[derive(Debug)]
#[must_use]
pub struct AchievementReport {
    /// Achievements unlocked by this call
    pub unlocked: Vec<AchievementId>,
    pub saved: Result<(), StorageError>,
}

impl AchievementReport {
    fn unchanged() -> Self {
        Self {
            unlocked: Vec::new(),
            saved: Ok(()),
        }
    }
}

/// Owned achievement tracker, one per page/session
pub struct AchievementTracker<S: KeyValueStore> {
    state: AchievementState,
    store: S,
    view: Option<Box<dyn AchievementView>>,
}

impl<S: KeyValueStore> AchievementTracker<S> {
    /// Tracker with default state; call [`AchievementTracker::init`] to load
    pub fn new(store: S) -> Self {
        Self {
            state: AchievementState::default(),
            store,
            view: None,
        }
    }

    /// Attach a list view; it is rendered after every change
    pub fn with_view(mut self, view: Box<dyn AchievementView>) -> Self {
        self.view = Some(view);
        self
    }

    pub fn set_view(&mut self, view: Box<dyn AchievementView>) {
        self.view = Some(view);
        self.render();
    }

    /// Load stored state, normalize it, write it back and render
    ///
    /// A failed read leaves the defaults in place and is reported, after
    /// the defaults have been written back.
    pub fn init(&mut self) -> Result<(), StorageError> {
        let mut read_error = None;
        self.state = match self.store.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => AchievementState::from_json(&raw),
            Ok(None) => AchievementState::default(),
            Err(e) => {
                log::warn!("Could not read achievements: {}", e);
                read_error = Some(e);
                AchievementState::default()
            }
        };

        let saved = self.save();
        self.render();
        log::info!(
            "Achievements loaded ({} of {} unlocked)",
            self.state.unlocked.count(),
            AchievementId::ALL.len()
        );

        match read_error {
            Some(e) => Err(e),
            None => saved,
        }
    }

    pub fn state(&self) -> &AchievementState {
        &self.state
    }

    /// Current unlock flags
    pub fn list(&self) -> Unlocked {
        self.state.unlocked
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.state.unlocked.get(id)
    }

    pub fn progress(&self) -> Progress {
        self.state.progress
    }

    /// Display rows in a fixed order
    pub fn items(&self) -> Vec<AchievementItem> {
        AchievementId::ALL
            .into_iter()
            .map(|id| AchievementItem {
                id,
                title: id.title(),
                description: id.description(),
                unlocked: self.is_unlocked(id),
            })
            .collect()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Unlock one achievement. Already-unlocked ids change nothing.
    pub fn unlock(&mut self, id: AchievementId) -> AchievementReport {
        if self.is_unlocked(id) {
            return AchievementReport::unchanged();
        }
        self.state.unlocked.set(id);
        log::info!("Achievement unlocked: {}", id.key());
        self.commit(vec![id])
    }

    /// Count a finished game
    pub fn increment_games(&mut self) -> AchievementReport {
        self.state.progress.games_played = self.state.progress.games_played.saturating_add(1);

        let played = self.state.progress.games_played;
        let mut unlocked = Vec::new();
        if played >= 1 {
            self.try_unlock(AchievementId::FirstGame, &mut unlocked);
        }
        if played >= PLAY_STREAK_GOAL {
            self.try_unlock(AchievementId::Play5, &mut unlocked);
        }
        self.commit(unlocked)
    }

    /// Replace the cumulative score
    pub fn set_score_total(&mut self, total: i64) -> AchievementReport {
        self.state.progress.total_score = total;

        let mut unlocked = Vec::new();
        if total >= SCORE_GOAL {
            self.try_unlock(AchievementId::Score100, &mut unlocked);
        }
        self.commit(unlocked)
    }

    /// Add to the cumulative score
    pub fn add_score_delta(&mut self, delta: i64) -> AchievementReport {
        let total = self.state.progress.total_score.saturating_add(delta);
        self.set_score_total(total)
    }

    fn try_unlock(&mut self, id: AchievementId, unlocked: &mut Vec<AchievementId>) {
        if !self.is_unlocked(id) {
            self.state.unlocked.set(id);
            log::info!("Achievement unlocked: {}", id.key());
            unlocked.push(id);
        }
    }

    fn commit(&mut self, unlocked: Vec<AchievementId>) -> AchievementReport {
        let saved = self.save();
        if let Err(e) = &saved {
            log::warn!("Achievements kept in memory only: {}", e);
        }
        self.render();
        AchievementReport { unlocked, saved }
    }

    fn save(&mut self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.state)?;
        self.store.set_item(STORAGE_KEY, &json)
    }

    fn render(&mut self) {
        if self.view.is_none() {
            return;
        }
        let items = self.items();
        if let Some(view) = self.view.as_mut() {
            view.render(&items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tracker() -> AchievementTracker<MemoryStore> {
        let mut tracker = AchievementTracker::new(MemoryStore::new());
        tracker.init().unwrap();
        tracker
    }

    struct RecordingView(Rc<RefCell<Vec<Vec<String>>>>);

    impl AchievementView for RecordingView {
        fn render(&mut self, items: &[AchievementItem]) {
            self.0
                .borrow_mut()
                .push(items.iter().map(AchievementItem::line).collect());
        }
    }

    #[test]
    fn test_play_count_unlocks() {
        let mut tracker = tracker();

        let first = tracker.increment_games();
        assert_eq!(first.unlocked, vec![AchievementId::FirstGame]);
        assert!(tracker.is_unlocked(AchievementId::FirstGame));

        for _ in 2..5 {
            let report = tracker.increment_games();
            assert!(report.unlocked.is_empty());
            assert!(!tracker.is_unlocked(AchievementId::Play5));
        }

        let fifth = tracker.increment_games();
        assert_eq!(fifth.unlocked, vec![AchievementId::Play5]);
        assert_eq!(tracker.progress().games_played, 5);
    }

    #[test]
    fn test_score_threshold() {
        let mut tracker = tracker();
        assert!(tracker.set_score_total(99).unlocked.is_empty());
        assert!(!tracker.is_unlocked(AchievementId::Score100));

        assert_eq!(
            tracker.set_score_total(100).unlocked,
            vec![AchievementId::Score100]
        );
        assert!(tracker.list().score100);
    }

    #[test]
    fn test_score_delta_accumulates() {
        let mut tracker = tracker();
        let _ = tracker.add_score_delta(60);
        assert!(!tracker.is_unlocked(AchievementId::Score100));
        let report = tracker.add_score_delta(45);
        assert_eq!(report.unlocked, vec![AchievementId::Score100]);
        assert_eq!(tracker.progress().total_score, 105);
    }

    #[test]
    fn test_unlocks_are_one_way() {
        let mut tracker = tracker();
        let _ = tracker.set_score_total(150);
        let _ = tracker.set_score_total(0);
        assert!(tracker.is_unlocked(AchievementId::Score100));

        let again = tracker.unlock(AchievementId::Score100);
        assert!(again.unlocked.is_empty());
    }

    #[test]
    fn test_roundtrip_through_storage() {
        let mut tracker = tracker();
        let _ = tracker.increment_games();
        let _ = tracker.increment_games();
        let _ = tracker.set_score_total(130);
        let before = *tracker.state();

        let mut reloaded = AchievementTracker::new(tracker.into_store());
        reloaded.init().unwrap();
        assert_eq!(*reloaded.state(), before);
    }

    #[test]
    fn test_stored_shape() {
        let mut tracker = tracker();
        let _ = tracker.increment_games();
        let raw = tracker.store().get_item(STORAGE_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["unlocked"]["firstGame"], Value::Bool(true));
        assert_eq!(value["progress"]["gamesPlayed"], 1);
        assert_eq!(value["progress"]["totalScore"], 0);
    }

    #[test]
    fn test_defensive_migration() {
        let state = AchievementState::from_json(
            r#"{"unlocked":{"firstGame":"yes","play5":true},"progress":{"gamesPlayed":7.0,"totalScore":"lots"}}"#,
        );
        assert!(!state.unlocked.first_game);
        assert!(state.unlocked.play5);
        assert!(!state.unlocked.score100);
        assert_eq!(state.progress.games_played, 7);
        assert_eq!(state.progress.total_score, 0);

        assert_eq!(AchievementState::from_json("{oops"), AchievementState::default());
        assert_eq!(AchievementState::from_json("[]"), AchievementState::default());
    }

    #[test]
    fn test_init_normalizes_stored_blob() {
        let mut store = MemoryStore::new();
        store
            .set_item(STORAGE_KEY, r#"{"progress":{"gamesPlayed":3}}"#)
            .unwrap();

        let mut tracker = AchievementTracker::new(store);
        tracker.init().unwrap();
        assert_eq!(tracker.progress().games_played, 3);

        let raw = tracker.store().get_item(STORAGE_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["unlocked"]["score100"], Value::Bool(false));
    }

    #[test]
    fn test_stored_play_count_saturates() {
        let mut store = MemoryStore::new();
        store
            .set_item(STORAGE_KEY, r#"{"progress":{"gamesPlayed":18446744073709551615}}"#)
            .unwrap();

        let mut tracker = AchievementTracker::new(store);
        tracker.init().unwrap();
        let report = tracker.increment_games();

        assert_eq!(tracker.progress().games_played, u64::MAX);
        assert!(report.saved.is_ok());
        assert!(tracker.is_unlocked(AchievementId::FirstGame));
        assert!(tracker.is_unlocked(AchievementId::Play5));
    }

    #[test]
    fn test_failed_save_keeps_memory_state() {
        let mut tracker = AchievementTracker::new(MemoryStore::with_quota(8));
        assert!(tracker.init().is_err());

        let report = tracker.increment_games();
        assert_eq!(report.unlocked, vec![AchievementId::FirstGame]);
        assert!(matches!(report.saved, Err(StorageError::QuotaExceeded { .. })));
        assert!(tracker.is_unlocked(AchievementId::FirstGame));
    }

    #[test]
    fn test_view_rerenders_after_each_change() {
        let renders = Rc::new(RefCell::new(Vec::new()));
        let mut tracker = AchievementTracker::new(MemoryStore::new())
            .with_view(Box::new(RecordingView(renders.clone())));
        tracker.init().unwrap();
        let _ = tracker.increment_games();

        let renders = renders.borrow();
        assert_eq!(renders.len(), 2);
        assert_eq!(renders[0][0], "First Game - Locked (Finish your first game)");
        assert_eq!(renders[1][0], "First Game - Unlocked (Finish your first game)");
        assert_eq!(renders[1].len(), 3);
    }
}
