//! Per-game engine facade
//!
//! One [`GameEngine`] per page. It owns the score state, the particle
//! pool, the loop scheduler, the sound player and the key-value store the
//! game persists its high score in.

use glam::Vec2;

use crate::audio::{AudioSystem, Playback, SoundEffect};
use crate::persistence::scores::{HighScore, Submission};
use crate::persistence::{KeyValueStore, StorageError, read_int, write_int};
use crate::renderer::Canvas;
use crate::settings::EngineSettings;
use crate::sim::{ColorChoice, EmitOptions, GameLoop, GameState, ParticleSystem};
use crate::ui::{GameOverScreen, VictoryScreen};

/// Colors of the victory burst
pub const VICTORY_PALETTE: [&str; 4] = ["#FFD700", "#FF6B6B", "#4CAF50", "#6c63ff"];

/// Particles in the victory burst
pub const VICTORY_PARTICLES: usize = 50;

/// Shared engine for one mini-game
pub struct GameEngine<S: KeyValueStore> {
    state: GameState,
    particles: ParticleSystem,
    game_loop: GameLoop,
    audio: AudioSystem,
    settings: EngineSettings,
    store: S,
    /// Paused by [`GameEngine::auto_pause`] rather than by the player
    auto_paused: bool,
}

impl<S: KeyValueStore> GameEngine<S> {
    /// Create an engine using the settings saved in `store`
    pub fn new(store: S, seed: u64) -> Self {
        let settings = EngineSettings::load(&store);
        Self::with_settings(settings, store, seed)
    }

    pub fn with_settings(settings: EngineSettings, store: S, seed: u64) -> Self {
        let mut engine = Self {
            state: GameState::new(),
            particles: ParticleSystem::new(settings.max_particles(), seed),
            game_loop: GameLoop::new(),
            audio: AudioSystem::new(),
            settings: EngineSettings::default(),
            store,
            auto_paused: false,
        };
        engine.apply_settings(settings);
        engine
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn game_loop(&self) -> &GameLoop {
        &self.game_loop
    }

    /// Game loop handle, for the driver to record its pending frame
    pub fn game_loop_mut(&mut self) -> &mut GameLoop {
        &mut self.game_loop
    }

    pub fn audio(&self) -> &AudioSystem {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioSystem {
        &mut self.audio
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Canvas size from the settings
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.settings.width as f32, self.settings.height as f32)
    }

    /// Apply new settings to the particle pool and the sound player
    pub fn apply_settings(&mut self, settings: EngineSettings) {
        self.particles.set_capacity(settings.max_particles());
        self.audio.set_muted(settings.muted);
        self.audio.set_volume(settings.volume);
        self.settings = settings;
    }

    /// Persist the current settings (mute/volume included)
    pub fn save_settings(&mut self) -> Result<(), StorageError> {
        self.settings.muted = self.audio.is_muted();
        self.settings.volume = self.audio.volume();
        self.settings.save(&mut self.store)
    }

    // ── Loop control ──────────────────────────────────────────────

    /// Start a run. Returns false if one is already in progress.
    pub fn start(&mut self) -> bool {
        if !self.game_loop.start() {
            return false;
        }
        self.state.running = true;
        self.state.game_over = false;
        self.state.paused = false;
        log::info!("Game loop started");
        true
    }

    pub fn pause(&mut self) -> bool {
        self.auto_paused = false;
        let changed = self.game_loop.pause();
        self.state.paused = self.game_loop.is_paused();
        changed
    }

    pub fn resume(&mut self) -> bool {
        self.auto_paused = false;
        let changed = self.game_loop.resume();
        self.state.paused = self.game_loop.is_paused();
        changed
    }

    /// Flip pause, returning the new paused flag
    pub fn toggle_pause(&mut self) -> bool {
        self.auto_paused = false;
        self.state.paused = self.game_loop.toggle_pause();
        self.state.paused
    }

    /// Pause because the page went out of view
    ///
    /// Returns false if the run was not running (already paused or stopped).
    pub fn auto_pause(&mut self) -> bool {
        if !self.pause() {
            return false;
        }
        self.auto_paused = true;
        true
    }

    /// Undo [`GameEngine::auto_pause`]
    ///
    /// A pause the player chose is left alone. The time spent away does
    /// not count towards the next frame's delta.
    pub fn auto_resume(&mut self) -> bool {
        if !self.auto_paused {
            return false;
        }
        self.game_loop.reset_clock();
        self.resume()
    }

    /// Stop the run, returning the pending frame handle to cancel
    pub fn stop(&mut self) -> Option<i32> {
        self.auto_paused = false;
        self.state.running = false;
        self.state.paused = false;
        log::info!("Game loop stopped");
        self.game_loop.stop()
    }

    /// Score 0, level 1, flags cleared, particles dropped
    pub fn reset(&mut self) {
        self.auto_paused = false;
        self.state.reset();
        self.particles.clear();
        if self.game_loop.is_paused() {
            self.game_loop.resume();
        }
    }

    /// Run one frame at `timestamp` (ms)
    ///
    /// `update` receives the elapsed milliseconds and is skipped while
    /// paused; `draw` always runs; particles then advance one tick.
    /// Returns false (and does nothing) while stopped.
    pub fn frame<U, D>(&mut self, timestamp: f64, mut update: U, mut draw: D) -> bool
    where
        U: FnMut(&mut GameState, f64),
        D: FnMut(&GameState, &ParticleSystem),
    {
        let Some(tick) = self.game_loop.begin_frame(timestamp) else {
            return false;
        };

        if tick.run_update {
            update(&mut self.state, tick.delta);
        }
        draw(&self.state, &self.particles);
        self.particles.update();
        true
    }

    // ── Particles ─────────────────────────────────────────────────

    /// Burst at `origin`; returns the number of particles added
    pub fn emit_particles(&mut self, origin: Vec2, options: &EmitOptions) -> usize {
        self.particles.emit(origin, options)
    }

    pub fn draw_particles<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        self.particles.draw(canvas);
    }

    pub fn clear_particles(&mut self) {
        self.particles.clear();
    }

    // ── Sound ─────────────────────────────────────────────────────

    /// Play an effect; failures are logged and reported as silence
    pub fn play(&self, effect: SoundEffect) -> Playback {
        match self.audio.play(effect) {
            Ok(playback) => playback,
            Err(e) => {
                log::warn!("Could not play {}: {}", effect.name(), e);
                Playback::Silent
            }
        }
    }

    // ── Storage ───────────────────────────────────────────────────

    /// Integer under `key`; `default` when the key is missing
    pub fn get_storage(&self, key: &str, default: i64) -> Result<i64, StorageError> {
        read_int(&self.store, key, default)
    }

    pub fn set_storage(&mut self, key: &str, value: i64) -> Result<(), StorageError> {
        write_int(&mut self.store, key, value)
    }

    pub fn clear_storage(&mut self, key: &str) -> Result<(), StorageError> {
        self.store.remove_item(key)
    }

    /// Load the stored high score into the state (0 when unreadable)
    pub fn load_high_score(&mut self, key: &str) -> i64 {
        let mut slot = HighScore::new(key);
        if let Err(e) = slot.load(&self.store) {
            log::warn!("Could not read {}: {}", key, e);
        }
        self.state.high_score = slot.best();
        self.state.high_score
    }

    /// Record `score` (or the current score) if it beats the high score
    pub fn save_high_score(&mut self, key: &str, score: Option<i64>) -> Submission {
        let score = score.unwrap_or(self.state.score);
        let mut slot = HighScore::with_best(key, self.state.high_score);
        let submission = slot.submit(&mut self.store, score);
        self.state.high_score = slot.best();
        if let Err(e) = &submission.saved {
            log::warn!("Could not save {}: {}", key, e);
        }
        submission
    }

    // ── Screens ───────────────────────────────────────────────────

    /// Game over: marks the state, plays the sound and builds the overlay
    pub fn game_over_screen(&mut self, new_record: bool) -> GameOverScreen {
        self.state.game_over = true;
        self.play(SoundEffect::GameOver);
        GameOverScreen::from_state(&self.state, new_record)
    }

    /// Victory: plays the fanfare and bursts confetti at `center`
    pub fn victory_screen(&mut self, center: Vec2) -> VictoryScreen {
        self.play(SoundEffect::Victory);
        let palette: &[&str] = &VICTORY_PALETTE;
        self.particles.emit(
            center,
            &EmitOptions {
                count: VICTORY_PARTICLES,
                color: ColorChoice::from(palette),
                ..Default::default()
            },
        );
        VictoryScreen::from_state(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, store_or_memory};
    use crate::renderer::RecordingCanvas;
    use crate::settings::EffectsQuality;

    fn engine() -> GameEngine<MemoryStore> {
        GameEngine::new(MemoryStore::new(), 7)
    }

    #[test]
    fn test_start_stop_sync_state() {
        let mut engine = engine();
        assert!(engine.start());
        assert!(!engine.start());
        assert!(engine.state().running);

        engine.game_loop_mut().set_pending_frame(12);
        assert_eq!(engine.stop(), Some(12));
        assert!(!engine.state().running);
        assert!(!engine.frame(100.0, |_, _| panic!("stopped"), |_, _| panic!("stopped")));
    }

    #[test]
    fn test_frame_passes_delta() {
        let mut engine = engine();
        engine.start();

        let mut deltas = Vec::new();
        for t in [1000.0, 1016.0, 1050.0] {
            engine.frame(t, |_, dt| deltas.push(dt), |_, _| {});
        }
        assert_eq!(deltas, vec![0.0, 16.0, 34.0]);
    }

    #[test]
    fn test_pause_freezes_update_but_draws_and_fades() {
        let mut engine = engine();
        engine.start();
        engine.emit_particles(
            Vec2::new(100.0, 100.0),
            &EmitOptions {
                count: 5,
                life: 3,
                ..Default::default()
            },
        );
        assert!(engine.toggle_pause());
        assert!(engine.state().paused);

        let mut updates = 0;
        let mut draws = 0;
        for t in 0..3 {
            engine.frame(t as f64 * 16.0, |_, _| updates += 1, |_, _| draws += 1);
        }
        assert_eq!(updates, 0);
        assert_eq!(draws, 3);
        assert!(engine.particles().is_empty());

        assert!(!engine.toggle_pause());
        engine.frame(64.0, |_, _| updates += 1, |_, _| {});
        assert_eq!(updates, 1);
    }

    #[test]
    fn test_auto_pause_resumes_only_itself() {
        let mut engine = engine();
        engine.start();
        engine.frame(0.0, |_, _| {}, |_, _| {});

        assert!(engine.auto_pause());
        assert!(engine.state().paused);
        assert!(engine.auto_resume());
        assert!(!engine.state().paused);

        let mut deltas = Vec::new();
        engine.frame(45_000.0, |_, dt| deltas.push(dt), |_, _| {});
        assert_eq!(deltas, vec![0.0]);

        // Player pause survives the tab coming back
        assert!(engine.toggle_pause());
        assert!(!engine.auto_pause());
        assert!(!engine.auto_resume());
        assert!(engine.state().paused);

        // Player unpausing while hidden clears the auto flag
        assert!(!engine.toggle_pause());
        assert!(engine.auto_pause());
        engine.toggle_pause();
        engine.pause();
        assert!(!engine.auto_resume());
        assert!(engine.state().paused);
    }

    #[test]
    fn test_reset_clears_round() {
        let mut engine = engine();
        engine.start();
        engine.state_mut().score = 50;
        engine.state_mut().next_level();
        engine.state_mut().high_score = 80;
        engine.emit_particles(Vec2::ZERO, &EmitOptions::default());
        engine.pause();

        engine.reset();
        assert_eq!(engine.state().score, 0);
        assert_eq!(engine.state().level, 1);
        assert_eq!(engine.state().high_score, 80);
        assert!(!engine.state().paused);
        assert!(!engine.game_loop().is_paused());
        assert!(engine.particles().is_empty());
    }

    #[test]
    fn test_high_score_round_trip() {
        let mut engine = engine();
        assert_eq!(engine.load_high_score("snake"), 0);

        engine.state_mut().score = 30;
        let saved = engine.save_high_score("snake", None);
        assert!(saved.new_record);
        assert!(saved.saved.is_ok());
        assert!(!engine.save_high_score("snake", Some(30)).new_record);

        engine.state_mut().high_score = 0;
        assert_eq!(engine.load_high_score("snake"), 30);

        engine.clear_storage("snake").unwrap();
        assert_eq!(engine.get_storage("snake", 5).unwrap(), 5);
    }

    #[test]
    fn test_high_score_shares_slot_format() {
        let mut engine = engine();
        engine.state_mut().score = 42;
        let _ = engine.save_high_score("orbs", None);

        let mut slot = HighScore::new("orbs");
        assert_eq!(slot.load(engine.store()).unwrap(), 42);

        let _ = slot.submit(engine.store_mut(), 90);
        assert_eq!(engine.load_high_score("orbs"), 90);
        assert!(!engine.save_high_score("orbs", Some(60)).new_record);
        assert_eq!(engine.get_storage("orbs", 0).unwrap(), 90);
    }

    #[test]
    fn test_boxed_fallback_store_keeps_game_running() {
        let store = store_or_memory::<MemoryStore>(Err(StorageError::Unavailable));
        let mut engine: GameEngine<Box<dyn KeyValueStore>> = GameEngine::new(store, 3);
        assert_eq!(engine.load_high_score("orbs"), 0);

        assert!(engine.start());
        engine.frame(0.0, |state, _| state.add_score(25), |_, _| {});
        let saved = engine.save_high_score("orbs", None);
        assert!(saved.new_record);
        assert!(saved.saved.is_ok());
        assert_eq!(engine.load_high_score("orbs"), 25);
    }

    #[test]
    fn test_storage_reads_leading_integer() {
        let mut engine = engine();
        engine.store_mut().set_item("k", "12abc").unwrap();
        assert_eq!(engine.get_storage("k", 0).unwrap(), 12);
        engine.store_mut().set_item("k", "abc").unwrap();
        assert_eq!(engine.get_storage("k", 9).unwrap(), 0);
    }

    #[test]
    fn test_failed_save_still_reports_record() {
        let mut engine = GameEngine::new(MemoryStore::with_quota(4), 1);
        let saved = engine.save_high_score("high-score", Some(10));
        assert!(saved.new_record);
        assert!(saved.saved.is_err());
        assert_eq!(engine.state().high_score, 10);
    }

    #[test]
    fn test_victory_bursts_palette() {
        let mut engine = engine();
        engine.state_mut().score = 12;
        let screen = engine.victory_screen(Vec2::new(400.0, 250.0));
        assert_eq!(screen.score, 12);
        assert_eq!(engine.particles().len(), VICTORY_PARTICLES);
        assert!(
            engine
                .particles()
                .iter()
                .all(|p| VICTORY_PALETTE.contains(&p.color.as_str()))
        );

        let mut canvas = RecordingCanvas::new(800.0, 500.0);
        engine.draw_particles(&mut canvas);
        assert_eq!(canvas.circle_count(), VICTORY_PARTICLES);
    }

    #[test]
    fn test_game_over_marks_state() {
        let mut engine = engine();
        engine.start();
        let screen = engine.game_over_screen(false);
        assert!(engine.state().game_over);
        assert_eq!(screen.title, GameOverScreen::DEFAULT_TITLE);
        assert!(!engine.start());
    }

    #[test]
    fn test_settings_drive_capacity() {
        let mut store = MemoryStore::new();
        EngineSettings::from_quality(EffectsQuality::Lite)
            .save(&mut store)
            .unwrap();
        let mut engine = GameEngine::new(store, 3);
        assert_eq!(engine.particles().capacity(), 60);

        engine.audio_mut().toggle_mute();
        engine.save_settings().unwrap();
        assert!(EngineSettings::load(engine.store()).muted);
    }
}
