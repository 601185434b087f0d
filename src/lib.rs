//! Arcade Kit - shared helpers for canvas mini-games
//!
//! Core modules:
//! - `sim`: Particles, frame scheduler, game state, collisions, timers
//! - `engine`: `GameEngine` facade tying simulation, audio and storage together
//! - `achievements`: One-way unlockable achievements persisted as JSON
//! - `cache`: Cache-first offline policy for the service worker
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `renderer`: 2D canvas drawing seam
//! - `ui`: Overlay and HUD view models
//! - `platform`: Browser glue (DOM, animation frames, service worker events)

pub mod achievements;
pub mod audio;
pub mod cache;
pub mod engine;
pub mod persistence;
#[cfg(target_arch = "wasm32")]
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use achievements::{AchievementId, AchievementTracker};
pub use audio::{AudioSystem, SoundEffect};
pub use engine::GameEngine;
pub use settings::{EffectsQuality, EngineSettings};

use rand::Rng;

/// Engine configuration constants
pub mod consts {
    /// Default canvas width (pixels)
    pub const DEFAULT_WIDTH: u32 = 800;
    /// Default canvas height (pixels)
    pub const DEFAULT_HEIGHT: u32 = 500;
    /// Default master volume
    pub const DEFAULT_VOLUME: f32 = 0.7;
    /// Per-level speed increase used by `calculate_speed`
    pub const LEVEL_SPEED_STEP: f32 = 0.1;
}

/// Clamp a value into `[min, max]`
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    min.max(max.min(value))
}

/// Linear interpolation between `start` and `end`
#[inline]
pub fn lerp(start: f32, end: f32, factor: f32) -> f32 {
    start + (end - start) * factor
}

/// Random integer in `[min, max]` (inclusive)
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}

/// Random float in `[min, max)`
pub fn random_float<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

/// Pick a random element (None for an empty slice)
pub fn random_choice<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.random_range(0..items.len()))
}

/// Format whole seconds as `MM:SS`
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{:02}:{:02}", mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_clamp_and_lerp() {
        assert_eq!(clamp(5.0, 0.0, 3.0), 3.0);
        assert_eq!(clamp(-1.0, 0.0, 3.0), 0.0);
        assert_eq!(clamp(1.5, 0.0, 3.0), 1.5);
        assert!((lerp(10.0, 20.0, 0.25) - 12.5).abs() < 1e-6);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(59.9), "00:59");
        assert_eq!(format_time(125.0), "02:05");
        assert_eq!(format_time(3600.0), "60:00");
    }

    #[test]
    fn test_random_helpers_stay_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let i = random_int(&mut rng, 1, 6);
            assert!((1..=6).contains(&i));
            let f = random_float(&mut rng, -2.0, 2.0);
            assert!((-2.0..2.0).contains(&f));
        }
        assert_eq!(random_int(&mut rng, 4, 4), 4);
        assert!(random_choice::<u8, _>(&mut rng, &[]).is_none());
        assert_eq!(random_choice(&mut rng, &["only"]), Some(&"only"));
    }
}
