//! Game state shared by every mini-game
//!
//! Games own their own entities; the engine only tracks score, level and
//! the run flags.

use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_SPEED_STEP;

/// Score/level bookkeeping plus run flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub score: i64,
    pub high_score: i64,
    /// Current level (1-based)
    pub level: u32,
    pub game_over: bool,
    pub paused: bool,
    pub running: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            score: 0,
            high_score: 0,
            level: 1,
            game_over: false,
            paused: false,
            running: false,
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add points (negative values subtract)
    pub fn add_score(&mut self, points: i64) {
        self.score += points;
    }

    /// Advance to the next level, returning it
    pub fn next_level(&mut self) -> u32 {
        self.level += 1;
        self.level
    }

    /// Reset score, level and flags for a new round; keeps high score and
    /// running state
    pub fn reset(&mut self) {
        self.score = 0;
        self.level = 1;
        self.game_over = false;
        self.paused = false;
    }
}

/// Difficulty levels offered by the games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Multipliers applied by a difficulty level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultySettings {
    pub speed_multiplier: f32,
    pub obstacle_frequency: f32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn settings(&self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings {
                speed_multiplier: 0.7,
                obstacle_frequency: 0.6,
            },
            Difficulty::Normal => DifficultySettings {
                speed_multiplier: 1.0,
                obstacle_frequency: 1.0,
            },
            Difficulty::Hard => DifficultySettings {
                speed_multiplier: 1.3,
                obstacle_frequency: 1.4,
            },
        }
    }
}

/// Scale a base speed by level: `base * (1 + (level - 1) * multiplier)`
pub fn calculate_speed(base_speed: f32, level: u32, multiplier: f32) -> f32 {
    base_speed * (1.0 + level.saturating_sub(1) as f32 * multiplier)
}

/// [`calculate_speed`] with the default 10% per level
pub fn level_speed(base_speed: f32, level: u32) -> f32 {
    calculate_speed(base_speed, level, LEVEL_SPEED_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_high_score() {
        let mut state = GameState::new();
        state.add_score(40);
        state.high_score = 90;
        state.next_level();
        state.game_over = true;
        state.running = true;

        state.reset();
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert!(!state.game_over);
        assert_eq!(state.high_score, 90);
        assert!(state.running);
    }

    #[test]
    fn test_difficulty_table() {
        let hard = Difficulty::Hard.settings();
        assert!((hard.speed_multiplier - 1.3).abs() < 1e-6);
        assert!((hard.obstacle_frequency - 1.4).abs() < 1e-6);
        assert_eq!(Difficulty::from_str("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::default().as_str(), "normal");
    }

    #[test]
    fn test_calculate_speed() {
        assert!((calculate_speed(5.0, 1, 0.1) - 5.0).abs() < 1e-6);
        assert!((calculate_speed(5.0, 3, 0.1) - 6.0).abs() < 1e-6);
        assert!((level_speed(10.0, 6) - 15.0).abs() < 1e-5);
        // Level 0 is treated like level 1
        assert!((level_speed(10.0, 0) - 10.0).abs() < 1e-6);
    }
}
