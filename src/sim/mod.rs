//! Simulation module
//!
//! Everything that advances per frame lives here. No DOM or audio
//! dependencies; drawing goes through [`crate::renderer::Canvas`].

pub mod collision;
pub mod countdown;
pub mod game_loop;
pub mod particles;
pub mod starfield;
pub mod state;

pub use collision::{Circle, Rect, check_circle_collision, check_collision};
pub use countdown::{Countdown, CountdownStep};
pub use game_loop::{FrameTick, GameLoop, LoopPhase};
pub use particles::{ColorChoice, EmitOptions, Particle, ParticleSystem};
pub use starfield::{Star, Starfield};
pub use state::{Difficulty, DifficultySettings, GameState, calculate_speed, level_speed};
