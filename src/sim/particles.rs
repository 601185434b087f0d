//! Particle bursts for hits, scores and victories
//!
//! Particles live in a fixed-capacity ring buffer. Emitting into a full
//! buffer evicts the oldest particle, so one tick never costs more than
//! `capacity` integrations.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::renderer::Canvas;
use crate::settings::EffectsQuality;

/// Gold, the default burst color
pub const DEFAULT_PARTICLE_COLOR: &str = "#FFD700";

/// Either one color for the whole burst or a palette sampled per particle
#[derive(Debug, Clone, PartialEq)]
pub enum ColorChoice {
    Single(String),
    Palette(Vec<String>),
}

impl Default for ColorChoice {
    fn default() -> Self {
        ColorChoice::Single(DEFAULT_PARTICLE_COLOR.to_string())
    }
}

impl From<&str> for ColorChoice {
    fn from(color: &str) -> Self {
        ColorChoice::Single(color.to_string())
    }
}

impl From<&[&str]> for ColorChoice {
    fn from(colors: &[&str]) -> Self {
        ColorChoice::Palette(colors.iter().map(|c| c.to_string()).collect())
    }
}

impl ColorChoice {
    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            ColorChoice::Single(color) => color.clone(),
            ColorChoice::Palette(colors) => crate::random_choice(rng, colors)
                .cloned()
                .unwrap_or_else(|| DEFAULT_PARTICLE_COLOR.to_string()),
        }
    }
}

/// Burst parameters
#[derive(Debug, Clone, PartialEq)]
pub struct EmitOptions {
    /// Particles per burst
    pub count: usize,
    pub color: ColorChoice,
    /// Maximum initial speed (pixels/tick)
    pub speed: f32,
    /// Maximum radius; each particle gets 50-100% of it
    pub size: f32,
    /// Lifetime in ticks
    pub life: u32,
    /// Downward acceleration (pixels/tick²)
    pub gravity: f32,
    /// Angular spread in radians, starting at +x
    pub spread: f32,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            count: 15,
            color: ColorChoice::default(),
            speed: 3.0,
            size: 4.0,
            life: 40,
            gravity: 0.1,
            spread: TAU,
        }
    }
}

/// A single visual particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: String,
    /// Ticks remaining
    pub life: u32,
    pub max_life: u32,
    pub gravity: f32,
}

impl Particle {
    /// Opacity, proportional to the remaining-life fraction
    #[inline]
    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }

    /// Advance one tick. Returns false once the particle has expired.
    #[inline]
    fn step(&mut self) -> bool {
        self.pos += self.vel;
        self.vel.y += self.gravity;
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }
}

/// Bounded particle pool owned by one engine instance
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: VecDeque<Particle>,
    capacity: usize,
    rng: Pcg32,
}

impl ParticleSystem {
    /// Create a pool holding at most `capacity` live particles
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            particles: VecDeque::with_capacity(capacity),
            capacity,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Create a pool sized for `quality`
    pub fn with_quality(quality: EffectsQuality, seed: u64) -> Self {
        Self::new(quality.particle_budget(), seed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, dropping the oldest particles if needed
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.particles.len() > capacity {
            self.particles.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Live particles, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Emit a burst at `origin`. Returns how many particles were spawned.
    pub fn emit(&mut self, origin: Vec2, options: &EmitOptions) -> usize {
        if self.capacity == 0 {
            return 0;
        }

        for _ in 0..options.count {
            let angle = self.rng.random::<f32>() * options.spread;
            let speed = self.rng.random::<f32>() * options.speed;
            let size = options.size * (0.5 + self.rng.random::<f32>() * 0.5);
            let color = options.color.pick(&mut self.rng);

            if self.particles.len() >= self.capacity {
                self.particles.pop_front();
            }

            self.particles.push_back(Particle {
                pos: origin,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                size,
                color,
                life: options.life,
                max_life: options.life,
                gravity: options.gravity,
            });
        }

        options.count
    }

    /// Advance every particle one tick and drop the expired ones
    pub fn update(&mut self) {
        self.particles.retain_mut(|p| p.step());
    }

    /// Draw every particle as a circle faded by remaining life
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for p in &self.particles {
            canvas.fill_circle(p.pos, p.size, &p.color, p.alpha());
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
