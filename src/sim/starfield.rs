//! Drifting starfield behind the game hub
//!
//! Pure decoration: stars drift slowly and wrap around the viewport.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::renderer::Canvas;

/// Stars generated per field
pub const STAR_COUNT: usize = 400;

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Depth in [0.5, 2.0); nearer stars are brighter
    pub z: f32,
    /// Side length of the drawn square
    pub size: f32,
}

impl Star {
    pub fn alpha(&self) -> f32 {
        0.25 + self.z * 0.2
    }
}

#[derive(Debug, Clone)]
pub struct Starfield {
    stars: Vec<Star>,
    width: f32,
    height: f32,
    rng: Pcg32,
}

impl Starfield {
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        let mut field = Self {
            stars: Vec::with_capacity(STAR_COUNT),
            width,
            height,
            rng: Pcg32::seed_from_u64(seed),
        };
        field.populate();
        field
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Match a new viewport size; regenerates every star
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.populate();
    }

    fn populate(&mut self) {
        self.stars.clear();
        for _ in 0..STAR_COUNT {
            let star = Star {
                pos: Vec2::new(
                    self.rng.random::<f32>() * self.width,
                    self.rng.random::<f32>() * self.height,
                ),
                vel: Vec2::new(
                    (self.rng.random::<f32>() - 0.5) * 0.15,
                    (self.rng.random::<f32>() - 0.5) * 0.15,
                ),
                z: self.rng.random::<f32>() * 1.5 + 0.5,
                size: (self.rng.random::<f32>() * 1.5).max(0.5),
            };
            self.stars.push(star);
        }
    }

    /// Drift every star one frame, wrapping at the edges
    pub fn update(&mut self) {
        let (w, h) = (self.width, self.height);
        for star in &mut self.stars {
            star.pos += star.vel;
            if star.pos.x < 0.0 {
                star.pos.x += w;
            }
            if star.pos.x > w {
                star.pos.x -= w;
            }
            if star.pos.y < 0.0 {
                star.pos.y += h;
            }
            if star.pos.y > h {
                star.pos.y -= h;
            }
        }
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.clear();
        for star in &self.stars {
            canvas.fill_rect(star.pos, Vec2::splat(star.size), "#FFFFFF", star.alpha());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, RecordingCanvas};

    #[test]
    fn test_stars_start_inside_viewport() {
        let field = Starfield::new(320.0, 200.0, 1);
        assert_eq!(field.stars().len(), STAR_COUNT);
        for s in field.stars() {
            assert!(s.pos.x >= 0.0 && s.pos.x <= 320.0);
            assert!(s.pos.y >= 0.0 && s.pos.y <= 200.0);
            assert!(s.z >= 0.5 && s.z < 2.0);
            assert!(s.size >= 0.5);
            assert!(s.vel.x.abs() <= 0.075 && s.vel.y.abs() <= 0.075);
        }
    }

    #[test]
    fn test_stars_stay_inside_after_many_frames() {
        let mut field = Starfield::new(50.0, 40.0, 2);
        for _ in 0..5_000 {
            field.update();
        }
        for s in field.stars() {
            assert!(s.pos.x >= 0.0 && s.pos.x <= 50.0);
            assert!(s.pos.y >= 0.0 && s.pos.y <= 40.0);
        }
    }

    #[test]
    fn test_resize_regenerates() {
        let mut field = Starfield::new(100.0, 100.0, 3);
        field.resize(1000.0, 10.0);
        assert_eq!(field.stars().len(), STAR_COUNT);
        assert!(field.stars().iter().all(|s| s.pos.y <= 10.0));
    }

    #[test]
    fn test_draw_clears_then_fills() {
        let field = Starfield::new(100.0, 100.0, 4);
        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        field.draw(&mut canvas);
        assert_eq!(canvas.commands.first(), Some(&DrawCommand::Clear));
        assert_eq!(canvas.commands.len(), STAR_COUNT + 1);
    }
}
