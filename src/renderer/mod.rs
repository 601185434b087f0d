//! 2D canvas rendering
//!
//! Everything the kit draws (particles, starfield) goes through the
//! [`Canvas`] trait so the simulation stays testable off the browser.

#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;

/// Minimal immediate-mode 2D drawing surface
pub trait Canvas {
    /// Surface width in pixels
    fn width(&self) -> f32;
    /// Surface height in pixels
    fn height(&self) -> f32;
    /// Clear the whole surface
    fn clear(&mut self);
    /// Fill a circle with a CSS color at the given opacity
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str, alpha: f32);
    /// Fill an axis-aligned rectangle with a CSS color at the given opacity
    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: &str, alpha: f32);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Circle {
        center: Vec2,
        radius: f32,
        color: String,
        alpha: f32,
    },
    Rect {
        pos: Vec2,
        size: Vec2,
        color: String,
        alpha: f32,
    },
}

/// Canvas that records draw calls instead of rasterizing them
///
/// Used by headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Number of circles drawn since the last clear
    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str, alpha: f32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color: color.to_string(),
            alpha,
        });
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: &str, alpha: f32) {
        self.commands.push(DrawCommand::Rect {
            pos,
            size,
            color: color.to_string(),
            alpha,
        });
    }
}
