//! `CanvasRenderingContext2d` backend

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::Canvas;

/// A canvas element together with its 2D context
pub struct WebCanvas {
    pub element: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
}

impl WebCanvas {
    /// Wrap a canvas element, resizing it to `width` x `height`
    ///
    /// Returns None if the element has no 2D context.
    pub fn new(element: HtmlCanvasElement, width: u32, height: u32) -> Option<Self> {
        element.set_width(width);
        element.set_height(height);
        let ctx = element
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { element, ctx })
    }

    /// Look up a canvas by element id (None if missing or not a canvas)
    pub fn by_id(id: &str, width: u32, height: u32) -> Option<Self> {
        let element = web_sys::window()?
            .document()?
            .get_element_by_id(id)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        Self::new(element, width, height)
    }
}

impl Canvas for WebCanvas {
    fn width(&self) -> f32 {
        self.element.width() as f32
    }

    fn height(&self) -> f32 {
        self.element.height() as f32
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.width() as f64, self.height() as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str, alpha: f32) {
        self.ctx.save();
        self.ctx.set_global_alpha(alpha as f64);
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
        self.ctx.restore();
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: &str, alpha: f32) {
        self.ctx.save();
        self.ctx.set_global_alpha(alpha as f64);
        self.ctx.set_fill_style_str(color);
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
        self.ctx.restore();
    }
}
