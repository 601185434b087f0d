//! Overlap tests for rectangles and circles
//!
//! Games only need yes/no answers; no contact points or normals.

use glam::Vec2;

/// Axis-aligned rectangle (top-left origin, screen coordinates)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Circle by center and radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            center: Vec2::new(x, y),
            radius,
        }
    }
}

/// Strict AABB overlap; rectangles that only share an edge do not collide
pub fn check_collision(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Circles collide when their centers are closer than the sum of radii
pub fn check_circle_collision(a: &Circle, b: &Circle) -> bool {
    a.center.distance(b.center) < a.radius + b.radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(check_collision(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(check_collision(&a, &Rect::new(2.0, 2.0, 2.0, 2.0)));
        assert!(!check_collision(&a, &Rect::new(20.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_rect_touching_edges_do_not_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!check_collision(&a, &Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!check_collision(&a, &Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_circle_overlap() {
        let a = Circle::new(0.0, 0.0, 5.0);
        assert!(check_circle_collision(&a, &Circle::new(8.0, 0.0, 4.0)));
        // Exactly touching is not a hit
        assert!(!check_circle_collision(&a, &Circle::new(9.0, 0.0, 4.0)));
        assert!(!check_circle_collision(&a, &Circle::new(30.0, 30.0, 4.0)));
    }

    #[test]
    fn test_rect_helpers() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Vec2::new(25.0, 40.0));
    }
}
