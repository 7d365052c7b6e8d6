use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn floor(self) -> Self {
        Self::new(self.x.floor(), self.y.floor())
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle stored as min/max corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    pub const fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn is_inverted(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Half-open containment: the max edge is outside.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.y >= self.min.y && p.x < self.max.x && p.y < self.max.y
    }

    pub fn contains_rect(&self, r: &Rect) -> bool {
        r.min.x >= self.min.x && r.min.y >= self.min.y && r.max.x <= self.max.x && r.max.y <= self.max.y
    }

    pub fn overlaps(&self, r: &Rect) -> bool {
        r.min.y < self.max.y && r.max.y > self.min.y && r.min.x < self.max.x && r.max.x > self.min.x
    }

    /// Clamp this rectangle inside `clip`. The result may be empty but is never inverted.
    pub fn clip_with(self, clip: &Rect) -> Self {
        let min = Vec2::new(
            self.min.x.clamp(clip.min.x, clip.max.x),
            self.min.y.clamp(clip.min.y, clip.max.y),
        );
        let max = Vec2::new(
            self.max.x.clamp(min.x, clip.max.x.max(min.x)),
            self.max.y.clamp(min.y, clip.max.y.max(min.y)),
        );
        Self { min, max }
    }

    /// Grow this rectangle to include `r`.
    pub fn add(&mut self, r: &Rect) {
        self.min.x = self.min.x.min(r.min.x);
        self.min.y = self.min.y.min(r.min.y);
        self.max.x = self.max.x.max(r.max.x);
        self.max.y = self.max.y.max(r.max.y);
    }

    pub fn translate_x(self, dx: f32) -> Self {
        Self::new(self.min.x + dx, self.min.y, self.max.x + dx, self.max.y)
    }

    pub fn floor(self) -> Self {
        Self {
            min: self.min.floor(),
            max: self.max.floor(),
        }
    }
}
