//! Axis-aligned ellipse geometry for track boundaries
//!
//! An ellipse is defined by:
//! - center: screen-space center point
//! - a, b: horizontal and vertical semi-axes
//!
//! Track angles follow screen space (`y = cy + b·sin(angle)`), so increasing the
//! angle moves clockwise on screen.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{point_in_ellipse, point_on_ellipse};

/// An axis-aligned ellipse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Vec2,
    /// Horizontal semi-axis
    pub a: f32,
    /// Vertical semi-axis
    pub b: f32,
}

impl Ellipse {
    pub fn new(center: Vec2, a: f32, b: f32) -> Self {
        Self { center, a, b }
    }

    /// Circle as a degenerate ellipse
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::new(center, radius, radius)
    }

    /// Average of the two semi-axes
    #[inline]
    pub fn mean_radius(&self) -> f32 {
        (self.a + self.b) / 2.0
    }

    /// Distance from the center to the boundary along the ray through `point`
    pub fn radius_toward(&self, point: Vec2) -> f32 {
        let dir = (point - self.center).normalize_or_zero();
        if dir == Vec2::ZERO {
            return self.mean_radius();
        }
        1.0 / ((dir.x / self.a).powi(2) + (dir.y / self.b).powi(2)).sqrt()
    }

    /// Inclusive containment (points on the boundary count as inside)
    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point_in_ellipse(point, self.center, self.a, self.b)
    }

    /// Check if this ellipse lies strictly inside another with the same center
    pub fn strictly_inside(&self, other: &Ellipse) -> bool {
        self.a < other.a && self.b < other.b
    }

    /// Boundary point at a track angle
    #[inline]
    pub fn point_at(&self, angle: f32) -> Vec2 {
        point_on_ellipse(self.center, self.a, self.b, angle)
    }

    /// Sample points along the boundary (for rendering outlines)
    pub fn sample_edge(&self, num_points: usize) -> Vec<Vec2> {
        (0..num_points)
            .map(|i| {
                let t = i as f32 / num_points.max(1) as f32;
                self.point_at(t * std::f32::consts::TAU)
            })
            .collect()
    }
}
