//! Ellipse Racer - A top-down racing game on elliptical and lane tracks
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, race progress)
//! - `input`: Key state to per-tick control deltas
//! - `stats`: Race record ledger (best time, victories, defeats)
//! - `tuning`: Data-driven race balance

pub mod error;
pub mod input;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use error::RaceError;
pub use stats::RaceStats;
pub use tuning::Tuning;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (30 Hz, one kinematics step per tick)
    pub const SIM_DT: f32 = 1.0 / 30.0;

    /// Circuit track (elliptical annulus)
    pub const CIRCUIT_CENTER: (f32, f32) = (2000.0, 1000.0);
    pub const CIRCUIT_INNER_AXES: (f32, f32) = (1600.0, 800.0);
    pub const CIRCUIT_OUTER_AXES: (f32, f32) = (2200.0, 1100.0);

    /// Lane track (concentric circles)
    pub const LANE_CENTER: (f32, f32) = (400.0, 300.0);

    /// Start/finish line bearing (directly north of center)
    pub const START_BEARING: f32 = std::f32::consts::FRAC_PI_2;

    /// Lane variant car footprint
    pub const LANE_CAR_SIZE: f32 = 20.0;

    /// Local player slots in the lane variant
    pub const LANE_PLAYERS: usize = 2;
}

/// Signed shortest angular difference `to - from`, wrapped to (-π, π]
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(TAU);
    if d > PI { d - TAU } else { d }
}

/// Normalized angle to [0, 2π)
#[inline]
pub fn positive_angle(angle: f32) -> f32 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}

/// Travel direction around the track center, classified from bearing changes.
///
/// Bearings are measured with y pointing up (`atan2(cy - y, x - cx)`). A falling
/// bearing is `CounterClockwise`, the raceable direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    Clockwise,
    #[default]
    CounterClockwise,
}

/// Classify the direction of travel between two bearings.
///
/// Returns `None` when the bearing did not change, so callers can keep the last
/// known direction.
pub fn rotation_between(previous: f32, current: f32) -> Option<Rotation> {
    let d = angle_delta(previous, current);
    if d > 0.0 {
        Some(Rotation::Clockwise)
    } else if d < 0.0 {
        Some(Rotation::CounterClockwise)
    } else {
        None
    }
}

/// Bearing from `center` to `pos` in screen space, normalized to [0, 2π)
#[inline]
pub fn bearing(center: Vec2, pos: Vec2) -> f32 {
    positive_angle((center.y - pos.y).atan2(pos.x - center.x))
}

/// Unit forward vector for a heading (0 points up, screen y grows downward)
#[inline]
pub fn heading_vector(heading: f32) -> Vec2 {
    Vec2::new(-heading.sin(), -heading.cos())
}

/// Heading that points from `from` toward `to`
#[inline]
pub fn heading_toward(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    (-d.x).atan2(-d.y)
}

/// Screen-space point on an ellipse (or circle when `a == b`) at a track angle
#[inline]
pub fn point_on_ellipse(center: Vec2, a: f32, b: f32, angle: f32) -> Vec2 {
    center + Vec2::new(a * angle.cos(), b * angle.sin())
}

/// Inclusive point-in-ellipse test: `((x-cx)/a)² + ((y-cy)/b)² ≤ 1`
#[inline]
pub fn point_in_ellipse(point: Vec2, center: Vec2, a: f32, b: f32) -> bool {
    let d = point - center;
    (d.x * d.x) / (a * a) + (d.y * d.y) / (b * b) <= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_delta_wraps_shortest() {
        assert!((angle_delta(0.1, TAU - 0.1) + 0.2).abs() < 1e-5);
        assert!((angle_delta(TAU - 0.1, 0.1) - 0.2).abs() < 1e-5);
        // Exactly half a turn resolves to +π
        assert!((angle_delta(0.0, PI) - PI).abs() < 1e-6);
        assert!((angle_delta(PI, 0.0) - PI).abs() < 1e-6);
    }

    #[test]
    fn test_positive_angle_range() {
        assert!((positive_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-5);
        assert!(positive_angle(TAU) < 1e-6);
        assert!(positive_angle(-1e-9) < TAU);
    }

    #[test]
    fn test_rotation_between() {
        assert_eq!(rotation_between(1.0, 0.9), Some(Rotation::CounterClockwise));
        assert_eq!(rotation_between(0.9, 1.0), Some(Rotation::Clockwise));
        assert_eq!(rotation_between(0.05, TAU - 0.05), Some(Rotation::CounterClockwise));
        assert_eq!(rotation_between(1.0, 1.0), None);
    }

    #[test]
    fn test_bearing_north_is_half_pi() {
        let center = Vec2::new(100.0, 100.0);
        assert!((bearing(center, Vec2::new(100.0, 50.0)) - PI / 2.0).abs() < 1e-5);
        assert!(bearing(center, Vec2::new(150.0, 100.0)).abs() < 1e-5);
        assert!((bearing(center, Vec2::new(100.0, 150.0)) - 1.5 * PI).abs() < 1e-5);
    }

    #[test]
    fn test_heading_vector_convention() {
        let up = heading_vector(0.0);
        assert!(up.x.abs() < 1e-6 && (up.y + 1.0).abs() < 1e-6);
        // -90° drives right on screen
        let right = heading_vector(-PI / 2.0);
        assert!((right.x - 1.0).abs() < 1e-6 && right.y.abs() < 1e-6);
    }

    #[test]
    fn test_heading_toward_inverts_heading_vector() {
        let from = Vec2::new(10.0, 10.0);
        for target in [Vec2::new(50.0, 10.0), Vec2::new(10.0, -30.0), Vec2::new(-5.0, 40.0)] {
            let h = heading_toward(from, target);
            let dir = (target - from).normalize();
            assert!(heading_vector(h).distance(dir) < 1e-5);
        }
    }

    #[test]
    fn test_point_in_ellipse_inclusive() {
        let c = Vec2::ZERO;
        assert!(point_in_ellipse(Vec2::new(2.0, 0.0), c, 2.0, 1.0));
        assert!(point_in_ellipse(Vec2::new(0.0, -1.0), c, 2.0, 1.0));
        assert!(!point_in_ellipse(Vec2::new(0.0, 1.01), c, 2.0, 1.0));
    }
}
