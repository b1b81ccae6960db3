//! Collision and off-track detection
//!
//! Every shape here is an axis-aligned box centered on its owner. Car boxes do not
//! rotate with heading, so the corners tested against the track are the corners of
//! the upright footprint.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacle::Obstacle;
use super::track::Track;
use super::vehicle::Vehicle;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half_extents: size / 2.0,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// Top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [Vec2; 4] {
        let (min, max) = (self.min(), self.max());
        [
            Vec2::new(min.x, min.y),
            Vec2::new(max.x, min.y),
            Vec2::new(min.x, max.y),
            Vec2::new(max.x, max.y),
        ]
    }

    /// Strict overlap: boxes that only share an edge do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }
}

/// Why a vehicle left the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashCause {
    /// At least one corner left the drivable region
    OffTrack,
    /// Hit an obstacle hitbox
    Obstacle { id: u32 },
    /// Hit another car (running or wrecked)
    Vehicle { id: u32 },
}

/// Check the first obstacle whose hitbox overlaps `shape`
pub fn obstacle_hit(shape: &Aabb, obstacles: &[Obstacle]) -> Option<u32> {
    obstacles
        .iter()
        .find(|o| o.hitbox.overlaps(shape))
        .map(|o| o.id)
}

/// Evaluate every running vehicle against the track, obstacles and other cars.
///
/// All checks read the same post-movement positions, so one vehicle crashing
/// never hides another vehicle's crash in the same tick. Vehicles that are
/// already out of the race get `None` but still act as obstacles for others.
pub fn detect_crashes(
    vehicles: &[Vehicle],
    track: &Track,
    obstacles: &[Obstacle],
    car_collisions: bool,
) -> Vec<Option<CrashCause>> {
    vehicles
        .iter()
        .enumerate()
        .map(|(i, vehicle)| {
            if vehicle.status.is_out() {
                return None;
            }
            if !track.is_on_track(&vehicle.bounds) {
                return Some(CrashCause::OffTrack);
            }
            if let Some(id) = obstacle_hit(&vehicle.bounds, obstacles) {
                return Some(CrashCause::Obstacle { id });
            }
            if car_collisions {
                let hit = vehicles
                    .iter()
                    .enumerate()
                    .find(|(j, other)| *j != i && other.bounds.overlaps(&vehicle.bounds));
                if let Some((_, other)) = hit {
                    return Some(CrashCause::Vehicle { id: other.id });
                }
            }
            None
        })
        .collect()
}
