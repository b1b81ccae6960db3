//! Static hazards scattered over the circuit

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::track::EllipseTrack;
use crate::{angle_delta, bearing, consts::START_BEARING};

/// Band fraction of the pilot's racing line
pub const RACING_LINE_BAND: f32 = 0.4;

/// Band clearance kept free around the racing line
const RACING_LINE_CLEARANCE: f32 = 0.12;

/// Bearing clearance kept free around the start line (radians)
const START_ZONE_CLEARANCE: f32 = 0.35;

/// Placement attempts per requested obstacle
const ATTEMPTS_PER_OBSTACLE: usize = 50;

/// A static hazard with a forgiving hitbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    /// Edge length of the visual footprint
    pub size: f32,
    /// Collision box, smaller than the visual footprint
    pub hitbox: Aabb,
}

impl Obstacle {
    pub fn new(id: u32, pos: Vec2, size: f32, hitbox_scale: f32) -> Self {
        Self {
            id,
            pos,
            size,
            hitbox: Aabb::from_center_size(pos, Vec2::splat(size * hitbox_scale)),
        }
    }

    /// Visual footprint
    pub fn footprint(&self) -> Aabb {
        Aabb::from_center_size(self.pos, Vec2::splat(self.size))
    }
}

/// Scatter obstacles over the annulus.
///
/// Each footprint lies fully on track, clear of the start zone, the racing line
/// and every other obstacle. Fewer than `count` may be placed on a crowded track.
pub fn generate_obstacles(
    track: &EllipseTrack,
    count: usize,
    size: f32,
    hitbox_scale: f32,
    first_id: u32,
    rng: &mut Pcg32,
) -> Vec<Obstacle> {
    let mut obstacles: Vec<Obstacle> = Vec::with_capacity(count);
    let mut attempts = 0;

    while obstacles.len() < count && attempts < count * ATTEMPTS_PER_OBSTACLE {
        attempts += 1;

        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let band = rng.random_range(0.05..0.95);

        if (band - RACING_LINE_BAND).abs() < RACING_LINE_CLEARANCE {
            continue;
        }
        let pos = track.position_for(band, angle);
        if angle_delta(START_BEARING, bearing(track.center(), pos)).abs() < START_ZONE_CLEARANCE {
            continue;
        }

        let id = first_id + obstacles.len() as u32;
        let candidate = Obstacle::new(id, pos, size, hitbox_scale);
        let footprint = candidate.footprint();
        if !footprint.corners().iter().all(|&c| track.contains_point(c)) {
            continue;
        }
        if obstacles.iter().any(|o| o.footprint().overlaps(&footprint)) {
            continue;
        }
        obstacles.push(candidate);
    }

    if obstacles.len() < count {
        log::warn!(
            "Placed {} of {} obstacles after {} attempts",
            obstacles.len(),
            count,
            attempts
        );
    }
    obstacles
}
