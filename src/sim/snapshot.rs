//! Read-only view of a race for renderers and the headless runner

use glam::Vec2;
use serde::Serialize;

use super::obstacle::Obstacle;
use super::state::{RacePhase, RaceState};
use super::track::{Segment, Track};
use super::vehicle::VehicleStatus;
use crate::consts::START_BEARING;

/// One car as a renderer sees it
#[derive(Debug, Clone, Serialize)]
pub struct VehicleView {
    pub id: u32,
    pub player_slot: Option<usize>,
    pub pos: Vec2,
    pub heading: f32,
    pub speed: f32,
    pub crashed: bool,
    pub exploded: bool,
    pub laps: u32,
    pub completion: f32,
}

/// Per-tick race summary
#[derive(Debug, Clone, Serialize)]
pub struct RaceSnapshot {
    pub tick: u64,
    pub elapsed: f32,
    pub remaining_time: Option<f32>,
    pub phase: RacePhase,
    pub track: Track,
    pub finish_line: Segment,
    pub vehicles: Vec<VehicleView>,
    pub obstacles: Vec<Obstacle>,
}

impl RaceState {
    pub fn snapshot(&self) -> RaceSnapshot {
        let vehicles = self
            .vehicles
            .iter()
            .zip(&self.progress)
            .map(|(v, p)| VehicleView {
                id: v.id,
                player_slot: v.player_slot(),
                pos: v.pos,
                heading: v.heading,
                speed: v.speed,
                crashed: matches!(v.status, VehicleStatus::Crashed(_)),
                exploded: matches!(v.status, VehicleStatus::Exploded(_)),
                laps: p.laps,
                completion: p.completion,
            })
            .collect();

        RaceSnapshot {
            tick: self.time_ticks,
            elapsed: self.elapsed,
            remaining_time: self.remaining_time(),
            phase: self.phase,
            track: self.track.clone(),
            finish_line: self.track.finish_line(START_BEARING),
            vehicles,
            obstacles: self.obstacles.clone(),
        }
    }
}
