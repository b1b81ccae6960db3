//! Race progress from the bearing around the track center
//!
//! A lap is one downward crossing of the start bearing while travelling in the
//! raceable direction. The crossing alone decides the lap; completion is a
//! display statistic. Net travel since the previous crossing must reach
//! `min_travel` for the crossing to count, so nudging back and forth over the
//! line never scores.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::{Rotation, angle_delta, positive_angle, rotation_between};

/// Per-vehicle lap counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapTracker {
    /// Bearing of the start/finish line
    pub start_bearing: f32,
    /// Bearing seen on the previous update
    pub last_bearing: f32,
    pub laps: u32,
    /// Progress since the start line (0-100), zero while going the wrong way
    pub completion: f32,
    /// Last observed direction of travel
    pub rotation: Rotation,
    /// Set once the vehicle has been seen moving
    pub started: bool,
    /// Net raceable travel since the last crossing (radians)
    pub travel: f32,
    pub min_travel: f32,
}

impl LapTracker {
    pub fn new(start_bearing: f32, spawn_bearing: f32, min_travel: f32) -> Self {
        Self {
            start_bearing,
            last_bearing: spawn_bearing,
            laps: 0,
            completion: 0.0,
            rotation: Rotation::default(),
            started: false,
            travel: 0.0,
            min_travel,
        }
    }

    /// Feed the current bearing. Returns true when this update completed a lap.
    pub fn update(&mut self, bearing: f32, moving: bool) -> bool {
        self.started |= moving;
        let previous = std::mem::replace(&mut self.last_bearing, bearing);
        if !self.started {
            return false;
        }

        let delta = angle_delta(previous, bearing);
        if let Some(rotation) = rotation_between(previous, bearing) {
            self.rotation = rotation;
        }
        self.travel -= delta;
        self.completion = match self.rotation {
            Rotation::CounterClockwise => {
                positive_angle(self.start_bearing - bearing) / TAU * 100.0
            }
            Rotation::Clockwise => 0.0,
        };

        // `current < start <= previous`, unwrapped around the start bearing
        let crossed = delta < 0.0 && positive_angle(previous - self.start_bearing) < -delta;
        if !crossed {
            return false;
        }

        // Measure travel at the line itself so the tick size never matters
        let overshoot = positive_angle(self.start_bearing - bearing);
        let counted = self.rotation == Rotation::CounterClockwise
            && self.travel - overshoot >= self.min_travel;
        self.travel = overshoot;
        if counted {
            self.laps += 1;
        }
        counted
    }
}
