//! Opponent controllers
//!
//! - `LaneBot`: constant linear speed along a lane, hopping to the next lane on a timer
//! - `PilotState` + `pilot_controls`: waypoint pursuit blended with boundary and
//!   car avoidance (also drives the player's autopilot)

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacle::RACING_LINE_BAND;
use super::track::{EllipseTrack, LanePosition, LaneTrack};
use super::vehicle::{Controls, Vehicle};
use crate::tuning::{BoundaryModel, Tuning};
use crate::{angle_delta, heading_toward};

/// Lane-switching bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneBot {
    pub ride: LanePosition,
    /// Linear speed (units per tick)
    pub speed: f32,
    /// Travel forward along the lane (increasing track angle) or backward
    pub forward: bool,
    /// Time between lane switches (ms)
    pub switch_ms: f32,
    /// Time since the last switch (ms)
    pub since_switch_ms: f32,
}

impl LaneBot {
    pub fn new(lane: usize, angle: f32, speed: f32, forward: bool, switch_ms: f32) -> Self {
        Self {
            ride: LanePosition { lane, angle },
            speed,
            forward,
            switch_ms,
            since_switch_ms: 0.0,
        }
    }

    /// Advance one tick. Returns the new lane when a switch happened.
    ///
    /// The angular step is `speed / radius`, so outer lanes turn slower for the
    /// same linear speed.
    pub fn advance(&mut self, lanes: &LaneTrack, dt_ms: f32) -> Option<usize> {
        let mut switched = None;
        self.since_switch_ms += dt_ms;
        if self.since_switch_ms >= self.switch_ms {
            self.since_switch_ms -= self.switch_ms;
            self.ride.lane = lanes.next_lane(self.ride.lane);
            switched = Some(self.ride.lane);
        }

        let step = self.speed / lanes.radius(self.ride.lane);
        self.ride.angle += if self.forward { step } else { -step };
        switched
    }
}

/// Waypoint pursuit memory
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PilotState {
    /// Index of the waypoint being chased (always < waypoint count)
    pub cursor: usize,
    pub target_speed: f32,
}

impl PilotState {
    /// Start chasing the waypoint after the one nearest to `pos`
    pub fn starting_at(waypoints: &[Vec2], pos: Vec2, cruise_speed: f32) -> Self {
        let nearest = waypoints
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance(pos).total_cmp(&b.distance(pos)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        Self {
            cursor: if waypoints.is_empty() { 0 } else { (nearest + 1) % waypoints.len() },
            target_speed: cruise_speed,
        }
    }
}

/// Result of one pilot evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PilotDecision {
    pub controls: Controls,
    /// New cursor when the current waypoint was reached this tick
    pub captured: Option<usize>,
}

/// Centerline waypoints around the annulus, in racing order
pub fn generate_waypoints(track: &EllipseTrack, count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let angle = TAU * i as f32 / count as f32;
            track.position_for(RACING_LINE_BAND, angle)
        })
        .collect()
}

/// Decide steering and throttle for one tick of waypoint pursuit.
///
/// `others` holds the positions of every other car, wrecks included.
pub fn pilot_controls(
    vehicle: &Vehicle,
    pilot: &mut PilotState,
    waypoints: &[Vec2],
    track: &EllipseTrack,
    others: &[Vec2],
    tuning: &Tuning,
) -> PilotDecision {
    let mut decision = PilotDecision {
        controls: Controls::NONE,
        captured: None,
    };
    if waypoints.is_empty() {
        return decision;
    }

    let max_forward = vehicle.limits.max_forward;
    let turn_step = tuning.turn_step();
    let pos = vehicle.pos;

    pilot.cursor %= waypoints.len();
    let target = waypoints[pilot.cursor];

    if pos.distance(target) < tuning.capture_radius {
        pilot.cursor = (pilot.cursor + 1) % waypoints.len();
        decision.captured = Some(pilot.cursor);
    } else {
        let mut error = angle_delta(vehicle.heading, heading_toward(pos, target));

        // Bear back toward the middle of the band near either wall
        let center = track.center();
        let from_center = pos.distance(center);
        let (inner_r, outer_r) = match tuning.boundary_model {
            BoundaryModel::MeanRadius => (track.inner.mean_radius(), track.outer.mean_radius()),
            BoundaryModel::Directional => (track.inner.radius_toward(pos), track.outer.radius_toward(pos)),
        };
        if from_center > outer_r - tuning.safe_margin {
            error = angle_delta(vehicle.heading, heading_toward(pos, center));
        } else if from_center < inner_r + tuning.safe_margin {
            error = angle_delta(vehicle.heading, heading_toward(center, pos));
        }

        if error.abs() > tuning.steer_deadband() {
            decision.controls.turn = turn_step * error.signum();
        }
        pilot.target_speed = max_forward * (1.0 - tuning.turn_slowdown * (error.abs() / PI));
    }

    // Evade the closest car inside the avoidance radius
    let threat = others
        .iter()
        .filter(|p| p.distance(pos) < tuning.avoidance_radius)
        .min_by(|a, b| a.distance(pos).total_cmp(&b.distance(pos)));
    if let Some(&threat) = threat {
        let error = angle_delta(vehicle.heading, heading_toward(threat, pos));
        decision.controls.turn = if error > 0.0 {
            turn_step
        } else if error < 0.0 {
            -turn_step
        } else {
            0.0
        };
        pilot.target_speed = max_forward * 0.5;
    }

    decision.controls.throttle = if vehicle.speed < pilot.target_speed {
        tuning.throttle_step
    } else if vehicle.speed > pilot.target_speed {
        -tuning.throttle_step
    } else {
        0.0
    };

    decision
}
