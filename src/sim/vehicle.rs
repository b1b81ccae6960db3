//! Vehicle state and kinematics
//!
//! Heading is in radians: 0 points up (negative screen y) and increasing heading
//! turns the nose to the left on screen. One Euler step per tick:
//! `pos += speed * (-sin(heading), -cos(heading))`.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, CrashCause};
use super::opponent::{LaneBot, PilotState};
use super::track::{LanePosition, LaneTrack};
use crate::heading_vector;

/// Per-tick control deltas, already scaled by the input layer
///
/// Simultaneous inputs add up, so left + right cancels out.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Controls {
    /// Heading change this tick (radians, positive turns left)
    pub turn: f32,
    /// Speed change this tick (positive accelerates forward)
    pub throttle: f32,
}

impl Controls {
    pub const NONE: Controls = Controls {
        turn: 0.0,
        throttle: 0.0,
    };

    pub fn new(turn: f32, throttle: f32) -> Self {
        Self { turn, throttle }
    }
}

impl std::ops::Add for Controls {
    type Output = Controls;

    fn add(self, rhs: Controls) -> Controls {
        Controls::new(self.turn + rhs.turn, self.throttle + rhs.throttle)
    }
}

/// Forward/reverse speed bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedLimits {
    pub max_forward: f32,
    /// Positive magnitude; speed never drops below `-max_reverse`
    pub max_reverse: f32,
}

impl SpeedLimits {
    pub fn new(max_forward: f32, max_reverse: f32) -> Self {
        Self {
            max_forward,
            max_reverse,
        }
    }

    #[inline]
    pub fn clamp(&self, speed: f32) -> f32 {
        speed.clamp(-self.max_reverse, self.max_forward)
    }
}

/// Racing status (terminal states are one-way)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VehicleStatus {
    #[default]
    Running,
    /// Player car crashed; the race is lost for this driver
    Crashed(CrashCause),
    /// Opponent destroyed for the rest of the race
    Exploded(CrashCause),
}

impl VehicleStatus {
    /// Returns true once the vehicle can no longer move
    pub fn is_out(&self) -> bool {
        !matches!(self, VehicleStatus::Running)
    }

    pub fn cause(&self) -> Option<CrashCause> {
        match self {
            VehicleStatus::Running => None,
            VehicleStatus::Crashed(cause) | VehicleStatus::Exploded(cause) => Some(*cause),
        }
    }
}

/// Who drives a vehicle and how it moves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VehicleKind {
    /// Free-steering car on the circuit, driven by a local player slot
    Player { slot: usize, pilot: PilotState },
    /// Player car riding the lanes of a lane track
    LanePlayer {
        slot: usize,
        ride: LanePosition,
        accel: f32,
    },
    /// Opponent cycling through lanes at a fixed interval
    LaneBot(LaneBot),
    /// Opponent chasing centerline waypoints
    WaypointBot(PilotState),
}

/// Any car on the track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u32,
    pub kind: VehicleKind,
    pub pos: Vec2,
    /// Heading (radians, unwrapped)
    pub heading: f32,
    pub speed: f32,
    pub limits: SpeedLimits,
    /// Controls accumulated for the next integration step
    pub pending: Controls,
    /// Collision footprint (width, height), never rotated
    pub size: Vec2,
    pub bounds: Aabb,
    pub status: VehicleStatus,
}

impl Vehicle {
    pub fn new(
        id: u32,
        kind: VehicleKind,
        pos: Vec2,
        heading: f32,
        size: Vec2,
        limits: SpeedLimits,
    ) -> Self {
        Self {
            id,
            kind,
            pos,
            heading,
            speed: 0.0,
            limits,
            pending: Controls::NONE,
            size,
            bounds: Aabb::from_center_size(pos, size),
            status: VehicleStatus::Running,
        }
    }

    /// Local player slot, if a person drives this car
    pub fn player_slot(&self) -> Option<usize> {
        match self.kind {
            VehicleKind::Player { slot, .. } | VehicleKind::LanePlayer { slot, .. } => Some(slot),
            VehicleKind::LaneBot(_) | VehicleKind::WaypointBot(_) => None,
        }
    }

    pub fn is_player(&self) -> bool {
        self.player_slot().is_some()
    }

    /// Whether finishing the laps ends the race (lane bots are only traffic)
    pub fn contends(&self) -> bool {
        !matches!(self.kind, VehicleKind::LaneBot(_))
    }

    /// Accumulate control deltas for the next step
    pub fn steer(&mut self, controls: Controls) {
        if self.status.is_out() {
            return;
        }
        self.pending = self.pending + controls;
    }

    /// Advance one Euler step from the accumulated controls
    pub fn integrate(&mut self) {
        if self.status.is_out() {
            return;
        }
        let controls = std::mem::take(&mut self.pending);
        self.speed = self.limits.clamp(self.speed + controls.throttle);
        self.heading += controls.turn;
        self.pos += heading_vector(self.heading) * self.speed;
        self.bounds = Aabb::from_center_size(self.pos, self.size);
    }

    /// Move a lane-bound car to a new spot, facing along the lane
    pub fn place_on_lane(&mut self, lanes: &LaneTrack, ride: LanePosition, forward: bool) {
        if self.status.is_out() {
            return;
        }
        self.pos = lanes.position_for(ride.lane, ride.angle);
        self.heading = lane_heading(ride.angle, forward);
        self.bounds = Aabb::from_center_size(self.pos, self.size);
    }

    /// Advance a lane rider: throttle/brake change speed, turn right moves forward
    /// along the lane and turn left moves back.
    pub fn ride(&mut self, lanes: &LaneTrack) {
        if self.status.is_out() {
            return;
        }
        let controls = std::mem::take(&mut self.pending);
        let VehicleKind::LanePlayer { ride, accel, .. } = &mut self.kind else {
            return;
        };
        // Riders accelerate at their own rate whatever the throttle magnitude
        let dv = if controls.throttle > 0.0 {
            *accel
        } else if controls.throttle < 0.0 {
            -*accel
        } else {
            0.0
        };
        self.speed = self.limits.clamp(self.speed + dv);
        let step = self.speed / lanes.radius(ride.lane);
        if controls.turn < 0.0 {
            ride.angle += step;
        } else if controls.turn > 0.0 {
            ride.angle -= step;
        }
        let ride = *ride;
        self.place_on_lane(lanes, ride, controls.turn <= 0.0);
    }

    /// Player crash transition. Returns false if the car was already out.
    pub fn crash(&mut self, cause: CrashCause) -> bool {
        if self.status.is_out() {
            return false;
        }
        self.stop();
        self.status = VehicleStatus::Crashed(cause);
        true
    }

    /// Opponent explosion transition. Returns false if the car was already out.
    pub fn explode(&mut self, cause: CrashCause) -> bool {
        if self.status.is_out() {
            return false;
        }
        self.stop();
        self.status = VehicleStatus::Exploded(cause);
        true
    }

    fn stop(&mut self) {
        self.speed = 0.0;
        self.pending = Controls::NONE;
        self.limits = SpeedLimits::new(0.0, 0.0);
    }
}

/// Heading of a car travelling along a lane at a track angle
pub fn lane_heading(angle: f32, forward: bool) -> f32 {
    if forward { PI - angle } else { -angle }
}
