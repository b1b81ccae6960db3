//! Race state and core simulation types
//!
//! Everything a race needs lives in `RaceState`. A restart builds a fresh value.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CrashCause;
use super::obstacle::{Obstacle, generate_obstacles};
use super::opponent::{LaneBot, PilotState, generate_waypoints};
use super::progress::LapTracker;
use super::track::{EllipseTrack, LanePosition, LaneTrack, Track};
use super::vehicle::{SpeedLimits, Vehicle, VehicleKind, lane_heading};
use crate::bearing;
use crate::consts::*;
use crate::error::RaceError;
use crate::tuning::Tuning;

/// Track topology and roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceMode {
    /// Elliptical annulus with obstacles and a waypoint bot
    #[default]
    Circuit,
    /// Concentric lanes with lane-switching bots
    Lanes,
}

/// Why a race was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// Left the track or hit an obstacle
    Crashed,
    /// Hit another car
    Collision,
    TimeExpired,
    /// An opponent finished first
    Beaten,
}

/// Terminal race result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win { slot: usize },
    Loss(LossReason),
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win { .. })
    }
}

/// Current phase of a race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RacePhase {
    #[default]
    Racing,
    /// The tick the outcome was decided
    Finished(Outcome),
    /// Waiting for confirm (restart) or quit
    AwaitingRestart(Outcome),
}

impl RacePhase {
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            RacePhase::Racing => None,
            RacePhase::Finished(outcome) | RacePhase::AwaitingRestart(outcome) => Some(*outcome),
        }
    }
}

/// Record handed to the persistence layer when a race ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceRecord {
    /// Race clock at the end (seconds)
    pub elapsed_time: f32,
    pub outcome: Outcome,
    /// Best lap count among the local players
    pub lap_count: u32,
}

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    LapCompleted { vehicle: u32, laps: u32 },
    Crashed { vehicle: u32, cause: CrashCause },
    Exploded { vehicle: u32, cause: CrashCause },
    WaypointCaptured { vehicle: u32, next: usize },
    LaneSwitched { vehicle: u32, lane: usize },
    RaceEnded(RaceRecord),
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Complete race state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceState {
    /// Race seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    pub mode: RaceMode,
    pub tuning: Tuning,
    pub track: Track,
    /// All cars, sorted by id
    pub vehicles: Vec<Vehicle>,
    /// Lap trackers, parallel to `vehicles`
    pub progress: Vec<LapTracker>,
    pub obstacles: Vec<Obstacle>,
    /// Centerline targets for the waypoint pilot (empty on lane tracks)
    pub waypoints: Vec<Vec2>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Race clock (seconds)
    pub elapsed: f32,
    /// Countdown length; `None` races without a clock
    pub time_limit: Option<f32>,
    /// Whether cars crash into each other
    pub car_collisions: bool,
    pub phase: RacePhase,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<RaceEvent>,
    /// Next entity ID
    next_id: u32,
}

impl RaceState {
    /// Build a race. Fails only on invalid tuning or track parameters.
    pub fn new(mode: RaceMode, tuning: Tuning, seed: u64) -> Result<Self, RaceError> {
        tuning.validate()?;
        let state = match mode {
            RaceMode::Circuit => Self::circuit(tuning, seed)?,
            RaceMode::Lanes => Self::lanes(tuning, seed)?,
        };
        log::info!(
            "Race built: {:?}, seed {}, {} cars, {} obstacles",
            mode,
            seed,
            state.vehicles.len(),
            state.obstacles.len()
        );
        Ok(state)
    }

    fn empty(seed: u64, mode: RaceMode, tuning: Tuning, track: Track) -> Self {
        Self {
            seed,
            rng_state: RngState::new(seed),
            mode,
            tuning,
            track,
            vehicles: Vec::new(),
            progress: Vec::new(),
            obstacles: Vec::new(),
            waypoints: Vec::new(),
            time_ticks: 0,
            elapsed: 0.0,
            time_limit: None,
            car_collisions: false,
            phase: RacePhase::Racing,
            events: Vec::new(),
            next_id: 1,
        }
    }

    fn circuit(tuning: Tuning, seed: u64) -> Result<Self, RaceError> {
        let center = Vec2::from(CIRCUIT_CENTER);
        let inner = Vec2::from(CIRCUIT_INNER_AXES);
        let outer = Vec2::from(CIRCUIT_OUTER_AXES);
        let ellipse = EllipseTrack::new(center, inner, outer)?;
        let waypoints = generate_waypoints(&ellipse, tuning.waypoint_count);

        let mut state = Self::empty(seed, RaceMode::Circuit, tuning, Track::Ellipse(ellipse.clone()));
        state.time_limit = state.tuning.time_limit_secs;
        state.car_collisions = true;

        // Both cars start side by side just north of center, facing right
        let spawn_y = center.y - (inner.y + outer.y) / 2.0 + 10.0;
        let size = state.tuning.car_size;
        let limits = SpeedLimits::new(state.tuning.max_forward_speed, state.tuning.max_reverse_speed);
        let cruise = state.tuning.max_forward_speed * state.tuning.cruise_factor;

        let player_pos = Vec2::new(center.x - 20.0, spawn_y);
        let pilot = PilotState::starting_at(&waypoints, player_pos, cruise);
        state.spawn(VehicleKind::Player { slot: 0, pilot }, player_pos, -FRAC_PI_2, size, limits);

        let bot_pos = Vec2::new(center.x + 20.0, spawn_y);
        let pilot = PilotState::starting_at(&waypoints, bot_pos, cruise);
        state.spawn(VehicleKind::WaypointBot(pilot), bot_pos, -FRAC_PI_2, size, limits);

        let mut rng = state.rng_state.to_rng();
        state.obstacles = generate_obstacles(
            &ellipse,
            state.tuning.obstacle_count,
            state.tuning.obstacle_size,
            state.tuning.obstacle_hitbox_scale,
            state.next_id,
            &mut rng,
        );
        state.next_id += state.obstacles.len() as u32;
        state.waypoints = waypoints;
        Ok(state)
    }

    fn lanes(tuning: Tuning, seed: u64) -> Result<Self, RaceError> {
        let lt = tuning.lanes.clone();
        let lanes = LaneTrack::new(Vec2::from(LANE_CENTER), lt.base_radius, lt.lane_width, lt.lane_count)?;
        let mut state = Self::empty(seed, RaceMode::Lanes, tuning, Track::Lanes(lanes.clone()));
        let size = Vec2::splat(LANE_CAR_SIZE);

        for slot in 0..LANE_PLAYERS {
            let ride = LanePosition {
                lane: (2 + slot).min(lt.lane_count - 1),
                angle: -FRAC_PI_2,
            };
            state.spawn(
                VehicleKind::LanePlayer {
                    slot,
                    ride,
                    accel: lt.rider_accel,
                },
                lanes.position_for(ride.lane, ride.angle),
                lane_heading(ride.angle, true),
                size,
                SpeedLimits::new(lt.rider_max_speed, 0.0),
            );
        }

        // Bots alternate direction and start a quarter turn apart
        for (i, &switch_ms) in lt.bot_switch_ms.iter().enumerate() {
            let forward = i % 2 == 0;
            let bot = LaneBot::new(i % lt.lane_count, i as f32 * FRAC_PI_2, lt.bot_speed, forward, switch_ms);
            let (pos, heading) = (
                lanes.position_for(bot.ride.lane, bot.ride.angle),
                lane_heading(bot.ride.angle, forward),
            );
            let id = state.spawn(
                VehicleKind::LaneBot(bot),
                pos,
                heading,
                size,
                SpeedLimits::new(lt.bot_speed, lt.bot_speed),
            );
            if let Some(vehicle) = state.vehicles.iter_mut().find(|v| v.id == id) {
                vehicle.speed = lt.bot_speed;
            }
        }
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a car with its lap tracker
    pub fn spawn(
        &mut self,
        kind: VehicleKind,
        pos: Vec2,
        heading: f32,
        size: Vec2,
        limits: SpeedLimits,
    ) -> u32 {
        let id = self.next_entity_id();
        self.vehicles.push(Vehicle::new(id, kind, pos, heading, size, limits));
        self.progress.push(LapTracker::new(
            START_BEARING,
            bearing(self.track.center(), pos),
            self.tuning.min_lap_travel,
        ));
        id
    }

    /// Seconds left on the clock, if the race has one
    pub fn remaining_time(&self) -> Option<f32> {
        self.time_limit.map(|limit| (limit - self.elapsed).max(0.0))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.phase.outcome()
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Best lap count among the local players
    pub fn player_laps(&self) -> u32 {
        self.vehicles
            .iter()
            .zip(&self.progress)
            .filter(|(v, _)| v.is_player())
            .map(|(_, p)| p.laps)
            .max()
            .unwrap_or(0)
    }

    pub fn players(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter().filter(|v| v.is_player())
    }
}
