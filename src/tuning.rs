//! Data-driven race balance
//!
//! Every value has a default, so a tuning file only needs the fields it overrides.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};

use crate::error::{ConfigParseSnafu, ConfigReadSnafu, InvalidTuningSnafu, RaceError};

/// How the pilot measures its distance to the track walls
///
/// `MeanRadius` is the reference heuristic. It leaves no safe zone on the long
/// straights of a stretched ellipse, so races default to `Directional`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryModel {
    /// Compare against the average of each boundary's semi-axes
    MeanRadius,
    /// Compare against each boundary's radius along the car's bearing
    #[default]
    Directional,
}

/// Lane variant balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneTuning {
    /// Number of concentric lanes
    pub lane_count: usize,
    /// Radius of the innermost lane
    pub base_radius: f32,
    /// Radial spacing between lanes
    pub lane_width: f32,
    /// Top speed of a lane rider (player)
    pub rider_max_speed: f32,
    /// Speed change per tick while throttle/brake is held
    pub rider_accel: f32,
    /// Linear speed of the lane bots
    pub bot_speed: f32,
    /// Lane switch interval per bot (ms), one entry per bot
    pub bot_switch_ms: Vec<f32>,
}

impl Default for LaneTuning {
    fn default() -> Self {
        Self {
            lane_count: 4,
            base_radius: 200.0,
            lane_width: 50.0,
            rider_max_speed: 3.0,
            rider_accel: 0.1,
            bot_speed: 2.0,
            bot_switch_ms: vec![3000.0, 4000.0],
        }
    }
}

/// Race balance and rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Car limits ===
    /// Maximum forward speed (units per tick)
    pub max_forward_speed: f32,
    /// Maximum reverse speed (units per tick, positive)
    pub max_reverse_speed: f32,
    /// Speed change per tick while throttle or brake is held
    pub throttle_step: f32,
    /// Heading change per tick while a turn key is held (degrees)
    pub turn_step_deg: f32,
    /// Collision footprint of a circuit car (width, height)
    pub car_size: Vec2,

    // === Circuit pilot ===
    /// Number of centerline waypoints
    pub waypoint_count: usize,
    /// Distance at which a waypoint counts as reached
    pub capture_radius: f32,
    /// Distance at which another car forces an evasive turn
    pub avoidance_radius: f32,
    /// Distance from either boundary at which the pilot bears back to the middle
    pub safe_margin: f32,
    /// Wall distance measure used by the pilot
    pub boundary_model: BoundaryModel,
    /// Heading error below which the pilot holds its line (degrees)
    pub steer_deadband_deg: f32,
    /// Initial target speed as a fraction of max forward speed
    pub cruise_factor: f32,
    /// Target speed reduction at a 180° heading error
    pub turn_slowdown: f32,

    // === Race rules ===
    /// Laps needed to finish
    pub laps: u32,
    /// Circuit countdown (seconds); `None` races without a clock
    pub time_limit_secs: Option<f32>,
    /// Net raceable travel (radians) required between counted line crossings
    pub min_lap_travel: f32,

    // === Obstacles ===
    pub obstacle_count: usize,
    /// Visual footprint edge length
    pub obstacle_size: f32,
    /// Hitbox edge as a fraction of the visual footprint
    pub obstacle_hitbox_scale: f32,

    pub lanes: LaneTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_forward_speed: 10.0,
            max_reverse_speed: 10.0,
            throttle_step: 2.0,
            turn_step_deg: 5.0,
            car_size: Vec2::new(32.0, 20.0),

            waypoint_count: 100,
            capture_radius: 50.0,
            avoidance_radius: 200.0,
            safe_margin: 100.0,
            boundary_model: BoundaryModel::Directional,
            steer_deadband_deg: 10.0,
            cruise_factor: 0.75,
            turn_slowdown: 0.7,

            laps: 1,
            time_limit_secs: Some(60.0),
            min_lap_travel: std::f32::consts::PI,

            obstacle_count: 6,
            obstacle_size: 60.0,
            obstacle_hitbox_scale: 0.6,

            lanes: LaneTuning::default(),
        }
    }
}

impl Tuning {
    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, RaceError> {
        let json = fs::read_to_string(path).context(ConfigReadSnafu { path })?;
        let tuning: Tuning = serde_json::from_str(&json).context(ConfigParseSnafu { path })?;
        tuning.validate()?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Turn step in radians
    pub fn turn_step(&self) -> f32 {
        self.turn_step_deg.to_radians()
    }

    /// Steering dead-band in radians
    pub fn steer_deadband(&self) -> f32 {
        self.steer_deadband_deg.to_radians()
    }

    /// Reject values that would make a race meaningless or unstable
    pub fn validate(&self) -> Result<(), RaceError> {
        let positive = [
            ("max_forward_speed", self.max_forward_speed),
            ("throttle_step", self.throttle_step),
            ("turn_step_deg", self.turn_step_deg),
            ("car_size.x", self.car_size.x),
            ("car_size.y", self.car_size.y),
            ("capture_radius", self.capture_radius),
            ("obstacle_size", self.obstacle_size),
            ("obstacle_hitbox_scale", self.obstacle_hitbox_scale),
            ("lanes.rider_max_speed", self.lanes.rider_max_speed),
            ("lanes.rider_accel", self.lanes.rider_accel),
        ];
        for (field, value) in positive {
            ensure!(
                value.is_finite() && value > 0.0,
                InvalidTuningSnafu {
                    reason: format!("{field} must be positive, got {value}"),
                }
            );
        }

        let non_negative = [
            ("max_reverse_speed", self.max_reverse_speed),
            ("avoidance_radius", self.avoidance_radius),
            ("safe_margin", self.safe_margin),
            ("steer_deadband_deg", self.steer_deadband_deg),
            ("min_lap_travel", self.min_lap_travel),
            ("lanes.bot_speed", self.lanes.bot_speed),
        ];
        for (field, value) in non_negative {
            ensure!(
                value.is_finite() && value >= 0.0,
                InvalidTuningSnafu {
                    reason: format!("{field} must not be negative, got {value}"),
                }
            );
        }

        ensure!(
            (0.0..=1.0).contains(&self.cruise_factor) && (0.0..=1.0).contains(&self.turn_slowdown),
            InvalidTuningSnafu {
                reason: "cruise_factor and turn_slowdown must lie in [0, 1]",
            }
        );
        ensure!(self.laps > 0, InvalidTuningSnafu { reason: "laps must be at least 1" });
        ensure!(
            self.waypoint_count > 0,
            InvalidTuningSnafu { reason: "waypoint_count must be at least 1" }
        );
        if let Some(limit) = self.time_limit_secs {
            ensure!(
                limit.is_finite() && limit > 0.0,
                InvalidTuningSnafu {
                    reason: format!("time_limit_secs must be positive, got {limit}"),
                }
            );
        }
        ensure!(
            self.lanes.bot_switch_ms.iter().all(|ms| ms.is_finite() && *ms > 0.0),
            InvalidTuningSnafu { reason: "lane bot switch intervals must be positive" }
        );

        Ok(())
    }
}
