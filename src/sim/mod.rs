//! Deterministic simulation module
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod ellipse;
pub mod obstacle;
pub mod opponent;
pub mod progress;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod track;
pub mod vehicle;

pub use collision::{Aabb, CrashCause, detect_crashes};
pub use ellipse::Ellipse;
pub use obstacle::{Obstacle, generate_obstacles};
pub use opponent::{LaneBot, PilotDecision, PilotState, generate_waypoints, pilot_controls};
pub use progress::LapTracker;
pub use snapshot::{RaceSnapshot, VehicleView};
pub use state::{LossReason, Outcome, RaceEvent, RaceMode, RacePhase, RaceRecord, RaceState};
pub use tick::{TickInput, TickOutcome, tick};
pub use track::{EllipseTrack, LanePosition, LaneTrack, Segment, Track};
pub use vehicle::{Controls, SpeedLimits, Vehicle, VehicleKind, VehicleStatus};
