//! Fixed timestep simulation tick
//!
//! One call advances every car exactly once, runs one collision pass and one
//! progress pass, then settles the race outcome.

use glam::Vec2;

use super::collision::{CrashCause, detect_crashes};
use super::opponent::pilot_controls;
use super::state::{LossReason, Outcome, RaceEvent, RacePhase, RaceRecord, RaceState};
use super::vehicle::{Controls, VehicleKind};
use crate::bearing;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Control deltas per local player slot
    pub drivers: Vec<Controls>,
    /// Player cars drive themselves
    pub autopilot: bool,
    /// Confirm/restart (only acted on once the race is over)
    pub restart: bool,
    pub quit: bool,
}

/// What the loop driving `tick` should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// Build a fresh race
    Restart,
    /// Leave the loop
    Quit,
}

/// Advance the race by one fixed timestep
pub fn tick(state: &mut RaceState, input: &TickInput, dt: f32) -> TickOutcome {
    if input.quit {
        log::info!("Quit requested at tick {}", state.time_ticks);
        return TickOutcome::Quit;
    }

    match state.phase {
        RacePhase::Racing => {}
        RacePhase::Finished(outcome) => {
            state.phase = RacePhase::AwaitingRestart(outcome);
            return restart_or_continue(input);
        }
        RacePhase::AwaitingRestart(_) => return restart_or_continue(input),
    }

    state.time_ticks += 1;
    state.elapsed += dt;

    steer_vehicles(state, input);
    move_vehicles(state, dt);
    apply_crashes(state);
    let finishers = update_progress(state);
    settle_outcome(state, &finishers);

    TickOutcome::Continue
}

fn restart_or_continue(input: &TickInput) -> TickOutcome {
    if input.restart {
        TickOutcome::Restart
    } else {
        TickOutcome::Continue
    }
}

/// Accumulate this tick's controls on every running car
fn steer_vehicles(state: &mut RaceState, input: &TickInput) {
    let positions: Vec<(u32, Vec2)> = state.vehicles.iter().map(|v| (v.id, v.pos)).collect();
    let turn_step = state.tuning.turn_step();
    let throttle_step = state.tuning.throttle_step;

    let RaceState {
        vehicles,
        waypoints,
        tuning,
        track,
        events,
        ..
    } = state;
    let circuit = track.as_ellipse();

    for vehicle in vehicles.iter_mut() {
        if vehicle.status.is_out() {
            continue;
        }

        let pilot = match vehicle.kind {
            VehicleKind::WaypointBot(pilot) => Some(pilot),
            VehicleKind::Player { pilot, .. } if input.autopilot => Some(pilot),
            _ => None,
        };

        if let (Some(mut pilot), Some(circuit)) = (pilot, circuit) {
            let others: Vec<Vec2> = positions
                .iter()
                .filter(|(id, _)| *id != vehicle.id)
                .map(|(_, pos)| *pos)
                .collect();
            let decision = pilot_controls(vehicle, &mut pilot, waypoints, circuit, &others, tuning);
            if let Some(next) = decision.captured {
                log::debug!("Car {} captured a waypoint, next {}", vehicle.id, next);
                events.push(RaceEvent::WaypointCaptured {
                    vehicle: vehicle.id,
                    next,
                });
            }
            vehicle.steer(decision.controls);
            if let VehicleKind::WaypointBot(p) | VehicleKind::Player { pilot: p, .. } = &mut vehicle.kind {
                *p = pilot;
            }
            continue;
        }

        let controls = match vehicle.kind {
            // Riders only read the signs: turn right rides forward
            VehicleKind::LanePlayer { .. } if input.autopilot => Controls::new(-turn_step, throttle_step),
            VehicleKind::Player { slot, .. } | VehicleKind::LanePlayer { slot, .. } => {
                input.drivers.get(slot).copied().unwrap_or_default()
            }
            VehicleKind::LaneBot(_) | VehicleKind::WaypointBot(_) => Controls::NONE,
        };
        vehicle.steer(controls);
    }
}

/// Apply one motion step to every running car
fn move_vehicles(state: &mut RaceState, dt: f32) {
    let dt_ms = dt * 1000.0;
    let RaceState {
        vehicles,
        track,
        events,
        ..
    } = state;
    let lanes = track.as_lanes();

    for vehicle in vehicles.iter_mut() {
        if vehicle.status.is_out() {
            continue;
        }

        if let VehicleKind::LaneBot(bot) = &mut vehicle.kind {
            let Some(lanes) = lanes else { continue };
            let switched = bot.advance(lanes, dt_ms);
            let (ride, forward) = (bot.ride, bot.forward);
            vehicle.place_on_lane(lanes, ride, forward);
            if let Some(lane) = switched {
                log::debug!("Car {} switched to lane {}", vehicle.id, lane);
                events.push(RaceEvent::LaneSwitched {
                    vehicle: vehicle.id,
                    lane,
                });
            }
            continue;
        }

        match lanes {
            Some(lanes) if matches!(vehicle.kind, VehicleKind::LanePlayer { .. }) => vehicle.ride(lanes),
            _ => vehicle.integrate(),
        }
    }
}

/// Detect against post-movement positions, then apply the transitions
fn apply_crashes(state: &mut RaceState) {
    let crashes = detect_crashes(&state.vehicles, &state.track, &state.obstacles, state.car_collisions);

    for (vehicle, crash) in state.vehicles.iter_mut().zip(crashes) {
        let Some(cause) = crash else { continue };
        if vehicle.is_player() {
            if vehicle.crash(cause) {
                log::info!("Car {} crashed: {:?}", vehicle.id, cause);
                state.events.push(RaceEvent::Crashed {
                    vehicle: vehicle.id,
                    cause,
                });
            }
        } else if vehicle.explode(cause) {
            log::info!("Car {} exploded: {:?}", vehicle.id, cause);
            state.events.push(RaceEvent::Exploded {
                vehicle: vehicle.id,
                cause,
            });
        }
    }
}

/// Returns the indices of cars that completed their final lap this tick
fn update_progress(state: &mut RaceState) -> Vec<usize> {
    let center = state.track.center();
    let mut finishers = Vec::new();

    for (i, (vehicle, tracker)) in state.vehicles.iter().zip(state.progress.iter_mut()).enumerate() {
        if vehicle.status.is_out() {
            continue;
        }
        if !tracker.update(bearing(center, vehicle.pos), vehicle.speed != 0.0) {
            continue;
        }

        log::info!("Car {} completed lap {}", vehicle.id, tracker.laps);
        state.events.push(RaceEvent::LapCompleted {
            vehicle: vehicle.id,
            laps: tracker.laps,
        });
        if vehicle.contends() && tracker.laps >= state.tuning.laps {
            finishers.push(i);
        }
    }
    finishers
}

/// Decide the outcome, at most once per race
fn settle_outcome(state: &mut RaceState, finishers: &[usize]) {
    let players_out = state.players().all(|v| v.status.is_out());

    let outcome = if let Some(slot) = finishers.iter().find_map(|&i| state.vehicles[i].player_slot()) {
        Outcome::Win { slot }
    } else if players_out {
        let collided = state
            .players()
            .any(|v| matches!(v.status.cause(), Some(CrashCause::Vehicle { .. })));
        Outcome::Loss(if collided {
            LossReason::Collision
        } else {
            LossReason::Crashed
        })
    } else if !finishers.is_empty() {
        Outcome::Loss(LossReason::Beaten)
    } else if state.remaining_time().is_some_and(|left| left <= 0.0) {
        Outcome::Loss(LossReason::TimeExpired)
    } else {
        return;
    };

    let record = RaceRecord {
        elapsed_time: state.elapsed,
        outcome,
        lap_count: state.player_laps(),
    };
    log::info!(
        "Race ended after {:.2}s ({} ticks): {:?}",
        state.elapsed,
        state.time_ticks,
        outcome
    );
    state.phase = RacePhase::Finished(outcome);
    state.events.push(RaceEvent::RaceEnded(record));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::RaceMode;
    use crate::sim::vehicle::VehicleStatus;
    use crate::tuning::Tuning;

    fn circuit(seed: u64) -> RaceState {
        RaceState::new(RaceMode::Circuit, Tuning::default(), seed).expect("circuit")
    }

    fn race_endings(events: &[RaceEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, RaceEvent::RaceEnded(_)))
            .count()
    }

    /// Park a car on the inner field
    fn park_off_track(state: &mut RaceState, index: usize) {
        let center = state.track.center();
        let vehicle = &mut state.vehicles[index];
        vehicle.pos = center;
        vehicle.speed = 0.0;
        vehicle.integrate();
    }

    #[test]
    fn test_quit_skips_all_work() {
        let mut state = circuit(1);
        let input = TickInput {
            quit: true,
            autopilot: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &input, SIM_DT), TickOutcome::Quit);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.elapsed, 0.0);
    }

    #[test]
    fn test_player_drives_from_driver_slot() {
        let mut state = circuit(1);
        let input = TickInput {
            drivers: vec![Controls::new(0.0, 2.0)],
            ..Default::default()
        };
        let start = state.vehicles[0].pos;
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.vehicles[0].speed, 2.0);
        // Heading -90° drives to the right
        assert!((state.vehicles[0].pos - start - Vec2::new(2.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_time_expiry_fires_once() {
        let mut state = circuit(5);
        state.elapsed = 60.0 - SIM_DT / 2.0;
        let idle = TickInput::default();

        assert_eq!(tick(&mut state, &idle, SIM_DT), TickOutcome::Continue);
        assert_eq!(state.remaining_time(), Some(0.0));
        assert_eq!(state.phase, RacePhase::Finished(Outcome::Loss(LossReason::TimeExpired)));

        for _ in 0..5 {
            tick(&mut state, &idle, SIM_DT);
        }
        assert_eq!(
            state.phase,
            RacePhase::AwaitingRestart(Outcome::Loss(LossReason::TimeExpired))
        );
        assert_eq!(race_endings(&state.drain_events()), 1);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &restart, SIM_DT), TickOutcome::Restart);
    }

    #[test]
    fn test_player_crash_ends_race_once() {
        let mut state = circuit(9);
        park_off_track(&mut state, 0);
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.phase, RacePhase::Finished(Outcome::Loss(LossReason::Crashed)));
        let events = state.drain_events();
        assert!(events.contains(&RaceEvent::Crashed {
            vehicle: state.vehicles[0].id,
            cause: CrashCause::OffTrack,
        }));
        assert_eq!(race_endings(&events), 1);

        tick(&mut state, &TickInput::default(), SIM_DT);
        let events = state.drain_events();
        assert!(events.is_empty());
    }

    #[test]
    fn test_bot_explodes_race_goes_on() {
        let mut state = circuit(9);
        park_off_track(&mut state, 1);
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(matches!(state.vehicles[1].status, VehicleStatus::Exploded(CrashCause::OffTrack)));
        assert_eq!(state.phase, RacePhase::Racing);

        let frozen = state.vehicles[1].pos;
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.vehicles[1].pos, frozen);
    }

    #[test]
    fn test_car_contact_crashes_both() {
        let mut state = circuit(9);
        // Drive the player into the bot, which stands still at its spawn
        state.vehicles[1].kind = VehicleKind::LaneBot(crate::sim::LaneBot::new(0, 0.0, 0.0, true, 1e9));
        state.vehicles[0].pos.x = state.vehicles[1].pos.x - 32.0;
        state.vehicles[0].integrate();
        let input = TickInput {
            drivers: vec![Controls::new(0.0, 1.0)],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        assert_eq!(
            state.vehicles[0].status,
            VehicleStatus::Crashed(CrashCause::Vehicle { id: state.vehicles[1].id })
        );
        assert!(state.vehicles[1].status.is_out());
        assert_eq!(state.phase, RacePhase::Finished(Outcome::Loss(LossReason::Collision)));
    }

    #[test]
    fn test_bot_finishing_first_beats_player() {
        let tuning = Tuning {
            laps: 2,
            ..Default::default()
        };
        let mut state = RaceState::new(RaceMode::Circuit, tuning, 9).expect("circuit");
        state.obstacles.clear();
        let center = state.track.center();

        // Player waits on the south straight, far from the line
        let player = &mut state.vehicles[0];
        player.pos = Vec2::new(center.x, center.y + 950.0);
        player.integrate();

        // Bot sits just before the line on its last lap, already at speed
        let bot_start = Vec2::new(center.x - 3.0, state.vehicles[1].pos.y);
        let bot = &mut state.vehicles[1];
        bot.pos = bot_start;
        bot.integrate();
        bot.speed = 8.0;
        let bot_id = bot.id;
        let tracker = &mut state.progress[1];
        tracker.last_bearing = bearing(center, bot_start);
        tracker.started = true;
        tracker.travel = std::f32::consts::TAU;
        tracker.laps = 1;

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.phase, RacePhase::Finished(Outcome::Loss(LossReason::Beaten)));
        let events = state.drain_events();
        assert!(events.contains(&RaceEvent::LapCompleted {
            vehicle: bot_id,
            laps: 2,
        }));
        assert_eq!(race_endings(&events), 1);
        let record = events.iter().find_map(|e| match e {
            RaceEvent::RaceEnded(record) => Some(*record),
            _ => None,
        });
        assert_eq!(record.map(|r| r.lap_count), Some(0));

        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(race_endings(&state.drain_events()), 0);
    }

    #[test]
    fn test_lane_autopilot_wins() {
        let mut state = RaceState::new(RaceMode::Lanes, Tuning::default(), 1).expect("lanes");
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut switches = 0;
        for _ in 0..3000 {
            tick(&mut state, &input, SIM_DT);
            switches += state
                .drain_events()
                .iter()
                .filter(|e| matches!(e, RaceEvent::LaneSwitched { .. }))
                .count();
            if state.outcome().is_some() {
                break;
            }
        }
        // The inner rider covers the lap in fewer radians per unit of speed
        assert_eq!(state.outcome(), Some(Outcome::Win { slot: 0 }));
        assert_eq!(state.player_laps(), 1);
        assert!(switches > 0);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = circuit(99999);
        let mut state2 = circuit(99999);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        for _ in 0..300 {
            tick(&mut state1, &input, SIM_DT);
            tick(&mut state2, &input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.phase, state2.phase);
        for (a, b) in state1.vehicles.iter().zip(&state2.vehicles) {
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.status, b.status);
        }
    }
}
