//! End-to-end race scenarios through the public tick API

use ellipse_racer::consts::SIM_DT;
use ellipse_racer::sim::{
    Aabb, Controls, CrashCause, EllipseTrack, LossReason, Obstacle, Outcome, RaceEvent, RaceMode,
    RacePhase, RaceState, TickInput, TickOutcome, Track, VehicleKind, tick,
};
use ellipse_racer::{RaceStats, Tuning};
use glam::Vec2;

fn autopilot() -> TickInput {
    TickInput {
        autopilot: true,
        ..Default::default()
    }
}

fn run_until_over(state: &mut RaceState, input: &TickInput, max_ticks: usize) -> Vec<RaceEvent> {
    let mut events = Vec::new();
    for _ in 0..max_ticks {
        tick(state, input, SIM_DT);
        events.extend(state.drain_events());
        if state.outcome().is_some() {
            break;
        }
    }
    events
}

fn records(events: &[RaceEvent]) -> Vec<ellipse_racer::sim::RaceRecord> {
    events
        .iter()
        .filter_map(|e| match e {
            RaceEvent::RaceEnded(record) => Some(*record),
            _ => None,
        })
        .collect()
}

#[test]
fn test_box_below_center_is_on_track() {
    let track = Track::Ellipse(
        EllipseTrack::new(
            Vec2::new(2000.0, 1000.0),
            Vec2::new(1600.0, 800.0),
            Vec2::new(2200.0, 1100.0),
        )
        .expect("valid circuit"),
    );
    let car = Aabb::from_center_size(Vec2::new(2000.0, 1900.0), Vec2::splat(20.0));
    assert!(track.is_on_track(&car));

    // Pushed onto the infield it is flagged
    let car = Aabb::from_center_size(Vec2::new(2000.0, 1795.0), Vec2::splat(20.0));
    assert!(!track.is_on_track(&car));
}

#[test]
fn test_single_waypoint_under_the_bot_keeps_capturing() {
    let mut state = RaceState::new(RaceMode::Circuit, Tuning::default(), 4).expect("circuit");
    let bot_pos = state.vehicles[1].pos;
    state.waypoints = vec![bot_pos];
    if let VehicleKind::WaypointBot(pilot) = &mut state.vehicles[1].kind {
        pilot.cursor = 0;
    }
    let bot_id = state.vehicles[1].id;

    for _ in 0..3 {
        tick(&mut state, &TickInput::default(), SIM_DT);
        let events = state.drain_events();
        assert!(events.contains(&RaceEvent::WaypointCaptured {
            vehicle: bot_id,
            next: 0,
        }));
    }
    let VehicleKind::WaypointBot(pilot) = &state.vehicles[1].kind else {
        panic!("bot kind changed");
    };
    assert_eq!(pilot.cursor, 0);
}

#[test]
fn test_one_pixel_overlap_is_contact() {
    let a = Aabb::from_center_size(Vec2::new(100.0, 100.0), Vec2::new(32.0, 20.0));
    let touching = Aabb::from_center_size(Vec2::new(132.0, 100.0), Vec2::new(32.0, 20.0));
    let overlapping = Aabb::from_center_size(Vec2::new(131.0, 100.0), Vec2::new(32.0, 20.0));
    assert!(!a.overlaps(&touching));
    assert!(a.overlaps(&overlapping));
}

#[test]
fn test_expired_clock_is_recorded_as_one_defeat() {
    let mut state = RaceState::new(RaceMode::Circuit, Tuning::default(), 11).expect("circuit");
    state.elapsed = 60.0;
    let events = run_until_over(&mut state, &TickInput::default(), 1);
    let ended = records(&events);
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].outcome, Outcome::Loss(LossReason::TimeExpired));

    // Lingering in the terminal phase never reports again
    for _ in 0..10 {
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(records(&state.drain_events()).is_empty());
    }

    let mut stats = RaceStats::new();
    stats.record(&ended[0]);
    assert_eq!(stats.defeats, 1);
    assert_eq!(stats.best_time, None);
}

#[test]
fn test_lane_race_autopilot_wins_and_sets_best_time() {
    let mut state = RaceState::new(RaceMode::Lanes, Tuning::default(), 2).expect("lanes");
    let events = run_until_over(&mut state, &autopilot(), 5000);

    let ended = records(&events);
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].outcome, Outcome::Win { slot: 0 });
    assert_eq!(ended[0].lap_count, 1);
    // Roughly one lap of a 300-radius lane at 3 units per tick
    assert!(ended[0].elapsed_time > 15.0 && ended[0].elapsed_time < 30.0);

    let mut stats = RaceStats::new();
    assert!(stats.record(&ended[0]));
    assert_eq!(stats.victories, 1);
    assert_eq!(stats.best_time, Some(ended[0].elapsed_time));
}

#[test]
fn test_reversing_clears_completion_but_keeps_laps() {
    let tuning = Tuning {
        laps: 2,
        ..Default::default()
    };
    let mut state = RaceState::new(RaceMode::Lanes, tuning, 3).expect("lanes");
    let forward = TickInput {
        drivers: vec![Controls::new(-0.1, 1.0), Controls::NONE],
        ..Default::default()
    };
    let backward = TickInput {
        drivers: vec![Controls::new(0.1, 1.0), Controls::NONE],
        ..Default::default()
    };

    for _ in 0..800 {
        tick(&mut state, &forward, SIM_DT);
    }
    assert_eq!(state.progress[0].laps, 1);
    assert!(state.progress[0].completion > 0.0);
    assert_eq!(state.phase, RacePhase::Racing);

    for _ in 0..3 {
        tick(&mut state, &backward, SIM_DT);
    }
    assert_eq!(state.progress[0].completion, 0.0);
    assert_eq!(state.progress[0].laps, 1);
}

#[test]
fn test_obstacle_hit_ends_race() {
    let mut state = RaceState::new(RaceMode::Circuit, Tuning::default(), 12).expect("circuit");
    // One obstacle in the middle of the south straight
    let spot = Vec2::new(2000.0, 1950.0);
    state.obstacles = vec![Obstacle::new(99, spot, 60.0, 0.6)];
    state.vehicles[0].pos = spot;
    state.vehicles[0].integrate();
    let player_id = state.vehicles[0].id;

    let events = run_until_over(&mut state, &TickInput::default(), 1);

    let cause = CrashCause::Obstacle { id: 99 };
    assert!(events.contains(&RaceEvent::Crashed {
        vehicle: player_id,
        cause,
    }));
    assert_eq!(state.vehicles[0].status.cause(), Some(cause));
    let ended = records(&events);
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].outcome, Outcome::Loss(LossReason::Crashed));
}

#[test]
fn test_crashed_player_stays_frozen() {
    let mut state = RaceState::new(RaceMode::Circuit, Tuning::default(), 6).expect("circuit");
    // Point north and floor it into the outer wall
    state.vehicles[0].heading = 0.0;
    let input = TickInput {
        drivers: vec![Controls::new(0.0, 2.0)],
        ..Default::default()
    };
    let events = run_until_over(&mut state, &input, 400);
    assert!(events.iter().any(|e| matches!(e, RaceEvent::Crashed { .. })));
    assert!(state.vehicles[0].status.is_out());

    let (pos, heading) = (state.vehicles[0].pos, state.vehicles[0].heading);
    for _ in 0..20 {
        tick(&mut state, &input, SIM_DT);
    }
    assert_eq!(state.vehicles[0].pos, pos);
    assert_eq!(state.vehicles[0].heading, heading);
}

#[test]
fn test_restart_builds_a_fresh_race() {
    let mut state = RaceState::new(RaceMode::Circuit, Tuning::default(), 8).expect("circuit");
    state.elapsed = 60.0;
    run_until_over(&mut state, &TickInput::default(), 1);

    let restart = TickInput {
        restart: true,
        ..Default::default()
    };
    assert_eq!(tick(&mut state, &restart, SIM_DT), TickOutcome::Restart);

    let fresh = RaceState::new(state.mode, state.tuning.clone(), state.seed + 1).expect("circuit");
    assert_eq!(fresh.phase, RacePhase::Racing);
    assert_eq!(fresh.time_ticks, 0);
    assert_eq!(fresh.remaining_time(), Some(60.0));
}

#[test]
fn test_same_seed_same_race() {
    let mut a = RaceState::new(RaceMode::Circuit, Tuning::default(), 77).expect("circuit");
    let mut b = RaceState::new(RaceMode::Circuit, Tuning::default(), 77).expect("circuit");
    run_until_over(&mut a, &autopilot(), 600);
    run_until_over(&mut b, &autopilot(), 600);

    let a = serde_json::to_string(&a.snapshot()).expect("snapshot json");
    let b = serde_json::to_string(&b.snapshot()).expect("snapshot json");
    assert_eq!(a, b);
}
