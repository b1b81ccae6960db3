//! Key state to per-tick control deltas
//!
//! Held keys each add a fixed step per tick, so opposing keys cancel out.
//! Confirm is a one-shot press, cleared once a tick has consumed it.

use crate::sim::{Controls, TickInput};
use crate::tuning::Tuning;

/// Logical keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    TurnLeft,
    TurnRight,
    Throttle,
    Brake,
    Confirm,
    Quit,
    /// Toggle the autopilot
    Autopilot,
}

/// Held driving keys of one player slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub turn_left: bool,
    pub turn_right: bool,
    pub throttle: bool,
    pub brake: bool,
}

impl KeyState {
    /// Sum the steps of every held key
    pub fn controls(&self, tuning: &Tuning) -> Controls {
        let turn = tuning.turn_step();
        let step = tuning.throttle_step;
        [
            (self.turn_left, Controls::new(turn, 0.0)),
            (self.turn_right, Controls::new(-turn, 0.0)),
            (self.throttle, Controls::new(0.0, step)),
            (self.brake, Controls::new(0.0, -step)),
        ]
        .into_iter()
        .filter(|(held, _)| *held)
        .fold(Controls::NONE, |acc, (_, c)| acc + c)
    }
}

/// Map a keyboard key name to a player slot and logical key.
///
/// Arrows drive slot 0 and WASD drive slot 1. Slot-less keys report slot 0.
pub fn key_binding(name: &str) -> Option<(usize, Key)> {
    let binding = match name {
        "ArrowLeft" => (0, Key::TurnLeft),
        "ArrowRight" => (0, Key::TurnRight),
        "ArrowUp" => (0, Key::Throttle),
        "ArrowDown" => (0, Key::Brake),
        "a" | "A" => (1, Key::TurnLeft),
        "d" | "D" => (1, Key::TurnRight),
        "w" | "W" => (1, Key::Throttle),
        "s" | "S" => (1, Key::Brake),
        " " | "Enter" => (0, Key::Confirm),
        "Escape" => (0, Key::Quit),
        "i" | "I" => (0, Key::Autopilot),
        _ => return None,
    };
    Some(binding)
}

/// Keyboard state for every local player
#[derive(Debug, Clone, Default)]
pub struct InputState {
    slots: Vec<KeyState>,
    confirm: bool,
    quit: bool,
    pub autopilot: bool,
}

impl InputState {
    pub fn new(slots: usize) -> Self {
        Self {
            slots: vec![KeyState::default(); slots],
            ..Default::default()
        }
    }

    /// Apply a key down/up event. Keys for unknown slots are ignored.
    pub fn key(&mut self, slot: usize, key: Key, down: bool) {
        match key {
            Key::Confirm => self.confirm |= down,
            Key::Quit => self.quit |= down,
            Key::Autopilot => {
                if down {
                    self.autopilot = !self.autopilot;
                    log::info!("Autopilot: {}", self.autopilot);
                }
            }
            Key::TurnLeft | Key::TurnRight | Key::Throttle | Key::Brake => {
                let Some(keys) = self.slots.get_mut(slot) else {
                    return;
                };
                match key {
                    Key::TurnLeft => keys.turn_left = down,
                    Key::TurnRight => keys.turn_right = down,
                    Key::Throttle => keys.throttle = down,
                    _ => keys.brake = down,
                }
            }
        }
    }

    pub fn slot(&self, slot: usize) -> Option<&KeyState> {
        self.slots.get(slot)
    }

    /// Build the input for the next tick and clear one-shot presses
    pub fn next_tick(&mut self, tuning: &Tuning) -> TickInput {
        let input = TickInput {
            drivers: self.slots.iter().map(|k| k.controls(tuning)).collect(),
            autopilot: self.autopilot,
            restart: self.confirm,
            quit: self.quit,
        };
        self.confirm = false;
        input
    }
}
