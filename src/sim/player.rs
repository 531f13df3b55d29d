//! Player controller
//!
//! Owns the player position, the held joystick heading and the shoot gate.
//! Keys, buttons and the joystick all go through `apply_move`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;
use crate::{clamp_to_rect, heading_to_unit};

/// Discrete step direction (screen space: up is -y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::NEG_Y,
            Direction::Down => Vec2::Y,
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
        }
    }

    /// Map a keyboard key name (arrows or WASD)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" => Some(Direction::Down),
            "ArrowLeft" | "a" | "A" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// A single movement request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MoveCommand {
    /// Key/button tap: one full step
    Step(Direction),
    /// Joystick heading in radians: one movement-tick's worth of travel
    Heading(f32),
}

/// Outcome of a fire request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireDecision {
    /// Gate closed (cooldown running)
    Rejected,
    /// Shot accepted from `origin`
    Accepted { origin: Vec2, special: bool },
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    pos: Vec2,
    min: Vec2,
    max: Vec2,
    step: f32,
    held_speed: f32,
    double_fire_window_ms: f64,
    /// Joystick heading while held
    held: Option<f32>,
    shoot_ready: bool,
    last_accepted_ms: Option<f64>,
}

impl PlayerController {
    pub fn new(tuning: &Tuning) -> Self {
        let min = tuning.arena_min();
        let max = tuning.arena_max();
        Self {
            pos: clamp_to_rect(tuning.spawn_point(), min, max),
            min,
            max,
            step: tuning.move_step,
            held_speed: tuning.joystick_speed,
            double_fire_window_ms: tuning.double_fire_window_ms,
            held: None,
            shoot_ready: true,
            last_accepted_ms: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn shoot_ready(&self) -> bool {
        self.shoot_ready
    }

    /// Move and clamp to the arena; out-of-bounds requests never fail
    pub fn apply_move(&mut self, cmd: MoveCommand) {
        let delta = match cmd {
            MoveCommand::Step(dir) => dir.unit() * self.step,
            MoveCommand::Heading(angle) if angle.is_finite() => {
                heading_to_unit(angle) * self.held_speed
            }
            MoveCommand::Heading(_) => return,
        };
        self.pos = clamp_to_rect(self.pos + delta, self.min, self.max);
    }

    pub fn hold(&mut self, angle: f32) {
        if angle.is_finite() {
            self.held = Some(angle);
        }
    }

    pub fn release(&mut self) {
        self.held = None;
    }

    /// Movement-driver step; returns false when nothing is held
    pub fn advance_held(&mut self) -> bool {
        match self.held {
            Some(angle) => {
                self.apply_move(MoveCommand::Heading(angle));
                true
            }
            None => false,
        }
    }

    /// Close the gate if open. The caller schedules `rearm` after the cooldown.
    pub fn try_fire(&mut self, now_ms: f64) -> FireDecision {
        if !self.shoot_ready {
            return FireDecision::Rejected;
        }
        let special = self
            .last_accepted_ms
            .is_some_and(|last| now_ms - last < self.double_fire_window_ms);
        self.last_accepted_ms = Some(now_ms);
        self.shoot_ready = false;
        FireDecision::Accepted {
            origin: self.pos,
            special,
        }
    }

    pub fn rearm(&mut self) {
        self.shoot_ready = true;
    }
}
