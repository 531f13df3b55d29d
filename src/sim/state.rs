//! Session phases, input, events and render snapshots

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyId;
use super::player::MoveCommand;
use super::projectile::ProjectileId;
use crate::progress::LevelOutcome;

/// Level session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Wave being generated
    Spawning,
    /// Combat running
    Active,
    /// Every enemy destroyed
    Cleared,
    /// Outcome delivered; terminal
    Reported,
}

/// Input from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Key/button step or one joystick increment
    Move(MoveCommand),
    /// Pointer click at `aim` (arena coordinates)
    Fire { aim: Vec2, at_ms: f64 },
    /// Joystick pressed or dragged to a heading
    JoystickHold(f32),
    JoystickRelease,
}

/// Discrete events for audio/visual feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    ShotFired {
        projectile: ProjectileId,
        origin: Vec2,
        target: Vec2,
    },
    /// Double-fire "air bomb"; follows the matching `ShotFired`
    SpecialShotFired {
        projectile: ProjectileId,
        target: Vec2,
    },
    EnemyDestroyed { enemy: EnemyId, pos: Vec2 },
    LevelCleared(LevelOutcome),
    /// Time to return to level select
    LevelExit { level: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub pos: Vec2,
    pub health: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: ProjectileId,
    pub pos: Vec2,
    pub special: bool,
}

/// Read-only per-tick view for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub level: u32,
    pub phase: LevelPhase,
    pub tick: u64,
    pub player: Vec2,
    pub shoot_ready: bool,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub kills: u32,
    /// Kill tally shown in the HUD (`kills * coins_per_kill`)
    pub running_reward: u64,
}
