//! Strikeforce - arcade combat core for the browser mini-game
//!
//! Core modules:
//! - `sim`: Level simulation (player, enemies, projectiles, collisions, session)
//! - `runner`: Fixed-step drivers that feed the session from frame time
//! - `levels`: Level catalog and unlock rules
//! - `progress`: User progress record handed back after a level
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod levels;
pub mod progress;
pub mod runner;
pub mod sim;
pub mod tuning;

pub use error::SessionError;
pub use progress::{LevelOutcome, ProgressSink, UserProgress};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation period (~60 Hz)
    pub const TICK_MS: f64 = 16.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Player-reachable arena (x in [0, ARENA_WIDTH], y in [ARENA_MIN_Y, ARENA_MAX_Y])
    pub const ARENA_WIDTH: f32 = 400.0;
    pub const ARENA_MIN_Y: f32 = 50.0;
    pub const ARENA_MAX_Y: f32 = 500.0;

    /// Player spawn point
    pub const PLAYER_SPAWN_X: f32 = 50.0;
    pub const PLAYER_SPAWN_Y: f32 = 400.0;
    /// Distance covered by one discrete step (key/button tap)
    pub const MOVE_STEP: f32 = 10.0;
    /// Distance covered per movement tick while the joystick is held
    pub const JOYSTICK_SPEED: f32 = 3.0;

    /// Shoot gate cooldown
    pub const SHOT_COOLDOWN_MS: f64 = 600.0;
    /// Two accepted shots closer than this make the second one special
    pub const DOUBLE_FIRE_WINDOW_MS: f64 = 300.0;

    /// Enemy wave: count = WAVE_BASE + WAVE_PER_LEVEL * level
    pub const WAVE_BASE: u32 = 5;
    pub const WAVE_PER_LEVEL: u32 = 2;
    /// Spawn band on the far side of the arena
    pub const SPAWN_MIN_X: f32 = 600.0;
    pub const SPAWN_MAX_X: f32 = 750.0;
    pub const SPAWN_MIN_Y: f32 = 100.0;
    pub const SPAWN_MAX_Y: f32 = 500.0;
    pub const ENEMY_HEALTH: i32 = 100;

    /// Projectile ballistics (units per tick)
    pub const PROJECTILE_SPEED: f32 = 8.0;
    pub const ARRIVAL_EPSILON: f32 = 10.0;
    pub const HIT_RADIUS: f32 = 15.0;
    pub const HIT_DAMAGE: i32 = 50;
    /// Live projectile cap (oldest evicted beyond this)
    pub const MAX_PROJECTILES: usize = 32;
    /// Buffered input cap (oldest dropped beyond this)
    pub const MAX_QUEUED_INPUTS: usize = 64;

    /// Rewards
    pub const COINS_PER_KILL: u64 = 100;
    pub const LEVEL_CLEAR_BONUS: u64 = 500;
    /// Delay between level report and the automatic return to level select
    pub const EXIT_DELAY_MS: f64 = 2000.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector pointing from `from` toward `to` (zero if they coincide)
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Unit vector for a heading in radians (screen space, y grows downward)
#[inline]
pub fn heading_to_unit(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Clamp a point into the axis-aligned rectangle [min, max]
#[inline]
pub fn clamp_to_rect(pos: Vec2, min: Vec2, max: Vec2) -> Vec2 {
    pos.clamp(min, max)
}
