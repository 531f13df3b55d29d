//! Data-driven game balance
//!
//! Every gameplay number lives here so a JSON document can retune a build
//! without touching the simulation. Missing keys fall back to `consts`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SessionError;
use crate::levels;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Timing ===
    /// Combat and movement driver period
    pub tick_ms: f64,
    /// Maximum substeps per frame
    pub max_substeps: u32,

    // === Arena ===
    pub arena_width: f32,
    pub arena_min_y: f32,
    pub arena_max_y: f32,

    // === Player ===
    pub player_spawn: (f32, f32),
    pub move_step: f32,
    pub joystick_speed: f32,
    pub shot_cooldown_ms: f64,
    pub double_fire_window_ms: f64,

    // === Enemies ===
    pub wave_base: u32,
    pub wave_per_level: u32,
    pub spawn_min: (f32, f32),
    pub spawn_max: (f32, f32),
    pub enemy_health: i32,

    // === Projectiles ===
    pub projectile_speed: f32,
    pub arrival_epsilon: f32,
    pub hit_radius: f32,
    pub hit_damage: i32,
    pub max_projectiles: usize,
    pub max_queued_inputs: usize,

    // === Rewards ===
    pub coins_per_kill: u64,
    pub level_clear_bonus: u64,
    pub exit_delay_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            max_substeps: MAX_SUBSTEPS,

            arena_width: ARENA_WIDTH,
            arena_min_y: ARENA_MIN_Y,
            arena_max_y: ARENA_MAX_Y,

            player_spawn: (PLAYER_SPAWN_X, PLAYER_SPAWN_Y),
            move_step: MOVE_STEP,
            joystick_speed: JOYSTICK_SPEED,
            shot_cooldown_ms: SHOT_COOLDOWN_MS,
            double_fire_window_ms: DOUBLE_FIRE_WINDOW_MS,

            wave_base: WAVE_BASE,
            wave_per_level: WAVE_PER_LEVEL,
            spawn_min: (SPAWN_MIN_X, SPAWN_MIN_Y),
            spawn_max: (SPAWN_MAX_X, SPAWN_MAX_Y),
            enemy_health: ENEMY_HEALTH,

            projectile_speed: PROJECTILE_SPEED,
            arrival_epsilon: ARRIVAL_EPSILON,
            hit_radius: HIT_RADIUS,
            hit_damage: HIT_DAMAGE,
            max_projectiles: MAX_PROJECTILES,
            max_queued_inputs: MAX_QUEUED_INPUTS,

            coins_per_kill: COINS_PER_KILL,
            level_clear_bonus: LEVEL_CLEAR_BONUS,
            exit_delay_ms: EXIT_DELAY_MS,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SessionError> {
        fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), SessionError> {
            if ok {
                Ok(())
            } else {
                Err(SessionError::InvalidTuning { field, reason })
            }
        }

        check(self.tick_ms > 0.0, "tick_ms", "must be positive")?;
        check(self.max_substeps > 0, "max_substeps", "must be positive")?;
        check(self.arena_width > 0.0, "arena_width", "must be positive")?;
        check(
            self.arena_min_y < self.arena_max_y,
            "arena_min_y",
            "must be below arena_max_y",
        )?;
        check(self.move_step > 0.0, "move_step", "must be positive")?;
        check(self.joystick_speed > 0.0, "joystick_speed", "must be positive")?;
        check(self.shot_cooldown_ms >= 0.0, "shot_cooldown_ms", "must not be negative")?;
        check(
            self.spawn_min.0 < self.spawn_max.0 && self.spawn_min.1 < self.spawn_max.1,
            "spawn_min",
            "must be below spawn_max on both axes",
        )?;
        check(self.enemy_health > 0, "enemy_health", "must be positive")?;
        check(self.projectile_speed > 0.0, "projectile_speed", "must be positive")?;
        // A step longer than twice the epsilon could jump over the arrival window forever
        check(
            self.arrival_epsilon > 0.0 && self.projectile_speed < 2.0 * self.arrival_epsilon,
            "arrival_epsilon",
            "must be positive and more than half the projectile speed",
        )?;
        check(self.hit_radius > 0.0, "hit_radius", "must be positive")?;
        check(self.hit_damage > 0, "hit_damage", "must be positive")?;
        check(self.max_projectiles > 0, "max_projectiles", "must be positive")?;
        check(self.max_queued_inputs > 0, "max_queued_inputs", "must be positive")?;
        Ok(())
    }

    /// Lower-left corner of the player arena
    pub fn arena_min(&self) -> Vec2 {
        Vec2::new(0.0, self.arena_min_y)
    }

    /// Upper-right corner of the player arena
    pub fn arena_max(&self) -> Vec2 {
        Vec2::new(self.arena_width, self.arena_max_y)
    }

    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.player_spawn.0, self.player_spawn.1)
    }

    /// Number of enemies in the wave for `level`, rounded up when the level
    /// number is fractional
    pub fn wave_size(&self, level: u32) -> u32 {
        let scaled = self.wave_per_level as f32 * levels::wave_level(level);
        self.wave_base + scaled.ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.wave_size(1), 7);
        assert_eq!(tuning.wave_size(10), 25);
        assert_eq!(tuning.wave_size(levels::FINALE_PART_TWO), 26);
    }

    #[test]
    fn test_partial_json_overrides() {
        let tuning = Tuning::from_json(r#"{ "shot_cooldown_ms": 150.0, "wave_base": 1 }"#).unwrap();
        assert_eq!(tuning.shot_cooldown_ms, 150.0);
        assert_eq!(tuning.wave_base, 1);
        assert_eq!(tuning.hit_radius, HIT_RADIUS);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "projectile_speed": 0.0 }"#).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTuning { field: "projectile_speed", .. }));

        let err = Tuning::from_json(r#"{ "projectile_speed": 40.0 }"#).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTuning { field: "arrival_epsilon", .. }));

        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SessionError::TuningParse(_)));
    }
}
