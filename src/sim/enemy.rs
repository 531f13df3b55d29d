//! Enemy manager
//!
//! Sole owner of the enemy population. Enemies are static targets placed in
//! a band on the far side of the arena; they leave the active set only by
//! taking lethal damage.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distance;
use crate::tuning::Tuning;

pub type EnemyId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub pos: Vec2,
    pub health: i32,
}

/// Result of `apply_damage`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// No such enemy in the active set (never spawned or already dead)
    Missing,
    Wounded { remaining: i32 },
    Killed { pos: Vec2 },
}

#[derive(Debug, Clone, Default)]
pub struct EnemyManager {
    /// Active enemies, sorted by id
    enemies: Vec<Enemy>,
    kills: u32,
    next_id: EnemyId,
}

impl EnemyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the level's wave: `wave_base + wave_per_level * level` enemies
    pub fn spawn_wave<R: Rng>(&mut self, level: u32, tuning: &Tuning, rng: &mut R) -> u32 {
        let count = tuning.wave_size(level);
        let (min_x, min_y) = tuning.spawn_min;
        let (max_x, max_y) = tuning.spawn_max;

        for _ in 0..count {
            let pos = Vec2::new(rng.random_range(min_x..max_x), rng.random_range(min_y..max_y));
            self.spawn_at(pos, tuning.enemy_health);
        }

        log::info!("Level {}: spawned wave of {} enemies", level, count);
        count
    }

    /// Place a single enemy; ids are never reused within a level
    pub fn spawn_at(&mut self, pos: Vec2, health: i32) -> EnemyId {
        let id = self.next_id;
        self.next_id += 1;
        self.enemies.push(Enemy { id, pos, health });
        id
    }

    /// Apply damage; lethal damage removes the enemy immediately
    pub fn apply_damage(&mut self, id: EnemyId, amount: i32) -> DamageOutcome {
        let Some(idx) = self.index_of(id) else {
            return DamageOutcome::Missing;
        };

        let enemy = &mut self.enemies[idx];
        enemy.health -= amount.max(0);
        if enemy.health > 0 {
            return DamageOutcome::Wounded {
                remaining: enemy.health,
            };
        }

        let dead = self.enemies.remove(idx);
        self.kills += 1;
        log::debug!("Enemy {} destroyed ({} left)", dead.id, self.enemies.len());
        DamageOutcome::Killed { pos: dead.pos }
    }

    /// Lowest-id active enemy strictly within `radius` of `pos`
    pub fn first_within(&self, pos: Vec2, radius: f32) -> Option<EnemyId> {
        self.enemies
            .iter()
            .find(|e| distance(e.pos, pos) < radius)
            .map(|e| e.id)
    }

    /// Wave is cleared once every enemy is gone and at least one was killed
    pub fn is_cleared(&self) -> bool {
        self.enemies.is_empty() && self.kills > 0
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    fn index_of(&self, id: EnemyId) -> Option<usize> {
        self.enemies.binary_search_by_key(&id, |e| e.id).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }
}
