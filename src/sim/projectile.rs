//! Projectile system
//!
//! Shots fly in a straight line from the muzzle toward a fixed aim point at
//! constant speed. They never track enemies. A shot leaves the system on the
//! tick it reaches its aim point or is consumed by a hit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;
use crate::{direction_to, distance};

pub type ProjectileId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub origin: Vec2,
    pub pos: Vec2,
    pub target: Vec2,
    /// Double-fire shot (presentation only, same physics)
    pub special: bool,
    /// Within arrival epsilon of the target; removed at end of tick
    pub arrived: bool,
    /// Hit an enemy; removed at end of tick
    pub consumed: bool,
}

impl Projectile {
    pub fn is_live(&self) -> bool {
        !self.consumed
    }

    fn is_expired(&self) -> bool {
        self.arrived || self.consumed
    }
}

#[derive(Debug, Clone)]
pub struct ProjectileSystem {
    /// In flight, sorted by id
    shots: Vec<Projectile>,
    speed: f32,
    arrival_epsilon: f32,
    cap: usize,
    next_id: ProjectileId,
}

impl ProjectileSystem {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            shots: Vec::new(),
            speed: tuning.projectile_speed,
            arrival_epsilon: tuning.arrival_epsilon,
            cap: tuning.max_projectiles.max(1),
            next_id: 1,
        }
    }

    /// Launch a shot. Always succeeds; at the cap the oldest shot is evicted.
    pub fn spawn(&mut self, origin: Vec2, target: Vec2, special: bool) -> ProjectileId {
        while self.shots.len() >= self.cap {
            let evicted = self.shots.remove(0);
            log::warn!("Projectile cap reached, evicting shot {}", evicted.id);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.shots.push(Projectile {
            id,
            origin,
            pos: origin,
            target,
            special,
            arrived: false,
            consumed: false,
        });
        id
    }

    /// Integrate one tick. Shots already inside the arrival epsilon are
    /// marked `arrived` instead of moving.
    pub fn advance_all(&mut self) {
        for shot in self.shots.iter_mut().filter(|s| !s.is_expired()) {
            if distance(shot.pos, shot.target) < self.arrival_epsilon {
                shot.arrived = true;
            } else {
                shot.pos += direction_to(shot.pos, shot.target) * self.speed;
            }
        }
    }

    /// Mark a shot as spent by a hit; returns false if it was already spent
    pub fn consume(&mut self, id: ProjectileId) -> bool {
        match self.shots.iter_mut().find(|s| s.id == id) {
            Some(shot) if !shot.consumed => {
                shot.consumed = true;
                true
            }
            _ => false,
        }
    }

    /// Drop every arrived or consumed shot; returns how many were removed
    pub fn remove_expired(&mut self) -> usize {
        let before = self.shots.len();
        self.shots.retain(|s| !s.is_expired());
        before - self.shots.len()
    }

    pub fn clear(&mut self) {
        self.shots.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.shots.iter()
    }
}
