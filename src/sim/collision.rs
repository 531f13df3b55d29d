//! Projectile vs enemy resolution
//!
//! Runs once per tick after projectiles move and before spent shots are
//! dropped. The resolver only reads positions and calls the owners'
//! mutation entry points; it never touches their containers.

use glam::Vec2;

use super::enemy::{DamageOutcome, EnemyId, EnemyManager};
use super::projectile::{ProjectileId, ProjectileSystem};

/// Something that can be hit
pub trait HitTargets {
    /// First target (stable order) strictly within `radius` of `pos`
    fn first_within(&self, pos: Vec2, radius: f32) -> Option<EnemyId>;
    fn apply_damage(&mut self, id: EnemyId, amount: i32) -> DamageOutcome;
}

/// Something that supplies shots
pub trait ShotSource {
    /// Live shots in stable order
    fn live_shots(&self) -> Vec<(ProjectileId, Vec2)>;
    fn consume(&mut self, id: ProjectileId) -> bool;
}

impl HitTargets for EnemyManager {
    fn first_within(&self, pos: Vec2, radius: f32) -> Option<EnemyId> {
        EnemyManager::first_within(self, pos, radius)
    }

    fn apply_damage(&mut self, id: EnemyId, amount: i32) -> DamageOutcome {
        EnemyManager::apply_damage(self, id, amount)
    }
}

impl ShotSource for ProjectileSystem {
    fn live_shots(&self) -> Vec<(ProjectileId, Vec2)> {
        self.iter()
            .filter(|s| s.is_live())
            .map(|s| (s.id, s.pos))
            .collect()
    }

    fn consume(&mut self, id: ProjectileId) -> bool {
        ProjectileSystem::consume(self, id)
    }
}

/// A shot striking an enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub projectile: ProjectileId,
    pub enemy: EnemyId,
    pub killed: bool,
}

/// Everything that happened during one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveReport {
    pub hits: Vec<Hit>,
    /// Enemies killed this pass, with where they died
    pub kills: Vec<(EnemyId, Vec2)>,
}

/// Pair every live shot with at most one enemy. Shots are visited in id
/// order; each takes the lowest-id enemy in range and is consumed.
pub fn resolve<T, S>(targets: &mut T, shots: &mut S, hit_radius: f32, damage: i32) -> ResolveReport
where
    T: HitTargets + ?Sized,
    S: ShotSource + ?Sized,
{
    let mut report = ResolveReport::default();

    for (shot_id, pos) in shots.live_shots() {
        let Some(enemy) = targets.first_within(pos, hit_radius) else {
            continue;
        };

        let killed = match targets.apply_damage(enemy, damage) {
            DamageOutcome::Killed { pos } => {
                report.kills.push((enemy, pos));
                true
            }
            DamageOutcome::Wounded { .. } => false,
            // Target vanished between lookup and damage; leave the shot flying
            DamageOutcome::Missing => continue,
        };

        shots.consume(shot_id);
        report.hits.push(Hit {
            projectile: shot_id,
            enemy,
            killed,
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    /// Fixed set of shots, records what was consumed
    #[derive(Default)]
    struct FakeShots {
        shots: Vec<(ProjectileId, Vec2)>,
        consumed: Vec<ProjectileId>,
    }

    impl ShotSource for FakeShots {
        fn live_shots(&self) -> Vec<(ProjectileId, Vec2)> {
            self.shots
                .iter()
                .copied()
                .filter(|(id, _)| !self.consumed.contains(id))
                .collect()
        }

        fn consume(&mut self, id: ProjectileId) -> bool {
            self.consumed.push(id);
            true
        }
    }

    #[test]
    fn test_shot_hits_one_enemy_only() {
        let mut enemies = EnemyManager::new();
        let a = enemies.spawn_at(Vec2::new(600.0, 200.0), 100);
        let b = enemies.spawn_at(Vec2::new(605.0, 200.0), 100);
        let mut shots = FakeShots {
            shots: vec![(1, Vec2::new(602.0, 200.0))],
            ..Default::default()
        };

        let report = resolve(&mut enemies, &mut shots, 15.0, 50);
        assert_eq!(
            report.hits,
            vec![Hit {
                projectile: 1,
                enemy: a,
                killed: false,
            }]
        );
        assert_eq!(shots.consumed, vec![1]);
        assert_eq!(enemies.iter().find(|e| e.id == a).unwrap().health, 50);
        assert_eq!(enemies.iter().find(|e| e.id == b).unwrap().health, 100);
    }

    #[test]
    fn test_second_shot_retargets_after_kill() {
        let mut enemies = EnemyManager::new();
        let a = enemies.spawn_at(Vec2::new(600.0, 200.0), 50);
        let b = enemies.spawn_at(Vec2::new(605.0, 200.0), 100);
        let mut shots = FakeShots {
            shots: vec![(1, Vec2::new(602.0, 200.0)), (2, Vec2::new(602.0, 200.0))],
            ..Default::default()
        };

        let report = resolve(&mut enemies, &mut shots, 15.0, 50);
        assert_eq!(report.kills, vec![(a, Vec2::new(600.0, 200.0))]);
        assert_eq!(
            report.hits[1],
            Hit {
                projectile: 2,
                enemy: b,
                killed: false,
            }
        );
        assert_eq!(enemies.kills(), 1);
    }

    #[test]
    fn test_out_of_range_is_a_miss() {
        let mut enemies = EnemyManager::new();
        enemies.spawn_at(Vec2::new(600.0, 200.0), 100);
        let mut shots = ProjectileSystem::new(&Tuning::default());
        shots.spawn(Vec2::new(580.0, 200.0), Vec2::new(590.0, 200.0), false);

        let report = resolve(&mut enemies, &mut shots, 15.0, 50);
        assert!(report.hits.is_empty());
        assert_eq!(shots.remove_expired(), 0);
    }

    #[test]
    fn test_real_systems_consume_on_hit() {
        let mut enemies = EnemyManager::new();
        enemies.spawn_at(Vec2::new(600.0, 200.0), 100);
        let mut shots = ProjectileSystem::new(&Tuning::default());
        shots.spawn(Vec2::new(590.0, 200.0), Vec2::new(600.0, 200.0), false);

        let report = resolve(&mut enemies, &mut shots, 15.0, 50);
        assert_eq!(report.hits.len(), 1);
        assert_eq!(shots.remove_expired(), 1);
    }
}
