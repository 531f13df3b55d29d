//! Level session
//!
//! Orchestrates one level: spawns the wave, drains input, advances shots,
//! resolves hits, detects the clear and hands the outcome to the progress
//! collaborator exactly once.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision;
use super::enemy::EnemyManager;
use super::player::{FireDecision, MoveCommand, PlayerController};
use super::projectile::{ProjectileId, ProjectileSystem};
use super::state::{EnemyView, GameEvent, InputEvent, LevelPhase, ProjectileView, Snapshot};
use super::timers::{CancelToken, TimerAction, TimerQueue};
use crate::error::SessionError;
use crate::levels;
use crate::progress::{LevelOutcome, ProgressSink, UserProgress};
use crate::tuning::Tuning;

pub struct LevelSession<P: ProgressSink> {
    level: u32,
    phase: LevelPhase,
    tuning: Tuning,
    player: PlayerController,
    enemies: EnemyManager,
    projectiles: ProjectileSystem,
    timers: TimerQueue,
    cancel: CancelToken,
    inputs: VecDeque<InputEvent>,
    events: Vec<GameEvent>,
    sink: P,
    /// Session clock (ms), never moves backwards
    clock_ms: f64,
    /// Latest timestamp the combat driver ticked at
    last_tick_ms: f64,
    tick_count: u64,
    kills: u32,
    outcome: Option<LevelOutcome>,
    exit_requested: bool,
}

/// Session entry point: validate the level against the catalog and the
/// user's unlocks, then start it
pub fn select_level<P: ProgressSink>(
    level: u32,
    progress: &UserProgress,
    seed: u64,
    tuning: Tuning,
    sink: P,
) -> Result<LevelSession<P>, SessionError> {
    levels::ensure_playable(level, progress)?;
    tuning.validate()?;
    Ok(LevelSession::new(level, seed, tuning, sink))
}

impl<P: ProgressSink> LevelSession<P> {
    /// Start a level without catalog checks
    pub fn new(level: u32, seed: u64, tuning: Tuning, sink: P) -> Self {
        let mut session = Self {
            level,
            phase: LevelPhase::Spawning,
            player: PlayerController::new(&tuning),
            enemies: EnemyManager::new(),
            projectiles: ProjectileSystem::new(&tuning),
            timers: TimerQueue::new(),
            cancel: CancelToken::new(),
            inputs: VecDeque::new(),
            events: Vec::new(),
            sink,
            clock_ms: 0.0,
            last_tick_ms: 0.0,
            tick_count: 0,
            kills: 0,
            outcome: None,
            exit_requested: false,
            tuning,
        };

        let mut rng = Pcg32::seed_from_u64(seed);
        session.enemies.spawn_wave(level, &session.tuning, &mut rng);
        session.set_phase(LevelPhase::Active);
        session
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn enemies(&self) -> &EnemyManager {
        &self.enemies
    }

    pub fn projectiles(&self) -> &ProjectileSystem {
        &self.projectiles
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn outcome(&self) -> Option<&LevelOutcome> {
        self.outcome.as_ref()
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    /// Torn down via `exit_level`
    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// True once the post-clear delay elapsed or the level was exited
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    fn accepts_input(&self) -> bool {
        self.phase == LevelPhase::Active && !self.cancel.is_cancelled()
    }

    fn set_phase(&mut self, phase: LevelPhase) {
        log::debug!("Level {}: {:?} -> {:?}", self.level, self.phase, phase);
        self.phase = phase;
    }

    /// Buffer input for the next tick. Oldest entries are dropped past the cap.
    pub fn queue_input(&mut self, input: InputEvent) {
        if !self.accepts_input() {
            log::debug!("Ignoring queued input in {:?}: {:?}", self.phase, input);
            return;
        }
        if self.inputs.len() >= self.tuning.max_queued_inputs {
            self.inputs.pop_front();
            log::warn!("Input queue full, dropping oldest event");
        }
        self.inputs.push_back(input);
    }

    /// Apply input immediately; returns whether it was acted on
    pub fn handle_input(&mut self, input: InputEvent) -> bool {
        if !self.accepts_input() {
            log::debug!("Ignoring input in {:?}: {:?}", self.phase, input);
            return false;
        }
        match input {
            InputEvent::Move(cmd) => {
                self.player.apply_move(cmd);
                true
            }
            InputEvent::Fire { aim, at_ms } => self.fire(aim, at_ms).is_some(),
            InputEvent::JoystickHold(angle) => {
                self.player.hold(angle);
                true
            }
            InputEvent::JoystickRelease => {
                self.player.release();
                true
            }
        }
    }

    /// Convenience for a single discrete or heading move
    pub fn apply_move(&mut self, cmd: MoveCommand) -> bool {
        self.handle_input(InputEvent::Move(cmd))
    }

    /// Fire toward `aim`. Returns the new projectile id if the gate was open.
    ///
    /// `now_ms` may run at most one tick period ahead of the last combat
    /// tick; later stamps are pulled back so the shot timers stay on the
    /// tick driver's timeline.
    pub fn fire(&mut self, aim: Vec2, now_ms: f64) -> Option<ProjectileId> {
        let horizon = self.last_tick_ms + self.tuning.tick_ms;
        let stamp = if now_ms > horizon {
            log::debug!("Fire stamped {} ms clamped to {} ms", now_ms, horizon);
            horizon
        } else {
            now_ms
        };
        self.advance_clock(stamp);
        if !self.accepts_input() {
            return None;
        }

        let FireDecision::Accepted { origin, special } = self.player.try_fire(self.clock_ms) else {
            log::debug!("Shot rejected at {} ms: cooling down", self.clock_ms);
            return None;
        };

        self.timers.schedule(
            self.clock_ms + self.tuning.shot_cooldown_ms,
            TimerAction::RearmShot,
            &self.cancel,
        );

        let projectile = self.projectiles.spawn(origin, aim, special);
        self.events.push(GameEvent::ShotFired {
            projectile,
            origin,
            target: aim,
        });
        if special {
            self.events.push(GameEvent::SpecialShotFired {
                projectile,
                target: aim,
            });
        }
        Some(projectile)
    }

    /// Move the clock forward and fire due timers
    pub fn advance_clock(&mut self, now_ms: f64) {
        if now_ms.is_finite() && now_ms > self.clock_ms {
            self.clock_ms = now_ms;
        }
        for action in self.timers.take_due(self.clock_ms) {
            self.on_timer(action);
        }
    }

    fn on_timer(&mut self, action: TimerAction) {
        match action {
            TimerAction::RearmShot => {
                // Stale after the level ends
                if self.phase == LevelPhase::Active {
                    self.player.rearm();
                }
            }
            TimerAction::ExitLevel => {
                self.exit_requested = true;
                self.events.push(GameEvent::LevelExit { level: self.level });
                log::info!("Level {}: returning to level select", self.level);
            }
        }
    }

    /// One combat tick at session time `now_ms`
    pub fn tick(&mut self, now_ms: f64) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.advance_clock(now_ms);
        if now_ms.is_finite() {
            self.last_tick_ms = self.last_tick_ms.max(now_ms);
        }
        if self.phase != LevelPhase::Active {
            return;
        }

        self.tick_count += 1;

        while let Some(input) = self.inputs.pop_front() {
            self.handle_input(input);
        }

        self.projectiles.advance_all();

        let report = collision::resolve(
            &mut self.enemies,
            &mut self.projectiles,
            self.tuning.hit_radius,
            self.tuning.hit_damage,
        );
        for (enemy, pos) in report.kills {
            self.kills += 1;
            self.events.push(GameEvent::EnemyDestroyed { enemy, pos });
        }

        self.projectiles.remove_expired();

        if self.enemies.is_cleared() {
            self.set_phase(LevelPhase::Cleared);
            self.report();
        }
    }

    /// Movement-driver tick: advance a held joystick heading
    pub fn movement_tick(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.player.advance_held()
    }

    fn report(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        let outcome = LevelOutcome {
            level: self.level,
            enemies_killed: self.kills,
            reward_coins: self.tuning.level_clear_bonus,
        };
        log::info!(
            "Level {} cleared in {} ticks: {} kills, +{} coins",
            self.level,
            self.tick_count,
            outcome.enemies_killed,
            outcome.reward_coins
        );

        self.sink.on_level_cleared(&outcome);
        self.events.push(GameEvent::LevelCleared(outcome.clone()));
        self.outcome = Some(outcome);
        self.inputs.clear();
        self.player.release();
        self.set_phase(LevelPhase::Reported);

        self.timers.schedule(
            self.clock_ms + self.tuning.exit_delay_ms,
            TimerAction::ExitLevel,
            &self.cancel,
        );
    }

    /// Leave the level: cancel every pending timer and stop accepting input
    pub fn exit_level(&mut self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        self.timers.clear();
        self.inputs.clear();
        self.projectiles.clear();
        self.player.release();
        self.exit_requested = true;
        log::info!("Level {}: session torn down in {:?}", self.level, self.phase);
    }

    /// Take pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            level: self.level,
            phase: self.phase,
            tick: self.tick_count,
            player: self.player.position(),
            shoot_ready: self.player.shoot_ready(),
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    pos: e.pos,
                    health: e.health,
                })
                .collect(),
            projectiles: self
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    id: p.id,
                    pos: p.pos,
                    special: p.special,
                })
                .collect(),
            kills: self.kills,
            running_reward: u64::from(self.kills) * self.tuning.coins_per_kill,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_MS;
    use crate::sim::player::Direction;

    fn session(level: u32) -> LevelSession<UserProgress> {
        LevelSession::new(level, 12345, Tuning::default(), UserProgress::default())
    }

    /// Tick until no projectiles remain (or the limit), advancing 16 ms per tick
    fn run_until_idle(s: &mut LevelSession<UserProgress>, start_ms: f64) -> f64 {
        let mut t = start_ms;
        for _ in 0..500 {
            t += TICK_MS;
            s.tick(t);
            if s.projectiles().is_empty() {
                break;
            }
        }
        t
    }

    #[test]
    fn test_starts_active_with_wave() {
        let s = session(2);
        assert_eq!(s.phase(), LevelPhase::Active);
        assert_eq!(s.enemies().len(), 9);
        assert!(!s.enemies().is_cleared());
        assert_eq!(s.snapshot().running_reward, 0);
    }

    #[test]
    fn test_discrete_move_is_synchronous() {
        let mut s = session(1);
        assert!(s.apply_move(MoveCommand::Step(Direction::Right)));
        assert_eq!(s.player().position(), Vec2::new(60.0, 400.0));
    }

    #[test]
    fn test_queued_input_applies_on_tick() {
        let mut s = session(1);
        s.queue_input(InputEvent::Move(MoveCommand::Step(Direction::Up)));
        assert_eq!(s.player().position(), Vec2::new(50.0, 400.0));
        s.tick(TICK_MS);
        assert_eq!(s.player().position(), Vec2::new(50.0, 390.0));
    }

    #[test]
    fn test_joystick_drives_movement_tick() {
        let mut s = session(1);
        s.handle_input(InputEvent::JoystickHold(0.0));
        for _ in 0..10 {
            assert!(s.movement_tick());
        }
        assert!((s.player().position().x - 80.0).abs() < 1e-3);
        s.handle_input(InputEvent::JoystickRelease);
        assert!(!s.movement_tick());
    }

    #[test]
    fn test_kill_emits_event_and_tally() {
        let tuning = Tuning {
            wave_base: 1,
            wave_per_level: 0,
            ..Tuning::default()
        };
        let mut s = LevelSession::new(1, 9, tuning, UserProgress::default());
        let target = s.enemies().iter().next().unwrap().pos;

        s.fire(target, 0.0).unwrap();
        let t = run_until_idle(&mut s, 0.0);
        s.fire(target, t.max(600.0)).unwrap();
        run_until_idle(&mut s, t.max(600.0));

        assert_eq!(s.kills(), 1);
        assert_eq!(s.snapshot().running_reward, 100);
        assert_eq!(s.phase(), LevelPhase::Reported);
        assert_eq!(s.sink().balance, 500);
        let events = s.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::EnemyDestroyed { enemy: 0, .. })));
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::ShotFired { .. })).count(),
            2
        );
    }

    #[test]
    fn test_rearm_after_cooldown() {
        let mut s = session(1);
        let aim = Vec2::new(300.0, 300.0);
        assert!(s.fire(aim, 0.0).is_some());
        assert!(!s.player().shoot_ready());
        s.tick(599.0);
        assert!(!s.player().shoot_ready());
        s.tick(600.0);
        assert!(s.player().shoot_ready());
    }

    #[test]
    fn test_exit_level_cancels_timers() {
        let mut s = session(1);
        assert!(s.fire(Vec2::new(300.0, 300.0), 0.0).is_some());
        s.exit_level();
        assert!(s.is_torn_down());
        assert!(s.exit_requested());

        assert!(s.projectiles().is_empty());
        s.tick(1000.0);
        assert!(!s.player().shoot_ready());
        assert!(s.fire(Vec2::new(300.0, 300.0), 2000.0).is_none());
        assert!(!s.apply_move(MoveCommand::Step(Direction::Up)));
        assert!(!s.movement_tick());
    }

    #[test]
    fn test_fire_stamp_cannot_outrun_ticks() {
        let mut s = session(1);
        s.queue_input(InputEvent::Fire {
            aim: Vec2::new(300.0, 300.0),
            at_ms: 1.7e12,
        });
        s.tick(TICK_MS);
        assert!(!s.player().shoot_ready());
        assert_eq!(s.clock_ms(), 2.0 * TICK_MS);

        let mut t = TICK_MS;
        while t < 16_000.0 && !s.player().shoot_ready() {
            t += TICK_MS;
            s.tick(t);
        }
        assert!(s.player().shoot_ready(), "gate still closed at {t} ms");
        // Rearm due at 632 ms, picked up by the next tick
        assert_eq!(t, 40.0 * TICK_MS);
        assert!(s.clock_ms() < 1000.0);
    }

    #[test]
    fn test_far_future_fire_keeps_cooldown_on_tick_clock() {
        let mut s = session(1);
        s.tick(100.0);
        assert!(s.fire(Vec2::new(300.0, 300.0), 5.0e9).is_some());
        assert_eq!(s.clock_ms(), 100.0 + TICK_MS);
        s.tick(100.0 + TICK_MS + 600.0);
        assert!(s.player().shoot_ready());
    }

    #[test]
    fn test_repeated_future_clicks_do_not_drift_clock() {
        let mut s = session(1);
        for i in 1..=50 {
            let t = i as f64 * TICK_MS;
            s.tick(t);
            s.fire(Vec2::new(300.0, 300.0), 1.7e12);
            assert!(s.clock_ms() <= t + TICK_MS);
        }
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut s = session(1);
        s.tick(500.0);
        s.tick(100.0);
        assert_eq!(s.clock_ms(), 500.0);
        s.tick(f64::NAN);
        assert_eq!(s.clock_ms(), 500.0);
    }

    #[test]
    fn test_select_level_checks_catalog() {
        let progress = UserProgress::default();
        assert!(matches!(
            select_level(11, &progress, 1, Tuning::default(), UserProgress::default()),
            Err(SessionError::LevelLocked { .. })
        ));
        assert!(matches!(
            select_level(42, &progress, 1, Tuning::default(), UserProgress::default()),
            Err(SessionError::UnknownLevel { level: 42 })
        ));
        let bad = Tuning {
            hit_radius: 0.0,
            ..Tuning::default()
        };
        assert!(matches!(
            select_level(1, &progress, 1, bad, UserProgress::default()),
            Err(SessionError::InvalidTuning { .. })
        ));
        assert!(select_level(3, &progress, 1, Tuning::default(), UserProgress::default()).is_ok());
    }
}
