//! Fixed-step drivers
//!
//! Converts variable frame timestamps into fixed simulation steps. Combat and
//! held-joystick movement each get their own driver; both run on the caller's
//! thread between input events.

use glam::Vec2;

use crate::progress::ProgressSink;
use crate::sim::{Direction, InputEvent, LevelSession, MoveCommand, ProjectileId};

/// Longest frame gap fed to the drivers (tab switches, breakpoints)
const MAX_FRAME_MS: f64 = 100.0;

/// Accumulator that yields whole periods
#[derive(Debug, Clone)]
pub struct FixedStep {
    period_ms: f64,
    max_substeps: u32,
    accumulator: f64,
    running: bool,
}

impl FixedStep {
    pub fn new(period_ms: f64, max_substeps: u32) -> Self {
        Self {
            period_ms,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            running: true,
        }
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Add elapsed time; returns how many steps to run now
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        if !self.running || dt_ms.is_nan() || dt_ms <= 0.0 {
            return 0;
        }
        self.accumulator += dt_ms;

        let mut steps = 0;
        while self.accumulator >= self.period_ms && steps < self.max_substeps {
            self.accumulator -= self.period_ms;
            steps += 1;
        }
        steps
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }
}

/// A level session plus its two drivers
pub struct LevelRunner<P: ProgressSink> {
    session: LevelSession<P>,
    combat: FixedStep,
    movement: FixedStep,
    last_frame_ms: Option<f64>,
    /// Session time advanced in whole combat periods
    sim_time_ms: f64,
}

impl<P: ProgressSink> LevelRunner<P> {
    pub fn new(session: LevelSession<P>) -> Self {
        let period = session.tuning().tick_ms;
        let substeps = session.tuning().max_substeps;
        Self {
            session,
            combat: FixedStep::new(period, substeps),
            movement: FixedStep::new(period, substeps),
            last_frame_ms: None,
            sim_time_ms: 0.0,
        }
    }

    pub fn session(&self) -> &LevelSession<P> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut LevelSession<P> {
        &mut self.session
    }

    pub fn into_session(self) -> LevelSession<P> {
        self.session
    }

    pub fn sim_time_ms(&self) -> f64 {
        self.sim_time_ms
    }

    pub fn is_running(&self) -> bool {
        self.combat.is_running()
    }

    /// Run a display frame at wall time `now_ms`; returns combat ticks run
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_frame_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        let combat_steps = self.combat.advance(dt);
        for _ in 0..combat_steps {
            self.sim_time_ms += self.combat.period_ms();
            self.session.tick(self.sim_time_ms);
        }

        let movement_steps = self.movement.advance(dt);
        for _ in 0..movement_steps {
            if !self.session.movement_tick() {
                break;
            }
        }

        if self.session.exit_requested() {
            self.stop();
        }
        combat_steps
    }

    /// Fire at the current session time
    pub fn fire(&mut self, aim: Vec2) -> Option<ProjectileId> {
        self.session.fire(aim, self.sim_time_ms)
    }

    /// Key or button tap: applied immediately
    pub fn step(&mut self, dir: Direction) -> bool {
        self.session.apply_move(MoveCommand::Step(dir))
    }

    pub fn hold_joystick(&mut self, angle: f32) -> bool {
        self.session.handle_input(InputEvent::JoystickHold(angle))
    }

    pub fn release_joystick(&mut self) -> bool {
        self.session.handle_input(InputEvent::JoystickRelease)
    }

    /// Leave the level screen: stop both drivers and tear the session down
    pub fn exit(&mut self) {
        self.session.exit_level();
        self.stop();
    }

    fn stop(&mut self) {
        if self.combat.is_running() {
            log::debug!("Stopping drivers for level {}", self.session.level());
        }
        self.combat.stop();
        self.movement.stop();
    }
}
