//! Strikeforce entry point
//!
//! Web builds export a `WebLevel` handle the page drives from its input
//! handlers and animation frame. Native builds run a level headless with an
//! autopilot, which is handy for balance checks.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use glam::Vec2;
    use wasm_bindgen::prelude::*;

    use strikeforce::levels;
    use strikeforce::runner::LevelRunner;
    use strikeforce::sim::{Direction, select_level};
    use strikeforce::{Tuning, UserProgress};

    /// One running level, owned by the page's game screen
    #[wasm_bindgen]
    pub struct WebLevel {
        runner: LevelRunner<UserProgress>,
    }

    #[wasm_bindgen]
    impl WebLevel {
        /// Enter `level` for the user stored in LocalStorage
        #[wasm_bindgen(constructor)]
        pub fn new(level: u32) -> Result<WebLevel, JsValue> {
            let progress = UserProgress::load();
            let seed = js_sys::Date::now() as u64;
            let session = select_level(level, &progress, seed, Tuning::default(), progress.clone())
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            log::info!("Entering level {} (seed {})", level, seed);
            Ok(Self {
                runner: LevelRunner::new(session),
            })
        }

        /// Level select grid for the stored user: label, name, lock and completion
        pub fn levels_json() -> String {
            let grid = levels::catalog(&UserProgress::load());
            serde_json::to_string(&grid).unwrap_or_default()
        }

        /// Click/tap on the battlefield (canvas-relative pixels)
        pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
            self.runner.fire(Vec2::new(x, y)).is_some()
        }

        /// Arrow keys / WASD / on-screen buttons
        pub fn key_down(&mut self, key: &str) -> bool {
            match Direction::from_key(key) {
                Some(dir) => self.runner.step(dir),
                None => false,
            }
        }

        /// Joystick pressed or dragged; angle in radians from the pad center
        pub fn joystick(&mut self, angle: f32) -> bool {
            self.runner.hold_joystick(angle)
        }

        pub fn joystick_release(&mut self) -> bool {
            self.runner.release_joystick()
        }

        /// Animation frame; `now` is `performance.now()`
        pub fn frame(&mut self, now: f64) -> u32 {
            self.runner.frame(now)
        }

        pub fn snapshot_json(&self) -> String {
            serde_json::to_string(&self.runner.session().snapshot()).unwrap_or_default()
        }

        pub fn events_json(&mut self) -> String {
            let events = self.runner.session_mut().drain_events();
            serde_json::to_string(&events).unwrap_or_default()
        }

        /// Updated user record after a clear (balance, completed levels)
        pub fn progress_json(&self) -> String {
            self.runner.session().sink().to_json()
        }

        /// True once the screen should return to level select
        pub fn exit_requested(&self) -> bool {
            self.runner.session().exit_requested()
        }

        /// Back button / screen change
        pub fn exit(&mut self) {
            self.runner.exit();
        }
    }

    pub fn init() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }
        log::info!("Strikeforce combat core loaded");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    log::info!("Strikeforce (native) starting...");
    native::run(native::Args::parse())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use strikeforce::consts::TICK_MS;
    use strikeforce::runner::LevelRunner;
    use strikeforce::sim::{Direction, LevelPhase, select_level};
    use strikeforce::{Tuning, UserProgress};

    /// Give up after this much simulated time
    const MAX_RUN_MS: f64 = 120_000.0;

    #[derive(Parser, Debug)]
    #[command(name = "strikeforce")]
    #[command(about = "Play one Strikeforce level headless with an autopilot")]
    pub struct Args {
        /// Level index (11 is the "10.2" finale)
        #[arg(long, default_value_t = 1)]
        level: u32,
        /// Seed for the enemy wave
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// JSON file overriding gameplay tuning
        #[arg(long, value_name = "PATH")]
        tuning: Option<PathBuf>,
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed reading tuning {}", path.display()))?;
        Tuning::from_json(&json).with_context(|| format!("invalid tuning {}", path.display()))
    }

    /// Play one level with the autopilot and print the updated progress
    pub fn run(args: Args) -> Result<()> {
        let tuning = load_tuning(args.tuning.as_ref())?;
        let progress = UserProgress::load();
        let session = select_level(args.level, &progress, args.seed, tuning, progress.clone())
            .with_context(|| format!("cannot enter level {}", args.level))?;
        let mut runner = LevelRunner::new(session);

        let mut now = 0.0;
        while runner.is_running() && now < MAX_RUN_MS {
            now += TICK_MS;
            runner.frame(now);
            autopilot(&mut runner);
        }

        let session = runner.into_session();
        match session.outcome() {
            Some(outcome) => log::info!(
                "Level {} done: {} kills, +{} coins",
                outcome.level,
                outcome.enemies_killed,
                outcome.reward_coins
            ),
            None => log::warn!("Level {} not cleared within {} ms", args.level, MAX_RUN_MS),
        }
        println!("{}", session.sink().to_json());
        Ok(())
    }

    /// Line up with the lowest-id enemy and fire whenever the gate is open
    fn autopilot(runner: &mut LevelRunner<UserProgress>) {
        let session = runner.session();
        if session.phase() != LevelPhase::Active {
            return;
        }
        let Some(target) = session.enemies().iter().next().map(|e| e.pos) else {
            return;
        };
        let player = session.player().position();
        let ready = session.player().shoot_ready();

        let dy = target.y - player.y;
        if dy.abs() > session.tuning().move_step {
            runner.step(if dy < 0.0 { Direction::Up } else { Direction::Down });
        }
        if ready {
            runner.fire(target);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_args() {
            let args =
                Args::try_parse_from(["strikeforce", "--level", "4", "--seed", "99"]).unwrap();
            assert_eq!(args.level, 4);
            assert_eq!(args.seed, 99);
            assert!(args.tuning.is_none());

            let args = Args::try_parse_from(["strikeforce", "--tuning", "fast.json"]).unwrap();
            assert_eq!(args.level, 1);
            assert_eq!(args.tuning, Some(PathBuf::from("fast.json")));

            assert!(Args::try_parse_from(["strikeforce", "--level"]).is_err());
            assert!(Args::try_parse_from(["strikeforce", "--level", "x"]).is_err());
            assert!(Args::try_parse_from(["strikeforce", "--bogus"]).is_err());
        }

        #[test]
        fn test_missing_tuning_file_names_path() {
            let path = PathBuf::from("/nonexistent/strikeforce-tuning.json");
            let err = load_tuning(Some(&path)).unwrap_err();
            assert!(err.to_string().contains("strikeforce-tuning.json"));
        }

        #[test]
        fn test_locked_level_is_an_error() {
            let args = Args::try_parse_from(["strikeforce", "--level", "11"]).unwrap();
            let err = run(args).unwrap_err();
            assert_eq!(err.to_string(), "cannot enter level 11");
        }

        #[test]
        fn test_autopilot_clears_level() {
            let session = select_level(
                1,
                &UserProgress::default(),
                3,
                Tuning::default(),
                UserProgress::default(),
            )
            .unwrap();
            let mut runner = LevelRunner::new(session);
            let mut now = 0.0;
            while runner.is_running() && now < MAX_RUN_MS {
                now += TICK_MS;
                runner.frame(now);
                autopilot(&mut runner);
            }
            let session = runner.into_session();
            assert_eq!(session.phase(), LevelPhase::Reported);
            assert_eq!(session.sink().balance, 500);
            assert!(session.exit_requested());
        }
    }
}
