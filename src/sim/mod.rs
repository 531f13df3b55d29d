//! Level simulation module
//!
//! All combat logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)

pub mod collision;
pub mod enemy;
pub mod player;
pub mod projectile;
pub mod session;
pub mod state;
pub mod timers;

pub use collision::{Hit, HitTargets, ResolveReport, ShotSource, resolve};
pub use enemy::{DamageOutcome, Enemy, EnemyId, EnemyManager};
pub use player::{Direction, FireDecision, MoveCommand, PlayerController};
pub use projectile::{Projectile, ProjectileId, ProjectileSystem};
pub use session::{LevelSession, select_level};
pub use state::{EnemyView, GameEvent, InputEvent, LevelPhase, ProjectileView, Snapshot};
pub use timers::{CancelToken, TimerAction, TimerQueue};
