//! User progress record and the level-outcome hand-off
//!
//! The identity store owns the full user record; the combat core only
//! touches balance, completed levels and owned items. Persisted to
//! LocalStorage on the web build.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Result of a cleared level, produced exactly once per session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelOutcome {
    pub level: u32,
    pub enemies_killed: u32,
    pub reward_coins: u64,
}

/// Collaborator that receives the level outcome
pub trait ProgressSink {
    /// Credit the reward and mark the level completed
    fn on_level_cleared(&mut self, outcome: &LevelOutcome);
}

/// Slice of the user record the combat core reads and updates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    /// Coin balance
    pub balance: u64,
    /// Completed level indices (set: re-clearing a level never duplicates it)
    #[serde(default)]
    pub completed_levels: BTreeSet<u32>,
    /// Shop items the user owns
    #[serde(default)]
    pub owned_items: Vec<String>,
}

impl UserProgress {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "strikeforce_user";

    pub fn new(balance: u64) -> Self {
        Self {
            balance,
            ..Self::default()
        }
    }

    pub fn has_completed(&self, level: u32) -> bool {
        self.completed_levels.contains(&level)
    }

    /// Apply a level outcome; returns true if the level was newly completed
    pub fn apply_outcome(&mut self, outcome: &LevelOutcome) -> bool {
        self.balance = self.balance.saturating_add(outcome.reward_coins);
        self.completed_levels.insert(outcome.level)
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys cannot fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        serde_json::from_str(json).map_err(|e| SessionError::ProgressParse(e.to_string()))
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(progress) => {
                        log::info!(
                            "Loaded user progress ({} levels completed)",
                            progress.completed_levels.len()
                        );
                        return progress;
                    }
                    Err(e) => log::warn!("{e}"),
                }
            }
        }

        log::info!("No user progress found, starting fresh");
        Self::default()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::STORAGE_KEY, &self.to_json());
            log::info!("User progress saved (balance {})", self.balance);
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl ProgressSink for UserProgress {
    fn on_level_cleared(&mut self, outcome: &LevelOutcome) {
        let newly = self.apply_outcome(outcome);
        log::info!(
            "Level {} cleared: +{} coins (balance {}), first clear: {}",
            outcome.level,
            outcome.reward_coins,
            self.balance,
            newly
        );
        self.save();
    }
}

impl<T: ProgressSink + ?Sized> ProgressSink for &mut T {
    fn on_level_cleared(&mut self, outcome: &LevelOutcome) {
        (**self).on_level_cleared(outcome);
    }
}
