//! Level catalog
//!
//! Ten standard levels are always open. The second half of the finale is
//! stored as index 11, displayed as "10.2", and opens once level 10 is
//! cleared.

use serde::Serialize;

use crate::error::SessionError;
use crate::progress::UserProgress;

/// A selectable level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub index: u32,
    pub name: &'static str,
    /// Level that must be completed first, if any
    pub requires: Option<u32>,
}

impl LevelInfo {
    const fn open(index: u32, name: &'static str) -> Self {
        Self {
            index,
            name,
            requires: None,
        }
    }

    /// Label shown on the level select grid
    pub fn label(&self) -> String {
        if self.index == FINALE_PART_TWO {
            "10.2".to_string()
        } else {
            self.index.to_string()
        }
    }

    pub fn is_unlocked(&self, progress: &UserProgress) -> bool {
        self.requires.is_none_or(|req| progress.has_completed(req))
    }
}

/// One tile of the level select grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelEntry {
    pub index: u32,
    pub label: String,
    pub name: &'static str,
    pub unlocked: bool,
    pub completed: bool,
}

/// Index of the unlockable finale
pub const FINALE_PART_TWO: u32 = 11;

pub const LEVELS: [LevelInfo; 11] = [
    LevelInfo::open(1, "Polygon"),
    LevelInfo::open(2, "Border"),
    LevelInfo::open(3, "Base"),
    LevelInfo::open(4, "Factory"),
    LevelInfo::open(5, "Bridge"),
    LevelInfo::open(6, "City"),
    LevelInfo::open(7, "Airport"),
    LevelInfo::open(8, "Bunker"),
    LevelInfo::open(9, "HQ"),
    LevelInfo::open(10, "Finale Pt.1"),
    LevelInfo {
        index: FINALE_PART_TWO,
        name: "Finale Pt.2",
        requires: Some(10),
    },
];

pub fn find(index: u32) -> Option<&'static LevelInfo> {
    LEVELS.iter().find(|l| l.index == index)
}

/// Level number fed to the wave formula; the second finale counts as 10.2
pub fn wave_level(index: u32) -> f32 {
    if index == FINALE_PART_TWO {
        10.2
    } else {
        index as f32
    }
}

/// Level select grid for this user
pub fn catalog(progress: &UserProgress) -> Vec<LevelEntry> {
    LEVELS
        .iter()
        .map(|info| LevelEntry {
            index: info.index,
            label: info.label(),
            name: info.name,
            unlocked: info.is_unlocked(progress),
            completed: progress.has_completed(info.index),
        })
        .collect()
}

/// Check that `index` exists and is open for this user
pub fn ensure_playable(
    index: u32,
    progress: &UserProgress,
) -> Result<&'static LevelInfo, SessionError> {
    let info = find(index).ok_or(SessionError::UnknownLevel { level: index })?;
    match info.requires {
        Some(requires) if !info.is_unlocked(progress) => {
            Err(SessionError::LevelLocked {
                level: index,
                requires,
            })
        }
        _ => Ok(info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_levels_open() {
        let progress = UserProgress::default();
        for index in 1..=10 {
            assert!(ensure_playable(index, &progress).is_ok());
        }
        assert_eq!(
            ensure_playable(0, &progress),
            Err(SessionError::UnknownLevel { level: 0 })
        );
    }

    #[test]
    fn test_finale_unlocks_after_level_ten() {
        let mut progress = UserProgress::default();
        assert_eq!(
            ensure_playable(FINALE_PART_TWO, &progress),
            Err(SessionError::LevelLocked {
                level: 11,
                requires: 10
            })
        );
        progress.completed_levels.insert(10);
        let info = ensure_playable(FINALE_PART_TWO, &progress).unwrap();
        assert_eq!(info.label(), "10.2");
        assert!(info.is_unlocked(&progress));
    }

    #[test]
    fn test_catalog_reflects_progress() {
        let mut progress = UserProgress::default();
        progress.completed_levels.insert(3);

        let grid = catalog(&progress);
        assert_eq!(grid.len(), 11);
        assert!(grid[2].completed);
        assert!(!grid[3].completed);
        let finale = grid.last().unwrap();
        assert_eq!(finale.label, "10.2");
        assert!(!finale.unlocked);

        progress.completed_levels.insert(10);
        assert!(catalog(&progress)[10].unlocked);
    }

    #[test]
    fn test_catalog_json_shape() {
        let json = serde_json::to_value(catalog(&UserProgress::default())).unwrap();
        assert_eq!(json[0]["label"], "1");
        assert_eq!(json[0]["name"], "Polygon");
        assert_eq!(json[10]["unlocked"], false);
    }

    #[test]
    fn test_wave_level() {
        assert_eq!(wave_level(4), 4.0);
        assert!((wave_level(FINALE_PART_TWO) - 10.2).abs() < 1e-6);
    }
}
