//! Errors surfaced outside the simulation
//!
//! The tick loop itself never fails: bad input is ignored and bounds are
//! clamped. Only level selection and the data loaded around a session can
//! be rejected.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Level index not present in the catalog
    UnknownLevel { level: u32 },
    /// Level exists but its prerequisite has not been completed
    LevelLocked { level: u32, requires: u32 },
    /// A tuning value is outside its usable range
    InvalidTuning {
        field: &'static str,
        reason: &'static str,
    },
    /// Tuning document failed to parse
    TuningParse(String),
    /// Stored user progress failed to parse
    ProgressParse(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLevel { level } => write!(f, "unknown level {level}"),
            Self::LevelLocked { level, requires } => {
                write!(f, "level {level} is locked until level {requires} is completed")
            }
            Self::InvalidTuning { field, reason } => {
                write!(f, "invalid tuning `{field}`: {reason}")
            }
            Self::TuningParse(msg) => write!(f, "failed to parse tuning: {msg}"),
            Self::ProgressParse(msg) => write!(f, "failed to parse user progress: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::TuningParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SessionError::LevelLocked {
            level: 11,
            requires: 10,
        };
        assert_eq!(
            err.to_string(),
            "level 11 is locked until level 10 is completed"
        );
        assert_eq!(SessionError::UnknownLevel { level: 0 }.to_string(), "unknown level 0");
    }
}
