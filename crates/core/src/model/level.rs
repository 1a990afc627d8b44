use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur when parsing level labels.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("unknown CEFR level: {0}")]
    UnknownCefrLevel(String),
    #[error("unknown self-assessed level: {0}")]
    UnknownSelfAssessed(String),
}

//
// ─── CEFR LEVEL ────────────────────────────────────────────────────────────────
//

/// CEFR proficiency level, the rung of the difficulty ladder.
///
/// The ladder is a fixed total order `A1 < A2 < B1 < B2 < C1`. All ladder
/// operations are total: stepping past an end clamps, and out-of-range
/// neighbor lookups return `None`.
///
/// # Examples
///
/// ```
/// use placement_core::model::CefrLevel;
///
/// assert_eq!(CefrLevel::B1.step_up(), CefrLevel::B2);
/// assert_eq!(CefrLevel::A1.step_down(), CefrLevel::A1);
/// assert_eq!(CefrLevel::B1.offset(-2), Some(CefrLevel::A1));
/// assert_eq!(CefrLevel::B2.offset(2), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
}

impl CefrLevel {
    /// The full ladder, easiest first.
    pub const LADDER: [CefrLevel; 5] = [
        CefrLevel::A1,
        CefrLevel::A2,
        CefrLevel::B1,
        CefrLevel::B2,
        CefrLevel::C1,
    ];

    /// Position of this level on the ladder (A1 = 0, C1 = 4).
    #[must_use]
    pub fn rank(self) -> usize {
        match self {
            CefrLevel::A1 => 0,
            CefrLevel::A2 => 1,
            CefrLevel::B1 => 2,
            CefrLevel::B2 => 3,
            CefrLevel::C1 => 4,
        }
    }

    /// One step harder, clamped at C1.
    #[must_use]
    pub fn step_up(self) -> Self {
        Self::LADDER[(self.rank() + 1).min(Self::LADDER.len() - 1)]
    }

    /// One step easier, clamped at A1.
    #[must_use]
    pub fn step_down(self) -> Self {
        Self::LADDER[self.rank().saturating_sub(1)]
    }

    /// The level at signed ladder distance `delta`, or `None` when the
    /// ladder ends before reaching it.
    #[must_use]
    pub fn offset(self, delta: i8) -> Option<Self> {
        let rank = i8::try_from(self.rank()).ok()?;
        let target = rank.checked_add(delta)?;
        if target < 0 {
            return None;
        }
        Self::LADDER.get(target as usize).copied()
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
        };
        write!(f, "{label}")
    }
}

impl FromStr for CefrLevel {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A1" => Ok(CefrLevel::A1),
            "A2" => Ok(CefrLevel::A2),
            "B1" => Ok(CefrLevel::B1),
            "B2" => Ok(CefrLevel::B2),
            "C1" => Ok(CefrLevel::C1),
            other => Err(LevelError::UnknownCefrLevel(other.to_string())),
        }
    }
}

//
// ─── SELF-ASSESSED LEVEL ───────────────────────────────────────────────────────
//

/// Proficiency label the test-taker picks about themselves before the test.
///
/// Only used to choose the ladder rung the first question comes from; the
/// adaptive selector takes over from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfAssessedLevel {
    Beginner,
    Elementary,
    Intermediate,
    Advanced,
}

impl SelfAssessedLevel {
    /// Ladder rung the first question is drawn from.
    #[must_use]
    pub fn starting_level(self) -> CefrLevel {
        match self {
            SelfAssessedLevel::Beginner => CefrLevel::A1,
            SelfAssessedLevel::Elementary => CefrLevel::A2,
            SelfAssessedLevel::Intermediate => CefrLevel::B1,
            SelfAssessedLevel::Advanced => CefrLevel::B2,
        }
    }
}

impl fmt::Display for SelfAssessedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SelfAssessedLevel::Beginner => "beginner",
            SelfAssessedLevel::Elementary => "elementary",
            SelfAssessedLevel::Intermediate => "intermediate",
            SelfAssessedLevel::Advanced => "advanced",
        };
        write!(f, "{label}")
    }
}

impl FromStr for SelfAssessedLevel {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(SelfAssessedLevel::Beginner),
            "elementary" => Ok(SelfAssessedLevel::Elementary),
            "intermediate" => Ok(SelfAssessedLevel::Intermediate),
            "advanced" => Ok(SelfAssessedLevel::Advanced),
            other => Err(LevelError::UnknownSelfAssessed(other.to_string())),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
