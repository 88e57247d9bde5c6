//! Answer quality grades.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, QbError};

/// Quality of a learner's answer to a question.
///
/// Persisted as its integer value (0-4). `None` and `Wrong` are both treated
/// as the worst outcome; use [`AnswerGrade::compare_quality`] when ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AnswerGrade {
    /// No answer recorded.
    None = 0,
    /// Incorrect answer.
    Wrong = 1,
    /// Correct, but with difficulty.
    Difficult = 2,
    /// Correct.
    Correct = 3,
    /// Correct without effort.
    Easy = 4,
}

impl AnswerGrade {
    /// Integer value used on the wire.
    pub fn to_value(self) -> u8 {
        self as u8
    }

    /// Create from the wire integer.
    ///
    /// Returns None for values outside 0-4.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(AnswerGrade::None),
            1 => Some(AnswerGrade::Wrong),
            2 => Some(AnswerGrade::Difficult),
            3 => Some(AnswerGrade::Correct),
            4 => Some(AnswerGrade::Easy),
            _ => None,
        }
    }

    /// Quality rank where `None` and `Wrong` share the bottom rank.
    pub fn rank(self) -> u8 {
        match self {
            AnswerGrade::None | AnswerGrade::Wrong => 0,
            AnswerGrade::Difficult => 1,
            AnswerGrade::Correct => 2,
            AnswerGrade::Easy => 3,
        }
    }

    /// Compare two grades by quality.
    pub fn compare_quality(self, other: AnswerGrade) -> Ordering {
        self.rank().cmp(&other.rank())
    }

    /// Whether the answer counts as a failure.
    pub fn is_failure(self) -> bool {
        self.rank() == 0
    }

    /// Lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerGrade::None => "none",
            AnswerGrade::Wrong => "wrong",
            AnswerGrade::Difficult => "difficult",
            AnswerGrade::Correct => "correct",
            AnswerGrade::Easy => "easy",
        }
    }
}

impl From<AnswerGrade> for u8 {
    fn from(grade: AnswerGrade) -> Self {
        grade.to_value()
    }
}

impl TryFrom<u8> for AnswerGrade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        AnswerGrade::from_value(value).ok_or_else(|| format!("invalid answer grade: {}", value))
    }
}

impl fmt::Display for AnswerGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerGrade {
    type Err = QbError;

    /// Accepts grade names (case-insensitive) or their integer values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if let Ok(value) = normalized.parse::<u8>() {
            return AnswerGrade::from_value(value).ok_or_else(|| {
                QbError::parse(ErrorCode::ParseInvalidGrade, format!("grade out of range: {}", s))
            });
        }
        match normalized.as_str() {
            "none" => Ok(AnswerGrade::None),
            "wrong" => Ok(AnswerGrade::Wrong),
            "difficult" => Ok(AnswerGrade::Difficult),
            "correct" => Ok(AnswerGrade::Correct),
            "easy" => Ok(AnswerGrade::Easy),
            _ => Err(QbError::parse(
                ErrorCode::ParseInvalidGrade,
                format!("unknown grade: {}", s),
            )),
        }
    }
}
