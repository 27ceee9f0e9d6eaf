//! Strategies for picking one date out of many.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::dates::DateCandidate;
use crate::error::ExtractionError;

/// Selects at most one date from the certain candidates.
pub trait DateStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn select<'a>(&self, candidates: &'a [DateCandidate]) -> Option<&'a DateCandidate>;
}

/// Built-in date strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStrategyKind {
    /// Chronologically earliest date.
    #[default]
    Earliest,
    /// Date printed first in the text.
    First,
}

impl DateStrategyKind {
    pub const ALL: [DateStrategyKind; 2] = [DateStrategyKind::Earliest, DateStrategyKind::First];

    pub fn as_str(self) -> &'static str {
        match self {
            DateStrategyKind::Earliest => "earliest",
            DateStrategyKind::First => "first",
        }
    }
}

impl DateStrategy for DateStrategyKind {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn select<'a>(&self, candidates: &'a [DateCandidate]) -> Option<&'a DateCandidate> {
        match self {
            // min_by_key returns the first minimum
            DateStrategyKind::Earliest => candidates.iter().min_by_key(|c| c.date),
            DateStrategyKind::First => candidates.iter().min_by_key(|c| c.position.0),
        }
    }
}

impl FromStr for DateStrategyKind {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExtractionError::UnknownStrategy {
                field: "date".to_string(),
                name: s.to_string(),
            })
    }
}

impl fmt::Display for DateStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::extract::rules::recognizer::Certainty;

    fn candidate(text: &str, y: i32, m: u32, d: u32, start: usize) -> DateCandidate {
        DateCandidate {
            text: text.to_string(),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            position: (start, start + text.len()),
            certainty: Certainty::ALL,
        }
    }

    fn sample() -> Vec<DateCandidate> {
        vec![
            candidate("02/05/2016", 2016, 2, 5, 6),
            candidate("Feb 01 2016", 2016, 2, 1, 28),
            candidate("2016-02-01", 2016, 2, 1, 45),
        ]
    }

    #[test]
    fn test_earliest() {
        let dates = sample();
        let chosen = DateStrategyKind::Earliest.select(&dates).unwrap();

        assert_eq!(chosen.text, "Feb 01 2016");
    }

    #[test]
    fn test_first() {
        let dates = sample();
        let chosen = DateStrategyKind::First.select(&dates).unwrap();

        assert_eq!(chosen.text, "02/05/2016");
    }

    #[test]
    fn test_empty() {
        assert!(DateStrategyKind::Earliest.select(&[]).is_none());
        assert!(DateStrategyKind::First.select(&[]).is_none());
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!("first".parse::<DateStrategyKind>().unwrap(), DateStrategyKind::First);
        assert_eq!(DateStrategyKind::default().to_string(), "earliest");

        let err = "latest".parse::<DateStrategyKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown date strategy: latest");
    }
}
