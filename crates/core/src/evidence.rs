//! Training evidence - practice logs, lap times, and competition records.
//!
//! Evidence rows are read-only inputs to milestone evaluation. They are
//! authored by the practice/record CRUD surface, never by the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{CompetitionId, PracticeId, PracticeLogId, RecordId, StyleId, UserId};
use crate::style::SwimCategory;
use crate::Time;

/// One logged practice entry: a style swum for a rep/set scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeLog {
    /// Unique identifier
    pub id: PracticeLogId,

    /// Owning swimmer
    pub user_id: UserId,

    /// Practice session this log belongs to
    pub practice_id: PracticeId,

    /// Style label as entered (code or display label)
    pub style: String,

    /// Training category
    pub swim_category: SwimCategory,

    /// Distance per rep in meters
    pub distance: u32,

    /// Reps per set
    pub rep_count: u32,

    /// Number of sets
    pub set_count: u32,

    /// Interval (circle) in seconds, when swum on one
    pub circle: Option<u32>,

    /// Day the practice took place
    pub date: NaiveDate,

    /// When created
    pub created_at: Time,
}

/// One recorded lap time within a practice log.
///
/// A `time` of `0.0` means the lap was swum but not timed; such rows are
/// excluded from averages and best-time lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeTime {
    /// Log this time belongs to
    pub practice_log_id: PracticeLogId,

    /// Set the lap was swum in (1-based)
    pub set_number: u32,

    /// Rep within the set (1-based)
    pub rep_number: u32,

    /// Recorded time in seconds, `0.0` when not recorded
    pub time: f64,

    /// When created
    pub created_at: Time,
}

impl PracticeTime {
    /// Whether a time was actually recorded for this lap.
    pub fn is_recorded(&self) -> bool {
        self.time > 0.0
    }
}

/// A time swum at a competition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionRecord {
    /// Unique identifier
    pub id: RecordId,

    /// Owning swimmer
    pub user_id: UserId,

    /// Competition the time was swum at
    pub competition_id: Option<CompetitionId>,

    /// Style catalog entry (stroke + distance)
    pub style_id: StyleId,

    /// Official time in seconds
    pub time: f64,

    /// Pool length the time was swum in
    pub pool_type: PoolType,

    /// When created
    pub created_at: Time,
}

/// Pool length classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    /// 25 m pool
    Short,
    /// 50 m pool
    Long,
}

impl std::fmt::Display for PoolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Short => "short",
            Self::Long => "long",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for PoolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "long" => Ok(Self::Long),
            other => Err(format!("unknown pool type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_time_is_unrecorded() {
        let lap = PracticeTime {
            practice_log_id: PracticeLogId::new(),
            set_number: 1,
            rep_number: 1,
            time: 0.0,
            created_at: chrono::Utc::now(),
        };
        assert!(!lap.is_recorded());
        assert!(PracticeTime { time: 59.8, ..lap }.is_recorded());
    }
}
