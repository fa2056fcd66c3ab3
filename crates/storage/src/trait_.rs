//! Storage trait abstractions.
//!
//! Two traits split what the achievement engine is allowed to touch:
//! [`EvidenceRepository`] is strictly read-only, and [`MilestoneStore`]
//! writes nothing beyond a milestone's `status` and `achieved_at`, via a
//! conditional update keyed on the status the caller observed.

use async_trait::async_trait;
use chrono::NaiveDate;
use swimhub_core::{
    CompetitionRecord, Goal, GoalId, Milestone, MilestoneId, MilestoneStatus, PracticeLog,
    PracticeLogId, PracticeTime, StyleId, StyleKey, SwimCategory, Time, UserId,
};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQL error
    #[cfg(feature = "sqlite")]
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Filter for querying practice logs.
///
/// Unset fields do not constrain the query. Set fields are exact-match,
/// except `style` (compared after label normalization) and `since` (lower
/// bound on the practice date).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PracticeFilter {
    /// Match the normalized style label
    pub style: Option<StyleKey>,

    /// Match the training category
    pub swim_category: Option<SwimCategory>,

    /// Match the distance per rep
    pub distance: Option<u32>,

    /// Match the reps per set
    pub rep_count: Option<u32>,

    /// Match the set count
    pub set_count: Option<u32>,

    /// Match the circle interval
    pub circle: Option<u32>,

    /// Only logs dated on or after this day
    pub since: Option<NaiveDate>,
}

impl PracticeFilter {
    /// Whether a log row passes this filter.
    ///
    /// Shared by the backends so that every store answers the same
    /// question the same way. A log without a circle does not match a
    /// filter that asks for one.
    pub fn matches(&self, log: &PracticeLog) -> bool {
        if let Some(style) = &self.style {
            if !style.matches(&log.style) {
                return false;
            }
        }
        if let Some(category) = self.swim_category {
            if log.swim_category != category {
                return false;
            }
        }
        if let Some(distance) = self.distance {
            if log.distance != distance {
                return false;
            }
        }
        if let Some(rep_count) = self.rep_count {
            if log.rep_count != rep_count {
                return false;
            }
        }
        if let Some(set_count) = self.set_count {
            if log.set_count != set_count {
                return false;
            }
        }
        if let Some(circle) = self.circle {
            if log.circle != Some(circle) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if log.date < since {
                return false;
            }
        }
        true
    }
}

/// Outcome of a conditional status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The row still had the expected status and was updated
    Applied,
    /// Zero rows matched: another pass already moved the milestone
    Conflict,
}

/// Read-only access to training evidence.
#[async_trait]
pub trait EvidenceRepository: Send + Sync {
    /// List a swimmer's practice logs matching the filter.
    async fn find_practice_logs(
        &self,
        user: UserId,
        filter: &PracticeFilter,
    ) -> Result<Vec<PracticeLog>>;

    /// List the recorded lap times of a practice log.
    async fn practice_times(&self, log: PracticeLogId) -> Result<Vec<PracticeTime>>;

    /// List a swimmer's competition records for a style at a distance.
    ///
    /// The style is resolved through the style catalog; an unrecognized
    /// style label matches no catalog entry and yields no records.
    async fn find_records(
        &self,
        user: UserId,
        style: &StyleKey,
        distance: u32,
    ) -> Result<Vec<CompetitionRecord>>;

    /// Fastest competition time a swimmer holds for a catalog style.
    async fn best_record_time(&self, user: UserId, style: StyleId) -> Result<Option<f64>>;
}

/// Goal and milestone persistence.
#[async_trait]
pub trait MilestoneStore: Send + Sync {
    /// List a swimmer's goals.
    async fn load_goals(&self, user: UserId) -> Result<Vec<Goal>>;

    /// Load a milestone by ID.
    async fn load_milestone(&self, id: MilestoneId) -> Result<Option<Milestone>>;

    /// List all milestones of a goal.
    async fn load_milestones(&self, goal: GoalId) -> Result<Vec<Milestone>>;

    /// List the not-yet-achieved milestones of a swimmer's goals.
    ///
    /// Achieved milestones are terminal and are excluded here, at the
    /// query, so reconciliation never touches them again.
    async fn load_open_milestones(&self, user: UserId) -> Result<Vec<Milestone>>;

    /// List unachieved milestones whose deadline passed without a reflection.
    async fn load_overdue_milestones(
        &self,
        user: UserId,
        today: NaiveDate,
    ) -> Result<Vec<Milestone>>;

    /// Conditionally update a milestone's status.
    ///
    /// The write applies only while the stored status still equals
    /// `expected`; otherwise nothing changes and [`WriteOutcome::Conflict`]
    /// is returned. `achieved_at` is assigned only if currently unset, so
    /// the first transition into achieved wins permanently.
    async fn update_status(
        &self,
        id: MilestoneId,
        expected: MilestoneStatus,
        next: MilestoneStatus,
        achieved_at: Option<Time>,
    ) -> Result<WriteOutcome>;
}
