//! Milestone model - typed sub-targets of a goal and their status lifecycle.

use serde::{Deserialize, Serialize};

use crate::id::{GoalId, MilestoneId};
use crate::style::SwimCategory;
use crate::Time;

/// One measurable sub-target of a goal.
///
/// The criteria live in `params`, whose shape is declared by `kind`. The
/// params are kept as raw JSON on the model because stored rows cannot
/// guarantee the shape matches the declared kind; decode per milestone
/// through [`Milestone::typed_params`] so one malformed row is skipped
/// instead of failing a whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    /// Unique identifier
    pub id: MilestoneId,

    /// Owning goal
    pub goal_id: GoalId,

    /// Short description shown to the swimmer
    pub title: String,

    /// Criteria kind
    #[serde(rename = "type")]
    pub kind: MilestoneKind,

    /// Criteria params, shape declared by `kind`
    pub params: serde_json::Value,

    /// Optional target date
    pub deadline: Option<chrono::NaiveDate>,

    /// Current status
    pub status: MilestoneStatus,

    /// Set once, at the first transition into `Achieved`
    pub achieved_at: Option<Time>,

    /// Whether the swimmer has reflected on a missed deadline
    pub reflection_done: bool,

    /// Free-form reflection note
    pub reflection_note: Option<String>,

    /// When created
    pub created_at: Time,

    /// Last updated
    pub updated_at: Time,
}

impl Milestone {
    /// Create a milestone from validated params, starting at `NotStarted`.
    pub fn new(
        goal_id: GoalId,
        title: impl Into<String>,
        params: MilestoneParams,
    ) -> Result<Self, ParamsError> {
        let now = chrono::Utc::now();
        Ok(Self {
            id: MilestoneId::new(),
            goal_id,
            title: title.into(),
            kind: params.kind(),
            params: params.to_value()?,
            deadline: None,
            status: MilestoneStatus::NotStarted,
            achieved_at: None,
            reflection_done: false,
            reflection_note: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Set a target date.
    pub fn with_deadline(mut self, deadline: chrono::NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Decode `params` against the declared `kind`.
    pub fn typed_params(&self) -> Result<MilestoneParams, ParamsError> {
        MilestoneParams::from_parts(self.kind, self.params.clone())
    }
}

/// Milestone criteria kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    /// Beat a single target time
    Time,
    /// Hold an average time across a prescribed rep/set scheme
    RepsTime,
    /// Complete a prescribed rep/set scheme
    Set,
}

impl MilestoneKind {
    /// Stable string form, as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::RepsTime => "reps_time",
            Self::Set => "set",
        }
    }
}

impl std::fmt::Display for MilestoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MilestoneKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(Self::Time),
            "reps_time" => Ok(Self::RepsTime),
            "set" => Ok(Self::Set),
            other => Err(format!("unknown milestone kind: {other}")),
        }
    }
}

/// Milestone status lattice.
///
/// Ordered `NotStarted < InProgress < Achieved`. Reconciliation only ever
/// moves a milestone up this order, and `Achieved` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    /// No evidence of the milestone's activity yet
    NotStarted,
    /// Attempted, target not yet met
    InProgress,
    /// Target met; terminal
    Achieved,
}

impl MilestoneStatus {
    /// Stable string form, as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Achieved => "achieved",
        }
    }

    /// Terminal statuses are never re-evaluated.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Achieved)
    }
}

impl std::fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MilestoneStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "achieved" => Ok(Self::Achieved),
            other => Err(format!("unknown milestone status: {other}")),
        }
    }
}

/// Criteria params, one shape per [`MilestoneKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MilestoneParams {
    /// Single best-time target
    Time(TimeParams),
    /// Average-time-over-repetitions target
    RepsTime(RepsTimeParams),
    /// Pure completion target, no time criterion
    Set(SetParams),
}

impl MilestoneParams {
    /// The kind these params belong to.
    pub fn kind(&self) -> MilestoneKind {
        match self {
            Self::Time(_) => MilestoneKind::Time,
            Self::RepsTime(_) => MilestoneKind::RepsTime,
            Self::Set(_) => MilestoneKind::Set,
        }
    }

    /// Decode a raw params value against a declared kind.
    pub fn from_parts(
        kind: MilestoneKind,
        params: serde_json::Value,
    ) -> Result<Self, ParamsError> {
        let decoded = match kind {
            MilestoneKind::Time => serde_json::from_value(params).map(Self::Time),
            MilestoneKind::RepsTime => serde_json::from_value(params).map(Self::RepsTime),
            MilestoneKind::Set => serde_json::from_value(params).map(Self::Set),
        };
        decoded.map_err(|e| ParamsError::SchemaMismatch {
            kind,
            detail: e.to_string(),
        })
    }

    /// Raw params value as stored, without the kind tag.
    pub fn to_value(&self) -> Result<serde_json::Value, ParamsError> {
        let encoded = match self {
            Self::Time(p) => serde_json::to_value(p),
            Self::RepsTime(p) => serde_json::to_value(p),
            Self::Set(p) => serde_json::to_value(p),
        };
        encoded.map_err(|e| ParamsError::Encode(e.to_string()))
    }
}

/// Params for a `time` milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeParams {
    /// Distance in meters
    pub distance: u32,

    /// Target time in seconds
    pub target_time: f64,

    /// Style label or short code
    pub style: String,
}

/// Params for a `reps_time` milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepsTimeParams {
    /// Distance per rep in meters
    pub distance: u32,

    /// Reps per set
    pub reps: u32,

    /// Number of sets
    pub sets: u32,

    /// Target mean time in seconds across the recorded reps
    pub target_average_time: f64,

    /// Style label or short code
    pub style: String,

    /// Training category the reps must be swum as
    pub swim_category: SwimCategory,

    /// Interval (circle) in seconds
    pub circle: u32,
}

/// Params for a `set` milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetParams {
    /// Distance per rep in meters
    pub distance: u32,

    /// Reps per set
    pub reps: u32,

    /// Number of sets
    pub sets: u32,

    /// Style label or short code
    pub style: String,

    /// Training category the reps must be swum as
    pub swim_category: SwimCategory,

    /// Interval (circle) in seconds
    pub circle: u32,
}

/// Errors decoding or encoding milestone criteria params.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParamsError {
    /// Stored params do not decode against the declared kind.
    #[error("params do not match declared kind {kind}: {detail}")]
    SchemaMismatch {
        /// Declared milestone kind
        kind: MilestoneKind,
        /// Decoder failure detail
        detail: String,
    },

    /// Params could not be encoded to JSON.
    #[error("params encoding failed: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn time_params() -> MilestoneParams {
        MilestoneParams::Time(TimeParams {
            distance: 100,
            target_time: 60.0,
            style: "Fr".to_string(),
        })
    }

    #[test]
    fn test_status_order_is_monotonic() {
        assert!(MilestoneStatus::NotStarted < MilestoneStatus::InProgress);
        assert!(MilestoneStatus::InProgress < MilestoneStatus::Achieved);
        assert!(MilestoneStatus::Achieved.is_terminal());
        assert!(!MilestoneStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_status_round_trips_snake_case() {
        let json = serde_json::to_string(&MilestoneStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
        assert_eq!(
            "in_progress".parse::<MilestoneStatus>().unwrap(),
            MilestoneStatus::InProgress
        );
        assert!("expired".parse::<MilestoneStatus>().is_err());
    }

    #[test]
    fn test_params_decode_against_declared_kind() {
        let raw = json!({"distance": 100, "target_time": 60.0, "style": "Fr"});
        let decoded = MilestoneParams::from_parts(MilestoneKind::Time, raw.clone()).unwrap();
        assert_eq!(decoded.kind(), MilestoneKind::Time);

        // Same raw value declared as `set` is a schema mismatch
        let err = MilestoneParams::from_parts(MilestoneKind::Set, raw).unwrap_err();
        assert!(matches!(
            err,
            ParamsError::SchemaMismatch {
                kind: MilestoneKind::Set,
                ..
            }
        ));
    }

    #[test]
    fn test_milestone_embeds_and_recovers_params() {
        let milestone = Milestone::new(GoalId::new(), "100m free under a minute", time_params())
            .unwrap();
        assert_eq!(milestone.kind, MilestoneKind::Time);
        assert_eq!(milestone.status, MilestoneStatus::NotStarted);
        assert!(milestone.achieved_at.is_none());
        assert_eq!(milestone.typed_params().unwrap(), time_params());
    }

    #[test]
    fn test_tagged_params_json() {
        let params: MilestoneParams = serde_json::from_value(json!({
            "type": "reps_time",
            "distance": 100,
            "reps": 4,
            "sets": 1,
            "target_average_time": 65.0,
            "style": "Fr",
            "swim_category": "Swim",
            "circle": 90
        }))
        .unwrap();
        assert_eq!(params.kind(), MilestoneKind::RepsTime);
        assert_eq!("reps_time".parse::<MilestoneKind>().unwrap(), params.kind());
    }
}
