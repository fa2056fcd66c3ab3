//! Goal model - a swimmer's declared target, decomposed into milestones.

use serde::{Deserialize, Serialize};

use crate::id::{CompetitionId, GoalId, StyleId, UserId};
use crate::Time;

/// A goal a swimmer has set, usually a target time for one catalog style
/// at an upcoming competition.
///
/// Goals are authored by the swimmer through the CRUD surface; the
/// achievement engine only uses them as the ownership boundary for
/// selecting milestones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: GoalId,

    /// Owning swimmer
    pub user_id: UserId,

    /// Competition this goal aims at, if any
    pub competition_id: Option<CompetitionId>,

    /// Style catalog entry the goal is measured against
    pub style_id: Option<StyleId>,

    /// Target time in seconds
    pub target_time: Option<f64>,

    /// Baseline time in seconds when the goal was set
    pub start_time: Option<f64>,

    /// Goal status
    pub status: GoalStatus,

    /// When the goal was achieved
    pub achieved_at: Option<Time>,

    /// When created
    pub created_at: Time,

    /// Last updated
    pub updated_at: Time,
}

impl Goal {
    /// Create an active goal for a swimmer.
    pub fn new(user_id: UserId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: GoalId::new(),
            user_id,
            competition_id: None,
            style_id: None,
            target_time: None,
            start_time: None,
            status: GoalStatus::Active,
            achieved_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Goal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Goal is being worked toward
    Active,
    /// Goal reached
    Achieved,
    /// Goal abandoned
    Cancelled,
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Achieved => "achieved",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "achieved" => Ok(Self::Achieved),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown goal status: {other}")),
        }
    }
}
