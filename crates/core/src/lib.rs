//! Swim Hub core data models.
//!
//! This crate defines the data structures shared by the milestone
//! achievement engine: goals, milestones with their typed criteria,
//! and the practice/competition evidence they are matched against.

#![warn(missing_docs)]

// Core identities
mod id;

// Goals and milestones
mod goal;
mod milestone;

// Training evidence
mod evidence;

// Style labels and swim time notation
mod style;
mod timefmt;

// Re-exports
pub use id::*;

pub use goal::{Goal, GoalStatus};
pub use milestone::{
    Milestone, MilestoneKind, MilestoneParams, MilestoneStatus, ParamsError, RepsTimeParams,
    SetParams, TimeParams,
};
pub use evidence::{CompetitionRecord, PoolType, PracticeLog, PracticeTime};
pub use style::{Stroke, Style, StyleKey, SwimCategory};
pub use timefmt::{format_swim_time, parse_swim_time};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
