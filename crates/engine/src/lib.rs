//! Milestone achievement engine for Swim Hub.
//!
//! Evaluates milestone criteria against training evidence and reconciles
//! stored statuses: monotonic transitions, idempotent passes, and failures
//! isolated per milestone.

#![warn(missing_docs)]

pub mod error;
pub mod matcher;
pub mod progress;
pub mod reconciler;
pub mod transition;

pub use error::{EvalError, Result};
pub use matcher::{AchievementDetail, EvidenceMatcher, EvidenceResult, EvidenceSource};
pub use progress::goal_progress;
pub use reconciler::{MilestoneReconciler, ReconcileFailure, ReconcileReport, ReconcilerConfig};
pub use transition::{next_status, Transition};
