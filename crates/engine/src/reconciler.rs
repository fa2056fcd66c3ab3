//! Batch reconciliation of milestone statuses against evidence.
//!
//! One pass loads a swimmer's open milestones, evaluates each against the
//! evidence, and persists earned transitions through a conditional write.
//! Failures stay scoped to their milestone; concurrent passes are safe
//! because stale writes are dropped by the status guard.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use swimhub_core::{Goal, Milestone, MilestoneId, UserId};
use swimhub_storage::{EvidenceRepository, MilestoneStore, WriteOutcome};

use crate::error::Result;
use crate::matcher::{EvidenceMatcher, EvidenceResult};
use crate::progress;
use crate::transition::next_status;

/// Tuning knobs for a reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// How many milestones are evaluated concurrently
    pub concurrency: usize,

    /// Ignore practice evidence older than this date
    pub evidence_since: Option<NaiveDate>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            evidence_since: None,
        }
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Milestones whose stored status changed
    pub updated: Vec<MilestoneId>,

    /// Milestones that could not be evaluated or written
    pub errors: Vec<ReconcileFailure>,
}

/// One milestone's failure during a reconciliation pass.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileFailure {
    /// Milestone that failed
    pub milestone: MilestoneId,

    /// What went wrong
    pub error: String,
}

/// Keeps stored milestone statuses in line with the training evidence.
pub struct MilestoneReconciler {
    store: Arc<dyn MilestoneStore>,
    evidence: Arc<dyn EvidenceRepository>,
    matcher: EvidenceMatcher,
    config: ReconcilerConfig,
}

impl MilestoneReconciler {
    /// Create a reconciler with the default configuration.
    pub fn new(store: Arc<dyn MilestoneStore>, evidence: Arc<dyn EvidenceRepository>) -> Self {
        Self::with_config(store, evidence, ReconcilerConfig::default())
    }

    /// Create a reconciler with an explicit configuration.
    pub fn with_config(
        store: Arc<dyn MilestoneStore>,
        evidence: Arc<dyn EvidenceRepository>,
        config: ReconcilerConfig,
    ) -> Self {
        let mut matcher = EvidenceMatcher::new(evidence.clone());
        if let Some(since) = config.evidence_since {
            matcher = matcher.with_since(since);
        }
        Self {
            store,
            evidence,
            matcher,
            config,
        }
    }

    /// Evaluate every open milestone of a swimmer and persist any earned
    /// status transitions.
    ///
    /// Achieved milestones are excluded before any evidence is queried.
    /// Only the initial milestone load can fail the call; per-milestone
    /// failures are collected in the report and never abort the pass.
    pub async fn reconcile(&self, user: UserId) -> Result<ReconcileReport> {
        let open = self.store.load_open_milestones(user).await?;
        debug!(user = %user, milestones = open.len(), "starting reconcile pass");

        let outcomes: Vec<(MilestoneId, Result<bool>)> = stream::iter(open)
            .map(|milestone| async move {
                let id = milestone.id;
                (id, self.reconcile_one(user, milestone).await)
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut report = ReconcileReport::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(true) => report.updated.push(id),
                Ok(false) => {}
                Err(e) => {
                    warn!(milestone = %id, error = %e, "milestone reconcile failed");
                    report.errors.push(ReconcileFailure {
                        milestone: id,
                        error: e.to_string(),
                    });
                }
            }
        }
        // Stable report, independent of completion order
        report.updated.sort();
        report.errors.sort_by_key(|f| f.milestone);

        info!(
            user = %user,
            updated = report.updated.len(),
            errors = report.errors.len(),
            "reconcile pass finished"
        );
        Ok(report)
    }

    /// Evaluate one milestone without writing anything.
    pub async fn evaluate_milestone(
        &self,
        user: UserId,
        milestone: &Milestone,
    ) -> Result<EvidenceResult> {
        self.matcher.evaluate(user, milestone).await
    }

    /// Percentage progress of a goal toward its target time, judged by the
    /// swimmer's best competition record for the goal's style.
    pub async fn goal_progress(&self, goal: &Goal) -> Result<Option<f64>> {
        let Some(style_id) = goal.style_id else {
            return Ok(None);
        };
        let best = self
            .evidence
            .best_record_time(goal.user_id, style_id)
            .await?;
        Ok(progress::goal_progress(goal, best))
    }

    async fn reconcile_one(&self, user: UserId, milestone: Milestone) -> Result<bool> {
        let evidence = self.matcher.evaluate(user, &milestone).await?;
        let now = chrono::Utc::now();
        let Some(transition) = next_status(milestone.status, &evidence, now) else {
            return Ok(false);
        };

        let outcome = self
            .store
            .update_status(
                milestone.id,
                milestone.status,
                transition.status,
                transition.achieved_at,
            )
            .await?;
        match outcome {
            WriteOutcome::Applied => {
                info!(
                    milestone = %milestone.id,
                    from = %milestone.status,
                    to = %transition.status,
                    "milestone status updated"
                );
                Ok(true)
            }
            WriteOutcome::Conflict => {
                // A concurrent pass got there first; the stored status wins
                debug!(milestone = %milestone.id, "dropping stale status update");
                Ok(false)
            }
        }
    }
}
