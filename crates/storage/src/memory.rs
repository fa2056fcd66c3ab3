//! In-memory store, used as the fixture backend in tests.
//!
//! Holds every table in memory behind a lock and implements both storage
//! traits. Engine tests seed it with the `insert_*` methods, read the
//! evidence query counter to assert what was actually asked, and can
//! inject a fault to make one milestone's evidence queries fail.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use swimhub_core::{
    CompetitionRecord, Goal, GoalId, Milestone, MilestoneId, MilestoneStatus, PracticeLog,
    PracticeLogId, PracticeTime, RecordId, Style, StyleId, StyleKey, Time, UserId,
};

use crate::trait_::{
    EvidenceRepository, MilestoneStore, PracticeFilter, Result, StorageError, WriteOutcome,
};

/// In-memory backend holding all tables behind an async lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
    evidence_queries: AtomicUsize,
    fault: RwLock<Option<EvidenceFault>>,
}

#[derive(Default)]
struct Tables {
    goals: HashMap<GoalId, Goal>,
    milestones: HashMap<MilestoneId, Milestone>,
    practice_logs: HashMap<PracticeLogId, PracticeLog>,
    practice_times: Vec<PracticeTime>,
    records: HashMap<RecordId, CompetitionRecord>,
    styles: Vec<Style>,
}

/// Makes evidence queries touching one distance fail.
///
/// Keyed by distance because that is the narrowest attribute shared by
/// every evidence query, which lets a test break exactly one milestone's
/// evaluation while its siblings keep working.
#[derive(Debug, Clone)]
pub struct EvidenceFault {
    /// Distance whose evidence queries fail
    pub distance: u32,
    /// Error message the queries fail with
    pub message: String,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of evidence queries served (or rejected) so far.
    pub fn evidence_query_count(&self) -> usize {
        self.evidence_queries.load(Ordering::Relaxed)
    }

    /// Install or clear the evidence fault.
    pub async fn set_evidence_fault(&self, fault: Option<EvidenceFault>) {
        *self.fault.write().await = fault;
    }

    /// Insert or replace a goal.
    pub async fn insert_goal(&self, goal: Goal) {
        self.inner.write().await.goals.insert(goal.id, goal);
    }

    /// Insert or replace a milestone.
    pub async fn insert_milestone(&self, milestone: Milestone) {
        self.inner
            .write()
            .await
            .milestones
            .insert(milestone.id, milestone);
    }

    /// Insert or replace a practice log.
    pub async fn insert_practice_log(&self, log: PracticeLog) {
        self.inner.write().await.practice_logs.insert(log.id, log);
    }

    /// Insert a recorded lap time.
    pub async fn insert_practice_time(&self, time: PracticeTime) {
        self.inner.write().await.practice_times.push(time);
    }

    /// Insert or replace a competition record.
    pub async fn insert_record(&self, record: CompetitionRecord) {
        self.inner.write().await.records.insert(record.id, record);
    }

    /// Insert a style catalog entry.
    pub async fn insert_style(&self, style: Style) {
        self.inner.write().await.styles.push(style);
    }

    async fn check_fault(&self, distance: Option<u32>) -> Result<()> {
        let guard = self.fault.read().await;
        if let (Some(fault), Some(distance)) = (guard.as_ref(), distance) {
            if fault.distance == distance {
                return Err(StorageError::Other(fault.message.clone()));
            }
        }
        Ok(())
    }

    fn count_query(&self) {
        self.evidence_queries.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl EvidenceRepository for MemoryStore {
    async fn find_practice_logs(
        &self,
        user: UserId,
        filter: &PracticeFilter,
    ) -> Result<Vec<PracticeLog>> {
        self.count_query();
        self.check_fault(filter.distance).await?;
        let tables = self.inner.read().await;
        let mut logs: Vec<PracticeLog> = tables
            .practice_logs
            .values()
            .filter(|log| log.user_id == user && filter.matches(log))
            .cloned()
            .collect();
        logs.sort_by_key(|log| log.created_at);
        Ok(logs)
    }

    async fn practice_times(&self, log: PracticeLogId) -> Result<Vec<PracticeTime>> {
        self.count_query();
        let tables = self.inner.read().await;
        let mut times: Vec<PracticeTime> = tables
            .practice_times
            .iter()
            .filter(|time| time.practice_log_id == log)
            .cloned()
            .collect();
        times.sort_by_key(|time| (time.set_number, time.rep_number));
        Ok(times)
    }

    async fn find_records(
        &self,
        user: UserId,
        style: &StyleKey,
        distance: u32,
    ) -> Result<Vec<CompetitionRecord>> {
        self.count_query();
        self.check_fault(Some(distance)).await?;
        let tables = self.inner.read().await;
        let style_ids: HashSet<StyleId> = tables
            .styles
            .iter()
            .filter(|s| s.distance == distance && Some(s.stroke) == style.stroke())
            .map(|s| s.id)
            .collect();
        let mut records: Vec<CompetitionRecord> = tables
            .records
            .values()
            .filter(|r| r.user_id == user && style_ids.contains(&r.style_id))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn best_record_time(&self, user: UserId, style: StyleId) -> Result<Option<f64>> {
        self.count_query();
        let tables = self.inner.read().await;
        let best = tables
            .records
            .values()
            .filter(|r| r.user_id == user && r.style_id == style && r.time > 0.0)
            .map(|r| r.time)
            .fold(f64::INFINITY, f64::min);
        Ok(best.is_finite().then_some(best))
    }
}

#[async_trait]
impl MilestoneStore for MemoryStore {
    async fn load_goals(&self, user: UserId) -> Result<Vec<Goal>> {
        let tables = self.inner.read().await;
        let mut goals: Vec<Goal> = tables
            .goals
            .values()
            .filter(|g| g.user_id == user)
            .cloned()
            .collect();
        goals.sort_by_key(|g| g.created_at);
        Ok(goals)
    }

    async fn load_milestone(&self, id: MilestoneId) -> Result<Option<Milestone>> {
        Ok(self.inner.read().await.milestones.get(&id).cloned())
    }

    async fn load_milestones(&self, goal: GoalId) -> Result<Vec<Milestone>> {
        let tables = self.inner.read().await;
        let mut milestones: Vec<Milestone> = tables
            .milestones
            .values()
            .filter(|m| m.goal_id == goal)
            .cloned()
            .collect();
        milestones.sort_by_key(|m| m.created_at);
        Ok(milestones)
    }

    async fn load_open_milestones(&self, user: UserId) -> Result<Vec<Milestone>> {
        let tables = self.inner.read().await;
        let owned: HashSet<GoalId> = tables
            .goals
            .values()
            .filter(|g| g.user_id == user)
            .map(|g| g.id)
            .collect();
        let mut milestones: Vec<Milestone> = tables
            .milestones
            .values()
            .filter(|m| owned.contains(&m.goal_id) && !m.status.is_terminal())
            .cloned()
            .collect();
        milestones.sort_by_key(|m| m.created_at);
        Ok(milestones)
    }

    async fn load_overdue_milestones(
        &self,
        user: UserId,
        today: NaiveDate,
    ) -> Result<Vec<Milestone>> {
        let tables = self.inner.read().await;
        let owned: HashSet<GoalId> = tables
            .goals
            .values()
            .filter(|g| g.user_id == user)
            .map(|g| g.id)
            .collect();
        let mut milestones: Vec<Milestone> = tables
            .milestones
            .values()
            .filter(|m| {
                owned.contains(&m.goal_id)
                    && !m.status.is_terminal()
                    && !m.reflection_done
                    && m.deadline.is_some_and(|d| d < today)
            })
            .cloned()
            .collect();
        milestones.sort_by_key(|m| m.created_at);
        Ok(milestones)
    }

    async fn update_status(
        &self,
        id: MilestoneId,
        expected: MilestoneStatus,
        next: MilestoneStatus,
        achieved_at: Option<Time>,
    ) -> Result<WriteOutcome> {
        let mut tables = self.inner.write().await;
        // Zero matching rows, like the SQL backends report it
        let Some(milestone) = tables.milestones.get_mut(&id) else {
            return Ok(WriteOutcome::Conflict);
        };
        if milestone.status != expected {
            return Ok(WriteOutcome::Conflict);
        }
        milestone.status = next;
        if milestone.achieved_at.is_none() {
            milestone.achieved_at = achieved_at;
        }
        Ok(WriteOutcome::Applied)
    }
}
