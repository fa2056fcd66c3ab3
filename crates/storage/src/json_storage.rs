//! JSON file storage implementation.
//!
//! Stores each table as a directory of `<id>.json` files under the store
//! root (`.swimhub` by default). Lap times are grouped into one file per
//! practice log, and the style catalog lives in a single `styles.json`.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use swimhub_core::{
    CompetitionRecord, Goal, GoalId, Milestone, MilestoneId, MilestoneStatus, PracticeLog,
    PracticeLogId, PracticeTime, Stroke, Style, StyleId, StyleKey, Time, UserId,
};

use crate::trait_::{
    EvidenceRepository, MilestoneStore, PracticeFilter, Result, WriteOutcome,
};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: std::path::PathBuf,
    // Serializes read-modify-write of milestone files and the style catalog
    update_lock: Mutex<()>,
}

impl JsonStorage {
    /// Create storage. This will create the per-table subdirectories under
    /// `root` if they are missing.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("goals")).await?;
        fs::create_dir_all(root.join("milestones")).await?;
        fs::create_dir_all(root.join("practice_logs")).await?;
        fs::create_dir_all(root.join("practice_times")).await?;
        fs::create_dir_all(root.join("records")).await?;

        Ok(Self {
            root,
            update_lock: Mutex::new(()),
        })
    }

    fn goal_path(&self, id: GoalId) -> std::path::PathBuf {
        self.root.join("goals").join(format!("{}.json", id))
    }
    fn milestone_path(&self, id: MilestoneId) -> std::path::PathBuf {
        self.root.join("milestones").join(format!("{}.json", id))
    }
    fn practice_log_path(&self, id: PracticeLogId) -> std::path::PathBuf {
        self.root.join("practice_logs").join(format!("{}.json", id))
    }
    fn practice_times_path(&self, log: PracticeLogId) -> std::path::PathBuf {
        self.root.join("practice_times").join(format!("{}.json", log))
    }
    fn record_path(&self, id: swimhub_core::RecordId) -> std::path::PathBuf {
        self.root.join("records").join(format!("{}.json", id))
    }
    fn styles_path(&self) -> std::path::PathBuf {
        self.root.join("styles.json")
    }

    /// Insert or replace a goal.
    pub async fn save_goal(&self, goal: &Goal) -> Result<()> {
        let json = serde_json::to_string_pretty(goal)?;
        fs::write(self.goal_path(goal.id), json.as_bytes()).await?;
        Ok(())
    }

    /// Insert or replace a milestone.
    pub async fn save_milestone(&self, milestone: &Milestone) -> Result<()> {
        let json = serde_json::to_string_pretty(milestone)?;
        fs::write(self.milestone_path(milestone.id), json.as_bytes()).await?;
        Ok(())
    }

    /// Insert or replace a practice log.
    pub async fn save_practice_log(&self, log: &PracticeLog) -> Result<()> {
        let json = serde_json::to_string_pretty(log)?;
        fs::write(self.practice_log_path(log.id), json.as_bytes()).await?;
        Ok(())
    }

    /// Replace the recorded lap times of one practice log.
    pub async fn save_practice_times(
        &self,
        log: PracticeLogId,
        times: &[PracticeTime],
    ) -> Result<()> {
        let json = serde_json::to_string_pretty(times)?;
        fs::write(self.practice_times_path(log), json.as_bytes()).await?;
        Ok(())
    }

    /// Insert or replace a competition record.
    pub async fn save_record(&self, record: &CompetitionRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.record_path(record.id), json.as_bytes()).await?;
        Ok(())
    }

    /// Load the style catalog. Missing file means an empty catalog.
    pub async fn load_styles(&self) -> Result<Vec<Style>> {
        Ok(read_json(&self.styles_path()).await?.unwrap_or_default())
    }

    /// Find or allocate the catalog id for a stroke/distance pair.
    pub async fn ensure_style(&self, stroke: Stroke, distance: u32) -> Result<StyleId> {
        let _guard = self.update_lock.lock().await;
        let mut styles = self.load_styles().await?;
        if let Some(style) = styles
            .iter()
            .find(|s| s.stroke == stroke && s.distance == distance)
        {
            return Ok(style.id);
        }
        let next = styles.iter().map(|s| s.id.as_i64()).max().unwrap_or(0) + 1;
        let style = Style::new(StyleId::from(next), stroke, distance);
        let id = style.id;
        styles.push(style);
        let json = serde_json::to_string_pretty(&styles)?;
        fs::write(self.styles_path(), json.as_bytes()).await?;
        Ok(id)
    }
}

#[async_trait]
impl EvidenceRepository for JsonStorage {
    async fn find_practice_logs(
        &self,
        user: UserId,
        filter: &PracticeFilter,
    ) -> Result<Vec<PracticeLog>> {
        let all: Vec<PracticeLog> = list_dir(&self.root.join("practice_logs")).await?;
        let mut logs: Vec<PracticeLog> = all
            .into_iter()
            .filter(|log| log.user_id == user && filter.matches(log))
            .collect();
        logs.sort_by_key(|log| log.created_at);
        Ok(logs)
    }

    async fn practice_times(&self, log: PracticeLogId) -> Result<Vec<PracticeTime>> {
        let mut times: Vec<PracticeTime> = read_json(&self.practice_times_path(log))
            .await?
            .unwrap_or_default();
        times.sort_by_key(|time| (time.set_number, time.rep_number));
        Ok(times)
    }

    async fn find_records(
        &self,
        user: UserId,
        style: &StyleKey,
        distance: u32,
    ) -> Result<Vec<CompetitionRecord>> {
        let styles = self.load_styles().await?;
        let style_ids: HashSet<StyleId> = styles
            .iter()
            .filter(|s| s.distance == distance && Some(s.stroke) == style.stroke())
            .map(|s| s.id)
            .collect();
        let all: Vec<CompetitionRecord> = list_dir(&self.root.join("records")).await?;
        let mut records: Vec<CompetitionRecord> = all
            .into_iter()
            .filter(|r| r.user_id == user && style_ids.contains(&r.style_id))
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn best_record_time(&self, user: UserId, style: StyleId) -> Result<Option<f64>> {
        let all: Vec<CompetitionRecord> = list_dir(&self.root.join("records")).await?;
        let best = all
            .iter()
            .filter(|r| r.user_id == user && r.style_id == style && r.time > 0.0)
            .map(|r| r.time)
            .fold(f64::INFINITY, f64::min);
        Ok(best.is_finite().then_some(best))
    }
}

#[async_trait]
impl MilestoneStore for JsonStorage {
    async fn load_goals(&self, user: UserId) -> Result<Vec<Goal>> {
        let all: Vec<Goal> = list_dir(&self.root.join("goals")).await?;
        let mut goals: Vec<Goal> = all.into_iter().filter(|g| g.user_id == user).collect();
        goals.sort_by_key(|g| g.created_at);
        Ok(goals)
    }

    async fn load_milestone(&self, id: MilestoneId) -> Result<Option<Milestone>> {
        read_json(&self.milestone_path(id)).await
    }

    async fn load_milestones(&self, goal: GoalId) -> Result<Vec<Milestone>> {
        let all: Vec<Milestone> = list_dir(&self.root.join("milestones")).await?;
        let mut milestones: Vec<Milestone> =
            all.into_iter().filter(|m| m.goal_id == goal).collect();
        milestones.sort_by_key(|m| m.created_at);
        Ok(milestones)
    }

    async fn load_open_milestones(&self, user: UserId) -> Result<Vec<Milestone>> {
        let owned: HashSet<GoalId> = self
            .load_goals(user)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect();
        let all: Vec<Milestone> = list_dir(&self.root.join("milestones")).await?;
        let mut milestones: Vec<Milestone> = all
            .into_iter()
            .filter(|m| owned.contains(&m.goal_id) && !m.status.is_terminal())
            .collect();
        milestones.sort_by_key(|m| m.created_at);
        Ok(milestones)
    }

    async fn load_overdue_milestones(
        &self,
        user: UserId,
        today: NaiveDate,
    ) -> Result<Vec<Milestone>> {
        let open = self.load_open_milestones(user).await?;
        Ok(open
            .into_iter()
            .filter(|m| !m.reflection_done && m.deadline.is_some_and(|d| d < today))
            .collect())
    }

    async fn update_status(
        &self,
        id: MilestoneId,
        expected: MilestoneStatus,
        next: MilestoneStatus,
        achieved_at: Option<Time>,
    ) -> Result<WriteOutcome> {
        let _guard = self.update_lock.lock().await;
        let Some(mut milestone) = read_json::<Milestone>(&self.milestone_path(id)).await? else {
            return Ok(WriteOutcome::Conflict);
        };
        if milestone.status != expected {
            return Ok(WriteOutcome::Conflict);
        }
        milestone.status = next;
        if milestone.achieved_at.is_none() {
            milestone.achieved_at = achieved_at;
        }
        let json = serde_json::to_string_pretty(&milestone)?;
        fs::write(self.milestone_path(id), json.as_bytes()).await?;
        Ok(WriteOutcome::Applied)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &std::path::Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => warn!(path = %entry.path().display(), error = %e, "skipping unreadable file"),
        }
    }
    Ok(items)
}
