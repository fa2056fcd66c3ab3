//! SQLite storage backend.
//!
//! Keeps every table in real columns so the status transition can be
//! guarded inside a single conditional UPDATE. This is the recommended
//! backend for server deployments.

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use swimhub_core::{
    CompetitionRecord, Goal, GoalId, Milestone, MilestoneId, MilestoneStatus, PracticeLog,
    PracticeLogId, PracticeTime, Stroke, StyleId, StyleKey, Time, UserId,
};

use crate::trait_::{
    EvidenceRepository, MilestoneStore, PracticeFilter, Result, StorageError, WriteOutcome,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS goals (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        competition_id TEXT,
        style_id INTEGER,
        target_time REAL,
        start_time REAL,
        status TEXT NOT NULL,
        achieved_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS milestones (
        id TEXT PRIMARY KEY,
        goal_id TEXT NOT NULL,
        title TEXT NOT NULL,
        kind TEXT NOT NULL,
        params TEXT NOT NULL,
        deadline TEXT,
        status TEXT NOT NULL,
        achieved_at TEXT,
        reflection_done INTEGER NOT NULL DEFAULT 0,
        reflection_note TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS practice_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        practice_id TEXT NOT NULL,
        style TEXT NOT NULL,
        swim_category TEXT NOT NULL,
        distance INTEGER NOT NULL,
        rep_count INTEGER NOT NULL,
        set_count INTEGER NOT NULL,
        circle INTEGER,
        date TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS practice_times (
        practice_log_id TEXT NOT NULL,
        set_number INTEGER NOT NULL,
        rep_number INTEGER NOT NULL,
        time REAL NOT NULL,
        created_at TEXT NOT NULL,
        PRIMARY KEY (practice_log_id, set_number, rep_number)
    )",
    "CREATE TABLE IF NOT EXISTS records (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        competition_id TEXT,
        style_id INTEGER NOT NULL,
        time REAL NOT NULL,
        pool_type TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS styles (
        id INTEGER PRIMARY KEY,
        name_jp TEXT NOT NULL,
        name TEXT NOT NULL,
        stroke TEXT NOT NULL,
        distance INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_milestones_goal ON milestones(goal_id)",
    "CREATE INDEX IF NOT EXISTS idx_milestones_status ON milestones(status)",
    "CREATE INDEX IF NOT EXISTS idx_practice_logs_user ON practice_logs(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_records_user_style ON records(user_id, style_id)",
];

/// SQLite storage implementation.
#[derive(Clone)]
pub struct SqliteStorage {
    /// Database connection pool
    pool: sqlx::SqlitePool,
}

impl SqliteStorage {
    /// Open (or create) a database file and initialize the schema.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let storage = Self { pool };
        storage.init_schema().await?;

        Ok(storage)
    }

    /// Create an in-memory SQLite storage for testing.
    pub async fn in_memory() -> Result<Self> {
        // One connection, so every query sees the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        let storage = Self { pool };
        storage.init_schema().await?;

        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    // === Write operations ===

    /// Insert or replace a goal.
    pub async fn save_goal(&self, goal: &Goal) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO goals
             (id, user_id, competition_id, style_id, target_time, start_time,
              status, achieved_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(goal.id.to_string())
        .bind(goal.user_id.to_string())
        .bind(goal.competition_id.map(|id| id.to_string()))
        .bind(goal.style_id.map(|id| id.as_i64()))
        .bind(goal.target_time)
        .bind(goal.start_time)
        .bind(goal.status.to_string())
        .bind(goal.achieved_at.map(|t| t.to_rfc3339()))
        .bind(goal.created_at.to_rfc3339())
        .bind(goal.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or replace a milestone.
    pub async fn save_milestone(&self, milestone: &Milestone) -> Result<()> {
        let params = serde_json::to_string(&milestone.params)?;

        sqlx::query(
            "INSERT OR REPLACE INTO milestones
             (id, goal_id, title, kind, params, deadline, status, achieved_at,
              reflection_done, reflection_note, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(milestone.id.to_string())
        .bind(milestone.goal_id.to_string())
        .bind(&milestone.title)
        .bind(milestone.kind.as_str())
        .bind(params)
        .bind(milestone.deadline.map(|d| d.to_string()))
        .bind(milestone.status.as_str())
        .bind(milestone.achieved_at.map(|t| t.to_rfc3339()))
        .bind(milestone.reflection_done)
        .bind(milestone.reflection_note.as_deref())
        .bind(milestone.created_at.to_rfc3339())
        .bind(milestone.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or replace a practice log.
    pub async fn save_practice_log(&self, log: &PracticeLog) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO practice_logs
             (id, user_id, practice_id, style, swim_category, distance,
              rep_count, set_count, circle, date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(log.id.to_string())
        .bind(log.user_id.to_string())
        .bind(log.practice_id.to_string())
        .bind(&log.style)
        .bind(log.swim_category.to_string())
        .bind(log.distance as i64)
        .bind(log.rep_count as i64)
        .bind(log.set_count as i64)
        .bind(log.circle.map(|c| c as i64))
        .bind(log.date.to_string())
        .bind(log.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or replace the recorded lap times of one practice log.
    pub async fn save_practice_times(&self, times: &[PracticeTime]) -> Result<()> {
        for time in times {
            sqlx::query(
                "INSERT OR REPLACE INTO practice_times
                 (practice_log_id, set_number, rep_number, time, created_at)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(time.practice_log_id.to_string())
            .bind(time.set_number as i64)
            .bind(time.rep_number as i64)
            .bind(time.time)
            .bind(time.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    /// Insert or replace a competition record.
    pub async fn save_record(&self, record: &CompetitionRecord) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO records
             (id, user_id, competition_id, style_id, time, pool_type, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.competition_id.map(|id| id.to_string()))
        .bind(record.style_id.as_i64())
        .bind(record.time)
        .bind(record.pool_type.to_string())
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find or allocate the catalog id for a stroke/distance pair.
    pub async fn ensure_style(&self, stroke: Stroke, distance: u32) -> Result<StyleId> {
        let existing = sqlx::query("SELECT id FROM styles WHERE stroke = ? AND distance = ?")
            .bind(stroke.code())
            .bind(distance as i64)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = existing {
            return Ok(StyleId::from(row.try_get::<i64, _>("id")?));
        }

        let inserted = sqlx::query(
            "INSERT INTO styles (name_jp, name, stroke, distance) VALUES (?, ?, ?, ?)",
        )
        .bind(stroke.label_jp())
        .bind(stroke.label_en())
        .bind(stroke.code())
        .bind(distance as i64)
        .execute(&self.pool)
        .await?;

        Ok(StyleId::from(inserted.last_insert_rowid()))
    }
}

#[async_trait]
impl EvidenceRepository for SqliteStorage {
    async fn find_practice_logs(
        &self,
        user: UserId,
        filter: &PracticeFilter,
    ) -> Result<Vec<PracticeLog>> {
        // Style labels need normalization, so the filter is applied in Rust
        let rows = sqlx::query("SELECT * FROM practice_logs WHERE user_id = ? ORDER BY created_at")
            .bind(user.to_string())
            .fetch_all(&self.pool)
            .await?;

        let mut logs = Vec::new();
        for row in &rows {
            let log = practice_log_from_row(row)?;
            if filter.matches(&log) {
                logs.push(log);
            }
        }
        Ok(logs)
    }

    async fn practice_times(&self, log: PracticeLogId) -> Result<Vec<PracticeTime>> {
        let rows = sqlx::query(
            "SELECT * FROM practice_times WHERE practice_log_id = ?
             ORDER BY set_number, rep_number",
        )
        .bind(log.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(practice_time_from_row).collect()
    }

    async fn find_records(
        &self,
        user: UserId,
        style: &StyleKey,
        distance: u32,
    ) -> Result<Vec<CompetitionRecord>> {
        // Labels outside the stroke catalog can never match a record
        let Some(stroke) = style.stroke() else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            "SELECT r.* FROM records r
             JOIN styles s ON s.id = r.style_id
             WHERE r.user_id = ? AND s.stroke = ? AND s.distance = ?
             ORDER BY r.created_at",
        )
        .bind(user.to_string())
        .bind(stroke.code())
        .bind(distance as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn best_record_time(&self, user: UserId, style: StyleId) -> Result<Option<f64>> {
        let row = sqlx::query(
            "SELECT MIN(time) AS best FROM records
             WHERE user_id = ? AND style_id = ? AND time > 0",
        )
        .bind(user.to_string())
        .bind(style.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get::<Option<f64>, _>("best")?)
    }
}

#[async_trait]
impl MilestoneStore for SqliteStorage {
    async fn load_goals(&self, user: UserId) -> Result<Vec<Goal>> {
        let rows = sqlx::query("SELECT * FROM goals WHERE user_id = ? ORDER BY created_at")
            .bind(user.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(goal_from_row).collect()
    }

    async fn load_milestone(&self, id: MilestoneId) -> Result<Option<Milestone>> {
        let row = sqlx::query("SELECT * FROM milestones WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(milestone_from_row).transpose()
    }

    async fn load_milestones(&self, goal: GoalId) -> Result<Vec<Milestone>> {
        let rows = sqlx::query("SELECT * FROM milestones WHERE goal_id = ? ORDER BY created_at")
            .bind(goal.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(milestone_from_row).collect()
    }

    async fn load_open_milestones(&self, user: UserId) -> Result<Vec<Milestone>> {
        let rows = sqlx::query(
            "SELECT m.* FROM milestones m
             JOIN goals g ON g.id = m.goal_id
             WHERE g.user_id = ? AND m.status != 'achieved'
             ORDER BY m.created_at",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(milestone_from_row).collect()
    }

    async fn load_overdue_milestones(
        &self,
        user: UserId,
        today: NaiveDate,
    ) -> Result<Vec<Milestone>> {
        // ISO dates compare lexicographically
        let rows = sqlx::query(
            "SELECT m.* FROM milestones m
             JOIN goals g ON g.id = m.goal_id
             WHERE g.user_id = ? AND m.status != 'achieved'
               AND m.deadline IS NOT NULL AND m.deadline < ?
               AND m.reflection_done = 0
             ORDER BY m.created_at",
        )
        .bind(user.to_string())
        .bind(today.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(milestone_from_row).collect()
    }

    async fn update_status(
        &self,
        id: MilestoneId,
        expected: MilestoneStatus,
        next: MilestoneStatus,
        achieved_at: Option<Time>,
    ) -> Result<WriteOutcome> {
        let result = sqlx::query(
            "UPDATE milestones
             SET status = ?, achieved_at = COALESCE(achieved_at, ?)
             WHERE id = ? AND status = ?",
        )
        .bind(next.as_str())
        .bind(achieved_at.map(|t| t.to_rfc3339()))
        .bind(id.to_string())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(WriteOutcome::Conflict);
        }
        Ok(WriteOutcome::Applied)
    }
}

// === Row decoding ===

fn parse_field<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| StorageError::Other(format!("bad column value {value:?}: {e}")))
}

fn parse_opt<T>(value: Option<String>) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.as_deref().map(parse_field).transpose()
}

fn goal_from_row(row: &SqliteRow) -> Result<Goal> {
    Ok(Goal {
        id: parse_field(&row.try_get::<String, _>("id")?)?,
        user_id: parse_field(&row.try_get::<String, _>("user_id")?)?,
        competition_id: parse_opt(row.try_get("competition_id")?)?,
        style_id: row.try_get::<Option<i64>, _>("style_id")?.map(StyleId::from),
        target_time: row.try_get("target_time")?,
        start_time: row.try_get("start_time")?,
        status: parse_field(&row.try_get::<String, _>("status")?)?,
        achieved_at: parse_opt(row.try_get("achieved_at")?)?,
        created_at: parse_field(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_field(&row.try_get::<String, _>("updated_at")?)?,
    })
}

fn milestone_from_row(row: &SqliteRow) -> Result<Milestone> {
    Ok(Milestone {
        id: parse_field(&row.try_get::<String, _>("id")?)?,
        goal_id: parse_field(&row.try_get::<String, _>("goal_id")?)?,
        title: row.try_get("title")?,
        kind: parse_field(&row.try_get::<String, _>("kind")?)?,
        params: serde_json::from_str(&row.try_get::<String, _>("params")?)?,
        deadline: parse_opt(row.try_get("deadline")?)?,
        status: parse_field(&row.try_get::<String, _>("status")?)?,
        achieved_at: parse_opt(row.try_get("achieved_at")?)?,
        reflection_done: row.try_get("reflection_done")?,
        reflection_note: row.try_get("reflection_note")?,
        created_at: parse_field(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_field(&row.try_get::<String, _>("updated_at")?)?,
    })
}

fn practice_log_from_row(row: &SqliteRow) -> Result<PracticeLog> {
    Ok(PracticeLog {
        id: parse_field(&row.try_get::<String, _>("id")?)?,
        user_id: parse_field(&row.try_get::<String, _>("user_id")?)?,
        practice_id: parse_field(&row.try_get::<String, _>("practice_id")?)?,
        style: row.try_get("style")?,
        swim_category: parse_field(&row.try_get::<String, _>("swim_category")?)?,
        distance: row.try_get::<i64, _>("distance")? as u32,
        rep_count: row.try_get::<i64, _>("rep_count")? as u32,
        set_count: row.try_get::<i64, _>("set_count")? as u32,
        circle: row.try_get::<Option<i64>, _>("circle")?.map(|c| c as u32),
        date: parse_field(&row.try_get::<String, _>("date")?)?,
        created_at: parse_field(&row.try_get::<String, _>("created_at")?)?,
    })
}

fn practice_time_from_row(row: &SqliteRow) -> Result<PracticeTime> {
    Ok(PracticeTime {
        practice_log_id: parse_field(&row.try_get::<String, _>("practice_log_id")?)?,
        set_number: row.try_get::<i64, _>("set_number")? as u32,
        rep_number: row.try_get::<i64, _>("rep_number")? as u32,
        time: row.try_get("time")?,
        created_at: parse_field(&row.try_get::<String, _>("created_at")?)?,
    })
}

fn record_from_row(row: &SqliteRow) -> Result<CompetitionRecord> {
    Ok(CompetitionRecord {
        id: parse_field(&row.try_get::<String, _>("id")?)?,
        user_id: parse_field(&row.try_get::<String, _>("user_id")?)?,
        competition_id: parse_opt(row.try_get("competition_id")?)?,
        style_id: StyleId::from(row.try_get::<i64, _>("style_id")?),
        time: row.try_get("time")?,
        pool_type: parse_field(&row.try_get::<String, _>("pool_type")?)?,
        created_at: parse_field(&row.try_get::<String, _>("created_at")?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use swimhub_core::{
        MilestoneParams, PoolType, PracticeId, RecordId, SwimCategory, TimeParams,
    };

    fn time_milestone(goal_id: GoalId) -> Milestone {
        Milestone::new(
            goal_id,
            "100m free under a minute",
            MilestoneParams::Time(TimeParams {
                distance: 100,
                target_time: 60.0,
                style: "Fr".to_string(),
            }),
        )
        .unwrap()
    }

    fn practice_log(user: UserId, style: &str, distance: u32) -> PracticeLog {
        PracticeLog {
            id: PracticeLogId::new(),
            user_id: user,
            practice_id: PracticeId::new(),
            style: style.to_string(),
            swim_category: SwimCategory::Swim,
            distance,
            rep_count: 4,
            set_count: 1,
            circle: Some(90),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let goal = Goal::new(UserId::new());
        let milestone = time_milestone(goal.id);

        storage.save_goal(&goal).await.unwrap();
        storage.save_milestone(&milestone).await.unwrap();

        let loaded = storage.load_milestone(milestone.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, milestone.id);
        assert_eq!(loaded.status, MilestoneStatus::NotStarted);
        assert_eq!(
            loaded.typed_params().unwrap(),
            milestone.typed_params().unwrap()
        );

        let open = storage.load_open_milestones(goal.user_id).await.unwrap();
        assert_eq!(open.len(), 1);
    }

    #[tokio::test]
    async fn test_update_status_guards_on_observed_status() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let goal = Goal::new(UserId::new());
        let milestone = time_milestone(goal.id);
        let id = milestone.id;
        storage.save_goal(&goal).await.unwrap();
        storage.save_milestone(&milestone).await.unwrap();

        let now = chrono::Utc::now();
        let applied = storage
            .update_status(id, MilestoneStatus::NotStarted, MilestoneStatus::Achieved, Some(now))
            .await
            .unwrap();
        assert_eq!(applied, WriteOutcome::Applied);

        let stale = storage
            .update_status(
                id,
                MilestoneStatus::NotStarted,
                MilestoneStatus::InProgress,
                None,
            )
            .await
            .unwrap();
        assert_eq!(stale, WriteOutcome::Conflict);

        let loaded = storage.load_milestone(id).await.unwrap().unwrap();
        assert_eq!(loaded.status, MilestoneStatus::Achieved);
        assert!(loaded.achieved_at.is_some());

        // Achieved milestones no longer show up as open
        let open = storage.load_open_milestones(goal.user_id).await.unwrap();
        assert!(open.is_empty());
    }

    #[tokio::test]
    async fn test_overdue_milestones_query() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let goal = Goal::new(UserId::new());
        let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

        let overdue = time_milestone(goal.id)
            .with_deadline(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let upcoming = time_milestone(goal.id)
            .with_deadline(NaiveDate::from_ymd_opt(2024, 8, 1).unwrap());
        let mut reflected = time_milestone(goal.id)
            .with_deadline(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        reflected.reflection_done = true;

        storage.save_goal(&goal).await.unwrap();
        storage.save_milestone(&overdue).await.unwrap();
        storage.save_milestone(&upcoming).await.unwrap();
        storage.save_milestone(&reflected).await.unwrap();

        let loaded = storage
            .load_overdue_milestones(goal.user_id, today)
            .await
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, overdue.id);
    }

    #[tokio::test]
    async fn test_records_resolve_through_style_catalog() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let user = UserId::new();
        let style_id = storage.ensure_style(Stroke::Freestyle, 100).await.unwrap();
        assert_eq!(
            storage.ensure_style(Stroke::Freestyle, 100).await.unwrap(),
            style_id
        );

        for time in [62.1, 59.4] {
            storage
                .save_record(&CompetitionRecord {
                    id: RecordId::new(),
                    user_id: user,
                    competition_id: None,
                    style_id,
                    time,
                    pool_type: PoolType::Short,
                    created_at: chrono::Utc::now(),
                })
                .await
                .unwrap();
        }

        let records = storage
            .find_records(user, &StyleKey::normalize("自由形"), 100)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);

        let none = storage
            .find_records(user, &StyleKey::normalize("sidestroke"), 100)
            .await
            .unwrap();
        assert!(none.is_empty());

        let best = storage.best_record_time(user, style_id).await.unwrap();
        assert_eq!(best, Some(59.4));
    }

    #[tokio::test]
    async fn test_practice_logs_filter_and_times_order() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let user = UserId::new();
        let free = practice_log(user, "freestyle", 100);
        let back = practice_log(user, "背泳ぎ", 100);
        storage.save_practice_log(&free).await.unwrap();
        storage.save_practice_log(&back).await.unwrap();

        let now = chrono::Utc::now();
        storage
            .save_practice_times(&[
                PracticeTime {
                    practice_log_id: free.id,
                    set_number: 1,
                    rep_number: 2,
                    time: 61.0,
                    created_at: now,
                },
                PracticeTime {
                    practice_log_id: free.id,
                    set_number: 1,
                    rep_number: 1,
                    time: 59.8,
                    created_at: now,
                },
            ])
            .await
            .unwrap();

        let filter = PracticeFilter {
            style: Some(StyleKey::normalize("Fr")),
            distance: Some(100),
            ..Default::default()
        };
        let logs = storage.find_practice_logs(user, &filter).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, free.id);

        let times = storage.practice_times(free.id).await.unwrap();
        assert_eq!(times.len(), 2);
        assert_eq!(times[0].rep_number, 1);
    }
}
