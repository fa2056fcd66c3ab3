//! Evidence matching - evaluates milestone criteria against training data.
//!
//! One matcher per criteria family, dispatched on the milestone's params.
//! Matching is read-only; all comparisons go through normalized style keys
//! and only recorded (non-zero) times count toward achievement.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use swimhub_core::{
    Milestone, MilestoneParams, PracticeLogId, RecordId, RepsTimeParams, SetParams, StyleKey,
    Time, TimeParams, UserId,
};
use swimhub_storage::{EvidenceRepository, PracticeFilter};

use crate::error::Result;

/// What the evidence says about one milestone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceResult {
    /// The milestone's activity has been attempted at least once
    pub has_progress: bool,

    /// The milestone's criteria are met
    pub achieved: bool,

    /// The evidence behind an achievement; present iff `achieved`
    pub detail: Option<AchievementDetail>,
}

impl EvidenceResult {
    /// Result when no matching evidence exists.
    pub fn none() -> Self {
        Self {
            has_progress: false,
            achieved: false,
            detail: None,
        }
    }
}

/// The winning piece of evidence behind an achievement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementDetail {
    /// Evidence row the achievement comes from
    pub source: EvidenceSource,

    /// Achieved value (seconds for time kinds, completed sets for `set`)
    pub achieved_value: f64,

    /// The target the value was compared against
    pub target_value: f64,
}

/// Where a piece of achievement evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// A practice log
    Practice(PracticeLogId),
    /// A competition record
    Record(RecordId),
}

/// Evaluates milestone criteria against a swimmer's training evidence.
#[derive(Clone)]
pub struct EvidenceMatcher {
    evidence: Arc<dyn EvidenceRepository>,
    since: Option<NaiveDate>,
}

impl EvidenceMatcher {
    /// Create a matcher over an evidence repository.
    pub fn new(evidence: Arc<dyn EvidenceRepository>) -> Self {
        Self {
            evidence,
            since: None,
        }
    }

    /// Ignore practice evidence older than `since`.
    pub fn with_since(mut self, since: NaiveDate) -> Self {
        self.since = Some(since);
        self
    }

    /// Evaluate a milestone's criteria. Read-only.
    pub async fn evaluate(&self, user: UserId, milestone: &Milestone) -> Result<EvidenceResult> {
        debug!(milestone = %milestone.id, kind = %milestone.kind, "evaluating milestone");
        match milestone.typed_params()? {
            MilestoneParams::Time(params) => self.eval_time(user, &params).await,
            MilestoneParams::RepsTime(params) => self.eval_reps_time(user, &params).await,
            MilestoneParams::Set(params) => self.eval_set(user, &params).await,
        }
    }

    /// A single time at or under the target, from practice laps or from
    /// competition records of the same stroke and distance.
    async fn eval_time(&self, user: UserId, params: &TimeParams) -> Result<EvidenceResult> {
        let style = StyleKey::normalize(&params.style);
        let filter = PracticeFilter {
            style: Some(style.clone()),
            distance: Some(params.distance),
            since: self.since,
            ..Default::default()
        };
        let logs = self.evidence.find_practice_logs(user, &filter).await?;

        let mut candidates: Vec<(f64, Time, EvidenceSource)> = Vec::new();
        for log in &logs {
            let times = self.evidence.practice_times(log.id).await?;
            for lap in times.iter().filter(|t| t.is_recorded()) {
                if lap.time <= params.target_time {
                    candidates.push((lap.time, log.created_at, EvidenceSource::Practice(log.id)));
                }
            }
        }

        let records = self
            .evidence
            .find_records(user, &style, params.distance)
            .await?;
        for record in &records {
            if record.time > 0.0 && record.time <= params.target_time {
                candidates.push((record.time, record.created_at, EvidenceSource::Record(record.id)));
            }
        }

        // An attempted log counts as progress even before any lap is timed
        let has_progress = !logs.is_empty() || !records.is_empty();
        Ok(build_result(has_progress, candidates, params.target_time))
    }

    /// Mean of one log's recorded laps at or under the target, over the
    /// exact prescribed scheme.
    async fn eval_reps_time(
        &self,
        user: UserId,
        params: &RepsTimeParams,
    ) -> Result<EvidenceResult> {
        let filter = PracticeFilter {
            style: Some(StyleKey::normalize(&params.style)),
            swim_category: Some(params.swim_category),
            distance: Some(params.distance),
            rep_count: Some(params.reps),
            set_count: Some(params.sets),
            circle: Some(params.circle),
            since: self.since,
        };
        let logs = self.evidence.find_practice_logs(user, &filter).await?;
        let has_progress = !logs.is_empty();

        let mut candidates: Vec<(f64, Time, EvidenceSource)> = Vec::new();
        for log in &logs {
            let times = self.evidence.practice_times(log.id).await?;
            let recorded: Vec<f64> = times
                .iter()
                .filter(|t| t.is_recorded())
                .map(|t| t.time)
                .collect();
            if recorded.is_empty() {
                continue;
            }
            let mean = recorded.iter().sum::<f64>() / recorded.len() as f64;
            if mean <= params.target_average_time {
                candidates.push((mean, log.created_at, EvidenceSource::Practice(log.id)));
            }
        }

        Ok(build_result(
            has_progress,
            candidates,
            params.target_average_time,
        ))
    }

    /// Completion of the exact prescribed scheme; no time criterion, so one
    /// matching log is progress and achievement at once.
    async fn eval_set(&self, user: UserId, params: &SetParams) -> Result<EvidenceResult> {
        let filter = PracticeFilter {
            style: Some(StyleKey::normalize(&params.style)),
            swim_category: Some(params.swim_category),
            distance: Some(params.distance),
            rep_count: Some(params.reps),
            set_count: Some(params.sets),
            circle: Some(params.circle),
            since: self.since,
        };
        let logs = self.evidence.find_practice_logs(user, &filter).await?;

        let Some(log) = logs.iter().min_by_key(|log| log.created_at) else {
            return Ok(EvidenceResult::none());
        };
        Ok(EvidenceResult {
            has_progress: true,
            achieved: true,
            detail: Some(AchievementDetail {
                source: EvidenceSource::Practice(log.id),
                achieved_value: f64::from(log.set_count),
                target_value: f64::from(params.sets),
            }),
        })
    }
}

/// Pick the winner among qualifying values: minimum value first, then the
/// earliest-created evidence row on exact ties.
fn build_result(
    has_progress: bool,
    candidates: Vec<(f64, Time, EvidenceSource)>,
    target: f64,
) -> EvidenceResult {
    let winner = candidates.into_iter().min_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });
    match winner {
        Some((value, _, source)) => EvidenceResult {
            has_progress: true,
            achieved: true,
            detail: Some(AchievementDetail {
                source,
                achieved_value: value,
                target_value: target,
            }),
        },
        None => EvidenceResult {
            has_progress,
            achieved: false,
            detail: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use swimhub_core::{
        CompetitionRecord, GoalId, Milestone, PoolType, PracticeId, PracticeLog, PracticeTime,
        Stroke, Style, StyleId, SwimCategory,
    };
    use swimhub_storage::MemoryStore;

    fn practice_log(user: UserId, style: &str, distance: u32, created_at: Time) -> PracticeLog {
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
            created_at,
        }
    }

    fn lap(log: PracticeLogId, rep: u32, time: f64) -> PracticeTime {
        PracticeTime {
            practice_log_id: log,
            set_number: 1,
            rep_number: rep,
            time,
            created_at: chrono::Utc::now(),
        }
    }

    fn time_milestone(target: f64) -> Milestone {
        Milestone::new(
            GoalId::new(),
            "time target",
            MilestoneParams::Time(TimeParams {
                distance: 100,
                target_time: target,
                style: "Fr".to_string(),
            }),
        )
        .unwrap()
    }

    fn reps_milestone(target_average: f64) -> Milestone {
        Milestone::new(
            GoalId::new(),
            "interval target",
            MilestoneParams::RepsTime(RepsTimeParams {
                distance: 100,
                reps: 4,
                sets: 1,
                target_average_time: target_average,
                style: "Fr".to_string(),
                swim_category: SwimCategory::Swim,
                circle: 90,
            }),
        )
        .unwrap()
    }

    fn set_milestone() -> Milestone {
        Milestone::new(
            GoalId::new(),
            "complete the set",
            MilestoneParams::Set(SetParams {
                distance: 100,
                reps: 4,
                sets: 1,
                style: "Fr".to_string(),
                swim_category: SwimCategory::Swim,
                circle: 90,
            }),
        )
        .unwrap()
    }

    async fn fixture() -> (Arc<MemoryStore>, EvidenceMatcher, UserId) {
        let store = Arc::new(MemoryStore::new());
        let matcher = EvidenceMatcher::new(store.clone());
        (store, matcher, UserId::new())
    }

    #[tokio::test]
    async fn test_time_achieved_under_target() {
        let (store, matcher, user) = fixture().await;
        let log = practice_log(user, "freestyle", 100, chrono::Utc::now());
        store.insert_practice_log(log.clone()).await;
        store.insert_practice_time(lap(log.id, 1, 61.2)).await;
        store.insert_practice_time(lap(log.id, 2, 59.8)).await;

        let result = matcher.evaluate(user, &time_milestone(60.0)).await.unwrap();
        assert!(result.achieved);
        assert!(result.has_progress);
        assert_eq!(
            result.detail,
            Some(AchievementDetail {
                source: EvidenceSource::Practice(log.id),
                achieved_value: 59.8,
                target_value: 60.0,
            })
        );
    }

    #[tokio::test]
    async fn test_time_exactly_at_target_counts() {
        let (store, matcher, user) = fixture().await;
        let log = practice_log(user, "Fr", 100, chrono::Utc::now());
        store.insert_practice_log(log.clone()).await;
        store.insert_practice_time(lap(log.id, 1, 60.0)).await;

        let result = matcher.evaluate(user, &time_milestone(60.0)).await.unwrap();
        assert!(result.achieved);
    }

    #[tokio::test]
    async fn test_time_zero_laps_are_progress_only() {
        let (store, matcher, user) = fixture().await;
        let log = practice_log(user, "Fr", 100, chrono::Utc::now());
        store.insert_practice_log(log.clone()).await;
        store.insert_practice_time(lap(log.id, 1, 0.0)).await;
        store.insert_practice_time(lap(log.id, 2, 0.0)).await;

        let result = matcher.evaluate(user, &time_milestone(60.0)).await.unwrap();
        assert!(result.has_progress);
        assert!(!result.achieved);
        assert_eq!(result.detail, None);
    }

    #[tokio::test]
    async fn test_time_no_matching_evidence() {
        let (store, matcher, user) = fixture().await;
        // A log for a different distance never matches
        let log = practice_log(user, "Fr", 200, chrono::Utc::now());
        store.insert_practice_log(log).await;

        let result = matcher.evaluate(user, &time_milestone(60.0)).await.unwrap();
        assert_eq!(result, EvidenceResult::none());
    }

    #[tokio::test]
    async fn test_time_style_spellings_fold_together() {
        let (store, matcher, user) = fixture().await;
        let log = practice_log(user, "自由形", 100, chrono::Utc::now());
        store.insert_practice_log(log.clone()).await;
        store.insert_practice_time(lap(log.id, 1, 58.0)).await;

        let result = matcher.evaluate(user, &time_milestone(60.0)).await.unwrap();
        assert!(result.achieved);

        let other = practice_log(user, "backstroke", 100, chrono::Utc::now());
        store.insert_practice_log(other.clone()).await;
        store.insert_practice_time(lap(other.id, 1, 55.0)).await;

        // The backstroke lap is faster but belongs to another stroke
        let result = matcher.evaluate(user, &time_milestone(60.0)).await.unwrap();
        assert_eq!(
            result.detail.unwrap().source,
            EvidenceSource::Practice(log.id)
        );
    }

    #[tokio::test]
    async fn test_time_competition_record_achieves() {
        let (store, matcher, user) = fixture().await;
        let style_id = StyleId::from(1);
        store
            .insert_style(Style::new(style_id, Stroke::Freestyle, 100))
            .await;
        let record = CompetitionRecord {
            id: RecordId::new(),
            user_id: user,
            competition_id: None,
            style_id,
            time: 59.4,
            pool_type: PoolType::Short,
            created_at: chrono::Utc::now(),
        };
        store.insert_record(record.clone()).await;

        let result = matcher.evaluate(user, &time_milestone(60.0)).await.unwrap();
        assert!(result.achieved);
        assert_eq!(
            result.detail.unwrap().source,
            EvidenceSource::Record(record.id)
        );
    }

    #[tokio::test]
    async fn test_time_minimum_wins_then_earliest() {
        let (store, matcher, user) = fixture().await;
        let base = chrono::Utc::now();

        let early = practice_log(user, "Fr", 100, base);
        let late = practice_log(user, "Fr", 100, base + Duration::seconds(10));
        store.insert_practice_log(early.clone()).await;
        store.insert_practice_log(late.clone()).await;
        store.insert_practice_time(lap(early.id, 1, 59.8)).await;
        store.insert_practice_time(lap(late.id, 1, 59.8)).await;

        // Exact tie on value: the earlier log wins
        let result = matcher.evaluate(user, &time_milestone(60.0)).await.unwrap();
        assert_eq!(
            result.detail.unwrap().source,
            EvidenceSource::Practice(early.id)
        );

        // A lower value beats an earlier one
        store.insert_practice_time(lap(late.id, 2, 59.4)).await;
        let result = matcher.evaluate(user, &time_milestone(60.0)).await.unwrap();
        let detail = result.detail.unwrap();
        assert_eq!(detail.source, EvidenceSource::Practice(late.id));
        assert_eq!(detail.achieved_value, 59.4);
    }

    #[tokio::test]
    async fn test_reps_time_average_against_target() {
        let (store, matcher, user) = fixture().await;
        let log = practice_log(user, "Fr", 100, chrono::Utc::now());
        store.insert_practice_log(log.clone()).await;
        for (rep, time) in [(1, 62.0), (2, 63.0), (3, 64.0), (4, 64.0)] {
            store.insert_practice_time(lap(log.id, rep, time)).await;
        }

        // Mean 63.25 against target 65.0
        let result = matcher
            .evaluate(user, &reps_milestone(65.0))
            .await
            .unwrap();
        assert!(result.achieved);
        assert_eq!(result.detail.unwrap().achieved_value, 63.25);

        // Same log against a target the mean misses
        let result = matcher
            .evaluate(user, &reps_milestone(63.0))
            .await
            .unwrap();
        assert!(result.has_progress);
        assert!(!result.achieved);
    }

    #[tokio::test]
    async fn test_reps_time_requires_exact_scheme() {
        let (store, matcher, user) = fixture().await;
        let mut log = practice_log(user, "Fr", 100, chrono::Utc::now());
        log.circle = Some(60);
        store.insert_practice_log(log.clone()).await;
        store.insert_practice_time(lap(log.id, 1, 60.0)).await;

        // Prescribed circle is 90; a 60-second circle is a different workout
        let result = matcher
            .evaluate(user, &reps_milestone(65.0))
            .await
            .unwrap();
        assert_eq!(result, EvidenceResult::none());
    }

    #[tokio::test]
    async fn test_reps_time_mean_skips_unrecorded_laps() {
        let (store, matcher, user) = fixture().await;
        let log = practice_log(user, "Fr", 100, chrono::Utc::now());
        store.insert_practice_log(log.clone()).await;
        store.insert_practice_time(lap(log.id, 1, 0.0)).await;
        store.insert_practice_time(lap(log.id, 2, 64.0)).await;

        let result = matcher
            .evaluate(user, &reps_milestone(65.0))
            .await
            .unwrap();
        assert!(result.achieved);
        assert_eq!(result.detail.unwrap().achieved_value, 64.0);
    }

    #[tokio::test]
    async fn test_set_completion_achieves_without_times() {
        let (store, matcher, user) = fixture().await;
        let log = practice_log(user, "freestyle", 100, chrono::Utc::now());
        store.insert_practice_log(log.clone()).await;

        let result = matcher.evaluate(user, &set_milestone()).await.unwrap();
        assert!(result.achieved);
        assert_eq!(
            result.detail,
            Some(AchievementDetail {
                source: EvidenceSource::Practice(log.id),
                achieved_value: 1.0,
                target_value: 1.0,
            })
        );
    }

    #[tokio::test]
    async fn test_since_window_excludes_older_practice() {
        let (store, _, user) = fixture().await;
        let matcher = EvidenceMatcher::new(store.clone())
            .with_since(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

        let mut old = practice_log(user, "Fr", 100, chrono::Utc::now());
        old.date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        store.insert_practice_log(old.clone()).await;
        store.insert_practice_time(lap(old.id, 1, 58.0)).await;

        let result = matcher.evaluate(user, &time_milestone(60.0)).await.unwrap();
        assert!(!result.has_progress);

        let recent = practice_log(user, "Fr", 100, chrono::Utc::now());
        store.insert_practice_log(recent.clone()).await;
        let result = matcher.evaluate(user, &time_milestone(60.0)).await.unwrap();
        assert!(result.has_progress);
    }
}
