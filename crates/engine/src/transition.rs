//! The status transition rule.

use swimhub_core::{MilestoneStatus, Time};

use crate::matcher::EvidenceResult;

/// A decided status change, ready to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Status to move to
    pub status: MilestoneStatus,

    /// Achievement stamp, set only on the transition into `Achieved`
    pub achieved_at: Option<Time>,
}

/// Decide the next status for a milestone, `None` meaning "write nothing".
///
/// `Achieved` is terminal and never changes. Fresh achievement moves the
/// milestone to `Achieved` stamped with `now`; first-seen progress moves
/// `NotStarted` to `InProgress`. Evidence weaker than the current status
/// never moves a milestone back.
pub fn next_status(
    current: MilestoneStatus,
    evidence: &EvidenceResult,
    now: Time,
) -> Option<Transition> {
    match current {
        MilestoneStatus::Achieved => None,
        MilestoneStatus::NotStarted | MilestoneStatus::InProgress if evidence.achieved => {
            Some(Transition {
                status: MilestoneStatus::Achieved,
                achieved_at: Some(now),
            })
        }
        MilestoneStatus::NotStarted if evidence.has_progress => Some(Transition {
            status: MilestoneStatus::InProgress,
            achieved_at: None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(has_progress: bool, achieved: bool) -> EvidenceResult {
        EvidenceResult {
            has_progress,
            achieved,
            detail: None,
        }
    }

    #[test]
    fn test_transition_table() {
        use MilestoneStatus::*;
        let now = chrono::Utc::now();

        let cases: [(MilestoneStatus, bool, bool, Option<MilestoneStatus>); 9] = [
            (NotStarted, false, false, None),
            (NotStarted, true, false, Some(InProgress)),
            (NotStarted, true, true, Some(Achieved)),
            (InProgress, false, false, None),
            (InProgress, true, false, None),
            (InProgress, true, true, Some(Achieved)),
            (Achieved, false, false, None),
            (Achieved, true, false, None),
            (Achieved, true, true, None),
        ];

        for (current, has_progress, achieved, expected) in cases {
            let next = next_status(current, &evidence(has_progress, achieved), now);
            assert_eq!(
                next.map(|t| t.status),
                expected,
                "from {current} with progress={has_progress} achieved={achieved}"
            );
        }
    }

    #[test]
    fn test_achieved_at_stamped_only_on_achievement() {
        let now = chrono::Utc::now();

        let achieved = next_status(MilestoneStatus::InProgress, &evidence(true, true), now)
            .unwrap();
        assert_eq!(achieved.achieved_at, Some(now));

        let progressed = next_status(MilestoneStatus::NotStarted, &evidence(true, false), now)
            .unwrap();
        assert_eq!(progressed.achieved_at, None);
    }
}
