//! Goal progress estimation from competition results.

use swimhub_core::Goal;

/// How far a goal has come, as a percentage of the gap between its
/// baseline time and its target time closed by `current_best`.
///
/// Returns `None` when the goal has no target or baseline or no best time
/// is known yet. A best time at or under the target is always 100; a goal
/// whose baseline already met the target reports 0 until the target is
/// reached. The result is clamped to `0.0..=100.0`.
pub fn goal_progress(goal: &Goal, current_best: Option<f64>) -> Option<f64> {
    let target = goal.target_time?;
    let start = goal.start_time?;
    let best = current_best?;

    if best <= target {
        return Some(100.0);
    }
    if start <= target {
        return Some(0.0);
    }
    Some(((start - best) / (start - target) * 100.0).clamp(0.0, 100.0))
}
