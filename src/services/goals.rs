use serde::Serialize;

use crate::models::gamification::WeeklyGoals;
use crate::services::aggregation::WeeklySummary;

/// Rounded percentage of `completed` over `total`; 0 when there is no total.
pub fn progress_percent(completed: i64, total: i64) -> i64 {
    if total > 0 {
        (completed as f64 / total as f64 * 100.0).round() as i64
    } else {
        0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalProgress {
    pub current: i64,
    pub target: i64,
    pub percent: i64,
    pub achieved: bool,
}

impl GoalProgress {
    fn new(current: i64, target: i64) -> Self {
        Self {
            current,
            target,
            percent: progress_percent(current, target),
            achieved: current >= target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyGoalProgress {
    pub questions: GoalProgress,
    pub accuracy: GoalProgress,
    /// Measured in minutes; the target is `study_hours_target * 60`.
    pub study_time: GoalProgress,
}

pub fn goal_progress(
    summary: &WeeklySummary,
    goals: &WeeklyGoals,
    study_minutes: i64,
) -> WeeklyGoalProgress {
    let answered = summary.total_correct + summary.total_incorrect;
    WeeklyGoalProgress {
        questions: GoalProgress::new(answered, i64::from(goals.questions_target)),
        accuracy: GoalProgress::new(
            summary.accuracy_percentage.round() as i64,
            i64::from(goals.accuracy_target),
        ),
        study_time: GoalProgress::new(study_minutes, i64::from(goals.study_hours_target) * 60),
    }
}
