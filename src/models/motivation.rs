use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Latest activity aggregate reported by the telemetry side for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct MotivationSnapshot {
    #[validate(range(min = 0, message = "study_time_minutes must not be negative"))]
    pub study_time_minutes: i32,

    #[validate(range(min = 0.0, max = 100.0, message = "accuracy_percentage must be 0-100"))]
    pub accuracy_percentage: f64,

    #[validate(range(min = 0, message = "streak_days must not be negative"))]
    pub streak_days: i32,

    #[validate(range(min = 0, message = "goals_completed must not be negative"))]
    pub goals_completed: i32,
}
