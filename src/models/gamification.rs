use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WeeklyGoals {
    pub questions_target: i32,
    pub study_hours_target: i32,
    pub accuracy_target: i32,
}

impl Default for WeeklyGoals {
    fn default() -> Self {
        Self {
            questions_target: 100,
            study_hours_target: 10,
            accuracy_target: 80,
        }
    }
}

/// Challenge ids grouped by status. An id sits in at most one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DailyChallenges {
    #[sqlx(rename = "challenges_completed")]
    pub completed: Vec<String>,
    #[sqlx(rename = "challenges_in_progress")]
    pub in_progress: Vec<String>,
    #[sqlx(rename = "challenges_locked")]
    pub locked: Vec<String>,
}

/// Points, level, streak and badges for one user.
///
/// `current_level` is only ever written by the progression functions so it
/// always matches `total_points`. `revision` is bumped by the store on every
/// successful write and guards against lost updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GamificationState {
    pub user_id: Uuid,
    pub total_points: i64,
    pub current_level: i32,
    pub streak_days: i32,
    pub last_activity_date: Option<NaiveDate>,
    pub badges_earned: Vec<String>,
    #[sqlx(flatten)]
    pub weekly_goals: WeeklyGoals,
    #[sqlx(flatten)]
    pub daily_challenges: DailyChallenges,
    #[serde(skip_serializing, default)]
    pub revision: i64,
}

impl GamificationState {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            total_points: 0,
            current_level: 1,
            streak_days: 0,
            last_activity_date: None,
            badges_earned: Vec::new(),
            weekly_goals: WeeklyGoals::default(),
            daily_challenges: DailyChallenges::default(),
            revision: 0,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AwardPointsRequest {
    #[validate(range(min = 0, max = 100000, message = "delta must be between 0 and 100000"))]
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceStreakRequest {
    /// Activity date. Default: today (UTC).
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UnlockBadgeRequest {
    #[validate(length(min = 1, max = 64, message = "badge_id must be 1-64 characters"))]
    pub badge_id: String,

    /// Human readable name carried in the unlock event
    #[validate(length(max = 100, message = "badge_name must be under 100 characters"))]
    pub badge_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGoalsRequest {
    #[validate(range(min = 1, max = 10000, message = "questions_target must be 1-10000"))]
    pub questions_target: i32,

    #[validate(range(min = 1, max = 168, message = "study_hours_target must be 1-168"))]
    pub study_hours_target: i32,

    #[validate(range(min = 1, max = 100, message = "accuracy_target must be 1-100"))]
    pub accuracy_target: i32,
}

impl From<UpdateGoalsRequest> for WeeklyGoals {
    fn from(req: UpdateGoalsRequest) -> Self {
        Self {
            questions_target: req.questions_target,
            study_hours_target: req.study_hours_target,
            accuracy_target: req.accuracy_target,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateChallengesRequest {
    #[serde(default)]
    #[validate(length(max = 50, message = "at most 50 completed challenges"))]
    pub completed: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "at most 50 challenges in progress"))]
    pub in_progress: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "at most 50 locked challenges"))]
    pub locked: Vec<String>,
}

impl From<UpdateChallengesRequest> for DailyChallenges {
    fn from(req: UpdateChallengesRequest) -> Self {
        Self {
            completed: req.completed,
            in_progress: req.in_progress,
            locked: req.locked,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GamificationView {
    #[serde(flatten)]
    pub state: GamificationState,
    pub level_title: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AwardPointsResponse {
    #[serde(flatten)]
    pub state: GamificationState,
    pub level_title: &'static str,
    pub leveled_up: bool,
}

#[derive(Debug, Serialize)]
pub struct UnlockBadgeResponse {
    #[serde(flatten)]
    pub state: GamificationState,
    pub already_had: bool,
}
