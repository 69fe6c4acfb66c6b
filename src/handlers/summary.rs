use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::daily_record::{DateRange, Subject};
use crate::services::aggregation::{self, WeeklySummary};
use crate::services::goals::{self, WeeklyGoalProgress};
use crate::services::study;
use crate::store::{ProgressStore, StudySessionStore};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WeeklySummaryQuery {
    /// Last day of the window. Default: today (UTC).
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct WeeklySummaryResponse {
    #[serde(flatten)]
    pub summary: WeeklySummary,
    /// Finished study-session minutes inside the window.
    pub study_minutes: i64,
    pub goals: WeeklyGoalProgress,
}

/// Summary over `window`, shared with the tips endpoint.
pub(crate) async fn load_weekly_summary(
    state: &AppState,
    user_id: Uuid,
    window: DateRange,
) -> AppResult<WeeklySummary> {
    let records = state.store.fetch_records(user_id, window).await?;
    Ok(aggregation::summarize_window(&records, window, &Subject::ALL)?)
}

pub async fn get_weekly_summary(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<WeeklySummaryQuery>,
) -> AppResult<Json<WeeklySummaryResponse>> {
    let reference = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let window = aggregation::trailing_week(reference)?;

    let summary = load_weekly_summary(&state, user_id, window).await?;
    let sessions = state.store.fetch_study_sessions(user_id, window).await?;
    let study_minutes = study::minutes_in_window(&sessions, window);
    let gamification = state.store.get_or_create_gamification(user_id).await?;
    let goals = goals::goal_progress(&summary, &gamification.weekly_goals, study_minutes);

    tracing::debug!(
        user_id = %user_id,
        best = summary.best_subject_label(),
        worst = summary.worst_subject_label(),
        "Weekly summary computed"
    );

    Ok(Json(WeeklySummaryResponse {
        summary,
        study_minutes,
        goals,
    }))
}
