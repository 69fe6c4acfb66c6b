use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::summary::load_weekly_summary;
use crate::services::aggregation;
use crate::services::tips::{self, PersonalTips};
use crate::AppState;

/// Study and motivation tips built from the current trailing week.
pub async fn get_tips(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<PersonalTips>> {
    let window = aggregation::trailing_week(Utc::now().date_naive())?;
    let summary = load_weekly_summary(&state, user_id, window).await?;
    Ok(Json(tips::personalized_tips(&summary)))
}
