use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::models::motivation::MotivationSnapshot;
use crate::services::motivation::{self, MotivationAssessment};
use crate::services::tips;
use crate::store::ProgressStore;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MotivationResponse {
    #[serde(flatten)]
    pub assessment: MotivationAssessment,
    pub snapshot: MotivationSnapshot,
    pub daily_message: &'static str,
}

pub async fn put_snapshot(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<MotivationSnapshot>,
) -> AppResult<Json<MotivationSnapshot>> {
    body.validate()?;
    let saved = state.store.put_motivation_snapshot(user_id, &body).await?;
    Ok(Json(saved))
}

pub async fn get_motivation(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<MotivationResponse>> {
    let snapshot = state.store.fetch_motivation_snapshot(user_id).await?;
    let assessment = motivation::score_tier(&snapshot);
    tracing::debug!(
        user_id = %user_id,
        score = assessment.score,
        tier = assessment.tier.label(),
        "Motivation scored"
    );
    // ThreadRng is !Send; draw only after the last await.
    let daily_message = tips::daily_message(&mut rand::thread_rng());

    Ok(Json(MotivationResponse {
        assessment,
        snapshot,
        daily_message,
    }))
}
