use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::study_session::{
    EndSessionRequest, SessionListQuery, StartSessionRequest, StudySession,
};
use crate::services::study;
use crate::store::StudySessionStore;
use crate::AppState;

const DEFAULT_SESSION_LIMIT: i64 = 10;
const MAX_SESSION_LIMIT: i64 = 100;

pub async fn start_session(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<StartSessionRequest>,
) -> AppResult<(StatusCode, Json<StudySession>)> {
    let session = StudySession::start(user_id, body.subject, body.session_type, Utc::now());
    let saved = state.store.insert_study_session(&session).await?;

    tracing::debug!(
        user_id = %user_id,
        session_id = %saved.id,
        subject = %saved.subject,
        "Study session started"
    );

    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn end_session(
    State(state): State<AppState>,
    Path((user_id, session_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<EndSessionRequest>,
) -> AppResult<Json<StudySession>> {
    body.validate()?;

    let session = state
        .store
        .get_study_session(user_id, session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Study session not found".into()))?;

    let finished = study::finish(&session, &body, Utc::now())?;
    let saved = state
        .store
        .close_study_session(&finished)
        .await?
        .ok_or_else(|| AppError::Conflict("Study session was ended concurrently".into()))?;

    tracing::info!(
        user_id = %user_id,
        session_id = %session_id,
        minutes = saved.duration_minutes.unwrap_or(0),
        "Study session ended"
    );

    Ok(Json(saved))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<SessionListQuery>,
) -> AppResult<Json<Vec<StudySession>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SESSION_LIMIT)
        .clamp(1, MAX_SESSION_LIMIT);

    let sessions = state.store.recent_study_sessions(user_id, limit).await?;
    Ok(Json(sessions))
}
