use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::reminder::{
    CreateReminderRequest, DueRemindersQuery, StudyReminder, UpdateReminderRequest,
};
use crate::services::reminders;
use crate::store::ReminderStore;
use crate::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Reminder not found".into())
}

pub async fn list_reminders(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<StudyReminder>>> {
    Ok(Json(state.store.list_reminders(user_id).await?))
}

pub async fn create_reminder(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<CreateReminderRequest>,
) -> AppResult<(StatusCode, Json<StudyReminder>)> {
    body.validate()?;

    let reminder = StudyReminder {
        id: Uuid::new_v4(),
        user_id,
        text: body.text,
        time: body.time,
        days: reminders::normalize_days(body.days),
        active: true,
    };
    let saved = state.store.insert_reminder(&reminder).await?;

    tracing::debug!(user_id = %user_id, reminder_id = %saved.id, time = %saved.time, "Reminder created");

    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn update_reminder(
    State(state): State<AppState>,
    Path((user_id, reminder_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateReminderRequest>,
) -> AppResult<Json<StudyReminder>> {
    body.validate()?;

    let current = state
        .store
        .get_reminder(user_id, reminder_id)
        .await?
        .ok_or_else(not_found)?;

    let next = reminders::apply_update(&current, &body);
    let saved = state
        .store
        .update_reminder(&next)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(saved))
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    Path((user_id, reminder_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    if !state.store.delete_reminder(user_id, reminder_id).await? {
        return Err(not_found());
    }

    tracing::debug!(user_id = %user_id, reminder_id = %reminder_id, "Reminder deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Active reminders scheduled for the weekday and minute of `at`.
pub async fn due_reminders(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<DueRemindersQuery>,
) -> AppResult<Json<Vec<StudyReminder>>> {
    let at = query.at.unwrap_or_else(|| Utc::now().naive_utc());
    let all = state.store.list_reminders(user_id).await?;
    Ok(Json(reminders::due(&all, at)))
}
