use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::daily_record::{DailyRecord, DailyRecordQuery, DateRange, UpsertDailyRecordRequest};
use crate::services::aggregation;
use crate::store::ProgressStore;
use crate::AppState;

const DEFAULT_HISTORY_DAYS: i64 = 30;

pub async fn upsert_daily_record(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpsertDailyRecordRequest>,
) -> AppResult<Json<DailyRecord>> {
    let today = Utc::now().date_naive();
    let date = body.date.unwrap_or(today);

    // Allow one day of clock skew for clients ahead of UTC
    if date > today + Duration::days(1) {
        return Err(AppError::Validation(
            "date cannot be more than one day in the future".into(),
        ));
    }

    let mut record = DailyRecord::new(user_id, date);
    record.scores.extend(body.scores);
    aggregation::validate_record(&record)?;

    let saved = state.store.upsert_daily_record(&record).await?;
    tracing::debug!(user_id = %user_id, date = %date, "Daily record saved");

    Ok(Json(saved))
}

pub async fn list_daily_records(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<DailyRecordQuery>,
) -> AppResult<Json<Vec<DailyRecord>>> {
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let start = match query.start_date {
        Some(start) => start,
        None => end
            .checked_sub_signed(Duration::days(DEFAULT_HISTORY_DAYS))
            .ok_or_else(|| AppError::Validation("end_date is out of range".into()))?,
    };

    if start > end {
        return Err(AppError::Validation(
            "start_date must not be after end_date".into(),
        ));
    }

    let records = state
        .store
        .fetch_records(user_id, DateRange { start, end })
        .await?;

    Ok(Json(records))
}
