use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::ws::{publish, ProgressEvent};
use crate::models::gamification::{
    AdvanceStreakRequest, AwardPointsRequest, AwardPointsResponse, DailyChallenges,
    GamificationState, GamificationView, UnlockBadgeRequest, UnlockBadgeResponse,
    UpdateChallengesRequest, UpdateGoalsRequest, WeeklyGoals,
};
use crate::services::{badges, challenges, progression};
use crate::store::{update_gamification, ProgressStore};
use crate::AppState;

pub async fn get_gamification(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<GamificationView>> {
    let gamification = state.store.get_or_create_gamification(user_id).await?;
    let level_title = progression::level_title(gamification.current_level);

    Ok(Json(GamificationView {
        state: gamification,
        level_title,
    }))
}

pub async fn award_points(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<AwardPointsRequest>,
) -> AppResult<Json<AwardPointsResponse>> {
    body.validate()?;

    let (saved, leveled_up) = update_gamification(state.store.as_ref(), user_id, |current| {
        Ok(progression::award_points(current, body.delta))
    })
    .await?;
    let level_title = progression::level_title(saved.current_level);

    if leveled_up {
        tracing::info!(user_id = %user_id, level = saved.current_level, "Level up");
        publish(
            &state,
            &ProgressEvent::LevelUp {
                user_id,
                level: saved.current_level,
                title: level_title.to_string(),
                total_points: saved.total_points,
            },
        );
    }

    Ok(Json(AwardPointsResponse {
        state: saved,
        level_title,
        leveled_up,
    }))
}

pub async fn advance_streak(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<AdvanceStreakRequest>,
) -> AppResult<Json<GamificationState>> {
    let today = body.today.unwrap_or_else(|| Utc::now().date_naive());

    let (saved, ()) = update_gamification(state.store.as_ref(), user_id, |current| {
        progression::advance_streak(current, today).map(|next| (next, ()))
    })
    .await?;

    Ok(Json(saved))
}

pub async fn unlock_badge(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UnlockBadgeRequest>,
) -> AppResult<Json<UnlockBadgeResponse>> {
    body.validate()?;

    let (saved, already_had) = update_gamification(state.store.as_ref(), user_id, |current| {
        Ok(badges::unlock(current, &body.badge_id))
    })
    .await?;

    if !already_had {
        tracing::info!(user_id = %user_id, badge_id = %body.badge_id, "Badge unlocked");
        publish(
            &state,
            &ProgressEvent::BadgeUnlocked {
                user_id,
                badge_id: body.badge_id.clone(),
                badge_name: body.badge_name.clone(),
            },
        );
    }

    Ok(Json(UnlockBadgeResponse {
        state: saved,
        already_had,
    }))
}

pub async fn update_goals(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateGoalsRequest>,
) -> AppResult<Json<GamificationState>> {
    body.validate()?;
    let goals = WeeklyGoals::from(body);

    let (saved, ()) = update_gamification(state.store.as_ref(), user_id, |current| {
        let mut next = current.clone();
        next.weekly_goals = goals;
        Ok((next, ()))
    })
    .await?;

    Ok(Json(saved))
}

pub async fn update_challenges(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateChallengesRequest>,
) -> AppResult<Json<GamificationState>> {
    body.validate()?;
    let board = DailyChallenges::from(body);

    let (saved, completed) = update_gamification(state.store.as_ref(), user_id, |current| {
        let next = challenges::replace(current, board.clone())?;
        let completed = challenges::newly_completed(&current.daily_challenges, &next.daily_challenges);
        Ok((next, completed))
    })
    .await?;

    for challenge_id in completed {
        tracing::info!(user_id = %user_id, challenge_id = %challenge_id, "Challenge completed");
        publish(
            &state,
            &ProgressEvent::ChallengeCompleted {
                user_id,
                challenge_id,
            },
        );
    }

    Ok(Json(saved))
}
