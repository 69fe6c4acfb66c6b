//! Levels from cumulative points, and daily streak bookkeeping.

use chrono::NaiveDate;

use crate::models::gamification::GamificationState;
use crate::services::DomainError;

#[derive(Debug, Clone, Copy)]
pub struct Level {
    pub level: i32,
    pub points_required: i64,
    pub title: &'static str,
}

/// Inclusive lower bounds, ascending.
pub static LEVELS: &[Level] = &[
    Level { level: 1, points_required: 0, title: "Bronz" },
    Level { level: 2, points_required: 100, title: "Bronz" },
    Level { level: 3, points_required: 300, title: "Gümüş" },
    Level { level: 4, points_required: 600, title: "Gümüş" },
    Level { level: 5, points_required: 1000, title: "Altın" },
    Level { level: 6, points_required: 1500, title: "Altın" },
    Level { level: 7, points_required: 2100, title: "Altın" },
    Level { level: 8, points_required: 2800, title: "Platin" },
    Level { level: 9, points_required: 3600, title: "Platin" },
    Level { level: 10, points_required: 4500, title: "Elmas" },
];

pub fn level_for(total_points: i64) -> i32 {
    LEVELS
        .iter()
        .rev()
        .find(|l| total_points >= l.points_required)
        .map_or(1, |l| l.level)
}

pub fn level_title(level: i32) -> &'static str {
    LEVELS
        .iter()
        .find(|l| l.level == level)
        .map_or("Bronz", |l| l.title)
}

/// Adds `delta` points and recomputes the level. The flag reports whether
/// the level went up; emitting the notification is the caller's job.
pub fn award_points(state: &GamificationState, delta: i64) -> (GamificationState, bool) {
    let mut next = state.clone();
    next.total_points = state.total_points.saturating_add(delta).max(0);
    next.current_level = level_for(next.total_points);
    let leveled_up = next.current_level > state.current_level;
    (next, leveled_up)
}

/// Records activity on `today`: consecutive days extend the streak, a gap
/// resets it to 1 and a repeat on the same day changes nothing.
pub fn advance_streak(
    state: &GamificationState,
    today: NaiveDate,
) -> Result<GamificationState, DomainError> {
    let streak_days = match state.last_activity_date {
        None => 1,
        Some(last_activity) => match (today - last_activity).num_days() {
            diff if diff < 0 => {
                return Err(DomainError::InvalidTemporalOrder {
                    last_activity,
                    today,
                })
            }
            0 => state.streak_days,
            1 => state.streak_days.saturating_add(1),
            _ => 1,
        },
    };

    let mut next = state.clone();
    next.streak_days = streak_days;
    next.last_activity_date = Some(today);
    Ok(next)
}
