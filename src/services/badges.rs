use crate::models::gamification::GamificationState;

/// Adds `badge_id` to the earned set. Unlocking a badge the user already
/// holds returns the state untouched with `already_had = true`.
pub fn unlock(state: &GamificationState, badge_id: &str) -> (GamificationState, bool) {
    if state.badges_earned.iter().any(|b| b == badge_id) {
        return (state.clone(), true);
    }

    let mut next = state.clone();
    next.badges_earned.push(badge_id.to_string());
    (next, false)
}
