use std::collections::HashSet;

use crate::models::gamification::{DailyChallenges, GamificationState};
use crate::services::DomainError;

const MAX_CHALLENGE_ID_LEN: usize = 64;

/// Replaces the challenge board. Duplicates inside one list collapse to the
/// first occurrence; an id listed under two statuses is rejected.
pub fn replace(
    state: &GamificationState,
    challenges: DailyChallenges,
) -> Result<GamificationState, DomainError> {
    let mut seen = HashSet::new();
    let mut clean = |ids: Vec<String>| -> Result<Vec<String>, DomainError> {
        let mut kept: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.trim().to_string();
            if id.is_empty() || id.len() > MAX_CHALLENGE_ID_LEN {
                return Err(DomainError::MalformedInput(format!(
                    "challenge id must be 1-{} characters",
                    MAX_CHALLENGE_ID_LEN
                )));
            }
            if kept.contains(&id) {
                continue;
            }
            if !seen.insert(id.clone()) {
                return Err(DomainError::MalformedInput(format!(
                    "challenge {} appears under more than one status",
                    id
                )));
            }
            kept.push(id);
        }
        Ok(kept)
    };

    let board = DailyChallenges {
        completed: clean(challenges.completed)?,
        in_progress: clean(challenges.in_progress)?,
        locked: clean(challenges.locked)?,
    };

    let mut next = state.clone();
    next.daily_challenges = board;
    Ok(next)
}

/// Ids completed in `after` that were not completed in `before`.
pub fn newly_completed(before: &DailyChallenges, after: &DailyChallenges) -> Vec<String> {
    after
        .completed
        .iter()
        .filter(|id| !before.completed.contains(id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn board(completed: &[&str], in_progress: &[&str], locked: &[&str]) -> DailyChallenges {
        let owned = |ids: &[&str]| ids.iter().map(|s| s.to_string()).collect();
        DailyChallenges {
            completed: owned(completed),
            in_progress: owned(in_progress),
            locked: owned(locked),
        }
    }

    #[test]
    fn test_replace_sets_board() {
        let state = GamificationState::new(Uuid::nil());
        let next = replace(&state, board(&["solve_20"], &["study_60"], &["perfect_day"])).unwrap();
        assert_eq!(next.daily_challenges, board(&["solve_20"], &["study_60"], &["perfect_day"]));
        assert_eq!(next.total_points, state.total_points);
    }

    #[test]
    fn test_replace_collapses_duplicates_within_a_list() {
        let state = GamificationState::new(Uuid::nil());
        let next = replace(&state, board(&["a", " a ", "b"], &[], &[])).unwrap();
        assert_eq!(next.daily_challenges.completed, vec!["a", "b"]);
    }

    #[test]
    fn test_replace_rejects_id_under_two_statuses() {
        let state = GamificationState::new(Uuid::nil());
        let err = replace(&state, board(&["a"], &["a"], &[])).unwrap_err();
        assert!(matches!(err, DomainError::MalformedInput(_)));
    }

    #[test]
    fn test_replace_rejects_blank_id() {
        let state = GamificationState::new(Uuid::nil());
        assert!(replace(&state, board(&[], &["  "], &[])).is_err());
    }

    #[test]
    fn test_newly_completed() {
        let before = board(&["a"], &["b", "c"], &[]);
        let after = board(&["a", "b"], &["c"], &[]);
        assert_eq!(newly_completed(&before, &after), vec!["b"]);
        assert!(newly_completed(&after, &after).is_empty());
    }
}
