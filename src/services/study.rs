//! Study session bookkeeping: closing a session and totalling study time.

use chrono::{DateTime, Utc};

use crate::models::daily_record::DateRange;
use crate::models::study_session::{EndSessionRequest, StudySession};
use crate::services::DomainError;

/// Closes an open session at `now`. Without an explicit duration the
/// elapsed whole minutes are used.
pub fn finish(
    session: &StudySession,
    outcome: &EndSessionRequest,
    now: DateTime<Utc>,
) -> Result<StudySession, DomainError> {
    if !session.is_open() {
        return Err(DomainError::MalformedInput(format!(
            "study session {} has already ended",
            session.id
        )));
    }
    if now < session.started_at {
        return Err(DomainError::MalformedInput(format!(
            "study session {} cannot end before it started",
            session.id
        )));
    }
    if let (Some(solved), Some(correct)) = (outcome.questions_solved, outcome.correct_answers) {
        if correct > solved {
            return Err(DomainError::MalformedInput(format!(
                "correct_answers ({}) exceeds questions_solved ({})",
                correct, solved
            )));
        }
    }

    let elapsed = i32::try_from((now - session.started_at).num_minutes()).unwrap_or(i32::MAX);

    let mut next = session.clone();
    next.ended_at = Some(now);
    next.duration_minutes = Some(outcome.duration_minutes.unwrap_or(elapsed));
    next.questions_solved = outcome.questions_solved;
    next.correct_answers = outcome.correct_answers;
    if let Some(notes) = &outcome.notes {
        next.notes = notes.clone();
    }
    Ok(next)
}

/// Minutes of finished sessions that started inside `window`. Open sessions
/// count for nothing yet.
pub fn minutes_in_window(sessions: &[StudySession], window: DateRange) -> i64 {
    sessions
        .iter()
        .filter(|s| window.contains(s.study_date()))
        .filter_map(|s| s.duration_minutes)
        .map(i64::from)
        .sum()
}
