use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::daily_record::Subject;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    #[default]
    Pomodoro,
    Free,
}

impl SessionType {
    pub fn key(self) -> &'static str {
        match self {
            SessionType::Pomodoro => "pomodoro",
            SessionType::Free => "free",
        }
    }

    pub fn from_key(key: &str) -> Option<SessionType> {
        [SessionType::Pomodoro, SessionType::Free]
            .into_iter()
            .find(|t| t.key() == key)
    }
}

/// A timed study block. Open until `ended_at` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: Subject,
    pub session_type: SessionType,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub questions_solved: Option<i32>,
    pub correct_answers: Option<i32>,
    pub notes: String,
}

impl StudySession {
    pub fn start(
        user_id: Uuid,
        subject: Subject,
        session_type: SessionType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            subject,
            session_type,
            started_at: now,
            ended_at: None,
            duration_minutes: None,
            questions_solved: None,
            correct_answers: None,
            notes: String::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Calendar day (UTC) the session counts towards.
    pub fn study_date(&self) -> NaiveDate {
        self.started_at.date_naive()
    }
}

/// Row shape of the `study_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct StudySessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub session_type: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub questions_solved: Option<i32>,
    pub correct_answers: Option<i32>,
    pub notes: String,
}

impl TryFrom<StudySessionRow> for StudySession {
    type Error = String;

    fn try_from(row: StudySessionRow) -> Result<Self, Self::Error> {
        let subject = Subject::from_key(&row.subject)
            .ok_or_else(|| format!("unknown subject {:?}", row.subject))?;
        let session_type = SessionType::from_key(&row.session_type)
            .ok_or_else(|| format!("unknown session type {:?}", row.session_type))?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            subject,
            session_type,
            started_at: row.started_at,
            ended_at: row.ended_at,
            duration_minutes: row.duration_minutes,
            questions_solved: row.questions_solved,
            correct_answers: row.correct_answers,
            notes: row.notes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub subject: Subject,
    #[serde(default)]
    pub session_type: SessionType,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct EndSessionRequest {
    /// Default: minutes elapsed since the session started.
    #[validate(range(min = 0, max = 1440, message = "duration_minutes must be 0-1440"))]
    pub duration_minutes: Option<i32>,

    #[validate(range(min = 0, max = 10000, message = "questions_solved must be 0-10000"))]
    pub questions_solved: Option<i32>,

    #[validate(range(min = 0, max = 10000, message = "correct_answers must be 0-10000"))]
    pub correct_answers: Option<i32>,

    #[validate(length(max = 1000, message = "notes must be under 1000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    pub limit: Option<i64>,
}
