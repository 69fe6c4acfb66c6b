//! Storage seam. Handlers talk to a [`Store`]; PostgreSQL backs it in
//! production and [`MemoryStore`] stands in when no database is configured.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::daily_record::{DailyRecord, DateRange};
use crate::models::gamification::GamificationState;
use crate::models::motivation::MotivationSnapshot;
use crate::models::reminder::StudyReminder;
use crate::models::study_session::StudySession;
use crate::services::DomainError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

const MAX_WRITE_ATTEMPTS: u32 = 3;

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Inserts or replaces the record for `(user_id, date)`.
    async fn upsert_daily_record(&self, record: &DailyRecord) -> AppResult<DailyRecord>;

    /// Records inside `range`, oldest first.
    async fn fetch_records(&self, user_id: Uuid, range: DateRange) -> AppResult<Vec<DailyRecord>>;

    async fn get_or_create_gamification(&self, user_id: Uuid) -> AppResult<GamificationState>;

    /// Writes `state` only if the stored revision still equals
    /// `state.revision`. Returns the saved state with its new revision, or
    /// `None` when another writer got there first.
    async fn persist_gamification(
        &self,
        state: &GamificationState,
    ) -> AppResult<Option<GamificationState>>;

    async fn put_motivation_snapshot(
        &self,
        user_id: Uuid,
        snapshot: &MotivationSnapshot,
    ) -> AppResult<MotivationSnapshot>;

    /// All zeros when nothing was reported yet.
    async fn fetch_motivation_snapshot(&self, user_id: Uuid) -> AppResult<MotivationSnapshot>;

    async fn ping(&self) -> bool;
}

#[async_trait]
pub trait StudySessionStore: Send + Sync {
    async fn insert_study_session(&self, session: &StudySession) -> AppResult<StudySession>;

    async fn get_study_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> AppResult<Option<StudySession>>;

    /// Stores the end fields of `session` only while the stored copy is
    /// still open. `None` means it was closed in the meantime.
    async fn close_study_session(&self, session: &StudySession) -> AppResult<Option<StudySession>>;

    /// Sessions whose start date (UTC) falls inside `range`, oldest first.
    async fn fetch_study_sessions(
        &self,
        user_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<StudySession>>;

    /// Newest first.
    async fn recent_study_sessions(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<StudySession>>;
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// In creation order.
    async fn list_reminders(&self, user_id: Uuid) -> AppResult<Vec<StudyReminder>>;

    async fn get_reminder(&self, user_id: Uuid, reminder_id: Uuid) -> AppResult<Option<StudyReminder>>;

    async fn insert_reminder(&self, reminder: &StudyReminder) -> AppResult<StudyReminder>;

    /// `None` when the reminder no longer exists.
    async fn update_reminder(&self, reminder: &StudyReminder) -> AppResult<Option<StudyReminder>>;

    /// `false` when there was nothing to delete.
    async fn delete_reminder(&self, user_id: Uuid, reminder_id: Uuid) -> AppResult<bool>;
}

/// Everything the HTTP layer needs from one backend.
pub trait Store: ProgressStore + StudySessionStore + ReminderStore {}

impl<T: ProgressStore + StudySessionStore + ReminderStore> Store for T {}

/// Read-modify-write of a user's gamification state. `op` is re-run on a
/// fresh read whenever the conditional write loses a race. Unchanged states
/// are not written.
pub async fn update_gamification<S, T, F>(
    store: &S,
    user_id: Uuid,
    mut op: F,
) -> AppResult<(GamificationState, T)>
where
    S: ProgressStore + ?Sized,
    F: FnMut(&GamificationState) -> Result<(GamificationState, T), DomainError> + Send,
    T: Send,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let current = store.get_or_create_gamification(user_id).await?;
        let (next, outcome) = op(&current)?;
        if next == current {
            return Ok((current, outcome));
        }

        match store.persist_gamification(&next).await? {
            Some(saved) => return Ok((saved, outcome)),
            None => {
                tracing::debug!(user_id = %user_id, attempt, "Stale gamification revision, retrying");
            }
        }
    }

    tracing::warn!(user_id = %user_id, "Gamification update kept losing races");
    Err(AppError::Conflict(
        "Gamification state changed concurrently, please retry".into(),
    ))
}
