use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::daily_record::{DailyRecord, DateRange};
use crate::models::gamification::GamificationState;
use crate::models::motivation::MotivationSnapshot;
use crate::models::reminder::StudyReminder;
use crate::models::study_session::StudySession;
use crate::store::{ProgressStore, ReminderStore, StudySessionStore};

/// In-memory store for single-instance runs without a database, and tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    // Keyed by (user, date) so a range scan comes back in date order.
    records: BTreeMap<(Uuid, NaiveDate), DailyRecord>,
    gamification: HashMap<Uuid, GamificationState>,
    snapshots: HashMap<Uuid, MotivationSnapshot>,
    sessions: HashMap<Uuid, StudySession>,
    // Per user, in creation order.
    reminders: HashMap<Uuid, Vec<StudyReminder>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn upsert_daily_record(&self, record: &DailyRecord) -> AppResult<DailyRecord> {
        let mut tables = self.inner.lock().await;
        tables
            .records
            .insert((record.user_id, record.date), record.clone());
        Ok(record.clone())
    }

    async fn fetch_records(&self, user_id: Uuid, range: DateRange) -> AppResult<Vec<DailyRecord>> {
        if range.start > range.end {
            return Ok(Vec::new());
        }
        let tables = self.inner.lock().await;
        Ok(tables
            .records
            .range((user_id, range.start)..=(user_id, range.end))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn get_or_create_gamification(&self, user_id: Uuid) -> AppResult<GamificationState> {
        let mut tables = self.inner.lock().await;
        Ok(tables
            .gamification
            .entry(user_id)
            .or_insert_with(|| GamificationState::new(user_id))
            .clone())
    }

    async fn persist_gamification(
        &self,
        state: &GamificationState,
    ) -> AppResult<Option<GamificationState>> {
        let mut tables = self.inner.lock().await;
        let stored_revision = tables
            .gamification
            .get(&state.user_id)
            .map_or(0, |s| s.revision);
        if stored_revision != state.revision {
            return Ok(None);
        }

        let mut saved = state.clone();
        saved.revision += 1;
        tables.gamification.insert(saved.user_id, saved.clone());
        Ok(Some(saved))
    }

    async fn put_motivation_snapshot(
        &self,
        user_id: Uuid,
        snapshot: &MotivationSnapshot,
    ) -> AppResult<MotivationSnapshot> {
        let mut tables = self.inner.lock().await;
        tables.snapshots.insert(user_id, *snapshot);
        Ok(*snapshot)
    }

    async fn fetch_motivation_snapshot(&self, user_id: Uuid) -> AppResult<MotivationSnapshot> {
        let tables = self.inner.lock().await;
        Ok(tables.snapshots.get(&user_id).copied().unwrap_or_default())
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[async_trait]
impl StudySessionStore for MemoryStore {
    async fn insert_study_session(&self, session: &StudySession) -> AppResult<StudySession> {
        let mut tables = self.inner.lock().await;
        tables.sessions.insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn get_study_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> AppResult<Option<StudySession>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .sessions
            .get(&session_id)
            .filter(|s| s.user_id == user_id)
            .cloned())
    }

    async fn close_study_session(&self, session: &StudySession) -> AppResult<Option<StudySession>> {
        let mut tables = self.inner.lock().await;
        match tables.sessions.get_mut(&session.id) {
            Some(stored) if stored.user_id == session.user_id && stored.is_open() => {
                *stored = session.clone();
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn fetch_study_sessions(
        &self,
        user_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<StudySession>> {
        let tables = self.inner.lock().await;
        let mut sessions: Vec<StudySession> = tables
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && range.contains(s.study_date()))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.started_at);
        Ok(sessions)
    }

    async fn recent_study_sessions(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<StudySession>> {
        let tables = self.inner.lock().await;
        let mut sessions: Vec<StudySession> = tables
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        sessions.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(sessions)
    }
}

#[async_trait]
impl ReminderStore for MemoryStore {
    async fn list_reminders(&self, user_id: Uuid) -> AppResult<Vec<StudyReminder>> {
        let tables = self.inner.lock().await;
        Ok(tables.reminders.get(&user_id).cloned().unwrap_or_default())
    }

    async fn get_reminder(&self, user_id: Uuid, reminder_id: Uuid) -> AppResult<Option<StudyReminder>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .reminders
            .get(&user_id)
            .and_then(|list| list.iter().find(|r| r.id == reminder_id))
            .cloned())
    }

    async fn insert_reminder(&self, reminder: &StudyReminder) -> AppResult<StudyReminder> {
        let mut tables = self.inner.lock().await;
        tables
            .reminders
            .entry(reminder.user_id)
            .or_default()
            .push(reminder.clone());
        Ok(reminder.clone())
    }

    async fn update_reminder(&self, reminder: &StudyReminder) -> AppResult<Option<StudyReminder>> {
        let mut tables = self.inner.lock().await;
        let slot = tables
            .reminders
            .get_mut(&reminder.user_id)
            .and_then(|list| list.iter_mut().find(|r| r.id == reminder.id));
        Ok(slot.map(|stored| {
            *stored = reminder.clone();
            reminder.clone()
        }))
    }

    async fn delete_reminder(&self, user_id: Uuid, reminder_id: Uuid) -> AppResult<bool> {
        let mut tables = self.inner.lock().await;
        let Some(list) = tables.reminders.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|r| r.id != reminder_id);
        Ok(list.len() < before)
    }
}
