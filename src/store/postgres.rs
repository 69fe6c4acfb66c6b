use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::daily_record::{DailyRecord, DailyRecordRow, DateRange, Subject};
use crate::models::gamification::GamificationState;
use crate::models::motivation::MotivationSnapshot;
use crate::models::reminder::{StudyReminder, StudyReminderRow};
use crate::models::study_session::{StudySession, StudySessionRow};
use crate::store::{ProgressStore, ReminderStore, StudySessionStore};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn decode<R, T>(row: R) -> Result<T, sqlx::Error>
where
    T: TryFrom<R, Error = String>,
{
    T::try_from(row).map_err(|e| sqlx::Error::Decode(e.into()))
}

#[async_trait]
impl ProgressStore for PgStore {
    async fn upsert_daily_record(&self, record: &DailyRecord) -> AppResult<DailyRecord> {
        let mut query = sqlx::query_as::<_, DailyRecordRow>(
            r#"
            INSERT INTO daily_records (
                id, user_id, record_date,
                turkce_correct, turkce_incorrect,
                matematik_correct, matematik_incorrect,
                fen_correct, fen_incorrect,
                sosyal_correct, sosyal_incorrect,
                ingilizce_correct, ingilizce_incorrect,
                din_correct, din_incorrect
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (user_id, record_date) DO UPDATE SET
                turkce_correct = EXCLUDED.turkce_correct,
                turkce_incorrect = EXCLUDED.turkce_incorrect,
                matematik_correct = EXCLUDED.matematik_correct,
                matematik_incorrect = EXCLUDED.matematik_incorrect,
                fen_correct = EXCLUDED.fen_correct,
                fen_incorrect = EXCLUDED.fen_incorrect,
                sosyal_correct = EXCLUDED.sosyal_correct,
                sosyal_incorrect = EXCLUDED.sosyal_incorrect,
                ingilizce_correct = EXCLUDED.ingilizce_correct,
                ingilizce_incorrect = EXCLUDED.ingilizce_incorrect,
                din_correct = EXCLUDED.din_correct,
                din_incorrect = EXCLUDED.din_incorrect,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(record.date);

        // Column pairs follow Subject::ALL order.
        for subject in Subject::ALL {
            let score = record.score(subject);
            query = query.bind(score.correct).bind(score.incorrect);
        }

        let row = query.fetch_one(&self.db).await?;
        Ok(row.into())
    }

    async fn fetch_records(&self, user_id: Uuid, range: DateRange) -> AppResult<Vec<DailyRecord>> {
        let rows = sqlx::query_as::<_, DailyRecordRow>(
            r#"
            SELECT * FROM daily_records
            WHERE user_id = $1 AND record_date BETWEEN $2 AND $3
            ORDER BY record_date ASC
            "#,
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(DailyRecord::from).collect())
    }

    async fn get_or_create_gamification(&self, user_id: Uuid) -> AppResult<GamificationState> {
        // No-op update on conflict so RETURNING yields the existing row.
        let state = sqlx::query_as::<_, GamificationState>(
            r#"
            INSERT INTO gamification_states (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE
                SET user_id = gamification_states.user_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(state)
    }

    async fn persist_gamification(
        &self,
        state: &GamificationState,
    ) -> AppResult<Option<GamificationState>> {
        let saved = sqlx::query_as::<_, GamificationState>(
            r#"
            UPDATE gamification_states SET
                total_points = $2,
                current_level = $3,
                streak_days = $4,
                last_activity_date = $5,
                badges_earned = $6,
                questions_target = $7,
                study_hours_target = $8,
                accuracy_target = $9,
                challenges_completed = $10,
                challenges_in_progress = $11,
                challenges_locked = $12,
                revision = revision + 1,
                updated_at = NOW()
            WHERE user_id = $1 AND revision = $13
            RETURNING *
            "#,
        )
        .bind(state.user_id)
        .bind(state.total_points)
        .bind(state.current_level)
        .bind(state.streak_days)
        .bind(state.last_activity_date)
        .bind(&state.badges_earned)
        .bind(state.weekly_goals.questions_target)
        .bind(state.weekly_goals.study_hours_target)
        .bind(state.weekly_goals.accuracy_target)
        .bind(&state.daily_challenges.completed)
        .bind(&state.daily_challenges.in_progress)
        .bind(&state.daily_challenges.locked)
        .bind(state.revision)
        .fetch_optional(&self.db)
        .await?;

        Ok(saved)
    }

    async fn put_motivation_snapshot(
        &self,
        user_id: Uuid,
        snapshot: &MotivationSnapshot,
    ) -> AppResult<MotivationSnapshot> {
        let saved = sqlx::query_as::<_, MotivationSnapshot>(
            r#"
            INSERT INTO motivation_snapshots
                (user_id, study_time_minutes, accuracy_percentage, streak_days, goals_completed)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                study_time_minutes = EXCLUDED.study_time_minutes,
                accuracy_percentage = EXCLUDED.accuracy_percentage,
                streak_days = EXCLUDED.streak_days,
                goals_completed = EXCLUDED.goals_completed,
                updated_at = NOW()
            RETURNING study_time_minutes, accuracy_percentage, streak_days, goals_completed
            "#,
        )
        .bind(user_id)
        .bind(snapshot.study_time_minutes)
        .bind(snapshot.accuracy_percentage)
        .bind(snapshot.streak_days)
        .bind(snapshot.goals_completed)
        .fetch_one(&self.db)
        .await?;

        Ok(saved)
    }

    async fn fetch_motivation_snapshot(&self, user_id: Uuid) -> AppResult<MotivationSnapshot> {
        let snapshot = sqlx::query_as::<_, MotivationSnapshot>(
            r#"
            SELECT study_time_minutes, accuracy_percentage, streak_days, goals_completed
            FROM motivation_snapshots
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(snapshot.unwrap_or_default())
    }

    async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.db)
            .await
            .is_ok()
    }
}

#[async_trait]
impl StudySessionStore for PgStore {
    async fn insert_study_session(&self, session: &StudySession) -> AppResult<StudySession> {
        let row = sqlx::query_as::<_, StudySessionRow>(
            r#"
            INSERT INTO study_sessions (id, user_id, subject, session_type, started_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.subject.key())
        .bind(session.session_type.key())
        .bind(session.started_at)
        .fetch_one(&self.db)
        .await?;

        Ok(decode(row)?)
    }

    async fn get_study_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> AppResult<Option<StudySession>> {
        let row = sqlx::query_as::<_, StudySessionRow>(
            "SELECT * FROM study_sessions WHERE id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(decode).transpose()?)
    }

    async fn close_study_session(&self, session: &StudySession) -> AppResult<Option<StudySession>> {
        let row = sqlx::query_as::<_, StudySessionRow>(
            r#"
            UPDATE study_sessions SET
                ended_at = $3,
                duration_minutes = $4,
                questions_solved = $5,
                correct_answers = $6,
                notes = $7
            WHERE id = $1 AND user_id = $2 AND ended_at IS NULL
            RETURNING *
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.ended_at)
        .bind(session.duration_minutes)
        .bind(session.questions_solved)
        .bind(session.correct_answers)
        .bind(&session.notes)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(decode).transpose()?)
    }

    async fn fetch_study_sessions(
        &self,
        user_id: Uuid,
        range: DateRange,
    ) -> AppResult<Vec<StudySession>> {
        let rows = sqlx::query_as::<_, StudySessionRow>(
            r#"
            SELECT * FROM study_sessions
            WHERE user_id = $1
              AND (started_at AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3
            ORDER BY started_at ASC
            "#,
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(decode).collect::<Result<_, _>>()?)
    }

    async fn recent_study_sessions(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<StudySession>> {
        let rows = sqlx::query_as::<_, StudySessionRow>(
            r#"
            SELECT * FROM study_sessions
            WHERE user_id = $1
            ORDER BY started_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(decode).collect::<Result<_, _>>()?)
    }
}

fn day_keys(reminder: &StudyReminder) -> Vec<String> {
    reminder.days.iter().map(|d| d.key().to_string()).collect()
}

#[async_trait]
impl ReminderStore for PgStore {
    async fn list_reminders(&self, user_id: Uuid) -> AppResult<Vec<StudyReminder>> {
        let rows = sqlx::query_as::<_, StudyReminderRow>(
            r#"
            SELECT * FROM study_reminders
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(decode).collect::<Result<_, _>>()?)
    }

    async fn get_reminder(&self, user_id: Uuid, reminder_id: Uuid) -> AppResult<Option<StudyReminder>> {
        let row = sqlx::query_as::<_, StudyReminderRow>(
            "SELECT * FROM study_reminders WHERE id = $1 AND user_id = $2",
        )
        .bind(reminder_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(decode).transpose()?)
    }

    async fn insert_reminder(&self, reminder: &StudyReminder) -> AppResult<StudyReminder> {
        let row = sqlx::query_as::<_, StudyReminderRow>(
            r#"
            INSERT INTO study_reminders (id, user_id, text, remind_at, days, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(reminder.id)
        .bind(reminder.user_id)
        .bind(&reminder.text)
        .bind(reminder.time.time())
        .bind(day_keys(reminder))
        .bind(reminder.active)
        .fetch_one(&self.db)
        .await?;

        Ok(decode(row)?)
    }

    async fn update_reminder(&self, reminder: &StudyReminder) -> AppResult<Option<StudyReminder>> {
        let row = sqlx::query_as::<_, StudyReminderRow>(
            r#"
            UPDATE study_reminders SET
                text = $3,
                remind_at = $4,
                days = $5,
                active = $6
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(reminder.id)
        .bind(reminder.user_id)
        .bind(&reminder.text)
        .bind(reminder.time.time())
        .bind(day_keys(reminder))
        .bind(reminder.active)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(decode).transpose()?)
    }

    async fn delete_reminder(&self, user_id: Uuid, reminder_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM study_reminders WHERE id = $1 AND user_id = $2")
            .bind(reminder_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
