pub mod daily_records;
pub mod gamification;
pub mod health;
pub mod motivation;
pub mod reminders;
pub mod study_sessions;
pub mod summary;
pub mod tips;
pub mod ws;
