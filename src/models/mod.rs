pub mod daily_record;
pub mod gamification;
pub mod motivation;
pub mod reminder;
pub mod study_session;
