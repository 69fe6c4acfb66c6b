//! Pure progress computations. Nothing in here touches storage, the network
//! or the clock: callers fetch values, pass them in and persist what comes
//! back.

use chrono::NaiveDate;

pub mod aggregation;
pub mod badges;
pub mod challenges;
pub mod goals;
pub mod motivation;
pub mod progression;
pub mod reminders;
pub mod study;
pub mod tips;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Activity date {today} is earlier than the last recorded activity {last_activity}")]
    InvalidTemporalOrder {
        last_activity: NaiveDate,
        today: NaiveDate,
    },
}
