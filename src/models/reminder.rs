use std::fmt;

use chrono::{NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl ReminderDay {
    pub const ALL: [ReminderDay; 7] = [
        ReminderDay::Monday,
        ReminderDay::Tuesday,
        ReminderDay::Wednesday,
        ReminderDay::Thursday,
        ReminderDay::Friday,
        ReminderDay::Saturday,
        ReminderDay::Sunday,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ReminderDay::Monday => "monday",
            ReminderDay::Tuesday => "tuesday",
            ReminderDay::Wednesday => "wednesday",
            ReminderDay::Thursday => "thursday",
            ReminderDay::Friday => "friday",
            ReminderDay::Saturday => "saturday",
            ReminderDay::Sunday => "sunday",
        }
    }

    pub fn from_key(key: &str) -> Option<ReminderDay> {
        ReminderDay::ALL.into_iter().find(|d| d.key() == key)
    }
}

impl From<Weekday> for ReminderDay {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => ReminderDay::Monday,
            Weekday::Tue => ReminderDay::Tuesday,
            Weekday::Wed => ReminderDay::Wednesday,
            Weekday::Thu => ReminderDay::Thursday,
            Weekday::Fri => ReminderDay::Friday,
            Weekday::Sat => ReminderDay::Saturday,
            Weekday::Sun => ReminderDay::Sunday,
        }
    }
}

/// Wall-clock minute of a reminder, `HH:MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
    /// Drops seconds so stored values always sit on a whole minute.
    pub fn from_time(time: NaiveTime) -> Self {
        Self(time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time))
    }

    pub fn time(self) -> NaiveTime {
        self.0
    }

    pub fn matches(self, at: NaiveDateTime) -> bool {
        self.0.hour() == at.hour() && self.0.minute() == at.minute()
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for ReminderTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReminderTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .map(Self)
            .map_err(|_| serde::de::Error::custom(format!("expected HH:MM, got {:?}", raw)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyReminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub time: ReminderTime,
    pub days: Vec<ReminderDay>,
    pub active: bool,
}

/// Row shape of the `study_reminders` table.
#[derive(Debug, Clone, FromRow)]
pub struct StudyReminderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub remind_at: NaiveTime,
    pub days: Vec<String>,
    pub active: bool,
}

impl TryFrom<StudyReminderRow> for StudyReminder {
    type Error = String;

    fn try_from(row: StudyReminderRow) -> Result<Self, Self::Error> {
        let days = row
            .days
            .iter()
            .map(|d| ReminderDay::from_key(d).ok_or_else(|| format!("unknown weekday {:?}", d)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            text: row.text,
            time: ReminderTime::from_time(row.remind_at),
            days,
            active: row.active,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReminderRequest {
    #[validate(length(min = 1, max = 200, message = "text must be 1-200 characters"))]
    pub text: String,

    pub time: ReminderTime,

    #[validate(length(min = 1, max = 7, message = "pick 1-7 days"))]
    pub days: Vec<ReminderDay>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateReminderRequest {
    #[validate(length(min = 1, max = 200, message = "text must be 1-200 characters"))]
    pub text: Option<String>,

    pub time: Option<ReminderTime>,

    #[validate(length(min = 1, max = 7, message = "pick 1-7 days"))]
    pub days: Option<Vec<ReminderDay>>,

    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DueRemindersQuery {
    /// Default: now (UTC).
    pub at: Option<NaiveDateTime>,
}
