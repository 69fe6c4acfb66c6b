use chrono::{Datelike, NaiveDateTime};

use crate::models::reminder::{ReminderDay, StudyReminder, UpdateReminderRequest};

/// Sorted, without repeats.
pub fn normalize_days(mut days: Vec<ReminderDay>) -> Vec<ReminderDay> {
    days.sort();
    days.dedup();
    days
}

/// Fields left out of the update keep their current value.
pub fn apply_update(reminder: &StudyReminder, update: &UpdateReminderRequest) -> StudyReminder {
    let mut next = reminder.clone();
    if let Some(text) = &update.text {
        next.text = text.clone();
    }
    if let Some(time) = update.time {
        next.time = time;
    }
    if let Some(days) = &update.days {
        next.days = normalize_days(days.clone());
    }
    if let Some(active) = update.active {
        next.active = active;
    }
    next
}

/// Active reminders scheduled for the minute and weekday of `at`.
pub fn due(reminders: &[StudyReminder], at: NaiveDateTime) -> Vec<StudyReminder> {
    let today = ReminderDay::from(at.weekday());
    reminders
        .iter()
        .filter(|r| r.active && r.time.matches(at) && r.days.contains(&today))
        .cloned()
        .collect()
}
