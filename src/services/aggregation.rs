use chrono::{Duration, NaiveDate};
use serde::{Serialize, Serializer};

use crate::models::daily_record::{DailyRecord, DateRange, Subject};
use crate::services::DomainError;

/// Length of the trailing summary window, today included.
pub const WINDOW_DAYS: i64 = 7;

/// Reported in place of a subject when there is nothing to rank.
pub const NONE_SENTINEL: &str = "none";

/// Fails only for dates so close to the calendar minimum that the window
/// would start before it.
pub fn window_start(reference: NaiveDate) -> Result<NaiveDate, DomainError> {
    reference
        .checked_sub_signed(Duration::days(WINDOW_DAYS - 1))
        .ok_or_else(|| {
            DomainError::MalformedInput(format!("no trailing week fits before {}", reference))
        })
}

pub fn trailing_week(reference: NaiveDate) -> Result<DateRange, DomainError> {
    Ok(DateRange {
        start: window_start(reference)?,
        end: reference,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectTotals {
    pub subject: Subject,
    pub correct: i64,
    pub incorrect: i64,
    pub accuracy_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub total_correct: i64,
    pub total_incorrect: i64,
    #[serde(serialize_with = "subject_or_none")]
    pub best_subject: Option<Subject>,
    #[serde(serialize_with = "subject_or_none")]
    pub worst_subject: Option<Subject>,
    pub accuracy_percentage: f64,
    pub subjects: Vec<SubjectTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<DateRange>,
}

impl WeeklySummary {
    pub fn empty() -> Self {
        Self {
            total_correct: 0,
            total_incorrect: 0,
            best_subject: None,
            worst_subject: None,
            accuracy_percentage: 0.0,
            subjects: Vec::new(),
            window: None,
        }
    }

    pub fn best_subject_label(&self) -> &'static str {
        self.best_subject.map_or(NONE_SENTINEL, Subject::key)
    }

    pub fn worst_subject_label(&self) -> &'static str {
        self.worst_subject.map_or(NONE_SENTINEL, Subject::key)
    }
}

fn subject_or_none<S: Serializer>(subject: &Option<Subject>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(subject.map_or(NONE_SENTINEL, Subject::key))
}

fn accuracy(correct: i64, incorrect: i64) -> f64 {
    let answered = correct + incorrect;
    if answered > 0 {
        correct as f64 / answered as f64 * 100.0
    } else {
        0.0
    }
}

/// Totals per subject and overall, with the best and worst subject by
/// correct answers. Ties go to the subject listed first in `subjects`.
pub fn summarize(records: &[DailyRecord], subjects: &[Subject]) -> WeeklySummary {
    if records.is_empty() {
        return WeeklySummary::empty();
    }

    let totals: Vec<SubjectTotals> = subjects
        .iter()
        .map(|&subject| {
            let (correct, incorrect) = records
                .iter()
                .map(|r| r.score(subject))
                .fold((0i64, 0i64), |(c, i), s| {
                    (c + i64::from(s.correct), i + i64::from(s.incorrect))
                });
            SubjectTotals {
                subject,
                correct,
                incorrect,
                accuracy_percentage: accuracy(correct, incorrect),
            }
        })
        .collect();

    let total_correct: i64 = totals.iter().map(|t| t.correct).sum();
    let total_incorrect: i64 = totals.iter().map(|t| t.incorrect).sum();

    // max_by_key keeps the last maximum, so fold with strict comparisons.
    let best_subject = totals
        .iter()
        .fold(None::<&SubjectTotals>, |best, t| match best {
            Some(b) if t.correct <= b.correct => Some(b),
            _ => Some(t),
        })
        .map(|t| t.subject);
    let worst_subject = totals
        .iter()
        .fold(None::<&SubjectTotals>, |worst, t| match worst {
            Some(w) if t.correct >= w.correct => Some(w),
            _ => Some(t),
        })
        .map(|t| t.subject);

    WeeklySummary {
        total_correct,
        total_incorrect,
        best_subject,
        worst_subject,
        accuracy_percentage: accuracy(total_correct, total_incorrect),
        subjects: totals,
        window: None,
    }
}

/// Rejects negative counts.
pub fn validate_record(record: &DailyRecord) -> Result<(), DomainError> {
    match record
        .scores
        .iter()
        .find(|(_, s)| s.correct < 0 || s.incorrect < 0)
    {
        Some((subject, _)) => Err(DomainError::MalformedInput(format!(
            "negative count for {} on {}",
            subject, record.date
        ))),
        None => Ok(()),
    }
}

/// Like [`summarize`], but every record must be well formed and dated
/// inside `window`.
pub fn summarize_window(
    records: &[DailyRecord],
    window: DateRange,
    subjects: &[Subject],
) -> Result<WeeklySummary, DomainError> {
    for record in records {
        if !window.contains(record.date) {
            return Err(DomainError::MalformedInput(format!(
                "record dated {} falls outside {}..={}",
                record.date, window.start, window.end
            )));
        }
        validate_record(record)?;
    }

    let mut summary = summarize(records, subjects);
    summary.window = Some(window);
    Ok(summary)
}
