use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Academic subjects tracked per day. Declaration order is the canonical
/// order used for tie-breaking and for the `daily_records` column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Turkce,
    Matematik,
    Fen,
    Sosyal,
    Ingilizce,
    Din,
}

impl Subject {
    pub const ALL: [Subject; 6] = [
        Subject::Turkce,
        Subject::Matematik,
        Subject::Fen,
        Subject::Sosyal,
        Subject::Ingilizce,
        Subject::Din,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Subject::Turkce => "turkce",
            Subject::Matematik => "matematik",
            Subject::Fen => "fen",
            Subject::Sosyal => "sosyal",
            Subject::Ingilizce => "ingilizce",
            Subject::Din => "din",
        }
    }

    pub fn from_key(key: &str) -> Option<Subject> {
        Subject::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Turkce => "Türkçe",
            Subject::Matematik => "Matematik",
            Subject::Fen => "Fen Bilimleri",
            Subject::Sosyal => "Sosyal Bilgiler",
            Subject::Ingilizce => "İngilizce",
            Subject::Din => "Din Kültürü",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScore {
    #[serde(default)]
    pub correct: i32,
    #[serde(default)]
    pub incorrect: i32,
}

/// One user's answer counts for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub user_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub scores: BTreeMap<Subject, SubjectScore>,
}

impl DailyRecord {
    /// A record with every subject present and zeroed.
    pub fn new(user_id: Uuid, date: NaiveDate) -> Self {
        Self {
            user_id,
            date,
            scores: Subject::ALL
                .iter()
                .map(|&subject| (subject, SubjectScore::default()))
                .collect(),
        }
    }

    pub fn with_score(mut self, subject: Subject, correct: i32, incorrect: i32) -> Self {
        self.scores.insert(subject, SubjectScore { correct, incorrect });
        self
    }

    /// Missing subjects read as zero.
    pub fn score(&self, subject: Subject) -> SubjectScore {
        self.scores.get(&subject).copied().unwrap_or_default()
    }
}

/// Row shape of the `daily_records` table.
#[derive(Debug, Clone, FromRow)]
pub struct DailyRecordRow {
    pub user_id: Uuid,
    pub record_date: NaiveDate,
    pub turkce_correct: i32,
    pub turkce_incorrect: i32,
    pub matematik_correct: i32,
    pub matematik_incorrect: i32,
    pub fen_correct: i32,
    pub fen_incorrect: i32,
    pub sosyal_correct: i32,
    pub sosyal_incorrect: i32,
    pub ingilizce_correct: i32,
    pub ingilizce_incorrect: i32,
    pub din_correct: i32,
    pub din_incorrect: i32,
}

impl From<DailyRecordRow> for DailyRecord {
    fn from(row: DailyRecordRow) -> Self {
        DailyRecord::new(row.user_id, row.record_date)
            .with_score(Subject::Turkce, row.turkce_correct, row.turkce_incorrect)
            .with_score(Subject::Matematik, row.matematik_correct, row.matematik_incorrect)
            .with_score(Subject::Fen, row.fen_correct, row.fen_incorrect)
            .with_score(Subject::Sosyal, row.sosyal_correct, row.sosyal_incorrect)
            .with_score(Subject::Ingilizce, row.ingilizce_correct, row.ingilizce_incorrect)
            .with_score(Subject::Din, row.din_correct, row.din_incorrect)
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Deserialize)]
pub struct UpsertDailyRecordRequest {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub scores: BTreeMap<Subject, SubjectScore>,
}

#[derive(Debug, Deserialize)]
pub struct DailyRecordQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_every_subject_zeroed() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let record = DailyRecord::new(Uuid::nil(), date);
        assert_eq!(record.scores.len(), Subject::ALL.len());
        assert!(record.scores.values().all(|s| *s == SubjectScore::default()));
    }

    #[test]
    fn test_missing_subject_reads_as_zero() {
        let record = DailyRecord {
            user_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            scores: BTreeMap::new(),
        };
        assert_eq!(record.score(Subject::Fen), SubjectScore::default());
    }

    #[test]
    fn test_row_maps_columns_to_subjects() {
        let row = DailyRecordRow {
            user_id: Uuid::nil(),
            record_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            turkce_correct: 1,
            turkce_incorrect: 2,
            matematik_correct: 3,
            matematik_incorrect: 4,
            fen_correct: 5,
            fen_incorrect: 6,
            sosyal_correct: 7,
            sosyal_incorrect: 8,
            ingilizce_correct: 9,
            ingilizce_incorrect: 10,
            din_correct: 11,
            din_incorrect: 12,
        };
        let record = DailyRecord::from(row);
        assert_eq!(record.score(Subject::Matematik), SubjectScore { correct: 3, incorrect: 4 });
        assert_eq!(record.score(Subject::Din), SubjectScore { correct: 11, incorrect: 12 });
    }

    #[test]
    fn test_upsert_request_parses_partial_scores() {
        let json = r#"{"date":"2024-03-05","scores":{"turkce":{"correct":10},"fen":{"correct":2,"incorrect":1}}}"#;
        let req: UpsertDailyRecordRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(req.scores[&Subject::Turkce], SubjectScore { correct: 10, incorrect: 0 });
        assert_eq!(req.scores.len(), 2);
    }

    #[test]
    fn test_unknown_subject_is_rejected() {
        let json = r#"{"scores":{"tarih":{"correct":1}}}"#;
        assert!(serde_json::from_str::<UpsertDailyRecordRequest>(json).is_err());
    }

    #[test]
    fn test_subject_keys_round_trip() {
        for subject in Subject::ALL {
            assert_eq!(Subject::from_key(subject.key()), Some(subject));
        }
        assert_eq!(Subject::from_key("tarih"), None);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        };
        assert!(range.contains(range.start));
        assert!(range.contains(range.end));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()));
    }
}
