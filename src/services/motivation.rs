//! Banded motivation scoring. Each dimension contributes the points of the
//! first band its value strictly exceeds; the total picks one of four tiers.

use serde::Serialize;

use crate::models::motivation::MotivationSnapshot;

const STUDY_TIME_BANDS: [(i32, u32); 3] = [(120, 20), (60, 15), (30, 10)];
const ACCURACY_BANDS: [(f64, u32); 3] = [(90.0, 25), (80.0, 20), (70.0, 15)];
const STREAK_BANDS: [(i32, u32); 3] = [(7, 25), (3, 20), (1, 15)];
const GOALS_BANDS: [(i32, u32); 3] = [(5, 30), (3, 20), (1, 10)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MotivationTier {
    #[serde(rename = "Yüksek")]
    High,
    #[serde(rename = "Orta")]
    Medium,
    #[serde(rename = "Düşük")]
    Low,
    #[serde(rename = "Çok Düşük")]
    VeryLow,
}

impl MotivationTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 80 => MotivationTier::High,
            s if s >= 60 => MotivationTier::Medium,
            s if s >= 40 => MotivationTier::Low,
            _ => MotivationTier::VeryLow,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MotivationTier::High => "Yüksek",
            MotivationTier::Medium => "Orta",
            MotivationTier::Low => "Düşük",
            MotivationTier::VeryLow => "Çok Düşük",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MotivationTier::High => "🚀",
            MotivationTier::Medium => "💪",
            MotivationTier::Low => "📈",
            MotivationTier::VeryLow => "🌟",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            MotivationTier::High => "Harika gidiyorsun! Bu tempoyu koru!",
            MotivationTier::Medium => "İyi gidiyorsun! Biraz daha çaba göster!",
            MotivationTier::Low => "Başlamak için hiç geç değil! Bugün başla!",
            MotivationTier::VeryLow => "Her başarı bir adımla başlar. Sen yapabilirsin!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotivationAssessment {
    pub score: u32,
    pub tier: MotivationTier,
    pub emoji: &'static str,
    pub message: &'static str,
}

fn band<T: PartialOrd + Copy>(value: T, bands: &[(T, u32)]) -> u32 {
    bands
        .iter()
        .find(|(floor, _)| value > *floor)
        .map_or(0, |(_, points)| *points)
}

pub fn score(snapshot: &MotivationSnapshot) -> u32 {
    band(snapshot.study_time_minutes, &STUDY_TIME_BANDS)
        + band(snapshot.accuracy_percentage, &ACCURACY_BANDS)
        + band(snapshot.streak_days, &STREAK_BANDS)
        + band(snapshot.goals_completed, &GOALS_BANDS)
}

pub fn score_tier(snapshot: &MotivationSnapshot) -> MotivationAssessment {
    let score = score(snapshot);
    let tier = MotivationTier::from_score(score);
    MotivationAssessment {
        score,
        tier,
        emoji: tier.emoji(),
        message: tier.message(),
    }
}
