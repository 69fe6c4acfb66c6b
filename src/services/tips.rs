use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::services::aggregation::WeeklySummary;

const GENERAL_STUDY_TIPS: [&str; 4] = [
    "Kısa molalar vererek çalış, bu beynini dinlendirir",
    "Zor konuları sabah saatlerinde çalış",
    "Her gün en az 30 dakika tekrar yap",
    "Hedeflerini küçük parçalara böl",
];

const MOTIVATION_TIPS: [&str; 4] = [
    "Her başarısızlık bir öğrenme fırsatıdır",
    "Kendine inan, sen başarabilirsin",
    "Küçük ilerlemeler büyük başarıların temelidir",
    "Bugün yapabileceğin en iyi şeyi yap",
];

pub const DAILY_MESSAGES: [&str; 15] = [
    "Her başarısızlık, başarıya giden yolda bir adımdır. Bugün kendine inan ve devam et!",
    "Küçük ilerlemeler büyük başarıların temelidir. Her gün bir adım at!",
    "Zorluklar seni güçlendirir. Bugün zor olan yarın kolay olacak!",
    "Başarı bir yolculuktur, varış noktası değil. Her gün öğrenmeye devam et!",
    "Kendine inan, çünkü sen yapabilirsin! Bugün harika bir gün olacak!",
    "Her yeni gün yeni bir fırsattır. Bugünü en iyi şekilde değerlendir!",
    "Çalışmak başarının anahtarıdır. Bugün çok çalış, yarın başar!",
    "Hedeflerine odaklan ve asla vazgeçme. Sen başarabilirsin!",
    "Her soru çözdüğünde bir adım daha ilerliyorsun. Devam et!",
    "Bugünün çabası yarının başarısıdır. Çalışmaya devam et!",
    "Başarı merdivenini tek tek çık, her adım önemlidir!",
    "Kendine güven, çünkü sen harika bir öğrencisin!",
    "Bugün yapabileceğin en iyi şeyi yap, yarın daha da iyisini yaparsın!",
    "Her zorluk seni daha güçlü yapar. Devam et!",
    "Başarı yolculuğunda sabırlı ol, sonuçlar gelir!",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonalTips {
    pub study_tips: Vec<String>,
    pub motivation_tips: Vec<String>,
}

/// Study tips lead with advice for the week's weakest subject, if any.
pub fn personalized_tips(summary: &WeeklySummary) -> PersonalTips {
    let mut study_tips = Vec::with_capacity(7);

    if let Some(subject) = summary.worst_subject {
        let name = subject.display_name();
        study_tips.push(format!(
            "{} dersinde zorlanıyorsun. Bu derse daha fazla zaman ayırmayı dene!",
            name
        ));
        study_tips.push(format!("{} konularını küçük parçalara bölerek çalış.", name));
        study_tips.push(format!("{} için günlük 30 dakika tekrar yap.", name));
    }

    study_tips.extend(GENERAL_STUDY_TIPS.iter().map(|t| t.to_string()));

    PersonalTips {
        study_tips,
        motivation_tips: MOTIVATION_TIPS.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn daily_message<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    DAILY_MESSAGES.choose(rng).copied().unwrap_or(DAILY_MESSAGES[0])
}
