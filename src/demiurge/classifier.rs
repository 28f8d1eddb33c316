//! Классификатор - ответы и слайдеры в архетип
//!
//! Две чистые процедуры решения. Состояния нет, ошибок нет: плохой ввод
//! игнорируется (тест) или ограничивается (слайдеры).

use crate::demiurge::archetype::{
    ArchetypeKey, BoundaryStance, CommunicationStance, FeedbackStance, StyleChoices,
};
use serde::{Deserialize, Serialize};

/// Число вопросов теста
pub const QUIZ_QUESTIONS: usize = 3;

/// Вариантов ответа на вопрос
pub const QUIZ_OPTIONS: usize = 4;

use ArchetypeKey::{Blade, Guide, Oracle, Spark};

/// За какой архетип голосует ответ: строки - вопросы, столбцы - индекс ответа.
const SCORE_MAP: [[ArchetypeKey; QUIZ_OPTIONS]; QUIZ_QUESTIONS] = [
    [Blade, Guide, Oracle, Spark],  // how should I talk to you
    [Oracle, Blade, Guide, Spark],  // which kind of help suits you
    [Blade, Guide, Oracle, Spark],  // how should I show up in your day
];

/// Таблица по дискретной тройке (communication, feedback, boundary).
///
/// Баланс 3-3-3-3:
/// - Blade владеет границей "always"
/// - Oracle - режим советника со сдержанной границей
/// - Guide владеет границей "soft"
/// - Spark - режим партнера без мягкой границы
const STYLE_TABLE: [((u8, u8, u8), ArchetypeKey); 12] = [
    ((0, 0, 0), Blade),
    ((0, 0, 1), Oracle),
    ((0, 0, 2), Oracle),
    ((0, 1, 0), Blade),
    ((0, 1, 1), Oracle),
    ((0, 1, 2), Guide),
    ((1, 0, 0), Blade),
    ((1, 0, 1), Spark),
    ((1, 0, 2), Guide),
    ((1, 1, 0), Spark),
    ((1, 1, 1), Spark),
    ((1, 1, 2), Guide),
];

/// Если округленной тройки нет в таблице
pub const FALLBACK_ARCHETYPE: ArchetypeKey = Oracle;

/// Подсчитывает ответы теста и возвращает победивший архетип.
///
/// Ответы после третьего вопроса и индексы вне `0..4` не считаются.
/// Ничья уходит первому ключу из [`ArchetypeKey::PRIORITY`].
pub fn classify_by_quiz(answers: &[i32]) -> ArchetypeKey {
    let mut scores = [0u32; 4];

    for (question, &answer) in answers.iter().enumerate().take(QUIZ_QUESTIONS) {
        let Ok(option) = usize::try_from(answer) else {
            continue;
        };
        if let Some(key) = SCORE_MAP[question].get(option) {
            scores[key.index()] += 1;
        }
    }

    let max = scores.iter().copied().max().unwrap_or(0);
    ArchetypeKey::PRIORITY
        .iter()
        .copied()
        .find(|key| scores[key.index()] == max)
        .unwrap_or(FALLBACK_ARCHETYPE)
}

/// Непрерывные положения слайдеров с панели настройки.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderValues {
    /// 0 = advisor, 1 = partner
    pub communication: f64,
    /// 0 = direct, 1 = gentle
    pub feedback: f64,
    /// 0 = always, 1 = private, 2 = soft
    pub boundary: f64,
}

impl SliderValues {
    pub fn new(communication: f64, feedback: f64, boundary: f64) -> Self {
        Self {
            communication,
            feedback,
            boundary,
        }
    }

    /// Положения слайдеров для выборов; незаданные стоят слева.
    pub fn from_choices(choices: &StyleChoices) -> Self {
        let communication = match choices.communication {
            Some(CommunicationStance::Partner) => 1.0,
            _ => 0.0,
        };
        let feedback = match choices.feedback {
            Some(FeedbackStance::Gentle) => 1.0,
            _ => 0.0,
        };
        let boundary = match choices.boundary {
            Some(BoundaryStance::Private) => 1.0,
            Some(BoundaryStance::Soft) => 2.0,
            _ => 0.0,
        };
        Self::new(communication, feedback, boundary)
    }

    /// Округление до дискретной тройки для таблицы.
    pub fn snapped(&self) -> (u8, u8, u8) {
        (
            snap(self.communication, 1),
            snap(self.feedback, 1),
            snap(self.boundary, 2),
        )
    }

    /// Дискретные выборы, которые сейчас задают слайдеры. `output` не
    /// слайдер и берется из `base`.
    pub fn snap_choices(&self, base: &StyleChoices) -> StyleChoices {
        let (c, f, b) = self.snapped();
        StyleChoices {
            communication: Some(if c == 0 {
                CommunicationStance::Advisor
            } else {
                CommunicationStance::Partner
            }),
            feedback: Some(if f == 0 {
                FeedbackStance::Direct
            } else {
                FeedbackStance::Gentle
            }),
            output: base.output,
            boundary: Some(match b {
                0 => BoundaryStance::Always,
                1 => BoundaryStance::Private,
                _ => BoundaryStance::Soft,
            }),
        }
    }
}

/// Ограничение в `[0, max]`, затем округление половины от нуля. NaN читается как 0.
fn snap(value: f64, max: u8) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.clamp(0.0, f64::from(max));
    // f64::round округляет половину от нуля
    (clamped.round() as u8).min(max)
}

/// Архетип для текущих положений слайдеров.
pub fn classify_by_sliders(values: &SliderValues) -> ArchetypeKey {
    let triple = values.snapped();
    STYLE_TABLE
        .iter()
        .find(|(combo, _)| *combo == triple)
        .map(|(_, key)| *key)
        .unwrap_or(FALLBACK_ARCHETYPE)
}
