//! Персона - точка в квадранте черт
//!
//! Квадрант - непрерывный двойник каталога архетипов: x идет от ровного к
//! напряженному (chaos), y от эмоционального к рациональному (flow).
//! Углы: Calm (0,1), Decisive (1,1), Gentle (0,0), Lively (1,0).

use crate::demiurge::archetype::{
    CommunicationStance, FeedbackStance, OutputStance, PersonalityTrait, StyleChoices,
};
use serde::{Deserialize, Serialize};

/// Ниже этой интенсивности точка считается стоящей в центре
pub const NEUTRAL_INTENSITY: f32 = 0.14;

/// Точка в единичном квадрате. Обе координаты всегда в [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPosition")]
pub struct QuadrantPosition {
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
struct RawPosition {
    x: f32,
    y: f32,
}

impl From<RawPosition> for QuadrantPosition {
    fn from(raw: RawPosition) -> Self {
        QuadrantPosition::new(raw.x, raw.y)
    }
}

impl QuadrantPosition {
    pub const CENTER: QuadrantPosition = QuadrantPosition { x: 0.5, y: 0.5 };

    /// Ограничивает обе координаты квадратом; NaN становится 0.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// Позиция указателя на площадке `width × height` с началом в левом
    /// верхнем углу. Экранный y растет вниз, y квадранта вверх.
    pub fn from_pointer(px: f32, py: f32, width: f32, height: f32) -> Self {
        if width <= 0.0 || height <= 0.0 {
            return Self::CENTER;
        }
        Self::new(px / width, 1.0 - py / height)
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }
}

impl Default for QuadrantPosition {
    fn default() -> Self {
        Self::CENTER
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Дискретная личность: ведущая черта, сила ее проявления и
/// необязательный второй оттенок.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    #[serde(rename = "trait")]
    pub dominant: PersonalityTrait,
    /// 0.0 - 1.0
    pub intensity: f32,
    #[serde(default)]
    pub secondary: Option<PersonalityTrait>,
}

impl Personality {
    pub fn new(dominant: PersonalityTrait, intensity: f32) -> Self {
        Self {
            dominant,
            intensity: clamp_unit(intensity),
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, secondary: PersonalityTrait) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Личность, которую задает точка квадранта
    pub fn from_position(pos: QuadrantPosition) -> Self {
        Self::new(dominant_trait(pos), intensity(pos))
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::new(PersonalityTrait::Calm, 0.5)
    }
}

/// Черта квадранта, в котором лежит точка. Средние линии 0.5 относятся к
/// верхней и правой половинам.
pub fn dominant_trait(pos: QuadrantPosition) -> PersonalityTrait {
    match (pos.x >= 0.5, pos.y >= 0.5) {
        (true, true) => PersonalityTrait::Decisive,
        (false, true) => PersonalityTrait::Calm,
        (false, false) => PersonalityTrait::Gentle,
        (true, false) => PersonalityTrait::Lively,
    }
}

/// Расстояние от центра, масштабированное так, что угол дает 1.0.
pub fn intensity(pos: QuadrantPosition) -> f32 {
    let dx = pos.x - 0.5;
    let dy = pos.y - 0.5;
    ((dx * dx + dy * dy).sqrt() * std::f32::consts::SQRT_2).min(1.0)
}

/// Билинейный вес каждой угловой черты; сумма весов равна 1.
pub fn corner_weights(pos: QuadrantPosition) -> [(PersonalityTrait, f32); 4] {
    let (x, y) = (pos.x, pos.y);
    [
        (PersonalityTrait::Calm, (1.0 - x) * y),
        (PersonalityTrait::Decisive, x * y),
        (PersonalityTrait::Gentle, (1.0 - x) * (1.0 - y)),
        (PersonalityTrait::Lively, x * (1.0 - y)),
    ]
}

fn descriptor_words(t: PersonalityTrait) -> [&'static str; 4] {
    match t {
        PersonalityTrait::Calm => ["steady", "restrained", "deep", "assured"],
        PersonalityTrait::Decisive => ["decisive", "sharp", "clear-headed", "incisive"],
        PersonalityTrait::Gentle => ["gentle", "attentive", "accepting", "soft"],
        PersonalityTrait::Lively => ["warm", "free", "feeling", "vivid"],
    }
}

/// Два ведущих слова одного темперамента, как их показывает [`describe`]
/// для точки глубоко в его квадранте.
pub fn describe_trait(t: PersonalityTrait) -> String {
    let words = descriptor_words(t);
    format!("{} · {}", words[0], words[1])
}

/// Короткое описание темперамента в точке `pos` из двух слов.
///
/// Возле центра предлагает потянуть точку. Внутри одного квадранта дает
/// два первых слова его угла, между квадрантами смешивает ведущие слова
/// двух сильнейших углов.
pub fn describe(pos: QuadrantPosition) -> String {
    if intensity(pos) < NEUTRAL_INTENSITY {
        return "drag to shape a temperament".to_string();
    }

    let mut weights = corner_weights(pos);
    weights.sort_by(|a, b| b.1.total_cmp(&a.1));
    let (top, top_w) = weights[0];
    let (runner_up, runner_w) = weights[1];

    if top_w > runner_w * 2.5 {
        describe_trait(top)
    } else {
        format!(
            "{} · {}",
            descriptor_words(top)[0],
            descriptor_words(runner_up)[0]
        )
    }
}

/// Начальная точка квадранта из дискретных выборов стиля.
pub fn choices_to_quadrant(choices: &StyleChoices) -> QuadrantPosition {
    let mut x: f32 = 0.5;
    let mut y: f32 = 0.5;

    match choices.communication {
        Some(CommunicationStance::Advisor) => y = (y + 0.35).min(0.95),
        Some(CommunicationStance::Partner) => y = (y - 0.30).max(0.05),
        None => {}
    }
    match choices.feedback {
        Some(FeedbackStance::Direct) => x = (x + 0.30).min(0.95),
        Some(FeedbackStance::Gentle) => x = (x - 0.25).max(0.05),
        None => {}
    }
    match choices.output {
        Some(OutputStance::Overview) => x = (x + 0.10).min(0.95),
        Some(OutputStance::Stepwise) => y = (y + 0.10).min(0.95),
        None => {}
    }

    QuadrantPosition::new(x, y)
}
