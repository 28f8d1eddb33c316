//! Каталог архетипов - шаблоны персон
//!
//! Четыре фиксированных архетипа: ведущая черта, стартовые выборы стиля и
//! цвета, которыми окрашен мастер, пока архетип активен. Каталог
//! статический, здесь ничего не меняется.

use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Закрытый набор ключей архетипов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchetypeKey {
    #[serde(rename = "先知")]
    Oracle,
    #[serde(rename = "向导")]
    Guide,
    #[serde(rename = "执刃")]
    Blade,
    #[serde(rename = "精灵")]
    Spark,
}

impl ArchetypeKey {
    /// Порядок разрешения ничьих в тесте, старший приоритет первым.
    pub const PRIORITY: [ArchetypeKey; 4] = [
        ArchetypeKey::Oracle,
        ArchetypeKey::Guide,
        ArchetypeKey::Blade,
        ArchetypeKey::Spark,
    ];

    pub const ALL: [ArchetypeKey; 4] = Self::PRIORITY;

    /// Строка ключа, как ее видит хост
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchetypeKey::Oracle => "先知",
            ArchetypeKey::Guide => "向导",
            ArchetypeKey::Blade => "执刃",
            ArchetypeKey::Spark => "精灵",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ArchetypeKey::Oracle => 0,
            ArchetypeKey::Guide => 1,
            ArchetypeKey::Blade => 2,
            ArchetypeKey::Spark => 3,
        }
    }

    /// Запись каталога для ключа
    pub fn archetype(&self) -> &'static Archetype {
        &CATALOG[self.index()]
    }
}

impl fmt::Display for ArchetypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchetypeKey {
    type Err = Error;

    /// Принимает ключ хоста или английское имя из подзаголовка.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        ArchetypeKey::ALL
            .iter()
            .copied()
            .find(|key| {
                key.as_str() == trimmed
                    || format!("{:?}", key).eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| Error::msg(format!("Unknown archetype key '{}'", trimmed)))
    }
}

/// Крайние черты характера, по одной на угол квадранта.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonalityTrait {
    #[serde(rename = "果决")]
    Decisive,
    #[serde(rename = "温柔")]
    Gentle,
    #[serde(rename = "冷静")]
    Calm,
    #[serde(rename = "活泼")]
    Lively,
}

impl PersonalityTrait {
    pub const ALL: [PersonalityTrait; 4] = [
        PersonalityTrait::Decisive,
        PersonalityTrait::Gentle,
        PersonalityTrait::Calm,
        PersonalityTrait::Lively,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityTrait::Decisive => "果决",
            PersonalityTrait::Gentle => "温柔",
            PersonalityTrait::Calm => "冷静",
            PersonalityTrait::Lively => "活泼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStance {
    Advisor,
    Partner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStance {
    Direct,
    Gentle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryStance {
    Always,
    Private,
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStance {
    Stepwise,
    Overview,
}

/// Ответы о стиле из теста и слайдеров настройки.
///
/// В начале сессии любое поле может быть не задано; побеждает последнее
/// записанное значение.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleChoices {
    pub communication: Option<CommunicationStance>,
    pub feedback: Option<FeedbackStance>,
    pub output: Option<OutputStance>,
    pub boundary: Option<BoundaryStance>,
}

/// Цвета оформления, CSS-строки в том виде, как их рисует хост
#[derive(Debug, Clone, Serialize)]
pub struct ArchetypeColors {
    pub accent: &'static str,
    pub page_bg: &'static str,
    /// Цвета слайдеров: communication, feedback, boundary
    pub sliders: [&'static str; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct CardStyle {
    pub bg: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub glow: &'static str,
}

/// Запись каталога
#[derive(Debug, Clone, Serialize)]
pub struct Archetype {
    pub key: ArchetypeKey,
    pub name: &'static str,
    pub dominant_trait: PersonalityTrait,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub tags: [&'static str; 3],
    pub image: &'static str,
    pub symbol: &'static str,
    pub default_choices: StyleChoices,
    pub colors: ArchetypeColors,
    pub card: CardStyle,
}

static CATALOG: [Archetype; 4] = [
    Archetype {
        key: ArchetypeKey::Oracle,
        name: "先知",
        dominant_trait: PersonalityTrait::Calm,
        subtitle: "The Oracle",
        description: "Thinks it through before speaking. \
                      A steady observer, your fixed point in the chaos.",
        tags: ["objective", "precise", "strategic"],
        image: "/archetypes/seer.png",
        symbol: "🔮",
        default_choices: StyleChoices {
            communication: Some(CommunicationStance::Advisor),
            feedback: Some(FeedbackStance::Direct),
            output: Some(OutputStance::Overview),
            boundary: Some(BoundaryStance::Private),
        },
        colors: ArchetypeColors {
            accent: "#9b7fd4",
            page_bg: "#f5f2fc",
            sliders: ["#9b7fd4", "#7f9bd4", "#d47f9b"],
        },
        card: CardStyle {
            bg: "linear-gradient(160deg, #ede6fa 0%, #cdbef0 100%)",
            text: "#1e1530",
            border: "rgba(155, 127, 212, 0.30)",
            glow: "rgba(155, 127, 212, 0.45)",
        },
    },
    Archetype {
        key: ArchetypeKey::Guide,
        name: "向导",
        dominant_trait: PersonalityTrait::Gentle,
        subtitle: "The Guide",
        description: "Listens first, then speaks. Understands first, then helps. \
                      You are not walking alone.",
        tags: ["warm", "patient", "present"],
        image: "/archetypes/guide.png",
        symbol: "🌿",
        default_choices: StyleChoices {
            communication: Some(CommunicationStance::Partner),
            feedback: Some(FeedbackStance::Gentle),
            output: Some(OutputStance::Stepwise),
            boundary: Some(BoundaryStance::Soft),
        },
        colors: ArchetypeColors {
            accent: "#3aada6",
            page_bg: "#f0faf8",
            sliders: ["#3aada6", "#3a7aad", "#3aad72"],
        },
        card: CardStyle {
            bg: "linear-gradient(160deg, #d8f2ee 0%, #98d8d4 100%)",
            text: "#0c2e2a",
            border: "rgba(58, 173, 166, 0.30)",
            glow: "rgba(58, 173, 166, 0.45)",
        },
    },
    Archetype {
        key: ArchetypeKey::Blade,
        name: "执刃",
        dominant_trait: PersonalityTrait::Decisive,
        subtitle: "The Blade",
        description: "No circling, no stalling. Gets you moving and does what it says.",
        tags: ["direct", "efficient", "decisive"],
        image: "/archetypes/blade.png",
        symbol: "⚡",
        default_choices: StyleChoices {
            communication: Some(CommunicationStance::Advisor),
            feedback: Some(FeedbackStance::Direct),
            output: Some(OutputStance::Stepwise),
            boundary: Some(BoundaryStance::Always),
        },
        colors: ArchetypeColors {
            accent: "#e05c1a",
            page_bg: "#fdf5ef",
            sliders: ["#e05c1a", "#e0a01a", "#c01a3a"],
        },
        card: CardStyle {
            bg: "linear-gradient(160deg, #fde8d0 0%, #f0a060 100%)",
            text: "#280e02",
            border: "rgba(224, 92, 26, 0.30)",
            glow: "rgba(224, 92, 26, 0.45)",
        },
    },
    Archetype {
        key: ArchetypeKey::Spark,
        name: "精灵",
        dominant_trait: PersonalityTrait::Lively,
        subtitle: "The Spark",
        description: "Wanders off with you, turns dead ends into new roads and boredom into play.",
        tags: ["curious", "playful", "fun"],
        image: "/archetypes/spark.png",
        symbol: "✨",
        default_choices: StyleChoices {
            communication: Some(CommunicationStance::Partner),
            feedback: Some(FeedbackStance::Gentle),
            output: Some(OutputStance::Overview),
            boundary: Some(BoundaryStance::Always),
        },
        colors: ArchetypeColors {
            accent: "#c49800",
            page_bg: "#fffbea",
            sliders: ["#c49800", "#8ab000", "#c46400"],
        },
        card: CardStyle {
            bg: "linear-gradient(160deg, #fef5cc 0%, #f8dc40 100%)",
            text: "#281c02",
            border: "rgba(196, 152, 0, 0.30)",
            glow: "rgba(196, 152, 0, 0.45)",
        },
    },
];

/// Все записи каталога в порядке приоритета
pub fn catalog() -> &'static [Archetype] {
    &CATALOG
}

/// Поиск архетипа по строке ключа
pub fn lookup(key: &str) -> Result<&'static Archetype> {
    Ok(key.parse::<ArchetypeKey>()?.archetype())
}
