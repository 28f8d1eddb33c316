//! 🜂 Уровень 2: Демиург - Архетипы и классификация
//!
//! Демиург решает, кем будет агент: статический каталог архетипов,
//! классификаторы теста и слайдеров и непрерывный квадрант черт, от
//! которого питается визуальный слой.

pub mod archetype;
pub mod classifier;
pub mod persona;

pub use archetype::{
    Archetype, ArchetypeKey, BoundaryStance, CommunicationStance, FeedbackStance, OutputStance,
    PersonalityTrait, StyleChoices,
};
pub use classifier::{classify_by_quiz, classify_by_sliders, SliderValues};
pub use persona::{Personality, QuadrantPosition};
