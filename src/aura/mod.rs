//! 🜂 Уровень 3: Аура - Визуальные параметры
//!
//! Переводит личность (точку квадранта или дискретную черту) в вектор
//! параметров, по которому рисуется сфера, и сглаживает его во времени.

pub mod animator;
pub mod mapper;
pub mod params;
pub mod presets;

pub use animator::ParameterAnimator;
pub use mapper::{map_archetype_to_parameters, map_position_to_parameters, text_nudge};
pub use params::{OrbNudge, OrbParams, ParticleEffect, Rgb};
