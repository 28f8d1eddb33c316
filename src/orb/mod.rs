//! 🜂 Уровень 4: Сфера - Поле частиц
//!
//! Анимированное облако точек: шум, буферы частиц, рендерер с вершинной
//! стадией и растеризатором, поверхности для кадров и планировщик.

pub mod error;
pub mod frame_loop;
pub mod noise;
pub mod particles;
pub mod raster;
pub mod renderer;
pub mod surface;

pub use error::{RenderError, RenderResult};
pub use frame_loop::FrameLoop;
pub use noise::simplex3;
pub use renderer::SoulOrb;
pub use surface::{MemorySurface, PngSequenceSurface, Surface};
