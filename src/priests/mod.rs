//! 🜂 Уровень 1: Жрецы Железа
//!
//! Аппаратный уровень: на каком устройстве живут буферы сферы.

pub mod device;

pub use device::{DeviceConfig, DeviceManager};
