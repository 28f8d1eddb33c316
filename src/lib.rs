//! 🜂 Сфера души
//!
//! Формирование характера агента: тест и три слайдера выбирают один из
//! четырех архетипов, квадрант черт переводится в вектор визуальных
//! параметров, а сфера из частиц плавно к нему движется.
//!
//! Уровни:
//! - `initiation` (0) - конфигурация, сессия мастера, запуск
//! - `priests` (1) - вычислительное устройство
//! - `demiurge` (2) - архетипы, классификаторы, квадрант черт
//! - `aura` (3) - вектор параметров, отображение, сглаживание
//! - `orb` (4) - рендерер частиц и цикл кадров

pub mod aura;
pub mod demiurge;
pub mod initiation;
pub mod orb;
pub mod priests;
