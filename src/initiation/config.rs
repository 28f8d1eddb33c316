//! 🜂 Конфигурация сферы
//!
//! Все, что нужно рендереру и циклу кадров помимо визуальных параметров:
//! число частиц, размер поверхности, частота и сглаживание.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/orb.json";

/// Основная конфигурация
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    /// Число частиц на оболочке
    pub particle_count: usize,
    /// Сид раскладки частиц
    pub seed: u64,
    /// Ширина поверхности в пикселях
    pub width: u32,
    /// Высота поверхности в пикселях
    pub height: u32,
    /// Кадров в секунду
    pub fps: f32,
    /// Внутренний радиус оболочки
    pub shell_inner: f32,
    /// Внешний радиус оболочки
    pub shell_outer: f32,
    /// Сглаживание аниматора на кадр 60 Гц, в (0, 1]
    pub smoothing: f32,
    /// Базовый размер точки в пикселях на глубине 1
    pub point_scale: f32,
    /// Куда пишутся кадры
    pub output_dir: String,
    /// Принудительно CPU
    pub force_cpu: bool,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            particle_count: 9000,
            seed: 7,
            width: 512,
            height: 512,
            fps: 30.0,
            shell_inner: 0.78,
            shell_outer: 1.22,
            smoothing: 0.03,
            point_scale: 6.0,
            output_dir: "frames".to_string(),
            force_cpu: false,
        }
    }
}

impl OrbConfig {
    /// Загружает `config/orb.json`, создавая его с умолчаниями, если нет.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: OrbConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let default_config = OrbConfig::default();
            default_config.save_to(path)?;

            println!("📝 Created {} with default settings", path.display());
            Ok(default_config)
        }
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Значения командной строки важнее файла.
    pub fn merge_with_args(
        mut self,
        particles: Option<usize>,
        size: Option<u32>,
        fps: Option<f32>,
        seed: Option<u64>,
        output_dir: Option<String>,
        force_cpu: bool,
    ) -> Self {
        if let Some(n) = particles {
            self.particle_count = n;
        }
        if let Some(s) = size {
            self.width = s;
            self.height = s;
        }
        if let Some(f) = fps {
            self.fps = f;
        }
        if let Some(s) = seed {
            self.seed = s;
        }
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        if force_cpu {
            self.force_cpu = true;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            anyhow::bail!("particle_count must be > 0");
        }

        if self.width == 0 || self.height == 0 {
            anyhow::bail!("surface is empty: {}x{}", self.width, self.height);
        }

        if !self.fps.is_finite() || self.fps <= 0.0 {
            anyhow::bail!("fps must be > 0, got {}", self.fps);
        }

        if !(self.shell_inner.is_finite() && self.shell_outer.is_finite())
            || self.shell_inner <= 0.0
            || self.shell_inner > self.shell_outer
        {
            anyhow::bail!(
                "bad shell band [{}, {}]",
                self.shell_inner,
                self.shell_outer
            );
        }

        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            anyhow::bail!("smoothing must be in (0, 1], got {}", self.smoothing);
        }

        if !self.point_scale.is_finite() || self.point_scale <= 0.0 {
            anyhow::bail!("point_scale must be > 0");
        }

        Ok(())
    }

    /// Маленькая раскладка для тестов и превью
    pub fn preview() -> Self {
        Self {
            particle_count: 600,
            width: 96,
            height: 96,
            ..Self::default()
        }
    }
}
