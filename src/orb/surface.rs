//! 🜂 Поверхности для кадров
//!
//! Рендереру нужно только место для готовых кадров. Хост передает
//! [`Surface`]; в крейте есть поверхность в памяти для тестов и превью и
//! запись PNG-последовательности для запуска без окна.

use crate::orb::error::{RenderError, RenderResult};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::debug;

pub trait Surface {
    /// Размер поверхности в пикселях
    fn size(&self) -> (u32, u32);

    /// Вызывается один раз до первого кадра. Ошибка здесь окончательна.
    fn acquire(&mut self) -> RenderResult<()>;

    /// Передает готовый кадр.
    fn present(&mut self, frame: &RgbaImage, index: u64) -> RenderResult<()>;

    /// Сбрасывает все, что держит поверхность. Можно вызывать повторно.
    fn release(&mut self);
}

/// Хранит последние кадры в памяти.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    width: u32,
    height: u32,
    keep: usize,
    available: bool,
    acquired: bool,
    presented: u64,
    frames: Vec<RgbaImage>,
}

impl MemorySurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            keep: 4,
            available: true,
            acquired: false,
            presented: 0,
            frames: Vec::new(),
        }
    }

    /// Поверхность, контекст которой никогда не захватывается, как у хоста
    /// без графики.
    pub fn unavailable(width: u32, height: u32) -> Self {
        Self {
            available: false,
            ..Self::new(width, height)
        }
    }

    pub fn with_capacity(mut self, keep: usize) -> Self {
        self.keep = keep.max(1);
        self
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn last_frame(&self) -> Option<&RgbaImage> {
        self.frames.last()
    }

    pub fn frames(&self) -> &[RgbaImage] {
        &self.frames
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn acquire(&mut self) -> RenderResult<()> {
        if !self.available {
            return Err(RenderError::SurfaceUnavailable(
                "no drawing context for memory surface".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::SurfaceUnavailable(format!(
                "empty surface {}x{}",
                self.width, self.height
            )));
        }
        self.acquired = true;
        Ok(())
    }

    fn present(&mut self, frame: &RgbaImage, _index: u64) -> RenderResult<()> {
        if self.frames.len() == self.keep {
            self.frames.remove(0);
        }
        self.frames.push(frame.clone());
        self.presented += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.frames.clear();
        self.acquired = false;
    }
}

/// Пишет `frame_00000.png`, `frame_00001.png`, ... в каталог.
#[derive(Debug, Clone)]
pub struct PngSequenceSurface {
    dir: PathBuf,
    width: u32,
    height: u32,
    written: Vec<PathBuf>,
}

impl PngSequenceSurface {
    pub fn new<P: AsRef<Path>>(dir: P, width: u32, height: u32) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            width,
            height,
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Файлы, записанные с момента acquire; release очищает список
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", index))
    }
}

impl Surface for PngSequenceSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn acquire(&mut self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::SurfaceUnavailable(format!(
                "empty surface {}x{}",
                self.width, self.height
            )));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            RenderError::SurfaceUnavailable(format!("{}: {}", self.dir.display(), e))
        })?;
        Ok(())
    }

    fn present(&mut self, frame: &RgbaImage, index: u64) -> RenderResult<()> {
        let path = self.frame_path(index);
        frame.save(&path)?;
        debug!(path = %path.display(), "frame written");
        self.written.push(path);
        Ok(())
    }

    fn release(&mut self) {
        self.written.clear();
    }
}
