//! Ошибки рендерера.

use thiserror::Error;

/// Сбои, после которых хост может работать дальше без сферы.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Не удалось получить поверхность для рисования.
    #[error("Surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Сбой тензорной операции на вычислительном устройстве.
    #[error("Device error: {0}")]
    Device(#[from] candle_core::Error),

    /// Ошибка кодирования кадра.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Ошибка файлового ввода-вывода.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Рендерер освобожден и больше не рисует.
    #[error("Renderer disposed")]
    Disposed,
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;
