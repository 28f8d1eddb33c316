//! 🜂 Планировщик кадров
//!
//! Вызывает замыкание на каждый кадр с прошедшим временем, пока его не
//! остановят. В режиме realtime кадры идут по настенным часам, иначе время
//! синтетическое (`frame / fps`) и кадры идут подряд, как нужно для
//! рендера без окна и для тестов.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

pub struct FrameLoop {
    interval: Duration,
    realtime: bool,
    stop: Arc<AtomicBool>,
}

impl FrameLoop {
    /// `fps` должен быть положительным, иначе берется 30.
    pub fn new(fps: f32) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 30.0 };
        Self {
            interval: Duration::from_secs_f32(1.0 / fps),
            realtime: false,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Флаг, завершающий цикл перед следующим кадром, например из
    /// обработчика Ctrl-C.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Смещение кадра `frame` от начала запуска в реальном времени
    fn tick_at(&self, frame: u64) -> Duration {
        self.interval.mul_f64(frame as f64)
    }

    /// Работает до `max_frames` кадров, до флага остановки или до ошибки
    /// замыкания. Возвращает число выполненных кадров.
    pub fn run<F>(&self, max_frames: Option<u64>, mut on_frame: F) -> Result<u64>
    where
        F: FnMut(u64, f32) -> Result<()>,
    {
        let started = Instant::now();
        let mut frame: u64 = 0;

        while !self.stop.load(Ordering::SeqCst) {
            if max_frames.map_or(false, |max| frame >= max) {
                break;
            }

            let elapsed = if self.realtime {
                started.elapsed().as_secs_f32()
            } else {
                frame as f32 * self.interval.as_secs_f32()
            };
            on_frame(frame, elapsed)?;
            frame += 1;

            if self.realtime {
                let next_tick = self.tick_at(frame);
                if let Some(wait) = next_tick.checked_sub(started.elapsed()) {
                    std::thread::sleep(wait);
                }
            }
        }

        debug!(frames = frame, "frame loop finished");
        Ok(frame)
    }
}
