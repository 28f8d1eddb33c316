//! Растеризатор точек
//!
//! Хостовая часть отрисовки: перспективная проекция, круглые мягкие точки
//! и аддитивное смешивание в f32-буфер, который раз в кадр сбрасывается в
//! RGBA-изображение.

use crate::aura::params::Rgb;
use image::{Rgba, RgbaImage};

/// Непрозрачная теплая темная умбра, #1e1810
pub const BACKGROUND: Rgb = [30.0 / 255.0, 24.0 / 255.0, 16.0 / 255.0];

pub const CAMERA_DISTANCE: f32 = 3.0;
pub const FOV_Y_DEGREES: f32 = 60.0;
const NEAR: f32 = 0.1;

/// Точка, готовая к растеризации
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splat {
    /// Мировая позиция после смещения и вращения
    pub position: [f32; 3],
    /// Диаметр точки в пикселях на глубине 1
    pub size: f32,
    pub color: Rgb,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    accum: Vec<Rgb>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            accum: vec![BACKGROUND; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self) {
        self.accum.iter_mut().for_each(|px| *px = BACKGROUND);
    }

    /// Экранная позиция и глубина мировой точки, `None` за ближней
    /// плоскостью.
    pub fn project(&self, p: [f32; 3]) -> Option<(f32, f32, f32)> {
        let depth = CAMERA_DISTANCE - p[2];
        if depth <= NEAR || !depth.is_finite() {
            return None;
        }
        let focal = 1.0 / (FOV_Y_DEGREES.to_radians() * 0.5).tan();
        let aspect = self.width as f32 / self.height as f32;
        let ndc_x = p[0] / depth * focal / aspect;
        let ndc_y = p[1] / depth * focal;
        let sx = (ndc_x * 0.5 + 0.5) * self.width as f32;
        let sy = (0.5 - ndc_y * 0.5) * self.height as f32;
        Some((sx, sy, depth))
    }

    /// Рисует круглую точку с мягким краем поверх того, что уже есть.
    pub fn splat(&mut self, splat: &Splat) {
        let Some((cx, cy, depth)) = self.project(splat.position) else {
            return;
        };
        let alpha = splat.alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 || !splat.size.is_finite() {
            return;
        }
        let diameter = (splat.size / depth).max(1.0);
        let radius = diameter * 0.5;

        let x0 = (cx - radius).floor().max(0.0) as i64;
        let y0 = (cy - radius).floor().max(0.0) as i64;
        let x1 = ((cx + radius).ceil() as i64).min(self.width as i64 - 1);
        let y1 = ((cy + radius).ceil() as i64).min(self.height as i64 - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = (x as f32 + 0.5 - cx) / diameter;
                let dy = (y as f32 + 0.5 - cy) / diameter;
                let d = (dx * dx + dy * dy).sqrt();
                if d > 0.5 {
                    continue;
                }
                let soft = 1.0 - smoothstep(0.04, 0.5, d);
                let weight = soft * alpha;
                let px = &mut self.accum[(y as usize) * (self.width as usize) + x as usize];
                for c in 0..3 {
                    px[c] += splat.color[c] * weight;
                }
            }
        }
    }

    /// Накопленный цвет пикселя, без ограничения
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.accum[(y as usize) * (self.width as usize) + x as usize]
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let px = self.pixel(x, y);
            let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgba([to_u8(px[0]), to_u8(px[1]), to_u8(px[2]), 255])
        })
    }
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
