//! Вектор параметров сферы
//!
//! Все, что полю частиц нужно знать о личности, в одном плоском типе.

use serde::{Deserialize, Serialize};

/// RGB, каждый канал 0.0 - 1.0
pub type Rgb = [f32; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleEffect {
    Spark,
    Wave,
    Stardust,
    Bubble,
}

/// Визуальные параметры сферы.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbParams {
    pub primary_color: Rgb,
    pub secondary_color: Rgb,
    pub particle_effect: ParticleEffect,
    /// Гц, всегда > 0
    pub pulse_frequency: f32,
    pub amplitude: f32,
    pub turbulence: f32,
    /// Насколько сфера сформирована; растет с прогрессом сессии
    pub clarity: f32,
    /// 0 = плавно/по орбите, 1 = резко/рассеянно (x квадранта)
    pub chaos: f32,
    /// 0 = свободно, 1 = плотно/структурно (y квадранта)
    pub flow: f32,
}

/// Наименьший пульс, который принимает рендерер
pub const MIN_PULSE_HZ: f32 = 0.05;
pub const MAX_PULSE_HZ: f32 = 8.0;

impl OrbParams {
    /// Копия, где каждое поле загнано в свой диапазон. Неконечные значения
    /// берутся из того же поля `fallback`.
    pub fn sanitized(&self, fallback: &OrbParams) -> OrbParams {
        OrbParams {
            primary_color: sanitize_color(self.primary_color, fallback.primary_color),
            secondary_color: sanitize_color(self.secondary_color, fallback.secondary_color),
            particle_effect: self.particle_effect,
            pulse_frequency: finite_or(self.pulse_frequency, fallback.pulse_frequency)
                .clamp(MIN_PULSE_HZ, MAX_PULSE_HZ),
            amplitude: unit_or(self.amplitude, fallback.amplitude),
            turbulence: unit_or(self.turbulence, fallback.turbulence),
            clarity: unit_or(self.clarity, fallback.clarity),
            chaos: unit_or(self.chaos, fallback.chaos),
            flow: unit_or(self.flow, fallback.flow),
        }
    }

    /// Все числовые поля конечны и в своих диапазонах.
    pub fn in_bounds(&self) -> bool {
        let unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
        self.primary_color.iter().chain(self.secondary_color.iter()).all(|c| unit(*c))
            && self.pulse_frequency.is_finite()
            && self.pulse_frequency > 0.0
            && unit(self.amplitude)
            && unit(self.turbulence)
            && unit(self.clarity)
            && unit(self.chaos)
            && unit(self.flow)
    }

    /// Частичное обновление; незаданные поля не меняются.
    pub fn apply(&mut self, nudge: &OrbNudge) {
        if let Some(c) = nudge.primary_color {
            self.primary_color = c;
        }
        if let Some(c) = nudge.secondary_color {
            self.secondary_color = c;
        }
        if let Some(e) = nudge.particle_effect {
            self.particle_effect = e;
        }
        if let Some(v) = nudge.pulse_frequency {
            self.pulse_frequency = v;
        }
        if let Some(v) = nudge.amplitude {
            self.amplitude = v;
        }
        if let Some(v) = nudge.turbulence {
            self.turbulence = v;
        }
        if let Some(v) = nudge.clarity {
            self.clarity = v;
        }
        if let Some(v) = nudge.chaos {
            self.chaos = v;
        }
        if let Some(v) = nudge.flow {
            self.flow = v;
        }
    }
}

/// Подмножество полей [`OrbParams`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbNudge {
    pub primary_color: Option<Rgb>,
    pub secondary_color: Option<Rgb>,
    pub particle_effect: Option<ParticleEffect>,
    pub pulse_frequency: Option<f32>,
    pub amplitude: Option<f32>,
    pub turbulence: Option<f32>,
    pub clarity: Option<f32>,
    pub chaos: Option<f32>,
    pub flow: Option<f32>,
}

impl OrbNudge {
    pub fn is_empty(&self) -> bool {
        *self == OrbNudge::default()
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn lerp_color(a: Rgb, b: Rgb, t: f32) -> Rgb {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

fn unit_or(v: f32, fallback: f32) -> f32 {
    finite_or(v, fallback).clamp(0.0, 1.0)
}

fn sanitize_color(c: Rgb, fallback: Rgb) -> Rgb {
    [
        unit_or(c[0], fallback[0]),
        unit_or(c[1], fallback[1]),
        unit_or(c[2], fallback[2]),
    ]
}
