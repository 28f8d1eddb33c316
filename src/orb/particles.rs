//! Оболочка частиц
//!
//! Неизменный набор точек, из которого рисуется сфера. Позиции, масштабы и
//! скорости выбираются один раз из rng с сидом и больше не меняются; все
//! движение пересчитывается каждый кадр из времени и вектора параметров.

use candle_core::{Device, Result as CandleResult, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

pub const SCALE_RANGE: (f32, f32) = (0.25, 1.25);

/// Копия набора частиц на хосте.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    /// Базовые позиции, (x, y, z) на частицу
    pub positions: Vec<[f32; 3]>,
    pub scales: Vec<f32>,
    /// Фиксированное случайное направление, компоненты в [-1, 1]
    pub velocities: Vec<[f32; 3]>,
}

impl ParticleState {
    /// Равномерные точки в толстой оболочке `[inner, outer]`. Полярный угол
    /// берется как `acos(2u - 1)`, чтобы не сгущать полюса.
    pub fn sample(count: usize, inner: f32, outer: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut positions = Vec::with_capacity(count);
        let mut scales = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);

        for _ in 0..count {
            let u: f32 = rng.gen();
            let v: f32 = rng.gen();
            let theta = (2.0 * u - 1.0).clamp(-1.0, 1.0).acos();
            let phi = TAU * v;
            let r = if outer > inner {
                rng.gen_range(inner..outer)
            } else {
                inner
            };

            positions.push([
                r * theta.sin() * phi.cos(),
                r * theta.sin() * phi.sin(),
                r * theta.cos(),
            ]);
            scales.push(rng.gen_range(SCALE_RANGE.0..SCALE_RANGE.1));
            velocities.push([
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            ]);
        }

        Self {
            positions,
            scales,
            velocities,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Расстояние каждой базовой позиции от центра
    pub fn radii(&self) -> Vec<f32> {
        self.positions
            .iter()
            .map(|p| (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt())
            .collect()
    }
}

/// Буферы вершинной стадии на устройстве.
#[derive(Debug)]
pub struct ParticleBuffers {
    /// (N, 3)
    pub positions: Tensor,
    /// (N, 3), единичной длины
    pub normals: Tensor,
    /// (N, 3)
    pub velocities: Tensor,
}

impl ParticleBuffers {
    pub fn upload(state: &ParticleState, device: &Device) -> CandleResult<Self> {
        let n = state.len();
        let flat = |rows: &[[f32; 3]]| {
            rows.iter()
                .flat_map(|r| r.iter().copied())
                .collect::<Vec<_>>()
        };

        let positions = Tensor::from_vec(flat(&state.positions), (n, 3), device)?;
        let lengths = positions.sqr()?.sum_keepdim(1)?.sqrt()?;
        let normals = positions.broadcast_div(&lengths)?;
        let velocities = Tensor::from_vec(flat(&state.velocities), (n, 3), device)?;

        Ok(Self {
            positions,
            normals,
            velocities,
        })
    }
}
