//! 🜂 Уровень 4: Сфера - Рендерер
//!
//! Облако точек на толстой сфере, каждый кадр смещаемое слоями симплекс-шума
//! по сглаженному вектору параметров. Вершинная стадия идет тензорными
//! операциями на выбранном устройстве, растеризация и смешивание на хосте.
//!
//! Частоту кадров решает не рендерер: внешний планировщик вызывает
//! [`SoulOrb::update`] со временем, прошедшим с его старта.

use crate::aura::animator::ParameterAnimator;
use crate::aura::params::{lerp, lerp_color, OrbNudge, OrbParams, Rgb};
use crate::initiation::config::OrbConfig;
use crate::orb::error::{RenderError, RenderResult};
use crate::orb::noise::simplex3;
use crate::orb::particles::{ParticleBuffers, ParticleState};
use crate::orb::raster::{Framebuffer, Splat};
use crate::orb::surface::Surface;
use candle_core::{Device, Tensor};
use std::f32::consts::TAU;
use tracing::{debug, info, warn};
use uuid::Uuid;

const SLOW_FREQ: f32 = 1.5;
const SLOW_DRIFT: [f32; 3] = [0.25, 0.18, 0.12];
const FAST_FREQ: f32 = 4.2;
const FAST_DRIFT: [f32; 3] = [0.85, 0.70, 0.58];
const SWIRL_FREQ: f32 = 2.5;
const SWIRL_DRIFT: [f32; 3] = [0.15, 0.40, 0.25];

/// Радиальный разброс при flow 0 и flow 1
const RADIAL_SCALE: (f32, f32) = (0.50, 0.16);
const SWIRL_SCALE: (f32, f32) = (0.28, 0.07);
const PULSE_DEPTH: f32 = 0.06;
const SIZE_RANGE: (f32, f32) = (0.7, 1.4);

/// Результат вершинной стадии для одной частицы
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    /// Шум, смешанный по chaos; от него же зависит прозрачность
    pub noise: f32,
}

/// Внешний вид точки до проекции
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    /// Диаметр в пикселях на глубине 1
    pub size: f32,
    pub color: Rgb,
    pub alpha: f32,
}

pub struct SoulOrb<S: Surface> {
    id: Uuid,
    surface: S,
    device: Device,
    particles: ParticleState,
    radii: Vec<f32>,
    buffers: Option<ParticleBuffers>,
    animator: ParameterAnimator,
    framebuffer: Framebuffer,
    point_scale: f32,
    running: bool,
    disposed: bool,
    last_elapsed: Option<f32>,
    frame_index: u64,
}

impl<S: Surface> SoulOrb<S> {
    /// Захватывает поверхность и загружает буферы частиц. Ошибка любого
    /// шага возвращается один раз, без повторов.
    pub fn new(
        mut surface: S,
        initial: OrbParams,
        config: &OrbConfig,
        device: &Device,
    ) -> RenderResult<Self> {
        surface.acquire()?;
        let (width, height) = surface.size();

        let particles = ParticleState::sample(
            config.particle_count,
            config.shell_inner,
            config.shell_outer,
            config.seed,
        );
        let buffers = ParticleBuffers::upload(&particles, device)?;
        let radii = particles.radii();
        let animator = ParameterAnimator::with_smoothing(initial, config.smoothing);
        let id = Uuid::new_v4();

        info!(
            orb = %id,
            particles = particles.len(),
            width,
            height,
            smoothing = animator.smoothing(),
            "soul orb initialised"
        );

        Ok(Self {
            id,
            surface,
            device: device.clone(),
            particles,
            radii,
            buffers: Some(buffers),
            animator,
            framebuffer: Framebuffer::new(width, height),
            point_scale: config.point_scale,
            running: false,
            disposed: false,
            last_elapsed: None,
            frame_index: 0,
        })
    }

    pub fn start(&mut self) {
        if self.disposed {
            warn!(orb = %self.id, "start ignored, orb disposed");
            return;
        }
        if !self.running {
            info!(orb = %self.id, "orb started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!(orb = %self.id, frames = self.frame_index, "orb stopped");
        }
        self.running = false;
        self.last_elapsed = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Новый целевой вектор. Учитывается только последний перед кадром.
    pub fn set_params(&mut self, params: OrbParams) {
        self.animator.set_target(params);
    }

    /// Меняет только заданные поля цели
    pub fn nudge(&mut self, nudge: &OrbNudge) {
        self.animator.nudge(nudge);
    }

    /// Сглаженный вектор, по которому нарисован последний кадр
    pub fn current_params(&self) -> &OrbParams {
        self.animator.current()
    }

    pub fn target_params(&self) -> &OrbParams {
        self.animator.target()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Один кадр: сглаживание, вершинная стадия, растеризация, вывод.
    /// `elapsed` в секундах от старта планировщика. Возвращает, был ли
    /// нарисован кадр; после stop и dispose ничего не происходит.
    pub fn update(&mut self, elapsed: f32) -> RenderResult<bool> {
        if !self.running || self.disposed || !elapsed.is_finite() {
            return Ok(false);
        }

        let dt = match self.last_elapsed {
            Some(last) if elapsed > last => elapsed - last,
            _ => 0.0,
        };
        self.last_elapsed = Some(elapsed);
        self.animator.step_for(dt);

        self.draw(elapsed)?;
        let frame = self.framebuffer.to_image();
        self.surface.present(&frame, self.frame_index)?;
        self.frame_index += 1;
        Ok(true)
    }

    /// Растеризует текущий вектор на момент `time` в кадровый буфер,
    /// без сглаживания и вывода.
    pub fn draw(&mut self, time: f32) -> RenderResult<&Framebuffer> {
        let buffers = self.buffers.as_ref().ok_or(RenderError::Disposed)?;
        let params = *self.animator.current();
        let vertices = vertex_stage(&self.particles, buffers, &self.device, &params, time)?;

        self.framebuffer.clear();
        for (i, vertex) in vertices.iter().enumerate() {
            let style = shade(
                &params,
                self.particles.scales[i],
                self.radii[i],
                vertex.noise,
                self.point_scale,
                time,
            );
            self.framebuffer.splat(&Splat {
                position: vertex.position,
                size: style.size,
                color: style.color,
                alpha: style.alpha,
            });
        }
        debug!(orb = %self.id, time, "frame rasterised");
        Ok(&self.framebuffer)
    }

    /// Освобождает буферы устройства и поверхность. Дальше update ничего
    /// не рисует.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.running = false;
        self.disposed = true;
        self.buffers = None;
        self.surface.release();
        info!(orb = %self.id, frames = self.frame_index, "orb disposed");
    }
}

impl<S: Surface> Drop for SoulOrb<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Фоновое вращение: `R = Rx(0.12·sin(0.06t)) · Ry(0.08t)`.
pub fn rotation(time: f32) -> [[f32; 3]; 3] {
    let ry = 0.08 * time;
    let rx = (0.06 * time).sin() * 0.12;
    let (sy, cy) = ry.sin_cos();
    let (sx, cx) = rx.sin_cos();
    [
        [cy, 0.0, sy],
        [sx * sy, cx, -sx * cy],
        [-cx * sy, sx, cx * cy],
    ]
}

/// Общий масштаб "дыхания" во времени узора `t`
pub fn pulse_scale(t: f32, amplitude: f32) -> f32 {
    let pulse = (t * TAU).sin() * 0.5 + 0.5;
    1.0 + pulse * amplitude * PULSE_DEPTH
}

fn offset(p: &[f32; 3], freq: f32, drift: [f32; 3], t: f32, sign: f32) -> [f32; 3] {
    [
        p[0] * freq + sign * t * drift[0],
        p[1] * freq + sign * t * drift[1],
        p[2] * freq + sign * t * drift[2],
    ]
}

/// Размер, цвет и прозрачность частицы со шкалой `scale` на расстоянии
/// `dist` от центра. Размер растет с chaos от 0.7 до 1.4 базового, цвет
/// переливается между primary и secondary, яркость мерцает.
pub fn shade(
    params: &OrbParams,
    scale: f32,
    dist: f32,
    noise: f32,
    point_scale: f32,
    time: f32,
) -> PointStyle {
    let mix = (time * 0.5 + dist * 3.0).sin() * 0.5 + 0.5;
    let twinkle = 0.75 + 0.25 * (time * 1.8 + dist * 11.0).sin();
    let alpha = (0.35 + 0.65 * params.clarity) * (0.45 + 0.55 * noise);
    PointStyle {
        size: lerp(SIZE_RANGE.0, SIZE_RANGE.1, params.chaos) * scale * point_scale,
        color: lerp_color(params.primary_color, params.secondary_color, mix),
        alpha: alpha * twinkle,
    }
}

/// Смещает и поворачивает все частицы на момент `time`. Шум считается на
/// хосте, векторная математика по частицам идет на `device`.
pub fn vertex_stage(
    particles: &ParticleState,
    buffers: &ParticleBuffers,
    device: &Device,
    params: &OrbParams,
    time: f32,
) -> RenderResult<Vec<Vertex>> {
    let n = particles.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let t = time * params.pulse_frequency;
    let radial_scale = params.amplitude * lerp(RADIAL_SCALE.0, RADIAL_SCALE.1, params.flow);
    let swirl_scale = params.turbulence * lerp(SWIRL_SCALE.0, SWIRL_SCALE.1, params.flow);

    let mut noise = Vec::with_capacity(n);
    let mut radial = Vec::with_capacity(n);
    let mut swirl = Vec::with_capacity(n);
    for p in &particles.positions {
        let slow = simplex3(offset(p, SLOW_FREQ, SLOW_DRIFT, t, 1.0));
        let fast = simplex3(offset(p, FAST_FREQ, FAST_DRIFT, t, 1.0));
        let blended = lerp(slow, fast, params.chaos);
        let second = simplex3(offset(p, SWIRL_FREQ, SWIRL_DRIFT, t, -1.0));
        noise.push(blended);
        radial.push(blended * radial_scale);
        swirl.push(second * swirl_scale);
    }

    let radial = Tensor::from_vec(radial, (n, 1), device)?;
    let swirl = Tensor::from_vec(swirl, (n, 1), device)?;
    let displaced = buffers
        .positions
        .add(&buffers.normals.broadcast_mul(&radial)?)?
        .add(&buffers.velocities.broadcast_mul(&swirl)?)?
        .affine(pulse_scale(t, params.amplitude) as f64, 0.0)?;

    // строки-векторы, поэтому умножаем на транспонированную
    let r = rotation(time);
    let r_t: Vec<f32> = (0..3)
        .flat_map(|i| (0..3).map(move |j| r[j][i]))
        .collect();
    let r_t = Tensor::from_vec(r_t, (3, 3), device)?;
    let rows: Vec<Vec<f32>> = displaced.matmul(&r_t)?.to_vec2()?;

    Ok(rows
        .into_iter()
        .zip(noise)
        .map(|(row, noise)| Vertex {
            position: [row[0], row[1], row[2]],
            noise,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::presets::trait_preset;
    use crate::demiurge::PersonalityTrait;
    use crate::orb::raster::BACKGROUND;
    use crate::orb::surface::MemorySurface;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn orb_with(params: OrbParams) -> SoulOrb<MemorySurface> {
        orb_from(&OrbConfig::preview(), params)
    }

    fn orb_from(config: &OrbConfig, params: OrbParams) -> SoulOrb<MemorySurface> {
        SoulOrb::new(
            MemorySurface::new(config.width, config.height),
            params,
            config,
            &Device::Cpu,
        )
        .unwrap()
    }

    /// Colour added on top of the background at each pixel
    fn excess(fb: &Framebuffer) -> Vec<Rgb> {
        let mut out = Vec::new();
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                let px = fb.pixel(x, y);
                out.push([
                    px[0] - BACKGROUND[0],
                    px[1] - BACKGROUND[1],
                    px[2] - BACKGROUND[2],
                ]);
            }
        }
        out
    }

    /// Still shell: no radial or swirl displacement, full clarity
    fn still(chaos: f32) -> OrbParams {
        let mut params = trait_preset(PersonalityTrait::Decisive);
        params.amplitude = 0.0;
        params.turbulence = 0.0;
        params.clarity = 1.0;
        params.chaos = chaos;
        params
    }

    fn brightness(fb: &Framebuffer) -> f32 {
        let mut total = 0.0;
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                let px = fb.pixel(x, y);
                total += px[0] + px[1] + px[2];
            }
        }
        total
    }

    /// То же смещение, посчитанное напрямую на хосте
    fn reference(p: [f32; 3], v: [f32; 3], params: &OrbParams, time: f32) -> [f32; 3] {
        let t = time * params.pulse_frequency;
        let slow = simplex3(offset(&p, SLOW_FREQ, SLOW_DRIFT, t, 1.0));
        let fast = simplex3(offset(&p, FAST_FREQ, FAST_DRIFT, t, 1.0));
        let n = lerp(slow, fast, params.chaos);
        let n2 = simplex3(offset(&p, SWIRL_FREQ, SWIRL_DRIFT, t, -1.0));
        let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
        let radial = n * params.amplitude * lerp(0.5, 0.16, params.flow);
        let swirl = n2 * params.turbulence * lerp(0.28, 0.07, params.flow);
        let pulse = pulse_scale(t, params.amplitude);
        let d: Vec<f32> = (0..3)
            .map(|i| (p[i] + p[i] / len * radial + v[i] * swirl) * pulse)
            .collect();
        let r = rotation(time);
        [
            r[0][0] * d[0] + r[0][1] * d[1] + r[0][2] * d[2],
            r[1][0] * d[0] + r[1][1] * d[1] + r[1][2] * d[2],
            r[2][0] * d[0] + r[2][1] * d[1] + r[2][2] * d[2],
        ]
    }

    #[test]
    fn test_unavailable_surface_is_an_error() {
        let config = OrbConfig::preview();
        let result = SoulOrb::new(
            MemorySurface::unavailable(64, 64),
            trait_preset(PersonalityTrait::Calm),
            &config,
            &Device::Cpu,
        );
        assert!(matches!(result, Err(RenderError::SurfaceUnavailable(_))));
    }

    #[test]
    fn test_vertex_stage_matches_host_math() {
        let params = trait_preset(PersonalityTrait::Lively);
        let particles = ParticleState::sample(50, 0.78, 1.22, 9);
        let buffers = ParticleBuffers::upload(&particles, &Device::Cpu).unwrap();
        for time in [0.0f32, 0.7, 12.3] {
            let vertices =
                vertex_stage(&particles, &buffers, &Device::Cpu, &params, time).unwrap();
            for (i, vertex) in vertices.iter().enumerate() {
                let expected = reference(
                    particles.positions[i],
                    particles.velocities[i],
                    &params,
                    time,
                );
                for k in 0..3 {
                    assert!((vertex.position[k] - expected[k]).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_rotation_is_orthonormal() {
        for time in [0.0f32, 1.0, 30.0, 500.0] {
            let r = rotation(time);
            for i in 0..3 {
                for j in 0..3 {
                    let dot: f32 = (0..3).map(|k| r[i][k] * r[j][k]).sum();
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert!((dot - expected).abs() < 1e-5);
                }
            }
        }
        assert_eq!(rotation(0.0), [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_pulse_bounds() {
        for i in 0..100 {
            let s = pulse_scale(i as f32 * 0.037, 1.0);
            assert!((1.0..=1.06 + 1e-6).contains(&s));
        }
        assert_eq!(pulse_scale(3.3, 0.0), 1.0);
    }

    #[test]
    fn test_update_lifecycle() {
        let mut orb = orb_with(trait_preset(PersonalityTrait::Gentle));

        // not started
        assert!(!orb.update(0.0).unwrap());
        assert_eq!(orb.surface().presented(), 0);

        orb.start();
        assert!(orb.update(0.0).unwrap());
        assert!(orb.update(1.0 / 30.0).unwrap());
        assert_eq!(orb.surface().presented(), 2);
        assert_eq!(orb.frame_index(), 2);

        orb.stop();
        assert!(!orb.update(0.1).unwrap());
        assert_eq!(orb.surface().presented(), 2);

        orb.start();
        assert!(!orb.is_disposed());
        orb.dispose();
        assert!(orb.is_disposed());
        assert!(!orb.update(0.2).unwrap());
        assert!(!orb.surface().is_acquired());
        orb.start();
        assert!(!orb.is_running());
        assert!(matches!(orb.draw(0.3), Err(RenderError::Disposed)));
    }

    #[test]
    fn test_frame_draws_particles() {
        let mut orb = orb_with(trait_preset(PersonalityTrait::Decisive));
        orb.start();
        orb.update(0.5).unwrap();
        let frame = orb.surface().last_frame().unwrap();
        let centre = frame.get_pixel(frame.width() / 2, frame.height() / 2);
        let corner = frame.get_pixel(0, 0);
        let bg = [30u8, 24, 16];
        assert_eq!(&corner.0[..3], &bg);
        assert!(frame.pixels().any(|p| p.0[..3] != bg));
        assert_eq!(centre[3], 255);
    }

    #[test]
    fn test_draw_is_deterministic() {
        let params = trait_preset(PersonalityTrait::Calm);
        let mut a = orb_with(params);
        let mut b = orb_with(params);
        let fa = a.draw(2.0).unwrap().to_image();
        let fb = b.draw(2.0).unwrap().to_image();
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_clarity_brightens() {
        let mut dim = trait_preset(PersonalityTrait::Calm);
        dim.clarity = 0.0;
        let mut crisp = dim;
        crisp.clarity = 1.0;
        let dim_total = brightness(orb_with(dim).draw(1.0).unwrap());
        let crisp_total = brightness(orb_with(crisp).draw(1.0).unwrap());
        assert!(crisp_total > dim_total);
    }

    #[test]
    fn test_bursts_coalesce_into_latest_target() {
        let mut orb = orb_with(trait_preset(PersonalityTrait::Gentle));
        orb.start();
        orb.update(0.0).unwrap();
        for i in 0..50 {
            let t = if i % 2 == 0 { PersonalityTrait::Lively } else { PersonalityTrait::Calm };
            orb.set_params(trait_preset(t));
        }
        orb.set_params(trait_preset(PersonalityTrait::Decisive));
        orb.update(1.0 / 60.0).unwrap();
        assert_eq!(*orb.target_params(), trait_preset(PersonalityTrait::Decisive));
        assert_eq!(orb.surface().presented(), 2);
    }

    #[test]
    fn test_malformed_params_do_not_break_the_loop() {
        let mut orb = orb_with(trait_preset(PersonalityTrait::Calm));
        orb.start();
        let mut broken = trait_preset(PersonalityTrait::Lively);
        broken.pulse_frequency = f32::NAN;
        broken.chaos = f32::INFINITY;
        broken.primary_color = [f32::NAN, 0.5, 2.0];
        orb.set_params(broken);
        for frame in 0..5 {
            assert!(orb.update(frame as f32 / 30.0).unwrap());
        }
        assert!(orb.current_params().in_bounds());
        assert!(orb.update(f32::NAN).is_ok());
    }

    #[test]
    fn test_corner_stays_background() {
        let mut params = trait_preset(PersonalityTrait::Gentle);
        params.clarity = 0.0;
        let mut orb = orb_with(params);
        let fb = orb.draw(0.0).unwrap();
        assert_eq!(fb.pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn test_shade_size_doubles_from_calm_to_chaotic() {
        let calm = shade(&still(0.0), 0.8, 1.0, 0.3, 6.0, 2.0);
        let wild = shade(&still(1.0), 0.8, 1.0, 0.3, 6.0, 2.0);
        assert!((calm.size - 0.7 * 0.8 * 6.0).abs() < 1e-5);
        assert!((wild.size / calm.size - 2.0).abs() < 1e-5);
        assert_eq!(calm.color, wild.color);
    }

    #[test]
    fn test_shade_colour_follows_mix_phase() {
        let mut params = still(0.5);
        params.primary_color = [1.0, 0.0, 0.0];
        params.secondary_color = [0.0, 0.0, 1.0];
        // sin(0.5t) peaks at t = pi and bottoms out at t = 3pi
        let top = shade(&params, 1.0, 0.0, 0.0, 1.0, PI);
        let bottom = shade(&params, 1.0, 0.0, 0.0, 1.0, 3.0 * PI);
        for c in 0..3 {
            assert!((top.color[c] - params.secondary_color[c]).abs() < 1e-5);
            assert!((bottom.color[c] - params.primary_color[c]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_shade_twinkle_range() {
        let params = still(0.5);
        let bright = shade(&params, 1.0, 0.0, 1.0, 1.0, FRAC_PI_2 / 1.8);
        let faint = shade(&params, 1.0, 0.0, 1.0, 1.0, 3.0 * FRAC_PI_2 / 1.8);
        assert!((bright.alpha - 1.0).abs() < 1e-5);
        assert!((faint.alpha - 0.5).abs() < 1e-5);

        let mut hazy = params;
        hazy.clarity = 0.0;
        let dim = shade(&hazy, 1.0, 0.0, 1.0, 1.0, FRAC_PI_2 / 1.8);
        assert!((dim.alpha - 0.35).abs() < 1e-5);
    }

    #[test]
    fn test_chaos_grows_point_footprint() {
        let config = OrbConfig {
            particle_count: 20,
            point_scale: 20.0,
            ..OrbConfig::preview()
        };
        let lit = |chaos: f32| {
            let mut orb = orb_from(&config, still(chaos));
            excess(orb.draw(0.0).unwrap())
                .iter()
                .filter(|e| e[0] + e[1] + e[2] > 1e-6)
                .count()
        };
        let calm = lit(0.0);
        let wild = lit(1.0);
        assert!(calm > 0);
        assert!(wild as f32 > calm as f32 * 1.5, "calm {} wild {}", calm, wild);
    }

    #[test]
    fn test_single_colour_orb_keeps_its_hue() {
        let mut params = still(0.4);
        params.primary_color = [0.9, 0.3, 0.1];
        params.secondary_color = [0.9, 0.3, 0.1];
        let mut orb = orb_with(params);
        let lit: Vec<Rgb> = excess(orb.draw(1.3).unwrap())
            .into_iter()
            .filter(|e| e[0] > 1e-3)
            .collect();
        assert!(!lit.is_empty());
        for e in lit {
            assert!((e[1] / e[0] - 1.0 / 3.0).abs() < 1e-3, "pixel {:?}", e);
            assert!((e[2] / e[0] - 1.0 / 9.0).abs() < 1e-3, "pixel {:?}", e);
        }
    }

    #[test]
    fn test_nudge_moves_target_only() {
        let start = trait_preset(PersonalityTrait::Calm);
        let mut orb = orb_with(start);
        orb.nudge(&OrbNudge {
            amplitude: Some(0.9),
            ..Default::default()
        });
        assert_eq!(orb.target_params().amplitude, 0.9);
        assert_eq!(orb.target_params().flow, start.flow);
        assert_eq!(orb.current_params().amplitude, start.amplitude);
    }
}
