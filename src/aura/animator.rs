//! Аниматор параметров - экспоненциальное сглаживание к цели
//!
//! Внешний код пишет только `target`. `current` каждый шаг проходит к нему
//! фиксированную долю пути, и серия смен цели сливается в одно плавное
//! движение без скачков.

use crate::aura::params::{lerp, lerp_color, OrbNudge, OrbParams};
use tracing::debug;

/// Доля оставшегося пути за один опорный кадр
pub const DEFAULT_SMOOTHING: f32 = 0.03;
/// Частота кадров, для которой задан коэффициент сглаживания
pub const REFERENCE_FPS: f32 = 60.0;

#[derive(Debug, Clone)]
pub struct ParameterAnimator {
    current: OrbParams,
    target: OrbParams,
    smoothing: f32,
}

impl ParameterAnimator {
    pub fn new(initial: OrbParams) -> Self {
        Self::with_smoothing(initial, DEFAULT_SMOOTHING)
    }

    /// `smoothing` ограничивается в (0, 1].
    pub fn with_smoothing(initial: OrbParams, smoothing: f32) -> Self {
        let initial = initial.sanitized(&initial_fallback(&initial));
        Self {
            current: initial,
            target: initial,
            smoothing: if smoothing.is_finite() {
                smoothing.clamp(f32::EPSILON, 1.0)
            } else {
                DEFAULT_SMOOTHING
            },
        }
    }

    /// Сглаженный вектор, по которому рисует рендерер
    pub fn current(&self) -> &OrbParams {
        &self.current
    }

    pub fn target(&self) -> &OrbParams {
        &self.target
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Заменяет цель целиком. Неконечные поля сохраняют значение прежней
    /// цели.
    pub fn set_target(&mut self, params: OrbParams) {
        self.target = params.sanitized(&self.target);
    }

    /// Заменяет только поля, заданные в `nudge`.
    pub fn nudge(&mut self, nudge: &OrbNudge) {
        if nudge.is_empty() {
            return;
        }
        let mut next = self.target;
        next.apply(nudge);
        self.target = next.sanitized(&self.target);
    }

    /// Один шаг сглаживания с настроенным коэффициентом.
    pub fn step(&mut self) {
        self.blend(self.smoothing);
    }

    /// Шаг, нормированный по прошедшему времени, чтобы скорость сходимости
    /// не зависела от частоты кадров: `1 - (1 - f)^(dt * 60)`.
    pub fn step_for(&mut self, dt_secs: f32) {
        if !dt_secs.is_finite() || dt_secs <= 0.0 {
            return;
        }
        let frames = dt_secs * REFERENCE_FPS;
        let alpha = 1.0 - (1.0 - self.smoothing).powf(frames);
        self.blend(alpha.clamp(0.0, 1.0));
    }

    /// Наибольшее расстояние между current и target по всем полям.
    pub fn distance(&self) -> f32 {
        let c = &self.current;
        let t = &self.target;
        let mut d = 0.0f32;
        for i in 0..3 {
            d = d.max((c.primary_color[i] - t.primary_color[i]).abs());
            d = d.max((c.secondary_color[i] - t.secondary_color[i]).abs());
        }
        [
            (c.pulse_frequency, t.pulse_frequency),
            (c.amplitude, t.amplitude),
            (c.turbulence, t.turbulence),
            (c.clarity, t.clarity),
            (c.chaos, t.chaos),
            (c.flow, t.flow),
        ]
        .iter()
        .fold(d, |acc, (a, b)| acc.max((a - b).abs()))
    }

    /// Сходимость асимптотическая; кому нужна точка остановки, тот задает
    /// порог.
    pub fn settled(&self, epsilon: f32) -> bool {
        self.distance() <= epsilon
    }

    fn blend(&mut self, t: f32) {
        let cur = &mut self.current;
        let tgt = &self.target;
        cur.pulse_frequency = lerp(cur.pulse_frequency, tgt.pulse_frequency, t);
        cur.amplitude = lerp(cur.amplitude, tgt.amplitude, t);
        cur.turbulence = lerp(cur.turbulence, tgt.turbulence, t);
        cur.clarity = lerp(cur.clarity, tgt.clarity, t);
        cur.chaos = lerp(cur.chaos, tgt.chaos, t);
        cur.flow = lerp(cur.flow, tgt.flow, t);
        cur.primary_color = lerp_color(cur.primary_color, tgt.primary_color, t);
        cur.secondary_color = lerp_color(cur.secondary_color, tgt.secondary_color, t);
        if cur.particle_effect != tgt.particle_effect {
            debug!(
                from = ?cur.particle_effect,
                to = ?tgt.particle_effect,
                "particle effect switched"
            );
            cur.particle_effect = tgt.particle_effect;
        }
    }
}

/// Нейтральный вектор для починки испорченного начального значения.
fn initial_fallback(initial: &OrbParams) -> OrbParams {
    OrbParams {
        primary_color: [1.0, 1.0, 1.0],
        secondary_color: [1.0, 1.0, 1.0],
        particle_effect: initial.particle_effect,
        pulse_frequency: 1.0,
        amplitude: 0.5,
        turbulence: 0.5,
        clarity: 0.0,
        chaos: 0.5,
        flow: 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::presets::trait_preset;
    use crate::demiurge::PersonalityTrait;

    fn fields(p: &OrbParams) -> Vec<f32> {
        let mut v = Vec::new();
        v.extend_from_slice(&p.primary_color);
        v.extend_from_slice(&p.secondary_color);
        v.extend_from_slice(&[
            p.pulse_frequency,
            p.amplitude,
            p.turbulence,
            p.clarity,
            p.chaos,
            p.flow,
        ]);
        v
    }

    #[test]
    fn test_converges_monotonically_without_overshoot() {
        let start = trait_preset(PersonalityTrait::Gentle);
        let mut goal = trait_preset(PersonalityTrait::Decisive);
        goal.clarity = 1.0;

        let mut animator = ParameterAnimator::new(start);
        animator.set_target(goal);

        let target = fields(&goal);
        let mut previous = fields(animator.current());
        for _ in 0..400 {
            animator.step();
            let now = fields(animator.current());
            for i in 0..now.len() {
                let before = (previous[i] - target[i]).abs();
                let after = (now[i] - target[i]).abs();
                assert!(after <= before + 1e-7, "field {} moved away", i);
                // still on the starting side of the target
                let start_side = (fields(&start)[i] - target[i]).signum();
                if (now[i] - target[i]).abs() > 1e-6 {
                    assert_eq!((now[i] - target[i]).signum(), start_side);
                }
            }
            previous = now;
        }
        assert!(animator.settled(1e-3));
    }

    #[test]
    fn test_not_equal_after_few_steps() {
        let mut animator = ParameterAnimator::new(trait_preset(PersonalityTrait::Calm));
        animator.set_target(trait_preset(PersonalityTrait::Lively));
        for _ in 0..10 {
            animator.step();
        }
        assert!(!animator.settled(1e-4));
        assert_ne!(animator.current().chaos, animator.target().chaos);
    }

    #[test]
    fn test_alternating_targets_stay_in_hull() {
        let a = trait_preset(PersonalityTrait::Gentle);
        let b = trait_preset(PersonalityTrait::Decisive);
        let start = trait_preset(PersonalityTrait::Calm);
        let mut animator = ParameterAnimator::new(start);

        let hull: Vec<(f32, f32)> = fields(&a)
            .iter()
            .zip(fields(&b))
            .zip(fields(&start))
            .map(|((x, y), z)| (x.min(y).min(z), x.max(y).max(z)))
            .collect();

        for i in 0..300 {
            animator.set_target(if i % 2 == 0 { a } else { b });
            animator.set_target(if i % 3 == 0 { b } else { a });
            animator.step_for(1.0 / 30.0);
            for (v, (lo, hi)) in fields(animator.current()).iter().zip(&hull) {
                assert!(*v >= lo - 1e-6 && *v <= hi + 1e-6);
            }
        }
    }

    #[test]
    fn test_nudge_only_touches_target() {
        let start = trait_preset(PersonalityTrait::Calm);
        let mut animator = ParameterAnimator::new(start);
        animator.nudge(&OrbNudge {
            turbulence: Some(0.95),
            ..Default::default()
        });
        assert_eq!(animator.target().turbulence, 0.95);
        assert_eq!(animator.target().chaos, start.chaos);
        assert_eq!(animator.current().turbulence, start.turbulence);
    }

    #[test]
    fn test_malformed_target_keeps_last_valid_values() {
        let start = trait_preset(PersonalityTrait::Calm);
        let mut animator = ParameterAnimator::new(start);
        let mut broken = trait_preset(PersonalityTrait::Lively);
        broken.amplitude = f32::NAN;
        broken.flow = f32::NEG_INFINITY;
        animator.set_target(broken);
        assert_eq!(animator.target().amplitude, start.amplitude);
        assert_eq!(animator.target().flow, start.flow);
        animator.step();
        assert!(animator.current().in_bounds());
    }

    #[test]
    fn test_time_normalised_step_matches_frame_steps() {
        let start = trait_preset(PersonalityTrait::Gentle);
        let goal = trait_preset(PersonalityTrait::Decisive);

        let mut per_frame = ParameterAnimator::new(start);
        per_frame.set_target(goal);
        for _ in 0..60 {
            per_frame.step();
        }

        let mut per_second = ParameterAnimator::new(start);
        per_second.set_target(goal);
        per_second.step_for(1.0);

        let a = fields(per_frame.current());
        let b = fields(per_second.current());
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-3);
        }
    }

    #[test]
    fn test_ignores_bad_dt() {
        let mut animator = ParameterAnimator::new(trait_preset(PersonalityTrait::Gentle));
        animator.set_target(trait_preset(PersonalityTrait::Decisive));
        let before = *animator.current();
        animator.step_for(0.0);
        animator.step_for(-1.0);
        animator.step_for(f32::NAN);
        assert_eq!(*animator.current(), before);
    }

    #[test]
    fn test_smoothing_is_clamped() {
        let start = trait_preset(PersonalityTrait::Gentle);
        assert_eq!(ParameterAnimator::new(start).smoothing(), DEFAULT_SMOOTHING);
        assert_eq!(ParameterAnimator::with_smoothing(start, 0.2).smoothing(), 0.2);
        assert_eq!(ParameterAnimator::with_smoothing(start, 5.0).smoothing(), 1.0);
        assert_eq!(
            ParameterAnimator::with_smoothing(start, -0.5).smoothing(),
            f32::EPSILON
        );
        assert_eq!(
            ParameterAnimator::with_smoothing(start, f32::NAN).smoothing(),
            DEFAULT_SMOOTHING
        );
    }
}
