//! Отображение координат - личность в параметры сферы
//!
//! Карта квадранта билинейно смешивает четыре угловых пресета, старый путь
//! начинает с пресета одной черты. Оба чистые и держат каждое поле в его
//! диапазоне.

use crate::aura::params::{lerp, lerp_color, OrbNudge, OrbParams, ParticleEffect, Rgb};
use crate::aura::presets::{corners, trait_preset};
use crate::demiurge::persona::{intensity, Personality, QuadrantPosition};

/// Диапазон частоты пульса по x, Гц
pub const PULSE_RANGE: (f32, f32) = (0.5, 2.0);
/// Диапазон амплитуды по интенсивности
pub const AMPLITUDE_RANGE: (f32, f32) = (0.3, 0.9);
/// Диапазон турбулентности по x
pub const TURBULENCE_RANGE: (f32, f32) = (0.1, 0.9);
/// Доля второй черты в старом пути
pub const SECONDARY_BLEND: f32 = 0.2;
/// Стиль для всех точек непрерывной карты
pub const QUADRANT_EFFECT: ParticleEffect = ParticleEffect::Stardust;

fn bilinear(bl: Rgb, br: Rgb, tl: Rgb, tr: Rgb, x: f32, y: f32) -> Rgb {
    let w_bl = (1.0 - x) * (1.0 - y);
    let w_br = x * (1.0 - y);
    let w_tl = (1.0 - x) * y;
    let w_tr = x * y;

    let mut out = [0.0; 3];
    for (i, channel) in out.iter_mut().enumerate() {
        let v = bl[i] * w_bl + br[i] * w_br + tl[i] * w_tl + tr[i] * w_tr;
        *channel = v.clamp(0.0, 1.0);
    }
    out
}

/// Точка квадранта в параметры сферы. `clarity` приходит из прогресса
/// сессии и передается как есть.
pub fn map_position_to_parameters(pos: QuadrantPosition, clarity: f32) -> OrbParams {
    let (x, y) = (pos.x(), pos.y());
    let c = corners();

    let primary_color = bilinear(
        c.bl.primary_color,
        c.br.primary_color,
        c.tl.primary_color,
        c.tr.primary_color,
        x,
        y,
    );
    let secondary_color = bilinear(
        c.bl.secondary_color,
        c.br.secondary_color,
        c.tl.secondary_color,
        c.tr.secondary_color,
        x,
        y,
    );

    let strength = intensity(pos);

    OrbParams {
        primary_color,
        secondary_color,
        particle_effect: QUADRANT_EFFECT,
        pulse_frequency: lerp(PULSE_RANGE.0, PULSE_RANGE.1, x),
        amplitude: lerp(AMPLITUDE_RANGE.0, AMPLITUDE_RANGE.1, strength),
        turbulence: lerp(TURBULENCE_RANGE.0, TURBULENCE_RANGE.1, x),
        clarity: clamp_clarity(clarity),
        chaos: x,
        flow: y,
    }
}

/// Дискретная личность в параметры сферы.
pub fn map_archetype_to_parameters(personality: &Personality, clarity: f32) -> OrbParams {
    let mut base = trait_preset(personality.dominant);

    if let Some(secondary) = personality.secondary {
        let s = trait_preset(secondary);
        base.primary_color = lerp_color(base.primary_color, s.primary_color, SECONDARY_BLEND);
        base.secondary_color =
            lerp_color(base.secondary_color, s.secondary_color, SECONDARY_BLEND);
        base.turbulence = lerp(base.turbulence, s.turbulence, SECONDARY_BLEND);
        base.chaos = lerp(base.chaos, s.chaos, SECONDARY_BLEND);
        base.flow = lerp(base.flow, s.flow, SECONDARY_BLEND);
    }

    let strength = if personality.intensity.is_nan() {
        0.0
    } else {
        personality.intensity.clamp(0.0, 1.0)
    };
    base.amplitude *= 0.5 + 0.5 * strength;
    base.turbulence *= 0.3 + 0.7 * strength;
    base.clarity = clamp_clarity(clarity);
    base
}

/// Набор текста немного возбуждает сферу: до +0.08 амплитуды и +0.04
/// турбулентности при 200 символах.
pub fn text_nudge(text: &str, base: &OrbParams) -> OrbNudge {
    let energy = text.chars().count().min(200) as f32 / 200.0;
    OrbNudge {
        amplitude: Some((base.amplitude + energy * 0.08).min(1.0)),
        turbulence: Some((base.turbulence + energy * 0.04).min(1.0)),
        ..Default::default()
    }
}

fn clamp_clarity(clarity: f32) -> f32 {
    if clarity.is_nan() {
        0.0
    } else {
        clarity.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::presets::corner_position;
    use crate::demiurge::PersonalityTrait;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_corners_reproduce_presets() {
        for t in PersonalityTrait::ALL {
            let (x, y) = corner_position(t);
            let params = map_position_to_parameters(QuadrantPosition::new(x, y), 0.5);
            let preset = trait_preset(t);
            assert_eq!(params.primary_color, preset.primary_color, "{:?}", t);
            assert_eq!(params.secondary_color, preset.secondary_color, "{:?}", t);
            assert_eq!(params.chaos, x);
            assert_eq!(params.flow, y);
        }
    }

    #[test]
    fn test_center_averages_corners() {
        let params = map_position_to_parameters(QuadrantPosition::CENTER, 0.0);
        let c = corners();
        for i in 0..3 {
            let avg = (c.bl.primary_color[i]
                + c.br.primary_color[i]
                + c.tl.primary_color[i]
                + c.tr.primary_color[i])
                / 4.0;
            assert!((params.primary_color[i] - avg).abs() < 1e-6);
            let avg = (c.bl.secondary_color[i]
                + c.br.secondary_color[i]
                + c.tl.secondary_color[i]
                + c.tr.secondary_color[i])
                / 4.0;
            assert!((params.secondary_color[i] - avg).abs() < 1e-6);
        }
        // zero intensity leaves amplitude at its lower bound
        assert_eq!(params.amplitude, AMPLITUDE_RANGE.0);
    }

    #[test]
    fn test_axes_and_spans() {
        let left = map_position_to_parameters(QuadrantPosition::new(0.0, 0.3), 0.2);
        let right = map_position_to_parameters(QuadrantPosition::new(1.0, 0.3), 0.2);
        assert_eq!(left.pulse_frequency, 0.5);
        assert_eq!(right.pulse_frequency, 2.0);
        assert!((left.turbulence - 0.1).abs() < 1e-6);
        assert!((right.turbulence - 0.9).abs() < 1e-6);
        assert_eq!(left.clarity, 0.2);
        assert_eq!(left.particle_effect, ParticleEffect::Stardust);
        assert_eq!(right.particle_effect, ParticleEffect::Stardust);
    }

    #[test]
    fn test_legacy_mapping() {
        let p = Personality::new(PersonalityTrait::Decisive, 1.0);
        let params = map_archetype_to_parameters(&p, 0.7);
        let preset = trait_preset(PersonalityTrait::Decisive);
        assert_eq!(params.amplitude, preset.amplitude);
        assert!((params.turbulence - preset.turbulence).abs() < 1e-6);
        assert_eq!(params.clarity, 0.7);
        assert_eq!(params.particle_effect, ParticleEffect::Spark);

        let quiet =
            map_archetype_to_parameters(&Personality::new(PersonalityTrait::Decisive, 0.0), 0.0);
        assert!((quiet.amplitude - preset.amplitude * 0.5).abs() < 1e-6);
        assert!((quiet.turbulence - preset.turbulence * 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_legacy_secondary_blend() {
        let p = Personality::new(PersonalityTrait::Gentle, 1.0)
            .with_secondary(PersonalityTrait::Decisive);
        let params = map_archetype_to_parameters(&p, 0.0);
        let a = trait_preset(PersonalityTrait::Gentle);
        let b = trait_preset(PersonalityTrait::Decisive);
        assert!((params.chaos - (a.chaos + (b.chaos - a.chaos) * 0.2)).abs() < 1e-6);
        assert!((params.flow - (a.flow + (b.flow - a.flow) * 0.2)).abs() < 1e-6);
        let red = a.primary_color[0] + (b.primary_color[0] - a.primary_color[0]) * 0.2;
        assert!((params.primary_color[0] - red).abs() < 1e-6);
    }

    #[test]
    fn test_mappers_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let pos = QuadrantPosition::new(rng.gen::<f32>(), rng.gen::<f32>());
            let clarity = rng.gen::<f32>();
            let params = map_position_to_parameters(pos, clarity);
            assert!(params.in_bounds(), "{:?} -> {:?}", pos, params);

            let dominant = PersonalityTrait::ALL[rng.gen_range(0..4)];
            let mut personality = Personality::new(dominant, rng.gen::<f32>());
            if rng.gen_bool(0.5) {
                personality =
                    personality.with_secondary(PersonalityTrait::ALL[rng.gen_range(0..4)]);
            }
            let params = map_archetype_to_parameters(&personality, clarity);
            assert!(params.in_bounds(), "{:?} -> {:?}", personality, params);
        }
    }

    #[test]
    fn test_text_nudge() {
        let base = map_position_to_parameters(QuadrantPosition::new(1.0, 1.0), 0.0);
        let nudge = text_nudge(&"a".repeat(500), &base);
        assert!((nudge.amplitude.unwrap() - (base.amplitude + 0.08).min(1.0)).abs() < 1e-6);
        assert!((nudge.turbulence.unwrap() - (base.turbulence + 0.04).min(1.0)).abs() < 1e-6);
        assert!(nudge.chaos.is_none());

        let empty = text_nudge("", &base);
        assert_eq!(empty.amplitude, Some(base.amplitude));
    }
}
