//! Угловые пресеты - по вектору параметров на крайнюю черту
//!
//! chaos: 0 = smooth, 1 = sharp  (quadrant x)
//! flow:  0 = loose,  1 = tight  (quadrant y)

use crate::aura::params::{OrbParams, ParticleEffect};
use crate::demiurge::PersonalityTrait;

const DECISIVE: OrbParams = OrbParams {
    primary_color: [1.0, 0.27, 0.27],
    secondary_color: [1.0, 0.55, 0.0],
    particle_effect: ParticleEffect::Spark,
    pulse_frequency: 2.0,
    amplitude: 0.85,
    turbulence: 0.9,
    clarity: 0.0,
    chaos: 0.85,
    flow: 0.80,
};

const GENTLE: OrbParams = OrbParams {
    primary_color: [0.27, 0.67, 1.0],
    secondary_color: [0.27, 0.87, 0.73],
    particle_effect: ParticleEffect::Wave,
    pulse_frequency: 0.5,
    amplitude: 0.4,
    turbulence: 0.15,
    clarity: 0.0,
    chaos: 0.08,
    flow: 0.18,
};

const CALM: OrbParams = OrbParams {
    primary_color: [0.6, 0.4, 1.0],
    secondary_color: [0.75, 0.75, 0.9],
    particle_effect: ParticleEffect::Stardust,
    pulse_frequency: 1.0,
    amplitude: 0.5,
    turbulence: 0.25,
    clarity: 0.0,
    chaos: 0.10,
    flow: 0.85,
};

const LIVELY: OrbParams = OrbParams {
    primary_color: [1.0, 0.8, 0.27],
    secondary_color: [1.0, 0.45, 0.65],
    particle_effect: ParticleEffect::Bubble,
    pulse_frequency: 1.5,
    amplitude: 0.7,
    turbulence: 0.55,
    clarity: 0.0,
    chaos: 0.72,
    flow: 0.20,
};

/// Пресет черты
pub fn trait_preset(t: PersonalityTrait) -> OrbParams {
    match t {
        PersonalityTrait::Decisive => DECISIVE,
        PersonalityTrait::Gentle => GENTLE,
        PersonalityTrait::Calm => CALM,
        PersonalityTrait::Lively => LIVELY,
    }
}

/// Где каждая черта стоит в квадранте
pub fn corner_position(t: PersonalityTrait) -> (f32, f32) {
    match t {
        PersonalityTrait::Calm => (0.0, 1.0),
        PersonalityTrait::Decisive => (1.0, 1.0),
        PersonalityTrait::Gentle => (0.0, 0.0),
        PersonalityTrait::Lively => (1.0, 0.0),
    }
}

/// Углы в билинейном порядке: низ-лево, низ-право, верх-лево, верх-право
pub struct Corners {
    pub bl: OrbParams,
    pub br: OrbParams,
    pub tl: OrbParams,
    pub tr: OrbParams,
}

pub fn corners() -> Corners {
    Corners {
        bl: GENTLE,
        br: LIVELY,
        tl: CALM,
        tr: DECISIVE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_in_bounds() {
        for t in PersonalityTrait::ALL {
            assert!(trait_preset(t).in_bounds(), "{:?}", t);
        }
    }

    #[test]
    fn test_corner_order_matches_positions() {
        let c = corners();
        assert_eq!(corner_position(PersonalityTrait::Gentle), (0.0, 0.0));
        assert_eq!(c.bl, trait_preset(PersonalityTrait::Gentle));
        assert_eq!(c.br, trait_preset(PersonalityTrait::Lively));
        assert_eq!(c.tl, trait_preset(PersonalityTrait::Calm));
        assert_eq!(c.tr, trait_preset(PersonalityTrait::Decisive));
    }
}
