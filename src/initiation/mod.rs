//! 🜂 Уровень 0: Инициация
//!
//! Загружает конфигурацию, выбирает устройство и поднимает сессию мастера
//! вместе со сферой, которая ее показывает.

pub mod config;
pub mod session;

use crate::aura::params::OrbParams;
use crate::orb::{SoulOrb, Surface};
use crate::priests::device::{DeviceConfig, DeviceManager};
use anyhow::Result;
use std::sync::mpsc::Sender;
use tracing::warn;

pub use config::OrbConfig;
pub use session::{InputEvent, ScriptedEvent, Session, WizardStep};

/// Оркестратор запуска
pub struct InitiationManager {
    config: OrbConfig,
}

impl InitiationManager {
    pub fn new(config: OrbConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OrbConfig {
        &self.config
    }

    /// Поднимает все уровни. Рендерер, который не стартовал, не фатален:
    /// сессия работает, а `orb` равен `None`.
    pub fn init_system<S: Surface>(&self, surface: S) -> Result<SystemComponents<S>> {
        println!("🏛️ Initialising soul orb...");

        let devices = DeviceManager::with_config(DeviceConfig {
            force_cpu: self.config.force_cpu,
            ..Default::default()
        })?;
        println!("⚡ Device: {}", devices.device_info().format_info());

        let (events, session) = Session::channel();
        let initial: OrbParams = *session.target();

        let orb = match SoulOrb::new(surface, initial, &self.config, devices.device()) {
            Ok(orb) => {
                println!("🔮 Orb ready: {} particles", self.config.particle_count);
                Some(orb)
            }
            Err(e) => {
                warn!(error = %e, "renderer unavailable, continuing without visuals");
                println!("⚠️ Orb unavailable ({}), continuing without visuals", e);
                None
            }
        };

        Ok(SystemComponents {
            events,
            session,
            orb,
            config: self.config.clone(),
        })
    }
}

/// Все, что нужно работающему мастеру
pub struct SystemComponents<S: Surface> {
    pub events: Sender<InputEvent>,
    pub session: Session,
    pub orb: Option<SoulOrb<S>>,
    pub config: OrbConfig,
}

impl<S: Surface> SystemComponents<S> {
    /// Один кадр: свернуть ввод, обновить цель сферы, нарисовать.
    pub fn tick(&mut self, elapsed: f32) -> Result<()> {
        let target = self.session.drain();
        if let Some(orb) = self.orb.as_mut() {
            if let Some(target) = target {
                orb.set_params(target);
            }
            orb.update(elapsed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demiurge::ArchetypeKey;
    use crate::orb::MemorySurface;

    fn manager() -> InitiationManager {
        InitiationManager::new(OrbConfig {
            force_cpu: true,
            ..OrbConfig::preview()
        })
        .unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = InitiationManager::new(OrbConfig {
            particle_count: 0,
            ..OrbConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_surface_is_recoverable() {
        let mut system = manager()
            .init_system(MemorySurface::unavailable(32, 32))
            .unwrap();
        assert!(system.orb.is_none());

        system
            .events
            .send(InputEvent::QuizCompleted {
                answers: vec![2, 0, 2],
            })
            .unwrap();
        system.tick(0.0).unwrap();
        assert_eq!(system.session.archetype(), Some(ArchetypeKey::Oracle));
    }

    #[test]
    fn test_tick_retargets_and_draws() {
        let config = manager().config().clone();
        let mut system = manager()
            .init_system(MemorySurface::new(config.width, config.height))
            .unwrap();
        if let Some(orb) = system.orb.as_mut() {
            orb.start();
        }

        system
            .events
            .send(InputEvent::StepCompleted {
                step: WizardStep::Intro,
            })
            .unwrap();
        system.tick(0.0).unwrap();
        system.tick(0.1).unwrap();

        let orb = system.orb.as_ref().unwrap();
        assert_eq!(orb.target_params().clarity, 0.25);
        assert!(orb.current_params().clarity > 0.0);
        assert_eq!(orb.surface().presented(), 2);
    }
}
