//! 🜂 Уровень 1: Жрецы Железа - Выбор устройства
//!
//! Выбирает устройство для буферов частиц. CUDA и Metal находятся, когда
//! собраны соответствующие фичи; CPU доступен всегда как запасной вариант.

use anyhow::{anyhow, Result as AnyhowResult};
use candle_core::Device;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Информация об устройстве
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_type: DeviceType,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DeviceType {
    Cpu { cores: usize },
    Cuda { device_id: usize },
    Metal { device_id: usize },
}

impl DeviceType {
    pub fn name(&self) -> &str {
        match self {
            DeviceType::Cpu { .. } => "CPU",
            DeviceType::Cuda { .. } => "CUDA",
            DeviceType::Metal { .. } => "Metal",
        }
    }

    pub fn is_gpu(&self) -> bool {
        matches!(self, DeviceType::Cuda { .. } | DeviceType::Metal { .. })
    }
}

/// Настройки выбора устройства
#[derive(Debug, Clone, Default)]
pub struct DeviceConfig {
    /// CPU даже при наличии GPU
    pub force_cpu: bool,
    /// Ошибка вместо отката на CPU
    pub require_gpu: bool,
}

pub struct DeviceManager {
    current_device: Device,
    device_info: DeviceInfo,
}

impl DeviceManager {
    pub fn with_config(config: DeviceConfig) -> AnyhowResult<Self> {
        let available = Self::discover_devices();
        let (device, info) = Self::select_best_device(available, &config)?;

        info!(
            device = %info.name,
            kind = info.device_type.name(),
            "compute device selected"
        );

        Ok(Self {
            current_device: device,
            device_info: info,
        })
    }

    fn discover_devices() -> Vec<(Device, DeviceInfo)> {
        let mut devices = Vec::new();

        let cores = num_cpus::get();
        devices.push((
            Device::Cpu,
            DeviceInfo {
                device_type: DeviceType::Cpu { cores },
                name: format!("CPU ({} cores)", cores),
            },
        ));

        #[cfg(feature = "cuda")]
        {
            if candle_core::utils::cuda_is_available() {
                if let Ok(cuda_device) = Device::new_cuda(0) {
                    devices.push((
                        cuda_device,
                        DeviceInfo {
                            device_type: DeviceType::Cuda { device_id: 0 },
                            name: "CUDA device 0".to_string(),
                        },
                    ));
                }
            }
        }

        #[cfg(feature = "metal")]
        {
            if candle_core::utils::metal_is_available() {
                if let Ok(metal_device) = Device::new_metal(0) {
                    devices.push((
                        metal_device,
                        DeviceInfo {
                            device_type: DeviceType::Metal { device_id: 0 },
                            name: "Apple GPU".to_string(),
                        },
                    ));
                }
            }
        }

        devices
    }

    /// GPU раньше CPU; сначала фильтруют `force_cpu` и `require_gpu`.
    fn select_best_device(
        devices: Vec<(Device, DeviceInfo)>,
        config: &DeviceConfig,
    ) -> AnyhowResult<(Device, DeviceInfo)> {
        if config.force_cpu && config.require_gpu {
            return Err(anyhow!("force_cpu and require_gpu are mutually exclusive"));
        }

        let mut candidates: Vec<_> = devices
            .into_iter()
            .filter(|(_, info)| {
                if config.force_cpu {
                    return !info.device_type.is_gpu();
                }
                if config.require_gpu {
                    return info.device_type.is_gpu();
                }
                true
            })
            .collect();

        candidates.sort_by_key(|(_, info)| !info.device_type.is_gpu());

        candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No compute device satisfies the requested configuration"))
    }

    pub fn device(&self) -> &Device {
        &self.current_device
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }
}

impl DeviceInfo {
    pub fn format_info(&self) -> String {
        format!("{}: {}", self.device_type.name(), self.name)
    }
}
