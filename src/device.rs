//! Device abstraction for langid-onnx inference
//!
//! Language identification runs on the CPU execution provider regardless of
//! host capability. Accelerators are deliberately never requested: model
//! loading must be deterministic and must not emit accelerator-initialization
//! warnings in headless environments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device types for model execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Device {
    /// CPU device with thread count
    Cpu(usize),
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu(1)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu(i) => write!(f, "cpu:{i}"),
        }
    }
}

impl std::str::FromStr for Device {
    type Err = crate::DetectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (device_type, id_part) = s
            .trim()
            .split_once(':')
            .map_or_else(|| (s.trim(), None), |(device, id)| (device, Some(id)));

        match device_type.to_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu(
                id_part
                    .map(|id| id.trim().parse::<usize>().unwrap_or(1))
                    .unwrap_or(1),
            )),
            _ => Err(crate::DetectError::backend(format!(
                "Unsupported device: {s}"
            ))),
        }
    }
}

impl Device {
    /// Thread count for this device
    pub fn threads(&self) -> usize {
        match self {
            Self::Cpu(i) => (*i).max(1),
        }
    }

    /// Check if the device is available on the system
    pub fn is_available(&self) -> bool {
        match self {
            Self::Cpu(_) => true, // CPU is always available
        }
    }
}

/// Convenience functions for device creation
pub fn cpu() -> Device {
    Device::Cpu(1)
}

pub fn cpu_with_threads(threads: usize) -> Device {
    Device::Cpu(threads)
}
