use serde::{Deserialize, Serialize};

use crate::error::FingerprintError;
use crate::generator::{CollisionPolicy, DEFAULT_FAN_OUT};
use crate::hash::OverflowPolicy;
use crate::spectrum::{Taper, WindowMode};

/// Configures the fingerprint pipeline.
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```yaml
/// peaks_per_window: 8
/// window:
///   mode: sliding
///   size: 2048
///   hop: 1024
/// collision: first_wins
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Peaks kept per analysis window (default: 5).
    pub peaks_per_window: usize,
    /// Following peaks each anchor is paired with (default: 5).
    pub fan_out: usize,
    /// Window layout (default: sliding, 1024 samples, hop 512).
    pub window: WindowMode,
    /// Taper applied before the FFT (default: rectangular).
    pub taper: Taper,
    /// Hash collision handling (default: last_wins).
    pub collision: CollisionPolicy,
    /// Hash field overflow handling (default: overlap).
    pub overflow: OverflowPolicy,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            peaks_per_window: 5,
            fan_out: DEFAULT_FAN_OUT,
            window: WindowMode::default(),
            taper: Taper::default(),
            collision: CollisionPolicy::default(),
            overflow: OverflowPolicy::default(),
        }
    }
}

impl FingerprintConfig {
    /// Rejects window layouts that cannot be framed. Zero peaks or zero
    /// fan-out are accepted and yield empty fingerprints.
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if let WindowMode::Sliding { size, hop } = self.window {
            if size < 3 {
                return Err(FingerprintError::InvalidConfig(format!(
                    "window size {size} is too small, need at least 3 samples"
                )));
            }
            if hop == 0 || hop > size {
                return Err(FingerprintError::InvalidConfig(format!(
                    "hop {hop} must be in 1..={size}"
                )));
            }
        }
        Ok(())
    }
}
