//! Config file loading.

use std::path::Path;

use anyhow::{Context, Result};
use giztoy_fingerprint::{FingerprintConfig, NormalizeParams};
use serde::Deserialize;

/// Configuration file format.
///
/// ```yaml
/// fingerprint:
///   peaks_per_window: 8
///   fan_out: 5
/// normalize:
///   timeout_secs: 10
/// ffmpeg: /usr/local/bin/ffmpeg
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub fingerprint: FingerprintConfig,
    pub normalize: NormalizeParams,
    pub ffmpeg: Option<String>,
}

/// Loads a YAML or JSON config file, picked by extension.
pub fn load(path: &Path) -> Result<ConfigFile> {
    let data = std::fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");

    let cfg = match ext {
        "json" => serde_json::from_slice(&data)
            .with_context(|| format!("parse JSON config {}", path.display()))?,
        _ => serde_yaml::from_slice(&data)
            .with_context(|| format!("parse YAML config {}", path.display()))?,
    };
    Ok(cfg)
}
