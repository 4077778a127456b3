use std::time::Duration;

use thiserror::Error;

/// Errors reported by a [`crate::PcmNormalizer`].
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to start transcoder `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transcoder pipe error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transcoder timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("transcoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("transcoder produced no PCM output")]
    Empty,
}

/// Errors returned by fingerprint operations.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("clip {clip:?}: {stage} failed: {source}")]
    Conversion {
        clip: String,
        stage: &'static str,
        #[source]
        source: ConversionError,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl FingerprintError {
    /// Wraps a normalizer failure with the clip it belongs to.
    pub fn conversion(clip: impl Into<String>, source: ConversionError) -> Self {
        Self::Conversion {
            clip: clip.into(),
            stage: "pcm conversion",
            source,
        }
    }
}
