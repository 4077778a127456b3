//! End-to-end fingerprinting of a clip.

use tracing::{debug, info};

use crate::config::FingerprintConfig;
use crate::error::FingerprintError;
use crate::generator::{Fingerprint, FingerprintGenerator, Timestamp};
use crate::normalize::{NormalizeParams, PcmNormalizer};
use crate::pcm::decode_samples;
use crate::peaks::extract_peaks;
use crate::spectrum::{Framer, SpectralTransformer, WindowMode};

/// A spectral peak placed in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landmark {
    /// Index of the analysis window the peak was found in.
    pub timestamp: Timestamp,
    /// Frequency bin of the peak.
    pub bin: usize,
}

/// Runs decode, framing, spectrum, peak and hash stages with one config.
///
/// Holds no per-clip state; one instance can fingerprint any number of
/// clips, concurrently if shared.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    config: FingerprintConfig,
    framer: Framer,
    generator: FingerprintGenerator,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::build(FingerprintConfig::default())
    }
}

impl Fingerprinter {
    /// Creates a fingerprinter after validating `config`.
    pub fn new(config: FingerprintConfig) -> Result<Self, FingerprintError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: FingerprintConfig) -> Self {
        let framer = Framer::new(config.window, config.taper);
        let generator = FingerprintGenerator::new(config.fan_out)
            .with_collision(config.collision)
            .with_overflow(config.overflow);
        Self {
            config,
            framer,
            generator,
        }
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Finds the strongest peaks of every window, in window order and
    /// strongest first within a window.
    pub fn landmarks(&self, samples: &[f64]) -> Vec<Landmark> {
        let frames = self.framer.frames(samples);
        let Some(first) = frames.first() else {
            return Vec::new();
        };

        let size = match self.config.window {
            WindowMode::WholeClip => first.len(),
            WindowMode::Sliding { size, .. } => size,
        };
        let transformer = SpectralTransformer::new(size);

        let mut landmarks = Vec::new();
        for (index, frame) in frames.iter().enumerate() {
            let spectrum = transformer.transform(frame);
            let timestamp = index as Timestamp;
            landmarks.extend(
                extract_peaks(&spectrum, self.config.peaks_per_window)
                    .into_iter()
                    .map(|bin| Landmark { timestamp, bin }),
            );
        }
        landmarks
    }

    /// Fingerprints unit-scaled samples.
    pub fn fingerprint_samples(&self, samples: &[f64]) -> Fingerprint {
        let landmarks = self.landmarks(samples);
        let (peaks, timestamps): (Vec<usize>, Vec<Timestamp>) =
            landmarks.iter().map(|l| (l.bin, l.timestamp)).unzip();
        self.generator.generate(&peaks, &timestamps)
    }

    /// Fingerprints PCM16 signed little-endian mono bytes.
    pub fn fingerprint_pcm(&self, pcm: &[u8]) -> Fingerprint {
        self.fingerprint_samples(&decode_samples(pcm))
    }

    /// Normalizes encoded audio with `normalizer` and fingerprints it.
    ///
    /// `clip` names the input in logs and errors.
    pub async fn fingerprint_audio(
        &self,
        normalizer: &dyn PcmNormalizer,
        audio: &[u8],
        params: &NormalizeParams,
        clip: &str,
    ) -> Result<Fingerprint, FingerprintError> {
        let pcm = normalizer
            .normalize(audio, params)
            .await
            .map_err(|e| FingerprintError::conversion(clip, e))?;

        let samples = decode_samples(&pcm);
        debug!(clip, samples = samples.len(), "decoded pcm");

        let fingerprint = self.fingerprint_samples(&samples);
        info!(
            clip,
            duration_ms = params.format().duration(pcm.len()).as_millis() as u64,
            hashes = fingerprint.len(),
            "fingerprinted clip"
        );
        Ok(fingerprint)
    }
}
