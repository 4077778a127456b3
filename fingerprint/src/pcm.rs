//! PCM16 sample decoding and stream format helpers.

use std::time::Duration;

/// Divisor mapping a signed 16-bit sample onto roughly [-1.0, 1.0].
pub const PCM16_SCALE: f64 = i16::MAX as f64;

/// Decodes PCM16 signed little-endian bytes into unit-scaled samples.
///
/// Returns `len / 2` samples; a trailing odd byte is ignored.
pub fn decode_samples(pcm: &[u8]) -> Vec<f64> {
    pcm.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f64 / PCM16_SCALE)
        .collect()
}

/// Mono PCM16 little-endian stream format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl PcmFormat {
    /// 16kHz mono, the rate the normalizer produces by default.
    pub const MONO_16K: PcmFormat = PcmFormat::mono(16000);

    /// Bytes per sample.
    pub const SAMPLE_BYTES: usize = 2;

    pub const fn mono(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Returns the number of bytes needed for `duration` of audio,
    /// rounded down to a whole sample. Saturates at `usize::MAX`.
    pub fn bytes_in_duration(&self, duration: Duration) -> usize {
        let samples = duration
            .as_micros()
            .saturating_mul(self.sample_rate as u128)
            / 1_000_000;
        usize::try_from(samples)
            .unwrap_or(usize::MAX)
            .saturating_mul(Self::SAMPLE_BYTES)
    }

    /// Returns the playback duration of `bytes` of audio.
    pub fn duration(&self, bytes: usize) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let samples = self.samples(bytes) as u64;
        Duration::from_micros(samples * 1_000_000 / self.sample_rate as u64)
    }

    /// Returns the number of whole samples in `bytes`.
    pub fn samples(&self, bytes: usize) -> usize {
        bytes / Self::SAMPLE_BYTES
    }

    /// Caps `pcm` at `max` worth of audio.
    pub fn truncate<'a>(&self, pcm: &'a [u8], max: Duration) -> &'a [u8] {
        let limit = self.bytes_in_duration(max);
        &pcm[..pcm.len().min(limit)]
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::MONO_16K
    }
}
