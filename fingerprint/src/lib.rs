//! Acoustic fingerprinting via spectral peaks and combinatorial hashing.
//!
//! # Architecture
//!
//! The pipeline processes audio in four stages:
//!
//! 1. [`decode_samples`]: PCM16 little-endian mono bytes -> `f64` samples
//! 2. [`SpectralTransformer::transform`]: sample window -> magnitude spectrum
//! 3. [`extract_peaks`]: spectrum -> strongest K local maxima
//! 4. [`FingerprintGenerator::generate`]: time-ordered peaks -> hash map
//!
//! [`Fingerprinter`] wires the stages together over analysis windows, and
//! [`Fingerprinter::fingerprint_audio`] first runs encoded audio through a
//! [`PcmNormalizer`] (e.g. [`FfmpegNormalizer`]).
//!
//! # Hashes
//!
//! Each peak is paired with the next few peaks (the fan-out). A pair packs
//! into 64 bits as anchor bin, paired bin and time delta:
//!
//! ```text
//! hash = f1 << 32 | f2 << 16 | dt   ->   anchor timestamp
//! ```
//!
//! Only relative timing is encoded, so an excerpt hashes the same wherever
//! it starts in the full recording.
//!
//! # Example
//!
//! ```rust
//! use giztoy_fingerprint::{FingerprintGenerator, extract_peaks};
//!
//! let peaks = extract_peaks(&[1.0, 5.0, 2.0, 8.0, 3.0, 9.0, 1.0], 2);
//! assert_eq!(peaks, vec![5, 3]);
//!
//! let fp = FingerprintGenerator::default().generate(&[10, 20, 30], &[0, 1, 2]);
//! assert_eq!(fp.get((10 << 32) | (20 << 16) | 1), Some(0));
//! ```

mod config;
mod error;
mod generator;
pub mod hash;
mod normalize;
pub mod pcm;
mod peaks;
mod pipeline;
pub mod spectrum;
pub mod topk;

pub use config::FingerprintConfig;
pub use error::{ConversionError, FingerprintError};
pub use generator::{CollisionPolicy, DEFAULT_FAN_OUT, Fingerprint, FingerprintGenerator, Timestamp};
pub use hash::OverflowPolicy;
pub use normalize::{FfmpegNormalizer, NormalizeParams, PcmNormalizer, RawPcmNormalizer};
pub use pcm::{PcmFormat, decode_samples};
pub use peaks::{Peak, extract_peaks, find_peaks};
pub use pipeline::{Fingerprinter, Landmark};
pub use spectrum::{Framer, SpectralTransformer, Taper, WindowMode, magnitude_spectrum};
pub use topk::BoundedTopK;
