//! Framing and FFT magnitude spectra.

use std::f64::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};

/// Computes the magnitude spectrum of a window of any length.
///
/// Returns `floor(n / 2)` magnitudes: the non-negative frequency half of
/// the DFT of a real signal.
pub fn magnitude_spectrum(window: &[f64]) -> Vec<f64> {
    SpectralTransformer::new(window.len()).transform(window)
}

/// Forward FFT planned for a fixed window size.
///
/// The plan is immutable once built, so one transformer can be shared
/// across threads and reused for every window of a clip.
#[derive(Clone)]
pub struct SpectralTransformer {
    size: usize,
    // Windows under two samples have an empty spectrum and need no plan.
    fft: Option<Arc<dyn Fft<f64>>>,
}

impl SpectralTransformer {
    pub fn new(size: usize) -> Self {
        let fft = (size >= 2).then(|| FftPlanner::<f64>::new().plan_fft_forward(size));
        Self { size, fft }
    }

    /// Window size this transformer was planned for.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `size / 2` magnitudes of `window`.
    ///
    /// A window shorter than the planned size is zero-padded; a longer one
    /// is cut to size.
    pub fn transform(&self, window: &[f64]) -> Vec<f64> {
        let Some(fft) = &self.fft else {
            return Vec::new();
        };

        let mut buffer: Vec<Complex<f64>> = window
            .iter()
            .take(self.size)
            .map(|&v| Complex::new(v, 0.0))
            .collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        fft.process(&mut buffer);

        buffer[..self.size / 2].iter().map(|c| c.norm()).collect()
    }
}

/// Taper applied to each analysis window before the FFT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Taper {
    /// No taper; the window is transformed as-is.
    #[default]
    Rectangular,
    /// Hann window.
    Hann,
}

/// How a clip is cut into analysis windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum WindowMode {
    /// The whole clip is a single window.
    WholeClip,
    /// Fixed-size windows advanced by `hop` samples.
    Sliding { size: usize, hop: usize },
}

impl Default for WindowMode {
    fn default() -> Self {
        Self::Sliding {
            size: 1024,
            hop: 512,
        }
    }
}

/// Splits a sample buffer into tapered analysis windows.
#[derive(Debug, Clone)]
pub struct Framer {
    mode: WindowMode,
    taper: Taper,
}

impl Framer {
    pub fn new(mode: WindowMode, taper: Taper) -> Self {
        Self { mode, taper }
    }

    /// Returns the windows of `samples` in time order.
    ///
    /// Sliding windows start at `0, hop, 2 * hop, ...` while a full window
    /// fits. A non-empty clip shorter than one window yields a single
    /// zero-padded window. Empty input yields no windows.
    pub fn frames(&self, samples: &[f64]) -> Vec<Vec<f64>> {
        if samples.is_empty() {
            return Vec::new();
        }

        let mut frames = match self.mode {
            WindowMode::WholeClip => vec![samples.to_vec()],
            WindowMode::Sliding { size, hop } => sliding(samples, size, hop),
        };

        if self.taper == Taper::Hann {
            let Some(len) = frames.first().map(Vec::len) else {
                return frames;
            };
            let window = hann_window(len);
            for frame in &mut frames {
                for (s, w) in frame.iter_mut().zip(window.iter()) {
                    *s *= w;
                }
            }
        }

        frames
    }
}

fn sliding(samples: &[f64], size: usize, hop: usize) -> Vec<Vec<f64>> {
    if size == 0 || hop == 0 {
        return Vec::new();
    }

    if samples.len() < size {
        let mut frame = samples.to_vec();
        frame.resize(size, 0.0);
        return vec![frame];
    }

    (0..=samples.len() - size)
        .step_by(hop)
        .map(|start| samples[start..start + size].to_vec())
        .collect()
}

fn hann_window(size: usize) -> Vec<f64> {
    if size < 2 {
        return vec![1.0; size];
    }
    let n = size as f64;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / (n - 1.0)).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f64, n: usize, rate: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / rate).sin())
            .collect()
    }

    fn argmax(v: &[f64]) -> usize {
        v.iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn spectrum_length_is_half_window() {
        assert_eq!(magnitude_spectrum(&[0.0; 8]).len(), 4);
        assert_eq!(magnitude_spectrum(&[0.0; 9]).len(), 4);
        assert_eq!(magnitude_spectrum(&[0.5]).len(), 0);
        assert!(magnitude_spectrum(&[]).is_empty());
    }

    #[test]
    fn impulse_has_flat_spectrum() {
        let mut window = vec![0.0; 16];
        window[0] = 1.0;
        for m in magnitude_spectrum(&window) {
            assert!((m - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn pure_tone_peaks_at_expected_bin() {
        let rate = 16000.0;
        let cases = [
            (440.0, 16000usize),
            (1000.0, 30000),
            (3150.0, 48000),
            (523.25, 20001),
        ];
        for &(freq, n) in &cases {
            let spectrum = magnitude_spectrum(&tone(freq, n, rate));
            let expected = freq * n as f64 / rate;
            let got = argmax(&spectrum) as f64;
            assert!(
                (got - expected).abs() <= 1.0,
                "tone {freq} Hz, n={n}: dominant bin {got}, expected ~{expected}"
            );
        }
    }

    #[test]
    fn transformer_pads_short_windows() {
        let t = SpectralTransformer::new(8);
        let padded = t.transform(&[1.0]);
        assert_eq!(padded.len(), 4);
        for m in padded {
            assert!((m - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn sliding_frames() {
        let samples: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let framer = Framer::new(WindowMode::Sliding { size: 4, hop: 3 }, Taper::Rectangular);
        let frames = framer.frames(&samples);

        assert_eq!(
            frames,
            vec![
                vec![0.0, 1.0, 2.0, 3.0],
                vec![3.0, 4.0, 5.0, 6.0],
                vec![6.0, 7.0, 8.0, 9.0],
            ]
        );
    }

    #[test]
    fn short_clip_is_zero_padded() {
        let framer = Framer::new(WindowMode::Sliding { size: 4, hop: 2 }, Taper::Rectangular);
        assert_eq!(framer.frames(&[1.0, 2.0]), vec![vec![1.0, 2.0, 0.0, 0.0]]);
        assert!(framer.frames(&[]).is_empty());
    }

    #[test]
    fn whole_clip_is_one_frame() {
        let framer = Framer::new(WindowMode::WholeClip, Taper::Rectangular);
        assert_eq!(framer.frames(&[1.0, 2.0, 3.0]), vec![vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn hann_taper_zeroes_edges() {
        let framer = Framer::new(WindowMode::Sliding { size: 5, hop: 5 }, Taper::Hann);
        let frames = framer.frames(&[1.0; 5]);

        assert_eq!(frames.len(), 1);
        assert!(frames[0][0].abs() < 1e-12);
        assert!((frames[0][2] - 1.0).abs() < 1e-12);
        assert!(frames[0][4].abs() < 1e-12);
    }

    #[test]
    fn window_mode_serde() {
        let mode: WindowMode =
            serde_json::from_str(r#"{"mode":"sliding","size":2048,"hop":1024}"#).unwrap();
        assert_eq!(mode, WindowMode::Sliding { size: 2048, hop: 1024 });

        let mode: WindowMode = serde_json::from_str(r#"{"mode":"whole_clip"}"#).unwrap();
        assert_eq!(mode, WindowMode::WholeClip);
    }
}
