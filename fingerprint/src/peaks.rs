//! Spectral peak selection.

use crate::topk::BoundedTopK;

/// A strict local maximum of a magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Frequency bin index.
    pub bin: usize,
    /// Magnitude at `bin`.
    pub magnitude: f64,
}

/// Returns up to `k` peaks of `spectrum`, strongest first.
///
/// A bin is a candidate iff its magnitude strictly exceeds both neighbours,
/// so the first and last bins never qualify. Candidates with a
/// non-positive (or NaN) magnitude are skipped. Ties are broken
/// arbitrarily.
pub fn find_peaks(spectrum: &[f64], k: usize) -> Vec<Peak> {
    if k == 0 || spectrum.len() < 3 {
        return Vec::new();
    }

    // Strict maxima are never adjacent, so there are at most len / 2.
    let mut top = BoundedTopK::new(k.min(spectrum.len() / 2));
    for (i, w) in spectrum.windows(3).enumerate() {
        let (prev, cur, next) = (w[0], w[1], w[2]);
        if cur > prev && cur > next && cur > 0.0 {
            top.push(cur, i + 1);
        }
    }

    top.into_sorted_vec()
        .into_iter()
        .map(|(magnitude, bin)| Peak { bin, magnitude })
        .collect()
}

/// Returns the bin indices of up to `k` peaks of `spectrum`, strongest first.
pub fn extract_peaks(spectrum: &[f64], k: usize) -> Vec<usize> {
    find_peaks(spectrum, k).into_iter().map(|p| p.bin).collect()
}
