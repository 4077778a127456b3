//! Combinatorial landmark hashing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hash::{self, OverflowPolicy};

/// Integer time marker of a landmark (the analysis window index in the
/// pipeline).
pub type Timestamp = u32;

/// Default number of following peaks each anchor is paired with.
pub const DEFAULT_FAN_OUT: usize = 5;

/// Which anchor timestamp a hash keeps when several pairs produce it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Each new pair overwrites the stored timestamp, so the last pair in
    /// iteration order (ascending anchor, then ascending offset) wins.
    #[default]
    LastWins,
    /// The first pair to produce a hash keeps it.
    FirstWins,
}

/// Mapping from landmark pair hash to anchor timestamp.
///
/// Ordered by hash, so iteration and serialization are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    hashes: BTreeMap<u64, Timestamp>,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor timestamp stored for `hash`.
    pub fn get(&self, hash: u64) -> Option<Timestamp> {
        self.hashes.get(&hash).copied()
    }

    pub fn contains(&self, hash: u64) -> bool {
        self.hashes.contains_key(&hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Iterates `(hash, anchor timestamp)` in ascending hash order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, Timestamp)> + '_ {
        self.hashes.iter().map(|(&h, &t)| (h, t))
    }

    pub fn into_inner(self) -> BTreeMap<u64, Timestamp> {
        self.hashes
    }

    fn record(&mut self, policy: CollisionPolicy, hash: u64, anchor: Timestamp) {
        match policy {
            CollisionPolicy::LastWins => {
                self.hashes.insert(hash, anchor);
            }
            CollisionPolicy::FirstWins => {
                self.hashes.entry(hash).or_insert(anchor);
            }
        }
    }
}

impl FromIterator<(u64, Timestamp)> for Fingerprint {
    fn from_iter<I: IntoIterator<Item = (u64, Timestamp)>>(iter: I) -> Self {
        Self {
            hashes: iter.into_iter().collect(),
        }
    }
}

/// Pairs each peak with the next `fan_out` peaks and hashes every pair.
///
/// # Hash
///
/// For anchor `i` and partner `j` in `i+1 ..= min(i + fan_out, M - 1)`:
///
/// ```text
/// hash = peaks[i] << 32 | peaks[j] << 16 | (timestamps[j] - timestamps[i])
/// ```
///
/// stored as `hash -> timestamps[i]`. Only the relative offset between
/// landmarks is encoded, so a hash matches wherever the excerpt starts in
/// a longer recording.
///
/// # Ranges
///
/// The layout is collision-free only for anchor bins below 2^32, paired
/// bins below 2^16 and deltas below 2^16 (see [`crate::hash`]). With the
/// default [`OverflowPolicy::Overlap`] out-of-range values are not checked
/// and overlap neighbouring fields. Timestamps must be non-decreasing; a
/// decreasing pair wraps around `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintGenerator {
    pub fan_out: usize,
    pub collision: CollisionPolicy,
    pub overflow: OverflowPolicy,
}

impl Default for FingerprintGenerator {
    fn default() -> Self {
        Self {
            fan_out: DEFAULT_FAN_OUT,
            collision: CollisionPolicy::default(),
            overflow: OverflowPolicy::default(),
        }
    }
}

impl FingerprintGenerator {
    /// Creates a generator with the given fan-out and default policies.
    pub fn new(fan_out: usize) -> Self {
        Self {
            fan_out,
            ..Self::default()
        }
    }

    pub fn with_collision(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Hashes index-aligned `peaks` (frequency bins) and `timestamps`.
    ///
    /// # Panics
    ///
    /// Panics if `peaks` and `timestamps` differ in length.
    pub fn generate(&self, peaks: &[usize], timestamps: &[Timestamp]) -> Fingerprint {
        assert_eq!(
            peaks.len(),
            timestamps.len(),
            "fingerprint: peaks and timestamps must be index-aligned"
        );

        let mut fingerprint = Fingerprint::new();
        for i in 0..peaks.len() {
            let f1 = peaks[i] as u64;
            let t1 = timestamps[i];
            let end = peaks.len().min(i.saturating_add(self.fan_out).saturating_add(1));
            for j in (i + 1)..end {
                let f2 = peaks[j] as u64;
                let delta = timestamps[j].wrapping_sub(t1) as u64;
                if let Some(h) = hash::pack_with(self.overflow, f1, f2, delta) {
                    fingerprint.record(self.collision, h, t1);
                }
            }
        }
        fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_within_fan_out() {
        let fp = FingerprintGenerator::default().generate(&[10, 20, 30], &[0, 1, 2]);

        assert_eq!(fp.len(), 3);
        assert_eq!(fp.get((10 << 32) | (20 << 16) | 1), Some(0));
        assert_eq!(fp.get((10 << 32) | (30 << 16) | 2), Some(0));
        assert_eq!(fp.get((20 << 32) | (30 << 16) | 1), Some(1));
    }

    #[test]
    fn fan_out_bounds_look_ahead() {
        let peaks = [1, 2, 3, 4, 5, 6, 7, 8];
        let timestamps = [0, 0, 1, 1, 2, 2, 3, 3];

        let fp = FingerprintGenerator::new(2).generate(&peaks, &timestamps);
        // 6 anchors with 2 partners, 1 anchor with 1 partner
        assert_eq!(fp.len(), 13);
        assert!(!fp.contains(hash::pack(1, 4, 1)));
        assert!(fp.contains(hash::pack(1, 3, 1)));
    }

    #[test]
    fn degenerate_inputs() {
        let g = FingerprintGenerator::default();
        assert!(g.generate(&[], &[]).is_empty());
        assert!(g.generate(&[7], &[3]).is_empty());
        assert!(FingerprintGenerator::new(0).generate(&[1, 2, 3], &[0, 1, 2]).is_empty());
    }

    #[test]
    #[should_panic(expected = "index-aligned")]
    fn mismatched_lengths_panic() {
        FingerprintGenerator::default().generate(&[1, 2, 3], &[0, 1]);
    }

    #[test]
    fn collision_last_wins_by_default() {
        // (5, 9, dt=1) is produced by anchors at t=0 and t=10.
        let peaks = [5, 9, 5, 9];
        let timestamps = [0, 1, 10, 11];

        let fp = FingerprintGenerator::new(1).generate(&peaks, &timestamps);
        let h = hash::pack(5, 9, 1);
        assert_eq!(fp.get(h), Some(10));
        assert_eq!(fp.len(), 2, "(5,9,1) once plus (9,5,9)");
    }

    #[test]
    fn collision_first_wins_when_requested() {
        let peaks = [5, 9, 5, 9];
        let timestamps = [0, 1, 10, 11];

        let fp = FingerprintGenerator::new(1)
            .with_collision(CollisionPolicy::FirstWins)
            .generate(&peaks, &timestamps);
        assert_eq!(fp.get(hash::pack(5, 9, 1)), Some(0));
        assert_eq!(fp.len(), 2);
    }

    #[test]
    fn collision_within_one_anchor_keeps_single_entry() {
        // Anchor 0 pairs with two identical partners at the same time.
        let fp = FingerprintGenerator::default().generate(&[4, 8, 8], &[2, 3, 3]);
        assert_eq!(fp.get(hash::pack(4, 8, 1)), Some(2));
        assert_eq!(fp.get(hash::pack(8, 8, 0)), Some(3));
        assert_eq!(fp.len(), 2);
    }

    #[test]
    fn overflow_policies() {
        let peaks = [1, 2];
        let timestamps = [0, 70_000];

        let overlap = FingerprintGenerator::default().generate(&peaks, &timestamps);
        assert_eq!(overlap.get(hash::pack(1, 2, 70_000)), Some(0));

        let masked = FingerprintGenerator::default()
            .with_overflow(OverflowPolicy::Mask)
            .generate(&peaks, &timestamps);
        assert_eq!(masked.get(hash::pack(1, 2, 70_000 & 0xffff)), Some(0));

        let skipped = FingerprintGenerator::default()
            .with_overflow(OverflowPolicy::Skip)
            .generate(&peaks, &timestamps);
        assert!(skipped.is_empty());
    }

    #[test]
    fn deterministic() {
        let peaks: Vec<usize> = (0..200).map(|i| (i * 37) % 512).collect();
        let timestamps: Vec<Timestamp> = (0..200).map(|i| i / 5).collect();
        let g = FingerprintGenerator::default();
        assert_eq!(g.generate(&peaks, &timestamps), g.generate(&peaks, &timestamps));
    }

    #[test]
    fn iter_is_sorted_by_hash() {
        let fp = FingerprintGenerator::default().generate(&[30, 20, 10], &[0, 1, 2]);
        let hashes: Vec<u64> = fp.iter().map(|(h, _)| h).collect();
        let mut sorted = hashes.clone();
        sorted.sort_unstable();
        assert_eq!(hashes, sorted);
    }
}
