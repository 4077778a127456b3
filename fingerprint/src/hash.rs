//! 64-bit landmark pair hash.
//!
//! # Layout
//!
//! ```text
//! 63            32 31       16 15        0
//! +---------------+-----------+-----------+
//! |  anchor bin   |  paired   |  delta t  |
//! |   (32 bits)   |  bin (16) |   (16)    |
//! +---------------+-----------+-----------+
//! ```
//!
//! The packing is collision-free only while the anchor bin fits in 32 bits
//! and the paired bin and time delta each fit in 16 bits. Wider values
//! spill into the neighbouring field under [`OverflowPolicy::Overlap`].

use serde::{Deserialize, Serialize};

/// Bit offset of the anchor frequency bin.
pub const ANCHOR_SHIFT: u32 = 32;
/// Bit offset of the paired frequency bin.
pub const PAIRED_SHIFT: u32 = 16;

/// Largest anchor bin that fits its field.
pub const MAX_ANCHOR_BIN: u64 = u32::MAX as u64;
/// Largest paired bin that fits its field.
pub const MAX_PAIRED_BIN: u64 = u16::MAX as u64;
/// Largest time delta that fits its field.
pub const MAX_DELTA: u64 = u16::MAX as u64;

/// What to do with a pair whose fields do not fit the layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Shift and OR the raw values; oversized fields overlap their
    /// neighbours.
    #[default]
    Overlap,
    /// Truncate each field to its width before packing.
    Mask,
    /// Drop the pair.
    Skip,
}

/// Packs two frequency bins and their time delta without any range check.
#[inline]
pub fn pack(anchor_bin: u64, paired_bin: u64, delta: u64) -> u64 {
    anchor_bin << ANCHOR_SHIFT | paired_bin << PAIRED_SHIFT | delta
}

/// Reports whether all three fields fit the layout.
#[inline]
pub fn fits(anchor_bin: u64, paired_bin: u64, delta: u64) -> bool {
    anchor_bin <= MAX_ANCHOR_BIN && paired_bin <= MAX_PAIRED_BIN && delta <= MAX_DELTA
}

/// Packs a pair according to `policy`. Returns `None` only under
/// [`OverflowPolicy::Skip`] when a field is out of range.
pub fn pack_with(
    policy: OverflowPolicy,
    anchor_bin: u64,
    paired_bin: u64,
    delta: u64,
) -> Option<u64> {
    match policy {
        OverflowPolicy::Overlap => Some(pack(anchor_bin, paired_bin, delta)),
        OverflowPolicy::Mask => Some(pack(
            anchor_bin & MAX_ANCHOR_BIN,
            paired_bin & MAX_PAIRED_BIN,
            delta & MAX_DELTA,
        )),
        OverflowPolicy::Skip => fits(anchor_bin, paired_bin, delta)
            .then(|| pack(anchor_bin, paired_bin, delta)),
    }
}

/// Splits a hash back into `(anchor_bin, paired_bin, delta)`.
///
/// Exact only for hashes whose fields fit the layout.
pub fn unpack(hash: u64) -> (u64, u64, u64) {
    (
        hash >> ANCHOR_SHIFT,
        (hash >> PAIRED_SHIFT) & MAX_PAIRED_BIN,
        hash & MAX_DELTA,
    )
}
