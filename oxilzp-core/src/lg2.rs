//! Fixed-point base-2 logarithms.
//!
//! `nlog2` approximates `log2(v)` scaled by 2^14 by taking the integer part
//! from the position of the highest set bit and using the normalized
//! mantissa linearly as the fractional part. It is exact at powers of two.

/// Fractional bits of [`nlog2`] results.
pub const LOG2_SCALE_BITS: u32 = 14;

/// Integer base-2 logarithm (`floor(log2(v))`), with `ilog2(0) == -1`.
#[inline]
pub fn ilog2(value: u32) -> i32 {
    31 - value.leading_zeros() as i32
}

/// Approximate `log2(value) * 2^14`.
///
/// Only defined for `0 < value < 2^15`; the codec never calls it outside
/// that range because frequency totals stay below 32768.
#[inline]
pub fn nlog2(value: u32) -> u32 {
    debug_assert!(value > 0 && value < 1 << 15, "nlog2 out of range: {value}");
    let ilog = ilog2(value) as u32;
    let norm = value << (LOG2_SCALE_BITS - ilog);
    (ilog << LOG2_SCALE_BITS) + norm - (1 << LOG2_SCALE_BITS)
}
