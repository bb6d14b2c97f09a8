//! Integer-first percent helpers. Threshold tests and whole-number percentages
//! never go through floating point.

/// `num / den >= pct%`, evaluated as `num * 100 >= pct * den`. A zero
/// denominator never passes.
#[inline]
pub fn ge_percent(num: u64, den: u64, pct: u8) -> bool {
    if den == 0 {
        return false;
    }
    (num as u128) * 100 >= (pct as u128) * (den as u128)
}

/// Whole percentages for `counts` that sum to exactly 100 (or all zero when
/// every count is zero).
///
/// Each bucket is rounded half-up; the bucket with the largest count absorbs
/// any drift. Ties go to the earliest bucket.
pub fn apportion_percent<const N: usize>(counts: [u64; N]) -> [u8; N] {
    let mut out = [0u8; N];
    let total: u128 = counts.iter().map(|&c| c as u128).sum();
    if total == 0 || N == 0 {
        return out;
    }
    let mut sum: i64 = 0;
    for (slot, &c) in out.iter_mut().zip(counts.iter()) {
        *slot = ((200 * c as u128 + total) / (2 * total)).min(100) as u8;
        sum += *slot as i64;
    }
    let mut largest = 0usize;
    for i in 1..N {
        if counts[i] > counts[largest] {
            largest = i;
        }
    }
    let adjusted = out[largest] as i64 + (100 - sum);
    out[largest] = adjusted.clamp(0, 100) as u8;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ge_percent_is_exact() {
        assert!(ge_percent(7, 10, 70));
        assert!(!ge_percent(69, 100, 70));
        assert!(ge_percent(55, 100, 55));
        assert!(!ge_percent(1, 0, 0));
        assert!(ge_percent(u64::MAX, u64::MAX, 100));
    }

    #[test]
    fn apportion_sums_to_hundred() {
        assert_eq!(apportion_percent([3u64, 3, 1]), [43, 43, 14]);
        // 33.3 each: rounds to 99, first bucket absorbs.
        assert_eq!(apportion_percent([1u64, 1, 1]), [34, 33, 33]);
        // 12.5 / 12.5 / 75 rounds up to 101; the largest bucket gives one back.
        assert_eq!(apportion_percent([1u64, 1, 6]), [13, 13, 74]);
        assert_eq!(apportion_percent([0u64, 0, 0]), [0, 0, 0]);
        assert_eq!(apportion_percent([0u64, 4, 0]), [0, 100, 0]);
    }
}
