/// Number of differing bits
#[inline]
pub fn hamming(a: &[u8], b: &[u8]) -> u32 {
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}

#[inline]
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Euclidean distance between byte strings, one dimension per byte
#[inline]
pub fn l2_bytes(a: &[u8], b: &[u8]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f32 - y as f32;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Insert `(distance, index)` into a list sorted by ascending distance,
/// keeping at most `k` entries. Earlier insertions win ties.
pub(crate) fn push_sorted(best: &mut Vec<(f32, usize)>, candidate: (f32, usize), k: usize) {
    let pos = best.iter().position(|b| candidate.0 < b.0).unwrap_or(best.len());
    if pos < k {
        best.insert(pos, candidate);
        best.truncate(k);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hamming() {
        assert_eq!(hamming(&[0b1010, 0xff], &[0b0110, 0x0f]), 2 + 4);
        assert_eq!(hamming(&[7, 7], &[7, 7]), 0);
    }

    #[test]
    fn test_l2() {
        assert_eq!(l2_squared(&[0.0, 3.0], &[4.0, 0.0]), 25.0);
        assert_eq!(l2_bytes(&[0, 3], &[4, 0]), 5.0);
    }

    #[test]
    fn test_push_sorted_keeps_k_smallest() {
        let mut best = Vec::new();
        for (i, d) in [5.0, 1.0, 3.0, 1.0, 0.5].into_iter().enumerate() {
            push_sorted(&mut best, (d, i), 2);
        }
        assert_eq!(best, vec![(0.5, 4), (1.0, 1)]);
    }
}
