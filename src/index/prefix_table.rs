//! Prefix-table construction.
//!
//! The table maps every k-byte DNA prefix occurring in the reference to the
//! half-open interval of suffix-array indices whose suffixes begin with it.
//! Because the suffix array is sorted, equal-prefix groups are contiguous
//! and one linear scan recovers them all. The parallel driver partitions
//! the array into fixed chunks and lets each worker fill a private map;
//! the maps are merged after the parallel region, so the region itself is
//! lock-free.

use std::collections::BTreeMap;
use std::ops::Range;

use rayon::prelude::*;

/// Ordered map from k-byte prefix to a half-open `[lo, hi)` interval of
/// suffix-array indices.
pub type PrefixTable = BTreeMap<Vec<u8>, (i32, i32)>;

/// Number of chunks the parallel builder partitions the array into.
const PARALLEL_CHUNKS: usize = 128;

/// First `k` bytes of the suffix starting at `off`, truncated at the end
/// of the text.
#[inline]
fn prefix_at(text: &[u8], off: usize, k: usize) -> &[u8] {
    &text[off..text.len().min(off + k)]
}

/// True when the suffix at `off` carries a full sentinel-free k-prefix.
/// Suffixes too close to the end of the reference cannot head or join a
/// group; they sit between groups in sort order and are left uncovered.
#[inline]
fn carries_prefix(text: &[u8], off: usize, k: usize) -> bool {
    off + k < text.len()
}

/// Scan `range` of the suffix array, recording every equal-prefix group
/// that starts inside it.
///
/// The inner group scan deliberately runs to the end of the array rather
/// than `range.end`: a group that straddles the range boundary is consumed
/// whole. [`build_parallel`] depends on this when it skips the straddling
/// group at each chunk start; changing either side alone would duplicate
/// or drop keys.
pub fn build_sequential(
    text: &[u8],
    suffixes: &[i32],
    k: usize,
    range: Range<usize>,
    table: &mut PrefixTable,
) {
    debug_assert!(k > 0);

    let mut iter = range.start;
    while iter < range.end {
        let head = suffixes[iter] as usize;
        if !carries_prefix(text, head, k) {
            iter += 1;
            continue;
        }

        let prefix = &text[head..head + k];
        let mut end = iter + 1;
        while end < suffixes.len() && prefix_at(text, suffixes[end] as usize, k) == prefix {
            end += 1;
        }

        table.insert(prefix.to_vec(), (iter as i32, end as i32));
        iter = end;
    }
}

/// Build the full table over `[0, len)` with a fixed-chunk parallel scan.
pub fn build_parallel(text: &[u8], suffixes: &[i32], k: usize) -> PrefixTable {
    build_chunked(text, suffixes, k, PARALLEL_CHUNKS)
}

fn build_chunked(text: &[u8], suffixes: &[i32], k: usize, chunks: usize) -> PrefixTable {
    let n = suffixes.len();
    let chunks = chunks.min(n).max(1);

    let locals: Vec<PrefixTable> = (0..chunks)
        .into_par_iter()
        .map(|i| {
            let mut start = i * n / chunks;
            let end = (i + 1) * n / chunks;

            if i > 0 {
                // A group straddling the chunk boundary is claimed
                // entirely by the previous worker; step past it.
                let before = suffixes[start - 1] as usize;
                if carries_prefix(text, before, k) {
                    let boundary = &text[before..before + k];
                    while start < n && prefix_at(text, suffixes[start] as usize, k) == boundary {
                        start += 1;
                    }
                }
            }

            let mut local = PrefixTable::new();
            build_sequential(text, suffixes, k, start..end, &mut local);
            local
        })
        .collect();

    let mut table = PrefixTable::new();
    for local in locals {
        table.extend(local);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::sais::build_suffix_array;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn table_for(text: &[u8], k: usize) -> (Vec<i32>, PrefixTable) {
        let suffixes = build_suffix_array(text).unwrap();
        let mut table = PrefixTable::new();
        build_sequential(text, &suffixes, k, 0..suffixes.len(), &mut table);
        (suffixes, table)
    }

    #[test]
    fn homopolymer_has_single_key() {
        let (_, table) = table_for(b"AAAA$", 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(b"AA".as_slice()), Some(&(2, 5)));
    }

    #[test]
    fn intervals_cover_exactly_the_qualifying_suffixes() {
        let text = b"ACGTACGT$";
        let (suffixes, table) = table_for(text, 3);

        let mut covered = vec![false; suffixes.len()];
        for (key, &(lo, hi)) in &table {
            assert_eq!(key.len(), 3);
            assert!(lo < hi);
            for i in lo..hi {
                let off = suffixes[i as usize] as usize;
                assert_eq!(&text[off..off + 3], key.as_slice());
                covered[i as usize] = true;
            }
        }

        for (i, &cov) in covered.iter().enumerate() {
            let off = suffixes[i] as usize;
            assert_eq!(cov, off + 3 < text.len());
        }
    }

    #[test]
    fn oversized_k_yields_empty_table() {
        let (_, table) = table_for(b"ACGT$", 5);
        assert!(table.is_empty());

        let (_, exact) = table_for(b"ACGT$", 4);
        assert_eq!(exact.len(), 1);
        assert_eq!(exact.get(b"ACGT".as_slice()), Some(&(1, 2)));
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(7);
        let bases = [b'A', b'C', b'G', b'T'];
        let mut text: Vec<u8> = (0..2000).map(|_| bases[rng.gen_range(0..4)]).collect();
        text.push(b'$');

        let suffixes = build_suffix_array(&text).unwrap();
        for k in [1, 2, 4, 7] {
            let mut sequential = PrefixTable::new();
            build_sequential(&text, &suffixes, k, 0..suffixes.len(), &mut sequential);
            assert_eq!(build_parallel(&text, &suffixes, k), sequential, "k={k}");
        }
    }

    #[test]
    fn chunk_boundaries_do_not_split_groups() {
        // Small array, many chunk counts: every boundary lands inside or
        // next to some group at least once.
        let text = b"AAAAAAAATTTTGGGGCCCCAAAA$";
        let suffixes = build_suffix_array(text).unwrap();

        let mut sequential = PrefixTable::new();
        build_sequential(text, &suffixes, 2, 0..suffixes.len(), &mut sequential);

        for chunks in 1..=suffixes.len() {
            assert_eq!(
                build_chunked(text, &suffixes, 2, chunks),
                sequential,
                "chunks={chunks}"
            );
        }
    }
}
