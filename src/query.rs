//! Occurrence lookup.
//!
//! Two half-open binary searches bracket the suffix-array range whose
//! suffixes start with the pattern; the prefix table, when present and
//! applicable, narrows the starting range to a single key's interval. Both
//! searches run through one driver parameterized by a comparison-offset
//! rule: the naive rule always compares from offset 0, the
//! simple-accelerant rule skips the prefix already known to agree with the
//! query. Batches fan out across the rayon pool; records are independent,
//! so the parallel region needs no synchronization.

use std::cmp::Ordering;
use std::ops::Range;
use std::str::FromStr;

use rayon::prelude::*;

use crate::error::Error;
use crate::index::SuffixArrayIndex;

/// Comparison strategy used inside the binary search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Restart every suffix comparison at offset 0.
    Naive,
    /// Skip `min(LCP(q, suffix(A[lo])), LCP(q, suffix(A[mid])))` bytes.
    /// Every suffix inside the bracket agrees with the query on at least
    /// that prefix, so the skip never changes the order relation.
    SimpleAccel,
}

impl FromStr for QueryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "naive" => Ok(QueryMode::Naive),
            "simpleaccel" => Ok(QueryMode::SimpleAccel),
            other => Err(Error::Argument(format!(
                "unknown query mode {other:?} (expected 'naive' or 'simpleaccel')"
            ))),
        }
    }
}

/// One query: a title for output labeling, the pattern, and the positions
/// filled in by the engine.
#[derive(Debug, Clone)]
pub struct QueryRecord {
    pub title: String,
    pub pattern: Vec<u8>,
    pub results: Vec<i32>,
}

impl QueryRecord {
    pub fn new(title: impl Into<String>, pattern: impl Into<Vec<u8>>) -> Self {
        QueryRecord {
            title: title.into(),
            pattern: pattern.into(),
            results: Vec::new(),
        }
    }
}

enum Bound {
    Lower,
    Upper,
}

/// Longest common prefix of `pattern` and the suffix at `pos`, never
/// reading past the end of either operand.
#[inline]
fn lcp(text: &[u8], pos: usize, pattern: &[u8]) -> usize {
    let mut len = 0;
    while len < pattern.len() && pos + len < text.len() && text[pos + len] == pattern[len] {
        len += 1;
    }
    len
}

/// Compare the suffix at `pos`, truncated to the pattern length, against
/// the pattern, starting at `offset`. Suffix exhaustion (the sentinel, or
/// the end of the text) orders the suffix first; pattern exhaustion is
/// equality.
#[inline]
fn compare_suffix(text: &[u8], pos: usize, pattern: &[u8], offset: usize) -> Ordering {
    for j in offset..pattern.len() {
        let Some(&byte) = text.get(pos + j) else {
            return Ordering::Less;
        };
        match byte.cmp(&pattern[j]) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

fn search_bound(
    text: &[u8],
    suffixes: &[i32],
    pattern: &[u8],
    range: Range<usize>,
    mode: QueryMode,
    bound: Bound,
) -> usize {
    let mut lo = range.start;
    let mut hi = range.end;

    while lo < hi {
        let mid = lo + (hi - lo) / 2;

        let offset = match mode {
            QueryMode::Naive => 0,
            QueryMode::SimpleAccel => {
                let lcp_lo = lcp(text, suffixes[lo] as usize, pattern);
                let lcp_mid = lcp(text, suffixes[mid] as usize, pattern);
                lcp_lo.min(lcp_mid)
            }
        };

        let ord = compare_suffix(text, suffixes[mid] as usize, pattern, offset);
        let descend_right = match bound {
            Bound::Lower => ord == Ordering::Less,
            Bound::Upper => ord != Ordering::Greater,
        };

        if descend_right {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    lo
}

impl SuffixArrayIndex {
    /// All positions at which `pattern` occurs in the reference, ascending.
    ///
    /// Patterns are matched byte-for-byte; the engine never normalizes
    /// them, so lowercase or non-DNA bytes simply fail to match. The empty
    /// pattern matches every position.
    pub fn occurrences(&self, pattern: &[u8], mode: QueryMode) -> Vec<i32> {
        let range = if self.prefix_len != 0 && pattern.len() >= self.prefix_len {
            match self.prefix_table.get(&pattern[..self.prefix_len]) {
                Some(&(lo, hi)) => lo as usize..hi as usize,
                None => return Vec::new(),
            }
        } else {
            0..self.suffixes.len()
        };

        let lower = search_bound(
            &self.text,
            &self.suffixes,
            pattern,
            range.clone(),
            mode,
            Bound::Lower,
        );
        let upper = search_bound(&self.text, &self.suffixes, pattern, range, mode, Bound::Upper);

        let mut positions = self.suffixes[lower..upper].to_vec();
        positions.sort_unstable();
        positions
    }

    /// Answer a batch of queries, distributing records across the rayon
    /// pool. No ordering is guaranteed between records; each record's
    /// `results` is in ascending position order.
    pub fn batch(&self, records: &mut [QueryRecord], mode: QueryMode) {
        records.par_iter_mut().for_each(|record| {
            record.results = self.occurrences(&record.pattern, mode);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [QueryMode; 2] = [QueryMode::Naive, QueryMode::SimpleAccel];

    #[test]
    fn banana_fixture() {
        let index = SuffixArrayIndex::from_text(b"banana", 0).unwrap();
        for mode in MODES {
            assert_eq!(index.occurrences(b"ana", mode), vec![1, 3]);
            assert_eq!(index.occurrences(b"na", mode), vec![2, 4]);
            assert_eq!(index.occurrences(b"x", mode), Vec::<i32>::new());
        }
    }

    #[test]
    fn empty_pattern_matches_everywhere() {
        let index = SuffixArrayIndex::from_text(b"ACGT", 0).unwrap();
        for mode in MODES {
            assert_eq!(index.occurrences(b"", mode).len(), 5);
        }
    }

    #[test]
    fn prefix_table_narrowing() {
        let index = SuffixArrayIndex::from_text(b"ACGTACGT", 3).unwrap();
        for mode in MODES {
            assert_eq!(index.occurrences(b"ACGT", mode), vec![0, 4]);
            assert_eq!(index.occurrences(b"CGTA", mode), vec![1, 5]);
            assert_eq!(index.occurrences(b"TACG", mode), vec![3]);
            // Absent key short-circuits to an empty result.
            assert_eq!(index.occurrences(b"AAA", mode), Vec::<i32>::new());
            // Patterns shorter than k fall back to the full array.
            assert_eq!(index.occurrences(b"AC", mode), vec![0, 4]);
        }
    }

    #[test]
    fn pattern_longer_than_reference() {
        let index = SuffixArrayIndex::from_text(b"ACGT", 0).unwrap();
        for mode in MODES {
            assert_eq!(
                index.occurrences(b"ACGTACGTACGT", mode),
                Vec::<i32>::new()
            );
        }
    }

    #[test]
    fn homopolymer_overlaps() {
        let index = SuffixArrayIndex::from_text(b"AAAA", 2).unwrap();
        for mode in MODES {
            assert_eq!(index.occurrences(b"AA", mode), vec![0, 1, 2]);
        }
    }

    #[test]
    fn batch_fills_every_record() {
        let index = SuffixArrayIndex::from_text(b"ACGTACGT", 0).unwrap();
        let mut records = vec![
            QueryRecord::new("q1", b"ACGT".as_slice()),
            QueryRecord::new("q2", b"GT".as_slice()),
            QueryRecord::new("q3", b"TTTT".as_slice()),
        ];
        index.batch(&mut records, QueryMode::SimpleAccel);

        assert_eq!(records[0].results, vec![0, 4]);
        assert_eq!(records[1].results, vec![2, 6]);
        assert!(records[2].results.is_empty());
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("naive".parse::<QueryMode>().unwrap(), QueryMode::Naive);
        assert_eq!(
            "simpleaccel".parse::<QueryMode>().unwrap(),
            QueryMode::SimpleAccel
        );
        assert!("fast".parse::<QueryMode>().is_err());
    }
}
