//! Reference sequence normalization.
//!
//! The suffix-array collaborator demands a bounded alphabet with a strictly
//! least, unique terminator. Normalization canonicalizes the raw FASTA body
//! into `{A,C,G,T}` followed by a single `$`: every byte is upper-cased and
//! anything outside the DNA alphabet is replaced with a uniformly random
//! base. Random replacement keeps the reference length intact, so reported
//! positions still line up with the user's sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Sentinel terminator. Strictly less than every DNA byte.
pub const SENTINEL: u8 = b'$';

/// Canonical base for each 2-bit code.
const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Maps both cases of ACGT to their 2-bit code; everything else to 4.
const NT4_TABLE: [u8; 256] = {
    let mut table = [4u8; 256];
    table[b'A' as usize] = 0;
    table[b'a' as usize] = 0;
    table[b'C' as usize] = 1;
    table[b'c' as usize] = 1;
    table[b'G' as usize] = 2;
    table[b'g' as usize] = 2;
    table[b'T' as usize] = 3;
    table[b't' as usize] = 3;
    table
};

/// Bytes handled per worker in the parallel pass.
const CHUNK_LEN: usize = 64 * 1024;

/// Normalize `raw` into sentinel-terminated DNA text.
///
/// Out-of-alphabet replacements draw from an entropy-seeded RNG per chunk,
/// so the replacement pattern is not reproducible across runs or thread
/// counts. Use [`normalize_seeded`] when determinism matters.
pub fn normalize(raw: &[u8]) -> Vec<u8> {
    let mut text = vec![0u8; raw.len() + 1];
    let (body, tail) = text.split_at_mut(raw.len());

    body.par_chunks_mut(CHUNK_LEN)
        .zip(raw.par_chunks(CHUNK_LEN))
        .for_each(|(dst, src)| {
            let mut rng = StdRng::from_entropy();
            normalize_into(src, dst, &mut rng);
        });

    tail[0] = SENTINEL;
    text
}

/// Deterministic, sequential variant of [`normalize`] for reproducible
/// builds and tests.
pub fn normalize_seeded(raw: &[u8], seed: u64) -> Vec<u8> {
    let mut text = vec![0u8; raw.len() + 1];
    let mut rng = StdRng::seed_from_u64(seed);
    normalize_into(raw, &mut text[..raw.len()], &mut rng);
    text[raw.len()] = SENTINEL;
    text
}

fn normalize_into(src: &[u8], dst: &mut [u8], rng: &mut StdRng) {
    for (out, &byte) in dst.iter_mut().zip(src) {
        let code = NT4_TABLE[byte as usize];
        *out = if code < 4 {
            BASES[code as usize]
        } else {
            BASES[rng.gen_range(0..4)]
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_dna(b: u8) -> bool {
        matches!(b, b'A' | b'C' | b'G' | b'T')
    }

    #[test]
    fn length_and_sentinel() {
        let text = normalize(b"ACGTN");
        assert_eq!(text.len(), 6);
        assert_eq!(*text.last().unwrap(), SENTINEL);
        assert!(text[..5].iter().all(|&b| is_dna(b)));
    }

    #[test]
    fn dna_input_passes_through_uppercased() {
        let text = normalize(b"acgtACGT");
        assert_eq!(&text, b"ACGTACGT$");
    }

    #[test]
    fn ambiguous_bytes_become_dna() {
        let text = normalize(b"NNNRYKMxz*>!");
        assert_eq!(text.len(), 13);
        assert!(text[..12].iter().all(|&b| is_dna(b)));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let a = normalize_seeded(b"NNNNNNNNNNACGT", 11);
        let b = normalize_seeded(b"NNNNNNNNNNACGT", 11);
        assert_eq!(a, b);
        assert!(a[..14].iter().all(|&b| is_dna(b)));
    }

    #[test]
    fn empty_input_is_just_the_sentinel() {
        assert_eq!(normalize(b""), vec![SENTINEL]);
    }
}
