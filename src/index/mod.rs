//! Index construction and persistence.
//!
//! A [`SuffixArrayIndex`] owns the normalized text, the sorted suffix
//! array, and the optional k-prefix jump table. All three are built once,
//! persisted together, and immutable afterwards; queries share them by
//! reference.

pub mod prefix_table;
pub mod sais;
pub mod serialize;

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;

use memmap2::Mmap;

use crate::error::{Error, Result};
use crate::normalize::{self, SENTINEL};
use prefix_table::PrefixTable;

/// A persisted-index-shaped suffix array over a sentinel-terminated DNA
/// reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixArrayIndex {
    pub(crate) text: Vec<u8>,
    pub(crate) suffixes: Vec<i32>,
    pub(crate) prefix_len: usize,
    pub(crate) prefix_table: PrefixTable,
}

impl SuffixArrayIndex {
    /// Build an index over a raw FASTA body, normalizing it first
    /// (upper-case, random replacement of non-DNA bytes, `$` appended).
    pub fn from_reference(raw: &[u8], prefix_len: usize) -> Result<Self> {
        Self::from_normalized(normalize::normalize(raw), prefix_len)
    }

    /// Like [`Self::from_reference`] but with deterministic normalization.
    pub fn from_reference_seeded(raw: &[u8], prefix_len: usize, seed: u64) -> Result<Self> {
        Self::from_normalized(normalize::normalize_seeded(raw, seed), prefix_len)
    }

    /// Build an index over `data` as-is, appending only the sentinel.
    ///
    /// Bypasses normalization. Every byte must order strictly above the
    /// sentinel (any printable content from `%` upward), so the appended
    /// terminator stays the unique minimum the suffix sort relies on.
    pub fn from_text(data: &[u8], prefix_len: usize) -> Result<Self> {
        if data.iter().any(|&b| b <= SENTINEL) {
            return Err(Error::Argument(
                "reference text must order strictly above the sentinel byte '$'".to_string(),
            ));
        }
        let mut text = Vec::with_capacity(data.len() + 1);
        text.extend_from_slice(data);
        text.push(SENTINEL);
        Self::from_normalized(text, prefix_len)
    }

    fn from_normalized(text: Vec<u8>, prefix_len: usize) -> Result<Self> {
        let start = Instant::now();
        let suffixes = sais::build_suffix_array(&text)?;
        log::info!(
            "suffix array built in {:.3}s ({} entries)",
            start.elapsed().as_secs_f64(),
            suffixes.len()
        );

        let prefix_table = if prefix_len != 0 {
            let start = Instant::now();
            let table = prefix_table::build_parallel(&text, &suffixes, prefix_len);
            log::info!(
                "prefix table built in {:.3}s (k={}, {} keys)",
                start.elapsed().as_secs_f64(),
                prefix_len,
                table.len()
            );
            table
        } else {
            PrefixTable::new()
        };

        Ok(SuffixArrayIndex {
            text,
            suffixes,
            prefix_len,
            prefix_table,
        })
    }

    /// The normalized text, sentinel included.
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// The sorted suffix array.
    pub fn suffixes(&self) -> &[i32] {
        &self.suffixes
    }

    /// Prefix-table parameter `k`; 0 means no table.
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// The prefix jump table (empty when `k` is 0).
    pub fn prefix_table(&self) -> &PrefixTable {
        &self.prefix_table
    }

    /// Serialize into a byte sink. See [`serialize`] for the layout.
    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        serialize::write_index(self, out)
    }

    /// Deserialize from a byte source.
    pub fn read_from<R: Read>(input: R) -> Result<Self> {
        serialize::read_index(input)
    }

    /// Persist the index to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Load an index previously written by [`Self::save`].
    ///
    /// The file is memory-mapped and deserialized from the mapping.
    pub fn load(path: &Path) -> Result<Self> {
        let start = Instant::now();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let index = Self::read_from(&mmap[..])?;
        log::info!(
            "index loaded in {:.3}s ({} positions, k={})",
            start.elapsed().as_secs_f64(),
            index.suffixes.len(),
            index.prefix_len
        );
        Ok(index)
    }
}
