//! On-disk index format.
//!
//! Little-endian, length-prefixed binary written in a fixed order:
//!
//! ```text
//! u32  magic            0xABEEFDAD
//! u64  text_len
//! u8   text[text_len]
//! u64  sa_len           (= text_len)
//! i32  suffixes[sa_len]
//! u64  k                (0 = no prefix table)
//! u64  entry_count      \
//! u64  key_len (= k)     | present only when k != 0,
//! u8   key[key_len]      | repeated entry_count times
//! i32  lo, i32 hi       /  hi is INCLUSIVE on disk
//! ```
//!
//! Intervals are half-open in memory; the inclusive upper bound is a
//! compatibility artifact of the original format and is converted at this
//! boundary only.

use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::index::prefix_table::PrefixTable;
use crate::index::SuffixArrayIndex;

const FILE_MAGIC: u32 = 0xABEE_FDAD;

pub(crate) fn write_index<W: Write>(index: &SuffixArrayIndex, mut out: W) -> Result<()> {
    out.write_all(&FILE_MAGIC.to_le_bytes())?;

    out.write_all(&(index.text.len() as u64).to_le_bytes())?;
    out.write_all(&index.text)?;

    out.write_all(&(index.suffixes.len() as u64).to_le_bytes())?;
    for &entry in &index.suffixes {
        out.write_all(&entry.to_le_bytes())?;
    }

    out.write_all(&(index.prefix_len as u64).to_le_bytes())?;
    if index.prefix_len != 0 {
        out.write_all(&(index.prefix_table.len() as u64).to_le_bytes())?;
        for (key, &(lo, hi)) in &index.prefix_table {
            out.write_all(&(key.len() as u64).to_le_bytes())?;
            out.write_all(key)?;
            out.write_all(&lo.to_le_bytes())?;
            out.write_all(&(hi - 1).to_le_bytes())?;
        }
    }

    Ok(())
}

pub(crate) fn read_index<R: Read>(mut input: R) -> Result<SuffixArrayIndex> {
    let magic = read_u32(&mut input)?;
    if magic != FILE_MAGIC {
        return Err(Error::InvalidIndex(format!(
            "bad magic 0x{magic:08x}, expected 0x{FILE_MAGIC:08x}"
        )));
    }

    let text_len = read_len(&mut input, "text length")?;
    let mut text = vec![0u8; text_len];
    input.read_exact(&mut text).map_err(truncated)?;

    let sa_len = read_len(&mut input, "suffix array length")?;
    if sa_len != text_len {
        return Err(Error::InvalidIndex(format!(
            "suffix array length {sa_len} disagrees with text length {text_len}"
        )));
    }
    let mut suffixes = Vec::with_capacity(sa_len);
    for _ in 0..sa_len {
        suffixes.push(read_i32(&mut input)?);
    }

    let prefix_len = read_len(&mut input, "prefix length")?;
    let mut prefix_table = PrefixTable::new();
    if prefix_len != 0 {
        let entry_count = read_len(&mut input, "entry count")?;
        for _ in 0..entry_count {
            let key_len = read_len(&mut input, "key length")?;
            if key_len != prefix_len {
                return Err(Error::InvalidIndex(format!(
                    "prefix key of length {key_len} in a k={prefix_len} table"
                )));
            }
            let mut key = vec![0u8; key_len];
            input.read_exact(&mut key).map_err(truncated)?;

            let lo = read_i32(&mut input)?;
            let hi = read_i32(&mut input)?;
            if lo < 0 || lo > hi || hi as usize >= sa_len {
                return Err(Error::InvalidIndex(format!(
                    "interval [{lo}, {hi}] out of bounds for {sa_len} entries"
                )));
            }
            prefix_table.insert(key, (lo, hi + 1));
        }
    }

    Ok(SuffixArrayIndex {
        text,
        suffixes,
        prefix_len,
        prefix_table,
    })
}

fn truncated(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::InvalidIndex("truncated index stream".to_string())
    } else {
        Error::Io(err)
    }
}

fn read_u32<R: Read>(input: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf).map_err(truncated)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i32<R: Read>(input: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf).map_err(truncated)?;
    Ok(i32::from_le_bytes(buf))
}

/// Reads a u64 length prefix and bounds-checks it against the 32-bit entry
/// limit so corrupt prefixes cannot drive huge allocations.
fn read_len<R: Read>(input: &mut R, what: &str) -> Result<usize> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf).map_err(truncated)?;
    let len = u64::from_le_bytes(buf);
    if len > i32::MAX as u64 {
        return Err(Error::InvalidIndex(format!("implausible {what} {len}")));
    }
    Ok(len as usize)
}
