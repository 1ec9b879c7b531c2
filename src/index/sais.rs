//! Suffix-array construction adapter.
//!
//! Construction itself is delegated to the `bio` crate's induced-sorting
//! implementation; this module only enforces the collaborator contract:
//! sentinel-terminated input in, an `i32` permutation of `[0, n]` out.

use bio::data_structures::suffix_array::suffix_array;

use crate::error::{Error, Result};

/// Build the sorted suffix array over `text`.
///
/// `text` must be sentinel-terminated (see [`crate::normalize`]). Entries
/// are stored as `i32` to match the persisted format, so texts longer than
/// `i32::MAX` are rejected.
pub fn build_suffix_array(text: &[u8]) -> Result<Vec<i32>> {
    if text.len() > i32::MAX as usize {
        return Err(Error::IndexBuildFailed(format!(
            "text length {} exceeds the 32-bit entry limit",
            text.len()
        )));
    }

    let sa = suffix_array(text);
    if sa.len() != text.len() {
        return Err(Error::IndexBuildFailed(format!(
            "collaborator returned {} entries for {} positions",
            sa.len(),
            text.len()
        )));
    }

    Ok(sa.into_iter().map(|pos| pos as i32).collect())
}
