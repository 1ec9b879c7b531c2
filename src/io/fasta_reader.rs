//! FASTA input using bio::io::fasta.
//!
//! Two entry points: [`read_reference`] concatenates every record body in
//! file order into one reference string (headers discarded), and
//! [`read_queries`] keeps one record per query, titled by its header.
//!
//! Compressed input is auto-detected. BGZF (the block-gzip variant used in
//! bioinformatics) decompresses in parallel via independent blocks;
//! standard gzip falls back to single-threaded decompression.

use bio::io::fasta;
use flate2::read::GzDecoder;
use noodles_bgzf as bgzf;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::Result;
use crate::query::QueryRecord;

const BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Detect BGZF by its gzip-extra-field signature.
fn is_bgzip_format(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 18];

    if file.read(&mut header).unwrap_or(0) < 18 {
        return Ok(false);
    }
    if header[0] != 0x1f || header[1] != 0x8b {
        return Ok(false);
    }
    // FEXTRA flag plus the 'BC' subfield identify BGZF.
    if header[3] & 0x04 == 0 {
        return Ok(false);
    }
    Ok(header[12] == b'B' && header[13] == b'C')
}

fn open(path: &Path) -> Result<fasta::Reader<BufReader<BufReader<Box<dyn Read>>>>> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        if is_bgzip_format(path)? {
            log::debug!("detected BGZF input, using multithreaded decompression");
            Box::new(bgzf::MultithreadedReader::new(File::open(path)?))
        } else {
            log::debug!("detected standard gzip input");
            Box::new(GzDecoder::new(file))
        }
    } else {
        Box::new(file)
    };

    Ok(fasta::Reader::new(BufReader::with_capacity(
        BUFFER_SIZE,
        reader,
    )))
}

/// Read a reference FASTA: all records are joined in file order into a
/// single raw byte string, exactly as if the header lines were deleted.
pub fn read_reference(path: &Path) -> Result<Vec<u8>> {
    let mut sequence = Vec::new();
    for record in open(path)?.records() {
        let record = record?;
        sequence.extend_from_slice(record.seq());
    }
    Ok(sequence)
}

/// Read a query FASTA: one [`QueryRecord`] per entry, titled by the
/// record header. Patterns are upper-cased here (the engine matches
/// byte-for-byte and never rewrites them); non-DNA bytes are left alone
/// and will simply fail to match.
pub fn read_queries(path: &Path) -> Result<Vec<QueryRecord>> {
    let mut queries = Vec::new();
    for record in open(path)?.records() {
        let record = record?;
        queries.push(QueryRecord::new(
            record.id(),
            record.seq().to_ascii_uppercase(),
        ));
    }
    Ok(queries)
}
