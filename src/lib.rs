//! sufidx - suffix-array indexing and exact pattern lookup for DNA
//! references.
//!
//! Build side: a raw FASTA body is normalized onto the `{A,C,G,T}`
//! alphabet with a `$` terminator, suffix-sorted, optionally augmented
//! with a k-prefix jump table, and persisted as a magic-tagged binary
//! index. Query side: the persisted index answers exact-occurrence
//! lookups through bounded binary search, one batch of independent
//! queries at a time.

pub mod error;
pub mod index;
pub mod io;
pub mod normalize;
pub mod query;

pub use error::{Error, Result};
pub use index::SuffixArrayIndex;
pub use query::{QueryMode, QueryRecord};
