//! Near-duplicate detection for new submissions.
//!
//! The matcher compares a candidate text with one text field of every
//! existing record using a containment-style word overlap:
//!
//! ```text
//! ratio = |candidate words found among entry words| / max(|candidate words|, |entry words|)
//! ```
//!
//! Words are produced by lower-casing and splitting on whitespace runs.
//! Repeated words are counted on both sides, so this is not a Jaccard index.
//! Everything here is pure and deterministic.

mod overlap;

pub use overlap::{
    find_similar, overlap_ratio, score_similar, tokenize, SimilarMatch,
    DEFAULT_SIMILARITY_THRESHOLD,
};
