// rust/bilm-data/src/vocab/mod.rs

//! Vocabulary adapters.
//!
//! Datasets only depend on the [`Vocabulary`] trait. Character-level
//! encoding is an optional capability exposed through
//! [`Vocabulary::char_encoder`], which a dataset queries once when it is
//! constructed.
//!
//! Two file-backed adapters are provided: [`WordVocabulary`] for token ids
//! only and [`CharVocabulary`], which adds byte-level word encodings.

mod chars;
mod traits;
mod word;

pub use chars::{CharVocabulary, BOS_CHAR, BOW_CHAR, EOS_CHAR, EOW_CHAR, PAD_CHAR};
pub use traits::{CharEncoder, Vocabulary};
pub use word::WordVocabulary;
