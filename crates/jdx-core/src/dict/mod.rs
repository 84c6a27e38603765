//! Flat-file dictionary storage, index building and prefix search.
//!
//! `DictText` holds the raw EUC-JP dictionary behind a sentinel-padded byte
//! accessor. `IndexTable` holds the sorted token offsets (the `.jdx` cache
//! file). `DictionaryHandle` ties both together and answers queries through
//! `QueryEngine`.

mod collate;
mod handle;
mod index;
mod index_io;
mod query;
mod sort;
#[cfg(test)]
mod tests;
mod text;
mod tokenizer;

pub use collate::{compare_prefix, compare_strict, SORT_WINDOW};
pub use handle::{index_path_for, DictionaryHandle, IndexStats};
pub use index::IndexTable;
pub use index_io::{expected_header, FORMAT_VERSION};
pub use query::QueryEngine;
pub use sort::quicksort;
pub use text::{DictText, MAX_DICT_LEN, RIGHT_PADDING};
pub use tokenizer::{collect_entries, MAX_TOKEN_LEN};

use std::io;

/// Error type for dictionary loading, index building and index I/O.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot allocate {bytes} bytes")]
    Allocation { bytes: usize },

    #[error("dictionary too large ({0} bytes)")]
    TooLarge(u64),

    #[error("index overflow: more than {capacity} entries")]
    IndexOverflow { capacity: usize },

    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    #[error("query cannot be encoded as EUC-JP: {0:?}")]
    Encoding(String),
}
