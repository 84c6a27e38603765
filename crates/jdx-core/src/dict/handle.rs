use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, debug_span, info};

use super::index::IndexTable;
use super::index_io::expected_header;
use super::query::QueryEngine;
use super::text::{DictText, MAX_DICT_LEN};
use super::DictError;
use crate::eucjp;
use crate::settings::{settings, IndexSettings};

/// Cache file for `dictionary_path` inside `cache_dir`, named after the
/// dictionary's base filename.
pub fn index_path_for(cache_dir: &Path, dictionary_path: &Path) -> PathBuf {
    let mut name = dictionary_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("dictionary"));
    name.push(".");
    name.push(&settings().index.index_extension);
    cache_dir.join(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub dict_len: usize,
    pub entries: usize,
    /// Whether the index had to be (re)built when this handle was opened.
    pub rebuilt: bool,
}

/// An open dictionary: the mapped dictionary text plus its mapped index.
///
/// The index is complete before a handle exists, and both mappings stay
/// immutable until the handle is dropped, so `&DictionaryHandle` can be
/// searched from any number of threads.
pub struct DictionaryHandle {
    text: DictText,
    index: IndexTable,
    rebuilt: bool,
}

impl DictionaryHandle {
    /// Open `dictionary_path`, reusing the index at `index_path` if it was
    /// built for the current dictionary, otherwise rebuilding it first.
    pub fn open(dictionary_path: &Path, index_path: &Path) -> Result<Self, DictError> {
        Self::open_with(dictionary_path, index_path, &settings().index)
    }

    /// [`DictionaryHandle::open`] with explicit index settings instead of the
    /// global ones.
    pub fn open_with(
        dictionary_path: &Path,
        index_path: &Path,
        index_settings: &IndexSettings,
    ) -> Result<Self, DictError> {
        let _span = debug_span!("open_dictionary", path = %dictionary_path.display()).entered();

        let dict_len = fs::metadata(dictionary_path)?.len();
        let dict_len = usize::try_from(dict_len)
            .ok()
            .filter(|&l| l <= MAX_DICT_LEN)
            .ok_or(DictError::TooLarge(dict_len))?;
        let rebuilt = match IndexTable::validate(index_path, dict_len) {
            Ok(()) => {
                debug!(index = %index_path.display(), "cached index is valid");
                false
            }
            Err(reason) => {
                info!(index = %index_path.display(), %reason, "rebuilding index");
                build_index_file(dictionary_path, index_path, index_settings)?;
                true
            }
        };
        Self::map(dictionary_path, index_path, rebuilt)
    }

    /// [`DictionaryHandle::open`] with the index cached in `cache_dir`.
    pub fn open_in(dictionary_path: &Path, cache_dir: &Path) -> Result<Self, DictError> {
        Self::open(dictionary_path, &index_path_for(cache_dir, dictionary_path))
    }

    /// Rebuild the index unconditionally, then open.
    pub fn rebuild(dictionary_path: &Path, index_path: &Path) -> Result<Self, DictError> {
        build_index_file(dictionary_path, index_path, &settings().index)?;
        Self::map(dictionary_path, index_path, true)
    }

    fn map(dictionary_path: &Path, index_path: &Path, rebuilt: bool) -> Result<Self, DictError> {
        let text = DictText::map(dictionary_path)?;
        let index = IndexTable::open(index_path)?;
        // The dictionary may have been replaced between validation and mapping.
        let expected = expected_header(text.len());
        if index.header() != expected {
            return Err(DictError::CorruptIndex(format!(
                "header {} does not match expected {expected} after mapping",
                index.header()
            )));
        }
        Ok(Self {
            text,
            index,
            rebuilt,
        })
    }

    pub fn text(&self) -> &DictText {
        &self.text
    }

    pub fn index(&self) -> &IndexTable {
        &self.index
    }

    pub fn engine(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.text, &self.index)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            dict_len: self.text.len(),
            entries: self.index.len(),
            rebuilt: self.rebuilt,
        }
    }

    /// All dictionary lines containing a token that starts with `query`.
    ///
    /// Blank queries and queries EUC-JP cannot represent match nothing.
    /// At most `query.max_results` lines are returned (0 = no limit).
    pub fn search(&self, query: &str) -> Vec<String> {
        let encoded = match encode_query(query) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                debug!(%e, "query skipped");
                return Vec::new();
            }
        };

        let mut lines = self.engine().find_matches(&encoded);
        let max_results = settings().query.max_results;
        if max_results > 0 {
            lines.truncate(max_results);
        }
        lines
    }
}

/// Trim and encode a query; `Ok(None)` for blank input.
fn encode_query(query: &str) -> Result<Option<Vec<u8>>, DictError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(None);
    }
    eucjp::encode(query)
        .map(|bytes| Some(bytes.into_owned()))
        .ok_or_else(|| DictError::Encoding(query.to_string()))
}

fn build_index_file(
    dictionary_path: &Path,
    index_path: &Path,
    index_settings: &IndexSettings,
) -> Result<(), DictError> {
    let text = DictText::load(dictionary_path)?;
    let capacity = index_settings.capacity_for(text.len());
    let table = IndexTable::build(&text, capacity)?;
    table.save(index_path)?;
    info!(
        index = %index_path.display(),
        entries = table.len(),
        "index written"
    );
    Ok(())
}
