use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, debug_span};

use super::collate::compare_strict;
use super::index::{IndexStorage, IndexTable};
use super::sort::quicksort;
use super::text::DictText;
use super::tokenizer::collect_entries;
use super::DictError;

/// Bumped whenever the meaning of index entries changes, so that index
/// files written by another builder version fail validation.
pub const FORMAT_VERSION: u32 = 14;

const HEADER_SIZE: usize = 4;

/// Header value an index for a dictionary of `dict_len` bytes must carry.
pub fn expected_header(dict_len: usize) -> u32 {
    // MAX_DICT_LEN guarantees this fits.
    dict_len as u32 + 1 + FORMAT_VERSION
}

impl IndexTable {
    /// Tokenize, sort and stamp the header for `text`.
    pub fn build(text: &DictText, capacity: usize) -> Result<Self, DictError> {
        let _span = debug_span!("build_index", dict_len = text.len(), capacity).entered();

        let mut slots = collect_entries(text, capacity)?;
        quicksort(&mut slots[1..], &mut |a: &u32, b: &u32| {
            compare_strict(text, *a, *b)
        });
        slots[0] = expected_header(text.len());

        debug!(entries = slots.len() - 1, "index sorted");
        Ok(Self::from_slots(slots))
    }

    /// Atomic write: write to a sibling temp file then rename.
    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension(tmp_extension(path));
        fs::write(&tmp, self.to_bytes())?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Check that the index file at `path` was built for a dictionary of
    /// `dict_len` bytes by this format version. Only the header is read.
    pub fn validate(path: &Path, dict_len: usize) -> Result<(), DictError> {
        let mut file = File::open(path)?;
        let file_len = file.metadata()?.len();
        if file_len < HEADER_SIZE as u64 || file_len % HEADER_SIZE as u64 != 0 {
            return Err(DictError::CorruptIndex(format!(
                "file length {file_len} is not a whole number of slots"
            )));
        }

        let mut header = [0u8; HEADER_SIZE];
        match file.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(DictError::CorruptIndex("truncated header".into()));
            }
            Err(e) => return Err(e.into()),
        }

        let found = u32::from_ne_bytes(header);
        let expected = expected_header(dict_len);
        if found != expected {
            return Err(DictError::CorruptIndex(format!(
                "header {found} does not match expected {expected}"
            )));
        }
        Ok(())
    }

    /// Map an index file read-only. The header is not checked here; see
    /// [`IndexTable::validate`].
    pub fn open(path: &Path) -> Result<Self, DictError> {
        let file = File::open(path)?;
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // Index files are only ever replaced by rename, never rewritten in place.
        let mmap = unsafe { Mmap::map(&file)? };
        if mmap.len() < HEADER_SIZE || mmap.len() % HEADER_SIZE != 0 {
            return Err(DictError::CorruptIndex(format!(
                "file length {} is not a whole number of slots",
                mmap.len()
            )));
        }
        Ok(Self {
            storage: IndexStorage::Mapped(mmap),
        })
    }
}

fn tmp_extension(path: &Path) -> String {
    match path.extension() {
        Some(ext) => format!("{}.tmp", ext.to_string_lossy()),
        None => "tmp".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_header() {
        assert_eq!(expected_header(0), 1 + FORMAT_VERSION);
        assert_eq!(expected_header(100), 101 + FORMAT_VERSION);
    }

    #[test]
    fn test_build_sorts_and_stamps_header() {
        let text = DictText::from_bytes(b"ccc /bbb/\naaa\n").unwrap();
        let table = IndexTable::build(&text, 16).unwrap();
        assert_eq!(table.header(), expected_header(text.len()));
        assert_eq!(table.offsets().collect::<Vec<_>>(), vec![11, 6, 1]);
        assert!(table.is_sorted(&text));
    }

    #[test]
    fn test_save_open_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.jdx");
        let text = DictText::from_bytes(b"zeta alpha /mid/\n").unwrap();
        let built = IndexTable::build(&text, 16).unwrap();
        built.save(&path).unwrap();

        assert!(!dir.path().join("dict.jdx.tmp").exists());
        IndexTable::validate(&path, text.len()).unwrap();
        let opened = IndexTable::open(&path).unwrap();
        assert_eq!(opened.to_bytes(), built.to_bytes());
        assert_eq!(
            opened.offsets().collect::<Vec<_>>(),
            built.offsets().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_validate_rejects_other_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.jdx");
        let text = DictText::from_bytes(b"abc\n").unwrap();
        IndexTable::build(&text, 4).unwrap().save(&path).unwrap();

        assert!(matches!(
            IndexTable::validate(&path, text.len() + 1),
            Err(DictError::CorruptIndex(_))
        ));
    }

    #[test]
    fn test_validate_rejects_other_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.jdx");
        let stale = expected_header(4) - 1;
        fs::write(&path, stale.to_ne_bytes()).unwrap();
        assert!(matches!(
            IndexTable::validate(&path, 4),
            Err(DictError::CorruptIndex(_))
        ));
    }

    #[test]
    fn test_validate_rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.jdx");
        fs::write(&path, [1u8, 2]).unwrap();
        assert!(matches!(
            IndexTable::validate(&path, 4),
            Err(DictError::CorruptIndex(_))
        ));
        assert!(matches!(
            IndexTable::open(&path),
            Err(DictError::CorruptIndex(_))
        ));
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            IndexTable::validate(&dir.path().join("none.jdx"), 4),
            Err(DictError::Io(_))
        ));
    }
}
