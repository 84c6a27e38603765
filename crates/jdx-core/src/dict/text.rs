use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;

use super::index_io::FORMAT_VERSION;
use super::DictError;

/// Zero bytes appended after the closing sentinel of a loaded dictionary.
pub const RIGHT_PADDING: usize = 100;

/// Largest dictionary whose positions and header still fit in a `u32`.
pub const MAX_DICT_LEN: usize = (u32::MAX - FORMAT_VERSION - 2) as usize;

/// Backing storage for dictionary bytes: either a padded buffer or a mapping
/// of the raw file.
enum TextStorage {
    /// `[b'\n', file bytes.., b'\n', 0 * RIGHT_PADDING]`
    Owned(Vec<u8>),
    Mapped(Mmap),
}

/// Raw dictionary text addressed by 1-based positions.
///
/// Position 0 and position `len + 1` always read as `b'\n'`, and anything
/// past that reads as NUL, for both storage kinds. Every scan over the text
/// goes through [`DictText::byte_at`], so it always finds a separator
/// before running off either end.
pub struct DictText {
    len: usize,
    storage: TextStorage,
}

impl DictText {
    /// Read a whole dictionary file into a sentinel-padded buffer.
    pub fn load(path: &Path) -> Result<Self, DictError> {
        let mut file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let len = checked_len(file_len)?;

        let mut buf = Vec::new();
        let bytes = len + 2 + RIGHT_PADDING;
        buf.try_reserve_exact(bytes)
            .map_err(|_| DictError::Allocation { bytes })?;
        buf.push(b'\n');
        file.read_to_end(&mut buf)?;

        // The file may have grown since the stat; trust what was read.
        let len = checked_len((buf.len() - 1) as u64)?;
        buf.push(b'\n');
        buf.resize(len + 2 + RIGHT_PADDING, 0);

        Ok(Self {
            len,
            storage: TextStorage::Owned(buf),
        })
    }

    /// Build an in-memory dictionary from raw EUC-JP bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        let len = checked_len(data.len() as u64)?;
        let mut buf = Vec::new();
        let bytes = len + 2 + RIGHT_PADDING;
        buf.try_reserve_exact(bytes)
            .map_err(|_| DictError::Allocation { bytes })?;
        buf.push(b'\n');
        buf.extend_from_slice(data);
        buf.push(b'\n');
        buf.resize(bytes, 0);
        Ok(Self {
            len,
            storage: TextStorage::Owned(buf),
        })
    }

    /// Map a dictionary file read-only.
    pub(crate) fn map(path: &Path) -> Result<Self, DictError> {
        let file = File::open(path)?;
        let len = checked_len(file.metadata()?.len())?;
        if len == 0 {
            return Self::from_bytes(&[]);
        }
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // Dictionaries are replaced wholesale, never edited in place while a
        // handle is open.
        let mmap = unsafe { Mmap::map(&file)? };
        let len = checked_len(mmap.len() as u64)?;
        Ok(Self {
            len,
            storage: TextStorage::Mapped(mmap),
        })
    }

    /// Length of the dictionary file in bytes (sentinels excluded).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte at 1-based position `pos`.
    #[inline]
    pub fn byte_at(&self, pos: usize) -> u8 {
        match &self.storage {
            TextStorage::Owned(buf) => buf.get(pos).copied().unwrap_or(0),
            TextStorage::Mapped(mmap) => match pos {
                0 => b'\n',
                p if p <= self.len => mmap[p - 1],
                p if p == self.len + 1 => b'\n',
                _ => 0,
            },
        }
    }

    /// File bytes for positions `start..=end`, clipped to the file.
    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        let start = start.max(1);
        let end = end.min(self.len);
        if start > end {
            return &[];
        }
        match &self.storage {
            TextStorage::Owned(buf) => &buf[start..=end],
            TextStorage::Mapped(mmap) => &mmap[start - 1..end],
        }
    }

    /// Position of the first byte of the line containing `pos`.
    pub fn line_start(&self, pos: usize) -> usize {
        let mut p = pos.min(self.len + 1);
        while p > 0 && self.byte_at(p - 1) != b'\n' {
            p -= 1;
        }
        p
    }

    /// The line starting at `start`, through its newline (or NUL) if the
    /// file contains one.
    pub fn line(&self, start: usize) -> &[u8] {
        let mut end = start;
        while end <= self.len && !matches!(self.byte_at(end), b'\n' | 0) {
            end += 1;
        }
        self.slice(start, end)
    }
}

fn checked_len(len: u64) -> Result<usize, DictError> {
    usize::try_from(len)
        .ok()
        .filter(|&l| l <= MAX_DICT_LEN)
        .ok_or(DictError::TooLarge(len))
}
