use memmap2::Mmap;

use super::collate::compare_strict;
use super::text::DictText;

const SLOT_SIZE: usize = 4;

/// Backing storage for index slots: either owned or memory-mapped.
pub(super) enum IndexStorage {
    Owned(Vec<u32>),
    /// Raw index file; length validated to be a non-zero multiple of 4.
    Mapped(Mmap),
}

/// Sorted token offsets into a [`DictText`].
///
/// Slot 0 holds the file header; slots `1..=len()` hold offsets in
/// ascending collation order.
pub struct IndexTable {
    pub(super) storage: IndexStorage,
}

impl IndexTable {
    pub(super) fn from_slots(slots: Vec<u32>) -> Self {
        Self {
            storage: IndexStorage::Owned(slots),
        }
    }

    fn slot(&self, i: usize) -> Option<u32> {
        match &self.storage {
            IndexStorage::Owned(slots) => slots.get(i).copied(),
            IndexStorage::Mapped(mmap) => {
                let at = i.checked_mul(SLOT_SIZE)?;
                mmap.get(at..at.checked_add(SLOT_SIZE)?)
                    .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            }
        }
    }

    /// Header value stored in slot 0.
    pub fn header(&self) -> u32 {
        self.slot(0).unwrap_or(0)
    }

    /// Number of offsets (slot 0 excluded).
    pub fn len(&self) -> usize {
        match &self.storage {
            IndexStorage::Owned(slots) => slots.len().saturating_sub(1),
            IndexStorage::Mapped(mmap) => (mmap.len() / SLOT_SIZE).saturating_sub(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset stored in `slot` (1-based); `None` outside `1..=len()`.
    pub fn entry(&self, slot: usize) -> Option<u32> {
        if slot == 0 {
            return None;
        }
        self.slot(slot)
    }

    /// All offsets in slot order.
    pub fn offsets(&self) -> impl Iterator<Item = u32> + '_ {
        (1..=self.len()).filter_map(move |i| self.slot(i))
    }

    /// Check the sort invariant against `text`.
    pub fn is_sorted(&self, text: &DictText) -> bool {
        let mut prev: Option<u32> = None;
        for cur in self.offsets() {
            if let Some(p) = prev {
                if compare_strict(text, p, cur).is_gt() {
                    return false;
                }
            }
            prev = Some(cur);
        }
        true
    }

    /// Serialize header and offsets as native-endian `u32`s.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.storage {
            IndexStorage::Owned(slots) => {
                let mut buf = Vec::with_capacity(slots.len() * SLOT_SIZE);
                for &slot in slots {
                    buf.extend_from_slice(&slot.to_ne_bytes());
                }
                buf
            }
            IndexStorage::Mapped(mmap) => mmap.to_vec(),
        }
    }
}
