use std::cmp::Ordering;

use tracing::{debug, debug_span, warn};

use super::collate::{compare_prefix, SORT_WINDOW};
use super::index::IndexTable;
use super::text::DictText;
use crate::eucjp;

/// Read-only prefix search over a dictionary and its sorted index.
///
/// Holds no state of its own; every call is independent.
#[derive(Clone, Copy)]
pub struct QueryEngine<'a> {
    text: &'a DictText,
    index: &'a IndexTable,
}

impl<'a> QueryEngine<'a> {
    pub fn new(text: &'a DictText, index: &'a IndexTable) -> Self {
        Self { text, index }
    }

    fn compare_slot(&self, query: &[u8], slot: usize) -> Ordering {
        match self.index.entry(slot) {
            Some(pos) => compare_prefix(query, self.text, pos),
            // Unreachable for in-range slots; sorts after everything.
            None => Ordering::Less,
        }
    }

    /// First index slot whose token has `query` (EUC-JP) as a prefix.
    ///
    /// Binary search until some slot matches, then walk backwards over the
    /// preceding matches. Only the first [`SORT_WINDOW`] bytes of the query
    /// take part, since the index is ordered on no more than that.
    pub fn find_first_match(&self, query: &[u8]) -> Option<usize> {
        let key = &query[..query.len().min(SORT_WINDOW)];
        if key.is_empty() || self.index.is_empty() {
            return None;
        }

        let mut low = 1;
        let mut high = self.index.len();
        let mut found = None;
        while low <= high {
            let mid = low + (high - low) / 2;
            match self.compare_slot(key, mid) {
                Ordering::Less => high = mid - 1,
                Ordering::Greater => low = mid + 1,
                Ordering::Equal => {
                    found = Some(mid);
                    break;
                }
            }
        }

        let mut slot = found?;
        while slot > 1 && self.compare_slot(key, slot - 1) == Ordering::Equal {
            slot -= 1;
        }
        Some(slot)
    }

    /// Start positions of every line containing a token prefixed by
    /// `query`, ascending and without duplicates.
    pub fn find_line_starts(&self, query: &[u8]) -> Vec<usize> {
        let Some(first) = self.find_first_match(query) else {
            return Vec::new();
        };
        let key = &query[..query.len().min(SORT_WINDOW)];

        let mut starts = Vec::new();
        let mut slot = first;
        while slot <= self.index.len() && self.compare_slot(key, slot) == Ordering::Equal {
            if let Some(pos) = self.index.entry(slot) {
                // Queries longer than the sort window are checked in full here.
                if key.len() == query.len()
                    || compare_prefix(query, self.text, pos) == Ordering::Equal
                {
                    starts.push(self.text.line_start(pos as usize));
                }
            }
            slot += 1;
        }

        starts.sort_unstable();
        starts.dedup();
        starts
    }

    /// Every dictionary line containing a token prefixed by `query`, decoded
    /// from EUC-JP, in file order. Lines keep their trailing newline.
    pub fn find_matches(&self, query: &[u8]) -> Vec<String> {
        let _span = debug_span!("find_matches", query_len = query.len()).entered();

        let starts = self.find_line_starts(query);
        let mut lines = Vec::with_capacity(starts.len());
        for start in starts {
            let (line, replaced) = eucjp::decode(self.text.line(start));
            if replaced {
                warn!(offset = start, "undecodable bytes replaced in result line");
            }
            lines.push(line);
        }
        debug!(results = lines.len());
        lines
    }
}
