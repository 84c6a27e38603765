use std::cmp::Ordering;

use super::text::DictText;
use crate::eucjp::fold;

/// Number of bytes compared when ordering index entries.
pub const SORT_WINDOW: usize = 20;

/// Ordering used to sort the index.
///
/// Compares up to [`SORT_WINDOW`] folded bytes of the text at positions `a`
/// and `b`. The window runs past the end of the token itself; a NUL on both
/// sides ends the comparison.
pub fn compare_strict(text: &DictText, a: u32, b: u32) -> Ordering {
    let (a, b) = (a as usize, b as usize);
    for i in 0..SORT_WINDOW {
        let x = fold(text.byte_at(a + i), i);
        let y = fold(text.byte_at(b + i), i);
        if x != y {
            return x.cmp(&y);
        }
        if x == 0 {
            break;
        }
    }
    Ordering::Equal
}

/// Ordering of `query` against the text at `pos`, treating the query as a
/// prefix: once the query is exhausted the result is `Equal`, however the
/// candidate continues.
pub fn compare_prefix(query: &[u8], text: &DictText, pos: u32) -> Ordering {
    let pos = pos as usize;
    for (i, &q) in query.iter().enumerate() {
        let x = fold(q, i);
        let y = fold(text.byte_at(pos + i), i);
        if x != y {
            return x.cmp(&y);
        }
    }
    Ordering::Equal
}
