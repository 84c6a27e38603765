use tracing::{debug, debug_span};

use super::text::DictText;
use super::DictError;
use crate::eucjp::{char_width, is_high, PRIORITY_MARKER};

/// Longest token prefix kept for classification and expansion. Longer runs
/// are still consumed in full.
pub const MAX_TOKEN_LEN: usize = 40;

fn starts_token(b: u8) -> bool {
    b.is_ascii_alphanumeric() || is_high(b) || b == PRIORITY_MARKER
}

fn continues_token(b: u8) -> bool {
    b.is_ascii_alphanumeric() || is_high(b) || b == b'-' || b == b'.'
}

/// Index slots being filled; slot 0 is reserved for the header.
struct Entries {
    slots: Vec<u32>,
    capacity: usize,
}

impl Entries {
    fn with_capacity(capacity: usize) -> Result<Self, DictError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity + 1)
            .map_err(|_| DictError::Allocation {
                bytes: (capacity + 1).saturating_mul(4),
            })?;
        slots.push(0);
        Ok(Self { slots, capacity })
    }

    fn push(&mut self, pos: usize) -> Result<(), DictError> {
        if self.slots.len() > self.capacity {
            return Err(DictError::IndexOverflow {
                capacity: self.capacity,
            });
        }
        // MAX_DICT_LEN keeps every position within u32.
        self.slots.push(pos as u32);
        Ok(())
    }

    /// Record the entries for one finished token starting at `start`.
    fn keep(&mut self, start: usize, token: &[u8]) -> Result<(), DictError> {
        let first = token[0];
        if !is_high(first) {
            let numeric_pair = token.len() == 2 && token[1].is_ascii_digit();
            if token.len() <= 2 && !numeric_pair {
                return Ok(());
            }
            self.push(start)?;
            if first == PRIORITY_MARKER {
                self.push(start + 1)?;
            }
            return Ok(());
        }

        // One entry per multi-byte character so each is searchable on its own.
        let mut i = 0;
        while i < token.len() {
            let b = token[i];
            let width = char_width(b);
            if is_high(b) {
                if i + width > token.len() {
                    break;
                }
                self.push(start + i)?;
            }
            i += width;
        }
        Ok(())
    }
}

/// Scan the dictionary and collect the unsorted index slots.
///
/// The returned vector has the reserved header slot at index 0 followed by
/// one offset per indexable token. Lines beginning with `#` are treated as
/// comments and skipped, so an entry whose key starts with `#` is never
/// searchable.
/// Fails with [`DictError::IndexOverflow`] once more than `capacity` offsets
/// would be recorded.
pub fn collect_entries(text: &DictText, capacity: usize) -> Result<Vec<u32>, DictError> {
    let _span = debug_span!("collect_entries", dict_len = text.len(), capacity).entered();

    let mut entries = Entries::with_capacity(capacity)?;
    let mut token = [0u8; MAX_TOKEN_LEN];
    let mut token_len = 0;
    let mut token_start: Option<usize> = None;

    // Position len + 1 is the closing newline sentinel, which ends any token.
    let end = text.len() + 1;
    let mut pos = 1;
    while pos <= end {
        let b = text.byte_at(pos);

        if let Some(start) = token_start {
            if continues_token(b) {
                if token_len < MAX_TOKEN_LEN {
                    token[token_len] = b;
                    token_len += 1;
                }
                pos += 1;
                continue;
            }
            entries.keep(start, &token[..token_len])?;
            token_start = None;
            token_len = 0;
        }

        if b == b'#' && text.byte_at(pos - 1) == b'\n' {
            while pos <= end && text.byte_at(pos) != b'\n' {
                pos += 1;
            }
            continue;
        }

        if starts_token(b) {
            token_start = Some(pos);
            token[0] = b;
            token_len = 1;
        }
        pos += 1;
    }

    debug!(entries = entries.slots.len() - 1);
    Ok(entries.slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eucjp;

    fn offsets(raw: &[u8]) -> Vec<u32> {
        let text = DictText::from_bytes(raw).unwrap();
        collect_entries(&text, raw.len() + 1).unwrap()[1..].to_vec()
    }

    fn euc(s: &str) -> Vec<u8> {
        eucjp::encode(s).unwrap().into_owned()
    }

    #[test]
    fn test_ascii_tokens() {
        // "AAA" at 1, "gloss1" at 6
        assert_eq!(offsets(b"AAA /gloss1/\n"), vec![1, 6]);
    }

    #[test]
    fn test_short_ascii_rejected() {
        assert!(offsets(b"a an /to/\n").is_empty());
    }

    #[test]
    fn test_numeric_pair_kept() {
        // "a1" kept, "1a" rejected, "xy" rejected
        assert_eq!(offsets(b"a1 1a xy\n"), vec![1]);
    }

    #[test]
    fn test_dash_and_dot_continue_tokens() {
        assert_eq!(offsets(b"e-mail etc. /x/\n"), vec![1, 8]);
    }

    #[test]
    fn test_priority_marker() {
        // "@abc" indexed at the marker and one byte later
        assert_eq!(offsets(b"x @abc\n"), vec![3, 4]);
    }

    #[test]
    fn test_priority_marker_splits_token() {
        // '@' does not continue a token, so it starts a new one
        assert_eq!(offsets(b"abc@def\n"), vec![1, 4, 5]);
    }

    #[test]
    fn test_multibyte_expansion() {
        let mut raw = euc("漢字");
        raw.extend_from_slice(b" /kanji/\n");
        assert_eq!(offsets(&raw), vec![1, 3, 7]);
    }

    #[test]
    fn test_single_kana_kept() {
        let raw = euc("あ /a/\n");
        assert_eq!(offsets(&raw), vec![1]);
    }

    #[test]
    fn test_three_byte_sequence_counted_once() {
        // 0x8F lead + two bytes, then あ
        let raw = [0x8F, 0xB0, 0xA1, 0xA4, 0xA2, b'\n'];
        assert_eq!(offsets(&raw), vec![1, 4]);
    }

    #[test]
    fn test_ascii_inside_multibyte_run_not_indexed() {
        let mut raw = euc("あ");
        raw.extend_from_slice(b"-");
        raw.extend_from_slice(&euc("い"));
        raw.push(b'\n');
        assert_eq!(offsets(&raw), vec![1, 4]);
    }

    #[test]
    fn test_long_token_truncated_but_consumed() {
        let mut raw = vec![b'a'; MAX_TOKEN_LEN + 10];
        raw.extend_from_slice(b" bcd\n");
        assert_eq!(offsets(&raw), vec![1, (MAX_TOKEN_LEN + 12) as u32]);
    }

    #[test]
    fn test_long_multibyte_run_expands_stored_prefix_only() {
        let raw = euc(&"あ".repeat(MAX_TOKEN_LEN));
        let got = offsets(&raw);
        assert_eq!(got.len(), MAX_TOKEN_LEN / 2);
        assert_eq!(got.last(), Some(&(MAX_TOKEN_LEN as u32 - 1)));
    }

    #[test]
    fn test_comment_lines_skipped() {
        assert_eq!(offsets(b"# comment line\nabc /x/\n"), vec![16]);
        // '#' only starts a comment at the beginning of a line
        assert_eq!(offsets(b"abc #def\n"), vec![1, 6]);
    }

    #[test]
    fn test_last_token_without_newline() {
        assert_eq!(offsets(b"abc def"), vec![1, 5]);
    }

    #[test]
    fn test_header_slot_reserved() {
        let text = DictText::from_bytes(b"abc\n").unwrap();
        let slots = collect_entries(&text, 4).unwrap();
        assert_eq!(slots, vec![0, 1]);
    }

    #[test]
    fn test_overflow() {
        let text = DictText::from_bytes(b"abc def ghi\n").unwrap();
        assert!(collect_entries(&text, 3).is_ok());
        assert!(matches!(
            collect_entries(&text, 2),
            Err(DictError::IndexOverflow { capacity: 2 })
        ));
    }
}
