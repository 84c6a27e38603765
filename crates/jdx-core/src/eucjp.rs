//! Byte-level classification and conversion for EUC-JP text.
//!
//! Dictionary files are EUC-JP: 0x00..=0x7F is ASCII, any byte with the high
//! bit set belongs to a two-byte sequence, and the 0x8F lead introduces a
//! three-byte JIS X 0212 sequence (supplementary kanji).

use std::borrow::Cow;

use encoding_rs::EUC_JP;

/// Lead byte of a three-byte JIS X 0212 sequence.
pub const SS3: u8 = 0x8F;

/// Lead byte of the hiragana row (あ = A4 A2).
pub const HIRAGANA_LEAD: u8 = 0xA4;

/// Lead byte of the katakana row (ア = A5 A2).
pub const KATAKANA_LEAD: u8 = 0xA5;

/// Marks a promoted dictionary token; indexed with and without the marker.
pub const PRIORITY_MARKER: u8 = b'@';

pub fn is_high(b: u8) -> bool {
    b & 0x80 != 0
}

/// Width in bytes of the character introduced by lead byte `b`.
pub fn char_width(b: u8) -> usize {
    match b {
        SS3 => 3,
        b if is_high(b) => 2,
        _ => 1,
    }
}

/// Fold one byte for collation.
///
/// `pos` is the byte position inside the compared string. Katakana leads on
/// even positions fold onto hiragana; ASCII letters fold to lowercase.
pub fn fold(b: u8, pos: usize) -> u8 {
    if pos % 2 == 0 && b == KATAKANA_LEAD {
        HIRAGANA_LEAD
    } else {
        b.to_ascii_lowercase()
    }
}

/// Encode a query string to EUC-JP.
///
/// Returns `None` if the text contains characters EUC-JP cannot represent.
pub fn encode(text: &str) -> Option<Cow<'_, [u8]>> {
    let (bytes, _, had_errors) = EUC_JP.encode(text);
    if had_errors {
        None
    } else {
        Some(bytes)
    }
}

/// Decode an EUC-JP byte span. Malformed sequences become U+FFFD; the flag
/// reports whether any replacement happened.
pub fn decode(bytes: &[u8]) -> (String, bool) {
    let (text, had_errors) = EUC_JP.decode_without_bom_handling(bytes);
    (text.into_owned(), had_errors)
}
