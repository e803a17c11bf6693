//! Single-byte-per-character text (ISO-8859-1).
//!
//! eLVL strings store one byte per character with no multi-byte sequences.
//! Every byte maps to the Unicode code point of the same value, so decoding
//! is total. Encoding is lossy only for characters above U+00FF, which become
//! `?`.

/// Replacement byte for characters that do not fit in one byte.
pub const REPLACEMENT: u8 = b'?';

/// Decodes bytes as ISO-8859-1.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encodes a string as ISO-8859-1, one byte per `char`.
///
/// Characters above U+00FF are replaced with [`REPLACEMENT`].
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars().map(latin1_byte).collect()
}

/// Returns `true` if every character of `text` fits in a single byte.
pub fn is_latin1(text: &str) -> bool {
    text.chars().all(|c| u32::from(c) <= 0xFF)
}

pub(crate) fn latin1_byte(c: char) -> u8 {
    u8::try_from(u32::from(c)).unwrap_or(REPLACEMENT)
}
