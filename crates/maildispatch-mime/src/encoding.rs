//! MIME encoding utilities.
//!
//! Supports Base64 bodies (RFC 2045) and RFC 2047 header encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Maximum line length for encoded bodies.
const MAX_LINE_LENGTH: usize = 76;

/// Maximum length of a single RFC 2047 encoded-word.
const MAX_ENCODED_WORD: usize = 75;

const WORD_PREFIX: &str = "=?utf-8?B?";
const WORD_SUFFIX: &str = "?=";

/// Encodes data as Base64 on a single line.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64, wrapped at 76 columns with CRLF line breaks.
///
/// The output ends with a line break unless it is empty.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2 + 2);

    // Base64 output is pure ASCII, so byte chunks are valid char boundaries.
    for chunk in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push_str("\r\n");
    }
    out
}

/// Returns true if a header value cannot be sent as-is.
#[must_use]
pub fn needs_encoding(text: &str) -> bool {
    !text.is_ascii() || text.contains("=?") || text.chars().any(|c| c.is_ascii_control())
}

/// Encodes a header value using RFC 2047 `B` encoding if needed.
///
/// Long values are split into several encoded-words (each at most 75
/// characters, never splitting a UTF-8 sequence) joined by folding
/// whitespace.
///
/// Format: `=?utf-8?B?encoded-text?=`
#[must_use]
pub fn encode_rfc2047(text: &str) -> String {
    if !needs_encoding(text) {
        return text.to_string();
    }

    // Every 3 input bytes become 4 output characters.
    let max_bytes = (MAX_ENCODED_WORD - WORD_PREFIX.len() - WORD_SUFFIX.len()) / 4 * 3;
    let word = |chunk: &str| {
        let encoded = encode_base64(chunk.as_bytes());
        format!("{WORD_PREFIX}{encoded}{WORD_SUFFIX}")
    };

    let mut words = Vec::new();
    let mut chunk = String::new();
    for ch in text.chars() {
        if chunk.len() + ch.len_utf8() > max_bytes {
            words.push(word(&chunk));
            chunk.clear();
        }
        chunk.push(ch);
    }
    if !chunk.is_empty() {
        words.push(word(&chunk));
    }

    words.join("\r\n ")
}

/// Renders a phrase (display name or filename) for use in a header.
///
/// Non-ASCII text is RFC 2047 encoded; ASCII text containing specials is
/// quoted with `"` and `\` escaped.
#[must_use]
pub fn encode_phrase(text: &str) -> String {
    if needs_encoding(text) {
        return encode_rfc2047(text);
    }

    let is_atom_text = |c: char| c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~ ".contains(c);
    if text.chars().all(is_atom_text) && !text.starts_with(' ') && !text.ends_with(' ') {
        return text.to_string();
    }
    quote(text)
}

/// Wraps text in double quotes, escaping `"` and `\`.
#[must_use]
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        if matches!(ch, '"' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}
