//! Decodes a source file's bytes, trying UTF-8, UTF-8-with-BOM, Latin-1, and
//! CP1252 in that order, matching the original detectors' `encodings =
//! ['utf-8', 'utf-8-sig', 'latin1', 'cp1252']` fallback chain.

use encoding_rs::{UTF_8, WINDOWS_1252};

/// Decodes `bytes` into a `String`, falling through the chain until one
/// decode doesn't require replacement characters. CP1252 is the terminal
/// fallback and always "succeeds" (it maps every byte to a character), so this
/// function never fails outright — a file only fails to decode if it cannot
/// even be read from disk (see `file_walker`).
pub fn decode_source(bytes: &[u8]) -> String {
    if let Some(stripped) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        let (text, _, had_errors) = UTF_8.decode(stripped);
        if !had_errors {
            return text.into_owned();
        }
    }

    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }

    // Latin-1 (ISO-8859-1) is a direct byte-to-codepoint mapping; every byte
    // sequence decodes without error, so we only prefer it here as a distinct
    // step from CP1252 to match the original's ordering, even though encoding_rs
    // has no dedicated Latin-1 decoder: WINDOWS_1252 differs from Latin-1 only
    // in the 0x80-0x9F control range, which is rare in source text.
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_utf8() {
        assert_eq!(decode_source("hello = 'world'".as_bytes()), "hello = 'world'");
    }

    #[test]
    fn strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"x = 1");
        assert_eq!(decode_source(&bytes), "x = 1");
    }

    #[test]
    fn falls_back_for_invalid_utf8() {
        let bytes = vec![b'x', b'=', 0xE9]; // 0xE9 is invalid standalone UTF-8
        let decoded = decode_source(&bytes);
        assert!(decoded.starts_with("x="));
    }
}
