//! URL-safe base64 alphabet transform
//!
//! Standard base64 uses `+`, `/` and `=` padding, all of which need escaping
//! in a query string. Share links carry `-` and `_` instead and drop the
//! padding; these helpers convert between the two forms.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Converts standard base64 to the URL-safe, unpadded form
pub fn to_url_safe(standard: &str) -> String {
    standard
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}

/// Converts URL-safe base64 back to standard base64 with padding restored
pub fn from_url_safe(url_safe: &str) -> String {
    let mut standard: String = url_safe
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while standard.len() % 4 != 0 {
        standard.push('=');
    }
    standard
}

/// Encodes bytes straight to URL-safe base64
pub fn encode(bytes: &[u8]) -> String {
    to_url_safe(&STANDARD.encode(bytes))
}

/// Decodes URL-safe base64, with or without padding
pub fn decode(url_safe: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(from_url_safe(url_safe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_unsafe_characters() {
        assert_eq!(to_url_safe("ab+/cd=="), "ab-_cd");
        assert_eq!(from_url_safe("ab-_cd"), "ab+/cd==");
    }

    #[test]
    fn restores_padding_to_multiple_of_four() {
        assert_eq!(from_url_safe("YQ"), "YQ==");
        assert_eq!(from_url_safe("YWI"), "YWI=");
        assert_eq!(from_url_safe("YWJj"), "YWJj");
        assert_eq!(from_url_safe(""), "");
    }

    #[test]
    fn keeps_existing_padding() {
        assert_eq!(from_url_safe("YQ=="), "YQ==");
    }

    #[test]
    fn output_is_url_safe() {
        // 0xfb 0xff produces both '+' and '/' in standard base64
        let bytes = [0xfbu8, 0xff, 0xbf, 0x00, 0x3e];
        let encoded = encode(&bytes);

        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode("***").is_err());
        assert!(decode("A").is_err());
    }
}
