//! Base32 text armoring for ciphertext blobs
//!
//! Encrypted blobs are raw bytes; armoring turns them into terminal- and
//! file-safe text. The armored form is plain RFC 4648 base32 (standard
//! alphabet, padded) with no prefix or framing, interoperable with blobs
//! written by the older tools.

use crate::error::{ErrorCategory, ErrorKind, KeyboxError, Result};
use data_encoding::BASE32;

/// Wrap bytes in armor, returning the armored string.
pub fn wrap(body: &[u8]) -> String {
    BASE32.encode(body)
}

/// Unwrap an armored string, returning the original bytes.
///
/// Surrounding ASCII whitespace is tolerated; anything else that is not
/// valid base32 fails with `ArmorInvalid`.
pub fn unwrap(armored: &str) -> Result<Vec<u8>> {
    BASE32.decode(armored.trim().as_bytes()).map_err(|e| {
        KeyboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::ArmorInvalid,
            format!("base32 decoding of ciphertext failed: {e}"),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bytes() {
        let bytes = b"";
        let armored = wrap(bytes);
        let unwrapped = unwrap(&armored).unwrap();
        assert_eq!(bytes, &unwrapped[..]);
    }

    #[test]
    fn test_simple_bytes() {
        let bytes = b"test";
        let armored = wrap(bytes);
        let unwrapped = unwrap(&armored).unwrap();
        assert_eq!(bytes, &unwrapped[..]);
    }

    #[test]
    fn test_exact_output() {
        // Matches Go's base32.StdEncoding for the same input.
        let bytes: Vec<u8> = (0..16).collect();
        assert_eq!(wrap(&bytes), "AAAQEAYEAUDAOCAJBIFQYDIOB4======");
    }

    #[test]
    fn test_large_data() {
        let bytes = vec![0x42u8; 100_000];
        let armored = wrap(&bytes);
        let unwrapped = unwrap(&armored).unwrap();
        assert_eq!(bytes, unwrapped);
    }

    #[test]
    fn test_all_byte_values() {
        let bytes: Vec<u8> = (0..=255).collect();
        let armored = wrap(&bytes);
        let unwrapped = unwrap(&armored).unwrap();
        assert_eq!(bytes, unwrapped);
    }

    #[test]
    fn test_trailing_newline_tolerated() {
        let armored = format!("{}\n", wrap(b"payload"));
        assert_eq!(unwrap(&armored).unwrap(), b"payload");
    }

    #[test]
    fn test_bad_input() {
        let err = unwrap("not base32 at all!").expect_err("expected decode error");
        assert_eq!(err.kind, Some(ErrorKind::ArmorInvalid));
    }

    #[test]
    fn test_no_whitespace_in_output() {
        let armored = wrap(&[0xFFu8; 100]);
        assert!(!armored.contains(' '));
        assert!(!armored.contains('\n'));
    }
}
