//! Heuristic check for "is this stored value already an envelope?".
//!
//! Stored envelopes carry no marker, so classification relies on shape alone:
//! anything under 50 characters is treated as a plaintext credential (the
//! smallest envelope is 96 raw bytes, 128 base64 characters), and longer
//! values must be padded standard base64.
//!
//! A long plaintext secret that happens to be base64-shaped is misread as
//! encrypted. Decryption then fails and the caller sees a key mismatch rather
//! than a silently skipped value.

/// Values shorter than this are always plaintext.
pub const MIN_ENCRYPTED_CHARS: usize = 50;

/// Returns true if `value` has the shape of a base64 envelope.
pub fn looks_encrypted(value: &str) -> bool {
    if value.chars().count() < MIN_ENCRYPTED_CHARS {
        return false;
    }
    if value.len() % 4 != 0 {
        return false;
    }

    let body = value.trim_end_matches('=');
    if value.len() - body.len() > 2 {
        return false;
    }

    body.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}
