//! Envelope wire format for encrypted credentials.
//!
//! ## Layout
//!
//! ```text
//! ┌────────────┬───────────┬──────────────────┬───────────┐
//! │    Salt    │    IV     │    Ciphertext    │    Tag    │
//! │  64 bytes  │  16 bytes │     N bytes      │  16 bytes │
//! └────────────┴───────────┴──────────────────┴───────────┘
//! ```
//!
//! The concatenation is base64-encoded (standard alphabet, padded) into the
//! single opaque string the record store holds. Stored data predates this
//! crate, so the layout carries no magic or version byte and must stay
//! byte-for-byte as above.

use crate::error::{CryptoError, CryptoResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// PBKDF2 salt length.
pub const SALT_LEN: usize = 64;

/// AES-GCM nonce length used by this format.
pub const IV_LEN: usize = 16;

/// AES-GCM authentication tag length.
pub const TAG_LEN: usize = 16;

const IV_OFFSET: usize = SALT_LEN; // 64
const CIPHERTEXT_OFFSET: usize = IV_OFFSET + IV_LEN; // 80

/// Smallest possible envelope: salt, iv and tag around an empty ciphertext.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN; // 96

/// One encrypted value, split into its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

impl Envelope {
    /// Serializes to `salt ‖ iv ‖ ciphertext ‖ tag`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_ENVELOPE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Splits raw envelope bytes into their parts.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::MalformedEnvelope` when fewer than
    /// [`MIN_ENVELOPE_LEN`] bytes are supplied.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < MIN_ENVELOPE_LEN {
            return Err(CryptoError::MalformedEnvelope(format!(
                "expected at least {MIN_ENVELOPE_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let tag_offset = bytes.len() - TAG_LEN;

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[..IV_OFFSET]);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&bytes[IV_OFFSET..CIPHERTEXT_OFFSET]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[tag_offset..]);

        Ok(Self {
            salt,
            iv,
            ciphertext: bytes[CIPHERTEXT_OFFSET..tag_offset].to_vec(),
            tag,
        })
    }

    /// Encodes the envelope as the stored base64 string.
    pub fn encode(&self) -> String {
        BASE64.encode(self.to_bytes())
    }

    /// Decodes a stored base64 string.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::MalformedEnvelope` if the string is not valid
    /// base64 or decodes to fewer than [`MIN_ENVELOPE_LEN`] bytes. No cipher
    /// work happens before these checks pass.
    pub fn decode(encoded: &str) -> CryptoResult<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::MalformedEnvelope(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }
}
