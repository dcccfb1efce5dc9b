//! AES-256-GCM encryption of a single credential string.
//!
//! Every call derives a fresh per-value key with PBKDF2-HMAC-SHA256 from the
//! master key and a random 64-byte salt, then encrypts under a random 16-byte
//! IV. Encrypting the same plaintext twice never yields the same envelope.

use crate::envelope::{Envelope, IV_LEN, SALT_LEN, TAG_LEN};
use crate::error::{CryptoError, CryptoResult};
use crate::key::MasterKey;
use aes_gcm::AesGcm;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use pbkdf2::pbkdf2_hmac;
use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use zeroize::Zeroizing;

/// PBKDF2 iteration count. Fixed by the stored data format.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derived AES-256 key length.
pub const DERIVED_KEY_LEN: usize = 32;

/// AES-256-GCM with the 16-byte nonce this format uses.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Stretches the master key with a per-value salt into an AES-256 key.
pub(crate) fn derive_key(master: &MasterKey, salt: &[u8]) -> Zeroizing<[u8; DERIVED_KEY_LEN]> {
    let mut out = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    pbkdf2_hmac::<Sha256>(master.expose_secret(), salt, PBKDF2_ITERATIONS, &mut out[..]);
    out
}

fn fill_random(buf: &mut [u8]) -> CryptoResult<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::RandomFailure(e.to_string()))
}

/// Encrypts `plaintext` into an [`Envelope`].
pub fn seal(plaintext: &str, key: &MasterKey) -> CryptoResult<Envelope> {
    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    fill_random(&mut salt)?;
    fill_random(&mut iv)?;

    let derived = derive_key(key, &salt);
    let cipher = Aes256Gcm16::new(GenericArray::from_slice(&derived[..]));

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut buffer)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(Envelope {
        salt,
        iv,
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

/// Decrypts an [`Envelope`] and checks its authentication tag.
///
/// # Errors
///
/// Returns `CryptoError::Decryption` if the tag does not verify under `key`
/// (wrong key, or tampered data) or the recovered bytes are not UTF-8.
pub fn open(envelope: &Envelope, key: &MasterKey) -> CryptoResult<String> {
    let derived = derive_key(key, &envelope.salt);
    let cipher = Aes256Gcm16::new(GenericArray::from_slice(&derived[..]));

    let mut buffer = Zeroizing::new(envelope.ciphertext.clone());
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&envelope.iv),
            b"",
            buffer.as_mut_slice(),
            GenericArray::from_slice(&envelope.tag),
        )
        .map_err(|_| {
            CryptoError::Decryption("authentication failed (wrong key or tampered data)".to_string())
        })?;

    String::from_utf8(std::mem::take(&mut *buffer))
        .map_err(|_| CryptoError::Decryption("plaintext is not valid UTF-8".to_string()))
}

/// Encrypts a credential into its stored base64 form.
///
/// The empty string encrypts to the empty string.
pub fn encrypt(plaintext: &str, key: &MasterKey) -> CryptoResult<String> {
    if plaintext.is_empty() {
        return Ok(String::new());
    }
    Ok(seal(plaintext, key)?.encode())
}

/// Decrypts a stored base64 envelope.
///
/// The empty string decrypts to the empty string.
///
/// # Errors
///
/// `CryptoError::MalformedEnvelope` if the value cannot be decoded into an
/// envelope, `CryptoError::Decryption` if it does not authenticate.
pub fn decrypt(encoded: &str, key: &MasterKey) -> CryptoResult<String> {
    if encoded.is_empty() {
        return Ok(String::new());
    }
    let envelope = Envelope::decode(encoded)?;
    open(&envelope, key)
}
