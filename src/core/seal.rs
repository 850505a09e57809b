//! Anonymous sealed-box encryption of secret values for a consumer's public key.

use crate::constants;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crypto_box::aead::OsRng;
use crypto_box::PublicKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SealError {
    #[error("public key is not valid base64: {0}")]
    KeyEncoding(#[from] base64::DecodeError),
    #[error("public key must be {expected} bytes, got {actual}")]
    KeyLength { expected: usize, actual: usize },
    #[error("sealing failed")]
    Seal,
}

/// Seal `plaintext` for the base64-encoded X25519 `public_key`; returns base64 ciphertext.
pub fn seal_base64(public_key: &str, plaintext: &[u8]) -> Result<String, SealError> {
    let raw = STANDARD.decode(public_key.trim())?;
    let bytes: [u8; constants::PUBLIC_KEY_LEN] =
        raw.as_slice().try_into().map_err(|_| SealError::KeyLength {
            expected: constants::PUBLIC_KEY_LEN,
            actual: raw.len(),
        })?;
    let sealed = PublicKey::from(bytes)
        .seal(&mut OsRng, plaintext)
        .map_err(|_| SealError::Seal)?;
    Ok(STANDARD.encode(sealed))
}
