//! # AES-256-GCM Encryption
//!
//! Authenticated encryption for Nearlink message payloads. Every byte that
//! crosses the proximity transport after a handshake goes through here.
//!
//! We use AES-256-GCM (Galois/Counter Mode) because:
//!
//! - It's an AEAD cipher — authentication and encryption in one operation.
//!   No "encrypt-then-MAC" vs "MAC-then-encrypt" debates. It just works.
//! - AES-NI hardware acceleration is available on every modern x86 CPU and
//!   most ARM chips. Performance is essentially free.
//! - 256-bit keys provide a comfortable security margin, and the HKDF step
//!   in the handshake hands us exactly 32 uniform bytes.
//!
//! ## Nonce management
//!
//! GCM is notoriously unforgiving about nonce reuse. If you encrypt two
//! different messages with the same key and nonce, an attacker can recover
//! the XOR of the plaintexts AND forge authentication tags. Game over.
//!
//! Our strategy: random 96-bit nonces from a CSPRNG, generated inside
//! `encrypt()`. Callers cannot supply a nonce — the API makes reuse
//! structurally impossible rather than merely discouraged. The birthday
//! bound for 96-bit random nonces is ~2^48 messages per key; session keys
//! live for one process run between two phones, so we're nowhere close.
//!
//! ## Wire format
//!
//! `encrypt()` returns `nonce || ciphertext || tag` as a single `Vec<u8>`:
//! a 12-byte nonce prefix, the ciphertext, and the 16-byte GCM tag that
//! aes-gcm appends. `decrypt()` expects the same layout, so a sealed blob
//! is never shorter than 28 bytes.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use thiserror::Error;

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH, AES_TAG_LENGTH};

/// Errors while sealing a payload.
///
/// With a correctly-sized key and an in-memory plaintext, sealing is
/// practically infallible — this exists so the signature stays honest
/// rather than hiding a panic.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,
}

/// Errors while opening a sealed blob.
///
/// We intentionally keep these vague. The difference between "wrong key",
/// "flipped ciphertext bit", and "truncated tag" is none of the sender's
/// business — every tampering path collapses into `AuthenticationFailed`.
#[derive(Debug, Error)]
pub enum DecryptionError {
    #[error("sealed blob too short: must be at least {} bytes", AES_NONCE_LENGTH + AES_TAG_LENGTH)]
    TooShort,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    AuthenticationFailed,
}

/// Encrypt plaintext with AES-256-GCM under a fresh random nonce.
///
/// Returns `nonce || ciphertext || tag` as a single `Vec<u8>`. The nonce is
/// drawn from `OsRng` inside this function; there is deliberately no way for
/// a caller to pick one.
///
/// # Example
///
/// ```
/// use nearlink_protocol::crypto::encryption::{encrypt, decrypt};
///
/// let key = [0x42u8; 32]; // In real code, use a derived session key!
/// let sealed = encrypt(&key, b"meet me at the coffee cart").unwrap();
/// let recovered = decrypt(&key, &sealed).unwrap();
/// assert_eq!(recovered, b"meet me at the coffee cart");
/// ```
pub fn encrypt(key: &[u8; AES_KEY_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::EncryptFailed)?;

    // Random 96-bit nonce. This is the standard GCM nonce size and the only
    // one you should use.
    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| EncryptionError::EncryptFailed)?;

    // Pack nonce || ciphertext into one buffer so the caller never manages
    // the nonce separately.
    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a blob previously produced by [`encrypt`].
///
/// Expects the `nonce || ciphertext || tag` layout. Plaintext is only ever
/// returned after the GCM tag verifies — there is no "decrypt without
/// authenticating" path in this module, and there never will be.
///
/// # Errors
///
/// - [`DecryptionError::TooShort`] if the blob can't even contain a nonce
///   and a tag.
/// - [`DecryptionError::AuthenticationFailed`] for everything else: wrong
///   key, modified bytes, truncation past the length check. We don't
///   distinguish between these cases on purpose.
pub fn decrypt(key: &[u8; AES_KEY_LENGTH], data: &[u8]) -> Result<Vec<u8>, DecryptionError> {
    // A valid blob is at minimum nonce + tag (empty plaintext).
    if data.len() < AES_NONCE_LENGTH + AES_TAG_LENGTH {
        return Err(DecryptionError::TooShort);
    }

    let (nonce_bytes, ciphertext) = data.split_at(AES_NONCE_LENGTH);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| DecryptionError::AuthenticationFailed)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| DecryptionError::AuthenticationFailed)
}
