//! # Secure Messaging Layer
//!
//! The codec between [`Message`] values and the opaque sealed blobs that
//! actually cross the transport: JSON inside AES-256-GCM.
//!
//! ```text
//! Message --serde_json--> plaintext --encrypt--> nonce || ciphertext || tag
//! ```
//!
//! JSON as the inner wire format is a deliberate trade: the payloads are
//! chat-sized, both ends of a session run this crate, and a self-describing
//! format means a v2 device can add fields without breaking a v1 device
//! (serde ignores unknown keys on decode). Nobody is winning benchmarks
//! with a 200-byte text message.
//!
//! Everything in this module is pure computation over a caller-supplied
//! key. Looking the key up, holding locks, and talking to the transport
//! are the session manager's problems.

use thiserror::Error;

use crate::crypto::agreement::SharedKey;
use crate::crypto::encryption::{self, DecryptionError, EncryptionError};
use crate::message::Message;

/// Errors in the message sealing/opening pipeline.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The message could not be serialized. Practically unreachable for
    /// the current `Message` shape, but the pipeline stays honest.
    #[error("message serialization failed: {0}")]
    Serialize(serde_json::Error),

    /// Sealing failed in the encryption layer.
    #[error(transparent)]
    Encrypt(#[from] EncryptionError),

    /// The blob failed to decrypt: wrong key, tampering, or truncation.
    #[error(transparent)]
    Decrypt(#[from] DecryptionError),

    /// The blob decrypted cleanly but the plaintext is not a message.
    /// Authenticated garbage means the sender is buggy, not an attacker —
    /// a forger can't get past the GCM tag.
    #[error("decrypted payload is not a valid message: {0}")]
    MalformedMessage(serde_json::Error),
}

/// Seal a message for a peer under the shared session key.
pub fn seal_message(key: &SharedKey, message: &Message) -> Result<Vec<u8>, MessagingError> {
    let plaintext = serde_json::to_vec(message).map_err(MessagingError::Serialize)?;
    let blob = encryption::encrypt(key.as_bytes(), &plaintext)?;
    Ok(blob)
}

/// Open a sealed blob from a peer and parse the message inside.
///
/// Authentication precedes parsing: no byte of the payload is interpreted
/// until the GCM tag has verified.
pub fn open_message(key: &SharedKey, blob: &[u8]) -> Result<Message, MessagingError> {
    let plaintext = encryption::decrypt(key.as_bytes(), blob)?;
    let message = serde_json::from_slice(&plaintext).map_err(MessagingError::MalformedMessage)?;
    Ok(message)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
