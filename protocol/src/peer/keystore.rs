//! # Device Key Store
//!
//! One place that owns both halves of a device's cryptographic material:
//! the long-term Ed25519 identity keypair and the per-process X25519
//! session keypair. The session manager holds exactly one of these.
//!
//! There is no rotation API on purpose. Peers recognize a device by its
//! identity key and verify it through the safety code; swapping keys under
//! a live session would invalidate every code already compared. A fresh
//! `KeyStore` only ever comes from a fresh manager, which is the restart
//! path.

use crate::crypto::agreement::SessionKeypair;
use crate::crypto::keys::{DeviceKeypair, DeviceSignature};

/// Holds the device identity and session keypairs for one protocol instance.
///
/// Secrets never leave this struct: callers get public key bytes, signing,
/// and verification, while the session secret is reachable only inside the
/// crate for handshake derivation.
pub struct KeyStore {
    /// Long-term Ed25519 identity. Advertised and fed into safety codes.
    identity: DeviceKeypair,
    /// Per-process X25519 session keypair. Attached to invitations.
    session: SessionKeypair,
}

impl KeyStore {
    /// Generate a complete key store with fresh identity and session keys.
    pub fn new() -> Self {
        Self {
            identity: DeviceKeypair::generate(),
            session: SessionKeypair::generate(),
        }
    }

    /// The raw identity public key bytes, as advertised to nearby peers.
    pub fn identity_public_key(&self) -> [u8; 32] {
        self.identity.public_key_bytes()
    }

    /// The raw session public key bytes, as attached to invitations.
    pub fn session_public_key(&self) -> [u8; 32] {
        self.session.public_key_bytes()
    }

    /// Sign an out-of-band payload with the identity key.
    pub fn sign(&self, message: &[u8]) -> DeviceSignature {
        self.identity.sign(message)
    }

    /// Verify a signature against this device's own identity key.
    ///
    /// For verifying *other* devices' signatures, parse their advertised
    /// key into a [`DevicePublicKey`](crate::crypto::keys::DevicePublicKey)
    /// and verify against that.
    pub fn verify(&self, message: &[u8], signature: &DeviceSignature) -> bool {
        self.identity.verify(message, signature)
    }

    /// The session keypair, for handshake derivation.
    pub(crate) fn session(&self) -> &SessionKeypair {
        &self.session
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new()
    }
}
