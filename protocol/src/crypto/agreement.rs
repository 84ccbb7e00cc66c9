//! # Session Key Agreement
//!
//! X25519 Diffie-Hellman plus HKDF-SHA256 — how two Nearlink devices that
//! have never met end up holding the same AES-256 key.
//!
//! Every device generates a fresh X25519 session keypair at startup. The
//! public half rides along with connection invitations; whichever side
//! receives the remote public key runs the agreement and derives the shared
//! secret. Both sides land on the same 32 bytes without those bytes ever
//! touching the wire.
//!
//! ## Why a static session key (and not one ephemeral per peer)?
//!
//! The session public key is advertised and attached to invitations *before*
//! we know who will answer. If the key were consumed per exchange, two
//! overlapping invitations would race for it and one peer would derive
//! against a key we no longer hold. So the keypair lives for the whole
//! process run and is reused for agreement against every peer. Forward
//! secrecy is per-process: restart the app and every previous session key
//! is unrecoverable.
//!
//! ## Key Derivation
//!
//! The raw Diffie-Hellman output is NOT used directly as an encryption key.
//! That would be a textbook mistake — DH outputs are points on an elliptic
//! curve with algebraic structure, not uniformly random bytes. We run the
//! shared secret through HKDF-SHA256 (RFC 5869, empty salt and info by
//! default) to extract a uniform 32-byte key that AES-GCM can trust.
//!
//! ## Contributory behavior
//!
//! X25519 happily computes a "shared secret" of all zeros if the remote key
//! is a low-order point. An attacker who sends one knows your session key
//! without doing any work. We reject the all-zero shared point before it
//! reaches the KDF.

use hkdf::Hkdf;
use rand::rngs::OsRng;
use sha2::Sha256;
use std::fmt;
use thiserror::Error;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::AGREEMENT_KEY_LENGTH;

/// Errors in the session key agreement protocol.
#[derive(Debug, Error)]
pub enum KeyAgreementError {
    #[error("key agreement failed: received invalid public key")]
    InvalidPublicKey,

    #[error("key agreement produced a non-contributory result")]
    NonContributory,

    #[error("session key derivation failed")]
    KeyDerivationFailed,
}

/// A derived 256-bit shared secret, ready for AES-256-GCM.
///
/// This is the "happy ending" of a key agreement: both peers hold one of
/// these and the bytes are identical on both sides. The wrapper exists so
/// the secret is zeroized when dropped and so `Debug` output can't leak it.
///
/// Cloning is allowed — the peer table hands out clones so encryption can
/// happen outside the table lock — but every clone is zeroized on drop too.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SharedKey([u8; AGREEMENT_KEY_LENGTH]);

impl SharedKey {
    /// Wrap raw key bytes. Callers outside this module should rarely need
    /// this — the normal way to obtain a `SharedKey` is key agreement.
    pub fn from_bytes(bytes: [u8; AGREEMENT_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes for use with the encryption layer.
    pub fn as_bytes(&self) -> &[u8; AGREEMENT_KEY_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material. Not a prefix, not a hash, nothing.
        write!(f, "SharedKey(redacted)")
    }
}

/// A device's X25519 session keypair.
///
/// Generated once at startup and reused for agreement against every peer
/// encountered during the process run. The secret is a `StaticSecret`
/// precisely because it must survive multiple `diffie_hellman` calls —
/// see the module docs for why consume-once semantics don't fit here.
///
/// The secret is zeroized when the keypair is dropped (x25519-dalek does
/// this for us).
///
/// # Examples
///
/// ```
/// use nearlink_protocol::crypto::agreement::SessionKeypair;
///
/// let alice = SessionKeypair::generate();
/// let bob = SessionKeypair::generate();
///
/// let k1 = alice.derive_shared_secret(&bob.public_key_bytes()).unwrap();
/// let k2 = bob.derive_shared_secret(&alice.public_key_bytes()).unwrap();
/// assert_eq!(k1, k2);
/// ```
pub struct SessionKeypair {
    secret: StaticSecret,
    public_key: PublicKey,
}

impl SessionKeypair {
    /// Generate a fresh session keypair using the OS cryptographic RNG.
    ///
    /// RFC 7748 clamping is applied by x25519-dalek, so every generated
    /// scalar is already in the safe subgroup.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public_key = PublicKey::from(&secret);
        Self { secret, public_key }
    }

    /// The session public key bytes to advertise and attach to invitations.
    ///
    /// These 32 bytes are what goes over the wire. They're public — no need
    /// to encrypt them (that would be a chicken-and-egg problem).
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.public_key.to_bytes()
    }

    /// Derive the shared secret from a remote peer's session public key.
    ///
    /// This is the protocol-default derivation: HKDF-SHA256 with empty salt
    /// and empty info, matching what every Nearlink device computes. Use
    /// [`derive_shared_secret_with`](Self::derive_shared_secret_with) only
    /// if you need domain separation for some out-of-band purpose.
    ///
    /// The remote key arrives as an untrusted byte slice straight off the
    /// wire, so validation happens here, in order:
    ///
    /// 1. Length must be exactly 32 bytes, checked before any curve math.
    /// 2. The DH result must not be the all-zero point (low-order remote key).
    ///
    /// Either failure means the handshake is rejected; neither leaves any
    /// state behind.
    pub fn derive_shared_secret(&self, remote_public: &[u8]) -> Result<SharedKey, KeyAgreementError> {
        self.derive_shared_secret_with(remote_public, None, &[])
    }

    /// Derive a shared secret with caller-chosen HKDF salt and info.
    ///
    /// Same validation as [`derive_shared_secret`](Self::derive_shared_secret);
    /// only the KDF parameters differ. `salt = None` is RFC 5869's "no salt"
    /// (a zero-filled block internally), which is exactly what an empty salt
    /// hashes to — the two spellings produce identical output.
    pub fn derive_shared_secret_with(
        &self,
        remote_public: &[u8],
        salt: Option<&[u8]>,
        info: &[u8],
    ) -> Result<SharedKey, KeyAgreementError> {
        // Length check first. Anything that isn't 32 bytes never touches
        // the curve.
        let remote: [u8; 32] = remote_public
            .try_into()
            .map_err(|_| KeyAgreementError::InvalidPublicKey)?;

        let remote_pk = PublicKey::from(remote);
        let raw = self.secret.diffie_hellman(&remote_pk);

        // Low-order remote keys collapse the DH output to all zeros, which
        // would let an attacker predict the session key. Reject before the
        // bytes reach the KDF.
        if raw.as_bytes() == &[0u8; 32] {
            return Err(KeyAgreementError::NonContributory);
        }

        let key = hkdf_sha256(raw.as_bytes(), salt, info)?;
        Ok(SharedKey(key))
    }
}

impl fmt::Debug for SessionKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Public half only. The secret stays out of logs, always.
        write!(
            f,
            "SessionKeypair(pub={})",
            &hex::encode(self.public_key.to_bytes())[..16]
        )
    }
}

/// HKDF-SHA256 extract-and-expand to a 32-byte key (RFC 5869).
///
/// Expand can only fail if the requested output exceeds 255 blocks; for a
/// fixed 32-byte output that's unreachable, but we map the error anyway
/// rather than unwrap in key-derivation code.
fn hkdf_sha256(
    ikm: &[u8],
    salt: Option<&[u8]>,
    info: &[u8],
) -> Result<[u8; AGREEMENT_KEY_LENGTH], KeyAgreementError> {
    let hk = Hkdf::<Sha256>::new(salt, ikm);
    let mut okm = [0u8; AGREEMENT_KEY_LENGTH];
    hk.expand(info, &mut okm)
        .map_err(|_| KeyAgreementError::KeyDerivationFailed)?;
    Ok(okm)
}
