//! # Identity Key Management
//!
//! Ed25519 keypair generation and serialization for Nearlink device
//! identities.
//!
//! Every device running Nearlink has exactly one Ed25519 identity keypair.
//! The public half is advertised to nearby peers and feeds the safety-code
//! fingerprint; the private half signs whatever the application layer needs
//! authenticated out-of-band. The identity key is *not* used for message
//! encryption — that's the session keypair's job (see
//! [`agreement`](crate::crypto::agreement)).
//!
//! ## Why Ed25519?
//!
//! - Deterministic signatures (no k-value footguns like ECDSA).
//! - 128-bit security level in 32+32 bytes. Compact and sufficient.
//! - Constant-time implementations exist and are well-audited.
//! - Fast verification on the phone-class hardware this protocol lives on.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - We use OS-level RNG (`OsRng`) for key generation. If your OS RNG
//!   is broken, you have bigger problems than Nearlink.
//! - Key bytes are never logged. If you add logging to this module,
//!   you will be asked to leave.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur during key operations.
///
/// These are intentionally vague about *why* something failed — leaking
/// details about key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// A device's long-term identity keypair wrapping Ed25519 signing and
/// verification keys.
///
/// This is the atomic unit of identity in the protocol. The advertised
/// public key, the safety code shown to the user, and every out-of-band
/// signature ultimately trace back to one of these.
///
/// The keypair is generated once at startup and never rotated within a
/// process run — peers recognize a device by this key, and rotating it
/// mid-session would silently invalidate every safety code already
/// verified against it.
///
/// ## Serialization
///
/// `DeviceKeypair` intentionally does NOT implement `Serialize`/`Deserialize`
/// directly. Serializing private keys should be a deliberate, conscious act,
/// not something that happens because someone shoved a keypair into a JSON
/// response. Use `to_bytes()` / `from_bytes()` explicitly.
///
/// # Examples
///
/// ```
/// use nearlink_protocol::crypto::keys::DeviceKeypair;
///
/// let kp = DeviceKeypair::generate();
/// let msg = b"pairing challenge";
/// let sig = kp.sign(msg);
/// assert!(kp.verify(msg, &sig));
/// ```
pub struct DeviceKeypair {
    /// The Ed25519 signing (private) key. 32 bytes of pure responsibility.
    signing_key: SigningKey,
}

/// The public half of a device identity, safe to share with the world.
///
/// This is what shows up in discovery advertisements and what both sides
/// hash together to render a safety code. Losing it is inconvenient but
/// not catastrophic — it can be re-derived from the signing key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature over a message.
///
/// 64 bytes. Deterministic for a given (key, message) pair — that's the
/// beauty of Ed25519. No nonce management, no k-value disasters, no
/// sleepless nights wondering if your RNG was seeded properly during signing.
///
/// Stored as `Vec<u8>` for serde compatibility, but always exactly 64 bytes.
/// If someone hands you a DeviceSignature that isn't 64 bytes, verification
/// will simply fail — no panics, no undefined behavior, just a boolean `false`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSignature {
    bytes: Vec<u8>,
}

impl DeviceKeypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    ///
    /// This is the preferred way to create a new identity. The RNG is
    /// `OsRng`, which pulls from `/dev/urandom` on Unix and `BCryptGenRandom`
    /// on Windows. If either of those is compromised, Nearlink keys are the
    /// least of your worries.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Constructs a keypair deterministically from a 32-byte seed.
    ///
    /// The seed is used directly as the Ed25519 secret scalar. Useful for
    /// restoring a persisted identity or for deterministic test fixtures.
    ///
    /// **Warning**: if you call this with a weak seed, you get a weak key.
    /// Use a proper CSPRNG or KDF to produce the seed bytes.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Reconstruct a keypair from raw 32-byte secret key material.
    ///
    /// The public key is re-derived from the secret key to ensure consistency.
    /// Equivalent to [`from_seed`](Self::from_seed) — in Ed25519, the 32-byte
    /// secret key *is* the seed.
    pub fn from_bytes(secret_key_bytes: &[u8; SECRET_KEY_LENGTH]) -> Result<Self, KeyError> {
        Ok(Self::from_seed(secret_key_bytes))
    }

    /// Returns the public key associated with this keypair.
    pub fn public_key(&self) -> DevicePublicKey {
        DevicePublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Get the raw public key bytes (32 bytes).
    ///
    /// This is the identity that gets advertised to nearby peers. Safe to
    /// share, log, print on a business card, etc.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message and return a `DeviceSignature`.
    ///
    /// Ed25519 signatures are deterministic — the same (key, message) pair
    /// always produces the same signature. No nonce games, no randomness
    /// needed at signing time. This is one of the biggest advantages over
    /// ECDSA, where a bad RNG during signing can leak your private key
    /// (see: PlayStation 3 master key incident, 2010).
    pub fn sign(&self, message: &[u8]) -> DeviceSignature {
        let sig = self.signing_key.sign(message);
        DeviceSignature {
            bytes: sig.to_bytes().to_vec(),
        }
    }

    /// Verify a signature against this keypair's public key.
    ///
    /// Convenience method — equivalent to calling `self.public_key().verify()`.
    pub fn verify(&self, message: &[u8], signature: &DeviceSignature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Exports the raw 32-byte secret key material.
    ///
    /// **Handle with extreme care.** This is the only secret that stands
    /// between an attacker and full impersonation of this device. Don't
    /// log it. Don't send it over the network. Don't store it in a text
    /// file called "my_keys.txt" on your desktop.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Get the public key as a hex string. Useful for display and logging.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }
}

impl Clone for DeviceKeypair {
    /// Cloning a keypair is allowed but should make you uncomfortable.
    /// Every copy of a private key is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for DeviceKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. Not even "partially."
        // A partial leak is still a leak, and grepping logs for hex is trivial.
        write!(f, "DeviceKeypair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for DeviceKeypair {
    /// Two keypairs are equal if their public keys match.
    /// We compare public keys (not private) because comparing secret material
    /// in a non-constant-time way is a bad habit, and for identity purposes,
    /// the public key is what matters.
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for DeviceKeypair {}

// ---------------------------------------------------------------------------
// DevicePublicKey
// ---------------------------------------------------------------------------

impl DevicePublicKey {
    /// Create a `DevicePublicKey` from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Try to create a `DevicePublicKey` from a byte slice.
    ///
    /// Validates the length and that the bytes represent a valid Ed25519 point.
    /// We don't just accept any 32 bytes — some values aren't valid points on
    /// the curve, and using them could lead to weird behavior.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        if slice.len() != 32 {
            return Err(KeyError::InvalidPublicKey);
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);

        // Verify these bytes actually represent a valid Ed25519 public key.
        // This catches low-order points and other degenerate cases.
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;

        Ok(Self { bytes })
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Verify a signature against this public key.
    ///
    /// Returns `true` if the signature is valid, `false` otherwise. We use
    /// a boolean here (rather than `Result`) because the vast majority of
    /// callers just want a yes/no answer and don't care about the specific
    /// failure mode.
    pub fn verify(&self, message: &[u8], signature: &DeviceSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig_bytes: [u8; 64] = match signature.bytes.as_slice().try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        let dalek_sig = DalekSignature::from_bytes(&sig_bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    /// Hex-encoded representation. 64 characters for 32 bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse a hex-encoded public key string.
    ///
    /// Returns an error if the hex is malformed or the wrong length.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::OddLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self { bytes: arr })
    }
}

impl Hash for DevicePublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for DevicePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for DevicePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevicePublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// DeviceSignature
// ---------------------------------------------------------------------------

impl DeviceSignature {
    /// Create a signature from raw 64-byte representation.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Returns the raw signature bytes (always 64 bytes for valid Ed25519 signatures).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the hex-encoded signature string. 128 characters for a valid sig.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for DeviceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for DeviceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        if hex_str.len() >= 128 {
            write!(f, "DeviceSignature({}...{})", &hex_str[..8], &hex_str[120..])
        } else {
            write!(f, "DeviceSignature({})", hex_str)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_valid_keypair() {
        let kp = DeviceKeypair::generate();
        assert_eq!(kp.public_key_bytes().len(), 32);
        assert_eq!(kp.to_bytes().len(), 32);
    }

    #[test]
    fn keypair_sign_verify_roundtrip() {
        let kp = DeviceKeypair::generate();
        let msg = b"pairing challenge 42";
        let sig = kp.sign(msg);
        assert!(kp.verify(msg, &sig));
    }

    #[test]
    fn wrong_message_fails_verification() {
        let kp = DeviceKeypair::generate();
        let sig = kp.sign(b"correct message");
        assert!(!kp.verify(b"wrong message", &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let kp1 = DeviceKeypair::generate();
        let kp2 = DeviceKeypair::generate();
        let sig = kp1.sign(b"message");
        assert!(!kp2.verify(b"message", &sig));
    }

    #[test]
    fn test_roundtrip_bytes() {
        let kp = DeviceKeypair::generate();
        let secret_bytes = kp.to_bytes();
        let restored = DeviceKeypair::from_bytes(&secret_bytes).unwrap();
        assert_eq!(kp.public_key_bytes(), restored.public_key_bytes());
    }

    #[test]
    fn test_two_generated_keypairs_are_different() {
        // If this fails, your RNG is broken and you should panic (the emotion,
        // not the macro). Well, actually, both.
        let kp1 = DeviceKeypair::generate();
        let kp2 = DeviceKeypair::generate();
        assert_ne!(kp1.public_key_bytes(), kp2.public_key_bytes());
    }

    #[test]
    fn test_public_key_try_from_slice() {
        let kp = DeviceKeypair::generate();
        let pk = DevicePublicKey::try_from_slice(&kp.public_key_bytes()).unwrap();
        assert_eq!(pk.as_bytes(), &kp.public_key_bytes());
    }

    #[test]
    fn test_public_key_rejects_wrong_length() {
        let short = [0u8; 16];
        assert!(DevicePublicKey::try_from_slice(&short).is_err());
    }

    #[test]
    fn public_key_hex_roundtrip() {
        let kp = DeviceKeypair::generate();
        let pk = kp.public_key();
        let hex_str = pk.to_hex();
        let recovered = DevicePublicKey::from_hex(&hex_str).unwrap();
        assert_eq!(pk, recovered);
    }

    #[test]
    fn test_clone_preserves_identity() {
        let kp = DeviceKeypair::generate();
        let cloned = kp.clone();
        assert_eq!(kp.public_key_bytes(), cloned.public_key_bytes());
        assert_eq!(kp.to_bytes(), cloned.to_bytes());
    }

    #[test]
    fn deterministic_from_seed() {
        let seed = [42u8; 32];
        let kp1 = DeviceKeypair::from_seed(&seed);
        let kp2 = DeviceKeypair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn test_deterministic_signatures() {
        // Ed25519 is deterministic — same key + same message = same signature.
        // This is a feature, not a bug.
        let kp = DeviceKeypair::generate();
        let msg = b"determinism is underrated";
        let sig1 = kp.sign(msg);
        let sig2 = kp.sign(msg);
        assert_eq!(sig1.as_bytes(), sig2.as_bytes());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = DeviceKeypair::generate();
        let debug_str = format!("{:?}", kp);
        assert!(debug_str.starts_with("DeviceKeypair(pub="));
        assert!(!debug_str.contains("signing_key"));
    }

    #[test]
    fn test_empty_message_signing() {
        // Signing an empty message is valid in Ed25519. Some protocols
        // forbid it, but we don't — the signature is still deterministic.
        let kp = DeviceKeypair::generate();
        let sig = kp.sign(b"");
        assert!(kp.verify(b"", &sig));
    }

    #[test]
    fn test_malformed_signature_verifies_false() {
        // A signature of the wrong length must fail verification with a
        // boolean false, never a panic. Verification is total.
        let kp = DeviceKeypair::generate();
        let truncated = DeviceSignature { bytes: vec![0u8; 12] };
        assert!(!kp.verify(b"anything", &truncated));
    }
}
