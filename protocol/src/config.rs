//! # Protocol Configuration & Constants
//!
//! Every magic number in Nearlink lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! Most of these values are dictated by the primitives we chose (Ed25519,
//! X25519, AES-256-GCM) and cannot be changed without breaking every session
//! on the wire. The few that are genuinely tunable are called out as such.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Service Identity
// ---------------------------------------------------------------------------

/// Service type string advertised over the proximity transport. Peers only
/// see each other when they advertise and browse the same service type, so
/// this doubles as a coarse protocol-family filter.
pub const SERVICE_TYPE: &str = "nearlink";

/// Protocol version string, assembled at compile time so we don't allocate
/// for something this trivial at runtime.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 — the only sane choice for signatures in 2024+.
/// 128-bit security level, deterministic, and resistant to side-channel
/// attacks when implemented correctly (which ed25519-dalek is).
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// Signing key length in bytes. Ed25519 secret keys are 32 bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Public (verifying) key length in bytes.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes. If yours isn't, something
/// has gone terribly wrong.
pub const SIGNATURE_LENGTH: usize = 64;

/// X25519 for Diffie-Hellman key agreement. Same curve as Ed25519 but in
/// Montgomery form — because mathematicians enjoy making things confusing.
pub const KEY_EXCHANGE_ALGORITHM: &str = "X25519";

/// X25519 public key length in bytes. This is also the exact length of a
/// valid invitation context payload (the raw session public key).
pub const AGREEMENT_KEY_LENGTH: usize = 32;

/// AES-256-GCM for symmetric encryption. 256-bit keys, 96-bit nonces,
/// 128-bit authentication tags. The holy trinity of authenticated encryption.
pub const SYMMETRIC_ALGORITHM: &str = "AES-256-GCM";

/// AES-256-GCM key length in bytes. Also the output length of the
/// HKDF-SHA256 step that turns a raw Diffie-Hellman point into a usable key.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. 96 bits is the standard and the only
/// length you should use. 12 bytes. Not 16. Not 8. Twelve.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

/// Hash output length in bytes. SHA-256 produces 32-byte digests.
pub const HASH_OUTPUT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Safety Code Geometry
// ---------------------------------------------------------------------------

/// Number of digest bytes consumed by the safety-code derivation. Six bytes
/// at two decimal digits each gives the 12-digit code below.
pub const SAFETY_CODE_HASH_BYTES: usize = 6;

/// Total decimal digits in a safety code.
pub const SAFETY_CODE_DIGITS: usize = 12;

/// Digits per hyphen-separated display group (`123-456-789-012`).
pub const SAFETY_CODE_GROUP_SIZE: usize = 3;

// ---------------------------------------------------------------------------
// Timing Constants
// ---------------------------------------------------------------------------

/// How long an outbound connection invitation stays valid before the
/// transport gives up on it. 30 seconds is generous — if the other person
/// hasn't tapped "accept" by then, they're not going to.
pub const INVITE_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Session Configuration
// ---------------------------------------------------------------------------

/// Caller-tunable knobs for a peer session manager.
///
/// There is deliberately very little here. The cryptographic parameters are
/// compile-time constants (changing them per-instance would be a recipe for
/// two devices that can't talk to each other), which leaves only the bits
/// that genuinely vary per device.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Human-readable name attached to outgoing messages and advertised to
    /// nearby peers. Usually the device name.
    pub display_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            display_name: "nearlink-device".to_string(),
        }
    }
}
