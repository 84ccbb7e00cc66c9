//! # Cryptographic Primitives for Nearlink
//!
//! This module is the foundation of everything security-related in the
//! protocol. Every identity, every derived session key, every encrypted
//! payload, every safety code flows through here.
//!
//! We deliberately chose boring, well-audited cryptography:
//!
//! - **Ed25519** for identity and signatures — fast, deterministic, and
//!   nobody has broken it.
//! - **X25519** for key agreement — same curve, different clothes.
//! - **HKDF-SHA256** for key derivation — RFC 5869, no surprises.
//! - **AES-256-GCM** for symmetric encryption — AEAD done right.
//! - **SHA-256** for fingerprints — because both ends of a handshake have it.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations. If you're tempted to optimize these functions, please
//! reconsider. Then reconsider again. Then go read about timing attacks
//! and come back when you've lost the urge.

pub mod agreement;
pub mod encryption;
pub mod hash;
pub mod keys;
pub mod safety_code;

// Re-export the things people actually need so they don't have to memorize
// our module hierarchy. Life's too short for five levels of `use` statements.
pub use agreement::{SessionKeypair, SharedKey};
pub use encryption::{decrypt, encrypt};
pub use hash::sha256;
pub use keys::{DeviceKeypair, DevicePublicKey, DeviceSignature};
pub use safety_code::safety_code;
