//! # Hashing Utilities
//!
//! SHA-256 helpers used throughout Nearlink. We support exactly one hash
//! function and refuse to support more without a very good reason: the
//! safety-code fingerprint and the HKDF step of key agreement both specify
//! SHA-256, and a second hash function would be a second thing to audit.
//!
//! SHA-256 is not the fastest hash in the world, but every input we feed it
//! is at most a few dozen bytes. Swapping in something trendier would save
//! nanoseconds nobody can measure and cost us interoperability with every
//! peer already running this protocol.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// Returns a 32-byte digest as a `Vec<u8>`. Used where callers want owned
/// data they can slice and pass around. For fixed-size call sites, prefer
/// [`sha256_array`].
///
/// # Example
///
/// ```
/// use nearlink_protocol::crypto::sha256;
///
/// let hash = sha256(b"nearlink");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
///
/// Same as [`sha256`] but returns `[u8; 32]` for callers that want
/// a fixed-size type without the heap allocation.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Instead of allocating a buffer to concatenate inputs, we feed them
/// sequentially into the hasher. Same result, less allocation. The
/// safety-code derivation uses this to hash two public keys as if they
/// were one concatenated string.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}
