//! # Safety Code Fingerprints
//!
//! The human-verifiable half of the Nearlink trust model.
//!
//! Key agreement protects the session from passive eavesdroppers, but an
//! active attacker sitting between two devices could run two separate
//! handshakes and relay traffic. Cryptography alone can't catch that — the
//! people holding the phones can. Both devices render a short numeric code
//! derived from the two identity public keys; the users read them aloud or
//! compare screens. If the codes match, there is one key exchange in the
//! room, not two.
//!
//! ## Construction
//!
//! ```text
//! code = format(SHA-256(min(key_a, key_b) || max(key_a, key_b))[..6])
//! ```
//!
//! The two identity keys are sorted lexicographically before hashing so
//! both peers compute the identical code no matter which side does the
//! rendering. Each of the first six digest bytes becomes two decimal
//! digits (`byte % 100`, zero-padded), and the twelve digits are grouped
//! in threes for readability: `482-475-112-209`.
//!
//! ## Why 12 digits?
//!
//! Twelve digits is what fits comfortably on a lock-screen-sized dialog
//! and survives being read aloud across a table. An attacker has to hit a
//! matching code across *both* of their MITM handshakes before the humans
//! compare, with no offline grinding possible — the code is fixed the
//! moment the identity keys are. The `% 100` mapping is slightly biased
//! toward low residues (256 doesn't divide evenly by 100); for a
//! human-comparison check that bias is irrelevant.

use crate::config::{SAFETY_CODE_GROUP_SIZE, SAFETY_CODE_HASH_BYTES};
use crate::crypto::hash::sha256_multi;

/// Render the safety code for a pair of identity public keys.
///
/// Symmetric by construction: `safety_code(a, b) == safety_code(b, a)`.
/// The keys are treated as opaque byte strings — this function doesn't
/// care whether they're valid curve points, only that both sides feed it
/// the same two values.
///
/// # Example
///
/// ```
/// use nearlink_protocol::crypto::safety_code::safety_code;
///
/// let ours = [0x01u8; 32];
/// let theirs = [0x02u8; 32];
/// assert_eq!(safety_code(&ours, &theirs), safety_code(&theirs, &ours));
/// ```
pub fn safety_code(key_a: &[u8], key_b: &[u8]) -> String {
    // Canonical ordering: sort the raw byte strings so both peers hash the
    // same concatenation. Without this, each side would render a different
    // code and the comparison ritual would always "detect" an attack.
    let (first, second) = if key_a <= key_b {
        (key_a, key_b)
    } else {
        (key_b, key_a)
    };

    let digest = sha256_multi(&[first, second]);

    let digits: String = digest[..SAFETY_CODE_HASH_BYTES]
        .iter()
        .map(|byte| format!("{:02}", byte % 100))
        .collect();

    group_digits(&digits)
}

/// Insert hyphens every `SAFETY_CODE_GROUP_SIZE` digits.
fn group_digits(digits: &str) -> String {
    digits
        .as_bytes()
        .chunks(SAFETY_CODE_GROUP_SIZE)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SAFETY_CODE_DIGITS;

    #[test]
    fn test_symmetric_for_both_peers() {
        let a = [0x01u8; 32];
        let b = [0x02u8; 32];
        assert_eq!(safety_code(&a, &b), safety_code(&b, &a));
    }

    #[test]
    fn test_known_vector() {
        // SHA-256(0x01 * 32 || 0x02 * 32) starts f8 18 af d3 7a 6d;
        // mod-100 gives 48 24 75 11 22 09.
        let a = [0x01u8; 32];
        let b = [0x02u8; 32];
        assert_eq!(safety_code(&a, &b), "482-475-112-209");
    }

    #[test]
    fn test_known_vector_ranged_keys() {
        let a: Vec<u8> = (0u8..32).collect();
        let b: Vec<u8> = (32u8..64).collect();
        assert_eq!(safety_code(&a, &b), "533-485-724-313");
    }

    #[test]
    fn test_format_shape() {
        let a = [0xAAu8; 32];
        let b = [0xBBu8; 32];
        let code = safety_code(&a, &b);

        // Four groups of three digits, hyphen-separated.
        assert_eq!(code.len(), SAFETY_CODE_DIGITS + 3);
        let groups: Vec<&str> = code.split('-').collect();
        assert_eq!(groups.len(), 4);
        for group in groups {
            assert_eq!(group.len(), 3);
            assert!(group.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_deterministic() {
        let a = [0x10u8; 32];
        let b = [0x20u8; 32];
        assert_eq!(safety_code(&a, &b), safety_code(&a, &b));
    }

    #[test]
    fn test_different_keys_different_codes() {
        // Not a collision-resistance proof, just a sanity check that the
        // code actually depends on the key material.
        let a = [0x01u8; 32];
        let b = [0x02u8; 32];
        let c = [0x03u8; 32];
        assert_ne!(safety_code(&a, &b), safety_code(&a, &c));
    }

    #[test]
    fn test_identical_keys_still_render() {
        // Degenerate but must not panic: both keys equal (e.g. a device
        // inspecting itself in tests).
        let a = [0x07u8; 32];
        let code = safety_code(&a, &a);
        assert_eq!(code.split('-').count(), 4);
    }
}
