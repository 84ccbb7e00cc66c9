//! # Peer Identifiers
//!
//! A [`PeerId`] is the transport's name for a nearby device — whatever
//! string the discovery layer hands us when a peer appears. The protocol
//! treats it as completely opaque: no parsing, no structure, no assumption
//! that it survives a reconnect.
//!
//! This is deliberately NOT a cryptographic identity. Two different
//! `PeerId`s can belong to the same device across sessions, and a hostile
//! transport could hand out any string it likes. Trust lives in the
//! identity keys and the safety code, never in this label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a nearby peer, assigned by the transport.
///
/// Value-typed on purpose: it's a key into the session table and nothing
/// more. Comparing, hashing, and printing are all just the underlying
/// string.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Wrap a transport-provided identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn equality_and_hashing_follow_the_string() {
        let a = PeerId::new("dana-iphone");
        let b = PeerId::from("dana-iphone");
        let c = PeerId::from("other-device".to_string());
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut map = HashMap::new();
        map.insert(a, 1);
        assert_eq!(map.get(&b), Some(&1));
        assert_eq!(map.get(&c), None);
    }

    #[test]
    fn display_is_the_raw_identifier() {
        let id = PeerId::new("kitchen-ipad");
        assert_eq!(id.to_string(), "kitchen-ipad");
        assert_eq!(id.as_str(), "kitchen-ipad");
    }

    #[test]
    fn serde_is_a_plain_string() {
        let id = PeerId::new("peer-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"peer-7\"");
        let back: PeerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
