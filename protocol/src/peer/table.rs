//! # Peer Session Table
//!
//! Per-peer protocol state, keyed by [`PeerId`]. One record per peer the
//! transport has ever mentioned since the last teardown: the identity key
//! it advertised, the shared secret (once a handshake completed), and the
//! transport's current opinion of the link.
//!
//! The table is a plain `HashMap` with no interior locking — the session
//! manager owns exactly one of these behind its single mutex, and every
//! access goes through that lock. Keeping the container dumb keeps the
//! concurrency story in one place.
//!
//! ## Secret lifecycle
//!
//! A shared secret is written in exactly one place (handshake completion)
//! and removed in exactly one place (eviction). Writing over an existing
//! secret is *replacement*, never merging: a peer that reconnects runs a
//! fresh handshake and the old secret becomes garbage. Stale blobs sealed
//! under the old secret will simply fail to decrypt — that's the desired
//! outcome, not an error to paper over.

use std::collections::HashMap;

use tracing::debug;

use crate::crypto::agreement::SharedKey;
use crate::peer::events::PeerTransportState;
use crate::peer::id::PeerId;

// ---------------------------------------------------------------------------
// PeerRecord
// ---------------------------------------------------------------------------

/// Everything the protocol knows about one peer.
#[derive(Debug, Clone)]
pub struct PeerRecord {
    /// The identity public key the peer advertised during discovery.
    /// Opaque bytes on purpose: it is only ever hashed into a safety code,
    /// so validating it as a curve point here would add nothing.
    pub public_key: Option<Vec<u8>>,
    /// Shared secret derived from the invitation handshake, if one has
    /// completed. Present means "we can message this peer".
    pub shared_secret: Option<SharedKey>,
    /// Last link state the transport reported for this peer.
    pub status: PeerTransportState,
}

impl PeerRecord {
    fn empty() -> Self {
        Self {
            public_key: None,
            shared_secret: None,
            status: PeerTransportState::NotConnected,
        }
    }
}

// ---------------------------------------------------------------------------
// PeerSessionTable
// ---------------------------------------------------------------------------

/// The map of per-peer records. Owned by the session manager, mutated only
/// under its lock.
#[derive(Debug, Default)]
pub struct PeerSessionTable {
    records: HashMap<PeerId, PeerRecord>,
}

impl PeerSessionTable {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Record a discovery advertisement for a peer.
    ///
    /// Creates the record if the peer is new. Re-discovery of a known peer
    /// refreshes the advertised key but leaves an existing shared secret
    /// alone — a peer can flicker in and out of browse results without
    /// tearing down a live session.
    pub fn record_discovery(&mut self, peer: PeerId, public_key: Vec<u8>) {
        let record = self.records.entry(peer).or_insert_with(PeerRecord::empty);
        record.public_key = Some(public_key);
    }

    /// Store the shared secret produced by a completed handshake.
    ///
    /// Overwrite semantics: if a secret is already present it is replaced
    /// wholesale. A handshake can also complete for a peer with no record
    /// (evicted moments earlier, or invited before being discovered) — that
    /// creates one, because a completed handshake IS a live session
    /// regardless of what discovery did.
    pub fn complete_handshake(&mut self, peer: PeerId, secret: SharedKey) {
        let record = self
            .records
            .entry(peer.clone())
            .or_insert_with(PeerRecord::empty);
        if record.shared_secret.is_some() {
            debug!(peer = %peer, "replacing existing shared secret after new handshake");
        }
        record.shared_secret = Some(secret);
    }

    /// The shared secret for a peer, cloned so crypto can run outside the
    /// manager's lock.
    pub fn lookup_secret(&self, peer: &PeerId) -> Option<SharedKey> {
        self.records.get(peer)?.shared_secret.clone()
    }

    /// The advertised identity key for a peer.
    pub fn lookup_public_key(&self, peer: &PeerId) -> Option<Vec<u8>> {
        self.records.get(peer)?.public_key.clone()
    }

    /// Update the transport link status for a peer, creating the record if
    /// the transport mentions a peer discovery never did.
    pub fn set_status(&mut self, peer: PeerId, status: PeerTransportState) {
        let record = self.records.entry(peer).or_insert_with(PeerRecord::empty);
        record.status = status;
    }

    /// Remove a peer's record entirely. Returns `true` if one existed.
    ///
    /// This is the only path that destroys a shared secret (besides
    /// [`evict_all`](Self::evict_all)). Dropping the record zeroizes the
    /// key material via `SharedKey`'s drop impl.
    pub fn evict(&mut self, peer: &PeerId) -> bool {
        let existed = self.records.remove(peer).is_some();
        if existed {
            debug!(peer = %peer, "evicted peer session record");
        }
        existed
    }

    /// Drop every record. Used on teardown.
    pub fn evict_all(&mut self) {
        let count = self.records.len();
        self.records.clear();
        if count > 0 {
            debug!(count, "evicted all peer session records");
        }
    }

    /// Number of peers with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot of all known peer ids, for diagnostics.
    pub fn peers(&self) -> Vec<PeerId> {
        self.records.keys().cloned().collect()
    }

    /// Borrow a record directly. Crate-internal; the public surface goes
    /// through the typed lookups above.
    pub(crate) fn get(&self, peer: &PeerId) -> Option<&PeerRecord> {
        self.records.get(peer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
