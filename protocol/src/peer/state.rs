//! # Connection State Machine
//!
//! Tracks the aggregate connection lifecycle of a protocol instance:
//!
//! ```text
//! Disconnected -> Discovering -> Connecting -> Connected
//!       ^              ^                           |
//!       |              |       last peer drops     |
//!       +--------------+---------------------------+
//! ```
//!
//! The aggregate state is what a status indicator in a UI would show. It
//! is derived from three pieces of ground truth the tracker owns: whether
//! discovery is running, which peers are currently visible, and which
//! peers hold a live transport connection.
//!
//! When the last connected peer drops, the state reverts to `Discovering`
//! if discovery is still running, and only falls all the way back to
//! `Disconnected` when it isn't. A device that is still advertising and
//! browsing is not "disconnected" just because its one conversation
//! partner walked out of range.
//!
//! Mutation methods return `Some(new_state)` when the aggregate actually
//! changed, so the caller can surface exactly one state-change event per
//! real transition and none for no-ops.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::peer::id::PeerId;

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// Aggregate lifecycle state of the protocol instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Not advertising, not browsing, no connections.
    Disconnected,
    /// Advertising and browsing; no connection attempt in flight.
    Discovering,
    /// At least one transport-level connection attempt is in progress
    /// and nothing is connected yet.
    Connecting,
    /// At least one peer holds a live, handshaken transport connection.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Discovering => write!(f, "discovering"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionTracker
// ---------------------------------------------------------------------------

/// Owns the aggregate state plus the peer sets it is derived from.
///
/// Not thread-safe by itself — the session manager keeps it behind its
/// single lock together with the session table, so every transition is
/// serialized with the handshake and eviction paths that feed it.
#[derive(Debug)]
pub struct ConnectionTracker {
    state: ConnectionState,
    discovery_active: bool,
    discovered: HashSet<PeerId>,
    connected: HashSet<PeerId>,
}

impl ConnectionTracker {
    /// A tracker for a freshly created instance: disconnected, idle.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            discovery_active: false,
            discovered: HashSet::new(),
            connected: HashSet::new(),
        }
    }

    /// Current aggregate state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether advertise/browse is currently running.
    pub fn is_discovery_active(&self) -> bool {
        self.discovery_active
    }

    /// Snapshot of currently visible peers.
    pub fn discovered(&self) -> Vec<PeerId> {
        self.discovered.iter().cloned().collect()
    }

    /// Snapshot of currently connected peers.
    pub fn connected(&self) -> Vec<PeerId> {
        self.connected.iter().cloned().collect()
    }

    /// Number of live connections.
    pub fn connected_count(&self) -> usize {
        self.connected.len()
    }

    /// Discovery (advertise + browse) has started.
    ///
    /// Moves `Disconnected` to `Discovering`. If peers are already
    /// connected the aggregate stays `Connected` — restarting discovery
    /// underneath live sessions is allowed and invisible.
    pub fn discovery_started(&mut self) -> Option<ConnectionState> {
        self.discovery_active = true;
        if self.state == ConnectionState::Disconnected {
            self.transition(ConnectionState::Discovering)
        } else {
            None
        }
    }

    /// A peer became visible in discovery. Never changes the aggregate —
    /// seeing someone is not the same as talking to them.
    pub fn peer_discovered(&mut self, peer: PeerId) {
        self.discovered.insert(peer);
    }

    /// A visible peer went out of range. Only the discovered set changes;
    /// an established connection to that peer keeps running until the
    /// transport says otherwise.
    pub fn peer_lost(&mut self, peer: &PeerId) {
        self.discovered.remove(peer);
    }

    /// The transport reports a connection attempt in progress with a peer.
    pub fn peer_connecting(&mut self, _peer: &PeerId) -> Option<ConnectionState> {
        // Only promote to Connecting if nothing is connected yet. With a
        // live session up, an additional peer dialing in doesn't demote
        // the aggregate from Connected.
        if self.connected.is_empty() && self.state != ConnectionState::Connecting {
            self.transition(ConnectionState::Connecting)
        } else {
            None
        }
    }

    /// The transport reports a peer fully connected.
    pub fn peer_connected(&mut self, peer: PeerId) -> Option<ConnectionState> {
        self.connected.insert(peer);
        if self.state != ConnectionState::Connected {
            self.transition(ConnectionState::Connected)
        } else {
            None
        }
    }

    /// The transport reports a peer disconnected (or a connection attempt
    /// failed). Applies the revert rule when the last connection drops.
    pub fn peer_disconnected(&mut self, peer: &PeerId) -> Option<ConnectionState> {
        self.connected.remove(peer);
        if !self.connected.is_empty() {
            return None;
        }
        let fallback = if self.discovery_active {
            ConnectionState::Discovering
        } else {
            ConnectionState::Disconnected
        };
        self.transition(fallback)
    }

    /// Full teardown: discovery off, all peer sets cleared, back to
    /// `Disconnected`. Both caller-initiated teardown paths (stopping
    /// discovery, disconnecting) funnel here.
    pub fn reset(&mut self) -> Option<ConnectionState> {
        self.discovery_active = false;
        self.discovered.clear();
        self.connected.clear();
        self.transition(ConnectionState::Disconnected)
    }

    fn transition(&mut self, next: ConnectionState) -> Option<ConnectionState> {
        if self.state == next {
            return None;
        }
        self.state = next;
        Some(next)
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
