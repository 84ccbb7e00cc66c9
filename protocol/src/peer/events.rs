//! # Transport and Session Events
//!
//! The two event vocabularies at the protocol boundary.
//!
//! [`TransportEvent`] flows *inward*: it is everything the proximity
//! transport can tell us — a peer appeared, an invitation arrived, bytes
//! landed. The transport adapter translates its platform callbacks into
//! these and feeds them to the session manager.
//!
//! [`SessionEvent`] flows *outward*: it is everything an application can
//! observe — a handshake was accepted, a message decrypted, the aggregate
//! state moved. The manager emits these from its dispatch path.
//!
//! Keeping the two directions as separate enums keeps the boundary honest:
//! the transport never sees decrypted messages, and the application never
//! sees raw blobs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::message::Message;
use crate::peer::id::PeerId;
use crate::peer::state::ConnectionState;

// ---------------------------------------------------------------------------
// PeerTransportState
// ---------------------------------------------------------------------------

/// Per-peer connection state as reported by the transport.
///
/// This is the transport's opinion of one peer's link, distinct from the
/// aggregate [`ConnectionState`] the state machine derives across all
/// peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerTransportState {
    /// No link, or a link that just closed.
    NotConnected,
    /// Link negotiation in progress.
    Connecting,
    /// Link established and usable for data.
    Connected,
}

impl fmt::Display for PeerTransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

// ---------------------------------------------------------------------------
// TransportEvent (inbound)
// ---------------------------------------------------------------------------

/// Everything the proximity transport can report to the session manager.
///
/// One enum, one dispatch point: the manager's `handle_event` consumes
/// these in arrival order, which is what gives the protocol its single
/// total order over discovery, handshake, and data delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransportEvent {
    /// A nearby peer became visible, advertising its identity public key.
    /// The key bytes are stored as-is and never validated here — they only
    /// ever feed the safety-code hash.
    PeerDiscovered { peer: PeerId, public_key: Vec<u8> },

    /// A previously visible peer went out of range.
    PeerLost { peer: PeerId },

    /// A connection invitation arrived, carrying the inviter's session
    /// public key as its context payload (or nothing, if the inviter is
    /// not speaking this protocol).
    InvitationReceived {
        peer: PeerId,
        context: Option<Vec<u8>>,
    },

    /// The transport's per-peer link state changed.
    PeerStateChanged {
        peer: PeerId,
        state: PeerTransportState,
    },

    /// An opaque blob arrived from a peer.
    DataReceived { peer: PeerId, data: Vec<u8> },
}

// ---------------------------------------------------------------------------
// SessionEvent (outbound)
// ---------------------------------------------------------------------------

/// Everything the session manager can report to the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A peer is visible and could be invited.
    PeerDiscovered { peer: PeerId },

    /// A visible peer went away.
    PeerLost { peer: PeerId },

    /// An inbound invitation carried a valid session key; the shared
    /// secret is stored and the transport was told to accept.
    InvitationAccepted { peer: PeerId },

    /// An inbound invitation was refused. The reason is a log-safe
    /// description, never key material.
    InvitationRejected { peer: PeerId, reason: String },

    /// The transport reports the peer's link is up.
    PeerConnected { peer: PeerId },

    /// The peer's link closed; its session state has been evicted.
    PeerDisconnected { peer: PeerId },

    /// The aggregate connection state moved. Emitted once per real
    /// transition, never for no-ops.
    StateChanged { state: ConnectionState },

    /// A sealed blob decrypted and parsed into a fresh message.
    MessageReceived { peer: PeerId, message: Message },

    /// An inbound blob was discarded. Duplicates, undecryptable blobs,
    /// and blobs from unknown peers all land here with a reason.
    MessageDropped { peer: PeerId, reason: String },
}
