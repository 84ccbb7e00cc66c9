//! # Peer Sessions
//!
//! Everything between "a device appeared nearby" and "an authenticated,
//! end-to-end-encrypted message arrived": discovery bookkeeping, the
//! invitation handshake, per-peer secrets, sealed messaging, and the
//! connection state machine, all owned by one [`PeerSessionManager`].
//!
//! ## The Flow
//!
//! ```text
//!   ┌──────────┐                              ┌──────────┐
//!   │  Local   │                              │   Peer   │
//!   └────┬─────┘                              └────┬─────┘
//!        │                                         │
//!        │  1. advertisement (identity pubkey)     │
//!        │◄───────────────────────────────────────►│
//!        │                                         │
//!        │  2. invitation (session pubkey context) │
//!        ├────────────────────────────────────────►│
//!        │                                         │
//!        │  3. accept, session pubkey flows back   │
//!        │◄────────────────────────────────────────┤
//!        │                                         │
//!        │     each side: X25519 + HKDF-SHA256     │
//!        │                                         │
//!        │  4. sealed blobs (AES-256-GCM)          │
//!        │◄───────────────────────────────────────►│
//!        │                                         │
//! ```
//!
//! ### Step 1 — Discovery (`table.rs`, `state.rs`)
//! The transport advertises the local identity public key and browses for
//! peers doing the same. Discovered keys are recorded per peer; they feed
//! the safety code, never the handshake.
//!
//! ### Step 2 — Invitation (`handshake.rs`)
//! Inviting a peer attaches the local session public key as the
//! invitation's context payload. There is no extra round trip — the
//! handshake rides the connection request itself.
//!
//! ### Step 3 — Derivation (`handshake.rs`, `keystore.rs`)
//! Each side feeds the session key it received into X25519 agreement plus
//! HKDF-SHA256 and stores the shared secret in its session table. An
//! invitation with a missing or invalid key is rejected before the
//! transport accepts anything.
//!
//! ### Step 4 — Messaging (`messaging.rs`)
//! Messages are JSON-serialized and sealed with AES-256-GCM under the
//! per-peer secret. Anything that fails authentication is dropped, never
//! partially delivered.
//!
//! ## Out-of-band Verification
//!
//! Both devices render the same 12-digit safety code from the two
//! identity public keys. Humans compare it over a channel an attacker on
//! the local network can't rewrite; a mismatch means the session is not
//! talking to who it thinks it is.

pub mod events;
pub mod handshake;
pub mod id;
pub mod keystore;
pub mod messaging;
pub mod service;
pub mod state;
pub mod table;
pub mod transport;

pub use events::{PeerTransportState, SessionEvent, TransportEvent};
pub use handshake::{HandshakeError, InvitationContext};
pub use id::PeerId;
pub use keystore::KeyStore;
pub use messaging::{open_message, seal_message, MessagingError};
pub use service::{PeerSessionError, PeerSessionManager};
pub use state::{ConnectionState, ConnectionTracker};
pub use table::{PeerRecord, PeerSessionTable};
pub use transport::{AdvertisedIdentity, PeerTransport};
