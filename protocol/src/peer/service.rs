//! # Peer Session Manager
//!
//! The protocol instance. Owns the key store, the peer session table, and
//! the connection state machine, and splices them onto an abstract
//! proximity transport. Every discovery callback, invitation, sealed blob,
//! and caller command funnels through this one object.
//!
//! ## Why one lock?
//!
//! Transport callbacks arrive on whatever thread the platform feels like
//! using, concurrently with caller commands. All mutable state (session
//! table, state machine, received messages) lives behind a single
//! [`parking_lot::Mutex`], so every operation is one serialized
//! read-modify-write and a handshake completion can never race an eviction
//! into a half-written record. The crypto inside is CPU-bound and fast;
//! the lock is never held across a transport call.
//!
//! ## Two ways in
//!
//! Callers wiring platform delegate callbacks use the named `on_*` methods
//! directly. Callers embedding the protocol in an async runtime feed
//! [`TransportEvent`]s through [`PeerSessionManager::handle_event`] (or
//! the [`run_event_loop`](PeerSessionManager::run_event_loop) pump) and
//! get [`SessionEvent`]s back. Both paths are the same code.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::crypto::safety_code;
use crate::message::Message;
use crate::peer::events::{PeerTransportState, SessionEvent, TransportEvent};
use crate::peer::handshake::{self, HandshakeError, InvitationContext};
use crate::peer::id::PeerId;
use crate::peer::keystore::KeyStore;
use crate::peer::messaging::{open_message, seal_message, MessagingError};
use crate::peer::state::{ConnectionState, ConnectionTracker};
use crate::peer::table::PeerSessionTable;
use crate::peer::transport::{AdvertisedIdentity, PeerTransport};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Anything a session-level operation can fail with.
///
/// Every variant is recoverable at peer scope: one peer's bad day never
/// corrupts state for other peers or kills the instance.
#[derive(Debug, Error)]
pub enum PeerSessionError {
    /// Send or receive attempted for a peer that never completed a
    /// handshake, or whose session was evicted on disconnect.
    #[error("no shared secret on file for peer {0}")]
    NoSharedSecret(PeerId),

    /// The invitation handshake failed; the connection was rejected.
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    /// Sealing or opening a message failed.
    #[error(transparent)]
    Messaging(#[from] MessagingError),
}

// ---------------------------------------------------------------------------
// PeerSessionManager
// ---------------------------------------------------------------------------

/// Mutable state guarded by the manager's lock, as one unit.
struct SessionState {
    table: PeerSessionTable,
    tracker: ConnectionTracker,
    received: Vec<Message>,
}

/// One protocol instance: keys, sessions, state machine, transport handle.
///
/// Construct one per process run. The session keypair inside is ephemeral
/// to the instance — a fresh manager means a fresh session key, and every
/// secret negotiated by a previous instance is dead with it.
pub struct PeerSessionManager {
    config: SessionConfig,
    keys: KeyStore,
    transport: Arc<dyn PeerTransport>,
    state: Mutex<SessionState>,
}

impl PeerSessionManager {
    /// Create a manager with fresh identity and session keypairs.
    pub fn new(config: SessionConfig, transport: Arc<dyn PeerTransport>) -> Self {
        let keys = KeyStore::new();
        info!(
            display_name = %config.display_name,
            identity = %hex::encode(&keys.identity_public_key()[..8]),
            "peer session manager created"
        );
        Self {
            config,
            keys,
            transport,
            state: Mutex::new(SessionState {
                table: PeerSessionTable::new(),
                tracker: ConnectionTracker::new(),
                received: Vec::new(),
            }),
        }
    }

    /// The long-term identity public key, for advertisement and safety
    /// codes.
    pub fn identity_public_key(&self) -> [u8; 32] {
        self.keys.identity_public_key()
    }

    /// The per-run session public key, for invitation context payloads.
    pub fn session_public_key(&self) -> [u8; 32] {
        self.keys.session_public_key()
    }

    /// The display name peers see in advertisements and as message sender.
    pub fn display_name(&self) -> &str {
        &self.config.display_name
    }

    // -----------------------------------------------------------------------
    // Caller commands
    // -----------------------------------------------------------------------

    /// Start advertising the local identity and browsing for peers.
    ///
    /// Idempotent; calling it with sessions already live leaves them (and
    /// the aggregate state) alone.
    pub fn start_discovery(&self) {
        let transition = self.state.lock().tracker.discovery_started();
        self.transport.advertise(&AdvertisedIdentity {
            display_name: self.config.display_name.clone(),
            public_key: self.keys.identity_public_key(),
        });
        self.transport.browse();
        info!(display_name = %self.config.display_name, "discovery started");
        if let Some(state) = transition {
            debug!(%state, "connection state changed");
        }
    }

    /// Stop discovery and go silent.
    ///
    /// This is a full teardown, not a pause: live links are closed, every
    /// shared secret is evicted, and the aggregate state returns to
    /// disconnected. Reconnection is a fresh discovery/invite cycle.
    pub fn stop_discovery(&self) {
        let evicted = self.teardown();
        info!(evicted, "discovery stopped; session state cleared");
    }

    /// Disconnect from every peer and stop all transport activity.
    pub fn disconnect_all(&self) {
        let evicted = self.teardown();
        info!(evicted, "disconnected from all peers");
    }

    fn teardown(&self) -> usize {
        let evicted = {
            let mut state = self.state.lock();
            let evicted = state.table.len();
            state.table.evict_all();
            state.tracker.reset();
            evicted
        };
        self.transport.stop();
        evicted
    }

    /// Invite a discovered peer to connect.
    ///
    /// The local session public key rides along as the invitation context;
    /// no secret is derived here. Derivation happens on receipt of the
    /// remote session key, on whichever side and in whichever order the
    /// transport delivers it.
    pub fn invite(&self, peer: &PeerId) {
        let context = InvitationContext::from_session(self.keys.session());
        self.transport.invite_peer(peer, context.as_bytes());
        info!(peer = %peer, "invitation sent with session key context");
    }

    /// Seal a text message for a peer and hand it to the transport.
    ///
    /// Returns the sealed blob that was sent. Fails with
    /// [`PeerSessionError::NoSharedSecret`] if no handshake has completed
    /// for this peer.
    pub fn send_text(&self, peer: &PeerId, text: &str) -> Result<Vec<u8>, PeerSessionError> {
        let message = Message::new(text.to_string(), self.config.display_name.clone());
        let blob = {
            let state = self.state.lock();
            let secret = state
                .table
                .lookup_secret(peer)
                .ok_or_else(|| PeerSessionError::NoSharedSecret(peer.clone()))?;
            seal_message(&secret, &message)?
        };
        self.transport.send_blob(peer, &blob);
        debug!(peer = %peer, message_id = %message.id, bytes = blob.len(), "sent sealed message");
        Ok(blob)
    }

    /// The out-of-band verification code for a peer, if its identity key
    /// has been seen in discovery.
    ///
    /// Both devices render the same code for the same pair of keys;
    /// humans compare it over any channel an attacker on the local link
    /// can't rewrite.
    pub fn safety_code_for(&self, peer: &PeerId) -> Option<String> {
        let remote = self.state.lock().table.lookup_public_key(peer)?;
        Some(safety_code(&self.keys.identity_public_key(), &remote))
    }

    // -----------------------------------------------------------------------
    // Transport notifications
    // -----------------------------------------------------------------------

    /// A peer appeared in browse results, advertising its identity key.
    pub fn on_peer_discovered(&self, peer: &PeerId, advertised_public_key: Vec<u8>) {
        {
            let mut state = self.state.lock();
            state.table.record_discovery(peer.clone(), advertised_public_key);
            state.tracker.peer_discovered(peer.clone());
        }
        debug!(peer = %peer, "peer discovered");
    }

    /// A peer vanished from browse results.
    ///
    /// Only the discovered set changes. An established session with that
    /// peer keeps its secret until the transport reports the link down —
    /// browse results flicker, live links don't.
    pub fn on_peer_lost(&self, peer: &PeerId) {
        self.state.lock().tracker.peer_lost(peer);
        debug!(peer = %peer, "peer lost");
    }

    /// An invitation arrived, carrying the remote session public key as
    /// context.
    ///
    /// `Ok` means the shared secret is stored and the transport should
    /// accept the connection; `Err` means it must decline. The secret is
    /// on file *before* this returns, so the first sealed blob on the new
    /// link always finds one.
    pub fn on_invitation_received(
        &self,
        peer: &PeerId,
        context: Option<&[u8]>,
    ) -> Result<(), PeerSessionError> {
        let secret = match handshake::respond(self.keys.session(), context) {
            Ok(secret) => secret,
            Err(err) => {
                warn!(peer = %peer, error = %err, "rejecting invitation");
                return Err(err.into());
            }
        };
        self.state.lock().table.complete_handshake(peer.clone(), secret);
        info!(peer = %peer, "invitation accepted; shared secret established");
        Ok(())
    }

    /// The transport's link state for one peer changed.
    ///
    /// A link going down evicts the peer's session record: the secret must
    /// not outlive the connection it was negotiated for. A later blob from
    /// that peer fails with no-shared-secret instead of decrypting under a
    /// stale key.
    pub fn on_peer_state_changed(&self, peer: &PeerId, transport_state: PeerTransportState) {
        {
            let mut state = self.state.lock();
            match transport_state {
                PeerTransportState::Connecting => {
                    state.table.set_status(peer.clone(), transport_state);
                    state.tracker.peer_connecting(peer);
                }
                PeerTransportState::Connected => {
                    state.table.set_status(peer.clone(), transport_state);
                    state.tracker.peer_connected(peer.clone());
                }
                PeerTransportState::NotConnected => {
                    state.table.evict(peer);
                    state.tracker.peer_disconnected(peer);
                }
            }
        }
        debug!(peer = %peer, state = %transport_state, "peer transport state changed");
    }

    /// An opaque blob arrived from a peer.
    ///
    /// Returns the decrypted message, or `Ok(None)` if it was a duplicate
    /// of one already received (same message id). Undecryptable blobs and
    /// blobs from peers with no session fail — logged and surfaced, never
    /// a panic.
    pub fn on_data_received(
        &self,
        peer: &PeerId,
        blob: &[u8],
    ) -> Result<Option<Message>, PeerSessionError> {
        let mut state = self.state.lock();
        let secret = match state.table.lookup_secret(peer) {
            Some(secret) => secret,
            None => {
                drop(state);
                warn!(peer = %peer, "dropping blob from a peer with no shared secret");
                return Err(PeerSessionError::NoSharedSecret(peer.clone()));
            }
        };
        let message = match open_message(&secret, blob) {
            Ok(message) => message,
            Err(err) => {
                drop(state);
                warn!(peer = %peer, error = %err, "dropping inbound blob");
                return Err(err.into());
            }
        };
        if state.received.contains(&message) {
            drop(state);
            debug!(peer = %peer, message_id = %message.id, "dropping duplicate message");
            return Ok(None);
        }
        state.received.push(message.clone());
        drop(state);
        debug!(peer = %peer, message_id = %message.id, "message received");
        Ok(Some(message))
    }

    // -----------------------------------------------------------------------
    // Event dispatch
    // -----------------------------------------------------------------------

    /// Apply one transport event and report what the application should
    /// know about it.
    ///
    /// Emits at most one [`SessionEvent::StateChanged`] per call, and only
    /// when the aggregate state actually moved; it is appended after the
    /// peer-level events for the same cause.
    pub fn handle_event(&self, event: TransportEvent) -> Vec<SessionEvent> {
        let before = self.connection_state();
        let mut out = Vec::new();
        match event {
            TransportEvent::PeerDiscovered { peer, public_key } => {
                self.on_peer_discovered(&peer, public_key);
                out.push(SessionEvent::PeerDiscovered { peer });
            }
            TransportEvent::PeerLost { peer } => {
                self.on_peer_lost(&peer);
                out.push(SessionEvent::PeerLost { peer });
            }
            TransportEvent::InvitationReceived { peer, context } => {
                match self.on_invitation_received(&peer, context.as_deref()) {
                    Ok(()) => out.push(SessionEvent::InvitationAccepted { peer }),
                    Err(err) => out.push(SessionEvent::InvitationRejected {
                        peer,
                        reason: err.to_string(),
                    }),
                }
            }
            TransportEvent::PeerStateChanged { peer, state } => {
                self.on_peer_state_changed(&peer, state);
                match state {
                    PeerTransportState::Connected => {
                        out.push(SessionEvent::PeerConnected { peer });
                    }
                    PeerTransportState::NotConnected => {
                        out.push(SessionEvent::PeerDisconnected { peer });
                    }
                    PeerTransportState::Connecting => {}
                }
            }
            TransportEvent::DataReceived { peer, data } => {
                match self.on_data_received(&peer, &data) {
                    Ok(Some(message)) => {
                        out.push(SessionEvent::MessageReceived { peer, message });
                    }
                    Ok(None) => out.push(SessionEvent::MessageDropped {
                        peer,
                        reason: "duplicate message id".into(),
                    }),
                    Err(err) => out.push(SessionEvent::MessageDropped {
                        peer,
                        reason: err.to_string(),
                    }),
                }
            }
        }
        let after = self.connection_state();
        if after != before {
            out.push(SessionEvent::StateChanged { state: after });
        }
        out
    }

    /// Pump transport events through [`handle_event`](Self::handle_event)
    /// until shutdown.
    ///
    /// Exits when the shutdown flag flips true, when the event channel
    /// closes, or when nobody is listening for session events anymore.
    pub async fn run_event_loop(
        &self,
        mut events: mpsc::UnboundedReceiver<TransportEvent>,
        mut shutdown: watch::Receiver<bool>,
        out: mpsc::UnboundedSender<SessionEvent>,
    ) {
        info!("session event loop started");
        loop {
            if *shutdown.borrow() {
                info!("session event loop shutting down");
                return;
            }
            tokio::select! {
                maybe_event = events.recv() => {
                    let event = match maybe_event {
                        Some(event) => event,
                        None => {
                            info!("transport event channel closed; stopping event loop");
                            return;
                        }
                    };
                    for session_event in self.handle_event(event) {
                        if out.send(session_event).is_err() {
                            debug!("session event receiver dropped; stopping event loop");
                            return;
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("session event loop shutting down");
                        return;
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Observability
    // -----------------------------------------------------------------------

    /// Current aggregate connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.state.lock().tracker.state()
    }

    /// Peers with a live transport link.
    pub fn connected_peers(&self) -> Vec<PeerId> {
        self.state.lock().tracker.connected()
    }

    /// Peers currently visible in browse results.
    pub fn discovered_peers(&self) -> Vec<PeerId> {
        self.state.lock().tracker.discovered()
    }

    /// Every message received this run, in arrival order.
    ///
    /// Survives disconnects and teardown — conversation history is the
    /// application's to keep, only the key material dies with the session.
    pub fn received_messages(&self) -> Vec<Message> {
        self.state.lock().received.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SessionKeypair;

    #[derive(Debug, Clone, PartialEq)]
    enum TransportCall {
        Advertise { display_name: String },
        Browse,
        Stop,
        Invite { peer: PeerId, context: Vec<u8> },
        Send { peer: PeerId, blob: Vec<u8> },
    }

    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<TransportCall>>,
    }

    impl RecordingTransport {
        fn calls(&self) -> Vec<TransportCall> {
            self.calls.lock().clone()
        }
    }

    impl PeerTransport for RecordingTransport {
        fn advertise(&self, identity: &AdvertisedIdentity) {
            self.calls.lock().push(TransportCall::Advertise {
                display_name: identity.display_name.clone(),
            });
        }

        fn browse(&self) {
            self.calls.lock().push(TransportCall::Browse);
        }

        fn stop(&self) {
            self.calls.lock().push(TransportCall::Stop);
        }

        fn invite_peer(&self, peer: &PeerId, context: &[u8]) {
            self.calls.lock().push(TransportCall::Invite {
                peer: peer.clone(),
                context: context.to_vec(),
            });
        }

        fn send_blob(&self, peer: &PeerId, blob: &[u8]) {
            self.calls.lock().push(TransportCall::Send {
                peer: peer.clone(),
                blob: blob.to_vec(),
            });
        }
    }

    struct Harness {
        manager: PeerSessionManager,
        transport: Arc<RecordingTransport>,
    }

    fn setup() -> Harness {
        setup_named("test-device")
    }

    fn setup_named(name: &str) -> Harness {
        let transport = Arc::new(RecordingTransport::default());
        let config = SessionConfig {
            display_name: name.to_string(),
        };
        let manager = PeerSessionManager::new(config, transport.clone());
        Harness { manager, transport }
    }

    fn peer(name: &str) -> PeerId {
        PeerId::new(name)
    }

    /// Drive a peer through discovery, handshake, and connection.
    fn connect_peer(h: &Harness, id: &PeerId, remote: &SessionKeypair) {
        h.manager.on_peer_discovered(id, vec![0xAA; 32]);
        h.manager
            .on_invitation_received(id, Some(&remote.public_key_bytes()))
            .unwrap();
        h.manager
            .on_peer_state_changed(id, PeerTransportState::Connecting);
        h.manager
            .on_peer_state_changed(id, PeerTransportState::Connected);
    }

    #[test]
    fn test_start_discovery_advertises_and_browses() {
        let h = setup();
        h.manager.start_discovery();

        assert_eq!(
            h.transport.calls(),
            vec![
                TransportCall::Advertise {
                    display_name: "test-device".to_string()
                },
                TransportCall::Browse,
            ]
        );
        assert_eq!(h.manager.connection_state(), ConnectionState::Discovering);
    }

    #[test]
    fn test_invite_attaches_session_public_key() {
        let h = setup();
        let bob = peer("bob");
        h.manager.invite(&bob);

        let calls = h.transport.calls();
        assert_eq!(
            calls,
            vec![TransportCall::Invite {
                peer: bob,
                context: h.manager.session_public_key().to_vec(),
            }]
        );
    }

    #[test]
    fn test_invitation_with_valid_context_is_accepted() {
        let h = setup();
        let bob = peer("bob");
        let remote = SessionKeypair::generate();

        h.manager
            .on_invitation_received(&bob, Some(&remote.public_key_bytes()))
            .unwrap();

        // The secret is on file: sending works immediately.
        assert!(h.manager.send_text(&bob, "hello").is_ok());
    }

    #[test]
    fn test_invitation_without_context_is_rejected() {
        let h = setup();
        let bob = peer("bob");

        let err = h.manager.on_invitation_received(&bob, None).unwrap_err();
        assert!(matches!(
            err,
            PeerSessionError::Handshake(HandshakeError::MissingContext)
        ));

        // No entry was created for the rejected peer.
        let send_err = h.manager.send_text(&bob, "hello").unwrap_err();
        assert!(matches!(send_err, PeerSessionError::NoSharedSecret(p) if p == bob));
    }

    #[test]
    fn test_invitation_with_garbage_context_is_rejected() {
        let h = setup();
        let bob = peer("bob");

        let err = h
            .manager
            .on_invitation_received(&bob, Some(&[1, 2, 3]))
            .unwrap_err();
        assert!(matches!(
            err,
            PeerSessionError::Handshake(HandshakeError::InvalidContext(_))
        ));
    }

    #[test]
    fn test_send_text_without_handshake_fails() {
        let h = setup();
        let err = h.manager.send_text(&peer("stranger"), "hi").unwrap_err();
        assert!(matches!(err, PeerSessionError::NoSharedSecret(p) if p == peer("stranger")));
        // Nothing went out on the wire.
        assert!(h.transport.calls().is_empty());
    }

    #[test]
    fn message_round_trip_between_two_managers() {
        let alice = setup_named("alice");
        let bob = setup_named("bob");
        let alice_id = peer("alice");
        let bob_id = peer("bob");

        // --- 1. both sides learn the other's session key via invitations ---
        bob.manager
            .on_invitation_received(&alice_id, Some(&alice.manager.session_public_key()))
            .unwrap();
        alice
            .manager
            .on_invitation_received(&bob_id, Some(&bob.manager.session_public_key()))
            .unwrap();

        // --- 2. alice seals a message and bob opens it ---
        let blob = alice.manager.send_text(&bob_id, "hi").unwrap();
        let received = bob
            .manager
            .on_data_received(&alice_id, &blob)
            .unwrap()
            .expect("first delivery is not a duplicate");

        assert_eq!(received.text, "hi");
        assert_eq!(received.sender, "alice");
        assert!(received.is_encrypted);
        assert_eq!(bob.manager.received_messages(), vec![received]);
    }

    #[test]
    fn duplicate_blob_is_dropped_on_redelivery() {
        let alice = setup_named("alice");
        let bob = setup_named("bob");
        let alice_id = peer("alice");
        let bob_id = peer("bob");

        bob.manager
            .on_invitation_received(&alice_id, Some(&alice.manager.session_public_key()))
            .unwrap();
        alice
            .manager
            .on_invitation_received(&bob_id, Some(&bob.manager.session_public_key()))
            .unwrap();

        let blob = alice.manager.send_text(&bob_id, "once").unwrap();
        assert!(bob
            .manager
            .on_data_received(&alice_id, &blob)
            .unwrap()
            .is_some());
        assert!(bob
            .manager
            .on_data_received(&alice_id, &blob)
            .unwrap()
            .is_none());
        assert_eq!(bob.manager.received_messages().len(), 1);
    }

    #[test]
    fn disconnect_evicts_secret_and_stale_blob_is_dropped() {
        let alice = setup_named("alice");
        let bob = setup_named("bob");
        let alice_id = peer("alice");
        let bob_id = peer("bob");

        bob.manager.start_discovery();
        bob.manager
            .on_invitation_received(&alice_id, Some(&alice.manager.session_public_key()))
            .unwrap();
        alice
            .manager
            .on_invitation_received(&bob_id, Some(&bob.manager.session_public_key()))
            .unwrap();
        bob.manager
            .on_peer_state_changed(&alice_id, PeerTransportState::Connected);

        let blob = alice.manager.send_text(&bob_id, "late").unwrap();

        // The link drops before the blob is delivered.
        bob.manager
            .on_peer_state_changed(&alice_id, PeerTransportState::NotConnected);

        let err = bob.manager.on_data_received(&alice_id, &blob).unwrap_err();
        assert!(matches!(err, PeerSessionError::NoSharedSecret(p) if p == alice_id));
        assert!(bob.manager.received_messages().is_empty());
        // Discovery is still running, so the aggregate reverts to it.
        assert_eq!(bob.manager.connection_state(), ConnectionState::Discovering);
    }

    #[test]
    fn rediscovered_peer_can_handshake_again_after_eviction() {
        let h = setup();
        let bob = peer("bob");
        let first = SessionKeypair::generate();
        connect_peer(&h, &bob, &first);

        h.manager
            .on_peer_state_changed(&bob, PeerTransportState::NotConnected);
        assert!(matches!(
            h.manager.send_text(&bob, "gone").unwrap_err(),
            PeerSessionError::NoSharedSecret(_)
        ));

        // A reconnecting peer shows up with a fresh session key; the
        // handshake recreates the record from scratch.
        let second = SessionKeypair::generate();
        h.manager
            .on_invitation_received(&bob, Some(&second.public_key_bytes()))
            .unwrap();
        assert!(h.manager.send_text(&bob, "back").is_ok());
    }

    #[test]
    fn test_aggregate_state_sequence_for_single_peer() {
        let h = setup();
        let bob = peer("bob");
        assert_eq!(h.manager.connection_state(), ConnectionState::Disconnected);

        h.manager.start_discovery();
        assert_eq!(h.manager.connection_state(), ConnectionState::Discovering);

        h.manager.on_peer_discovered(&bob, vec![0xBB; 32]);
        h.manager
            .on_peer_state_changed(&bob, PeerTransportState::Connecting);
        assert_eq!(h.manager.connection_state(), ConnectionState::Connecting);

        h.manager
            .on_peer_state_changed(&bob, PeerTransportState::Connected);
        assert_eq!(h.manager.connection_state(), ConnectionState::Connected);
        assert_eq!(h.manager.connected_peers(), vec![bob.clone()]);

        // Last peer drops while discovery is still active: back to
        // discovering, not disconnected.
        h.manager
            .on_peer_state_changed(&bob, PeerTransportState::NotConnected);
        assert_eq!(h.manager.connection_state(), ConnectionState::Discovering);
        assert!(h.manager.connected_peers().is_empty());
    }

    #[test]
    fn stop_discovery_tears_everything_down() {
        let h = setup();
        let bob = peer("bob");
        let remote = SessionKeypair::generate();
        h.manager.start_discovery();
        connect_peer(&h, &bob, &remote);
        assert_eq!(h.manager.connection_state(), ConnectionState::Connected);

        h.manager.stop_discovery();

        assert_eq!(h.manager.connection_state(), ConnectionState::Disconnected);
        assert!(h.manager.connected_peers().is_empty());
        assert!(h.manager.discovered_peers().is_empty());
        assert!(matches!(
            h.manager.send_text(&bob, "hello?").unwrap_err(),
            PeerSessionError::NoSharedSecret(_)
        ));
        assert!(h.transport.calls().contains(&TransportCall::Stop));
    }

    #[test]
    fn received_messages_survive_teardown() {
        let alice = setup_named("alice");
        let bob = setup_named("bob");
        let alice_id = peer("alice");
        let bob_id = peer("bob");

        bob.manager
            .on_invitation_received(&alice_id, Some(&alice.manager.session_public_key()))
            .unwrap();
        alice
            .manager
            .on_invitation_received(&bob_id, Some(&bob.manager.session_public_key()))
            .unwrap();
        let blob = alice.manager.send_text(&bob_id, "keep me").unwrap();
        bob.manager.on_data_received(&alice_id, &blob).unwrap();

        bob.manager.disconnect_all();
        assert_eq!(bob.manager.received_messages().len(), 1);
    }

    #[test]
    fn safety_code_matches_on_both_sides() {
        let alice = setup_named("alice");
        let bob = setup_named("bob");
        let alice_id = peer("alice");
        let bob_id = peer("bob");

        assert!(alice.manager.safety_code_for(&bob_id).is_none());

        alice
            .manager
            .on_peer_discovered(&bob_id, bob.manager.identity_public_key().to_vec());
        bob.manager
            .on_peer_discovered(&alice_id, alice.manager.identity_public_key().to_vec());

        let from_alice = alice.manager.safety_code_for(&bob_id).unwrap();
        let from_bob = bob.manager.safety_code_for(&alice_id).unwrap();
        assert_eq!(from_alice, from_bob);
        assert_eq!(from_alice.len(), 15); // 12 digits + 3 hyphens
    }

    #[test]
    fn peer_lost_keeps_the_session_alive() {
        let h = setup();
        let bob = peer("bob");
        let remote = SessionKeypair::generate();
        h.manager.start_discovery();
        connect_peer(&h, &bob, &remote);

        h.manager.on_peer_lost(&bob);

        assert!(h.manager.discovered_peers().is_empty());
        assert_eq!(h.manager.connection_state(), ConnectionState::Connected);
        assert!(h.manager.send_text(&bob, "still here").is_ok());
    }

    #[test]
    fn handle_event_mirrors_named_entry_points() {
        let h = setup();
        let bob = peer("bob");
        let remote = SessionKeypair::generate();
        h.manager.start_discovery();

        // --- 1. discovery ---
        let events = h.manager.handle_event(TransportEvent::PeerDiscovered {
            peer: bob.clone(),
            public_key: vec![0xCC; 32],
        });
        assert_eq!(events, vec![SessionEvent::PeerDiscovered { peer: bob.clone() }]);

        // --- 2. handshake ---
        let events = h.manager.handle_event(TransportEvent::InvitationReceived {
            peer: bob.clone(),
            context: Some(remote.public_key_bytes().to_vec()),
        });
        assert_eq!(
            events,
            vec![SessionEvent::InvitationAccepted { peer: bob.clone() }]
        );

        // --- 3. connection, with aggregate transitions ---
        let events = h.manager.handle_event(TransportEvent::PeerStateChanged {
            peer: bob.clone(),
            state: PeerTransportState::Connecting,
        });
        assert_eq!(
            events,
            vec![SessionEvent::StateChanged {
                state: ConnectionState::Connecting
            }]
        );
        let events = h.manager.handle_event(TransportEvent::PeerStateChanged {
            peer: bob.clone(),
            state: PeerTransportState::Connected,
        });
        assert_eq!(
            events,
            vec![
                SessionEvent::PeerConnected { peer: bob.clone() },
                SessionEvent::StateChanged {
                    state: ConnectionState::Connected
                },
            ]
        );

        // --- 4. inbound data from the remote's symmetric secret ---
        let secret = remote
            .derive_shared_secret(&h.manager.session_public_key())
            .unwrap();
        let message = Message::new("over the wire".to_string(), "remote".to_string());
        let blob = seal_message(&secret, &message).unwrap();
        let events = h.manager.handle_event(TransportEvent::DataReceived {
            peer: bob.clone(),
            data: blob.clone(),
        });
        assert_eq!(
            events,
            vec![SessionEvent::MessageReceived {
                peer: bob.clone(),
                message: message.clone(),
            }]
        );

        // --- 5. a redelivered blob is reported as dropped ---
        let events = h.manager.handle_event(TransportEvent::DataReceived {
            peer: bob.clone(),
            data: blob,
        });
        assert_eq!(
            events,
            vec![SessionEvent::MessageDropped {
                peer: bob.clone(),
                reason: "duplicate message id".into(),
            }]
        );

        // --- 6. disconnect, reverting the aggregate to discovering ---
        let events = h.manager.handle_event(TransportEvent::PeerStateChanged {
            peer: bob.clone(),
            state: PeerTransportState::NotConnected,
        });
        assert_eq!(
            events,
            vec![
                SessionEvent::PeerDisconnected { peer: bob.clone() },
                SessionEvent::StateChanged {
                    state: ConnectionState::Discovering
                },
            ]
        );

        // --- 7. rejected invitation and discovery loss ---
        let events = h.manager.handle_event(TransportEvent::InvitationReceived {
            peer: bob.clone(),
            context: None,
        });
        assert_eq!(
            events,
            vec![SessionEvent::InvitationRejected {
                peer: bob.clone(),
                reason: "invitation carried no session key context".into(),
            }]
        );
        let events = h
            .manager
            .handle_event(TransportEvent::PeerLost { peer: bob.clone() });
        assert_eq!(events, vec![SessionEvent::PeerLost { peer: bob }]);
    }

    #[tokio::test]
    async fn event_loop_delivers_events_and_stops_on_shutdown() {
        let h = setup();
        let manager = Arc::new(h.manager);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (session_tx, mut session_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let pump = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                manager.run_event_loop(event_rx, shutdown_rx, session_tx).await;
            })
        };

        event_tx
            .send(TransportEvent::PeerDiscovered {
                peer: peer("x"),
                public_key: vec![1; 32],
            })
            .unwrap();
        assert_eq!(
            session_rx.recv().await.unwrap(),
            SessionEvent::PeerDiscovered { peer: peer("x") }
        );
        assert_eq!(manager.discovered_peers(), vec![peer("x")]);

        shutdown_tx.send(true).unwrap();
        pump.await.unwrap();
    }

    #[tokio::test]
    async fn event_loop_stops_when_event_channel_closes() {
        let h = setup();
        let manager = Arc::new(h.manager);
        let (event_tx, event_rx) = mpsc::unbounded_channel::<TransportEvent>();
        let (session_tx, _session_rx) = mpsc::unbounded_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let pump = tokio::spawn(async move {
            manager.run_event_loop(event_rx, shutdown_rx, session_tx).await;
        });

        drop(event_tx);
        pump.await.unwrap();
    }
}
