//! # Transport Abstraction
//!
//! The seam between the protocol and whatever actually moves bytes between
//! nearby devices — multipeer radios, BLE, a loopback pair in tests. The
//! session manager drives the transport through this trait and hears back
//! exclusively through [`TransportEvent`](crate::peer::events::TransportEvent)s.
//!
//! ## Fire-and-forget on purpose
//!
//! Every method here returns `()`. Proximity transports are asynchronous
//! and lossy by nature: an invitation can be ignored, a send can race a
//! peer walking out of range, and the *only* truthful answer available at
//! call time is "the request was handed to the radio". Outcomes arrive
//! later as transport events (state changes, received data) or don't
//! arrive at all. A `Result` here would be a lie with extra steps.

use crate::peer::id::PeerId;

/// What a device advertises about itself during discovery.
///
/// The transport decides how to encode this on the air (TXT records,
/// advertisement payloads, whatever the medium offers). The protocol only
/// cares that the peer on the other side receives both fields intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisedIdentity {
    /// Human-readable device name, shown in peer pickers and carried as
    /// the `sender` label on messages.
    pub display_name: String,
    /// The device's Ed25519 identity public key.
    pub public_key: [u8; 32],
}

/// The proximity transport driven by the session manager.
///
/// Object-safe and `Send + Sync`: the manager holds it as
/// `Arc<dyn PeerTransport>` and may call it from the event-pump task.
/// Implementations must not call back into the manager synchronously —
/// deliver reactions as transport events instead, or you will deadlock
/// on the manager's lock.
pub trait PeerTransport: Send + Sync {
    /// Start advertising the local identity to nearby devices.
    fn advertise(&self, identity: &AdvertisedIdentity);

    /// Start browsing for nearby advertisers.
    fn browse(&self);

    /// Stop advertising and browsing, and close any open links.
    fn stop(&self);

    /// Invite a discovered peer to connect, attaching the handshake
    /// context (the local session public key).
    fn invite_peer(&self, peer: &PeerId, context: &[u8]);

    /// Send an opaque sealed blob to a connected peer.
    fn send_blob(&self, peer: &PeerId, blob: &[u8]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct NullTransport;

    impl PeerTransport for NullTransport {
        fn advertise(&self, _identity: &AdvertisedIdentity) {}
        fn browse(&self) {}
        fn stop(&self) {}
        fn invite_peer(&self, _peer: &PeerId, _context: &[u8]) {}
        fn send_blob(&self, _peer: &PeerId, _blob: &[u8]) {}
    }

    #[test]
    fn trait_is_object_safe() {
        // The manager stores Arc<dyn PeerTransport>; this must keep compiling.
        let transport: Arc<dyn PeerTransport> = Arc::new(NullTransport);
        let identity = AdvertisedIdentity {
            display_name: "test-device".into(),
            public_key: [0xAB; 32],
        };
        transport.advertise(&identity);
        transport.browse();
        transport.invite_peer(&PeerId::new("p"), &[0u8; 32]);
        transport.send_blob(&PeerId::new("p"), b"blob");
        transport.stop();
    }
}
