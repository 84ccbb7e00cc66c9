//! # Invitation Handshake
//!
//! Key agreement piggy-backed on connection invitations. There is no
//! separate handshake round-trip in this protocol: the invitation *is* the
//! handshake.
//!
//! ## How the one-message handshake works
//!
//! When device A invites device B, A attaches its X25519 session public
//! key as the invitation's context payload. B receives the invitation,
//! derives the shared secret from that key, stores it, and only then tells
//! the transport to accept. When B's acceptance flows back, the transport
//! surfaces B's session key to A the same way — as invitation context in
//! the opposite direction — so both sides funnel through one derivation
//! point: [`respond`]. By the time the transport reports the link as
//! connected, both peers already hold the same AES-256 key.
//!
//! ## Rejection policy
//!
//! An invitation with no context is a device that isn't speaking this
//! protocol; an invitation with a malformed or degenerate key is a device
//! speaking it wrongly (or adversarially). Both are rejected before
//! anything is stored and before the transport-level accept — a peer that
//! can't complete key agreement never gets a connection, so there is no
//! window where an unencrypted link exists.

use thiserror::Error;

use crate::crypto::agreement::{KeyAgreementError, SessionKeypair, SharedKey};
use crate::config::AGREEMENT_KEY_LENGTH;

/// Errors while processing an inbound invitation.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The invitation carried no context payload at all.
    #[error("invitation carried no session key context")]
    MissingContext,

    /// The context payload was present but unusable as a session key.
    #[error("invitation context rejected: {0}")]
    InvalidContext(#[from] KeyAgreementError),
}

// ---------------------------------------------------------------------------
// InvitationContext
// ---------------------------------------------------------------------------

/// The context payload attached to every outbound invitation: the raw
/// 32-byte X25519 session public key, nothing else.
///
/// No framing, no version byte, no length prefix. The transport already
/// delimits the payload, and a fixed-size raw key is the one format that
/// can't be mis-parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationContext([u8; AGREEMENT_KEY_LENGTH]);

impl InvitationContext {
    /// Build the context for an outbound invitation from the local session
    /// keypair.
    pub fn from_session(session: &SessionKeypair) -> Self {
        Self(session.public_key_bytes())
    }

    /// Parse an inbound invitation's context payload.
    ///
    /// `None` means the inviter attached nothing; a slice of the wrong
    /// length means the payload is not a session key. Neither is
    /// recoverable — the invitation gets declined.
    pub fn parse(raw: Option<&[u8]>) -> Result<Self, HandshakeError> {
        let raw = raw.ok_or(HandshakeError::MissingContext)?;
        let bytes: [u8; AGREEMENT_KEY_LENGTH] = raw
            .try_into()
            .map_err(|_| HandshakeError::InvalidContext(KeyAgreementError::InvalidPublicKey))?;
        Ok(Self(bytes))
    }

    /// The raw session key bytes.
    pub fn as_bytes(&self) -> &[u8; AGREEMENT_KEY_LENGTH] {
        &self.0
    }

    /// The context as an owned byte vector, ready to hand to the transport.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

/// Process the remote session key from an invitation and derive the shared
/// secret.
///
/// This is the single derivation point for both handshake directions:
/// the invitee calls it with the inviter's context, and the inviter calls
/// it when the accepter's key flows back. Success hands the caller a
/// [`SharedKey`] to store; any error means "decline the invitation".
pub fn respond(
    session: &SessionKeypair,
    context: Option<&[u8]>,
) -> Result<SharedKey, HandshakeError> {
    let ctx = InvitationContext::parse(context)?;
    let secret = session.derive_shared_secret(ctx.as_bytes())?;
    Ok(secret)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
