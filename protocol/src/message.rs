//! Core message model for Nearlink sessions.
//!
//! A [`Message`] is what the application layer hands to the protocol and
//! what comes back out on the far side. On the wire it only ever exists as
//! JSON inside an AES-256-GCM sealed blob; the plaintext struct never
//! leaves the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message exchanged between two connected peers.
///
/// Identity lives in `id`: equality and inbound de-duplication compare the
/// UUID and nothing else. A retransmitted message with the same id is the
/// same message, even if a buggy sender mutated the text in between.
///
/// `sender` is the display-name label the sending device was configured
/// with. It is informational — the cryptographic peer identity is the
/// session, not this string.
///
/// # Examples
///
/// ```
/// use nearlink_protocol::message::Message;
///
/// let msg = Message::new("on my way".into(), "dana's phone".into());
/// assert!(msg.is_encrypted);
/// assert_eq!(msg.text, "on my way");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id, generated at creation (UUID v4).
    pub id: Uuid,
    /// The message body as typed by the user.
    pub text: String,
    /// Display name of the sending device.
    pub sender: String,
    /// Creation time on the sending device.
    pub timestamp: DateTime<Utc>,
    /// Whether this message travelled inside a sealed blob. Always `true`
    /// for messages produced by this crate; carried explicitly so a future
    /// plaintext-capable UI can badge the difference.
    pub is_encrypted: bool,
}

impl Message {
    /// Build a new outbound message: fresh UUID, current UTC timestamp,
    /// marked encrypted.
    pub fn new(text: String, sender: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            sender,
            timestamp: Utc::now(),
            is_encrypted: true,
        }
    }
}

impl PartialEq for Message {
    /// Messages are equal iff their ids are equal. Content is not consulted.
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Message {}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.sender, self.text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
