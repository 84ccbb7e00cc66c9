//! Interactive CLI demo of the full Nearlink session lifecycle.
//!
//! Walks two in-process devices through discovery, the invitation
//! handshake, safety-code verification, sealed messaging under hostile
//! delivery conditions, and teardown. The output uses ANSI escape codes
//! for colored, storytelling-style terminal rendering.
//!
//! Run with:
//!   cargo run --example demo --release

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use nearlink_protocol::config::SessionConfig;
use nearlink_protocol::peer::{
    AdvertisedIdentity, PeerId, PeerSessionManager, PeerTransport, PeerTransportState,
    SessionEvent, TransportEvent,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const ITALIC: &str = "\x1b[3m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    NEARLINK PROTOCOL  --  Interactive Session Demo                 {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    Version 0.1.0  |  Ed25519 + X25519/HKDF + AES-256-GCM           {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!(
        "{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=============================================================={RESET}"
    );
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!(
        "{CYAN}------------------------------------------------------------------------{RESET}"
    );
}

fn subsection(text: &str) {
    println!("{DIM}{CYAN}  >> {text}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("{DIM}{MAGENTA}  [{label}: {ms:.2} ms]{RESET}");
}

fn key_row(name: &str, key: &[u8; 32], color: &str) {
    let hex = hex::encode(key);
    let prefix = &hex[..12];
    let suffix = &hex[hex.len() - 8..];
    println!(
        "  {color}{BOLD}{name}{RESET}  {DIM}{prefix}...{suffix}{RESET}  {DIM}(32 bytes){RESET}"
    );
}

fn event_row(device: &str, event: &SessionEvent, color: &str) {
    println!("  {color}{BOLD}{device:<6}{RESET} {DIM}<-{RESET} {WHITE}{event:?}{RESET}");
}

fn separator() {
    println!(
        "{DIM}{CYAN}  . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . {RESET}"
    );
}

// ---------------------------------------------------------------------------
// Loopback wiring
// ---------------------------------------------------------------------------

/// One half of an in-memory loopback: every transport call this device
/// makes becomes a queued event in the other device's inbox, carrying only
/// what would really cross the air.
struct LoopbackTransport {
    local_label: PeerId,
    remote_inbox: Arc<Mutex<VecDeque<TransportEvent>>>,
}

impl PeerTransport for LoopbackTransport {
    fn advertise(&self, identity: &AdvertisedIdentity) {
        self.remote_inbox
            .lock()
            .push_back(TransportEvent::PeerDiscovered {
                peer: self.local_label.clone(),
                public_key: identity.public_key.to_vec(),
            });
    }

    fn browse(&self) {}

    fn stop(&self) {
        self.remote_inbox
            .lock()
            .push_back(TransportEvent::PeerStateChanged {
                peer: self.local_label.clone(),
                state: PeerTransportState::NotConnected,
            });
    }

    fn invite_peer(&self, _peer: &PeerId, context: &[u8]) {
        self.remote_inbox
            .lock()
            .push_back(TransportEvent::InvitationReceived {
                peer: self.local_label.clone(),
                context: Some(context.to_vec()),
            });
    }

    fn send_blob(&self, _peer: &PeerId, blob: &[u8]) {
        self.remote_inbox
            .lock()
            .push_back(TransportEvent::DataReceived {
                peer: self.local_label.clone(),
                data: blob.to_vec(),
            });
    }
}

struct Device {
    manager: PeerSessionManager,
    inbox: Arc<Mutex<VecDeque<TransportEvent>>>,
    label: PeerId,
}

impl Device {
    /// Drain queued transport events into the manager, collecting the
    /// session events it emits.
    fn pump(&self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        loop {
            let next = self.inbox.lock().pop_front();
            match next {
                Some(event) => out.extend(self.manager.handle_event(event)),
                None => break,
            }
        }
        out
    }

    fn push(&self, event: TransportEvent) {
        self.inbox.lock().push_back(event);
    }
}

fn device_pair() -> (Device, Device) {
    let alice_inbox = Arc::new(Mutex::new(VecDeque::new()));
    let bob_inbox = Arc::new(Mutex::new(VecDeque::new()));
    let alice_label = PeerId::new("alice");
    let bob_label = PeerId::new("bob");

    let alice = Device {
        manager: PeerSessionManager::new(
            SessionConfig {
                display_name: "Alice's phone".to_string(),
            },
            Arc::new(LoopbackTransport {
                local_label: alice_label.clone(),
                remote_inbox: Arc::clone(&bob_inbox),
            }),
        ),
        inbox: alice_inbox,
        label: alice_label,
    };
    let bob = Device {
        manager: PeerSessionManager::new(
            SessionConfig {
                display_name: "Bob's laptop".to_string(),
            },
            Arc::new(LoopbackTransport {
                local_label: bob_label.clone(),
                remote_inbox: Arc::clone(&alice.inbox),
            }),
        ),
        inbox: bob_inbox,
        label: bob_label,
    };
    (alice, bob)
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let demo_start = Instant::now();

    banner();

    // -----------------------------------------------------------------------
    // Step 1: Device Identities
    // -----------------------------------------------------------------------

    section(1, "Device Identity Generation");
    subsection(
        "Creating two devices, each with an Ed25519 identity key and a fresh X25519 session key...",
    );

    let t = Instant::now();
    let (alice, bob) = device_pair();
    timing("keygen x2 devices", t.elapsed());

    println!();
    println!("  {BOLD}{WHITE}--- Identity Public Keys (long-lived) ---{RESET}");
    key_row("Alice", &alice.manager.identity_public_key(), BLUE);
    key_row("Bob  ", &bob.manager.identity_public_key(), GREEN);
    println!();
    println!("  {BOLD}{WHITE}--- Session Public Keys (this process only) ---{RESET}");
    key_row("Alice", &alice.manager.session_public_key(), BLUE);
    key_row("Bob  ", &bob.manager.session_public_key(), GREEN);
    println!();
    success("Identity keys persist across sessions; session keys die with the process");

    // -----------------------------------------------------------------------
    // Step 2: Proximity Discovery
    // -----------------------------------------------------------------------

    section(2, "Proximity Discovery");
    subsection("Both devices advertise and browse the same service type...");

    alice.manager.start_discovery();
    bob.manager.start_discovery();

    for ev in alice.pump() {
        event_row("alice", &ev, BLUE);
    }
    for ev in bob.pump() {
        event_row("bob", &ev, GREEN);
    }

    println!();
    info(
        "Alice's state",
        &alice.manager.connection_state().to_string(),
    );
    info("Bob's state", &bob.manager.connection_state().to_string());
    info(
        "Alice sees",
        &format!("{:?}", alice.manager.discovered_peers()),
    );
    info("Bob sees", &format!("{:?}", bob.manager.discovered_peers()));
    success("Each device sees the other and holds its advertised identity key");

    // -----------------------------------------------------------------------
    // Step 3: Invitation & Key Agreement
    // -----------------------------------------------------------------------

    section(3, "Invitation Handshake & Key Agreement");
    subsection("Alice invites Bob; her session public key rides along as invitation context...");

    let t = Instant::now();
    alice.manager.invite(&bob.label);
    for ev in bob.pump() {
        event_row("bob", &ev, GREEN);
    }

    subsection("Bob accepts; his session key makes the same trip in reverse...");
    bob.manager.invite(&alice.label);
    for ev in alice.pump() {
        event_row("alice", &ev, BLUE);
    }

    subsection("The transport brings the link up on both ends...");
    alice.push(TransportEvent::PeerStateChanged {
        peer: bob.label.clone(),
        state: PeerTransportState::Connecting,
    });
    alice.push(TransportEvent::PeerStateChanged {
        peer: bob.label.clone(),
        state: PeerTransportState::Connected,
    });
    bob.push(TransportEvent::PeerStateChanged {
        peer: alice.label.clone(),
        state: PeerTransportState::Connecting,
    });
    bob.push(TransportEvent::PeerStateChanged {
        peer: alice.label.clone(),
        state: PeerTransportState::Connected,
    });
    for ev in alice.pump() {
        event_row("alice", &ev, BLUE);
    }
    for ev in bob.pump() {
        event_row("bob", &ev, GREEN);
    }
    timing("handshake round-trip", t.elapsed());

    println!();
    info(
        "Alice's state",
        &alice.manager.connection_state().to_string(),
    );
    info("Bob's state", &bob.manager.connection_state().to_string());
    assert_eq!(alice.manager.connected_peers(), vec![bob.label.clone()]);
    assert_eq!(bob.manager.connected_peers(), vec![alice.label.clone()]);
    success("Both sides derived the same AES-256-GCM key via X25519 + HKDF-SHA256");

    // -----------------------------------------------------------------------
    // Step 4: Safety Code Verification
    // -----------------------------------------------------------------------

    section(4, "Safety Code Verification");
    subsection("Each device derives a 12-digit code from the two identity keys...");

    let alice_code = alice
        .manager
        .safety_code_for(&bob.label)
        .expect("bob's identity key is on file");
    let bob_code = bob
        .manager
        .safety_code_for(&alice.label)
        .expect("alice's identity key is on file");

    println!();
    println!("  {BLUE}{BOLD}Alice's screen{RESET}   {BOLD}{YELLOW}{alice_code}{RESET}");
    println!("  {GREEN}{BOLD}Bob's screen{RESET}     {BOLD}{YELLOW}{bob_code}{RESET}");
    println!();
    assert_eq!(alice_code, bob_code);
    println!(
        "  {ITALIC}{DIM}The users read these aloud to each other. A mismatch means someone{RESET}"
    );
    println!("  {ITALIC}{DIM}is sitting in the middle of the key exchange.{RESET}");
    success("Safety codes match on both screens");

    // -----------------------------------------------------------------------
    // Step 5: Sealed Messaging
    // -----------------------------------------------------------------------

    section(5, "Sealed Messaging");

    let plaintext = "Meet at the north entrance at 6.";
    subsection("Alice seals a message for Bob and hands it to the transport...");

    let t = Instant::now();
    let blob = alice
        .manager
        .send_text(&bob.label, plaintext)
        .expect("send after handshake");
    timing("seal (serialize + AES-256-GCM)", t.elapsed());

    info("Plaintext", plaintext);
    info("Wire blob size", &format!("{} bytes", blob.len()));
    info(
        "Wire blob preview",
        &format!("{}...", hex::encode(&blob[..24])),
    );
    assert!(
        !contains_subslice(&blob, plaintext.as_bytes()),
        "plaintext must never appear on the wire"
    );
    success("Wire bytes are nonce + ciphertext + tag; the plaintext is nowhere in them");

    separator();

    subsection("Bob's transport delivers the blob...");
    for ev in bob.pump() {
        event_row("bob", &ev, GREEN);
    }

    let received = bob.manager.received_messages();
    let message = received.last().expect("one message received");
    println!();
    info("Decrypted text", &message.text);
    info("Sender", &message.sender);
    info("Message id", &message.id.to_string());
    success("Bob's copy decrypted, authenticated, and recorded exactly once");

    // -----------------------------------------------------------------------
    // Step 6: Hostile Delivery Conditions
    // -----------------------------------------------------------------------

    section(6, "Hostile Delivery Conditions");
    subsection("Redelivering the same blob (transports love doing this)...");

    bob.push(TransportEvent::DataReceived {
        peer: alice.label.clone(),
        data: blob.clone(),
    });
    for ev in bob.pump() {
        event_row("bob", &ev, GREEN);
    }
    assert_eq!(bob.manager.received_messages().len(), 1);
    success("Duplicate suppressed by message id; conversation still has one copy");

    subsection("Delivering a tampered copy (one ciphertext byte flipped)...");

    let mut tampered = blob.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x01;
    bob.push(TransportEvent::DataReceived {
        peer: alice.label.clone(),
        data: tampered,
    });
    for ev in bob.pump() {
        event_row("bob", &ev, GREEN);
    }
    assert_eq!(bob.manager.received_messages().len(), 1);
    success("GCM authentication tag rejected the forgery outright");

    // -----------------------------------------------------------------------
    // Step 7: Teardown
    // -----------------------------------------------------------------------

    section(7, "Teardown");
    subsection("Alice disconnects; every derived secret on her device is destroyed...");

    alice.manager.disconnect_all();
    info(
        "Alice's state",
        &alice.manager.connection_state().to_string(),
    );

    let err = alice
        .manager
        .send_text(&bob.label, "this must fail")
        .expect_err("no shared secret after disconnect");
    info("Send after disconnect", &err.to_string());

    subsection("Bob's transport notices the link drop...");
    for ev in bob.pump() {
        event_row("bob", &ev, GREEN);
    }
    info("Bob's state", &bob.manager.connection_state().to_string());
    println!();
    println!(
        "  {ITALIC}{DIM}Bob falls back to discovering (his radio is still on); Alice went{RESET}"
    );
    println!("  {ITALIC}{DIM}fully silent. A new conversation means a brand-new handshake.{RESET}");
    assert_eq!(bob.manager.received_messages().len(), 1);
    success("Keys destroyed; the decrypted conversation history survives on each device");

    // -----------------------------------------------------------------------
    // Final Summary
    // -----------------------------------------------------------------------

    let total_elapsed = demo_start.elapsed();

    println!();
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    DEMO COMPLETE -- Final Summary                                  {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!();

    println!("  {BOLD}{WHITE}Session Statistics:{RESET}");
    println!("  {DIM}----------------------------------------------{RESET}");
    info("Devices", "2 (Alice, Bob)");
    info("Handshakes completed", "1 (mutual)");
    info("Messages delivered", "1");
    info("Duplicates suppressed", "1");
    info("Forgeries rejected", "1");
    info("Identity keys", "Ed25519 (ed25519-dalek 2.1)");
    info("Key agreement", "X25519 + HKDF-SHA256");
    info("Message sealing", "AES-256-GCM (96-bit nonce, 128-bit tag)");
    info("Safety code", "12 decimal digits in groups of 3");
    println!();

    println!(
        "  {BOLD}{GREEN}Total demo time: {:.2}s{RESET}",
        total_elapsed.as_secs_f64()
    );
    println!();
}
