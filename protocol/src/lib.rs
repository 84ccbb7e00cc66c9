// Copyright (c) 2026 Nearlink Contributors. MIT License.
// See LICENSE for details.

//! # Nearlink Protocol — Core Library
//!
//! Ad-hoc, authenticated, end-to-end-encrypted channels between devices
//! that found each other over a proximity transport — and nothing else. No
//! accounts, no servers, no cloud. Two devices in the same room decide to
//! talk; this crate makes sure nobody else in the room can listen in or
//! tamper.
//!
//! Nearlink takes a pragmatic stance: Ed25519 for device identity (because
//! we're not barbarians), X25519 + HKDF-SHA256 for session agreement, and
//! AES-256-GCM for sealing messages (because NIST got that one right).
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of a
//! proximity session:
//!
//! - **crypto** — Low-level primitives: identity keys, key agreement,
//!   AEAD sealing, hashing, safety codes. Don't roll your own.
//! - **peer** — The session protocol: discovery bookkeeping, the
//!   invitation handshake, per-peer secrets, sealed messaging, and the
//!   connection state machine.
//! - **message** — The application-level message unit that rides inside
//!   sealed blobs.
//! - **config** — Protocol constants and session configuration.
//!
//! The proximity transport itself (mDNS, BLE, a multipeer framework, or a
//! pair of channels in a test) is deliberately not this crate's business:
//! implement [`peer::PeerTransport`], feed [`peer::TransportEvent`]s in,
//! and the protocol takes it from there.
//!
//! ## Design Philosophy
//!
//! 1. No secret ever leaves the device; only public keys go on the air.
//! 2. No unsafe code in crypto paths — we sleep at night.
//! 3. One peer's failure is that peer's problem: drop, log, carry on.
//! 4. If it touches key material, it has tests. Plural.

pub mod config;
pub mod crypto;
pub mod message;
pub mod peer;
