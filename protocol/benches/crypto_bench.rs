// Cryptography benchmarks for the Nearlink protocol.
//
// Covers keypair generation, shared-secret derivation, AEAD sealing at
// various payload sizes, message seal/open, and safety-code derivation.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use nearlink_protocol::crypto::{decrypt, encrypt, safety_code, DeviceKeypair, SessionKeypair};
use nearlink_protocol::message::Message;
use nearlink_protocol::peer::{open_message, seal_message};

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("keys/identity_generate", |b| {
        b.iter(DeviceKeypair::generate);
    });

    c.bench_function("keys/session_generate", |b| {
        b.iter(SessionKeypair::generate);
    });
}

fn bench_derive_shared_secret(c: &mut Criterion) {
    let local = SessionKeypair::generate();
    let remote = SessionKeypair::generate();
    let remote_public = remote.public_key_bytes();

    c.bench_function("agreement/derive_shared_secret", |b| {
        b.iter(|| local.derive_shared_secret(&remote_public).unwrap());
    });
}

fn bench_encrypt(c: &mut Criterion) {
    let key = [0x42u8; 32];
    let mut group = c.benchmark_group("aead/encrypt");

    for size in [32usize, 1024, 16 * 1024, 256 * 1024] {
        let plaintext = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &plaintext, |b, pt| {
            b.iter(|| encrypt(&key, pt).unwrap());
        });
    }

    group.finish();
}

fn bench_decrypt(c: &mut Criterion) {
    let key = [0x42u8; 32];
    let mut group = c.benchmark_group("aead/decrypt");

    for size in [32usize, 1024, 16 * 1024, 256 * 1024] {
        let blob = encrypt(&key, &vec![0xA5u8; size]).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &blob, |b, blob| {
            b.iter(|| decrypt(&key, blob).unwrap());
        });
    }

    group.finish();
}

fn bench_message_sealing(c: &mut Criterion) {
    let local = SessionKeypair::generate();
    let remote = SessionKeypair::generate();
    let secret = local
        .derive_shared_secret(&remote.public_key_bytes())
        .unwrap();
    let message = Message::new(
        "meet me by the north entrance in five".to_string(),
        "bench-device".to_string(),
    );

    c.bench_function("messaging/seal", |b| {
        b.iter(|| seal_message(&secret, &message).unwrap());
    });

    let blob = seal_message(&secret, &message).unwrap();
    c.bench_function("messaging/open", |b| {
        b.iter(|| open_message(&secret, &blob).unwrap());
    });
}

fn bench_safety_code(c: &mut Criterion) {
    let local = DeviceKeypair::generate().public_key_bytes();
    let remote = DeviceKeypair::generate().public_key_bytes();

    c.bench_function("safety_code/derive", |b| {
        b.iter(|| safety_code(&local, &remote));
    });
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_derive_shared_secret,
    bench_encrypt,
    bench_decrypt,
    bench_message_sealing,
    bench_safety_code,
);
criterion_main!(benches);
