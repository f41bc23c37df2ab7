// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for payload encryption and fingerprinting in the
// bw2qr-security crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use bw2qr_security::{PayloadCipher, hash_bytes};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark an encrypt-then-decrypt round trip on one padded payload
/// (368 bytes, the encrypted budget of a 510-byte QR code).
fn bench_encrypt_decrypt_roundtrip(c: &mut Criterion) {
    let cipher = PayloadCipher::new("correct-horse-battery-staple", None).expect("cipher");
    let plaintext = vec![b' '; 368];

    c.bench_function("encrypt_decrypt_roundtrip (368 B)", |b| {
        b.iter(|| {
            let ciphertext = cipher
                .encrypt_to_base64(black_box(&plaintext))
                .expect("encrypt failed");
            let decrypted = cipher.decrypt_base64(&ciphertext).expect("decrypt failed");
            assert_eq!(decrypted.len(), plaintext.len());
            black_box(decrypted);
        });
    });
}

/// Benchmark key derivation, which runs once per batch.
fn bench_key_derivation(c: &mut Criterion) {
    c.bench_function("derive_key", |b| {
        b.iter(|| black_box(bw2qr_security::cipher::derive_key(black_box("hunter2"))));
    });
}

/// Benchmark payload fingerprinting.
fn bench_fingerprint(c: &mut Criterion) {
    let payload = vec![0xABu8; 510];
    c.bench_function("hash_bytes (510 B)", |b| {
        b.iter(|| black_box(hash_bytes(black_box(&payload))));
    });
}

criterion_group!(
    benches,
    bench_encrypt_decrypt_roundtrip,
    bench_key_derivation,
    bench_fingerprint
);
criterion_main!(benches);
