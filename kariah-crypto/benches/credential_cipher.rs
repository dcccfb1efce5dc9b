use criterion::{criterion_group, criterion_main, Criterion};
use kariah_crypto::{decrypt, encrypt, MasterKey};
use std::hint::black_box;

fn bench_cipher(c: &mut Criterion) {
    let key = MasterKey::new([0x41; 32]);
    let stored = encrypt("sk_live_1234567890abcdef", &key).unwrap();

    let mut group = c.benchmark_group("credential_cipher");
    group.sample_size(20);
    group.bench_function("encrypt", |b| {
        b.iter(|| encrypt(black_box("sk_live_1234567890abcdef"), &key).unwrap())
    });
    group.bench_function("decrypt", |b| {
        b.iter(|| decrypt(black_box(&stored), &key).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_cipher);
criterion_main!(benches);
