//! # GR-02 Garlic Dispatch Benchmarks
//!
//! The build phase has a one-second slow-build warning; these groups show
//! how far below it the default cipher sits for realistic clove sizes.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use gr_02_garlic_dispatch::{Clove, GarlicCipher, GarlicConfig, SealedGarlicCipher, SessionKeyMaterial};
use shared_crypto::EncryptionKeyPair;

fn config(clove_bytes: usize, cloves: usize) -> GarlicConfig {
    GarlicConfig::builder()
        .recipient_public_key(EncryptionKeyPair::generate().public_key())
        .cloves((0..cloves as u64).map(|id| Clove::new(id, vec![0xA5; clove_bytes])))
        .expiration(60_000)
        .build()
        .expect("valid config")
}

pub fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("gr-02/sealed_build");
    let cipher = SealedGarlicCipher::default();

    for size in [256usize, 4_096, 32_768] {
        let config = config(size, 4);
        group.throughput(Throughput::Bytes((size * 4) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &config, |b, config| {
            let mut material = SessionKeyMaterial::generate(40);
            b.iter(|| {
                if material.tags.is_empty() {
                    material = SessionKeyMaterial::generate(40);
                }
                black_box(cipher.build(config, &material.key, &mut material.tags))
            })
        });
    }

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_build(c);
}
