//! Benchmarks of the hot non-KDF paths: polynomial split/recovery and the
//! mnemonic codec. The Feistel rounds are dominated by PBKDF2 by design and
//! are deliberately left out.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shamir_backup::shamir::{recover_secret, split_secret};
use shamir_backup::Share;

fn bench_split_secret(c: &mut Criterion) {
    let secret = [0x5au8; 32];

    c.bench_function("split_3_of_16", |b| {
        b.iter(|| split_secret(black_box(3), black_box(16), black_box(&secret)).unwrap());
    });
}

fn bench_recover_secret(c: &mut Criterion) {
    let secret = [0x5au8; 32];
    let shares = split_secret(8, 16, &secret).unwrap();
    let subset = &shares[..8];

    c.bench_function("recover_8_of_16", |b| {
        b.iter(|| recover_secret(black_box(8), black_box(subset)).unwrap());
    });
}

fn bench_mnemonic_codec(c: &mut Criterion) {
    let share = Share {
        identifier: 0x1a2b,
        extendable: true,
        iteration_exponent: 0,
        group_index: 0,
        group_threshold: 1,
        group_count: 1,
        member_index: 0,
        member_threshold: 1,
        value: vec![0xa5; 32],
    };
    let mnemonic = share.to_mnemonic();

    c.bench_function("share_to_mnemonic", |b| {
        b.iter(|| black_box(&share).to_mnemonic());
    });
    c.bench_function("share_from_mnemonic", |b| {
        b.iter(|| Share::from_mnemonic(black_box(&mnemonic)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_split_secret,
    bench_recover_secret,
    bench_mnemonic_codec
);
criterion_main!(benches);
