use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use sha2::{Digest, Sha256, Sha512};
use sha3::Sha3_512;

use skein::threefish::{Threefish1024, Threefish256, Threefish512};
use skein::{Skein1024, Skein256, Skein512};

const INPUT: usize = 100 * 1024;

fn hash_benchmarks(c: &mut Criterion) {
    let mut g = c.benchmark_group("hash");
    g.sample_size(1_000);
    g.throughput(Throughput::Bytes(INPUT as u64));

    g.bench_with_input("skein-256", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut st = Skein256::new(256).unwrap();
            st.update(block);
            st.finalize()
        })
    });
    g.bench_with_input("skein-512", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut st = Skein512::new(512).unwrap();
            st.update(block);
            st.finalize()
        })
    });
    g.bench_with_input("skein-1024", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut st = Skein1024::new(1024).unwrap();
            st.update(block);
            st.finalize()
        })
    });
    g.bench_with_input("sha256", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut digest = Sha256::default();
            digest.update(block);
            digest.finalize()
        })
    });
    g.bench_with_input("sha512", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut digest = Sha512::default();
            digest.update(block);
            digest.finalize()
        })
    });
    g.bench_with_input("sha3", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut digest = Sha3_512::default();
            digest.update(block);
            digest.finalize()
        })
    });
    g.bench_with_input("blake3", &[0u8; INPUT], |b, block| {
        b.iter(|| blake3::hash(block))
    });
    g.finish();
}

fn mac_benchmarks(c: &mut Criterion) {
    let mut g = c.benchmark_group("mac");
    g.sample_size(1_000);
    g.throughput(Throughput::Bytes(INPUT as u64));

    g.bench_with_input("skein-512", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut st = Skein512::new_mac(512, &[7u8; 64]).unwrap();
            st.update(block);
            st.finalize()
        })
    });
    g.bench_with_input("blake3", &[0u8; INPUT], |b, block| {
        b.iter(|| blake3::keyed_hash(&[7u8; 32], block))
    });
    g.finish();
}

fn cipher_benchmarks(c: &mut Criterion) {
    let mut g = c.benchmark_group("threefish");
    g.sample_size(1_000);

    g.throughput(Throughput::Bytes(32));
    g.bench_function("threefish-256", |b| {
        let cipher = Threefish256::new(&[0u8; 32], &[0u8; 16]).unwrap();
        let mut block = [0u8; 32];
        b.iter(|| cipher.encrypt_block(&mut block))
    });
    g.throughput(Throughput::Bytes(64));
    g.bench_function("threefish-512", |b| {
        let cipher = Threefish512::new(&[0u8; 64], &[0u8; 16]).unwrap();
        let mut block = [0u8; 64];
        b.iter(|| cipher.encrypt_block(&mut block))
    });
    g.throughput(Throughput::Bytes(128));
    g.bench_function("threefish-1024", |b| {
        let cipher = Threefish1024::new(&[0u8; 128], &[0u8; 16]).unwrap();
        let mut block = [0u8; 128];
        b.iter(|| cipher.encrypt_block(&mut block))
    });
    g.finish();
}

criterion_group!(benches, hash_benchmarks, mac_benchmarks, cipher_benchmarks);
criterion_main!(benches);
