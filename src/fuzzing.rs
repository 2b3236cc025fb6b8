#![cfg(all(test, feature = "std"))]

use proptest::collection::vec;
use proptest::prelude::*;

use crate::threefish::{Threefish1024, Threefish256, Threefish512};
use crate::{Params, Skein1024, Skein256, Skein512};

/// An input operation for a streaming hash.
#[derive(Clone, Debug, PartialEq)]
enum HashOp {
    Update(Vec<u8>),
    Finalize,
    Reset,
}

/// A transcript of operations for a streaming hash, plus the key it's constructed with.
#[derive(Clone, Debug, PartialEq)]
struct HashTranscript {
    key: Vec<u8>,
    ops: Vec<HashOp>,
}

/// Apply the transcript's operations to a streaming Skein-512 and return its digests.
fn apply_transcript(t: &HashTranscript) -> Vec<Vec<u8>> {
    let mut h = Skein512::new_mac(256, &t.key).unwrap();
    t.ops
        .iter()
        .flat_map(|op| match op {
            HashOp::Update(data) => {
                h.update(data);
                None
            }
            HashOp::Finalize => Some(h.finalize()),
            HashOp::Reset => {
                h.reset();
                None
            }
        })
        .collect()
}

/// Replay the transcript by buffering the message and hashing it in one call on a fresh instance
/// for every digest.
fn replay_transcript(t: &HashTranscript) -> Vec<Vec<u8>> {
    let mut msg = Vec::new();
    t.ops
        .iter()
        .flat_map(|op| match op {
            HashOp::Update(data) => {
                msg.extend_from_slice(data);
                None
            }
            HashOp::Finalize => {
                let mut h = Skein512::new_mac(256, &t.key).unwrap();
                h.update(&msg);
                Some(h.finalize())
            }
            HashOp::Reset => {
                msg.clear();
                None
            }
        })
        .collect()
}

/// An arbitrary byte string with length 0..300, long enough to span several blocks.
fn arb_data() -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..300)
}

/// An arbitrary hash operation, weighted towards updates.
fn arb_hash_op() -> impl Strategy<Value = HashOp> {
    prop_oneof![
        6 => arb_data().prop_map(HashOp::Update),
        2 => Just(HashOp::Finalize),
        1 => Just(HashOp::Reset),
    ]
}

prop_compose! {
    /// A transcript of 0..40 arbitrary hash operations terminated with a `Finalize` operation to
    /// capture the final state.
    fn arb_hash_transcript()(
        key in vec(any::<u8>(), 0..80),
        mut ops in vec(arb_hash_op(), 0..40),
    ) -> HashTranscript {
        ops.push(HashOp::Finalize);
        HashTranscript { key, ops }
    }
}

/// Hamming distance between two equal-length byte strings.
fn distance(a: &[u8], b: &[u8]) -> u32 {
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}

proptest! {
    /// Streaming a transcript must produce the same digests as hashing each accumulated message
    /// in one call. This covers arbitrary splits, repeated finalization, and resets.
    #[test]
    fn streaming_matches_one_shot(t in arb_hash_transcript()) {
        prop_assert_eq!(replay_transcript(&t), apply_transcript(&t));
    }

    /// Equal transcripts must produce equal digests.
    #[test]
    fn transcript_determinism(t in arb_hash_transcript()) {
        prop_assert_eq!(apply_transcript(&t), apply_transcript(&t));
    }

    /// The digest is always exactly the configured size.
    #[test]
    fn digest_length(bytes in 1usize..300, msg in arb_data()) {
        let mut h256 = Skein256::new(bytes * 8).unwrap();
        let mut h512 = Skein512::new(bytes * 8).unwrap();
        let mut h1024 = Skein1024::new(bytes * 8).unwrap();
        h256.update(&msg);
        h512.update(&msg);
        h1024.update(&msg);

        prop_assert_eq!(bytes, h256.finalize().len());
        prop_assert_eq!(bytes, h512.finalize().len());
        prop_assert_eq!(bytes, h1024.finalize().len());
    }

    /// A MAC tag always verifies against the instance that produced it and never against one
    /// with a different key.
    #[test]
    fn mac_verification(key in vec(any::<u8>(), 1..80), msg in arb_data()) {
        let mut h = Skein256::new_mac(256, &key).unwrap();
        h.update(&msg);
        let tag = h.finalize();
        prop_assert!(h.verify(&tag));

        let mut other_key = key.clone();
        other_key[0] ^= 1;
        let params = Params {
            key: Some(other_key.as_slice()),
            ..Params::default()
        };
        let mut other = Skein256::with_params(256, &params).unwrap();
        other.update(&msg);
        prop_assert!(!other.verify(&tag));
    }

    /// Flipping one message bit changes roughly half of the digest's bits.
    #[test]
    fn single_bit_avalanche(msg in vec(any::<u8>(), 1..200), bit in any::<usize>()) {
        let bit = bit % (msg.len() * 8);
        let mut flipped = msg.clone();
        flipped[bit / 8] ^= 1 << (bit % 8);

        let mut a = Skein512::new(512).unwrap();
        let mut b = Skein512::new(512).unwrap();
        a.update(&msg);
        b.update(&flipped);

        let d = distance(&a.finalize(), &b.finalize());
        prop_assert!((160..=352).contains(&d), "distance {}", d);
    }

    /// Decryption inverts encryption for all widths, in place and out of place.
    #[test]
    fn threefish256_round_trip(
        key in vec(any::<u8>(), 32),
        tweak in vec(any::<u8>(), 16),
        block in vec(any::<u8>(), 32),
    ) {
        let c = Threefish256::new(&key, &tweak).unwrap();
        let mut ct = vec![0u8; 32];
        c.encrypt(&mut ct, &block);
        let mut pt = vec![0u8; 32];
        c.decrypt(&mut pt, &ct);
        prop_assert_eq!(&block, &pt);

        c.encrypt_block(&mut pt);
        prop_assert_eq!(&ct, &pt);
        c.decrypt_block(&mut pt);
        prop_assert_eq!(&block, &pt);
    }

    #[test]
    fn threefish512_round_trip(
        key in vec(any::<u8>(), 64),
        tweak in vec(any::<u8>(), 16),
        block in vec(any::<u8>(), 64),
    ) {
        let c = Threefish512::new(&key, &tweak).unwrap();
        let mut buf = block.clone();
        c.encrypt_block(&mut buf);
        prop_assert_ne!(&block, &buf);
        c.decrypt_block(&mut buf);
        prop_assert_eq!(&block, &buf);
    }

    #[test]
    fn threefish1024_round_trip(
        key in vec(any::<u8>(), 128),
        tweak in vec(any::<u8>(), 16),
        block in vec(any::<u8>(), 128),
    ) {
        let c = Threefish1024::new(&key, &tweak).unwrap();
        let mut buf = block.clone();
        c.encrypt_block(&mut buf);
        c.decrypt_block(&mut buf);
        prop_assert_eq!(&block, &buf);
    }
}

#[test]
fn mean_avalanche_is_half() {
    const TRIALS: u32 = 256;

    let mut msg = [0u8; 48];
    let mut total = 0;
    for i in 0..TRIALS {
        msg[..4].copy_from_slice(&i.to_le_bytes());
        let mut flipped = msg;
        flipped[(i as usize * 7) % 48] ^= 1 << (i % 8);

        let mut a = Skein256::new(256).unwrap();
        let mut b = Skein256::new(256).unwrap();
        a.update(&msg);
        b.update(&flipped);
        total += distance(&a.finalize(), &b.finalize());
    }

    let mean = f64::from(total) / f64::from(TRIALS);
    assert!((122.0..=134.0).contains(&mean), "mean distance {}", mean);
}
