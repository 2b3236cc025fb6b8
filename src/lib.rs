//! A generic Rust implementation of the [Skein](https://www.schneier.com/academic/skein/) hash
//! function family and the Threefish tweakable block cipher it is built on.
//!
//! Skein runs Threefish as a compression function over a chain value (Unique Block Iteration, or
//! UBI). Each input (configuration, key, personalization, nonce, message) is absorbed in its own
//! typed UBI pass, and the output is produced by running the cipher over a counter.
//!
//! ```
//! use skein::Skein512;
//!
//! let mut h = Skein512::new(512).unwrap();
//! h.update(b"hello, ");
//! h.update(b"world");
//! let digest = h.finalize();
//! assert_eq!(64, digest.len());
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

use core::fmt;

use byteorder::{ByteOrder, LittleEndian};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

pub mod threefish;

mod fuzzing;

/// Skein with a 256-bit internal state (Skein-256).
pub type Skein256 = Skein<4, 32>;

/// Skein with a 512-bit internal state (Skein-512), the primary proposal.
pub type Skein512 = Skein<8, 64>;

/// Skein with a 1024-bit internal state (Skein-1024).
pub type Skein1024 = Skein<16, 128>;

/// Errors returned when constructing a cipher or a hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The key is not exactly one block long.
    InvalidKeySize,
    /// The tweak is not exactly 16 bytes long.
    InvalidTweakSize,
    /// The output size is zero or not a whole number of bytes.
    InvalidHashSize,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidKeySize => write!(f, "invalid key size"),
            Error::InvalidTweakSize => write!(f, "invalid tweak size"),
            Error::InvalidHashSize => write!(f, "invalid hash size"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// The type tags carried in the top byte of the tweak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum ParamType {
    Key = 0,
    Config = 4,
    Personalization = 8,
    PublicKey = 12,
    KeyId = 16,
    Nonce = 20,
    Message = 48,
    Output = 63,
}

const FIRST_BLOCK: u64 = 1 << 62;
const FINAL_BLOCK: u64 = 1 << 63;

/// The tweak used for every output block: type output, first and final, position 8.
const OUTPUT_TWEAK: [u64; 2] = [8, ((ParamType::Output as u64) << 56) | FIRST_BLOCK | FINAL_BLOCK];

/// "SHA3" followed by version 1.
const SCHEMA_ID: [u8; 6] = [b'S', b'H', b'A', b'3', 1, 0];

const CONFIG_LEN: usize = 32;

/// Optional inputs absorbed into a hash before the message.
///
/// A non-empty `key` turns the hash into a MAC. The other fields are absorbed whenever they are
/// `Some`, even if empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct Params<'a> {
    /// A secret key of any length.
    pub key: Option<&'a [u8]>,
    /// An application-specific personalization string.
    pub personalization: Option<&'a [u8]>,
    /// A public key, for hashing messages to be signed.
    pub public_key: Option<&'a [u8]>,
    /// An identifier for the key used in key derivation.
    pub key_id: Option<&'a [u8]>,
    /// A nonce for stream-cipher or randomized-hashing use.
    pub nonce: Option<&'a [u8]>,
}

#[derive(Clone)]
struct UbiCore<const WORDS: usize, const BYTES: usize> {
    chain: [u64; WORDS],
    tweak: [u64; 2],
    buf: [u8; BYTES],
    off: usize,
}

impl<const WORDS: usize, const BYTES: usize> UbiCore<WORDS, BYTES> {
    fn new() -> Self {
        debug_assert_eq!(WORDS * 8, BYTES);

        UbiCore {
            chain: [0u64; WORDS],
            tweak: [0u64; 2],
            buf: [0u8; BYTES],
            off: 0,
        }
    }

    /// Begins a new UBI pass of the given type at position zero.
    #[inline(always)]
    fn start(&mut self, ty: ParamType) {
        self.tweak = [0, ((ty as u64) << 56) | FIRST_BLOCK];
        self.off = 0;
    }

    /// Advances the 96-bit position field.
    #[inline(always)]
    fn advance(&mut self, n: usize) {
        let (pos, carry) = self.tweak[0].overflowing_add(n as u64);
        self.tweak[0] = pos;
        if carry {
            self.tweak[1] = self.tweak[1].wrapping_add(1);
        }
    }

    /// Runs one compression over `block`, which covers `n` bytes of actual input.
    #[inline(always)]
    fn compress(&mut self, block: &[u8], n: usize) {
        let mut msg = [0u64; WORDS];
        LittleEndian::read_u64_into(block, &mut msg);
        let mut st = msg;

        self.advance(n);
        threefish::encrypt_words(&self.chain, &self.tweak, &mut st);

        for ((h, c), m) in self.chain.iter_mut().zip(&st).zip(&msg) {
            *h = c ^ m;
        }
        self.tweak[1] &= !FIRST_BLOCK;
    }

    /// Appends bytes to the current pass, always holding back the most recent block.
    fn update(&mut self, mut bin: &[u8]) {
        if self.off + bin.len() > BYTES {
            if self.off > 0 {
                let n = BYTES - self.off;
                self.buf[self.off..].copy_from_slice(&bin[..n]);
                let block = self.buf;
                self.compress(&block, BYTES);
                self.off = 0;
                bin = &bin[n..];
            }

            while bin.len() > BYTES {
                let (block, rest) = bin.split_at(BYTES);
                self.compress(block, BYTES);
                bin = rest;
            }
        }

        self.buf[self.off..self.off + bin.len()].copy_from_slice(bin);
        self.off += bin.len();
    }

    /// Returns a copy of the core with the held-back block padded, flagged final, and
    /// compressed. `self` is left as it was.
    fn finalized(&self) -> Self {
        let mut core = self.clone();
        core.buf[core.off..].fill(0);
        core.tweak[1] |= FINAL_BLOCK;
        let block = core.buf;
        core.compress(&block, core.off);
        core.off = 0;
        core
    }

    /// Absorbs `bin` as a complete pass of type `ty`, leaving the result as the new chain value.
    fn absorb(&mut self, ty: ParamType, bin: &[u8]) {
        self.start(ty);
        self.update(bin);
        *self = self.finalized();
    }

    /// Computes output block `ctr` from the output transform keyed by the current chain value.
    #[inline(always)]
    fn output_block(&self, ctr: usize, out: &mut [u8; BYTES]) {
        let mut st = [0u64; WORDS];
        st[0] = ctr as u64;
        threefish::encrypt_words(&self.chain, &OUTPUT_TWEAK, &mut st);
        st[0] ^= ctr as u64;
        LittleEndian::write_u64_into(&st, out);
    }

    /// Fills `out` with output blocks, truncating the last one.
    fn output(&self, out: &mut [u8]) {
        let mut block = [0u8; BYTES];
        for (ctr, chunk) in out.chunks_mut(BYTES).enumerate() {
            self.output_block(ctr, &mut block);
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
        block.zeroize();
    }
}

impl<const WORDS: usize, const BYTES: usize> Zeroize for UbiCore<WORDS, BYTES> {
    fn zeroize(&mut self) {
        self.chain.zeroize();
        self.tweak.zeroize();
        self.buf.zeroize();
        self.off = 0;
    }
}

/// A streaming Skein hash, parameterized with the number of state words and the block size in
/// bytes.
#[derive(Clone)]
pub struct Skein<const WORDS: usize, const BYTES: usize> {
    core: UbiCore<WORDS, BYTES>,
    initial: [u64; WORDS],
    output_len: usize,
}

impl<const WORDS: usize, const BYTES: usize> Skein<WORDS, BYTES> {
    /// Creates a plain hash with an output of `output_bits` bits.
    pub fn new(output_bits: usize) -> Result<Self, Error> {
        Self::with_params(output_bits, &Params::default())
    }

    /// Creates a MAC keyed with `key` with an output of `output_bits` bits.
    pub fn new_mac(output_bits: usize, key: &[u8]) -> Result<Self, Error> {
        Self::with_params(
            output_bits,
            &Params {
                key: Some(key),
                ..Params::default()
            },
        )
    }

    /// Creates a hash with an output of `output_bits` bits and the given optional inputs.
    pub fn with_params(output_bits: usize, params: &Params<'_>) -> Result<Self, Error> {
        if output_bits == 0 || output_bits % 8 != 0 {
            return Err(Error::InvalidHashSize);
        }

        let mut core = UbiCore::<WORDS, BYTES>::new();

        if let Some(key) = params.key.filter(|k| !k.is_empty()) {
            core.absorb(ParamType::Key, key);
        }

        let mut config = [0u8; CONFIG_LEN];
        config[..SCHEMA_ID.len()].copy_from_slice(&SCHEMA_ID);
        LittleEndian::write_u64(&mut config[8..16], output_bits as u64);
        core.absorb(ParamType::Config, &config);

        let optional = [
            (ParamType::Personalization, params.personalization),
            (ParamType::PublicKey, params.public_key),
            (ParamType::KeyId, params.key_id),
            (ParamType::Nonce, params.nonce),
        ];
        for (ty, bin) in optional {
            if let Some(bin) = bin {
                core.absorb(ty, bin);
            }
        }

        let initial = core.chain;
        core.start(ParamType::Message);

        Ok(Skein {
            core,
            initial,
            output_len: output_bits / 8,
        })
    }

    /// Returns the digest size in bytes.
    pub const fn size(&self) -> usize {
        self.output_len
    }

    /// Returns the internal block size in bytes.
    pub const fn block_size(&self) -> usize {
        BYTES
    }

    /// Restores the hash to the state it had right after construction.
    pub fn reset(&mut self) {
        self.core.chain = self.initial;
        self.core.start(ParamType::Message);
    }

    /// Absorbs message bytes.
    pub fn update(&mut self, bin: &[u8]) {
        self.core.update(bin);
    }

    /// Writes the digest of everything absorbed so far to `out` without changing the hash's
    /// state.
    ///
    /// # Panics
    ///
    /// Panics if `out` is not exactly [`Self::size`] bytes long.
    pub fn finalize_mut(&self, out: &mut [u8]) {
        assert_eq!(out.len(), self.output_len, "out must be the digest size");
        let mut core = self.core.finalized();
        core.output(out);
        core.zeroize();
    }

    /// Returns the digest of everything absorbed so far without changing the hash's state.
    #[cfg(feature = "std")]
    pub fn finalize(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.output_len];
        self.finalize_mut(&mut out);
        out
    }

    /// Appends the digest to `prefix` and returns it.
    #[cfg(feature = "std")]
    pub fn sum(&self, mut prefix: Vec<u8>) -> Vec<u8> {
        let start = prefix.len();
        prefix.resize(start + self.output_len, 0);
        self.finalize_mut(&mut prefix[start..]);
        prefix
    }

    /// Compares the digest against `tag` in constant time.
    #[must_use]
    pub fn verify(&self, tag: &[u8]) -> bool {
        if tag.len() != self.output_len {
            return false;
        }

        let mut core = self.core.finalized();
        let mut block = [0u8; BYTES];
        let mut ok = subtle::Choice::from(1);
        for (ctr, chunk) in tag.chunks(BYTES).enumerate() {
            core.output_block(ctr, &mut block);
            ok &= chunk.ct_eq(&block[..chunk.len()]);
        }
        block.zeroize();
        core.zeroize();
        ok.into()
    }
}

impl<const WORDS: usize, const BYTES: usize> fmt::Debug for Skein<WORDS, BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skein{}-{} {{ ... }}", BYTES * 8, self.output_len * 8)
    }
}

impl<const WORDS: usize, const BYTES: usize> Zeroize for Skein<WORDS, BYTES> {
    fn zeroize(&mut self) {
        self.core.zeroize();
        self.initial.zeroize();
    }
}

#[cfg(feature = "std")]
impl<const WORDS: usize, const BYTES: usize> std::io::Write for Skein<WORDS, BYTES> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
