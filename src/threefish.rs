//! Threefish, the tweakable block cipher underneath Skein.
//!
//! Three widths are provided: [`Threefish256`], [`Threefish512`], and [`Threefish1024`]. Each
//! takes a key as wide as its block and a 128-bit tweak.
use core::fmt;

use byteorder::{ByteOrder, LittleEndian};
use zeroize::Zeroize;

use crate::Error;

/// Threefish with a 256-bit block and key.
pub type Threefish256 = Threefish<4>;

/// Threefish with a 512-bit block and key.
pub type Threefish512 = Threefish<8>;

/// Threefish with a 1024-bit block and key.
pub type Threefish1024 = Threefish<16>;

/// The size of a Threefish tweak in bytes.
pub const TWEAK_SIZE: usize = 16;

/// The key schedule constant folded into the parity word.
pub(crate) const C240: u64 = 0x1BD1_1BDA_A9FC_1A22;

const ROTATIONS_256: [&[u32]; 8] = [
    &[14, 16],
    &[52, 57],
    &[23, 40],
    &[5, 37],
    &[25, 33],
    &[46, 12],
    &[58, 22],
    &[32, 32],
];

const ROTATIONS_512: [&[u32]; 8] = [
    &[46, 36, 19, 37],
    &[33, 27, 14, 42],
    &[17, 49, 36, 39],
    &[44, 9, 54, 56],
    &[39, 30, 34, 24],
    &[13, 50, 10, 17],
    &[25, 29, 39, 43],
    &[8, 35, 56, 22],
];

const ROTATIONS_1024: [&[u32]; 8] = [
    &[24, 13, 8, 47, 8, 17, 22, 37],
    &[38, 19, 10, 55, 49, 18, 23, 52],
    &[33, 4, 51, 13, 34, 41, 59, 17],
    &[5, 20, 48, 41, 47, 28, 16, 25],
    &[41, 9, 37, 31, 12, 47, 44, 30],
    &[16, 34, 56, 51, 4, 53, 42, 41],
    &[31, 44, 47, 46, 19, 42, 44, 25],
    &[9, 48, 35, 52, 23, 31, 37, 20],
];

const PERMUTATION_256: [usize; 4] = [0, 3, 2, 1];

const PERMUTATION_512: [usize; 8] = [2, 1, 4, 7, 6, 5, 0, 3];

const PERMUTATION_1024: [usize; 16] = [0, 9, 2, 13, 6, 11, 4, 15, 10, 7, 12, 3, 14, 5, 8, 1];

/// The generic Threefish cipher, parameterized with the number of 64-bit words in a block.
#[derive(Clone)]
pub struct Threefish<const WORDS: usize> {
    key: [u64; WORDS],
    tweak: [u64; 2],
}

impl<const WORDS: usize> Threefish<WORDS> {
    /// The size of a block (and of a key) in bytes.
    pub const BLOCK_SIZE: usize = WORDS * 8;

    const ROUNDS: usize = match WORDS {
        4 | 8 => 72,
        16 => 80,
        _ => panic!("Threefish is defined for 4, 8, or 16 words"),
    };

    const ROTATIONS: [&'static [u32]; 8] = match WORDS {
        4 => ROTATIONS_256,
        8 => ROTATIONS_512,
        16 => ROTATIONS_1024,
        _ => panic!("Threefish is defined for 4, 8, or 16 words"),
    };

    const PERMUTATION: &'static [usize] = match WORDS {
        4 => &PERMUTATION_256,
        8 => &PERMUTATION_512,
        16 => &PERMUTATION_1024,
        _ => panic!("Threefish is defined for 4, 8, or 16 words"),
    };

    /// Creates a cipher from a key of [`Self::BLOCK_SIZE`] bytes and a tweak of [`TWEAK_SIZE`]
    /// bytes.
    pub fn new(key: &[u8], tweak: &[u8]) -> Result<Self, Error> {
        if key.len() != Self::BLOCK_SIZE {
            return Err(Error::InvalidKeySize);
        }
        if tweak.len() != TWEAK_SIZE {
            return Err(Error::InvalidTweakSize);
        }

        let mut k = [0u64; WORDS];
        LittleEndian::read_u64_into(key, &mut k);
        let mut t = [0u64; 2];
        LittleEndian::read_u64_into(tweak, &mut t);

        Ok(Threefish { key: k, tweak: t })
    }

    /// Returns the block size in bytes.
    pub const fn block_size(&self) -> usize {
        Self::BLOCK_SIZE
    }

    /// Encrypts one block from `src` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if either slice is not exactly one block long.
    pub fn encrypt(&self, dst: &mut [u8], src: &[u8]) {
        assert_eq!(src.len(), Self::BLOCK_SIZE, "src must be one block");
        assert_eq!(dst.len(), Self::BLOCK_SIZE, "dst must be one block");
        dst.copy_from_slice(src);
        self.encrypt_block(dst);
    }

    /// Decrypts one block from `src` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if either slice is not exactly one block long.
    pub fn decrypt(&self, dst: &mut [u8], src: &[u8]) {
        assert_eq!(src.len(), Self::BLOCK_SIZE, "src must be one block");
        assert_eq!(dst.len(), Self::BLOCK_SIZE, "dst must be one block");
        dst.copy_from_slice(src);
        self.decrypt_block(dst);
    }

    /// Encrypts one block in place.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not exactly one block long.
    pub fn encrypt_block(&self, block: &mut [u8]) {
        let mut st = [0u64; WORDS];
        LittleEndian::read_u64_into(block, &mut st);
        encrypt_words(&self.key, &self.tweak, &mut st);
        LittleEndian::write_u64_into(&st, block);
    }

    /// Decrypts one block in place.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not exactly one block long.
    pub fn decrypt_block(&self, block: &mut [u8]) {
        let mut st = [0u64; WORDS];
        LittleEndian::read_u64_into(block, &mut st);
        decrypt_words(&self.key, &self.tweak, &mut st);
        LittleEndian::write_u64_into(&st, block);
    }
}

impl<const WORDS: usize> fmt::Debug for Threefish<WORDS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Threefish{} {{ ... }}", WORDS * 64)
    }
}

impl<const WORDS: usize> Zeroize for Threefish<WORDS> {
    fn zeroize(&mut self) {
        self.key.zeroize();
        self.tweak.zeroize();
    }
}

/// The extended key and tweak for a single cipher invocation.
struct KeySchedule<const WORDS: usize> {
    key: [u64; WORDS],
    parity: u64,
    tweak: [u64; 3],
}

impl<const WORDS: usize> KeySchedule<WORDS> {
    #[inline(always)]
    fn new(key: &[u64; WORDS], tweak: &[u64; 2]) -> Self {
        KeySchedule {
            key: *key,
            parity: key.iter().fold(C240, |acc, k| acc ^ k),
            tweak: [tweak[0], tweak[1], tweak[0] ^ tweak[1]],
        }
    }

    #[inline(always)]
    fn subkey_word(&self, s: usize, i: usize) -> u64 {
        let idx = (s + i) % (WORDS + 1);
        let k = if idx == WORDS { self.parity } else { self.key[idx] };
        match WORDS - i {
            3 => k.wrapping_add(self.tweak[s % 3]),
            2 => k.wrapping_add(self.tweak[(s + 1) % 3]),
            1 => k.wrapping_add(s as u64),
            _ => k,
        }
    }

    #[inline(always)]
    fn inject(&self, s: usize, st: &mut [u64; WORDS]) {
        for (i, w) in st.iter_mut().enumerate() {
            *w = w.wrapping_add(self.subkey_word(s, i));
        }
    }

    #[inline(always)]
    fn remove(&self, s: usize, st: &mut [u64; WORDS]) {
        for (i, w) in st.iter_mut().enumerate() {
            *w = w.wrapping_sub(self.subkey_word(s, i));
        }
    }
}

impl<const WORDS: usize> Drop for KeySchedule<WORDS> {
    fn drop(&mut self) {
        self.key.zeroize();
        self.parity.zeroize();
        self.tweak.zeroize();
    }
}

/// Encrypts `st` in place under `key` and `tweak`.
///
/// The parity word is derived from `key` on every call.
pub(crate) fn encrypt_words<const WORDS: usize>(
    key: &[u64; WORDS],
    tweak: &[u64; 2],
    st: &mut [u64; WORDS],
) {
    let ks = KeySchedule::new(key, tweak);

    for d in 0..Threefish::<WORDS>::ROUNDS {
        if d % 4 == 0 {
            ks.inject(d / 4, st);
        }

        for (j, &r) in Threefish::<WORDS>::ROTATIONS[d % 8].iter().enumerate() {
            let x0 = st[2 * j].wrapping_add(st[2 * j + 1]);
            st[2 * j] = x0;
            st[2 * j + 1] = st[2 * j + 1].rotate_left(r) ^ x0;
        }

        let mixed = *st;
        for (w, &p) in st.iter_mut().zip(Threefish::<WORDS>::PERMUTATION) {
            *w = mixed[p];
        }
    }

    ks.inject(Threefish::<WORDS>::ROUNDS / 4, st);
}

/// Decrypts `st` in place under `key` and `tweak`.
pub(crate) fn decrypt_words<const WORDS: usize>(
    key: &[u64; WORDS],
    tweak: &[u64; 2],
    st: &mut [u64; WORDS],
) {
    let ks = KeySchedule::new(key, tweak);

    ks.remove(Threefish::<WORDS>::ROUNDS / 4, st);

    for d in (0..Threefish::<WORDS>::ROUNDS).rev() {
        let permuted = *st;
        for (&w, &p) in permuted.iter().zip(Threefish::<WORDS>::PERMUTATION) {
            st[p] = w;
        }

        for (j, &r) in Threefish::<WORDS>::ROTATIONS[d % 8].iter().enumerate() {
            let x1 = (st[2 * j + 1] ^ st[2 * j]).rotate_right(r);
            st[2 * j] = st[2 * j].wrapping_sub(x1);
            st[2 * j + 1] = x1;
        }

        if d % 4 == 0 {
            ks.remove(d / 4, st);
        }
    }
}
