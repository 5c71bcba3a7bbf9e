//! Mixing functions the adapter hands its block stream to.

use xxhash_rust::xxh64::Xxh64;

/// Three 64-bit secret words keyed into every hash.
pub type Secret = [u64; 3];

/// Secret used when none is configured.
pub const DEFAULT_SECRET: Secret = [0x2d358dccaa6c78a5, 0x8bb84b93962eacc9, 0x4b33a62ed433d4a3];

/// A 64-bit mixing function over a block stream.
///
/// `len` is the string length in code units, not in blocks. Implementations
/// must be deterministic: the same blocks, length, seed and secret always
/// give the same hash.
pub trait Mixer {
    /// Mixes `blocks` into one hash.
    fn mix<I>(&self, blocks: I, len: usize, seed: u64, secret: &Secret) -> u64
    where
        I: Iterator<Item = u64>;
}

/// XXH64 over the secret words, the blocks and the length, little-endian.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Xxh64Mixer;

impl Mixer for Xxh64Mixer {
    fn mix<I>(&self, blocks: I, len: usize, seed: u64, secret: &Secret) -> u64
    where
        I: Iterator<Item = u64>,
    {
        let mut state = Xxh64::new(seed);
        for word in secret {
            state.update(&word.to_le_bytes());
        }
        for block in blocks {
            state.update(&block.to_le_bytes());
        }
        state.update(&(len as u64).to_le_bytes());
        state.digest()
    }
}

impl<M: Mixer + ?Sized> Mixer for &M {
    fn mix<I>(&self, blocks: I, len: usize, seed: u64, secret: &Secret) -> u64
    where
        I: Iterator<Item = u64>,
    {
        (**self).mix(blocks, len, seed, secret)
    }
}
