//! Rayon integration for hashing many strings at once.

use rayon::prelude::*;

use crate::adapter::StringHasher;
use crate::mixer::Mixer;

/// Extension trait for hashing the strings of a parallel iterator.
///
/// # Example
///
/// ```
/// use narrow_hash::{ParallelStringHash, StringHasher};
/// use rayon::prelude::*;
///
/// let words: Vec<Vec<u8>> = vec![b"alpha".to_vec(), b"beta".to_vec()];
/// let hashes = words.par_iter().hash_one_byte(&StringHasher::new(0));
/// assert_eq!(hashes.len(), 2);
/// ```
pub trait ParallelStringHash {
    /// One-byte hash of every item, in iterator order.
    fn hash_one_byte<M>(self, hasher: &StringHasher<M>) -> Vec<u64>
    where
        M: Mixer + Sync;
}

impl<I, T> ParallelStringHash for I
where
    I: IndexedParallelIterator<Item = T>,
    T: AsRef<[u8]> + Send,
{
    fn hash_one_byte<M>(self, hasher: &StringHasher<M>) -> Vec<u64>
    where
        M: Mixer + Sync,
    {
        self.map(|bytes| hasher.hash_one_byte(bytes.as_ref()))
            .collect()
    }
}

/// Two-byte hashes of `strings`, computed on rayon's thread pool.
pub fn hash_batch_converting_to_8bit<M, S>(hasher: &StringHasher<M>, strings: &[S]) -> Vec<u64>
where
    M: Mixer + Sync,
    S: AsRef<[u16]> + Sync,
{
    strings
        .par_iter()
        .map(|units| hasher.hash_converting_to_8bit(units.as_ref()))
        .collect()
}
