//! Block stream: a string cut into the 64-bit words the mixer absorbs.
//!
//! For a string of `n` units:
//!
//! - each full group of eight units yields one packed block;
//! - a remainder of four or more yields one packed block over its first four
//!   units;
//! - any non-empty remainder then yields one sampled block over the whole
//!   remainder (`first << 56 | middle << 32 | last`).
//!
//! One-byte and two-byte strings go through the same shape, so a narrow
//! string produces identical blocks in either representation.

use std::iter::FusedIterator;
use std::slice;

use simd_dispatch::NarrowingReader;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
}

/// A string code unit the block stream can load.
///
/// Implemented for `u8` (one-byte strings, loaded directly) and `u16`
/// (two-byte strings whose units all fit in a byte, loaded through a
/// [`NarrowingReader`]).
pub trait CodeUnit: Copy + sealed::Sealed {
    /// Packs eight units, unit `i` in byte `i`.
    fn load8(units: &[Self; 8], reader: &dyn NarrowingReader) -> u64;

    /// Packs four units into the low 32 bits.
    fn load4(units: &[Self; 4], reader: &dyn NarrowingReader) -> u64;

    /// Samples a tail of `1..8` units.
    fn load_small(units: &[Self], reader: &dyn NarrowingReader) -> u64;
}

impl CodeUnit for u8 {
    #[inline]
    fn load8(units: &[Self; 8], _reader: &dyn NarrowingReader) -> u64 {
        u64::from_le_bytes(*units)
    }

    #[inline]
    fn load4(units: &[Self; 4], _reader: &dyn NarrowingReader) -> u64 {
        u64::from(u32::from_le_bytes(*units))
    }

    #[inline]
    fn load_small(units: &[Self], _reader: &dyn NarrowingReader) -> u64 {
        let k = units.len();
        (u64::from(units[0]) << 56) | (u64::from(units[k >> 1]) << 32) | u64::from(units[k - 1])
    }
}

impl CodeUnit for u16 {
    #[inline]
    fn load8(units: &[Self; 8], reader: &dyn NarrowingReader) -> u64 {
        reader.read8(units)
    }

    #[inline]
    fn load4(units: &[Self; 4], reader: &dyn NarrowingReader) -> u64 {
        reader.read4(units)
    }

    #[inline]
    fn load_small(units: &[Self], reader: &dyn NarrowingReader) -> u64 {
        reader.read_small(units, units.len())
    }
}

/// Iterator over the blocks of one string. See the [module docs](self).
#[derive(Clone, Debug)]
pub struct Blocks<'a, U: CodeUnit> {
    full: slice::Iter<'a, [U; 8]>,
    tail: &'a [U],
    tail_packed: bool,
    reader: &'a dyn NarrowingReader,
}

impl<'a, U: CodeUnit> Blocks<'a, U> {
    /// Blocks of `units`, two-byte units narrowed by `reader`.
    pub fn new(units: &'a [U], reader: &'a dyn NarrowingReader) -> Self {
        let (full, tail) = units.as_chunks::<8>();
        Self {
            full: full.iter(),
            tail,
            tail_packed: false,
            reader,
        }
    }

    fn tail_blocks(&self) -> usize {
        match (self.tail.len(), self.tail_packed) {
            (0, _) => 0,
            (1..4, _) | (_, true) => 1,
            _ => 2,
        }
    }
}

impl<U: CodeUnit> Iterator for Blocks<'_, U> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if let Some(chunk) = self.full.next() {
            return Some(U::load8(chunk, self.reader));
        }
        if self.tail.is_empty() {
            return None;
        }
        if !self.tail_packed {
            self.tail_packed = true;
            if let Some(head) = self.tail.first_chunk::<4>() {
                return Some(U::load4(head, self.reader));
            }
        }
        let tail = std::mem::take(&mut self.tail);
        Some(U::load_small(tail, self.reader))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.full.len() + self.tail_blocks();
        (n, Some(n))
    }
}

impl<U: CodeUnit> ExactSizeIterator for Blocks<'_, U> {}

impl<U: CodeUnit> FusedIterator for Blocks<'_, U> {}
