//! Narrowing readers: pack narrow 16-bit code units into 64-bit words.
//!
//! A unit is *narrow* when its value fits in one byte. Readers take the low
//! byte of each unit and lay them out little-endian, so unit `i` lands in
//! bits `8 * i .. 8 * i + 8` of the result on every backend, including the
//! big-endian one. Bits above the packed bytes are zero.
//!
//! Wide units are a caller error. Debug builds catch them with an assertion;
//! release builds return a backend-specific value (the SSE2 and 3DNow! packs
//! saturate, the NEON and AltiVec packs truncate, scalar masks).
//!
//! ```
//! use simd_dispatch::{read4, read8, read_small};
//!
//! assert_eq!(read8(&[0x61, 0x62, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68]), 0x6867_6665_6463_6261);
//! assert_eq!(read4(&[0x61, 0x62, 0x63, 0x64]), 0x6463_6261);
//! assert_eq!(read_small(&[0x61, 0x62, 0x63], 3), (0x61 << 56) | (0x62 << 32) | 0x63);
//! ```

use std::fmt;
use std::sync::OnceLock;

use crate::backend::{altivec, scalar, three_dnow};
use crate::detect;
use crate::instruction_set::InstructionSet;

/// Packs narrow units into a `u64`.
///
/// Every implementation must agree with the scalar reader on all narrow
/// inputs. Implementations are stateless and shared across threads.
pub trait NarrowingReader: Send + Sync + fmt::Debug {
    /// Backend this reader belongs to.
    fn instruction_set(&self) -> InstructionSet;

    /// Packs eight units: byte `i` of the result is the low byte of
    /// `units[i]`.
    fn read8(&self, units: &[u16; 8]) -> u64;

    /// Packs four units into bits 0 through 31; bits 32 through 63 are zero.
    fn read4(&self, units: &[u16; 4]) -> u64;

    /// Samples a short tail of `k` units (`1 <= k < 8`):
    /// `units[0] << 56 | units[k >> 1] << 32 | units[k - 1]`.
    ///
    /// No backend has a faster form, so the default is the scalar one.
    fn read_small(&self, units: &[u16], k: usize) -> u64 {
        scalar::read_small(units, k)
    }
}

/// Asserts, in debug builds, that every unit is narrow.
#[inline]
#[track_caller]
pub fn debug_assert_narrow(units: &[u16]) {
    debug_assert!(
        units.iter().all(|&unit| unit <= 0xff),
        "narrowing reader given a unit above 0xff: {units:04x?}"
    );
}

/// Asserts, in debug builds, the [`NarrowingReader::read_small`] contract.
#[inline]
#[track_caller]
pub fn debug_assert_small(units: &[u16], k: usize) {
    debug_assert!(
        (1..8).contains(&k) && k <= units.len(),
        "read_small needs 1 <= k < 8 and k <= units.len(), got k = {k}, len = {}",
        units.len()
    );
    debug_assert!(
        [0, k >> 1, k - 1].iter().all(|&i| units[i] <= 0xff),
        "read_small sampled a unit above 0xff: {:04x?}",
        &units[..k]
    );
}

static SCALAR: scalar::ScalarReader = scalar::ScalarReader;
static THREE_DNOW: three_dnow::ThreeDNowReader = three_dnow::ThreeDNowReader;
static ALTIVEC: altivec::AltiVecReader = altivec::AltiVecReader;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
static SSE2: crate::backend::sse2::Sse2Reader = crate::backend::sse2::Sse2Reader;
#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
static NEON: crate::backend::neon::NeonReader = crate::backend::neon::NeonReader;

/// Reader for `set`, or the scalar reader when `set` is not compiled into
/// this target.
///
/// The returned reader does not check that the host can run `set`; the
/// intrinsic readers fall back to scalar on their own when it cannot.
#[must_use]
pub fn reader_for(set: InstructionSet) -> &'static dyn NarrowingReader {
    match set {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        InstructionSet::Sse2 => &SSE2,
        #[cfg(all(target_arch = "aarch64", target_endian = "little"))]
        InstructionSet::Neon => &NEON,
        InstructionSet::ThreeDNow => &THREE_DNOW,
        InstructionSet::AltiVec => &ALTIVEC,
        _ => &SCALAR,
    }
}

/// Every reader compiled into this target, scalar first.
///
/// Used to check backends against each other regardless of which one the
/// host resolved to.
#[must_use]
pub fn compiled_readers() -> Vec<&'static dyn NarrowingReader> {
    let mut readers: Vec<&'static dyn NarrowingReader> = vec![&SCALAR];
    readers.extend(
        InstructionSet::VECTOR_PRIORITY
            .into_iter()
            .filter(|set| set.is_compiled())
            .map(reader_for),
    );
    readers
}

/// Reader of the process-wide resolved instruction set.
pub fn narrowing_reader() -> &'static dyn NarrowingReader {
    static ACTIVE: OnceLock<&'static dyn NarrowingReader> = OnceLock::new();
    *ACTIVE.get_or_init(|| reader_for(detect::resolve()))
}

/// [`NarrowingReader::read8`] on the active reader.
#[inline]
pub fn read8(units: &[u16; 8]) -> u64 {
    narrowing_reader().read8(units)
}

/// [`NarrowingReader::read4`] on the active reader.
#[inline]
pub fn read4(units: &[u16; 4]) -> u64 {
    narrowing_reader().read4(units)
}

/// [`NarrowingReader::read_small`] on the active reader.
#[inline]
pub fn read_small(units: &[u16], k: usize) -> u64 {
    narrowing_reader().read_small(units, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_for_reports_its_own_set() {
        for set in InstructionSet::VECTOR_PRIORITY {
            let reader = reader_for(set);
            if set.is_compiled() {
                assert_eq!(reader.instruction_set(), set);
            } else {
                assert_eq!(reader.instruction_set(), InstructionSet::Scalar);
            }
        }
        assert_eq!(
            reader_for(InstructionSet::None).instruction_set(),
            InstructionSet::Scalar
        );
    }

    #[test]
    fn compiled_readers_start_with_scalar_and_include_register_models() {
        let sets: Vec<_> = compiled_readers()
            .iter()
            .map(|r| r.instruction_set())
            .collect();
        assert_eq!(sets[0], InstructionSet::Scalar);
        assert!(sets.contains(&InstructionSet::ThreeDNow));
        assert!(sets.contains(&InstructionSet::AltiVec));
    }

    #[test]
    fn active_reader_matches_resolution() {
        assert_eq!(narrowing_reader().instruction_set(), detect::resolve());
    }

    #[test]
    fn every_reader_samples_small_tails_the_same_way() {
        let units = [0x41, 0x42, 0x43, 0x44, 0x45];
        for reader in compiled_readers() {
            for k in 1..=units.len() {
                assert_eq!(
                    reader.read_small(&units, k),
                    scalar::read_small(&units, k),
                    "{} k={k}",
                    reader.instruction_set()
                );
            }
        }
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "above 0xff")]
    fn wide_unit_is_caught_in_debug() {
        let _ = scalar::read8(&[0, 0, 0, 0x100, 0, 0, 0, 0]);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "1 <= k < 8")]
    fn read_small_rejects_full_block() {
        let _ = scalar::read_small(&[0; 8], 8);
    }
}
