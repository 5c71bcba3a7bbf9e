//! SSE2 backend for x86 and x86_64.
//!
//! # Safety
//!
//! This module contains `unsafe` code for SIMD operations. Safety is ensured by:
//!
//! - **Runtime CPU feature detection**: every public entry point checks SSE2
//!   availability (compile-time on x86_64, where SSE2 is baseline; cached
//!   `is_x86_feature_detected!` on 32-bit x86) and falls back to the scalar
//!   implementation otherwise. The `#[target_feature]` functions are only
//!   reached after that check.
//!
//! - **Memory access**: loads and stores use the unaligned forms
//!   (`_mm_loadu_*`, `_mm_storeu_*`, `_mm_loadl_epi64`) on typed arrays whose
//!   length matches the access width exactly, so nothing is read past the
//!   caller's buffer.

#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]
// Every load and store here is an unaligned form.
#![allow(clippy::cast_ptr_alignment)]

#[cfg(target_arch = "x86")]
use core::arch::x86::{
    __m128i, _mm_add_epi32, _mm_add_ps, _mm_and_si128, _mm_cmpeq_epi32, _mm_cvtsi128_si32,
    _mm_loadl_epi64, _mm_loadu_ps, _mm_loadu_si128, _mm_mul_ps, _mm_or_si128, _mm_packus_epi16,
    _mm_set_epi32, _mm_set1_epi32, _mm_setzero_si128, _mm_shuffle_epi32, _mm_storeu_ps,
    _mm_storeu_si128, _mm_sub_ps,
};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{
    __m128i, _mm_add_epi32, _mm_add_ps, _mm_and_si128, _mm_cmpeq_epi32, _mm_cvtsi128_si32,
    _mm_cvtsi128_si64, _mm_loadl_epi64, _mm_loadu_ps, _mm_loadu_si128, _mm_mul_ps, _mm_or_si128,
    _mm_packus_epi16, _mm_set_epi32, _mm_set1_epi32, _mm_setzero_si128, _mm_shuffle_epi32,
    _mm_storeu_ps, _mm_storeu_si128, _mm_sub_ps,
};
use std::sync::OnceLock;

use super::scalar;
use crate::instruction_set::InstructionSet;
use crate::narrow::{NarrowingReader, debug_assert_narrow};
use crate::vector::VectorValue;

static SSE2_AVAILABLE: OnceLock<bool> = OnceLock::new();

#[inline]
fn sse2_available() -> bool {
    cfg!(target_feature = "sse2")
        || *SSE2_AVAILABLE.get_or_init(|| std::arch::is_x86_feature_detected!("sse2"))
}

// ============================================================================
// Arithmetic
// ============================================================================

macro_rules! float_op {
    ($(#[$doc:meta])* $name:ident, $impl_name:ident, $intrinsic:ident) => {
        $(#[$doc])*
        pub fn $name(a: VectorValue, b: VectorValue) -> VectorValue {
            if !sse2_available() {
                return scalar::$name(a, b);
            }
            unsafe { $impl_name(a, b) }
        }

        #[target_feature(enable = "sse2")]
        unsafe fn $impl_name(a: VectorValue, b: VectorValue) -> VectorValue {
            let va = _mm_loadu_ps(a.as_bytes().as_ptr().cast::<f32>());
            let vb = _mm_loadu_ps(b.as_bytes().as_ptr().cast::<f32>());
            let mut out = VectorValue::ZERO;
            let dst = out.as_bytes_mut().as_mut_ptr().cast::<f32>();
            _mm_storeu_ps(dst, $intrinsic(va, vb));
            out
        }
    };
}

float_op!(
    /// `_mm_add_ps`.
    add_ps, add_ps_sse2, _mm_add_ps
);
float_op!(
    /// `_mm_mul_ps`.
    mul_ps, mul_ps_sse2, _mm_mul_ps
);
float_op!(
    /// `_mm_sub_ps`.
    sub_ps, sub_ps_sse2, _mm_sub_ps
);

#[target_feature(enable = "sse2")]
unsafe fn load(value: &VectorValue) -> __m128i {
    _mm_loadu_si128(value.as_bytes().as_ptr().cast::<__m128i>())
}

#[target_feature(enable = "sse2")]
unsafe fn store(v: __m128i) -> VectorValue {
    let mut out = VectorValue::ZERO;
    _mm_storeu_si128(out.as_bytes_mut().as_mut_ptr().cast::<__m128i>(), v);
    out
}

/// `_mm_add_epi32`.
pub fn add_epi32(a: VectorValue, b: VectorValue) -> VectorValue {
    if !sse2_available() {
        return scalar::add_epi32(a, b);
    }
    unsafe { add_epi32_sse2(a, b) }
}

#[target_feature(enable = "sse2")]
unsafe fn add_epi32_sse2(a: VectorValue, b: VectorValue) -> VectorValue {
    store(_mm_add_epi32(load(&a), load(&b)))
}

/// Dword shuffle with a runtime selector.
///
/// `_mm_shuffle_epi32` needs its selector at compile time, so the runtime
/// form broadcasts each source lane once and keeps, per output lane, the
/// broadcast whose index matches that lane's 2-bit selector.
pub fn shuffle_epi32(a: VectorValue, imm: u8) -> VectorValue {
    if !sse2_available() {
        return scalar::shuffle_epi32(a, imm);
    }
    unsafe { shuffle_epi32_sse2(a, imm) }
}

#[target_feature(enable = "sse2")]
unsafe fn shuffle_epi32_sse2(a: VectorValue, imm: u8) -> VectorValue {
    let v = load(&a);
    let selector = |lane: u8| i32::from((imm >> (2 * lane)) & 0b11);
    let selectors = _mm_set_epi32(selector(3), selector(2), selector(1), selector(0));
    let broadcasts = [
        _mm_shuffle_epi32::<0b00_00_00_00>(v),
        _mm_shuffle_epi32::<0b01_01_01_01>(v),
        _mm_shuffle_epi32::<0b10_10_10_10>(v),
        _mm_shuffle_epi32::<0b11_11_11_11>(v),
    ];

    let mut acc = _mm_setzero_si128();
    for (source, broadcast) in (0i32..).zip(broadcasts) {
        let hit = _mm_cmpeq_epi32(selectors, _mm_set1_epi32(source));
        acc = _mm_or_si128(acc, _mm_and_si128(hit, broadcast));
    }
    store(acc)
}

// ============================================================================
// Narrowing
// ============================================================================

/// Low 64 bits of `v`.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn low_u64(v: __m128i) -> u64 {
    _mm_cvtsi128_si64(v).cast_unsigned()
}

/// Low 64 bits of `v`. 32-bit x86 has no 64-bit move out of an XMM
/// register, so take dwords 0 and 1 separately.
#[cfg(target_arch = "x86")]
#[target_feature(enable = "sse2")]
unsafe fn low_u64(v: __m128i) -> u64 {
    let lo = _mm_cvtsi128_si32(v).cast_unsigned();
    let hi = _mm_cvtsi128_si32(_mm_shuffle_epi32::<0b01_01_01_01>(v)).cast_unsigned();
    u64::from(lo) | (u64::from(hi) << 32)
}

/// All eight units in one load, `packuswb` against zero, low 64 bits out.
#[target_feature(enable = "sse2")]
unsafe fn read8_sse2(units: &[u16; 8]) -> u64 {
    let x = _mm_loadu_si128(units.as_ptr().cast::<__m128i>());
    low_u64(_mm_packus_epi16(x, _mm_setzero_si128()))
}

/// Four units through a 64-bit load; the packed dword is zero-extended.
#[target_feature(enable = "sse2")]
unsafe fn read4_sse2(units: &[u16; 4]) -> u64 {
    let x = _mm_loadl_epi64(units.as_ptr().cast::<__m128i>());
    let packed = _mm_packus_epi16(x, _mm_setzero_si128());
    u64::from(_mm_cvtsi128_si32(packed).cast_unsigned())
}

/// SSE2 narrowing reader.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sse2Reader;

impl NarrowingReader for Sse2Reader {
    fn instruction_set(&self) -> InstructionSet {
        InstructionSet::Sse2
    }

    fn read8(&self, units: &[u16; 8]) -> u64 {
        debug_assert_narrow(units);
        if !sse2_available() {
            return scalar::read8(units);
        }
        unsafe { read8_sse2(units) }
    }

    fn read4(&self, units: &[u16; 4]) -> u64 {
        debug_assert_narrow(units);
        if !sse2_available() {
            return scalar::read4(units);
        }
        unsafe { read4_sse2(units) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read8_keeps_all_eight_lanes() {
        assert_eq!(
            Sse2Reader.read8(&[1, 2, 3, 4, 5, 6, 7, 8]),
            0x0807_0605_0403_0201
        );
    }

    #[test]
    fn read4_is_zero_extended_even_with_high_bit_set() {
        assert_eq!(
            Sse2Reader.read4(&[0x10, 0x20, 0x30, 0xff]),
            0x0000_0000_ff30_2010
        );
    }

    #[test]
    fn gated_arithmetic_matches_scalar() {
        let a = VectorValue::from_f32x4([1.5, -2.0, 0.25, 1e30]);
        let b = VectorValue::from_f32x4([-0.5, 4.0, -0.0, 1e10]);
        assert_eq!(add_ps(a, b), scalar::add_ps(a, b));
        assert_eq!(mul_ps(a, b), scalar::mul_ps(a, b));
        assert_eq!(sub_ps(a, b), scalar::sub_ps(a, b));

        let x = VectorValue::from_i32x4([i32::MAX, -1, 0, i32::MIN]);
        let y = VectorValue::from_i32x4([1, 1, -7, -1]);
        assert_eq!(add_epi32(x, y), scalar::add_epi32(x, y));
    }

    #[test]
    fn runtime_shuffle_matches_scalar_for_every_selector() {
        let v = VectorValue::from_i32x4([-1, 7, i32::MIN, 42]);
        for imm in 0..=u8::MAX {
            assert_eq!(
                shuffle_epi32(v, imm),
                scalar::shuffle_epi32(v, imm),
                "imm {imm:#04x}"
            );
        }
    }
}
