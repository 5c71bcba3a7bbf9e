//! ARM NEON (Advanced SIMD) backend for little-endian aarch64.
//!
//! # Safety
//!
//! This module contains `unsafe` code for SIMD operations. Safety is ensured by:
//!
//! - **Runtime CPU feature detection**: NEON availability is checked via
//!   `std::arch::is_aarch64_feature_detected!("neon")` and cached in a
//!   `OnceLock`. SIMD functions are only called after confirming CPU support;
//!   otherwise the scalar implementation runs.
//!
//! - **Memory alignment**: NEON loads (`vld1q_*`, `vld1_*`) do not require
//!   aligned memory, and every load reads exactly the typed array it is
//!   given.
//!
//! There is no dword shuffle with a runtime selector here; the table binds
//! that slot to scalar.

#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]
// NEON loads and stores only need element alignment.
#![allow(clippy::cast_ptr_alignment)]

use core::arch::aarch64::{
    vaddq_f32, vaddq_s32, vcombine_u16, vget_lane_u32, vget_lane_u64, vld1_u16, vld1q_f32,
    vld1q_s32, vld1q_u16, vmovn_u16, vmulq_f32, vreinterpret_u32_u8, vreinterpret_u64_u8,
    vst1q_f32, vst1q_s32, vsubq_f32,
};
use std::sync::OnceLock;

use super::scalar;
use crate::instruction_set::InstructionSet;
use crate::narrow::{NarrowingReader, debug_assert_narrow};
use crate::vector::VectorValue;

static NEON_AVAILABLE: OnceLock<bool> = OnceLock::new();

#[inline]
fn neon_available() -> bool {
    *NEON_AVAILABLE.get_or_init(|| std::arch::is_aarch64_feature_detected!("neon"))
}

macro_rules! float_op {
    ($(#[$doc:meta])* $name:ident, $impl_name:ident, $intrinsic:ident) => {
        $(#[$doc])*
        pub fn $name(a: VectorValue, b: VectorValue) -> VectorValue {
            if !neon_available() {
                return scalar::$name(a, b);
            }
            unsafe { $impl_name(a, b) }
        }

        #[target_feature(enable = "neon")]
        unsafe fn $impl_name(a: VectorValue, b: VectorValue) -> VectorValue {
            let va = vld1q_f32(a.as_bytes().as_ptr().cast::<f32>());
            let vb = vld1q_f32(b.as_bytes().as_ptr().cast::<f32>());
            let mut out = VectorValue::ZERO;
            let dst = out.as_bytes_mut().as_mut_ptr().cast::<f32>();
            vst1q_f32(dst, $intrinsic(va, vb));
            out
        }
    };
}

float_op!(
    /// `vaddq_f32`.
    add_ps, add_ps_neon, vaddq_f32
);
float_op!(
    /// `vmulq_f32`.
    mul_ps, mul_ps_neon, vmulq_f32
);
float_op!(
    /// `vsubq_f32`.
    sub_ps, sub_ps_neon, vsubq_f32
);

/// `vaddq_s32`.
pub fn add_epi32(a: VectorValue, b: VectorValue) -> VectorValue {
    if !neon_available() {
        return scalar::add_epi32(a, b);
    }
    unsafe { add_epi32_neon(a, b) }
}

#[target_feature(enable = "neon")]
unsafe fn add_epi32_neon(a: VectorValue, b: VectorValue) -> VectorValue {
    let va = vld1q_s32(a.as_bytes().as_ptr().cast::<i32>());
    let vb = vld1q_s32(b.as_bytes().as_ptr().cast::<i32>());
    let mut out = VectorValue::ZERO;
    let dst = out.as_bytes_mut().as_mut_ptr().cast::<i32>();
    vst1q_s32(dst, vaddq_s32(va, vb));
    out
}

/// Eight units, `vmovn_u16` to eight bytes, read back as one doubleword.
#[target_feature(enable = "neon")]
unsafe fn read8_neon(units: &[u16; 8]) -> u64 {
    let x = vld1q_u16(units.as_ptr());
    vget_lane_u64::<0>(vreinterpret_u64_u8(vmovn_u16(x)))
}

/// Four units duplicated into both halves, narrowed, low word out.
#[target_feature(enable = "neon")]
unsafe fn read4_neon(units: &[u16; 4]) -> u64 {
    let x = vld1_u16(units.as_ptr());
    let narrowed = vmovn_u16(vcombine_u16(x, x));
    u64::from(vget_lane_u32::<0>(vreinterpret_u32_u8(narrowed)))
}

/// NEON narrowing reader.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeonReader;

impl NarrowingReader for NeonReader {
    fn instruction_set(&self) -> InstructionSet {
        InstructionSet::Neon
    }

    fn read8(&self, units: &[u16; 8]) -> u64 {
        debug_assert_narrow(units);
        if !neon_available() {
            return scalar::read8(units);
        }
        unsafe { read8_neon(units) }
    }

    fn read4(&self, units: &[u16; 4]) -> u64 {
        debug_assert_narrow(units);
        if !neon_available() {
            return scalar::read4(units);
        }
        unsafe { read4_neon(units) }
    }
}
