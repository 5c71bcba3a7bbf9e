//! Portable scalar backend.
//!
//! These functions define correct behaviour: every vector backend is a
//! re-derivation of them and is tested against them.

use crate::instruction_set::InstructionSet;
use crate::narrow::{NarrowingReader, debug_assert_narrow, debug_assert_small};
use crate::vector::VectorValue;

#[inline]
fn lanewise_f32(a: VectorValue, b: VectorValue, op: impl Fn(f32, f32) -> f32) -> VectorValue {
    let (a, b) = (a.to_f32x4(), b.to_f32x4());
    VectorValue::from_f32x4(std::array::from_fn(|i| op(a[i], b[i])))
}

/// Lane-wise `a + b` over four `f32` lanes.
pub fn add_ps(a: VectorValue, b: VectorValue) -> VectorValue {
    lanewise_f32(a, b, |x, y| x + y)
}

/// Lane-wise `a * b` over four `f32` lanes.
pub fn mul_ps(a: VectorValue, b: VectorValue) -> VectorValue {
    lanewise_f32(a, b, |x, y| x * y)
}

/// Lane-wise `a - b` over four `f32` lanes.
pub fn sub_ps(a: VectorValue, b: VectorValue) -> VectorValue {
    lanewise_f32(a, b, |x, y| x - y)
}

/// Lane-wise wrapping `a + b` over four `i32` lanes.
pub fn add_epi32(a: VectorValue, b: VectorValue) -> VectorValue {
    let (a, b) = (a.to_i32x4(), b.to_i32x4());
    VectorValue::from_i32x4(std::array::from_fn(|i| a[i].wrapping_add(b[i])))
}

/// Permutes 32-bit lanes: output lane `i` takes input lane `(imm >> 2i) & 3`.
pub fn shuffle_epi32(a: VectorValue, imm: u8) -> VectorValue {
    let lanes = a.to_u32x4();
    VectorValue::from_u32x4(std::array::from_fn(|i| {
        lanes[usize::from((imm >> (2 * i)) & 0b11)]
    }))
}

/// Packs the low byte of each unit into byte `i` of the result.
#[inline]
pub fn read8(units: &[u16; 8]) -> u64 {
    debug_assert_narrow(units);
    units
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &unit)| {
            acc | (u64::from(unit & 0xff) << (8 * i))
        })
}

/// [`read8`] over four units; bits 32 through 63 are zero.
#[inline]
pub fn read4(units: &[u16; 4]) -> u64 {
    debug_assert_narrow(units);
    units
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &unit)| {
            acc | (u64::from(unit & 0xff) << (8 * i))
        })
}

/// `units[0] << 56 | units[k >> 1] << 32 | units[k - 1]`.
#[inline]
pub fn read_small(units: &[u16], k: usize) -> u64 {
    debug_assert_small(units, k);
    (u64::from(units[0]) << 56) | (u64::from(units[k >> 1]) << 32) | u64::from(units[k - 1])
}

/// Scalar narrowing reader.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarReader;

impl NarrowingReader for ScalarReader {
    fn instruction_set(&self) -> InstructionSet {
        InstructionSet::Scalar
    }

    fn read8(&self, units: &[u16; 8]) -> u64 {
        read8(units)
    }

    fn read4(&self, units: &[u16; 4]) -> u64 {
        read4(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read8_places_unit_i_in_byte_i() {
        assert_eq!(read8(&[1, 2, 3, 4, 5, 6, 7, 8]), 0x0807_0605_0403_0201);
    }

    #[test]
    fn read4_leaves_upper_half_clear() {
        let value = read4(&[10, 20, 30, 40]);
        assert_eq!(value, 10 | (20 << 8) | (30 << 16) | (40 << 24));
        assert_eq!(value >> 32, 0);
        assert_eq!(read4(&[0xff; 4]), 0xffff_ffff);
    }

    #[test]
    fn read_small_single_unit_repeats_it() {
        let e: u16 = 0x5a;
        let wide = u64::from(e);
        assert_eq!(read_small(&[e], 1), (wide << 56) | (wide << 32) | wide);
    }

    #[test]
    fn read_small_seven_units_uses_three_positions() {
        let units = [1, 2, 3, 4, 5, 6, 7];
        assert_eq!(read_small(&units, 7), (1 << 56) | (4 << 32) | 7);
    }

    #[test]
    fn read_small_respects_k_not_slice_length() {
        let units = [9, 8, 7, 6, 5];
        assert_eq!(read_small(&units, 2), (9 << 56) | (8 << 32) | 8);
    }

    #[test]
    fn shuffle_identity_and_broadcast() {
        let v = VectorValue::from_i32x4([10, 11, 12, 13]);
        assert_eq!(shuffle_epi32(v, 0b11_10_01_00), v);
        assert_eq!(shuffle_epi32(v, 0b00_00_00_00).to_i32x4(), [10; 4]);
        assert_eq!(shuffle_epi32(v, 0b00_01_10_11).to_i32x4(), [13, 12, 11, 10]);
    }

    #[test]
    fn add_epi32_wraps() {
        let a = VectorValue::from_i32x4([i32::MAX, -1, 0, 5]);
        let b = VectorValue::from_i32x4([1, 1, 0, -7]);
        assert_eq!(add_epi32(a, b).to_i32x4(), [i32::MIN, 0, 0, -2]);
    }

    #[test]
    fn float_ops_are_lanewise() {
        let a = VectorValue::from_f32x4([1.0, 2.0, 3.0, 4.0]);
        let b = VectorValue::from_f32x4([0.5, 0.25, -1.0, 8.0]);
        assert_eq!(add_ps(a, b).to_f32x4(), [1.5, 2.25, 2.0, 12.0]);
        assert_eq!(sub_ps(a, b).to_f32x4(), [0.5, 1.75, 4.0, -4.0]);
        assert_eq!(mul_ps(a, b).to_f32x4(), [0.5, 0.5, -3.0, 32.0]);
    }
}
