//! Big-endian 128-bit vector backend (PowerPC AltiVec/VMX).
//!
//! AltiVec intrinsics are not available on stable Rust, so the backend is
//! written against a model of one `vr` register: sixteen bytes in big-endian
//! element order, element `i` of a `w`-byte type occupying bytes
//! `w * i .. w * (i + 1)`, most significant byte first. The instructions used
//! are `vec_ld`, `vec_pack`, `vec_perm`, `vec_add`, `vec_sub` and `vec_madd`.
//!
//! Extracting a doubleword from a big-endian register puts element 0 in the
//! most significant byte, the reverse of the lane order the narrowing readers
//! promise. The readers therefore reverse byte lanes explicitly after the
//! extraction; the little-endian backends never need that step.

use crate::instruction_set::InstructionSet;
use crate::narrow::{NarrowingReader, debug_assert_narrow};
use crate::vector::VectorValue;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Vr([u8; 16]);

impl Vr {
    /// `vec_ld` of unsigned halfwords. Elements past `units` stay zero.
    fn load_u16(units: &[u16]) -> Self {
        let mut bytes = [0u8; 16];
        for (dst, unit) in bytes.chunks_exact_mut(2).zip(units) {
            dst.copy_from_slice(&unit.to_be_bytes());
        }
        Self(bytes)
    }

    fn from_words(words: [u32; 4]) -> Self {
        let mut bytes = [0u8; 16];
        for (dst, word) in bytes.chunks_exact_mut(4).zip(words) {
            dst.copy_from_slice(&word.to_be_bytes());
        }
        Self(bytes)
    }

    fn words(self) -> [u32; 4] {
        let (words, _) = self.0.as_chunks::<4>();
        std::array::from_fn(|i| u32::from_be_bytes(words[i]))
    }

    fn from_vector(value: VectorValue) -> Self {
        Self::from_words(value.to_u32x4())
    }

    fn into_vector(self) -> VectorValue {
        VectorValue::from_u32x4(self.words())
    }

    /// Doubleword `i` as the register holds it: element 0 most significant.
    fn doubleword(self, i: usize) -> u64 {
        let (doublewords, _) = self.0.as_chunks::<8>();
        u64::from_be_bytes(doublewords[i])
    }

    fn word(self, i: usize) -> u32 {
        self.words()[i]
    }
}

/// `vec_pack` on unsigned halfwords: modular truncation to the low-order
/// byte. Elements of `a` fill bytes 0 through 7, elements of `b` bytes 8
/// through 15.
fn vec_pack(a: Vr, b: Vr) -> Vr {
    let mut out = [0u8; 16];
    for (i, dst) in out.iter_mut().enumerate() {
        let src = if i < 8 { a } else { b };
        *dst = src.0[2 * (i % 8) + 1];
    }
    Vr(out)
}

/// `vec_perm`: byte `i` of the result is byte `control[i] & 0x1f` of the
/// 32-byte concatenation `a || b`.
fn vec_perm(a: Vr, b: Vr, control: Vr) -> Vr {
    Vr(std::array::from_fn(|i| {
        let index = usize::from(control.0[i] & 0x1f);
        if index < 16 { a.0[index] } else { b.0[index - 16] }
    }))
}

fn float_elements(a: Vr, b: Vr, op: impl Fn(f32, f32) -> f32) -> Vr {
    let (a, b) = (a.words(), b.words());
    Vr::from_words(std::array::from_fn(|i| {
        op(f32::from_bits(a[i]), f32::from_bits(b[i])).to_bits()
    }))
}

/// Reorders a doubleword extracted from a big-endian register into the
/// little-endian lane order.
const fn reverse_byte_lanes(doubleword: u64) -> u64 {
    doubleword.swap_bytes()
}

/// `vec_add` on `vector float`.
pub fn add_ps(a: VectorValue, b: VectorValue) -> VectorValue {
    float_elements(Vr::from_vector(a), Vr::from_vector(b), |x, y| x + y).into_vector()
}

/// `vec_madd(a, b, -0.0)`. Adding negative zero leaves every product,
/// `-0.0` included, unchanged, so the model multiplies only.
pub fn mul_ps(a: VectorValue, b: VectorValue) -> VectorValue {
    float_elements(Vr::from_vector(a), Vr::from_vector(b), |x, y| x * y).into_vector()
}

/// `vec_sub` on `vector float`.
pub fn sub_ps(a: VectorValue, b: VectorValue) -> VectorValue {
    float_elements(Vr::from_vector(a), Vr::from_vector(b), |x, y| x - y).into_vector()
}

/// `vec_add` on `vector signed int`, modular.
pub fn add_epi32(a: VectorValue, b: VectorValue) -> VectorValue {
    let (a, b) = (Vr::from_vector(a).words(), Vr::from_vector(b).words());
    let sum = std::array::from_fn(|i| a[i].wrapping_add(b[i]));
    Vr::from_words(sum).into_vector()
}

/// Dword shuffle through `vec_perm` with a control vector built from the
/// 2-bit selectors of `imm`.
pub fn shuffle_epi32(a: VectorValue, imm: u8) -> VectorValue {
    let mut control = [0u8; 16];
    for (element, dst) in control.chunks_exact_mut(4).enumerate() {
        let source = (imm >> (2 * element)) & 0b11;
        for (byte, slot) in dst.iter_mut().enumerate() {
            *slot = 4 * source + byte as u8;
        }
    }
    let v = Vr::from_vector(a);
    vec_perm(v, v, Vr(control)).into_vector()
}

/// Narrowing reader packing eight halfwords per `vec_pack`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AltiVecReader;

impl NarrowingReader for AltiVecReader {
    fn instruction_set(&self) -> InstructionSet {
        InstructionSet::AltiVec
    }

    fn read8(&self, units: &[u16; 8]) -> u64 {
        debug_assert_narrow(units);
        let x = Vr::load_u16(units);
        reverse_byte_lanes(vec_pack(x, x).doubleword(0))
    }

    fn read4(&self, units: &[u16; 4]) -> u64 {
        debug_assert_narrow(units);
        let packed = vec_pack(Vr::load_u16(units), Vr::default());
        u64::from(packed.word(0).swap_bytes())
    }
}
