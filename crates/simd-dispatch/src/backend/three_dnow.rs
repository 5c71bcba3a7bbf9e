//! Legacy 64-bit packed backend: MMX registers with 3DNow! float ops.
//!
//! Stable Rust exposes neither MMX nor 3DNow! intrinsics, so this backend is
//! written against a model of one 64-bit `mm` register and the instructions
//! it needs (`movq`, `packuswb`, `pfadd`, `pfmul`, `pfsub`). The model has no
//! x87 aliasing, so there is no `emms` to issue.
//!
//! A 64-bit register holds two `f32` lanes or four `u16` lanes, so every
//! four-lane operation runs as two register operations. The facility has no
//! packed 32-bit add worth using and no dword shuffle; the table binds those
//! slots to scalar.

use crate::instruction_set::InstructionSet;
use crate::narrow::{NarrowingReader, debug_assert_narrow};
use crate::vector::VectorValue;

/// One 64-bit `mm` register. Word/dword `i` starts at bit `16 * i`/`32 * i`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Mm(u64);

impl Mm {
    /// `movq mm, [units]`.
    fn load_words(units: [u16; 4]) -> Self {
        Self(
            units
                .iter()
                .enumerate()
                .fold(0, |acc, (i, &w)| acc | (u64::from(w) << (16 * i))),
        )
    }

    fn from_dwords(lo: u32, hi: u32) -> Self {
        Self(u64::from(lo) | (u64::from(hi) << 32))
    }

    const fn word(self, i: usize) -> u16 {
        (self.0 >> (16 * i)) as u16
    }

    const fn dword(self, i: usize) -> u32 {
        (self.0 >> (32 * i)) as u32
    }
}

/// `packuswb a, b`: signed words saturated to `0..=255`. The four words of
/// `a` land in bytes 0 through 3, those of `b` in bytes 4 through 7.
fn packuswb(a: Mm, b: Mm) -> Mm {
    let saturate = |word: u16| u64::from(word.cast_signed().clamp(0, 0xff) as u8);
    let mut out = 0u64;
    for i in 0..4 {
        out |= saturate(a.word(i)) << (8 * i);
        out |= saturate(b.word(i)) << (8 * (i + 4));
    }
    Mm(out)
}

/// Shared shape of `pfadd`, `pfmul` and `pfsub`: two `f32` lanes per register.
fn packed_float(a: Mm, b: Mm, op: impl Fn(f32, f32) -> f32) -> Mm {
    let lane = |i| {
        let (x, y) = (f32::from_bits(a.dword(i)), f32::from_bits(b.dword(i)));
        op(x, y).to_bits()
    };
    Mm::from_dwords(lane(0), lane(1))
}

fn pfadd(a: Mm, b: Mm) -> Mm {
    packed_float(a, b, |x, y| x + y)
}

fn pfmul(a: Mm, b: Mm) -> Mm {
    packed_float(a, b, |x, y| x * y)
}

fn pfsub(a: Mm, b: Mm) -> Mm {
    packed_float(a, b, |x, y| x - y)
}

fn split(value: VectorValue) -> [Mm; 2] {
    let [l0, l1, l2, l3] = value.to_u32x4();
    [Mm::from_dwords(l0, l1), Mm::from_dwords(l2, l3)]
}

fn join([lo, hi]: [Mm; 2]) -> VectorValue {
    VectorValue::from_u32x4([lo.dword(0), lo.dword(1), hi.dword(0), hi.dword(1)])
}

fn pairwise(a: VectorValue, b: VectorValue, op: fn(Mm, Mm) -> Mm) -> VectorValue {
    let ([a_lo, a_hi], [b_lo, b_hi]) = (split(a), split(b));
    join([op(a_lo, b_lo), op(a_hi, b_hi)])
}

/// `add_ps` as two `pfadd`.
pub fn add_ps(a: VectorValue, b: VectorValue) -> VectorValue {
    pairwise(a, b, pfadd)
}

/// `mul_ps` as two `pfmul`.
pub fn mul_ps(a: VectorValue, b: VectorValue) -> VectorValue {
    pairwise(a, b, pfmul)
}

/// `sub_ps` as two `pfsub`.
pub fn sub_ps(a: VectorValue, b: VectorValue) -> VectorValue {
    pairwise(a, b, pfsub)
}

/// Narrowing reader packing four lanes per `packuswb`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreeDNowReader;

impl NarrowingReader for ThreeDNowReader {
    fn instruction_set(&self) -> InstructionSet {
        InstructionSet::ThreeDNow
    }

    fn read8(&self, units: &[u16; 8]) -> u64 {
        debug_assert_narrow(units);
        let [u0, u1, u2, u3, u4, u5, u6, u7] = *units;
        let lo = Mm::load_words([u0, u1, u2, u3]);
        let hi = Mm::load_words([u4, u5, u6, u7]);
        packuswb(lo, hi).0
    }

    fn read4(&self, units: &[u16; 4]) -> u64 {
        debug_assert_narrow(units);
        packuswb(Mm::load_words(*units), Mm::default()).0
    }
}
