//! Operation table: one function pointer per vector operation.
//!
//! A table is built for one instruction set. Every slot is always bound:
//! operations the backend implements natively point at it, the rest point at
//! the scalar implementation. Callers never see an unbound slot, and the
//! table records which backend actually serves each one.

use std::fmt;
use std::sync::OnceLock;

use crate::backend::{altivec, scalar, three_dnow};
use crate::detect;
use crate::instruction_set::InstructionSet;
use crate::trace;
use crate::vector::VectorValue;

/// Lane-wise binary operation on two 128-bit values.
pub type BinaryOp = fn(VectorValue, VectorValue) -> VectorValue;

/// Dword permutation with a runtime selector byte.
pub type ShuffleOp = fn(VectorValue, u8) -> VectorValue;

/// Names of the table slots.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operation {
    /// Four-lane `f32` addition.
    AddPs,
    /// Four-lane `f32` multiplication.
    MulPs,
    /// Four-lane `f32` subtraction.
    SubPs,
    /// Four-lane wrapping `i32` addition.
    AddEpi32,
    /// Four-lane 32-bit permutation.
    ShuffleEpi32,
}

impl Operation {
    /// Every slot, in table order.
    pub const ALL: [Self; 5] = [
        Self::AddPs,
        Self::MulPs,
        Self::SubPs,
        Self::AddEpi32,
        Self::ShuffleEpi32,
    ];

    /// Intrinsic-style name of the operation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddPs => "add_ps",
            Self::MulPs => "mul_ps",
            Self::SubPs => "sub_ps",
            Self::AddEpi32 => "add_epi32",
            Self::ShuffleEpi32 => "shuffle_epi32",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Function pointers for the five vector operations of one backend.
///
/// # Examples
///
/// ```
/// use simd_dispatch::{InstructionSet, Operation, OperationTable, VectorValue};
///
/// let table = OperationTable::for_instruction_set(InstructionSet::ThreeDNow);
/// assert_eq!(table.provider(Operation::AddPs), InstructionSet::ThreeDNow);
/// assert_eq!(table.provider(Operation::ShuffleEpi32), InstructionSet::Scalar);
///
/// let v = VectorValue::from_i32x4([1, 2, 3, 4]);
/// assert_eq!(table.shuffle_epi32(v, 0x1b).to_i32x4(), [4, 3, 2, 1]);
/// ```
#[derive(Clone, Copy)]
pub struct OperationTable {
    instruction_set: InstructionSet,
    add_ps: BinaryOp,
    mul_ps: BinaryOp,
    sub_ps: BinaryOp,
    add_epi32: BinaryOp,
    shuffle_epi32: ShuffleOp,
    providers: [InstructionSet; 5],
}

impl OperationTable {
    /// Table with every slot bound to the scalar implementation.
    #[must_use]
    pub fn scalar() -> Self {
        Self {
            instruction_set: InstructionSet::Scalar,
            add_ps: scalar::add_ps,
            mul_ps: scalar::mul_ps,
            sub_ps: scalar::sub_ps,
            add_epi32: scalar::add_epi32,
            shuffle_epi32: scalar::shuffle_epi32,
            providers: [InstructionSet::Scalar; 5],
        }
    }

    /// Builds the table for `set`.
    ///
    /// Starts from [`scalar`](Self::scalar) and overwrites the slots the
    /// backend implements. `None`, and vector sets not compiled into this
    /// target, yield the scalar table labelled `Scalar`.
    #[must_use]
    pub fn for_instruction_set(set: InstructionSet) -> Self {
        let mut table = Self::scalar();
        match set {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            InstructionSet::Sse2 => {
                use crate::backend::sse2;
                table.bind_binary(set, Operation::AddPs, sse2::add_ps);
                table.bind_binary(set, Operation::MulPs, sse2::mul_ps);
                table.bind_binary(set, Operation::SubPs, sse2::sub_ps);
                table.bind_binary(set, Operation::AddEpi32, sse2::add_epi32);
                table.shuffle_epi32 = sse2::shuffle_epi32;
                table.providers[Operation::ShuffleEpi32.index()] = set;
            }
            #[cfg(all(target_arch = "aarch64", target_endian = "little"))]
            InstructionSet::Neon => {
                use crate::backend::neon;
                table.bind_binary(set, Operation::AddPs, neon::add_ps);
                table.bind_binary(set, Operation::MulPs, neon::mul_ps);
                table.bind_binary(set, Operation::SubPs, neon::sub_ps);
                table.bind_binary(set, Operation::AddEpi32, neon::add_epi32);
            }
            InstructionSet::ThreeDNow => {
                table.bind_binary(set, Operation::AddPs, three_dnow::add_ps);
                table.bind_binary(set, Operation::MulPs, three_dnow::mul_ps);
                table.bind_binary(set, Operation::SubPs, three_dnow::sub_ps);
            }
            InstructionSet::AltiVec => {
                table.bind_binary(set, Operation::AddPs, altivec::add_ps);
                table.bind_binary(set, Operation::MulPs, altivec::mul_ps);
                table.bind_binary(set, Operation::SubPs, altivec::sub_ps);
                table.bind_binary(set, Operation::AddEpi32, altivec::add_epi32);
                table.shuffle_epi32 = altivec::shuffle_epi32;
                table.providers[Operation::ShuffleEpi32.index()] = set;
            }
            _ => return table,
        }

        table.instruction_set = set;
        for op in Operation::ALL {
            if table.provider(op) == InstructionSet::Scalar {
                trace::slot_fallback(set, op);
            }
        }
        table
    }

    fn bind_binary(&mut self, set: InstructionSet, op: Operation, f: BinaryOp) {
        let slot = match op {
            Operation::AddPs => &mut self.add_ps,
            Operation::MulPs => &mut self.mul_ps,
            Operation::SubPs => &mut self.sub_ps,
            Operation::AddEpi32 => &mut self.add_epi32,
            Operation::ShuffleEpi32 => return,
        };
        *slot = f;
        self.providers[op.index()] = set;
    }

    /// Instruction set the table was built for.
    #[must_use]
    pub const fn instruction_set(&self) -> InstructionSet {
        self.instruction_set
    }

    /// Backend serving `op`: the table's own set, or `Scalar` for a slot it
    /// does not implement.
    #[must_use]
    pub const fn provider(&self, op: Operation) -> InstructionSet {
        self.providers[op.index()]
    }

    /// Operations served natively by the table's instruction set.
    pub fn native_operations(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL
            .into_iter()
            .filter(|&op| self.provider(op) == self.instruction_set)
    }

    /// Slot for [`Operation::AddPs`].
    #[must_use]
    pub const fn add_ps_fn(&self) -> BinaryOp {
        self.add_ps
    }

    /// Slot for [`Operation::MulPs`].
    #[must_use]
    pub const fn mul_ps_fn(&self) -> BinaryOp {
        self.mul_ps
    }

    /// Slot for [`Operation::SubPs`].
    #[must_use]
    pub const fn sub_ps_fn(&self) -> BinaryOp {
        self.sub_ps
    }

    /// Slot for [`Operation::AddEpi32`].
    #[must_use]
    pub const fn add_epi32_fn(&self) -> BinaryOp {
        self.add_epi32
    }

    /// Slot for [`Operation::ShuffleEpi32`].
    #[must_use]
    pub const fn shuffle_epi32_fn(&self) -> ShuffleOp {
        self.shuffle_epi32
    }

    /// Lane-wise `a + b` on `f32` lanes.
    #[inline]
    #[must_use]
    pub fn add_ps(&self, a: VectorValue, b: VectorValue) -> VectorValue {
        (self.add_ps)(a, b)
    }

    /// Lane-wise `a * b` on `f32` lanes.
    #[inline]
    #[must_use]
    pub fn mul_ps(&self, a: VectorValue, b: VectorValue) -> VectorValue {
        (self.mul_ps)(a, b)
    }

    /// Lane-wise `a - b` on `f32` lanes.
    #[inline]
    #[must_use]
    pub fn sub_ps(&self, a: VectorValue, b: VectorValue) -> VectorValue {
        (self.sub_ps)(a, b)
    }

    /// Lane-wise wrapping `a + b` on `i32` lanes.
    #[inline]
    #[must_use]
    pub fn add_epi32(&self, a: VectorValue, b: VectorValue) -> VectorValue {
        (self.add_epi32)(a, b)
    }

    /// Output lane `i` is input lane `(imm >> 2i) & 3`.
    #[inline]
    #[must_use]
    pub fn shuffle_epi32(&self, a: VectorValue, imm: u8) -> VectorValue {
        (self.shuffle_epi32)(a, imm)
    }
}

impl Default for OperationTable {
    fn default() -> Self {
        Self::scalar()
    }
}

impl fmt::Debug for OperationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for op in Operation::ALL {
            map.entry(&op.name(), &self.provider(op).name());
        }
        map.finish()?;
        write!(f, " ({})", self.instruction_set)
    }
}

/// Table of the process-wide resolved instruction set, built on first use.
pub fn operation_table() -> &'static OperationTable {
    static TABLE: OnceLock<OperationTable> = OnceLock::new();
    TABLE.get_or_init(|| OperationTable::for_instruction_set(detect::resolve()))
}

/// Instruction set of [`operation_table`].
pub fn active_instruction_set() -> InstructionSet {
    operation_table().instruction_set()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_table_serves_everything_from_scalar() {
        let table = OperationTable::scalar();
        assert_eq!(table.instruction_set(), InstructionSet::Scalar);
        assert!(
            Operation::ALL
                .iter()
                .all(|&op| table.provider(op) == InstructionSet::Scalar)
        );
        assert_eq!(table.native_operations().count(), 5);
    }

    #[test]
    fn none_builds_the_scalar_table() {
        let table = OperationTable::for_instruction_set(InstructionSet::None);
        assert_eq!(table.instruction_set(), InstructionSet::Scalar);
    }

    #[test]
    fn three_dnow_leaves_integer_slots_to_scalar() {
        let table = OperationTable::for_instruction_set(InstructionSet::ThreeDNow);
        let native: Vec<_> = table.native_operations().collect();
        assert_eq!(
            native,
            [Operation::AddPs, Operation::MulPs, Operation::SubPs]
        );
        assert_eq!(table.provider(Operation::AddEpi32), InstructionSet::Scalar);
        assert_eq!(
            table.provider(Operation::ShuffleEpi32),
            InstructionSet::Scalar
        );
    }

    #[test]
    fn altivec_implements_every_slot() {
        let table = OperationTable::for_instruction_set(InstructionSet::AltiVec);
        assert_eq!(table.native_operations().count(), Operation::ALL.len());
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    #[test]
    fn sse2_implements_every_slot() {
        let table = OperationTable::for_instruction_set(InstructionSet::Sse2);
        assert_eq!(table.instruction_set(), InstructionSet::Sse2);
        assert_eq!(table.native_operations().count(), Operation::ALL.len());
    }

    #[cfg(all(target_arch = "aarch64", target_endian = "little"))]
    #[test]
    fn neon_leaves_shuffle_to_scalar() {
        let table = OperationTable::for_instruction_set(InstructionSet::Neon);
        assert_eq!(
            table.provider(Operation::ShuffleEpi32),
            InstructionSet::Scalar
        );
        assert_eq!(table.provider(Operation::AddEpi32), InstructionSet::Neon);
    }

    #[test]
    fn slot_accessors_return_bound_functions() {
        let table = OperationTable::for_instruction_set(InstructionSet::ThreeDNow);
        let a = VectorValue::from_f32x4([1.0, 2.0, 3.0, 4.0]);
        assert_eq!((table.add_ps_fn())(a, a), table.add_ps(a, a));
        assert_eq!(
            (table.shuffle_epi32_fn())(a, 0),
            scalar::shuffle_epi32(a, 0)
        );
    }

    #[test]
    fn global_table_matches_resolution() {
        assert_eq!(active_instruction_set(), detect::resolve());
        assert!(std::ptr::eq(operation_table(), operation_table()));
    }

    #[test]
    fn debug_lists_providers() {
        let text = format!(
            "{:?}",
            OperationTable::for_instruction_set(InstructionSet::ThreeDNow)
        );
        assert!(text.contains("\"shuffle_epi32\": \"scalar\""));
        assert!(text.ends_with("(3dnow)"));
    }
}
