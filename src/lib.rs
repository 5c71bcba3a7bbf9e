#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]

pub use narrow_hash as hash;
pub use simd_dispatch as dispatch;

pub use narrow_hash::{StringHasher, hash_converting_to_8bit, hash_one_byte};
pub use simd_dispatch::{
    InstructionSet, NarrowingReader, OperationTable, VectorValue, active_instruction_set,
    is_available, narrowing_reader, operation_table, read_small, read4, read8, resolve,
};
