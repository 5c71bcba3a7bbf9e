#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]

//! Portable SIMD capability layer.
//!
//! `simd-dispatch` decides once per process which vector instruction family
//! the host can run and hands out two things built for it:
//!
//! - an [`OperationTable`] of five 128-bit vector operations (`add_ps`,
//!   `mul_ps`, `sub_ps`, `add_epi32`, `shuffle_epi32`), every slot bound to a
//!   native implementation or to the scalar fallback;
//! - a [`NarrowingReader`] that packs 16-bit code units known to fit in one
//!   byte into little-endian `u64` words, for string hashers that want the
//!   same hash whether a string is stored one or two bytes per character.
//!
//! # Backends
//!
//! | Instruction set | Registers | Operations | Readers |
//! |-----------------|-----------|------------|---------|
//! | SSE2 | 128-bit, little-endian | all five | `packuswb` |
//! | NEON | 128-bit, little-endian | all but shuffle | `vmovn` |
//! | 3DNow! | 64-bit, little-endian | float ops | `packuswb` ×2 |
//! | AltiVec | 128-bit, big-endian | all five | `vec_pack` + lane reversal |
//! | Scalar | n/a | all five | shifts |
//!
//! Every backend produces bit-identical results to scalar on valid input.
//!
//! # Selection
//!
//! [`resolve`] probes the host on first call and memoizes the answer. The
//! `SIMDCAP_BACKEND` environment variable ([`BACKEND_ENV`]) can force a
//! facility (`sse2`, `neon`, `3dnow`, `altivec`) or disable vector code
//! (`none`); the `scalar-only` feature does the latter at build time. A forced
//! facility the host lacks falls back to scalar.
//!
//! # Example
//!
//! ```
//! use simd_dispatch::{operation_table, read8, VectorValue};
//!
//! let table = operation_table();
//! let a = VectorValue::from_f32x4([1.0, 2.0, 3.0, 4.0]);
//! let b = VectorValue::from_f32x4([0.5; 4]);
//! assert_eq!(table.add_ps(a, b).to_f32x4(), [1.5, 2.5, 3.5, 4.5]);
//!
//! let units: Vec<u16> = "abcdefgh".encode_utf16().collect();
//! let units: &[u16; 8] = units.as_slice().try_into().unwrap();
//! assert_eq!(read8(units).to_le_bytes(), *b"abcdefgh");
//! ```
//!
//! # Tracing
//!
//! With the default `tracing` feature, host probing and resolution emit
//! events under the `simd_dispatch::detect` target and table construction
//! under `simd_dispatch::table`.

pub mod backend;
mod config;
mod detect;
mod error;
mod instruction_set;
mod narrow;
mod table;
mod trace;
mod vector;

pub use config::{BACKEND_ENV, DetectorConfig, Selection};
pub use detect::{Detector, HostCapabilities, is_available, resolve};
pub use error::SelectionParseError;
pub use instruction_set::{ByteOrder, InstructionSet};
pub use narrow::{
    NarrowingReader, compiled_readers, narrowing_reader, read_small, read4, read8, reader_for,
};
pub use table::{
    BinaryOp, Operation, OperationTable, ShuffleOp, active_instruction_set, operation_table,
};
pub use trace::{DETECT_TARGET, TABLE_TARGET};
pub use vector::VectorValue;
