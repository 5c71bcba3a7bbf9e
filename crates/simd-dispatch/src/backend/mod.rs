//! Per-facility implementations of the vector operations and narrowing
//! readers.
//!
//! [`scalar`] is the reference every other module is tested against. The
//! intrinsic backends ([`sse2`], [`neon`]) are compiled only for targets that
//! can execute them and check host support on every call; the register-model
//! backends ([`three_dnow`], [`altivec`]) compile everywhere and are only
//! selected when the host reports the facility.

pub mod altivec;
#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
pub mod neon;
pub mod scalar;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod sse2;
pub mod three_dnow;
