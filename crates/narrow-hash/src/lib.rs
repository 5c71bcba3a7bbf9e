#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]

//! String hash adapter over the `simd-dispatch` narrowing readers.
//!
//! A string engine that stores Latin-1 text one byte per character, but may
//! also hold the same text in a two-byte buffer, needs both forms to hash the
//! same. This crate cuts either form into the same stream of 64-bit blocks
//! (two-byte units are narrowed on the fly by the active
//! [`NarrowingReader`](simd_dispatch::NarrowingReader)) and feeds the stream,
//! the length, a seed and a secret to a [`Mixer`].
//!
//! ```
//! use narrow_hash::{hash_converting_to_8bit, hash_one_byte};
//!
//! let wide: Vec<u16> = "narrow".encode_utf16().collect();
//! assert_eq!(hash_converting_to_8bit(&wide, 7), hash_one_byte(b"narrow", 7));
//! ```
//!
//! The default mixer is XXH64 ([`Xxh64Mixer`]); any other 64-bit mixing
//! function can be plugged in through the [`Mixer`] trait.

mod adapter;
pub mod blocks;
mod mixer;

#[cfg(feature = "parallel")]
#[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
mod parallel;

pub use adapter::{StringHasher, hash_converting_to_8bit, hash_one_byte};
pub use blocks::{Blocks, CodeUnit};
pub use mixer::{DEFAULT_SECRET, Mixer, Secret, Xxh64Mixer};
#[cfg(feature = "parallel")]
pub use parallel::{ParallelStringHash, hash_batch_converting_to_8bit};
