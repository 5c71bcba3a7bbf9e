use std::fmt;

use simd_dispatch::{NarrowingReader, narrowing_reader};

use crate::blocks::{Blocks, CodeUnit};
use crate::mixer::{DEFAULT_SECRET, Mixer, Secret, Xxh64Mixer};

/// Hashes strings held one byte or two bytes per code unit so that the same
/// narrow text gets the same hash in either form.
///
/// Two-byte input must be narrow (every unit `<= 0xff`); the adapter does not
/// check, the narrowing readers assert it in debug builds.
///
/// # Examples
///
/// ```
/// use narrow_hash::StringHasher;
///
/// let hasher = StringHasher::new(42);
/// let wide: Vec<u16> = "caf\u{e9}".encode_utf16().collect();
/// let narrow = [b'c', b'a', b'f', 0xe9];
/// assert_eq!(hasher.hash_converting_to_8bit(&wide), hasher.hash_one_byte(&narrow));
/// ```
#[derive(Clone, Copy)]
pub struct StringHasher<M = Xxh64Mixer> {
    seed: u64,
    secret: Secret,
    mixer: M,
    reader: &'static dyn NarrowingReader,
}

impl StringHasher {
    /// Hasher with `seed`, the default secret and the default mixer, reading
    /// through the process's active narrowing reader.
    pub fn new(seed: u64) -> Self {
        Self::with_mixer(seed, Xxh64Mixer)
    }
}

impl Default for StringHasher {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<M: Mixer> StringHasher<M> {
    /// Hasher with `seed` and `mixer`.
    pub fn with_mixer(seed: u64, mixer: M) -> Self {
        Self {
            seed,
            secret: DEFAULT_SECRET,
            mixer,
            reader: narrowing_reader(),
        }
    }

    /// Replaces the secret.
    #[must_use]
    pub fn secret(mut self, secret: Secret) -> Self {
        self.secret = secret;
        self
    }

    /// Pins the narrowing reader instead of using the active one.
    ///
    /// Every reader gives the same blocks, so this changes speed, not hashes.
    #[must_use]
    pub fn reader(mut self, reader: &'static dyn NarrowingReader) -> Self {
        self.reader = reader;
        self
    }

    /// The configured seed.
    pub const fn seed_value(&self) -> u64 {
        self.seed
    }

    /// The configured secret.
    pub const fn secret_words(&self) -> &Secret {
        &self.secret
    }

    /// The reader two-byte strings are narrowed with.
    pub fn narrowing_reader(&self) -> &'static dyn NarrowingReader {
        self.reader
    }

    /// Blocks of `units` as this hasher would feed them to its mixer.
    pub fn blocks<'a, U: CodeUnit>(&'a self, units: &'a [U]) -> Blocks<'a, U> {
        Blocks::new(units, self.reader)
    }

    /// Hashes a narrow two-byte string.
    pub fn hash_converting_to_8bit(&self, units: &[u16]) -> u64 {
        self.hash_units(units)
    }

    /// Hashes a one-byte string.
    pub fn hash_one_byte(&self, bytes: &[u8]) -> u64 {
        self.hash_units(bytes)
    }

    fn hash_units<U: CodeUnit>(&self, units: &[U]) -> u64 {
        self.mixer
            .mix(self.blocks(units), units.len(), self.seed, &self.secret)
    }
}

impl<M: fmt::Debug> fmt::Debug for StringHasher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringHasher")
            .field("seed", &self.seed)
            .field("mixer", &self.mixer)
            .field("reader", &self.reader.instruction_set())
            .finish_non_exhaustive()
    }
}

/// [`StringHasher::hash_converting_to_8bit`] with the default secret and
/// mixer.
pub fn hash_converting_to_8bit(units: &[u16], seed: u64) -> u64 {
    StringHasher::new(seed).hash_converting_to_8bit(units)
}

/// [`StringHasher::hash_one_byte`] with the default secret and mixer.
pub fn hash_one_byte(bytes: &[u8], seed: u64) -> u64 {
    StringHasher::new(seed).hash_one_byte(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simd_dispatch::{InstructionSet, compiled_readers, reader_for};

    /// Records what it was given instead of mixing.
    #[derive(Debug, Default)]
    struct Recorder {
        calls: std::cell::RefCell<Vec<(Vec<u64>, usize, u64, Secret)>>,
    }

    impl Mixer for Recorder {
        fn mix<I>(&self, blocks: I, len: usize, seed: u64, secret: &Secret) -> u64
        where
            I: Iterator<Item = u64>,
        {
            self.calls
                .borrow_mut()
                .push((blocks.collect(), len, seed, *secret));
            0
        }
    }

    #[test]
    fn mixer_receives_blocks_length_seed_and_secret() {
        let recorder = Recorder::default();
        let hasher = StringHasher::with_mixer(5, &recorder).secret([1, 2, 3]);
        hasher.hash_converting_to_8bit(&[0x61, 0x62, 0x63, 0x64, 0x65]);

        let calls = recorder.calls.borrow();
        let (blocks, len, seed, secret) = &calls[0];
        assert_eq!(blocks, &[0x6463_6261, (0x61 << 56) | (0x63 << 32) | 0x65]);
        assert_eq!(*len, 5);
        assert_eq!(*seed, 5);
        assert_eq!(*secret, [1, 2, 3]);
    }

    #[test]
    fn empty_string_still_mixes_length_and_secret() {
        let recorder = Recorder::default();
        StringHasher::with_mixer(0, &recorder).hash_one_byte(&[]);
        let calls = recorder.calls.borrow();
        assert!(calls[0].0.is_empty());
        assert_eq!(calls[0].1, 0);
        assert_eq!(calls[0].3, DEFAULT_SECRET);
    }

    #[test]
    fn hash_is_independent_of_reader() {
        let units: Vec<u16> = (0u16..0xff).collect();
        let scalar = StringHasher::new(1).reader(reader_for(InstructionSet::Scalar));
        let expected = scalar.hash_converting_to_8bit(&units);
        for reader in compiled_readers() {
            let hasher = StringHasher::new(1).reader(reader);
            assert_eq!(
                hasher.hash_converting_to_8bit(&units),
                expected,
                "{}",
                reader.instruction_set()
            );
        }
    }

    #[test]
    fn free_functions_use_defaults() {
        let bytes = b"hello, world";
        let units: Vec<u16> = bytes.iter().map(|&b| u16::from(b)).collect();
        assert_eq!(
            hash_one_byte(bytes, 3),
            StringHasher::new(3).hash_one_byte(bytes)
        );
        assert_eq!(hash_converting_to_8bit(&units, 3), hash_one_byte(bytes, 3));
        assert_ne!(hash_one_byte(bytes, 3), hash_one_byte(bytes, 4));
    }

    #[test]
    fn accessors_report_configuration() {
        let hasher = StringHasher::new(9).secret([4, 5, 6]);
        assert_eq!(hasher.seed_value(), 9);
        assert_eq!(hasher.secret_words(), &[4, 5, 6]);
        assert_eq!(
            hasher.narrowing_reader().instruction_set(),
            narrowing_reader().instruction_set()
        );
        assert!(format!("{hasher:?}").starts_with("StringHasher { seed: 9"));
    }
}
