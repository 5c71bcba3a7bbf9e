//! The closed set of vector instruction families the dispatcher knows about.

use std::fmt;

/// Byte order in which a backend's registers hold their lanes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ByteOrder {
    /// Lane 0 lives in the lowest-addressed bytes (x86, little-endian ARM).
    Little,
    /// Lane 0 lives in the most significant bytes (PowerPC AltiVec).
    Big,
}

/// Vector instruction family selected for this process.
///
/// Exactly one value is active after [`resolve`](crate::resolve) runs and it
/// never changes afterwards. [`InstructionSet::None`] marks "nothing
/// resolved" and is never produced by resolution; a host without any usable
/// facility resolves to [`InstructionSet::Scalar`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum InstructionSet {
    /// No instruction set resolved.
    #[default]
    None = 0,
    /// Portable scalar fallback, always available.
    Scalar = 1,
    /// 128-bit packed integer/float facility on x86 and x86_64.
    Sse2 = 2,
    /// Legacy 64-bit packed facility (MMX registers with 3DNow! float ops).
    ThreeDNow = 3,
    /// 128-bit big-endian vector facility on PowerPC.
    AltiVec = 4,
    /// 128-bit Advanced SIMD facility on little-endian aarch64.
    Neon = 5,
}

impl InstructionSet {
    /// Every instruction set, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Scalar,
        Self::Sse2,
        Self::ThreeDNow,
        Self::AltiVec,
        Self::Neon,
    ];

    /// Vector facilities in the order auto-detection prefers them.
    ///
    /// SSE2 and NEON share the 128-bit tier; no host exposes both.
    pub const VECTOR_PRIORITY: [Self; 4] = [Self::Sse2, Self::Neon, Self::ThreeDNow, Self::AltiVec];

    /// Stable lowercase name, also accepted by the selection parser.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Scalar => "scalar",
            Self::Sse2 => "sse2",
            Self::ThreeDNow => "3dnow",
            Self::AltiVec => "altivec",
            Self::Neon => "neon",
        }
    }

    /// Native register width in bits, or `None` for the non-vector values.
    #[must_use]
    pub const fn register_bits(self) -> Option<u32> {
        match self {
            Self::None | Self::Scalar => None,
            Self::ThreeDNow => Some(64),
            Self::Sse2 | Self::AltiVec | Self::Neon => Some(128),
        }
    }

    /// Lane byte order of the backend's registers.
    #[must_use]
    pub const fn byte_order(self) -> ByteOrder {
        match self {
            Self::AltiVec => ByteOrder::Big,
            _ => ByteOrder::Little,
        }
    }

    /// Returns `true` for the vector facilities.
    #[must_use]
    pub const fn is_vector(self) -> bool {
        self.register_bits().is_some()
    }

    /// Reports whether this backend's code is compiled into the current
    /// target.
    ///
    /// SSE2 and NEON use target intrinsics and exist only on their
    /// architectures. The 3DNow! and AltiVec backends are register models and
    /// are compiled everywhere; whether the host may *select* them is a
    /// separate question answered by [`is_available`](crate::is_available).
    #[must_use]
    pub const fn is_compiled(self) -> bool {
        match self {
            Self::None => false,
            Self::Scalar | Self::ThreeDNow | Self::AltiVec => true,
            Self::Sse2 => cfg!(any(target_arch = "x86", target_arch = "x86_64")),
            Self::Neon => cfg!(all(target_arch = "aarch64", target_endian = "little")),
        }
    }
}

impl fmt::Display for InstructionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
