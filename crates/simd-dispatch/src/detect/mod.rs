//! Capability detection and process-wide resolution.
//!
//! Detection combines compile-time target checks with runtime CPU
//! identification. The result is memoized in a [`OnceLock`]: the first
//! caller probes and publishes, concurrent first callers block briefly and
//! observe the same value, and every later call is a plain load.
//!
//! # Policy
//!
//! In priority order: 128-bit facility (SSE2, NEON), 64-bit legacy facility
//! (3DNow!), big-endian facility (AltiVec), scalar. Detection never fails; a
//! host with nothing usable resolves to [`InstructionSet::Scalar`].

use std::sync::OnceLock;

use crate::config::{DetectorConfig, Selection};
use crate::instruction_set::InstructionSet;
use crate::trace;

mod probe;

/// Facility bits reported by the host.
///
/// A bit only counts if the matching backend is also compiled into the
/// target, see [`supports`](Self::supports).
// One flag per facility.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HostCapabilities {
    /// SSE2 (x86, x86_64).
    pub sse2: bool,
    /// Advanced SIMD (aarch64).
    pub neon: bool,
    /// 3DNow! on top of MMX (x86, x86_64; AMD parts up to family 15h).
    pub three_dnow: bool,
    /// AltiVec/VMX (powerpc, powerpc64).
    pub altivec: bool,
}

impl HostCapabilities {
    /// A host without any vector facility.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            sse2: false,
            neon: false,
            three_dnow: false,
            altivec: false,
        }
    }

    /// Returns a copy with the bit for `set` raised.
    ///
    /// `None` and `Scalar` carry no bit and leave the value unchanged.
    #[must_use]
    pub const fn with(mut self, set: InstructionSet) -> Self {
        match set {
            InstructionSet::Sse2 => self.sse2 = true,
            InstructionSet::Neon => self.neon = true,
            InstructionSet::ThreeDNow => self.three_dnow = true,
            InstructionSet::AltiVec => self.altivec = true,
            InstructionSet::None | InstructionSet::Scalar => {}
        }
        self
    }

    /// Probes the running host.
    ///
    /// Prefer [`detected`](Self::detected), which caches the answer.
    #[must_use]
    pub fn probe() -> Self {
        Self {
            sse2: probe::sse2(),
            neon: probe::neon(),
            three_dnow: probe::three_dnow(),
            altivec: probe::altivec(),
        }
    }

    /// Process-wide cached probe result.
    pub fn detected() -> &'static Self {
        static HOST: OnceLock<HostCapabilities> = OnceLock::new();
        HOST.get_or_init(|| {
            let host = Self::probe();
            trace::host_probed(host);
            host
        })
    }

    /// Whether `set` can execute here: compiled for the target and reported
    /// by the host. Scalar is always supported; `None` never is.
    #[must_use]
    pub const fn supports(self, set: InstructionSet) -> bool {
        if !set.is_compiled() {
            return false;
        }
        match set {
            InstructionSet::None => false,
            InstructionSet::Scalar => true,
            InstructionSet::Sse2 => self.sse2,
            InstructionSet::Neon => self.neon,
            InstructionSet::ThreeDNow => self.three_dnow,
            InstructionSet::AltiVec => self.altivec,
        }
    }
}

/// Resolves a [`Selection`] against a set of host capabilities.
///
/// `Detector` is pure; the process-wide memoized answer comes from
/// [`resolve`]. Constructing detectors directly is how tests exercise the
/// policy with hosts other than the one they run on.
///
/// # Examples
///
/// ```
/// use simd_dispatch::{Detector, DetectorConfig, HostCapabilities, InstructionSet};
///
/// let host = HostCapabilities::none().with(InstructionSet::ThreeDNow);
/// let detector = Detector::new(DetectorConfig::default(), host);
/// assert_eq!(detector.resolve(), InstructionSet::ThreeDNow);
///
/// let detector = Detector::new(DetectorConfig::default(), HostCapabilities::none());
/// assert_eq!(detector.resolve(), InstructionSet::Scalar);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Detector {
    config: DetectorConfig,
    host: HostCapabilities,
}

impl Detector {
    /// Creates a detector over explicit inputs.
    #[must_use]
    pub const fn new(config: DetectorConfig, host: HostCapabilities) -> Self {
        Self { config, host }
    }

    /// Detector over the process configuration and the probed host.
    #[must_use]
    pub fn from_environment() -> Self {
        Self::new(DetectorConfig::from_env(), *HostCapabilities::detected())
    }

    /// The host capabilities this detector resolves against.
    #[must_use]
    pub const fn host(self) -> HostCapabilities {
        self.host
    }

    /// Picks the instruction set. Never returns [`InstructionSet::None`].
    #[must_use]
    pub fn resolve(self) -> InstructionSet {
        let selection = self.config.selection();
        let set = match selection {
            Selection::Auto => self.best_available(),
            Selection::Disabled => InstructionSet::Scalar,
            Selection::Force(requested) if self.host.supports(requested) => requested,
            Selection::Force(requested) => {
                trace::forced_unavailable(requested);
                InstructionSet::Scalar
            }
        };
        trace::resolved(selection, set);
        set
    }

    fn best_available(self) -> InstructionSet {
        InstructionSet::VECTOR_PRIORITY
            .into_iter()
            .find(|&set| self.host.supports(set))
            .unwrap_or(InstructionSet::Scalar)
    }
}

/// Resolves the process-wide instruction set.
///
/// The first call runs detection; every later call, from any thread, returns
/// the same memoized value.
pub fn resolve() -> InstructionSet {
    static ACTIVE: OnceLock<InstructionSet> = OnceLock::new();
    *ACTIVE.get_or_init(|| Detector::from_environment().resolve())
}

/// Reports whether the host can execute `set`, independent of which backend
/// is active. Never changes the active selection.
pub fn is_available(set: InstructionSet) -> bool {
    HostCapabilities::detected().supports(set)
}
