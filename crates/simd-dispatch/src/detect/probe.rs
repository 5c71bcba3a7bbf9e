//! Per-architecture facility probes.
//!
//! Each probe has one definition per architecture family plus a `false`
//! fallback, mirroring how the rest of the crate keeps `cfg` out of call
//! sites.

// ---------------------------------------------------------------------------
// SSE2
// ---------------------------------------------------------------------------

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(super) fn sse2() -> bool {
    cfg!(target_feature = "sse2") || std::arch::is_x86_feature_detected!("sse2")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub(super) fn sse2() -> bool {
    false
}

// ---------------------------------------------------------------------------
// NEON
// ---------------------------------------------------------------------------

#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
pub(super) fn neon() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

#[cfg(not(all(target_arch = "aarch64", target_endian = "little")))]
pub(super) fn neon() -> bool {
    false
}

// ---------------------------------------------------------------------------
// 3DNow!
// ---------------------------------------------------------------------------

/// std_detect has no 3DNow! flag, so read CPUID leaf 0x8000_0001 (EDX bit 31)
/// directly. Hosts without the extended leaf report `false`.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(super) fn three_dnow() -> bool {
    raw_cpuid::CpuId::new()
        .get_extended_processor_and_feature_identifiers()
        .is_some_and(|ext| ext.has_3dnow())
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub(super) fn three_dnow() -> bool {
    false
}

// ---------------------------------------------------------------------------
// AltiVec
// ---------------------------------------------------------------------------

/// Runtime AltiVec detection is not available on stable, so only the
/// compile-time target feature counts.
#[cfg(any(target_arch = "powerpc", target_arch = "powerpc64"))]
pub(super) fn altivec() -> bool {
    cfg!(target_feature = "altivec")
}

#[cfg(not(any(target_arch = "powerpc", target_arch = "powerpc64")))]
pub(super) fn altivec() -> bool {
    false
}
