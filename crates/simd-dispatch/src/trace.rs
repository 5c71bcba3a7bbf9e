//! Tracing hooks for detection and table construction.
//!
//! Each hook has a no-op twin so call sites stay unconditional when the
//! `tracing` feature is disabled.

use crate::config::Selection;
use crate::detect::HostCapabilities;
use crate::instruction_set::InstructionSet;
use crate::table::Operation;

/// Target for host probing and resolution events.
pub const DETECT_TARGET: &str = "simd_dispatch::detect";

/// Target for operation table construction events.
pub const TABLE_TARGET: &str = "simd_dispatch::table";

// ============================================================================
// Detection
// ============================================================================

/// Traces the facility bits reported by the host probe.
#[cfg(feature = "tracing")]
#[inline]
pub fn host_probed(host: HostCapabilities) {
    tracing::debug!(
        target: DETECT_TARGET,
        sse2 = host.sse2,
        neon = host.neon,
        three_dnow = host.three_dnow,
        altivec = host.altivec,
        "probed host SIMD facilities"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn host_probed(_host: HostCapabilities) {}

/// Traces the instruction set chosen for a selection.
#[cfg(feature = "tracing")]
#[inline]
pub fn resolved(selection: Selection, set: InstructionSet) {
    tracing::debug!(
        target: DETECT_TARGET,
        selection = ?selection,
        instruction_set = %set,
        "resolved SIMD instruction set"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn resolved(_selection: Selection, _set: InstructionSet) {}

/// Warns that a forced facility is not usable on this host.
#[cfg(feature = "tracing")]
#[inline]
pub fn forced_unavailable(requested: InstructionSet) {
    tracing::warn!(
        target: DETECT_TARGET,
        requested = %requested,
        "requested SIMD backend is not available on this host, using scalar"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn forced_unavailable(_requested: InstructionSet) {}

/// Warns about a selection value that could not be used.
#[cfg(feature = "tracing")]
#[inline]
pub fn invalid_selection(value: &str, reason: &str) {
    tracing::warn!(
        target: DETECT_TARGET,
        value = %value,
        reason = %reason,
        "ignoring SIMD backend selection"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn invalid_selection(_value: &str, _reason: &str) {}

// ============================================================================
// Operation table
// ============================================================================

/// Traces a slot that a vector backend leaves to the scalar implementation.
#[cfg(feature = "tracing")]
#[inline]
pub fn slot_fallback(set: InstructionSet, op: Operation) {
    tracing::debug!(
        target: TABLE_TARGET,
        instruction_set = %set,
        operation = op.name(),
        "no native implementation, slot bound to scalar"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn slot_fallback(_set: InstructionSet, _op: Operation) {}
