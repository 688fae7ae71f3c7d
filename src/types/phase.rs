//! Depth-phase classification
//!
//! A depth phase leaves the source upward, reflects (or converts) at the free
//! surface above the hypocenter and then follows its direct phase to the
//! station. Its delay relative to that direct (reference) phase grows with
//! source depth.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Reference phase returned for codes that are not depth phases.
pub const DEFAULT_REFERENCE_PHASE: &str = "P";

/// Known depth phases and their reference phases, in canonical order.
pub const DEPTH_PHASE_PAIRS: [(&str, &str); 7] = [
    ("pP", "P"),
    ("sP", "P"),
    ("pwP", "P"),
    ("pS", "S"),
    ("sS", "S"),
    ("pPKP", "PKP"),
    ("sPKP", "PKP"),
];

static REFERENCE_PHASES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| DEPTH_PHASE_PAIRS.iter().copied().collect());

/// Returns true if `phase` is one of the known depth phases.
#[inline]
pub fn is_depth_phase(phase: &str) -> bool {
    REFERENCE_PHASES.contains_key(phase)
}

/// Returns the reference phase for a depth phase.
///
/// Unknown codes map to [`DEFAULT_REFERENCE_PHASE`] rather than failing.
#[inline]
pub fn reference_phase(phase: &str) -> &'static str {
    REFERENCE_PHASES
        .get(phase)
        .copied()
        .unwrap_or(DEFAULT_REFERENCE_PHASE)
}
