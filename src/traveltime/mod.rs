//! Travel-time tables
//!
//! The depth analysis consumes travel times through [`TravelTimeTable`];
//! concrete backends are created by type name with [`create`] and then pointed
//! at a velocity model with [`TravelTimeTable::set_model`].
//!
//! # Example
//!
//! ```
//! use quakedepth::traveltime;
//! use quakedepth::types::geo::{GeoPoint, StationLocation};
//!
//! let mut table = traveltime::create("tabulated").unwrap();
//! assert!(table.set_model("iasp91"));
//!
//! let source = GeoPoint::new(0.0, 0.0);
//! let station = StationLocation::new(0.0, 50.0, 0.0);
//! let diff = traveltime::theoretical_time_difference(table.as_ref(), "pP", &source, 100.0, &station);
//! assert!(diff.unwrap() > 0.0);
//! ```

mod tabulated;

pub use tabulated::*;

use crate::types::geo::{GeoPoint, StationLocation};
use crate::types::phase::reference_phase;

/// Theoretical arrival of one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTime {
    /// Phase code
    pub phase: String,
    /// Travel time from the origin (s); non-positive means the phase does not arrive
    pub time: f64,
    /// Ray parameter (s/deg)
    pub ray_parameter: f64,
}

impl TravelTime {
    /// Creates a travel time.
    pub fn new(phase: impl Into<String>, time: f64, ray_parameter: f64) -> Self {
        Self {
            phase: phase.into(),
            time,
            ray_parameter,
        }
    }

    /// Returns true if the phase actually arrives.
    #[inline]
    pub fn arrives(&self) -> bool {
        self.time > 0.0
    }
}

/// Capability set of a travel-time backend.
pub trait TravelTimeTable {
    /// Backend type name, as accepted by [`create`].
    fn kind(&self) -> &str;

    /// Selects a velocity model by name. Returns false for unknown models.
    fn set_model(&mut self, model: &str) -> bool;

    /// Currently selected model, if any.
    fn model(&self) -> Option<&str>;

    /// Computes every phase the backend knows for the given geometry.
    ///
    /// Returns an empty list if the geometry cannot be resolved.
    fn compute_all(
        &self,
        source: &GeoPoint,
        depth: f64,
        station: &StationLocation,
    ) -> Vec<TravelTime>;

    /// Computes a single phase, or `None` if it is unknown to the backend.
    fn compute(
        &self,
        phase: &str,
        source: &GeoPoint,
        depth: f64,
        station: &StationLocation,
    ) -> Option<TravelTime>;
}

/// Creates a travel-time backend by type name.
///
/// Known types: `"tabulated"`.
pub fn create(kind: &str) -> Option<Box<dyn TravelTimeTable>> {
    match kind {
        TABULATED_KIND => Some(Box::new(TabulatedP::new())),
        _ => None,
    }
}

/// Theoretical depth phase minus reference phase time (s).
///
/// Returns `None` if either phase does not arrive for this geometry.
pub fn theoretical_time_difference(
    table: &dyn TravelTimeTable,
    depth_phase: &str,
    source: &GeoPoint,
    depth: f64,
    station: &StationLocation,
) -> Option<f64> {
    let reference = reference_phase(depth_phase);

    let depth_tt = table.compute(depth_phase, source, depth, station)?;
    let reference_tt = table.compute(reference, source, depth, station)?;

    if depth_tt.arrives() && reference_tt.arrives() {
        Some(depth_tt.time - reference_tt.time)
    } else {
        None
    }
}
