//! Depth-phase observations and analysis results
//!
//! Observations compare an observed depth-phase minus reference-phase time
//! difference against its theoretical counterpart for one station. They are
//! built by the caller (or by [`DepthPhaseAnalyzer::analyze`]) and are only
//! ever read by the inversion.
//!
//! [`DepthPhaseAnalyzer::analyze`]: crate::analysis::DepthPhaseAnalyzer::analyze

use core::fmt;

use serde::{Deserialize, Serialize};

use super::geo::{GeoPoint, StationLocation};

// ============================================================================
// Inputs
// ============================================================================

/// Trial hypocenter supplied by the location pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    /// Epicenter
    pub epicenter: GeoPoint,
    /// Trial depth (km)
    pub depth: f64,
    /// Origin time (epoch seconds)
    pub time: f64,
}

impl Origin {
    /// Creates a trial origin.
    #[inline]
    pub fn new(latitude: f64, longitude: f64, depth: f64, time: f64) -> Self {
        Self {
            epicenter: GeoPoint::new(latitude, longitude),
            depth,
            time,
        }
    }
}

/// A picked arrival at one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrival {
    /// Phase code (P, pP, sP, ...)
    pub phase: String,
    /// Pick time (epoch seconds)
    pub time: f64,
    /// Network code
    pub network_code: String,
    /// Station code
    pub station_code: String,
    /// Station coordinates
    pub location: StationLocation,
}

impl Arrival {
    /// Creates an arrival.
    pub fn new(
        phase: impl Into<String>,
        time: f64,
        network_code: impl Into<String>,
        station_code: impl Into<String>,
        location: StationLocation,
    ) -> Self {
        Self {
            phase: phase.into(),
            time,
            network_code: network_code.into(),
            station_code: station_code.into(),
            location,
        }
    }

    /// Returns true if both arrivals were recorded by the same station.
    #[inline]
    pub fn same_station(&self, other: &Arrival) -> bool {
        self.network_code == other.network_code && self.station_code == other.station_code
    }
}

// ============================================================================
// Observation
// ============================================================================

/// One depth-phase / reference-phase pair at a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthPhaseObservation {
    /// Depth phase code (pP, sP, ...)
    pub phase: String,
    /// Reference phase code (usually P)
    pub reference_phase: String,
    /// Network code
    pub network_code: String,
    /// Station code
    pub station_code: String,
    /// Station coordinates, when known.
    ///
    /// Located observations get their theoretical time difference refreshed
    /// at every trial depth of the grid search; unlocated ones keep
    /// `time_difference_theo` as stored.
    pub station: Option<StationLocation>,
    /// Observed depth-phase arrival time (epoch seconds)
    pub observed_time: f64,
    /// Theoretical depth-phase arrival time (epoch seconds)
    pub theoretical_time: f64,
    /// observed - theoretical (s)
    pub residual: f64,
    /// Observed depth phase minus reference phase time (s)
    pub time_difference_obs: f64,
    /// Theoretical depth phase minus reference phase time (s)
    pub time_difference_theo: f64,
    /// Epicentral distance (deg)
    pub distance: f64,
    /// Weight in the misfit
    pub weight: f64,
    /// Whether the observation passed quality checks
    pub is_valid: bool,
}

impl DepthPhaseObservation {
    /// Creates a valid, unit-weight observation from a pair of time differences.
    ///
    /// Remaining fields are zero; use the builder methods to fill them in.
    pub fn new(
        phase: impl Into<String>,
        reference_phase: impl Into<String>,
        time_difference_obs: f64,
        time_difference_theo: f64,
    ) -> Self {
        Self {
            phase: phase.into(),
            reference_phase: reference_phase.into(),
            network_code: String::new(),
            station_code: String::new(),
            station: None,
            observed_time: 0.0,
            theoretical_time: 0.0,
            residual: 0.0,
            time_difference_obs,
            time_difference_theo,
            distance: 0.0,
            weight: 1.0,
            is_valid: true,
        }
    }

    /// Builder: set station codes.
    pub fn with_station_codes(
        mut self,
        network_code: impl Into<String>,
        station_code: impl Into<String>,
    ) -> Self {
        self.network_code = network_code.into();
        self.station_code = station_code.into();
        self
    }

    /// Builder: set the station location.
    pub fn located_at(mut self, station: StationLocation) -> Self {
        self.station = Some(station);
        self
    }

    /// Builder: set the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Builder: set the validity flag.
    pub fn with_validity(mut self, is_valid: bool) -> Self {
        self.is_valid = is_valid;
        self
    }

    /// Observed minus stored theoretical time difference (s).
    #[inline]
    pub fn time_difference_residual(&self) -> f64 {
        self.time_difference_obs - self.time_difference_theo
    }
}

/// Counts observations that passed quality checks.
pub fn count_valid(observations: &[DepthPhaseObservation]) -> usize {
    observations.iter().filter(|obs| obs.is_valid).count()
}

// ============================================================================
// Result
// ============================================================================

/// Which depth phases constrained an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthMethod {
    /// All observations used the same depth phase, e.g. `pP-P`
    Single { phase: String, reference: String },
    /// Several depth phases contributed
    Combined,
}

impl DepthMethod {
    /// Derives the method label from the observations used.
    ///
    /// Returns `None` if no observation is given.
    pub fn from_observations<'a, I>(observations: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a DepthPhaseObservation>,
    {
        let mut iter = observations.into_iter();
        let first = iter.next()?;

        if iter.all(|obs| obs.phase == first.phase) {
            Some(DepthMethod::Single {
                phase: first.phase.clone(),
                reference: first.reference_phase.clone(),
            })
        } else {
            Some(DepthMethod::Combined)
        }
    }
}

impl fmt::Display for DepthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepthMethod::Single { phase, reference } => write!(f, "{}-{}", phase, reference),
            DepthMethod::Combined => write!(f, "combined"),
        }
    }
}

/// Outcome of a full depth-phase analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepthPhaseResult {
    /// Whether a depth could be estimated
    pub success: bool,
    /// Estimated depth (km)
    pub depth: f64,
    /// Depth uncertainty (km)
    pub depth_uncertainty: f64,
    /// Lower bound of the estimate (km)
    pub depth_lower_bound: f64,
    /// Upper bound of the estimate (km)
    pub depth_upper_bound: f64,
    /// Number of observations used
    pub observation_count: usize,
    /// Mean time-difference residual at the estimated depth (s)
    pub mean_residual: f64,
    /// RMS time-difference residual at the estimated depth (s)
    pub rms_residual: f64,
    /// Depth phases that constrained the estimate
    pub method: Option<DepthMethod>,
    /// Observations used
    pub observations: Vec<DepthPhaseObservation>,
}
