//! Tabulated teleseismic P travel times with plane-wave depth phases
//!
//! Surface-focus P times are interpolated linearly from a table covering the
//! teleseismic window; the table slope gives the ray parameter `p`. Depth
//! enters through the vertical slowness at the source, `eta = sqrt(1/v^2 - p^2)`:
//!
//! ```text
//! P(h)  = T0(delta) - h * eta_p
//! pP(h) = P(h) + 2 h * eta_p
//! sP(h) = P(h) + h * (eta_p + eta_s)
//! ```
//!
//! with `v` the near-source P and S velocities of the selected model.

use crate::types::geo::{GeoPoint, StationLocation, KM_PER_DEGREE};

use super::{TravelTime, TravelTimeTable};

/// Factory name of this backend.
pub const TABULATED_KIND: &str = "tabulated";

/// Phases this backend computes.
pub const TABULATED_PHASES: [&str; 3] = ["P", "pP", "sP"];

/// Deepest source depth (km) the backend accepts.
pub const TABULATED_MAX_DEPTH: f64 = 800.0;

/// Surface-focus P travel times: (distance deg, time s).
const P_TABLE: [(f64, f64); 17] = [
    (20.0, 276.4),
    (25.0, 325.1),
    (30.0, 371.4),
    (35.0, 415.8),
    (40.0, 458.1),
    (45.0, 498.9),
    (50.0, 538.0),
    (55.0, 575.4),
    (60.0, 611.2),
    (65.0, 645.4),
    (70.0, 677.9),
    (75.0, 708.7),
    (80.0, 737.7),
    (85.0, 764.7),
    (90.0, 789.6),
    (95.0, 812.1),
    (100.0, 832.0),
];

/// Near-source velocities of a named Earth model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceVelocities {
    /// Model name
    pub name: &'static str,
    /// P velocity (km/s)
    pub vp: f64,
    /// S velocity (km/s)
    pub vs: f64,
}

/// Models known to [`TabulatedP`].
pub const TABULATED_MODELS: [SourceVelocities; 2] = [
    SourceVelocities {
        name: "iasp91",
        vp: 5.80,
        vs: 3.36,
    },
    SourceVelocities {
        name: "ak135",
        vp: 5.80,
        vs: 3.46,
    },
];

/// Tabulated teleseismic P backend.
#[derive(Debug, Clone, Default)]
pub struct TabulatedP {
    model: Option<SourceVelocities>,
}

impl TabulatedP {
    /// Creates a backend with no model selected.
    pub fn new() -> Self {
        Self { model: None }
    }

    /// Creates a backend with the given model selected.
    pub fn with_model(model: &str) -> Option<Self> {
        let mut table = Self::new();
        table.set_model(model).then_some(table)
    }

    /// Interpolated surface-focus P time and slope (s/deg) at `distance` degrees.
    fn surface_p(distance: f64) -> Option<(f64, f64)> {
        let (first, _) = P_TABLE[0];
        let (last, _) = P_TABLE[P_TABLE.len() - 1];
        if !(first..=last).contains(&distance) {
            return None;
        }

        let segment = P_TABLE
            .windows(2)
            .find(|w| distance <= w[1].0)
            .unwrap_or(&P_TABLE[P_TABLE.len() - 2..]);
        let (d0, t0) = segment[0];
        let (d1, t1) = segment[1];

        let slope = (t1 - t0) / (d1 - d0);
        Some((t0 + slope * (distance - d0), slope))
    }

    /// Vertical slowness (s/km) for velocity `v` and horizontal slowness `p` (s/km).
    fn vertical_slowness(v: f64, p: f64) -> Option<f64> {
        let q = 1.0 / (v * v) - p * p;
        (q > 0.0).then(|| q.sqrt())
    }

    /// Travel times of all tabulated phases, or `None` if the geometry is out of range.
    fn phase_times(
        &self,
        source: &GeoPoint,
        depth: f64,
        station: &StationLocation,
    ) -> Option<[TravelTime; 3]> {
        let model = self.model?;
        if !(0.0..=TABULATED_MAX_DEPTH).contains(&depth) {
            return None;
        }

        let distance = source.distance_degrees(&station.position());
        let (t0, slope) = Self::surface_p(distance)?;
        let p = slope / KM_PER_DEGREE;
        let eta_p = Self::vertical_slowness(model.vp, p)?;
        let eta_s = Self::vertical_slowness(model.vs, p)?;

        // Elevation in metres; the receiver leg is P for every phase here.
        let receiver = station.elevation / 1000.0 * eta_p;
        let direct = t0 - depth * eta_p + receiver;

        Some([
            TravelTime::new("P", direct, slope),
            TravelTime::new("pP", direct + 2.0 * depth * eta_p, slope),
            TravelTime::new("sP", direct + depth * (eta_p + eta_s), slope),
        ])
    }
}

impl TravelTimeTable for TabulatedP {
    fn kind(&self) -> &str {
        TABULATED_KIND
    }

    fn set_model(&mut self, model: &str) -> bool {
        match TABULATED_MODELS.iter().find(|m| m.name == model) {
            Some(found) => {
                self.model = Some(*found);
                true
            }
            None => false,
        }
    }

    fn model(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.name)
    }

    fn compute_all(
        &self,
        source: &GeoPoint,
        depth: f64,
        station: &StationLocation,
    ) -> Vec<TravelTime> {
        self.phase_times(source, depth, station)
            .map(Vec::from)
            .unwrap_or_default()
    }

    fn compute(
        &self,
        phase: &str,
        source: &GeoPoint,
        depth: f64,
        station: &StationLocation,
    ) -> Option<TravelTime> {
        if !TABULATED_PHASES.contains(&phase) {
            return None;
        }

        match self.phase_times(source, depth, station) {
            Some(times) => times.into_iter().find(|tt| tt.phase == phase),
            // Known phase, but it does not arrive for this geometry
            None => Some(TravelTime::new(phase, -1.0, 0.0)),
        }
    }
}
