//! Common test helpers for depth estimation integration tests

#![allow(dead_code)]

use std::collections::HashMap;

use quakedepth::region::Region;
use quakedepth::traveltime::{TabulatedP, TravelTimeTable};
use quakedepth::types::geo::StationLocation;
use quakedepth::types::observation::{Arrival, Origin};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Latitude/longitude box standing in for a polygon region
pub struct BoxRegion {
    pub name: String,
    pub lat: (f64, f64),
    pub lon: (f64, f64),
    pub attributes: HashMap<String, String>,
}

impl BoxRegion {
    pub fn new(name: &str, lat: (f64, f64), lon: (f64, f64)) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lon,
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}

impl Region for BoxRegion {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lat.0..=self.lat.1).contains(&latitude)
            && (self.lon.0..=self.lon.1).contains(&longitude)
    }

    fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }
}

/// Craton and ridge overlap between 35W and 20W; the subduction zone is apart
pub fn make_test_regions() -> Vec<BoxRegion> {
    vec![
        BoxRegion::new("stable_craton", (-30.0, 30.0), (-60.0, -20.0))
            .with_attribute("defaultDepth", "10")
            .with_attribute("maxDepth", "40"),
        BoxRegion::new("subduction_zone", (-30.0, 30.0), (120.0, 150.0))
            .with_attribute("defaultDepth", "50")
            .with_attribute("maxDepth", "600"),
        BoxRegion::new("mid_ocean_ridge", (-60.0, 60.0), (-35.0, -10.0))
            .with_attribute("defaultDepth", "5")
            .with_attribute("maxDepth", "20"),
    ]
}

/// Tabulated iasp91 travel times
pub fn make_table() -> TabulatedP {
    TabulatedP::with_model("iasp91").expect("iasp91 is tabulated")
}

/// Stations at teleseismic distances east of the origin
pub fn make_stations(origin: &Origin) -> Vec<(String, StationLocation)> {
    let lat = origin.epicenter.latitude;
    let lon = origin.epicenter.longitude;
    [
        ("ST01", 5.0, 35.0),
        ("ST02", -8.0, 45.0),
        ("ST03", 12.0, 55.0),
        ("ST04", -3.0, 65.0),
        ("ST05", 6.0, 75.0),
        ("ST06", -10.0, 85.0),
    ]
    .iter()
    .map(|&(code, dlat, dlon)| {
        (
            code.to_string(),
            StationLocation::new(lat + dlat, lon + dlon, 150.0),
        )
    })
    .collect()
}

/// P and depth-phase picks for an event at `truth`.
///
/// With `noise`, every pick is perturbed by Gaussian noise of the given
/// standard deviation.
pub fn synthetic_arrivals(
    table: &dyn TravelTimeTable,
    truth: &Origin,
    stations: &[(String, StationLocation)],
    depth_phases: &[&str],
    mut noise: Option<(&mut StdRng, f64)>,
) -> Vec<Arrival> {
    let mut arrivals = Vec::new();

    for (code, location) in stations {
        for phase in std::iter::once("P").chain(depth_phases.iter().copied()) {
            let Some(tt) = table.compute(phase, &truth.epicenter, truth.depth, location) else {
                continue;
            };
            if !tt.arrives() {
                continue;
            }

            let jitter = match noise.as_mut() {
                Some((rng, sigma)) => Normal::new(0.0, *sigma).unwrap().sample(*rng),
                None => 0.0,
            };
            arrivals.push(Arrival::new(
                phase,
                truth.time + tt.time + jitter,
                "XX",
                code.as_str(),
                *location,
            ));
        }
    }

    arrivals
}

/// Trial origin at `depth` whose origin time absorbs the mean P shift, as a
/// location run at a fixed wrong depth would.
pub fn trial_origin(
    table: &dyn TravelTimeTable,
    truth: &Origin,
    stations: &[(String, StationLocation)],
    depth: f64,
) -> Origin {
    let shifts: Vec<f64> = stations
        .iter()
        .filter_map(|(_, location)| {
            let true_p = table.compute("P", &truth.epicenter, truth.depth, location)?;
            let trial_p = table.compute("P", &truth.epicenter, depth, location)?;
            Some(true_p.time - trial_p.time)
        })
        .collect();
    let shift = shifts.iter().sum::<f64>() / shifts.len() as f64;

    Origin {
        epicenter: truth.epicenter,
        depth,
        time: truth.time + shift,
    }
}
