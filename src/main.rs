//! Example usage of the quakedepth library
//!
//! Estimates the depth of a synthetic intermediate-depth event from pP and sP
//! picks, then looks up the regional depth priors at its epicenter.
//!
//! An optional TOML configuration file may be given as the first argument.
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::collections::HashMap;
use std::error::Error;

use quakedepth::analysis::DepthPhaseAnalyzer;
use quakedepth::config::{EstimatorConfig, RegionDepthConfig};
use quakedepth::region::{Region, RegionDepthLookup, DEFAULT_DEPTH_ATTRIBUTE, MAX_DEPTH_ATTRIBUTE};
use quakedepth::traveltime::{TabulatedP, TravelTime, TravelTimeTable};
use quakedepth::types::geo::StationLocation;
use quakedepth::types::observation::{Arrival, Origin};
use tracing_subscriber::EnvFilter;

/// Latitude/longitude box with depth attributes.
struct BoxRegion {
    name: &'static str,
    lat: (f64, f64),
    lon: (f64, f64),
    attributes: HashMap<String, String>,
}

impl BoxRegion {
    fn new(name: &'static str, lat: (f64, f64), lon: (f64, f64), default: &str, max: &str) -> Self {
        Self {
            name,
            lat,
            lon,
            attributes: HashMap::from([
                (DEFAULT_DEPTH_ATTRIBUTE.to_string(), default.to_string()),
                (MAX_DEPTH_ATTRIBUTE.to_string(), max.to_string()),
            ]),
        }
    }
}

impl Region for BoxRegion {
    fn name(&self) -> &str {
        self.name
    }

    fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lat.0..=self.lat.1).contains(&latitude) && (self.lon.0..=self.lon.1).contains(&longitude)
    }

    fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EstimatorConfig::load(path)?,
        None => EstimatorConfig {
            region_depth: RegionDepthConfig::enabled(["andes_slab", "brazilian_shield"]),
            ..EstimatorConfig::default()
        },
    };
    config.depth_phases.validate()?;

    println!("quakedepth: earthquake depth estimation");
    println!("=======================================\n");

    // Synthetic event beneath the Andes, located at a fixed 33 km
    let truth = Origin::new(-22.0, -68.0, 180.0, 0.0);
    let table = TabulatedP::with_model("iasp91").ok_or("iasp91 is not tabulated")?;

    let stations = [
        ("ANMO", 12.0, 40.0),
        ("BORG", -5.0, 48.0),
        ("KONO", 18.0, 56.0),
        ("LSZ", -10.0, 64.0),
        ("MBAR", 4.0, 70.0),
    ];

    let mut arrivals = Vec::new();
    let mut p_shift = 0.0;
    for &(code, dlat, dlon) in &stations {
        let location = StationLocation::new(
            truth.epicenter.latitude + dlat,
            truth.epicenter.longitude + dlon,
            0.0,
        );
        for phase in ["P", "pP", "sP"] {
            if let Some(tt) = table
                .compute(phase, &truth.epicenter, truth.depth, &location)
                .filter(TravelTime::arrives)
            {
                arrivals.push(Arrival::new(phase, truth.time + tt.time, "IU", code, location));
            }
        }
        if let (Some(true_p), Some(trial_p)) = (
            table.compute("P", &truth.epicenter, truth.depth, &location),
            table.compute("P", &truth.epicenter, 33.0, &location),
        ) {
            p_shift += (true_p.time - trial_p.time) / stations.len() as f64;
        }
    }
    let origin = Origin {
        depth: 33.0,
        time: truth.time + p_shift,
        ..truth
    };

    println!(
        "Trial origin: {:.2}/{:.2}, {:.1} km, {} picks",
        origin.epicenter.latitude,
        origin.epicenter.longitude,
        origin.depth,
        arrivals.len()
    );

    let mut analyzer = DepthPhaseAnalyzer::with_config(config.depth_phases.clone());
    analyzer.select_travel_time_table("tabulated", "iasp91")?;

    let result = analyzer.analyze(&origin, &arrivals);
    if result.success {
        println!(
            "Depth: {:.1} km (+/- {:.1} km, range {:.1}-{:.1} km)",
            result.depth,
            result.depth_uncertainty,
            result.depth_lower_bound,
            result.depth_upper_bound
        );
        println!(
            "  {} observations, mean residual {:.3} s, rms {:.3} s, method {}",
            result.observation_count,
            result.mean_residual,
            result.rms_residual,
            result
                .method
                .as_ref()
                .map_or_else(String::new, ToString::to_string)
        );
    } else {
        println!("Depth phase analysis failed");
    }
    for obs in &result.observations {
        println!(
            "    {}.{} {:<3} dist={:5.1} deg  obs={:6.2} s  theo={:6.2} s",
            obs.network_code,
            obs.station_code,
            obs.phase,
            obs.distance,
            obs.time_difference_obs,
            obs.time_difference_theo
        );
    }
    println!();

    // Regional priors
    let regions = vec![
        BoxRegion::new("andes_slab", (-40.0, 0.0), (-75.0, -60.0), "100", "300"),
        BoxRegion::new("brazilian_shield", (-30.0, 0.0), (-60.0, -35.0), "10", "40"),
    ];
    let mut lookup = RegionDepthLookup::with_config(&regions, config.region_depth);
    if lookup.init() {
        for (lat, lon) in [(-22.0, -68.0), (-15.0, -50.0), (40.0, 10.0)] {
            let c = lookup.get_constraints(lat, lon);
            println!(
                "Region at {:.1}/{:.1}: {} (default {:.0} km, max {:.0} km)",
                lat,
                lon,
                c.region_name.as_deref().unwrap_or("none"),
                c.default_depth,
                c.max_depth
            );
        }
    } else {
        println!("Region lookup not initialized");
    }

    Ok(())
}
