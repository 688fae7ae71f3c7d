//! Depth-phase analyzer
//!
//! Pairs depth-phase picks with their reference-phase picks, compares the
//! observed time differences against a travel-time table and inverts them
//! for source depth.
//!
//! # Example
//!
//! ```
//! use quakedepth::analysis::DepthPhaseAnalyzer;
//! use quakedepth::config::DepthPhaseConfig;
//! use quakedepth::types::geo::StationLocation;
//! use quakedepth::types::observation::DepthPhaseObservation;
//!
//! let mut analyzer = DepthPhaseAnalyzer::with_config(DepthPhaseConfig::default());
//! analyzer.select_travel_time_table("tabulated", "iasp91").unwrap();
//!
//! let epicenter = quakedepth::types::geo::GeoPoint::new(0.0, 0.0);
//! let observations: Vec<_> = [40.0, 50.0, 60.0, 70.0]
//!     .iter()
//!     .map(|&lon| {
//!         let station = StationLocation::new(0.0, lon, 0.0);
//!         let diff = analyzer
//!             .compute_depth_phase_time_difference("pP", &epicenter, 100.0, &station)
//!             .unwrap();
//!         DepthPhaseObservation::new("pP", "P", diff, diff).located_at(station)
//!     })
//!     .collect();
//!
//! let depth = analyzer.invert_for_depth(&epicenter, &observations, 33.0).unwrap();
//! assert!((depth - 100.0).abs() <= 0.5);
//! ```

use tracing::{debug, error, info, warn};

use crate::config::DepthPhaseConfig;
use crate::traveltime::{self, theoretical_time_difference, TravelTime, TravelTimeTable};
use crate::types::geo::{GeoPoint, StationLocation};
use crate::types::observation::{
    count_valid, Arrival, DepthMethod, DepthPhaseObservation, DepthPhaseResult, Origin,
};
use crate::types::phase::{is_depth_phase, reference_phase};
use crate::{DepthError, Result};

use super::grid::{default_schedule, multi_resolution_search, DepthRange, StageTrace};
use super::misfit::MisfitEvaluator;

/// Outcome of a depth inversion, including every grid-search stage.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthInversion {
    /// Best-fitting depth (km)
    pub depth: f64,
    /// Misfit at `depth` (s)
    pub misfit: f64,
    /// Number of valid observations inverted
    pub valid_count: usize,
    /// Stages in the order they ran
    pub stages: Vec<StageTrace<f64>>,
}

/// Depth-phase analyzer.
///
/// Holds the configuration and the travel-time table. Configuration changes
/// take `&mut self`, queries take `&self`.
pub struct DepthPhaseAnalyzer {
    config: DepthPhaseConfig,
    table: Option<Box<dyn TravelTimeTable>>,
}

impl Default for DepthPhaseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for DepthPhaseAnalyzer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DepthPhaseAnalyzer")
            .field("config", &self.config)
            .field("table", &self.table.as_ref().map(|t| (t.kind(), t.model())))
            .finish()
    }
}

impl DepthPhaseAnalyzer {
    /// Creates an analyzer with default configuration and no travel-time table.
    pub fn new() -> Self {
        Self::with_config(DepthPhaseConfig::default())
    }

    /// Creates an analyzer with the given configuration and no travel-time table.
    pub fn with_config(config: DepthPhaseConfig) -> Self {
        Self {
            config,
            table: None,
        }
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: DepthPhaseConfig) {
        self.config = config;
    }

    /// Current configuration.
    #[inline]
    pub fn config(&self) -> &DepthPhaseConfig {
        &self.config
    }

    /// Installs a travel-time backend.
    pub fn set_travel_time_table(&mut self, table: Box<dyn TravelTimeTable>) {
        debug!(
            "Using travel time table {} with model {:?}",
            table.kind(),
            table.model()
        );
        self.table = Some(table);
    }

    /// Creates a backend by type name and selects `model` on it.
    ///
    /// On failure the analyzer is left without a table.
    pub fn select_travel_time_table(&mut self, kind: &str, model: &str) -> Result<()> {
        self.table = None;

        let Some(mut table) = traveltime::create(kind) else {
            error!("Failed to create travel time table interface '{}'", kind);
            return Err(DepthError::UnknownTableType(kind.to_string()));
        };

        if !table.set_model(model) {
            error!("Failed to set travel time model '{}'", model);
            return Err(DepthError::UnknownModel {
                kind: kind.to_string(),
                model: model.to_string(),
            });
        }

        debug!("Using travel time table {} with model {}", kind, model);
        self.table = Some(table);
        Ok(())
    }

    /// The installed travel-time backend, if any.
    #[inline]
    pub fn travel_time_table(&self) -> Option<&dyn TravelTimeTable> {
        self.table.as_deref()
    }

    // ========================================================================
    // Theoretical times
    // ========================================================================

    /// Theoretical travel times of the requested phases.
    ///
    /// An empty `phases` slice selects the configured depth phases. Returns an
    /// empty list without a travel-time table.
    pub fn compute_depth_phase_times(
        &self,
        epicenter: &GeoPoint,
        depth: f64,
        station: &StationLocation,
        phases: &[&str],
    ) -> Vec<TravelTime> {
        let Some(table) = self.travel_time_table() else {
            warn!("No travel time table configured");
            return Vec::new();
        };

        table
            .compute_all(epicenter, depth, station)
            .into_iter()
            .filter(|tt| {
                if phases.is_empty() {
                    self.config.considers(&tt.phase)
                } else {
                    phases.contains(&tt.phase.as_str())
                }
            })
            .collect()
    }

    /// Theoretical depth phase minus reference phase time (s).
    ///
    /// `None` without a travel-time table or if either phase does not arrive.
    pub fn compute_depth_phase_time_difference(
        &self,
        depth_phase: &str,
        epicenter: &GeoPoint,
        depth: f64,
        station: &StationLocation,
    ) -> Option<f64> {
        let table = self.travel_time_table()?;
        let diff = theoretical_time_difference(table, depth_phase, epicenter, depth, station);
        if diff.is_none() {
            debug!(
                "Failed to compute {}-{} time difference at {:.1} km",
                depth_phase,
                reference_phase(depth_phase),
                depth
            );
        }
        diff
    }

    // ========================================================================
    // Inversion
    // ========================================================================

    /// Weighted RMS misfit of `observations` at `depth`.
    ///
    /// See [`MisfitEvaluator::evaluate`].
    pub fn calculate_misfit(
        &self,
        epicenter: &GeoPoint,
        depth: f64,
        observations: &[DepthPhaseObservation],
    ) -> f64 {
        MisfitEvaluator::new(self.travel_time_table(), *epicenter).evaluate(depth, observations)
    }

    /// Inverts depth-phase observations for source depth (km).
    ///
    /// `initial_depth` is only reported; the search always covers the
    /// configured depth range.
    pub fn invert_for_depth(
        &self,
        epicenter: &GeoPoint,
        observations: &[DepthPhaseObservation],
        initial_depth: f64,
    ) -> Result<f64> {
        self.invert_for_depth_traced(epicenter, observations, initial_depth)
            .map(|inversion| inversion.depth)
    }

    /// Like [`invert_for_depth`](Self::invert_for_depth), also returning the stage trace.
    pub fn invert_for_depth_traced(
        &self,
        epicenter: &GeoPoint,
        observations: &[DepthPhaseObservation],
        initial_depth: f64,
    ) -> Result<DepthInversion> {
        if observations.is_empty() {
            return Err(DepthError::NoObservations);
        }

        let Some(table) = self.travel_time_table() else {
            warn!("No travel time table configured for depth inversion");
            return Err(DepthError::NoTravelTimeTable);
        };

        let valid_count = count_valid(observations);
        if valid_count < self.config.min_phase_count {
            debug!(
                "Not enough valid depth phase observations ({} < {})",
                valid_count, self.config.min_phase_count
            );
            return Err(DepthError::InsufficientData {
                valid: valid_count,
                required: self.config.min_phase_count,
            });
        }

        debug!(
            "Inverting {} depth phase observations (initial depth {:.1} km)",
            valid_count, initial_depth
        );

        let evaluator = MisfitEvaluator::new(Some(table), *epicenter);
        let bounds = DepthRange::new(self.config.min_depth, self.config.max_depth);
        if !bounds.contains(initial_depth) {
            debug!(
                "Initial depth {:.1} km lies outside the search range [{:.1}, {:.1}] km",
                initial_depth, bounds.min, bounds.max
            );
        }
        let empty = |range: DepthRange<f64>| DepthError::EmptySearchRange {
            min: range.min,
            max: range.max,
        };

        let stages = multi_resolution_search(bounds, &default_schedule(), |depth| {
            evaluator.evaluate(depth, observations)
        })
        .map_err(|range| {
            debug!(
                "Depth grid search found nothing in [{:.1}, {:.1}] km",
                range.min, range.max
            );
            empty(range)
        })?;

        for (i, stage) in stages.iter().enumerate() {
            debug!(
                "Stage {}: {} depths at {:.1} km over [{:.1}, {:.1}] km, best {:.1} km (misfit {:.3} s)",
                i + 1,
                stage.evaluations,
                stage.step,
                stage.range.min,
                stage.range.max,
                stage.best_depth,
                stage.best_misfit
            );
        }

        let last = stages.last().copied().ok_or_else(|| empty(bounds))?;

        debug!(
            "Depth phase inversion result: {:.1} km (from {} observations)",
            last.best_depth, valid_count
        );

        Ok(DepthInversion {
            depth: last.best_depth,
            misfit: last.best_misfit,
            valid_count,
            stages,
        })
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Builds one observation per configured depth-phase arrival that has a
    /// reference-phase arrival at the same station.
    ///
    /// Theoretical values are computed at the trial origin. An observation is
    /// valid when its distance is in range, both phases arrive, the observed
    /// time difference is positive and the reference pick lies within
    /// `max_residual` of its theoretical time.
    pub fn build_observations(
        &self,
        origin: &Origin,
        arrivals: &[Arrival],
    ) -> Vec<DepthPhaseObservation> {
        let Some(table) = self.travel_time_table() else {
            warn!("No travel time table configured");
            return Vec::new();
        };

        let mut observations = Vec::new();

        for arrival in arrivals
            .iter()
            .filter(|a| is_depth_phase(&a.phase) && self.config.considers(&a.phase))
        {
            let reference = reference_phase(&arrival.phase);
            let Some(reference_arrival) = arrivals
                .iter()
                .find(|a| a.phase == reference && a.same_station(arrival))
            else {
                debug!(
                    "{} at {}.{} has no {} pick",
                    arrival.phase, arrival.network_code, arrival.station_code, reference
                );
                continue;
            };

            let station = arrival.location;
            let distance = origin.epicenter.distance_degrees(&station.position());

            let mut obs = DepthPhaseObservation::new(
                arrival.phase.as_str(),
                reference,
                arrival.time - reference_arrival.time,
                f64::NAN,
            )
            .with_station_codes(arrival.network_code.as_str(), arrival.station_code.as_str())
            .located_at(station)
            .with_weight(self.config.weight)
            .with_validity(false);
            obs.observed_time = arrival.time;
            obs.theoretical_time = f64::NAN;
            obs.residual = f64::NAN;
            obs.distance = distance;

            let depth_tt = table
                .compute(&arrival.phase, &origin.epicenter, origin.depth, &station)
                .filter(TravelTime::arrives);
            let reference_tt = table
                .compute(reference, &origin.epicenter, origin.depth, &station)
                .filter(TravelTime::arrives);

            if let (Some(depth_tt), Some(reference_tt)) = (depth_tt, reference_tt) {
                obs.theoretical_time = origin.time + depth_tt.time;
                obs.residual = obs.observed_time - obs.theoretical_time;
                obs.time_difference_theo = depth_tt.time - reference_tt.time;

                let reference_residual = reference_arrival.time - (origin.time + reference_tt.time);
                obs.is_valid = self.config.accepts_distance(distance)
                    && obs.time_difference_obs > 0.0
                    && reference_residual.abs() <= self.config.max_residual;
            }

            debug!(
                "{}-{} at {}.{}: {:.1} deg ({:.0} km), valid={}",
                obs.phase,
                obs.reference_phase,
                obs.network_code,
                obs.station_code,
                distance,
                origin.epicenter.distance_km(&station.position()),
                obs.is_valid
            );
            observations.push(obs);
        }

        observations
    }

    /// Estimates depth from the depth phases among `arrivals`.
    ///
    /// On failure the result has `success == false` and carries every
    /// candidate observation for inspection.
    pub fn analyze(&self, origin: &Origin, arrivals: &[Arrival]) -> DepthPhaseResult {
        let observations = self.build_observations(origin, arrivals);

        let inversion =
            match self.invert_for_depth_traced(&origin.epicenter, &observations, origin.depth) {
                Ok(inversion) => inversion,
                Err(err) => {
                    debug!("Depth phase analysis failed: {}", err);
                    return DepthPhaseResult {
                        observation_count: count_valid(&observations),
                        observations,
                        ..DepthPhaseResult::default()
                    };
                }
            };

        let used: Vec<DepthPhaseObservation> =
            observations.into_iter().filter(|obs| obs.is_valid).collect();
        let evaluator = MisfitEvaluator::new(self.travel_time_table(), origin.epicenter);
        let depth = inversion.depth;

        let residuals: Vec<f64> = used
            .iter()
            .filter_map(|obs| {
                evaluator
                    .theoretical_difference(obs, depth)
                    .map(|theo| obs.time_difference_obs - theo)
            })
            .collect();
        let (mean_residual, rms_residual) = residual_stats(&residuals);

        // Resolution floor is the finest grid step
        let resolution = inversion.stages.last().map_or(0.5, |stage| stage.step);
        let sensitivity = mean_sensitivity(&evaluator, &used, depth);
        let depth_uncertainty = if sensitivity > 0.0 {
            (rms_residual / sensitivity).max(resolution)
        } else {
            // Time differences do not constrain depth at all
            (self.config.max_depth - self.config.min_depth) / 2.0
        };

        let result = DepthPhaseResult {
            success: true,
            depth,
            depth_uncertainty,
            depth_lower_bound: (depth - depth_uncertainty).max(self.config.min_depth),
            depth_upper_bound: (depth + depth_uncertainty).min(self.config.max_depth),
            observation_count: used.len(),
            mean_residual,
            rms_residual,
            method: DepthMethod::from_observations(&used),
            observations: used,
        };

        info!(
            "Depth phase analysis: {:.1} km +/- {:.1} km from {} observations ({})",
            result.depth,
            result.depth_uncertainty,
            result.observation_count,
            result
                .method
                .as_ref()
                .map_or_else(String::new, ToString::to_string)
        );

        result
    }
}

/// Mean and RMS of residuals; zero for an empty slice.
fn residual_stats(residuals: &[f64]) -> (f64, f64) {
    if residuals.is_empty() {
        return (0.0, 0.0);
    }
    let n = residuals.len() as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    let rms = (residuals.iter().map(|r| r * r).sum::<f64>() / n).sqrt();
    (mean, rms)
}

/// Mean absolute change of the theoretical time difference per km of depth.
fn mean_sensitivity(
    evaluator: &MisfitEvaluator<'_>,
    observations: &[DepthPhaseObservation],
    depth: f64,
) -> f64 {
    const HALF_STEP: f64 = 0.5;

    let slopes: Vec<f64> = observations
        .iter()
        .filter_map(|obs| {
            let above = evaluator.theoretical_difference(obs, depth - HALF_STEP)?;
            let below = evaluator.theoretical_difference(obs, depth + HALF_STEP)?;
            Some(((below - above) / (2.0 * HALF_STEP)).abs())
        })
        .collect();

    if slopes.is_empty() {
        0.0
    } else {
        slopes.iter().sum::<f64>() / slopes.len() as f64
    }
}
