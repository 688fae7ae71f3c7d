//! Weighted RMS misfit of depth-phase time differences

use crate::traveltime::{theoretical_time_difference, TravelTimeTable};
use crate::types::geo::GeoPoint;
use crate::types::observation::DepthPhaseObservation;

/// Misfit reported when nothing usable constrains a trial depth.
///
/// Every misfit computed from finite residuals is finite, so it is strictly
/// below this value, and the search only accepts strict improvements.
pub const WORST_MISFIT: f64 = f64::INFINITY;

/// Weighted root-mean-square of `(residual, weight)` pairs.
///
/// Residuals are scaled by their largest magnitude before squaring, so the
/// result stays finite for any finite input. Returns [`WORST_MISFIT`] for an
/// empty input or a zero weight sum.
pub fn weighted_rms<I>(residuals: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let pairs: Vec<(f64, f64)> = residuals.into_iter().collect();
    let sum_weights: f64 = pairs.iter().map(|&(_, weight)| weight).sum();

    if pairs.is_empty() || sum_weights == 0.0 {
        return WORST_MISFIT;
    }

    let scale = pairs
        .iter()
        .fold(0.0_f64, |max, &(residual, _)| max.max(residual.abs()));
    if scale == 0.0 {
        return 0.0;
    }

    let sum_squares: f64 = pairs
        .iter()
        .map(|&(residual, weight)| {
            let scaled = residual / scale;
            weight * scaled * scaled
        })
        .sum();

    scale * (sum_squares / sum_weights).sqrt()
}

/// Evaluates the depth-phase misfit at trial depths.
///
/// With a travel-time table, every valid observation that carries a station
/// location is compared against the time difference computed at the trial
/// depth. Observations without a location, evaluators without a table and
/// located observations whose phases do not arrive at the trial depth fall
/// back to the stored `time_difference_theo`, which does not vary with depth.
#[derive(Clone, Copy)]
pub struct MisfitEvaluator<'a> {
    table: Option<&'a dyn TravelTimeTable>,
    epicenter: GeoPoint,
}

impl<'a> MisfitEvaluator<'a> {
    /// Creates an evaluator for the given epicenter.
    pub fn new(table: Option<&'a dyn TravelTimeTable>, epicenter: GeoPoint) -> Self {
        Self { table, epicenter }
    }

    /// Theoretical time difference of `obs` at `depth`.
    ///
    /// `None` if the observation is located but its phases do not arrive.
    pub fn theoretical_difference(&self, obs: &DepthPhaseObservation, depth: f64) -> Option<f64> {
        match (self.table, obs.station.as_ref()) {
            (Some(table), Some(station)) => {
                theoretical_time_difference(table, &obs.phase, &self.epicenter, depth, station)
            }
            _ => Some(obs.time_difference_theo),
        }
    }

    /// Weighted RMS of observed minus theoretical time differences at `depth`.
    ///
    /// Invalid observations are skipped, as are observations that neither
    /// resolve at `depth` nor carry a finite stored theoretical difference.
    pub fn evaluate(&self, depth: f64, observations: &[DepthPhaseObservation]) -> f64 {
        let residuals = observations
            .iter()
            .filter(|obs| obs.is_valid)
            .filter_map(|obs| {
                let residual = match self.theoretical_difference(obs, depth) {
                    Some(theo) => obs.time_difference_obs - theo,
                    None => obs.time_difference_residual(),
                };
                residual.is_finite().then_some((residual, obs.weight))
            });

        weighted_rms(residuals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traveltime::TabulatedP;
    use crate::types::geo::StationLocation;

    #[test]
    fn test_weighted_rms() {
        let rms = weighted_rms([(1.0, 1.0), (-3.0, 1.0)]);
        assert!((rms - 5.0_f64.sqrt()).abs() < 1e-12);

        // Heavier weight pulls toward its residual
        let rms = weighted_rms([(1.0, 3.0), (3.0, 1.0)]);
        assert!((rms - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_rms_degenerate() {
        assert_eq!(weighted_rms(core::iter::empty::<(f64, f64)>()), WORST_MISFIT);
        assert_eq!(weighted_rms([(2.0, 0.0), (1.0, 0.0)]), WORST_MISFIT);
    }

    #[test]
    fn test_invalid_observations_ignored() {
        let evaluator = MisfitEvaluator::new(None, GeoPoint::new(0.0, 0.0));
        let observations = vec![
            DepthPhaseObservation::new("pP", "P", 12.0, 10.0),
            DepthPhaseObservation::new("pP", "P", 100.0, 10.0).with_validity(false),
        ];

        assert!((evaluator.evaluate(50.0, &observations) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_invalid_is_worst() {
        let evaluator = MisfitEvaluator::new(None, GeoPoint::new(0.0, 0.0));
        let observations = vec![
            DepthPhaseObservation::new("pP", "P", 12.0, 10.0).with_validity(false),
            DepthPhaseObservation::new("sP", "P", 14.0, 10.0).with_validity(false),
        ];

        assert_eq!(evaluator.evaluate(50.0, &observations), WORST_MISFIT);
    }

    #[test]
    fn test_unlocated_observations_are_flat_in_depth() {
        let table = TabulatedP::with_model("iasp91").unwrap();
        let evaluator = MisfitEvaluator::new(Some(&table), GeoPoint::new(0.0, 0.0));
        let observations = vec![DepthPhaseObservation::new("pP", "P", 20.0, 17.0)];

        let shallow = evaluator.evaluate(20.0, &observations);
        let deep = evaluator.evaluate(400.0, &observations);
        assert!((shallow - 3.0).abs() < 1e-12);
        assert_eq!(shallow, deep);
    }

    #[test]
    fn test_located_observations_recomputed_per_depth() {
        let table = TabulatedP::with_model("iasp91").unwrap();
        let epicenter = GeoPoint::new(0.0, 0.0);
        let station = StationLocation::new(0.0, 50.0, 0.0);
        let evaluator = MisfitEvaluator::new(Some(&table), epicenter);

        let true_diff =
            theoretical_time_difference(&table, "pP", &epicenter, 80.0, &station).unwrap();
        // Stored theoretical value is deliberately stale
        let observations =
            vec![DepthPhaseObservation::new("pP", "P", true_diff, 0.0).located_at(station)];

        assert!(evaluator.evaluate(80.0, &observations) < 1e-9);
        assert!(evaluator.evaluate(60.0, &observations) > 1.0);
    }

    #[test]
    fn test_weighted_rms_huge_residuals_stay_finite() {
        let rms = weighted_rms([(1e200, 1.0), (-1e200, 1.0)]);

        assert!(rms.is_finite());
        assert!(rms < WORST_MISFIT);
        assert!((rms / 1e200 - 1.0).abs() < 1e-12);
        assert_eq!(weighted_rms([(0.0, 1.0), (0.0, 2.0)]), 0.0);
    }

    #[test]
    fn test_unresolvable_located_observation_uses_stored_difference() {
        let table = TabulatedP::with_model("iasp91").unwrap();
        let evaluator = MisfitEvaluator::new(Some(&table), GeoPoint::new(0.0, 0.0));
        let near = StationLocation::new(0.0, 3.0, 0.0);

        let observations = vec![DepthPhaseObservation::new("pP", "P", 12.0, 10.0).located_at(near)];
        assert!((evaluator.evaluate(50.0, &observations) - 2.0).abs() < 1e-12);

        // Nothing stored either: the observation drops out of the sum
        let observations =
            vec![DepthPhaseObservation::new("pP", "P", 12.0, f64::NAN).located_at(near)];
        assert_eq!(evaluator.evaluate(50.0, &observations), WORST_MISFIT);
    }
}
