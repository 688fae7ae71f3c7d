//! Multi-resolution 1-D grid search
//!
//! Each stage scans a depth range at a fixed step and keeps the depth with
//! the strictly smallest misfit, so ties resolve to the shallowest depth.
//! Later stages scan a window centred on the previous stage's best depth,
//! clipped to the global bounds.

use num_traits::Float;

/// Closed depth interval (km).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange<T: Float> {
    pub min: T,
    pub max: T,
}

impl<T: Float> DepthRange<T> {
    /// Creates a range.
    #[inline]
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Returns true if the range contains no depth.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.min <= self.max)
    }

    /// Returns true if `depth` lies in the range.
    #[inline]
    pub fn contains(&self, depth: T) -> bool {
        self.min <= depth && depth <= self.max
    }

    /// Window of `half_width` around `center`, clipped to this range.
    pub fn window(&self, center: T, half_width: T) -> DepthRange<T> {
        DepthRange::new(
            self.min.max(center - half_width),
            self.max.min(center + half_width),
        )
    }
}

/// One stage of the search schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchStage<T: Float> {
    /// Grid step (km)
    pub step: T,
    /// Half-width of the window around the previous best depth; `None` scans the full bounds
    pub half_width: Option<T>,
}

/// Coarse-to-fine schedule: 10 km over the full range, 1 km over +/-20 km,
/// 0.5 km over +/-5 km.
pub fn default_schedule<T: Float>() -> [SearchStage<T>; 3] {
    let km = |v: f64| T::from(v).unwrap_or_else(T::zero);
    [
        SearchStage {
            step: km(10.0),
            half_width: None,
        },
        SearchStage {
            step: km(1.0),
            half_width: Some(km(20.0)),
        },
        SearchStage {
            step: km(0.5),
            half_width: Some(km(5.0)),
        },
    ]
}

/// Outcome of scanning one stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTrace<T: Float> {
    /// Scanned range
    pub range: DepthRange<T>,
    /// Grid step
    pub step: T,
    /// Depth with the smallest misfit
    pub best_depth: T,
    /// Misfit at `best_depth`
    pub best_misfit: T,
    /// Number of misfit evaluations
    pub evaluations: usize,
}

/// Scans `range` at `step`, returning the first depth with the smallest misfit.
///
/// Grid depths are `min + i * step` up to `max`, so no rounding error
/// accumulates along the scan. Returns `None` if the range or step is
/// degenerate, or if no depth scored below `T::max_value()`.
pub fn scan<T, F>(range: DepthRange<T>, step: T, mut misfit: F) -> Option<StageTrace<T>>
where
    T: Float,
    F: FnMut(T) -> T,
{
    if range.is_empty() || !(step > T::zero()) {
        return None;
    }

    let slack = T::from(1e-9)?;
    let count = ((range.max - range.min) / step + slack).floor().to_usize()?;

    let mut best_depth = None;
    let mut best_misfit = T::max_value();

    for i in 0..=count {
        let depth = (range.min + step * T::from(i)?).min(range.max);
        let value = misfit(depth);
        if value < best_misfit {
            best_misfit = value;
            best_depth = Some(depth);
        }
    }

    best_depth.map(|best_depth| StageTrace {
        range,
        step,
        best_depth,
        best_misfit,
        evaluations: count + 1,
    })
}

/// Runs every stage of `schedule` within `bounds`.
///
/// On failure returns the range of the stage that produced no depth.
pub fn multi_resolution_search<T, F>(
    bounds: DepthRange<T>,
    schedule: &[SearchStage<T>],
    mut misfit: F,
) -> Result<Vec<StageTrace<T>>, DepthRange<T>>
where
    T: Float,
    F: FnMut(T) -> T,
{
    let mut traces: Vec<StageTrace<T>> = Vec::with_capacity(schedule.len());

    for stage in schedule {
        let range = match (stage.half_width, traces.last()) {
            (Some(half_width), Some(previous)) => bounds.window(previous.best_depth, half_width),
            _ => bounds,
        };

        let trace = scan(range, stage.step, &mut misfit).ok_or(range)?;
        traces.push(trace);
    }

    Ok(traces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_finds_minimum() {
        let range = DepthRange::new(0.0_f64, 100.0);
        let trace = scan(range, 10.0, |d| (d - 42.0).abs()).unwrap();

        assert_eq!(trace.best_depth, 40.0);
        assert_eq!(trace.evaluations, 11);
    }

    #[test]
    fn test_scan_ties_keep_shallowest() {
        let range = DepthRange::new(15.0_f64, 700.0);
        let trace = scan(range, 10.0, |_| 1.0).unwrap();

        assert_eq!(trace.best_depth, 15.0);

        // Symmetric minimum between two grid points
        let trace = scan(range, 10.0, |d| (d - 100.0).abs()).unwrap();
        assert_eq!(trace.best_depth, 95.0);
    }

    #[test]
    fn test_scan_includes_aligned_upper_bound() {
        let range = DepthRange::new(95.0_f64, 105.0);
        let trace = scan(range, 0.5, |d| -d).unwrap();

        assert_eq!(trace.best_depth, 105.0);
        assert_eq!(trace.evaluations, 21);
    }

    #[test]
    fn test_scan_degenerate_inputs() {
        assert!(scan(DepthRange::new(10.0_f64, 5.0), 1.0, |d| d).is_none());
        assert!(scan(DepthRange::new(0.0_f64, 5.0), 0.0, |d| d).is_none());
        assert!(scan(DepthRange::new(0.0_f64, 5.0), 1.0, |_| f64::MAX).is_none());

        // A single-point range is still scanned
        let point = scan(DepthRange::new(7.0_f64, 7.0), 1.0, |_| 0.0).unwrap();
        assert_eq!(point.best_depth, 7.0);
    }

    #[test]
    fn test_window_clipped_to_bounds() {
        let bounds = DepthRange::new(15.0_f64, 700.0);

        assert_eq!(bounds.window(25.0, 20.0), DepthRange::new(15.0, 45.0));
        assert_eq!(bounds.window(695.0, 20.0), DepthRange::new(675.0, 700.0));
        assert_eq!(bounds.window(300.0, 5.0), DepthRange::new(295.0, 305.0));
    }

    #[test]
    fn test_multi_resolution_stages_narrow() {
        let bounds = DepthRange::new(15.0_f64, 700.0);
        let traces =
            multi_resolution_search(bounds, &default_schedule(), |d| (d - 123.3).abs()).unwrap();

        assert_eq!(traces.len(), 3);
        assert_eq!(traces[0].best_depth, 125.0);
        assert_eq!(traces[1].range, DepthRange::new(105.0, 145.0));
        assert_eq!(traces[1].best_depth, 123.0);
        assert_eq!(traces[2].range, DepthRange::new(118.0, 128.0));
        assert_eq!(traces[2].best_depth, 123.5);

        for (i, trace) in traces.iter().enumerate() {
            assert!(
                bounds.contains(trace.range.min) && bounds.contains(trace.range.max),
                "stage {} left the bounds",
                i
            );
            if i > 0 {
                assert!(trace.range.contains(traces[i - 1].best_depth));
            }
        }
    }

    #[test]
    fn test_multi_resolution_reports_failed_stage() {
        let bounds = DepthRange::new(50.0_f64, 10.0);
        let err = multi_resolution_search(bounds, &default_schedule(), |d| d).unwrap_err();

        assert_eq!(err, bounds);
    }

    #[test]
    fn test_generic_over_f32() {
        let bounds = DepthRange::new(0.0_f32, 50.0);
        let traces =
            multi_resolution_search(bounds, &default_schedule(), |d| (d - 20.0).abs()).unwrap();

        assert!((traces[2].best_depth - 20.0).abs() < 1e-4);
    }
}
