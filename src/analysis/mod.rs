//! Depth-phase analysis
//!
//! - [`DepthPhaseAnalyzer`]: theoretical times, observation building and
//!   depth inversion against an injected travel-time table
//! - [`misfit`]: weighted RMS misfit of time differences at a trial depth
//! - [`grid`]: coarse-to-fine 1-D grid search

pub mod analyzer;
pub mod grid;
pub mod misfit;

pub use analyzer::*;
pub use grid::{DepthRange, SearchStage, StageTrace};
pub use misfit::{MisfitEvaluator, WORST_MISFIT};
