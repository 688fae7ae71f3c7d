//! quakedepth: earthquake source depth estimation
//!
//! Two complementary sources of depth evidence for a located event:
//!
//! - **Depth phases**: differential times between secondary arrivals (pP, sP,
//!   pwP, ...) and their direct reference phase, inverted against a
//!   travel-time model with a coarse-to-fine 1-D grid search.
//! - **Regional priors**: default and maximum plausible depths looked up from
//!   an ordered list of named regions, first match wins.
//!
//! # Features
//!
//! - **Pluggable travel times**: any backend implementing
//!   [`traveltime::TravelTimeTable`], selectable by type and model name
//! - **Borrowed regions**: region polygons stay owned by their provider; the
//!   lookup borrows them for its whole lifetime
//! - **Deterministic**: no background work, every search is bounded

pub mod analysis;
pub mod config;
pub mod region;
pub mod traveltime;
pub mod types;

pub mod prelude {
    pub use crate::analysis::*;
    pub use crate::config::*;
    pub use crate::region::*;
    pub use crate::traveltime::{TravelTime, TravelTimeTable};
    pub use crate::types::geo::*;
    pub use crate::types::observation::*;
    pub use crate::types::phase::*;
    pub use crate::{DepthError, Result};
}

/// Error types for the library
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DepthError {
    /// No travel-time table has been configured on the analyzer
    #[error("no travel time table configured")]
    NoTravelTimeTable,
    /// The factory does not know the requested table type
    #[error("unknown travel time table type '{0}'")]
    UnknownTableType(String),
    /// The table type exists but does not provide the requested model
    #[error("travel time table '{kind}' has no model '{model}'")]
    UnknownModel { kind: String, model: String },
    /// The observation set is empty
    #[error("no depth phase observations")]
    NoObservations,
    /// Fewer valid observations than the configured minimum
    #[error("not enough valid depth phase observations ({valid} < {required})")]
    InsufficientData { valid: usize, required: usize },
    /// A grid-search stage had nothing to scan, or no depth produced a usable misfit
    #[error("depth search range [{min}, {max}] produced no usable depth")]
    EmptySearchRange { min: f64, max: f64 },
}

pub type Result<T> = ::core::result::Result<T, DepthError>;
