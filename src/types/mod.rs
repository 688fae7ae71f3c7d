//! Core types: geographic positions, seismic phases, observations and results

pub mod geo;
pub mod observation;
pub mod phase;
