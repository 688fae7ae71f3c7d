//! Ordered region lookup for depth constraints
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use quakedepth::config::RegionDepthConfig;
//! use quakedepth::region::{Region, RegionDepthLookup};
//!
//! struct Band { name: String, min_lat: f64, max_lat: f64, attributes: HashMap<String, String> }
//!
//! impl Region for Band {
//!     fn name(&self) -> &str { &self.name }
//!     fn contains(&self, lat: f64, _lon: f64) -> bool { (self.min_lat..=self.max_lat).contains(&lat) }
//!     fn attributes(&self) -> &HashMap<String, String> { &self.attributes }
//! }
//!
//! let regions = vec![Band {
//!     name: "tropics".into(),
//!     min_lat: -23.4,
//!     max_lat: 23.4,
//!     attributes: HashMap::from([("maxDepth".to_string(), "300".to_string())]),
//! }];
//!
//! let mut lookup = RegionDepthLookup::with_config(&regions, RegionDepthConfig::enabled(["tropics"]));
//! assert!(lookup.init());
//!
//! let constraints = lookup.get_constraints(5.0, 100.0);
//! assert!(constraints.matched);
//! assert_eq!(constraints.max_depth, 300.0);
//! assert_eq!(constraints.default_depth, 10.0);
//! assert!(!constraints.has_default_depth);
//! ```

use core::fmt;

use tracing::{debug, info, warn};

use crate::config::RegionDepthConfig;

use super::attributes::{parse_depth_attribute, DEFAULT_DEPTH_ATTRIBUTE, MAX_DEPTH_ATTRIBUTE};
use super::{Region, RegionProvider};

/// Depth constraints resolved for one coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDepthConstraints {
    /// Name of the matching region
    pub region_name: Option<String>,
    /// Default depth (km)
    pub default_depth: f64,
    /// Maximum depth (km)
    pub max_depth: f64,
    /// Whether `default_depth` came from the region
    pub has_default_depth: bool,
    /// Whether `max_depth` came from the region
    pub has_max_depth: bool,
    /// Whether a region matched
    pub matched: bool,
}

impl RegionDepthConstraints {
    /// Unmatched constraints carrying the global fallback depths.
    pub fn fallback(config: &RegionDepthConfig) -> Self {
        Self {
            region_name: None,
            default_depth: config.global_default_depth,
            max_depth: config.global_max_depth,
            has_default_depth: false,
            has_max_depth: false,
            matched: false,
        }
    }
}

/// Lifecycle of a [`RegionDepthLookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    /// No configuration set yet
    Unconfigured,
    /// Configuration set, `init` not yet run
    Configured,
    /// `init` retained at least one region
    Initialized,
    /// `init` ran but retained no region
    InitFailed,
}

/// Resolves depth constraints from an ordered list of regions.
///
/// The lookup borrows its provider, so retained regions stay valid for the
/// lookup's whole lifetime.
pub struct RegionDepthLookup<'a, P: RegionProvider + ?Sized> {
    provider: &'a P,
    config: RegionDepthConfig,
    regions: Vec<&'a P::Region>,
    state: LookupState,
}

impl<'a, P: RegionProvider + ?Sized> fmt::Debug for RegionDepthLookup<'a, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionDepthLookup")
            .field("config", &self.config)
            .field("regions", &self.region_names())
            .field("state", &self.state)
            .finish()
    }
}

impl<'a, P: RegionProvider + ?Sized> RegionDepthLookup<'a, P> {
    /// Creates an unconfigured lookup over `provider`.
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            config: RegionDepthConfig::default(),
            regions: Vec::new(),
            state: LookupState::Unconfigured,
        }
    }

    /// Creates a configured, not yet initialized lookup.
    pub fn with_config(provider: &'a P, config: RegionDepthConfig) -> Self {
        let mut lookup = Self::new(provider);
        lookup.set_config(config);
        lookup
    }

    /// Replaces the configuration and drops every retained region.
    pub fn set_config(&mut self, config: RegionDepthConfig) {
        self.config = config;
        self.regions.clear();
        self.state = LookupState::Configured;
    }

    /// Current configuration.
    #[inline]
    pub fn config(&self) -> &RegionDepthConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> LookupState {
        self.state
    }

    /// Resolves the configured region names against the provider.
    ///
    /// Returns true if at least one region was retained.
    pub fn init(&mut self) -> bool {
        self.regions.clear();
        self.state = LookupState::InitFailed;

        if !self.config.enabled {
            debug!("Region depth constraints disabled");
            return false;
        }

        if self.config.regions.is_empty() {
            warn!("Region depth enabled but no regions configured");
            return false;
        }

        let provider: &'a P = self.provider;
        let available = provider.regions();
        debug!(
            "Loading depth regions ({} regions available)",
            available.len()
        );

        for name in &self.config.regions {
            let Some(region) = available.iter().find(|r| r.name() == name.as_str()) else {
                warn!("Depth region '{}' not found", name);
                continue;
            };

            let describe = |value: Option<f64>| {
                value.map_or_else(|| "not set".to_string(), |v| v.to_string())
            };
            info!(
                "Loaded depth region '{}' (defaultDepth={}, maxDepth={})",
                name,
                describe(parse_depth_attribute(region, DEFAULT_DEPTH_ATTRIBUTE)),
                describe(parse_depth_attribute(region, MAX_DEPTH_ATTRIBUTE))
            );
            self.regions.push(region);
        }

        if self.regions.is_empty() {
            warn!("No depth regions loaded - using global defaults");
            return false;
        }

        info!(
            "Region depth lookup initialized with {} regions",
            self.regions.len()
        );
        self.state = LookupState::Initialized;
        true
    }

    /// Returns true after a successful [`init`](Self::init).
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state == LookupState::Initialized
    }

    /// Depth constraints for a location; first containing region wins.
    pub fn get_constraints(&self, latitude: f64, longitude: f64) -> RegionDepthConstraints {
        let mut result = RegionDepthConstraints::fallback(&self.config);

        if !self.config.enabled || self.regions.is_empty() {
            return result;
        }

        let Some(region) = self
            .regions
            .iter()
            .find(|region| region.contains(latitude, longitude))
        else {
            debug!(
                "Location {:.2}/{:.2} matched no region, using global defaults \
                 (defaultDepth={:.1} km, maxDepth={:.1} km)",
                latitude, longitude, result.default_depth, result.max_depth
            );
            return result;
        };

        result.region_name = Some(region.name().to_string());
        result.matched = true;

        if let Some(depth) = parse_depth_attribute(*region, DEFAULT_DEPTH_ATTRIBUTE) {
            result.default_depth = depth;
            result.has_default_depth = true;
        }
        if let Some(depth) = parse_depth_attribute(*region, MAX_DEPTH_ATTRIBUTE) {
            result.max_depth = depth;
            result.has_max_depth = true;
        }

        debug!(
            "Location {:.2}/{:.2} matched region '{}' (defaultDepth={:.1} km, maxDepth={:.1} km)",
            latitude,
            longitude,
            region.name(),
            result.default_depth,
            result.max_depth
        );

        result
    }

    /// Default depth (km) for a location.
    #[inline]
    pub fn get_default_depth(&self, latitude: f64, longitude: f64) -> f64 {
        self.get_constraints(latitude, longitude).default_depth
    }

    /// Maximum depth (km) for a location.
    #[inline]
    pub fn get_max_depth(&self, latitude: f64, longitude: f64) -> f64 {
        self.get_constraints(latitude, longitude).max_depth
    }

    /// Number of retained regions.
    #[inline]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Names of retained regions, in lookup order.
    pub fn region_names(&self) -> Vec<&str> {
        self.regions.iter().map(|region| region.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct BoxRegion {
        name: &'static str,
        lat: (f64, f64),
        lon: (f64, f64),
        attributes: HashMap<String, String>,
    }

    impl BoxRegion {
        fn new(name: &'static str, lat: (f64, f64), lon: (f64, f64), attrs: &[(&str, &str)]) -> Self {
            Self {
                name,
                lat,
                lon,
                attributes: attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl Region for BoxRegion {
        fn name(&self) -> &str {
            self.name
        }

        fn contains(&self, latitude: f64, longitude: f64) -> bool {
            (self.lat.0..=self.lat.1).contains(&latitude)
                && (self.lon.0..=self.lon.1).contains(&longitude)
        }

        fn attributes(&self) -> &HashMap<String, String> {
            &self.attributes
        }
    }

    fn overlapping() -> Vec<BoxRegion> {
        vec![
            BoxRegion::new("wide", (-10.0, 10.0), (-10.0, 10.0), &[("defaultDepth", "20")]),
            BoxRegion::new(
                "narrow",
                (-1.0, 1.0),
                (-1.0, 1.0),
                &[("defaultDepth", "80"), ("maxDepth", "200")],
            ),
        ]
    }

    #[test]
    fn test_new_is_unconfigured() {
        let regions = overlapping();
        let mut lookup = RegionDepthLookup::new(&regions);

        assert_eq!(lookup.state(), LookupState::Unconfigured);
        assert!(!lookup.init());
        assert_eq!(lookup.state(), LookupState::InitFailed);
    }

    #[test]
    fn test_configured_order_decides_overlaps() {
        let regions = overlapping();

        let mut narrow_first =
            RegionDepthLookup::with_config(&regions, RegionDepthConfig::enabled(["narrow", "wide"]));
        assert!(narrow_first.init());
        let c = narrow_first.get_constraints(0.0, 0.0);
        assert_eq!(c.region_name.as_deref(), Some("narrow"));
        assert_eq!(c.default_depth, 80.0);

        let mut wide_first =
            RegionDepthLookup::with_config(&regions, RegionDepthConfig::enabled(["wide", "narrow"]));
        assert!(wide_first.init());
        let c = wide_first.get_constraints(0.0, 0.0);
        assert_eq!(c.region_name.as_deref(), Some("wide"));
        assert_eq!(c.default_depth, 20.0);
        // maxDepth is not set on "wide"; later regions are never consulted
        assert!(!c.has_max_depth);
        assert_eq!(c.max_depth, 700.0);
    }

    #[test]
    fn test_region_names_follow_configuration() {
        let regions = overlapping();
        let mut lookup = RegionDepthLookup::with_config(
            &regions,
            RegionDepthConfig::enabled(["narrow", "missing", "wide"]),
        );

        assert!(lookup.init());
        assert_eq!(lookup.region_names(), vec!["narrow", "wide"]);
        assert_eq!(lookup.region_count(), 2);
    }

    #[test]
    fn test_invalid_attribute_keeps_fallback() {
        let regions = vec![BoxRegion::new(
            "broken",
            (-5.0, 5.0),
            (-5.0, 5.0),
            &[("defaultDepth", "shallow"), ("maxDepth", "150")],
        )];
        let config = RegionDepthConfig::enabled(["broken"]).with_global_depths(12.0, 650.0);
        let mut lookup = RegionDepthLookup::with_config(regions.as_slice(), config);
        assert!(lookup.init());

        let c = lookup.get_constraints(1.0, 1.0);
        assert!(c.matched);
        assert!(!c.has_default_depth);
        assert_eq!(c.default_depth, 12.0);
        assert!(c.has_max_depth);
        assert_eq!(c.max_depth, 150.0);
        assert_eq!(lookup.get_default_depth(1.0, 1.0), 12.0);
        assert_eq!(lookup.get_max_depth(1.0, 1.0), 150.0);
    }

    #[test]
    fn test_uninitialized_lookup_returns_fallback() {
        let regions = overlapping();
        let lookup = RegionDepthLookup::with_config(&regions, RegionDepthConfig::enabled(["wide"]));

        let c = lookup.get_constraints(0.0, 0.0);
        assert_eq!(c, RegionDepthConstraints::fallback(lookup.config()));
    }
}
