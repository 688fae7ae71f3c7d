//! Region-based depth constraints
//!
//! Regions (polygons with string attributes) are owned by an external
//! [`RegionProvider`]. [`RegionDepthLookup`] borrows the configured ones and
//! resolves default and maximum depths for a coordinate, first match wins.

mod attributes;
mod lookup;

pub use attributes::*;
pub use lookup::*;

use std::collections::HashMap;

/// A named geographic region.
pub trait Region {
    /// Region name, as referenced by configuration.
    fn name(&self) -> &str;

    /// Returns true if the region contains the point (degrees).
    fn contains(&self, latitude: f64, longitude: f64) -> bool;

    /// Raw, unparsed attributes.
    fn attributes(&self) -> &HashMap<String, String>;
}

/// Source of regions, in provider order.
pub trait RegionProvider {
    type Region: Region;

    /// All regions known to the provider.
    fn regions(&self) -> &[Self::Region];
}

impl<R: Region> RegionProvider for [R] {
    type Region = R;

    fn regions(&self) -> &[R] {
        self
    }
}

impl<R: Region> RegionProvider for Vec<R> {
    type Region = R;

    fn regions(&self) -> &[R] {
        self.as_slice()
    }
}
