//! Depth attributes carried by regions

use tracing::warn;

use super::Region;

/// Attribute holding a region's default depth (km).
pub const DEFAULT_DEPTH_ATTRIBUTE: &str = "defaultDepth";

/// Attribute holding a region's maximum depth (km).
pub const MAX_DEPTH_ATTRIBUTE: &str = "maxDepth";

/// Parses a numeric depth attribute.
///
/// Returns `None` if the attribute is absent, or present but not a finite
/// number; the latter is logged.
pub fn parse_depth_attribute<R: Region + ?Sized>(region: &R, name: &str) -> Option<f64> {
    let raw = region.attributes().get(name)?;

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            warn!(
                "Failed to parse {}='{}' for region '{}'",
                name,
                raw,
                region.name()
            );
            None
        }
    }
}
