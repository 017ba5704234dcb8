//! Visual styling for earthquake markers and fault lines.
//!
//! Markers are filled by depth and sized by magnitude. The depth ladder is a
//! step function over kilometres with a fallback color, so every input
//! (including NaN) resolves to exactly one color.

use serde::Serialize;

use crate::models::Feature;

/// Fill color for depths outside the ladder (shallower than -10 km, NaN).
pub const FALLBACK_COLOR: &str = "#000000";

/// Stroke color drawn around every marker.
pub const MARKER_STROKE: &str = "black";

/// Marker radius per unit of magnitude.
pub const RADIUS_PER_MAGNITUDE: f64 = 5.0;

const MARKER_FILL_OPACITY: f64 = 1.0;
const MARKER_WEIGHT: f64 = 0.5;

/// One step of the depth ladder.
///
/// A depth belongs to the bucket with the greatest `lower_bound` strictly
/// below it. The first bucket additionally owns its own lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthColorBucket {
    pub lower_bound: f64,
    pub color: &'static str,
}

/// Depth ladder in ascending order. Bounds must stay strictly increasing.
pub const DEPTH_LADDER: [DepthColorBucket; 6] = [
    DepthColorBucket { lower_bound: -10.0, color: "#98ee00" },
    DepthColorBucket { lower_bound: 10.0, color: "#d4ee00" },
    DepthColorBucket { lower_bound: 30.0, color: "#eecc00" },
    DepthColorBucket { lower_bound: 50.0, color: "#ee9c00" },
    DepthColorBucket { lower_bound: 70.0, color: "#ea822c" },
    DepthColorBucket { lower_bound: 90.0, color: "#ea2c2c" },
];

/// Resolve the fill color for a depth in kilometres.
///
/// A depth sitting exactly on a boundary belongs to the lower bucket, so
/// `10.0` is `#98ee00` while `10.0001` is `#d4ee00`.
#[must_use]
pub fn resolve_color(depth_km: f64) -> &'static str {
    let floor = DEPTH_LADDER[0];

    if depth_km.is_nan() || depth_km < floor.lower_bound {
        return FALLBACK_COLOR;
    }

    DEPTH_LADDER
        .iter()
        .rev()
        .find(|bucket| depth_km > bucket.lower_bound)
        .map_or(floor.color, |bucket| bucket.color)
}

/// Resolve the marker radius for a magnitude.
///
/// Linear and unclamped: zero or negative magnitudes give a non-positive
/// radius and it is up to the renderer to cope.
#[must_use]
pub fn resolve_radius(magnitude: f64) -> f64 {
    magnitude * RADIUS_PER_MAGNITUDE
}

/// A row of the depth legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: &'static str,
}

/// Build the legend rows, one per ladder threshold, ascending.
///
/// Each swatch is colored with `resolve_color(threshold + 1)`, not
/// `resolve_color(threshold)`. A boundary value belongs to the bucket below
/// it, so sampling just above the threshold is what makes the swatch match
/// the range printed next to it (`10–30` shows the `(10, 30]` color).
#[must_use]
pub fn legend_buckets() -> Vec<LegendEntry> {
    DEPTH_LADDER
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let threshold = bucket.lower_bound;
            let label = match DEPTH_LADDER.get(i + 1) {
                Some(next) => format!("{threshold}\u{2013}{}", next.lower_bound),
                None => format!("{threshold}+"),
            };
            LegendEntry {
                label,
                color: resolve_color(threshold + 1.0),
            }
        })
        .collect()
}

/// Style handed to Leaflet for one earthquake circle marker.
///
/// Field names serialize in Leaflet's path-option casing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualStyle {
    pub color: &'static str,
    pub radius: f64,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub weight: f64,
}

impl VisualStyle {
    /// Derive the marker style from raw magnitude and depth.
    ///
    /// A missing depth takes the fallback color. A missing magnitude is
    /// treated as zero, which is what the browser makes of a null `mag`.
    #[must_use]
    pub fn for_values(magnitude: Option<f64>, depth_km: Option<f64>) -> Self {
        Self {
            color: MARKER_STROKE,
            radius: resolve_radius(magnitude.unwrap_or(0.0)),
            fill_color: resolve_color(depth_km.unwrap_or(f64::NAN)),
            fill_opacity: MARKER_FILL_OPACITY,
            weight: MARKER_WEIGHT,
        }
    }

    /// Derive the marker style for a feed feature.
    #[must_use]
    pub fn for_feature(feature: &Feature) -> Self {
        Self::for_values(feature.properties.mag, feature.depth_km())
    }
}

/// Line style for tectonic plate boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: f64,
}

/// Fault lines are drawn orange, 3px.
pub const PLATE_BOUNDARY_STYLE: LineStyle = LineStyle {
    color: "orange",
    weight: 3.0,
};
