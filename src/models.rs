//! Data models for the two `GeoJSON` inputs.
//!
//! `FeatureCollection` matches the USGS summary feeds. `PlateCollection`
//! matches the PB2002 plate boundary dataset, of which only geometry and the
//! boundary name are used.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::QuakemapError;

/// Top-level `GeoJSON` response from USGS feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always `"FeatureCollection"`
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata
    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// Earthquake events. Entries that do not deserialize are dropped.
    #[serde(deserialize_with = "lenient_features")]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate the response structure.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        expect_collection(&self.type_)
    }

    /// Features that pass validation. Bad ones are logged and dropped so a
    /// single malformed event does not blank the whole overlay.
    pub fn valid_features(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter(|f| match f.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("skipping feature {:?}: {}", f.id, e);
                false
            }
        })
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// When this feed was generated (ms since epoch)
    pub generated: i64,

    /// Human-readable title
    pub title: String,

    /// Number of events in response
    pub count: usize,
}

/// A single earthquake event.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Unique event ID
    pub id: String,

    /// Geographic location. `GeoJSON` allows `null` for unlocated features.
    #[serde(default)]
    pub geometry: Option<Geometry>,

    /// Event properties
    pub properties: Properties,
}

impl Feature {
    /// Validate the event structure. Depth may be absent; position may not.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        if self.id.is_empty() {
            return Err(QuakemapError::Validation("empty event ID".into()));
        }
        let Some(geometry) = &self.geometry else {
            return Err(QuakemapError::Validation("missing geometry".into()));
        };
        let n = geometry.coordinates.len();
        if !(2..=3).contains(&n) {
            return Err(QuakemapError::Validation(format!(
                "expected 2 or 3 coordinates, got {n}"
            )));
        }
        if geometry.coordinates[..2].iter().any(Option::is_none) {
            return Err(QuakemapError::Validation("null longitude or latitude".into()));
        }
        Ok(())
    }

    /// Get the event time as a `DateTime<Utc>`.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.properties
            .time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    fn coordinate(&self, index: usize) -> Option<f64> {
        self.geometry
            .as_ref()
            .and_then(|g| g.coordinates.get(index).copied().flatten())
    }

    /// Get longitude (degrees).
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.coordinate(0).unwrap_or(0.0)
    }

    /// Get latitude (degrees).
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.coordinate(1).unwrap_or(0.0)
    }

    /// Get depth in kilometers (positive down), if the feed supplied one.
    #[must_use]
    pub fn depth_km(&self) -> Option<f64> {
        self.coordinate(2)
    }
}

/// Point geometry for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Coordinates: `[longitude, latitude, depth_km]`, any of which may be null
    pub coordinates: Vec<Option<f64>>,
}

/// The subset of USGS event properties the map uses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Properties {
    /// Magnitude value
    pub mag: Option<f64>,

    /// Magnitude type (mb, Ml, Mw, etc.)
    #[serde(rename = "magType")]
    pub mag_type: Option<String>,

    /// Human-readable place description
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: Option<i64>,

    /// Event page URL
    pub url: Option<String>,
}

/// Top-level plate boundary `GeoJSON`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlateCollection {
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<PlateBoundary>,
}

impl PlateCollection {
    /// A collection with no boundaries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    /// Validate the response structure.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        expect_collection(&self.type_)
    }
}

/// One plate boundary segment.
#[derive(Debug, Clone, Deserialize)]
pub struct PlateBoundary {
    pub geometry: LineGeometry,

    #[serde(default)]
    pub properties: PlateProperties,
}

/// Boundary properties. Everything except the name is ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlateProperties {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Line geometries found in boundary datasets.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum LineGeometry {
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
}

/// `[longitude, latitude]`, optionally followed by elevation.
pub type Position = Vec<f64>;

impl LineGeometry {
    /// Number of vertices across all parts.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::LineString(points) => points.len(),
            Self::MultiLineString(parts) => parts.iter().map(Vec::len).sum(),
        }
    }
}

/// Deserialize features one at a time, dropping any that fail.
fn lenient_features<'de, D>(deserializer: D) -> Result<Vec<Feature>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;

    Ok(raw
        .into_iter()
        .filter_map(|value| {
            let id = value.get("id").and_then(Value::as_str).map(str::to_owned);
            match serde_json::from_value::<Feature>(value) {
                Ok(feature) => Some(feature),
                Err(e) => {
                    tracing::debug!("skipping unreadable feature {:?}: {}", id, e);
                    None
                }
            }
        })
        .collect())
}

fn expect_collection(type_: &str) -> Result<(), QuakemapError> {
    if type_ != "FeatureCollection" {
        return Err(QuakemapError::InvalidResponse(format!(
            "expected type 'FeatureCollection', got '{type_}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_feed() {
        let json = include_str!("../tools/sample_all_week.json");
        let feed: FeatureCollection =
            serde_json::from_str(json).expect("failed to parse sample feed");

        feed.validate().expect("invalid feed");
        assert_eq!(feed.features.len(), 4);
        assert_eq!(feed.metadata.as_ref().map(|m| m.count), Some(4));

        let first = &feed.features[0];
        assert_eq!(first.id, "us7000abcd");
        assert_eq!(first.properties.mag, Some(4.2));
        assert_eq!(first.depth_km(), Some(45.0));
        assert!((first.latitude() - 38.1).abs() < 1e-9);
        assert!(first.time().is_some());
    }

    #[test]
    fn test_missing_depth_and_magnitude() {
        let json = include_str!("../tools/sample_all_week.json");
        let feed: FeatureCollection = serde_json::from_str(json).unwrap();

        let shallow = feed.features.iter().find(|f| f.id == "ak0nodepth").unwrap();
        assert_eq!(shallow.depth_km(), None);
        assert_eq!(shallow.properties.mag, None);
        shallow.validate().expect("two coordinates are enough");
    }

    #[test]
    fn test_valid_features_drops_bad_entries() {
        let json = include_str!("../tools/sample_all_week.json");
        let feed: FeatureCollection = serde_json::from_str(json).unwrap();

        let ids: Vec<&str> = feed.valid_features().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&""));
    }

    #[test]
    fn test_null_depth_uses_fallback_color() {
        let json = include_str!("../tools/sample_malformed.json");
        let feed: FeatureCollection = serde_json::from_str(json).expect("feed must still parse");

        let null_depth = feed.features.iter().find(|f| f.id == "nulldepth").unwrap();
        null_depth.validate().expect("null depth is not a validation error");
        assert_eq!(null_depth.depth_km(), None);
        assert!((null_depth.longitude() - 1.0).abs() < 1e-9);
        assert_eq!(
            crate::style::VisualStyle::for_feature(null_depth).fill_color,
            crate::style::FALLBACK_COLOR
        );

        let ok = feed.features.iter().find(|f| f.id == "ok1").unwrap();
        assert_eq!(ok.depth_km(), Some(3.0));
    }

    #[test]
    fn test_structural_defects_skip_only_the_bad_feature() {
        let json = include_str!("../tools/sample_malformed.json");
        let feed: FeatureCollection = serde_json::from_str(json).expect("feed must still parse");

        // "broken" has a string magnitude and never makes it into the list
        assert_eq!(feed.features.len(), 4);

        let no_geometry = feed.features.iter().find(|f| f.id == "nogeo").unwrap();
        assert!(no_geometry.geometry.is_none());
        assert!(matches!(
            no_geometry.validate(),
            Err(QuakemapError::Validation(_))
        ));

        let no_time = feed.features.iter().find(|f| f.id == "notime").unwrap();
        assert_eq!(no_time.properties.time, None);
        assert!(no_time.time().is_none());

        let ids: Vec<&str> = feed.valid_features().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["ok1", "nulldepth", "notime"]);
    }

    #[test]
    fn test_rejects_non_collection() {
        let json = r#"{"type": "Feature", "features": []}"#;
        let feed: FeatureCollection = serde_json::from_str(json).unwrap();
        assert!(matches!(
            feed.validate(),
            Err(QuakemapError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_sample_plates() {
        let json = include_str!("../tools/sample_plates.json");
        let plates: PlateCollection = serde_json::from_str(json).expect("failed to parse plates");

        plates.validate().expect("invalid plate collection");
        assert_eq!(plates.features.len(), 2);
        assert_eq!(plates.features[0].properties.name.as_deref(), Some("AF-AN"));
        assert_eq!(plates.features[0].geometry.vertex_count(), 3);
        assert!(matches!(
            plates.features[1].geometry,
            LineGeometry::MultiLineString(_)
        ));
    }

    #[test]
    fn test_line_geometry_serializes_as_geojson() {
        let geometry = LineGeometry::LineString(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let value = serde_json::to_value(&geometry).unwrap();
        assert_eq!(value["type"], "LineString");
        assert_eq!(value["coordinates"][1][0], 3.0);
    }
}
