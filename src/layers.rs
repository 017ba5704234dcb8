//! Map document composition.
//!
//! Turns the two feeds into everything the page draws: the earthquake
//! overlay (styled point features), the fault line overlay, the basemap
//! choices and the depth legend.

use serde::Serialize;
use tracing::{info, warn};

use crate::basemap::{Basemap, TileLayer};
use crate::client::FeedSource;
use crate::filters::EventFilter;
use crate::models::{Feature, FeatureCollection, LineGeometry, PlateCollection, PlateProperties};
use crate::popup::popup_html;
use crate::style::{LegendEntry, LineStyle, PLATE_BOUNDARY_STYLE, VisualStyle, legend_buckets};

/// Initial map center, `[lat, lon]`.
pub const MAP_CENTER: [f64; 2] = [37.09, -95.71];

/// Initial zoom level.
pub const MAP_ZOOM: u8 = 3;

pub const EARTHQUAKES_TITLE: &str = "Earthquakes";
pub const FAULT_LINES_TITLE: &str = "Fault Lines";

/// Options that shape one map render.
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub basemap: Basemap,
    pub filter: EventFilter,
}

/// A styled earthquake, as a `GeoJSON` point feature.
#[derive(Debug, Clone, Serialize)]
pub struct QuakeFeature {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub id: String,
    pub geometry: PointGeometry,
    pub properties: QuakeProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuakeProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    pub time: Option<i64>,
    pub depth: Option<f64>,
    pub style: VisualStyle,
    pub popup: String,
}

impl QuakeFeature {
    /// Style one feed feature for the map.
    #[must_use]
    pub fn from_feature(event: &Feature) -> Self {
        Self {
            type_: "Feature",
            id: event.id.clone(),
            geometry: PointGeometry {
                type_: "Point",
                coordinates: std::iter::once(event.longitude())
                    .chain(Some(event.latitude()))
                    .chain(event.depth_km())
                    .collect(),
            },
            properties: QuakeProperties {
                mag: event.properties.mag,
                place: event.properties.place.clone(),
                time: event.properties.time,
                depth: event.depth_km(),
                style: VisualStyle::for_feature(event),
                popup: popup_html(event),
            },
        }
    }
}

/// A plate boundary segment passed through as `GeoJSON`.
#[derive(Debug, Clone, Serialize)]
pub struct FaultLineFeature {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub geometry: LineGeometry,
    pub properties: PlateProperties,
}

/// A togglable overlay: a titled `GeoJSON` collection.
#[derive(Debug, Clone, Serialize)]
pub struct Overlay<F> {
    pub title: &'static str,
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub features: Vec<F>,
}

impl<F> Overlay<F> {
    fn new(title: &'static str, features: Vec<F>) -> Self {
        Self {
            title,
            type_: "FeatureCollection",
            features,
        }
    }

    /// An overlay with nothing to draw.
    #[must_use]
    pub fn empty(title: &'static str) -> Self {
        Self::new(title, Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Fault lines share one style for every segment.
#[derive(Debug, Clone, Serialize)]
pub struct FaultLines {
    #[serde(flatten)]
    pub overlay: Overlay<FaultLineFeature>,
    pub style: LineStyle,
}

/// Build the earthquake overlay from a fetched feed.
#[must_use]
pub fn earthquake_overlay(feed: &FeatureCollection, filter: &EventFilter) -> Overlay<QuakeFeature> {
    let features = feed
        .valid_features()
        .filter(|event| filter.matches(event))
        .map(QuakeFeature::from_feature)
        .collect();
    Overlay::new(EARTHQUAKES_TITLE, features)
}

/// Build the fault line overlay from the plate dataset.
#[must_use]
pub fn fault_line_overlay(plates: PlateCollection) -> FaultLines {
    let features = plates
        .features
        .into_iter()
        .map(|boundary| FaultLineFeature {
            type_: "Feature",
            geometry: boundary.geometry,
            properties: boundary.properties,
        })
        .collect();

    FaultLines {
        overlay: Overlay::new(FAULT_LINES_TITLE, features),
        style: PLATE_BOUNDARY_STYLE,
    }
}

/// Both overlays plus anything worth telling the viewer about.
#[derive(Debug, Clone)]
pub struct Overlays {
    pub earthquakes: Overlay<QuakeFeature>,
    pub fault_lines: FaultLines,
    pub notices: Vec<String>,
}

/// Fetch and build both overlays.
///
/// Earthquakes are loaded first. Plates are requested only after the
/// earthquake feed succeeded, so fault lines never show up on a map whose
/// earthquake layer failed. A failed fetch leaves its overlay empty and adds
/// a notice; it is never an error.
pub fn load_overlays<S: FeedSource + ?Sized>(source: &S, filter: &EventFilter) -> Overlays {
    let mut notices = Vec::new();

    let earthquakes = match source.earthquakes() {
        Ok(feed) => earthquake_overlay(&feed, filter),
        Err(e) => {
            warn!("earthquake feed unavailable: {e}");
            notices.push(format!("Earthquake data unavailable: {e}"));
            return Overlays {
                earthquakes: Overlay::empty(EARTHQUAKES_TITLE),
                fault_lines: fault_line_overlay(PlateCollection::empty()),
                notices,
            };
        }
    };

    let fault_lines = match source.plates() {
        Ok(plates) => fault_line_overlay(plates),
        Err(e) => {
            warn!("plate boundaries unavailable: {e}");
            notices.push(format!("Fault line data unavailable: {e}"));
            fault_line_overlay(PlateCollection::empty())
        }
    };

    info!(
        "loaded {} earthquakes and {} fault line segments",
        earthquakes.len(),
        fault_lines.overlay.len()
    );

    Overlays {
        earthquakes,
        fault_lines,
        notices,
    }
}

/// Everything the page needs for one render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub center: [f64; 2],
    pub zoom: u8,
    pub basemaps: Vec<TileLayer>,
    pub default_basemap: &'static str,
    pub earthquakes: Overlay<QuakeFeature>,
    pub fault_lines: FaultLines,
    pub legend: Vec<LegendEntry>,
    pub notices: Vec<String>,
}

impl MapDocument {
    /// Assemble a document from already loaded overlays.
    #[must_use]
    pub fn new(options: &MapOptions, overlays: Overlays) -> Self {
        Self {
            center: MAP_CENTER,
            zoom: MAP_ZOOM,
            basemaps: Basemap::ALL.iter().map(|b| b.tile_layer()).collect(),
            default_basemap: options.basemap.name(),
            earthquakes: overlays.earthquakes,
            fault_lines: overlays.fault_lines,
            legend: legend_buckets(),
            notices: overlays.notices,
        }
    }

    /// Load both feeds from `source` and assemble the document.
    pub fn load<S: FeedSource + ?Sized>(source: &S, options: &MapOptions) -> Self {
        Self::new(options, load_overlays(source, &options.filter))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::errors::QuakemapError;

    /// Canned feeds that record the order they were asked for.
    struct StubSource {
        feed: &'static str,
        quakes_ok: bool,
        plates_ok: bool,
        calls: RefCell<Vec<&'static str>>,
    }

    impl StubSource {
        fn new(quakes_ok: bool, plates_ok: bool) -> Self {
            Self {
                feed: include_str!("../tools/sample_all_week.json"),
                quakes_ok,
                plates_ok,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn with_feed(feed: &'static str) -> Self {
            Self {
                feed,
                ..Self::new(true, true)
            }
        }
    }

    impl FeedSource for StubSource {
        fn earthquakes(&self) -> Result<FeatureCollection, QuakemapError> {
            self.calls.borrow_mut().push("earthquakes");
            if self.quakes_ok {
                Ok(serde_json::from_str(self.feed)?)
            } else {
                Err(QuakemapError::InvalidResponse("boom".into()))
            }
        }

        fn plates(&self) -> Result<PlateCollection, QuakemapError> {
            self.calls.borrow_mut().push("plates");
            if self.plates_ok {
                Ok(serde_json::from_str(include_str!("../tools/sample_plates.json"))?)
            } else {
                Err(QuakemapError::Validation("nope".into()))
            }
        }
    }

    #[test]
    fn test_plates_load_after_earthquakes() {
        let source = StubSource::new(true, true);
        let overlays = load_overlays(&source, &EventFilter::default());

        assert_eq!(*source.calls.borrow(), ["earthquakes", "plates"]);
        assert_eq!(overlays.earthquakes.len(), 3);
        assert_eq!(overlays.fault_lines.overlay.len(), 2);
        assert!(overlays.notices.is_empty());
    }

    #[test]
    fn test_failed_earthquakes_skip_plates() {
        let source = StubSource::new(false, true);
        let overlays = load_overlays(&source, &EventFilter::default());

        assert_eq!(*source.calls.borrow(), ["earthquakes"]);
        assert!(overlays.earthquakes.is_empty());
        assert!(overlays.fault_lines.overlay.is_empty());
        assert_eq!(overlays.notices.len(), 1);
    }

    #[test]
    fn test_failed_plates_keep_earthquakes() {
        let source = StubSource::new(true, false);
        let overlays = load_overlays(&source, &EventFilter::default());

        assert_eq!(overlays.earthquakes.len(), 3);
        assert!(overlays.fault_lines.overlay.is_empty());
        assert!(overlays.notices[0].starts_with("Fault line data unavailable"));
    }

    #[test]
    fn test_quake_features_carry_style_and_popup() {
        let source = StubSource::new(true, true);
        let overlays = load_overlays(&source, &EventFilter::default());

        let first = &overlays.earthquakes.features[0];
        assert_eq!(first.properties.style.fill_color, "#eecc00");
        assert!((first.properties.style.radius - 21.0).abs() < 1e-9);
        assert!(first.properties.popup.contains("Magnitude: 4.2"));

        let deep = &overlays.earthquakes.features[1];
        assert_eq!(deep.properties.style.fill_color, "#ea2c2c");

        let no_depth = &overlays.earthquakes.features[2];
        assert_eq!(no_depth.properties.style.fill_color, "#000000");
    }

    #[test]
    fn test_malformed_features_do_not_blank_the_map() {
        let source = StubSource::with_feed(include_str!("../tools/sample_malformed.json"));
        let overlays = load_overlays(&source, &EventFilter::default());

        assert_eq!(*source.calls.borrow(), ["earthquakes", "plates"]);
        assert!(overlays.notices.is_empty());
        assert_eq!(overlays.fault_lines.overlay.len(), 2);

        let ids: Vec<&str> = overlays
            .earthquakes
            .features
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, ["ok1", "nulldepth", "notime"]);

        let null_depth = &overlays.earthquakes.features[1];
        assert_eq!(null_depth.properties.style.fill_color, "#000000");
        assert_eq!(null_depth.geometry.coordinates, [1.0, 2.0]);
        assert!(null_depth.properties.popup.contains("Depth: unknown"));
    }

    #[test]
    fn test_filter_applies_to_earthquakes_only() {
        let source = StubSource::new(true, true);
        let filter = EventFilter {
            min_magnitude: Some(4.0),
            ..Default::default()
        };
        let overlays = load_overlays(&source, &filter);

        assert_eq!(overlays.earthquakes.len(), 1);
        assert_eq!(overlays.fault_lines.overlay.len(), 2);
    }

    #[test]
    fn test_document_json_shape() {
        let source = StubSource::new(true, true);
        let options = MapOptions {
            basemap: Basemap::Outdoors,
            ..Default::default()
        };
        let doc = MapDocument::load(&source, &options);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["defaultBasemap"], "Outdoors");
        assert_eq!(value["zoom"], 3);
        assert_eq!(value["basemaps"].as_array().unwrap().len(), 3);
        assert_eq!(value["legend"].as_array().unwrap().len(), 6);

        assert_eq!(value["earthquakes"]["title"], "Earthquakes");
        assert_eq!(value["earthquakes"]["type"], "FeatureCollection");
        let quake = &value["earthquakes"]["features"][0];
        assert_eq!(quake["geometry"]["type"], "Point");
        assert_eq!(quake["properties"]["style"]["fillColor"], "#eecc00");

        assert_eq!(value["faultLines"]["title"], "Fault Lines");
        assert_eq!(value["faultLines"]["style"]["color"], "orange");
        assert_eq!(value["faultLines"]["style"]["weight"], 3.0);
        assert_eq!(
            value["faultLines"]["features"][0]["geometry"]["type"],
            "LineString"
        );
    }
}
