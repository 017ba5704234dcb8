//! Event filtering applied before earthquakes are styled.

use crate::models::Feature;

/// Geographic bounding box, parsed from `minlat,minlon,maxlat,maxlon`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl std::str::FromStr for BBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vals = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| format!("invalid number in bbox: {e}"))?;

        let [min_lat, min_lon, max_lat, max_lon] = vals[..] else {
            return Err(format!(
                "bbox requires 4 values (minlat,minlon,maxlat,maxlon), got {}",
                vals.len()
            ));
        };

        for (name, lat) in [("min_lat", min_lat), ("max_lat", max_lat)] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("{name} {lat} out of range [-90, 90]"));
            }
        }
        for (name, lon) in [("min_lon", min_lon), ("max_lon", max_lon)] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(format!("{name} {lon} out of range [-180, 180]"));
            }
        }
        if min_lat > max_lat {
            return Err(format!("min_lat {min_lat} must be <= max_lat {max_lat}"));
        }

        Ok(Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        })
    }
}

impl BBox {
    /// Check if a point is within the box.
    ///
    /// A box with `min_lon > max_lon` wraps across the antimeridian.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        let lat_ok = lat >= self.min_lat && lat <= self.max_lat;
        let lon_ok = if self.min_lon <= self.max_lon {
            lon >= self.min_lon && lon <= self.max_lon
        } else {
            lon >= self.min_lon || lon <= self.max_lon
        };
        lat_ok && lon_ok
    }
}

/// Combined filter criteria. The default lets everything through.
#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub min_magnitude: Option<f64>,
    pub max_depth: Option<f64>,
    pub bbox: Option<BBox>,
}

impl EventFilter {
    /// Check if an event passes all filter criteria.
    #[must_use]
    pub fn matches(&self, event: &Feature) -> bool {
        self.check_magnitude(event) && self.check_depth(event) && self.check_bbox(event)
    }

    /// True when no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_magnitude.is_none() && self.max_depth.is_none() && self.bbox.is_none()
    }

    // Unknown values cannot satisfy a bound.
    fn check_magnitude(&self, event: &Feature) -> bool {
        self.min_magnitude
            .is_none_or(|min| event.properties.mag.is_some_and(|m| m >= min))
    }

    fn check_depth(&self, event: &Feature) -> bool {
        self.max_depth
            .is_none_or(|max| event.depth_km().is_some_and(|d| d <= max))
    }

    fn check_bbox(&self, event: &Feature) -> bool {
        self.bbox
            .is_none_or(|bbox| bbox.contains(event.latitude(), event.longitude()))
    }
}
