//! Background tile layers the user can switch between.

use serde::Serialize;

const CARTO_ATTRIBUTION: &str = "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>";

const OPENTOPO_ATTRIBUTION: &str = "Map data: &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors, <a href=\"http://viewfinderpanoramas.org\">SRTM</a> | Map style: &copy; <a href=\"https://opentopomap.org\">OpenTopoMap</a> (<a href=\"https://creativecommons.org/licenses/by-sa/3.0/\">CC-BY-SA</a>)";

const MAX_ZOOM: u8 = 20;

/// Selectable basemaps, in layer-control order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Basemap {
    #[default]
    Satellite,
    Grayscale,
    Outdoors,
}

impl Basemap {
    pub const ALL: [Self; 3] = [Self::Satellite, Self::Grayscale, Self::Outdoors];

    /// Label shown in the layer control.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Satellite => "Satellite",
            Self::Grayscale => "Grayscale",
            Self::Outdoors => "Outdoors",
        }
    }

    /// Leaflet tile layer definition for this basemap.
    #[must_use]
    pub fn tile_layer(self) -> TileLayer {
        let (url, attribution, subdomains) = match self {
            Self::Satellite => (
                "https://{s}.google.com/vt/lyrs=s&x={x}&y={y}&z={z}",
                "",
                vec!["mt0", "mt1", "mt2", "mt3"],
            ),
            Self::Grayscale => (
                "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
                CARTO_ATTRIBUTION,
                Vec::new(),
            ),
            Self::Outdoors => (
                "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
                OPENTOPO_ATTRIBUTION,
                Vec::new(),
            ),
        };

        TileLayer {
            name: self.name(),
            url,
            attribution,
            max_zoom: MAX_ZOOM,
            subdomains,
        }
    }
}

impl std::str::FromStr for Basemap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "satellite" => Ok(Self::Satellite),
            "grayscale" | "greyscale" => Ok(Self::Grayscale),
            "outdoors" => Ok(Self::Outdoors),
            _ => Err(format!(
                "unknown basemap: {s} (expected: satellite, grayscale, outdoors)"
            )),
        }
    }
}

/// Serialized tile layer handed to the page.
///
/// An empty `subdomains` list means Leaflet's default (`abc`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    pub name: &'static str,
    pub url: &'static str,
    pub attribution: &'static str,
    pub max_zoom: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subdomains: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basemap_parse() {
        assert_eq!("satellite".parse::<Basemap>().unwrap(), Basemap::Satellite);
        assert_eq!("Greyscale".parse::<Basemap>().unwrap(), Basemap::Grayscale);
        assert_eq!("OUTDOORS".parse::<Basemap>().unwrap(), Basemap::Outdoors);
        assert!("streets".parse::<Basemap>().is_err());
    }

    #[test]
    fn test_control_order_and_default() {
        let names: Vec<&str> = Basemap::ALL.iter().map(|b| b.name()).collect();
        assert_eq!(names, ["Satellite", "Grayscale", "Outdoors"]);
        assert_eq!(Basemap::default(), Basemap::Satellite);
    }

    #[test]
    fn test_tile_layers() {
        let satellite = Basemap::Satellite.tile_layer();
        assert_eq!(satellite.subdomains, ["mt0", "mt1", "mt2", "mt3"]);
        assert!(satellite.url.contains("lyrs=s"));

        let grayscale = Basemap::Grayscale.tile_layer();
        assert!(grayscale.attribution.contains("CARTO"));
        assert_eq!(grayscale.max_zoom, 20);

        let value = serde_json::to_value(Basemap::Outdoors.tile_layer()).unwrap();
        assert_eq!(value["maxZoom"], 20);
        assert!(value.get("subdomains").is_none());
    }
}
