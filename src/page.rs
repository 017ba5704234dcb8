//! Leaflet page template.
//!
//! One page, two ways to feed it: `standalone_html` embeds a rendered
//! `MapDocument` so the file works from disk, `served_html` makes the page
//! fetch `/api/map` from the server.

use crate::layers::MapDocument;

const BOOTSTRAP_PLACEHOLDER: &str = "/*BOOTSTRAP*/";

const FETCH_BOOTSTRAP: &str = "fetch('/api/map')
      .then(function (r) { return r.json(); })
      .then(drawMap)
      .catch(function (e) { showNotices(['Failed to load map data: ' + e]); });";

/// Page that loads its map document from the server.
#[must_use]
pub fn served_html() -> String {
    MAP_HTML.replace(BOOTSTRAP_PLACEHOLDER, FETCH_BOOTSTRAP)
}

/// Self-contained page with the document inlined.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn standalone_html(doc: &MapDocument) -> Result<String, serde_json::Error> {
    let json = script_safe_json(doc)?;
    Ok(MAP_HTML.replace(BOOTSTRAP_PLACEHOLDER, &format!("drawMap({json});")))
}

/// JSON that can sit inside a `<script>` element. Only `</` can end the
/// element early; `<\/` means the same thing to the JSON parser.
fn script_safe_json(doc: &MapDocument) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(doc)?.replace("</", "<\\/"))
}

const MAP_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>quakemap — Earthquakes and Fault Lines</title>

    <!-- Leaflet -->
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>

    <style>
        html, body { height: 100%; margin: 0; padding: 0; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; }
        #map { height: 100vh; width: 100%; }

        .info {
            padding: 6px 8px;
            font: 14px/16px Arial, Helvetica, sans-serif;
            background: rgba(255, 255, 255, 0.9);
            box-shadow: 0 0 15px rgba(0, 0, 0, 0.2);
            border-radius: 5px;
        }

        .legend { line-height: 18px; color: #555; }
        .legend i {
            width: 18px;
            height: 18px;
            float: left;
            margin-right: 8px;
            opacity: 0.9;
        }

        #notices {
            position: absolute;
            top: 10px;
            left: 50%;
            transform: translateX(-50%);
            z-index: 1000;
            display: none;
            padding: 8px 12px;
            border-radius: 5px;
            background: #ff6b6b;
            color: white;
            font-weight: 600;
            font-size: 13px;
        }
    </style>
</head>
<body>
    <div id="map"></div>
    <div id="notices"></div>

    <script>
    function showNotices(notices) {
      if (!notices || notices.length === 0) return;
      var box = document.getElementById('notices');
      box.textContent = notices.join(' · ');
      box.style.display = 'block';
    }

    function drawMap(data) {
      var baseMaps = {};
      data.basemaps.forEach(function (b) {
        var opts = { maxZoom: b.maxZoom };
        if (b.attribution) opts.attribution = b.attribution;
        if (b.subdomains) opts.subdomains = b.subdomains;
        baseMaps[b.name] = L.tileLayer(b.url, opts);
      });

      var earthquakes = new L.LayerGroup();
      var faultLines = new L.LayerGroup();

      var overlayMaps = {};
      overlayMaps[data.earthquakes.title] = earthquakes;
      overlayMaps[data.faultLines.title] = faultLines;

      var map = L.map('map', {
        center: data.center,
        zoom: data.zoom,
        layers: [baseMaps[data.defaultBasemap], earthquakes, faultLines]
      });

      L.control.layers(baseMaps, overlayMaps, { collapsed: false }).addTo(map);

      // Styles and popups arrive precomputed on each feature.
      L.geoJson(data.earthquakes, {
        pointToLayer: function (feature, latlng) {
          return L.circleMarker(latlng, feature.properties.style);
        },
        onEachFeature: function (feature, layer) {
          layer.bindPopup(feature.properties.popup);
        }
      }).addTo(earthquakes);

      var legend = L.control({ position: 'bottomright' });
      legend.onAdd = function () {
        var div = L.DomUtil.create('div', 'info legend');
        data.legend.forEach(function (entry) {
          var swatch = document.createElement('i');
          swatch.style.background = entry.color;
          div.appendChild(swatch);
          div.appendChild(document.createTextNode(' ' + entry.label));
          div.appendChild(document.createElement('br'));
        });
        return div;
      };
      legend.addTo(map);

      L.geoJson(data.faultLines, { style: data.faultLines.style }).addTo(faultLines);

      showNotices(data.notices);
    }

    /*BOOTSTRAP*/
    </script>
</body>
</html>
"#;
