//! Popup content for earthquake markers.

use std::fmt::Write as _;

use crate::models::Feature;

const UNKNOWN: &str = "unknown";

/// Build the popup HTML shown when a marker is clicked.
///
/// Location, date (UTC), magnitude and depth, in that order.
#[must_use]
pub fn popup_html(event: &Feature) -> String {
    let place = event
        .properties
        .place
        .as_deref()
        .unwrap_or("Unknown location");

    let date = event
        .time()
        .map_or_else(|| UNKNOWN.to_string(), |t| t.format("%a %b %d %Y %H:%M:%S UTC").to_string());

    let mag = event
        .properties
        .mag
        .map_or_else(|| UNKNOWN.to_string(), |m| m.to_string());

    let depth = event
        .depth_km()
        .map_or_else(|| UNKNOWN.to_string(), |d| d.to_string());

    format!(
        "<h3>Location: {}</h3><hr><p>Date: {date}</p><p>Magnitude: {mag}</p><p>Depth: {depth}</p>",
        escape_html(place)
    )
}

/// Escape text for inclusion in HTML element content or attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c if c.is_control() && c != '\n' && c != '\t' => {
                let _ = write!(out, "&#{};", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureCollection;

    fn sample() -> FeatureCollection {
        serde_json::from_str(include_str!("../tools/sample_all_week.json")).unwrap()
    }

    #[test]
    fn test_popup_fields() {
        let feed = sample();
        let html = popup_html(&feed.features[0]);
        assert!(html.starts_with("<h3>Location: 35 km SW of Ferndale, CA</h3><hr>"));
        assert!(html.contains("<p>Date: Thu Oct 16 2025 07:00:00 UTC</p>"));
        assert!(html.contains("<p>Magnitude: 4.2</p>"));
        assert!(html.ends_with("<p>Depth: 45</p>"));
    }

    #[test]
    fn test_popup_escapes_place() {
        let feed = sample();
        let html = popup_html(&feed.features[1]);
        assert!(html.contains("Fiji region &lt;deep&gt;"));
        assert!(html.contains("<p>Magnitude: 2</p>"));
    }

    #[test]
    fn test_popup_missing_values() {
        let feed = sample();
        let html = popup_html(&feed.features[2]);
        assert!(html.contains("Location: Unknown location"));
        assert!(html.contains("<p>Magnitude: unknown</p>"));
        assert!(html.contains("<p>Depth: unknown</p>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a & "b" <c>"#), "a &amp; &quot;b&quot; &lt;c&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
