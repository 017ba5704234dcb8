//! Terminal output for styled events and the depth legend.
//!
//! Supports human-readable (with depth colors), JSON, and NDJSON formats.

use std::io::{self, Write};

use serde::Serialize;

use crate::models::Feature;
use crate::style::{LegendEntry, VisualStyle};

// ANSI codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const SWATCH: &str = "●";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// An event with the style the map would give it.
#[derive(Debug, Clone, Serialize)]
pub struct StyledEvent {
    pub id: String,
    pub time: String,
    pub magnitude: Option<f64>,
    pub depth_km: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub place: Option<String>,
    pub url: Option<String>,
    pub style: VisualStyle,
}

impl From<&Feature> for StyledEvent {
    fn from(f: &Feature) -> Self {
        Self {
            id: f.id.clone(),
            time: f
                .time()
                .map_or_else(|| "unknown".into(), |t| t.to_rfc3339()),
            magnitude: f.properties.mag,
            depth_km: f.depth_km(),
            latitude: f.latitude(),
            longitude: f.longitude(),
            place: f.properties.place.clone(),
            url: f.properties.url.clone(),
            style: VisualStyle::for_feature(f),
        }
    }
}

/// Truecolor foreground escape for a `#rrggbb` color. Anything else
/// (named colors) gets no escape.
fn ansi_fg(color: &str) -> String {
    let parse = |range: std::ops::Range<usize>| {
        color
            .get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
    };

    match (color.len(), color.starts_with('#')) {
        (7, true) => match (parse(1..3), parse(3..5), parse(5..7)) {
            (Some(r), Some(g), Some(b)) => format!("\x1b[38;2;{r};{g};{b}m"),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Write events in human-readable format, one line each, with a swatch in
/// the marker's fill color.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, events: &[Feature]) -> io::Result<()> {
    for event in events {
        let style = VisualStyle::for_feature(event);
        let time = event
            .time()
            .map_or_else(|| "unknown".into(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());

        let mag_str = event
            .properties
            .mag
            .map_or_else(|| "?".into(), |m| format!("{m:.1}"));

        let mag_type = event.properties.mag_type.as_deref().unwrap_or("?");

        let depth_str = event
            .depth_km()
            .map_or_else(|| "    ?".into(), |d| format!("{d:>5.0}"));

        let place = event
            .properties
            .place
            .as_deref()
            .unwrap_or("Unknown location");

        let color = ansi_fg(style.fill_color);
        let radius = style.radius;

        writeln!(
            writer,
            "{color}{SWATCH}{RESET} {BOLD}M{mag_str:<4}{RESET} {DIM}{mag_type:<3}{RESET} │ \
             {DIM}{depth_str}km{RESET} │ \
             {DIM}r{radius:>5.1}{RESET} │ \
             {time} UTC │ \
             {place}"
        )?;
    }
    Ok(())
}

/// Write serializable items as one JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, items: &[T]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(items)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write serializable items as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write, T: Serialize>(writer: &mut W, items: &[T]) -> io::Result<()> {
    for item in items {
        let json = serde_json::to_string(item)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<W: Write>(writer: &mut W, events: &[Feature], format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, events),
        Format::Json => write_json(writer, &styled(events)),
        Format::Ndjson => write_ndjson(writer, &styled(events)),
    }
}

fn styled(events: &[Feature]) -> Vec<StyledEvent> {
    events.iter().map(StyledEvent::from).collect()
}

/// Write the depth legend in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_legend<W: Write>(writer: &mut W, legend: &[LegendEntry], format: Format) -> io::Result<()> {
    match format {
        Format::Human => {
            writeln!(writer, "{BOLD}Depth (km){RESET}")?;
            for entry in legend {
                let color = ansi_fg(entry.color);
                writeln!(
                    writer,
                    "{color}██{RESET} {:<8} {DIM}{}{RESET}",
                    entry.label, entry.color
                )?;
            }
            Ok(())
        }
        Format::Json => write_json(writer, legend),
        Format::Ndjson => write_ndjson(writer, legend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureCollection;
    use crate::style::legend_buckets;

    fn sample() -> Vec<Feature> {
        let feed: FeatureCollection =
            serde_json::from_str(include_str!("../tools/sample_all_week.json")).unwrap();
        feed.valid_features().cloned().collect()
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("NDJSON".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_ansi_fg() {
        assert_eq!(ansi_fg("#eecc00"), "\x1b[38;2;238;204;0m");
        assert_eq!(ansi_fg("#000000"), "\x1b[38;2;0;0;0m");
        assert_eq!(ansi_fg("black"), "");
        assert_eq!(ansi_fg("#zzzzzz"), "");
    }

    #[test]
    fn test_human_output() {
        let mut buf = Vec::new();
        write_events(&mut buf, &sample(), Format::Human).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("M4.2"));
        assert!(lines[0].contains("\x1b[38;2;238;204;0m"));
        assert!(lines[2].contains("Unknown location"));
    }

    #[test]
    fn test_ndjson_output() {
        let mut buf = Vec::new();
        write_events(&mut buf, &sample(), Format::Ndjson).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["id"], "us7000abcd");
        assert_eq!(first["style"]["fillColor"], "#eecc00");
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_legend_json() {
        let mut buf = Vec::new();
        write_legend(&mut buf, &legend_buckets(), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value.as_array().unwrap().len(), 6);
        assert_eq!(value[5]["label"], "90+");
        assert_eq!(value[5]["color"], "#ea2c2c");
    }
}
