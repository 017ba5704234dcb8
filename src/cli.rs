//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::basemap::Basemap;
use crate::client::FeedType;
use crate::filters::{BBox, EventFilter};
use crate::output::Format;

/// Earthquakes and tectonic plate boundaries on an interactive map.
#[derive(Parser, Debug)]
#[command(name = "quakemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the map web server
    Serve(ServeArgs),

    /// Write the map as a standalone HTML file
    Render(RenderArgs),

    /// Print earthquakes with their marker styles
    List(ListArgs),

    /// Print the depth color legend
    Legend(LegendArgs),
}

/// Earthquake filters shared by several commands.
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Minimum magnitude to show
    #[arg(long)]
    pub min_magnitude: Option<f64>,

    /// Maximum depth in km to show
    #[arg(long)]
    pub max_depth: Option<f64>,

    /// Bounding box filter: minlat,minlon,maxlat,maxlon
    #[arg(long, value_parser = parse_bbox)]
    pub bbox: Option<BBox>,
}

impl From<FilterArgs> for EventFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            min_magnitude: args.min_magnitude,
            max_depth: args.max_depth,
            bbox: args.bbox,
        }
    }
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// USGS summary feed to plot
    #[arg(long, default_value = "all_week", value_parser = parse_feed_type)]
    pub feed: FeedType,

    /// Basemap selected when the page opens
    #[arg(long, default_value = "satellite", value_parser = parse_basemap)]
    pub basemap: Basemap,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Output HTML file
    #[arg(long, short = 'o', default_value = "quakemap.html")]
    pub output: PathBuf,

    /// USGS summary feed to plot
    #[arg(long, default_value = "all_week", value_parser = parse_feed_type)]
    pub feed: FeedType,

    /// Basemap selected when the page opens
    #[arg(long, default_value = "satellite", value_parser = parse_basemap)]
    pub basemap: Basemap,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// USGS summary feed to read
    #[arg(long, default_value = "all_week", value_parser = parse_feed_type)]
    pub feed: FeedType,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `legend` command.
#[derive(Parser, Debug)]
pub struct LegendArgs {
    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Parse a feed type from string.
fn parse_feed_type(s: &str) -> Result<FeedType, String> {
    s.parse()
}

/// Parse a basemap from string.
fn parse_basemap(s: &str) -> Result<Basemap, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse a bounding box from string.
fn parse_bbox(s: &str) -> Result<BBox, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_defaults() {
        let cli = Cli::parse_from(["quakemap", "render"]);
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.output, PathBuf::from("quakemap.html"));
        assert_eq!(args.feed, FeedType::AllWeek);
        assert_eq!(args.basemap, Basemap::Satellite);
        assert!(EventFilter::from(args.filter).is_empty());
    }

    #[test]
    fn test_serve_with_filters() {
        let cli = Cli::parse_from([
            "quakemap",
            "serve",
            "--basemap",
            "outdoors",
            "--min-magnitude",
            "2.5",
            "--bbox",
            "32.5,-124.5,42.0,-114.0",
            "--verbose",
        ]);
        assert!(cli.verbose);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.basemap, Basemap::Outdoors);
        let filter = EventFilter::from(args.filter);
        assert_eq!(filter.min_magnitude, Some(2.5));
        assert!(filter.bbox.is_some());
    }

    #[test]
    fn test_rejects_unknown_basemap() {
        assert!(Cli::try_parse_from(["quakemap", "render", "--basemap", "streets"]).is_err());
    }
}
