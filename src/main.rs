//! quakemap - Earthquakes and tectonic plate boundaries on an interactive map.
//!
//! Fetches the USGS earthquake feed and the PB2002 plate boundaries, styles
//! every quake by depth and magnitude, and hands the result to a Leaflet
//! page, either served live or written out as a standalone file.

use std::cmp::Reverse;
use std::fs;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

mod basemap;
mod cli;
mod client;
mod errors;
mod filters;
mod layers;
mod models;
mod output;
mod page;
mod popup;
mod server;
mod style;

use cli::{Cli, Command};
use client::UsgsClient;
use filters::EventFilter;
use layers::{MapDocument, MapOptions};
use models::Feature;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Render(args) => cmd_render(args),
        Command::List(args) => cmd_list(args),
        Command::Legend(args) => cmd_legend(&args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `render` command - write a standalone map page.
fn cmd_render(args: cli::RenderArgs) -> Result<()> {
    let client = UsgsClient::new(args.feed).context("failed to create feed client")?;

    let options = MapOptions {
        basemap: args.basemap,
        filter: args.filter.into(),
    };
    let doc = MapDocument::load(&client, &options);

    let html = page::standalone_html(&doc).context("failed to serialize map document")?;
    fs::write(&args.output, html)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    if doc.earthquakes.is_empty() {
        tracing::warn!("map has no earthquakes to show");
    }
    tracing::info!(
        "wrote {} ({} earthquakes, {} fault line segments)",
        args.output.display(),
        doc.earthquakes.len(),
        doc.fault_lines.overlay.len()
    );
    for notice in &doc.notices {
        tracing::warn!("{}", notice);
    }

    Ok(())
}

/// Execute the `list` command - print styled events.
fn cmd_list(args: cli::ListArgs) -> Result<()> {
    let client = UsgsClient::new(args.feed).context("failed to create feed client")?;

    let feed = client
        .fetch_feed()
        .context("failed to fetch earthquake feed")?;

    let filter: EventFilter = args.filter.into();
    if !filter.is_empty() {
        tracing::debug!("filtering with {:?}", filter);
    }

    let mut events: Vec<&Feature> = feed
        .valid_features()
        .filter(|e| filter.matches(e))
        .collect();

    // Most recent first
    events.sort_by_key(|e| Reverse(e.properties.time));
    events.truncate(args.limit);

    let events: Vec<Feature> = events.into_iter().cloned().collect();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_events(&mut handle, &events, args.format)?;

    Ok(())
}

/// Execute the `legend` command.
fn cmd_legend(args: &cli::LegendArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_legend(&mut handle, &style::legend_buckets(), args.format)?;
    Ok(())
}

/// Execute the `serve` command - start the web server.
fn cmd_serve(args: cli::ServeArgs) -> Result<()> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        feed_type: args.feed,
        endpoints: client::Endpoints::default(),
        map: MapOptions {
            basemap: args.basemap,
            filter: args.filter.into(),
        },
    };

    // Print startup message
    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m🌍 quakemap\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Feed:    {}", args.feed.as_str());
    println!("  Basemap: {}", args.basemap.name());
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    // Run the async server on tokio runtime
    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config))
}
