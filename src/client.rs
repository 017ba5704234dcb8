//! HTTP client for the earthquake and plate boundary feeds.
//!
//! Provides blocking HTTP access to both `GeoJSON` sources.
//! Uses reqwest with rustls for TLS.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::errors::QuakemapError;
use crate::models::{FeatureCollection, PlateCollection};

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 20;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// PB2002 plate boundaries, as published in `GeoJSON` form.
pub const PLATES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// Available feed types for summary feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedType {
    AllHour,
    AllDay,
    #[default]
    AllWeek,
    AllMonth,
    Mag1Day,
    Mag1Week,
    Mag25Day,
    Mag25Week,
    Mag45Day,
    Mag45Week,
    SignificantWeek,
    SignificantMonth,
}

impl FeedType {
    /// Get the URL path segment for this feed type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllHour => "all_hour",
            Self::AllDay => "all_day",
            Self::AllWeek => "all_week",
            Self::AllMonth => "all_month",
            Self::Mag1Day => "1.0_day",
            Self::Mag1Week => "1.0_week",
            Self::Mag25Day => "2.5_day",
            Self::Mag25Week => "2.5_week",
            Self::Mag45Day => "4.5_day",
            Self::Mag45Week => "4.5_week",
            Self::SignificantWeek => "significant_week",
            Self::SignificantMonth => "significant_month",
        }
    }
}

impl std::str::FromStr for FeedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all_hour" => Ok(Self::AllHour),
            "all_day" => Ok(Self::AllDay),
            "all_week" => Ok(Self::AllWeek),
            "all_month" => Ok(Self::AllMonth),
            "1.0_day" => Ok(Self::Mag1Day),
            "1.0_week" => Ok(Self::Mag1Week),
            "2.5_day" => Ok(Self::Mag25Day),
            "2.5_week" => Ok(Self::Mag25Week),
            "4.5_day" => Ok(Self::Mag45Day),
            "4.5_week" => Ok(Self::Mag45Week),
            "significant_week" => Ok(Self::SignificantWeek),
            "significant_month" => Ok(Self::SignificantMonth),
            _ => Err(format!("unknown feed type: {s}")),
        }
    }
}

/// Where the map gets its two datasets from.
///
/// `layers::load_overlays` only talks to this trait, which keeps the
/// earthquake-then-plates ordering testable offline.
pub trait FeedSource {
    /// Fetch the earthquake summary feed.
    fn earthquakes(&self) -> Result<FeatureCollection, QuakemapError>;

    /// Fetch the plate boundary dataset.
    fn plates(&self) -> Result<PlateCollection, QuakemapError>;
}

/// Upstream locations of the two datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Host serving `/earthquakes/feed/v1.0/summary/{feed}.geojson`
    pub usgs_base_url: String,
    pub plates_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            usgs_base_url: USGS_BASE_URL.to_string(),
            plates_url: PLATES_URL.to_string(),
        }
    }
}

/// Blocking client for USGS and the plate boundary dataset.
pub struct UsgsClient {
    client: Client,
    base_url: String,
    plates_url: String,
    feed: FeedType,
}

impl UsgsClient {
    /// Create a client for the given summary feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(feed: FeedType) -> Result<Self, QuakemapError> {
        Self::with_endpoints(feed, &Endpoints::default())
    }

    /// Create a client that fetches from non-default hosts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_endpoints(feed: FeedType, endpoints: &Endpoints) -> Result<Self, QuakemapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: endpoints.usgs_base_url.trim_end_matches('/').to_string(),
            plates_url: endpoints.plates_url.clone(),
            feed,
        })
    }

    /// Summary feed URL for the configured feed type.
    #[must_use]
    pub fn feed_url(&self) -> String {
        format!(
            "{}/earthquakes/feed/v1.0/summary/{}.geojson",
            self.base_url,
            self.feed.as_str()
        )
    }

    /// Fetch a summary `GeoJSON` feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or response cannot be parsed.
    #[instrument(skip(self), fields(feed = self.feed.as_str()))]
    pub fn fetch_feed(&self) -> Result<FeatureCollection, QuakemapError> {
        let feed: FeatureCollection = self.get_json("USGS", &self.feed_url())?;
        feed.validate()?;

        if let Some(meta) = &feed.metadata {
            debug!(
                "{}: {} events, generated at {}",
                meta.title, meta.count, meta.generated
            );
        }
        debug!("fetched {} events", feed.features.len());
        Ok(feed)
    }

    /// Fetch the plate boundary dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or response cannot be parsed.
    #[instrument(skip(self))]
    pub fn fetch_plates(&self) -> Result<PlateCollection, QuakemapError> {
        let plates: PlateCollection = self.get_json("plate boundary host", &self.plates_url)?;
        plates.validate()?;

        let vertices: usize = plates
            .features
            .iter()
            .map(|b| b.geometry.vertex_count())
            .sum();
        debug!(
            "fetched {} plate boundary segments ({} vertices)",
            plates.features.len(),
            vertices
        );
        Ok(plates)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        source_name: &'static str,
        url: &str,
    ) -> Result<T, QuakemapError> {
        debug!("fetching {}", url);

        let response = self.client.get(url).send()?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuakemapError::Api {
                source_name,
                status: status.as_u16(),
                message: body,
            });
        }

        // Parse from text so decode errors surface as `Parse`, not `Http`.
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl FeedSource for UsgsClient {
    fn earthquakes(&self) -> Result<FeatureCollection, QuakemapError> {
        self.fetch_feed()
    }

    fn plates(&self) -> Result<PlateCollection, QuakemapError> {
        self.fetch_plates()
    }
}
