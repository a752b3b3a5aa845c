//! Plot lookups against the OMDb API.
//!
//! Every matched title costs exactly one `GET ?i=<id>&apikey=<key>` round
//! trip. There is no cache and no retry; callers going through
//! [`PlotLookup`] only ever see a plot string, empty when anything failed.

use std::future::Future;
use std::time::Duration;

use plotsift_shared::{OmdbConfig, PlotsiftError, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

/// User-Agent string for lookup requests.
const USER_AGENT: &str = concat!("plotsift/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// PlotLookup
// ---------------------------------------------------------------------------

/// Source of plot summaries keyed by IMDb identifier.
///
/// Implementations never fail: errors degrade to an empty string.
pub trait PlotLookup: Send + Sync + 'static {
    /// Fetch the plot for `id`, or `""` if none could be obtained.
    fn plot(&self, id: &str) -> impl Future<Output = String> + Send;
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Settings for building an [`OmdbClient`].
#[derive(Debug, Clone)]
pub struct OmdbOptions {
    /// Endpoint the `i` and `apikey` query parameters are appended to.
    pub base_url: String,
    /// OMDb API key.
    pub api_key: String,
    /// Transport timeout in seconds; `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
}

impl OmdbOptions {
    /// Combine the `[omdb]` config section with a resolved API key.
    pub fn from_config(config: &OmdbConfig, api_key: impl Into<String>) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: api_key.into(),
            timeout_secs: config.timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// OmdbClient
// ---------------------------------------------------------------------------

/// The subset of the OMDb response we read.
#[derive(Debug, Deserialize)]
struct PlotResponse {
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Plot", default)]
    plot: Option<String>,
}

/// HTTP client for the OMDb title endpoint. Cheap to share behind an `Arc`.
pub struct OmdbClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl OmdbClient {
    /// Build a client with a single pooled connection set.
    pub fn new(opts: &OmdbOptions) -> Result<Self> {
        let endpoint = Url::parse(&opts.base_url).map_err(|e| {
            PlotsiftError::config(format!("invalid OMDb base URL '{}': {e}", opts.base_url))
        })?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = opts.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| PlotsiftError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: opts.api_key.clone(),
        })
    }

    /// Fetch the plot for `id`, surfacing every failure.
    ///
    /// A response without a `Plot` field is not an error and yields `""`.
    #[instrument(skip(self))]
    pub async fn fetch_plot(&self, id: &str) -> Result<String> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("i", id), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| PlotsiftError::Network(format!("{id}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlotsiftError::Network(format!("{id}: HTTP {status}")));
        }

        let body: PlotResponse = response
            .json()
            .await
            .map_err(|e| PlotsiftError::decode(format!("{id}: {e}")))?;

        debug!(title = body.title.as_deref().unwrap_or(""), "plot fetched");
        Ok(body.plot.unwrap_or_default())
    }
}

impl PlotLookup for OmdbClient {
    async fn plot(&self, id: &str) -> String {
        match self.fetch_plot(id).await {
            Ok(plot) => plot,
            Err(e) => {
                warn!(id, error = %e, "plot lookup failed, using empty plot");
                String::new()
            }
        }
    }
}
