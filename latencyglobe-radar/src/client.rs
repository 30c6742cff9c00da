//! Radar client using the Cloudflare API.
//!
//! Latency history comes from the Radar internet-quality time series
//! (`/radar/quality/iqi/timeseries_groups`), which reports idle latency
//! percentiles per country over a window.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use latencyglobe_radar::{LatencySource, RadarClient};
//! use latencyglobe_types::TimeRange;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RadarClient::builder()
//!         .token(std::env::var("CLOUDFLARE_API_TOKEN")?)
//!         .build()?;
//!
//!     let samples = client.history("US", TimeRange::OneDay, Utc::now()).await?;
//!     println!("{} samples", samples.len());
//!     Ok(())
//! }
//! ```

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use latencyglobe_types::{LatencySample, TimeRange};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::normalize::{normalize, NormalizeContext};
use crate::RadarError;

/// Public Cloudflare API base.
pub const DEFAULT_ENDPOINT: &str = "https://api.cloudflare.com/client/v4";

const HISTORY_PATH: &str = "/radar/quality/iqi/timeseries_groups";

/// Anything that can produce raw latency history for a location.
///
/// The service talks to this trait rather than to [`RadarClient`] directly
/// so request handling can run against canned payloads.
#[async_trait]
pub trait LatencySource: Send + Sync + Debug {
    /// Fetch the raw payload for `location` over the `range` window ending at `end`.
    async fn fetch_history(
        &self,
        location: &str,
        range: TimeRange,
        end: DateTime<Utc>,
    ) -> Result<Value, RadarError>;

    /// Fetch and normalize in one step.
    async fn history(
        &self,
        location: &str,
        range: TimeRange,
        end: DateTime<Utc>,
    ) -> Result<Vec<LatencySample>, RadarError> {
        let payload = self.fetch_history(location, range, end).await?;
        Ok(normalize(&payload, &NormalizeContext::ending_at(end, range)))
    }
}

/// HTTP client for the Radar latency time series.
#[derive(Debug, Clone)]
pub struct RadarClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl RadarClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> RadarClientBuilder {
        RadarClientBuilder::default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn history_url(&self) -> String {
        format!("{}{}", self.endpoint, HISTORY_PATH)
    }

    fn history_query(
        location: &str,
        range: TimeRange,
        end: DateTime<Utc>,
    ) -> Vec<(&'static str, String)> {
        let context = NormalizeContext::ending_at(end, range);
        vec![
            ("metric", "latency".to_string()),
            ("location", location.to_string()),
            ("aggInterval", range.agg_interval().to_string()),
            ("dateStart", query_timestamp(context.range_start)),
            ("dateEnd", query_timestamp(context.range_end)),
            ("format", "json".to_string()),
        ]
    }
}

#[async_trait]
impl LatencySource for RadarClient {
    async fn fetch_history(
        &self,
        location: &str,
        range: TimeRange,
        end: DateTime<Utc>,
    ) -> Result<Value, RadarError> {
        debug!(location, %range, "fetching radar latency history");

        let response = self
            .client
            .get(self.history_url())
            .bearer_auth(&self.token)
            .query(&Self::history_query(location, range, end))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RadarError::Auth(format!("API returned status {}", status)));
        }

        if !status.is_success() {
            return Err(RadarError::Http(format!("API returned status {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RadarError::Parse(e.to_string()))
    }
}

/// Builder for RadarClient.
#[derive(Debug, Default)]
pub struct RadarClientBuilder {
    endpoint: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl RadarClientBuilder {
    /// Set the API base (default: the public Cloudflare API).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the bearer token sent with every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<RadarClient, RadarError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RadarError::Connection(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(RadarClient {
            client,
            endpoint,
            token: self.token.unwrap_or_default(),
        })
    }
}

fn query_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
