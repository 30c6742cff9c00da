//! Shared service state handed to every request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use latencyglobe_radar::{LatencySource, RadarClient, RadarError};
use latencyglobe_types::{LatencySample, Region, TimeRange};
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::config::ServiceConfig;
use crate::error::ApiError;

/// Cached history is keyed per region and window, so one failing region
/// never invalidates the others in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub region_id: &'static str,
    pub range: TimeRange,
}

pub type HistoryCache = TtlCache<CacheKey, Arc<Vec<LatencySample>>>;

/// Everything a request handler needs.
#[derive(Debug)]
pub struct AppState {
    /// `None` when no API token is configured.
    source: Option<Arc<dyn LatencySource>>,
    token_env: String,
    cache: HistoryCache,
}

impl AppState {
    pub fn new(
        source: Option<Arc<dyn LatencySource>>,
        token_env: impl Into<String>,
        cache: HistoryCache,
    ) -> Self {
        Self {
            source,
            token_env: token_env.into(),
            cache,
        }
    }

    /// Build the production state: a Radar client if the token is present.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, RadarError> {
        let source: Option<Arc<dyn LatencySource>> = match config.radar_token() {
            Some(token) => {
                let client = RadarClient::builder()
                    .endpoint(&config.radar.endpoint)
                    .token(token)
                    .timeout(config.radar_timeout())
                    .build()?;
                info!(endpoint = client.endpoint(), "radar client ready");
                let client: Arc<dyn LatencySource> = Arc::new(client);
                Some(client)
            }
            None => {
                warn!(
                    env = %config.radar.token_env,
                    "no Cloudflare API token configured; latency endpoints will answer 500"
                );
                None
            }
        };

        Ok(Self::new(
            source,
            &config.radar.token_env,
            TtlCache::new(config.cache_ttl()),
        ))
    }

    /// The upstream source, or the fatal missing-token error.
    pub fn source(&self) -> Result<&dyn LatencySource, ApiError> {
        self.source.as_deref().ok_or_else(|| ApiError::MissingToken {
            env: self.token_env.clone(),
        })
    }

    pub fn cache(&self) -> &HistoryCache {
        &self.cache
    }

    /// Normalized history for `region`, from cache when fresh.
    ///
    /// Only successful fetches are cached.
    pub async fn region_history(
        &self,
        source: &dyn LatencySource,
        region: &'static Region,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Arc<Vec<LatencySample>>, RadarError> {
        let key = CacheKey {
            region_id: region.id,
            range,
        };

        if let Some(hit) = self.cache.get(&key) {
            debug!(region = region.id, %range, "history cache hit");
            return Ok(hit);
        }

        let samples = Arc::new(source.history(region.location, range, now).await?);
        debug!(
            region = region.id,
            %range,
            samples = samples.len(),
            "history fetched"
        );
        self.cache.insert(key, samples.clone());
        Ok(samples)
    }
}
