//! Route handlers.
//!
//! Handlers take the parsed query and shared state and return a
//! serializable response or an [`ApiError`]; HTTP plumbing lives in
//! [`crate::server`].

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use futures_util::future::join_all;
use latencyglobe_types::{
    compute_stats, exchanges, region, regions, Exchange, HistoryStats, LatencySample, Region,
    TimeRange,
};
use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::geojson::{boundary_collection, FeatureCollection};
use crate::snapshot::LatencySnapshot;
use crate::state::AppState;

/// Window snapshots are derived from.
pub const SNAPSHOT_RANGE: TimeRange = TimeRange::OneHour;

pub const DEFAULT_BOUNDARY_RADIUS_KM: f64 = 250.0;
pub const DEFAULT_BOUNDARY_SEGMENTS: u32 = 64;
const MAX_BOUNDARY_SEGMENTS: u32 = 1024;

/// Decoded query-string parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: HashMap<String, String>,
}

impl Query {
    /// Parse `a=1&b=2`. Later duplicates win; undecodable pairs are skipped.
    pub fn parse(raw: Option<&str>) -> Self {
        let params = raw
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                Some((decode(key)?, decode(value)?))
            })
            .collect();

        Self { params }
    }

    /// A parameter's value, treating blank as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

fn decode(s: &str) -> Option<String> {
    urlencoding::decode(&s.replace('+', " "))
        .ok()
        .map(|v| v.into_owned())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyResponse {
    pub data: Vec<LatencySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub region_id: &'static str,
    pub range: TimeRange,
    pub points: Vec<LatencySample>,
    pub stats: HistoryStats,
    pub queried_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionsResponse {
    pub regions: &'static [Region],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangesResponse {
    pub exchanges: &'static [Exchange],
}

/// `GET /api/latency?regions=a,b`: latest snapshot per region.
///
/// A region whose upstream fetch fails comes back with null metrics; the
/// batch as a whole still succeeds.
pub async fn latency(state: &AppState, query: &Query) -> Result<LatencyResponse, ApiError> {
    let source = state.source()?;
    let requested = parse_regions(query.get("regions"))?;
    let now = Utc::now();

    let snapshots = requested.into_iter().map(|region| async move {
        match state.region_history(source, region, SNAPSHOT_RANGE, now).await {
            Ok(history) => LatencySnapshot::from_history(region, &history),
            Err(e) => {
                warn!(region = region.id, error = %e, "latency fetch failed");
                LatencySnapshot::unavailable(region)
            }
        }
    });

    Ok(LatencyResponse {
        data: join_all(snapshots).await,
    })
}

/// `GET /api/latency/history?region=<id>&range=<1h|24h|7d|30d>`.
///
/// Upstream failure yields an empty series with null stats.
pub async fn history(state: &AppState, query: &Query) -> Result<HistoryResponse, ApiError> {
    let source = state.source()?;

    let id = query
        .get("region")
        .ok_or(ApiError::MissingParameter("region"))?;
    let region = region(id).ok_or_else(|| ApiError::UnknownRegion(id.to_string()))?;
    let range = match query.get("range") {
        Some(raw) => raw.parse::<TimeRange>()?,
        None => TimeRange::default(),
    };

    let now = Utc::now();
    let points = match state.region_history(source, region, range, now).await {
        Ok(history) => history.to_vec(),
        Err(e) => {
            warn!(region = region.id, %range, error = %e, "history fetch failed");
            Vec::new()
        }
    };

    Ok(HistoryResponse {
        region_id: region.id,
        range,
        stats: compute_stats(&points),
        points,
        queried_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// `GET /api/regions`.
pub fn list_regions() -> RegionsResponse {
    RegionsResponse { regions: regions() }
}

/// `GET /api/exchanges`.
pub fn list_exchanges() -> ExchangesResponse {
    ExchangesResponse {
        exchanges: exchanges(),
    }
}

/// `GET /api/regions/boundaries?radiusKm=250&segments=64[&regions=a,b]`.
pub fn boundaries(query: &Query) -> Result<FeatureCollection, ApiError> {
    let radius_km = match query.get("radiusKm") {
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite() && *r > 0.0)
            .ok_or_else(|| ApiError::InvalidParameter {
                name: "radiusKm",
                reason: format!("expected a positive number of kilometres, got '{raw}'"),
            })?,
        None => DEFAULT_BOUNDARY_RADIUS_KM,
    };

    let segments = match query.get("segments") {
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|s| (3..=MAX_BOUNDARY_SEGMENTS).contains(s))
            .ok_or_else(|| ApiError::InvalidParameter {
                name: "segments",
                reason: format!(
                    "expected an integer between 3 and {MAX_BOUNDARY_SEGMENTS}, got '{raw}'"
                ),
            })?,
        None => DEFAULT_BOUNDARY_SEGMENTS,
    };

    let selected = parse_regions(query.get("regions"))?;
    Ok(boundary_collection(selected, radius_km, segments))
}

/// Resolve a comma-separated id list; absent means every region.
///
/// Order follows the request, duplicates are dropped.
fn parse_regions(raw: Option<&str>) -> Result<Vec<&'static Region>, ApiError> {
    let Some(raw) = raw else {
        return Ok(regions().iter().collect());
    };

    let mut selected: Vec<&'static Region> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        let region = region(id).ok_or_else(|| ApiError::UnknownRegion(id.to_string()))?;
        if !selected.iter().any(|r| r.id == region.id) {
            selected.push(region);
        }
    }

    if selected.is_empty() {
        return Ok(regions().iter().collect());
    }
    Ok(selected)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::DateTime;
    use hyper::StatusCode;
    use latencyglobe_radar::{LatencySource, RadarError};
    use serde_json::{json, Value};

    use crate::cache::{ManualClock, TtlCache};

    /// Canned Radar payloads keyed by location; unknown locations fail.
    #[derive(Debug, Default)]
    pub(crate) struct FakeRadar {
        payloads: HashMap<&'static str, Value>,
        pub(crate) calls: AtomicUsize,
    }

    impl FakeRadar {
        pub(crate) fn with(mut self, location: &'static str, payload: Value) -> Self {
            self.payloads.insert(location, payload);
            self
        }
    }

    #[async_trait]
    impl LatencySource for FakeRadar {
        async fn fetch_history(
            &self,
            location: &str,
            _range: TimeRange,
            _end: DateTime<Utc>,
        ) -> Result<Value, RadarError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.payloads
                .get(location)
                .cloned()
                .ok_or_else(|| RadarError::Http("API returned status 502 Bad Gateway".into()))
        }
    }

    pub(crate) fn radar_series(p50: &[&str]) -> Value {
        let timestamps: Vec<String> = (0..p50.len())
            .map(|i| format!("2024-01-01T00:{:02}:00Z", i * 15))
            .collect();
        json!({
            "success": true,
            "result": { "serie_0": { "timestamps": timestamps, "p50": p50 } }
        })
    }

    pub(crate) fn state_with(radar: Arc<FakeRadar>) -> AppState {
        let clock = Arc::new(ManualClock::new());
        let source: Arc<dyn LatencySource> = radar;
        AppState::new(
            Some(source),
            "CLOUDFLARE_API_TOKEN",
            TtlCache::with_clock(Duration::from_secs(60), clock),
        )
    }

    pub(crate) fn state_without_token() -> AppState {
        AppState::new(
            None,
            "CLOUDFLARE_API_TOKEN",
            TtlCache::new(Duration::from_secs(60)),
        )
    }

    fn query(raw: &str) -> Query {
        Query::parse(Some(raw))
    }

    #[test]
    fn test_query_parsing() {
        let q = query("regions=aws-virginia%2Cgcp-london&range=24h&empty=&flag");
        assert_eq!(q.get("regions"), Some("aws-virginia,gcp-london"));
        assert_eq!(q.get("range"), Some("24h"));
        assert_eq!(q.get("empty"), None);
        assert_eq!(q.get("flag"), None);
        assert_eq!(q.get("missing"), None);

        assert_eq!(Query::parse(None), Query::default());
        assert_eq!(query("name=a+b").get("name"), Some("a b"));
    }

    #[test]
    fn test_parse_regions_variants() {
        assert_eq!(parse_regions(None).unwrap().len(), regions().len());
        assert_eq!(parse_regions(Some(" , ")).unwrap().len(), regions().len());

        let picked = parse_regions(Some("gcp-london, aws-virginia,gcp-london")).unwrap();
        let ids: Vec<_> = picked.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["gcp-london", "aws-virginia"]);

        let err = parse_regions(Some("aws-virginia,moon-base")).unwrap_err();
        assert!(matches!(err, ApiError::UnknownRegion(ref id) if id == "moon-base"));
    }

    #[tokio::test]
    async fn test_history_end_to_end() {
        let radar = Arc::new(FakeRadar::default().with("US", radar_series(&["12", "15"])));
        let state = state_with(radar);

        let response = history(&state, &query("region=aws-virginia&range=24h"))
            .await
            .unwrap();

        assert_eq!(response.region_id, "aws-virginia");
        assert_eq!(response.range, TimeRange::OneDay);
        assert_eq!(response.points.len(), 2);
        assert_eq!(response.stats.avg, Some(13.5));
        assert_eq!(response.stats.min, Some(12.0));
        assert_eq!(response.stats.max, Some(15.0));
        assert_eq!(response.stats.sample_count, 2);
        assert!(DateTime::parse_from_rfc3339(&response.queried_at).is_ok());
    }

    #[tokio::test]
    async fn test_history_defaults_to_one_day() {
        let radar = Arc::new(FakeRadar::default().with("JP", radar_series(&["30"])));
        let response = history(&state_with(radar), &query("region=aws-tokyo"))
            .await
            .unwrap();

        assert_eq!(response.range, TimeRange::OneDay);
    }

    #[tokio::test]
    async fn test_history_rejects_bad_parameters() {
        let state = state_with(Arc::new(FakeRadar::default()));

        let err = history(&state, &query("region=moon-base")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = history(&state, &query("range=24h")).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter("region")));

        let err = history(&state, &query("region=aws-virginia&range=2w"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRange(_)));
    }

    #[tokio::test]
    async fn test_history_upstream_failure_is_empty_not_error() {
        let state = state_with(Arc::new(FakeRadar::default()));

        let response = history(&state, &query("region=aws-virginia")).await.unwrap();

        assert!(response.points.is_empty());
        assert_eq!(response.stats, HistoryStats::empty());
    }

    #[tokio::test]
    async fn test_missing_token_is_fatal() {
        let state = state_without_token();

        let err = latency(&state, &query("regions=aws-virginia")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("CLOUDFLARE_API_TOKEN"));

        let err = history(&state, &query("region=aws-virginia")).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken { .. }));
    }

    #[tokio::test]
    async fn test_latency_keeps_partial_results() {
        // JP answers, US fails.
        let radar = Arc::new(FakeRadar::default().with("JP", radar_series(&["40", "42"])));
        let state = state_with(radar);

        let response = latency(&state, &query("regions=aws-tokyo,aws-virginia"))
            .await
            .unwrap();

        assert_eq!(response.data.len(), 2);

        let tokyo = &response.data[0];
        assert_eq!(tokyo.region_id, "aws-tokyo");
        assert_eq!(tokyo.location, "JP");
        assert_eq!(tokyo.latency_idle, Some(42.0));
        assert_eq!(tokyo.jitter_idle, Some(2.0));
        assert_eq!(tokyo.captured_at.as_deref(), Some("2024-01-01T00:15:00Z"));

        let virginia = &response.data[1];
        assert_eq!(virginia.region_id, "aws-virginia");
        assert_eq!(virginia.latency_idle, None);
        assert_eq!(virginia.captured_at, None);
    }

    #[tokio::test]
    async fn test_latency_unknown_region_is_bad_request() {
        let state = state_with(Arc::new(FakeRadar::default()));
        let err = latency(&state, &query("regions=aws-virginia,nowhere"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_latency_without_filter_covers_catalog() {
        let state = state_with(Arc::new(FakeRadar::default()));
        let response = latency(&state, &Query::default()).await.unwrap();
        assert_eq!(response.data.len(), regions().len());
    }

    #[tokio::test]
    async fn test_repeated_requests_hit_cache() {
        let radar = Arc::new(FakeRadar::default().with("US", radar_series(&["12", "15"])));
        let state = state_with(radar.clone());

        for _ in 0..3 {
            history(&state, &query("region=aws-virginia&range=7d"))
                .await
                .unwrap();
        }
        assert_eq!(radar.calls.load(Ordering::SeqCst), 1);

        // A different window is a different key.
        history(&state, &query("region=aws-virginia&range=30d"))
            .await
            .unwrap();
        assert_eq!(radar.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let radar = Arc::new(FakeRadar::default());
        let state = state_with(radar.clone());

        history(&state, &query("region=aws-virginia")).await.unwrap();
        history(&state, &query("region=aws-virginia")).await.unwrap();

        assert_eq!(radar.calls.load(Ordering::SeqCst), 2);
        assert!(state.cache().is_empty());
    }

    #[test]
    fn test_boundaries_defaults_and_validation() {
        let collection = boundaries(&Query::default()).unwrap();
        assert_eq!(collection.features.len(), regions().len());
        assert_eq!(
            collection.features[0].geometry.coordinates[0].len(),
            DEFAULT_BOUNDARY_SEGMENTS as usize + 1
        );

        let collection = boundaries(&query("radiusKm=50&segments=3&regions=gcp-london")).unwrap();
        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].geometry.coordinates[0].len(), 4);

        for bad in [
            "radiusKm=0",
            "radiusKm=-5",
            "radiusKm=NaN",
            "radiusKm=wide",
            "segments=2",
            "segments=5000",
            "segments=1.5",
            "regions=nowhere",
        ] {
            let err = boundaries(&query(bad)).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{bad}");
        }
    }

    #[test]
    fn test_catalog_listings() {
        assert_eq!(list_regions().regions.len(), regions().len());
        assert_eq!(list_exchanges().exchanges.len(), exchanges().len());
    }
}
