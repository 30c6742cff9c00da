//! Latest-value snapshots derived from a region's recent history.

use latencyglobe_types::{idle_jitter, LatencySample, Region};
use serde::Serialize;

/// The most recent latency reading for one region.
///
/// Every metric is `None` when the region has no data, including when the
/// upstream fetch failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencySnapshot {
    pub region_id: &'static str,
    pub location: &'static str,
    pub latency_idle: Option<f64>,
    pub latency_loaded: Option<f64>,
    pub jitter_idle: Option<f64>,
    pub captured_at: Option<String>,
}

impl LatencySnapshot {
    /// A snapshot with no data.
    pub fn unavailable(region: &Region) -> Self {
        Self {
            region_id: region.id,
            location: region.location,
            latency_idle: None,
            latency_loaded: None,
            jitter_idle: None,
            captured_at: None,
        }
    }

    /// Build from a time-ordered history window.
    ///
    /// The latest sample supplies the readings. Jitter falls back to the
    /// step-to-step variation of idle latency across the window when the
    /// latest sample carries none.
    pub fn from_history(region: &Region, history: &[LatencySample]) -> Self {
        let Some(latest) = history.last() else {
            return Self::unavailable(region);
        };

        Self {
            region_id: region.id,
            location: region.location,
            latency_idle: latest.idle_latency_ms,
            latency_loaded: latest.loaded_latency_ms,
            jitter_idle: latest.jitter_ms.or_else(|| idle_jitter(history)),
            captured_at: Some(latest.timestamp.clone()),
        }
    }
}
