//! Latency samples and the statistics derived from them.

/// One latency measurement instant for a region.
///
/// A `None` metric means "unavailable for this instant", which is different
/// from the sample not existing at all.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LatencySample {
    /// ISO-8601 timestamp of the measurement.
    pub timestamp: String,

    /// Round-trip time with no competing traffic, in milliseconds.
    pub idle_latency_ms: Option<f64>,

    /// Round-trip time under saturating load, in milliseconds.
    pub loaded_latency_ms: Option<f64>,

    /// Variability of idle latency, in milliseconds.
    pub jitter_ms: Option<f64>,
}

impl LatencySample {
    /// Create a sample with every metric unavailable.
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            ..Default::default()
        }
    }

    /// Create a sample carrying only an idle latency.
    pub fn idle(timestamp: impl Into<String>, idle_latency_ms: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            idle_latency_ms: Some(idle_latency_ms),
            ..Default::default()
        }
    }

    pub fn with_loaded(mut self, loaded_latency_ms: Option<f64>) -> Self {
        self.loaded_latency_ms = loaded_latency_ms;
        self
    }

    pub fn with_jitter(mut self, jitter_ms: Option<f64>) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    /// Whether no metric is available for this instant.
    pub fn is_blank(&self) -> bool {
        self.idle_latency_ms.is_none()
            && self.loaded_latency_ms.is_none()
            && self.jitter_ms.is_none()
    }
}

/// Summary of the idle latencies in a history window.
///
/// With `sample_count == 0` every other field is `None`; no zeros are
/// invented for an empty window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct HistoryStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub sample_count: usize,
}

impl HistoryStats {
    /// Stats for a window with no usable samples.
    pub const fn empty() -> Self {
        Self {
            min: None,
            max: None,
            avg: None,
            sample_count: 0,
        }
    }
}

/// Reduce the non-null idle latencies of `samples` to min/max/mean/count.
pub fn compute_stats(samples: &[LatencySample]) -> HistoryStats {
    let mut values = samples.iter().filter_map(|s| s.idle_latency_ms);

    let Some(first) = values.next() else {
        return HistoryStats::empty();
    };

    let (mut min, mut max, mut sum, mut count) = (first, first, first, 1usize);
    for v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
        count += 1;
    }

    HistoryStats {
        min: Some(min),
        max: Some(max),
        avg: Some(sum / count as f64),
        sample_count: count,
    }
}

/// Mean absolute difference between consecutive non-null idle latencies.
///
/// Returns `None` with fewer than two idle values.
pub fn idle_jitter(samples: &[LatencySample]) -> Option<f64> {
    let idle: Vec<f64> = samples.iter().filter_map(|s| s.idle_latency_ms).collect();
    if idle.len() < 2 {
        return None;
    }

    let total: f64 = idle.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    Some(total / (idle.len() - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[Option<f64>]) -> Vec<LatencySample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| LatencySample {
                timestamp: format!("2024-01-01T00:{:02}:00Z", i),
                idle_latency_ms: *v,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_stats_over_three_values() {
        let stats = compute_stats(&series(&[Some(10.0), Some(20.0), Some(30.0)]));

        assert_eq!(stats.min, Some(10.0));
        assert_eq!(stats.max, Some(30.0));
        assert_eq!(stats.avg, Some(20.0));
        assert_eq!(stats.sample_count, 3);
    }

    #[test]
    fn test_stats_skip_null_idle_values() {
        let stats = compute_stats(&series(&[Some(10.0), None, Some(30.0), None]));

        assert_eq!(stats.sample_count, 2);
        assert_eq!(stats.avg, Some(20.0));
        assert_eq!(stats.min, Some(10.0));
        assert_eq!(stats.max, Some(30.0));
    }

    #[test]
    fn test_stats_on_empty_input_are_null() {
        assert_eq!(compute_stats(&[]), HistoryStats::empty());
        assert_eq!(compute_stats(&series(&[None, None])), HistoryStats::empty());
    }

    #[test]
    fn test_stats_ignore_loaded_latency() {
        let samples = vec![LatencySample::new("t").with_loaded(Some(99.0))];
        assert_eq!(compute_stats(&samples).sample_count, 0);
    }

    #[test]
    fn test_jitter_is_mean_absolute_step() {
        let samples = series(&[Some(10.0), Some(14.0), None, Some(12.0)]);
        // steps: |14-10| = 4, |12-14| = 2
        assert_eq!(idle_jitter(&samples), Some(3.0));
    }

    #[test]
    fn test_jitter_needs_two_values() {
        assert_eq!(idle_jitter(&series(&[Some(10.0)])), None);
        assert_eq!(idle_jitter(&[]), None);
    }

    #[test]
    fn test_blank_sample() {
        assert!(LatencySample::new("t").is_blank());
        assert!(!LatencySample::idle("t", 1.0).is_blank());
        assert!(!LatencySample::new("t").with_jitter(Some(0.5)).is_blank());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serializes_camel_case_with_nulls() {
        let sample = LatencySample::idle("2024-01-01T00:00:00Z", 12.5);
        let json = serde_json::to_value(&sample).unwrap();

        assert_eq!(json["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(json["idleLatencyMs"], 12.5);
        assert!(json["loadedLatencyMs"].is_null());
        assert!(json["jitterMs"].is_null());

        let stats = serde_json::to_value(HistoryStats::empty()).unwrap();
        assert!(stats["min"].is_null());
        assert_eq!(stats["sampleCount"], 0);
    }
}
