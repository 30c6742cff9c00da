//! Normalization of Radar latency payloads into [`LatencySample`] series.
//!
//! The Radar API has answered latency queries in several shapes over time.
//! Each shape has its own detector; [`normalize`] unwraps the response
//! envelope and hands the body to the detectors in priority order. The
//! first detector that recognizes the body decides the result, even when it
//! yields no usable samples.
//!
//! | Shape | Looks like |
//! |---|---|
//! | [`Shape::Entries`] | `[{ "dimensions": { "datetime": .. }, "metrics": { .. } }]` |
//! | [`Shape::ParallelArrays`] | `{ "timestamps": [..], "latencyIdle": [..] }` |
//! | [`Shape::Histogram`] | `{ "buckets": ["0-10ms", ..] }`, no timestamps |
//!
//! Nothing here fails: a payload no detector recognizes normalizes to an
//! empty series.

use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use latencyglobe_types::{LatencySample, TimeRange};
use regex::Regex;
use serde_json::Value;

/// Idle latency field names, highest priority first.
const IDLE_ALIASES: &[&str] = &["latencyIdle", "latency_idle", "p50", "values"];
const LOADED_ALIASES: &[&str] = &["latencyLoaded", "latency_loaded", "p75"];
const JITTER_ALIASES: &[&str] = &["jitterIdle", "jitter_idle", "jitter"];

/// Keys that may hold an array of per-timestamp entries.
const ENTRY_KEYS: &[&str] = &["entries", "data", "points", "serie"];
/// Keys that may hold histogram buckets.
const HISTOGRAM_KEYS: &[&str] = &["buckets", "values", "data"];
/// Fields of a bucket object carrying its value directly.
const BUCKET_VALUE_KEYS: &[&str] = &["value", "latency", "p50"];
/// Fields of a bucket object carrying a free-text label.
const BUCKET_LABEL_KEYS: &[&str] = &["label", "bucket"];

/// Epoch values above this are milliseconds rather than seconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid regex"));

/// The window a payload describes, used to place histogram buckets in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeContext {
    pub range_start: DateTime<Utc>,
    pub range_end: DateTime<Utc>,
}

impl NormalizeContext {
    pub fn new(range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> Self {
        Self {
            range_start,
            range_end,
        }
    }

    /// The `range` window ending at `end`.
    pub fn ending_at(end: DateTime<Utc>, range: TimeRange) -> Self {
        let span = TimeDelta::from_std(range.duration()).unwrap_or(TimeDelta::zero());
        Self::new(end - span, end)
    }

    /// `count` timestamps spread linearly over the window.
    ///
    /// A single timestamp sits at the end of the window.
    fn spread(&self, count: usize) -> Vec<String> {
        match count {
            0 => Vec::new(),
            1 => vec![format_timestamp(self.range_end)],
            _ => {
                let span_ms = (self.range_end - self.range_start).num_milliseconds() as f64;
                let last = (count - 1) as f64;
                (0..count)
                    .map(|i| {
                        let offset = (span_ms * i as f64 / last).round() as i64;
                        format_timestamp(self.range_start + TimeDelta::milliseconds(offset))
                    })
                    .collect()
            }
        }
    }
}

/// The payload shapes the normalizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Array of per-timestamp objects with `dimensions.datetime` and `metrics`.
    Entries,
    /// Shared `timestamps` array plus one array per metric.
    ParallelArrays,
    /// Buckets without timestamps; time is synthesized from the context.
    Histogram,
}

type Detector = fn(&Value, &NormalizeContext) -> Option<Vec<LatencySample>>;

/// Detectors in priority order.
const DETECTORS: [(Shape, Detector); 3] = [
    (Shape::Entries, detect_entries),
    (Shape::ParallelArrays, detect_parallel_arrays),
    (Shape::Histogram, detect_histogram),
];

/// Normalize a Radar payload into samples ordered by timestamp.
pub fn normalize(payload: &Value, context: &NormalizeContext) -> Vec<LatencySample> {
    detect(payload, context)
        .map(|(_, samples)| samples)
        .unwrap_or_default()
}

/// Like [`normalize`], also reporting which shape matched.
///
/// `None` when no shape matched or the matching shape had no usable samples.
pub fn detect(
    payload: &Value,
    context: &NormalizeContext,
) -> Option<(Shape, Vec<LatencySample>)> {
    let body = unwrap_envelope(payload);

    let (shape, samples) = DETECTORS
        .iter()
        .find_map(|(shape, detector)| Some((*shape, detector(body, context)?)))?;

    if samples.is_empty() {
        return None;
    }
    Some((shape, sort_by_time(samples)))
}

/// Strip `{ result: { serie_0: .. } }` wrapping down to the series body.
fn unwrap_envelope(payload: &Value) -> &Value {
    let body = payload.get("result").unwrap_or(payload);

    let Some(object) = body.as_object() else {
        return body;
    };

    object
        .iter()
        .find(|(key, value)| key.starts_with("serie_") && value.is_object())
        .map(|(_, value)| value)
        .or_else(|| object.get("serie").filter(|v| v.is_object()))
        .unwrap_or(body)
}

fn detect_entries(body: &Value, _context: &NormalizeContext) -> Option<Vec<LatencySample>> {
    let items = body
        .as_array()
        .or_else(|| ENTRY_KEYS.iter().find_map(|key| body.get(*key)?.as_array()))?;

    let looks_like_entries = items
        .iter()
        .any(|item| item.get("dimensions").is_some() || item.get("metrics").is_some());
    if !looks_like_entries {
        return None;
    }

    Some(items.iter().filter_map(entry_sample).collect())
}

fn entry_sample(item: &Value) -> Option<LatencySample> {
    let timestamp = item
        .pointer("/dimensions/datetime")
        .or_else(|| item.get("datetime"))
        .or_else(|| item.get("timestamp"))
        .and_then(timestamp_string)?;

    let metrics = item.get("metrics").filter(|m| m.is_object()).unwrap_or(item);

    Some(LatencySample {
        timestamp,
        idle_latency_ms: scalar_alias(metrics, IDLE_ALIASES),
        loaded_latency_ms: scalar_alias(metrics, LOADED_ALIASES),
        jitter_ms: scalar_alias(metrics, JITTER_ALIASES),
    })
}

fn detect_parallel_arrays(
    body: &Value,
    _context: &NormalizeContext,
) -> Option<Vec<LatencySample>> {
    let timestamps = body.get("timestamps")?.as_array()?;

    let idle = array_alias(body, IDLE_ALIASES);
    let loaded = array_alias(body, LOADED_ALIASES);
    let jitter = array_alias(body, JITTER_ALIASES);
    if idle.is_none() && loaded.is_none() && jitter.is_none() {
        return None;
    }

    let at = |series: Option<&Vec<Value>>, i: usize| series?.get(i).and_then(parse_number);

    Some(
        timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, ts)| {
                Some(LatencySample {
                    timestamp: timestamp_string(ts)?,
                    idle_latency_ms: at(idle, i),
                    loaded_latency_ms: at(loaded, i),
                    jitter_ms: at(jitter, i),
                })
            })
            .collect(),
    )
}

fn detect_histogram(body: &Value, context: &NormalizeContext) -> Option<Vec<LatencySample>> {
    let buckets = body
        .as_array()
        .or_else(|| HISTOGRAM_KEYS.iter().find_map(|key| body.get(*key)?.as_array()))?;

    Some(
        buckets
            .iter()
            .zip(context.spread(buckets.len()))
            .map(|(bucket, timestamp)| LatencySample {
                timestamp,
                idle_latency_ms: bucket_value(bucket),
                ..Default::default()
            })
            .collect(),
    )
}

fn bucket_value(bucket: &Value) -> Option<f64> {
    match bucket {
        Value::Number(_) => parse_number(bucket),
        Value::String(label) => parse_number(bucket).or_else(|| first_numeric_token(label)),
        Value::Object(_) => BUCKET_VALUE_KEYS
            .iter()
            .find_map(|key| bucket.get(*key).and_then(parse_number))
            .or_else(|| {
                BUCKET_LABEL_KEYS
                    .iter()
                    .find_map(|key| bucket.get(*key).and_then(bucket_value))
            }),
        _ => None,
    }
}

fn scalar_alias(object: &Value, aliases: &[&str]) -> Option<f64> {
    aliases
        .iter()
        .find_map(|key| object.get(*key).and_then(parse_number))
}

fn array_alias<'a>(object: &'a Value, aliases: &[&str]) -> Option<&'a Vec<Value>> {
    aliases.iter().find_map(|key| object.get(*key)?.as_array())
}

/// A finite number from a JSON number or a numeric string.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// The first number embedded in free text, e.g. `12.5` in `"12.5-25ms"`.
pub fn first_numeric_token(text: &str) -> Option<f64> {
    NUMERIC_TOKEN
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn timestamp_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(_) => {
            let epoch = parse_number(value)?;
            let millis = if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
                epoch
            } else {
                epoch * 1000.0
            };
            DateTime::from_timestamp_millis(millis.round() as i64).map(format_timestamp)
        }
        _ => None,
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Sort by time when every timestamp is RFC 3339; otherwise keep upstream order.
fn sort_by_time(samples: Vec<LatencySample>) -> Vec<LatencySample> {
    let parsed: Option<Vec<DateTime<Utc>>> = samples
        .iter()
        .map(|s| {
            DateTime::parse_from_rfc3339(&s.timestamp)
                .ok()
                .map(|t| t.with_timezone(&Utc))
        })
        .collect();

    let Some(times) = parsed else {
        return samples;
    };

    let mut keyed: Vec<_> = times.into_iter().zip(samples).collect();
    keyed.sort_by_key(|(t, _)| *t);
    keyed.into_iter().map(|(_, s)| s).collect()
}
