//! History windows accepted by the latency endpoints.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// A history window ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeRange {
    #[cfg_attr(feature = "serde", serde(rename = "1h"))]
    OneHour,
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "24h"))]
    OneDay,
    #[cfg_attr(feature = "serde", serde(rename = "7d"))]
    SevenDays,
    #[cfg_attr(feature = "serde", serde(rename = "30d"))]
    ThirtyDays,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::OneHour,
        TimeRange::OneDay,
        TimeRange::SevenDays,
        TimeRange::ThirtyDays,
    ];

    /// The query-string form (`1h`, `24h`, `7d`, `30d`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneHour => "1h",
            TimeRange::OneDay => "24h",
            TimeRange::SevenDays => "7d",
            TimeRange::ThirtyDays => "30d",
        }
    }

    /// Length of the window.
    pub const fn duration(&self) -> Duration {
        const HOUR: u64 = 3600;
        match self {
            TimeRange::OneHour => Duration::from_secs(HOUR),
            TimeRange::OneDay => Duration::from_secs(24 * HOUR),
            TimeRange::SevenDays => Duration::from_secs(7 * 24 * HOUR),
            TimeRange::ThirtyDays => Duration::from_secs(30 * 24 * HOUR),
        }
    }

    /// Aggregation interval to request from the upstream time-series API.
    pub const fn agg_interval(&self) -> &'static str {
        match self {
            TimeRange::OneHour => "15m",
            TimeRange::OneDay | TimeRange::SevenDays => "1h",
            TimeRange::ThirtyDays => "1d",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A range string outside `1h | 24h | 7d | 30d`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown range '{0}', expected one of 1h, 24h, 7d, 30d")]
pub struct RangeParseError(pub String);

impl FromStr for TimeRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| RangeParseError(s.to_string()))
    }
}
