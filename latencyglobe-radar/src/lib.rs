//! # latencyglobe-radar
//!
//! Adapter between the latency globe and Cloudflare Radar.
//!
//! - [`RadarClient`] fetches latency time series for a country over a
//!   [`TimeRange`](latencyglobe_types::TimeRange) window
//! - [`normalize`] turns whatever shape the API answered with into an ordered
//!   series of [`LatencySample`](latencyglobe_types::LatencySample)s
//! - [`LatencySource`] is the seam the service depends on
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use latencyglobe_radar::{normalize, NormalizeContext};
//! use serde_json::json;
//!
//! let context = NormalizeContext::new(
//!     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap(),
//! );
//!
//! let payload = json!({ "timestamps": ["t1", "t2"], "latencyIdle": [10, 20] });
//! let samples = normalize(&payload, &context);
//!
//! assert_eq!(samples.len(), 2);
//! assert_eq!(samples[1].idle_latency_ms, Some(20.0));
//! ```

pub mod client;
pub mod error;
pub mod normalize;

pub use client::{LatencySource, RadarClient, RadarClientBuilder, DEFAULT_ENDPOINT};
pub use error::RadarError;
pub use normalize::{detect, normalize, NormalizeContext, Shape};
