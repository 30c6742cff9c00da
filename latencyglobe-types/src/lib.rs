//! # latencyglobe-types
//!
//! Core types shared by the latency globe service and its upstream adapter.
//!
//! ## Contents
//!
//! - **Geometry**: [`GeoPoint`], [`BoundaryRing`] and [`generate_ring`], which
//!   rasterizes a radius-bounded circle on the Earth's surface for drawing
//!   region boundaries
//! - **Latency**: [`LatencySample`], [`HistoryStats`] and [`compute_stats`]
//! - **Time windows**: [`TimeRange`] (`1h`, `24h`, `7d`, `30d`)
//! - **Catalog**: the static [`Region`] and [`Exchange`] lists the globe draws
//!
//! ## Features
//!
//! - `serde`: JSON serialization via serde, using the camelCase field names
//!   the globe frontend expects
//!
//! ## Example
//!
//! ```rust
//! use latencyglobe_types::{compute_stats, generate_ring, GeoPoint, LatencySample};
//!
//! let ring = generate_ring(GeoPoint::new(-77.45, 38.95), 250.0, 64);
//! assert_eq!(ring.len(), 65);
//! assert!(ring.is_closed());
//!
//! let samples = vec![
//!     LatencySample::idle("2024-01-01T00:00:00Z", 12.0),
//!     LatencySample::idle("2024-01-01T00:15:00Z", 15.0),
//! ];
//! let stats = compute_stats(&samples);
//! assert_eq!(stats.avg, Some(13.5));
//! ```

mod catalog;
mod geo;
mod range;
mod sample;

pub use catalog::*;
pub use geo::*;
pub use range::*;
pub use sample::*;

/// Mean Earth radius in kilometres, treating the Earth as a sphere.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
