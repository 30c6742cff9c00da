//! # latencyglobe
//!
//! HTTP service behind the latency globe: proxies Cloudflare Radar latency
//! data per cloud region, normalizes it, caches it briefly, and serves it as
//! JSON alongside the static region/exchange catalog and GeoJSON region
//! boundaries.
//!
//! ```text
//!  client ──▶ server ──▶ api ──▶ state ──▶ TtlCache
//!                                  │
//!                                  ▼
//!                           LatencySource (RadarClient)
//!                                  │
//!                                  ▼
//!                             normalize()
//! ```
//!
//! - **[`server`]**: hyper HTTP/1 accept loop and routing
//! - **[`api`]**: one handler per endpoint
//! - **[`state`]**: upstream source, token presence and the history cache
//! - **[`snapshot`]**: latest reading per region, derived from history
//! - **[`geojson`]**: boundary rings rendered as a `FeatureCollection`
//! - **[`config`]**: file + environment configuration
//!
//! ## Embedding
//!
//! ```no_run
//! use std::sync::Arc;
//! use latencyglobe::{serve, AppState, ServiceConfig};
//!
//! # tokio_test::block_on(async {
//! let config = ServiceConfig::load(None).unwrap();
//! let state = Arc::new(AppState::from_config(&config).unwrap());
//! let listener = tokio::net::TcpListener::bind(&config.server.listen_addr)
//!     .await
//!     .unwrap();
//! serve(listener, state).await.unwrap();
//! # });
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod geojson;
pub mod server;
pub mod snapshot;
pub mod state;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use config::ServiceConfig;
pub use error::ApiError;
pub use server::{dispatch, serve};
pub use snapshot::LatencySnapshot;
pub use state::AppState;
