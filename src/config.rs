//! Service configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `LATENCYGLOBE_*` environment variables (nested keys use `__`, e.g.
//! `LATENCYGLOBE_CACHE__TTL_SECS=30`).

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "LATENCYGLOBE";

/// Environment variable holding the Radar API token unless configured otherwise.
pub const DEFAULT_TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub radar: RadarConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// API base URL.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Name of the environment variable carrying the bearer token.
    pub token_env: String,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            endpoint: latencyglobe_radar::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 10,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long upstream results may be served stale.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 60 }
    }
}

impl ServiceConfig {
    /// Load configuration from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn radar_timeout(&self) -> Duration {
        Duration::from_secs(self.radar.timeout_secs)
    }

    /// The Radar token from the configured environment variable, if set and non-blank.
    pub fn radar_token(&self) -> Option<String> {
        std::env::var(&self.radar.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use parking_lot::Mutex;

    /// Serializes tests that load `LATENCYGLOBE_*` from the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();

        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.radar.endpoint, "https://api.cloudflare.com/client/v4");
        assert_eq!(config.radar.token_env, "CLOUDFLARE_API_TOKEN");
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.radar_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
listen_addr = "127.0.0.1:9000"

[cache]
ttl_secs = 5
"#
        )
        .unwrap();

        let config = {
            let _env = ENV_LOCK.lock();
            ServiceConfig::load(Some(file.path())).unwrap()
        };

        assert_eq!(config.server.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.cache_ttl(), Duration::from_secs(5));
        // Unset sections keep their defaults.
        assert_eq!(config.radar, RadarConfig::default());
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("latencyglobe.example.toml");
        let _env = ENV_LOCK.lock();
        let config = ServiceConfig::load(Some(&path)).unwrap();

        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[cache]\nttl_secs = 5").unwrap();

        let config = {
            let _env = ENV_LOCK.lock();
            std::env::set_var("LATENCYGLOBE_CACHE__TTL_SECS", "30");
            std::env::set_var("LATENCYGLOBE_SERVER__LISTEN_ADDR", "127.0.0.1:3000");
            let config = ServiceConfig::load(Some(file.path()));
            std::env::remove_var("LATENCYGLOBE_CACHE__TTL_SECS");
            std::env::remove_var("LATENCYGLOBE_SERVER__LISTEN_ADDR");
            config.unwrap()
        };

        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.server.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.radar, RadarConfig::default());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = ServiceConfig::load(Some(Path::new("/nonexistent/latencyglobe.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_token_from_configured_variable() {
        let mut config = ServiceConfig::default();

        config.radar.token_env = "LGTEST_RADAR_TOKEN_SET".to_string();
        std::env::set_var("LGTEST_RADAR_TOKEN_SET", "abc123");
        assert_eq!(config.radar_token(), Some("abc123".to_string()));

        config.radar.token_env = "LGTEST_RADAR_TOKEN_BLANK".to_string();
        std::env::set_var("LGTEST_RADAR_TOKEN_BLANK", "  ");
        assert_eq!(config.radar_token(), None);

        config.radar.token_env = "LGTEST_RADAR_TOKEN_UNSET".to_string();
        assert_eq!(config.radar_token(), None);
    }
}
