//! Static catalog of cloud regions and exchange deployments.
//!
//! Regions are the latency measurement endpoints; exchanges are the globe's
//! markers, each hosted in one region.

use std::fmt;

use crate::GeoPoint;

/// Cloud provider operating a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Provider {
    #[cfg_attr(feature = "serde", serde(rename = "AWS"))]
    Aws,
    #[cfg_attr(feature = "serde", serde(rename = "GCP"))]
    Gcp,
    #[cfg_attr(feature = "serde", serde(rename = "Azure"))]
    Azure,
}

impl Provider {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "AWS",
            Provider::Gcp => "GCP",
            Provider::Azure => "Azure",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cloud data-center location used as a latency measurement endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Region {
    /// Stable identifier used in query strings (e.g. `aws-virginia`).
    pub id: &'static str,
    pub name: &'static str,
    pub provider: Provider,
    /// ISO 3166-1 alpha-2 code the upstream API is queried with.
    pub location: &'static str,
    pub coordinates: GeoPoint,
}

/// Where a cryptocurrency exchange runs its matching engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Exchange {
    pub id: &'static str,
    pub name: &'static str,
    pub coordinates: GeoPoint,
    /// Id of the [`Region`] hosting the exchange.
    pub region_id: &'static str,
}

impl Exchange {
    /// The hosting region, if it is in the catalog.
    pub fn region(&self) -> Option<&'static Region> {
        region(self.region_id)
    }
}

const fn r(
    id: &'static str,
    name: &'static str,
    provider: Provider,
    location: &'static str,
    lng: f64,
    lat: f64,
) -> Region {
    Region {
        id,
        name,
        provider,
        location,
        coordinates: GeoPoint::new(lng, lat),
    }
}

static REGIONS: [Region; 15] = [
    r("aws-virginia", "US East (N. Virginia)", Provider::Aws, "US", -77.4874, 39.0438),
    r("aws-ohio", "US East (Ohio)", Provider::Aws, "US", -82.9988, 39.9612),
    r("aws-oregon", "US West (Oregon)", Provider::Aws, "US", -119.6982, 45.8399),
    r("aws-ireland", "Europe (Ireland)", Provider::Aws, "IE", -6.2603, 53.3498),
    r("aws-frankfurt", "Europe (Frankfurt)", Provider::Aws, "DE", 8.6821, 50.1109),
    r("aws-tokyo", "Asia Pacific (Tokyo)", Provider::Aws, "JP", 139.6917, 35.6895),
    r("aws-singapore", "Asia Pacific (Singapore)", Provider::Aws, "SG", 103.8198, 1.3521),
    r("aws-hongkong", "Asia Pacific (Hong Kong)", Provider::Aws, "HK", 114.1694, 22.3193),
    r("gcp-iowa", "us-central1 (Iowa)", Provider::Gcp, "US", -95.8608, 41.2619),
    r("gcp-london", "europe-west2 (London)", Provider::Gcp, "GB", -0.1276, 51.5072),
    r("gcp-tokyo", "asia-northeast1 (Tokyo)", Provider::Gcp, "JP", 139.6917, 35.6895),
    r("gcp-hongkong", "asia-east2 (Hong Kong)", Provider::Gcp, "HK", 114.1095, 22.3964),
    r("azure-virginia", "East US (Virginia)", Provider::Azure, "US", -78.3889, 36.6681),
    r("azure-amsterdam", "West Europe (Amsterdam)", Provider::Azure, "NL", 4.9041, 52.3676),
    r("azure-seoul", "Korea Central (Seoul)", Provider::Azure, "KR", 126.9780, 37.5665),
];

const fn x(
    id: &'static str,
    name: &'static str,
    lng: f64,
    lat: f64,
    region_id: &'static str,
) -> Exchange {
    Exchange {
        id,
        name,
        coordinates: GeoPoint::new(lng, lat),
        region_id,
    }
}

static EXCHANGES: [Exchange; 8] = [
    x("binance", "Binance", 139.7454, 35.6586, "aws-tokyo"),
    x("coinbase", "Coinbase", -77.4874, 39.0438, "aws-virginia"),
    x("okx", "OKX", 114.1577, 22.2855, "aws-hongkong"),
    x("bybit", "Bybit", 103.8519, 1.2903, "aws-singapore"),
    x("kraken", "Kraken", -0.0877, 51.5136, "gcp-london"),
    x("deribit", "Deribit", 4.8897, 52.3740, "azure-amsterdam"),
    x("bitfinex", "Bitfinex", 8.6724, 50.1155, "aws-frankfurt"),
    x("upbit", "Upbit", 127.0276, 37.4979, "azure-seoul"),
];

/// All catalog regions, in display order.
pub fn regions() -> &'static [Region] {
    &REGIONS
}

/// Look up a region by id.
pub fn region(id: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.id == id)
}

/// All catalog exchanges.
pub fn exchanges() -> &'static [Exchange] {
    &EXCHANGES
}
