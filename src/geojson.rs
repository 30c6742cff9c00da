//! GeoJSON rendering of region boundary rings.

use latencyglobe_types::{generate_ring, Provider, Region};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: Polygon,
    pub properties: RegionProperties,
}

/// A polygon with a single outer ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    #[serde(rename = "type")]
    kind: &'static str,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionProperties {
    pub region_id: &'static str,
    pub name: &'static str,
    pub provider: Provider,
    pub radius_km: f64,
}

/// One boundary polygon of `radius_km` per region.
pub fn boundary_collection<'a>(
    regions: impl IntoIterator<Item = &'a Region>,
    radius_km: f64,
    segments: u32,
) -> FeatureCollection {
    let features = regions
        .into_iter()
        .map(|region| {
            let ring = generate_ring(region.coordinates, radius_km, segments);
            Feature {
                kind: "Feature",
                geometry: Polygon {
                    kind: "Polygon",
                    coordinates: vec![ring.positions()],
                },
                properties: RegionProperties {
                    region_id: region.id,
                    name: region.name,
                    provider: region.provider,
                    radius_km,
                },
            }
        })
        .collect();

    FeatureCollection {
        kind: "FeatureCollection",
        features,
    }
}
