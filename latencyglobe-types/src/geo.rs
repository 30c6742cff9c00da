//! Geographic points and geodesic boundary rings.

use std::f64::consts::PI;

use crate::EARTH_RADIUS_KM;

/// A (longitude, latitude) pair in degrees.
///
/// Valid points have longitude in [-180, 180] and latitude in [-90, 90].
/// Points come from static configuration, so construction does not check
/// the range; use [`GeoPoint::is_valid`] where input is untrusted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Longitude in degrees.
    pub lng: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl GeoPoint {
    /// Create a point from longitude and latitude (degrees).
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Check the longitude/latitude range invariant.
    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.lng) && (-90.0..=90.0).contains(&self.lat)
    }

    /// `[lng, lat]` as GeoJSON orders positions.
    pub fn to_position(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// A closed ring of points approximating a circle on the Earth's surface.
///
/// The first and last points are identical, which is what polygon renderers
/// (and GeoJSON) expect.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryRing {
    points: Vec<GeoPoint>,
}

impl BoundaryRing {
    /// Number of points, including the closing point.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Whether the first and last points are numerically identical.
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    /// Ring coordinates as GeoJSON positions.
    pub fn positions(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(GeoPoint::to_position).collect()
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }
}

/// Generate a closed ring of `segments + 1` points at `radius_km` around `center`.
///
/// Each point is the spherical destination from `center` along one of
/// `segments` equally spaced bearings in `[0, 2π)`; the bearing-2π point is
/// an exact copy of the first. Zero segments gives an empty ring. Longitudes
/// are wrapped into [-180, 180] so rings crossing the antimeridian stay valid.
///
/// The function never fails. NaN inputs produce NaN coordinates; callers
/// validate `radius_km > 0` and `segments >= 3`.
pub fn generate_ring(center: GeoPoint, radius_km: f64, segments: u32) -> BoundaryRing {
    let lat = center.lat.to_radians();
    let lng = center.lng.to_radians();
    let delta = radius_km / EARTH_RADIUS_KM;

    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_delta, cos_delta) = delta.sin_cos();

    let mut points: Vec<GeoPoint> = (0..segments)
        .map(|i| {
            let bearing = 2.0 * PI * f64::from(i) / f64::from(segments);
            let dest_lat = (sin_lat * cos_delta + cos_lat * sin_delta * bearing.cos()).asin();
            let y = bearing.sin() * sin_delta * cos_lat;
            let x = cos_delta - sin_lat * dest_lat.sin();
            let dest_lng = lng + y.atan2(x);

            GeoPoint::new(wrap_longitude(dest_lng.to_degrees()), dest_lat.to_degrees())
        })
        .collect();

    // Close with an exact copy; bearing 2π only matches up to rounding.
    if let Some(&first) = points.first() {
        points.push(first);
    }

    BoundaryRing { points }
}

/// Wrap a longitude in degrees into [-180, 180).
pub fn wrap_longitude(lng: f64) -> f64 {
    (lng + 540.0).rem_euclid(360.0) - 180.0
}
