//! Coordinate transforms applied before geometries are built.

use std::f64::consts::FRAC_PI_4;

/// Earth radius used by spherical web mercator.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of web mercator (the projected map is square).
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_6;

/// Transform from WGS84 lon/lat into the output coordinate system.
pub trait CoordinateTransform {
    /// Project a coordinate, or `None` if it is outside the domain.
    fn transform(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Spatial reference id of the projected coordinates.
    fn srid(&self) -> i32;
}

/// Spherical web mercator (EPSG:3857).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl CoordinateTransform for WebMercator {
    fn transform(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !(-180.0..=180.0).contains(&lon) || !(-MERCATOR_MAX_LAT..=MERCATOR_MAX_LAT).contains(&lat)
        {
            return None;
        }
        let x = EARTH_RADIUS * lon.to_radians();
        let y = EARTH_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        Some((x, y))
    }

    fn srid(&self) -> i32 {
        3857
    }
}

/// Keep WGS84 lon/lat as they are (EPSG:4326).
#[derive(Debug, Clone, Copy, Default)]
pub struct LatLng;

impl CoordinateTransform for LatLng {
    fn transform(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        Some((lon, lat))
    }

    fn srid(&self) -> i32 {
        4326
    }
}

/// Pick the transform for a run.
pub fn transform_for(keep_lat_lng: bool) -> Box<dyn CoordinateTransform> {
    if keep_lat_lng {
        Box::new(LatLng)
    } else {
        Box::new(WebMercator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_origin_and_edges() {
        let (x, y) = WebMercator.transform(0.0, 0.0).unwrap();
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);

        let (x, _) = WebMercator.transform(180.0, 0.0).unwrap();
        assert!((x - 20_037_508.342_789_244).abs() < 1e-6);

        let (_, y) = WebMercator.transform(0.0, MERCATOR_MAX_LAT).unwrap();
        assert!((y - 20_037_508.342_789_244).abs() < 1e-3);
    }

    #[test]
    fn test_mercator_rejects_out_of_domain() {
        assert!(WebMercator.transform(180.1, 0.0).is_none());
        assert!(WebMercator.transform(0.0, 86.0).is_none());
        assert!(WebMercator.transform(0.0, -90.0).is_none());
        assert!(WebMercator.transform(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_lat_lng_passthrough() {
        assert_eq!(LatLng.transform(8.5, 47.3), Some((8.5, 47.3)));
        assert!(LatLng.transform(0.0, 91.0).is_none());
        assert_eq!(transform_for(true).srid(), 4326);
        assert_eq!(transform_for(false).srid(), 3857);
    }
}
