//! Geometry construction and serialization.
//!
//! This module provides:
//! - Linestring / polygon construction from projected coordinates
//! - Area and interior point for polygons
//! - EWKT serialization through the `wkt` crate (`SRID=<srid>;<wkt>`, which
//!   PostGIS accepts in COPY input)
//!
//! All geometries carry the SRID of the transform that produced their
//! coordinates.

use geo::{Area, InteriorPoint};
use geo_types::{Coord, Geometry, LineString, Point, Polygon};
use std::str::FromStr;
use thiserror::Error;
use wkt::ToWkt;

/// Why no geometry could be built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Fewer than two coordinates survived resolution and projection.
    #[error("found only {0} valid coordinates")]
    TooFewCoordinates(usize),

    /// Construction rejected the coordinates.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Geometry type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
}

/// A geometry in output coordinates, tagged with its SRID.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedGeometry {
    pub geometry: Geometry<f64>,
    pub srid: i32,
}

impl ProjectedGeometry {
    pub fn point(x: f64, y: f64, srid: i32) -> Self {
        Self {
            geometry: Geometry::Point(Point::new(x, y)),
            srid,
        }
    }

    pub fn geom_type(&self) -> GeometryType {
        match &self.geometry {
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::Point(_) => GeometryType::Point,
            _ => GeometryType::LineString,
        }
    }

    pub fn is_polygon(&self) -> bool {
        self.geom_type() == GeometryType::Polygon
    }

    /// Planar area in output units (zero for non-polygons).
    pub fn area(&self) -> f64 {
        match &self.geometry {
            Geometry::Polygon(p) => p.unsigned_area(),
            _ => 0.0,
        }
    }

    /// A point guaranteed to lie inside the polygon, if one exists.
    pub fn interior_point(&self) -> Option<Point<f64>> {
        match &self.geometry {
            Geometry::Polygon(p) if p.unsigned_area() > 0.0 => p.interior_point(),
            _ => None,
        }
    }

    /// Serialize as EWKT.
    pub fn to_ewkt(&self) -> String {
        format!("SRID={};{}", self.srid, self.geometry.wkt_string())
    }
}

fn check_finite(coords: &[Coord<f64>]) -> Result<(), GeometryError> {
    if coords.iter().all(|c| c.x.is_finite() && c.y.is_finite()) {
        Ok(())
    } else {
        Err(GeometryError::InvalidGeometry("non-finite coordinate".into()))
    }
}

/// Build an open linestring.
pub fn linestring(coords: Vec<Coord<f64>>, srid: i32) -> Result<ProjectedGeometry, GeometryError> {
    if coords.len() < 2 {
        return Err(GeometryError::TooFewCoordinates(coords.len()));
    }
    check_finite(&coords)?;
    Ok(ProjectedGeometry {
        geometry: Geometry::LineString(LineString::new(coords)),
        srid,
    })
}

/// Build a polygon from a closed ring.
///
/// The ring must be closed, have at least four coordinates and at least
/// three distinct ones.
pub fn polygon(coords: Vec<Coord<f64>>, srid: i32) -> Result<ProjectedGeometry, GeometryError> {
    if coords.len() < 4 {
        return Err(GeometryError::InvalidGeometry(format!(
            "ring needs at least 4 coordinates, got {}",
            coords.len()
        )));
    }
    if coords.first() != coords.last() {
        return Err(GeometryError::InvalidGeometry("ring is not closed".into()));
    }
    check_finite(&coords)?;

    let mut distinct: Vec<Coord<f64>> = Vec::with_capacity(3);
    for c in &coords {
        if !distinct.contains(c) {
            distinct.push(*c);
            if distinct.len() == 3 {
                break;
            }
        }
    }
    if distinct.len() < 3 {
        return Err(GeometryError::InvalidGeometry(
            "ring has fewer than 3 distinct coordinates".into(),
        ));
    }

    Ok(ProjectedGeometry {
        geometry: Geometry::Polygon(Polygon::new(LineString::new(coords), Vec::new())),
        srid,
    })
}

/// Parse `SRID=<srid>;<wkt>` text.
pub fn parse_ewkt(text: &str) -> Result<ProjectedGeometry, GeometryError> {
    let (head, body) = text
        .split_once(';')
        .ok_or_else(|| GeometryError::InvalidGeometry("missing SRID prefix".into()))?;
    let srid = head
        .strip_prefix("SRID=")
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or_else(|| GeometryError::InvalidGeometry(format!("bad SRID prefix '{head}'")))?;
    let geometry = wkt::Wkt::from_str(body)
        .map_err(|e| GeometryError::InvalidGeometry(format!("{:?}", e)))
        .and_then(|w| {
            w.try_into()
                .map_err(|e: wkt::conversion::Error| GeometryError::InvalidGeometry(format!("{:?}", e)))
        })?;
    Ok(ProjectedGeometry { geometry, srid })
}
