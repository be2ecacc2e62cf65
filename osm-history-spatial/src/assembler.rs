//! Way geometry assembly at a point in time.

use crate::geometry::{linestring, polygon, GeometryError, ProjectedGeometry};
use crate::history::Timestamp;
use crate::point_store::PointStore;
use crate::projection::CoordinateTransform;
use geo_types::Coord;
use tracing::debug;

/// Builds way geometries from the point store.
///
/// Missing nodes are expected (clipped extracts reference nodes outside the
/// extract) and are skipped, as are nodes the transform rejects. Whatever
/// goes wrong, the caller gets a [`GeometryError`] and moves on.
#[derive(Clone, Copy)]
pub struct GeometryAssembler<'a> {
    store: &'a dyn PointStore,
    transform: &'a dyn CoordinateTransform,
}

impl<'a> GeometryAssembler<'a> {
    pub fn new(store: &'a dyn PointStore, transform: &'a dyn CoordinateTransform) -> Self {
        Self { store, transform }
    }

    /// Assemble the geometry of `nodes` as of `timestamp`.
    ///
    /// With `looks_like_area`, a closed sequence of at least four coordinates
    /// becomes a polygon; anything else becomes a linestring.
    pub fn assemble(
        &self,
        nodes: &[i64],
        timestamp: Timestamp,
        looks_like_area: bool,
    ) -> Result<ProjectedGeometry, GeometryError> {
        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(nodes.len());

        for &id in nodes {
            let Some(resolved) = self.store.position_at(id, timestamp) else {
                continue;
            };
            let v = resolved.version();
            match self.transform.transform(v.lon, v.lat) {
                Some((x, y)) => coords.push(Coord { x, y }),
                None => {
                    debug!(node = id, lon = v.lon, lat = v.lat, "coordinate outside projection domain, skipping node");
                }
            }
        }

        if coords.len() < 2 {
            return Err(GeometryError::TooFewCoordinates(coords.len()));
        }

        let srid = self.transform.srid();
        if looks_like_area && coords.len() >= 4 && coords.first() == coords.last() {
            polygon(coords, srid)
        } else {
            linestring(coords, srid)
        }
    }
}
