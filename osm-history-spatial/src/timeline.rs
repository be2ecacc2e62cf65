//! Validity intervals for one object version.
//!
//! # Ways
//!
//! A visible way version `v` valid from `t_v` until the next version at
//! `t_next` (or forever) is split wherever one of its nodes moved inside
//! `(t_v, t_next)`:
//!
//! ```text
//!   t_v            s1             s2              t_next
//!    |--- v.0 -----|---- v.1 -----|----- v.2 ------|
//!    major          minor 1        minor 2
//! ```
//!
//! Each interval gets the geometry assembled at its own start. Minor
//! intervals are attributed to the editor of the node change.
//!
//! If the next version is older than the current one the pair is out of
//! order; no splitting happens and the major interval simply ends at the
//! next version's timestamp.
//!
//! A deleted version becomes an instantaneous marker (`valid_from ==
//! valid_to`) without geometry. Whether it goes to the line or the area
//! table is decided by assembling the previous version; with no usable
//! previous version the marker is dropped.
//!
//! # Nodes
//!
//! A node version yields a single interval ending at the next version, at
//! its own timestamp if it is a final deletion, or open otherwise.

use crate::assembler::GeometryAssembler;
use crate::diff::Diff;
use crate::geometry::{GeometryError, ProjectedGeometry};
use crate::history::{EditorId, TagList, Timestamp};
use crate::minor::find_splits;
use crate::point_store::PointStore;
use crate::projection::CoordinateTransform;
use crate::sink::OutputClass;
use crate::tags::looks_like_area;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Editor names by id, as first seen in the input.
pub type UserNames = FxHashMap<EditorId, String>;

/// One output row's worth of state.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityInterval<'a> {
    pub id: i64,
    pub version: u32,
    /// 0 for the major interval, counting up for minor ones.
    pub minor: u32,
    pub visible: bool,
    pub uid: EditorId,
    pub user: &'a str,
    pub valid_from: Timestamp,
    /// `None` is open-ended.
    pub valid_to: Option<Timestamp>,
    pub tags: &'a TagList,
    pub geometry: Option<ProjectedGeometry>,
    pub class: OutputClass,
}

/// Intervals for one version plus what was skipped on the way.
#[derive(Debug, Default)]
pub struct Timeline<'a> {
    pub intervals: Vec<ValidityInterval<'a>>,
    /// Intervals dropped because no geometry could be built.
    pub skipped: usize,
}

fn class_of(geom: &ProjectedGeometry) -> OutputClass {
    if geom.is_polygon() {
        OutputClass::Area
    } else {
        OutputClass::Line
    }
}

/// Computes intervals against the current point store.
pub struct VersionTimeline<'a> {
    store: &'a dyn PointStore,
    transform: &'a dyn CoordinateTransform,
    users: &'a UserNames,
}

impl<'a> VersionTimeline<'a> {
    pub fn new(
        store: &'a dyn PointStore,
        transform: &'a dyn CoordinateTransform,
        users: &'a UserNames,
    ) -> Self {
        Self {
            store,
            transform,
            users,
        }
    }

    fn assembler(&self) -> GeometryAssembler<'a> {
        GeometryAssembler::new(self.store, self.transform)
    }

    fn user_name(&self, uid: EditorId) -> &'a str {
        self.users.get(&uid).map(String::as_str).unwrap_or("")
    }

    /// Interval for a node version.
    pub fn node_interval(&self, diff: &Diff<'a>) -> Option<ValidityInterval<'a>> {
        let cur = diff.curr;

        let valid_to = match diff.next {
            Some(next) => Some(next.timestamp),
            None if !cur.visible => Some(cur.timestamp),
            None => None,
        };

        let geometry = if cur.visible {
            let (lon, lat) = cur.location.unwrap_or((0.0, 0.0));
            let Some((x, y)) = self.transform.transform(lon, lat) else {
                debug!(node = cur.id, version = cur.version, lon, lat, "node outside projection domain, skipping");
                return None;
            };
            Some(ProjectedGeometry::point(x, y, self.transform.srid()))
        } else {
            None
        };

        Some(ValidityInterval {
            id: cur.id,
            version: cur.version,
            minor: 0,
            visible: cur.visible,
            uid: cur.uid,
            user: &cur.user,
            valid_from: cur.timestamp,
            valid_to,
            tags: &cur.tags,
            geometry,
            class: OutputClass::Point,
        })
    }

    /// Major and minor intervals for a way version.
    pub fn way_intervals(&self, diff: &Diff<'a>) -> Timeline<'a> {
        let cur = diff.curr;
        if !cur.visible {
            return self.deletion_marker(diff);
        }

        let end = diff.next.map(|n| n.timestamp);
        let splits = match end {
            Some(end) if end < cur.timestamp => {
                warn!(
                    way = cur.id,
                    version = cur.version,
                    next_version = diff.next.map(|n| n.version),
                    "inverse timestamp order between versions, skipping minor ways"
                );
                Vec::new()
            }
            _ => find_splits(self.store, &cur.nodes, cur.timestamp, end),
        };

        let area_like = looks_like_area(&cur.tags);
        let assembler = self.assembler();
        let mut timeline = Timeline::default();

        let starts = std::iter::once((cur.timestamp, cur.uid, cur.user.as_str()))
            .chain(splits.iter().map(|s| (s.timestamp, s.editor, self.user_name(s.editor))));
        let ends = splits.iter().map(|s| Some(s.timestamp)).chain(std::iter::once(end));

        for (minor, ((from, uid, user), valid_to)) in starts.zip(ends).enumerate() {
            debug!(way = cur.id, version = cur.version, minor, t = from, "forging way geometry");
            match assembler.assemble(&cur.nodes, from, area_like) {
                Ok(geom) => timeline.intervals.push(ValidityInterval {
                    id: cur.id,
                    version: cur.version,
                    minor: minor as u32,
                    visible: true,
                    uid,
                    user,
                    valid_from: from,
                    valid_to,
                    tags: &cur.tags,
                    class: class_of(&geom),
                    geometry: Some(geom),
                }),
                Err(e) => {
                    log_skip(cur.id, cur.version, minor, from, &e);
                    timeline.skipped += 1;
                }
            }
        }

        timeline
    }

    fn deletion_marker(&self, diff: &Diff<'a>) -> Timeline<'a> {
        let cur = diff.curr;
        let mut timeline = Timeline::default();

        let Some(prev) = diff.prev else {
            debug!(way = cur.id, version = cur.version, "deleted way has no previous version to classify it, skipping");
            timeline.skipped += 1;
            return timeline;
        };

        let class = match self
            .assembler()
            .assemble(&prev.nodes, prev.timestamp, looks_like_area(&prev.tags))
        {
            Ok(geom) => class_of(&geom),
            Err(e) => {
                debug!(
                    way = cur.id,
                    version = cur.version,
                    prev_version = prev.version,
                    error = %e,
                    "no geometry for previous version of deleted way, skipping"
                );
                timeline.skipped += 1;
                return timeline;
            }
        };

        timeline.intervals.push(ValidityInterval {
            id: cur.id,
            version: cur.version,
            minor: 0,
            visible: false,
            uid: cur.uid,
            user: &cur.user,
            valid_from: cur.timestamp,
            valid_to: Some(cur.timestamp),
            tags: &cur.tags,
            geometry: None,
            class,
        });
        timeline
    }
}

fn log_skip(id: i64, version: u32, minor: usize, t: Timestamp, e: &GeometryError) {
    debug!(way = id, version, minor, t, error = %e, "no valid geometry for way, skipping");
}
