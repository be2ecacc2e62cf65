//! Time-indexed point position store.
//!
//! Every visible node version read from the input is recorded here, keyed by
//! node id and then by timestamp. Ways are assembled later against this
//! store, at arbitrary points in time, so nothing is ever evicted.
//!
//! # Backings
//!
//! The store is the dominant memory consumer of an import, so two backings
//! with different space/time trade-offs are provided:
//!
//! - [`DensePointStore`]: hash map keyed by node id. Faster, larger.
//! - [`SparsePointStore`]: B-tree keyed by node id. Slower, smaller.
//!
//! Both keep each node's history as a vector sorted by timestamp and answer
//! queries identically.
//!
//! # Resolution semantics
//!
//! `position_at(id, t)` returns the version with the greatest timestamp
//! `<= t`. If every recorded version is newer than `t` the earliest one is
//! returned as [`Resolution::Predated`]: the way references a node state the
//! input never contained, which only happens in inconsistent extracts.

use crate::history::{EditorId, Timestamp};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One recorded position of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointVersion {
    pub timestamp: Timestamp,
    pub lon: f64,
    pub lat: f64,
    pub editor: EditorId,
}

/// Result of a point-in-time lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Latest version at or before the query time.
    Exact(PointVersion),
    /// The query predates all history; this is the earliest known version.
    Predated(PointVersion),
}

impl Resolution {
    pub fn version(&self) -> &PointVersion {
        match self {
            Resolution::Exact(v) | Resolution::Predated(v) => v,
        }
    }

    pub fn is_predated(&self) -> bool {
        matches!(self, Resolution::Predated(_))
    }
}

/// Which backing to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    #[serde(alias = "stl")]
    Dense,
    Sparse,
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dense" | "stl" => Ok(StoreKind::Dense),
            "sparse" => Ok(StoreKind::Sparse),
            other => Err(format!("unknown point store '{other}' (expected dense or sparse)")),
        }
    }
}

/// Point position store interface.
pub trait PointStore {
    /// Record a position. Out-of-order timestamps are inserted in place; a
    /// timestamp already recorded for the point is a logic error and is
    /// ignored in release builds.
    fn record(&mut self, id: i64, editor: EditorId, timestamp: Timestamp, lon: f64, lat: f64);

    /// Full history of a point, oldest first.
    fn history(&self, id: i64) -> Option<&[PointVersion]>;

    /// Number of distinct points recorded.
    fn len(&self) -> usize;

    /// Total number of versions recorded.
    fn version_count(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Version of a point valid at `timestamp`.
    fn position_at(&self, id: i64, timestamp: Timestamp) -> Option<Resolution> {
        let Some(series) = self.history(id) else {
            debug!(node = id, "no history for node, skipping");
            return None;
        };
        resolve(series, timestamp).inspect(|r| {
            if r.is_predated() {
                warn!(
                    node = id,
                    t = timestamp,
                    first = r.version().timestamp,
                    "reference predates the oldest version of node, using first version"
                );
            }
        })
    }
}

/// Build the configured backing.
pub fn new_store(kind: StoreKind) -> Box<dyn PointStore> {
    match kind {
        StoreKind::Dense => Box::new(DensePointStore::default()),
        StoreKind::Sparse => Box::new(SparsePointStore::default()),
    }
}

fn resolve(series: &[PointVersion], timestamp: Timestamp) -> Option<Resolution> {
    let first = series.first()?;
    let idx = series.partition_point(|v| v.timestamp <= timestamp);
    if idx == 0 {
        Some(Resolution::Predated(*first))
    } else {
        Some(Resolution::Exact(series[idx - 1]))
    }
}

fn append(series: &mut Vec<PointVersion>, version: PointVersion) -> bool {
    let idx = series.partition_point(|v| v.timestamp < version.timestamp);
    let duplicate = series
        .get(idx)
        .is_some_and(|v| v.timestamp == version.timestamp);
    debug_assert!(
        !duplicate,
        "duplicate timestamp {} recorded for node",
        version.timestamp
    );
    if duplicate {
        return false;
    }
    series.insert(idx, version);
    true
}

/// Hash-indexed store.
#[derive(Debug, Default)]
pub struct DensePointStore {
    points: FxHashMap<i64, Vec<PointVersion>>,
    versions: u64,
}

impl PointStore for DensePointStore {
    fn record(&mut self, id: i64, editor: EditorId, timestamp: Timestamp, lon: f64, lat: f64) {
        let series = self.points.entry(id).or_default();
        let version = PointVersion { timestamp, lon, lat, editor };
        if append(series, version) {
            self.versions += 1;
        }
    }

    fn history(&self, id: i64) -> Option<&[PointVersion]> {
        self.points.get(&id).map(Vec::as_slice)
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn version_count(&self) -> u64 {
        self.versions
    }
}

/// B-tree-indexed store.
///
/// Node histories are usually one or two versions long, so each series is
/// shrunk to fit once the next point id shows up (input is sorted by id).
#[derive(Debug, Default)]
pub struct SparsePointStore {
    points: BTreeMap<i64, Vec<PointVersion>>,
    last_id: Option<i64>,
    versions: u64,
}

impl PointStore for SparsePointStore {
    fn record(&mut self, id: i64, editor: EditorId, timestamp: Timestamp, lon: f64, lat: f64) {
        if let Some(prev) = self.last_id.filter(|&prev| prev != id) {
            if let Some(series) = self.points.get_mut(&prev) {
                series.shrink_to_fit();
            }
        }
        self.last_id = Some(id);

        let series = self.points.entry(id).or_insert_with(|| Vec::with_capacity(1));
        let version = PointVersion { timestamp, lon, lat, editor };
        if append(series, version) {
            self.versions += 1;
        }
    }

    fn history(&self, id: i64) -> Option<&[PointVersion]> {
        self.points.get(&id).map(Vec::as_slice)
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn version_count(&self) -> u64 {
        self.versions
    }
}
