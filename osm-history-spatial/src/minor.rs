//! Minor version discovery.
//!
//! A way's geometry changes whenever one of its nodes moves, even though the
//! way itself keeps its version. For a way version valid in `(from, to)`,
//! every node edit strictly inside that window is a split instant: the point
//! where a synthetic minor version starts.

use crate::history::{EditorId, Timestamp};
use crate::point_store::PointStore;

/// A discovered minor-version boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitInstant {
    pub timestamp: Timestamp,
    /// Editor of the node change that caused the split.
    pub editor: EditorId,
}

/// Find split instants for a node sequence in the open window `(from, to)`.
///
/// `to = None` leaves the window open-ended. The result is sorted by
/// timestamp and holds at most one entry per timestamp; when several nodes
/// changed at the same second, the first node in sequence order supplies
/// the editor.
pub fn find_splits(
    store: &dyn PointStore,
    nodes: &[i64],
    from: Timestamp,
    to: Option<Timestamp>,
) -> Vec<SplitInstant> {
    let mut splits = Vec::new();

    for &id in nodes {
        let Some(series) = store.history(id) else {
            continue;
        };

        let start = series.partition_point(|v| v.timestamp <= from);
        let end = match to {
            Some(to) => series.partition_point(|v| v.timestamp < to),
            None => series.len(),
        };
        if start >= end {
            continue;
        }

        splits.extend(series[start..end].iter().map(|v| SplitInstant {
            timestamp: v.timestamp,
            editor: v.editor,
        }));
    }

    // Stable sort keeps sequence order among equal timestamps, so dedup
    // retains the first referencing node's editor.
    splits.sort_by_key(|s| s.timestamp);
    splits.dedup_by_key(|s| s.timestamp);
    splits
}
