//! Input ordering check.
//!
//! Everything downstream relies on the input being sorted by
//! `(type, id, version)`: nodes before ways, so a way's nodes are all in
//! the point store when the way arrives, and each object's versions oldest
//! first, so version pairing sees a proper timeline.

use crate::error::{ImportError, Result};
use crate::history::{ObjectKind, OsmObject};

/// Rejects objects that arrive out of `(type, id, version)` order.
#[derive(Debug, Default)]
pub struct StreamOrderGuard {
    last: Option<(ObjectKind, i64, u32)>,
}

impl StreamOrderGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the next object. Equal keys are accepted.
    pub fn check(&mut self, obj: &OsmObject) -> Result<()> {
        let key = (obj.kind, obj.id, obj.version);
        if let Some(last) = self.last {
            if key < last {
                return Err(ImportError::Unsorted {
                    last_kind: last.0,
                    last_id: last.1,
                    last_version: last.2,
                    kind: key.0,
                    id: key.1,
                    version: key.2,
                });
            }
        }
        self.last = Some(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_stream_passes() {
        let mut guard = StreamOrderGuard::new();
        for obj in [
            OsmObject::node(1, 1, 0, 0.0, 0.0),
            OsmObject::node(1, 2, 0, 0.0, 0.0),
            OsmObject::node(5, 1, 0, 0.0, 0.0),
            OsmObject::way(2, 1, 0, vec![]),
            OsmObject::way(2, 3, 0, vec![]),
        ] {
            guard.check(&obj).unwrap();
        }
    }

    #[test]
    fn test_version_regression_fails() {
        let mut guard = StreamOrderGuard::new();
        guard.check(&OsmObject::way(2, 2, 0, vec![])).unwrap();
        let err = guard.check(&OsmObject::way(2, 1, 0, vec![])).unwrap_err();
        assert!(matches!(err, ImportError::Unsorted { version: 1, last_version: 2, .. }));
        assert!(err.to_string().contains("way 2v2 comes before way 2v1"));
    }

    #[test]
    fn test_type_regression_fails() {
        let mut guard = StreamOrderGuard::new();
        guard.check(&OsmObject::way(1, 1, 0, vec![])).unwrap();
        assert!(guard.check(&OsmObject::node(100, 1, 0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_id_regression_fails() {
        let mut guard = StreamOrderGuard::new();
        guard.check(&OsmObject::node(10, 1, 0, 0.0, 0.0)).unwrap();
        assert!(guard.check(&OsmObject::node(9, 7, 0, 0.0, 0.0)).is_err());
    }
}
