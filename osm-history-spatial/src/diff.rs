//! Version pairing over a sorted object stream.
//!
//! Each object version is handed on together with the previous and next
//! version of the same object, which is what interval construction needs
//! (`valid_to` is the next version's timestamp, deletions look back at the
//! previous version). Because the successor has to be seen first, output
//! lags input by one object.

use crate::history::OsmObject;

/// One object version with its neighbours in the same object's history.
#[derive(Debug, Clone, Copy)]
pub struct Diff<'a> {
    pub prev: Option<&'a OsmObject>,
    pub curr: &'a OsmObject,
    pub next: Option<&'a OsmObject>,
}

impl Diff<'_> {
    /// First version of this object in the input.
    pub fn first(&self) -> bool {
        self.prev.is_none()
    }

    /// Last version of this object in the input.
    pub fn last(&self) -> bool {
        self.next.is_none()
    }
}

fn same_object(a: &OsmObject, b: &OsmObject) -> bool {
    a.kind == b.kind && a.id == b.id
}

/// Sliding three-object window.
#[derive(Debug, Default)]
pub struct DiffWindow {
    before: Option<OsmObject>,
    current: Option<OsmObject>,
    after: Option<OsmObject>,
}

impl DiffWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the next object; returns the diff that became complete, if any.
    pub fn push(&mut self, obj: OsmObject) -> Option<Diff<'_>> {
        self.before = self.current.take();
        self.current = self.after.take();
        self.after = Some(obj);
        self.diff()
    }

    /// Flush the last buffered object at end of input.
    pub fn finish(&mut self) -> Option<Diff<'_>> {
        self.before = self.current.take();
        self.current = self.after.take();
        self.diff()
    }

    fn diff(&self) -> Option<Diff<'_>> {
        let curr = self.current.as_ref()?;
        Some(Diff {
            prev: self.before.as_ref().filter(|p| same_object(p, curr)),
            curr,
            next: self.after.as_ref().filter(|n| same_object(n, curr)),
        })
    }
}
