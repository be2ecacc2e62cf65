//! Import driver.
//!
//! The importer consumes a sorted object stream in a single pass:
//! 1. Checks ordering (fatal on violation)
//! 2. Pairs each version with its neighbours ([`DiffWindow`])
//! 3. Records visible node positions in the point store
//! 4. Turns every version into validity intervals
//! 5. Formats and appends one row per interval to the sink
//!
//! # Usage
//!
//! ```ignore
//! let config = ImportConfig::default().with_interior(true);
//! let sink = CopyFileSink::create(&config.out_dir, &config.prefix)?;
//! let mut importer = Importer::new(&config, sink);
//! let stats = importer.run(objects)?;
//! ```

use crate::config::ImportConfig;
use crate::diff::{Diff, DiffWindow};
use crate::error::Result;
use crate::history::{ObjectKind, OsmObject};
use crate::order::StreamOrderGuard;
use crate::point_store::{new_store, PointStore};
use crate::projection::{transform_for, CoordinateTransform};
use crate::sink::{format_row, OutputClass, RowOptions, RowSink};
use crate::timeline::{UserNames, ValidityInterval, VersionTimeline};
use tracing::{debug, info};

/// Statistics collected during an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Node versions processed.
    pub nodes: u64,

    /// Way versions processed.
    pub ways: u64,

    /// Relation versions seen (ordered-checked only).
    pub relations: u64,

    /// Rows written per table.
    pub point_rows: u64,
    pub line_rows: u64,
    pub area_rows: u64,

    /// Rows that are minor versions.
    pub minor_rows: u64,

    /// Rows that are deletion markers.
    pub deletion_rows: u64,

    /// Versions or intervals for which no row could be produced.
    pub skipped: u64,
}

impl ImportStats {
    fn count(&mut self, iv: &ValidityInterval<'_>) {
        match iv.class {
            OutputClass::Point => self.point_rows += 1,
            OutputClass::Line => self.line_rows += 1,
            OutputClass::Area => self.area_rows += 1,
        }
        if iv.minor > 0 {
            self.minor_rows += 1;
        }
        if !iv.visible {
            self.deletion_rows += 1;
        }
    }

    /// Total rows written.
    pub fn rows(&self) -> u64 {
        self.point_rows + self.line_rows + self.area_rows
    }
}

/// Single-pass history importer.
pub struct Importer<S: RowSink> {
    store: Box<dyn PointStore>,
    transform: Box<dyn CoordinateTransform>,
    guard: StreamOrderGuard,
    users: UserNames,
    sink: S,
    row_opts: RowOptions,
    stats: ImportStats,
}

impl<S: RowSink> Importer<S> {
    /// Create an importer writing to `sink`.
    pub fn new(config: &ImportConfig, sink: S) -> Self {
        Self {
            store: new_store(config.store),
            transform: transform_for(config.keep_lat_lng),
            guard: StreamOrderGuard::new(),
            users: UserNames::default(),
            sink,
            row_opts: RowOptions {
                interior: config.interior,
            },
            stats: ImportStats::default(),
        }
    }

    /// Import a whole stream and flush the sink.
    ///
    /// Any error aborts the run; the sink is only finished after the last
    /// object was written.
    pub fn run<I>(&mut self, objects: I) -> Result<ImportStats>
    where
        I: IntoIterator<Item = Result<OsmObject>>,
    {
        let mut window = DiffWindow::new();

        for obj in objects {
            let obj = obj?;
            self.guard.check(&obj)?;
            if let Some(diff) = window.push(obj) {
                self.handle(&diff)?;
            }
        }
        if let Some(diff) = window.finish() {
            self.handle(&diff)?;
        }

        self.sink.finish()?;
        info!(
            points = self.store.len(),
            node_versions = self.store.version_count(),
            rows = self.stats.rows(),
            "import finished"
        );
        Ok(self.stats.clone())
    }

    pub fn stats(&self) -> &ImportStats {
        &self.stats
    }

    pub fn store(&self) -> &dyn PointStore {
        &*self.store
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn handle(&mut self, diff: &Diff<'_>) -> Result<()> {
        let cur = diff.curr;
        debug!(kind = %cur.kind, id = cur.id, version = cur.version, t = cur.timestamp, "processing");

        match cur.kind {
            ObjectKind::Node => {
                self.stats.nodes += 1;
                if cur.visible {
                    // Only visible versions go into the store; deleted ones
                    // carry 0/0 or no location depending on the writer.
                    let (lon, lat) = cur.location.unwrap_or((0.0, 0.0));
                    self.store.record(cur.id, cur.uid, cur.timestamp, lon, lat);
                }
            }
            ObjectKind::Way => self.stats.ways += 1,
            ObjectKind::Relation => {
                self.stats.relations += 1;
                return Ok(());
            }
        }

        self.users
            .entry(cur.uid)
            .or_insert_with(|| cur.user.clone());

        let timeline = VersionTimeline::new(&*self.store, &*self.transform, &self.users);
        let (intervals, skipped) = match cur.kind {
            ObjectKind::Node => match timeline.node_interval(diff) {
                Some(iv) => (vec![iv], 0),
                None => (Vec::new(), 1),
            },
            _ => {
                let t = timeline.way_intervals(diff);
                (t.intervals, t.skipped)
            }
        };
        self.stats.skipped += skipped as u64;

        for iv in &intervals {
            let row = format_row(iv, self.row_opts);
            self.sink.write_row(iv.class, &row)?;
            self.stats.count(iv);
        }
        Ok(())
    }
}
