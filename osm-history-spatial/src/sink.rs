//! Output rows and the sinks they are written to.
//!
//! Rows are COPY text format: tab-separated, `\N` for null. There is one
//! table per output class:
//!
//! | class | columns |
//! |-------|---------|
//! | point | id, version, visible, uid, user, valid_from, valid_to, tags, geom |
//! | line  | id, version, minor, visible, uid, user, valid_from, valid_to, tags, z_order, geom |
//! | area  | id, version, minor, visible, uid, user, valid_from, valid_to, tags, z_order, area, geom, interior |
//!
//! Geometries are written as EWKT.

use crate::error::{ImportError, Result};
use crate::geometry::ProjectedGeometry;
use crate::history::format_timestamp;
use crate::hstore;
use crate::tags::z_order;
use crate::timeline::ValidityInterval;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// COPY null marker.
pub const NULL: &str = "\\N";

/// Output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputClass {
    Point,
    Line,
    Area,
}

impl OutputClass {
    pub const ALL: [OutputClass; 3] = [OutputClass::Point, OutputClass::Line, OutputClass::Area];

    /// Table name suffix.
    pub fn table(&self) -> &'static str {
        match self {
            OutputClass::Point => "point",
            OutputClass::Line => "line",
            OutputClass::Area => "polygon",
        }
    }
}

/// Row formatting switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowOptions {
    /// Compute and write the interior point of areas.
    pub interior: bool,
}

fn ewkt_or_null(geometry: Option<&ProjectedGeometry>) -> String {
    geometry.map_or_else(|| NULL.to_string(), ProjectedGeometry::to_ewkt)
}

fn interior_column(iv: &ValidityInterval<'_>, g: &ProjectedGeometry, opts: RowOptions) -> String {
    if !opts.interior {
        return NULL.to_string();
    }
    match g.interior_point() {
        Some(p) => ProjectedGeometry::point(p.x(), p.y(), g.srid).to_ewkt(),
        None => {
            warn!(way = iv.id, version = iv.version, minor = iv.minor, "error calculating interior point");
            NULL.to_string()
        }
    }
}

/// Format one interval as a COPY row (without the trailing newline).
pub fn format_row(iv: &ValidityInterval<'_>, opts: RowOptions) -> String {
    let mut cols: Vec<String> = Vec::with_capacity(13);

    cols.push(iv.id.to_string());
    cols.push(iv.version.to_string());
    if iv.class != OutputClass::Point {
        cols.push(iv.minor.to_string());
    }
    cols.push(if iv.visible { "t" } else { "f" }.to_string());
    cols.push(iv.uid.to_string());
    cols.push(hstore::escape_copy(iv.user));
    cols.push(format_timestamp(iv.valid_from));
    cols.push(iv.valid_to.map_or_else(|| NULL.to_string(), format_timestamp));
    cols.push(hstore::encode(iv.tags));

    match iv.class {
        OutputClass::Point => cols.push(ewkt_or_null(iv.geometry.as_ref())),
        OutputClass::Line => {
            cols.push(z_order(iv.tags).to_string());
            cols.push(ewkt_or_null(iv.geometry.as_ref()));
        }
        OutputClass::Area => {
            cols.push(z_order(iv.tags).to_string());
            match &iv.geometry {
                Some(g) => {
                    cols.push(g.area().to_string());
                    cols.push(g.to_ewkt());
                    cols.push(interior_column(iv, g, opts));
                }
                None => cols.extend(["0".to_string(), NULL.to_string(), NULL.to_string()]),
            }
        }
    }

    cols.join("\t")
}

/// Ordered, append-only row destination.
pub trait RowSink {
    /// Append one row to the table of `class`.
    fn write_row(&mut self, class: OutputClass, row: &str) -> Result<()>;

    /// Flush everything. No rows are written after this.
    fn finish(&mut self) -> Result<()>;
}

/// Keeps rows in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<(OutputClass, String)>,
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of one table, split into columns.
    pub fn table(&self, class: OutputClass) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .filter(|(c, _)| *c == class)
            .map(|(_, r)| r.split('\t').collect())
            .collect()
    }
}

impl RowSink for MemorySink {
    fn write_row(&mut self, class: OutputClass, row: &str) -> Result<()> {
        self.rows.push((class, row.to_string()));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Writes `<prefix><table>.tsv` files for `COPY ... FROM` loading.
pub struct CopyFileSink {
    point: BufWriter<File>,
    line: BufWriter<File>,
    area: BufWriter<File>,
}

impl CopyFileSink {
    /// Create (truncate) the three table files in `dir`.
    pub fn create(dir: &Path, prefix: &str) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| {
            ImportError::Sink(format!("cannot create output directory {}: {e}", dir.display()))
        })?;
        let open = |class: OutputClass| -> Result<BufWriter<File>> {
            let path = dir.join(format!("{prefix}{}.tsv", class.table()));
            debug!(path = %path.display(), "opening table file");
            let file = File::create(&path)
                .map_err(|e| ImportError::Sink(format!("cannot create {}: {e}", path.display())))?;
            Ok(BufWriter::with_capacity(1 << 16, file))
        };
        Ok(Self {
            point: open(OutputClass::Point)?,
            line: open(OutputClass::Line)?,
            area: open(OutputClass::Area)?,
        })
    }

    fn writer(&mut self, class: OutputClass) -> &mut BufWriter<File> {
        match class {
            OutputClass::Point => &mut self.point,
            OutputClass::Line => &mut self.line,
            OutputClass::Area => &mut self.area,
        }
    }
}

impl RowSink for CopyFileSink {
    fn write_row(&mut self, class: OutputClass, row: &str) -> Result<()> {
        let w = self.writer(class);
        w.write_all(row.as_bytes())?;
        w.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        for class in OutputClass::ALL {
            debug!(table = class.table(), "closing table file");
            self.writer(class).flush()?;
        }
        Ok(())
    }
}
