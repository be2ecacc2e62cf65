//! Validity-interval construction for OpenStreetMap full-history data.
//!
//! This crate turns a sorted stream of node and way versions into rows for
//! a time-versioned spatial store. Each row is a validity interval
//! `[valid_from, valid_to)` carrying the geometry that was correct during
//! that interval.
//!
//! The hard part is that a way's geometry depends on the history of every
//! node it references. A way can change shape without getting a new
//! version because one of its nodes moved; those instants are made explicit
//! as *minor versions*.
//!
//! # Architecture
//!
//! ```text
//!   NDJSON objects
//!         │
//!         ▼
//!   StreamOrderGuard ── unsorted input aborts the run
//!         │
//!         ▼
//!   DiffWindow (prev / curr / next)
//!         │
//!         ├── node ──► PointStore.record ──┐
//!         │                                │
//!         ▼                                ▼
//!   VersionTimeline ──► find_splits ──► GeometryAssembler ──► CoordinateTransform
//!         │
//!         ▼
//!   format_row (hstore tags, EWKT) ──► RowSink (point / line / polygon)
//! ```
//!
//! # Modules
//!
//! - [`config`]: Import configuration
//! - [`history`]: Input object model and NDJSON parsing
//! - [`order`]: Input ordering check
//! - [`diff`]: Version pairing
//! - [`point_store`]: Time-indexed node positions (dense and sparse)
//! - [`minor`]: Minor version discovery
//! - [`assembler`]: Way geometry at a point in time
//! - [`geometry`]: Geometry construction and EWKT serialization
//! - [`projection`]: Coordinate transforms
//! - [`tags`]: Area classification and z-order
//! - [`timeline`]: Validity intervals per version
//! - [`hstore`]: Tag encoding
//! - [`sink`]: Row formatting and sinks
//! - [`importer`]: Single-pass driver
//! - [`error`]: Error types

pub mod assembler;
pub mod config;
pub mod diff;
pub mod error;
pub mod geometry;
pub mod history;
pub mod hstore;
pub mod importer;
pub mod minor;
pub mod order;
pub mod point_store;
pub mod projection;
pub mod sink;
pub mod tags;
pub mod timeline;

// Re-export key types
pub use assembler::GeometryAssembler;
pub use config::ImportConfig;
pub use diff::{Diff, DiffWindow};
pub use error::{ImportError, Result};
pub use geometry::{GeometryError, GeometryType, ProjectedGeometry};
pub use history::{ObjectKind, OsmObject, Timestamp};
pub use importer::{ImportStats, Importer};
pub use minor::{find_splits, SplitInstant};
pub use order::StreamOrderGuard;
pub use point_store::{
    new_store, DensePointStore, PointStore, PointVersion, Resolution, SparsePointStore, StoreKind,
};
pub use projection::{CoordinateTransform, LatLng, WebMercator};
pub use sink::{CopyFileSink, MemorySink, OutputClass, RowSink};
pub use timeline::{ValidityInterval, VersionTimeline};
