//! Import configuration types.

use crate::point_store::StoreKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one import run.
///
/// Loadable from TOML; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Point store backing.
    /// Default: dense (needs more memory, a little faster).
    pub store: StoreKind,

    /// Table name prefix for the output files.
    /// Default: "hist_"
    pub prefix: String,

    /// Directory the table files are written to.
    /// Default: current directory.
    pub out_dir: PathBuf,

    /// Compute the interior point of areas.
    pub interior: bool,

    /// Keep WGS84 lon/lat instead of projecting to web mercator.
    pub keep_lat_lng: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::Dense,
            prefix: "hist_".to_string(),
            out_dir: PathBuf::from("."),
            interior: false,
            keep_lat_lng: false,
        }
    }
}

impl ImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the point store backing.
    pub fn with_store(mut self, store: StoreKind) -> Self {
        self.store = store;
        self
    }

    /// Set the table prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the output directory.
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Enable interior point computation.
    pub fn with_interior(mut self, interior: bool) -> Self {
        self.interior = interior;
        self
    }

    /// Keep lon/lat coordinates.
    pub fn with_keep_lat_lng(mut self, keep: bool) -> Self {
        self.keep_lat_lng = keep;
        self
    }
}
