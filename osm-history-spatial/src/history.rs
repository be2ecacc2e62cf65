//! History model: the objects read from a full-history dump.
//!
//! Input is newline-delimited JSON, one object version per line:
//!
//! ```text
//! {"type":"node","id":1,"version":2,"visible":true,"timestamp":"2012-01-01T00:00:00Z",
//!  "uid":7,"user":"alice","tags":[["name","x"]],"lon":8.5,"lat":47.3}
//! {"type":"way","id":9,"version":1,"timestamp":1325376000,"nodes":[1,2,3],"tags":{"highway":"path"}}
//! ```
//!
//! Tags may be given as a list of pairs (order preserved) or as an object
//! (keys in lexical order). Timestamps may be RFC 3339 strings or epoch
//! seconds.

use crate::error::{ImportError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// Editor (user) id.
pub type EditorId = u32;

/// Ordered key/value tag list.
pub type TagList = Vec<(String, String)>;

/// Object type, ordered the way sorted history files are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Node = 1,
    Way = 2,
    Relation = 3,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectKind::Node => "node",
            ObjectKind::Way => "way",
            ObjectKind::Relation => "relation",
        })
    }
}

/// One version of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct OsmObject {
    pub kind: ObjectKind,
    pub id: i64,
    pub version: u32,
    pub visible: bool,
    pub timestamp: Timestamp,
    pub uid: EditorId,
    pub user: String,
    pub tags: TagList,
    /// Node location; deleted nodes often carry none.
    pub location: Option<(f64, f64)>,
    /// Referenced node ids, in order (ways only).
    pub nodes: Vec<i64>,
}

impl OsmObject {
    /// Parse one NDJSON line. `line` is 1-based and only used for errors.
    pub fn from_json_line(text: &str, line: u64) -> Result<Self> {
        let raw: RawObject = serde_json::from_str(text).map_err(|e| ImportError::Input {
            line,
            message: e.to_string(),
        })?;
        raw.into_object(line)
    }

    pub fn node(id: i64, version: u32, timestamp: Timestamp, lon: f64, lat: f64) -> Self {
        Self {
            kind: ObjectKind::Node,
            id,
            version,
            visible: true,
            timestamp,
            uid: 0,
            user: String::new(),
            tags: Vec::new(),
            location: Some((lon, lat)),
            nodes: Vec::new(),
        }
    }

    pub fn way(id: i64, version: u32, timestamp: Timestamp, nodes: Vec<i64>) -> Self {
        Self {
            kind: ObjectKind::Way,
            id,
            version,
            visible: true,
            timestamp,
            uid: 0,
            user: String::new(),
            tags: Vec::new(),
            location: None,
            nodes,
        }
    }

    pub fn with_editor(mut self, uid: EditorId, user: impl Into<String>) -> Self {
        self.uid = uid;
        self.user = user.into();
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    pub fn deleted(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Deserialize)]
struct RawObject {
    #[serde(rename = "type")]
    kind: ObjectKind,
    id: i64,
    version: u32,
    #[serde(default = "default_visible")]
    visible: bool,
    timestamp: RawTimestamp,
    #[serde(default)]
    uid: EditorId,
    #[serde(default)]
    user: String,
    #[serde(default)]
    tags: RawTags,
    lon: Option<f64>,
    lat: Option<f64>,
    #[serde(default)]
    nodes: Vec<i64>,
}

fn default_visible() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Seconds(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTags {
    Pairs(Vec<(String, String)>),
    Map(BTreeMap<String, String>),
}

impl Default for RawTags {
    fn default() -> Self {
        RawTags::Pairs(Vec::new())
    }
}

impl RawObject {
    fn into_object(self, line: u64) -> Result<OsmObject> {
        let timestamp = match self.timestamp {
            RawTimestamp::Seconds(s) => s,
            RawTimestamp::Text(s) => parse_timestamp(&s).ok_or_else(|| ImportError::Input {
                line,
                message: format!("invalid timestamp '{s}'"),
            })?,
        };
        let tags = match self.tags {
            RawTags::Pairs(pairs) => pairs,
            RawTags::Map(map) => map.into_iter().collect(),
        };
        let location = match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => Some((lon, lat)),
            _ => None,
        };
        Ok(OsmObject {
            kind: self.kind,
            id: self.id,
            version: self.version,
            visible: self.visible,
            timestamp,
            uid: self.uid,
            user: self.user,
            tags,
            location,
            nodes: self.nodes,
        })
    }
}

/// Parse an RFC 3339 timestamp into epoch seconds.
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).timestamp())
}

/// Format epoch seconds as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_timestamp(t: Timestamp) -> String {
    match DateTime::<Utc>::from_timestamp(t, 0) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => t.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_node_line() {
        let obj = OsmObject::from_json_line(
            r#"{"type":"node","id":1,"version":2,"timestamp":"2012-01-01T00:00:00Z","uid":7,"user":"alice","tags":[["b","1"],["a","2"]],"lon":8.5,"lat":47.25}"#,
            1,
        )
        .unwrap();
        assert_eq!(obj.kind, ObjectKind::Node);
        assert_eq!(obj.timestamp, 1_325_376_000);
        assert!(obj.visible);
        assert_eq!(obj.location, Some((8.5, 47.25)));
        // Pair form keeps input order
        assert_eq!(obj.tags[0].0, "b");
        assert_eq!(obj.tags[1].0, "a");
    }

    #[test]
    fn test_parse_way_line_with_map_tags() {
        let obj = OsmObject::from_json_line(
            r#"{"type":"way","id":9,"version":1,"visible":false,"timestamp":100,"nodes":[1,2],"tags":{"z":"1","a":"2"}}"#,
            3,
        )
        .unwrap();
        assert_eq!(obj.kind, ObjectKind::Way);
        assert!(!obj.visible);
        assert_eq!(obj.timestamp, 100);
        assert_eq!(obj.nodes, vec![1, 2]);
        assert_eq!(obj.tags[0].0, "a");
        assert_eq!(obj.location, None);
    }

    #[test]
    fn test_parse_errors_carry_line() {
        let err = OsmObject::from_json_line(r#"{"type":"node"}"#, 42).unwrap_err();
        assert!(matches!(err, ImportError::Input { line: 42, .. }));

        let err = OsmObject::from_json_line(
            r#"{"type":"node","id":1,"version":1,"timestamp":"yesterday"}"#,
            5,
        )
        .unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_timestamp(1_325_376_000), "2012-01-01T00:00:00Z");
        assert_eq!(
            parse_timestamp("2012-01-01T01:00:00+01:00"),
            Some(1_325_376_000)
        );
    }

    #[test]
    fn test_kind_order() {
        assert!(ObjectKind::Node < ObjectKind::Way);
        assert!(ObjectKind::Way < ObjectKind::Relation);
    }
}
