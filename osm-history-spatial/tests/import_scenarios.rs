//! End-to-end import scenarios against an in-memory sink.

use geo_types::coord;
use osm_history_spatial::geometry::{linestring, parse_ewkt};
use osm_history_spatial::history::format_timestamp;
use osm_history_spatial::sink::NULL;
use osm_history_spatial::{
    ImportConfig, ImportError, Importer, MemorySink, OsmObject, OutputClass, ProjectedGeometry,
    StoreKind,
};

fn lat_lng_config() -> ImportConfig {
    ImportConfig::default().with_keep_lat_lng(true)
}

fn run(config: &ImportConfig, objects: Vec<OsmObject>) -> (MemorySink, osm_history_spatial::ImportStats) {
    let mut importer = Importer::new(config, MemorySink::new());
    let stats = importer.run(objects.into_iter().map(Ok)).unwrap();
    (importer.into_sink(), stats)
}

/// (id, version, minor, valid_from, valid_to) of every line/area row.
fn way_bounds(sink: &MemorySink, class: OutputClass) -> Vec<(String, String, String, String, String)> {
    sink.table(class)
        .into_iter()
        .map(|c| {
            (
                c[0].to_string(),
                c[1].to_string(),
                c[2].to_string(),
                c[6].to_string(),
                c[7].to_string(),
            )
        })
        .collect()
}

fn ts(t: i64) -> String {
    format_timestamp(t)
}

#[test]
fn node_move_creates_minor_version() {
    let objects = vec![
        OsmObject::node(1, 1, 10, 0.0, 0.0),
        OsmObject::node(1, 2, 30, 1.0, 1.0).with_editor(5, "mover"),
        OsmObject::node(2, 1, 0, 0.0, 0.0),
        OsmObject::way(10, 1, 20, vec![1, 2]).with_editor(3, "creator"),
    ];
    let (sink, stats) = run(&lat_lng_config(), objects);
    assert!(sink.finished);

    let lines = sink.table(OutputClass::Line);
    assert_eq!(lines.len(), 2);

    // major: [20, 30) with node 1 as of t=10
    let major = &lines[0];
    assert_eq!(&major[..3], &["10", "1", "0"]);
    assert_eq!(major[5], "creator");
    assert_eq!(major[6], ts(20));
    assert_eq!(major[7], ts(30));
    let expected = linestring(vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 0.0, y: 0.0 }], 4326)
        .unwrap()
        .to_ewkt();
    assert_eq!(major[10], expected);

    // minor: [30, open) with node 1 as of t=30, attributed to the node's editor
    let minor = &lines[1];
    assert_eq!(&minor[..3], &["10", "1", "1"]);
    assert_eq!(minor[4], "5");
    assert_eq!(minor[5], "mover");
    assert_eq!(minor[6], ts(30));
    assert_eq!(minor[7], NULL);
    let expected = linestring(vec![coord! { x: 1.0, y: 1.0 }, coord! { x: 0.0, y: 0.0 }], 4326)
        .unwrap()
        .to_ewkt();
    assert_eq!(minor[10], expected);

    assert_eq!(stats.point_rows, 3);
    assert_eq!(stats.line_rows, 2);
    assert_eq!(stats.minor_rows, 1);
}

#[test]
fn node_rows_chain_versions() {
    let objects = vec![
        OsmObject::node(1, 1, 10, 8.0, 47.0),
        OsmObject::node(1, 2, 20, 8.5, 47.0),
        OsmObject::node(1, 3, 30, 0.0, 0.0).deleted(),
    ];
    let (sink, _) = run(&lat_lng_config(), objects);
    let points = sink.table(OutputClass::Point);
    let bounds: Vec<_> = points.iter().map(|c| (c[5].to_string(), c[6].to_string())).collect();
    assert_eq!(
        bounds,
        vec![(ts(10), ts(20)), (ts(20), ts(30)), (ts(30), ts(30))]
    );
    assert_eq!(
        parse_ewkt(points[0][8]).unwrap(),
        ProjectedGeometry::point(8.0, 47.0, 4326)
    );
    assert_eq!(points[2][2], "f");
    assert_eq!(points[2][8], NULL);
}

#[test]
fn node_versions_with_inverted_timestamps_keep_both_positions() {
    let objects = vec![
        OsmObject::node(1, 1, 30, 3.0, 3.0),
        OsmObject::node(1, 2, 20, 2.0, 2.0),
        OsmObject::node(2, 1, 0, 0.0, 0.0),
        OsmObject::way(5, 1, 25, vec![1, 2]),
    ];
    let (sink, _) = run(&lat_lng_config(), objects);
    let lines = sink.table(OutputClass::Line);
    assert_eq!(lines.len(), 2);

    // at t=25 node 1 sits where its older-stamped v2 put it
    let expected = linestring(vec![coord! { x: 2.0, y: 2.0 }, coord! { x: 0.0, y: 0.0 }], 4326).unwrap();
    assert_eq!(parse_ewkt(lines[0][10]).unwrap(), expected);
    assert_eq!((lines[0][6], lines[0][7]), (ts(25).as_str(), ts(30).as_str()));
    assert_eq!(lines[1][6], ts(30));
}

#[test]
fn deleted_way_without_history_is_dropped() {
    let objects = vec![
        OsmObject::node(1, 1, 0, 0.0, 0.0),
        OsmObject::way(7, 1, 20, vec![]).deleted(),
    ];
    let (sink, stats) = run(&lat_lng_config(), objects);
    assert!(sink.table(OutputClass::Line).is_empty());
    assert!(sink.table(OutputClass::Area).is_empty());
    assert_eq!(stats.ways, 1);
    assert_eq!(stats.skipped, 1);
}

#[test]
fn unsorted_versions_abort_before_rows() {
    let objects = vec![
        Ok(OsmObject::node(1, 1, 0, 0.0, 0.0)),
        Ok(OsmObject::node(2, 1, 0, 1.0, 1.0)),
        Ok(OsmObject::way(5, 2, 20, vec![1, 2])),
        Ok(OsmObject::way(5, 1, 10, vec![1, 2])),
        Ok(OsmObject::way(6, 1, 10, vec![1, 2])),
    ];
    let mut importer = Importer::new(&lat_lng_config(), MemorySink::new());
    let err = importer.run(objects).unwrap_err();
    assert!(matches!(err, ImportError::Unsorted { id: 5, version: 1, .. }));

    let sink = importer.into_sink();
    assert!(!sink.finished);
    assert!(sink.table(OutputClass::Line).is_empty());
}

#[test]
fn input_errors_abort_the_run() {
    let objects = vec![
        Ok(OsmObject::node(1, 1, 0, 0.0, 0.0)),
        Err(ImportError::Input {
            line: 2,
            message: "truncated".into(),
        }),
    ];
    let mut importer = Importer::new(&lat_lng_config(), MemorySink::new());
    assert!(matches!(
        importer.run(objects),
        Err(ImportError::Input { line: 2, .. })
    ));
}

fn busy_history() -> Vec<OsmObject> {
    let mut objects = Vec::new();
    // four corners, each moving a few times
    for (id, moves) in [(1i64, vec![5, 25, 45]), (2, vec![0, 35]), (3, vec![0, 25, 55]), (4, vec![0])] {
        for (v, t) in moves.into_iter().enumerate() {
            let d = v as f64 * 0.001;
            let (lon, lat) = match id {
                1 => (0.0 + d, 0.0),
                2 => (1.0, 0.0 + d),
                3 => (1.0 - d, 1.0),
                _ => (0.0, 1.0),
            };
            objects.push(
                OsmObject::node(id, v as u32 + 1, t, lon, lat).with_editor(100 + id as u32, format!("u{id}")),
            );
        }
    }
    objects.push(OsmObject::way(20, 1, 10, vec![1, 2, 3, 4, 1]).with_tag("landuse", "grass"));
    objects.push(OsmObject::way(20, 2, 30, vec![1, 2, 3, 4, 1]).with_tag("landuse", "meadow"));
    objects.push(OsmObject::way(20, 3, 50, vec![]).deleted());
    objects.push(OsmObject::way(21, 1, 15, vec![1, 2]).with_tag("highway", "path"));
    objects
}

#[test]
fn intervals_are_contiguous_per_way() {
    let (sink, stats) = run(&lat_lng_config(), busy_history());

    let areas = way_bounds(&sink, OutputClass::Area);
    let (versions, bounds): (Vec<_>, Vec<_>) = areas
        .iter()
        .map(|(_, v, m, from, to)| ((v.as_str(), m.as_str()), (from.clone(), to.clone())))
        .unzip();

    // v1 [10,30) split at 25; v2 [30,50) split at 35 and 45; v3 deletion marker at 50
    assert_eq!(
        versions,
        vec![("1", "0"), ("1", "1"), ("2", "0"), ("2", "1"), ("2", "2"), ("3", "0")]
    );
    assert_eq!(
        bounds,
        vec![
            (ts(10), ts(25)),
            (ts(25), ts(30)),
            (ts(30), ts(35)),
            (ts(35), ts(45)),
            (ts(45), ts(50)),
            (ts(50), ts(50)),
        ]
    );
    for pair in bounds[..5].windows(2) {
        assert_eq!(pair[0].1, pair[1].0);
    }

    // The deletion marker lands in the area table without geometry
    let marker = sink.table(OutputClass::Area).pop().unwrap();
    assert_eq!(marker[3], "f");
    assert_eq!(marker[11], NULL);

    // The path picks up every move of nodes 1 and 2 after t=15
    let lines = way_bounds(&sink, OutputClass::Line);
    let starts: Vec<_> = lines.iter().map(|(_, _, _, from, _)| from.clone()).collect();
    assert_eq!(starts, vec![ts(15), ts(25), ts(35), ts(45)]);
    assert_eq!(lines.last().unwrap().4, NULL);

    assert_eq!(stats.deletion_rows, 1);
    assert_eq!(stats.area_rows, 6);
    assert_eq!(stats.line_rows, 4);
}

#[test]
fn store_backings_produce_identical_output() {
    let dense = run(&lat_lng_config().with_store(StoreKind::Dense), busy_history());
    let sparse = run(&lat_lng_config().with_store(StoreKind::Sparse), busy_history());
    assert_eq!(dense.0.rows, sparse.0.rows);
    assert_eq!(dense.1, sparse.1);
}

#[test]
fn interior_points_are_written_when_enabled() {
    let (sink, _) = run(&lat_lng_config().with_interior(true), busy_history());
    let first = &sink.table(OutputClass::Area)[0];
    assert!(first[12].starts_with("SRID=4326;POINT("));

    let (sink, _) = run(&lat_lng_config(), busy_history());
    assert_eq!(sink.table(OutputClass::Area)[0][12], NULL);
}

#[test]
fn mercator_skips_out_of_domain_nodes() {
    let objects = vec![
        OsmObject::node(1, 1, 0, 0.0, 0.0),
        OsmObject::node(2, 1, 0, 0.0, 89.9),
        OsmObject::node(3, 1, 0, 1.0, 1.0),
        OsmObject::way(1, 1, 10, vec![1, 2]),
        OsmObject::way(2, 1, 10, vec![1, 2, 3]),
    ];
    let (sink, stats) = run(&ImportConfig::default(), objects);
    // node 2 has no point row, way 1 has no line row
    assert_eq!(sink.table(OutputClass::Point).len(), 2);
    let lines = sink.table(OutputClass::Line);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0][0], "2");
    assert!(lines[0][10].starts_with("SRID=3857;LINESTRING("));
    assert_eq!(stats.skipped, 2);
}
