//! Flatten then reconstruct, in memory and through the file adapters

use std::path::PathBuf;

use serde_json::{json, Map, Value};
use warp_geometries::{flatten, io, reconstruct, CoordinateTable, Feature, Geometry, Polygon};

fn props(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("warp-geometries-{}-{}", std::process::id(), name))
}

fn square(x: f64, y: f64, size: f64) -> Vec<[f64; 2]> {
    vec![[x, y], [x + size, y], [x + size, y + size], [x, y + size], [x, y]]
}

/// One feature of every supported kind, all sharing the same attribute columns
fn collection() -> Vec<Feature> {
    let classification = |name: &str, color: [u8; 3]| json!({ "name": name, "color": color });
    vec![
        Feature::new(
            Geometry::Polygon(Polygon::new(square(0.0, 0.0, 4.0), vec![vec![[1.0, 1.0], [1.0, 2.0], [2.0, 2.0], [2.0, 1.0], [1.0, 1.0]]])),
            props(json!({ "name": "hole", "objectType": "annotation", "classification": classification("Tumor", [255, 0, 0]) })),
        ),
        Feature::new(
            Geometry::MultiPolygon(vec![
                Polygon::new(square(10.0, 10.0, 5.0), vec![square(11.0, 11.0, 1.0), square(13.0, 13.0, 1.0)]),
                Polygon::new(square(20.0, 20.0, 2.0), vec![]),
            ]),
            props(json!({ "name": "islands", "objectType": "annotation", "classification": classification("Stroma", [0, 128, 0]) })),
        ),
        Feature::new(
            Geometry::Point([3.5, -1.25]),
            props(json!({ "name": "dot", "objectType": "detection", "classification": classification("Immune", [0, 0, 255]) })),
        ),
        Feature::new(
            Geometry::MultiPoint(vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]),
            props(json!({ "name": "dots", "objectType": "detection", "classification": classification("Immune", [0, 0, 255]) })),
        ),
        Feature::new(
            Geometry::LineString(vec![[0.0, 0.0], [5.0, 5.0], [10.0, 0.0]]),
            props(json!({ "name": "path", "objectType": "annotation", "classification": classification("Other", [10, 20, 30]) })),
        ),
        Feature::new(
            Geometry::MultiLineString(vec![vec![[0.0, 0.0], [1.0, 0.0], [2.0, 1.0]]]),
            props(json!({ "name": "one line", "objectType": "annotation", "classification": classification("Other", [10, 20, 30]) })),
        ),
    ]
}

#[test]
fn identity_round_trip_in_memory() {
    let features = collection();
    let table = flatten(&features, true).unwrap();
    let rebuilt = reconstruct(&table, "x", "y", true).unwrap();
    assert_eq!(rebuilt, features);
}

#[test]
fn row_count_law() {
    let features = collection();
    let table = flatten(&features, true).unwrap();
    // hole: 5 + 5, islands: 5 + 5 + 5 + 5, point: 1, multipoint: 3, line: 3, multiline: 3
    assert_eq!(table.len(), 10 + 20 + 1 + 3 + 3 + 3);
    let expected: usize = features.iter().map(warp_geometries::flatten::coordinate_count).sum();
    assert_eq!(table.len(), expected);
}

#[test]
fn every_ring_is_one_contiguous_group() {
    let table = flatten(&collection(), true).unwrap();
    let keys = ["row_id", "polygon_id", "coords", "interior_id"]
        .iter()
        .map(|c| table.column_index(c).unwrap())
        .collect::<Vec<_>>();
    let group_keys = table
        .rows()
        .iter()
        .map(|row| keys.iter().map(|&k| row[k].to_string()).collect::<Vec<_>>().join("|"))
        .collect::<Vec<_>>();

    // once a group is left it never shows up again
    let mut seen = Vec::new();
    for (i, key) in group_keys.iter().enumerate() {
        if i > 0 && group_keys[i - 1] == *key {
            continue;
        }
        assert!(!seen.contains(key), "group {} is split", key);
        seen.push(key.clone());
    }
    // hole feature: exterior + 1 hole, islands: 2 exteriors + 2 holes, multipoint: 3 parts
    assert_eq!(seen.len(), 2 + 4 + 1 + 3 + 1 + 1);
}

#[test]
fn multilinestring_parts_are_merged() {
    let features = vec![Feature::new(
        Geometry::MultiLineString(vec![vec![[0.0, 0.0], [1.0, 0.0]], vec![[5.0, 5.0], [6.0, 6.0]]]),
        Map::new(),
    )];
    let rebuilt = reconstruct(&flatten(&features, true).unwrap(), "x", "y", true).unwrap();
    assert_eq!(
        rebuilt[0].geometry,
        Some(Geometry::MultiLineString(vec![vec![[0.0, 0.0], [1.0, 0.0], [5.0, 5.0], [6.0, 6.0]]]))
    );
}

#[test]
fn warped_columns_drive_reconstruction() {
    let features = collection();
    let mut table: CoordinateTable = flatten(&features, true).unwrap();
    let shifted = |column: &str| {
        table
            .column(column)
            .unwrap()
            .map(|v| json!(v.as_f64().unwrap() + 100.0))
            .collect::<Vec<_>>()
    };
    let (x_warped, y_warped) = (shifted("x"), shifted("y"));
    table.set_column("x_warped", x_warped).unwrap();
    table.set_column("y_warped", y_warped).unwrap();

    let rebuilt = reconstruct(&table, "x_warped", "y_warped", true).unwrap();
    assert_eq!(rebuilt[2].geometry, Some(Geometry::Point([103.5, 98.75])));
    let Some(Geometry::Polygon(polygon)) = &rebuilt[0].geometry else { panic!("expected a polygon") };
    assert_eq!(polygon.interiors[0][0], [101.0, 101.0]);
    assert_eq!(rebuilt[0].properties, features[0].properties);
}

#[test]
fn csv_round_trip() {
    let features = collection();
    let path = temp_path("round_trip.csv");
    io::write_table(&path, &flatten(&features, true).unwrap()).unwrap();
    let table = io::read_table(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(reconstruct(&table, "x", "y", true).unwrap(), features);
}

#[test]
fn parquet_round_trip() {
    let features = collection();
    let path = temp_path("round_trip.parquet");
    io::write_table(&path, &flatten(&features, true).unwrap()).unwrap();
    let table = io::read_table(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(reconstruct(&table, "x", "y", true).unwrap(), features);
}

#[test]
fn ipc_round_trip() {
    let mut features = collection();
    features.push(Feature::new(
        Geometry::Polygon(Polygon::new(square(30.0, 30.0, 3.0), vec![])),
        props(json!({ "name": "unclassified", "objectType": "annotation" })),
    ));
    let table = flatten(&features, true).unwrap();
    let name = table.column_index("classification_name").unwrap();
    assert!(table.rows().last().unwrap()[name].is_null());

    let path = temp_path("round_trip.arrow");
    io::write_table(&path, &table).unwrap();
    let table = io::read_table(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(table.column("interior_id").unwrap().any(Value::is_null));
    assert!(table.column("classification_color_r").unwrap().any(Value::is_null));
    assert_eq!(reconstruct(&table, "x", "y", true).unwrap(), features);
}

#[test]
fn geojson_files_round_trip() {
    let input = temp_path("input.geojson");
    std::fs::write(
        &input,
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [
                            [[0, 0], [4, 0], [4, 4], [0, 4], [0, 0]],
                            [[1, 1], [1, 2], [2, 2], [2, 1], [1, 1]]
                        ]
                    },
                    "properties": { "name": null, "classification": "{\"name\": \"Tumor\", \"color\": [255, 0, 0]}" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "GeometryCollection", "geometries": [] },
                    "properties": { "name": "dropped" }
                }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let features = io::read_features(&input).unwrap();
    assert_eq!(features.len(), 2);
    let table = flatten(&features, true).unwrap();
    assert_eq!(table.len(), 10);

    let output = temp_path("output.geojson");
    io::write_features(&output, reconstruct(&table, "x", "y", true).unwrap()).unwrap();
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    std::fs::remove_file(&input).unwrap();
    std::fs::remove_file(&output).unwrap();

    assert_eq!(written["crs"]["properties"]["name"], json!(warp_geometries::geojson::DEFAULT_CRS));
    let features = written["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["properties"]["name"], json!("Annotation"));
    assert_eq!(features[0]["properties"]["classification"], json!({ "name": "Tumor", "color": [255, 0, 0] }));
    assert_eq!(features[0]["geometry"]["coordinates"][1][2], json!([2.0, 2.0]));
}
