/*!
Flattener: feature collection → long-format coordinate table.

Rows are emitted feature by feature, part by part: the exterior (or simple) coordinates of a part first,
then its interior rings one after the other. Point order inside a ring is kept, so grouping the table by
`(row_id, polygon_id, coords, interior_id)` gives back every ring in order without a sequence column.
 */
use log::{debug, info, warn};
use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::classification;
use crate::error::{Error, Result};
use crate::geometry::{Coord, Feature, Geometry, Ring};
use crate::table::{self, CoordinateTable, CoordsKind};

/// Exterior (or simple) coordinates of each part, indexed by `polygon_id`
fn exterior_parts(geometry: &Geometry) -> Vec<&[Coord]> {
    match geometry {
        Geometry::Point(point) => vec![std::slice::from_ref(point)],
        Geometry::LineString(line) => vec![line.as_slice()],
        Geometry::MultiPoint(points) => points.iter().map(std::slice::from_ref).collect(),
        Geometry::MultiLineString(lines) => lines.iter().map(Vec::as_slice).collect(),
        Geometry::Polygon(polygon) => vec![polygon.exterior.as_slice()],
        Geometry::MultiPolygon(polygons) => polygons.iter().map(|p| p.exterior.as_slice()).collect(),
        Geometry::Unsupported(_) => vec![],
    }
}

/// Interior rings of each part, indexed like [`exterior_parts`]
fn interior_parts(geometry: &Geometry) -> Vec<&[Ring]> {
    match geometry {
        Geometry::Polygon(polygon) => vec![polygon.interiors.as_slice()],
        Geometry::MultiPolygon(polygons) => polygons.iter().map(|p| p.interiors.as_slice()).collect(),
        _ => vec![],
    }
}

/// Number of rows [`flatten`] emits for a feature
pub fn coordinate_count(feature: &Feature) -> usize {
    let Some(geometry) = &feature.geometry else {
        return 0;
    };
    let exterior: usize = exterior_parts(geometry).iter().map(|part| part.len()).sum();
    let interior: usize = interior_parts(geometry)
        .iter()
        .flat_map(|rings| rings.iter())
        .map(Vec::len)
        .sum();
    exterior + interior
}

/// Metadata of every feature, split if requested, checked against the structural columns
fn prepare_metadata(features: &[Feature], classification_split: bool) -> Result<Vec<Map<String, Value>>> {
    features
        .iter()
        .map(|feature| {
            let mut properties = feature.properties.clone();
            if classification_split {
                classification::split(&mut properties);
            }
            match properties.keys().find(|key| table::is_structural(key)) {
                Some(key) => Err(Error::ReservedColumn(key.clone())),
                None => Ok(properties),
            }
        })
        .collect()
}

/// Union of metadata columns in first-seen order
fn metadata_columns(metadata: &[Map<String, Value>]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for key in metadata.iter().flat_map(|properties| properties.keys()) {
        if !columns.contains(key) {
            columns.push(key.clone());
        }
    }
    columns
}

fn feature_rows(row_id: usize, feature: &Feature, metadata: &[Value]) -> Vec<Vec<Value>> {
    let Some(geometry) = &feature.geometry else {
        debug!("Feature {} has no geometry", row_id);
        return vec![];
    };
    if let Geometry::Unsupported(typ) = geometry {
        warn!("Feature {} has unsupported geometry type {}, no coordinate rows emitted", row_id, typ);
        return vec![];
    }

    let row = |point: &Coord, kind: CoordsKind, polygon_id: usize, interior_id: Option<usize>| {
        let mut row = Vec::with_capacity(metadata.len() + table::STRUCTURAL_COLUMNS.len());
        row.extend_from_slice(metadata);
        row.push(Value::from(row_id));
        row.push(Value::from(geometry.type_name()));
        row.push(Value::from(point[0]));
        row.push(Value::from(point[1]));
        row.push(Value::from(kind.as_str()));
        row.push(Value::from(polygon_id));
        row.push(interior_id.map(Value::from).unwrap_or(Value::Null));
        row
    };

    let interiors = interior_parts(geometry);
    let mut rows = Vec::with_capacity(coordinate_count(feature));
    for (polygon_id, part) in exterior_parts(geometry).into_iter().enumerate() {
        rows.extend(part.iter().map(|point| row(point, CoordsKind::Exterior, polygon_id, None)));

        let rings = interiors.get(polygon_id).copied().unwrap_or_default();
        for (interior_id, ring) in rings.iter().enumerate() {
            rows.extend(ring.iter().map(|point| row(point, CoordsKind::Interior, polygon_id, Some(interior_id))));
        }
    }
    debug!("Feature {} ({}) : {} coordinate rows", row_id, geometry.type_name(), rows.len());
    rows
}

/**
Flattens features into a coordinate table.

`row_id` is the position of the feature in `features`. Features without geometry or with an unsupported one
keep their `row_id` but contribute no rows. Fails with [`Error::ReservedColumn`] if a metadata attribute
uses a structural column name.
 */
pub fn flatten(features: &[Feature], classification_split: bool) -> Result<CoordinateTable> {
    info!("Flattening {} features", features.len());
    let metadata = prepare_metadata(features, classification_split)?;
    let metadata_columns = metadata_columns(&metadata);

    let rows = features
        .par_iter()
        .zip(metadata.par_iter())
        .enumerate()
        .map(|(row_id, (feature, properties))| {
            let cells = metadata_columns
                .iter()
                .map(|column| properties.get(column).cloned().unwrap_or(Value::Null))
                .collect::<Vec<_>>();
            feature_rows(row_id, feature, &cells)
        })
        .collect::<Vec<_>>();

    let mut columns = metadata_columns;
    columns.extend(table::STRUCTURAL_COLUMNS.iter().map(|c| c.to_string()));
    let table = CoordinateTable::from_rows(columns, rows.into_iter().flatten())?;
    info!("Emitted {} coordinate rows from {} features", table.len(), features.len());
    Ok(table)
}
