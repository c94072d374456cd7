/*!
Reconstructor: long-format coordinate table → feature collection.

Rows are grouped by `row_id`, then by `polygon_id` and `interior_id` for polygons. Every grouping goes
through ordered maps and keeps table row order inside a group, since ring order is only encoded by it.
 */
use std::collections::BTreeMap;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::classification;
use crate::error::{Error, Result};
use crate::geometry::{Coord, Feature, Geometry, GeometryType, Polygon, Ring};
use crate::table::{self, CoordinateTable, CoordsKind};

/// Attribute defaulted when null, annotation viewers reject features without a name
pub const NAME: &str = "name";
pub const DEFAULT_NAME: &str = "Annotation";

/// Positions of the columns reconstruction relies on
struct Columns {
    geometry_type: usize,
    coords: usize,
    polygon_id: usize,
    interior_id: usize,
    x: usize,
    y: usize,
    metadata: Vec<(usize, String)>,
}

impl Columns {
    fn locate(table: &CoordinateTable, x_col: &str, y_col: &str) -> Result<Self> {
        let metadata = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, name)| !table::is_structural(name) && *name != x_col && *name != y_col)
            .map(|(index, name)| (index, name.clone()))
            .collect();
        Ok(Columns {
            geometry_type: table.column_index(table::GEOMETRY_TYPE)?,
            coords: table.column_index(table::COORDS)?,
            polygon_id: table.column_index(table::POLYGON_ID)?,
            interior_id: table.column_index(table::INTERIOR_ID)?,
            x: table.column_index(x_col)?,
            y: table.column_index(y_col)?,
            metadata,
        })
    }
}

struct Group<'a> {
    table: &'a CoordinateTable,
    columns: &'a Columns,
    row_id: i64,
    rows: &'a [usize],
}

impl<'a> Group<'a> {
    fn point(&self, row: usize) -> Result<Coord> {
        Ok([
            self.table.float_at(row, self.columns.x)?,
            self.table.float_at(row, self.columns.y)?,
        ])
    }

    fn points(&self) -> Result<Vec<Coord>> {
        self.rows.iter().map(|&row| self.point(row)).collect()
    }

    fn metadata(&self) -> Map<String, Value> {
        let first = self.rows[0];
        self.columns
            .metadata
            .iter()
            .map(|(index, name)| (name.clone(), self.table.value(first, *index).clone()))
            .collect()
    }

    /// One polygon per `polygon_id`, ascending
    fn polygons(&self) -> Result<Vec<Polygon>> {
        let mut parts: BTreeMap<i64, (Ring, BTreeMap<i64, Ring>)> = BTreeMap::new();
        for &row in self.rows {
            let polygon_id = self.table.index_at(row, self.columns.polygon_id)?;
            match CoordsKind::from_value(self.table.value(row, self.columns.coords)) {
                Some(CoordsKind::Exterior) => {
                    parts.entry(polygon_id).or_default().0.push(self.point(row)?);
                }
                Some(CoordsKind::Interior) => {
                    let interior_id = self.table.index_at(row, self.columns.interior_id)?;
                    let (_, interiors) = parts.entry(polygon_id).or_default();
                    interiors.entry(interior_id).or_default().push(self.point(row)?);
                }
                None => warn!(
                    "Feature {} : ignoring row {} with coords marker {}",
                    self.row_id,
                    row,
                    self.table.value(row, self.columns.coords)
                ),
            }
        }

        parts
            .into_iter()
            .map(|(polygon_id, (exterior, interiors))| {
                if exterior.is_empty() {
                    return Err(Error::MissingExterior {
                        row_id: self.row_id,
                        polygon_id,
                    });
                }
                Ok(Polygon::new(exterior, interiors.into_values().collect()))
            })
            .collect()
    }

    fn geometry(&self, typ: GeometryType) -> Result<Option<Geometry>> {
        let geometry = match typ {
            GeometryType::Point => Geometry::Point(self.point(self.rows[0])?),
            GeometryType::MultiPoint => Geometry::MultiPoint(self.points()?),
            GeometryType::LineString => Geometry::LineString(self.points()?),
            GeometryType::MultiLineString => {
                // Parts are not split on polygon_id, all points end up in a single line
                let mut part_ids = self
                    .rows
                    .iter()
                    .map(|&row| self.table.index_at(row, self.columns.polygon_id))
                    .collect::<Result<Vec<_>>>()?;
                part_ids.dedup();
                if part_ids.len() > 1 {
                    warn!(
                        "Feature {} : {} MultiLineString parts merged into a single line",
                        self.row_id,
                        part_ids.len()
                    );
                }
                Geometry::MultiLineString(vec![self.points()?])
            }
            GeometryType::Polygon | GeometryType::MultiPolygon => {
                let mut polygons = self.polygons()?;
                if polygons.is_empty() {
                    return Ok(None);
                }
                if typ == GeometryType::Polygon {
                    Geometry::Polygon(polygons.swap_remove(0))
                } else {
                    Geometry::MultiPolygon(polygons)
                }
            }
        };
        Ok(Some(geometry))
    }

    fn feature(&self, classification_merge: bool) -> Result<Feature> {
        let first = self.rows[0];
        let typ = self.table.value(first, self.columns.geometry_type);
        let geometry = match typ.as_str().map(str::parse::<GeometryType>) {
            Some(Ok(typ)) => self.geometry(typ)?,
            _ => {
                warn!("Feature {} : unknown geometry type {}, geometry left empty", self.row_id, typ);
                None
            }
        };

        let mut properties = self.metadata();
        if classification_merge {
            classification::merge(&mut properties);
        }
        if let Some(name) = properties.get_mut(NAME) {
            if name.is_null() {
                *name = Value::from(DEFAULT_NAME);
            }
        }
        debug!("Feature {} : {} rows rebuilt", self.row_id, self.rows.len());

        Ok(Feature { geometry, properties })
    }
}

/**
Rebuilds features from a coordinate table, reading point coordinates from `x_col` / `y_col`.

Features come out in ascending `row_id` order. Any two numeric columns can serve as coordinates,
e.g. the columns a warping tool appended. Fails with [`Error::MissingColumn`] if a structural or
coordinate column is absent.
 */
pub fn reconstruct(table: &CoordinateTable, x_col: &str, y_col: &str, classification_merge: bool) -> Result<Vec<Feature>> {
    let row_id_column = table.column_index(table::ROW_ID)?;
    let columns = Columns::locate(table, x_col, y_col)?;
    info!("Rebuilding geometries from {} coordinate rows", table.len());

    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for row in 0..table.len() {
        groups.entry(table.index_at(row, row_id_column)?).or_default().push(row);
    }
    let groups = groups.into_iter().collect::<Vec<_>>();

    let features = groups
        .par_iter()
        .map(|(row_id, rows)| {
            Group {
                table,
                columns: &columns,
                row_id: *row_id,
                rows,
            }
            .feature(classification_merge)
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Rebuilt {} features", features.len());
    Ok(features)
}
