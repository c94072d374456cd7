/*!
File adapters around the pure core.

GeoJSON files are (de)serialized with serde, coordinate tables go through polars data frames so they can be
persisted as CSV (the format point warping tools read), Parquet or Arrow IPC.
 */
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use polars::prelude::*;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::geojson;
use crate::geometry::Feature;
use crate::table::CoordinateTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
    Ipc,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(TableFormat::Csv),
            Some("parquet") => Ok(TableFormat::Parquet),
            Some("ipc") | Some("arrow") | Some("feather") => Ok(TableFormat::Ipc),
            _ => Err(Error::TypeUsage(format!("{:?} is not a csv, parquet or ipc file", path))),
        }
    }
}

fn check_geojson_path(path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("geojson") | Some("json") => Ok(()),
        _ => Err(Error::TypeUsage(format!("{:?} is not a geojson file", path))),
    }
}

pub fn read_features(path: &Path) -> Result<Vec<Feature>> {
    check_geojson_path(path)?;
    let file = BufReader::new(File::open(path)?);
    let document: Value = serde_json::from_reader(file)?;
    let features = geojson::parse_features(document)?
        .into_iter()
        .map(Feature::try_from)
        .collect::<Result<Vec<_>>>()?;
    info!("Loaded {} geometries from {:?}", features.len(), path);
    Ok(features)
}

pub fn write_features(path: &Path, features: Vec<Feature>) -> Result<()> {
    check_geojson_path(path)?;
    let count = features.len();
    let collection = geojson::FeatureCollection::with_default_crs(features.into_iter().map(Into::into).collect());
    std::fs::write(path, serde_json::to_string(&collection)?)?;
    info!("Saved GeoJSON with {} geometries to {:?}", count, path);
    Ok(())
}

/// Narrowest column type holding every non-null cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

fn column_kind<'a>(values: impl Iterator<Item = &'a Value>) -> ColumnKind {
    let mut kind = None;
    for value in values {
        let cell = match value {
            Value::Null => continue,
            Value::Number(n) if n.is_i64() => ColumnKind::Int,
            Value::Number(_) => ColumnKind::Float,
            Value::Bool(_) => ColumnKind::Bool,
            _ => return ColumnKind::Text,
        };
        kind = match (kind, cell) {
            (None, cell) => Some(cell),
            (Some(a), b) if a == b => Some(a),
            (Some(ColumnKind::Int), ColumnKind::Float) | (Some(ColumnKind::Float), ColumnKind::Int) => Some(ColumnKind::Float),
            _ => return ColumnKind::Text,
        };
    }
    kind.unwrap_or(ColumnKind::Text)
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn table_to_frame(table: &CoordinateTable) -> Result<DataFrame> {
    let series = table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let values = || table.rows().iter().map(move |row| &row[index]);
            match column_kind(values()) {
                ColumnKind::Int => Series::new(name.as_str(), values().map(Value::as_i64).collect::<Vec<_>>()),
                ColumnKind::Float => Series::new(name.as_str(), values().map(Value::as_f64).collect::<Vec<_>>()),
                ColumnKind::Bool => Series::new(name.as_str(), values().map(Value::as_bool).collect::<Vec<_>>()),
                ColumnKind::Text => Series::new(name.as_str(), values().map(text).collect::<Vec<_>>()),
            }
        })
        .collect::<Vec<_>>();
    Ok(DataFrame::new(series)?)
}

fn series_values(series: &Series) -> Result<Vec<Value>> {
    let to_value = |v: Option<Value>| v.unwrap_or(Value::Null);
    let values: Vec<Value> = match series.dtype() {
        DataType::Boolean => series.bool()?.into_iter().map(|v| to_value(v.map(Value::from))).collect(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let casted = series.cast(&DataType::Int64)?;
            let values: Vec<Value> = casted.i64()?.into_iter().map(|v| to_value(v.map(Value::from))).collect();
            values
        }
        DataType::UInt64 | DataType::Float32 | DataType::Float64 => {
            let casted = series.cast(&DataType::Float64)?;
            let values: Vec<Value> = casted.f64()?.into_iter().map(|v| to_value(v.map(Value::from))).collect();
            values
        }
        DataType::Utf8 => series.utf8()?.into_iter().map(|v| to_value(v.map(Value::from))).collect(),
        _ => {
            let casted = series.cast(&DataType::Utf8)?;
            let values: Vec<Value> = casted.utf8()?.into_iter().map(|v| to_value(v.map(Value::from))).collect();
            values
        }
    };
    Ok(values)
}

pub fn frame_to_table(frame: &DataFrame) -> Result<CoordinateTable> {
    let columns = frame.get_column_names().iter().map(|name| name.to_string()).collect::<Vec<_>>();
    let cells = frame.get_columns().iter().map(series_values).collect::<Result<Vec<_>>>()?;
    let rows = (0..frame.height()).map(|row| cells.iter().map(|column| column[row].clone()).collect::<Vec<_>>());
    CoordinateTable::from_rows(columns, rows)
}

pub fn read_table(path: &Path) -> Result<CoordinateTable> {
    let frame = match TableFormat::from_path(path)? {
        TableFormat::Csv => CsvReader::from_path(path)?.has_header(true).infer_schema(None).finish()?,
        TableFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
        TableFormat::Ipc => IpcReader::new(File::open(path)?).finish()?,
    };
    let table = frame_to_table(&frame)?;
    info!("Loaded {} rows from {:?}", table.len(), path);
    Ok(table)
}

/// Serializes the whole table before touching `path`, a failed write leaves no partial file behind
pub fn write_table(path: &Path, table: &CoordinateTable) -> Result<()> {
    let format = TableFormat::from_path(path)?;
    let mut frame = table_to_frame(table)?;
    let mut buffer: Vec<u8> = Vec::new();
    match format {
        TableFormat::Csv => CsvWriter::new(&mut buffer).has_header(true).finish(&mut frame)?,
        TableFormat::Parquet => {
            ParquetWriter::new(&mut buffer).finish(&mut frame)?;
        }
        TableFormat::Ipc => IpcWriter::new(&mut buffer).finish(&mut frame)?,
    }
    std::fs::write(path, buffer)?;
    info!("Saved {} coordinate rows to {:?}", table.len(), path);
    Ok(())
}
