/*!
Long-format coordinate table: one row per (x, y) point.
Structural columns tell which feature / part / ring a point belongs to, every other column is per-feature metadata.
 */
use serde_json::Value;

use crate::error::{Error, Result};
use crate::utils;

pub const ROW_ID: &str = "row_id";
pub const GEOMETRY_TYPE: &str = "geometry_type";
pub const X: &str = "x";
pub const Y: &str = "y";
pub const COORDS: &str = "coords";
pub const POLYGON_ID: &str = "polygon_id";
pub const INTERIOR_ID: &str = "interior_id";

/// Structural columns in the order the flattener writes them
pub const STRUCTURAL_COLUMNS: [&str; 7] = [ROW_ID, GEOMETRY_TYPE, X, Y, COORDS, POLYGON_ID, INTERIOR_ID];

/// Value of the `coords` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordsKind {
    /// Exterior ring, line or point set
    Exterior,
    /// Polygon hole
    Interior,
}

impl CoordsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordsKind::Exterior => "coords",
            CoordsKind::Interior => "interior_coords",
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "coords" => Some(CoordsKind::Exterior),
            "interior_coords" => Some(CoordsKind::Interior),
            _ => None,
        }
    }
}

pub fn is_structural(column: &str) -> bool {
    STRUCTURAL_COLUMNS.contains(&column)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl CoordinateTable {
    pub fn new(columns: Vec<String>) -> Self {
        CoordinateTable {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: impl IntoIterator<Item = Vec<Value>>) -> Result<Self> {
        let mut table = CoordinateTable::new(columns);
        table.extend(rows)?;
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::ColumnLength {
                column: format!("row {}", self.rows.len()),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = Vec<Value>>) -> Result<()> {
        rows.into_iter().try_for_each(|row| self.push_row(row))
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[index]))
    }

    /**
    Appends a column, or replaces it if the name already exists.
    Used to attach externally transformed coordinates (e.g. `x_warped`, `y_warped`).
     */
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::ColumnLength {
                column: name.to_string(),
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        match self.column_index(name) {
            Ok(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            Err(_) => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    pub fn value(&self, row: usize, column: usize) -> &Value {
        &self.rows[row][column]
    }

    fn invalid(&self, row: usize, column: usize) -> Error {
        Error::InvalidValue {
            column: self.columns[column].clone(),
            row,
            value: self.value(row, column).clone(),
        }
    }

    pub fn index_at(&self, row: usize, column: usize) -> Result<i64> {
        utils::as_index(self.value(row, column)).ok_or_else(|| self.invalid(row, column))
    }

    /// Like [`Self::index_at`] but null cells are `None`
    pub fn optional_index_at(&self, row: usize, column: usize) -> Result<Option<i64>> {
        match self.value(row, column) {
            Value::Null => Ok(None),
            _ => self.index_at(row, column).map(Some),
        }
    }

    pub fn float_at(&self, row: usize, column: usize) -> Result<f64> {
        utils::as_float(self.value(row, column)).ok_or_else(|| self.invalid(row, column))
    }
}
