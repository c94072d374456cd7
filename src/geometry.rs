/*!
Typed geometries and features.
A geometry is one of the six supported kinds, anything else is kept as [`Geometry::Unsupported`] with its type name.
 */
use log::warn;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::geojson;

pub type Coord = [f64; 2];
pub type Ring = Vec<Coord>;

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub interiors: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, interiors: Vec<Ring>) -> Self {
        Polygon { exterior, interiors }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
    /// Any other GeoJSON type (e.g. `GeometryCollection`)
    Unsupported(String),
}

/// Tag of a supported geometry as written in the `geometry_type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl GeometryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::LineString => "LineString",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPolygon => "MultiPolygon",
        }
    }
}

impl std::str::FromStr for GeometryType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Point" => Ok(GeometryType::Point),
            "MultiPoint" => Ok(GeometryType::MultiPoint),
            "LineString" => Ok(GeometryType::LineString),
            "MultiLineString" => Ok(GeometryType::MultiLineString),
            "Polygon" => Ok(GeometryType::Polygon),
            "MultiPolygon" => Ok(GeometryType::MultiPolygon),
            _ => Err(format!("{} is not a supported geometry type", s)),
        }
    }
}

impl Geometry {
    pub fn geometry_type(&self) -> Option<GeometryType> {
        match self {
            Geometry::Point(_) => Some(GeometryType::Point),
            Geometry::MultiPoint(_) => Some(GeometryType::MultiPoint),
            Geometry::LineString(_) => Some(GeometryType::LineString),
            Geometry::MultiLineString(_) => Some(GeometryType::MultiLineString),
            Geometry::Polygon(_) => Some(GeometryType::Polygon),
            Geometry::MultiPolygon(_) => Some(GeometryType::MultiPolygon),
            Geometry::Unsupported(_) => None,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Geometry::Unsupported(name) => name,
            supported => supported.geometry_type().map(|t| t.as_str()).unwrap_or_default(),
        }
    }

    /// GeoJSON representation, `None` for unsupported geometries
    pub fn to_geojson(&self) -> Option<geojson::Geometry> {
        let coordinates = match self {
            Geometry::Point(point) => coord_value(point),
            Geometry::MultiPoint(points) | Geometry::LineString(points) => line_value(points),
            Geometry::MultiLineString(lines) => Value::Array(lines.iter().map(|l| line_value(l)).collect()),
            Geometry::Polygon(polygon) => polygon_value(polygon),
            Geometry::MultiPolygon(polygons) => Value::Array(polygons.iter().map(polygon_value).collect()),
            Geometry::Unsupported(_) => return None,
        };
        Some(geojson::Geometry {
            typ: self.type_name().to_string(),
            coordinates: Some(coordinates),
        })
    }
}

fn coord_value(coord: &Coord) -> Value {
    Value::Array(vec![Value::from(coord[0]), Value::from(coord[1])])
}

fn line_value(points: &[Coord]) -> Value {
    Value::Array(points.iter().map(coord_value).collect())
}

fn polygon_value(polygon: &Polygon) -> Value {
    let rings = std::iter::once(&polygon.exterior).chain(polygon.interiors.iter());
    Value::Array(rings.map(|ring| line_value(ring)).collect())
}

type Positions = Vec<f64>;

fn position(raw: Positions) -> Result<Coord> {
    match raw.as_slice() {
        [x, y, ..] => Ok([*x, *y]),
        _ => Err(Error::InvalidGeometry(format!("position with {} components", raw.len()))),
    }
}

fn positions(raw: Vec<Positions>) -> Result<Vec<Coord>> {
    raw.into_iter().map(position).collect()
}

/// An empty polygon (`[]`) has no rings and contributes no rows
fn polygon(raw: Vec<Vec<Positions>>) -> Result<Polygon> {
    let mut rings = raw.into_iter().map(positions);
    let exterior = match rings.next() {
        Some(exterior) => exterior?,
        None => return Ok(Polygon::new(vec![], vec![])),
    };
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

impl TryFrom<geojson::Geometry> for Geometry {
    type Error = Error;

    fn try_from(raw: geojson::Geometry) -> Result<Self> {
        let Ok(typ) = raw.typ.parse::<GeometryType>() else {
            return Ok(Geometry::Unsupported(raw.typ));
        };
        let coordinates = raw
            .coordinates
            .ok_or_else(|| Error::InvalidGeometry(format!("{} without coordinates", raw.typ)))?;

        let geometry = match typ {
            GeometryType::Point => Geometry::Point(position(serde_json::from_value(coordinates)?)?),
            GeometryType::MultiPoint => Geometry::MultiPoint(positions(serde_json::from_value(coordinates)?)?),
            GeometryType::LineString => Geometry::LineString(positions(serde_json::from_value(coordinates)?)?),
            GeometryType::MultiLineString => {
                let raw: Vec<Vec<Positions>> = serde_json::from_value(coordinates)?;
                Geometry::MultiLineString(raw.into_iter().map(positions).collect::<Result<_>>()?)
            }
            GeometryType::Polygon => Geometry::Polygon(polygon(serde_json::from_value(coordinates)?)?),
            GeometryType::MultiPolygon => {
                let raw: Vec<Vec<Vec<Positions>>> = serde_json::from_value(coordinates)?;
                Geometry::MultiPolygon(raw.into_iter().map(polygon).collect::<Result<_>>()?)
            }
        };
        Ok(geometry)
    }
}

/// One geometry and its metadata attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Feature {
            geometry: Some(geometry),
            properties,
        }
    }
}

impl TryFrom<geojson::Feature> for Feature {
    type Error = Error;

    fn try_from(raw: geojson::Feature) -> Result<Self> {
        let geometry = match raw.geometry {
            Some(geometry) if geometry.is_empty() => {
                warn!("Empty {} geometry, feature kept without coordinates", geometry.typ);
                None
            }
            geometry => geometry.map(Geometry::try_from).transpose()?,
        };
        Ok(Feature {
            geometry,
            properties: raw.properties.unwrap_or_default(),
        })
    }
}

impl From<Feature> for geojson::Feature {
    fn from(feature: Feature) -> Self {
        geojson::Feature {
            typ: "Feature".to_string(),
            geometry: feature.geometry.as_ref().and_then(Geometry::to_geojson),
            properties: Some(feature.properties),
        }
    }
}
