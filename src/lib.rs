/*!
Converts geometric feature collections to a flat table of tagged (x, y) rows for external point warping tools,
and rebuilds the features from the (warped) table.
 */
pub mod classification;
pub mod error;
pub mod flatten;
pub mod geojson;
pub mod geometry;
pub mod io;
pub mod reconstruct;
pub mod table;
mod utils;

pub use error::{Error, Result};
pub use flatten::flatten;
pub use geometry::{Coord, Feature, Geometry, GeometryType, Polygon};
pub use reconstruct::reconstruct;
pub use table::{CoordinateTable, CoordsKind};
