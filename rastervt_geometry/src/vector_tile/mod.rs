//! Mapbox Vector Tile (MVT) encoding and decoding.
//!
//! - [`VectorTile`]: the protobuf message of a whole tile, a list of layers
//! - [`VectorTileLayer`]: name, extent, key/value tables and features
//! - [`VectorTileFeature`]: id, tag indices and the geometry command stream
//! - [`PropertyValue`]: typed entries of a layer's value table
//!
//! Only polygon geometries are produced and interpreted; other geometry types are kept as raw
//! command streams.

mod feature;
mod geometry_type;
mod layer;
mod property_manager;
mod tile;
mod value;

pub use feature::{TilePolygon, TileRing, VectorTileFeature};
pub use geometry_type::GeomType;
pub use layer::VectorTileLayer;
pub use property_manager::{Properties, PropertyManager};
pub use tile::VectorTile;
pub use value::PropertyValue;
