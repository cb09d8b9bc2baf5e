//! Geometry for raster vectorization: isoband tracing, spatial indexing of band features,
//! tile clipping and the Mapbox Vector Tile codec.

pub mod clip;
mod feature;
pub mod isoband;
pub mod math;
pub mod vector_tile;

pub use feature::*;
