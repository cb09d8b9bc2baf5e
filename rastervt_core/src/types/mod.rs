mod blob;
mod geo_bbox;
pub mod mercator;
mod tile_bbox;
mod tile_compression;
mod tile_coord;
mod tile_grid;

pub use blob::*;
pub use geo_bbox::*;
pub use tile_bbox::*;
pub use tile_compression::*;
pub use tile_coord::*;
pub use tile_grid::*;
