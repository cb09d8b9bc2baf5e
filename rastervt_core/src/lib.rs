//! Shared building blocks of rastervt: tile coordinates and grids, bounding boxes, blobs,
//! tile compression, protobuf value readers/writers and the error taxonomy used by every stage
//! of the raster to vector tile pipeline.

pub mod compression;
mod concurrency;
mod error;
pub mod io;
pub mod types;

pub use concurrency::*;
pub use error::*;
pub use types::*;
