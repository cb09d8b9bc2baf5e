//! # rastervt
//!
//! Turns a continuous raster (elevation, temperature, any scalar field) into a pyramid of vector
//! tiles. Cell values are grouped into bins of a fixed interval, every bin becomes one polygon
//! feature, and the features are clipped and encoded per tile into an MBTiles container.
//!
//! ## Usage Example
//!
//! ```no_run
//! use rastervt::{
//!     pipeline::{TileConfig, raster::{self, RasterSource}, tile_raster},
//! };
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dataset = raster::open(Path::new("dem.asc"), None)?;
//!     let source = RasterSource::from_dataset(dataset.as_ref(), 1)?;
//!     let config = TileConfig { interval: 10.0, ..TileConfig::default() };
//!     let run = tile_raster(source, Path::new("dem.mbtiles"), &config).await?;
//!     println!("wrote {} tiles", run.tiles.written);
//!     Ok(())
//! }
//! ```

pub use rastervt_container as container;
pub use rastervt_core as core;
pub use rastervt_derive as derive;
pub use rastervt_geometry as geometry;
pub use rastervt_pipeline as pipeline;
