//! The raster to vector tile pipeline.
//!
//! A run reads one raster band ([`raster`]), plans the zoom levels ([`pyramid`]), vectorizes
//! the band into interval bins once and then clips and encodes those bins for every tile of
//! every level ([`tiler`]). Tiles go to a single MBTiles writer task.

mod config;
pub mod pyramid;
pub mod raster;
mod run;
pub mod tiler;

pub use config::TileConfig;
pub use run::{TileRun, tile_raster};
