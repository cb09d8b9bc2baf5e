//! `SQLite` file `*.mbtiles` as tile container
//!
//! - `MBTilesWriter`: creates a container and inserts compressed tiles.
//! - `MBTilesReader`: loads metadata, lists addresses and fetches payloads.

mod reader;
mod writer;

pub use reader::{MBTilesReader, TileCoordIter};
pub use writer::MBTilesWriter;
