//! Tile storage for rastervt: an MBTiles container with its metadata, a single writer task
//! fed through a channel, and exporters that dump a container to files or clump it into one.

pub mod export;
mod mbtiles;
mod metadata;
mod sink;

pub use mbtiles::*;
pub use metadata::*;
pub use sink::*;
