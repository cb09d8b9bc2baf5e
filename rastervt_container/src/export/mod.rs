//! Exporters that turn a container back into plain files.

mod clump;
mod dump;

pub use clump::{ClumpIndex, ClumpReport, clump};
pub use dump::{DumpOptions, DumpReport, dump, tile_path};
