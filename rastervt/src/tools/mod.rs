pub mod clump;
pub mod dump;
pub mod tile;
