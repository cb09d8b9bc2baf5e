//! Tile addresses `(level, x, y)`.
//!
//! A [`TileCoord`] does not know whether its row counts from the north (XYZ, used while tiling)
//! or from the south (TMS, used by MBTiles). [`TileCoord::flipped_y`] converts between both.
//!
//! ```
//! use rastervt_core::TileCoord;
//!
//! let xyz = TileCoord::new(3, 2, 1).unwrap();
//! assert_eq!(xyz.flipped_y(), TileCoord::new(3, 2, 6).unwrap());
//! ```

use anyhow::{Result, ensure};
use std::fmt::{self, Debug, Display};

/// Deepest supported zoom level.
pub const MAX_LEVEL: u8 = 30;

#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Copy)]
pub struct TileCoord {
	pub level: u8,
	pub x: u32,
	pub y: u32,
}

impl TileCoord {
	/// Creates a coordinate, checking `level <= 30` and `x, y < 2^level`.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= MAX_LEVEL, "level ({level}) must be <= {MAX_LEVEL}");
		let max = 1u32 << level;
		ensure!(x < max, "x ({x}) out of bounds for level {level}");
		ensure!(y < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Largest valid x or y index at `level`.
	#[must_use]
	pub fn max_index(level: u8) -> u32 {
		(1u32 << level) - 1
	}

	/// Mirrors the row between XYZ and TMS numbering: `y' = 2^level - 1 - y`.
	#[must_use]
	pub fn flipped_y(&self) -> TileCoord {
		TileCoord {
			level: self.level,
			x: self.x,
			y: TileCoord::max_index(self.level) - self.y,
		}
	}

	pub fn flip_y(&mut self) {
		self.y = TileCoord::max_index(self.level) - self.y;
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}

/// `level/x/y`, the layout used in tile paths and clump indexes.
impl Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}
