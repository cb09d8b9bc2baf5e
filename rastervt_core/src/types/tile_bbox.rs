//! Rectangular ranges of tiles on one zoom level.

use super::TileCoord;
use anyhow::{Result, ensure};
use itertools::Itertools;
use std::fmt::{self, Debug};

/// Inclusive tile range `x_min..=x_max × y_min..=y_max` on `level`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileBBox {
	pub level: u8,
	x_min: u32,
	y_min: u32,
	x_max: u32,
	y_max: u32,
}

impl TileBBox {
	pub fn from_min_and_max(level: u8, x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Result<TileBBox> {
		TileCoord::new(level, x_max, y_max)?;
		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		Ok(TileBBox {
			level,
			x_min,
			y_min,
			x_max,
			y_max,
		})
	}

	/// Every tile of `level`.
	pub fn new_full(level: u8) -> Result<TileBBox> {
		let max = TileCoord::max_index(level);
		TileBBox::from_min_and_max(level, 0, 0, max, max)
	}

	#[must_use]
	pub fn x_min(&self) -> u32 {
		self.x_min
	}

	#[must_use]
	pub fn y_min(&self) -> u32 {
		self.y_min
	}

	#[must_use]
	pub fn x_max(&self) -> u32 {
		self.x_max
	}

	#[must_use]
	pub fn y_max(&self) -> u32 {
		self.y_max
	}

	#[must_use]
	pub fn width(&self) -> u32 {
		self.x_max - self.x_min + 1
	}

	#[must_use]
	pub fn height(&self) -> u32 {
		self.y_max - self.y_min + 1
	}

	#[must_use]
	pub fn count_tiles(&self) -> u64 {
		u64::from(self.width()) * u64::from(self.height())
	}

	#[must_use]
	pub fn contains(&self, coord: &TileCoord) -> bool {
		coord.level == self.level
			&& (self.x_min..=self.x_max).contains(&coord.x)
			&& (self.y_min..=self.y_max).contains(&coord.y)
	}

	/// Row-major iteration over all coordinates in the range.
	pub fn iter_coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
		let level = self.level;
		(self.y_min..=self.y_max)
			.cartesian_product(self.x_min..=self.x_max)
			.map(move |(y, x)| TileCoord { level, x, y })
	}
}

impl Debug for TileBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}: [{},{},{},{}] ({})",
			self.level,
			self.x_min,
			self.y_min,
			self.x_max,
			self.y_max,
			self.count_tiles()
		)
	}
}
