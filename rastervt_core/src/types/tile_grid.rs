//! Square tile grids.
//!
//! A [`TileGrid`] is a square world of edge length `size` whose north-west corner sits at
//! `(x_origin, y_origin)`. Zoom level `z` cuts it into `2^z × 2^z` tiles; tile rows count from
//! the north (XYZ). Two grids exist:
//! - the global Web Mercator grid, used for EPSG:3857 and EPSG:4326 rasters
//! - a local grid fitted to a raster's bounds, used for every other CRS

use super::{GeoBBox, TileBBox, TileCoord, mercator};
use anyhow::{Result, ensure};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGrid {
	x_origin: f64,
	y_origin: f64,
	size: f64,
}

impl TileGrid {
	#[must_use]
	pub fn web_mercator() -> TileGrid {
		TileGrid {
			x_origin: -mercator::WORLD_SIZE / 2.0,
			y_origin: mercator::WORLD_SIZE / 2.0,
			size: mercator::WORLD_SIZE,
		}
	}

	/// The smallest square grid anchored at the north-west corner of `bounds` that covers it.
	pub fn fitted(bounds: &GeoBBox) -> Result<TileGrid> {
		let size = bounds.width().max(bounds.height());
		ensure!(size > 0.0, "cannot fit a tile grid to empty bounds {bounds:?}");
		Ok(TileGrid {
			x_origin: bounds.x_min,
			y_origin: bounds.y_max,
			size,
		})
	}

	/// Edge length of the whole grid, which is the zoom 0 tile.
	#[must_use]
	pub fn size(&self) -> f64 {
		self.size
	}

	#[must_use]
	pub fn tile_size(&self, level: u8) -> f64 {
		self.size / f64::from(1u32 << level)
	}

	/// Footprint of an XYZ tile in grid coordinates.
	pub fn tile_bounds(&self, coord: &TileCoord) -> Result<GeoBBox> {
		let tile_size = self.tile_size(coord.level);
		let x_min = self.x_origin + f64::from(coord.x) * tile_size;
		let y_max = self.y_origin - f64::from(coord.y) * tile_size;
		GeoBBox::new(x_min, y_max - tile_size, x_min + tile_size, y_max)
	}

	/// XYZ tiles at `level` touched by `bounds`, or `None` when `bounds` lies outside the grid.
	pub fn tile_range(&self, level: u8, bounds: &GeoBBox) -> Result<Option<TileBBox>> {
		// guards against float noise turning an exact tile edge into an extra column
		const EPSILON: f64 = 1e-9;

		let world = GeoBBox::new(
			self.x_origin,
			self.y_origin - self.size,
			self.x_origin + self.size,
			self.y_origin,
		)?;
		if !world.overlaps(bounds) {
			return Ok(None);
		}

		let tile_size = self.tile_size(level);
		let max = f64::from(TileCoord::max_index(level));
		let index = |v: f64| v.clamp(0.0, max) as u32;

		let x0 = ((bounds.x_min - self.x_origin) / tile_size + EPSILON).floor();
		let x1 = ((bounds.x_max - self.x_origin) / tile_size - EPSILON).ceil() - 1.0;
		let y0 = ((self.y_origin - bounds.y_max) / tile_size + EPSILON).floor();
		let y1 = ((self.y_origin - bounds.y_min) / tile_size - EPSILON).ceil() - 1.0;

		let (x0, y0) = (index(x0), index(y0));
		Ok(Some(TileBBox::from_min_and_max(
			level,
			x0,
			y0,
			index(x1).max(x0),
			index(y1).max(y0),
		)?))
	}
}
