//! Zoom range and per-level tile extents.

use anyhow::Result;
use rastervt_core::RasterVtError;
use rastervt_derive::context;

/// Highest zoom level a run produces.
pub const MAX_ZOOM: u8 = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoomLevel {
	pub level: u8,
	/// Integer grid size tile geometry is quantized to.
	pub extent: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pyramid {
	levels: Vec<ZoomLevel>,
}

pub fn ensure_extent_range(min_extent: u32, max_extent: u32) -> Result<()> {
	if min_extent == 0 || max_extent == 0 || min_extent > max_extent {
		Err(RasterVtError::InvalidExtentRange {
			min: min_extent,
			max: max_extent,
		}
		.into())
	} else {
		Ok(())
	}
}

impl Pyramid {
	/// Plans the zoom levels of a run.
	///
	/// `maxzoom = clamp(native_max_zoom + zoom_adjust, 0, 24)`, `minzoom` is 0 unless
	/// `min_zoom` raises it (never above `maxzoom`). Extents grow linearly from `min_extent`
	/// at `minzoom` to `max_extent` at `maxzoom`; a single level uses `max_extent`.
	#[context("planning zoom levels")]
	pub fn plan(
		min_extent: u32,
		max_extent: u32,
		zoom_adjust: i32,
		native_max_zoom: i32,
		min_zoom: Option<u8>,
	) -> Result<Pyramid> {
		ensure_extent_range(min_extent, max_extent)?;

		let max_zoom = native_max_zoom
			.saturating_add(zoom_adjust)
			.clamp(0, i32::from(MAX_ZOOM)) as u8;
		let min_zoom = min_zoom.unwrap_or(0).min(max_zoom);

		let span = f64::from((max_zoom - min_zoom).max(1));
		let range = f64::from(max_extent - min_extent);
		let levels = (min_zoom..=max_zoom)
			.map(|level| {
				let extent = if min_zoom == max_zoom {
					max_extent
				} else {
					(f64::from(min_extent) + range * f64::from(level - min_zoom) / span).round() as u32
				};
				ZoomLevel { level, extent }
			})
			.collect();

		log::debug!("zoom levels {min_zoom}..={max_zoom}, extents {min_extent}..={max_extent}");
		Ok(Pyramid { levels })
	}

	#[must_use]
	pub fn levels(&self) -> &[ZoomLevel] {
		&self.levels
	}

	#[must_use]
	pub fn min_zoom(&self) -> u8 {
		self.levels.first().map_or(0, |l| l.level)
	}

	#[must_use]
	pub fn max_zoom(&self) -> u8 {
		self.levels.last().map_or(0, |l| l.level)
	}

	#[must_use]
	pub fn extent(&self, level: u8) -> Option<u32> {
		self.levels.iter().find(|l| l.level == level).map(|l| l.extent)
	}
}
