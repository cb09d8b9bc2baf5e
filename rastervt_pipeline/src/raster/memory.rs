use super::{Crs, RasterDataset};
use anyhow::{Result, ensure};
use rastervt_core::GeoBBox;

/// A raster held in memory, row-major with row 0 at the top.
#[derive(Clone, Debug)]
pub struct MemoryRaster {
	width: usize,
	height: usize,
	bands: Vec<Vec<f64>>,
	geo_transform: Option<[f64; 6]>,
	crs: Option<Crs>,
	nodata: Option<f64>,
}

impl MemoryRaster {
	pub fn new(width: usize, height: usize, bands: Vec<Vec<f64>>) -> Result<MemoryRaster> {
		for (index, band) in bands.iter().enumerate() {
			ensure!(
				band.len() == width * height,
				"band {} has {} values, expected {}",
				index + 1,
				band.len(),
				width * height
			);
		}
		Ok(MemoryRaster {
			width,
			height,
			bands,
			geo_transform: None,
			crs: None,
			nodata: None,
		})
	}

	/// Single band raster filled with `value`.
	pub fn filled(width: usize, height: usize, value: f64) -> Result<MemoryRaster> {
		MemoryRaster::new(width, height, vec![vec![value; width * height]])
	}

	/// North-up transform that stretches the pixels over `bounds`.
	#[must_use]
	pub fn with_bounds(self, bounds: &GeoBBox) -> MemoryRaster {
		let sx = bounds.width() / self.width as f64;
		let sy = bounds.height() / self.height as f64;
		self.with_geo_transform([bounds.x_min, sx, 0.0, bounds.y_max, 0.0, -sy])
	}

	/// GDAL-style affine transform: `[x0, sx, rx, y0, ry, sy]`.
	#[must_use]
	pub fn with_geo_transform(mut self, geo_transform: [f64; 6]) -> MemoryRaster {
		self.geo_transform = Some(geo_transform);
		self
	}

	#[must_use]
	pub fn with_crs(mut self, crs: Crs) -> MemoryRaster {
		self.crs = Some(crs);
		self
	}

	#[must_use]
	pub fn with_nodata(mut self, nodata: f64) -> MemoryRaster {
		self.nodata = Some(nodata);
		self
	}
}

impl RasterDataset for MemoryRaster {
	fn size(&self) -> (usize, usize) {
		(self.width, self.height)
	}

	fn geo_transform(&self) -> Option<[f64; 6]> {
		self.geo_transform
	}

	fn crs(&self) -> Option<Crs> {
		self.crs.clone()
	}

	fn band_count(&self) -> usize {
		self.bands.len()
	}

	fn nodata(&self, _band: usize) -> Result<Option<f64>> {
		Ok(self.nodata)
	}

	fn read_band(&self, band: usize) -> Result<Vec<f64>> {
		band
			.checked_sub(1)
			.and_then(|index| self.bands.get(index))
			.cloned()
			.ok_or_else(|| anyhow::anyhow!("band {band} does not exist"))
	}
}
