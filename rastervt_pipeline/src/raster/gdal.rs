//! Any raster format GDAL can open.

use super::{Crs, RasterDataset};
use anyhow::{Context, Result};
use gdal::Dataset;
use rastervt_derive::context;
use std::path::Path;

pub struct GdalReader {
	dataset: Dataset,
	crs_override: Option<Crs>,
}

impl GdalReader {
	#[context("opening GDAL dataset {:?}", path)]
	pub fn open(path: &Path, crs_override: Option<Crs>) -> Result<GdalReader> {
		log::debug!("open {path:?}");
		let dataset = Dataset::open(path)?;
		log::trace!(
			"opened {path:?} ({}x{}, bands={})",
			dataset.raster_size().0,
			dataset.raster_size().1,
			dataset.raster_count()
		);
		Ok(GdalReader { dataset, crs_override })
	}
}

impl RasterDataset for GdalReader {
	fn size(&self) -> (usize, usize) {
		self.dataset.raster_size()
	}

	fn geo_transform(&self) -> Option<[f64; 6]> {
		self.dataset.geo_transform().ok()
	}

	fn crs(&self) -> Option<Crs> {
		if let Some(crs) = &self.crs_override {
			return Some(crs.clone());
		}
		let srs = self.dataset.spatial_ref().ok()?;
		match srs.auth_code() {
			Ok(3857) => Some(Crs::WebMercator),
			Ok(4326) => Some(Crs::Wgs84),
			_ => srs.to_wkt().ok().filter(|wkt| !wkt.is_empty()).map(|wkt| Crs::from_wkt(&wkt)),
		}
	}

	fn band_count(&self) -> usize {
		self.dataset.raster_count() as usize
	}

	fn nodata(&self, band: usize) -> Result<Option<f64>> {
		Ok(self.dataset.rasterband(band)?.no_data_value())
	}

	fn read_band(&self, band: usize) -> Result<Vec<f64>> {
		let buffer = self
			.dataset
			.rasterband(band)?
			.read_band_as::<f64>()
			.with_context(|| format!("reading band {band}"))?;
		Ok(buffer.data().to_vec())
	}
}
