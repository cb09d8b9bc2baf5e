//! Raster input: dataset readers and the validated [`RasterSource`] a tiling run works on.

mod ascii_grid;
mod crs;
#[cfg(feature = "gdal")]
mod gdal;
mod memory;

pub use ascii_grid::AsciiGridReader;
pub use crs::Crs;
#[cfg(feature = "gdal")]
pub use gdal::GdalReader;
pub use memory::MemoryRaster;

use anyhow::Result;
use geo::Coord;
use rastervt_core::{GeoBBox, RasterVtError, TileGrid, mercator};
use rastervt_derive::context;
use rastervt_geometry::{FeatureCollection, isoband::RasterBand};
use std::path::Path;

/// What the pipeline needs from an opened raster. Bands are 1-based.
pub trait RasterDataset {
	/// Width and height in pixels.
	fn size(&self) -> (usize, usize);
	/// GDAL-style affine transform `[x0, sx, rx, y0, ry, sy]`.
	fn geo_transform(&self) -> Option<[f64; 6]>;
	fn crs(&self) -> Option<Crs>;
	fn band_count(&self) -> usize;
	fn nodata(&self, band: usize) -> Result<Option<f64>>;
	/// Row-major values in the dataset's own row order.
	fn read_band(&self, band: usize) -> Result<Vec<f64>>;
}

/// Opens `path` with the reader matching its extension.
///
/// `*.asc` files are read directly, everything else needs the `gdal` feature.
#[context("reading raster {:?}", path)]
pub fn open(path: &Path, crs: Option<Crs>) -> Result<Box<dyn RasterDataset>> {
	let extension = path
		.extension()
		.and_then(|e| e.to_str())
		.unwrap_or_default()
		.to_ascii_lowercase();
	if extension == "asc" {
		return Ok(Box::new(AsciiGridReader::open(path, crs)?));
	}

	#[cfg(feature = "gdal")]
	{
		Ok(Box::new(GdalReader::open(path, crs)?))
	}
	#[cfg(not(feature = "gdal"))]
	{
		let _ = crs;
		anyhow::bail!("unsupported raster format '{extension}', build with the `gdal` feature to read it")
	}
}

fn invalid(message: String) -> anyhow::Error {
	RasterVtError::InvalidRaster(message).into()
}

/// One band of a raster with its georeferencing, north-up and validated.
#[derive(Clone, Debug)]
pub struct RasterSource {
	pub width: usize,
	pub height: usize,
	pub bounds: GeoBBox,
	/// Positive pixel width and height in CRS units.
	pub pixel_size: (f64, f64),
	pub crs: Crs,
	pub nodata: Option<f64>,
	pub band_count: usize,
	values: Vec<f64>,
}

impl RasterSource {
	/// Reads and validates one band of `dataset`.
	///
	/// Fails with [`RasterVtError::InvalidRaster`] when the raster has no CRS, no bands, no
	/// pixels, a rotated transform, an unusable pixel size or when `band` does not exist.
	#[context("loading band {} of the raster", band)]
	pub fn from_dataset(dataset: &dyn RasterDataset, band: usize) -> Result<RasterSource> {
		let crs = dataset.crs().ok_or_else(|| invalid("raster has no CRS".to_string()))?;

		let band_count = dataset.band_count();
		if band_count == 0 {
			return Err(invalid("raster has no bands".to_string()));
		}
		if band == 0 || band > band_count {
			return Err(invalid(format!("band {band} is outside 1..={band_count}")));
		}

		let (width, height) = dataset.size();
		if width == 0 || height == 0 {
			return Err(invalid(format!("raster has no pixels ({width}x{height})")));
		}

		let gt = dataset
			.geo_transform()
			.ok_or_else(|| invalid("raster has no geotransform".to_string()))?;
		if gt[2] != 0.0 || gt[4] != 0.0 {
			return Err(invalid(format!("rotated geotransform {gt:?} is not supported")));
		}
		let (sx, sy) = (gt[1], gt[5]);
		if !(sx.is_finite() && sy.is_finite() && sx > 0.0 && sy != 0.0) || !gt[0].is_finite() || !gt[3].is_finite() {
			return Err(invalid(format!("invalid pixel size {sx} x {sy}")));
		}

		let mut values = dataset.read_band(band)?;
		if values.len() != width * height {
			return Err(invalid(format!(
				"band {band} has {} values, expected {width}x{height}",
				values.len()
			)));
		}

		let x_max = gt[0] + sx * width as f64;
		let y_end = gt[3] + sy * height as f64;
		let bounds = if sy < 0.0 {
			GeoBBox::new(gt[0], y_end, x_max, gt[3])?
		} else {
			// south-up rows are turned north-up
			values = values
				.chunks_exact(width)
				.rev()
				.flatten()
				.copied()
				.collect();
			GeoBBox::new(gt[0], gt[3], x_max, y_end)?
		};

		let source = RasterSource {
			width,
			height,
			bounds,
			pixel_size: (sx, sy.abs()),
			crs,
			nodata: dataset.nodata(band)?,
			band_count,
			values,
		};
		log::debug!(
			"raster {width}x{height}, {}, bounds {:?}, pixel size {:?}",
			source.crs,
			source.bounds,
			source.pixel_size
		);
		Ok(source)
	}

	#[must_use]
	pub fn values(&self) -> &[f64] {
		&self.values
	}

	pub fn band(&self) -> Result<RasterBand<'_>> {
		RasterBand::new(self.width, self.height, &self.values, self.nodata)
	}

	/// Global Web Mercator grid for Mercator and WGS84 rasters, a fitted local grid otherwise.
	pub fn tile_grid(&self) -> Result<TileGrid> {
		if self.crs.is_global() {
			Ok(TileGrid::web_mercator())
		} else {
			TileGrid::fitted(&self.bounds)
		}
	}

	/// Footprint of the raster in tile grid coordinates.
	pub fn grid_bounds(&self) -> Result<GeoBBox> {
		if self.crs.is_geographic() {
			mercator::bbox_to_mercator(&self.bounds)
		} else {
			Ok(self.bounds)
		}
	}

	/// Maps a pixel corner `(column, row)` to tile grid coordinates.
	pub fn pixel_to_grid(&self) -> impl Fn(f64, f64) -> Coord<f64> + Send + Sync + use<> {
		let (x0, y0) = (self.bounds.x_min, self.bounds.y_max);
		let (sx, sy) = self.pixel_size;
		let geographic = self.crs.is_geographic();
		move |col, row| {
			let (x, y) = (x0 + col * sx, y0 - row * sy);
			if geographic {
				Coord {
					x: mercator::x_from_lon(x),
					y: mercator::y_from_lat(y),
				}
			} else {
				Coord { x, y }
			}
		}
	}

	/// Smallest pixel edge in the units of the tile grid. Geographic pixels are measured in
	/// meters at the raster's center latitude.
	#[must_use]
	pub fn grid_pixel_size(&self) -> f64 {
		let (sx, sy) = self.pixel_size;
		if self.crs.is_geographic() {
			let (_, lat) = self.bounds.center();
			(sx * mercator::meters_per_degree(lat)).min(sy * mercator::meters_per_degree(0.0))
		} else {
			sx.min(sy)
		}
	}

	/// Zoom level at which one pixel covers about one unit of a `max_extent` tile.
	///
	/// `round(log2(grid_size / (pixel_size * max_extent)))`, possibly negative.
	pub fn native_max_zoom(&self, max_extent: u32) -> Result<i32> {
		let grid_size = self.tile_grid()?.size();
		let zoom = (grid_size / (self.grid_pixel_size() * f64::from(max_extent))).log2().round();
		if !zoom.is_finite() {
			return Err(invalid(format!(
				"cannot derive a zoom level from pixel size {}",
				self.grid_pixel_size()
			)));
		}
		Ok(zoom as i32)
	}

	/// Bounds in WGS84 degrees, or `None` for local grids.
	pub fn wgs84_bounds(&self) -> Result<Option<GeoBBox>> {
		Ok(match self.crs {
			Crs::WebMercator => Some(mercator::bbox_from_mercator(&self.bounds)?),
			Crs::Wgs84 => Some(GeoBBox::new(
				self.bounds.x_min.max(-180.0),
				self.bounds.y_min.max(-mercator::MAX_LATITUDE),
				self.bounds.x_max.min(180.0),
				self.bounds.y_max.min(mercator::MAX_LATITUDE),
			)?),
			Crs::Other(_) => None,
		})
	}

	/// Vectorizes the band into interval features in tile grid coordinates.
	pub fn vectorize(&self, interval: f64) -> Result<FeatureCollection> {
		rastervt_geometry::isoband::vectorize(&self.band()?, interval, self.pixel_to_grid())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn local(width: usize, height: usize, bounds: [f64; 4]) -> MemoryRaster {
		MemoryRaster::filled(width, height, 5.0)
			.unwrap()
			.with_bounds(&GeoBBox::try_from(bounds.to_vec()).unwrap())
			.with_crs(Crs::Other("local".into()))
	}

	fn kind(err: &anyhow::Error) -> Option<&RasterVtError> {
		RasterVtError::find(err)
	}

	#[test]
	fn valid_raster() -> Result<()> {
		let source = RasterSource::from_dataset(&local(100, 50, [0.0, 0.0, 200.0, 100.0]), 1)?;
		assert_eq!((source.width, source.height), (100, 50));
		assert_eq!(source.pixel_size, (2.0, 2.0));
		assert_eq!(source.bounds.as_array(), [0.0, 0.0, 200.0, 100.0]);
		assert_eq!(source.tile_grid()?.size(), 200.0);
		assert_eq!(source.wgs84_bounds()?, None);
		Ok(())
	}

	#[rstest]
	#[case::no_crs(MemoryRaster::filled(2, 2, 1.0).unwrap().with_bounds(&GeoBBox::new(0.0, 0.0, 2.0, 2.0).unwrap()), 1)]
	#[case::no_bands(MemoryRaster::new(2, 2, vec![]).unwrap().with_bounds(&GeoBBox::new(0.0, 0.0, 2.0, 2.0).unwrap()).with_crs(Crs::WebMercator), 1)]
	#[case::band_out_of_range(local(2, 2, [0.0, 0.0, 2.0, 2.0]), 2)]
	#[case::band_zero(local(2, 2, [0.0, 0.0, 2.0, 2.0]), 0)]
	#[case::rotated(local(2, 2, [0.0, 0.0, 2.0, 2.0]).with_geo_transform([0.0, 1.0, 0.1, 2.0, 0.0, -1.0]), 1)]
	#[case::zero_pixel(local(2, 2, [0.0, 0.0, 2.0, 2.0]).with_geo_transform([0.0, 0.0, 0.0, 2.0, 0.0, -1.0]), 1)]
	#[case::no_transform(MemoryRaster::filled(2, 2, 1.0).unwrap().with_crs(Crs::Wgs84), 1)]
	fn invalid_rasters(#[case] raster: MemoryRaster, #[case] band: usize) {
		let err = RasterSource::from_dataset(&raster, band).unwrap_err();
		assert!(matches!(kind(&err), Some(RasterVtError::InvalidRaster(_))), "{err:#}");
	}

	#[test]
	fn south_up_rows_are_flipped() -> Result<()> {
		let raster = MemoryRaster::new(2, 2, vec![vec![1.0, 2.0, 3.0, 4.0]])?
			.with_geo_transform([10.0, 1.0, 0.0, 20.0, 0.0, 1.0])
			.with_crs(Crs::Other("local".into()));
		let source = RasterSource::from_dataset(&raster, 1)?;
		assert_eq!(source.values(), &[3.0, 4.0, 1.0, 2.0]);
		assert_eq!(source.bounds.as_array(), [10.0, 20.0, 12.0, 22.0]);
		assert_eq!(source.pixel_size, (1.0, 1.0));
		Ok(())
	}

	#[rstest]
	// 1 unit pixels on a 100 unit local grid never reach zoom 0 at extent 4096
	#[case(local(100, 100, [0.0, 0.0, 100.0, 100.0]), 4096, -5)]
	#[case(local(64, 64, [0.0, 0.0, 64.0, 64.0]), 4, 4)]
	#[case(local(10, 5, [0.0, 0.0, 10240.0, 5120.0]), 256, -5)]
	fn native_zoom(#[case] raster: MemoryRaster, #[case] max_extent: u32, #[case] expected: i32) -> Result<()> {
		let source = RasterSource::from_dataset(&raster, 1)?;
		assert_eq!(source.native_max_zoom(max_extent)?, expected);
		Ok(())
	}

	#[test]
	fn mercator_native_zoom() -> Result<()> {
		// 10 m pixels: log2(40075016.7 / (10 * 512)) = 12.93
		let raster = MemoryRaster::filled(10, 10, 1.0)?
			.with_bounds(&GeoBBox::new(0.0, 0.0, 100.0, 100.0)?)
			.with_crs(Crs::WebMercator);
		let source = RasterSource::from_dataset(&raster, 1)?;
		assert_eq!(source.native_max_zoom(512)?, 13);
		assert_eq!(source.tile_grid()?, TileGrid::web_mercator());
		Ok(())
	}

	#[test]
	fn geographic_pixels_are_projected() -> Result<()> {
		let raster = MemoryRaster::filled(2, 2, 1.0)?
			.with_bounds(&GeoBBox::new(-10.0, -10.0, 10.0, 10.0)?)
			.with_crs(Crs::Wgs84);
		let source = RasterSource::from_dataset(&raster, 1)?;
		let to_grid = source.pixel_to_grid();
		let corner = to_grid(2.0, 0.0);
		assert!((corner.x - mercator::x_from_lon(10.0)).abs() < 1e-6);
		assert!((corner.y - mercator::y_from_lat(10.0)).abs() < 1e-6);
		let grid_bounds = source.grid_bounds()?;
		assert!((grid_bounds.x_max - mercator::x_from_lon(10.0)).abs() < 1e-6);
		assert_eq!(source.wgs84_bounds()?, Some(GeoBBox::new(-10.0, -10.0, 10.0, 10.0)?));
		Ok(())
	}
}
