//! Isoband vectorization: turns a raster band into one polygon feature per value interval.
//!
//! Cells are classified into bins of width `interval`. The pixel edges separating a bin from
//! anything else are traced into rings, rings are grouped into polygons, and pixel corners are
//! mapped to tile grid coordinates by the caller's transform. Polygon edges therefore follow
//! pixel boundaries exactly; no smoothing or interpolation is applied.

mod assemble;
mod bins;
mod trace;

pub use bins::{bin_of, ensure_interval};

use crate::{BandFeature, FeatureCollection};
use anyhow::{Result, ensure};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use log::debug;
use rastervt_derive::context;

/// Borrowed view of one raster band, row-major with row 0 at the top.
#[derive(Clone, Copy, Debug)]
pub struct RasterBand<'a> {
	pub width: usize,
	pub height: usize,
	pub values: &'a [f64],
	pub nodata: Option<f64>,
}

impl<'a> RasterBand<'a> {
	pub fn new(width: usize, height: usize, values: &'a [f64], nodata: Option<f64>) -> Result<RasterBand<'a>> {
		ensure!(
			values.len() == width * height,
			"band has {} values but is {width}x{height} pixels",
			values.len()
		);
		Ok(RasterBand {
			width,
			height,
			values,
			nodata,
		})
	}

	/// Finite values that are not the nodata value.
	#[must_use]
	pub fn is_valid(&self, value: f64) -> bool {
		value.is_finite() && self.nodata.is_none_or(|nodata| value != nodata)
	}

	pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
		self.values.iter().copied().filter(|&v| self.is_valid(v))
	}
}

/// Vectorizes `band` into interval bins.
///
/// `to_grid` maps a pixel corner `(column, row)` to tile grid coordinates.
#[context("vectorizing {}x{} band with interval {interval}", band.width, band.height)]
pub fn vectorize<F>(band: &RasterBand, interval: f64, to_grid: F) -> Result<FeatureCollection>
where
	F: Fn(f64, f64) -> Coord<f64>,
{
	let bins = bins::classify(band, interval)?;
	let edges = trace::boundary_edges(&bins, band.width, band.height);

	let to_line = |ring: Vec<trace::Vertex>| -> LineString<f64> {
		ring
			.into_iter()
			.map(|[col, row]| to_grid(col as f64, row as f64))
			.collect()
	};

	let mut features = Vec::with_capacity(edges.len());
	let mut polygon_count = 0;
	for (bin, bin_edges) in edges {
		let rings = trace::trace_rings(&bin_edges)?;
		let polygons: Vec<Polygon<f64>> = assemble::assemble(rings)
			.into_iter()
			.map(|polygon| {
				Polygon::new(
					to_line(polygon.exterior),
					polygon.holes.into_iter().map(to_line).collect(),
				)
			})
			.collect();
		polygon_count += polygons.len();

		features.push(BandFeature {
			id: features.len() as u64 + 1,
			bin,
			value: bin as f64 * interval,
			geometry: MultiPolygon::new(polygons),
		});
	}

	debug!(
		"vectorized {} bins into {polygon_count} polygons",
		features.len()
	);
	Ok(FeatureCollection::new(features))
}

#[cfg(test)]
mod tests {
	use super::*;
	use geo::{Area, Validation, coord};
	use rastervt_core::RasterVtError;

	fn pixel_to_grid(col: f64, row: f64) -> Coord<f64> {
		coord! { x: col, y: -row }
	}

	fn run(width: usize, height: usize, values: &[f64], interval: f64) -> FeatureCollection {
		let band = RasterBand::new(width, height, values, Some(-9999.0)).unwrap();
		vectorize(&band, interval, pixel_to_grid).unwrap()
	}

	#[test]
	fn uniform_raster_is_one_rectangle() {
		let collection = run(4, 3, &[5.0; 12], 1.0);
		assert_eq!(collection.len(), 1);
		let feature = collection.iter().next().unwrap();
		assert_eq!((feature.id, feature.bin, feature.value), (1, 5, 5.0));
		assert_eq!(feature.geometry.0.len(), 1);
		assert_eq!(feature.geometry.0[0].exterior().0.len(), 5);
		assert_eq!(feature.geometry.unsigned_area(), 12.0);
	}

	#[test]
	fn two_bins_split_the_raster() {
		#[rustfmt::skip]
		let values = [
			1.5, 1.5, 3.2, 3.2,
			1.5, 1.5, 3.2, 3.2,
		];
		let collection = run(4, 2, &values, 1.0);
		let summary: Vec<(i64, f64, f64)> = collection
			.iter()
			.map(|f| (f.bin, f.value, f.geometry.unsigned_area()))
			.collect();
		assert_eq!(summary, vec![(1, 1.0, 4.0), (3, 3.0, 4.0)]);
	}

	#[test]
	fn enclosed_bin_becomes_a_hole() {
		let mut values = [0.0; 25];
		values[12] = 10.0;
		let collection = run(5, 5, &values, 1.0);
		let features: Vec<&BandFeature> = collection.iter().collect();
		assert_eq!(features.len(), 2);
		assert_eq!(features[0].geometry.0[0].interiors().len(), 1);
		assert_eq!(features[0].geometry.unsigned_area(), 24.0);
		assert_eq!(features[1].bin, 10);
		assert_eq!(features[1].geometry.unsigned_area(), 1.0);
	}

	#[test]
	fn holes_stay_with_their_own_block() {
		// two blocks of bin 0 separated by a column of bin 5, each with a bin 9 centre
		#[rustfmt::skip]
		let values = [
			0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0,
			0.0, 9.0, 0.0, 5.0, 0.0, 9.0, 0.0,
			0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0,
		];
		let collection = run(7, 3, &values, 1.0);
		let zero = collection.iter().find(|f| f.bin == 0).unwrap();
		assert_eq!(zero.geometry.0.len(), 2);
		assert!(zero.geometry.0.iter().all(|p| p.interiors().len() == 1));
		assert_eq!(zero.geometry.unsigned_area(), 16.0);
	}

	#[test]
	fn hole_touching_the_exterior_stays_valid() {
		#[rustfmt::skip]
		let values = [
			2.0, 0.0, 0.0, 0.0,
			0.0, 2.0, 0.0, 0.0,
			0.0, 0.0, 0.0, 0.0,
			0.0, 0.0, 0.0, 0.0,
		];
		let collection = run(4, 4, &values, 1.0);
		let zero = collection.iter().find(|f| f.bin == 0).unwrap();
		assert_eq!(zero.geometry.0.len(), 1);
		assert_eq!(zero.geometry.0[0].interiors().len(), 1);
		assert_eq!(zero.geometry.unsigned_area(), 14.0);
		assert!(zero.geometry.is_valid());
	}

	#[test]
	fn random_rasters_give_valid_polygons() {
		// xorshift, so every run checks the same rasters
		let mut state: u64 = 0x2545_f491_4f6c_dd1d;
		let mut next = move |n: u64| {
			state ^= state << 13;
			state ^= state >> 7;
			state ^= state << 17;
			state % n
		};

		for _ in 0..3000 {
			let (width, height) = (next(5) as usize + 1, next(5) as usize + 1);
			let values: Vec<f64> = (0..width * height)
				.map(|_| match next(4) {
					3 => -9999.0,
					v => v as f64,
				})
				.collect();
			let collection = run(width, height, &values, 1.0);
			for feature in collection.iter() {
				for polygon in &feature.geometry.0 {
					if let Err(err) = polygon.check_validation() {
						panic!("{width}x{height} {values:?}, bin {}: {err}", feature.bin);
					}
				}
			}
		}
	}

	#[test]
	fn nodata_only_yields_nothing() {
		let collection = run(2, 2, &[-9999.0; 4], 1.0);
		assert!(collection.is_empty());
	}

	#[test]
	fn invalid_interval_is_reported() {
		let band = RasterBand::new(1, 1, &[1.0], None).unwrap();
		let err = vectorize(&band, 0.0, pixel_to_grid).err().unwrap();
		assert!(matches!(
			RasterVtError::find(&err),
			Some(RasterVtError::InvalidInterval(_))
		));
	}

	#[test]
	fn band_size_is_checked() {
		assert!(RasterBand::new(3, 3, &[0.0; 8], None).is_err());
	}
}
