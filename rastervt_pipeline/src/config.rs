//! Options of a tiling run, read from YAML and overridden by command line flags.
//!
//! ```yaml
//! min_extent: 256
//! max_extent: 4096
//! interval: 10
//! layer_name: elevation
//! compression: brotli
//! ```

use crate::pyramid::ensure_extent_range;
use anyhow::{Context, Result};
use rastervt_core::{ConcurrencyLimits, TileCompression};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TileConfig {
	/// Tile extent at the lowest zoom level.
	pub min_extent: u32,

	/// Tile extent at the highest zoom level.
	pub max_extent: u32,

	/// Added to the zoom level derived from the raster's pixel size.
	pub zoom_adjust: i32,

	/// Width of the value bins.
	pub interval: f64,

	/// 1-based band index.
	pub band: usize,

	/// Overrides the raster's CRS: `EPSG:3857`, `EPSG:4326` or any other label for a local grid.
	pub crs: Option<String>,

	pub layer_name: String,

	pub compression: TileCompression,

	/// Raises the lowest zoom level.
	pub min_zoom: Option<u8>,

	/// Parallel tile encoders, defaults to the number of CPUs.
	pub workers: Option<usize>,

	/// Tiles per container transaction.
	pub batch_size: usize,

	/// Dataset name, defaults to the input file stem.
	pub name: Option<String>,

	pub description: Option<String>,
}

impl Default for TileConfig {
	fn default() -> Self {
		TileConfig {
			min_extent: 256,
			max_extent: 512,
			zoom_adjust: 0,
			interval: 1.0,
			band: 1,
			crs: None,
			layer_name: "raster".to_string(),
			compression: TileCompression::Gzip,
			min_zoom: None,
			workers: None,
			batch_size: 512,
			name: None,
			description: None,
		}
	}
}

impl TileConfig {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("opening config {path:?}"))?;
		TileConfig::from_reader(BufReader::new(file)).with_context(|| format!("parsing config {path:?}"))
	}

	/// Checks the options that do not need the raster.
	pub fn validate(&self) -> Result<()> {
		ensure_extent_range(self.min_extent, self.max_extent)?;
		rastervt_geometry::isoband::ensure_interval(self.interval)?;
		Ok(())
	}

	#[must_use]
	pub fn concurrency(&self) -> ConcurrencyLimits {
		ConcurrencyLimits::with_workers(self.workers)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rastervt_core::RasterVtError;
	use rstest::rstest;

	#[test]
	fn empty_mapping_gives_defaults() {
		assert_eq!(TileConfig::from_string("{}").unwrap(), TileConfig::default());
	}

	#[test]
	fn parse_fields() -> Result<()> {
		let config = TileConfig::from_string(
			"min_extent: 128\nmax_extent: 4096\nzoom_adjust: -2\ninterval: 0.5\nlayer_name: depth\ncompression: none\nworkers: 3\n",
		)?;
		assert_eq!(
			config,
			TileConfig {
				min_extent: 128,
				max_extent: 4096,
				zoom_adjust: -2,
				interval: 0.5,
				layer_name: "depth".to_string(),
				compression: TileCompression::Uncompressed,
				workers: Some(3),
				..TileConfig::default()
			}
		);
		assert_eq!(config.concurrency().cpu_bound, 3);
		Ok(())
	}

	#[test]
	fn unknown_fields_are_rejected() {
		assert!(TileConfig::from_string("extent: 512").is_err());
	}

	#[rstest]
	#[case(4096, 256)]
	#[case(0, 256)]
	#[case(256, 0)]
	fn bad_extents(#[case] min: u32, #[case] max: u32) {
		let config = TileConfig {
			min_extent: min,
			max_extent: max,
			..TileConfig::default()
		};
		let err = config.validate().unwrap_err();
		assert!(matches!(
			RasterVtError::find(&err),
			Some(RasterVtError::InvalidExtentRange { .. })
		));
	}

	#[rstest]
	#[case(0.0)]
	#[case(-1.0)]
	#[case(f64::NAN)]
	fn bad_intervals(#[case] interval: f64) {
		let config = TileConfig {
			interval,
			..TileConfig::default()
		};
		let err = config.validate().unwrap_err();
		assert!(matches!(RasterVtError::find(&err), Some(RasterVtError::InvalidInterval(_))));
	}
}
