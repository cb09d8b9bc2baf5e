//! ESRI ASCII grid (`*.asc`) reader.
//!
//! ```text
//! ncols        4
//! nrows        3
//! xllcorner    0.0
//! yllcorner    0.0
//! cellsize     10.0
//! NODATA_value -9999
//! 1 2 3 4
//! ...
//! ```
//!
//! The CRS comes from an explicit override or from a `.prj` file next to the grid.

use super::{Crs, RasterDataset};
use anyhow::{Context, Result, anyhow, bail, ensure};
use rastervt_derive::context;
use std::{collections::HashMap, fs, path::Path};

#[derive(Clone, Debug)]
pub struct AsciiGridReader {
	width: usize,
	height: usize,
	geo_transform: [f64; 6],
	nodata: Option<f64>,
	values: Vec<f64>,
	crs: Option<Crs>,
}

impl AsciiGridReader {
	/// Reads a grid file. Without `crs`, a sidecar `.prj` file is used when present.
	#[context("reading ASCII grid {:?}", path)]
	pub fn open(path: &Path, crs: Option<Crs>) -> Result<AsciiGridReader> {
		log::debug!("open {path:?}");
		let text = fs::read_to_string(path)?;

		let crs = match crs {
			Some(crs) => Some(crs),
			None => {
				let prj = path.with_extension("prj");
				if prj.is_file() {
					let wkt = fs::read_to_string(&prj).with_context(|| format!("reading {prj:?}"))?;
					log::trace!("CRS from {prj:?}");
					Some(Crs::from_wkt(&wkt))
				} else {
					None
				}
			}
		};

		AsciiGridReader::parse(&text, crs)
	}

	pub fn parse(text: &str, crs: Option<Crs>) -> Result<AsciiGridReader> {
		let mut header = HashMap::<String, f64>::new();
		let mut lines = text.lines().peekable();

		while let Some(&line) = lines.peek() {
			let mut tokens = line.split_whitespace();
			let Some(key) = tokens.next() else {
				lines.next();
				continue;
			};
			if key.parse::<f64>().is_ok() {
				break;
			}
			let value = tokens
				.next()
				.ok_or_else(|| anyhow!("header line '{line}' has no value"))?;
			let value = value
				.parse::<f64>()
				.with_context(|| format!("parsing header value '{value}'"))?;
			header.insert(key.to_ascii_lowercase(), value);
			lines.next();
		}

		let get = |key: &str| header.get(key).copied();
		let count = |key: &str| -> Result<usize> {
			let value = get(key).ok_or_else(|| anyhow!("header is missing '{key}'"))?;
			ensure!(value >= 1.0 && value.fract() == 0.0, "'{key}' must be a positive integer, got {value}");
			Ok(value as usize)
		};
		let width = count("ncols")?;
		let height = count("nrows")?;

		let (dx, dy) = match (get("cellsize"), get("dx"), get("dy")) {
			(Some(size), _, _) => (size, size),
			(None, Some(dx), Some(dy)) => (dx, dy),
			_ => bail!("header needs 'cellsize' or both 'dx' and 'dy'"),
		};

		let x_min = match (get("xllcorner"), get("xllcenter")) {
			(Some(x), _) => x,
			(None, Some(x)) => x - dx / 2.0,
			_ => bail!("header needs 'xllcorner' or 'xllcenter'"),
		};
		let y_min = match (get("yllcorner"), get("yllcenter")) {
			(Some(y), _) => y,
			(None, Some(y)) => y - dy / 2.0,
			_ => bail!("header needs 'yllcorner' or 'yllcenter'"),
		};

		let values = lines
			.flat_map(str::split_whitespace)
			.map(|token| token.parse::<f64>().with_context(|| format!("parsing cell value '{token}'")))
			.collect::<Result<Vec<f64>>>()?;
		ensure!(
			values.len() == width * height,
			"grid has {} cell values, expected {width}x{height}",
			values.len()
		);

		Ok(AsciiGridReader {
			width,
			height,
			geo_transform: [x_min, dx, 0.0, y_min + dy * height as f64, 0.0, -dy],
			nodata: get("nodata_value"),
			values,
			crs,
		})
	}
}

impl RasterDataset for AsciiGridReader {
	fn size(&self) -> (usize, usize) {
		(self.width, self.height)
	}

	fn geo_transform(&self) -> Option<[f64; 6]> {
		Some(self.geo_transform)
	}

	fn crs(&self) -> Option<Crs> {
		self.crs.clone()
	}

	fn band_count(&self) -> usize {
		1
	}

	fn nodata(&self, _band: usize) -> Result<Option<f64>> {
		Ok(self.nodata)
	}

	fn read_band(&self, band: usize) -> Result<Vec<f64>> {
		ensure!(band == 1, "ASCII grids have a single band, requested band {band}");
		Ok(self.values.clone())
	}
}
