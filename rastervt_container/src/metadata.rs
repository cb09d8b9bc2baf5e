//! Dataset description stored in the `metadata` table of a container.
//!
//! Every value is a string row keyed by name, following the MBTiles 1.3 conventions. The vector
//! layer description is kept as JSON under the `json` key, as MapLibre and GDAL expect it.

use anyhow::{Context, Result, anyhow};
use rastervt_core::{GeoBBox, TileCompression};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description of one vector layer, as listed in the `vector_layers` JSON array.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VectorLayer {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub minzoom: u8,
	pub maxzoom: u8,
	/// Field name to type name (`Number`, `String`, `Boolean`).
	#[serde(default)]
	pub fields: BTreeMap<String, String>,
}

impl VectorLayer {
	/// A layer carrying the numeric `v` and `bin` attributes of banded features.
	#[must_use]
	pub fn banded(id: &str, minzoom: u8, maxzoom: u8) -> VectorLayer {
		VectorLayer {
			id: id.to_string(),
			description: None,
			minzoom,
			maxzoom,
			fields: BTreeMap::from([
				("bin".to_string(), "Number".to_string()),
				("v".to_string(), "Number".to_string()),
			]),
		}
	}
}

#[derive(Deserialize, Serialize)]
struct LayerJson {
	vector_layers: Vec<VectorLayer>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContainerMetadata {
	pub name: String,
	pub description: String,
	pub version: String,
	/// Payload format tag, `pbf` for vector tiles.
	pub format: String,
	pub compression: TileCompression,
	/// `w,s,e,n` in WGS84 degrees, or in source units for local grids.
	pub bounds: Option<GeoBBox>,
	/// Longitude, latitude and zoom.
	pub center: Option<(f64, f64, u8)>,
	pub minzoom: u8,
	pub maxzoom: u8,
	/// Set for local grids that are not georeferenced to Web Mercator.
	pub crs: Option<String>,
	pub vector_layers: Vec<VectorLayer>,
}

impl ContainerMetadata {
	#[must_use]
	pub fn new(name: &str, compression: TileCompression, minzoom: u8, maxzoom: u8) -> ContainerMetadata {
		ContainerMetadata {
			name: name.to_string(),
			description: String::new(),
			version: "1.0.0".to_string(),
			format: "pbf".to_string(),
			compression,
			bounds: None,
			center: None,
			minzoom,
			maxzoom,
			crs: None,
			vector_layers: Vec::new(),
		}
	}

	/// Sets the bounds and places the center in their middle at `minzoom`.
	#[must_use]
	pub fn with_bounds(mut self, bounds: GeoBBox) -> ContainerMetadata {
		let (x, y) = bounds.center();
		self.center = Some((x, y, self.minzoom));
		self.bounds = Some(bounds);
		self
	}

	/// Rows for the `metadata` table, in insertion order.
	pub fn to_entries(&self) -> Result<Vec<(&'static str, String)>> {
		let mut entries = vec![
			("name", self.name.clone()),
			("type", "overlay".to_string()),
			("version", self.version.clone()),
			("description", self.description.clone()),
			("format", self.format.clone()),
			("compression", self.compression.as_str().to_string()),
			("minzoom", self.minzoom.to_string()),
			("maxzoom", self.maxzoom.to_string()),
		];
		if let Some(bounds) = &self.bounds {
			entries.push(("bounds", bounds.as_string_list()));
		}
		if let Some((x, y, z)) = &self.center {
			entries.push(("center", format!("{x},{y},{z}")));
		}
		if let Some(crs) = &self.crs {
			entries.push(("crs", crs.clone()));
		}
		if !self.vector_layers.is_empty() {
			let json = serde_json::to_string(&LayerJson {
				vector_layers: self.vector_layers.clone(),
			})?;
			entries.push(("json", json));
		}
		Ok(entries)
	}

	/// Parses rows of a `metadata` table. Unknown names are ignored, `format` is required.
	///
	/// Without a `compression` row the MBTiles convention applies: `pbf` payloads are gzipped,
	/// everything else is stored as is.
	pub fn from_entries<I>(entries: I) -> Result<ContainerMetadata>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let mut metadata = ContainerMetadata::new("", TileCompression::Uncompressed, 0, 0);
		let mut format = None;
		let mut compression = None;

		for (key, value) in entries {
			match key.as_str() {
				"name" => metadata.name = value,
				"description" => metadata.description = value,
				"version" => metadata.version = value,
				"format" => format = Some(value),
				"compression" => compression = Some(TileCompression::parse_str(&value)?),
				"minzoom" => metadata.minzoom = value.parse().with_context(|| format!("parsing minzoom '{value}'"))?,
				"maxzoom" => metadata.maxzoom = value.parse().with_context(|| format!("parsing maxzoom '{value}'"))?,
				"bounds" => metadata.bounds = Some(parse_bounds(&value)?),
				"center" => metadata.center = Some(parse_center(&value)?),
				"crs" => metadata.crs = Some(value),
				"json" => {
					let json: LayerJson =
						serde_json::from_str(&value).with_context(|| format!("parsing vector layers '{value}'"))?;
					metadata.vector_layers = json.vector_layers;
				}
				_ => log::trace!("ignoring metadata key '{key}'"),
			}
		}

		let format = format.ok_or_else(|| anyhow!("container metadata does not specify a tile format"))?;
		metadata.compression = compression.unwrap_or(if format == "pbf" {
			TileCompression::Gzip
		} else {
			TileCompression::Uncompressed
		});
		metadata.format = format;
		Ok(metadata)
	}
}

fn parse_numbers(value: &str) -> Result<Vec<f64>> {
	value
		.split(',')
		.map(|s| s.trim().parse::<f64>().with_context(|| format!("parsing number '{s}'")))
		.collect()
}

fn parse_bounds(value: &str) -> Result<GeoBBox> {
	GeoBBox::try_from(parse_numbers(value)?).with_context(|| format!("parsing bounds '{value}'"))
}

fn parse_center(value: &str) -> Result<(f64, f64, u8)> {
	match parse_numbers(value)?.as_slice() {
		[x, y] => Ok((*x, *y, 0)),
		[x, y, z] => Ok((*x, *y, *z as u8)),
		_ => Err(anyhow!("center '{value}' must have two or three values")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn example() -> ContainerMetadata {
		let mut metadata = ContainerMetadata::new("elevation", TileCompression::Brotli, 0, 6)
			.with_bounds(GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap());
		metadata.description = "banded elevation".to_string();
		metadata.vector_layers = vec![VectorLayer::banded("raster", 0, 6)];
		metadata
	}

	#[test]
	fn entries_survive_parsing() -> Result<()> {
		let metadata = example();
		let entries = metadata.to_entries()?;
		let parsed = ContainerMetadata::from_entries(entries.into_iter().map(|(k, v)| (k.to_string(), v)))?;
		assert_eq!(parsed, metadata);
		Ok(())
	}

	#[test]
	fn layer_json() -> Result<()> {
		let entries = example().to_entries()?;
		let json = entries.iter().find(|(k, _)| *k == "json").map(|(_, v)| v.as_str());
		assert_eq!(
			json,
			Some(r#"{"vector_layers":[{"id":"raster","minzoom":0,"maxzoom":6,"fields":{"bin":"Number","v":"Number"}}]}"#)
		);
		assert!(entries.contains(&("bounds", "-10,-5,10,5".to_string())));
		assert!(entries.contains(&("center", "0,0,0".to_string())));
		assert!(entries.contains(&("type", "overlay".to_string())));
		Ok(())
	}

	#[test]
	fn compression_defaults_follow_the_format() -> Result<()> {
		let pbf = ContainerMetadata::from_entries([("format".to_string(), "pbf".to_string())])?;
		assert_eq!(pbf.compression, TileCompression::Gzip);
		let png = ContainerMetadata::from_entries([("format".to_string(), "png".to_string())])?;
		assert_eq!(png.compression, TileCompression::Uncompressed);
		Ok(())
	}

	#[test]
	fn format_is_required() {
		let err = ContainerMetadata::from_entries([("name".to_string(), "x".to_string())]).unwrap_err();
		assert_eq!(err.to_string(), "container metadata does not specify a tile format");
	}
}
