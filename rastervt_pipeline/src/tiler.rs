//! Per-tile clipping and encoding, fanned out over the blocking thread pool.

use crate::pyramid::Pyramid;
use anyhow::{Context, Result, anyhow};
use futures::{StreamExt, stream};
use geo::{Coord, Rect};
use rastervt_container::TileSink;
use rastervt_core::{Blob, GeoBBox, RasterVtError, TileCoord, TileGrid};
use rastervt_derive::context;
use rastervt_geometry::{
	FeatureCollection,
	clip::TileClipper,
	vector_tile::{PropertyValue, VectorTile, VectorTileLayer},
};
use std::sync::Arc;

/// Result of rendering one tile.
#[derive(Debug, Default)]
pub struct RenderedTile {
	/// Encoded tile, `None` when no geometry survived clipping.
	pub blob: Option<Blob>,
	/// Fragments dropped because they were invalid after quantization.
	pub clip_errors: usize,
}

fn to_rect(bbox: &GeoBBox) -> Rect<f64> {
	Rect::new(
		Coord {
			x: bbox.x_min,
			y: bbox.y_min,
		},
		Coord {
			x: bbox.x_max,
			y: bbox.y_max,
		},
	)
}

/// Clips every feature touching the XYZ tile `coord` and encodes the survivors into a
/// single-layer vector tile.
pub fn render_tile(
	features: &FeatureCollection,
	grid: &TileGrid,
	coord: &TileCoord,
	extent: u32,
	layer_name: &str,
) -> Result<RenderedTile> {
	let clipper = TileClipper::new(to_rect(&grid.tile_bounds(coord)?), extent);
	let candidates = features.query(clipper.bounds());
	if candidates.is_empty() {
		return Ok(RenderedTile::default());
	}

	let mut layer = VectorTileLayer::new(layer_name, extent);
	let mut clip_errors = 0;
	for (feature, polygons) in candidates {
		let clipped = clipper.clip(&polygons);
		for reason in clipped.rejected {
			let err = RasterVtError::GeometryClip {
				coord: *coord,
				feature: feature.id,
				reason,
			};
			log::debug!("{err}");
			clip_errors += 1;
		}
		if clipped.polygons.is_empty() {
			continue;
		}
		layer.add_polygon_feature(
			feature.id,
			&clipped.polygons,
			vec![
				("v".to_string(), PropertyValue::from_number(feature.value)),
				("bin".to_string(), PropertyValue::Int(feature.bin)),
			],
		)?;
	}

	if layer.features.is_empty() {
		return Ok(RenderedTile {
			blob: None,
			clip_errors,
		});
	}

	log::trace!("tile {coord}: {} features", layer.features.len());
	Ok(RenderedTile {
		blob: Some(VectorTile::new(vec![layer]).to_blob()?),
		clip_errors,
	})
}

/// Counters of one tiling run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileReport {
	/// Tiles encoded and handed to the container.
	pub written: u64,
	/// Candidate tiles without surviving geometry.
	pub empty: u64,
	pub clip_errors: u64,
}

/// Renders every zoom level of a pyramid from one shared feature set.
pub struct Tiler {
	features: Arc<FeatureCollection>,
	grid: TileGrid,
	footprint: GeoBBox,
	pyramid: Pyramid,
	layer_name: Arc<str>,
}

impl Tiler {
	/// `footprint` is the raster's extent in grid coordinates.
	#[must_use]
	pub fn new(
		features: FeatureCollection,
		grid: TileGrid,
		footprint: GeoBBox,
		pyramid: Pyramid,
		layer_name: &str,
	) -> Tiler {
		Tiler {
			features: Arc::new(features),
			grid,
			footprint,
			pyramid,
			layer_name: Arc::from(layer_name),
		}
	}

	/// XYZ coordinates at `level` covered by the footprint, row by row.
	pub fn candidates(&self, level: u8) -> Result<Vec<TileCoord>> {
		Ok(match self.grid.tile_range(level, &self.footprint)? {
			Some(range) => range.iter_coords().collect(),
			None => Vec::new(),
		})
	}

	/// Renders all levels with up to `concurrency` tiles in flight and sends every non-empty
	/// tile to `sink` at its TMS address.
	pub async fn run(&self, sink: &TileSink, concurrency: usize) -> Result<TileReport> {
		let mut report = TileReport::default();
		for zoom in self.pyramid.levels() {
			self
				.run_level(zoom.level, zoom.extent, sink, concurrency, &mut report)
				.await?;
		}
		Ok(report)
	}

	#[context("tiling zoom {}", level)]
	async fn run_level(
		&self,
		level: u8,
		extent: u32,
		sink: &TileSink,
		concurrency: usize,
		report: &mut TileReport,
	) -> Result<()> {
		let candidates = self.candidates(level)?;
		log::debug!("zoom {level}: {} candidate tiles at extent {extent}", candidates.len());

		let mut tiles = stream::iter(candidates)
			.map(|coord| {
				let features = Arc::clone(&self.features);
				let layer_name = Arc::clone(&self.layer_name);
				let grid = self.grid;
				async move {
					tokio::task::spawn_blocking(move || {
						render_tile(&features, &grid, &coord, extent, &layer_name)
							.map(|tile| (coord, tile))
							.with_context(|| format!("rendering tile {coord}"))
					})
					.await
					.map_err(|err| anyhow!("tile task failed: {err}"))?
				}
			})
			.buffer_unordered(concurrency.max(1));

		let (mut written, mut empty) = (0u64, 0u64);
		while let Some(result) = tiles.next().await {
			let (coord, tile) = result?;
			report.clip_errors += tile.clip_errors as u64;
			match tile.blob {
				Some(blob) => {
					sink.send(coord.flipped_y(), blob).await?;
					written += 1;
				}
				None => empty += 1,
			}
		}

		log::debug!("zoom {level}: {written} tiles, {empty} empty");
		report.written += written;
		report.empty += empty;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use geo::{MultiPolygon, polygon};
	use rastervt_geometry::BandFeature;

	fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> geo::Polygon<f64> {
		polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]
	}

	fn collection() -> FeatureCollection {
		FeatureCollection::new(vec![
			BandFeature {
				id: 1,
				bin: 0,
				value: 0.0,
				geometry: MultiPolygon::new(vec![square(0.0, 0.0, 50.0, 100.0)]),
			},
			BandFeature {
				id: 2,
				bin: 1,
				value: 2.5,
				geometry: MultiPolygon::new(vec![square(50.0, 0.0, 100.0, 100.0)]),
			},
		])
	}

	fn grid() -> TileGrid {
		TileGrid::fitted(&GeoBBox::new(0.0, 0.0, 100.0, 100.0).unwrap()).unwrap()
	}

	#[test]
	fn encodes_both_bins() -> Result<()> {
		let rendered = render_tile(&collection(), &grid(), &TileCoord::new(0, 0, 0)?, 256, "raster")?;
		assert_eq!(rendered.clip_errors, 0);
		let tile = VectorTile::from_blob(&rendered.blob.unwrap())?;
		let layer = tile.find_layer("raster").unwrap();
		assert_eq!(layer.extent, 256);
		assert_eq!(layer.version, 2);
		assert_eq!(layer.features.len(), 2);

		let properties = layer.feature_properties(&layer.features[1])?;
		assert_eq!(
			properties,
			vec![
				("v".to_string(), PropertyValue::Double(2.5)),
				("bin".to_string(), PropertyValue::Int(1)),
			]
		);
		assert_eq!(layer.features[0].id, Some(1));
		Ok(())
	}

	#[test]
	fn tile_sees_only_its_features() -> Result<()> {
		// zoom 1 tile x=1 covers x 50..100, which only holds bin 1
		let rendered = render_tile(&collection(), &grid(), &TileCoord::new(1, 1, 0)?, 512, "bands")?;
		let tile = VectorTile::from_blob(&rendered.blob.unwrap())?;
		let layer = tile.find_layer("bands").unwrap();
		assert_eq!(layer.features.len(), 1);
		assert_eq!(layer.features[0].id, Some(2));
		let polygons = layer.features[0].to_polygons()?;
		assert_eq!(polygons.len(), 1);
		assert_eq!(polygons[0].len(), 1);
		let mut corners = polygons[0][0].clone();
		corners.sort_unstable();
		assert_eq!(corners, vec![[0, 0], [0, 511], [511, 0], [511, 511]]);
		Ok(())
	}

	#[test]
	fn hole_touching_its_exterior_survives_clipping() -> Result<()> {
		#[rustfmt::skip]
		let values = [
			2.0, 0.0, 0.0, 0.0,
			0.0, 2.0, 0.0, 0.0,
			0.0, 0.0, 0.0, 0.0,
			0.0, 0.0, 0.0, 0.0,
		];
		let band = rastervt_geometry::isoband::RasterBand::new(4, 4, &values, None)?;
		let features = rastervt_geometry::isoband::vectorize(&band, 1.0, |col, row| geo::coord! { x: col, y: 4.0 - row })?;
		let grid = TileGrid::fitted(&GeoBBox::new(0.0, 0.0, 4.0, 4.0)?)?;

		let rendered = render_tile(&features, &grid, &TileCoord::new(0, 0, 0)?, 4096, "raster")?;
		assert_eq!(rendered.clip_errors, 0);
		let tile = VectorTile::from_blob(&rendered.blob.unwrap())?;
		let layer = tile.find_layer("raster").unwrap();
		assert_eq!(layer.features.len(), 2);
		let zero = layer.features[0].to_polygons()?;
		assert_eq!(zero.len(), 1);
		assert_eq!(zero[0].len(), 2);
		Ok(())
	}

	#[test]
	fn empty_area_gives_no_tile() -> Result<()> {
		let features = FeatureCollection::new(vec![BandFeature {
			id: 1,
			bin: 0,
			value: 0.0,
			geometry: MultiPolygon::new(vec![square(0.0, 60.0, 10.0, 100.0)]),
		}]);
		let rendered = render_tile(&features, &grid(), &TileCoord::new(1, 1, 1)?, 256, "raster")?;
		assert_eq!(rendered.blob, None);
		Ok(())
	}

	#[test]
	fn candidates_follow_the_footprint() -> Result<()> {
		let pyramid = Pyramid::plan(256, 512, 0, 2, None)?;
		let tiler = Tiler::new(
			collection(),
			grid(),
			GeoBBox::new(0.0, 60.0, 40.0, 100.0)?,
			pyramid,
			"raster",
		);
		assert_eq!(tiler.candidates(0)?, vec![TileCoord::new(0, 0, 0)?]);
		assert_eq!(tiler.candidates(2)?, vec![
			TileCoord::new(2, 0, 0)?,
			TileCoord::new(2, 1, 0)?,
			TileCoord::new(2, 0, 1)?,
			TileCoord::new(2, 1, 1)?,
		]);
		Ok(())
	}
}
