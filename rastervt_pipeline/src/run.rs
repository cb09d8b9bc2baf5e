//! A complete tiling run: plan, vectorize, clip, encode and write.

use crate::{
	config::TileConfig,
	pyramid::Pyramid,
	raster::{Crs, RasterSource},
	tiler::{TileReport, Tiler},
};
use anyhow::{Context, Result, anyhow};
use rastervt_container::{ContainerMetadata, MBTilesWriter, TileSink, VectorLayer, WriteStats};
use rastervt_derive::context;
use std::path::Path;

/// Summary of a finished run.
#[derive(Clone, Debug)]
pub struct TileRun {
	pub pyramid: Pyramid,
	/// Number of occupied interval bins.
	pub features: usize,
	pub tiles: TileReport,
	/// Stored tile sizes per zoom level.
	pub stats: WriteStats,
}

fn container_metadata(source: &RasterSource, pyramid: &Pyramid, config: &TileConfig) -> Result<ContainerMetadata> {
	let name = config.name.as_deref().unwrap_or(&config.layer_name);
	let mut metadata = ContainerMetadata::new(name, config.compression, pyramid.min_zoom(), pyramid.max_zoom())
		.with_bounds(source.wgs84_bounds()?.unwrap_or(source.bounds));
	metadata.description = config.description.clone().unwrap_or_else(|| {
		format!(
			"band {} of {}x{} raster in bins of {}",
			config.band, source.width, source.height, config.interval
		)
	});
	if let Crs::Other(label) = &source.crs {
		metadata.crs = Some(label.clone());
	}
	metadata.vector_layers = vec![VectorLayer::banded(
		&config.layer_name,
		pyramid.min_zoom(),
		pyramid.max_zoom(),
	)];
	Ok(metadata)
}

/// Turns `source` into a vector tile container at `output`, replacing any existing file.
///
/// Options are validated before any work starts. The container is written by a single task;
/// a storage failure stops the run and is reported in place of the tiling error it causes.
#[context("tiling raster into {:?}", output)]
pub async fn tile_raster(source: RasterSource, output: &Path, config: &TileConfig) -> Result<TileRun> {
	config.validate()?;

	let native_max_zoom = source.native_max_zoom(config.max_extent)?;
	let pyramid = Pyramid::plan(
		config.min_extent,
		config.max_extent,
		config.zoom_adjust,
		native_max_zoom,
		config.min_zoom,
	)?;
	log::info!(
		"native zoom {native_max_zoom}, writing zoom levels {}..={}",
		pyramid.min_zoom(),
		pyramid.max_zoom()
	);

	let grid = source.tile_grid()?;
	let footprint = source.grid_bounds()?;
	let metadata = container_metadata(&source, &pyramid, config)?;

	let interval = config.interval;
	let features = tokio::task::spawn_blocking(move || source.vectorize(interval))
		.await
		.map_err(|err| anyhow!("vectorizing task failed: {err}"))??;
	let feature_count = features.len();
	log::info!("vectorized {feature_count} interval bins");

	let writer = MBTilesWriter::create(output, &metadata)?;
	let sink = TileSink::spawn(writer, config.batch_size);
	let tiler = Tiler::new(features, grid, footprint, pyramid.clone(), &config.layer_name);

	let tiled = tiler.run(&sink, config.concurrency().cpu_bound).await;
	let stats = sink.finish().await.context("writing container")?;
	let tiles = tiled?;

	if tiles.clip_errors > 0 {
		log::warn!("dropped {} invalid fragments while clipping", tiles.clip_errors);
	}
	log::info!("wrote {} tiles, {} candidates were empty", tiles.written, tiles.empty);

	Ok(TileRun {
		pyramid,
		features: feature_count,
		tiles,
		stats,
	})
}
