use anyhow::{Context, Result};
use rastervt_container::WriteStats;
use rastervt_core::TileCompression;
use rastervt_pipeline::{
	TileConfig,
	raster::{self, Crs, RasterSource},
	tile_raster,
};
use std::{
	fs,
	path::{Path, PathBuf},
};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// raster file: *.asc, or any GDAL format when built with the `gdal` feature
	#[arg()]
	input_raster: PathBuf,

	/// MBTiles file to create, an existing file is replaced
	#[arg()]
	output_container: PathBuf,

	/// YAML file with tiling options, flags given here take precedence
	#[arg(long, value_name = "FILE", display_order = 0)]
	config: Option<PathBuf>,

	/// tile extent at the lowest zoom level [default: 256]
	#[arg(long, value_name = "int", display_order = 1)]
	min_extent: Option<u32>,

	/// tile extent at the highest zoom level [default: 512]
	#[arg(long, value_name = "int", display_order = 1)]
	max_extent: Option<u32>,

	/// shift the highest zoom level derived from the pixel size
	#[arg(long, value_name = "int", allow_negative_numbers = true, display_order = 1)]
	zoom_adjust: Option<i32>,

	/// raise the lowest zoom level
	#[arg(long, value_name = "int", display_order = 1)]
	min_zoom: Option<u8>,

	/// width of the value bins [default: 1]
	#[arg(long, value_name = "float", display_order = 2)]
	interval: Option<f64>,

	/// band to vectorize, starting at 1 [default: 1]
	#[arg(long, value_name = "int", display_order = 2)]
	band: Option<usize>,

	/// override the raster CRS: EPSG:3857, EPSG:4326 or any other label for a local grid
	#[arg(long, value_name = "CRS", display_order = 2)]
	crs: Option<String>,

	/// name of the vector layer [default: raster]
	#[arg(long, value_name = "NAME", display_order = 3)]
	layer_name: Option<String>,

	/// tile compression [default: gzip]
	#[arg(long, short, value_enum, display_order = 3)]
	compress: Option<TileCompression>,

	/// number of tiles encoded in parallel [default: number of CPUs]
	#[arg(long, value_name = "int", display_order = 4)]
	workers: Option<usize>,
}

fn build_config(arguments: &Subcommand) -> Result<TileConfig> {
	let mut config = match &arguments.config {
		Some(path) => TileConfig::from_path(path)?,
		None => TileConfig::default(),
	};

	macro_rules! apply {
		($($field:ident),*) => {
			$(if let Some(value) = &arguments.$field {
				config.$field = value.clone().into();
			})*
		};
	}
	apply!(min_extent, max_extent, zoom_adjust, interval, band, crs, layer_name, min_zoom, workers);
	if let Some(compression) = arguments.compress {
		config.compression = compression;
	}
	if config.name.is_none() {
		config.name = arguments
			.input_raster
			.file_stem()
			.map(|stem| stem.to_string_lossy().to_string());
	}

	log::debug!("{config:?}");
	Ok(config)
}

fn temp_path(output: &Path) -> PathBuf {
	let mut name = output.as_os_str().to_owned();
	name.push(".tmp");
	PathBuf::from(name)
}

fn load_source(path: &Path, config: &TileConfig) -> Result<RasterSource> {
	let dataset = raster::open(path, config.crs.as_deref().map(Crs::parse))?;
	RasterSource::from_dataset(dataset.as_ref(), config.band)
}

fn print_stats(stats: &WriteStats) {
	const KB: f64 = 1024.0;
	println!("zoom    tiles   min kB  mean kB   max kB");
	for (level, zoom) in stats.iter() {
		println!(
			"{level:>4} {:>8} {:>8.2} {:>8.2} {:>8.2}",
			zoom.count,
			zoom.min_bytes as f64 / KB,
			zoom.mean_bytes() / KB,
			zoom.max_bytes as f64 / KB
		);
	}
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let config = build_config(arguments)?;
	config.validate()?;

	eprintln!(
		"tile {:?} into {:?}",
		arguments.input_raster, arguments.output_container
	);
	let source = load_source(&arguments.input_raster, &config)?;

	let temp = temp_path(&arguments.output_container);
	let run = tile_raster(source, &temp, &config).await?;
	fs::rename(&temp, &arguments.output_container)
		.with_context(|| format!("moving {temp:?} to {:?}", arguments.output_container))?;

	print_stats(&run.stats);
	eprintln!(
		"finished: {} bins, {} tiles in zoom levels {}..={}",
		run.features,
		run.tiles.written,
		run.pyramid.min_zoom(),
		run.pyramid.max_zoom()
	);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::{TempDir, prelude::*};
	use clap::Parser;
	use pretty_assertions::assert_eq;

	#[derive(Parser, Debug)]
	struct Wrapper {
		#[command(flatten)]
		arguments: Subcommand,
	}

	fn parse(args: &[&str]) -> Subcommand {
		let mut argv = vec!["tile", "dem.asc", "dem.mbtiles"];
		argv.extend_from_slice(args);
		Wrapper::try_parse_from(argv).unwrap().arguments
	}

	#[test]
	fn defaults_and_name() -> Result<()> {
		let config = build_config(&parse(&[]))?;
		assert_eq!(
			config,
			TileConfig {
				name: Some("dem".to_string()),
				..TileConfig::default()
			}
		);
		Ok(())
	}

	#[test]
	fn flags_override_the_file() -> Result<()> {
		let dir = TempDir::new()?;
		let file = dir.child("options.yaml");
		file.write_str("interval: 10\nmax_extent: 4096\nlayer_name: elevation\nname: alps\n")?;
		let path = file.path().to_str().unwrap();

		let config = build_config(&parse(&["--config", path, "--interval", "2.5", "--zoom-adjust", "-2", "-c", "brotli"]))?;
		assert_eq!(config.interval, 2.5);
		assert_eq!(config.max_extent, 4096);
		assert_eq!(config.zoom_adjust, -2);
		assert_eq!(config.layer_name, "elevation");
		assert_eq!(config.compression, TileCompression::Brotli);
		assert_eq!(config.name.as_deref(), Some("alps"));
		Ok(())
	}

	#[test]
	fn temp_file_sits_next_to_the_output() {
		assert_eq!(temp_path(Path::new("out/dem.mbtiles")), PathBuf::from("out/dem.mbtiles.tmp"));
	}
}
