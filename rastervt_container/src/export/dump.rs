//! Write every tile of a container as a file `{z}/{x}/{y}[.ext]`.

use crate::MBTilesReader;
use anyhow::{Context, Result, anyhow};
use futures::{StreamExt, stream};
use rastervt_core::{RasterVtError, TileCoord};
use rastervt_derive::context;
use std::{
	fs,
	path::{Path, PathBuf},
};

#[derive(Clone, Debug, Default)]
pub struct DumpOptions {
	/// Name files by XYZ rows (row 0 in the north) instead of the stored TMS rows.
	pub xyz: bool,
	/// Appended to every file name, with or without the leading dot.
	pub extension: Option<String>,
	/// Number of tiles read and written at the same time.
	pub concurrency: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DumpReport {
	pub written: u64,
	pub skipped: u64,
}

enum Outcome {
	Written,
	Skipped,
}

/// Relative path of a tile file.
#[must_use]
pub fn tile_path(coord: &TileCoord, xyz: bool, extension: Option<&str>) -> PathBuf {
	let y = if xyz { coord.flipped_y().y } else { coord.y };
	let mut name = y.to_string();
	if let Some(extension) = extension.filter(|e| !e.is_empty()) {
		if !extension.starts_with('.') {
			name.push('.');
		}
		name.push_str(extension);
	}
	[coord.level.to_string(), coord.x.to_string(), name].iter().collect()
}

fn dump_tile(reader: &MBTilesReader, coord: TileCoord, directory: &Path, options: &DumpOptions) -> Result<Outcome> {
	let blob = match reader.get(&coord) {
		Ok(blob) => blob,
		Err(err) => {
			if let Some(RasterVtError::TileNotFound(_)) = RasterVtError::find(&err) {
				log::warn!("skipping tile {coord}: {err:#}");
				return Ok(Outcome::Skipped);
			}
			return Err(err);
		}
	};

	let path = directory.join(tile_path(&coord, options.xyz, options.extension.as_deref()));
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).with_context(|| format!("creating directory {parent:?}"))?;
	}
	fs::write(&path, blob.as_slice()).with_context(|| format!("writing {path:?}"))?;
	log::trace!("wrote {path:?}");
	Ok(Outcome::Written)
}

/// Decompresses every stored tile into `directory`. Reads and writes run in parallel.
///
/// Missing tiles are skipped with a warning. Container and file system errors abort the run.
#[context("dumping '{}' into '{}'", reader.name(), directory.display())]
pub async fn dump(reader: &MBTilesReader, directory: &Path, options: &DumpOptions) -> Result<DumpReport> {
	dump_coords(reader, reader.list(), directory, options).await
}

async fn dump_coords(
	reader: &MBTilesReader,
	coords: impl Iterator<Item = Result<TileCoord>>,
	directory: &Path,
	options: &DumpOptions,
) -> Result<DumpReport> {
	fs::create_dir_all(directory).with_context(|| format!("creating directory {directory:?}"))?;

	let concurrency = options.concurrency.max(1);
	let mut results = stream::iter(coords)
		.map(|coord| {
			let reader = reader.clone();
			let directory = directory.to_path_buf();
			let options = options.clone();
			async move {
				let coord = coord?;
				tokio::task::spawn_blocking(move || dump_tile(&reader, coord, &directory, &options))
					.await
					.map_err(|err| anyhow!("dump task failed: {err}"))?
			}
		})
		.buffer_unordered(concurrency);

	let mut report = DumpReport::default();
	while let Some(outcome) = results.next().await {
		match outcome? {
			Outcome::Written => report.written += 1,
			Outcome::Skipped => report.skipped += 1,
		}
	}

	log::info!("dumped {} tiles, skipped {}", report.written, report.skipped);
	Ok(report)
}
