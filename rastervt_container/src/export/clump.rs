//! Concatenate all stored payloads into one file plus a JSON index of byte ranges.
//!
//! The index maps `"z/x/y"` (XYZ rows) to `[start, end]`, end exclusive, so a static file
//! server can answer tile requests with HTTP range reads.

use crate::MBTilesReader;
use anyhow::{Context, Result};
use rastervt_derive::context;
use std::{
	collections::BTreeMap,
	fs::File,
	io::{BufWriter, Write},
	path::Path,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClumpReport {
	pub tiles: u64,
	pub bytes: u64,
}

/// Byte range of every tile inside the clump file.
pub type ClumpIndex = BTreeMap<String, [u64; 2]>;

#[context("clumping '{}' into '{}'", reader.name(), clump_path.display())]
pub fn clump(reader: &MBTilesReader, clump_path: &Path, index_path: &Path) -> Result<ClumpReport> {
	let mut output = BufWriter::new(File::create(clump_path).with_context(|| format!("creating {clump_path:?}"))?);
	let mut index = ClumpIndex::new();
	let mut offset = 0u64;

	for coord in reader.list() {
		let coord = coord?;
		let blob = reader.get_raw(&coord)?;
		output.write_all(blob.as_slice())?;
		let end = offset + blob.len();
		index.insert(coord.flipped_y().to_string(), [offset, end]);
		offset = end;
	}
	output.flush()?;

	let index_file = File::create(index_path).with_context(|| format!("creating {index_path:?}"))?;
	serde_json::to_writer(BufWriter::new(index_file), &index)?;

	log::info!("clumped {} tiles, {offset} bytes", index.len());
	Ok(ClumpReport {
		tiles: index.len() as u64,
		bytes: offset,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{ContainerMetadata, MBTilesWriter};
	use assert_fs::{NamedTempFile, TempDir};
	use pretty_assertions::assert_eq;
	use rastervt_core::{Blob, TileCompression, TileCoord};

	#[test]
	fn ranges_cover_the_clump() -> Result<()> {
		let file = NamedTempFile::new("clump.mbtiles")?;
		let mut writer =
			MBTilesWriter::create(&file, &ContainerMetadata::new("clump", TileCompression::Uncompressed, 0, 1))?;
		writer.put(&TileCoord::new(0, 0, 0)?, Blob::from("aaaa"))?;
		writer.put(&TileCoord::new(1, 1, 0)?, Blob::from("bb"))?;
		drop(writer);

		let dir = TempDir::new()?;
		let clump_path = dir.join("tiles.clump");
		let index_path = dir.join("index.json");
		let report = clump(&MBTilesReader::open(&file)?, &clump_path, &index_path)?;
		assert_eq!(report, ClumpReport { tiles: 2, bytes: 6 });

		assert_eq!(std::fs::read_to_string(&clump_path)?, "aaaabb");
		let index: ClumpIndex = serde_json::from_str(&std::fs::read_to_string(&index_path)?)?;
		// TMS row 0 at level 1 is XYZ row 1
		assert_eq!(
			index,
			ClumpIndex::from([("0/0/0".to_string(), [0, 4]), ("1/1/1".to_string(), [4, 6])])
		);
		Ok(())
	}
}
