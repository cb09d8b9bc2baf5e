//! Write tiles into a new MBTiles (SQLite) database.
//!
//! The writer creates the `metadata` and `tiles` tables of the
//! [MBTiles 1.3 layout](https://github.com/mapbox/mbtiles-spec), stores the metadata once and
//! then accepts tiles addressed in **TMS** rows (row 0 is the southernmost). Payloads are
//! compressed with the container's compression before they are inserted.
//!
//! Every storage failure is reported as [`RasterVtError::ContainerIO`], a second insert of the
//! same address as [`RasterVtError::DuplicateTile`].

use crate::ContainerMetadata;
use anyhow::Result;
use r2d2::Pool;
use r2d2_sqlite::{
	SqliteConnectionManager,
	rusqlite::{self, ErrorCode, params},
};
use rastervt_core::{Blob, RasterVtError, TileCompression, TileCoord, compression::compress};
use rastervt_derive::context;
use std::{fs::remove_file, path::Path};

pub struct MBTilesWriter {
	pool: Pool<SqliteConnectionManager>,
	compression: TileCompression,
}

fn io_error(err: impl std::fmt::Display) -> anyhow::Error {
	RasterVtError::container_io(err).into()
}

fn insert_error(coord: &TileCoord, err: rusqlite::Error) -> anyhow::Error {
	match err.sqlite_error_code() {
		Some(ErrorCode::ConstraintViolation) => RasterVtError::DuplicateTile(*coord).into(),
		_ => io_error(err),
	}
}

impl MBTilesWriter {
	/// Creates a new database at `path`, replacing an existing file, and writes `metadata`.
	#[context("creating MBTiles container '{}'", path.display())]
	pub fn create(path: &Path, metadata: &ContainerMetadata) -> Result<MBTilesWriter> {
		log::debug!("create {path:?}");

		if path.exists() {
			remove_file(path).map_err(io_error)?;
		}

		let manager = SqliteConnectionManager::file(path);
		let pool = Pool::builder().max_size(1).build(manager).map_err(io_error)?;

		pool
			.get()
			.map_err(io_error)?
			.execute_batch(
				"CREATE TABLE metadata (name TEXT, value TEXT, UNIQUE (name));
				CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB, UNIQUE (zoom_level, tile_column, tile_row));
				CREATE UNIQUE INDEX tile_index on tiles (zoom_level, tile_column, tile_row);",
			)
			.map_err(io_error)?;

		let writer = MBTilesWriter {
			pool,
			compression: metadata.compression,
		};
		for (name, value) in metadata.to_entries()? {
			writer.set_metadata(name, &value)?;
		}
		Ok(writer)
	}

	#[context("setting metadata '{}'", name)]
	fn set_metadata(&self, name: &str, value: &str) -> Result<()> {
		self
			.pool
			.get()
			.map_err(io_error)?
			.execute(
				"INSERT INTO metadata (name, value) VALUES (?1, ?2)",
				params![name, value],
			)
			.map_err(io_error)?;
		Ok(())
	}

	#[must_use]
	pub fn compression(&self) -> TileCompression {
		self.compression
	}

	/// Compresses and stores one tile at a TMS address. Returns the stored size in bytes.
	#[context("writing tile {}", coord)]
	pub fn put(&mut self, coord: &TileCoord, blob: Blob) -> Result<u64> {
		let blob = compress(blob, self.compression)?;
		self
			.pool
			.get()
			.map_err(io_error)?
			.execute(
				"INSERT INTO tiles (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)",
				params![coord.level, coord.x, coord.y, blob.as_slice()],
			)
			.map_err(|err| insert_error(coord, err))?;
		Ok(blob.len())
	}

	/// Stores many tiles in one transaction: either all of them are written or none.
	/// Returns the stored size of every tile, in input order.
	#[context("writing a batch of tiles")]
	pub fn put_batch(&mut self, tiles: Vec<(TileCoord, Blob)>) -> Result<Vec<u64>> {
		let tiles = tiles
			.into_iter()
			.map(|(coord, blob)| Ok((coord, compress(blob, self.compression)?)))
			.collect::<Result<Vec<_>>>()?;

		let mut conn = self.pool.get().map_err(io_error)?;
		let transaction = conn.transaction().map_err(io_error)?;
		let mut sizes = Vec::with_capacity(tiles.len());
		{
			let mut statement = transaction
				.prepare_cached("INSERT INTO tiles (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)")
				.map_err(io_error)?;
			for (coord, blob) in &tiles {
				statement
					.execute(params![coord.level, coord.x, coord.y, blob.as_slice()])
					.map_err(|err| insert_error(coord, err))?;
				sizes.push(blob.len());
			}
		}
		transaction.commit().map_err(io_error)?;
		log::trace!("committed {} tiles", sizes.len());
		Ok(sizes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::MBTilesReader;
	use assert_fs::NamedTempFile;

	fn metadata(compression: TileCompression) -> ContainerMetadata {
		ContainerMetadata::new("test", compression, 0, 3)
	}

	fn coord(level: u8, x: u32, y: u32) -> TileCoord {
		TileCoord::new(level, x, y).unwrap()
	}

	#[test]
	fn create_replaces_existing_file() -> Result<()> {
		let file = NamedTempFile::new("replace.mbtiles")?;
		std::fs::write(&file, b"not a database")?;
		let mut writer = MBTilesWriter::create(&file, &metadata(TileCompression::Gzip))?;
		writer.put(&coord(0, 0, 0), Blob::from("tile"))?;
		drop(writer);

		let reader = MBTilesReader::open(&file)?;
		assert_eq!(reader.get(&coord(0, 0, 0))?, Blob::from("tile"));
		Ok(())
	}

	#[test]
	fn duplicate_tiles_are_rejected() -> Result<()> {
		let file = NamedTempFile::new("duplicate.mbtiles")?;
		let mut writer = MBTilesWriter::create(&file, &metadata(TileCompression::Uncompressed))?;
		writer.put(&coord(1, 1, 0), Blob::from("a"))?;
		let err = writer.put(&coord(1, 1, 0), Blob::from("b")).unwrap_err();
		assert!(matches!(
			RasterVtError::find(&err),
			Some(RasterVtError::DuplicateTile(c)) if *c == coord(1, 1, 0)
		));
		Ok(())
	}

	#[test]
	fn failed_batch_writes_nothing() -> Result<()> {
		let file = NamedTempFile::new("batch.mbtiles")?;
		let mut writer = MBTilesWriter::create(&file, &metadata(TileCompression::Uncompressed))?;
		let batch = vec![
			(coord(2, 0, 0), Blob::from("a")),
			(coord(2, 1, 0), Blob::from("b")),
			(coord(2, 0, 0), Blob::from("c")),
		];
		let err = writer.put_batch(batch).unwrap_err();
		assert!(matches!(RasterVtError::find(&err), Some(RasterVtError::DuplicateTile(_))));
		assert_eq!(err.to_string(), "writing a batch of tiles");

		let sizes = writer.put_batch(vec![(coord(2, 3, 3), Blob::from("abc"))])?;
		assert_eq!(sizes, vec![3]);
		drop(writer);

		let reader = MBTilesReader::open(&file)?;
		let coords = reader.list().collect::<Result<Vec<_>>>()?;
		assert_eq!(coords, vec![coord(2, 3, 3)]);
		Ok(())
	}
}
