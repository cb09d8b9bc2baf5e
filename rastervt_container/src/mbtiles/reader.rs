//! Read tiles and metadata from an MBTiles (SQLite) database.
//!
//! Addresses are TMS rows, exactly as they are stored. [`MBTilesReader::list`] walks the tile
//! table lazily with keyset pagination over `(zoom_level, tile_column, tile_row)`, so listing
//! a large container never loads more than one page of addresses at a time.

use crate::ContainerMetadata;
use anyhow::{Result, ensure};
use r2d2::Pool;
use r2d2_sqlite::{
	SqliteConnectionManager,
	rusqlite::{OptionalExtension, OpenFlags},
};
use rastervt_core::{Blob, RasterVtError, TileCoord, compression::decompress};
use rastervt_derive::context;
use std::{collections::VecDeque, path::Path};

const PAGE_SIZE: u32 = 1024;

fn io_error(err: impl std::fmt::Display) -> anyhow::Error {
	RasterVtError::container_io(err).into()
}

/// Read-only view of an MBTiles file. Cloning shares the connection pool.
#[derive(Clone)]
pub struct MBTilesReader {
	name: String,
	pool: Pool<SqliteConnectionManager>,
	metadata: ContainerMetadata,
}

impl MBTilesReader {
	/// Opens an existing database and loads its metadata. Fails when `format` is missing.
	#[context("opening MBTiles container '{}'", path.display())]
	pub fn open(path: &Path) -> Result<MBTilesReader> {
		log::debug!("open {path:?}");
		ensure!(path.is_file(), RasterVtError::ContainerIO(format!("file {path:?} does not exist")));

		let manager = SqliteConnectionManager::file(path).with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY);
		let pool = Pool::builder().max_size(8).build(manager).map_err(io_error)?;

		let entries = {
			let conn = pool.get().map_err(io_error)?;
			let mut statement = conn.prepare("SELECT name, value FROM metadata").map_err(io_error)?;
			statement
				.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
				.map_err(io_error)?
				.collect::<Result<Vec<_>, _>>()
				.map_err(io_error)?
		};

		Ok(MBTilesReader {
			name: path.display().to_string(),
			pool,
			metadata: ContainerMetadata::from_entries(entries)?,
		})
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub fn metadata(&self) -> &ContainerMetadata {
		&self.metadata
	}

	/// Lazily lists all stored addresses (TMS rows) ordered by level, column and row.
	#[must_use]
	pub fn list(&self) -> TileCoordIter {
		TileCoordIter {
			pool: self.pool.clone(),
			buffer: VecDeque::new(),
			last: (-1, -1, -1),
			done: false,
		}
	}

	#[context("counting tiles in '{}'", self.name)]
	pub fn count_tiles(&self) -> Result<u64> {
		let conn = self.pool.get().map_err(io_error)?;
		let count = conn
			.query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get::<_, i64>(0))
			.map_err(io_error)?;
		Ok(count as u64)
	}

	/// The payload exactly as stored, still compressed.
	#[context("reading tile {} from '{}'", coord, self.name)]
	pub fn get_raw(&self, coord: &TileCoord) -> Result<Blob> {
		log::trace!("read tile {coord:?}");
		let conn = self.pool.get().map_err(io_error)?;
		let data = conn
			.query_row(
				"SELECT tile_data FROM tiles WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
				[u32::from(coord.level), coord.x, coord.y],
				|row| row.get::<_, Vec<u8>>(0),
			)
			.optional()
			.map_err(io_error)?;
		match data {
			Some(data) => Ok(Blob::from(data)),
			None => Err(RasterVtError::TileNotFound(*coord).into()),
		}
	}

	/// The decompressed payload of a tile.
	pub fn get(&self, coord: &TileCoord) -> Result<Blob> {
		decompress(self.get_raw(coord)?, self.metadata.compression)
	}
}

impl std::fmt::Debug for MBTilesReader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MBTilesReader")
			.field("name", &self.name)
			.field("metadata", &self.metadata)
			.finish()
	}
}

/// Iterator returned by [`MBTilesReader::list`].
pub struct TileCoordIter {
	pool: Pool<SqliteConnectionManager>,
	buffer: VecDeque<TileCoord>,
	last: (i64, i64, i64),
	done: bool,
}

impl TileCoordIter {
	#[context("listing tiles after {:?}", self.last)]
	fn fetch_page(&mut self) -> Result<()> {
		let conn = self.pool.get().map_err(io_error)?;
		let mut statement = conn
			.prepare_cached(
				"SELECT zoom_level, tile_column, tile_row FROM tiles
				WHERE (zoom_level, tile_column, tile_row) > (?1, ?2, ?3)
				ORDER BY zoom_level, tile_column, tile_row LIMIT ?4",
			)
			.map_err(io_error)?;
		let (z, x, y) = self.last;
		let rows = statement
			.query_map([z, x, y, i64::from(PAGE_SIZE)], |row| {
				Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
			})
			.map_err(io_error)?
			.collect::<Result<Vec<_>, _>>()
			.map_err(io_error)?;

		if rows.len() < PAGE_SIZE as usize {
			self.done = true;
		}
		if let Some(last) = rows.last() {
			self.last = *last;
		}
		for (z, x, y) in rows {
			let coord = TileCoord::new(u8::try_from(z)?, u32::try_from(x)?, u32::try_from(y)?)
				.map_err(|err| io_error(format!("invalid tile address {z}/{x}/{y}: {err}")))?;
			self.buffer.push_back(coord);
		}
		Ok(())
	}
}

impl Iterator for TileCoordIter {
	type Item = Result<TileCoord>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.buffer.is_empty() && !self.done {
			if let Err(err) = self.fetch_page() {
				self.done = true;
				return Some(Err(err));
			}
		}
		self.buffer.pop_front().map(Ok)
	}
}
