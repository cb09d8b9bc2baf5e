//! Single writer task in front of an [`MBTilesWriter`].
//!
//! Producers send `(TileCoord, Blob)` pairs over a bounded channel. A blocking task owns the
//! writer, groups incoming tiles into batches and commits every batch in one transaction.
//! The first storage error stops the task; it is reported by [`TileSink::finish`].

use crate::MBTilesWriter;
use anyhow::{Result, anyhow};
use rastervt_core::{Blob, TileCoord};
use std::collections::BTreeMap;
use tokio::{sync::mpsc, task::JoinHandle};

/// Stored payload sizes of one zoom level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZoomStats {
	pub count: u64,
	pub min_bytes: u64,
	pub max_bytes: u64,
	pub total_bytes: u64,
}

impl ZoomStats {
	fn record(&mut self, bytes: u64) {
		if self.count == 0 {
			self.min_bytes = bytes;
			self.max_bytes = bytes;
		} else {
			self.min_bytes = self.min_bytes.min(bytes);
			self.max_bytes = self.max_bytes.max(bytes);
		}
		self.count += 1;
		self.total_bytes += bytes;
	}

	#[must_use]
	pub fn mean_bytes(&self) -> f64 {
		if self.count == 0 {
			0.0
		} else {
			self.total_bytes as f64 / self.count as f64
		}
	}
}

/// Per-level statistics of everything a sink has written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteStats {
	levels: BTreeMap<u8, ZoomStats>,
}

impl WriteStats {
	pub fn record(&mut self, level: u8, bytes: u64) {
		self.levels.entry(level).or_default().record(bytes);
	}

	#[must_use]
	pub fn level(&self, level: u8) -> Option<&ZoomStats> {
		self.levels.get(&level)
	}

	pub fn iter(&self) -> impl Iterator<Item = (u8, &ZoomStats)> {
		self.levels.iter().map(|(level, stats)| (*level, stats))
	}

	#[must_use]
	pub fn total_tiles(&self) -> u64 {
		self.levels.values().map(|s| s.count).sum()
	}
}

pub struct TileSink {
	sender: mpsc::Sender<(TileCoord, Blob)>,
	handle: JoinHandle<Result<WriteStats>>,
}

impl TileSink {
	/// Moves `writer` onto a blocking task. `batch_size` tiles are committed per transaction.
	#[must_use]
	pub fn spawn(mut writer: MBTilesWriter, batch_size: usize) -> TileSink {
		let batch_size = batch_size.max(1);
		let (sender, mut receiver) = mpsc::channel::<(TileCoord, Blob)>(batch_size * 2);

		let handle = tokio::task::spawn_blocking(move || -> Result<WriteStats> {
			let mut stats = WriteStats::default();
			let mut batch = Vec::with_capacity(batch_size);

			let mut flush = |batch: &mut Vec<(TileCoord, Blob)>, stats: &mut WriteStats| -> Result<()> {
				if batch.is_empty() {
					return Ok(());
				}
				let levels: Vec<u8> = batch.iter().map(|(coord, _)| coord.level).collect();
				let sizes = writer.put_batch(std::mem::take(batch))?;
				for (level, size) in levels.into_iter().zip(sizes) {
					stats.record(level, size);
				}
				Ok(())
			};

			while let Some(tile) = receiver.blocking_recv() {
				batch.push(tile);
				if batch.len() >= batch_size {
					flush(&mut batch, &mut stats)?;
				}
			}
			flush(&mut batch, &mut stats)?;
			log::debug!("container writer finished after {} tiles", stats.total_tiles());
			Ok(stats)
		});

		TileSink { sender, handle }
	}

	/// Queues a tile at a TMS address. Fails when the writer task has stopped; the cause is
	/// then returned by [`TileSink::finish`].
	pub async fn send(&self, coord: TileCoord, blob: Blob) -> Result<()> {
		self
			.sender
			.send((coord, blob))
			.await
			.map_err(|_| anyhow!("container writer has stopped"))
	}

	/// Flushes the remaining tiles and waits for the writer task.
	pub async fn finish(self) -> Result<WriteStats> {
		drop(self.sender);
		self
			.handle
			.await
			.map_err(|err| anyhow!("container writer task failed: {err}"))?
	}
}
