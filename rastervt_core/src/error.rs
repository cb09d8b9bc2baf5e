//! Error kinds that callers need to tell apart.
//!
//! Functions across the workspace return [`anyhow::Result`]. When a failure belongs to one of
//! the kinds below, it is raised as a [`RasterVtError`] and wrapped with stage context on the
//! way up. [`RasterVtError::find`] digs it out of the context chain again.

use crate::TileCoord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterVtError {
	/// The raster has no CRS, no bands, a rotated transform or an unusable pixel size.
	#[error("invalid raster: {0}")]
	InvalidRaster(String),

	/// Tile extents must both be positive and `min <= max`.
	#[error("invalid extent range: min extent {min}, max extent {max} (both must be > 0 and min <= max)")]
	InvalidExtentRange { min: u32, max: u32 },

	/// The vectorization interval must be finite and positive.
	#[error("invalid interval {0}: must be a finite number > 0")]
	InvalidInterval(f64),

	/// A tile address was written twice into the same container.
	#[error("duplicate tile {0:?}")]
	DuplicateTile(TileCoord),

	/// The storage layer failed. Partial writes cannot be trusted, so this is always fatal.
	#[error("container I/O error: {0}")]
	ContainerIO(String),

	#[error("tile {0:?} not found")]
	TileNotFound(TileCoord),

	/// Clipping and quantizing produced an invalid polygon. The fragment is dropped.
	#[error("invalid clip result for feature {feature} in tile {coord:?}: {reason}")]
	GeometryClip { coord: TileCoord, feature: u64, reason: String },
}

impl RasterVtError {
	/// Finds the first `RasterVtError` in the cause chain of `err`.
	pub fn find(err: &anyhow::Error) -> Option<&RasterVtError> {
		err.chain().find_map(|cause| cause.downcast_ref::<RasterVtError>())
	}

	/// Wraps any displayable storage failure as [`RasterVtError::ContainerIO`].
	pub fn container_io(err: impl std::fmt::Display) -> RasterVtError {
		RasterVtError::ContainerIO(err.to_string())
	}

	/// Whether a run must stop when this error occurs.
	pub fn is_fatal(&self) -> bool {
		!matches!(
			self,
			RasterVtError::TileNotFound(_) | RasterVtError::GeometryClip { .. }
		)
	}
}
