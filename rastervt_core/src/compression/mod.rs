//! Tile payload compression.
//!
//! [`compress`] and [`decompress`] dispatch on [`TileCompression`]; gzip and brotli live in
//! their own modules.

mod method_brotli;
mod method_gzip;

pub use method_brotli::*;
pub use method_gzip::*;

use crate::{Blob, TileCompression};
use anyhow::Result;
use rastervt_derive::context;

#[context("compressing tile payload with {compression}")]
pub fn compress(blob: Blob, compression: TileCompression) -> Result<Blob> {
	match compression {
		TileCompression::Uncompressed => Ok(blob),
		TileCompression::Gzip => compress_gzip(&blob),
		TileCompression::Brotli => compress_brotli(&blob),
	}
}

#[context("decompressing {compression} tile payload")]
pub fn decompress(blob: Blob, compression: TileCompression) -> Result<Blob> {
	match compression {
		TileCompression::Uncompressed => Ok(blob),
		TileCompression::Gzip => decompress_gzip(&blob),
		TileCompression::Brotli => decompress_brotli(&blob),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn sample() -> Blob {
		Blob::from(
			(0..4096u32)
				.map(|i| (i % 7 + i / 512) as u8)
				.collect::<Vec<u8>>(),
		)
	}

	#[rstest]
	#[case(TileCompression::Uncompressed)]
	#[case(TileCompression::Gzip)]
	#[case(TileCompression::Brotli)]
	fn restores_input(#[case] compression: TileCompression) -> Result<()> {
		let compressed = compress(sample(), compression)?;
		if compression != TileCompression::Uncompressed {
			assert!(compressed.len() < sample().len());
		}
		assert_eq!(decompress(compressed, compression)?, sample());
		Ok(())
	}

	#[test]
	fn garbage_fails_to_decompress() {
		let garbage = Blob::from(&[1u8, 2, 3, 4, 5]);
		assert!(decompress(garbage.clone(), TileCompression::Gzip).is_err());
		let err = decompress(garbage, TileCompression::Brotli).unwrap_err();
		assert!(format!("{err:#}").starts_with("decompressing brotli tile payload: "));
	}
}
