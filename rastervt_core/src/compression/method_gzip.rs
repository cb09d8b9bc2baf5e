use crate::Blob;
use anyhow::{Context, Result};
use flate2::bufread::{GzDecoder, GzEncoder};
use std::io::Read;

pub fn compress_gzip(blob: &Blob) -> Result<Blob> {
	let mut out = Vec::new();
	GzEncoder::new(blob.as_slice(), flate2::Compression::best())
		.read_to_end(&mut out)
		.context("gzip compression failed")?;
	Ok(Blob::from(out))
}

pub fn decompress_gzip(blob: &Blob) -> Result<Blob> {
	let mut out = Vec::new();
	GzDecoder::new(blob.as_slice())
		.read_to_end(&mut out)
		.context("gzip decompression failed")?;
	Ok(Blob::from(out))
}
