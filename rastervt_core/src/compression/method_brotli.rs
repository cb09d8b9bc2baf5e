use crate::Blob;
use anyhow::{Context, Result};
use brotli::{BrotliCompress, BrotliDecompress, enc::BrotliEncoderParams};
use std::io::Cursor;

const QUALITY: i32 = 10;
const WINDOW_BITS: i32 = 19;

pub fn compress_brotli(blob: &Blob) -> Result<Blob> {
	let params = BrotliEncoderParams {
		quality: QUALITY,
		lgwin: WINDOW_BITS,
		size_hint: blob.as_slice().len(),
		..Default::default()
	};
	let mut out = Vec::new();
	BrotliCompress(&mut Cursor::new(blob.as_slice()), &mut out, &params)
		.context("brotli compression failed")?;
	Ok(Blob::from(out))
}

pub fn decompress_brotli(blob: &Blob) -> Result<Blob> {
	let mut out = Vec::new();
	BrotliDecompress(&mut Cursor::new(blob.as_slice()), &mut out).context("brotli decompression failed")?;
	Ok(Blob::from(out))
}
