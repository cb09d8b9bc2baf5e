//! Writing primitives and protobuf wire values to a byte sink.

use super::{ValueWriterBlob, wire};
use crate::Blob;
use anyhow::{Context, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

pub trait ValueWriter {
	fn get_writer(&mut self) -> &mut dyn Write;

	fn position(&mut self) -> Result<u64>;

	fn is_empty(&mut self) -> Result<bool> {
		Ok(self.position()? == 0)
	}

	fn write_varint(&mut self, mut value: u64) -> Result<()> {
		let mut buf = [0u8; 10];
		let mut len = 0;
		loop {
			let byte = (value & 0x7F) as u8;
			value >>= 7;
			if value == 0 {
				buf[len] = byte;
				len += 1;
				break;
			}
			buf[len] = byte | 0x80;
			len += 1;
		}
		self.get_writer().write_all(&buf[..len])?;
		Ok(())
	}

	fn write_svarint(&mut self, value: i64) -> Result<()> {
		self.write_varint(((value << 1) ^ (value >> 63)) as u64)
	}

	fn write_u8(&mut self, value: u8) -> Result<()> {
		Ok(self.get_writer().write_u8(value)?)
	}

	fn write_u32(&mut self, value: u32) -> Result<()> {
		Ok(self.get_writer().write_u32::<LittleEndian>(value)?)
	}

	fn write_u64(&mut self, value: u64) -> Result<()> {
		Ok(self.get_writer().write_u64::<LittleEndian>(value)?)
	}

	fn write_f32(&mut self, value: f32) -> Result<()> {
		Ok(self.get_writer().write_f32::<LittleEndian>(value)?)
	}

	fn write_f64(&mut self, value: f64) -> Result<()> {
		Ok(self.get_writer().write_f64::<LittleEndian>(value)?)
	}

	fn write_slice(&mut self, buf: &[u8]) -> Result<()> {
		Ok(self.get_writer().write_all(buf)?)
	}

	fn write_blob(&mut self, blob: &Blob) -> Result<()> {
		self.write_slice(blob.as_slice())
	}

	fn write_pbf_key(&mut self, field_number: u32, wire_type: u8) -> Result<()> {
		self
			.write_varint((u64::from(field_number) << 3) | u64::from(wire_type))
			.context("writing protobuf key")
	}

	/// Length prefix followed by the bytes.
	fn write_pbf_blob(&mut self, blob: &Blob) -> Result<()> {
		self.write_varint(blob.len())?;
		self.write_blob(blob)
	}

	fn write_pbf_string(&mut self, text: &str) -> Result<()> {
		self.write_varint(text.len() as u64)?;
		self.write_slice(text.as_bytes())
	}

	/// Writes `blob` as the length-delimited message `field`.
	fn write_pbf_message(&mut self, field: u32, blob: &Blob) -> Result<()> {
		self.write_pbf_key(field, wire::LEN)?;
		self.write_pbf_blob(blob)
	}

	fn write_pbf_packed_uint32(&mut self, values: &[u32]) -> Result<()> {
		let mut packed = ValueWriterBlob::new();
		for value in values {
			packed.write_varint(u64::from(*value))?;
		}
		self.write_pbf_blob(&packed.into_blob())
	}
}
