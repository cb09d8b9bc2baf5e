//! Reading primitives and protobuf wire values from a byte source.
//!
//! Fixed-width numbers are little-endian, which is what protobuf uses for `fixed32`, `fixed64`,
//! `float` and `double` fields.

use crate::Blob;
use anyhow::{Context, Result, bail};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Read, Seek};

pub trait SeekRead: Seek + Read {}

/// Protobuf wire types.
pub mod wire {
	pub const VARINT: u8 = 0;
	pub const FIXED64: u8 = 1;
	pub const LEN: u8 = 2;
	pub const FIXED32: u8 = 5;
}

pub trait ValueReader<'a> {
	fn get_reader(&mut self) -> &mut dyn SeekRead;

	fn len(&self) -> u64;

	fn position(&mut self) -> u64;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn remaining(&mut self) -> u64 {
		self.len().saturating_sub(self.position())
	}

	fn has_remaining(&mut self) -> bool {
		self.remaining() > 0
	}

	/// Base-128 varint, at most 10 bytes.
	fn read_varint(&mut self) -> Result<u64> {
		let mut value = 0u64;
		for shift in (0..70).step_by(7) {
			let byte = self.get_reader().read_u8()?;
			value |= (u64::from(byte) & 0x7F) << shift;
			if byte & 0x80 == 0 {
				return Ok(value);
			}
		}
		bail!("varint longer than 10 bytes")
	}

	/// Zigzag encoded varint.
	fn read_svarint(&mut self) -> Result<i64> {
		let raw = self.read_varint()?;
		Ok((raw >> 1) as i64 ^ -((raw & 1) as i64))
	}

	fn read_u8(&mut self) -> Result<u8> {
		Ok(self.get_reader().read_u8()?)
	}

	fn read_u32(&mut self) -> Result<u32> {
		Ok(self.get_reader().read_u32::<LittleEndian>()?)
	}

	fn read_u64(&mut self) -> Result<u64> {
		Ok(self.get_reader().read_u64::<LittleEndian>()?)
	}

	fn read_f32(&mut self) -> Result<f32> {
		Ok(self.get_reader().read_f32::<LittleEndian>()?)
	}

	fn read_f64(&mut self) -> Result<f64> {
		Ok(self.get_reader().read_f64::<LittleEndian>()?)
	}

	fn read_blob(&mut self, length: u64) -> Result<Blob> {
		ensure_available(self.remaining(), length)?;
		let mut blob = Blob::new_sized(length as usize);
		self.get_reader().read_exact(blob.as_mut_slice())?;
		Ok(blob)
	}

	fn read_string(&mut self, length: u64) -> Result<String> {
		let blob = self.read_blob(length)?;
		String::from_utf8(blob.into_vec()).context("string is not valid UTF-8")
	}

	/// Reads a field key and splits it into `(field_number, wire_type)`.
	fn read_pbf_key(&mut self) -> Result<(u32, u8)> {
		let key = self.read_varint().context("reading protobuf key")?;
		Ok(((key >> 3) as u32, (key & 0x07) as u8))
	}

	/// Skips the value of a field the caller does not understand.
	fn skip_pbf_value(&mut self, wire_type: u8) -> Result<()> {
		let length = match wire_type {
			wire::VARINT => {
				self.read_varint()?;
				return Ok(());
			}
			wire::FIXED64 => 8,
			wire::FIXED32 => 4,
			wire::LEN => self.read_varint()?,
			other => bail!("unsupported protobuf wire type {other}"),
		};
		self.read_blob(length)?;
		Ok(())
	}

	/// A reader over the next `length` bytes. The parent continues after them.
	fn get_sub_reader<'b>(&'b mut self, length: u64) -> Result<Box<dyn ValueReader<'b> + 'b>>;

	/// A reader over a length-delimited protobuf message.
	fn get_pbf_sub_reader<'b>(&'b mut self) -> Result<Box<dyn ValueReader<'b> + 'b>> {
		let length = self.read_varint().context("reading message length")?;
		self.get_sub_reader(length)
	}

	fn read_pbf_blob(&mut self) -> Result<Blob> {
		let length = self.read_varint().context("reading blob length")?;
		self.read_blob(length)
	}

	fn read_pbf_string(&mut self) -> Result<String> {
		let length = self.read_varint().context("reading string length")?;
		self.read_string(length)
	}

	fn read_pbf_packed_uint32(&mut self) -> Result<Vec<u32>> {
		let mut reader = self.get_pbf_sub_reader()?;
		let mut values = Vec::new();
		while reader.has_remaining() {
			let value = reader.read_varint().context("reading packed value")?;
			values.push(u32::try_from(value).context("packed value exceeds u32")?);
		}
		Ok(values)
	}
}

pub(crate) fn ensure_available(remaining: u64, wanted: u64) -> Result<()> {
	if wanted > remaining {
		bail!("requested {wanted} bytes but only {remaining} remain");
	}
	Ok(())
}
