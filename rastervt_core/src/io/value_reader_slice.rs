//! [`ValueReader`] over a borrowed byte slice.
//!
//! ```
//! use rastervt_core::io::{ValueReader, ValueReaderSlice};
//!
//! let mut reader = ValueReaderSlice::new(&[0xAC, 0x02, 0x01]);
//! assert_eq!(reader.read_varint().unwrap(), 300);
//! assert_eq!(reader.remaining(), 1);
//! ```

use super::{SeekRead, ValueReader, value_reader::ensure_available};
use anyhow::{Context, Result};
use std::io::Cursor;

pub struct ValueReaderSlice<'a> {
	cursor: Cursor<&'a [u8]>,
}

impl<'a> ValueReaderSlice<'a> {
	#[must_use]
	pub fn new(slice: &'a [u8]) -> ValueReaderSlice<'a> {
		ValueReaderSlice {
			cursor: Cursor::new(slice),
		}
	}
}

impl SeekRead for Cursor<&[u8]> {}

impl<'a> ValueReader<'a> for ValueReaderSlice<'a> {
	fn get_reader(&mut self) -> &mut dyn SeekRead {
		&mut self.cursor
	}

	fn len(&self) -> u64 {
		self.cursor.get_ref().len() as u64
	}

	fn position(&mut self) -> u64 {
		self.cursor.position()
	}

	fn get_sub_reader<'b>(&'b mut self, length: u64) -> Result<Box<dyn ValueReader<'b> + 'b>> {
		ensure_available(self.remaining(), length)?;
		let start = self.cursor.position() as usize;
		let end = start + length as usize;
		let slice: &'a [u8] = *self.cursor.get_ref();
		let sub = slice.get(start..end).context("sub-reader out of bounds")?;
		self.cursor.set_position(end as u64);
		Ok(Box::new(ValueReaderSlice::new(sub)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn varints() -> Result<()> {
		let mut reader = ValueReaderSlice::new(&[0x96, 0x01, 0x95, 0x01, 0x00]);
		assert_eq!(reader.read_varint()?, 150);
		assert_eq!(reader.read_svarint()?, -75);
		assert_eq!(reader.read_svarint()?, 0);
		assert!(!reader.has_remaining());
		Ok(())
	}

	#[test]
	fn overlong_varint_fails() {
		let mut reader = ValueReaderSlice::new(&[0x80; 11]);
		assert!(reader.read_varint().is_err());
	}

	#[test]
	fn fixed_width_is_little_endian() -> Result<()> {
		let mut reader = ValueReaderSlice::new(&[0x00, 0x00, 0x80, 0x3F, 0x2A, 0x00, 0x00, 0x00]);
		assert_eq!(reader.read_f32()?, 1.0);
		assert_eq!(reader.read_u32()?, 42);
		Ok(())
	}

	#[test]
	fn sub_reader_advances_parent() -> Result<()> {
		let data = [0x03, b'a', b'b', b'c', 0x07];
		let mut reader = ValueReaderSlice::new(&data);
		{
			let mut sub = reader.get_pbf_sub_reader()?;
			assert_eq!(sub.len(), 3);
			assert_eq!(sub.read_string(3)?, "abc");
			assert!(sub.read_u8().is_err());
		}
		assert_eq!(reader.read_u8()?, 7);
		Ok(())
	}

	#[test]
	fn truncated_input() {
		let mut reader = ValueReaderSlice::new(&[0x05, b'a']);
		assert!(reader.read_pbf_string().is_err());
		let mut reader = ValueReaderSlice::new(&[0x01, 0x02]);
		assert!(reader.get_sub_reader(3).is_err());
	}

	#[test]
	fn packed_and_skipped_fields() -> Result<()> {
		// packed [100, 150, 300], then a fixed32 field value, then varint 9
		let data = [5, 100, 150, 1, 172, 2, 1, 2, 3, 4, 9];
		let mut reader = ValueReaderSlice::new(&data);
		assert_eq!(reader.read_pbf_packed_uint32()?, vec![100, 150, 300]);
		reader.skip_pbf_value(crate::io::wire::FIXED32)?;
		assert_eq!(reader.read_varint()?, 9);
		Ok(())
	}
}
