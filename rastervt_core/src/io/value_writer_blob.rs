//! [`ValueWriter`] collecting into an in-memory [`Blob`].
//!
//! ```
//! use rastervt_core::io::{ValueWriter, ValueWriterBlob};
//!
//! let mut writer = ValueWriterBlob::new();
//! writer.write_svarint(-75).unwrap();
//! assert_eq!(writer.into_blob().into_vec(), vec![149, 1]);
//! ```

use super::ValueWriter;
use crate::Blob;
use anyhow::Result;
use std::io::{Cursor, Write};

#[derive(Default)]
pub struct ValueWriterBlob {
	cursor: Cursor<Vec<u8>>,
}

impl ValueWriterBlob {
	#[must_use]
	pub fn new() -> ValueWriterBlob {
		ValueWriterBlob::default()
	}

	#[must_use]
	pub fn into_blob(self) -> Blob {
		Blob::from(self.cursor.into_inner())
	}
}

impl ValueWriter for ValueWriterBlob {
	fn get_writer(&mut self) -> &mut dyn Write {
		&mut self.cursor
	}

	fn position(&mut self) -> Result<u64> {
		Ok(self.cursor.position())
	}
}
