//! [`Blob`], an owned byte buffer used for tile payloads in every stage after encoding.
//!
//! ```rust
//! use rastervt_core::Blob;
//!
//! let blob = Blob::from(vec![0x1a, 0x02]);
//! assert_eq!(blob.len(), 2);
//! assert_eq!(blob.as_hex(), "1a 02");
//! ```

use std::fmt::Debug;

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Blob(Vec<u8>);

impl Blob {
	#[must_use]
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	/// Creates a zero-filled blob of `length` bytes.
	#[must_use]
	pub fn new_sized(length: usize) -> Blob {
		Blob(vec![0u8; length])
	}

	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		&self.0
	}

	pub fn as_mut_slice(&mut self) -> &mut [u8] {
		&mut self.0
	}

	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// Space separated lowercase hex bytes, handy in test failures.
	#[must_use]
	pub fn as_hex(&self) -> String {
		self
			.0
			.iter()
			.map(|byte| format!("{byte:02x}"))
			.collect::<Vec<_>>()
			.join(" ")
	}

	#[must_use]
	pub fn len(&self) -> u64 {
		self.0.len() as u64
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<u8>> for Blob {
	fn from(item: Vec<u8>) -> Self {
		Blob(item)
	}
}

impl From<&[u8]> for Blob {
	fn from(item: &[u8]) -> Self {
		Blob(item.to_vec())
	}
}

impl<const N: usize> From<&[u8; N]> for Blob {
	fn from(item: &[u8; N]) -> Self {
		Blob(item.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(item: &str) -> Self {
		Blob(item.as_bytes().to_vec())
	}
}

impl AsRef<[u8]> for Blob {
	fn as_ref(&self) -> &[u8] {
		&self.0
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		const PREVIEW: usize = 16;
		let head = Blob::from(&self.0[..self.0.len().min(PREVIEW)]).as_hex();
		if self.0.len() > PREVIEW {
			write!(f, "Blob({} bytes: {head} ...)", self.0.len())
		} else {
			write!(f, "Blob({} bytes: {head})", self.0.len())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn conversions() {
		let blob = Blob::from("mvt");
		assert_eq!(blob.as_slice(), b"mvt");
		assert_eq!(Blob::from(&[1u8, 2, 3]).into_vec(), vec![1, 2, 3]);
		assert_eq!(Blob::from(vec![9u8]).as_ref(), &[9]);
	}

	#[test]
	fn sized_and_empty() {
		assert!(Blob::new_empty().is_empty());
		let mut blob = Blob::new_sized(3);
		assert_eq!(blob.len(), 3);
		blob.as_mut_slice()[1] = 0xff;
		assert_eq!(blob.as_hex(), "00 ff 00");
	}

	#[test]
	fn debug_is_truncated() {
		assert_eq!(format!("{:?}", Blob::from(&[0xab, 0xcd])), "Blob(2 bytes: ab cd)");
		let long = Blob::new_sized(20);
		assert!(format!("{long:?}").starts_with("Blob(20 bytes: 00 00"));
		assert!(format!("{long:?}").ends_with(" ...)"));
	}
}
