//! Compression applied to stored tile payloads.
//!
//! ```
//! use rastervt_core::TileCompression;
//!
//! assert_eq!(TileCompression::parse_str("br").unwrap(), TileCompression::Brotli);
//! assert_eq!(TileCompression::Gzip.extension(), ".gz");
//! ```

use anyhow::{Result, bail};
#[cfg(feature = "cli")]
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt::Display;

#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TileCompression {
	#[cfg_attr(feature = "cli", value(name = "none"))]
	#[serde(rename = "none", alias = "uncompressed", alias = "raw")]
	Uncompressed,
	#[default]
	Gzip,
	Brotli,
}

impl TileCompression {
	/// Name written to the `compression` metadata entry.
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			TileCompression::Uncompressed => "none",
			TileCompression::Gzip => "gzip",
			TileCompression::Brotli => "brotli",
		}
	}

	/// File suffix appended by the dump exporter when payloads are kept compressed.
	#[must_use]
	pub fn extension(&self) -> &'static str {
		match self {
			TileCompression::Uncompressed => "",
			TileCompression::Gzip => ".gz",
			TileCompression::Brotli => ".br",
		}
	}

	pub fn parse_str(value: &str) -> Result<Self> {
		Ok(match value.trim().to_lowercase().as_str() {
			"br" | "brotli" => TileCompression::Brotli,
			"gz" | "gzip" => TileCompression::Gzip,
			"none" | "raw" | "uncompressed" | "" => TileCompression::Uncompressed,
			other => bail!("unknown tile compression '{other}', expected brotli, gzip or none"),
		})
	}
}

impl Display for TileCompression {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("gzip", TileCompression::Gzip)]
	#[case(" GZ ", TileCompression::Gzip)]
	#[case("brotli", TileCompression::Brotli)]
	#[case("none", TileCompression::Uncompressed)]
	#[case("", TileCompression::Uncompressed)]
	fn parse(#[case] input: &str, #[case] expected: TileCompression) {
		assert_eq!(TileCompression::parse_str(input).unwrap(), expected);
	}

	#[test]
	fn parse_unknown() {
		let err = TileCompression::parse_str("zstd").unwrap_err();
		assert!(err.to_string().contains("'zstd'"));
	}

	#[test]
	fn names_and_extensions() {
		assert_eq!(TileCompression::default(), TileCompression::Gzip);
		assert_eq!(TileCompression::Uncompressed.to_string(), "none");
		assert_eq!(TileCompression::Brotli.extension(), ".br");
		assert_eq!(TileCompression::Uncompressed.extension(), "");
	}
}
