#![allow(unused)]

use anyhow::Result;
use assert_cmd::{Command, cargo};
use rastervt_container::{ContainerMetadata, MBTilesWriter};
use rastervt_core::{Blob, TileCompression, TileCoord};
use std::{fmt::Write, fs, path::Path};

#[cfg(windows)]
pub const BINARY_NAME: &str = "rastervt.exe";
#[cfg(not(windows))]
pub const BINARY_NAME: &str = "rastervt";

/// Command for the rastervt binary.
pub fn rastervt_cmd() -> Command {
	Command::new(cargo::cargo_bin!("rastervt"))
}

/// Writes an ESRI ASCII grid with lower left corner `(0, 0)` and 1 unit cells.
pub fn write_ascii_grid(path: &Path, width: usize, height: usize, value: impl Fn(usize, usize) -> f64) -> Result<()> {
	let mut text = format!("ncols {width}\nnrows {height}\nxllcorner 0\nyllcorner 0\ncellsize 1\nNODATA_value -9999\n");
	for row in 0..height {
		let line: Vec<String> = (0..width).map(|col| value(col, row).to_string()).collect();
		writeln!(text, "{}", line.join(" "))?;
	}
	fs::write(path, text)?;
	Ok(())
}

/// Writes a container holding the given TMS tiles with their coordinates as payload.
pub fn write_container(path: &Path, coords: &[TileCoord]) -> Result<()> {
	let metadata = ContainerMetadata::new("fixture", TileCompression::Gzip, 0, 3);
	let mut writer = MBTilesWriter::create(path, &metadata)?;
	for coord in coords {
		writer.put(coord, Blob::from(coord.to_string().as_str()))?;
	}
	Ok(())
}
