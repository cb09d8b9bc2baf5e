use anyhow::Result;
use rastervt_container::{MBTilesReader, export::clump};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// MBTiles file to read
	#[arg()]
	input_container: PathBuf,

	/// file receiving the concatenated tile payloads
	#[arg()]
	output_clump: PathBuf,

	/// JSON file receiving the byte range of every tile
	#[arg()]
	output_index: PathBuf,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let reader = MBTilesReader::open(&arguments.input_container)?;
	let report = clump(&reader, &arguments.output_clump, &arguments.output_index)?;
	eprintln!("finished: {} tiles, {} bytes", report.tiles, report.bytes);
	Ok(())
}
