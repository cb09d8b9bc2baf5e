use anyhow::Result;
use rastervt_container::{
	MBTilesReader,
	export::{DumpOptions, dump},
};
use rastervt_core::ConcurrencyLimits;
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// MBTiles file to read
	#[arg()]
	input_container: PathBuf,

	/// directory receiving the {z}/{x}/{y} files
	#[arg()]
	output_directory: PathBuf,

	/// name files by XYZ rows (row 0 in the north) instead of the stored TMS rows
	#[arg(long)]
	xyz: bool,

	/// file extension appended to every tile, e.g. "pbf"
	#[arg(long, value_name = "EXT")]
	extension: Option<String>,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!(
		"dump {:?} into {:?}",
		arguments.input_container, arguments.output_directory
	);

	let reader = MBTilesReader::open(&arguments.input_container)?;
	let options = DumpOptions {
		xyz: arguments.xyz,
		extension: arguments.extension.clone(),
		concurrency: ConcurrencyLimits::default().io_bound,
	};
	let report = dump(&reader, &arguments.output_directory, &options).await?;

	eprintln!("finished: {} tiles written, {} skipped", report.written, report.skipped);
	Ok(())
}
