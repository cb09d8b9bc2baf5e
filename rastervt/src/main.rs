mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<WarnLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Vectorize a raster into an MBTiles container of vector tiles
	Tile(tools::tile::Subcommand),

	/// Write every tile of a container into a z/x/y directory tree
	Dump(tools::dump::Subcommand),

	/// Concatenate all tiles of a container into one file plus a JSON index
	Clump(tools::clump::Subcommand),
}

fn main() {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	if let Err(err) = run(&cli) {
		eprintln!("Error: {err}");
		for cause in err.chain().skip(1) {
			eprintln!("  caused by: {cause}");
		}
		std::process::exit(1);
	}
}

fn run(cli: &Cli) -> Result<()> {
	match &cli.command {
		Commands::Tile(arguments) => tools::tile::run(arguments),
		Commands::Dump(arguments) => tools::dump::run(arguments),
		Commands::Clump(arguments) => tools::clump::run(arguments),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	pub fn run_command(arg_vec: Vec<&str>) -> Result<String> {
		let cli = Cli::try_parse_from(arg_vec)?;
		let msg = format!("{cli:?}");
		run(&cli)?;
		Ok(msg)
	}

	#[test]
	fn help() {
		let err = run_command(vec!["rastervt"]).unwrap_err().to_string();
		assert!(err.contains("Usage: rastervt [OPTIONS] <COMMAND>"));
	}

	#[test]
	fn version() {
		let err = run_command(vec!["rastervt", "-V"]).unwrap_err().to_string();
		assert!(err.starts_with("rastervt "));
	}

	#[test]
	fn subcommands_describe_themselves() {
		for (name, about) in [
			("tile", "Vectorize a raster"),
			("dump", "Write every tile"),
			("clump", "Concatenate all tiles"),
		] {
			let err = run_command(vec!["rastervt", name]).unwrap_err().to_string();
			assert!(err.starts_with(about), "{name}: {err}");
		}
	}
}
