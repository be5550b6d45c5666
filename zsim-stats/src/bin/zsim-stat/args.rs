//! Arguments

// Imports
use {std::path::PathBuf, zsim_stats::OpModes};

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
#[clap(after_help = zsim_stats::characteristic::USAGE)]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Stat directory
	pub stat_dir: PathBuf,

	/// Operation modes, comma separated, or `*` for all
	pub op_modes: OpModes,

	/// Characteristic
	pub characteristic: String,

	/// Cache, for cache characteristics
	pub cache: Option<String>,
}
