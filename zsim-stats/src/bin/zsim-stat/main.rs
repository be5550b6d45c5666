//! Retrieves a single characteristic from a zsim stat directory

// Modules
mod args;

// Imports
use {
	self::args::Args,
	anyhow::Context,
	clap::Parser,
	std::process::ExitCode,
	zsim_stats::{characteristic::USAGE, Aggregator, Characteristic, Error, StatDir},
	zsim_stats_util::logger,
};

fn main() -> Result<ExitCode, anyhow::Error> {
	// Get arguments
	let args = match Args::try_parse() {
		Ok(args) => args,
		Err(err) => match err.use_stderr() {
			// Note: Usage errors go to stdout, along with the characteristics.
			true => {
				println!("{}", err.render());
				return Ok(ExitCode::FAILURE);
			},
			false => err.exit(),
		},
	};
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Validate the characteristic before touching the stat directory
	let characteristic = match self::validate(&args) {
		Ok(characteristic) => characteristic,
		Err(err) => {
			println!("{err}");
			println!("{USAGE}");
			return Ok(ExitCode::FAILURE);
		},
	};

	let stat_dir = StatDir::open(&args.stat_dir).context("Unable to open stat directory")?;
	let aggregator = Aggregator::new(&stat_dir.config, &stat_dir.trace, &args.op_modes);
	let value = characteristic
		.evaluate(&aggregator, args.cache.as_deref())
		.with_context(|| format!("Unable to compute characteristic {characteristic}"))?;
	println!("{value}");

	Ok(ExitCode::SUCCESS)
}

/// Parses the requested characteristic, checking it has every argument it needs
fn validate(args: &Args) -> Result<Characteristic, Error> {
	let characteristic = args.characteristic.parse::<Characteristic>()?;
	match characteristic.needs_cache() && args.cache.is_none() {
		true => Err(Error::MissingArgument {
			characteristic: characteristic.to_string(),
			argument:       "cache name",
		}),
		false => Ok(characteristic),
	}
}
