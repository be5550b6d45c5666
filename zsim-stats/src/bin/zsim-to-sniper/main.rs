//! Converts a zsim stat directory into sniper results

// Modules
mod args;

// Imports
use {
	self::args::Args,
	anyhow::Context,
	clap::Parser,
	std::{fs, io},
	zsim_stats::{sniper, Aggregator, StatDir},
	zsim_stats_util::logger,
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Convert
	let stat_dir = StatDir::open(&args.stat_dir).context("Unable to open stat directory")?;
	let aggregator = Aggregator::new(&stat_dir.config, &stat_dir.trace, &args.op_modes);
	let results = sniper::convert(&aggregator).context("Unable to convert to sniper results")?;

	// And write the results
	let output: Box<dyn io::Write> = match &args.output_file {
		Some(output_path) => Box::new(fs::File::create(output_path).context("Unable to create output file")?),
		None => Box::new(io::stdout().lock()),
	};
	let mut output = io::BufWriter::new(output);
	let res = match args.pretty {
		true => serde_json::to_writer_pretty(&mut output, &results),
		false => serde_json::to_writer(&mut output, &results),
	};
	res.context("Unable to write results")?;
	io::Write::flush(&mut output).context("Unable to flush results")?;

	Ok(())
}
