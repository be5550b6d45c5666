//! Stat directory
//!
//! The directory zsim writes its output to: the config it ran with, and the interval trace.

// Imports
use {
	crate::{
		config::Config,
		trace::{RawSnapshot, Trace},
	},
	anyhow::Context,
	std::{
		fs,
		io::{self, BufReader, Write},
		path::{Path, PathBuf},
	},
};

/// Config file
pub const CONFIG_FILE: &str = "out.cfg";

/// Trace file, as json
pub const TRACE_JSON_FILE: &str = "zsim-ev.json";

/// Trace file, as bincode
pub const TRACE_BIN_FILE: &str = "zsim-ev.bin";

/// Stat directory
#[derive(Clone, Debug)]
pub struct StatDir {
	/// Config
	pub config: Config,

	/// Trace
	pub trace: Trace,
}

impl StatDir {
	/// Opens a stat directory
	pub fn open(path: &Path) -> Result<Self, anyhow::Error> {
		let config_path = path.join(CONFIG_FILE);
		let config_text = fs::read_to_string(&config_path)
			.with_context(|| format!("Unable to read config file {config_path:?}"))?;
		let config = Config::from_cfg_text(&config_text).context("Unable to load config")?;

		let raw_snapshots = self::read_raw_snapshots(path)?;
		let trace = Trace::from_raw(&config, raw_snapshots).context("Unable to load trace")?;
		tracing::info!(?path, intervals = trace.intervals(), "Opened stat directory");

		Ok(Self { config, trace })
	}
}

/// Reads all raw snapshots of the trace in `path`.
///
/// Prefers the json trace if both exist.
fn read_raw_snapshots(path: &Path) -> Result<Vec<RawSnapshot>, anyhow::Error> {
	let json_path = path.join(TRACE_JSON_FILE);
	if let Some(file) = self::open_if_exists(&json_path)? {
		tracing::debug!(?json_path, "Reading json trace");
		let reader = BufReader::new(file);
		return serde_json::from_reader(reader).with_context(|| format!("Unable to parse trace file {json_path:?}"));
	}

	let bin_path = path.join(TRACE_BIN_FILE);
	let file = self::open_if_exists(&bin_path)?.with_context(|| {
		format!("Stat directory {path:?} has neither {TRACE_JSON_FILE:?} nor {TRACE_BIN_FILE:?}")
	})?;
	tracing::debug!(?bin_path, "Reading bincode trace");
	let mut reader = BufReader::new(file);
	bincode::decode_from_std_read(&mut reader, bincode::config::standard())
		.with_context(|| format!("Unable to parse trace file {bin_path:?}"))
}

/// Writes `raw_snapshots` as a bincode trace file into the stat directory at `path`
pub fn write_bin_trace(path: &Path, raw_snapshots: &[RawSnapshot]) -> Result<PathBuf, anyhow::Error> {
	let bin_path = path.join(TRACE_BIN_FILE);
	let file = fs::File::create(&bin_path).with_context(|| format!("Unable to create trace file {bin_path:?}"))?;
	let mut writer = io::BufWriter::new(file);
	bincode::encode_into_std_write(raw_snapshots, &mut writer, bincode::config::standard())
		.with_context(|| format!("Unable to write trace file {bin_path:?}"))?;
	writer.flush().context("Unable to flush trace file")?;

	Ok(bin_path)
}

/// Opens `path`, returning `None` if it doesn't exist
fn open_if_exists(path: &Path) -> Result<Option<fs::File>, anyhow::Error> {
	match fs::File::open(path) {
		Ok(file) => Ok(Some(file)),
		Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
		Err(err) => Err(err).with_context(|| format!("Unable to open {path:?}")),
	}
}
