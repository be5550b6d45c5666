//! Logger

// Imports
use {
	std::{fs, io, path::Path, sync::Mutex},
	tracing::metadata::LevelFilter,
	tracing_subscriber::{fmt, prelude::*, EnvFilter},
};

/// Initializes the logger.
///
/// Logs to stderr, filtered by `RUST_LOG` (`info` by default).
/// If `log_file` is given, also logs to it, filtered by `RUST_LOG_FILE` (`debug` by default).
///
/// Any messages queued through [`pre_init`] are emitted right after.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	// Create the terminal layer
	let term_layer = fmt::layer()
		.with_writer(io::stderr)
		.with_filter(self::env_filter("RUST_LOG", LevelFilter::INFO));

	// Then the file layer, if we have a file
	let mut log_file_err = None;
	let file_layer = match log_file.map(|log_file| self::open_log_file(log_file, log_file_append)) {
		Some(Ok(file)) => Some(
			fmt::layer()
				.with_ansi(false)
				.with_writer(Mutex::new(file))
				.with_filter(self::env_filter("RUST_LOG_FILE", LevelFilter::DEBUG)),
		),
		Some(Err(err)) => {
			log_file_err = Some(err);
			None
		},
		None => None,
	};

	// Note: This only fails if a global subscriber was already set, in which case we keep it.
	if let Err(err) = tracing_subscriber::registry()
		.with(term_layer)
		.with(file_layer)
		.try_init()
	{
		eprintln!("Unable to initialize logger: {err}");
	}

	if let Some(err) = log_file_err {
		tracing::warn!(?log_file, %err, "Unable to open log file, logging only to stderr");
	}

	pre_init::flush();
}

/// Opens the log file, either appending or truncating it
fn open_log_file(path: &Path, append: bool) -> Result<fs::File, io::Error> {
	fs::OpenOptions::new()
		.create(true)
		.write(true)
		.append(append)
		.truncate(!append)
		.open(path)
}

/// Creates an env filter from `var`, using `default` when it's unset
fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
	EnvFilter::builder()
		.with_default_directive(default.into())
		.with_env_var(var)
		.from_env_lossy()
}

/// Logging before the logger is initialized.
///
/// Messages are queued and emitted once [`init`](super::init) is called.
pub mod pre_init {
	// Imports
	use std::sync::{Mutex, PoisonError};

	/// Queued messages
	static MESSAGES: Mutex<Vec<String>> = Mutex::new(Vec::new());

	/// Queues a debug message
	pub fn debug(message: impl Into<String>) {
		MESSAGES
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(message.into());
	}

	/// Emits all queued messages
	pub(super) fn flush() {
		let messages = std::mem::take(&mut *MESSAGES.lock().unwrap_or_else(PoisonError::into_inner));
		for message in messages {
			tracing::debug!("{message}");
		}
	}
}
