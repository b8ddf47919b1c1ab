//! Logger
//!
//! Logs to stderr, filtered by `RUST_LOG`, and optionally to a file,
//! filtered by `RUST_LOG_FILE`.

// Imports
use {
	std::{fs, io, path::Path, sync::Mutex},
	tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter},
};

/// Initializes the logger.
///
/// Any messages logged through [`pre_init`] are emitted afterwards.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	let term_layer = tracing_subscriber::fmt::layer()
		.with_writer(io::stderr)
		.with_filter(self::env_filter("RUST_LOG", LevelFilter::INFO));

	let file_layer = log_file
		.and_then(|path| {
			let file = fs::OpenOptions::new()
				.create(true)
				.write(true)
				.append(log_file_append)
				.truncate(!log_file_append)
				.open(path);

			match file {
				Ok(file) => Some(file),
				Err(err) => {
					pre_init::warn(format!("Unable to open log file {path:?}: {err}"));
					None
				},
			}
		})
		.map(|file| {
			tracing_subscriber::fmt::layer()
				.with_ansi(false)
				.with_writer(Mutex::new(file))
				.with_filter(self::env_filter("RUST_LOG_FILE", LevelFilter::DEBUG))
		});

	if let Err(err) = tracing_subscriber::registry()
		.with(term_layer)
		.with(file_layer)
		.try_init()
	{
		eprintln!("Unable to initialize logger: {err}");
	}

	pre_init::flush();
}

/// Creates an env filter from `var`, defaulting to `default`
fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
	EnvFilter::builder()
		.with_default_directive(default.into())
		.with_env_var(var)
		.from_env_lossy()
}

/// Logging before the logger is initialized
pub mod pre_init {
	// Imports
	use std::sync::Mutex;

	/// Level of a buffered message
	#[derive(Clone, Copy, Debug)]
	enum Level {
		Debug,
		Warn,
	}

	/// Messages buffered until the logger is initialized
	static MESSAGES: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

	/// Buffers a debug message
	pub fn debug(msg: impl Into<String>) {
		self::push(Level::Debug, msg.into());
	}

	/// Buffers a warning message
	pub fn warn(msg: impl Into<String>) {
		self::push(Level::Warn, msg.into());
	}

	fn push(level: Level, msg: String) {
		// Note: A poisoned lock only means another thread panicked mid-push
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		messages.push((level, msg));
	}

	/// Emits all buffered messages
	pub(super) fn flush() {
		let messages = std::mem::take(&mut *MESSAGES.lock().unwrap_or_else(|err| err.into_inner()));
		for (level, msg) in messages {
			match level {
				Level::Debug => tracing::debug!("{msg}"),
				Level::Warn => tracing::warn!("{msg}"),
			}
		}
	}
}
