//! Arguments

// Imports
use std::path::PathBuf;

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
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

	/// Trace files
	///
	/// Overrides the traces in the config file.
	pub trace_files: Vec<PathBuf>,

	/// Config file
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,

	/// Simulator
	#[clap(long = "simulator")]
	pub simulator: Option<PathBuf>,

	/// Arguments to pass to the simulator before the configuration's.
	///
	/// Overrides the simulator arguments in the config file.
	#[clap(long = "simulator-arg", allow_hyphen_values = true)]
	pub simulator_args: Vec<String>,

	/// Output file
	#[clap(short = 'o', long = "output")]
	pub output_file: Option<PathBuf>,

	/// Timeout for each simulator run, in seconds
	#[clap(long = "timeout")]
	pub timeout_secs: Option<f64>,
}
