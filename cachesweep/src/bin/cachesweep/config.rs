//! Configuration

// Imports
use std::path::PathBuf;

/// Configuration
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Simulator
	pub simulator: PathBuf,

	/// Arguments to pass to the simulator before the configuration's
	pub simulator_args: Vec<String>,

	/// Trace files
	pub traces: Vec<PathBuf>,

	/// Set index bits
	pub s_values: Vec<u32>,

	/// Lines per set
	#[serde(rename = "E_values")]
	pub e_values: Vec<u32>,

	/// Block offset bits
	pub b_values: Vec<u32>,

	/// Output file
	pub output: PathBuf,

	/// Timeout for each simulator run (in seconds)
	pub timeout_secs: Option<f64>,

	/// Debug output period (in seconds)
	pub debug_output_period_secs: f64,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			simulator:                "./cache_simulator".into(),
			simulator_args:           vec![],
			traces:                   vec!["traces/long.trace".into(), "traces/short.trace".into()],
			s_values:                 (1..=8).collect(),
			e_values:                 (1..=8).collect(),
			b_values:                 (2..=6).collect(),
			output:                   "results.csv".into(),
			timeout_secs:             None,
			debug_output_period_secs: 1.0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_config() {
		let config = serde_json::from_str::<Config>(r#"{ "E_values": [1, 2], "timeout_secs": 2.5 }"#)
			.expect("Unable to parse config");
		assert_eq!(config.e_values, [1, 2]);
		assert_eq!(config.timeout_secs, Some(2.5));
		assert_eq!(config.s_values, (1..=8).collect::<Vec<_>>());
		assert_eq!(config.b_values, [2, 3, 4, 5, 6]);
		assert_eq!(config.output, PathBuf::from("results.csv"));
	}

	#[test]
	fn unknown_fields_are_rejected() {
		assert!(serde_json::from_str::<Config>(r#"{ "e_values": [3] }"#).is_err());
	}
}
