//! Cache simulator parameter sweeps (`cachesweep`)

// Modules
mod args;
mod config;

// Imports
use {
	self::{args::Args, config::Config},
	anyhow::Context,
	cachesweep::{Grid, ProcessInvoker, Sweep},
	cachesweep_util::logger,
	clap::Parser,
	std::{fs, io, path::Path, time::Duration},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Read the config file
	let mut config = match &args.config_file {
		Some(config_path) => {
			let config_file = fs::File::open(config_path).context("Unable to open config file")?;
			serde_json::from_reader::<_, Config>(io::BufReader::new(config_file))
				.context("Unable to parse config file")?
		},
		None => Config::default(),
	};

	// Then override it with any arguments
	if !args.trace_files.is_empty() {
		config.traces = args.trace_files;
	}
	if !args.simulator_args.is_empty() {
		config.simulator_args = args.simulator_args;
	}
	if let Some(simulator) = args.simulator {
		config.simulator = simulator;
	}
	if let Some(output) = args.output_file {
		config.output = output;
	}
	if let Some(timeout_secs) = args.timeout_secs {
		config.timeout_secs = Some(timeout_secs);
	}
	tracing::debug!(?config, "Configuration");

	let grid = Grid::new(config.traces, config.s_values, config.e_values, config.b_values)
		.context("Invalid parameter grid")?;
	let timeout = config
		.timeout_secs
		.map(Duration::try_from_secs_f64)
		.transpose()
		.context("Invalid timeout")?;
	let debug_output_period =
		Duration::try_from_secs_f64(config.debug_output_period_secs).context("Invalid debug output period")?;

	// Note: We write the results to a temporary file next to the output, which
	//       also checks we can write there before running the whole sweep.
	//       It only replaces the output once all results are written.
	let output_dir = match config.output.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};
	let mut output_file = tempfile::NamedTempFile::new_in(output_dir)
		.with_context(|| format!("Unable to create temporary output file in {output_dir:?}"))?;

	// Run the sweep
	let mut invoker = ProcessInvoker::new(config.simulator)
		.with_prefix_args(config.simulator_args)
		.with_timeout(timeout);
	let sweep = Sweep::new(grid, debug_output_period);
	tracing::info!(
		"Sweeping {} configurations with {:?}",
		sweep.grid().len(),
		invoker.program()
	);
	let output = sweep.run(&mut invoker);

	tracing::info!(
		"Recorded {} / {} configurations, {}",
		output.table.len(),
		sweep.grid().len(),
		output.skipped
	);
	for summary in output.table.trace_summaries() {
		tracing::info!(
			"{}: {} rows, hit rate {:.4} ± {:.4} ({:.4}..{:.4}), best at {}",
			summary.trace.display(),
			summary.rows,
			summary.mean_hit_rate,
			summary.hit_rate_error,
			summary.min_hit_rate,
			summary.max_hit_rate,
			summary.best.config
		);
	}

	// Finally write the results
	output
		.table
		.write_csv(io::BufWriter::new(output_file.as_file_mut()))
		.with_context(|| format!("Unable to write to temporary output file {:?}", output_file.path()))?;
	output_file
		.persist(&config.output)
		.with_context(|| format!("Unable to write output file {:?}", config.output))?;

	Ok(())
}
