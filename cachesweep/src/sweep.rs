//! Sweep driver

// Imports
use {
	crate::{
		invoker::{Invoker, RunError},
		metrics::{self, ExtractError, MetricRecord},
		table::ResultTable,
	},
	cachesweep_util::DisplayWrapper,
	itertools::iproduct,
	std::{
		ffi::OsString,
		fmt,
		path::PathBuf,
		time::{Duration, Instant},
	},
};

/// Configuration
///
/// A single point of the parameter grid.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Configuration {
	/// Trace file
	pub trace: PathBuf,

	/// Set index bits
	pub s: u32,

	/// Lines per set
	pub e: u32,

	/// Block offset bits
	pub b: u32,
}

impl Configuration {
	/// Returns the simulator arguments for this configuration
	pub fn args(&self) -> [OsString; 8] {
		[
			"-s".into(),
			self.s.to_string().into(),
			"-E".into(),
			self.e.to_string().into(),
			"-b".into(),
			self.b.to_string().into(),
			"-t".into(),
			self.trace.clone().into_os_string(),
		]
	}
}

impl fmt::Display for Configuration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} (s={}, E={}, b={})", self.trace.display(), self.s, self.e, self.b)
	}
}

/// Parameter grid
#[derive(Clone, Debug)]
pub struct Grid {
	/// Trace files
	traces: Vec<PathBuf>,

	/// Set index bits
	s_values: Vec<u32>,

	/// Lines per set
	e_values: Vec<u32>,

	/// Block offset bits
	b_values: Vec<u32>,
}

impl Grid {
	/// Creates a new grid.
	///
	/// # Errors
	/// Returns an error if any axis contains a value of `0`.
	pub fn new(
		traces: Vec<PathBuf>,
		s_values: Vec<u32>,
		e_values: Vec<u32>,
		b_values: Vec<u32>,
	) -> Result<Self, anyhow::Error> {
		for (name, values) in [("s", &s_values), ("E", &e_values), ("b", &b_values)] {
			anyhow::ensure!(
				values.iter().all(|&value| value >= 1),
				"All `{name}` values must be at least 1, found {values:?}"
			);
		}

		Ok(Self {
			traces,
			s_values,
			e_values,
			b_values,
		})
	}

	/// Returns the number of configurations in this grid
	pub fn len(&self) -> usize {
		self.traces.len() * self.s_values.len() * self.e_values.len() * self.b_values.len()
	}

	/// Returns if this grid has no configurations
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the trace files
	pub fn traces(&self) -> &[PathBuf] {
		&self.traces
	}

	/// Returns all configurations.
	///
	/// The trace is the outermost axis, followed by `s`, then `E` and
	/// finally `b`. Each axis is visited in the order it was given.
	pub fn configurations(&self) -> impl Iterator<Item = Configuration> + '_ {
		iproduct!(&self.traces, &self.s_values, &self.e_values, &self.b_values).map(|(trace, &s, &e, &b)| {
			Configuration {
				trace: trace.clone(),
				s,
				e,
				b,
			}
		})
	}
}

/// Outcome of a single configuration
#[derive(Debug)]
pub enum Outcome {
	/// Metrics were recorded into the table
	Recorded(MetricRecord),

	/// Simulator failed
	RunFailed(RunError),

	/// Simulator output had no valid metrics
	ParseFailed(ExtractError),
}

/// Counts of skipped configurations
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct SkipCounts {
	/// Simulator failed, except by timing out
	pub run_failed: usize,

	/// Simulator timed out
	pub timed_out: usize,

	/// Simulator output had no valid metrics
	pub parse_failed: usize,
}

impl SkipCounts {
	/// Returns the total skipped configurations
	pub fn total(&self) -> usize {
		self.run_failed + self.timed_out + self.parse_failed
	}

	/// Counts `outcome`, if it was skipped
	fn count(&mut self, outcome: &Outcome) {
		match outcome {
			Outcome::Recorded(_) => (),
			Outcome::RunFailed(RunError::TimedOut { .. }) => self.timed_out += 1,
			Outcome::RunFailed(_) => self.run_failed += 1,
			Outcome::ParseFailed(_) => self.parse_failed += 1,
		}
	}
}

impl fmt::Display for SkipCounts {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} skipped ({} run failures, {} timeouts, {} parse failures)",
			self.total(),
			self.run_failed,
			self.timed_out,
			self.parse_failed
		)
	}
}

/// Sweep
#[derive(Debug)]
pub struct Sweep {
	/// Grid
	grid: Grid,

	/// Debug output period
	///
	/// Interval in which to output progress
	debug_output_period: Duration,
}

impl Sweep {
	/// Creates a new sweep
	pub fn new(grid: Grid, debug_output_period: Duration) -> Self {
		Self {
			grid,
			debug_output_period,
		}
	}

	/// Returns the grid
	pub fn grid(&self) -> &Grid {
		&self.grid
	}

	/// Runs the sweep over every configuration with `invoker`
	pub fn run<I: Invoker>(&self, invoker: &mut I) -> SweepOutput {
		self.run_with(invoker, |_, _| ())
	}

	/// Runs the sweep over every configuration with `invoker`, calling
	/// `on_outcome` after each configuration.
	///
	/// Failed configurations are skipped, never retried, and never stop the sweep.
	pub fn run_with<I: Invoker>(
		&self,
		invoker: &mut I,
		mut on_outcome: impl FnMut(&Configuration, &Outcome),
	) -> SweepOutput {
		// Note: We start with no debug time so that we output right away at the start
		let mut last_debug_time = None::<Instant>;

		let total_configs = self.grid.len();
		let mut table = ResultTable::new();
		let mut skipped = SkipCounts::default();
		for (config_idx, config) in self.grid.configurations().enumerate() {
			let outcome = match invoker.invoke(&config) {
				Ok(output) => match metrics::extract(&output) {
					Ok(metrics) => Outcome::Recorded(metrics),
					Err(err) => {
						tracing::trace!(%config, ?output, "Simulator output");
						Outcome::ParseFailed(err)
					},
				},
				Err(err) => {
					if let Some(output) = err.output() {
						tracing::trace!(%config, ?output, "Simulator output");
					}
					Outcome::RunFailed(err)
				},
			};

			match &outcome {
				Outcome::Recorded(metrics) => table.push(config.clone(), *metrics),
				Outcome::RunFailed(err) => {
					tracing::debug!(%config, err = %DisplayErrorChain(err), "Skipping configuration")
				},
				Outcome::ParseFailed(err) => tracing::debug!(%config, %err, "Skipping configuration"),
			}
			skipped.count(&outcome);
			on_outcome(&config, &outcome);

			// Then show progress, if it's been long enough
			let cur_time = Instant::now();
			if last_debug_time.map_or(true, |last| cur_time.duration_since(last) >= self.debug_output_period) {
				let configs_processed_percentage = 100.0 * ((config_idx + 1) as f64 / total_configs as f64);
				tracing::info!(
					"[{configs_processed_percentage:.2}%] {}",
					DisplayWrapper::new(|f| write!(f, "{} recorded, {skipped}", table.len()))
				);
				last_debug_time = Some(cur_time);
			}
		}

		SweepOutput { table, skipped }
	}
}

/// Output for [`Sweep::run`]
#[derive(Clone, Debug)]
pub struct SweepOutput {
	/// Recorded configurations
	pub table: ResultTable,

	/// Skipped configurations
	pub skipped: SkipCounts,
}

/// Displays an error along with all of its sources
struct DisplayErrorChain<'a>(&'a dyn std::error::Error);

impl fmt::Display for DisplayErrorChain<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)?;

		let mut source = self.0.source();
		while let Some(err) = source {
			write!(f, ": {err}")?;
			source = err.source();
		}

		Ok(())
	}
}
