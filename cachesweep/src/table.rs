//! Result table

// Imports
use {
	crate::{metrics::MetricRecord, sweep::Configuration},
	anyhow::Context,
	itertools::Itertools,
	std::{borrow::Cow, io, path::Path},
};

/// Header of the CSV output
pub const HEADER: [&str; 9] = [
	"trace",
	"s",
	"E",
	"b",
	"hits",
	"misses",
	"evictions",
	"hit_rate",
	"miss_rate",
];

/// Result table
///
/// Rows are kept in the order they were pushed.
#[derive(PartialEq, Clone, Default, Debug)]
pub struct ResultTable {
	/// Rows
	rows: Vec<Row>,
}

impl ResultTable {
	/// Creates a new, empty, table
	pub fn new() -> Self {
		Self { rows: vec![] }
	}

	/// Appends a row
	pub fn push(&mut self, config: Configuration, metrics: MetricRecord) {
		self.rows.push(Row { config, metrics });
	}

	/// Returns all rows
	pub fn rows(&self) -> &[Row] {
		&self.rows
	}

	/// Returns the number of rows
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	/// Returns if there are no rows
	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Writes this table as CSV to `writer`.
	///
	/// The header is always written, even if there are no rows.
	pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), anyhow::Error> {
		let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
		writer.write_record(HEADER).context("Unable to write header")?;
		for row in &self.rows {
			writer.serialize(CsvRow::new(row)).context("Unable to write row")?;
		}
		writer.flush().context("Unable to flush")?;

		Ok(())
	}

	/// Returns a summary of each trace.
	///
	/// Consecutive rows with the same trace are summarized together.
	pub fn trace_summaries(&self) -> Vec<TraceSummary<'_>> {
		self.rows
			.iter()
			.map(|row| (row.config.trace.as_path(), row))
			.group_by(|&(trace, _)| trace)
			.into_iter()
			.filter_map(|(trace, rows)| {
				let rows = rows.map(|(_, row)| row).collect::<Vec<_>>();
				let hit_rate = rows
					.iter()
					.map(|row| row.metrics.hit_rate())
					.collect::<average::Variance>();

				// Note: On ties, the first row is kept
				let best = rows
					.iter()
					.copied()
					.reduce(|best, row| match row.metrics.hit_rate() > best.metrics.hit_rate() {
						true => row,
						false => best,
					})?;
				let (min_hit_rate, max_hit_rate) = rows
					.iter()
					.map(|row| row.metrics.hit_rate())
					.minmax_by(f64::total_cmp)
					.into_option()?;

				Some(TraceSummary {
					trace,
					rows: rows.len(),
					mean_hit_rate: hit_rate.mean(),
					hit_rate_error: hit_rate.error(),
					min_hit_rate,
					max_hit_rate,
					best,
				})
			})
			.collect()
	}
}

/// Row
#[derive(PartialEq, Clone, Debug)]
pub struct Row {
	/// Configuration
	pub config: Configuration,

	/// Metrics
	pub metrics: MetricRecord,
}

/// Summary of all rows of a trace
#[derive(Clone, Debug)]
pub struct TraceSummary<'a> {
	/// Trace file
	pub trace: &'a Path,

	/// Number of rows
	pub rows: usize,

	/// Mean hit rate
	pub mean_hit_rate: f64,

	/// Standard error of the mean hit rate
	pub hit_rate_error: f64,

	/// Minimum hit rate
	pub min_hit_rate: f64,

	/// Maximum hit rate
	pub max_hit_rate: f64,

	/// Row with the highest hit rate
	pub best: &'a Row,
}

/// CSV row
#[derive(Debug)]
#[derive(serde::Serialize)]
struct CsvRow<'a> {
	trace:     Cow<'a, str>,
	s:         u32,
	#[serde(rename = "E")]
	e:         u32,
	b:         u32,
	hits:      u64,
	misses:    u64,
	evictions: u64,
	hit_rate:  f64,
	miss_rate: f64,
}

impl<'a> CsvRow<'a> {
	fn new(row: &'a Row) -> Self {
		Self {
			trace:     row.config.trace.to_string_lossy(),
			s:         row.config.s,
			e:         row.config.e,
			b:         row.config.b,
			hits:      row.metrics.hits(),
			misses:    row.metrics.misses(),
			evictions: row.metrics.evictions(),
			hit_rate:  row.metrics.hit_rate(),
			miss_rate: row.metrics.miss_rate(),
		}
	}
}
