//! Metric extraction
//!
//! Parses the simulator's textual report into a [`MetricRecord`].
//! The report contains, among other lines, the three counters:
//!
//! ```text
//! Hits: 10
//! Misses: 5
//! Evictions: 2
//! ```

// Imports
use {cachesweep_util::SplitLabel, std::fmt};

/// Metric record for a single configuration
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct MetricRecord {
	/// Hits
	hits: u64,

	/// Misses
	misses: u64,

	/// Evictions
	evictions: u64,

	/// Hit rate, `hits / (hits + misses)`
	hit_rate: f64,

	/// Miss rate, `misses / (hits + misses)`
	miss_rate: f64,
}

impl MetricRecord {
	/// Creates a metric record from its counters, deriving both rates.
	///
	/// If there were no accesses at all, both rates are `0.0`.
	pub fn new(hits: u64, misses: u64, evictions: u64) -> Self {
		let total = hits as f64 + misses as f64;
		let (hit_rate, miss_rate) = match total > 0.0 {
			true => (hits as f64 / total, misses as f64 / total),
			false => (0.0, 0.0),
		};

		Self {
			hits,
			misses,
			evictions,
			hit_rate,
			miss_rate,
		}
	}

	/// Returns the hits
	pub fn hits(&self) -> u64 {
		self.hits
	}

	/// Returns the misses
	pub fn misses(&self) -> u64 {
		self.misses
	}

	/// Returns the evictions
	pub fn evictions(&self) -> u64 {
		self.evictions
	}

	/// Returns the hit rate
	pub fn hit_rate(&self) -> f64 {
		self.hit_rate
	}

	/// Returns the miss rate
	pub fn miss_rate(&self) -> f64 {
		self.miss_rate
	}
}

/// Counter label
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Label {
	Hits,
	Misses,
	Evictions,
}

impl Label {
	/// All labels
	pub const ALL: [Self; 3] = [Self::Hits, Self::Misses, Self::Evictions];

	/// Returns the literal prefix of this label in the report
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Hits => "Hits:",
			Self::Misses => "Misses:",
			Self::Evictions => "Evictions:",
		}
	}
}

impl fmt::Display for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Extraction error
#[derive(PartialEq, Eq, Clone, Debug, thiserror::Error)]
pub enum ExtractError {
	/// A counter line was never reported
	#[error("Missing `{label}` line")]
	MissingLabel { label: Label },

	/// A counter line had a value that isn't a non-negative integer
	#[error("Invalid value for `{label}`: {value:?}")]
	InvalidValue { label: Label, value: String },
}

/// Extracts the metrics from a simulator report.
///
/// Lines are scanned in order, and if a label appears more than once, the
/// last occurrence wins. Any line starting with a label must have the value
/// separated from it by whitespace, or the whole extraction fails.
pub fn extract(output: &str) -> Result<MetricRecord, ExtractError> {
	let mut values = [None; 3];
	for line in output.lines() {
		for (label, value) in Label::ALL.into_iter().zip(&mut values) {
			let Some(rest) = line.split_label(label.as_str()) else {
				continue;
			};

			*value = Some(self::parse_value(label, rest)?);
			break;
		}
	}

	let [hits, misses, evictions] = values;
	let missing = |label| ExtractError::MissingLabel { label };
	Ok(MetricRecord::new(
		hits.ok_or_else(|| missing(Label::Hits))?,
		misses.ok_or_else(|| missing(Label::Misses))?,
		evictions.ok_or_else(|| missing(Label::Evictions))?,
	))
}

/// Parses the value following `label`, given everything after it on the line
fn parse_value(label: Label, rest: &str) -> Result<u64, ExtractError> {
	let invalid = |value: &str| ExtractError::InvalidValue {
		label,
		value: value.to_owned(),
	};

	// Note: `Hits:10` is rejected, the value must be separated from the label.
	if !rest.starts_with(char::is_whitespace) {
		return Err(invalid(rest));
	}

	let value = rest.split_whitespace().next().unwrap_or_default();
	value.parse().map_err(|_| invalid(value))
}
