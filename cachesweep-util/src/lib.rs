//! Utilities

// Modules
pub mod logger;

// Imports
use std::{cell::RefCell, fmt};

/// Extension trait for `str` to split off a leading label, such as `Hits:`
#[extend::ext(name = SplitLabel)]
pub impl str {
	/// Returns everything after `label`, if this line starts with it.
	///
	/// Surrounding whitespace of the line is ignored before matching.
	fn split_label(&self, label: &str) -> Option<&str> {
		self.trim().strip_prefix(label)
	}
}

/// [`fmt::Display`] helper to display using a `FnMut(&mut fmt::Formatter)`
pub struct DisplayWrapper<F: FnMut(&mut fmt::Formatter) -> fmt::Result>(RefCell<F>);

impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> DisplayWrapper<F> {
	/// Creates a new display wrapper
	#[must_use]
	pub const fn new(func: F) -> Self {
		Self(RefCell::new(func))
	}
}


impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> fmt::Display for DisplayWrapper<F> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		// Note: `f` cannot be re-entrant, so this cannot fail
		self.0.borrow_mut()(f)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn split_label_trims_line() {
		assert_eq!("  Hits: 10  ".split_label("Hits:"), Some(" 10"));
		assert_eq!("Hits:".split_label("Hits:"), Some(""));
		assert_eq!("Misses: 3".split_label("Hits:"), None);
		assert_eq!("Total Hits: 3".split_label("Hits:"), None);
	}

	#[test]
	fn display_wrapper_formats() {
		let value = 5;
		let wrapper = DisplayWrapper::new(|f| write!(f, "value={value}"));
		assert_eq!(wrapper.to_string(), "value=5");
		assert_eq!(format!("[{wrapper}]"), "[value=5]");
	}
}
