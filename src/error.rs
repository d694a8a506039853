/*!
# Brozli: Errors.
*/

use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Brozli Error.
///
/// This struct covers the two ways a block can fail: an allocation for one of
/// the per-block buffers falling through, or a logical failing (bug) in the
/// reference-selection machinery. Neither produces partial output; the caller
/// simply drops the block's command stream and moves on.
///
/// When compiled with `debug-assertions = true`, an error will panic with the
/// offending source file and line number details to aid investigation.
///
/// The macro `brozli_error!` is used internally to populate the appropriate
/// details or not.
pub struct BrozliError {
	#[cfg(debug_assertions)] file: &'static str,
	#[cfg(debug_assertions)] line: u32,
}

impl BrozliError {
	#[cfg(debug_assertions)]
	/// # New Error.
	pub(crate) const fn new(file: &'static str, line: u32) -> Self {
		Self { file, line }
	}
}

impl fmt::Display for BrozliError {
	#[cfg(debug_assertions)]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!(
			"Brozli BUG!!! Sanity check failed at {}:{}",
			self.file,
			self.line,
		))
	}

	#[cfg(not(debug_assertions))]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("brozli bug")
	}
}

impl std::error::Error for BrozliError {}



#[cfg(debug_assertions)]
/// # Error Macro.
///
/// Initialize a new error with the appropriate environmental argument(s)
/// according to `debug-assertions`.
macro_rules! brozli_error {
	() => (crate::error::BrozliError::new(file!(), line!()));
}

#[cfg(not(debug_assertions))]
/// # Error Macro.
///
/// Initialize a new error with the appropriate environmental argument(s)
/// according to `debug-assertions`.
macro_rules! brozli_error {
	() => (crate::error::BrozliError {});
}

/// # Expose it to the rest of the crate.
pub(crate) use brozli_error;
