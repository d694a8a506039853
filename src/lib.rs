/*!
# Brozli.

This library is the backward-reference selection core of a Brotli-style
compressor: given a window of input bytes and an external matcher's
candidate `(distance, length)` pairs, it chooses the sequence of literal
runs and copy commands that minimizes an approximate output-bit cost.

The interesting part lives in [`squeeze`]: a Zopfli-style shortest-path
optimizer over stream positions, used by the two highest quality tiers. At
quality ten it runs once under a pessimistic literal-cost model; at quality
eleven it runs twice, re-pricing every symbol from the first pass's own
command histogram. Lower qualities take a plain greedy walk instead.

Entropy coding, stream framing, and bit output all happen downstream; this
crate's job ends at a deterministic list of
`(insert_length, copy_length, length_code, distance_code)` commands.
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod command;
mod cost;
mod error;
mod greedy;
mod matcher;
mod nodes;
mod queue;
mod squeeze;
mod symbols;

pub use command::{
	BlockState,
	Command,
	DistanceCache,
};
pub use error::BrozliError;
pub use matcher::{
	BackwardMatch,
	BruteForceMatcher,
	Matcher,
	MAX_NUM_MATCHES,
};
pub use nodes::{
	alloc_nodes,
	PathNode,
};
pub use squeeze::{
	compute_shortest_path,
	create_commands,
};



/// # Window Gap.
///
/// The window never quite reaches a full power of two; the last few bytes
/// are reserved so the ring buffer's write-ahead never aliases live data.
const WINDOW_GAP: usize = 16;



#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
/// # Compression Quality.
///
/// Zero through eleven. Ten and eleven route through the shortest-path
/// optimizer (eleven twice over); everything below takes the greedy path.
pub struct Quality(u8);

impl Quality {
	/// # New.
	///
	/// Values above eleven clamp down to it.
	pub const fn new(quality: u8) -> Self {
		Self(if quality > 11 { 11 } else { quality })
	}

	/// # Optimizing Tier?
	pub const fn is_zopfli(self) -> bool { self.0 > 9 }

	/// # Two-Pass Tier?
	pub const fn is_two_pass(self) -> bool { self.0 > 10 }

	/// # Maximum Distinct-Distance Copy Length.
	///
	/// Copies longer than this are tried only at their full length; walking
	/// every prefix of a huge match costs far more time than it ever earns
	/// in ratio.
	pub(crate) const fn max_zopfli_len(self) -> usize {
		if self.0 <= 10 { 150 }
		else { 325 }
	}

	/// # Relaxation Fan-In.
	///
	/// How many queued start positions each position fans out from.
	pub(crate) const fn max_iters(self) -> usize {
		if self.0 <= 10 { 1 }
		else { 5 }
	}

	/// # Derived Short Codes Allowed?
	///
	/// The cache-derived distance codes (four and up) only pay off once the
	/// quality budget covers the search for them.
	pub(crate) const fn extended_short_codes(self) -> bool { self.0 > 3 }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Encoder Parameters.
///
/// The knobs the reference selector cares about, threaded by value through
/// the call tree.
pub struct EncodeParams {
	/// # Quality.
	pub quality: Quality,

	/// # Window Bits.
	pub lgwin: u32,

	/// # Allow Last-Distance Reuse.
	///
	/// When unset the greedy path always emits raw distance codes. (The
	/// optimizing tiers bake reuse into their edge set regardless; this
	/// knob exists for harnesses that need distance codes to be
	/// self-contained.)
	pub reuse_distances: bool,
}

impl EncodeParams {
	/// # New.
	pub const fn new(quality: Quality, lgwin: u32) -> Self {
		Self {
			quality,
			lgwin,
			reuse_distances: true,
		}
	}

	/// # Maximum Backward Distance.
	pub(crate) const fn max_backward(&self) -> usize {
		(1_usize << self.lgwin) - WINDOW_GAP
	}
}



/// # Create Backward References.
///
/// The umbrella entry: pick the pipeline for `params.quality`, run it over
/// the block `[position, position + num_bytes)`, and append the chosen
/// commands. Returns the number of commands appended.
///
/// The caller owns the ring buffer, the matcher, and the rolling
/// [`BlockState`]; all three must describe the same stream. Trailing
/// literals never produce a command; they accumulate in
/// `state.last_insert_len` for the next block to fold in.
///
/// ## Errors
///
/// Fails closed if a working buffer cannot be allocated; no commands are
/// appended in that case.
pub fn create_backward_references<M: Matcher>(
	params: EncodeParams,
	num_bytes: usize,
	position: usize,
	ring: &[u8],
	mask: usize,
	matcher: &mut M,
	state: &mut BlockState,
	commands: &mut Vec<Command>,
) -> Result<usize, BrozliError> {
	if params.quality.is_two_pass() {
		squeeze::hq_zopfli_block(
			params, num_bytes, position, ring, mask, matcher, state, commands,
		)
	}
	else if params.quality.is_zopfli() {
		squeeze::zopfli_block(
			params, num_bytes, position, ring, mask, matcher, state, commands,
		)
	}
	else {
		greedy::greedy_block(
			params, num_bytes, position, ring, mask, matcher, state, commands,
		)
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_quality_tiers() {
		assert!(!Quality::new(9).is_zopfli());
		assert!(Quality::new(10).is_zopfli());
		assert!(!Quality::new(10).is_two_pass());
		assert!(Quality::new(11).is_two_pass());
		assert_eq!(Quality::new(200), Quality::new(11));

		assert_eq!(Quality::new(10).max_zopfli_len(), 150);
		assert_eq!(Quality::new(11).max_zopfli_len(), 325);
		assert_eq!(Quality::new(10).max_iters(), 1);
		assert_eq!(Quality::new(11).max_iters(), 5);
	}

	#[test]
	fn t_max_backward() {
		let params = EncodeParams::new(Quality::new(10), 18);
		assert_eq!(params.max_backward(), (1 << 18) - 16);
	}
}
