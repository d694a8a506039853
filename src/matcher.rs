/*!
# Brozli: Matchers.

The reference selector does not find matches itself; an external matcher
feeds it candidates. This module defines that boundary as a capability
trait, the match record the boundary speaks, and a small brute-force
matcher that satisfies the contract for tests and benches.
*/



/// # Candidate List Bound.
///
/// The most matches a conforming matcher reports for one position.
pub const MAX_NUM_MATCHES: usize = 128;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Candidate Match.
///
/// A `(distance, length)` pair reported by the matcher. Dictionary matches
/// point beyond the window and carry a synthetic length code distinct from
/// the actual copy length.
pub struct BackwardMatch {
	/// # Backward Distance.
	distance: u32,

	/// # Match Length.
	length: u32,

	/// # Length Code.
	length_code: u32,
}

impl BackwardMatch {
	#[expect(clippy::cast_possible_truncation, reason = "Window-bounded.")]
	/// # New.
	pub const fn new(distance: usize, length: usize) -> Self {
		Self {
			distance: distance as u32,
			length: length as u32,
			length_code: length as u32,
		}
	}

	#[expect(clippy::cast_possible_truncation, reason = "Window-bounded.")]
	/// # New Dictionary Match.
	pub const fn dictionary(
		distance: usize,
		length: usize,
		length_code: usize,
	) -> Self {
		Self {
			distance: distance as u32,
			length: length as u32,
			length_code: length_code as u32,
		}
	}

	/// # Backward Distance.
	pub const fn distance(&self) -> usize { self.distance as usize }

	/// # Match Length.
	pub const fn length(&self) -> usize { self.length as usize }

	/// # Length Code.
	pub const fn length_code(&self) -> usize { self.length_code as usize }
}



/// # Match Finder.
///
/// The capability set the reference selector needs from a matcher: report
/// every useful candidate at a position, and accept notice of positions
/// consumed by copy tails so its internal index stays coherent.
pub trait Matcher {
	/// # Bytes Hashed Per Position.
	///
	/// The selector stops querying once fewer than this many bytes remain.
	const HASH_TYPE_LENGTH: usize;

	/// # Store Lookahead.
	///
	/// Positions closer than this to the block end are not worth storing.
	const STORE_LOOKAHEAD: usize;

	/// # Find All Matches.
	///
	/// Clear `out` and fill it with the candidates at `pos`, sorted by
	/// strictly increasing length; among non-dictionary entries, distances
	/// must be non-decreasing within a shared length bucket. Entries whose
	/// distance exceeds `max_distance` are dictionary matches. Lengths must
	/// not exceed `max_length`. The call may index `pos` as a side effect.
	fn find_all_matches(
		&mut self,
		ring: &[u8],
		mask: usize,
		pos: usize,
		max_length: usize,
		max_distance: usize,
		out: &mut Vec<BackwardMatch>,
	);

	/// # Find the Longest Match.
	///
	/// Return the single best candidate at `pos`. By default that is the
	/// last (longest) entry [`Matcher::find_all_matches`] reports, with
	/// ties already settled in favor of the nearest by the sort contract;
	/// `scratch` is the reusable buffer for that underlying list. Matchers
	/// with a cheaper native longest-match search can override this.
	fn find_longest_match(
		&mut self,
		ring: &[u8],
		mask: usize,
		pos: usize,
		max_length: usize,
		max_distance: usize,
		scratch: &mut Vec<BackwardMatch>,
	) -> Option<BackwardMatch> {
		self.find_all_matches(ring, mask, pos, max_length, max_distance, scratch);
		scratch.last().copied()
	}

	/// # Store One Position.
	fn store(&mut self, ring: &[u8], mask: usize, pos: usize);

	/// # Store a Range.
	///
	/// Index `lo..hi`, typically the tail of a long copy the selector has
	/// decided to skip over.
	fn store_range(&mut self, ring: &[u8], mask: usize, lo: usize, hi: usize) {
		for pos in lo..hi { self.store(ring, mask, pos); }
	}
}



#[derive(Debug, Clone, Copy, Default)]
/// # Brute-Force Matcher.
///
/// A window-scanning matcher with no index at all: every distance is tried
/// in order and a candidate is kept whenever it beats the best length so
/// far. The output therefore has strictly increasing lengths with the
/// smallest distance first for each length, which is exactly the contract.
///
/// Quadratic and proud of it; this exists to drive tests and benches, not
/// production streams.
pub struct BruteForceMatcher;

impl BruteForceMatcher {
	/// # New.
	pub const fn new() -> Self { Self }
}

impl Matcher for BruteForceMatcher {
	const HASH_TYPE_LENGTH: usize = 4;
	const STORE_LOOKAHEAD: usize = 128;

	fn find_all_matches(
		&mut self,
		ring: &[u8],
		mask: usize,
		pos: usize,
		max_length: usize,
		max_distance: usize,
		out: &mut Vec<BackwardMatch>,
	) {
		out.clear();
		let cur = pos & mask;
		let mut best_len = 1;
		for distance in 1..=max_distance {
			let prev = (pos - distance) & mask;
			let len = find_match_length(
				&ring[prev..],
				&ring[cur..],
				max_length,
			);
			if len > best_len {
				out.push(BackwardMatch::new(distance, len));
				best_len = len;
			}
		}
	}

	fn store(&mut self, _ring: &[u8], _mask: usize, _pos: usize) {}
}



/// # Match Length.
///
/// Count the shared prefix of `a` and `b`, capped at `limit` and at either
/// slice's end.
pub(crate) fn find_match_length(a: &[u8], b: &[u8], limit: usize) -> usize {
	a.iter().zip(b).take(limit).take_while(|(a, b)| a == b).count()
}



#[cfg(test)]
pub(crate) mod testing {
	use std::collections::BTreeMap;
	use super::{
		BackwardMatch,
		Matcher,
	};

	/// # Scripted Matcher.
	///
	/// Replays a fixed set of per-position candidates and records every
	/// store call, so driver plumbing can be asserted on directly.
	pub(crate) struct ScriptedMatcher {
		matches: BTreeMap<usize, Vec<BackwardMatch>>,
		pub(crate) stored: Vec<(usize, usize)>,
	}

	impl ScriptedMatcher {
		/// # New.
		pub(crate) fn new<I>(matches: I) -> Self
		where I: IntoIterator<Item=(usize, Vec<BackwardMatch>)> {
			Self {
				matches: matches.into_iter().collect(),
				stored: Vec::new(),
			}
		}
	}

	impl Matcher for ScriptedMatcher {
		// Scripted lists need no hash window; keep querying to the edge.
		const HASH_TYPE_LENGTH: usize = 2;
		const STORE_LOOKAHEAD: usize = 128;

		fn find_all_matches(
			&mut self,
			_ring: &[u8],
			_mask: usize,
			pos: usize,
			max_length: usize,
			_max_distance: usize,
			out: &mut Vec<BackwardMatch>,
		) {
			out.clear();
			if let Some(list) = self.matches.get(&pos) {
				out.extend(
					list.iter()
						.copied()
						.filter(|m| m.length() <= max_length)
				);
			}
		}

		fn store(&mut self, _ring: &[u8], _mask: usize, _pos: usize) {}

		fn store_range(
			&mut self,
			_ring: &[u8],
			_mask: usize,
			lo: usize,
			hi: usize,
		) {
			self.stored.push((lo, hi));
		}
	}
}
