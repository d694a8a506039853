/*!
# Brozli: Commands.

This module defines the emitted command record, the rolling last-four
distance cache, and the per-stream rolling state threaded between blocks.
*/

use crate::symbols::{
	combine_length_codes,
	copy_length_code,
	DISTANCE_CACHE_INDEX,
	DISTANCE_CACHE_OFFSET,
	insert_length_code,
	NUM_DISTANCE_SHORT_CODES,
	prefix_encode_copy_distance,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Backward-Reference Command.
///
/// One command covers a run of literal bytes followed by a copy. The prefix
/// symbols are computed at construction time so the histogram pass (and the
/// downstream entropy coder) can consume them directly.
pub struct Command {
	/// # Literal Run Length.
	insert_len: u32,

	/// # Copy Length.
	copy_len: u32,

	/// # Copy Length Code.
	///
	/// Usually equal to `copy_len`; dictionary references carry a synthetic
	/// code instead.
	len_code: u32,

	/// # Distance Code.
	///
	/// Zero through fifteen for short codes, otherwise the raw distance plus
	/// fifteen.
	dist_code: u32,

	/// # Combined Insert-and-Copy Symbol.
	cmd_prefix: u16,

	/// # Distance Symbol.
	dist_prefix: u16,

	/// # Distance Extra Bit Count.
	dist_extra_bits: u32,

	/// # Distance Extra Bit Value.
	dist_extra: u32,
}

impl Command {
	#[expect(clippy::cast_possible_truncation, reason = "Lengths fit.")]
	/// # New.
	///
	/// Build a command from the lengths and the distance code chosen by the
	/// optimizer, deriving the prefix symbols along the way.
	pub(crate) fn new(
		insert_len: usize,
		copy_len: usize,
		len_code: usize,
		dist_code: usize,
	) -> Self {
		let (dist_prefix, dist_extra_bits, dist_extra) =
			prefix_encode_copy_distance(dist_code);
		let cmd_prefix = combine_length_codes(
			insert_length_code(insert_len),
			copy_length_code(len_code),
			dist_prefix == 0,
		);

		Self {
			insert_len: insert_len as u32,
			copy_len: copy_len as u32,
			len_code: len_code as u32,
			dist_code: dist_code as u32,
			cmd_prefix,
			dist_prefix,
			dist_extra_bits,
			dist_extra,
		}
	}

	/// # Literal Run Length.
	pub const fn insert_len(&self) -> usize { self.insert_len as usize }

	/// # Copy Length.
	pub const fn copy_len(&self) -> usize { self.copy_len as usize }

	/// # Copy Length Code.
	pub const fn len_code(&self) -> usize { self.len_code as usize }

	/// # Distance Code.
	pub const fn dist_code(&self) -> usize { self.dist_code as usize }

	/// # Combined Insert-and-Copy Symbol.
	pub const fn cmd_prefix(&self) -> u16 { self.cmd_prefix }

	/// # Distance Symbol.
	pub const fn dist_prefix(&self) -> u16 { self.dist_prefix }

	/// # Distance Extra Bits (Count, Value).
	pub const fn dist_extra(&self) -> (u32, u32) {
		(self.dist_extra_bits, self.dist_extra)
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Last-Four Distance Cache.
///
/// The four most recent distinct backward distances, youngest first. Only
/// commands carrying a real distance (neither a dictionary reference nor a
/// reuse of the last distance) shift new entries in.
pub struct DistanceCache([i64; 4]);

impl Default for DistanceCache {
	fn default() -> Self { Self::new() }
}

impl DistanceCache {
	/// # New.
	///
	/// The conventional pre-stream state; these are the distances a decoder
	/// assumes before any command has executed.
	pub const fn new() -> Self { Self([4, 11, 15, 16]) }

	/// # From Array.
	pub const fn from_array(cache: [i64; 4]) -> Self { Self(cache) }

	/// # As Array.
	pub const fn as_array(&self) -> [i64; 4] { self.0 }

	/// # Entry.
	pub(crate) const fn get(&self, idx: usize) -> i64 { self.0[idx] }

	/// # Push.
	///
	/// Shift a new most-recent distance in, dropping the oldest.
	pub(crate) const fn push(&mut self, distance: i64) {
		self.0 = [distance, self.0[0], self.0[1], self.0[2]];
	}

	/// # Short-Code Candidate.
	///
	/// Derive the candidate distance for short code `j`. The result may be
	/// zero or negative for the offset codes; such candidates are simply
	/// infeasible.
	pub(crate) const fn candidate(&self, j: usize) -> i64 {
		debug_assert!(j < NUM_DISTANCE_SHORT_CODES);
		self.0[DISTANCE_CACHE_INDEX[j]] + DISTANCE_CACHE_OFFSET[j]
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Rolling Stream State.
///
/// Carried by the caller across blocks: the distance cache, the literal run
/// left dangling at the end of the previous block, and the cumulative
/// literal count.
pub struct BlockState {
	/// # Distance Cache.
	pub dist_cache: DistanceCache,

	/// # Pending Literal Run.
	pub last_insert_len: usize,

	/// # Cumulative Literal Count.
	pub num_literals: usize,
}

impl Default for BlockState {
	fn default() -> Self { Self::new() }
}

impl BlockState {
	/// # New.
	pub const fn new() -> Self {
		Self {
			dist_cache: DistanceCache::new(),
			last_insert_len: 0,
			num_literals: 0,
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::symbols::IMPLICIT_DISTANCE_CMD_LIMIT;

	#[test]
	fn t_command_prefixes() {
		// A last-distance command stays under the implicit-distance limit and
		// carries no distance symbol.
		let cmd = Command::new(3, 4, 4, 0);
		assert!(cmd.cmd_prefix() < IMPLICIT_DISTANCE_CMD_LIMIT);
		assert_eq!(cmd.dist_prefix(), 0);
		assert_eq!(cmd.dist_extra(), (0, 0));

		// A short-code command keeps the short code as its symbol.
		let cmd = Command::new(3, 4, 4, 5);
		assert!(cmd.cmd_prefix() >= IMPLICIT_DISTANCE_CMD_LIMIT);
		assert_eq!(cmd.dist_prefix(), 5);

		// A raw distance of three (code eighteen) lands in the second raw
		// bucket with one extra bit.
		let cmd = Command::new(3, 3, 3, 18);
		assert!(cmd.cmd_prefix() >= IMPLICIT_DISTANCE_CMD_LIMIT);
		assert_eq!(cmd.dist_prefix(), 17);
		assert_eq!(cmd.dist_extra(), (1, 0));
	}

	#[test]
	fn t_cache_push() {
		let mut cache = DistanceCache::new();
		assert_eq!(cache.as_array(), [4, 11, 15, 16]);

		cache.push(7);
		assert_eq!(cache.as_array(), [7, 4, 11, 15]);

		cache.push(200);
		assert_eq!(cache.as_array(), [200, 7, 4, 11]);
	}

	#[test]
	fn t_cache_candidates() {
		let cache = DistanceCache::from_array([10, 20, 30, 40]);

		// The first four codes are the cache itself.
		assert_eq!(cache.candidate(0), 10);
		assert_eq!(cache.candidate(1), 20);
		assert_eq!(cache.candidate(2), 30);
		assert_eq!(cache.candidate(3), 40);

		// Codes four through nine orbit the most recent distance.
		assert_eq!(cache.candidate(4), 9);
		assert_eq!(cache.candidate(5), 11);
		assert_eq!(cache.candidate(8), 7);
		assert_eq!(cache.candidate(9), 13);

		// Codes ten and up orbit the second.
		assert_eq!(cache.candidate(10), 19);
		assert_eq!(cache.candidate(15), 23);
	}
}
