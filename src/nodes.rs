/*!
# Brozli: Path Nodes.

This module defines the dynamic-programming table for the shortest-path
optimizer: one node per stream position, holding the best known command
ending there, plus the walks that turn a finished table back into a command
path and a distance-cache snapshot.
*/

use crate::{
	command::DistanceCache,
	error::{
		brozli_error,
		BrozliError,
	},
};



/// # Path Terminator.
///
/// Stored as the `next` link of the final chosen node.
pub(crate) const PATH_END: u32 = u32::MAX;



#[derive(Debug, Clone, Copy)]
/// # Path Node.
///
/// The node for position `p` describes the best known command *ending* at
/// `p`: a literal run of `insert_len` bytes followed by a copy of
/// `copy_len` bytes from `distance` back.
///
/// The `u` field is a phase-tagged union in spirit: while the search runs it
/// holds the cost (as `f32` bits) of reaching `p` from the origin, and once
/// the trace pass has run it holds the forward link to the next chosen
/// command instead. Reconstruction is destructive and must happen exactly
/// once per block.
pub struct PathNode {
	/// # Copy Length.
	copy_len: u32,

	/// # Length-Code Delta.
	///
	/// Stored as `copy_len + 9 - len_code` so the (possibly synthetic)
	/// length code can be recovered without a second word.
	len_code_delta: u8,

	/// # Short Code Plus One.
	///
	/// Zero when the distance is coded raw; `k + 1` when short code `k` was
	/// used.
	short_code: u8,

	/// # Backward Distance.
	distance: u32,

	/// # Insert Length.
	insert_len: u32,

	/// # Cost or Next Link.
	u: u32,
}

impl PathNode {
	/// # Unreached Node.
	pub(crate) const STUB: Self = Self {
		copy_len: 1,
		len_code_delta: 9,
		short_code: 0,
		distance: 0,
		insert_len: 0,
		u: f32::INFINITY.to_bits(),
	};

	/// # Origin Node.
	///
	/// Position zero: no incoming command, zero cost.
	pub(crate) const ORIGIN: Self = Self {
		copy_len: 0,
		len_code_delta: 9,
		short_code: 0,
		distance: 0,
		insert_len: 0,
		u: 0, // 0.0_f32.to_bits()
	};

	#[expect(clippy::cast_possible_truncation, reason = "Fields fit.")]
	/// # Command Node.
	///
	/// Build the node for a relaxed edge.
	pub(crate) fn command(
		copy_len: usize,
		len_code: usize,
		distance: usize,
		short_code: usize,
		insert_len: usize,
		cost: f32,
	) -> Self {
		debug_assert!(copy_len >= 2);
		debug_assert!(copy_len + 9 >= len_code);
		Self {
			copy_len: copy_len as u32,
			len_code_delta: (copy_len + 9 - len_code) as u8,
			short_code: short_code as u8,
			distance: distance as u32,
			insert_len: insert_len as u32,
			u: cost.to_bits(),
		}
	}
}

impl PathNode {
	/// # Copy Length.
	pub const fn copy_length(&self) -> usize { self.copy_len as usize }

	/// # Length Code.
	pub const fn length_code(&self) -> usize {
		self.copy_len as usize + 9 - self.len_code_delta as usize
	}

	/// # Backward Distance.
	pub const fn copy_distance(&self) -> usize { self.distance as usize }

	/// # Distance Code.
	///
	/// Zero through fifteen for short codes, otherwise the raw distance plus
	/// fifteen.
	pub const fn distance_code(&self) -> usize {
		if self.short_code == 0 { self.distance as usize + 15 }
		else { self.short_code as usize - 1 }
	}

	/// # Insert Length.
	pub const fn insert_length(&self) -> usize { self.insert_len as usize }

	/// # Command Length.
	pub const fn command_length(&self) -> usize {
		self.copy_len as usize + self.insert_len as usize
	}

	/// # Cost.
	///
	/// Only meaningful before the trace pass has rewritten the table.
	pub(crate) const fn cost(&self) -> f32 { f32::from_bits(self.u) }

	/// # Next Link.
	///
	/// Only meaningful after the trace pass has rewritten the table.
	pub(crate) const fn next(&self) -> u32 { self.u }

	/// # Set Next Link.
	pub(crate) const fn set_next(&mut self, next: u32) { self.u = next; }
}



/// # Allocate a Node Table.
///
/// Reserve and stub-fill a table of `num_bytes + 1` nodes, failing closed if
/// the allocation cannot be honored.
pub fn alloc_nodes(num_bytes: usize) -> Result<Vec<PathNode>, BrozliError> {
	let mut nodes = Vec::new();
	nodes.try_reserve_exact(num_bytes + 1).map_err(|_| brozli_error!())?;
	nodes.resize(num_bytes + 1, PathNode::STUB);
	Ok(nodes)
}

/// # Reset a Node Table.
///
/// Return every entry to the unreached stub; the driver re-seeds the origin
/// before each pass.
pub(crate) fn reset_nodes(nodes: &mut [PathNode]) {
	nodes.fill(PathNode::STUB);
}



/// # Distance Cache at Position.
///
/// Reconstruct the last-four distance cache as it would stand at `pos` if
/// the best known path from the block start were followed, falling back on
/// the caller's pre-block cache for any slots the walk cannot fill.
///
/// Dictionary references and last-distance reuses leave the cache alone, so
/// only nodes carrying a real, in-window distance contribute. Every command
/// consumes at least two positions, bounding the walk at `pos / 2` steps.
pub(crate) fn distance_cache_at(
	block_start: usize,
	pos: usize,
	max_backward: usize,
	starting: &DistanceCache,
	nodes: &[PathNode],
) -> DistanceCache {
	let mut cache = [0_i64; 4];
	let mut idx = 0;
	let mut p = pos;
	while idx < 4 && p > 0 {
		let node = &nodes[p];
		let clen = node.copy_length();
		let ilen = node.insert_length();
		let dist = node.copy_distance();
		if dist + clen <= block_start + p && dist <= max_backward &&
			node.distance_code() > 0
		{
			cache[idx] = dist as i64;
			idx += 1;
		}
		debug_assert!(clen + ilen >= 2);
		p -= clen + ilen;
	}
	for (slot, i) in cache.iter_mut().skip(idx).zip(0..) {
		*slot = starting.get(i);
	}
	DistanceCache::from_array(cache)
}



#[expect(clippy::cast_possible_truncation, reason = "Lengths fit.")]
#[expect(clippy::float_cmp, reason = "Infinity is exact.")]
/// # Trace the Shortest Path.
///
/// Walk the finished table backward from the last reached position,
/// rewriting each visited node's cost with the forward command length, so
/// the table becomes a singly-linked command list rooted at the origin.
/// Returns the number of commands on the path.
pub(crate) fn trace_path(num_bytes: usize, nodes: &mut [PathNode]) -> usize {
	let mut index = num_bytes;
	while index > 0 && nodes[index].cost() == f32::INFINITY { index -= 1; }

	nodes[index].set_next(PATH_END);
	let mut num_commands = 0;
	while index != 0 {
		let len = nodes[index].command_length();
		index -= len;
		nodes[index].set_next(len as u32);
		num_commands += 1;
	}
	num_commands
}
