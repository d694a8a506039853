/*!
# Brozli: Cost Model.

The optimizer prices every candidate edge in fractional bits. This module
holds the per-symbol tables those prices come from, in both flavors: the
pessimistic literal-based estimate used on first contact with a block, and
the histogram-based refinement rebuilt from an earlier pass's commands.
*/

use crate::{
	command::Command,
	error::{
		brozli_error,
		BrozliError,
	},
	symbols::{
		fast_log2,
		IMPLICIT_DISTANCE_CMD_LIMIT,
		NUM_COMMAND_SYMBOLS,
		NUM_DISTANCE_SYMBOLS,
		NUM_LITERAL_SYMBOLS,
	},
};



/// # Sliding Half-Window for Literal Estimation.
const WINDOW_HALF: usize = 495;



/// # Cost Model.
///
/// Per-symbol costs for commands and distances, plus a cumulative prefix sum
/// of per-byte literal costs so any literal run can be priced with one
/// subtraction. `min_cost_cmd` bounds every command from below, which the
/// minimum-copy-length walk leans on.
pub(crate) struct CostModel {
	/// # Command Symbol Costs.
	cost_cmd: [f32; NUM_COMMAND_SYMBOLS],

	/// # Distance Symbol Costs.
	cost_dist: [f32; NUM_DISTANCE_SYMBOLS],

	/// # Cumulative Literal Costs.
	///
	/// `literal_costs[j] - literal_costs[i]` prices the literals in `[i, j)`.
	literal_costs: Vec<f32>,

	/// # Cheapest Command.
	min_cost_cmd: f32,

	/// # Block Size.
	num_bytes: usize,
}

impl CostModel {
	/// # New.
	///
	/// Symbol tables start zeroed; one of the two `set_from_*` methods must
	/// run before the model prices anything.
	pub(crate) fn new(num_bytes: usize) -> Result<Self, BrozliError> {
		let mut literal_costs = Vec::new();
		literal_costs.try_reserve_exact(num_bytes + 2)
			.map_err(|_| brozli_error!())?;
		literal_costs.resize(num_bytes + 2, 0.0);

		Ok(Self {
			cost_cmd: [0.0; NUM_COMMAND_SYMBOLS],
			cost_dist: [0.0; NUM_DISTANCE_SYMBOLS],
			literal_costs,
			min_cost_cmd: 0.0,
			num_bytes,
		})
	}

	#[expect(clippy::cast_possible_truncation, reason = "Costs are small.")]
	/// # Price From Literal Costs.
	///
	/// First-pass setup: per-byte literal costs from the sliding-window
	/// estimator (prefix-summed in place), and a distance-independent
	/// logarithmic shape for commands and distances. This is deliberately
	/// pessimistic; no command is assumed cheaper than coding its index
	/// uniformly.
	pub(crate) fn set_from_literal_costs(
		&mut self,
		position: usize,
		ring: &[u8],
		mask: usize,
	) {
		let num_bytes = self.num_bytes;
		estimate_literal_costs(
			position,
			num_bytes,
			mask,
			ring,
			&mut self.literal_costs[1..=num_bytes],
		);
		self.literal_costs[0] = 0.0;
		for i in 0..num_bytes {
			self.literal_costs[i + 1] += self.literal_costs[i];
		}
		for (i, cost) in self.cost_cmd.iter_mut().enumerate() {
			*cost = fast_log2(11 + i as u64) as f32;
		}
		for (i, cost) in self.cost_dist.iter_mut().enumerate() {
			*cost = fast_log2(20 + i as u64) as f32;
		}
		self.min_cost_cmd = fast_log2(11) as f32;
	}

	/// # Price From Commands.
	///
	/// Second-pass setup: accumulate literal, command, and distance
	/// histograms over an earlier pass's output and convert each to Shannon
	/// costs. Distances only count for commands that actually carry an
	/// explicit distance symbol.
	pub(crate) fn set_from_commands(
		&mut self,
		position: usize,
		ring: &[u8],
		mask: usize,
		commands: &[Command],
		last_insert_len: usize,
	) {
		let mut histogram_literal = [0_u32; NUM_LITERAL_SYMBOLS];
		let mut histogram_cmd = [0_u32; NUM_COMMAND_SYMBOLS];
		let mut histogram_dist = [0_u32; NUM_DISTANCE_SYMBOLS];

		let mut pos = position - last_insert_len;
		for cmd in commands {
			histogram_cmd[cmd.cmd_prefix() as usize] += 1;
			if cmd.cmd_prefix() >= IMPLICIT_DISTANCE_CMD_LIMIT {
				histogram_dist[cmd.dist_prefix() as usize] += 1;
			}
			for j in 0..cmd.insert_len() {
				histogram_literal[ring[(pos + j) & mask] as usize] += 1;
			}
			pos += cmd.insert_len() + cmd.copy_len();
		}

		let mut cost_literal = [0.0_f32; NUM_LITERAL_SYMBOLS];
		set_cost(&histogram_literal, &mut cost_literal);
		set_cost(&histogram_cmd, &mut self.cost_cmd);
		set_cost(&histogram_dist, &mut self.cost_dist);

		self.min_cost_cmd = self.cost_cmd.iter().copied()
			.fold(f32::INFINITY, f32::min);

		self.literal_costs[0] = 0.0;
		for i in 0..self.num_bytes {
			self.literal_costs[i + 1] = self.literal_costs[i] +
				cost_literal[ring[(position + i) & mask] as usize];
		}
	}
}

impl CostModel {
	/// # Command Symbol Cost.
	pub(crate) const fn command_cost(&self, cmdcode: u16) -> f32 {
		self.cost_cmd[cmdcode as usize]
	}

	/// # Distance Symbol Cost.
	pub(crate) const fn distance_cost(&self, distcode: usize) -> f32 {
		self.cost_dist[distcode]
	}

	/// # Literal Run Cost.
	pub(crate) fn literal_costs(&self, from: usize, to: usize) -> f32 {
		self.literal_costs[to] - self.literal_costs[from]
	}

	/// # Cheapest Command.
	pub(crate) const fn min_cost_cmd(&self) -> f32 { self.min_cost_cmd }
}



#[expect(clippy::cast_possible_truncation, reason = "Costs are small.")]
/// # Histogram to Shannon Costs.
///
/// Observed symbols cost `log2(sum) - log2(count)` bits, floored at one;
/// unseen symbols are priced two bits above the whole population so they
/// always lose to anything actually observed.
fn set_cost(histogram: &[u32], cost: &mut [f32]) {
	debug_assert_eq!(histogram.len(), cost.len());

	let sum = histogram.iter().copied().map(u64::from).sum::<u64>();
	let log2sum = fast_log2(sum) as f32;
	for (&count, cost) in histogram.iter().zip(cost.iter_mut()) {
		if count == 0 { *cost = log2sum + 2.0; }
		else {
			let bits = log2sum - fast_log2(u64::from(count)) as f32;
			*cost = if bits < 1.0 { 1.0 } else { bits };
		}
	}
}

#[expect(clippy::cast_possible_truncation, reason = "Costs are small.")]
#[expect(clippy::suboptimal_flops, reason = "Summation order is contractual.")]
/// # Estimate Per-Byte Literal Costs.
///
/// Price each byte by its population count within a sliding window of
/// roughly a thousand surrounding bytes. Rare bytes approach the window's
/// full entropy; bytes filling their window cost roughly nothing, squeezed
/// back toward one bit so no literal ever looks free.
fn estimate_literal_costs(
	pos: usize,
	len: usize,
	mask: usize,
	data: &[u8],
	cost: &mut [f32],
) {
	debug_assert_eq!(cost.len(), len);

	let mut histogram = [0_u32; NUM_LITERAL_SYMBOLS];
	let mut in_window = WINDOW_HALF.min(len);
	for i in 0..in_window {
		histogram[data[(pos + i) & mask] as usize] += 1;
	}

	for i in 0..len {
		if i >= WINDOW_HALF {
			histogram[data[(pos + i - WINDOW_HALF) & mask] as usize] -= 1;
			in_window -= 1;
		}
		if i + WINDOW_HALF < len {
			histogram[data[(pos + i + WINDOW_HALF) & mask] as usize] += 1;
			in_window += 1;
		}
		let histo = histogram[data[(pos + i) & mask] as usize].max(1);
		let mut lit_cost =
			fast_log2(in_window as u64) - fast_log2(u64::from(histo));
		lit_cost += 0.029_05;
		if lit_cost < 1.0 {
			// Halved and recentered rather than clamped.
			lit_cost = lit_cost * 0.5 + 0.5;
		}
		cost[i] = lit_cost as f32;
	}
}
