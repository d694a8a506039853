/*!
# Brozli: Shortest-Path Squeeze.

This module is the optimizer proper: a Zopfli-style shortest-path search
over stream positions. Every candidate command is an edge priced in
fractional bits under the current cost model; the cheapest path from the
block start to the block end becomes the emitted command stream.

Quality ten runs the search once under the literal-cost model. Quality
eleven runs it twice, rebuilding the model from the first pass's own
output, which is where the real savings come from.
*/

use crate::{
	command::{
		BlockState,
		Command,
		DistanceCache,
	},
	cost::CostModel,
	EncodeParams,
	error::{
		brozli_error,
		BrozliError,
	},
	matcher::{
		BackwardMatch,
		find_match_length,
		Matcher,
		MAX_NUM_MATCHES,
	},
	nodes::{
		alloc_nodes,
		distance_cache_at,
		PATH_END,
		PathNode,
		reset_nodes,
		trace_path,
	},
	Quality,
	queue::{
		PosData,
		StartPosQueue,
	},
	symbols::{
		combine_length_codes,
		COPY_EXTRA,
		copy_length_code,
		IMPLICIT_DISTANCE_CMD_LIMIT,
		INSERT_EXTRA,
		insert_length_code,
		NUM_DISTANCE_SHORT_CODES,
		prefix_encode_copy_distance,
		SHORT_CODE_LIMITS,
	},
};



#[expect(
	clippy::cast_possible_truncation,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	reason = "Distances are window-bounded, extra bits tiny.",
)]
#[expect(clippy::too_many_arguments, reason = "The hot loop wants them flat.")]
/// # Relax One Position.
///
/// Given the candidate matches at `pos`, relax every outgoing edge into the
/// future nodes it can reach.
///
/// Three steps: enqueue `pos` as a command start if reaching it beat pure
/// literals; lower-bound the copy length that could still help anyone; then
/// fan out from the best queued starts, trying the sixteen last-distance
/// derivations first (cheap, byte-verified) and the matcher's fresh
/// candidates second. Fresh matches only run for the two best starts;
/// beyond that only new last-distance edges pay for themselves.
pub(crate) fn update_nodes(
	num_bytes: usize,
	block_start: usize,
	pos: usize,
	ring: &[u8],
	mask: usize,
	quality: Quality,
	max_backward: usize,
	starting_dist_cache: &DistanceCache,
	matches: &[BackwardMatch],
	model: &CostModel,
	queue: &mut StartPosQueue,
	nodes: &mut [PathNode],
) {
	let cur_ix = block_start + pos;
	let cur_ix_masked = cur_ix & mask;
	let max_distance = cur_ix.min(max_backward);
	let max_len = num_bytes - pos;
	let max_zopfli_len = quality.max_zopfli_len();

	if nodes[pos].cost() <= model.literal_costs(0, pos) {
		queue.push(PosData {
			pos,
			distance_cache: distance_cache_at(
				block_start,
				pos,
				max_backward,
				starting_dist_cache,
				nodes,
			),
			costdiff: nodes[pos].cost() - model.literal_costs(0, pos),
		});
	}
	if queue.len() == 0 { return; }

	let min_len = minimum_copy_length(queue, nodes, model, num_bytes, pos);

	// Command starts, in order of increasing cost excess.
	for k in 0..quality.max_iters().min(queue.len()) {
		let posdata = *queue.at(k);
		let start = posdata.pos;
		let inscode = insert_length_code(pos - start);
		let base_cost = posdata.costdiff +
			INSERT_EXTRA[inscode as usize] as f32 +
			model.literal_costs(0, pos);

		// Last-distance derivations from this start's cache snapshot.
		let mut best_len = min_len - 1;
		for j in 0..NUM_DISTANCE_SHORT_CODES {
			if best_len >= max_len { break; }

			let backward = posdata.distance_cache.candidate(j);
			if backward <= 0 { continue; }
			let backward = backward as usize;
			if backward > cur_ix || backward > max_distance { continue; }
			if (backward as u64) < SHORT_CODE_LIMITS[j] { continue; }

			// One byte past the best length is a cheap mismatch gate; a
			// candidate that cannot beat best_len is not worth measuring.
			let prev_ix = (cur_ix - backward) & mask;
			if
				cur_ix_masked + best_len > mask ||
				prev_ix + best_len > mask ||
				ring[cur_ix_masked + best_len] != ring[prev_ix + best_len]
			{
				continue;
			}

			let len = find_match_length(
				&ring[prev_ix..],
				&ring[cur_ix_masked..],
				max_len,
			);
			let dist_cost = base_cost + model.distance_cost(j);
			for l in (best_len + 1)..=len {
				let copycode = copy_length_code(l);
				let cmdcode = combine_length_codes(inscode, copycode, j == 0);
				let with_dist =
					if cmdcode < IMPLICIT_DISTANCE_CMD_LIMIT { base_cost }
					else { dist_cost };
				let cost = with_dist +
					COPY_EXTRA[copycode as usize] as f32 +
					model.command_cost(cmdcode);
				if cost < nodes[pos + l].cost() {
					nodes[pos + l] = PathNode::command(
						l, l, backward, j + 1, pos - start, cost,
					);
				}
				best_len = l;
			}
		}

		// At deeper iterations only new last-distance matches help; fresh
		// candidates with the same distances were exhausted above.
		if k >= 2 { continue; }

		let mut len = min_len;
		for m in matches {
			let dist = m.distance();
			let is_dictionary = dist > max_distance;
			let (dist_symbol, dist_bits, _) =
				prefix_encode_copy_distance(dist + 15);
			let dist_cost = base_cost +
				dist_bits as f32 +
				model.distance_cost(dist_symbol as usize);

			// For dictionary references, and for anything past the distinct-
			// distance threshold, only the full length is worth a trial.
			let max_match_len = m.length();
			debug_assert!(max_match_len <= max_len);
			if len < max_match_len && (is_dictionary || max_match_len > max_zopfli_len) {
				len = max_match_len;
			}
			while len <= max_match_len {
				let len_code =
					if is_dictionary { m.length_code() }
					else { len };
				let copycode = copy_length_code(len_code);
				let cmdcode = combine_length_codes(inscode, copycode, false);
				let cost = dist_cost +
					COPY_EXTRA[copycode as usize] as f32 +
					model.command_cost(cmdcode);
				if cost < nodes[pos + len].cost() {
					nodes[pos + len] = PathNode::command(
						len, len_code, dist, 0, pos - start, cost,
					);
				}
				len += 1;
			}
		}
	}
}

/// # Minimum Useful Copy Length.
///
/// Positions already reached more cheaply than the best queued start could
/// ever manage cannot be improved, so copies landing on them are skipped
/// wholesale. Each copy-length-code bucket crossed adds one extra bit to
/// the bound.
fn minimum_copy_length(
	queue: &StartPosQueue,
	nodes: &[PathNode],
	model: &CostModel,
	num_bytes: usize,
	pos: usize,
) -> usize {
	let start0 = queue.at(0).pos;
	let mut min_cost = nodes[start0].cost() +
		model.literal_costs(start0, pos) +
		model.min_cost_cmd();
	let mut len = 2;
	let mut next_len_bucket = 4;
	let mut next_len_offset = 10;
	while pos + len <= num_bytes && nodes[pos + len].cost() <= min_cost {
		len += 1;
		if len == next_len_offset {
			min_cost += 1.0;
			next_len_offset += next_len_bucket;
			next_len_bucket *= 2;
		}
	}
	len
}



/// # One Optimization Pass Over Pre-Gathered Matches.
///
/// Drives [`update_nodes`] across the block using per-position candidate
/// counts collected up front, jumping clean over any position the gather
/// phase collapsed to a single overlong match. Returns the command count of
/// the traced path.
fn zopfli_iterate(
	num_bytes: usize,
	position: usize,
	ring: &[u8],
	mask: usize,
	quality: Quality,
	max_backward: usize,
	dist_cache: &DistanceCache,
	model: &CostModel,
	num_matches: &[u32],
	matches: &[BackwardMatch],
	type_len: usize,
	nodes: &mut [PathNode],
) -> usize {
	let max_zopfli_len = quality.max_zopfli_len();
	let mut queue = StartPosQueue::new();
	let mut cur_match_pos = 0;
	let mut i = 0;
	nodes[0] = PathNode::ORIGIN;
	while i + type_len - 1 < num_bytes {
		let num = num_matches[i] as usize;
		update_nodes(
			num_bytes,
			position,
			i,
			ring,
			mask,
			quality,
			max_backward,
			dist_cache,
			&matches[cur_match_pos..cur_match_pos + num],
			model,
			&mut queue,
			nodes,
		);
		cur_match_pos += num;

		// Overlong copies were collapsed during gathering; re-walking their
		// interiors costs a lot of time for almost no ratio.
		if num == 1 && matches[cur_match_pos - 1].length() > max_zopfli_len {
			i += matches[cur_match_pos - 1].length() - 1;
			queue.clear();
		}
		i += 1;
	}
	trace_path(num_bytes, nodes)
}

/// # Compute the Shortest Path (Single Pass).
///
/// Run the optimizer over one block under the literal-cost model, querying
/// the matcher position by position. On return `nodes` holds a forward-
/// linked command path rooted at the origin, ready for
/// [`create_commands`]; the returned value is the number of commands on
/// it.
///
/// `nodes` must hold exactly `num_bytes + 1` stub-initialized entries (see
/// [`alloc_nodes`]).
pub fn compute_shortest_path<M: Matcher>(
	num_bytes: usize,
	position: usize,
	ring: &[u8],
	mask: usize,
	quality: Quality,
	max_backward: usize,
	dist_cache: &DistanceCache,
	matcher: &mut M,
	nodes: &mut [PathNode],
) -> Result<usize, BrozliError> {
	if nodes.len() != num_bytes + 1 { return Err(brozli_error!()); }

	let max_zopfli_len = quality.max_zopfli_len();
	let mut model = CostModel::new(num_bytes)?;
	model.set_from_literal_costs(position, ring, mask);

	let mut queue = StartPosQueue::new();
	let mut matches = Vec::new();
	matches.try_reserve(MAX_NUM_MATCHES).map_err(|_| brozli_error!())?;
	let store_end =
		if num_bytes >= M::STORE_LOOKAHEAD {
			position + num_bytes - M::STORE_LOOKAHEAD + 1
		}
		else { position };

	nodes[0] = PathNode::ORIGIN;
	let mut i = 0;
	while i + M::HASH_TYPE_LENGTH - 1 < num_bytes {
		let pos = position + i;
		let max_distance = pos.min(max_backward);
		matcher.find_all_matches(
			ring,
			mask,
			pos,
			num_bytes - i,
			max_distance,
			&mut matches,
		);
		if let Some(last) = matches.last().copied() {
			if last.length() > max_zopfli_len {
				matches.clear();
				matches.push(last);
			}
		}
		update_nodes(
			num_bytes,
			position,
			i,
			ring,
			mask,
			quality,
			max_backward,
			dist_cache,
			&matches,
			&model,
			&mut queue,
			nodes,
		);
		if matches.len() == 1 && matches[0].length() > max_zopfli_len {
			// Keep the matcher coherent across the jump by feeding it the
			// copy's tail.
			matcher.store_range(
				ring,
				mask,
				pos + 1,
				(pos + matches[0].length()).min(store_end),
			);
			i += matches[0].length() - 1;
			queue.clear();
		}
		i += 1;
	}

	Ok(trace_path(num_bytes, nodes))
}



/// # Materialize Commands.
///
/// Walk the forward-linked path left behind by the optimizer and emit one
/// [`Command`] per chosen node. The caller's dangling literal run folds
/// into the first command's insert length; trailing bytes past the last
/// copy accumulate into the outgoing run instead of producing a command.
/// Real distances (neither dictionary references nor last-distance reuses)
/// shift into the rolling cache as they are emitted.
pub fn create_commands(
	num_bytes: usize,
	block_start: usize,
	max_backward: usize,
	nodes: &[PathNode],
	state: &mut BlockState,
	commands: &mut Vec<Command>,
) {
	let mut pos = 0;
	let mut offset = nodes[0].next();
	let mut first = true;
	while offset != PATH_END {
		let next = &nodes[pos + offset as usize];
		let copy_length = next.copy_length();
		let mut insert_length = next.insert_length();
		pos += insert_length;
		offset = next.next();

		if first {
			insert_length += state.last_insert_len;
			state.last_insert_len = 0;
			first = false;
		}

		let distance = next.copy_distance();
		let max_distance = (block_start + pos).min(max_backward);
		let is_dictionary = distance > max_distance;
		let dist_code = next.distance_code();

		commands.push(Command::new(
			insert_length,
			copy_length,
			next.length_code(),
			dist_code,
		));

		if !is_dictionary && dist_code > 0 {
			state.dist_cache.push(distance as i64);
		}

		state.num_literals += insert_length;
		pos += copy_length;
	}
	state.last_insert_len += num_bytes - pos;
}



/// # Quality-Ten Block.
///
/// One optimization pass under the literal-cost model, straight into
/// commands.
pub(crate) fn zopfli_block<M: Matcher>(
	params: EncodeParams,
	num_bytes: usize,
	position: usize,
	ring: &[u8],
	mask: usize,
	matcher: &mut M,
	state: &mut BlockState,
	commands: &mut Vec<Command>,
) -> Result<usize, BrozliError> {
	let max_backward = params.max_backward();
	let mut nodes = alloc_nodes(num_bytes)?;
	let dist_cache = state.dist_cache;
	let num_commands = compute_shortest_path(
		num_bytes,
		position,
		ring,
		mask,
		params.quality,
		max_backward,
		&dist_cache,
		matcher,
		&mut nodes,
	)?;
	create_commands(num_bytes, position, max_backward, &nodes, state, commands);
	Ok(num_commands)
}

#[expect(clippy::cast_possible_truncation, reason = "Counts are bounded.")]
/// # Quality-Eleven Block.
///
/// Gather every position's candidates up front (collapsing overlong
/// matches and feeding their tails back to the matcher), then optimize the
/// block twice: once under the literal-cost model, and once under symbol
/// costs rebuilt from the first pass's own output. The caller's rolling
/// state is restored between passes so only the final stream sticks.
pub(crate) fn hq_zopfli_block<M: Matcher>(
	params: EncodeParams,
	num_bytes: usize,
	position: usize,
	ring: &[u8],
	mask: usize,
	matcher: &mut M,
	state: &mut BlockState,
	commands: &mut Vec<Command>,
) -> Result<usize, BrozliError> {
	let quality = params.quality;
	let max_backward = params.max_backward();
	let max_zopfli_len = quality.max_zopfli_len();
	let store_end =
		if num_bytes >= M::STORE_LOOKAHEAD {
			position + num_bytes - M::STORE_LOOKAHEAD + 1
		}
		else { position };

	let mut num_matches = Vec::new();
	num_matches.try_reserve_exact(num_bytes).map_err(|_| brozli_error!())?;
	num_matches.resize(num_bytes, 0_u32);
	let mut matches: Vec<BackwardMatch> = Vec::new();
	matches.try_reserve(num_bytes.saturating_mul(4).max(MAX_NUM_MATCHES))
		.map_err(|_| brozli_error!())?;
	let mut scratch = Vec::new();
	scratch.try_reserve(MAX_NUM_MATCHES).map_err(|_| brozli_error!())?;

	let mut i = 0;
	while i + M::HASH_TYPE_LENGTH - 1 < num_bytes {
		let pos = position + i;
		let max_distance = pos.min(max_backward);
		matcher.find_all_matches(
			ring,
			mask,
			pos,
			num_bytes - i,
			max_distance,
			&mut scratch,
		);

		#[cfg(debug_assertions)]
		for pair in scratch.windows(2) {
			debug_assert!(pair[0].length() < pair[1].length());
			debug_assert!(
				pair[0].distance() > max_distance ||
				pair[0].distance() <= pair[1].distance()
			);
		}

		num_matches[i] = scratch.len() as u32;
		if let Some(last) = scratch.last().copied() {
			if last.length() > max_zopfli_len {
				// Collapse to just the long match; everything it covers gets
				// jumped over, so keep the matcher fed and skip ahead. The
				// jumped positions keep their zeroed counts.
				matches.push(last);
				num_matches[i] = 1;
				matcher.store_range(
					ring,
					mask,
					pos + 1,
					(pos + last.length()).min(store_end),
				);
				i += last.length() - 1;
			}
			else {
				matches.extend_from_slice(&scratch);
			}
		}
		i += 1;
	}

	let orig_num_literals = state.num_literals;
	let orig_last_insert_len = state.last_insert_len;
	let orig_dist_cache = state.dist_cache;
	let orig_num_commands = commands.len();

	let mut nodes = alloc_nodes(num_bytes)?;
	let mut model = CostModel::new(num_bytes)?;
	let mut num_commands = 0;
	for pass in 0..2 {
		reset_nodes(&mut nodes);
		if pass == 0 {
			model.set_from_literal_costs(position, ring, mask);
		}
		else {
			model.set_from_commands(
				position,
				ring,
				mask,
				&commands[orig_num_commands..],
				orig_last_insert_len,
			);
		}
		commands.truncate(orig_num_commands);
		state.num_literals = orig_num_literals;
		state.last_insert_len = orig_last_insert_len;
		state.dist_cache = orig_dist_cache;

		num_commands = zopfli_iterate(
			num_bytes,
			position,
			ring,
			mask,
			quality,
			max_backward,
			&orig_dist_cache,
			&model,
			&num_matches,
			&matches,
			M::HASH_TYPE_LENGTH,
			&mut nodes,
		);
		create_commands(
			num_bytes,
			position,
			max_backward,
			&nodes,
			state,
			commands,
		);
	}

	Ok(num_commands)
}
