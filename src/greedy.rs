/*!
# Brozli: Greedy References.

The lower quality tiers skip the shortest-path machinery entirely: take the
longest match the matcher offers, peek one position ahead in case something
better starts there, and commit. No cost model, no node table, just a
running literal count and the rolling distance cache.
*/

use crate::{
	command::{
		BlockState,
		Command,
		DistanceCache,
	},
	EncodeParams,
	error::{
		brozli_error,
		BrozliError,
	},
	matcher::{
		BackwardMatch,
		Matcher,
		MAX_NUM_MATCHES,
	},
	Quality,
	symbols::{
		NUM_DISTANCE_SHORT_CODES,
		SHORT_CODE_LIMITS,
	},
};



/// # Minimum Length Worth a Command.
const MIN_GREEDY_MATCH: usize = 4;



/// # Distance-Penalized Length Score.
///
/// Far-away copies cost more bits, so a nearby match wins ties against one
/// a full window away.
const fn length_score(length: usize, distance: usize) -> usize {
	if distance > 1024 { length.saturating_sub(1) }
	else { length }
}

/// # Match Score.
const fn match_score(m: &BackwardMatch) -> usize {
	length_score(m.length(), m.distance())
}

/// # Distance Code for Emission.
///
/// Check the rolling cache for a short-code rendering of `distance`; fall
/// back on the raw code. The derived codes (four and up) only apply at the
/// higher qualities and above their distance thresholds. Reuse can be
/// disabled wholesale for callers that need raw codes throughout.
fn compute_distance_code(
	distance: usize,
	max_distance: usize,
	quality: Quality,
	reuse_distances: bool,
	cache: &DistanceCache,
) -> usize {
	if reuse_distances && distance <= max_distance {
		let d = distance as i64;
		if d == cache.get(0) { return 0; }
		if d == cache.get(1) { return 1; }
		if d == cache.get(2) { return 2; }
		if d == cache.get(3) { return 3; }
		if quality.extended_short_codes() && distance >= 6 {
			for k in 4..NUM_DISTANCE_SHORT_CODES {
				if cache.candidate(k) == d &&
					distance as u64 >= SHORT_CODE_LIMITS[k]
				{
					return k;
				}
			}
		}
	}
	distance + 15
}

/// # Emit One Greedy Command.
///
/// Materialize `m` as a command ending the pending literal run, rolling
/// the distance cache for real distances.
fn emit_command(
	m: BackwardMatch,
	copy_start: usize,
	insert_length: usize,
	params: EncodeParams,
	state: &mut BlockState,
	commands: &mut Vec<Command>,
) {
	let distance = m.distance();
	let max_distance = copy_start.min(params.max_backward());
	let is_dictionary = distance > max_distance;
	let (len_code, dist_code) =
		if is_dictionary { (m.length_code(), distance + 15) }
		else {(
			m.length(),
			compute_distance_code(
				distance,
				max_distance,
				params.quality,
				params.reuse_distances,
				&state.dist_cache,
			),
		)};

	commands.push(Command::new(insert_length, m.length(), len_code, dist_code));
	if !is_dictionary && dist_code > 0 {
		state.dist_cache.push(distance as i64);
	}
	state.num_literals += insert_length;
}



/// # Greedy Block.
///
/// One left-to-right pass with single-position lazy matching: a found match
/// waits one round, and if the next position offers a meaningfully better
/// one, the waiter's first byte is downgraded to a literal and the better
/// match takes its place.
pub(crate) fn greedy_block<M: Matcher>(
	params: EncodeParams,
	num_bytes: usize,
	position: usize,
	ring: &[u8],
	mask: usize,
	matcher: &mut M,
	state: &mut BlockState,
	commands: &mut Vec<Command>,
) -> Result<usize, BrozliError> {
	let pos_end = position + num_bytes;
	let store_end =
		if num_bytes >= M::STORE_LOOKAHEAD {
			position + num_bytes - M::STORE_LOOKAHEAD + 1
		}
		else { position };
	let orig_num_commands = commands.len();

	let mut scratch = Vec::new();
	scratch.try_reserve(MAX_NUM_MATCHES).map_err(|_| brozli_error!())?;

	let mut insert_length = state.last_insert_len;
	state.last_insert_len = 0;
	let mut pending: Option<BackwardMatch> = None;
	let mut i = position;
	while i + M::HASH_TYPE_LENGTH - 1 < pos_end {
		let cur = matcher.find_longest_match(
			ring,
			mask,
			i,
			pos_end - i,
			i.min(params.max_backward()),
			&mut scratch,
		).filter(|m| m.length() >= MIN_GREEDY_MATCH);

		if let Some(prev) = pending.take() {
			if cur.is_some_and(|m| match_score(&m) > match_score(&prev) + 1) {
				// The new match is worth the wait; the old one's first byte
				// becomes a literal.
				insert_length += 1;
				pending = cur;
				i += 1;
				continue;
			}

			// Commit the waiter; it started one position back.
			let copy_start = i - 1;
			emit_command(
				prev,
				copy_start,
				insert_length,
				params,
				state,
				commands,
			);
			insert_length = 0;

			let copy_end = copy_start + prev.length();
			matcher.store_range(ring, mask, i + 1, copy_end.min(store_end));
			i = copy_end;
			continue;
		}

		if cur.is_some() { pending = cur; }
		else { insert_length += 1; }
		i += 1;
	}

	// A waiter left over at the block edge still gets committed.
	if let Some(prev) = pending {
		let copy_start = i - 1;
		emit_command(prev, copy_start, insert_length, params, state, commands);
		insert_length = 0;
		i = copy_start + prev.length();
	}

	insert_length += pos_end - i;
	state.last_insert_len = insert_length;
	Ok(commands.len() - orig_num_commands)
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::matcher::testing::ScriptedMatcher;

	/// # Default Greedy Params.
	const fn params() -> EncodeParams {
		EncodeParams::new(Quality::new(5), 18)
	}

	#[test]
	fn t_distance_code() {
		let cache = DistanceCache::from_array([7, 11, 40, 2]);
		let q = Quality::new(5);

		// Direct cache hits.
		assert_eq!(compute_distance_code(7, 100, q, true, &cache), 0);
		assert_eq!(compute_distance_code(11, 100, q, true, &cache), 1);
		assert_eq!(compute_distance_code(2, 100, q, true, &cache), 3);

		// Derived: cache[0] - 1 = 6 is code 4; cache[0] + 2 = 9 would be
		// code 7 but sits below that code's threshold of 11.
		assert_eq!(compute_distance_code(6, 100, q, true, &cache), 4);
		assert_eq!(compute_distance_code(9, 100, q, true, &cache), 9 + 15);

		// Out of window, reuse disabled, or low quality: raw code.
		assert_eq!(compute_distance_code(7, 5, q, true, &cache), 22);
		assert_eq!(compute_distance_code(7, 100, q, false, &cache), 22);
		assert_eq!(
			compute_distance_code(6, 100, Quality::new(2), true, &cache),
			21,
		);
	}

	#[test]
	fn t_greedy_literals() {
		let ring = b"abcd";
		let mut matcher = ScriptedMatcher::new([]);
		let mut state = BlockState::new();
		let mut commands = Vec::new();

		let n = greedy_block(
			params(), 4, 0, ring, usize::MAX,
			&mut matcher, &mut state, &mut commands,
		).expect("greedy failed");

		assert_eq!(n, 0);
		assert!(commands.is_empty());
		assert_eq!(state.last_insert_len, 4);
		assert_eq!(state.num_literals, 0);
	}

	#[test]
	fn t_greedy_one_copy() {
		let ring = b"abcdabcd";
		let mut matcher = ScriptedMatcher::new([
			(4, vec![BackwardMatch::new(4, 4)]),
		]);
		let mut state = BlockState::new();
		let mut commands = Vec::new();

		let n = greedy_block(
			params(), 8, 0, ring, usize::MAX,
			&mut matcher, &mut state, &mut commands,
		).expect("greedy failed");

		assert_eq!(n, 1);
		assert_eq!(commands[0].insert_len(), 4);
		assert_eq!(commands[0].copy_len(), 4);
		// Distance four is sitting in the default cache already.
		assert_eq!(commands[0].dist_code(), 0);
		assert_eq!(state.dist_cache, DistanceCache::new());
		assert_eq!(state.last_insert_len, 0);
		assert_eq!(state.num_literals, 4);
	}

	#[test]
	fn t_greedy_new_distance() {
		let ring = b"abcabc";
		let mut matcher = ScriptedMatcher::new([
			(3, vec![BackwardMatch::new(3, 3)]),
		]);
		let mut state = BlockState::new();
		let mut commands = Vec::new();

		// A three-byte match is below the greedy threshold; everything
		// stays literal.
		let n = greedy_block(
			params(), 6, 0, ring, usize::MAX,
			&mut matcher, &mut state, &mut commands,
		).expect("greedy failed");
		assert_eq!(n, 0);
		assert_eq!(state.last_insert_len, 6);

		// A four-byte match at a fresh distance gets the raw code and rolls
		// the cache.
		let ring = b"abcdeabcde";
		let mut matcher = ScriptedMatcher::new([
			(5, vec![BackwardMatch::new(5, 5)]),
		]);
		let mut state = BlockState::new();
		let mut commands = Vec::new();
		let n = greedy_block(
			params(), 10, 0, ring, usize::MAX,
			&mut matcher, &mut state, &mut commands,
		).expect("greedy failed");

		assert_eq!(n, 1);
		assert_eq!(commands[0].dist_code(), 20);
		assert_eq!(state.dist_cache.as_array(), [5, 4, 11, 15]);
	}

	#[test]
	fn t_greedy_lazy() {
		// The position-three match is worth abandoning position two's.
		let ring = b"0123456789ab";
		let mut matcher = ScriptedMatcher::new([
			(2, vec![BackwardMatch::new(2, 4)]),
			(3, vec![BackwardMatch::new(3, 8)]),
		]);
		let mut state = BlockState::new();
		let mut commands = Vec::new();

		let n = greedy_block(
			params(), 12, 0, ring, usize::MAX,
			&mut matcher, &mut state, &mut commands,
		).expect("greedy failed");

		assert_eq!(n, 1);
		assert_eq!(commands[0].insert_len(), 3);
		assert_eq!(commands[0].copy_len(), 8);
		assert_eq!(commands[0].dist_code(), 18);
		assert_eq!(state.last_insert_len, 1);
		assert_eq!(state.num_literals, 3);
	}
}
